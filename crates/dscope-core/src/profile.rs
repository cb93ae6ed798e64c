//! Structured analysis output and its schema validator.
//!
//! Model output is parsed with serde into the typed schema (required fields,
//! enumerated labels, array shapes) and then checked for numeric bounds by
//! [`AnalysisProfile::validate`]. The same check runs on cached records, so a
//! profile stored under an older schema fails here and is treated as stale.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Inclusive bound for every axis score.
pub const AXIS_BOUND: f64 = 10.0;

/// Allowed drift of the tendency percentages from 100.
pub const TENDENCY_SUM_TOLERANCE: f64 = 1.0;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("malformed profile JSON: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("profile failed validation: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileStatus {
    Success,
}

/// Reference discourse categories A through D.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiscourseCategory {
    A,
    B,
    C,
    D,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiversityRating {
    #[serde(rename = "Echo Chamber")]
    EchoChamber,
    Focused,
    Balanced,
    Chaotic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisMeta {
    pub total_signals_processed: f64,
    pub primary_focus_area: String,
    pub confidence_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisScore {
    pub value: f64,
    pub confidence: ConfidenceLevel,
    pub evidence: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisScores {
    pub authority_orientation: AxisScore,
    pub liberty_orientation: AxisScore,
    pub ingroup_outgroup: AxisScore,
    pub conflict_tolerance: AxisScore,
}

impl AxisScores {
    #[must_use]
    pub fn named(&self) -> [(&'static str, &AxisScore); 4] {
        [
            ("authority_orientation", &self.authority_orientation),
            ("liberty_orientation", &self.liberty_orientation),
            ("ingroup_outgroup", &self.ingroup_outgroup),
            ("conflict_tolerance", &self.conflict_tolerance),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DominantTendency {
    pub label: String,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscourseCluster {
    pub cluster_name: String,
    pub mapped_category: DiscourseCategory,
    pub description: String,
    pub associated_signals: Vec<String>,
    pub engagement_level: ConfidenceLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscourseDiversity {
    pub rating: DiversityRating,
    pub explanation: String,
}

/// Merged result of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisProfile {
    pub status: ProfileStatus,
    pub analysis_meta: AnalysisMeta,
    pub axis_scores: AxisScores,
    pub dominant_tendency: DominantTendency,
    pub discourse_clusters: Vec<DiscourseCluster>,
    pub discourse_diversity: DiscourseDiversity,
    pub user_facing_disclaimer: String,
    /// Secondary-stage tendency distribution; absent when that stage was omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ideology: Option<TendencyDistribution>,
}

impl AnalysisProfile {
    /// Parse and validate a raw JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::Malformed`] when the document does not match the
    /// schema shape and [`ProfileError::Invalid`] when a value is out of bounds.
    pub fn parse(raw: &str) -> Result<Self, ProfileError> {
        let profile: Self = serde_json::from_str(raw).map_err(ProfileError::Malformed)?;
        profile.validate()?;
        Ok(profile)
    }

    /// Parse and validate an already-decoded JSON value (e.g. a stored record).
    ///
    /// # Errors
    ///
    /// Same as [`AnalysisProfile::parse`].
    pub fn from_value(value: serde_json::Value) -> Result<Self, ProfileError> {
        let profile: Self = serde_json::from_value(value).map_err(ProfileError::Malformed)?;
        profile.validate()?;
        Ok(profile)
    }

    /// Check numeric bounds that the type system cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::Invalid`] listing every violation found.
    pub fn validate(&self) -> Result<(), ProfileError> {
        let mut violations = Vec::new();

        let meta = &self.analysis_meta;
        if !meta.total_signals_processed.is_finite() || meta.total_signals_processed < 0.0 {
            violations.push(format!(
                "analysis_meta.total_signals_processed must be a non-negative number, got {}",
                meta.total_signals_processed
            ));
        }
        if !meta.confidence_score.is_finite() {
            violations.push("analysis_meta.confidence_score must be finite".to_string());
        }

        for (name, axis) in self.axis_scores.named() {
            if !axis.value.is_finite() || axis.value.abs() > AXIS_BOUND {
                violations.push(format!(
                    "axis_scores.{name}.value {} outside [-{AXIS_BOUND}, {AXIS_BOUND}]",
                    axis.value
                ));
            }
        }

        if let Some(ideology) = &self.ideology {
            if let Err(ProfileError::Invalid(mut nested)) = ideology.validate() {
                violations.append(&mut nested);
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ProfileError::Invalid(violations))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tendencies {
    pub progressive_left: f64,
    pub center_left_reformist: f64,
    pub pragmatic_center: f64,
    pub center_right_conservative: f64,
    pub national_right: f64,
    pub radical_left: f64,
    pub radical_right: f64,
}

impl Tendencies {
    #[must_use]
    pub fn named(&self) -> [(&'static str, f64); 7] {
        [
            ("progressive_left", self.progressive_left),
            ("center_left_reformist", self.center_left_reformist),
            ("pragmatic_center", self.pragmatic_center),
            ("center_right_conservative", self.center_right_conservative),
            ("national_right", self.national_right),
            ("radical_left", self.radical_left),
            ("radical_right", self.radical_right),
        ]
    }
}

/// Percentage distribution across the fixed set of discourse spaces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TendencyDistribution {
    pub chart_title: String,
    pub tendencies: Tendencies,
    pub confidence: ConfidenceLevel,
    pub interpretation: String,
    pub disclaimer: String,
}

impl TendencyDistribution {
    /// Parse and validate a raw JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::Malformed`] on shape mismatch and
    /// [`ProfileError::Invalid`] when a percentage is out of range or the
    /// total drifts from 100.
    pub fn parse(raw: &str) -> Result<Self, ProfileError> {
        let distribution: Self = serde_json::from_str(raw).map_err(ProfileError::Malformed)?;
        distribution.validate()?;
        Ok(distribution)
    }

    /// # Errors
    ///
    /// Returns [`ProfileError::Invalid`] listing every violation found.
    pub fn validate(&self) -> Result<(), ProfileError> {
        let mut violations = Vec::new();
        let mut total = 0.0;

        for (name, value) in self.tendencies.named() {
            if !value.is_finite() || !(0.0..=100.0).contains(&value) {
                violations.push(format!("ideology.tendencies.{name} {value} outside [0, 100]"));
            }
            total += value;
        }

        if violations.is_empty() && (total - 100.0).abs() > TENDENCY_SUM_TOLERANCE {
            violations.push(format!("ideology.tendencies sum to {total}, expected 100"));
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ProfileError::Invalid(violations))
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn axis(value: f64) -> serde_json::Value {
        json!({ "value": value, "confidence": "Medium", "evidence": ["#tag"] })
    }

    fn profile_json() -> serde_json::Value {
        json!({
            "status": "success",
            "analysis_meta": {
                "total_signals_processed": 120,
                "primary_focus_area": "D",
                "confidence_score": 0.7
            },
            "axis_scores": {
                "authority_orientation": axis(-2.0),
                "liberty_orientation": axis(6.5),
                "ingroup_outgroup": axis(0.0),
                "conflict_tolerance": axis(-4.0)
            },
            "dominant_tendency": { "label": "livelihood", "explanation": "prices" },
            "discourse_clusters": [{
                "cluster_name": "cost of living",
                "mapped_category": "D",
                "description": "inflation talk",
                "associated_signals": ["inflation", "#prices"],
                "engagement_level": "High"
            }],
            "discourse_diversity": { "rating": "Echo Chamber", "explanation": "narrow" },
            "user_facing_disclaimer": "patterns only"
        })
    }

    fn tendencies_json(values: [f64; 7]) -> serde_json::Value {
        json!({
            "chart_title": "Ideological Discourse Tendencies",
            "tendencies": {
                "progressive_left": values[0],
                "center_left_reformist": values[1],
                "pragmatic_center": values[2],
                "center_right_conservative": values[3],
                "national_right": values[4],
                "radical_left": values[5],
                "radical_right": values[6]
            },
            "confidence": "Low",
            "interpretation": "mixed exposure",
            "disclaimer": "not identity"
        })
    }

    #[test]
    fn valid_profile_parses() {
        let profile = AnalysisProfile::from_value(profile_json()).expect("valid profile");
        assert_eq!(profile.discourse_diversity.rating, DiversityRating::EchoChamber);
        assert_eq!(profile.discourse_clusters[0].mapped_category, DiscourseCategory::D);
        assert!(profile.ideology.is_none());
    }

    #[test]
    fn axis_value_outside_bounds_is_rejected() {
        let mut value = profile_json();
        value["axis_scores"]["conflict_tolerance"]["value"] = json!(11);
        let err = AnalysisProfile::from_value(value).unwrap_err();
        match err {
            ProfileError::Invalid(violations) => {
                assert_eq!(violations.len(), 1);
                assert!(violations[0].contains("conflict_tolerance"));
            }
            other @ ProfileError::Malformed(_) => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn axis_value_at_bound_is_accepted() {
        let mut value = profile_json();
        value["axis_scores"]["authority_orientation"]["value"] = json!(-10);
        assert!(AnalysisProfile::from_value(value).is_ok());
    }

    #[test]
    fn unknown_confidence_label_is_malformed() {
        let mut value = profile_json();
        value["axis_scores"]["liberty_orientation"]["confidence"] = json!("Very High");
        assert!(matches!(
            AnalysisProfile::from_value(value),
            Err(ProfileError::Malformed(_))
        ));
    }

    #[test]
    fn evidence_must_be_an_array_of_strings() {
        let mut value = profile_json();
        value["axis_scores"]["liberty_orientation"]["evidence"] = json!("just text");
        assert!(matches!(
            AnalysisProfile::from_value(value),
            Err(ProfileError::Malformed(_))
        ));
    }

    #[test]
    fn missing_required_section_is_malformed() {
        let mut value = profile_json();
        value.as_object_mut().unwrap().remove("discourse_diversity");
        assert!(matches!(
            AnalysisProfile::from_value(value),
            Err(ProfileError::Malformed(_))
        ));
    }

    #[test]
    fn tendencies_summing_to_100_are_accepted() {
        let raw = tendencies_json([20.0, 25.0, 30.0, 10.0, 5.0, 5.0, 5.0]).to_string();
        assert!(TendencyDistribution::parse(&raw).is_ok());
    }

    #[test]
    fn tendencies_within_rounding_tolerance_are_accepted() {
        let raw = tendencies_json([14.3, 14.3, 14.3, 14.3, 14.3, 14.3, 14.3]).to_string();
        assert!(TendencyDistribution::parse(&raw).is_ok());
    }

    #[test]
    fn tendencies_with_wrong_total_are_rejected() {
        let raw = tendencies_json([50.0, 50.0, 50.0, 0.0, 0.0, 0.0, 0.0]).to_string();
        assert!(matches!(
            TendencyDistribution::parse(&raw),
            Err(ProfileError::Invalid(_))
        ));
    }

    #[test]
    fn stored_profile_with_invalid_ideology_fails_validation() {
        let mut value = profile_json();
        value["ideology"] = tendencies_json([90.0, 90.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        assert!(matches!(
            AnalysisProfile::from_value(value),
            Err(ProfileError::Invalid(_))
        ));
    }

    #[test]
    fn serialization_omits_absent_ideology() {
        let profile = AnalysisProfile::from_value(profile_json()).unwrap();
        let value = serde_json::to_value(&profile).unwrap();
        assert!(value.get("ideology").is_none());
        assert_eq!(value["discourse_diversity"]["rating"], "Echo Chamber");
    }
}
