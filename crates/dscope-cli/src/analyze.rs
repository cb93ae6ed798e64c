//! `analyze` command handler.

use std::fmt::{self, Write as _};

use dscope_core::AppConfig;
use dscope_pipeline::AnalysisOutcome;

/// Run one analysis and print the result.
///
/// # Errors
///
/// Returns an error if the analyzer cannot be configured or the run fails.
/// Pipeline failures carry their machine code and status in the message.
pub(crate) async fn run_analyze(
    config: &AppConfig,
    handle: &str,
    as_json: bool,
) -> anyhow::Result<()> {
    let analyzer = dscope_pipeline::build_analyzer(config)?;

    let outcome = analyzer.analyze(handle).await.map_err(|e| {
        tracing::debug!(error = %e, "analysis failed");
        anyhow::anyhow!("{} ({}): {}", e.code(), e.status(), e.user_message())
    })?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print!("{}", render_outcome(&outcome)?);
    }
    Ok(())
}

pub(crate) fn render_outcome(outcome: &AnalysisOutcome) -> Result<String, fmt::Error> {
    let profile = &outcome.profile;
    let meta = &outcome.meta;
    let mut out = String::new();

    let source = if meta.cached { "cached" } else { "fresh" };
    writeln!(out, "@{} ({source})", outcome.handle)?;
    writeln!(
        out,
        "last updated: {}   history: {}",
        meta.last_updated.format("%Y-%m-%d %H:%M UTC"),
        meta.history_count
    )?;
    if !meta.flags.is_empty() {
        let flags: Vec<&str> = meta.flags.iter().map(|f| f.as_str()).collect();
        writeln!(out, "flags: {}", flags.join(", "))?;
    }
    writeln!(out)?;

    writeln!(
        out,
        "dominant tendency: {}",
        profile.dominant_tendency.label
    )?;
    writeln!(out, "  {}", profile.dominant_tendency.explanation)?;
    writeln!(
        out,
        "focus area: {}   diversity: {:?}",
        profile.analysis_meta.primary_focus_area, profile.discourse_diversity.rating
    )?;
    writeln!(out)?;

    writeln!(out, "{:<26}{:>7}  CONFIDENCE", "AXIS", "VALUE")?;
    for (name, axis) in profile.axis_scores.named() {
        writeln!(out, "{name:<26}{:>7.1}  {:?}", axis.value, axis.confidence)?;
    }

    if !profile.discourse_clusters.is_empty() {
        writeln!(out)?;
        writeln!(out, "clusters:")?;
        for cluster in &profile.discourse_clusters {
            writeln!(
                out,
                "  [{:?}] {} ({:?})",
                cluster.mapped_category, cluster.cluster_name, cluster.engagement_level
            )?;
        }
    }

    if let Some(ideology) = &profile.ideology {
        writeln!(out)?;
        writeln!(out, "{}:", ideology.chart_title)?;
        let mut spaces = ideology.tendencies.named();
        spaces.sort_by(|a, b| b.1.total_cmp(&a.1));
        for (name, share) in spaces {
            writeln!(out, "  {name:<26}{share:>5.0}%")?;
        }
    }

    writeln!(out)?;
    writeln!(out, "{}", profile.user_facing_disclaimer)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use dscope_core::AnalysisProfile;
    use dscope_pipeline::OutcomeMeta;
    use serde_json::json;

    use super::*;

    fn profile() -> AnalysisProfile {
        let axis = json!({ "value": -3.5, "confidence": "High", "evidence": ["reform"] });
        let raw = json!({
            "status": "success",
            "analysis_meta": {
                "total_signals_processed": 90,
                "primary_focus_area": "B",
                "confidence_score": 0.8
            },
            "axis_scores": {
                "authority_orientation": axis,
                "liberty_orientation": axis,
                "ingroup_outgroup": axis,
                "conflict_tolerance": axis
            },
            "dominant_tendency": { "label": "Reformist", "explanation": "Gradual change." },
            "discourse_clusters": [{
                "cluster_name": "Elections",
                "mapped_category": "B",
                "description": "Turnout.",
                "associated_signals": ["vote"],
                "engagement_level": "Medium"
            }],
            "discourse_diversity": { "rating": "Echo Chamber", "explanation": "Narrow." },
            "user_facing_disclaimer": "Discourse only.",
            "ideology": {
                "chart_title": "Tendencies",
                "tendencies": {
                    "progressive_left": 5,
                    "center_left_reformist": 60,
                    "pragmatic_center": 20,
                    "center_right_conservative": 5,
                    "national_right": 5,
                    "radical_left": 3,
                    "radical_right": 2
                },
                "confidence": "Low",
                "interpretation": "Reform-leaning.",
                "disclaimer": "Not an identity."
            }
        });
        AnalysisProfile::from_value(raw).expect("valid profile")
    }

    #[test]
    fn render_lists_axes_and_sorted_tendencies() {
        let outcome = AnalysisOutcome {
            handle: "someone".to_string(),
            profile: profile(),
            meta: OutcomeMeta {
                cached: true,
                last_updated: Utc.with_ymd_and_hms(2026, 2, 1, 9, 30, 0).unwrap(),
                history_count: 2,
                flags: Vec::new(),
            },
        };

        let text = render_outcome(&outcome).expect("render");

        assert!(text.starts_with("@someone (cached)"));
        assert!(text.contains("last updated: 2026-02-01 09:30 UTC   history: 2"));
        assert!(text.contains("authority_orientation"));
        assert!(text.contains("[B] Elections (Medium)"));
        let center_left = text.find("center_left_reformist").unwrap();
        let center = text.find("pragmatic_center").unwrap();
        assert!(center_left < center);
        assert!(!text.contains("flags:"));
    }
}
