//! The analysis run: cache check, fetch, extract, gate, model stages, persist.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dscope_core::{AnalysisProfile, AppConfig, Clock, ProfileError, TendencyDistribution};
use dscope_model::{CompletionRequest, ModelError, ModelService};
use dscope_signals::{assess, extract_signals, AccountFlag, EligibilityVerdict};
use dscope_store::{RecordStore, SubjectRecord};
use serde::Serialize;

use crate::error::PipelineError;
use crate::handle::normalize_handle;
use crate::input::AnalysisInput;
use crate::prompts;
use crate::source::SubjectSource;

const PRIMARY_TEMPERATURE: f32 = 0.1;
const REPAIR_TEMPERATURE: f32 = 0.0;
const SECONDARY_TEMPERATURE: f32 = 0.4;

#[derive(Debug, Clone, Copy)]
pub struct AnalyzerSettings {
    /// A stored profile younger than this is served from cache.
    pub cache_max_age: Duration,
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        Self {
            cache_max_age: Duration::days(180),
        }
    }
}

impl AnalyzerSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            cache_max_age: Duration::days(i64::from(config.cache_max_age_days)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutcomeMeta {
    pub cached: bool,
    pub last_updated: DateTime<Utc>,
    pub history_count: usize,
    pub flags: Vec<AccountFlag>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisOutcome {
    pub handle: String,
    pub profile: AnalysisProfile,
    pub meta: OutcomeMeta,
}

/// Result of consulting the store before a run.
enum CacheLookup {
    Fresh(AnalysisOutcome),
    /// Nothing usable; carries the history length of any record being replaced.
    Miss { history_count: usize },
}

/// User message of the tendency stage: the signals plus the primary result.
#[derive(Serialize)]
struct SecondaryInput<'a> {
    signals: &'a AnalysisInput,
    primary_analysis: &'a AnalysisProfile,
}

/// Why the best-effort secondary stage produced nothing.
#[derive(Debug)]
enum StageFailure {
    Encode(serde_json::Error),
    Model(ModelError),
    Invalid(ProfileError),
}

impl std::fmt::Display for StageFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Encode(e) => write!(f, "{e}"),
            Self::Model(e) => write!(f, "{e}"),
            Self::Invalid(e) => write!(f, "{e}"),
        }
    }
}

pub struct Analyzer {
    source: Arc<dyn SubjectSource>,
    model: Arc<dyn ModelService>,
    store: Arc<dyn RecordStore>,
    clock: Arc<dyn Clock>,
    settings: AnalyzerSettings,
}

impl Analyzer {
    #[must_use]
    pub fn new(
        source: Arc<dyn SubjectSource>,
        model: Arc<dyn ModelService>,
        store: Arc<dyn RecordStore>,
        clock: Arc<dyn Clock>,
        settings: AnalyzerSettings,
    ) -> Self {
        Self {
            source,
            model,
            store,
            clock,
            settings,
        }
    }

    /// The store this analyzer persists into.
    #[must_use]
    pub fn store(&self) -> Arc<dyn RecordStore> {
        Arc::clone(&self.store)
    }

    /// Produce a profile for `raw_handle`, from cache when fresh.
    ///
    /// # Errors
    ///
    /// See [`PipelineError`]; nothing is persisted when an error is returned.
    pub async fn analyze(&self, raw_handle: &str) -> Result<AnalysisOutcome, PipelineError> {
        let handle = normalize_handle(raw_handle)
            .ok_or_else(|| PipelineError::InvalidHandle(raw_handle.to_string()))?;

        let history_count = match self.cached(&handle).await? {
            CacheLookup::Fresh(outcome) => return Ok(outcome),
            CacheLookup::Miss { history_count } => history_count,
        };

        let snapshot = self.source.fetch_subject(&handle).await?;
        let bundle = extract_signals(&snapshot.meta.bio, &snapshot.posts);
        tracing::info!(
            handle = %handle,
            posts = snapshot.posts.len(),
            hashtags = bundle.hashtag_weights.len(),
            keywords = bundle.keyword_weights.len(),
            bigrams = bundle.bigram_weights.len(),
            "extracted signals"
        );

        let flags = match assess(
            &snapshot.meta,
            &bundle.interaction_summary,
            &bundle.sample_stats,
            self.clock.now(),
        ) {
            EligibilityVerdict::Eligible { flags } => flags,
            EligibilityVerdict::Rejected(rejection) => {
                tracing::info!(handle = %handle, code = rejection.code.as_str(), "account rejected");
                return Err(PipelineError::Ineligible(rejection));
            }
        };

        if bundle.is_empty() {
            return Err(PipelineError::NoSignals);
        }

        let input = AnalysisInput::new(&handle, &snapshot.meta, &bundle, &flags);
        let input_json = serde_json::to_string(&input).map_err(PipelineError::Encode)?;

        let mut profile = self.primary_stage(&input_json).await?;
        profile.ideology = match self.secondary_stage(&input, &profile).await {
            Ok(distribution) => Some(distribution),
            Err(failure) => {
                tracing::warn!(handle = %handle, error = %failure, "tendency stage omitted");
                None
            }
        };

        let value = serde_json::to_value(&profile).map_err(PipelineError::Encode)?;
        let analyzed_at = self.clock.now();
        self.store.save(&handle, value, analyzed_at).await?;

        Ok(AnalysisOutcome {
            handle,
            profile,
            meta: OutcomeMeta {
                cached: false,
                last_updated: analyzed_at,
                history_count,
                flags,
            },
        })
    }

    /// Serve the stored profile when it is younger than the cache window and
    /// still passes the current schema. A miss reports the history length the
    /// record had before this run.
    async fn cached(&self, handle: &str) -> Result<CacheLookup, PipelineError> {
        let Some(record) = self.store.get(handle).await? else {
            return Ok(CacheLookup::Miss { history_count: 0 });
        };
        let history_count = record.history.len();

        let age = self.clock.now() - record.last_analyzed_at;
        if age >= self.settings.cache_max_age {
            tracing::info!(handle, age_days = age.num_days(), "cached profile is stale");
            return Ok(CacheLookup::Miss { history_count });
        }

        let SubjectRecord {
            handle: stored_handle,
            last_analyzed_at,
            current_profile,
            ..
        } = record;
        match AnalysisProfile::from_value(current_profile) {
            Ok(profile) => {
                tracing::info!(handle, "returning cached profile");
                Ok(CacheLookup::Fresh(AnalysisOutcome {
                    handle: stored_handle,
                    profile,
                    meta: OutcomeMeta {
                        cached: true,
                        last_updated: last_analyzed_at,
                        history_count,
                        flags: Vec::new(),
                    },
                }))
            }
            Err(e) => {
                tracing::info!(handle, error = %e, "cached profile fails current schema; re-analyzing");
                Ok(CacheLookup::Miss { history_count })
            }
        }
    }

    /// Discourse-map stage with a single repair attempt.
    async fn primary_stage(&self, input_json: &str) -> Result<AnalysisProfile, PipelineError> {
        let request = CompletionRequest::new(
            prompts::primary_system_prompt(),
            input_json,
            PRIMARY_TEMPERATURE,
        );

        let raw = match self.model.complete_json(&request).await {
            Ok(raw) => raw,
            Err(ModelError::EmptyResponse) => String::new(),
            Err(e) => return Err(PipelineError::ModelUnavailable(e)),
        };

        let error = match AnalysisProfile::parse(&raw) {
            Ok(profile) => return Ok(profile),
            Err(e) => e,
        };
        tracing::warn!(error = %error, "primary output failed validation; attempting repair");

        let repair = CompletionRequest::new(
            prompts::REPAIR_SYSTEM_PROMPT,
            prompts::repair_prompt(&raw, input_json),
            REPAIR_TEMPERATURE,
        );
        let repaired = match self.model.complete_json(&repair).await {
            Ok(repaired) => repaired,
            Err(ModelError::EmptyResponse) => return Err(PipelineError::InvalidModelOutput(error)),
            Err(e) => return Err(PipelineError::ModelUnavailable(e)),
        };

        AnalysisProfile::parse(&repaired).map_err(|e| {
            tracing::error!(error = %e, "repaired output still invalid");
            PipelineError::InvalidModelOutput(e)
        })
    }

    /// Tendency-distribution stage. Best effort: any failure omits the stage.
    async fn secondary_stage(
        &self,
        input: &AnalysisInput,
        primary: &AnalysisProfile,
    ) -> Result<TendencyDistribution, StageFailure> {
        let user = serde_json::to_string(&SecondaryInput {
            signals: input,
            primary_analysis: primary,
        })
        .map_err(StageFailure::Encode)?;
        let request =
            CompletionRequest::new(prompts::TENDENCY_SYSTEM_PROMPT, user, SECONDARY_TEMPERATURE);

        let raw = self
            .model
            .complete_json(&request)
            .await
            .map_err(StageFailure::Model)?;
        TendencyDistribution::parse(&raw).map_err(StageFailure::Invalid)
    }
}
