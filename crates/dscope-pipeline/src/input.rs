//! The JSON document sent to the model as the user message of every stage.

use chrono::SecondsFormat;
use dscope_core::{InteractionType, SubjectProfileMeta};
use dscope_signals::{AccountFlag, InteractionSummary, SampleStats, SignalBundle, SignalCounts};
use serde::Serialize;

const MAX_COMMENT_SAMPLES: usize = 4;

#[derive(Debug, Serialize)]
pub struct AnalysisInput {
    pub account: AccountSummary,
    /// `[tag, weight]` pairs, heaviest first.
    pub weighted_hashtags: Vec<(String, f64)>,
    pub weighted_keywords: Vec<WeightedKeyword>,
    pub weighted_bigrams: Vec<WeightedPhrase>,
    pub diversity_hashtags: Vec<String>,
    pub example_tweets: Vec<ExampleTweet>,
    pub comment_samples: Vec<CommentSample>,
    pub signal_summary: SignalCounts,
}

#[derive(Debug, Serialize)]
pub struct AccountSummary {
    pub username: String,
    pub tweet_count: Option<u64>,
    pub sample_size: u32,
    pub created_at: Option<String>,
    pub flags: Vec<AccountFlag>,
    pub interaction_summary: InteractionSummary,
    pub sample_stats: SampleStats,
}

#[derive(Debug, Serialize)]
pub struct WeightedKeyword {
    pub term: String,
    pub weight: f64,
}

#[derive(Debug, Serialize)]
pub struct WeightedPhrase {
    pub phrase: String,
    pub weight: f64,
}

#[derive(Debug, Serialize)]
pub struct ExampleTweet {
    #[serde(rename = "type")]
    pub kind: InteractionType,
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct CommentSample {
    pub text: String,
}

impl AnalysisInput {
    #[must_use]
    pub fn new(
        handle: &str,
        meta: &SubjectProfileMeta,
        bundle: &SignalBundle,
        flags: &[AccountFlag],
    ) -> Self {
        Self {
            account: AccountSummary {
                username: handle.to_string(),
                tweet_count: meta.post_count,
                sample_size: bundle.interaction_summary.total,
                created_at: meta
                    .account_created_at
                    .map(|at| at.to_rfc3339_opts(SecondsFormat::Secs, true)),
                flags: flags.to_vec(),
                interaction_summary: bundle.interaction_summary,
                sample_stats: bundle.sample_stats,
            },
            weighted_hashtags: bundle
                .hashtag_weights
                .iter()
                .map(|entry| (entry.term.clone(), entry.weight))
                .collect(),
            weighted_keywords: bundle
                .keyword_weights
                .iter()
                .map(|entry| WeightedKeyword {
                    term: entry.term.clone(),
                    weight: entry.weight,
                })
                .collect(),
            weighted_bigrams: bundle
                .bigram_weights
                .iter()
                .map(|entry| WeightedPhrase {
                    phrase: entry.term.clone(),
                    weight: entry.weight,
                })
                .collect(),
            diversity_hashtags: bundle.diversity_hashtags.clone(),
            example_tweets: bundle
                .example_texts
                .iter()
                .map(|example| ExampleTweet {
                    kind: example.interaction_type,
                    text: example.text.clone(),
                })
                .collect(),
            comment_samples: bundle
                .example_texts
                .iter()
                .filter(|example| example.interaction_type == InteractionType::Reply)
                .take(MAX_COMMENT_SAMPLES)
                .map(|example| CommentSample {
                    text: example.text.clone(),
                })
                .collect(),
            signal_summary: bundle.signal_counts,
        }
    }
}
