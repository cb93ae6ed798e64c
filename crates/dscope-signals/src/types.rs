use dscope_core::InteractionType;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedTerm {
    pub term: String,
    pub weight: f64,
}

/// Per-type post counts for the sample.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionSummary {
    pub reply: u32,
    pub quote: u32,
    pub original: u32,
    pub retweet: u32,
    pub retweet_without_text: u32,
    pub total: u32,
}

/// Ratios over the sample, each in `[0, 1]` and rounded to two decimals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleStats {
    pub link_ratio: f64,
    pub hashtag_ratio: f64,
    pub retweet_ratio: f64,
    pub reply_ratio: f64,
    pub quote_ratio: f64,
    pub original_ratio: f64,
    pub unique_text_ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExampleText {
    pub interaction_type: InteractionType,
    pub text: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalCounts {
    pub keyword_terms: usize,
    pub hashtag_terms: usize,
    /// Keyword weight accumulated from posts and bio, before truncation.
    pub total_weight: f64,
}

/// Everything derived from one subject's bio and post sample.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalBundle {
    /// Hashtags in weight-descending order.
    pub hashtag_weights: Vec<WeightedTerm>,
    pub keyword_weights: Vec<WeightedTerm>,
    pub bigram_weights: Vec<WeightedTerm>,
    pub diversity_hashtags: Vec<String>,
    pub interaction_summary: InteractionSummary,
    pub sample_stats: SampleStats,
    pub example_texts: Vec<ExampleText>,
    pub signal_counts: SignalCounts,
}

impl SignalBundle {
    /// Weight recorded for `tag`, if it survived truncation.
    #[must_use]
    pub fn hashtag_weight(&self, tag: &str) -> Option<f64> {
        self.hashtag_weights
            .iter()
            .find(|entry| entry.term == tag)
            .map(|entry| entry.weight)
    }

    /// True when neither keywords nor hashtags were found; such a bundle is
    /// not worth sending to the model.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keyword_weights.is_empty() && self.hashtag_weights.is_empty()
    }
}
