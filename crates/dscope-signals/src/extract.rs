//! Weighted signal extraction over a bio and a post sample.

use std::collections::HashSet;

use dscope_core::{InteractionType, Post};

use crate::text::{clean_text, extract_hashtags, tokenize, uniqueness_key};
use crate::types::{ExampleText, InteractionSummary, SampleStats, SignalBundle, SignalCounts};
use crate::weights::{round2, WeightedCounter};

pub const MAX_KEYWORDS: usize = 40;
pub const MAX_BIGRAMS: usize = 25;
pub const MAX_HASHTAGS: usize = 30;
pub const MAX_DIVERSITY_HASHTAGS: usize = 25;
pub const MAX_EXAMPLES: usize = 8;

/// Bigrams count for less than the single tokens they are made of.
pub const BIGRAM_FACTOR: f64 = 0.7;

/// Weight of each bio hashtag and bio token.
pub const BIO_WEIGHT: f64 = 2.0;

/// Engagement weight: replies and quotes say more about a subject than
/// originals, and plain retweets say least.
#[must_use]
pub fn interaction_weight(kind: InteractionType) -> f64 {
    match kind {
        InteractionType::Reply => 3.0,
        InteractionType::Quote => 2.0,
        InteractionType::Original => 1.0,
        InteractionType::Retweet => 0.5,
    }
}

/// Reduce a bio and post sample to a [`SignalBundle`].
///
/// Deterministic for identical input. Works on an empty sample, where every
/// ratio is zero and every collection is empty.
#[must_use]
pub fn extract_signals(bio: &str, posts: &[Post]) -> SignalBundle {
    let mut hashtags = WeightedCounter::default();
    let mut keywords = WeightedCounter::default();
    let mut bigrams = WeightedCounter::default();
    let mut diversity = WeightedCounter::default();
    let mut examples: Vec<(f64, ExampleText)> = Vec::new();
    let mut unique_texts: HashSet<String> = HashSet::new();

    let mut summary = InteractionSummary::default();
    let mut with_links = 0_u32;
    let mut with_hashtags = 0_u32;
    let mut total_weight = 0.0_f64;

    for post in posts {
        let weight = interaction_weight(post.interaction_type);
        let lexical_weight = if post.is_retweet_without_own_text {
            0.0
        } else {
            weight
        };

        match post.interaction_type {
            InteractionType::Reply => summary.reply += 1,
            InteractionType::Quote => summary.quote += 1,
            InteractionType::Original => summary.original += 1,
            InteractionType::Retweet => summary.retweet += 1,
        }
        if post.is_retweet_without_own_text {
            summary.retweet_without_text += 1;
        }
        if post.has_links {
            with_links += 1;
        }

        let tags = if post.hashtags.is_empty() {
            extract_hashtags(&post.text)
        } else {
            post.hashtags.clone()
        };
        if !tags.is_empty() {
            with_hashtags += 1;
        }

        if !post.text.is_empty() {
            unique_texts.insert(uniqueness_key(&post.text));
        }

        let tag_target = if post.is_retweet_without_own_text {
            &mut diversity
        } else {
            &mut hashtags
        };
        for tag in &tags {
            tag_target.add(tag, weight);
        }

        if lexical_weight > 0.0 {
            let tokens = tokenize(&clean_text(&post.text));
            for token in &tokens {
                keywords.add(token, lexical_weight);
                total_weight += lexical_weight;
            }
            for pair in tokens.windows(2) {
                bigrams.add(&format!("{} {}", pair[0], pair[1]), lexical_weight * BIGRAM_FACTOR);
            }
            if !tokens.is_empty() {
                examples.push((
                    lexical_weight,
                    ExampleText {
                        interaction_type: post.interaction_type,
                        text: post.text.clone(),
                    },
                ));
            }
        }
    }

    for tag in extract_hashtags(bio) {
        hashtags.add(&tag, BIO_WEIGHT);
    }
    for token in tokenize(&clean_text(bio)) {
        keywords.add(&token, BIO_WEIGHT);
        total_weight += BIO_WEIGHT;
    }

    summary.total = u32::try_from(posts.len()).unwrap_or(u32::MAX);

    let denominator = f64::from(summary.total.max(1));
    let ratio = |count: u32| round2(f64::from(count) / denominator);
    let unique_count = u32::try_from(unique_texts.len()).unwrap_or(u32::MAX);
    let sample_stats = SampleStats {
        link_ratio: ratio(with_links),
        hashtag_ratio: ratio(with_hashtags),
        retweet_ratio: ratio(summary.retweet),
        reply_ratio: ratio(summary.reply),
        quote_ratio: ratio(summary.quote),
        original_ratio: ratio(summary.original),
        unique_text_ratio: ratio(unique_count),
    };

    examples.sort_by(|a, b| b.0.total_cmp(&a.0));
    let example_texts = examples
        .into_iter()
        .take(MAX_EXAMPLES)
        .map(|(_, example)| example)
        .collect();

    let keyword_weights = keywords.into_top(MAX_KEYWORDS);
    let hashtag_weights = hashtags.into_top(MAX_HASHTAGS);
    let diversity_hashtags = diversity
        .into_top(MAX_DIVERSITY_HASHTAGS)
        .into_iter()
        .map(|entry| entry.term)
        .collect();

    SignalBundle {
        signal_counts: SignalCounts {
            keyword_terms: keyword_weights.len(),
            hashtag_terms: hashtag_weights.len(),
            total_weight: round2(total_weight),
        },
        hashtag_weights,
        keyword_weights,
        bigram_weights: bigrams.into_top(MAX_BIGRAMS),
        diversity_hashtags,
        interaction_summary: summary,
        sample_stats,
        example_texts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(id: &str, kind: InteractionType, text: &str) -> Post {
        Post {
            interaction_type: kind,
            ..Post::original(id, text)
        }
    }

    fn retweet_without_text(id: &str, hashtags: &[&str]) -> Post {
        Post {
            id: id.to_string(),
            text: String::new(),
            interaction_type: InteractionType::Retweet,
            hashtags: hashtags.iter().map(ToString::to_string).collect(),
            has_links: false,
            is_retweet_without_own_text: true,
        }
    }

    #[test]
    fn empty_sample_yields_zero_ratios() {
        let bundle = extract_signals("", &[]);
        assert!(bundle.is_empty());
        assert!(bundle.bigram_weights.is_empty());
        assert!(bundle.example_texts.is_empty());
        assert_eq!(bundle.interaction_summary.total, 0);
        assert_eq!(bundle.sample_stats, SampleStats::default());
        assert!(!bundle.sample_stats.unique_text_ratio.is_nan());
    }

    #[test]
    fn reply_keywords_weigh_three() {
        let bundle = extract_signals("", &[post("1", InteractionType::Reply, "inflation wages")]);
        assert_eq!(bundle.keyword_weights[0].term, "inflation");
        assert!((bundle.keyword_weights[0].weight - 3.0).abs() < f64::EPSILON);
        assert_eq!(bundle.bigram_weights[0].term, "inflation wages");
        assert!((bundle.bigram_weights[0].weight - 2.1).abs() < f64::EPSILON);
    }

    #[test]
    fn retweet_without_text_feeds_only_diversity() {
        let posts = vec![
            retweet_without_text("1", &["#elsewhere"]),
            post("2", InteractionType::Original, "housing prices"),
        ];
        let bundle = extract_signals("", &posts);
        assert_eq!(bundle.diversity_hashtags, vec!["#elsewhere"]);
        assert!(bundle.hashtag_weight("#elsewhere").is_none());
        assert_eq!(bundle.interaction_summary.retweet_without_text, 1);
        assert!(bundle.keyword_weights.iter().all(|k| k.term != "elsewhere"));
    }

    #[test]
    fn hashtags_fall_back_to_inline_text() {
        let bundle = extract_signals("", &[post("1", InteractionType::Quote, "look #Budget")]);
        assert_eq!(bundle.hashtag_weight("#Budget"), Some(2.0));
        assert!((bundle.sample_stats.hashtag_ratio - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn bio_terms_add_fixed_weight() {
        let bundle = extract_signals("economist #jobs", &[]);
        assert_eq!(bundle.hashtag_weight("#jobs"), Some(BIO_WEIGHT));
        assert_eq!(bundle.keyword_weights[0].term, "economist");
        assert!((bundle.signal_counts.total_weight - BIO_WEIGHT).abs() < f64::EPSILON);
    }

    #[test]
    fn examples_are_highest_weight_first_and_capped() {
        let mut posts: Vec<Post> = (0..10)
            .map(|i| post(&i.to_string(), InteractionType::Original, "plain words"))
            .collect();
        posts.push(post("r", InteractionType::Reply, "reply words"));
        let bundle = extract_signals("", &posts);
        assert_eq!(bundle.example_texts.len(), MAX_EXAMPLES);
        assert_eq!(bundle.example_texts[0].interaction_type, InteractionType::Reply);
    }

    #[test]
    fn posts_with_only_stopwords_are_not_examples() {
        let bundle = extract_signals("", &[post("1", InteractionType::Original, "the and for")]);
        assert!(bundle.example_texts.is_empty());
        assert!(bundle.keyword_weights.is_empty());
    }

    #[test]
    fn duplicate_texts_lower_uniqueness() {
        let posts = vec![
            post("1", InteractionType::Original, "same message"),
            post("2", InteractionType::Original, "Same message!"),
            post("3", InteractionType::Original, "different message"),
            post("4", InteractionType::Original, "different message"),
        ];
        let bundle = extract_signals("", &posts);
        assert!((bundle.sample_stats.unique_text_ratio - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn keywords_are_truncated_to_limit() {
        let words: Vec<String> = ('a'..='h')
            .flat_map(|a| ('a'..='h').map(move |b| format!("term{a}{b}")))
            .collect();
        let bundle = extract_signals("", &[post("1", InteractionType::Original, &words.join(" "))]);
        assert_eq!(bundle.keyword_weights.len(), MAX_KEYWORDS);
        assert_eq!(bundle.keyword_weights[0].term, "termaa");
        assert_eq!(bundle.bigram_weights.len(), MAX_BIGRAMS);
    }
}
