//! Ordered eligibility rules applied before any model call.
//!
//! Hard rules reject and stop evaluation; soft rules only add flags. Every
//! threshold comparison is a strict `<` (or `>`), so a value sitting exactly
//! on a threshold passes.

use chrono::{DateTime, Utc};
use dscope_core::SubjectProfileMeta;
use serde::{Deserialize, Serialize};

use crate::types::{InteractionSummary, SampleStats};

const HARD_MIN_POSTS: u64 = 100;
const SOFT_MIN_POSTS: u64 = 300;
const SOFT_MAX_POSTS: u64 = 5000;
const MIN_SAMPLE: u32 = 40;
const HARD_MIN_NON_RETWEET_RATIO: f64 = 0.2;
const SOFT_MIN_NON_RETWEET_RATIO: f64 = 0.3;

const NEWS_KEYWORD_LINK_RATIO: f64 = 0.6;
const NEWS_LINK_RATIO: f64 = 0.75;
const NEWS_MAX_CONVERSATION_RATIO: f64 = 0.1;
const NEWS_MAX_RETWEET_RATIO: f64 = 0.6;

const BOT_POSTS_PER_DAY: f64 = 250.0;
const BOT_RETWEET_RATIO: f64 = 0.7;
const BOT_UNIQUE_RATIO: f64 = 0.35;

/// HTTP status carried by every eligibility rejection.
pub const REJECTION_STATUS: u16 = 422;

const NEWS_KEYWORDS: &[&str] = &[
    "news",
    "breaking",
    "press",
    "wire",
    "official",
    "tv",
    "radio",
    "daily",
    "times",
    "خبر",
    "اخبار",
    "خبرگزاری",
    "خبرنگار",
    "روزنامه",
    "رسانه",
    "شبکه",
    "خبر فوری",
];

const BOT_KEYWORDS: &[&str] = &["bot", "automation", "auto", "rss", "feed", "api"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectionCode {
    LowActivity,
    InsufficientSample,
    RetweetHeavy,
    NewsAccount,
    BotLike,
}

impl RejectionCode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LowActivity => "LowActivity",
            Self::InsufficientSample => "InsufficientSample",
            Self::RetweetHeavy => "RetweetHeavy",
            Self::NewsAccount => "NewsAccount",
            Self::BotLike => "BotLike",
        }
    }

    fn message(self) -> &'static str {
        match self {
            Self::LowActivity => "The account has fewer than 100 posts and cannot be analyzed.",
            Self::InsufficientSample => {
                "Not enough posts were sampled; more data is needed for a reliable analysis."
            }
            Self::RetweetHeavy => {
                "The account mostly reposts others and carries too little signal of its own."
            }
            Self::NewsAccount => {
                "The account looks like a news or media outlet, not a personal voice."
            }
            Self::BotLike => "The account's activity pattern resembles a bot or automated feed.",
        }
    }
}

/// Soft warnings attached to an eligible account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountFlag {
    LowSignalVolume,
    HighVolumeAccount,
    RetweetHeavy,
}

impl AccountFlag {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LowSignalVolume => "LowSignalVolume",
            Self::HighVolumeAccount => "HighVolumeAccount",
            Self::RetweetHeavy => "RetweetHeavy",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub code: RejectionCode,
    pub message: String,
}

impl Rejection {
    fn new(code: RejectionCode) -> Self {
        Self {
            code,
            message: code.message().to_string(),
        }
    }

    #[must_use]
    pub fn http_status(&self) -> u16 {
        REJECTION_STATUS
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EligibilityVerdict {
    Eligible { flags: Vec<AccountFlag> },
    Rejected(Rejection),
}

impl EligibilityVerdict {
    #[must_use]
    pub fn is_eligible(&self) -> bool {
        matches!(self, Self::Eligible { .. })
    }
}

/// Decide whether an account is worth analyzing.
///
/// `now` anchors the posts-per-day estimate derived from account age.
#[must_use]
pub fn assess(
    meta: &SubjectProfileMeta,
    summary: &InteractionSummary,
    stats: &SampleStats,
    now: DateTime<Utc>,
) -> EligibilityVerdict {
    let mut flags = Vec::new();

    if let Some(count) = meta.post_count {
        if count < HARD_MIN_POSTS {
            return EligibilityVerdict::Rejected(Rejection::new(RejectionCode::LowActivity));
        }
        if count < SOFT_MIN_POSTS {
            flags.push(AccountFlag::LowSignalVolume);
        }
        if count > SOFT_MAX_POSTS {
            flags.push(AccountFlag::HighVolumeAccount);
        }
    }

    if summary.total < MIN_SAMPLE {
        return EligibilityVerdict::Rejected(Rejection::new(RejectionCode::InsufficientSample));
    }

    let non_retweet = f64::from(summary.reply + summary.quote + summary.original)
        / f64::from(summary.total.max(1));
    if non_retweet < HARD_MIN_NON_RETWEET_RATIO {
        return EligibilityVerdict::Rejected(Rejection::new(RejectionCode::RetweetHeavy));
    }
    if non_retweet < SOFT_MIN_NON_RETWEET_RATIO {
        flags.push(AccountFlag::RetweetHeavy);
    }

    let identity = identity_text(meta);

    if looks_like_news(&identity, stats) {
        return EligibilityVerdict::Rejected(Rejection::new(RejectionCode::NewsAccount));
    }

    if looks_like_bot(&identity, stats, posts_per_day(meta, now)) {
        return EligibilityVerdict::Rejected(Rejection::new(RejectionCode::BotLike));
    }

    EligibilityVerdict::Eligible { flags }
}

/// Handle and bio joined, lower-cased, with whitespace collapsed.
fn identity_text(meta: &SubjectProfileMeta) -> String {
    format!("{} {}", meta.handle, meta.bio)
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn looks_like_news(identity: &str, stats: &SampleStats) -> bool {
    let has_keyword = NEWS_KEYWORDS.iter().any(|k| identity.contains(k));
    let conversation = stats.reply_ratio + stats.quote_ratio;

    (has_keyword && stats.link_ratio >= NEWS_KEYWORD_LINK_RATIO)
        || (stats.link_ratio >= NEWS_LINK_RATIO
            && conversation < NEWS_MAX_CONVERSATION_RATIO
            && stats.retweet_ratio < NEWS_MAX_RETWEET_RATIO)
}

fn looks_like_bot(identity: &str, stats: &SampleStats, posts_per_day: Option<f64>) -> bool {
    if BOT_KEYWORDS.iter().any(|k| identity.contains(k)) {
        return true;
    }
    posts_per_day.is_some_and(|rate| {
        rate > BOT_POSTS_PER_DAY
            && stats.retweet_ratio > BOT_RETWEET_RATIO
            && stats.unique_text_ratio < BOT_UNIQUE_RATIO
    })
}

/// Lifetime posting rate, with account age floored at one day.
#[allow(clippy::cast_precision_loss)]
fn posts_per_day(meta: &SubjectProfileMeta, now: DateTime<Utc>) -> Option<f64> {
    let created = meta.account_created_at?;
    let count = meta.post_count.filter(|&c| c > 0)?;
    let age_days = ((now - created).num_seconds() as f64 / 86_400.0).max(1.0);
    Some(count as f64 / age_days)
}
