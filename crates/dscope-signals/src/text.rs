//! Text normalisation and tokenisation for Latin and Persian script.

use std::sync::LazyLock;

use regex::Regex;

/// English function words and URL fragments that carry no discourse signal.
pub(crate) const STOPWORDS_EN: &[&str] = &[
    "the", "and", "for", "that", "with", "this", "you", "your", "are", "but", "not", "have", "has",
    "had", "was", "were", "from", "they", "them", "their", "what", "when", "where", "which",
    "will", "would", "could", "should", "into", "onto", "about", "there", "here", "our", "out",
    "who", "why", "how", "all", "any", "can", "cant", "cannot", "its", "just", "like", "more",
    "most", "than", "over", "under", "been", "being", "because", "also", "only", "some", "such",
    "via", "http", "https", "com", "co", "www", "rt",
];

/// Persian function words.
pub(crate) const STOPWORDS_FA: &[&str] = &[
    "و", "در", "به", "از", "که", "این", "آن", "برای", "با", "است", "بود", "می", "شود", "شد", "ها",
    "های", "یک", "نه", "یا", "اما", "اگر", "هم", "همه", "روی", "تا", "همین", "چون", "باید", "نیست",
    "هست", "بودن", "کرد", "کردن", "کرده", "شده", "شما", "ما", "من", "او", "آنها", "ایشان", "همان",
    "مثل", "وضع", "بین", "پس", "قبل", "بعد", "ضمن", "هر", "هیچ", "دیگر",
];

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)https?://\S+").expect("valid regex"));

static MENTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@[A-Za-z0-9_]+").expect("valid regex"));

static HASHTAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#[A-Za-z0-9_\x{0600}-\x{06FF}]+").expect("valid regex"));

static PUNCT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_\x{0600}-\x{06FF}\s]").expect("valid regex"));

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z]{2,}|[\x{0600}-\x{06FF}]{2,}").expect("valid regex")
});

/// Fold Arabic-script letter variants onto their Persian forms.
#[must_use]
pub fn normalize_script(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'ي' => 'ی',
            'ك' => 'ک',
            'ۀ' => 'ه',
            'أ' | 'إ' => 'ا',
            'ؤ' => 'و',
            other => other,
        })
        .collect()
}

/// Normalise script, drop URLs, mentions, hashtags and punctuation, and
/// collapse whitespace.
#[must_use]
pub fn clean_text(text: &str) -> String {
    let normalized = normalize_script(text);
    let stripped = URL_RE.replace_all(&normalized, " ");
    let stripped = MENTION_RE.replace_all(&stripped, " ");
    let stripped = HASHTAG_RE.replace_all(&stripped, " ");
    let stripped = PUNCT_RE.replace_all(&stripped, " ");
    WHITESPACE_RE.replace_all(&stripped, " ").trim().to_string()
}

/// Split cleaned text into lower-cased word tokens, dropping stopwords.
#[must_use]
pub fn tokenize(cleaned: &str) -> Vec<String> {
    TOKEN_RE
        .find_iter(cleaned)
        .map(|m| m.as_str().to_lowercase())
        .filter(|token| !is_stopword(token))
        .collect()
}

/// Hashtags (with `#`) found inline in raw text, in order of appearance.
#[must_use]
pub fn extract_hashtags(text: &str) -> Vec<String> {
    HASHTAG_RE
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Key used to count distinct post texts.
#[must_use]
pub fn uniqueness_key(text: &str) -> String {
    clean_text(text).to_lowercase()
}

fn is_stopword(token: &str) -> bool {
    STOPWORDS_EN.contains(&token) || STOPWORDS_FA.contains(&token)
}
