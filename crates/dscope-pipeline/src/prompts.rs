//! Prompt text for the primary, repair and tendency stages.

use std::fmt::Write as _;

struct DiscourseCategory {
    key: char,
    name: &'static str,
    scope: &'static str,
    signals: &'static [&'static str],
}

const DISCOURSE_MAP: &[DiscourseCategory] = &[
    DiscourseCategory {
        key: 'A',
        name: "Structural Change",
        scope: "System overhaul, regime change, radical restructuring, constitutional reset",
        signals: &[
            "revolution",
            "overthrow",
            "regime change",
            "collapse the system",
            "structural reform",
            "constitution",
            "dismantle",
            "end the system",
            "transition",
            "post-regime",
        ],
    },
    DiscourseCategory {
        key: 'B',
        name: "Reform & Development",
        scope: "Policy reform, institution building, elections, gradual change, governance quality",
        signals: &[
            "reform",
            "policy",
            "election",
            "institutional",
            "governance",
            "development",
            "transparency",
            "accountability",
            "anti-corruption",
            "public services",
        ],
    },
    DiscourseCategory {
        key: 'C',
        name: "Resistance / Ideology",
        scope: "Identity, ideology, resistance language, religious or nationalist framing",
        signals: &[
            "resistance",
            "ideology",
            "faith",
            "martyr",
            "identity",
            "anti-imperial",
            "anti-west",
            "revolutionary values",
            "tradition",
            "cultural purity",
        ],
    },
    DiscourseCategory {
        key: 'D',
        name: "Livelihood / Economy",
        scope: "Cost of living, jobs, inflation, currency, sanctions impact, daily life",
        signals: &[
            "inflation",
            "jobs",
            "wages",
            "housing",
            "currency",
            "sanctions",
            "prices",
            "livelihood",
            "poverty",
            "economic hardship",
        ],
    },
];

const OPERATIONAL_RULES: &[&str] = &[
    "Use weighted signals: higher weights mean stronger evidence.",
    "Retweets without added text do NOT count as core signals; they only hint at diversity.",
    "If signals are sparse or repetitive, reduce confidence and keep clusters minimal.",
    "Do not infer identity or personal belief; describe discourse patterns only.",
    "Avoid generic summaries; cite concrete signals from the input.",
];

/// Shape the primary stage (and its repair) must return.
pub const PRIMARY_SCHEMA: &str = r##"{
  "status": "success",
  "analysis_meta": {
    "total_signals_processed": 0,
    "primary_focus_area": "A|B|C|D|Mixed",
    "confidence_score": 0
  },
  "axis_scores": {
    "authority_orientation": { "value": 0, "confidence": "Low|Medium|High", "evidence": ["signal"] },
    "liberty_orientation": { "value": 0, "confidence": "Low|Medium|High", "evidence": ["signal"] },
    "ingroup_outgroup": { "value": 0, "confidence": "Low|Medium|High", "evidence": ["signal"] },
    "conflict_tolerance": { "value": 0, "confidence": "Low|Medium|High", "evidence": ["signal"] }
  },
  "dominant_tendency": {
    "label": "String",
    "explanation": "String"
  },
  "discourse_clusters": [
    {
      "cluster_name": "String",
      "mapped_category": "A|B|C|D",
      "description": "String",
      "associated_signals": ["#tag1", "keyword", "phrase"],
      "engagement_level": "Low|Medium|High"
    }
  ],
  "discourse_diversity": {
    "rating": "Echo Chamber|Focused|Balanced|Chaotic",
    "explanation": "String"
  },
  "user_facing_disclaimer": "String"
}"##;

const INPUT_FORMAT: &str = r##"{
  "account": {
    "username": "string",
    "tweet_count": number,
    "sample_size": number,
    "created_at": "ISO or null",
    "flags": ["string"],
    "interaction_summary": {
      "reply": number, "quote": number, "original": number, "retweet": number,
      "retweet_without_text": number, "total": number
    },
    "sample_stats": {
      "link_ratio": number, "hashtag_ratio": number, "retweet_ratio": number,
      "reply_ratio": number, "quote_ratio": number, "original_ratio": number,
      "unique_text_ratio": number
    }
  },
  "weighted_hashtags": [["#tag", number]],
  "weighted_keywords": [{ "term": "string", "weight": number }],
  "weighted_bigrams": [{ "phrase": "string", "weight": number }],
  "diversity_hashtags": ["#tag1", "#tag2"],
  "example_tweets": [{ "type": "reply|quote|original|retweet", "text": "string" }],
  "comment_samples": [{ "text": "string" }],
  "signal_summary": { "keyword_terms": number, "hashtag_terms": number, "total_weight": number }
}"##;

const GUIDANCE: &[&str] = &[
    "Use weighted signals to form clusters; weights indicate strength.",
    "If data is repetitive or low volume, lower confidence and return fewer clusters.",
    "Use diversity_hashtags only to adjust diversity rating.",
    "Prefer 2-4 clusters; avoid generic clusters without concrete signals.",
    "Set total_signals_processed using signal_summary.total_weight (rounded) or keyword/hashtag term counts if needed.",
    "Dominant tendency should summarize which axis/cluster is most pronounced and why.",
    "Prioritize reply/quote examples (comments) when citing evidence.",
    "Assume the sample includes up to 300 recent tweets unless account.sample_size says otherwise.",
    "Keep `primary_focus_area` limited to A|B|C|D|Mixed only; other text fields should be Persian.",
];

/// System prompt for the primary discourse-map stage.
#[must_use]
pub fn primary_system_prompt() -> String {
    let mut prompt = String::from(
        "You are an analytical engine that maps public discourse signals into four categories (A-D).\n\
         You DO NOT judge individuals. You describe observable discourse patterns only.\n\
         All narrative text fields must be in Persian (Farsi).\n\n\
         ### REFERENCE DISCOURSE MAP (Clusters)\n",
    );

    for (i, category) in DISCOURSE_MAP.iter().enumerate() {
        if i > 0 {
            prompt.push('\n');
        }
        let _ = write!(
            prompt,
            "**{}. {}**\n- Scope: {}\n- Signals: {}\n",
            category.key,
            category.name,
            category.scope,
            category.signals.join(", ")
        );
    }

    prompt.push_str("\n### OPERATIONAL RULES\n");
    for rule in OPERATIONAL_RULES {
        let _ = writeln!(prompt, "- {rule}");
    }
    prompt.push_str(
        "Weights already reflect interaction types (Reply=3, Quote=2, Original=1, Retweet=0.5).\n\n\
         ### AXIS DEFINITIONS (A-D)\n\
         - A. Authority Orientation: -10 (anti-authority) to +10 (authoritarian). Look for support of force, suppression, or prioritizing order above rights.\n\
         - B. Liberty Orientation: -10 (liberty low priority) to +10 (liberty first). Look for emphasis on rights, free speech, anti-censorship, anti-compulsion.\n\
         - C. Ingroup vs Outgroup: -10 (cosmopolitan/inclusive) to +10 (tribal/exclusionary). Look for us-vs-them, dehumanization, purity tests.\n\
         - D. Conflict Tolerance: -10 (anti-violence) to +10 (pro-conflict). Look for escalation rhetoric vs de-escalation.\n\n\
         ### INPUT FORMAT (JSON)\n",
    );
    prompt.push_str(INPUT_FORMAT);
    prompt.push_str(
        "\n\n### OUTPUT FORMAT (JSON ONLY)\n\
         Return a valid JSON object matching this schema exactly (no markdown):\n\n",
    );
    prompt.push_str(PRIMARY_SCHEMA);
    prompt.push_str("\n\nGuidance:\n");
    for line in GUIDANCE {
        let _ = writeln!(prompt, "- {line}");
    }
    prompt.trim_end().to_string()
}

pub const REPAIR_SYSTEM_PROMPT: &str = "You output strict JSON only.";

/// User message for the single repair attempt after a malformed primary output.
#[must_use]
pub fn repair_prompt(raw_output: &str, input_payload: &str) -> String {
    [
        "You are a strict JSON repair tool.",
        "Return ONLY valid JSON that matches this schema exactly:",
        PRIMARY_SCHEMA,
        "If fields are missing, infer them from the input; if uncertain, use safe defaults.",
        "Do not add extra keys. Do not include markdown.",
        "",
        "Input payload:",
        input_payload,
        "",
        "Raw model output:",
        raw_output,
    ]
    .join("\n")
}

/// System prompt for the secondary tendency-distribution stage.
pub const TENDENCY_SYSTEM_PROMPT: &str = r#"You are generating an IDEOLOGICAL DISCOURSE TENDENCY MAP.

This output does NOT identify political identity.
It estimates the likelihood of engagement with various
IDEOLOGICAL DISCOURSE SPACES based on observed behavior.

========================
CRITICAL RULES
========================
- Do NOT label the user as left, right, extremist, etc.
- Describe tendencies as probabilistic and overlapping.
- Avoid moral judgment or evaluative language.
- Multiple ideological tendencies may coexist.

========================
IDEOLOGICAL SPACES (MANDATORY SET)
========================
- Progressive / Left-Oriented Discourse
- Center-Left Reformist Discourse
- Pragmatic Center Discourse
- Center-Right / Conservative Discourse
- National-Oriented Right Discourse
- Radical Left Discourse Tendencies
- Radical Right Discourse Tendencies

========================
YOUR TASKS
========================
1. Estimate the relative presence of each ideological discourse space
   as a percentage (total = 100).
2. Ensure that extreme categories remain bounded unless evidence is strong.
3. Provide a short neutral explanation of what this distribution suggests
   about discourse exposure and engagement.

========================
OUTPUT FORMAT (JSON ONLY)
========================
{
  "chart_title": "Ideological Discourse Tendencies",
  "tendencies": {
    "progressive_left": 0,
    "center_left_reformist": 0,
    "pragmatic_center": 0,
    "center_right_conservative": 0,
    "national_right": 0,
    "radical_left": 0,
    "radical_right": 0
  },
  "confidence": "Low | Medium | High",
  "interpretation": "Neutral explanation of discourse tendencies without identity attribution.",
  "disclaimer": "This chart reflects probabilistic discourse engagement patterns, not political identity or belief."
}"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_prompt_lists_every_category_and_the_schema() {
        let prompt = primary_system_prompt();
        for heading in [
            "**A. Structural Change**",
            "**B. Reform & Development**",
            "**C. Resistance / Ideology**",
            "**D. Livelihood / Economy**",
        ] {
            assert!(prompt.contains(heading), "missing {heading}");
        }
        assert!(prompt.contains("- Signals: inflation, jobs, wages"));
        assert!(prompt.contains("\"user_facing_disclaimer\": \"String\""));
        assert!(prompt.ends_with("other text fields should be Persian."));
    }

    #[test]
    fn repair_prompt_carries_input_and_raw_output() {
        let prompt = repair_prompt("{broken", "{\"account\":{}}");
        assert!(prompt.starts_with("You are a strict JSON repair tool."));
        assert!(prompt.contains("Input payload:\n{\"account\":{}}"));
        assert!(prompt.ends_with("Raw model output:\n{broken"));
    }
}
