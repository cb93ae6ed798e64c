use std::collections::HashMap;

use crate::types::WeightedTerm;

/// Accumulates weights per term while remembering first-seen order, so that
/// truncation breaks ties deterministically.
#[derive(Debug, Default)]
pub(crate) struct WeightedCounter {
    entries: Vec<(String, f64)>,
    index: HashMap<String, usize>,
}

impl WeightedCounter {
    pub(crate) fn add(&mut self, term: &str, weight: f64) {
        if let Some(&slot) = self.index.get(term) {
            self.entries[slot].1 += weight;
        } else {
            self.index.insert(term.to_string(), self.entries.len());
            self.entries.push((term.to_string(), weight));
        }
    }

    pub(crate) fn contains(&self, term: &str) -> bool {
        self.index.contains_key(term)
    }

    /// Top `limit` terms by weight descending; ties keep first-seen order.
    /// Weights are rounded to two decimals.
    pub(crate) fn into_top(self, limit: usize) -> Vec<WeightedTerm> {
        let mut entries = self.entries;
        // `sort_by` is stable, which preserves first-seen order among equal weights.
        entries.sort_by(|a, b| b.1.total_cmp(&a.1));
        entries
            .into_iter()
            .take(limit)
            .map(|(term, weight)| WeightedTerm {
                term,
                weight: round2(weight),
            })
            .collect()
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulates_repeated_terms() {
        let mut counter = WeightedCounter::default();
        counter.add("a", 1.0);
        counter.add("a", 0.5);
        let top = counter.into_top(10);
        assert_eq!(top.len(), 1);
        assert!((top[0].weight - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn ties_keep_first_seen_order() {
        let mut counter = WeightedCounter::default();
        counter.add("late", 1.0);
        counter.add("heavy", 3.0);
        counter.add("later", 1.0);
        let terms: Vec<_> = counter.into_top(10).into_iter().map(|t| t.term).collect();
        assert_eq!(terms, vec!["heavy", "late", "later"]);
    }

    #[test]
    fn truncates_to_limit() {
        let mut counter = WeightedCounter::default();
        for i in 0..10 {
            counter.add(&format!("t{i}"), f64::from(i));
        }
        let top = counter.into_top(3);
        assert_eq!(top.len(), 3);
        assert_eq!(top[0].term, "t9");
    }

    #[test]
    fn round2_rounds_to_two_decimals() {
        assert!((round2(0.7 * 3.0) - 2.1).abs() < f64::EPSILON);
        assert!((round2(1.234_56) - 1.23).abs() < f64::EPSILON);
    }
}
