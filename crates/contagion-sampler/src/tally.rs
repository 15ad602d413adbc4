use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A set of node labels sampled together, with how often it came up
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combination {
    pub nodes: Vec<String>,
    pub count: usize,
}

/// Frequency count of sampled node combinations.
///
/// Combinations are keyed by their sorted labels, so the draw order within a
/// trial does not matter. Ties go to the combination recorded first.
#[derive(Clone, Debug, Default)]
pub struct CombinationTally {
    counts: HashMap<Vec<String>, (usize, usize)>, // combination -> (count, first seen)
    recorded: usize,
}

impl CombinationTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record<S: AsRef<str>>(&mut self, labels: &[S]) {
        let mut key: Vec<String> = labels.iter().map(|l| l.as_ref().to_string()).collect();
        key.sort();
        let order = self.recorded;
        self.counts.entry(key).or_insert((0, order)).0 += 1;
        self.recorded += 1;
    }

    /// Number of combinations recorded, duplicates included
    pub fn total(&self) -> usize {
        self.recorded
    }

    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    pub fn most_common(&self) -> Option<Combination> {
        self.counts
            .iter()
            .max_by(|(_, (ca, fa)), (_, (cb, fb))| ca.cmp(cb).then(fb.cmp(fa)))
            .map(|(nodes, &(count, _))| Combination {
                nodes: nodes.clone(),
                count,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_most_common_ignores_draw_order() {
        let mut tally = CombinationTally::new();
        tally.record(&["H2", "E15", "H3"]);
        tally.record(&["E16", "EN1", "H5"]);
        tally.record(&["H3", "H2", "E15"]);

        let best = tally.most_common().unwrap();
        assert_eq!(best.nodes, vec!["E15", "H2", "H3"]);
        assert_eq!(best.count, 2);
        assert_eq!(tally.total(), 3);
        assert_eq!(tally.distinct(), 2);
    }

    #[test]
    fn test_tie_goes_to_first_seen() {
        let mut tally = CombinationTally::new();
        tally.record(&["B"]);
        tally.record(&["A"]);
        tally.record(&["A"]);
        tally.record(&["B"]);
        assert_eq!(tally.most_common().unwrap().nodes, vec!["B"]);
    }

    #[test]
    fn test_empty() {
        assert!(CombinationTally::new().most_common().is_none());
    }
}
