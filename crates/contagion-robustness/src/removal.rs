use crate::global_efficiency_without;
use contagion_core::{ContagionError, Network, Result, F};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Nodes to remove, in order, under a strategy label
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovalOrdering {
    pub label: String,
    pub nodes: Vec<String>,
}

impl RemovalOrdering {
    pub fn new<S: Into<String>>(label: impl Into<String>, nodes: impl IntoIterator<Item = S>) -> Self {
        Self {
            label: label.into(),
            nodes: nodes.into_iter().map(Into::into).collect(),
        }
    }
}

/// Efficiency after removing the first `k` nodes of an ordering, for `k = 0..=len`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RobustnessCurve {
    pub values: Vec<F>,
}

impl RobustnessCurve {
    pub fn initial(&self) -> F {
        self.values.first().copied().unwrap_or(0.0)
    }

    pub fn final_value(&self) -> F {
        self.values.last().copied().unwrap_or(0.0)
    }

    /// Fraction of the initial efficiency lost by the end of the ordering
    pub fn relative_loss(&self) -> F {
        let initial = self.initial();
        if initial <= 0.0 {
            return 0.0;
        }
        (initial - self.final_value()) / initial
    }

    /// Area under the curve, one unit per removed node (trapezoid rule)
    pub fn area(&self) -> F {
        self.values.windows(2).map(|w| 0.5 * (w[0] + w[1])).sum()
    }
}

/// Efficiency curve of one ordering against `network`.
///
/// Each prefix is evaluated on its own removal mask, so the base network is
/// never modified. An empty network gives the single-point curve `[0.0]`.
pub fn efficiency_over_removal<S: AsRef<str>>(network: &Network, ordering: &[S]) -> Result<RobustnessCurve> {
    if network.is_empty() {
        return Ok(RobustnessCurve { values: vec![0.0] });
    }
    let ids = network.resolve(ordering)?;

    let values = (0..=ids.len())
        .into_par_iter()
        .map(|k| {
            let mut removed = vec![false; network.len()];
            for &id in &ids[..k] {
                removed[id] = true;
            }
            global_efficiency_without(network, &removed)
        })
        .collect();

    Ok(RobustnessCurve { values })
}

/// Outcome of one ordering; an unknown label fails only its own ordering
#[derive(Clone, Debug)]
pub struct CurveOutcome {
    pub label: String,
    pub result: Result<RobustnessCurve>,
}

#[derive(Clone, Debug, Default)]
pub struct RobustnessReport {
    pub curves: Vec<CurveOutcome>,
}

impl RobustnessReport {
    pub fn get(&self, label: &str) -> Option<&Result<RobustnessCurve>> {
        self.curves.iter().find(|c| c.label == label).map(|c| &c.result)
    }

    pub fn successes(&self) -> impl Iterator<Item = (&str, &RobustnessCurve)> {
        self.curves
            .iter()
            .filter_map(|c| c.result.as_ref().ok().map(|r| (c.label.as_str(), r)))
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &ContagionError)> {
        self.curves
            .iter()
            .filter_map(|c| c.result.as_ref().err().map(|e| (c.label.as_str(), e)))
    }

    pub fn len(&self) -> usize {
        self.curves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }
}

/// Evaluates removal orderings independently against one base network
pub struct RobustnessEvaluator<'a> {
    network: &'a Network,
}

impl<'a> RobustnessEvaluator<'a> {
    pub fn new(network: &'a Network) -> Self {
        Self { network }
    }

    pub fn baseline(&self) -> F {
        global_efficiency_without(self.network, &vec![false; self.network.len()])
    }

    pub fn evaluate(&self, orderings: &[RemovalOrdering]) -> RobustnessReport {
        info!(orderings = orderings.len(), nodes = self.network.len(), "evaluating robustness");

        let curves = orderings
            .par_iter()
            .map(|ordering| {
                let result = efficiency_over_removal(self.network, &ordering.nodes);
                match &result {
                    Ok(curve) => debug!(
                        ordering = %ordering.label,
                        initial = curve.initial(),
                        last = curve.final_value(),
                        "curve computed"
                    ),
                    Err(e) => warn!(ordering = %ordering.label, error = %e, "ordering failed"),
                }
                CurveOutcome {
                    label: ordering.label.clone(),
                    result,
                }
            })
            .collect();

        RobustnessReport { curves }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_curve_length_and_endpoint() {
        let g = Network::from_presence(["A", "B", "C"], |i, j| i != j).unwrap();
        let curve = efficiency_over_removal(&g, &["B", "A", "C"]).unwrap();
        assert_eq!(curve.values.len(), 4);
        assert_relative_eq!(curve.values[0], 1.0);
        assert_relative_eq!(curve.values[1], 1.0);
        assert_eq!(curve.values[2], 0.0);
        assert_eq!(curve.final_value(), 0.0);
        assert_relative_eq!(curve.relative_loss(), 1.0);
    }

    #[test]
    fn test_prefix_ordering() {
        let g = Network::from_edges(["A", "B", "C"], [("A", "B"), ("B", "C")]).unwrap();
        let curve = efficiency_over_removal(&g, &["C"]).unwrap();
        assert_eq!(curve.values.len(), 2);
        assert_relative_eq!(curve.values[1], 0.5);
    }

    #[test]
    fn test_empty_network() {
        let g = Network::new(Vec::<String>::new()).unwrap();
        let curve = efficiency_over_removal(&g, &["A"]).unwrap();
        assert_eq!(curve.values, vec![0.0]);
    }

    #[test]
    fn test_area() {
        let curve = RobustnessCurve { values: vec![1.0, 0.5, 0.0] };
        assert_relative_eq!(curve.area(), 1.0);
    }

    #[test]
    fn test_unknown_label_fails_only_its_ordering() {
        let g = Network::from_edges(["A", "B"], [("A", "B")]).unwrap();
        let report = RobustnessEvaluator::new(&g).evaluate(&[
            RemovalOrdering::new("good", ["A"]),
            RemovalOrdering::new("bad", ["A", "X"]),
        ]);
        assert!(report.get("good").unwrap().is_ok());
        assert_eq!(
            report.get("bad").unwrap().as_ref().unwrap_err(),
            &ContagionError::UnknownNode("X".to_string())
        );
        assert_eq!(report.successes().count(), 1);
    }
}
