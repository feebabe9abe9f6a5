//! A single piece of explainable evidence (§3 "Signal").

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Signal {
    pub id: String,
    pub severity: Severity,
    pub weight: i64,
    pub evidence: serde_json::Value,
    pub explanation: String,
}

impl Signal {
    pub fn new(
        id: impl Into<String>,
        severity: Severity,
        weight: i64,
        evidence: serde_json::Value,
        explanation: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            severity,
            weight,
            evidence,
            explanation: explanation.into(),
        }
    }
}

/// Stable ordering (§3): by descending `|weight|`, then alphabetically by
/// `id` (§4.8 "Tie-breaks").
pub fn order_signals(signals: &mut [Signal]) {
    signals.sort_by(|a, b| b.weight.abs().cmp(&a.weight.abs()).then_with(|| a.id.cmp(&b.id)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sig(id: &str, weight: i64) -> Signal {
        Signal::new(id, Severity::Medium, weight, json!({}), "")
    }

    #[test]
    fn orders_by_descending_absolute_weight() {
        let mut signals = vec![sig("A", 10), sig("B", -40), sig("C", 25)];
        order_signals(&mut signals);
        assert_eq!(signals[0].id, "B");
        assert_eq!(signals[1].id, "C");
        assert_eq!(signals[2].id, "A");
    }

    #[test]
    fn ties_break_alphabetically_on_id() {
        let mut signals = vec![sig("ZEBRA", 20), sig("ALPHA", 20)];
        order_signals(&mut signals);
        assert_eq!(signals[0].id, "ALPHA");
        assert_eq!(signals[1].id, "ZEBRA");
    }
}
