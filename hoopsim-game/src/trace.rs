//! Explainability telemetry for possession resolution.
//!
//! Resolvers return trace fragments; the possession orchestrator appends them
//! in resolution order so a transcript explains every roll that shaped it.
use serde::{Deserialize, Serialize};

/// Weighted selection record (shot type, defender, rebounder, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTrace {
    /// Identifier for the selection pool (e.g., `shot.type`).
    pub pool_id: String,
    /// Uniform draw in `[0, 1)` used to select from the pool.
    pub roll: f64,
    pub candidates: Vec<WeightedCandidate>,
    pub chosen_id: String,
}

/// Candidate weight telemetry captured during selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedCandidate {
    pub id: String,
    pub base_weight: f64,
    /// Additive adjustments applied in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub adjustments: Vec<WeightFactor>,
    pub final_weight: f64,
}

impl WeightedCandidate {
    #[must_use]
    pub fn plain(id: impl Into<String>, weight: f64) -> Self {
        Self {
            id: id.into(),
            base_weight: weight,
            adjustments: Vec::new(),
            final_weight: weight,
        }
    }
}

/// Single weight adjustment used in a selection trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightFactor {
    pub label: String,
    pub value: f64,
}

impl WeightFactor {
    #[must_use]
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// One line of a possession trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TraceEntry {
    Decision(DecisionTrace),
    /// Binary outcome roll against a final probability.
    Probability {
        label: String,
        probability: f64,
        roll: f64,
        success: bool,
    },
    /// A numeric edge case fell back to a neutral default.
    Fallback { reason: String },
    Note { text: String },
}

/// Append-only trace for one possession.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PossessionTrace {
    entries: Vec<TraceEntry>,
}

impl PossessionTrace {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, entry: TraceEntry) {
        self.entries.push(entry);
    }

    pub fn extend(&mut self, fragment: impl IntoIterator<Item = TraceEntry>) {
        self.entries.extend(fragment);
    }

    pub fn note(&mut self, text: impl Into<String>) {
        self.entries.push(TraceEntry::Note { text: text.into() });
    }

    pub fn fallback(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        log::warn!("fallback: {reason}");
        self.entries.push(TraceEntry::Fallback { reason });
    }

    #[must_use]
    pub fn entries(&self) -> &[TraceEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of fallback entries recorded.
    #[must_use]
    pub fn fallback_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| matches!(entry, TraceEntry::Fallback { .. }))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trace_preserves_append_order() {
        let mut trace = PossessionTrace::new();
        trace.note("first");
        trace.extend([
            TraceEntry::Probability {
                label: String::from("shot.make"),
                probability: 0.5,
                roll: 0.25,
                success: true,
            },
            TraceEntry::Note {
                text: String::from("third"),
            },
        ]);
        trace.fallback("rebound.empty_pool");
        assert_eq!(trace.len(), 4);
        assert_eq!(trace.fallback_count(), 1);
        assert!(matches!(
            &trace.entries()[0],
            TraceEntry::Note { text } if text == "first"
        ));
        assert!(matches!(
            &trace.entries()[3],
            TraceEntry::Fallback { .. }
        ));
    }

    #[test]
    fn decision_trace_serializes_with_tag() {
        let entry = TraceEntry::Decision(DecisionTrace {
            pool_id: String::from("shot.type"),
            roll: 0.42,
            candidates: vec![WeightedCandidate::plain("rim", 1.0)],
            chosen_id: String::from("rim"),
        });
        let json = serde_json::to_value(&entry).expect("serialize");
        assert_eq!(json["type"], "decision");
        assert_eq!(json["chosen_id"], "rim");
        let back: TraceEntry = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, entry);
    }
}
