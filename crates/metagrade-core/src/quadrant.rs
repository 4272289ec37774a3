//! Metacognitive quadrant classification.
//!
//! Correctness crossed with self-reported confidence gives a 2x2 risk map:
//!
//! | correct | confident | unsure / unknown |
//! |---------|-----------|------------------|
//! | yes     | Master    | Lucky            |
//! | no      | Delusion  | Deficiency       |

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::ConfidenceLevel;

/// One of the four metacognitive labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Quadrant {
    /// Correct and confident: reliable knowledge.
    Master,
    /// Correct without confidence: a guess that happened to land.
    Lucky,
    /// Wrong but confident: an internalized misconception.
    Delusion,
    /// Wrong and aware of it: a known gap.
    Deficiency,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [
        Quadrant::Master,
        Quadrant::Lucky,
        Quadrant::Delusion,
        Quadrant::Deficiency,
    ];

    pub fn is_correct(self) -> bool {
        matches!(self, Quadrant::Master | Quadrant::Lucky)
    }

    /// Whether the learner's confidence matched the outcome.
    pub fn is_calibrated(self) -> bool {
        matches!(self, Quadrant::Master | Quadrant::Deficiency)
    }

    pub fn description(self) -> &'static str {
        match self {
            Quadrant::Master => "correct and confident",
            Quadrant::Lucky => "correct but unsure",
            Quadrant::Delusion => "wrong but confident",
            Quadrant::Deficiency => "wrong and unsure",
        }
    }
}

impl fmt::Display for Quadrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Quadrant::Master => "Master",
            Quadrant::Lucky => "Lucky",
            Quadrant::Delusion => "Delusion",
            Quadrant::Deficiency => "Deficiency",
        };
        f.write_str(label)
    }
}

/// Classify one graded answer.
pub fn classify(is_correct: bool, confidence: ConfidenceLevel) -> Quadrant {
    match (is_correct, confidence.is_confident()) {
        (true, true) => Quadrant::Master,
        (true, false) => Quadrant::Lucky,
        (false, true) => Quadrant::Delusion,
        (false, false) => Quadrant::Deficiency,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_table() {
        use ConfidenceLevel::*;

        assert_eq!(classify(true, Confident), Quadrant::Master);
        assert_eq!(classify(true, Unsure), Quadrant::Lucky);
        assert_eq!(classify(true, Unknown), Quadrant::Lucky);
        assert_eq!(classify(false, Confident), Quadrant::Delusion);
        assert_eq!(classify(false, Unsure), Quadrant::Deficiency);
        assert_eq!(classify(false, Unknown), Quadrant::Deficiency);
    }

    #[test]
    fn classification_agrees_with_quadrant_predicates() {
        for is_correct in [true, false] {
            for confidence in [
                ConfidenceLevel::Confident,
                ConfidenceLevel::Unsure,
                ConfidenceLevel::Unknown,
            ] {
                let q = classify(is_correct, confidence);
                assert_eq!(q, classify(is_correct, confidence));
                assert_eq!(q.is_correct(), is_correct);
                assert_eq!(q.is_calibrated(), is_correct == confidence.is_confident());
            }
        }
    }

    #[test]
    fn display_uses_label() {
        assert_eq!(Quadrant::Delusion.to_string(), "Delusion");
        assert_eq!(
            serde_json::to_string(&Quadrant::Deficiency).unwrap(),
            "\"Deficiency\""
        );
    }
}
