//! Quadrant counts and the ratios derived from them.
//!
//! Aggregates are recomputed from the graded items on every request and are
//! never stored as primary state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{GradedItem, PartGroup};
use crate::quadrant::Quadrant;

/// Quadrant counts for one grouping of graded items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct QuadrantAggregate {
    pub master: u32,
    pub lucky: u32,
    pub delusion: u32,
    pub deficiency: u32,
    pub total: u32,
    /// `Master / (Master + Lucky)`: how much of the score is real knowledge.
    pub score_purity: f64,
    /// `Delusion / (Delusion + Deficiency)`: how many mistakes are held with false confidence.
    pub error_resistance: f64,
    /// `(Master + Deficiency) / total`: how often confidence matched the outcome.
    pub calibration_accuracy: f64,
}

impl QuadrantAggregate {
    /// Build an aggregate from any collection of graded items.
    pub fn from_items<'a, I>(items: I) -> Self
    where
        I: IntoIterator<Item = &'a GradedItem>,
    {
        let mut agg = Self::default();
        for item in items {
            match item.quadrant() {
                Quadrant::Master => agg.master += 1,
                Quadrant::Lucky => agg.lucky += 1,
                Quadrant::Delusion => agg.delusion += 1,
                Quadrant::Deficiency => agg.deficiency += 1,
            }
            agg.total += 1;
        }

        agg.score_purity = ratio(agg.master, agg.master + agg.lucky);
        agg.error_resistance = ratio(agg.delusion, agg.delusion + agg.deficiency);
        agg.calibration_accuracy = ratio(agg.master + agg.deficiency, agg.total);
        agg
    }

    pub fn count(&self, quadrant: Quadrant) -> u32 {
        match quadrant {
            Quadrant::Master => self.master,
            Quadrant::Lucky => self.lucky,
            Quadrant::Delusion => self.delusion,
            Quadrant::Deficiency => self.deficiency,
        }
    }

    pub fn correct(&self) -> u32 {
        self.master + self.lucky
    }

    /// Fraction of items answered correctly, 0 when empty.
    pub fn accuracy(&self) -> f64 {
        ratio(self.correct(), self.total)
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

fn ratio(numerator: u32, denominator: u32) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Aggregate over every graded item.
pub fn aggregate(items: &[GradedItem]) -> QuadrantAggregate {
    QuadrantAggregate::from_items(items)
}

/// Aggregate only the items belonging to `parts`.
pub fn aggregate_parts(items: &[GradedItem], parts: &[u32]) -> QuadrantAggregate {
    QuadrantAggregate::from_items(items.iter().filter(|i| parts.contains(&i.part())))
}

/// One aggregate per part that has at least one graded item.
pub fn aggregate_by_part(items: &[GradedItem]) -> BTreeMap<u32, QuadrantAggregate> {
    let mut grouped: BTreeMap<u32, Vec<&GradedItem>> = BTreeMap::new();
    for item in items {
        grouped.entry(item.part()).or_default().push(item);
    }

    grouped
        .into_iter()
        .map(|(part, group)| (part, QuadrantAggregate::from_items(group)))
        .collect()
}

/// One aggregate per named part group. Groups with no graded items report zeros.
pub fn aggregate_by_group(
    items: &[GradedItem],
    groups: &[PartGroup],
) -> BTreeMap<String, QuadrantAggregate> {
    groups
        .iter()
        .map(|g| (g.name.clone(), aggregate_parts(items, &g.parts)))
        .collect()
}
