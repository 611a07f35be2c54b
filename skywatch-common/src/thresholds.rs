use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::Indicator;

/// Alert limits per indicator.
///
/// An indicator without a limit never alerts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThresholdTable {
    limits: BTreeMap<Indicator, f64>,
}

impl Default for ThresholdTable {
    fn default() -> Self {
        Self::from_limits([
            (Indicator::Pm10, 50.0),
            (Indicator::Pm25, 25.0),
            (Indicator::O3, 120.0),
            (Indicator::No2, 230.0),
            (Indicator::Co, 7000.0),
            (Indicator::So2, 350.0),
        ])
    }
}

impl ThresholdTable {
    pub fn from_limits(limits: impl IntoIterator<Item = (Indicator, f64)>) -> Self {
        Self {
            limits: limits.into_iter().collect(),
        }
    }

    /// Replace individual limits, keeping the rest.
    pub fn with_overrides(mut self, overrides: &BTreeMap<Indicator, f64>) -> Self {
        for (indicator, limit) in overrides {
            self.limits.insert(*indicator, *limit);
        }
        self
    }

    pub fn limit(&self, indicator: Indicator) -> Option<f64> {
        self.limits.get(&indicator).copied()
    }

    /// True only when both the reading and the limit exist and the reading
    /// is strictly above the limit.
    pub fn is_exceeded(&self, indicator: Indicator, value: Option<f64>) -> bool {
        match (value, self.limit(indicator)) {
            (Some(value), Some(limit)) => value > limit,
            _ => false,
        }
    }
}
