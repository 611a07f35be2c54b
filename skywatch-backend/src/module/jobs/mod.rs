///! Fetch → format → notify use cases
///!
///! - `weather_forecast`: daily mail with today's forecast and air quality
///! - `air_quality_alert`: mail only when an indicator exceeds its limit

mod alert;
mod forecast;

pub use alert::AlertOutcome;
pub use forecast::forecast_attachments;

use std::sync::Arc;

use skywatch_common::ThresholdTable;

use super::climacell::WeatherSource;
use super::notifier::Notifier;

/// Shared dependencies of both jobs; cheap to clone into timeline tasks.
#[derive(Clone)]
pub struct Jobs {
    source: Arc<dyn WeatherSource>,
    notifier: Arc<Notifier>,
    thresholds: ThresholdTable,
}

impl Jobs {
    pub fn new(source: Arc<dyn WeatherSource>, notifier: Arc<Notifier>, thresholds: ThresholdTable) -> Self {
        Self {
            source,
            notifier,
            thresholds,
        }
    }
}
