pub mod records;
pub mod thresholds;
pub mod types;

pub use records::{AirQualityReading, HourlyReading, Measurement};
pub use thresholds::ThresholdTable;
pub use types::{Coordinates, HOME, Indicator, UnknownIndicator, WeatherField};
