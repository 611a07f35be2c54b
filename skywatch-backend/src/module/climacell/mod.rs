///! ClimaCell weather API access
///!
///! `WeatherSource` is the seam the jobs depend on; `ClimacellClient` is the
///! production implementation.

mod client;
mod error;

pub use client::ClimacellClient;
pub use error::FetchError;

use async_trait::async_trait;
use skywatch_common::{AirQualityReading, HourlyReading};

/// Anything that can supply the two readings a report is built from.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    /// Current air quality at the home location.
    async fn air_quality(&self) -> Result<AirQualityReading, FetchError>;

    /// Hourly forecast at the home location, oldest hour first.
    async fn hourly_forecast(&self) -> Result<Vec<HourlyReading>, FetchError>;
}
