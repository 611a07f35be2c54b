//! Typed payloads returned by the ClimaCell v3 weather API.
//!
//! Every field arrives as a nested `{"value": .., "units": ..}` object.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::Indicator;

/// One `{value, units}` pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement<T> {
    pub value: T,
    #[serde(default)]
    pub units: Option<String>,
}

/// One hour of the hourly forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyReading {
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    pub observation_time: Measurement<DateTime<Utc>>,
    pub weather_code: Measurement<String>,
    pub temp: Measurement<f64>,
    pub humidity: Measurement<f64>,
    pub wind_speed: Measurement<f64>,
}

/// Realtime air-quality reading; the API omits or nulls indicators a
/// station does not measure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AirQualityReading {
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub observation_time: Option<Measurement<DateTime<Utc>>>,
    #[serde(default)]
    pub pm10: Option<Measurement<Option<f64>>>,
    #[serde(default)]
    pub pm25: Option<Measurement<Option<f64>>>,
    #[serde(default)]
    pub o3: Option<Measurement<Option<f64>>>,
    #[serde(default)]
    pub no2: Option<Measurement<Option<f64>>>,
    #[serde(default)]
    pub co: Option<Measurement<Option<f64>>>,
    #[serde(default)]
    pub so2: Option<Measurement<Option<f64>>>,
}

impl AirQualityReading {
    pub fn measurement(&self, indicator: Indicator) -> Option<&Measurement<Option<f64>>> {
        match indicator {
            Indicator::Pm10 => self.pm10.as_ref(),
            Indicator::Pm25 => self.pm25.as_ref(),
            Indicator::O3 => self.o3.as_ref(),
            Indicator::No2 => self.no2.as_ref(),
            Indicator::Co => self.co.as_ref(),
            Indicator::So2 => self.so2.as_ref(),
        }
    }

    /// Current value of an indicator, if the API reported one.
    pub fn value(&self, indicator: Indicator) -> Option<f64> {
        self.measurement(indicator).and_then(|m| m.value)
    }
}
