use serde::{Deserialize, Serialize};

/// Air-quality pollutant code, as used by the realtime API and in legend
/// file names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Indicator {
    Pm10,
    Pm25,
    O3,
    No2,
    Co,
    So2,
}

impl Indicator {
    /// Fixed iteration order for requests, formatting and correlation ids.
    pub const ALL: [Indicator; 6] = [
        Indicator::Pm10,
        Indicator::Pm25,
        Indicator::O3,
        Indicator::No2,
        Indicator::Co,
        Indicator::So2,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Indicator::Pm10 => "pm10",
            Indicator::Pm25 => "pm25",
            Indicator::O3 => "o3",
            Indicator::No2 => "no2",
            Indicator::Co => "co",
            Indicator::So2 => "so2",
        }
    }
}

impl std::fmt::Display for Indicator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown air-quality indicator: {0}")]
pub struct UnknownIndicator(pub String);

impl std::str::FromStr for Indicator {
    type Err = UnknownIndicator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Indicator::ALL
            .into_iter()
            .find(|indicator| indicator.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownIndicator(s.to_string()))
    }
}

/// Field requested from the hourly forecast endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeatherField {
    Temp,
    Humidity,
    WindSpeed,
    WeatherCode,
}

impl WeatherField {
    pub const ALL: [WeatherField; 4] = [
        WeatherField::Temp,
        WeatherField::Humidity,
        WeatherField::WindSpeed,
        WeatherField::WeatherCode,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WeatherField::Temp => "temp",
            WeatherField::Humidity => "humidity",
            WeatherField::WindSpeed => "wind_speed",
            WeatherField::WeatherCode => "weather_code",
        }
    }
}

/// A point on the globe in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// The single location every report is produced for.
pub const HOME: Coordinates = Coordinates {
    lat: 50.0647,
    lon: 19.9450,
};
