///! ClimaCell v3 HTTP client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use skywatch_common::{AirQualityReading, Coordinates, HourlyReading, Indicator, WeatherField};

use super::{FetchError, WeatherSource};
use crate::module::query::build_url;

const REQUEST_TIMEOUT_SECONDS: u64 = 30;
const USER_AGENT: &str = "Mozilla/5.0 Skywatch/1.0";
const REALTIME_ENDPOINT: &str = "realtime";
const HOURLY_ENDPOINT: &str = "forecast/hourly";
/// Longest error body kept in a `FetchError::Status`.
const MAX_ERROR_BODY: usize = 512;

pub struct ClimacellClient {
    client: Client,
    base_url: String,
    api_key: String,
    location: Coordinates,
}

impl ClimacellClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, location: Coordinates) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECONDS))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            location,
        })
    }

    fn location_options(&self) -> Map<String, Value> {
        let mut options = Map::new();
        options.insert("lat".into(), json!(self.location.lat));
        options.insert("lon".into(), json!(self.location.lon));
        options.insert("unit_system".into(), json!("si"));
        options
    }

    pub fn realtime_url(&self) -> String {
        let mut options = self.location_options();
        let fields: Vec<&str> = Indicator::ALL.iter().map(|i| i.as_str()).collect();
        options.insert("fields".into(), json!(fields));
        options.insert("apikey".into(), json!(self.api_key));
        build_url(&format!("{}/{}", self.base_url, REALTIME_ENDPOINT), &options)
    }

    pub fn hourly_url(&self) -> String {
        let mut options = self.location_options();
        let fields: Vec<&str> = WeatherField::ALL.iter().map(|f| f.as_str()).collect();
        options.insert("fields".into(), json!(fields));
        options.insert("apikey".into(), json!(self.api_key));
        build_url(&format!("{}/{}", self.base_url, HOURLY_ENDPOINT), &options)
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &'static str, url: &str) -> Result<T, FetchError> {
        tracing::debug!("Fetching {} from {}", endpoint, self.base_url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Request { endpoint, source })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| FetchError::Request { endpoint, source })?;

        if !status.is_success() {
            let mut body = body;
            if body.len() > MAX_ERROR_BODY {
                let mut cut = MAX_ERROR_BODY;
                while !body.is_char_boundary(cut) {
                    cut -= 1;
                }
                body.truncate(cut);
            }
            return Err(FetchError::Status {
                endpoint,
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|source| FetchError::Decode { endpoint, source })
    }
}

#[async_trait]
impl WeatherSource for ClimacellClient {
    async fn air_quality(&self) -> Result<AirQualityReading, FetchError> {
        let reading: AirQualityReading = self.get_json(REALTIME_ENDPOINT, &self.realtime_url()).await?;
        tracing::info!(
            "Fetched air quality ({} of {} indicators reported)",
            Indicator::ALL.iter().filter(|i| reading.value(**i).is_some()).count(),
            Indicator::ALL.len()
        );
        Ok(reading)
    }

    async fn hourly_forecast(&self) -> Result<Vec<HourlyReading>, FetchError> {
        let readings: Vec<HourlyReading> = self.get_json(HOURLY_ENDPOINT, &self.hourly_url()).await?;
        tracing::info!("Fetched hourly forecast ({} hours)", readings.len());
        Ok(readings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ClimacellClient {
        ClimacellClient::new(
            "https://api.climacell.co/v3/weather/",
            "KEY",
            Coordinates { lat: 50.5, lon: 19.25 },
        )
        .unwrap()
    }

    #[test]
    fn test_realtime_url() {
        assert_eq!(
            client().realtime_url(),
            "https://api.climacell.co/v3/weather/realtime?lat=50.5&lon=19.25&unit_system=si\
             &fields=pm10&fields=pm25&fields=o3&fields=no2&fields=co&fields=so2&apikey=KEY"
        );
    }

    #[test]
    fn test_hourly_url() {
        assert_eq!(
            client().hourly_url(),
            "https://api.climacell.co/v3/weather/forecast/hourly?lat=50.5&lon=19.25&unit_system=si\
             &fields=temp&fields=humidity&fields=wind_speed&fields=weather_code&apikey=KEY"
        );
    }

    #[tokio::test]
    #[ignore] // Requires network connection and a valid key
    async fn test_fetch_air_quality() {
        let key = std::env::var("CC_KEY").unwrap_or_default();
        let client = ClimacellClient::new("https://api.climacell.co/v3/weather", key, skywatch_common::HOME).unwrap();
        let reading = client.air_quality().await.unwrap();
        assert!(
            Indicator::ALL.iter().any(|i| reading.measurement(*i).is_some()),
            "realtime response carried no indicator at all"
        );
    }
}
