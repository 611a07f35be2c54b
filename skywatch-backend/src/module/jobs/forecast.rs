use anyhow::{Context, Result};
use chrono::{DateTime, Local};

use super::Jobs;
use crate::module::formatter::{
    filter_forecast_hours, format_air_quality_data, format_weather_data, AirQualityEntry, WeatherEntry,
};
use crate::module::notifier::Attachment;

/// Weather attachments in order, followed by air-quality attachments in order.
pub fn forecast_attachments(weather: &[WeatherEntry], air_quality: &[AirQualityEntry]) -> Vec<Attachment> {
    weather
        .iter()
        .map(Attachment::from)
        .chain(air_quality.iter().map(Attachment::from))
        .collect()
}

impl Jobs {
    /// Run the daily forecast job for the current local time.
    pub async fn weather_forecast(&self) -> Result<()> {
        self.weather_forecast_at(Local::now()).await
    }

    pub async fn weather_forecast_at(&self, now: DateTime<Local>) -> Result<()> {
        tracing::info!("Weather forecast job started");

        let air_quality = self
            .source
            .air_quality()
            .await
            .context("Failed to fetch air quality")?;
        let hourly = self
            .source
            .hourly_forecast()
            .await
            .context("Failed to fetch hourly forecast")?;

        let todays = filter_forecast_hours(&hourly, &now);
        tracing::debug!("{} of {} forecast hours kept for today", todays.len(), hourly.len());

        let weather = format_weather_data(&todays, &Local);
        let air_quality = format_air_quality_data(&air_quality);
        let attachments = forecast_attachments(&weather, &air_quality);

        let date = now.format("%Y-%m-%d").to_string();
        self.notifier
            .send_forecast(&weather, &air_quality, &date, attachments)
            .await?;

        tracing::info!("Weather forecast job completed ({} hours)", weather.len());
        Ok(())
    }
}
