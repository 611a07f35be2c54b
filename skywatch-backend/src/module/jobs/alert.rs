use anyhow::{Context, Result};

use super::Jobs;
use crate::module::formatter::{format_air_quality_data, select_exceeded};
use crate::module::notifier::Attachment;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertOutcome {
    /// An alert listing this many indicators was sent
    Sent(usize),
    /// Every indicator is within its limit; nothing was sent
    BelowThresholds,
}

impl Jobs {
    pub async fn air_quality_alert(&self) -> Result<AlertOutcome> {
        tracing::info!("Air quality alert job started");

        let reading = self
            .source
            .air_quality()
            .await
            .context("Failed to fetch air quality")?;
        let entries = format_air_quality_data(&reading);
        let exceeded = select_exceeded(&entries, &self.thresholds);

        if exceeded.is_empty() {
            tracing::info!("Air quality within limits, no alert sent");
            return Ok(AlertOutcome::BelowThresholds);
        }

        let names: Vec<&str> = exceeded.iter().map(|e| e.indicator.as_str()).collect();
        tracing::warn!("Air quality limits exceeded: {}", names.join(", "));

        let attachments: Vec<Attachment> = exceeded.iter().map(Attachment::from).collect();
        self.notifier.send_alert(&exceeded, attachments).await?;

        tracing::info!("Air quality alert job completed");
        Ok(AlertOutcome::Sent(exceeded.len()))
    }
}
