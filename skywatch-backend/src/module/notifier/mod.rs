///! Report notifier
///!
///! Renders the forecast and alert mails and hands them to a `Mailer`.

mod email;
mod mailer;
mod renderer;

pub use email::{Attachment, OutgoingEmail};
pub use mailer::{MailError, Mailer, SmtpMailer};
pub use renderer::ReportRenderer;

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::config::NotifierConfig;
use crate::module::formatter::{AirQualityEntry, WeatherEntry};

const FROM_DISPLAY_NAME: &str = "Skywatch";
const ALERT_SUBJECT: &str = "Air quality alert";

pub struct Notifier {
    mailer: Arc<dyn Mailer>,
    renderer: ReportRenderer,
    from: String,
    recipient: String,
}

impl Notifier {
    pub fn new(mailer: Arc<dyn Mailer>, renderer: ReportRenderer, sender: &str, recipient: impl Into<String>) -> Self {
        Self {
            mailer,
            renderer,
            from: format!("{} <{}>", FROM_DISPLAY_NAME, sender),
            recipient: recipient.into(),
        }
    }

    pub fn from_config(mailer: Arc<dyn Mailer>, config: &NotifierConfig) -> Self {
        Self::new(
            mailer,
            ReportRenderer::new(config.template_dir()),
            &config.user,
            config.recipient.clone(),
        )
    }

    /// Render and send the daily forecast mail.
    pub async fn send_forecast(
        &self,
        weather: &[WeatherEntry],
        air_quality: &[AirQualityEntry],
        date: &str,
        attachments: Vec<Attachment>,
    ) -> Result<()> {
        let html = self.renderer.render_forecast(weather, air_quality, date).await?;
        self.deliver(format!("Weather forecast for {}", date), html, attachments)
            .await
            .context("Failed to send forecast mail")
    }

    /// Render and send an alert listing only the given (exceeded) entries.
    pub async fn send_alert(&self, exceeded: &[AirQualityEntry], attachments: Vec<Attachment>) -> Result<()> {
        let html = self.renderer.render_alert(exceeded).await?;
        self.deliver(ALERT_SUBJECT.to_string(), html, attachments)
            .await
            .context("Failed to send air quality alert")
    }

    async fn deliver(&self, subject: String, html: String, attachments: Vec<Attachment>) -> Result<(), MailError> {
        tracing::info!(
            "Sending '{}' to {} ({} attachment(s))",
            subject,
            self.recipient,
            attachments.len()
        );
        self.mailer
            .send(OutgoingEmail {
                from: self.from.clone(),
                to: self.recipient.clone(),
                subject,
                html,
                attachments,
            })
            .await
    }
}
