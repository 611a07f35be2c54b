///! HTML report renderer
///!
///! Templates live on disk and are re-read on every render. Each one is a
///! minijinja template receiving the formatted entries as context:
///!
///! - forecast: `weather`, `air_quality`, `date`, `generated_at`
///! - alert: `air_quality`, `generated_at`

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use minijinja::{context, Environment, UndefinedBehavior, Value};

use crate::module::formatter::{AirQualityEntry, WeatherEntry};

const FORECAST_TEMPLATE: &str = "forecast_template.html";
const ALERT_TEMPLATE: &str = "alert_template.html";

pub struct ReportRenderer {
    template_dir: PathBuf,
}

impl ReportRenderer {
    pub fn new(template_dir: impl AsRef<Path>) -> Self {
        Self {
            template_dir: template_dir.as_ref().to_path_buf(),
        }
    }

    pub async fn render_forecast(
        &self,
        weather: &[WeatherEntry],
        air_quality: &[AirQualityEntry],
        date: &str,
    ) -> Result<String> {
        let source = self.load(FORECAST_TEMPLATE).await?;
        Self::render_source(
            FORECAST_TEMPLATE,
            &source,
            context! {
                weather => weather,
                air_quality => air_quality,
                date => date,
                generated_at => Self::generated_at(),
            },
        )
    }

    pub async fn render_alert(&self, air_quality: &[AirQualityEntry]) -> Result<String> {
        let source = self.load(ALERT_TEMPLATE).await?;
        Self::render_source(
            ALERT_TEMPLATE,
            &source,
            context! {
                air_quality => air_quality,
                generated_at => Self::generated_at(),
            },
        )
    }

    async fn load(&self, name: &str) -> Result<String> {
        let path = self.template_dir.join(name);
        tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read HTML template {:?}", path))
    }

    /// `.html` names get HTML auto-escaping; unknown variables are errors.
    fn render_source(name: &str, source: &str, ctx: Value) -> Result<String> {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_trim_blocks(true);
        env.add_template(name, source)
            .with_context(|| format!("Invalid HTML template {}", name))?;

        env.get_template(name)?
            .render(ctx)
            .with_context(|| format!("Failed to render HTML template {}", name))
    }

    fn generated_at() -> String {
        chrono::Local::now().format("%Y-%m-%d %H:%M").to_string()
    }
}
