use skywatch_backend::config::{NotifierConfig, DEFAULT_CONFIG_PATH};
use skywatch_backend::module::climacell::ClimacellClient;
use skywatch_backend::module::jobs::Jobs;
use skywatch_backend::module::notifier::{Mailer, Notifier, SmtpMailer};
use skywatch_backend::module::scheduled::{ScheduledTaskConfig, ScheduledTaskManager};

use std::sync::Arc;

use anyhow::{Context, Result};

/// Single job to run instead of the scheduler, from `--once <job>`.
enum RunOnce {
    Forecast,
    Alert,
}

struct Args {
    config_path: String,
    run_once: Option<RunOnce>,
}

fn parse_args() -> Result<Args> {
    let mut config_path = DEFAULT_CONFIG_PATH.to_string();
    let mut run_once = None;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--once" => {
                run_once = match args.next().as_deref() {
                    Some("forecast") => Some(RunOnce::Forecast),
                    Some("alert") => Some(RunOnce::Alert),
                    other => anyhow::bail!("--once expects 'forecast' or 'alert', got {:?}", other),
                };
            }
            path => config_path = path.to_string(),
        }
    }

    Ok(Args { config_path, run_once })
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = parse_args()?;

    // Load configuration
    let config = NotifierConfig::from_file(&args.config_path)?;

    // Initialize logging
    let _logging_guard = skywatch_backend::logging::init_logging(
        &config.log_dir,
        "skywatch-backend",
        &config.log_level,
    )?;

    tracing::info!("Skywatch backend starting...");
    tracing::info!("Mail relay: {}, recipient: {}", config.smtp_address(), config.recipient);

    let mailer = SmtpMailer::from_config(&config).context("Failed to configure SMTP transport")?;
    if let Err(e) = mailer.verify().await {
        tracing::error!("SMTP server {} is not reachable: {}", config.smtp_address(), e);
        return Err(e).context("SMTP connectivity check failed");
    }
    tracing::info!("SMTP server is ready to take messages");

    let source = ClimacellClient::new(&config.api_base_url, &config.cc_key, skywatch_common::HOME)?;
    let notifier = Notifier::from_config(Arc::new(mailer), &config);
    let jobs = Jobs::new(Arc::new(source), Arc::new(notifier), config.thresholds());

    match args.run_once {
        Some(RunOnce::Forecast) => return jobs.weather_forecast().await,
        Some(RunOnce::Alert) => {
            let outcome = jobs.air_quality_alert().await?;
            tracing::info!("Air quality alert finished: {:?}", outcome);
            return Ok(());
        }
        None => {}
    }

    let task_config = ScheduledTaskConfig {
        forecast_hour: config.forecast_hour,
        alert_interval_minutes: config.alert_interval_minutes,
        perform_initial_alert: true,
    };

    let mut task_manager = ScheduledTaskManager::new(task_config, jobs);
    task_manager.start_all();
    tracing::info!("All scheduled tasks started successfully");

    task_manager.wait().await;

    Ok(())
}
