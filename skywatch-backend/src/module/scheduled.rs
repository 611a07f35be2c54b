///! Scheduled task manager - runs both report timelines
///!
///! - Forecast mail: daily at `forecast_hour:00` local time, recomputed
///!   against the wall clock before every run
///! - Air quality alert: immediately, then every `alert_interval_minutes`
///!
///! A failing job is logged and never ends its timeline.

use super::jobs::{AlertOutcome, Jobs};
use chrono::{DateTime, Duration as ChronoDuration, NaiveTime, TimeZone};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Configuration for scheduled tasks
#[derive(Debug, Clone)]
pub struct ScheduledTaskConfig {
    /// Local hour at which the forecast mail goes out
    pub forecast_hour: u32,

    /// Interval between air quality checks (in minutes)
    pub alert_interval_minutes: u64,

    /// Run the alert check immediately at startup
    pub perform_initial_alert: bool,
}

impl Default for ScheduledTaskConfig {
    fn default() -> Self {
        Self {
            forecast_hour: 8,
            alert_interval_minutes: 2,
            perform_initial_alert: true,
        }
    }
}

/// Scheduled task manager
pub struct ScheduledTaskManager {
    config: ScheduledTaskConfig,
    jobs: Jobs,
    task_handles: Vec<JoinHandle<()>>,
}

impl ScheduledTaskManager {
    pub fn new(config: ScheduledTaskConfig, jobs: Jobs) -> Self {
        Self {
            config,
            jobs,
            task_handles: Vec::new(),
        }
    }

    /// Start both timelines
    pub fn start_all(&mut self) {
        tracing::info!("Starting scheduled task manager...");

        let forecast_handle = self.start_forecast_task();
        self.task_handles.push(forecast_handle);

        let alert_handle = self.start_alert_task();
        self.task_handles.push(alert_handle);

        tracing::info!(
            "Started {} scheduled tasks (forecast daily at {:02}:00, air quality every {} min)",
            self.task_handles.len(),
            self.config.forecast_hour,
            self.config.alert_interval_minutes
        );
    }

    fn start_forecast_task(&self) -> JoinHandle<()> {
        let jobs = self.jobs.clone();
        let forecast_hour = self.config.forecast_hour;

        tokio::spawn(async move {
            Self::forecast_loop(jobs, forecast_hour).await;
        })
    }

    async fn forecast_loop(jobs: Jobs, forecast_hour: u32) {
        let mut last_trigger = None;

        loop {
            let now = chrono::Local::now();
            let Some(next_trigger) = Self::next_forecast_trigger(now, last_trigger, forecast_hour) else {
                tracing::error!("Cannot schedule forecast at hour {}, stopping forecast timeline", forecast_hour);
                return;
            };
            let sleep_duration = (next_trigger - now)
                .to_std()
                .unwrap_or(Duration::from_secs(60));

            tracing::info!(
                "Next weather forecast at: {} (in {:.1} hours)",
                next_trigger.format("%Y-%m-%d %H:%M:%S %Z"),
                sleep_duration.as_secs_f64() / 3600.0
            );

            tokio::time::sleep(sleep_duration).await;
            last_trigger = Some(next_trigger);

            Self::run_forecast(&jobs).await;
        }
    }

    async fn run_forecast(jobs: &Jobs) {
        if let Err(e) = jobs.weather_forecast().await {
            tracing::error!("Weather forecast job failed: {:#}", e);
        }
    }

    /// Next trigger after both `now` and the previous trigger.
    ///
    /// The sleep runs on the monotonic clock, so a wake can land slightly
    /// before the wall-clock target; counting from `last_trigger` keeps that
    /// from scheduling the same morning twice.
    pub fn next_forecast_trigger<Tz: TimeZone>(
        now: DateTime<Tz>,
        last_trigger: Option<DateTime<Tz>>,
        hour: u32,
    ) -> Option<DateTime<Tz>> {
        let base = match last_trigger {
            Some(last) if last > now => last,
            _ => now,
        };
        Self::calculate_next_forecast_time(base, hour)
    }

    /// Next `hour:00` strictly after `now` in `now`'s time zone: today if it
    /// has not passed yet, otherwise tomorrow.
    ///
    /// Returns `None` only for an hour outside 0..24.
    pub fn calculate_next_forecast_time<Tz: TimeZone>(now: DateTime<Tz>, hour: u32) -> Option<DateTime<Tz>> {
        let target_time = NaiveTime::from_hms_opt(hour, 0, 0)?;
        let tz = now.timezone();
        let mut date = now.date_naive();

        // A DST gap can swallow the target hour; fall through to the next day.
        for _ in 0..3 {
            if let Some(candidate) = tz.from_local_datetime(&date.and_time(target_time)).earliest() {
                if candidate > now {
                    return Some(candidate);
                }
            }
            date = date + ChronoDuration::days(1);
        }

        None
    }

    fn start_alert_task(&self) -> JoinHandle<()> {
        let jobs = self.jobs.clone();
        let interval_minutes = self.config.alert_interval_minutes;
        let perform_initial = self.config.perform_initial_alert;

        tracing::info!(
            "Scheduling air quality alert task (interval: {} minutes, initial: {})",
            interval_minutes,
            perform_initial
        );

        tokio::spawn(async move {
            Self::alert_loop(jobs, interval_minutes, perform_initial).await;
        })
    }

    async fn alert_loop(jobs: Jobs, interval_minutes: u64, perform_initial: bool) {
        let period = Duration::from_secs(interval_minutes.max(1) * 60);
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        // The first tick completes immediately.
        interval.tick().await;
        if perform_initial {
            Self::run_alert(&jobs).await;
        }

        loop {
            interval.tick().await;
            Self::run_alert(&jobs).await;
        }
    }

    async fn run_alert(jobs: &Jobs) {
        match jobs.air_quality_alert().await {
            Ok(AlertOutcome::Sent(count)) => {
                tracing::info!("Air quality alert sent for {} indicator(s)", count);
            }
            Ok(AlertOutcome::BelowThresholds) => {
                tracing::debug!("Air quality check completed: below thresholds");
            }
            Err(e) => {
                tracing::error!("Air quality alert job failed: {:#}", e);
            }
        }
    }

    /// Wait on the timelines; they only end if aborted or panicking.
    pub async fn wait(self) {
        for result in futures::future::join_all(self.task_handles).await {
            if let Err(e) = result {
                tracing::error!("Scheduled task ended unexpectedly: {}", e);
            }
        }
    }

    /// Abort all timelines
    pub fn shutdown(self) {
        tracing::info!("Shutting down scheduled task manager...");

        for handle in self.task_handles {
            handle.abort();
        }

        tracing::info!("All scheduled tasks stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, FixedOffset, Timelike, Utc};
    use skywatch_common::ThresholdTable;
    use std::sync::Arc;

    use crate::module::jobs::tests::FakeSource;
    use crate::module::notifier::tests::{notifier, RecordingMailer};

    fn jobs_with(source: Arc<FakeSource>) -> Jobs {
        let mailer = Arc::new(RecordingMailer::default());
        Jobs::new(source, Arc::new(notifier(mailer)), ThresholdTable::default())
    }

    #[test]
    fn test_next_forecast_before_target_is_today() {
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 6, 30, 0).unwrap();
        let next = ScheduledTaskManager::calculate_next_forecast_time(now, 8).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 10, 18, 8, 0, 0).unwrap());
    }

    #[test]
    fn test_next_forecast_after_target_is_tomorrow() {
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 9, 0, 0).unwrap();
        let next = ScheduledTaskManager::calculate_next_forecast_time(now, 8).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 10, 19, 8, 0, 0).unwrap());
    }

    #[test]
    fn test_next_forecast_at_target_is_tomorrow() {
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 8, 0, 0).unwrap();
        let next = ScheduledTaskManager::calculate_next_forecast_time(now, 8).unwrap();
        assert_eq!(next.day(), 19);
        assert_eq!(next.hour(), 8);
    }

    #[test]
    fn test_next_forecast_across_month_end() {
        let now = Utc.with_ymd_and_hms(2026, 10, 31, 23, 0, 0).unwrap();
        let next = ScheduledTaskManager::calculate_next_forecast_time(now, 8).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 11, 1, 8, 0, 0).unwrap());
    }

    #[test]
    fn test_next_forecast_keeps_time_zone() {
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let now = tz.with_ymd_and_hms(2026, 10, 18, 7, 0, 0).unwrap();
        let next = ScheduledTaskManager::calculate_next_forecast_time(now, 8).unwrap();
        assert_eq!(next.hour(), 8);
        assert_eq!(next.with_timezone(&Utc).hour(), 6);
    }

    #[test]
    fn test_invalid_hour() {
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 7, 0, 0).unwrap();
        assert!(ScheduledTaskManager::calculate_next_forecast_time(now, 24).is_none());
    }

    #[test]
    fn test_first_forecast_trigger_uses_now() {
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 6, 30, 0).unwrap();
        let next = ScheduledTaskManager::next_forecast_trigger(now, None, 8).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 10, 18, 8, 0, 0).unwrap());
    }

    #[test]
    fn test_early_wake_does_not_refire_same_morning() {
        let fired_at = Utc.with_ymd_and_hms(2026, 10, 18, 8, 0, 0).unwrap();
        let now = fired_at - ChronoDuration::milliseconds(5);
        let next = ScheduledTaskManager::next_forecast_trigger(now, Some(fired_at), 8).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 10, 19, 8, 0, 0).unwrap());
    }

    #[test]
    fn test_late_wake_counts_from_now() {
        let fired_at = Utc.with_ymd_and_hms(2026, 10, 18, 8, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2026, 10, 20, 9, 0, 0).unwrap();
        let next = ScheduledTaskManager::next_forecast_trigger(now, Some(fired_at), 8).unwrap();
        assert_eq!(next, Utc.with_ymd_and_hms(2026, 10, 21, 8, 0, 0).unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_alert_timeline_runs_immediately_and_survives_failures() {
        let source = Arc::new(FakeSource::failing());
        let manager = ScheduledTaskManager::new(ScheduledTaskConfig::default(), jobs_with(source.clone()));

        let handle = manager.start_alert_task();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(source.air_quality_calls(), 1);
        assert!(!handle.is_finished());

        // Two more 2-minute ticks, each failing again
        tokio::time::sleep(Duration::from_secs(2 * 2 * 60)).await;
        assert_eq!(source.air_quality_calls(), 3);
        assert!(!handle.is_finished());

        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_alert_timeline_without_initial_run_waits_one_interval() {
        let source = Arc::new(FakeSource::failing());
        let config = ScheduledTaskConfig {
            perform_initial_alert: false,
            ..ScheduledTaskConfig::default()
        };
        let manager = ScheduledTaskManager::new(config, jobs_with(source.clone()));

        let handle = manager.start_alert_task();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(source.air_quality_calls(), 0);

        tokio::time::sleep(Duration::from_secs(2 * 60)).await;
        assert_eq!(source.air_quality_calls(), 1);

        handle.abort();
    }

    #[tokio::test]
    async fn test_failed_forecast_run_is_contained() {
        let source = Arc::new(FakeSource::failing());
        let jobs = jobs_with(source.clone());

        ScheduledTaskManager::run_forecast(&jobs).await;
        ScheduledTaskManager::run_forecast(&jobs).await;

        assert_eq!(source.air_quality_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_all_and_shutdown() {
        let source = Arc::new(FakeSource::failing());
        let mut manager = ScheduledTaskManager::new(ScheduledTaskConfig::default(), jobs_with(source.clone()));

        manager.start_all();
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(manager.task_handles.len(), 2);
        assert!(manager.task_handles.iter().all(|h| !h.is_finished()));
        assert!(source.air_quality_calls() >= 1);

        manager.shutdown();
    }
}
