use chrono::{DateTime, Datelike, Duration, Timelike, Utc, Weekday};
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::analytics::Analytics;
use crate::audience_client::AudienceClient;
use crate::config::SchedulerSettings;
use crate::newsletter::NewsletterDispatcher;

/// Background jobs running next to the HTTP server. All times are UTC.
pub struct Scheduler {
    handles: Vec<JoinHandle<()>>,
}

impl Scheduler {
    /// Spawns the hourly analytics refresh and the weekly newsletter. Both loops log
    /// failures and keep going.
    pub fn start(
        settings: &SchedulerSettings,
        analytics: Arc<Analytics>,
        audience: Arc<AudienceClient>,
        dispatcher: Arc<NewsletterDispatcher>,
    ) -> Result<Scheduler, String> {
        let weekday = settings.get_newsletter_weekday()?;
        let hour = settings.newsletter_hour;
        let minute = settings.newsletter_minute;

        let analytics_job = tokio::spawn(async move {
            loop {
                sleep_until(next_hourly_run(Utc::now())).await;

                if let Err(err) = analytics.update(&audience).await {
                    tracing::error!("Scheduled analytics update failed: {:?}", err);
                }
            }
        });

        let newsletter_job = tokio::spawn(async move {
            loop {
                sleep_until(next_weekly_run(Utc::now(), weekday, hour, minute)).await;

                if let Err(err) = dispatcher.send_scheduled_newsletter().await {
                    tracing::error!("Scheduled newsletter failed: {:?}", err);
                }
            }
        });

        tracing::info!(
            "Scheduler started: analytics every hour, newsletter every {} at {:02}:{:02} UTC",
            weekday,
            hour,
            minute
        );

        Ok(Scheduler {
            handles: vec![analytics_job, newsletter_job],
        })
    }

    pub fn shutdown(self) {
        for handle in self.handles {
            handle.abort();
        }

        tracing::info!("Scheduler stopped");
    }
}

async fn sleep_until(instant: DateTime<Utc>) {
    let wait = (instant - Utc::now()).to_std().unwrap_or_default();

    tokio::time::sleep(wait).await;
}

/// Top of the next hour, strictly after `now`.
pub fn next_hourly_run(now: DateTime<Utc>) -> DateTime<Utc> {
    let into_hour = Duration::seconds(i64::from(now.minute() * 60 + now.second()))
        + Duration::nanoseconds(i64::from(now.nanosecond()));

    now - into_hour + Duration::hours(1)
}

/// Next `weekday` at `hour:minute`, strictly after `now`.
pub fn next_weekly_run(now: DateTime<Utc>, weekday: Weekday, hour: u32, minute: u32) -> DateTime<Utc> {
    let into_week = Duration::days(i64::from(now.weekday().num_days_from_monday()))
        + Duration::seconds(i64::from(now.num_seconds_from_midnight()))
        + Duration::nanoseconds(i64::from(now.nanosecond()));
    let start_of_week = now - into_week;
    let candidate = start_of_week
        + Duration::days(i64::from(weekday.num_days_from_monday()))
        + Duration::hours(i64::from(hour))
        + Duration::minutes(i64::from(minute));

    if candidate > now {
        candidate
    } else {
        candidate + Duration::weeks(1)
    }
}
