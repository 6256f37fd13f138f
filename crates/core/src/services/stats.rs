//! Admin dashboard statistics.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::warn;

use dripcast_common::AppResult;
use dripcast_store::{BroadcastStoreRef, SubscriberStoreRef};

/// Trailing window of the daily histograms, in days (today included).
const HISTOGRAM_DAYS: u64 = 30;

/// Aggregated dashboard figures.
///
/// Every figure is computed independently; a failed query degrades its
/// figure to zero or empty instead of failing the whole report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatsReport {
    /// Signups since local midnight.
    pub today: u64,
    /// Signups since the start of the Monday-anchored local week.
    pub week: u64,
    /// Signups since the first of the local month.
    pub month: u64,
    /// All-time subscriber count.
    pub total: u64,
    /// Signups per local calendar day over the trailing 30 days,
    /// keyed `YYYY-MM-DD`. Days without signups are omitted.
    pub daily_registrations: BTreeMap<String, u64>,
    /// Broadcasts per local calendar day over the trailing 30 days.
    pub daily_notifications: BTreeMap<String, u64>,
}

/// Read-only aggregation over the subscriber and broadcast stores.
#[derive(Clone)]
pub struct StatsService {
    subscribers: SubscriberStoreRef,
    broadcasts: BroadcastStoreRef,
    tz: Tz,
}

impl StatsService {
    /// Create a stats service reporting in the given timezone.
    #[must_use]
    pub fn new(subscribers: SubscriberStoreRef, broadcasts: BroadcastStoreRef, tz: Tz) -> Self {
        Self {
            subscribers,
            broadcasts,
            tz,
        }
    }

    /// Compute the full report as of `now`.
    pub async fn report(&self, now: DateTime<Utc>) -> AppResult<StatsReport> {
        let today_local = now.with_timezone(&self.tz).date_naive();
        let week_local = today_local
            - Days::new(u64::from(today_local.weekday().num_days_from_monday()));
        let month_local = today_local.with_day(1).unwrap_or(today_local);

        let today = self.count_since(self.day_start_utc(today_local), "today").await;
        let week = self.count_since(self.day_start_utc(week_local), "week").await;
        let month = self.count_since(self.day_start_utc(month_local), "month").await;
        let total = match self.subscribers.count_all().await {
            Ok(count) => count,
            Err(e) => {
                warn!(error = %e, "Total subscriber count failed");
                0
            }
        };

        let histogram_start = today_local - Days::new(HISTOGRAM_DAYS - 1);
        let histogram_since = self.day_start_utc(histogram_start);

        let daily_registrations = match self.subscribers.created_since(histogram_since).await {
            Ok(subscribers) => self.bucket_by_day(subscribers.iter().map(|s| s.created_at)),
            Err(e) => {
                warn!(error = %e, "Registration histogram query failed");
                BTreeMap::new()
            }
        };
        let daily_notifications = match self.broadcasts.sent_since(histogram_since).await {
            Ok(broadcasts) => self.bucket_by_day(broadcasts.iter().map(|b| b.sent_at)),
            Err(e) => {
                warn!(error = %e, "Broadcast histogram query failed");
                BTreeMap::new()
            }
        };

        Ok(StatsReport {
            today,
            week,
            month,
            total,
            daily_registrations,
            daily_notifications,
        })
    }

    async fn count_since(&self, since: DateTime<Utc>, figure: &str) -> u64 {
        match self.subscribers.count_created_since(since).await {
            Ok(count) => count,
            Err(e) => {
                warn!(figure, error = %e, "Subscriber count failed");
                0
            }
        }
    }

    /// UTC instant of local midnight on `date`. A midnight skipped by a DST
    /// transition falls back to the naive time read as UTC.
    fn day_start_utc(&self, date: NaiveDate) -> DateTime<Utc> {
        let naive = date.and_time(NaiveTime::MIN);
        self.tz
            .from_local_datetime(&naive)
            .earliest()
            .map_or_else(|| Utc.from_utc_datetime(&naive), |dt| dt.with_timezone(&Utc))
    }

    fn bucket_by_day(
        &self,
        timestamps: impl Iterator<Item = DateTime<Utc>>,
    ) -> BTreeMap<String, u64> {
        let mut buckets = BTreeMap::new();
        for ts in timestamps {
            let key = ts.with_timezone(&self.tz).format("%Y-%m-%d").to_string();
            *buckets.entry(key).or_insert(0) += 1;
        }
        buckets
    }
}
