//! # Metrics Engine
//!
//! Pure, read-only derivations over the stored snapshot history. Every
//! function is a deterministic function of the snapshot set passed in;
//! nothing here mutates the store. Empty histories produce zero/empty
//! sentinel results, never errors.

use crate::config::{AggregationConfig, QueryConfig};
use crate::counters::RawCounters;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use snapshot_store::DailySnapshot;
use std::collections::BTreeMap;

/// Metric selected for windows, trends, and growth comparisons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Metric {
    /// Total requests for the date
    Total,
    /// Backend request total
    Backend,
    /// Client action total
    Client,
    /// App launch counter
    UserLaunch,
    /// Sum of all advertising counters
    AdTotal,
}

impl Metric {
    /// Value of this metric in a snapshot
    pub fn value_in(self, snapshot: &DailySnapshot) -> u64 {
        match self {
            Metric::Total => snapshot.total,
            Metric::Backend => snapshot.backend,
            Metric::Client => snapshot.client,
            Metric::UserLaunch => snapshot.user_launch,
            Metric::AdTotal => snapshot.ad_total(),
        }
    }
}

/// Three-way growth badge state
///
/// A zero delta hides the badge rather than showing "+0".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GrowthBadge {
    /// Count grew by the contained delta
    Positive(u64),
    /// Count shrank by the contained delta
    Negative(u64),
    /// No badge is shown
    Hidden,
}

impl GrowthBadge {
    /// Classify the change from `prev` to `curr`
    pub fn from_delta(prev: u64, curr: u64) -> Self {
        match curr.cmp(&prev) {
            std::cmp::Ordering::Greater => GrowthBadge::Positive(curr - prev),
            std::cmp::Ordering::Less => GrowthBadge::Negative(prev - curr),
            std::cmp::Ordering::Equal => GrowthBadge::Hidden,
        }
    }

    /// Signed display label; `None` when the badge is hidden
    pub fn label(&self) -> Option<String> {
        match self {
            GrowthBadge::Positive(delta) => Some(format!("+{delta}")),
            GrowthBadge::Negative(delta) => Some(format!("-{delta}")),
            GrowthBadge::Hidden => None,
        }
    }
}

/// Aggregate over a rolling window of dates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WindowAggregate {
    /// Sum over snapshots present in the window
    pub sum: u64,
    /// Rounded mean over snapshots present (0 when the window is empty)
    pub average: u64,
    /// Number of snapshots actually present, not the nominal window length
    pub count: usize,
}

/// The highest-total day on record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PeakDay {
    /// Date of the peak
    pub date: NaiveDate,
    /// Total requests observed that date
    pub total: u64,
}

/// Trend over the trailing week of stored dates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Trend {
    Growing,
    Declining,
    Stable,
}

/// Span of the stored history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    /// Earliest stored date
    pub first: NaiveDate,
    /// Latest stored date
    pub last: NaiveDate,
    /// Number of distinct dates stored
    pub days: usize,
}

/// Card block for a single feature counter (launches, ad requests)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricBlock {
    /// Latest stored value (all-time display)
    pub all_time: u64,
    /// Today's value
    pub today: u64,
    /// Rolling-week average
    pub week_average: u64,
    /// Rolling-month total
    pub month_total: u64,
}

/// Everything the presentation layer needs to render the dashboard
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    /// All-time request total from the live counters
    pub all_time_total: u64,
    /// Today's request total from the live counters
    pub today_total: u64,
    /// All-time backend request total
    pub backend_total: u64,
    /// All-time client action total
    pub client_total: u64,
    /// Today vs yesterday growth badge
    pub today_growth: GrowthBadge,
    /// Mean daily total across the stored history
    pub average_daily: u64,
    /// Highest-total day on record
    pub peak: Option<PeakDay>,
    /// Span of the stored history
    pub date_range: Option<DateRange>,
    /// Request-total trend over the trailing week
    pub trend: Trend,
    /// User launch card block
    pub launches: MetricBlock,
    /// Advertising card block
    pub ad_requests: MetricBlock,
    /// Busiest backend endpoint
    pub top_backend: Option<(String, u64)>,
    /// Busiest plain client action (ads and launches excluded)
    pub top_client: Option<(String, u64)>,
    /// Instant this summary was derived
    pub generated_at: DateTime<Utc>,
}

/// Metrics engine deriving summary statistics from stored snapshots
#[derive(Debug, Clone, Default)]
pub struct MetricsEngine {
    config: QueryConfig,
}

impl MetricsEngine {
    /// Create a new metrics engine
    pub fn new(config: QueryConfig) -> Self {
        Self { config }
    }

    /// Snapshots in ascending date order
    fn sorted<'a>(snapshots: &'a [DailySnapshot]) -> Vec<&'a DailySnapshot> {
        let mut sorted: Vec<&DailySnapshot> = snapshots.iter().collect();
        sorted.sort_by_key(|s| s.date);
        sorted
    }

    /// Latest-dated snapshot, if any
    pub fn latest<'a>(&self, snapshots: &'a [DailySnapshot]) -> Option<&'a DailySnapshot> {
        snapshots.iter().max_by_key(|s| s.date)
    }

    /// Snapshot stored for a specific date, if any
    pub fn on_date<'a>(
        &self,
        snapshots: &'a [DailySnapshot],
        date: NaiveDate,
    ) -> Option<&'a DailySnapshot> {
        snapshots.iter().find(|s| s.date == date)
    }

    /// Growth badge comparing the two latest stored dates
    ///
    /// Hidden when fewer than two dates are stored.
    pub fn growth_for(&self, snapshots: &[DailySnapshot], metric: Metric) -> GrowthBadge {
        let sorted = Self::sorted(snapshots);
        if sorted.len() < 2 {
            return GrowthBadge::Hidden;
        }

        let prev = metric.value_in(sorted[sorted.len() - 2]);
        let curr = metric.value_in(sorted[sorted.len() - 1]);
        GrowthBadge::from_delta(prev, curr)
    }

    /// Aggregate a metric over `[today - window_days + 1, today]` inclusive
    ///
    /// Missing days are simply absent; the average divides by the number of
    /// snapshots present in the window.
    pub fn window(
        &self,
        snapshots: &[DailySnapshot],
        today: NaiveDate,
        window_days: u32,
        metric: Metric,
    ) -> WindowAggregate {
        if window_days == 0 {
            return WindowAggregate::default();
        }

        let start = today - Duration::days(i64::from(window_days) - 1);
        let values: Vec<u64> = snapshots
            .iter()
            .filter(|s| s.date >= start && s.date <= today)
            .map(|s| metric.value_in(s))
            .collect();

        if values.is_empty() {
            return WindowAggregate::default();
        }

        let sum: u64 = values.iter().sum();
        let count = values.len();
        let average = (sum as f64 / count as f64).round() as u64;

        WindowAggregate { sum, average, count }
    }

    /// Highest-total day; ties go to the earliest date
    pub fn all_time_peak(&self, snapshots: &[DailySnapshot]) -> Option<PeakDay> {
        let mut peak: Option<&DailySnapshot> = None;

        for snapshot in Self::sorted(snapshots) {
            // Strictly greater keeps the earliest date on a tie
            if peak.map_or(true, |p| snapshot.total > p.total) {
                peak = Some(snapshot);
            }
        }

        peak.map(|s| PeakDay { date: s.date, total: s.total })
    }

    /// Top `n` entries of a counter map
    ///
    /// Descending by count, ties ascending by name so results are stable.
    pub fn top_entries(&self, map: &BTreeMap<String, u64>, n: usize) -> Vec<(String, u64)> {
        let mut entries: Vec<(String, u64)> =
            map.iter().map(|(name, &count)| (name.clone(), count)).collect();

        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        entries.truncate(n);
        entries
    }

    /// Client actions with advertising and launch entries removed
    pub fn plain_client_actions(
        &self,
        client: &BTreeMap<String, u64>,
        rules: &AggregationConfig,
    ) -> BTreeMap<String, u64> {
        client
            .iter()
            .filter(|(name, _)| !rules.is_ad_action(name) && !rules.is_launch_action(name))
            .map(|(name, &count)| (name.clone(), count))
            .collect()
    }

    /// Trend over the most recent `min(trend_days, available)` dates
    ///
    /// Compares the first and last values of that span.
    pub fn trend(&self, snapshots: &[DailySnapshot], metric: Metric) -> Trend {
        let sorted = Self::sorted(snapshots);
        let span = self.config.trend_days.min(sorted.len());
        if span == 0 {
            return Trend::Stable;
        }

        let window = &sorted[sorted.len() - span..];
        let first = metric.value_in(window[0]);
        let last = metric.value_in(window[window.len() - 1]);

        match last.cmp(&first) {
            std::cmp::Ordering::Greater => Trend::Growing,
            std::cmp::Ordering::Less => Trend::Declining,
            std::cmp::Ordering::Equal => Trend::Stable,
        }
    }

    /// Earliest and latest stored dates plus the distinct-date count
    pub fn date_range(&self, snapshots: &[DailySnapshot]) -> Option<DateRange> {
        let first = snapshots.iter().map(|s| s.date).min()?;
        let last = snapshots.iter().map(|s| s.date).max()?;

        Some(DateRange { first, last, days: snapshots.len() })
    }

    /// Card block for a feature counter
    pub fn metric_block(
        &self,
        snapshots: &[DailySnapshot],
        today: NaiveDate,
        metric: Metric,
    ) -> MetricBlock {
        let all_time = self.latest(snapshots).map(|s| metric.value_in(s)).unwrap_or(0);
        let today_value = self.on_date(snapshots, today).map(|s| metric.value_in(s)).unwrap_or(0);
        let week = self.window(snapshots, today, self.config.week_window_days, metric);
        let month = self.window(snapshots, today, self.config.month_window_days, metric);

        MetricBlock {
            all_time,
            today: today_value,
            week_average: week.average,
            month_total: month.sum,
        }
    }

    /// Derive the full dashboard summary
    ///
    /// `all_time` and `today_counters` are the freshest live payloads; the
    /// stored history supplies everything historical.
    pub fn summary(
        &self,
        all_time: &RawCounters,
        today_counters: &RawCounters,
        snapshots: &[DailySnapshot],
        rules: &AggregationConfig,
        now: DateTime<Utc>,
    ) -> DashboardSummary {
        let today = now.date_naive();
        let today_total = today_counters.total_requests;

        let today_growth = match self.on_date(snapshots, today - Duration::days(1)) {
            Some(yesterday) => GrowthBadge::from_delta(yesterday.total, today_total),
            None => GrowthBadge::Hidden,
        };

        let average_daily = if snapshots.is_empty() {
            0
        } else {
            let sum: u64 = snapshots.iter().map(|s| s.total).sum();
            (sum as f64 / snapshots.len() as f64).round() as u64
        };

        let plain_client = self.plain_client_actions(&all_time.client, rules);

        DashboardSummary {
            all_time_total: all_time.total_requests,
            today_total,
            backend_total: all_time.backend_total(),
            client_total: all_time.client_total(),
            today_growth,
            average_daily,
            peak: self.all_time_peak(snapshots),
            date_range: self.date_range(snapshots),
            trend: self.trend(snapshots, Metric::Total),
            launches: self.metric_block(snapshots, today, Metric::UserLaunch),
            ad_requests: self.metric_block(snapshots, today, Metric::AdTotal),
            top_backend: self.top_entries(&all_time.backend, 1).into_iter().next(),
            top_client: self.top_entries(&plain_client, 1).into_iter().next(),
            generated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(date: &str, total: u64) -> DailySnapshot {
        let mut snap = DailySnapshot::new(date.parse().unwrap(), Utc::now());
        snap.total = total;
        snap.backend = total / 2;
        snap.client = total - total / 2;
        snap
    }

    fn engine() -> MetricsEngine {
        MetricsEngine::default()
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_empty_history_produces_sentinels() {
        let engine = engine();
        let empty: Vec<DailySnapshot> = Vec::new();

        assert!(engine.latest(&empty).is_none());
        assert_eq!(engine.growth_for(&empty, Metric::Total), GrowthBadge::Hidden);
        assert_eq!(
            engine.window(&empty, date("2024-01-10"), 7, Metric::Total),
            WindowAggregate::default()
        );
        assert!(engine.all_time_peak(&empty).is_none());
        assert!(engine.date_range(&empty).is_none());
        assert_eq!(engine.trend(&empty, Metric::Total), Trend::Stable);
        assert_eq!(engine.metric_block(&empty, date("2024-01-10"), Metric::Total), MetricBlock::default());
    }

    #[test]
    fn test_rolling_week_average() {
        // Totals equal the day of month, so the trailing week ending on the
        // 10th averages (4+5+6+7+8+9+10)/7 = 7.
        let snapshots: Vec<DailySnapshot> =
            (1..=10).map(|d| snapshot(&format!("2024-01-{d:02}"), d as u64)).collect();

        let window = engine().window(&snapshots, date("2024-01-10"), 7, Metric::Total);

        assert_eq!(window.count, 7);
        assert_eq!(window.sum, 49);
        assert_eq!(window.average, 7);
    }

    #[test]
    fn test_window_divides_by_days_present() {
        // Only 3 of the nominal 7 days exist; missing days are absent, not zero.
        let snapshots =
            vec![snapshot("2024-01-08", 10), snapshot("2024-01-09", 20), snapshot("2024-01-10", 30)];

        let window = engine().window(&snapshots, date("2024-01-10"), 7, Metric::Total);

        assert_eq!(window.count, 3);
        assert_eq!(window.average, 20);
    }

    #[test]
    fn test_window_excludes_dates_outside_span() {
        let snapshots = vec![
            snapshot("2024-01-01", 100),
            snapshot("2024-01-09", 20),
            snapshot("2024-01-11", 500),
        ];

        let window = engine().window(&snapshots, date("2024-01-10"), 7, Metric::Total);

        assert_eq!(window.count, 1);
        assert_eq!(window.sum, 20);
    }

    #[test]
    fn test_growth_badge_signs() {
        assert_eq!(GrowthBadge::from_delta(100, 120), GrowthBadge::Positive(20));
        assert_eq!(GrowthBadge::from_delta(120, 100), GrowthBadge::Negative(20));
        assert_eq!(GrowthBadge::from_delta(100, 100), GrowthBadge::Hidden);

        assert_eq!(GrowthBadge::Positive(20).label().unwrap(), "+20");
        assert_eq!(GrowthBadge::Negative(20).label().unwrap(), "-20");
        assert!(GrowthBadge::Hidden.label().is_none());
    }

    #[test]
    fn test_growth_hidden_below_two_dates() {
        let one = vec![snapshot("2024-01-01", 10)];
        assert_eq!(engine().growth_for(&one, Metric::Total), GrowthBadge::Hidden);
    }

    #[test]
    fn test_growth_compares_two_latest_dates() {
        let snapshots = vec![
            snapshot("2024-01-01", 5),
            snapshot("2024-01-02", 100),
            snapshot("2024-01-03", 120),
        ];

        assert_eq!(engine().growth_for(&snapshots, Metric::Total), GrowthBadge::Positive(20));
    }

    #[test]
    fn test_peak_tie_breaks_to_earliest_date() {
        let snapshots = vec![
            snapshot("2024-01-03", 70),
            snapshot("2024-01-01", 70),
            snapshot("2024-01-02", 50),
        ];

        let peak = engine().all_time_peak(&snapshots).unwrap();
        assert_eq!(peak.date, date("2024-01-01"));
        assert_eq!(peak.total, 70);
    }

    #[test]
    fn test_top_entries_tie_breaks_lexicographically() {
        let mut map = BTreeMap::new();
        map.insert("/b".to_string(), 10);
        map.insert("/a".to_string(), 10);
        map.insert("/c".to_string(), 30);

        let top = engine().top_entries(&map, 3);

        assert_eq!(top[0], ("/c".to_string(), 30));
        assert_eq!(top[1], ("/a".to_string(), 10));
        assert_eq!(top[2], ("/b".to_string(), 10));
    }

    #[test]
    fn test_plain_client_actions_excludes_ads_and_launches() {
        let rules = AggregationConfig::default();
        let mut client = BTreeMap::new();
        client.insert("ad banner".to_string(), 9);
        client.insert("user launch".to_string(), 5);
        client.insert("share".to_string(), 3);

        let plain = engine().plain_client_actions(&client, &rules);

        assert_eq!(plain.len(), 1);
        assert_eq!(plain["share"], 3);
    }

    #[test]
    fn test_trend_classification() {
        let growing = vec![snapshot("2024-01-01", 10), snapshot("2024-01-02", 20)];
        let declining = vec![snapshot("2024-01-01", 20), snapshot("2024-01-02", 10)];
        let stable = vec![snapshot("2024-01-01", 10), snapshot("2024-01-02", 10)];

        let engine = engine();
        assert_eq!(engine.trend(&growing, Metric::Total), Trend::Growing);
        assert_eq!(engine.trend(&declining, Metric::Total), Trend::Declining);
        assert_eq!(engine.trend(&stable, Metric::Total), Trend::Stable);
    }

    #[test]
    fn test_trend_looks_at_trailing_week_only() {
        // Ten days of decline followed only matters within the last 7 dates.
        let mut snapshots: Vec<DailySnapshot> =
            (1..=10).map(|d| snapshot(&format!("2024-01-{d:02}"), 100 - d as u64)).collect();
        snapshots.push(snapshot("2024-01-11", 400));

        assert_eq!(engine().trend(&snapshots, Metric::Total), Trend::Growing);
    }

    #[test]
    fn test_date_range_summary() {
        let snapshots = vec![
            snapshot("2024-01-05", 1),
            snapshot("2024-01-01", 1),
            snapshot("2024-01-03", 1),
        ];

        let range = engine().date_range(&snapshots).unwrap();
        assert_eq!(range.first, date("2024-01-01"));
        assert_eq!(range.last, date("2024-01-05"));
        assert_eq!(range.days, 3);
    }

    #[test]
    fn test_summary_on_empty_history() {
        let engine = engine();
        let rules = AggregationConfig::default();
        let counters = RawCounters::default();

        let summary = engine.summary(&counters, &counters, &[], &rules, Utc::now());

        assert_eq!(summary.all_time_total, 0);
        assert_eq!(summary.today_growth, GrowthBadge::Hidden);
        assert!(summary.peak.is_none());
        assert!(summary.date_range.is_none());
        assert!(summary.top_backend.is_none());
    }

    #[test]
    fn test_summary_growth_against_yesterday() {
        let engine = engine();
        let rules = AggregationConfig::default();
        let now = Utc::now();
        let today = now.date_naive();
        let yesterday = today - Duration::days(1);

        let snapshots =
            vec![snapshot(&yesterday.to_string(), 100), snapshot(&today.to_string(), 120)];

        let today_counters = RawCounters { total_requests: 120, ..Default::default() };

        let summary = engine.summary(&RawCounters::default(), &today_counters, &snapshots, &rules, now);

        assert_eq!(summary.today_growth, GrowthBadge::Positive(20));
    }
}
