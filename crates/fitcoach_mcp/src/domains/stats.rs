//! Weekly training statistics.
//!
//! [`StatsAggregator::compute_weekly_stats`] reads one user's workouts for the
//! Monday-start week around a reference instant and folds them into a
//! [`StatsSummary`]. Two behaviours are kept on purpose:
//!
//! - `daily_stats` lists weekdays in the order they were first seen in the
//!   fetched rows, not Monday to Sunday. Use [`StatsSummary::calendar_ordered`]
//!   for a calendar view.
//! - `average_duration_minutes` divides the summed duration of finished
//!   workouts by the count of *all* workouts, so open sessions pull it down.
//!
//! The "local calendar" is the UTC offset carried by the reference instant.
//! A week that crosses a DST change is bucketed with a single offset.

use std::sync::Arc;

use chrono::{
    DateTime, Datelike, Days, FixedOffset, Local, NaiveDate, NaiveTime, TimeDelta, Utc, Weekday,
};
use fitcoach_client::{FitnessStore, WorkoutRecord};
use schemars::JsonSchema;
use serde::Serialize;

/// Workouts per week the progress card measures against.
pub const DEFAULT_WEEKLY_GOAL: u32 = 7;

#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct DailyStat {
    /// Weekday abbreviation ("Mon" .. "Sun")
    pub day: String,
    pub workout_count: u32,
    /// Kilograms
    pub total_weight: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, JsonSchema)]
pub struct StatsSummary {
    pub daily_stats: Vec<DailyStat>,
    pub total_workouts: u32,
    pub average_duration_minutes: f64,
    /// Kilograms
    pub total_weight_lifted: f64,
}

impl StatsSummary {
    /// Fold workouts into a summary. `offset` decides which weekday a start
    /// time falls on.
    pub fn from_workouts(workouts: &[WorkoutRecord], offset: FixedOffset) -> Self {
        let mut daily_stats: Vec<DailyStat> = Vec::new();
        let mut total_weight_lifted = 0.0;
        let mut finished_millis: i64 = 0;

        for workout in workouts {
            let day = weekday_abbrev(workout.start_time.with_timezone(&offset).weekday());
            let volume = workout.total_volume();

            match daily_stats.iter_mut().find(|d| d.day == day) {
                Some(bucket) => {
                    bucket.workout_count += 1;
                    bucket.total_weight += volume;
                }
                None => daily_stats.push(DailyStat {
                    day: day.to_string(),
                    workout_count: 1,
                    total_weight: volume,
                }),
            }

            total_weight_lifted += volume;
            if let Some(ms) = workout.duration_millis() {
                finished_millis += ms;
            }
        }

        let total_workouts = u32::try_from(workouts.len()).unwrap_or(u32::MAX);
        let average_duration_minutes = if total_workouts == 0 {
            0.0
        } else {
            finished_millis as f64 / (f64::from(total_workouts) * 60_000.0)
        };

        Self {
            daily_stats,
            total_workouts,
            average_duration_minutes,
            total_weight_lifted,
        }
    }

    /// Daily buckets sorted Monday to Sunday.
    pub fn calendar_ordered(&self) -> Vec<DailyStat> {
        let mut days = self.daily_stats.clone();
        days.sort_by_key(|d| weekday_rank(&d.day));
        days
    }

    /// Share of `goal` reached this week, in percent. Not capped at 100.
    pub fn goal_progress_percent(&self, goal: u32) -> f64 {
        if goal == 0 {
            return 0.0;
        }
        f64::from(self.total_workouts) / f64::from(goal) * 100.0
    }
}

/// Inclusive bounds of a Monday-start calendar week.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsWindow {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

impl StatsWindow {
    /// Monday 00:00:00.000 to Sunday 23:59:59.999 of the week holding
    /// `reference`, in the reference's own offset.
    pub fn containing(reference: DateTime<FixedOffset>) -> Self {
        let offset = *reference.offset();
        let back = u64::from(reference.weekday().num_days_from_monday());
        let monday = reference.date_naive() - Days::new(back);
        let start = at_midnight(monday, offset);
        let end = start + TimeDelta::days(7) - TimeDelta::milliseconds(1);
        Self { start, end }
    }

    pub fn start_utc(&self) -> DateTime<Utc> {
        self.start.with_timezone(&Utc)
    }

    pub fn end_utc(&self) -> DateTime<Utc> {
        self.end.with_timezone(&Utc)
    }

    pub fn offset(&self) -> FixedOffset {
        *self.start.offset()
    }
}

fn at_midnight(date: NaiveDate, offset: FixedOffset) -> DateTime<FixedOffset> {
    let local = date.and_time(NaiveTime::MIN);
    let utc = local - TimeDelta::seconds(i64::from(offset.local_minus_utc()));
    DateTime::<Utc>::from_naive_utc_and_offset(utc, Utc).with_timezone(&offset)
}

fn weekday_abbrev(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
        Weekday::Sun => "Sun",
    }
}

fn weekday_rank(abbrev: &str) -> u8 {
    match abbrev {
        "Mon" => 0,
        "Tue" => 1,
        "Wed" => 2,
        "Thu" => 3,
        "Fri" => 4,
        "Sat" => 5,
        "Sun" => 6,
        _ => 7,
    }
}

/// Parse a caller-supplied reference date.
///
/// RFC 3339 keeps its own offset. A bare `YYYY-MM-DD` is read as noon on that
/// day in `fallback` so the week does not shift at either edge.
pub fn parse_reference_date(raw: &str, fallback: FixedOffset) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt);
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
    Some(at_midnight(date, fallback) + TimeDelta::hours(12))
}

/// Now, in the process's local offset.
pub fn local_now() -> DateTime<FixedOffset> {
    Local::now().fixed_offset()
}

/// Reads a week of workouts and folds them. Holds only a store handle, so it
/// is cheap to clone and safe to share between concurrent callers.
#[derive(Clone)]
pub struct StatsAggregator {
    store: Arc<dyn FitnessStore>,
}

impl StatsAggregator {
    pub fn new(store: Arc<dyn FitnessStore>) -> Self {
        Self { store }
    }

    /// Never fails: a store error is logged and reported as an all-zero summary.
    pub async fn compute_weekly_stats(
        &self,
        user_id: &str,
        reference: DateTime<FixedOffset>,
    ) -> StatsSummary {
        let window = StatsWindow::containing(reference);
        match self
            .store
            .get_workouts_in_range(user_id, window.start_utc(), window.end_utc())
            .await
        {
            Ok(workouts) => {
                tracing::debug!(
                    user_id,
                    week_start = %window.start,
                    workouts = workouts.len(),
                    "weekly stats fetched"
                );
                StatsSummary::from_workouts(&workouts, window.offset())
            }
            Err(e) => {
                tracing::warn!(user_id, week_start = %window.start, error = %e, "weekly stats fetch failed; reporting empty week");
                StatsSummary::default()
            }
        }
    }
}
