//! This module computes the future weekly broadcast times of one bangumi.

use chrono::{DateTime, Datelike, Duration, FixedOffset, Months, NaiveDateTime, Timelike};
use serde::Deserialize;

use crate::catalog::Bangumi;

/// Schedule generation settings. A TOML configuration file may override any
/// subset of the fields.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// episodes assumed for a new season
    pub episodes_per_season: u32,
    /// how many months of slots to extrapolate for continuing bangumi
    pub old_bangumi_months: u32,
    /// length of one episode in minutes
    pub episode_minutes: u32,
    /// site ids to prefer, in order, when picking an event URL
    pub prefer_sites: Vec<String>,
    /// event URL used when a bangumi has no resolvable site
    pub fallback_url: String,
    /// how often a failing prompt channel is retried before giving up
    pub max_prompt_retries: u32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            episodes_per_season: 12,
            old_bangumi_months: 3,
            episode_minutes: 24,
            prefer_sites: ["bilibili", "iqiyi", "qq", "youku", "netflix"]
                .map(String::from)
                .to_vec(),
            fallback_url: String::from("https://bgm.tv"),
            max_prompt_retries: 3,
        }
    }
}

/// Compute the broadcast times of `bangumi`, in `now`'s local clock.
///
/// Without an explicit `episode_count`, a new bangumi gets
/// [`ScheduleConfig::episodes_per_season`] weekly slots from its begin time,
/// keeping only those after `now`, and a continuing bangumi gets every weekly
/// slot from its aligned anchor until `now` plus
/// [`ScheduleConfig::old_bangumi_months`]. With an explicit count (manual
/// mode) both kinds get exactly `episode_count` slots from their starting
/// point, keeping only those after `now`.
pub fn on_air_times(
    bangumi: &Bangumi,
    now: &DateTime<FixedOffset>,
    episode_count: Option<u32>,
    config: &ScheduleConfig,
) -> Vec<NaiveDateTime> {
    let begin = bangumi.begin.with_timezone(now.offset()).naive_local();
    let now = now.naive_local();
    match episode_count {
        Some(count) => {
            let start = if bangumi.is_new {
                begin
            } else {
                old_bangumi_anchor(begin, now)
            };
            future_slots(start, now, count)
        }
        None if bangumi.is_new => future_slots(begin, now, config.episodes_per_season),
        None => {
            let mut slot = old_bangumi_anchor(begin, now);
            let end = now
                .checked_add_months(Months::new(config.old_bangumi_months))
                .unwrap();
            let mut result = vec![];
            while slot < end {
                result.push(slot);
                slot += Duration::weeks(1);
            }
            result
        }
    }
}

/// Weekly slots from `start`, keeping only those strictly after `now`. The
/// stride is applied on every iteration, included or not.
fn future_slots(start: NaiveDateTime, now: NaiveDateTime, count: u32) -> Vec<NaiveDateTime> {
    let mut slot = start;
    let mut result = vec![];
    for _ in 0..count {
        if slot > now {
            result.push(slot);
        }
        slot += Duration::weeks(1);
    }
    result
}

/// Align a continuing bangumi onto `now`: keep begin's time of day on now's
/// date when the weekdays match, otherwise jump to begin's weekday in the week
/// after now's. The jump can overshoot the nearest occurrence of that weekday.
fn old_bangumi_anchor(begin: NaiveDateTime, now: NaiveDateTime) -> NaiveDateTime {
    let aligned = now
        .with_hour(begin.hour())
        .and_then(|time| time.with_minute(begin.minute()))
        .and_then(|time| time.with_second(begin.second()))
        .unwrap();
    if now.weekday() == begin.weekday() {
        return aligned;
    }
    let days = begin.weekday().num_days_from_sunday() as i64 + 7
        - now.weekday().num_days_from_sunday() as i64;
    aligned + Duration::days(days)
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, str::FromStr};

    use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime, Timelike};

    use crate::{
        catalog::Bangumi,
        schedule::{on_air_times, ScheduleConfig},
    };

    fn bangumi(begin: &str, is_new: bool) -> Bangumi {
        Bangumi {
            title: String::from("test"),
            title_translate: HashMap::new(),
            begin: DateTime::parse_from_rfc3339(begin).unwrap(),
            is_new,
            sites: vec![],
        }
    }

    /// Friday noon, UTC+8.
    fn get_now() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2023-10-20T12:00:00+08:00").unwrap()
    }

    fn assert_weekly_stride(times: &[NaiveDateTime]) {
        for pair in times.windows(2) {
            assert_eq!(pair[1] - pair[0], Duration::weeks(1));
            assert_eq!(pair[1].hour(), pair[0].hour());
            assert_eq!(pair[1].minute(), pair[0].minute());
        }
    }

    #[test]
    fn test_new_bangumi_future_begin() {
        // Monday 20:00, after now
        let bangumi = bangumi("2023-10-23T20:00:00+08:00", true);
        let times = on_air_times(&bangumi, &get_now(), None, &ScheduleConfig::default());
        assert_eq!(times.len(), 12);
        assert_eq!(
            times[0],
            NaiveDateTime::from_str("2023-10-23T20:00:00").unwrap()
        );
        assert_weekly_stride(&times);
    }

    #[test]
    fn test_new_bangumi_started_weeks_ago() {
        // Monday 20:00, three slots already aired
        let bangumi = bangumi("2023-10-02T20:00:00+08:00", true);
        let times = on_air_times(&bangumi, &get_now(), None, &ScheduleConfig::default());
        assert_eq!(times.len(), 9);
        assert_eq!(
            times[0],
            NaiveDateTime::from_str("2023-10-23T20:00:00").unwrap()
        );
        assert_weekly_stride(&times);
    }

    #[test]
    fn test_new_bangumi_entirely_past() {
        let bangumi = bangumi("2020-01-06T20:00:00+08:00", true);
        let times = on_air_times(&bangumi, &get_now(), None, &ScheduleConfig::default());
        assert!(times.is_empty());
    }

    #[test]
    fn test_old_bangumi_same_weekday() {
        // began on a Friday, like now
        let bangumi = bangumi("1999-10-22T09:30:00+08:00", false);
        let times = on_air_times(&bangumi, &get_now(), None, &ScheduleConfig::default());
        // anchored onto now's date, begin's time of day, no future-only filter
        assert_eq!(
            times[0],
            NaiveDateTime::from_str("2023-10-20T09:30:00").unwrap()
        );
        // weekly until now + 3 months (2024-01-20 12:00), last slot 2024-01-19
        assert_eq!(times.len(), 14);
        assert_eq!(
            *times.last().unwrap(),
            NaiveDateTime::from_str("2024-01-19T09:30:00").unwrap()
        );
        assert_weekly_stride(&times);
    }

    #[test]
    fn test_old_bangumi_weekday_overshoot() {
        // began on a Saturday; the next Saturday would be 2023-10-21, but the
        // anchor jumps a full week past it
        let bangumi = bangumi("2023-10-07T23:00:00+08:00", false);
        let times = on_air_times(&bangumi, &get_now(), None, &ScheduleConfig::default());
        assert_eq!(
            times[0],
            NaiveDateTime::from_str("2023-10-28T23:00:00").unwrap()
        );
        assert_weekly_stride(&times);
    }

    #[test]
    fn test_manual_count_new_bangumi() {
        let bangumi = bangumi("2023-10-23T20:00:00+08:00", true);
        let times = on_air_times(&bangumi, &get_now(), Some(5), &ScheduleConfig::default());
        assert_eq!(times.len(), 5);
        assert_eq!(
            times[0],
            NaiveDateTime::from_str("2023-10-23T20:00:00").unwrap()
        );
    }

    #[test]
    fn test_manual_count_old_bangumi_filters_past_anchor() {
        // anchor lands at 09:30 today, before now, so the first of the three
        // requested slots is dropped
        let bangumi = bangumi("1999-10-22T09:30:00+08:00", false);
        let times = on_air_times(&bangumi, &get_now(), Some(3), &ScheduleConfig::default());
        assert_eq!(times.len(), 2);
        assert_eq!(
            times[0],
            NaiveDateTime::from_str("2023-10-27T09:30:00").unwrap()
        );
    }

    #[test]
    fn test_year_rollover() {
        let now = DateTime::parse_from_rfc3339("2023-12-20T12:00:00+08:00").unwrap();
        let bangumi = bangumi("2023-12-25T20:00:00+08:00", true);
        let times = on_air_times(&bangumi, &now, None, &ScheduleConfig::default());
        assert_eq!(
            times[1],
            NaiveDateTime::from_str("2024-01-01T20:00:00").unwrap()
        );
        assert_weekly_stride(&times);
    }

    #[test]
    fn test_begin_offset_converted_to_now_offset() {
        // 15:00 UTC is 23:00 in UTC+8
        let bangumi = bangumi("2023-10-23T15:00:00+00:00", true);
        let times = on_air_times(&bangumi, &get_now(), None, &ScheduleConfig::default());
        assert_eq!(
            times[0],
            NaiveDateTime::from_str("2023-10-23T23:00:00").unwrap()
        );
    }
}
