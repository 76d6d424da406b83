//! This module assembles broadcast events for a batch of bangumi and builds
//! the resulting iCalendar.

use std::collections::HashMap;

use anyhow::Result;
use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime};
use ical::{
    generator::{IcalCalendar, IcalCalendarBuilder, IcalEvent, IcalEventBuilder, Property},
    ical_property,
};
use regex::Regex;

use crate::{
    catalog::{Bangumi, SiteMeta},
    schedule::{on_air_times, ScheduleConfig},
    sites::{description, preferred_url, site_list},
};

static PROD_ID: &str = "-//OnAirCalendar//bangumi-data";
static FORMAT: &str = "%Y%m%dT%H%M%S";

/// One future broadcast of one episode.
#[derive(Debug, Clone, PartialEq)]
pub struct OnAirEvent {
    pub start: NaiveDateTime,
    pub duration_minutes: u32,
    pub title: String,
    pub description: String,
    pub url: String,
}

/// Interactive collaborator answering the two scheduling questions. A
/// terminal implementation lives in the CLI; tests script the answers.
pub trait EpisodePrompt {
    /// Whether episode counts are entered manually, asked once per batch.
    fn confirm_manual(&mut self) -> Result<bool>;
    /// The remaining episode count of one bangumi, an integer >= 1.
    fn episode_count(&mut self, title: &str) -> Result<u32>;
}

/// Turn a batch of bangumi into broadcast events, anime-major and
/// chronological within each anime.
///
/// `prompt` is asked once whether counts are entered manually; only then it
/// is asked again, once per bangumi, for the remaining episode count.
pub fn assemble(
    items: &[Bangumi],
    site_meta: &HashMap<String, SiteMeta>,
    now: &DateTime<FixedOffset>,
    config: &ScheduleConfig,
    prompt: &mut dyn EpisodePrompt,
) -> Result<Vec<OnAirEvent>> {
    let manual = prompt.confirm_manual()?;
    let mut events = vec![];
    for bangumi in items {
        let sites = site_list(bangumi, site_meta);
        let episode_count = if manual {
            Some(prompt.episode_count(&bangumi.title)?)
        } else {
            None
        };
        for start in on_air_times(bangumi, now, episode_count, config) {
            events.push(OnAirEvent {
                start,
                duration_minutes: config.episode_minutes,
                title: String::from(bangumi.display_name()),
                description: description(&sites),
                url: preferred_url(&sites, config),
            });
        }
    }
    Ok(events)
}

/// Build the calendar from the assembled events.
pub fn get_calendar(events: &[OnAirEvent], tzid: &str) -> IcalCalendar {
    let changed = chrono::Local::now().format(FORMAT).to_string();
    let mut calendar = IcalCalendarBuilder::version("2.0")
        .gregorian()
        .prodid(PROD_ID)
        .build();
    for event in events {
        calendar.events.push(get_event(event, tzid, &changed));
    }
    calendar
}

fn get_event(event: &OnAirEvent, tzid: &str, changed: &str) -> IcalEvent {
    let end = event.start + Duration::minutes(i64::from(event.duration_minutes));
    IcalEventBuilder::tzid(tzid)
        .uid(uid(&event.title, &event.start))
        .changed(changed)
        .start(event.start.format(FORMAT).to_string())
        .end(end.format(FORMAT).to_string())
        .set(ical_property!("SUMMARY", event.title.as_str()))
        .set(ical_property!(
            "DESCRIPTION",
            event.description.replace('\n', "\\n")
        ))
        .set(ical_property!("URL", event.url.as_str()))
        .build()
}

/// Get a unique id for one broadcast of one bangumi.
///
/// Changing this function is a breaking change!
fn uid(title: &str, start: &NaiveDateTime) -> String {
    let whitespace_regex = Regex::new(r"\s+").unwrap();
    let title = whitespace_regex.replace_all(title, "-");
    format!("Bangumi_{}_{}@bangumi-data", title, start.format(FORMAT))
}
