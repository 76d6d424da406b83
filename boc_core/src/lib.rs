//! This crate turns the public bangumi-data catalog into an iCalendar of
//! future anime broadcast times, one event per episode.
//!
//! The catalog is read from <https://unpkg.com/bangumi-data@0.3/dist/data.json>.

pub use ical;

pub mod catalog;
pub mod onair_calendar;
pub mod schedule;
pub mod sites;
