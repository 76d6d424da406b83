//! This module loads the bangumi-data catalog and selects the currently
//! airing items.

use std::collections::HashMap;

use anyhow::Result;
use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime};
use serde::Deserialize;

static DATA_URL: &str = "https://unpkg.com/bangumi-data@0.3/dist/data.json";

/// The whole bangumi-data dataset: the site-metadata table plus every item
/// ever catalogued.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BangumiData {
    pub site_meta: HashMap<String, SiteMeta>,
    pub items: Vec<Item>,
}

/// Metadata of one external site, keyed by site id in [`BangumiData::site_meta`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteMeta {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url_template: String,
    /// `onair` for broadcast platforms, `info` for informational pages.
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// A raw catalog entry. `begin` and `end` are RFC 3339 strings and may be
/// empty for items without known dates.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub title: String,
    #[serde(default)]
    pub title_translate: HashMap<String, Vec<String>>,
    #[serde(default)]
    pub begin: String,
    #[serde(default)]
    pub end: String,
    #[serde(default)]
    pub sites: Vec<SiteRef>,
}

/// A reference from an item to an external site.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteRef {
    pub site: String,
    #[serde(default)]
    pub id: String,
}

/// A validated, currently airing bangumi as consumed by the schedule engine.
#[derive(Debug, Clone)]
pub struct Bangumi {
    pub title: String,
    pub title_translate: HashMap<String, Vec<String>>,
    pub begin: DateTime<FixedOffset>,
    pub is_new: bool,
    pub sites: Vec<SiteRef>,
}

impl Bangumi {
    /// The display name: the first simplified-Chinese translated title if one
    /// exists, the raw title otherwise.
    pub fn display_name(&self) -> &str {
        self.title_translate
            .get("zh-Hans")
            .and_then(|titles| titles.first())
            .map(String::as_str)
            .unwrap_or(&self.title)
    }
}

impl BangumiData {
    /// Parse a dataset from its JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        let data = serde_json::from_str(json)?;
        Ok(data)
    }

    /// Select the items airing around `now`: an item is on air when its `end`
    /// is empty and its `begin` parses. An item is a new bangumi when it
    /// began on or after the current season boundary, a continuing one
    /// otherwise.
    pub fn on_air_items(&self, now: &DateTime<FixedOffset>) -> Vec<Bangumi> {
        let season = season_begin(now);
        self.items
            .iter()
            .filter(|item| item.end.is_empty())
            .filter_map(|item| {
                let begin = DateTime::parse_from_rfc3339(&item.begin).ok()?;
                Some(Bangumi {
                    title: item.title.clone(),
                    title_translate: item.title_translate.clone(),
                    begin,
                    is_new: begin.with_timezone(now.offset()).naive_local() >= season,
                    sites: item.sites.clone(),
                })
            })
            .collect()
    }
}

/// Get the dataset from the published bangumi-data bundle.
pub async fn fetch() -> Result<BangumiData> {
    let client = reqwest::Client::new();
    let response = client.get(DATA_URL).send().await?;
    let data = BangumiData::from_json(&response.text().await?)?;
    Ok(data)
}

/// The start of the broadcast season `now` falls in: January, April, July or
/// October 1st, midnight local time.
fn season_begin(now: &DateTime<FixedOffset>) -> NaiveDateTime {
    let month = now.month0() / 3 * 3 + 1;
    NaiveDate::from_ymd_opt(now.year(), month, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}
