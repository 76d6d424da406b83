//! This module resolves a bangumi's site references into displayable records.

use std::collections::HashMap;

use crate::{
    catalog::{Bangumi, SiteMeta},
    schedule::ScheduleConfig,
};

static NO_ON_AIR_MSG: &str = "无";

/// One resolved site of a bangumi.
#[derive(Debug, Clone, PartialEq)]
pub struct OnAirSite {
    pub site: String,
    pub title: String,
    pub url: String,
}

/// Resolve the sites of `bangumi` against the metadata table, in catalog
/// order. Unknown site ids and entries without a title or URL template are
/// skipped. Informational sites are kept alongside broadcast sites so that
/// the list stays non-empty for shows without a streaming platform.
pub fn site_list(bangumi: &Bangumi, site_meta: &HashMap<String, SiteMeta>) -> Vec<OnAirSite> {
    bangumi
        .sites
        .iter()
        .filter_map(|site| {
            let meta = site_meta.get(&site.site)?;
            if meta.title.is_empty() || meta.url_template.is_empty() {
                return None;
            }
            Some(OnAirSite {
                site: site.site.clone(),
                title: meta.title.clone(),
                url: meta.url_template.replace("{{id}}", &site.id),
            })
        })
        .collect()
}

/// Render a site list into the event description, one `标题：URL` line per
/// site, or `无` when there is none.
pub fn description(sites: &[OnAirSite]) -> String {
    if sites.is_empty() {
        return String::from(NO_ON_AIR_MSG);
    }
    sites
        .iter()
        .map(|site| format!("{}：{}", site.title, site.url))
        .collect::<Vec<String>>()
        .join("\n")
}

/// Pick the event URL: the first site matching the configured preference
/// order, the first site otherwise, the configured fallback when the list is
/// empty.
pub fn preferred_url(sites: &[OnAirSite], config: &ScheduleConfig) -> String {
    if sites.is_empty() {
        return config.fallback_url.clone();
    }
    config
        .prefer_sites
        .iter()
        .find_map(|prefer| sites.iter().find(|site| site.site == *prefer))
        .unwrap_or(&sites[0])
        .url
        .clone()
}
