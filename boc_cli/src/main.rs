use std::{fs, path::PathBuf};

use anyhow::Result;
use boc_core::{
    catalog,
    catalog::BangumiData,
    ical::generator::Emitter,
    onair_calendar,
    schedule::ScheduleConfig,
};
use chrono::Local;
use clap::Parser;

mod prompt;

use crate::prompt::TerminalPrompt;

#[derive(Debug, Parser)]
pub struct Arguments {
    /// read the bangumi-data catalog from a JSON file instead of fetching it
    #[arg(long)]
    pub data: Option<PathBuf>,
    /// a TOML file overriding the schedule configuration defaults
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// where to write the iCalendar file
    #[arg(long, default_value = "onair.ics")]
    pub output: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Arguments::parse();
    let config: ScheduleConfig = match &args.config {
        Some(path) => toml::from_str(&fs::read_to_string(path)?)?,
        None => ScheduleConfig::default(),
    };
    let data = match &args.data {
        Some(path) => BangumiData::from_json(&fs::read_to_string(path)?)?,
        None => catalog::fetch().await?,
    };
    let now = Local::now().fixed_offset();
    let items = data.on_air_items(&now);
    let mut prompt = TerminalPrompt::new(config.max_prompt_retries);
    let events = onair_calendar::assemble(&items, &data.site_meta, &now, &config, &mut prompt)?;
    let calendar = onair_calendar::get_calendar(&events, &iana_time_zone::get_timezone()?);
    fs::write(&args.output, calendar.generate())?;
    Ok(())
}
