//! This module implements the interactive prompts on the terminal.

use anyhow::Result;
use boc_core::onair_calendar::EpisodePrompt;
use dialoguer::{Confirm, Input};
use owo_colors::OwoColorize;

static COUNT_VALIDATION_MSG: &str = "请输入一个大于等于 1 的正整数。";

/// Prompts answered on the terminal. A failing prompt channel is logged and
/// retried up to `max_delivery_retries` times before the error propagates;
/// invalid answers re-prompt without limit.
pub struct TerminalPrompt {
    max_delivery_retries: u32,
}

impl TerminalPrompt {
    pub fn new(max_delivery_retries: u32) -> Self {
        Self {
            max_delivery_retries,
        }
    }

    fn with_retry<T>(&self, mut interact: impl FnMut() -> Result<T>) -> Result<T> {
        let mut failures = 0;
        loop {
            match interact() {
                Ok(value) => return Ok(value),
                Err(error) if failures < self.max_delivery_retries => {
                    failures += 1;
                    eprintln!("{}", error.to_string().red());
                }
                Err(error) => return Err(error),
            }
        }
    }
}

impl EpisodePrompt for TerminalPrompt {
    fn confirm_manual(&mut self) -> Result<bool> {
        self.with_retry(|| {
            let state = Confirm::new()
                .with_prompt("是否手动输入番剧集数")
                .default(false)
                .interact()?;
            Ok(state)
        })
    }

    fn episode_count(&mut self, title: &str) -> Result<u32> {
        self.with_retry(|| loop {
            let input: String = Input::new()
                .with_prompt(format!("{title} 有多少集未播出"))
                .interact_text()?;
            match parse_episode_count(&input) {
                Ok(count) => return Ok(count),
                Err(message) => eprintln!("{}", message.red()),
            }
        })
    }
}

/// Parse a remaining-episode answer, accepting only integers >= 1.
fn parse_episode_count(input: &str) -> Result<u32, &'static str> {
    match input.trim().parse::<u32>() {
        Ok(count) if count >= 1 => Ok(count),
        _ => Err(COUNT_VALIDATION_MSG),
    }
}
