use config::{Config, Environment};
use serde::Deserialize;
use std::time::Duration;
use url::Url;

use crate::models::CheckTarget;
use crate::utils::error::{AppError, Result};

pub const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";
pub const DEFAULT_PAGE_LOAD_TIMEOUT: Duration = Duration::from_secs(90);
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(5);
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/100.0.4896.127 Safari/537.36";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub telegram: TelegramConfig,
    pub scheduler: SchedulerConfig,
    pub scraper: ScraperConfig,
    pub target: CheckTarget,
}

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
    pub api_base: String,
}

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub check_interval: Duration,
    pub notify_on_error: bool,
}

#[derive(Debug, Clone)]
pub struct ScraperConfig {
    pub page_load_timeout: Duration,
    pub settle_delay: Duration,
    pub user_agent: String,
    pub chrome_path: Option<String>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            page_load_timeout: DEFAULT_PAGE_LOAD_TIMEOUT,
            settle_delay: DEFAULT_SETTLE_DELAY,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            chrome_path: None,
        }
    }
}

/// Raw environment, keys lowercased by the `config` crate.
#[derive(Debug, Default, Deserialize)]
struct EnvSettings {
    tg_token: Option<String>,
    tg_chat_id: Option<String>,
    tg_api_base: Option<String>,
    check_interval: Option<String>,
    notify_on_error: Option<bool>,
    page_load_timeout: Option<String>,
    settle_delay: Option<String>,
    user_agent: Option<String>,
    chrome_path: Option<String>,
    target_url: Option<String>,
    container_selector: Option<String>,
    item_selector: Option<String>,
    availability_selector: Option<String>,
    target_item_text: Option<String>,
}

fn required(value: Option<String>, name: &str) -> Result<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Config(format!("{} environment variable not set", name)))
}

fn parse_duration(value: &str, name: &str) -> Result<Duration> {
    let duration = humantime::parse_duration(value.trim()).map_err(|e| {
        AppError::Config(format!(
            "Invalid format for {} ('{}'), expected e.g. '5m' or '1h30m': {}",
            name, value, e
        ))
    })?;

    if duration.is_zero() {
        return Err(AppError::Config(format!("{} must be greater than 0", name)));
    }
    Ok(duration)
}

fn optional_duration(value: Option<String>, name: &str, default: Duration) -> Result<Duration> {
    match value {
        Some(v) if !v.trim().is_empty() => parse_duration(&v, name),
        _ => Ok(default),
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_source(Environment::default().ignore_empty(true))
    }

    pub fn from_source(source: Environment) -> Result<Self> {
        let settings: EnvSettings = Config::builder()
            .add_source(source)
            .build()?
            .try_deserialize()?;

        let bot_token = required(settings.tg_token, "TG_TOKEN")?;
        let chat_id = required(settings.tg_chat_id, "TG_CHAT_ID")?;
        let check_interval = parse_duration(
            &required(settings.check_interval, "CHECK_INTERVAL")?,
            "CHECK_INTERVAL",
        )?;

        let defaults = CheckTarget::default();
        let target = CheckTarget {
            page_url: settings.target_url.unwrap_or(defaults.page_url),
            container_selector: settings.container_selector.unwrap_or(defaults.container_selector),
            item_selector: settings.item_selector.unwrap_or(defaults.item_selector),
            availability_selector: settings
                .availability_selector
                .unwrap_or(defaults.availability_selector),
            target_item_text: settings.target_item_text.unwrap_or(defaults.target_item_text),
        };

        let config = AppConfig {
            telegram: TelegramConfig {
                bot_token,
                chat_id,
                api_base: settings
                    .tg_api_base
                    .unwrap_or_else(|| DEFAULT_TELEGRAM_API_BASE.to_string()),
            },
            scheduler: SchedulerConfig {
                check_interval,
                notify_on_error: settings.notify_on_error.unwrap_or(false),
            },
            scraper: ScraperConfig {
                page_load_timeout: optional_duration(
                    settings.page_load_timeout,
                    "PAGE_LOAD_TIMEOUT",
                    DEFAULT_PAGE_LOAD_TIMEOUT,
                )?,
                settle_delay: optional_duration(
                    settings.settle_delay,
                    "SETTLE_DELAY",
                    DEFAULT_SETTLE_DELAY,
                )?,
                user_agent: settings
                    .user_agent
                    .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
                chrome_path: settings.chrome_path.filter(|p| !p.trim().is_empty()),
            },
            target,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if Url::parse(&self.telegram.api_base).is_err() {
            return Err(AppError::Config("Invalid TG_API_BASE URL format".into()));
        }

        if self.scraper.settle_delay >= self.scraper.page_load_timeout {
            return Err(AppError::Config(
                "SETTLE_DELAY must be shorter than PAGE_LOAD_TIMEOUT".into(),
            ));
        }

        self.target.validate()
    }
}
