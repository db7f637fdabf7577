use std::{fs, path::Path, time::Duration};

use anyhow::{anyhow, Context};
use clap::ValueEnum;
use form_core::ValidationStrategy;
use gateway::{OutcomePolicy, DEFAULT_DELAY, DEFAULT_FAILURE_RATE};

pub const CONFIG_FILE: &str = "form_demo.toml";
const ENV_PREFIX: &str = "APP__";
const KEYS: [&str; 6] = [
    "strategy",
    "gateway_delay_ms",
    "outcome",
    "failure_rate",
    "seed",
    "log_filter",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutcomeMode {
    Random,
    Succeed,
    Fail,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub strategy: ValidationStrategy,
    pub gateway_delay_ms: u64,
    pub outcome: OutcomeMode,
    pub failure_rate: f64,
    pub seed: Option<u64>,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            strategy: ValidationStrategy::default(),
            gateway_delay_ms: DEFAULT_DELAY.as_millis() as u64,
            outcome: OutcomeMode::Random,
            failure_rate: DEFAULT_FAILURE_RATE,
            seed: None,
            log_filter: "info".into(),
        }
    }
}

impl Settings {
    pub fn gateway_delay(&self) -> Duration {
        Duration::from_millis(self.gateway_delay_ms)
    }

    pub fn outcome_policy(&self) -> OutcomePolicy {
        match self.outcome {
            OutcomeMode::Random => OutcomePolicy::Random {
                failure_rate: self.failure_rate,
            },
            OutcomeMode::Succeed => OutcomePolicy::AlwaysSucceed,
            OutcomeMode::Fail => OutcomePolicy::AlwaysFail,
        }
    }
}

/// Defaults, then `form_demo.toml` in the working directory, then `APP__*`
/// environment variables.
pub fn load_settings() -> anyhow::Result<Settings> {
    load_settings_from(Path::new(CONFIG_FILE), |key| std::env::var(key).ok())
}

pub fn load_settings_from(
    file: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(file) {
        let table: toml::Table = toml::from_str(&raw)
            .with_context(|| format!("failed to parse config file '{}'", file.display()))?;
        for key in KEYS {
            if let Some(value) = table.get(key) {
                let value = match value {
                    toml::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                apply_setting(&mut settings, key, &value)
                    .with_context(|| format!("in config file '{}'", file.display()))?;
            }
        }
    }

    for key in KEYS {
        let var = format!("{ENV_PREFIX}{}", key.to_ascii_uppercase());
        if let Some(value) = env(&var) {
            apply_setting(&mut settings, key, &value)
                .with_context(|| format!("in environment variable {var}"))?;
        }
    }

    Ok(settings)
}

fn apply_setting(settings: &mut Settings, key: &str, raw: &str) -> anyhow::Result<()> {
    let raw = raw.trim();
    match key {
        "strategy" => settings.strategy = raw.parse()?,
        "gateway_delay_ms" => {
            settings.gateway_delay_ms = raw
                .parse()
                .with_context(|| format!("invalid gateway_delay_ms '{raw}'"))?;
        }
        "outcome" => {
            settings.outcome = OutcomeMode::from_str(raw, true).map_err(|_| {
                anyhow!("invalid outcome '{raw}', expected random, succeed or fail")
            })?;
        }
        "failure_rate" => {
            let rate: f64 = raw
                .parse()
                .with_context(|| format!("invalid failure_rate '{raw}'"))?;
            if !(0.0..=1.0).contains(&rate) {
                return Err(anyhow!("failure_rate must be between 0 and 1, got {rate}"));
            }
            settings.failure_rate = rate;
        }
        "seed" => {
            settings.seed = Some(raw.parse().with_context(|| format!("invalid seed '{raw}'"))?);
        }
        "log_filter" => settings.log_filter = raw.to_string(),
        _ => return Err(anyhow!("unknown setting '{key}'")),
    }
    Ok(())
}
