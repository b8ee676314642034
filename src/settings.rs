use std::path::PathBuf;

use anyhow::{Context, Result};
use config::Config;
use serde::Deserialize;

use crate::parser::extract::award::AwardPolicy;
use crate::parser::extract::site::DOMAIN_AGENCIES;
use crate::parser::extract::ExtractOptions;

const ENV_PREFIX: &str = "FOA";

/// Runtime settings, read from `FOA_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub user_agent: String,
    pub timeout_secs: u64,
    pub concurrency: usize,
    pub section_cap: usize,
    pub date_window: usize,
    pub award_policy: AwardPolicy,
    pub out_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            user_agent: concat!("foa_tagger/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: 30,
            concurrency: 4,
            section_cap: 500,
            date_window: 80,
            award_policy: AwardPolicy::FirstInDocument,
            out_dir: PathBuf::from("./out"),
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self> {
        let cfg = Config::builder()
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .context("Failed to read FOA_* settings")?;
        cfg.try_deserialize().context("Invalid FOA_* settings")
    }

    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            section_cap: self.section_cap,
            date_window: self.date_window,
            award_policy: self.award_policy,
            domain_agencies: DOMAIN_AGENCIES,
        }
    }
}
