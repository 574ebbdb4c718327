use std::env;
use std::path::PathBuf;

use serde::Deserialize;

use crate::source::PROC_ROOT;

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct Config {
    pub proc_root: PathBuf,
    pub log_level: String,
}

pub fn get_default_config() -> Config {
    Config {
        proc_root: PathBuf::from(PROC_ROOT),
        log_level: "info".to_string(),
    }
}

impl Config {
    /// Defaults, overridden by `PROCBENCH_PROC_ROOT` and `PROCBENCH_LOG`
    /// (a `.env` file is loaded first if present).
    pub fn from_env() -> Config {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Config {
        let mut config = get_default_config();
        if let Some(root) = lookup("PROCBENCH_PROC_ROOT").filter(|v| !v.is_empty()) {
            config.proc_root = PathBuf::from(root);
        }
        if let Some(level) = lookup("PROCBENCH_LOG").filter(|v| !v.is_empty()) {
            config.log_level = level;
        }
        config
    }
}
