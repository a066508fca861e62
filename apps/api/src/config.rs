use std::path::PathBuf;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Every variable has a default, so a bare checkout starts against `./questions`.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Directory of `<profession>.json` question sets.
    pub questions_dir: PathBuf,
    /// Question set served for professions without their own file.
    pub fallback_profession: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let fallback_profession = env_or("FALLBACK_PROFESSION", "general");
        if fallback_profession.trim().is_empty() {
            anyhow::bail!("FALLBACK_PROFESSION cannot be empty");
        }

        Ok(Config {
            port: env_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
            questions_dir: PathBuf::from(env_or("QUESTIONS_DIR", "questions")),
            fallback_profession,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
