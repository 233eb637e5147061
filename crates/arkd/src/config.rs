//! Configuration for arkd.
//!
//! An optional TOML file provides the base (default /etc/ark/config.toml,
//! overridable with ARK_CONFIG); environment variables override individual
//! fields on top of it. Missing file means defaults.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

/// Default config file path
pub const CONFIG_PATH: &str = "/etc/ark/config.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Telegram bot token; empty is fatal at startup.
    #[serde(default)]
    pub telegram_token: String,

    /// Generation endpoint (Ollama /api/generate).
    #[serde(default = "default_ollama_url")]
    pub ollama_url: String,

    /// Generation model identifier.
    #[serde(default = "default_ollama_model")]
    pub ollama_model: String,

    /// Minimum FAQ match score to treat an entry as authoritative.
    #[serde(default = "default_faq_threshold")]
    pub faq_threshold: f64,

    /// Maximum KB paragraphs passed to the rewriter as sources.
    #[serde(default = "default_kb_max_snips")]
    pub kb_max_snips: usize,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_read_timeout")]
    pub read_timeout_secs: u64,

    /// Consecutive failures before the backend is put in cooldown.
    #[serde(default = "default_fails_before_cooldown")]
    pub fails_before_cooldown: u32,

    #[serde(default = "default_cooldown_seconds")]
    pub cooldown_seconds: u64,

    #[serde(default = "default_health_bind")]
    pub health_bind: String,

    #[serde(default = "default_health_port")]
    pub health_port: u16,

    /// Token for the diagnostics endpoint; empty disables the endpoint.
    #[serde(default)]
    pub health_token: String,

    #[serde(default = "default_lock_path")]
    pub lock_path: String,

    /// Directory holding faq.txt, knowledge_base.txt and system_prompt.txt.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Directory for messages.jsonl, events.jsonl and unanswered.txt.
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
}

fn default_ollama_url() -> String {
    "http://localhost:11434/api/generate".to_string()
}

fn default_ollama_model() -> String {
    "llama3.1:8b".to_string()
}

fn default_faq_threshold() -> f64 {
    0.35
}

fn default_kb_max_snips() -> usize {
    4
}

fn default_connect_timeout() -> u64 {
    5
}

fn default_read_timeout() -> u64 {
    60
}

fn default_fails_before_cooldown() -> u32 {
    3
}

fn default_cooldown_seconds() -> u64 {
    120
}

fn default_health_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_health_port() -> u16 {
    18080
}

fn default_lock_path() -> String {
    "/tmp/com.ark.support-bot.lock".to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("/var/lib/ark")
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("/var/log/ark")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            telegram_token: String::new(),
            ollama_url: default_ollama_url(),
            ollama_model: default_ollama_model(),
            faq_threshold: default_faq_threshold(),
            kb_max_snips: default_kb_max_snips(),
            connect_timeout_secs: default_connect_timeout(),
            read_timeout_secs: default_read_timeout(),
            fails_before_cooldown: default_fails_before_cooldown(),
            cooldown_seconds: default_cooldown_seconds(),
            health_bind: default_health_bind(),
            health_port: default_health_port(),
            health_token: String::new(),
            lock_path: default_lock_path(),
            data_dir: default_data_dir(),
            log_dir: default_log_dir(),
        }
    }
}

impl Config {
    /// Load the TOML base (if any), then apply environment overrides.
    pub fn load() -> Self {
        let path = std::env::var("ARK_CONFIG").unwrap_or_else(|_| CONFIG_PATH.to_string());
        let mut config = Self::load_from_path(&path).unwrap_or_else(|e| {
            warn!("Config not found, using defaults: {}", e);
            Config::default()
        });
        config.apply_env_from(|key| std::env::var(key).ok());
        config
    }

    fn load_from_path(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        info!("Loaded config from {}", path);
        Ok(config)
    }

    /// Apply environment-variable overrides from an arbitrary source.
    /// Blank values are ignored; unparseable numbers keep the current value.
    pub fn apply_env_from(&mut self, get: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| {
            get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(v) = get("TELEGRAM_TOKEN").or_else(|| get("TELEGRAM_BOT_TOKEN")) {
            self.telegram_token = v;
        }
        if let Some(v) = get("OLLAMA_URL") {
            self.ollama_url = v;
        }
        if let Some(v) = get("OLLAMA_MODEL") {
            self.ollama_model = v;
        }
        if let Some(v) = get("FAQ_THRESHOLD").and_then(|v| v.parse().ok()) {
            self.faq_threshold = v;
        }
        if let Some(v) = get("KB_MAX_SNIPS").and_then(|v| v.parse().ok()) {
            self.kb_max_snips = v;
        }
        if let Some(v) = get("OLLAMA_CONNECT_TIMEOUT").and_then(|v| v.parse().ok()) {
            self.connect_timeout_secs = v;
        }
        if let Some(v) = get("OLLAMA_READ_TIMEOUT").and_then(|v| v.parse().ok()) {
            self.read_timeout_secs = v;
        }
        if let Some(v) = get("OLLAMA_FAILS_BEFORE_COOLDOWN").and_then(|v| v.parse().ok()) {
            self.fails_before_cooldown = v;
        }
        if let Some(v) = get("OLLAMA_COOLDOWN_SECONDS").and_then(|v| v.parse().ok()) {
            self.cooldown_seconds = v;
        }
        if let Some(v) = get("HEALTH_BIND") {
            self.health_bind = v;
        }
        if let Some(v) = get("HEALTH_PORT").and_then(|v| v.parse().ok()) {
            self.health_port = v;
        }
        if let Some(v) = get("HEALTH_TOKEN") {
            self.health_token = v;
        }
        if let Some(v) = get("BOT_LOCK_PATH") {
            self.lock_path = v;
        }
        if let Some(v) = get("ARK_DATA_DIR") {
            self.data_dir = PathBuf::from(v);
        }
        if let Some(v) = get("ARK_LOG_DIR") {
            self.log_dir = PathBuf::from(v);
        }
    }

    pub fn faq_path(&self) -> PathBuf {
        self.data_dir.join("faq.txt")
    }

    pub fn kb_path(&self) -> PathBuf {
        self.data_dir.join("knowledge_base.txt")
    }

    pub fn prompt_path(&self) -> PathBuf {
        self.data_dir.join("system_prompt.txt")
    }

    pub fn messages_log_path(&self) -> PathBuf {
        self.log_dir.join("messages.jsonl")
    }

    pub fn events_log_path(&self) -> PathBuf {
        self.log_dir.join("events.jsonl")
    }

    pub fn unanswered_path(&self) -> PathBuf {
        self.log_dir.join("unanswered.txt")
    }
}
