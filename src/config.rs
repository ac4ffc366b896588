use lazy_static::lazy_static;
use std::env;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::RwLock;

lazy_static! {
    static ref CONFIG: RwLock<Config> = RwLock::new(Config::new());
}

/// Number of transport packets between program table re-injections.
pub const DEFAULT_TABLE_INTERVAL: u64 = 42;

/// Settings of the HLS output.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Leading path component in front of the stream name (`/hls/<stream>/...`).
    /// Empty means request paths start directly with the stream name.
    pub url_prefix: String,
    /// Emitted packets between two PAT/PMT pairs.
    pub table_interval: u64,
    /// User-Agent substring identifying clients that need audio stamped
    /// with the last video timestamp.
    pub strict_timing_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url_prefix: String::from("hls"),
            table_interval: DEFAULT_TABLE_INTERVAL,
            strict_timing_agent: String::from("Apple"),
        }
    }
}

impl Config {
    fn new() -> Self {
        let mut config = Config::default();

        // Environment first, then config files
        if let Ok(prefix) = env::var("HLSMUX_URL_PREFIX") {
            config.apply("url_prefix", &prefix);
        }
        if let Ok(interval) = env::var("HLSMUX_TABLE_INTERVAL") {
            config.apply("table_interval", &interval);
        }
        if let Ok(agent) = env::var("HLSMUX_STRICT_TIMING_AGENT") {
            config.apply("strict_timing_agent", &agent);
        }

        let config_paths = ["./config.toml", "./hlsmux_config.toml"];
        for path in &config_paths {
            if let Ok(mut file) = File::open(path) {
                let mut content = String::new();
                if file.read_to_string(&mut content).is_ok() {
                    config.apply_file(&content);
                }
            }
        }

        config
    }

    /// Applies `key = value` lines; comments and unknown keys are ignored.
    pub fn apply_file(&mut self, content: &str) {
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                let value = value.trim().trim_matches('"').trim_matches('\'');
                self.apply(key.trim(), value);
            }
        }
    }

    fn apply(&mut self, key: &str, value: &str) {
        match key {
            "url_prefix" => self.url_prefix = value.trim_matches('/').to_string(),
            "table_interval" => match value.parse::<u64>() {
                Ok(interval) if interval > 0 => self.table_interval = interval,
                _ => log::warn!("Ignoring invalid table_interval {:?}", value),
            },
            "strict_timing_agent" => {
                if !value.is_empty() {
                    self.strict_timing_agent = value.to_string();
                }
            }
            _ => log::debug!("Ignoring unknown config key {}", key),
        }
    }

    pub fn reload() {
        let new_config = Config::new();
        if let Ok(mut config) = CONFIG.write() {
            *config = new_config;
        }
    }
}

/// Returns a copy of the process-wide configuration.
pub fn current() -> Config {
    match CONFIG.read() {
        Ok(config) => config.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

/// Creates a default config template file if it doesn't exist
pub fn create_default_config_template<P: AsRef<Path>>(path: P) -> std::io::Result<()> {
    if !path.as_ref().exists() {
        let template = r#"# hlsmux configuration
# This is a template. Replace the values with your actual configuration.

# Path component in front of the stream name
url_prefix = "hls"

# Transport packets between PAT/PMT re-injections
table_interval = 42

# User-Agent substring of clients needing audio aligned to video timestamps
strict_timing_agent = "Apple"
"#;
        std::fs::write(path, template)?;
    }
    Ok(())
}
