use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub queue: QueueSettings,
    #[serde(default)]
    pub executor: ExecutorConfig,
    #[serde(default)]
    pub simulator: SimulatorConfig,
    #[serde(default)]
    pub dry_run: DryRunConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,
    /// Maximum connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

/// Job queue and worker pool settings
#[derive(Debug, Clone, Deserialize)]
pub struct QueueSettings {
    /// Number of concurrent job handlers
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Total attempts per job, including the first (default: 3)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Base delay for exponential backoff in milliseconds (default: 1s)
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
    /// Maximum backoff delay in milliseconds
    #[serde(default = "default_backoff_max_ms")]
    pub backoff_max_ms: u64,
}

fn default_concurrency() -> usize {
    10
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_base_ms() -> u64 {
    1000
}

fn default_backoff_max_ms() -> u64 {
    30_000
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            max_attempts: default_max_attempts(),
            backoff_base_ms: default_backoff_base_ms(),
            backoff_max_ms: default_backoff_max_ms(),
        }
    }
}

/// Lifecycle driver pacing
#[derive(Debug, Clone, Deserialize)]
pub struct ExecutorConfig {
    /// Delay between lifecycle phases in milliseconds (transaction-assembly
    /// latency and similar pacing)
    #[serde(default = "default_phase_delay_ms")]
    pub phase_delay_ms: u64,
}

fn default_phase_delay_ms() -> u64 {
    2000
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            phase_delay_ms: default_phase_delay_ms(),
        }
    }
}

/// Simulated liquidity source behavior
#[derive(Debug, Clone, Deserialize)]
pub struct SimulatorConfig {
    /// Probability of a simulated network fault per submission, in [0, 1]
    #[serde(default = "default_fail_probability")]
    pub fail_probability: f64,
    /// Quote fetch latency bounds in milliseconds
    #[serde(default = "default_quote_delay_min_ms")]
    pub quote_delay_min_ms: u64,
    #[serde(default = "default_quote_delay_max_ms")]
    pub quote_delay_max_ms: u64,
    /// Transaction confirmation latency bounds in milliseconds
    #[serde(default = "default_exec_delay_min_ms")]
    pub exec_delay_min_ms: u64,
    #[serde(default = "default_exec_delay_max_ms")]
    pub exec_delay_max_ms: u64,
    /// Extra wrap/unwrap overhead when either asset is the native asset
    #[serde(default = "default_wrap_delay_ms")]
    pub wrap_delay_ms: u64,
    /// The chain's native asset symbol
    #[serde(default = "default_native_symbol")]
    pub native_symbol: String,
}

fn default_fail_probability() -> f64 {
    0.1
}

fn default_quote_delay_min_ms() -> u64 {
    200
}

fn default_quote_delay_max_ms() -> u64 {
    500
}

fn default_exec_delay_min_ms() -> u64 {
    2000
}

fn default_exec_delay_max_ms() -> u64 {
    4000
}

fn default_wrap_delay_ms() -> u64 {
    150
}

fn default_native_symbol() -> String {
    "SOL".to_string()
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            fail_probability: default_fail_probability(),
            quote_delay_min_ms: default_quote_delay_min_ms(),
            quote_delay_max_ms: default_quote_delay_max_ms(),
            exec_delay_min_ms: default_exec_delay_min_ms(),
            exec_delay_max_ms: default_exec_delay_max_ms(),
            wrap_delay_ms: default_wrap_delay_ms(),
            native_symbol: default_native_symbol(),
        }
    }
}

impl SimulatorConfig {
    /// Zero-latency variant for tests and demos; faults still follow
    /// `fail_probability`
    pub fn instant() -> Self {
        Self {
            fail_probability: default_fail_probability(),
            quote_delay_min_ms: 0,
            quote_delay_max_ms: 0,
            exec_delay_min_ms: 0,
            exec_delay_max_ms: 0,
            wrap_delay_ms: 0,
            native_symbol: default_native_symbol(),
        }
    }

    pub fn with_fail_probability(mut self, p: f64) -> Self {
        self.fail_probability = p;
        self
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct DryRunConfig {
    /// Run against an in-memory record store, no external database
    #[serde(default)]
    pub enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from files and environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            .set_default("database.url", "postgres://localhost/swapflow")?
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("SWAPFLOW_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (SWAPFLOW_QUEUE__CONCURRENCY, etc.)
            .add_source(
                Environment::with_prefix("SWAPFLOW")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.queue.concurrency == 0 {
            errors.push("queue.concurrency must be at least 1".to_string());
        }

        if self.queue.max_attempts == 0 {
            errors.push("queue.max_attempts must be at least 1".to_string());
        }

        if self.queue.backoff_max_ms < self.queue.backoff_base_ms {
            errors.push("queue.backoff_max_ms must not be below backoff_base_ms".to_string());
        }

        if !(0.0..=1.0).contains(&self.simulator.fail_probability) {
            errors.push(format!(
                "simulator.fail_probability must be in [0, 1], got {}",
                self.simulator.fail_probability
            ));
        }

        if self.simulator.quote_delay_max_ms < self.simulator.quote_delay_min_ms {
            errors.push("simulator.quote_delay_max_ms below quote_delay_min_ms".to_string());
        }

        if self.simulator.exec_delay_max_ms < self.simulator.exec_delay_min_ms {
            errors.push("simulator.exec_delay_max_ms below exec_delay_min_ms".to_string());
        }

        if !self.dry_run.enabled && self.database.url.trim().is_empty() {
            errors.push("database.url is required unless dry_run is enabled".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
