use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::credential::Credential;

/// Port used when neither the worker nor its pool names one
pub const DEFAULT_PORT: u16 = 8332;

/// Main configuration structure for a supervisor run
///
/// Loaded once, validated, then shared read-only for the life of the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GlobalConfig {
    /// Mirror worker output into log files and the status broadcast
    #[serde(default)]
    pub debug_logging: bool,

    /// Username used by workers that do not set one
    #[serde(default)]
    pub default_username: String,

    /// Password used by workers that do not set one
    #[serde(default)]
    pub default_password: String,

    /// Option template used by workers that do not name one
    #[serde(default)]
    pub default_option: String,

    /// Pool used by workers that do not name one
    #[serde(default)]
    pub default_pool: Option<String>,

    /// Directory holding the configuration file and worker logs
    #[serde(default = "default_base_path")]
    pub base_path: PathBuf,

    /// Prefix of per-worker log file names
    #[serde(default = "default_log_prefix")]
    pub log_prefix: String,

    /// Supervisor logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Executable + argument templates shared by workers
    #[serde(default)]
    pub options: Vec<OptionTemplate>,

    /// Named remote endpoints
    #[serde(default)]
    pub pools: Vec<Pool>,

    /// Supervised worker processes
    #[serde(default)]
    pub workers: Vec<WorkerSpec>,
}

fn default_base_path() -> PathBuf {
    PathBuf::from(".")
}

fn default_log_prefix() -> String {
    "herdsman".to_string()
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            debug_logging: false,
            default_username: String::new(),
            default_password: String::new(),
            default_option: String::new(),
            default_pool: None,
            base_path: default_base_path(),
            log_prefix: default_log_prefix(),
            logging: LoggingConfig::default(),
            options: vec![],
            pools: vec![],
            workers: vec![],
        }
    }
}

impl GlobalConfig {
    /// Look up an option template by name
    pub fn option(&self, name: &str) -> Option<&OptionTemplate> {
        self.options.iter().find(|o| o.name == name)
    }

    /// Look up a pool by name
    pub fn pool(&self, name: &str) -> Option<&Pool> {
        self.pools.iter().find(|p| p.name == name)
    }

    /// Look up a worker by name
    pub fn worker(&self, name: &str) -> Option<&WorkerSpec> {
        self.workers.iter().find(|w| w.name == name)
    }

    /// Workers with `enabled` set, in declaration order
    pub fn enabled_workers(&self) -> impl Iterator<Item = &WorkerSpec> {
        self.workers.iter().filter(|w| w.enabled)
    }

    /// Option key a worker launches with, falling back to the default option
    pub fn option_key_for<'a>(&'a self, worker: &'a WorkerSpec) -> &'a str {
        if worker.option.is_empty() {
            &self.default_option
        } else {
            &worker.option
        }
    }

    /// Pool a worker resolves its endpoint from, falling back to the default pool
    pub fn pool_for(&self, worker: &WorkerSpec) -> Option<&Pool> {
        worker
            .pool
            .as_deref()
            .or(self.default_pool.as_deref())
            .and_then(|name| self.pool(name))
    }

    /// Username for a worker, falling back to the global default
    pub fn username_for<'a>(&'a self, worker: &'a WorkerSpec) -> &'a str {
        worker.username.as_deref().unwrap_or(&self.default_username)
    }

    /// Password for a worker, falling back to the global default
    pub fn password_for<'a>(&'a self, worker: &'a WorkerSpec) -> &'a str {
        worker.password.as_deref().unwrap_or(&self.default_password)
    }

    /// Path of the log file written for `worker`
    pub fn worker_log_path(&self, worker: &str) -> PathBuf {
        self.base_path
            .join(format!("{}_{}.log", self.log_prefix, worker))
    }
}

/// Supervisor logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Reusable executable path + argument format
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct OptionTemplate {
    /// Unique template name
    pub name: String,

    /// Executable, absolute or relative to the configuration directory
    pub executable: PathBuf,

    /// Argument format with `{host}`, `{port}`, `{username}`, `{password}`,
    /// `{combinedhost}` and `{args}` placeholders
    #[serde(default)]
    pub argument_format: String,

    /// Extra arguments substituted for `{args}` when the worker has none
    #[serde(default)]
    pub arguments: String,
}

/// Named remote endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Pool {
    pub name: String,
    pub host: String,
    pub port: u16,

    /// Display URL, informational only
    #[serde(default)]
    pub website: Option<String>,
}

/// One supervised worker
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct WorkerSpec {
    /// Unique worker name
    pub name: String,

    /// Option template key; empty means the global default option
    #[serde(default)]
    pub option: String,

    #[serde(default)]
    pub pool: Option<String>,

    #[serde(default)]
    pub host: Option<String>,

    #[serde(default)]
    pub port: Option<u16>,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    /// Extra arguments; the template's arguments are used when absent
    #[serde(default)]
    pub arguments: Option<String>,

    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Republish output lines over the status broadcast
    #[serde(default = "default_true")]
    pub status_updates: bool,

    #[serde(default)]
    pub log: LogPolicy,

    #[serde(default)]
    pub recovery: RecoveryPolicy,

    #[serde(default)]
    pub process: ProcessPolicy,
}

const fn default_true() -> bool {
    true
}

impl WorkerSpec {
    /// Worker with the given name and option key and defaults elsewhere
    pub fn new(name: impl Into<String>, option: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            option: option.into(),
            pool: None,
            host: None,
            port: None,
            username: None,
            password: None,
            arguments: None,
            enabled: true,
            status_updates: true,
            log: LogPolicy::default(),
            recovery: RecoveryPolicy::default(),
            process: ProcessPolicy::default(),
        }
    }
}

/// Per-worker log file policy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LogPolicy {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Size above which the log file is truncated before the next write
    #[serde(default = "default_max_bytes")]
    pub max_bytes: u64,
}

const fn default_max_bytes() -> u64 {
    512_000
}

impl Default for LogPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            max_bytes: default_max_bytes(),
        }
    }
}

/// Restart policy applied when a worker exits on its own
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RecoveryPolicy {
    /// Relaunch attempts with the current option before giving up
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Delay before each relaunch
    #[serde(default = "default_interval_seconds")]
    pub interval_seconds: u64,

    /// Option template to switch to once retries are exhausted
    #[serde(default)]
    pub alternate_option: Option<String>,
}

const fn default_retries() -> u32 {
    3
}

const fn default_interval_seconds() -> u64 {
    60
}

impl Default for RecoveryPolicy {
    fn default() -> Self {
        Self {
            retries: default_retries(),
            interval_seconds: default_interval_seconds(),
            alternate_option: None,
        }
    }
}

/// OS-level launch settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ProcessPolicy {
    /// Priority level, see `PriorityClass::from_level`
    #[serde(default)]
    pub priority: i16,

    /// CPU list such as `1,2,4`, `3-4` or `5`; empty means OS default
    #[serde(default)]
    pub cpu_affinity: String,

    #[serde(default)]
    pub run_as_domain: Option<String>,

    /// Account the worker is launched as
    #[serde(default)]
    pub run_as_user: Option<String>,

    /// Never written back when the configuration is saved
    #[serde(default, skip_serializing)]
    pub run_as_password: Option<Credential>,

    /// Export the account's HOME/USER/LOGNAME to the worker
    #[serde(default)]
    pub load_user_profile: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> GlobalConfig {
        let mut worker = WorkerSpec::new("cpu0", "");
        worker.username = Some("alice".to_string());
        GlobalConfig {
            default_username: "anon".to_string(),
            default_password: "x".to_string(),
            default_option: "cpuminer".to_string(),
            default_pool: Some("main".to_string()),
            pools: vec![Pool {
                name: "main".to_string(),
                host: "pool.example".to_string(),
                port: 3333,
                website: None,
            }],
            workers: vec![worker, WorkerSpec::new("gpu0", "cudaminer")],
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults_fill_missing_worker_fields() {
        let config = sample();
        let cpu = config.worker("cpu0").unwrap();

        assert_eq!(config.option_key_for(cpu), "cpuminer");
        assert_eq!(config.username_for(cpu), "alice");
        assert_eq!(config.password_for(cpu), "x");
        assert_eq!(config.pool_for(cpu).unwrap().port, 3333);

        let gpu = config.worker("gpu0").unwrap();
        assert_eq!(config.option_key_for(gpu), "cudaminer");
        assert_eq!(config.username_for(gpu), "anon");
    }

    #[test]
    fn test_worker_log_path() {
        let config = GlobalConfig {
            base_path: PathBuf::from("/var/lib/herdsman"),
            ..Default::default()
        };
        assert_eq!(
            config.worker_log_path("cpu0"),
            PathBuf::from("/var/lib/herdsman/herdsman_cpu0.log")
        );
    }

    #[test]
    fn test_yaml_worker_defaults() {
        let yaml = r"
name: gpu0
option: cudaminer
";
        let worker: WorkerSpec = serde_yaml::from_str(yaml).expect("YAML should parse");

        assert!(worker.enabled);
        assert!(worker.status_updates);
        assert!(worker.log.enabled);
        assert_eq!(worker.log.max_bytes, 512_000);
        assert_eq!(worker.recovery.retries, 3);
        assert_eq!(worker.recovery.interval_seconds, 60);
        assert_eq!(worker.process.priority, 0);
        assert!(worker.process.run_as_password.is_none());
    }
}
