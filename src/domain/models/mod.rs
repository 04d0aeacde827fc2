pub mod config;
pub mod credential;
pub mod preset;
pub mod process;
pub mod worker;

pub use config::{
    GlobalConfig, LogPolicy, LoggingConfig, OptionTemplate, Pool, ProcessPolicy, RecoveryPolicy,
    WorkerSpec, DEFAULT_PORT,
};
pub use credential::Credential;
pub use preset::{Preset, PresetSettings, PRESET_WORKER_NAME};
pub use process::PriorityClass;
pub use worker::{
    ConnectionState, OutputEvent, OutputStream, StartReport, StatusMessage, StopReport,
    SupervisorState,
};
