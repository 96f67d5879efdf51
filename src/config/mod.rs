mod settings;

pub use settings::{
    DatabaseConfig, LogConfig, LogFormat, MonitorConfig, OtelConfig, Settings, StartupConfig,
    DEV_DATABASE_URL,
};
