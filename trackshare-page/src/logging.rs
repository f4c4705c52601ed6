use log::LevelFilter;
use simplelog::{ConfigBuilder, WriteLogger};
use std::fs::{File, OpenOptions};
use std::path::PathBuf;

/// Where and how much the page logs
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub enabled: bool,
    pub log_file: PathBuf,
    /// Truncate `log_file` when logging starts
    pub clear_on_startup: bool,
    pub features: LogFeatures,
    pub level: LevelFilter,
}

/// Per-concern switches checked by the `log_*!` macros
///
/// Each concern logs at its own level: session and identity changes at info,
/// reconciliation and service calls at debug, tab switches at trace.
#[derive(Debug, Clone)]
pub struct LogFeatures {
    pub session: bool,
    pub identity: bool,
    pub content: bool,
    pub tabs: bool,
    /// Effects handed to the services
    pub api_calls: bool,
    pub general: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log_file: PathBuf::from("trackshare_page.log"),
            clear_on_startup: true,
            features: LogFeatures::default(),
            level: LevelFilter::Info,
        }
    }
}

impl Default for LogFeatures {
    fn default() -> Self {
        Self {
            session: true,
            identity: true,
            content: true,
            tabs: false,
            api_calls: false,
            general: true,
        }
    }
}

impl LogConfig {
    /// Nothing is written; the macros skip formatting entirely
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    /// Every concern down to trace
    pub fn verbose() -> Self {
        Self {
            level: LevelFilter::Trace,
            features: LogFeatures {
                session: true,
                identity: true,
                content: true,
                tabs: true,
                api_calls: true,
                general: true,
            },
            ..Default::default()
        }
    }
}

/// Start writing the page log
///
/// A disabled config installs nothing, so the `log` facade stays a no-op.
pub fn init_logging(config: &LogConfig) -> anyhow::Result<()> {
    if !config.enabled {
        return Ok(());
    }

    if config.clear_on_startup {
        File::create(&config.log_file)?;
    }

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)?;

    // HTTP internals would drown the page's own targets at debug
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .add_filter_ignore_str("hyper")
        .add_filter_ignore_str("reqwest")
        .set_time_offset_to_local()
        .unwrap_or_else(|builder| builder)
        .build();

    WriteLogger::init(config.level, log_config, log_file)?;

    log::info!(
        target: "general",
        "page log at {} (level {:?})",
        config.log_file.display(),
        config.level
    );
    log::debug!(target: "general", "concerns: {:?}", config.features);

    Ok(())
}

/// Shared body of the `log_*!` macros: check the concern's switch, log under
/// its name as target
#[doc(hidden)]
#[macro_export]
macro_rules! log_concern {
    ($config:expr, $concern:ident, $level:ident, $($arg:tt)*) => {
        if $config.enabled && $config.features.$concern {
            log::$level!(target: stringify!($concern), $($arg)*);
        }
    };
}

/// Sign-in, profile arrival and sign-out
#[macro_export]
macro_rules! log_session {
    ($config:expr, $($arg:tt)*) => {
        $crate::log_concern!($config, session, info, $($arg)*)
    };
}

/// Owner lookups and navigation
#[macro_export]
macro_rules! log_identity {
    ($config:expr, $($arg:tt)*) => {
        $crate::log_concern!($config, identity, info, $($arg)*)
    };
}

#[macro_export]
macro_rules! log_content {
    ($config:expr, $($arg:tt)*) => {
        $crate::log_concern!($config, content, debug, $($arg)*)
    };
}

#[macro_export]
macro_rules! log_tabs {
    ($config:expr, $($arg:tt)*) => {
        $crate::log_concern!($config, tabs, trace, $($arg)*)
    };
}

#[macro_export]
macro_rules! log_api_call {
    ($config:expr, $($arg:tt)*) => {
        $crate::log_concern!($config, api_calls, debug, $($arg)*)
    };
}

#[macro_export]
macro_rules! log_debug {
    ($config:expr, $($arg:tt)*) => {
        $crate::log_concern!($config, general, debug, $($arg)*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_verbose_enables_every_concern() {
        let verbose = LogConfig::verbose();
        assert!(verbose.enabled);
        assert_eq!(verbose.level, LevelFilter::Trace);
        assert!(verbose.features.tabs && verbose.features.api_calls);
    }

    #[test]
    fn test_default_keeps_noisy_concerns_off() {
        let config = LogConfig::default();
        assert!(!config.features.tabs);
        assert!(!config.features.api_calls);
        assert!(config.features.content);
    }

    #[test]
    fn test_disabled_config_writes_no_file() {
        let dir = TempDir::new().unwrap();
        let config = LogConfig {
            log_file: dir.path().join("page.log"),
            ..LogConfig::disabled()
        };

        init_logging(&config).unwrap();
        log_session!(config, "signed in as {}", "alice");
        log_tabs!(config, "tab {}", "history");

        assert!(!config.log_file.exists());
    }
}
