//! Process-wide logging bootstrap.
//!
//! # Responsibility
//! - Start file-based rolling logs exactly once per process.
//! - Capture panics as sanitized, metadata-only log events.
//!
//! # Invariants
//! - Initialization is idempotent for the same level and directory.
//! - Reconfiguration with a different level or directory is rejected.
//! - Initialization never panics.
//! - Log events carry ids and counts, never record titles or bodies.

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info};
use once_cell::sync::OnceCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const LOG_FILE_BASENAME: &str = "kbview";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
const MAX_LOG_FILES: usize = 5;
const MAX_PANIC_PAYLOAD_CHARS: usize = 160;

static LOGGING_STATE: OnceCell<LoggingState> = OnceCell::new();
static PANIC_HOOK_INSTALLED: OnceCell<()> = OnceCell::new();

struct LoggingState {
    level: &'static str,
    log_dir: PathBuf,
    _logger: LoggerHandle,
}

/// Logging bootstrap failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoggingError {
    /// Level is not one of `trace|debug|info|warn|error`.
    UnsupportedLevel(String),
    /// Directory is blank or relative.
    InvalidDirectory(String),
    /// Directory could not be created.
    CreateDirectory { path: PathBuf, message: String },
    /// Logging is already running with another level.
    LevelConflict {
        active: &'static str,
        requested: &'static str,
    },
    /// Logging is already running in another directory.
    DirectoryConflict { active: PathBuf, requested: PathBuf },
    /// `flexi_logger` refused to start.
    Backend(String),
}

impl Display for LoggingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedLevel(level) => write!(
                f,
                "unsupported log level `{level}`; expected trace|debug|info|warn|error"
            ),
            Self::InvalidDirectory(message) => write!(f, "invalid log directory: {message}"),
            Self::CreateDirectory { path, message } => write!(
                f,
                "failed to create log directory `{}`: {message}",
                path.display()
            ),
            Self::LevelConflict { active, requested } => write!(
                f,
                "logging already initialized with level `{active}`; refusing to switch to `{requested}`"
            ),
            Self::DirectoryConflict { active, requested } => write!(
                f,
                "logging already initialized at `{}`; refusing to switch to `{}`",
                active.display(),
                requested.display()
            ),
            Self::Backend(message) => write!(f, "failed to start logger: {message}"),
        }
    }
}

impl Error for LoggingError {}

/// Initializes logging with `level` into the absolute directory `log_dir`.
///
/// # Errors
/// - `UnsupportedLevel` / `InvalidDirectory` for bad arguments.
/// - `LevelConflict` / `DirectoryConflict` when already running differently.
/// - `CreateDirectory` / `Backend` when the file logger cannot start.
pub fn init_logging(level: &str, log_dir: &Path) -> Result<(), LoggingError> {
    let level = normalize_level(level)?;
    let log_dir = normalize_log_dir(log_dir)?;

    let state = LOGGING_STATE.get_or_try_init(|| start_logger(level, log_dir.clone()))?;

    if state.log_dir != log_dir {
        return Err(LoggingError::DirectoryConflict {
            active: state.log_dir.clone(),
            requested: log_dir,
        });
    }
    if state.level != level {
        return Err(LoggingError::LevelConflict {
            active: state.level,
            requested: level,
        });
    }
    Ok(())
}

/// Returns `(level, log_dir)` once logging is active.
pub fn logging_status() -> Option<(&'static str, PathBuf)> {
    LOGGING_STATE
        .get()
        .map(|state| (state.level, state.log_dir.clone()))
}

/// `debug` for debug builds, `info` for release builds.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn start_logger(level: &'static str, log_dir: PathBuf) -> Result<LoggingState, LoggingError> {
    std::fs::create_dir_all(&log_dir).map_err(|err| LoggingError::CreateDirectory {
        path: log_dir.clone(),
        message: err.to_string(),
    })?;

    let logger = Logger::try_with_str(level)
        .map_err(|err| LoggingError::Backend(err.to_string()))?
        .log_to_file(
            FileSpec::default()
                .directory(log_dir.as_path())
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(MAX_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        // Format: [YYYY-MM-DD HH:MM:SS.ffffff TZ] LEVEL [module] file:line: message
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(|err| LoggingError::Backend(err.to_string()))?;

    install_panic_hook_once();

    info!(
        "event=core_init module=core status=ok platform={} version={} level={} log_dir={}",
        std::env::consts::OS,
        env!("CARGO_PKG_VERSION"),
        level,
        log_dir.display()
    );

    Ok(LoggingState {
        level,
        log_dir,
        _logger: logger,
    })
}

fn normalize_level(level: &str) -> Result<&'static str, LoggingError> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        other => Err(LoggingError::UnsupportedLevel(other.to_string())),
    }
}

fn normalize_log_dir(log_dir: &Path) -> Result<PathBuf, LoggingError> {
    if log_dir.as_os_str().is_empty() {
        return Err(LoggingError::InvalidDirectory(
            "path cannot be empty".to_string(),
        ));
    }
    if !log_dir.is_absolute() {
        return Err(LoggingError::InvalidDirectory(format!(
            "path must be absolute, got `{}`",
            log_dir.display()
        )));
    }
    Ok(log_dir.to_path_buf())
}

fn install_panic_hook_once() {
    if PANIC_HOOK_INSTALLED.get().is_some() {
        return;
    }

    let previous_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());
        let payload = panic_payload_summary(panic_info.payload());
        error!(
            "event=panic_captured module=core status=error location={} payload={}",
            location, payload
        );
        previous_hook(panic_info);
    }));

    let _ = PANIC_HOOK_INSTALLED.set(());
}

fn panic_payload_summary(payload: &(dyn std::any::Any + Send)) -> String {
    let message = if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    };
    sanitize_message(&message, MAX_PANIC_PAYLOAD_CHARS)
}

fn sanitize_message(value: &str, max_chars: usize) -> String {
    let normalized = value.replace(['\n', '\r'], " ");
    let mut truncated = normalized.chars().take(max_chars).collect::<String>();
    if normalized.chars().count() > max_chars {
        truncated.push_str("...");
    }
    truncated
}

#[cfg(test)]
mod tests {
    use super::{
        init_logging, logging_status, normalize_level, normalize_log_dir, panic_payload_summary,
        sanitize_message, LoggingError,
    };
    use std::path::Path;

    #[test]
    fn normalize_level_accepts_known_values() {
        assert_eq!(normalize_level("INFO"), Ok("info"));
        assert_eq!(normalize_level(" warning "), Ok("warn"));
        assert!(matches!(
            normalize_level("loud"),
            Err(LoggingError::UnsupportedLevel(_))
        ));
    }

    #[test]
    fn normalize_log_dir_rejects_relative_path() {
        let err = normalize_log_dir(Path::new("logs/dev")).expect_err("relative path");
        assert!(err.to_string().contains("absolute"));
    }

    #[test]
    fn sanitize_message_removes_newlines_and_truncates() {
        let sanitized = sanitize_message("line1\nline2\rline3", 8);
        assert!(!sanitized.contains('\n'));
        assert!(!sanitized.contains('\r'));
        assert!(sanitized.ends_with("..."));
    }

    #[test]
    fn panic_payload_summary_handles_non_string_payloads() {
        let payload: Box<dyn std::any::Any + Send> = Box::new(42_u32);
        assert_eq!(
            panic_payload_summary(payload.as_ref()),
            "non-string panic payload"
        );
    }

    #[test]
    fn init_logging_is_idempotent_and_rejects_conflicts() {
        let log_dir = tempfile::tempdir().expect("temp dir");
        let other_dir = tempfile::tempdir().expect("temp dir");

        init_logging("info", log_dir.path()).expect("first init should succeed");
        init_logging("INFO", log_dir.path()).expect("same config should be idempotent");

        let level_err = init_logging("debug", log_dir.path()).expect_err("level conflict");
        assert!(matches!(level_err, LoggingError::LevelConflict { .. }));

        let dir_err = init_logging("info", other_dir.path()).expect_err("directory conflict");
        assert!(matches!(dir_err, LoggingError::DirectoryConflict { .. }));

        let (active_level, active_dir) = logging_status().expect("logging should be active");
        assert_eq!(active_level, "info");
        assert_eq!(active_dir, log_dir.path());
    }
}
