//! log4rs setup: rolling application and audit logs plus optional trace file.

use log::LevelFilter;
use log4rs::append::rolling_file::RollingFileAppender;
use log4rs::append::rolling_file::policy::compound::{
    CompoundPolicy, roll::fixed_window::FixedWindowRoller, trigger::size::SizeTrigger,
};
use log4rs::config::{Appender, Config, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;
use std::path::{Path, PathBuf};

use crate::utils::devlog::TRACE_TARGET;

/// Target for one-line execution audit records.
pub const AUDIT_TARGET: &str = "dynaquery::audit";

const ROLL_SIZE: u64 = 10 * 1024 * 1024;
const DEFAULT_RETENTION: u32 = 7;
const PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S%.3f)} [{l}] {t} - {m}{n}";

/// Initialize from a log4rs YAML file.
pub fn init_file(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    log4rs::init_file(path, log4rs::config::Deserializers::default())?;
    Ok(())
}

#[must_use]
pub fn parse_level(level: &str) -> LevelFilter {
    match level.trim().to_ascii_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

fn rolling(dir: &Path, stem: &str, keep: u32) -> Result<RollingFileAppender, Box<dyn std::error::Error>> {
    let roller = FixedWindowRoller::builder()
        .build(&dir.join(format!("{stem}.{{}}.log")).display().to_string(), keep)?;
    let policy = CompoundPolicy::new(Box::new(SizeTrigger::new(ROLL_SIZE)), Box::new(roller));
    Ok(RollingFileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(PATTERN)))
        .build(dir.join(format!("{stem}.log")), Box::new(policy))?)
}

/// Build the file logging config rooted at `dir`:
/// `app.log`, `audit.log` (target [`AUDIT_TARGET`]) and, when `with_trace`
/// is set, `trace.log` for execution trace lines.
pub fn build_config(
    dir: &Path,
    level: LevelFilter,
    retention: Option<u32>,
    with_trace: bool,
) -> Result<Config, Box<dyn std::error::Error>> {
    std::fs::create_dir_all(dir)?;
    let keep = retention.unwrap_or(DEFAULT_RETENTION).max(1);
    let mut builder = Config::builder()
        .appender(Appender::builder().build("app", Box::new(rolling(dir, "app", keep)?)))
        .appender(Appender::builder().build("audit", Box::new(rolling(dir, "audit", keep)?)))
        .logger(Logger::builder().appender("audit").additive(false).build(AUDIT_TARGET, LevelFilter::Info));
    builder = if with_trace {
        builder
            .appender(Appender::builder().build("trace", Box::new(rolling(dir, "trace", keep)?)))
            .logger(Logger::builder().appender("trace").additive(false).build(TRACE_TARGET, LevelFilter::Trace))
    } else {
        builder.logger(Logger::builder().additive(false).build(TRACE_TARGET, LevelFilter::Off))
    };
    Ok(builder.build(Root::builder().appender("app").build(level))?)
}

/// Install file logging under `dir`. Fails if a logger is already installed.
pub fn init_in(
    dir: &Path,
    level: &str,
    retention: Option<u32>,
    with_trace: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = build_config(dir, parse_level(level), retention, with_trace)?;
    log4rs::init_config(config)?;
    Ok(())
}

/// Configure from `DYNAQUERY_LOG_DIR`, `DYNAQUERY_LOG_LEVEL`,
/// `DYNAQUERY_LOG_RETENTION` and `DYNAQUERY_TRACE`. Does nothing unless a
/// log directory is set.
pub fn configure_from_env() -> Result<(), Box<dyn std::error::Error>> {
    let Some(dir) = std::env::var("DYNAQUERY_LOG_DIR").ok().map(PathBuf::from) else {
        return Ok(());
    };
    let level = std::env::var("DYNAQUERY_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let retention = std::env::var("DYNAQUERY_LOG_RETENTION").ok().and_then(|s| s.parse().ok());
    let with_trace = std::env::var("DYNAQUERY_TRACE")
        .is_ok_and(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes"));
    init_in(&dir, &level, retention, with_trace)
}
