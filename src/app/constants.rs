pub(crate) const STATUS_READY: &str = "Ready";
pub(crate) const STATUS_AT_ROOT: &str = "Already at /";

pub(crate) const LOG_TIMESTAMP_FORMAT: &str = "%m-%d %H:%M:%S";
pub(crate) const LOG_PARSE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub(crate) const LOG_SEPARATOR: &str = " | ";

pub(crate) const LOG_RETENTION_DAYS: i64 = 7;
pub(crate) const LOG_MAX_ENTRIES: usize = 10_000;
pub(crate) const LOG_MAX_IN_MEMORY: usize = 100;

/// Ticks a transient status stays visible (about 3 s at the default tick rate).
pub(crate) const STATUS_TTL_TICKS: u32 = 90;

pub(crate) const DOWNLOAD_CHUNK_BYTES: usize = 8192;
pub(crate) const DOWNLOAD_LOG_THRESHOLD_BYTES: u64 = 1024 * 1024;
pub(crate) const PROGRESS_STEP_PERCENT: u8 = 4;
/// Ticks a finished bar stays full before it is cleared.
pub(crate) const PROGRESS_HOLD_TICKS: u32 = 45;
