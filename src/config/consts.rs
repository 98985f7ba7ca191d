use std::time::Duration;

/// Default bounded-queue size for a line (parts)
pub const DEFAULT_CAPACITY: usize = 64;
/// Default lower bound of a line's worker pool
pub const DEFAULT_MIN_WORKERS: usize = 1;
/// Default upper bound of a line's worker pool
pub const DEFAULT_MAX_WORKERS: usize = 1;
/// Default per-call admission timeout for callers that read it from config (1 second)
pub const DEFAULT_ADMISSION_TIMEOUT_MS: u64 = 1_000;

pub const DEFAULT_ADMISSION_TIMEOUT: Duration = Duration::from_millis(DEFAULT_ADMISSION_TIMEOUT_MS);
