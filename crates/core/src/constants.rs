//! Shared constants for scorm-sync.

/// Minutes a session token stays valid after each authorized write.
pub const SESSION_WINDOW_MINUTES: i64 = 5;

/// Objective id of the synthetic overall course status row.
pub const OVERALL_STATUS_OBJECTIVE_ID: &str = "-course_overall_status-";

/// Objective kind carrying the overall status triple.
pub const STATUS_OBJECTIVE_KIND: &str = "status";

/// Scope id used for objectives shared across the whole installation.
pub const SYSTEM_SCOPE_ID: i64 = 0;

/// Read-event type reported to the access tracking service.
pub const READ_EVENT_TYPE: &str = "sahs";

/// PostgreSQL connection pool: maximum connections.
pub const PG_POOL_MAX_CONNECTIONS: u32 = 20;

/// PostgreSQL connection pool: acquire timeout in seconds.
pub const PG_POOL_ACQUIRE_TIMEOUT_SECS: u64 = 10;

/// PostgreSQL connection pool: idle timeout in seconds.
pub const PG_POOL_IDLE_TIMEOUT_SECS: u64 = 300;

/// Default timeout for calls to the host platform.
pub const PLATFORM_HTTP_TIMEOUT_SECS: u64 = 30;
