/// Page size when the caller does not pick one.
pub const DEFAULT_PAGE_LIMIT: usize = 10;

/// `?limit=` sent with the full-collection fetch so the backend returns everything.
pub const DEFAULT_FETCH_LIMIT: u32 = 1000;

/// Per-request timeout for backend calls.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Notices buffered per subscriber before the slowest one starts lagging.
pub const NOTICE_CHANNEL_CAPACITY: usize = 256;

/// Search terms longer than this can never match a realistic field and are rejected.
pub const MAX_SEARCH_TERM_LEN: usize = 256;
