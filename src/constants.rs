/// Constants used by the product catalog.
pub mod catalog {
    /// Pseudo-category tag meaning "no category filter".
    pub const ALL_CATEGORIES: &str = "all";
}

/// Constants used by trace chain generation and statistics.
pub mod trace {
    /// Number of nodes in every generated chain (one per stage).
    pub const CHAIN_LEN: usize = 5;
    /// Earliest hour of day a node timestamp can land on, before stage offsets.
    pub const BASE_HOUR: i64 = 6;
    /// Width (in hours) of the random intra-day jitter added to node timestamps.
    pub const HOUR_JITTER: usize = 4;
    /// Width (in minutes) of the random minute offset for node timestamps.
    pub const MINUTE_JITTER: usize = 60;
    /// Display format for node timestamps (`2025/01/21 09:42`).
    pub const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M";
    /// Display format for generated shelf dates.
    pub const SHELF_DATE_FORMAT: &str = "%Y-%m-%d";
    /// Placeholder used by stats when a value cannot be derived.
    pub const UNKNOWN: &str = "unknown";
    /// Modulus used to keep the trailing digits of certificate numbers.
    pub const CERTIFICATE_DIGITS_MODULUS: i64 = 100_000_000;
}

/// Constants used by scan-history persistence.
pub mod history {
    /// Maximum number of scan records retained.
    pub const DEFAULT_HISTORY_CAPACITY: usize = 50;
    /// Fixed storage key; the history file is named after it.
    pub const HISTORY_STORAGE_KEY: &str = "fish_trace_history";
    /// Extension of the persisted history file.
    pub const HISTORY_FILE_EXTENSION: &str = "json";
    /// Default directory for persisted history files.
    pub const DEFAULT_HISTORY_DIR: &str = ".unagi_trace";
    /// Prefix of generated scan-record ids.
    pub const SCAN_RECORD_ID_PREFIX: &str = "TRACE_";
}

/// Constants used to decode QR payloads.
pub mod qr {
    /// Prefix shared by every product QR payload.
    pub const QR_PREFIX: &str = "TRACE-";
    /// Separator between payload segments.
    pub const QR_SEPARATOR: char = '-';
    /// Mixed into the configured seed for the scan resolver's random stream.
    pub const RESOLVER_SEED_SALT: u64 = 0x5CA4_7A6E_D15C_0A1D;
}

/// Environment variables read by `TraceConfig::from_env`.
pub mod env {
    /// Optional RNG seed; unset means OS-seeded randomness.
    pub const SEED_VAR: &str = "UNAGI_TRACE_SEED";
    /// Scan-history capacity override.
    pub const HISTORY_CAPACITY_VAR: &str = "UNAGI_TRACE_HISTORY_CAPACITY";
    /// Scan-history directory override.
    pub const HISTORY_DIR_VAR: &str = "UNAGI_TRACE_HISTORY_DIR";
}
