// EventScope - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "EventScope";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "EventScope";

/// Current application version (updated by release script).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Catalog / discovery
// =============================================================================

/// The four fixed classic log channels, attempted first during discovery,
/// in this order. "Security" is expected to fail without elevation.
pub const WELL_KNOWN_LOGS: [&str; 4] = ["Application", "Security", "Setup", "System"];

/// Number of newly constructed sources batched into a single
/// `CatalogProgress::SourcesAdded` message.
///
/// Smaller values mean sources appear in the UI sooner during a slow
/// discovery pass; larger values amortise channel overhead. Discovery on a
/// typical machine probes several hundred channels, so 5 keeps the source
/// list visibly filling in.
pub const SOURCE_BATCH_SIZE: usize = 5;

/// Maximum non-fatal warnings accumulated across one discovery pass.
/// Prevents the warnings Vec from growing without bound on machines with
/// many inaccessible channels.
pub const MAX_WARNINGS: usize = 1_000;

// =============================================================================
// Population / read limits
// =============================================================================

/// Default number of entries appended to the display window per read request.
pub const DEFAULT_READ_BATCH_SIZE: usize = 20;

/// Minimum user-configurable read batch size.
pub const MIN_READ_BATCH_SIZE: usize = 1;

/// Maximum user-configurable read batch size.
pub const MAX_READ_BATCH_SIZE: usize = 1_000;

/// Number of consecutive transient record-read failures after which a
/// traced population gives up and completes with what was gathered.
///
/// An isolated failure is skipped and reading continues; only an unbroken
/// run of this length is treated as the whole log having become
/// unavailable. Without the cap a reader that errors forever would never
/// reach its end-of-data sentinel.
pub const MAX_CONSECUTIVE_RECORD_FAILURES: u32 = 64;

// =============================================================================
// Per-frame UI message budgets
// =============================================================================

/// Maximum catalog-progress messages processed by the UI update loop per
/// frame. Remaining messages stay in the channel for subsequent frames so a
/// burst cannot stall the render loop.
pub const MAX_CATALOG_MESSAGES_PER_FRAME: usize = 100;

/// Maximum populate-progress messages processed per UI frame.
pub const MAX_POPULATE_MESSAGES_PER_FRAME: usize = 20;

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";
