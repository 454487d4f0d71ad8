//! Limits and defaults shared across the crate.

/// Maximum steps taken while walking from the anchor up to the window start.
pub const FAST_FORWARD_STEP_LIMIT: usize = 500;

/// Maximum steps taken in total, fast-forward included.
pub const TOTAL_STEP_LIMIT: usize = 700;

/// Separator between identifying fields in an asset label.
pub const ASSET_LABEL_SEPARATOR: &str = " - ";

pub const UNASSIGNED_ASSET_LABEL: &str = "Unassigned Asset";

/// Location name used when a row's location can't be resolved.
pub const UNKNOWN_LOCATION_NAME: &str = "Unknown Location";

pub const DEFAULT_LOCATION_ID: u64 = 1;
pub const DEFAULT_LOCATION_NAME: &str = "Main Facility";
