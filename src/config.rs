//! Application-level configuration constants.

// Timing
pub const REDRAW_INTERVAL_MS: u32 = 20;
pub const COUNTDOWN_TICK_MS: u32 = 1_000;

// Default values for input fields
pub const DEFAULT_HEAT_COUNT: u32 = 3;
pub const DEFAULT_DELAY_SEC: u32 = 10;

// Min/Max limits for input fields
pub const MIN_HEAT_COUNT: u32 = 1;
pub const MAX_DELAY_SEC: u32 = 3_600;

/// Values offered by the delay selector, in seconds.
pub const DELAY_OPTIONS_SEC: [u32; 7] = [5, 10, 15, 20, 30, 45, 60];

// UI text
pub const INVALID_HEATS_ALERT: &str = "Please enter a valid number of heats.";
pub const SESSION_COMPLETE_TEXT: &str = "Session Complete";
pub const COUNTDOWN_PLACEHOLDER: &str = "--";
