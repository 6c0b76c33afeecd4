//! Application-wide constants for pacing and rendering

pub mod pacing {
    /// Base delay between two steps
    pub const DEFAULT_SPEED_MS: u64 = 60;

    /// Each delay varies uniformly by up to this fraction of the base (0.5 = ±50%)
    pub const DEFAULT_JITTER: f64 = 0.5;

    pub const MAX_SPEED_MS: u64 = 10_000;
}

pub mod frames {
    /// Roughly 60 frames per second
    pub const DEFAULT_FRAME_INTERVAL_MS: u64 = 16;

    pub const MAX_FRAME_INTERVAL_MS: u64 = 1000;
}

pub mod config {
    pub const CONFIG_DIR_NAME: &str = ".typist";
    pub const CONFIG_FILE_NAME: &str = "settings.yaml";
}
