// Library exports for testing
pub mod actions;
pub mod codepoints;
pub mod config;
pub mod constants;
pub mod frame;
pub mod playback;
pub mod script;
pub mod steps;
pub mod surface;
pub mod text_diff;
