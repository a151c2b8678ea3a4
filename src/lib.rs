// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app_dirs;
pub mod config;
pub mod game;
pub mod gesture;
pub mod landmarks;
pub mod sensor;
pub mod session;
pub mod sketch;
pub mod util;
