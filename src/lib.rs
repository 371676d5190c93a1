// WafLogCheck - lib.rs
//
// Library entry point, exposing all layers for the CLI, integration tests,
// and test runners that drive the log checker programmatically.

pub mod app;
pub mod core;
pub mod platform;
pub mod util;
