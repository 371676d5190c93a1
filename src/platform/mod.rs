// WafLogCheck - platform/mod.rs
//
// Platform abstraction layer: file handles, config directories, config.toml.
// Dependencies: core (readers and model types), util, directories crate.
// Must NOT depend on: app.

pub mod config;
pub mod fs;
