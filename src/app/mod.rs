// WafLogCheck - app/mod.rs
//
// Application layer: orchestration of config validation and log scanning.
// Dependencies: core, platform.

pub mod checker;
