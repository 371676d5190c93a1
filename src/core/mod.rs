// WafLogCheck - core/mod.rs
//
// Core logic layer.
// Works on Read/BufRead values and plain data; never opens files itself.
// Must NOT depend on: platform or app.

pub mod collector;
pub mod directives;
pub mod expectation;
pub mod model;
pub mod reverse;
