// blackline-core/src/engines/mod.rs
//! Concrete implementations of the `DetectionEngine` trait.
//!
//! Each engine lives in its own file and is declared here.

pub mod regex_engine;
