//! Rule compilation for the pattern detector.
//!
//! This module turns the declarative `DetectionRule`s from `config` into compiled
//! regular expressions, in declaration order, and caches the result so repeated
//! detection passes over the same configuration do not recompile anything.

pub mod compiler;
