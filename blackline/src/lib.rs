// blackline/src/lib.rs
//! # Blackline CLI Application
//!
//! This crate provides the terminal interface for the Blackline redaction editor.
//! The editing logic lives in `blackline-core`; this crate handles arguments,
//! logging, themed output and the line-oriented session.

pub mod cli;
pub mod commands;
pub mod logger;
pub mod ui;
