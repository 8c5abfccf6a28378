//! AC1 command-line tool.
//!
//! The binary parses arguments and installs logging; the commands live here
//! so they can be exercised directly.

pub mod commands;
pub mod config;
