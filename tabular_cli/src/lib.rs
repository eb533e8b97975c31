//! Tabular command line interface
//!
//! Demonstrates and inspects the progress facade and trainer configuration
//! from the shell.

pub mod commands;
pub mod terminal;
