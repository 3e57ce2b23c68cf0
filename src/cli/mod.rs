//! CLI utilities for tiny-snmp-agent.
//!
//! Command-line argument parsing and tracing setup for the `snmp-agent`
//! binary.
//!
//! This module is only available with the `cli` feature.

pub mod args;
