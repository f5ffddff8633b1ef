//! Thorkit CLI library: the commands behind the `thorkit` binary.
//!
//! Each command takes the resolved [`KitConfig`](thorkit::KitConfig) and
//! prints its result to stdout.

pub mod commands;

pub use commands::{AssetArgs, SessionArgs, balance, overview, transfer};
