//! Shared utilities (hex dump formatting for the `dump` subcommand).

pub mod hex;
