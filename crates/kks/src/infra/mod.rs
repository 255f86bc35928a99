//! Infrastructure adapters for config, git lookup, and the `kak` binary.

pub mod config;
pub mod git;
pub mod kak;
