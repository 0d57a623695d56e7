//! Auxiliary subcommands of the `cpath` binary.

pub mod generate;
