//! CLI subcommands

pub mod bench;
pub mod inspect;
pub mod ping;
