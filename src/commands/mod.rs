//! CLI subcommands

pub mod list;
pub mod publish;
pub mod session;
pub mod show;
