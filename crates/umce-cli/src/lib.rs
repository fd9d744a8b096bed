//! Library side of the `umce` command-line tool: configuration loading and
//! the subcommand implementations, kept out of `main.rs` so they can be
//! tested directly.
pub mod commands;
pub mod util;
