//! Built-in command bindings
//!
//! In-process implementations of the registered sub-commands; the dispatch
//! layer binds these into its command table.

pub mod init;
