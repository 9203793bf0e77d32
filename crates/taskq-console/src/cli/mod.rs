/*
[INPUT]:  Parsed CLI subcommands
[OUTPUT]: One-shot command handlers and config initialisation
[POS]:    CLI module for the taskq-console binary
[UPDATE]: When adding subcommands
*/

pub mod commands;
pub mod init;
