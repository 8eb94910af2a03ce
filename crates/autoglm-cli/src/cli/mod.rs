/*
[INPUT]:  Parsed subcommand arguments
[OUTPUT]: Subcommand implementations (task, info, init)
[POS]:    CLI layer - binary-only command handlers
[UPDATE]: When adding or removing subcommands
*/

pub mod info;
pub mod init;
pub mod prompt;
pub mod task;
