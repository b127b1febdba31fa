pub mod commands;
pub mod manifest;
pub mod oplog;
pub mod paths;
pub mod runtime;
pub mod ui;
pub mod winget;
