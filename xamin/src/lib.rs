// Library interface shared by the xamin binary and integration tests

pub mod activities;
pub mod commands;
pub mod dispatcher;
pub mod entries;
pub mod project;
pub mod session;
pub mod settings;
