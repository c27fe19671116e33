mod manager;
mod models;

pub use manager::SettingsManager;
pub use models::{ActivitySettings, EntrySettings, ProjectSettings, Settings};
