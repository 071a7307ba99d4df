pub mod format;
pub mod journal;
pub mod manager;
pub mod settings;
