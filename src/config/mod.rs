#[cfg(feature = "cli")]
pub mod cli;
pub mod settings;
pub mod storage;

pub use settings::Settings;
pub use storage::LocalStorage;
