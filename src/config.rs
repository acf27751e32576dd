use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "GovFlow";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get the application data directory
/// ~/GovFlow/ on all platforms (user-visible, per design requirement)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("GovFlow")
}

/// Default location of the engine database
pub fn default_db_path() -> PathBuf {
    app_data_dir().join("govflow.db")
}
