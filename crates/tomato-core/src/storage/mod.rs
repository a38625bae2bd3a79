mod config;

pub use config::{Config, DisplayConfig, SessionSettings};

use std::path::PathBuf;

/// Returns `~/.config/tomato[-dev]/` based on TOMATO_ENV.
///
/// Set TOMATO_ENV=dev to use the development data directory, or
/// TOMATO_CONFIG_DIR to use an explicit directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let dir = match std::env::var_os("TOMATO_CONFIG_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("TOMATO_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("tomato-dev")
            } else {
                base_dir.join("tomato")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Directory holding the ambient sound files.
pub fn sounds_dir() -> std::io::Result<PathBuf> {
    Ok(data_dir()?.join("sounds"))
}
