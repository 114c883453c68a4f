mod config;

pub use config::Config;

use std::path::PathBuf;

/// Returns `~/.config/breathwork[-dev]/` based on BREATHWORK_ENV.
///
/// Set BREATHWORK_ENV=dev to use the development directory, or
/// BREATHWORK_CONFIG_DIR to point somewhere else entirely.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let dir = match std::env::var_os("BREATHWORK_CONFIG_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("BREATHWORK_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("breathwork-dev")
            } else {
                base_dir.join("breathwork")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
