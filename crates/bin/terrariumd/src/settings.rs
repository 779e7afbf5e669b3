//! Terrarium settings file: timers, temperature rules and the sprayer rule
//! as JSON.

use std::path::Path;

use terrarium_domain::device::DeviceRegistry;
use terrarium_domain::error::ConfigError;
use terrarium_domain::settings::Settings;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to read settings file")]
    Io(#[from] std::io::Error),
    #[error("failed to parse settings file")]
    Parse(#[from] serde_json::Error),
    #[error("invalid settings")]
    Invalid(#[from] ConfigError),
}

/// Load, normalize and validate the settings at `path`.
///
/// A missing file yields empty settings: nothing is scheduled until a
/// settings file is provided.
///
/// # Errors
///
/// Returns [`SettingsError`] when the file cannot be read or parsed, or the
/// settings reference devices the registry does not know.
pub fn load(path: &Path, registry: &DeviceRegistry) -> Result<Settings, SettingsError> {
    let mut settings = match std::fs::read_to_string(path) {
        Ok(content) => serde_json::from_str::<Settings>(&content)?,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(path = %path.display(), "settings file not found, starting empty");
            Settings::default()
        }
        Err(err) => return Err(SettingsError::Io(err)),
    };
    settings.normalize();
    settings.validate(registry)?;
    Ok(settings)
}
