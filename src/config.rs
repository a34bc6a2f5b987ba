// Export configuration: which library to read, where to write, which playlists.
// Key names match existing PlaylistExportConfig.json files.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const CONFIG_FILE_NAME: &str = "PlaylistExportConfig.json";
const APP_DIR_NAME: &str = "playlist-export";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(rename = "iTunesLib")]
    pub library: PathBuf,
    #[serde(rename = "OutputFolder")]
    pub output_folder: PathBuf,
    /// Exported in this order. Duplicates are exported again.
    #[serde(rename = "Playlists")]
    pub playlists: Vec<String>,
}

impl ExportConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: ExportConfig =
            serde_json::from_str(&content).map_err(|source| ConfigError::Invalid {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Expands `~` in both paths and checks there is something to export.
    /// Call again after overriding fields.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        if self.playlists.is_empty() {
            return Err(ConfigError::NoPlaylists);
        }
        self.library = expand_home(&self.library);
        self.output_folder = expand_home(&self.output_folder);
        Ok(())
    }

    /// Finds the configuration file when none was given on the command line:
    /// next to the executable, then the working directory, then the user's
    /// config directory.
    pub fn locate() -> Result<PathBuf, ConfigError> {
        let searched = Self::candidates();
        if let Some(found) = searched.iter().find(|p| p.is_file()) {
            return Ok(found.clone());
        }
        Err(ConfigError::NotFound { searched })
    }

    fn candidates() -> Vec<PathBuf> {
        let mut candidates = Vec::new();
        if let Some(dir) = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
        {
            candidates.push(dir.join(CONFIG_FILE_NAME));
        }
        candidates.push(PathBuf::from(CONFIG_FILE_NAME));
        if let Some(dir) = dirs::config_dir() {
            candidates.push(dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME));
        }
        candidates
    }
}

/// Replaces a leading `~` component with the home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}
