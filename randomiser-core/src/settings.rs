use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::tracker::HintDisplay;
use crate::{RandomiserError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Where the seed list and tracker files live.
    pub seeds_dir: PathBuf,
    pub hint_display: HintDisplay,
    /// DLC identifiers the player owns. `None` means everything.
    pub owned_dlc: Option<Vec<String>>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seeds_dir: PathBuf::from("Seeds"),
            hint_display: HintDisplay::default(),
            owned_dlc: None,
        }
    }
}

impl Settings {
    pub const SEED_LIST_FILE: &'static str = "Seed List.txt";

    /// Missing files give defaults; unreadable JSON is an error so a typo
    /// is not silently replaced.
    pub fn load(path: &Path) -> Result<Settings> {
        if !path.exists() {
            return Ok(Settings::default());
        }
        let data = fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&data)?;
        if settings.seeds_dir.as_os_str().is_empty() {
            return Err(RandomiserError::Config(format!(
                "{}: seeds_dir must not be empty",
                path.display()
            )));
        }
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn seed_list_path(&self) -> PathBuf {
        self.seeds_dir.join(Self::SEED_LIST_FILE)
    }
}
