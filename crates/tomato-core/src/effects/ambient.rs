//! Ambient sound catalog.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Background loops offered for focus sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AmbientSound {
    #[default]
    Birds,
    Forest,
    Rain,
    Sea,
    Provence,
}

impl AmbientSound {
    pub const ALL: [AmbientSound; 5] = [
        AmbientSound::Birds,
        AmbientSound::Forest,
        AmbientSound::Rain,
        AmbientSound::Sea,
        AmbientSound::Provence,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            AmbientSound::Birds => "birds",
            AmbientSound::Forest => "forest",
            AmbientSound::Rain => "rain",
            AmbientSound::Sea => "sea",
            AmbientSound::Provence => "provence",
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            AmbientSound::Birds => "birds.mp3",
            AmbientSound::Forest => "forest.mp4",
            AmbientSound::Rain => "rain.mp3",
            AmbientSound::Sea => "sea.mp3",
            AmbientSound::Provence => "provence.mp4",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AmbientSound::Birds => "Birdsong",
            AmbientSound::Forest => "Forest",
            AmbientSound::Rain => "Rain",
            AmbientSound::Sea => "Waves",
            AmbientSound::Provence => "Nature",
        }
    }

    /// Location of the sound file inside a sounds directory.
    pub fn path_in(&self, sounds_dir: &Path) -> PathBuf {
        sounds_dir.join(self.file_name())
    }
}

impl fmt::Display for AmbientSound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for AmbientSound {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        AmbientSound::ALL
            .into_iter()
            .find(|sound| sound.id() == needle || sound.file_name() == needle)
            .ok_or_else(|| ConfigError::InvalidValue {
                key: "ambient_sound".into(),
                message: format!("unknown sound '{s}'"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn parses_ids_and_file_names() {
        assert_eq!("rain".parse::<AmbientSound>().unwrap(), AmbientSound::Rain);
        assert_eq!("Sea".parse::<AmbientSound>().unwrap(), AmbientSound::Sea);
        assert_eq!(
            "provence.mp4".parse::<AmbientSound>().unwrap(),
            AmbientSound::Provence
        );
        assert!("thunder".parse::<AmbientSound>().is_err());
    }

    #[test]
    fn ids_and_files_are_unique() {
        let ids: HashSet<_> = AmbientSound::ALL.iter().map(|s| s.id()).collect();
        let files: HashSet<_> = AmbientSound::ALL.iter().map(|s| s.file_name()).collect();
        assert_eq!(ids.len(), AmbientSound::ALL.len());
        assert_eq!(files.len(), AmbientSound::ALL.len());
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&AmbientSound::Forest).unwrap();
        assert_eq!(json, "\"forest\"");
    }
}
