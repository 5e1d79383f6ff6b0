use std::{fs, path::Path, path::PathBuf};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Pin bindings for one run: logical names mapped to sysfs pin numbers,
/// split by direction. Both sections are optional in the JSON.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct LoopConfig {
    #[serde(default)]
    pub input: FxHashMap<String, u32>,
    #[serde(default)]
    pub output: FxHashMap<String, u32>,
}

impl LoopConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let contents = fs::read_to_string(&path)
            .map_err(|e| Error::Config(format!("Failed to read config: {e}")))?;
        serde_json::from_str(&contents)
            .map_err(|e| Error::Config(format!("Invalid config json: {e}")))
    }
}

/// Configuration handed to [`LoopEngine::run`](crate::LoopEngine::run):
/// either an already-structured mapping or a file to load it from.
#[derive(Debug, Clone)]
pub enum ConfigSource {
    Inline(LoopConfig),
    File(PathBuf),
}

impl ConfigSource {
    pub fn resolve(self) -> Result<LoopConfig, Error> {
        match self {
            ConfigSource::Inline(config) => Ok(config),
            ConfigSource::File(path) => LoopConfig::load_from_file(path),
        }
    }
}

impl From<LoopConfig> for ConfigSource {
    fn from(config: LoopConfig) -> Self {
        ConfigSource::Inline(config)
    }
}

impl From<PathBuf> for ConfigSource {
    fn from(path: PathBuf) -> Self {
        ConfigSource::File(path)
    }
}

impl From<&Path> for ConfigSource {
    fn from(path: &Path) -> Self {
        ConfigSource::File(path.to_path_buf())
    }
}
