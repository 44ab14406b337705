use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Sqlite,
    Memory,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    /// Database file; `~` is expanded. Defaults to `<workspace>/diary/entries.db`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl StoreConfig {
    pub fn resolve_path(&self, workspace_dir: &Path) -> PathBuf {
        match self.path.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
            Some(raw) => PathBuf::from(shellexpand::tilde(raw).into_owned()),
            None => workspace_dir.join("diary").join("entries.db"),
        }
    }
}
