use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Failed to access last-viewed cache: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed last-viewed cache: {0}")]
    Json(#[from] serde_json::Error),
}

/// Which routine and day were on screen last time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastViewed {
    pub routine_id: Option<String>,
    pub day_id: Option<String>,
}

impl LastViewed {
    /// A missing file is an empty memory, not an error.
    pub fn load(path: &Path) -> Result<Self, CacheError> {
        match fs::read_to_string(path) {
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            tracing::warn!("Ignoring last-viewed cache at {}: {}", path.display(), e);
            Self::default()
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), CacheError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_vec_pretty(self)?)?;
        Ok(())
    }

    pub fn remember(&mut self, routine_id: &str, day_id: Option<&str>) {
        self.routine_id = Some(routine_id.to_string());
        self.day_id = day_id.map(str::to_string);
    }

    /// The remembered day, only while the same routine is still the one shown.
    pub fn day_for(&self, routine_id: &str) -> Option<&str> {
        match self.routine_id.as_deref() {
            Some(id) if id == routine_id => self.day_id.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_means_no_memory() {
        let dir = TempDir::new().unwrap();
        let loaded = LastViewed::load(&dir.path().join("nothing.json")).unwrap();
        assert_eq!(loaded, LastViewed::default());
    }

    #[test]
    fn saved_selection_is_loaded_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("last_viewed.json");
        let mut memory = LastViewed::default();
        memory.remember("r-1", Some("d-2"));
        memory.save(&path).unwrap();

        let loaded = LastViewed::load(&path).unwrap();
        assert_eq!(loaded.day_for("r-1"), Some("d-2"));
        assert_eq!(loaded.day_for("r-2"), None);
    }

    #[test]
    fn corrupt_file_is_reported_but_tolerated() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("last_viewed.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(LastViewed::load(&path), Err(CacheError::Json(_))));
        assert_eq!(LastViewed::load_or_default(&path), LastViewed::default());
    }
}
