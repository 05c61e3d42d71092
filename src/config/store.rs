//! Process-scoped cache of parsed configuration files

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use super::directories::{candidate_paths, DirectoryResolver};
use super::file::ConfigFile;

/// Parsed configuration files keyed by filename.
///
/// Each filename is read at most once per store; later requests return the
/// same [`ConfigFile`] even if the file changed on disk.
pub struct ConfigStore {
    resolver: Box<dyn DirectoryResolver>,
    files: Mutex<HashMap<String, Arc<ConfigFile>>>,
}

impl ConfigStore {
    pub fn new(resolver: impl DirectoryResolver + 'static) -> Self {
        Self {
            resolver: Box::new(resolver),
            files: Mutex::new(HashMap::new()),
        }
    }

    /// Return the cached file for `filename`, reading it from the search
    /// directories on first use.
    pub fn get_or_create(&self, filename: &str) -> Arc<ConfigFile> {
        let mut files = self.lock();
        if let Some(file) = files.get(filename) {
            return Arc::clone(file);
        }

        let candidates = candidate_paths(self.resolver.as_ref(), filename);
        let file = Arc::new(ConfigFile::load(filename, &candidates));
        if file.paths().is_empty() {
            tracing::debug!(filename, "no configuration file found in search directories");
        }
        files.insert(filename.to_string(), Arc::clone(&file));
        file
    }

    /// Filenames currently cached.
    pub fn cached(&self) -> Vec<String> {
        let mut names: Vec<String> = self.lock().keys().cloned().collect();
        names.sort();
        names
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Arc<ConfigFile>>> {
        // Entries are inserted whole, so a poisoned map is still consistent
        self.files.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigStore")
            .field("directories", &self.resolver.config_directories())
            .field("cached", &self.cached())
            .finish()
    }
}
