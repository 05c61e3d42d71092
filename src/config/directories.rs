//! Where configuration files are looked up

use std::path::{Path, PathBuf};

/// Default system-wide configuration directory.
pub const SYSTEM_CONFIG_DIR: &str = "/etc";

/// Supplies the ordered list of directories searched for a configuration
/// file. `None` entries are allowed and skipped by the store.
///
/// Files found in later directories override values from earlier ones.
pub trait DirectoryResolver: Send + Sync {
    fn config_directories(&self) -> Vec<Option<PathBuf>>;
}

impl DirectoryResolver for Vec<Option<PathBuf>> {
    fn config_directories(&self) -> Vec<Option<PathBuf>> {
        self.clone()
    }
}

impl DirectoryResolver for Vec<PathBuf> {
    fn config_directories(&self) -> Vec<Option<PathBuf>> {
        self.iter().cloned().map(Some).collect()
    }
}

/// A system directory plus an optional local one that takes precedence.
#[derive(Debug, Clone)]
pub struct SearchDirectories {
    system: Option<PathBuf>,
    local: Option<PathBuf>,
}

impl Default for SearchDirectories {
    fn default() -> Self {
        Self {
            system: Some(PathBuf::from(SYSTEM_CONFIG_DIR)),
            local: None,
        }
    }
}

impl SearchDirectories {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_system(mut self, dir: Option<&Path>) -> Self {
        self.system = dir.map(Path::to_path_buf);
        self
    }

    pub fn with_local(mut self, dir: Option<&Path>) -> Self {
        self.local = dir.map(Path::to_path_buf);
        self
    }

    pub fn system(&self) -> Option<&Path> {
        self.system.as_deref()
    }

    pub fn local(&self) -> Option<&Path> {
        self.local.as_deref()
    }
}

impl DirectoryResolver for SearchDirectories {
    fn config_directories(&self) -> Vec<Option<PathBuf>> {
        vec![self.system.clone(), self.local.clone()]
    }
}

/// Join `filename` onto every present directory.
pub fn candidate_paths(resolver: &dyn DirectoryResolver, filename: &str) -> Vec<PathBuf> {
    resolver
        .config_directories()
        .into_iter()
        .flatten()
        .map(|dir| dir.join(filename))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_search_directories() {
        let dirs = SearchDirectories::new();
        assert_eq!(dirs.system(), Some(Path::new("/etc")));
        assert_eq!(dirs.local(), None);
        assert_eq!(
            dirs.config_directories(),
            vec![Some(PathBuf::from("/etc")), None]
        );
    }

    #[test]
    fn test_local_comes_after_system() {
        let dirs = SearchDirectories::new().with_local(Some(Path::new("/opt/app/config")));
        assert_eq!(
            candidate_paths(&dirs, "app.ini"),
            vec![
                PathBuf::from("/etc/app.ini"),
                PathBuf::from("/opt/app/config/app.ini"),
            ]
        );
    }

    #[test]
    fn test_candidate_paths_skip_missing_directories() {
        let dirs: Vec<Option<PathBuf>> = vec![None, Some(PathBuf::from("/a")), None];
        assert_eq!(candidate_paths(&dirs, "x.ini"), vec![PathBuf::from("/a/x.ini")]);
    }

    #[test]
    fn test_no_directories() {
        let dirs = SearchDirectories::new().with_system(None);
        assert!(candidate_paths(&dirs, "x.ini").is_empty());
    }
}
