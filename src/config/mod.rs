//! Configuration file support.
//!
//! This module provides:
//! - Search directories for configuration files
//! - INI parsing with `[DEFAULT]` fallback, `%(name)s` interpolation and layered files
//! - Typed access to parsed values
//! - A store that reads each filename once and caches the result

mod directories;
mod file;
mod ini;
mod store;

pub use directories::{candidate_paths, DirectoryResolver, SearchDirectories, SYSTEM_CONFIG_DIR};
pub use file::{ApplyReport, ConfigFile};
pub use ini::{parse_ini, read_ini_file, IniData, DEFAULT_SECTION, MAX_INTERPOLATION_DEPTH};
pub use store::ConfigStore;
