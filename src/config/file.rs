//! A parsed configuration file and typed access to its values

use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use super::ini::{parse_ini, read_ini_file, IniData};
use crate::datatypes::{Kind, ParseValue, Value};
use crate::error::InterpolationError;
use crate::section::Section;

/// Outcome of applying a file section to a [`Section`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ApplyReport {
    /// Settings that took their value from the file
    pub applied: Vec<String>,
    /// Settings whose file value could not be converted (default kept)
    pub rejected: Vec<String>,
}

impl ApplyReport {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// Contents of every candidate path found for one configuration filename.
#[derive(Debug)]
pub struct ConfigFile {
    filename: String,
    paths: Vec<PathBuf>,
    data: IniData,
}

impl ConfigFile {
    /// Read every existing path in `candidates`, in order.
    ///
    /// Missing files are skipped silently; unreadable ones are logged and
    /// skipped. Values from later files override earlier ones.
    pub fn load(filename: impl Into<String>, candidates: &[PathBuf]) -> Self {
        let mut data = IniData::default();
        let mut paths = Vec::new();

        for path in candidates {
            match read_ini_file(path, &mut data) {
                Ok(()) => {
                    tracing::debug!(path = %path.display(), "read configuration file");
                    paths.push(path.clone());
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::warn!(
                        system = "configuration",
                        path = %path.display(),
                        error = %e,
                        "cannot read configuration file, skipping"
                    );
                }
            }
        }

        Self {
            filename: filename.into(),
            paths,
            data,
        }
    }

    /// Build a file from in-memory INI text.
    pub fn parse(filename: impl Into<String>, content: &str) -> Self {
        let filename = filename.into();
        let mut data = IniData::default();
        parse_ini(content, Path::new(&filename), &mut data);
        Self {
            filename,
            paths: Vec::new(),
            data,
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Paths that were actually read, in read order.
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.data.sections.keys().map(String::as_str)
    }

    pub fn has_section(&self, header: &str) -> bool {
        self.data.has_section(header)
    }

    /// All options of `header`, including `[DEFAULT]` fallbacks, or `None`
    /// if the section does not exist.
    ///
    /// References are expanded; a value whose expansion fails is kept raw.
    pub fn get_section(&self, header: &str) -> Option<BTreeMap<String, String>> {
        let section = self.data.sections.get(header)?;
        let keys = self.data.defaults.keys().chain(section.keys());
        let merged = keys
            .filter_map(|key| {
                let value = match self.data.interpolated(header, key)? {
                    Ok(value) => value,
                    Err(_) => self.data.get(header, key)?.to_string(),
                };
                Some((key.clone(), value))
            })
            .collect();
        Some(merged)
    }

    /// Value of `key` in `header` exactly as written, references unexpanded.
    pub fn get_raw(&self, header: &str, key: &str) -> Option<&str> {
        self.data.get(header, key)
    }

    /// Value of `key` in `header` with references expanded.
    ///
    /// A reference that cannot be expanded is logged here; a missing key
    /// is `Ok(None)`.
    fn lookup(&self, header: &str, key: &str) -> Result<Option<String>, InterpolationError> {
        let expanded = self.data.interpolated(header, key).transpose();
        if let Err(e) = &expanded {
            warn_invalid(header, key, self.get_raw(header, key).unwrap_or_default(), e);
        }
        expanded
    }

    /// Value of `key` in `header` coerced to `kind`.
    ///
    /// Returns `default` when the section or key is absent, or when the
    /// raw value cannot be converted (the latter is logged).
    pub fn get_value(&self, header: &str, key: &str, kind: &Kind, default: Value) -> Value {
        let Ok(Some(raw)) = self.lookup(header, key) else {
            return default;
        };
        match kind.coerce(&raw) {
            Ok(value) => value,
            Err(e) => {
                warn_invalid(header, key, &raw, &e);
                default
            }
        }
    }

    /// Like [`get_value`](Self::get_value) for a Rust type. Booleans accept
    /// the same tokens as boolean settings.
    pub fn get_setting<T: ParseValue>(&self, header: &str, key: &str, default: T) -> T {
        let Ok(Some(raw)) = self.lookup(header, key) else {
            return default;
        };
        match T::parse_value(&raw) {
            Ok(value) => value,
            Err(e) => {
                warn_invalid(header, key, &raw, &e);
                default
            }
        }
    }

    /// Load the values of `header` into the settings of `section`.
    ///
    /// Does nothing if the file has no such section. Keys missing from the
    /// file leave their setting untouched, as do values that fail to
    /// convert; each such failure is logged once.
    pub fn apply_to_section(&self, header: &str, section: &mut Section) -> ApplyReport {
        let mut report = ApplyReport::default();
        if !self.has_section(header) {
            return report;
        }

        let names: Vec<String> = section.names().map(str::to_string).collect();
        for name in names {
            let raw = match self.lookup(header, &name) {
                Ok(Some(raw)) => raw,
                Ok(None) => continue,
                Err(_) => {
                    report.rejected.push(name);
                    continue;
                }
            };
            match section.set_raw(&name, &raw) {
                Ok(()) => report.applied.push(name),
                Err(e) => {
                    warn_invalid(header, &name, &raw, &e);
                    report.rejected.push(name);
                }
            }
        }
        report
    }
}

fn warn_invalid(header: &str, key: &str, raw: &str, reason: &dyn fmt::Display) {
    tracing::warn!(
        system = "configuration",
        section = header,
        setting = key,
        "ignoring invalid config value: {header}.{key}={raw} ({reason})."
    );
}
