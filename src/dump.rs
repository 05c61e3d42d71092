//! Human-readable dumps of sections and files, for diagnostics only

use std::collections::BTreeMap;
use std::fmt;

use crate::config::ConfigFile;
use crate::datatypes::Value;
use crate::section::Section;

/// Render a section's name and its current values:
///
/// ```text
/// Server:
///   host: localhost
///   port: 80
///
/// ```
pub fn dump_settings(section: &Section) -> String {
    section.to_string()
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}:", self.name())?;
        for (name, value) in self {
            match value {
                Some(value) => writeln!(f, "  {name}: {value}")?,
                None => writeln!(f, "  {name}: None")?,
            }
        }
        writeln!(f)
    }
}

/// Render a section as a TOML table named after the section.
///
/// Unset settings are left out, since TOML has no null.
pub fn section_to_toml(section: &Section) -> Result<String, toml::ser::Error> {
    let values: BTreeMap<&str, &Value> = section
        .iter()
        .filter_map(|(name, value)| value.map(|v| (name, v)))
        .collect();
    let mut root = BTreeMap::new();
    root.insert(section.name(), values);
    toml::to_string(&root)
}

/// Render the raw sections of a file, each with its `[DEFAULT]` fallbacks.
pub fn file_to_text(file: &ConfigFile, only: Option<&str>) -> String {
    let mut out = String::new();
    for header in file.sections().filter(|h| only.map_or(true, |o| o == *h)) {
        out.push_str(&format!("[{header}]\n"));
        for (key, value) in file.get_section(header).unwrap_or_default() {
            out.push_str(&format!("{key} = {value}\n"));
        }
        out.push('\n');
    }
    out
}

/// Render the raw sections of a file as TOML tables of strings.
pub fn file_to_toml(file: &ConfigFile, only: Option<&str>) -> Result<String, toml::ser::Error> {
    let tables: BTreeMap<&str, BTreeMap<String, String>> = file
        .sections()
        .filter(|h| only.map_or(true, |o| o == *h))
        .map(|h| (h, file.get_section(h).unwrap_or_default()))
        .collect();
    toml::to_string(&tables)
}
