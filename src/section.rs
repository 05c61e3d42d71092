//! Section declarations and the builder that turns them into typed sections
//!
//! A section is declared in two steps. [`SectionDecl`] collects the name,
//! the optional file binding, parent sections and the settings with their
//! defaults. [`SectionDecl::build`] then clones inherited settings, snapshots
//! the defaults and, when the declaration names both a file and a section
//! header, loads the matching values from the [`ConfigStore`].

use std::collections::{BTreeMap, HashSet};

use crate::config::{ApplyReport, ConfigStore};
use crate::datatypes::{FromValue, Kind, Value};
use crate::error::{ConfigError, ConversionError};
use crate::setting::Setting;

#[derive(Debug)]
enum Declaration {
    Inferred(String, Value),
    Explicit {
        name: String,
        kind: Kind,
        value: Option<Value>,
    },
    Setting(Setting),
}

impl Declaration {
    fn name(&self) -> &str {
        match self {
            Declaration::Inferred(name, _) => name,
            Declaration::Explicit { name, .. } => name,
            Declaration::Setting(setting) => setting.name(),
        }
    }

    fn into_setting(self) -> Result<Setting, ConversionError> {
        match self {
            Declaration::Inferred(name, value) => Setting::inferred(name, value),
            Declaration::Explicit { name, kind, value } => Setting::new(name, kind, value),
            Declaration::Setting(setting) => Ok(setting),
        }
    }
}

/// Settings and file binding inherited from one parent section.
#[derive(Debug)]
struct Parent {
    config_file: Option<String>,
    section: Option<String>,
    settings: Vec<Setting>,
}

/// Declaration of a section, consumed by [`build`](SectionDecl::build).
#[derive(Debug)]
pub struct SectionDecl {
    name: String,
    // Outer `None` means "inherit from the first parent that has one"
    config_file: Option<Option<String>>,
    section: Option<Option<String>>,
    parents: Vec<Parent>,
    declarations: Vec<Declaration>,
}

impl SectionDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config_file: None,
            section: None,
            parents: Vec::new(),
            declarations: Vec::new(),
        }
    }

    /// Configuration file the section reads its values from.
    pub fn config_file(mut self, filename: impl Into<String>) -> Self {
        self.config_file = Some(Some(filename.into()));
        self
    }

    /// Header of the file section holding the values.
    pub fn section(mut self, header: impl Into<String>) -> Self {
        self.section = Some(Some(header.into()));
        self
    }

    /// Do not bind to any file, even if a parent does.
    pub fn unbound(mut self) -> Self {
        self.config_file = Some(None);
        self.section = Some(None);
        self
    }

    /// Inherit the settings of `parent`. Each inherited setting is copied
    /// with its current value; the copy is independent of the parent.
    pub fn inherit(mut self, parent: &Section) -> Self {
        self.parents.push(Parent {
            config_file: parent.config_file.clone(),
            section: parent.section.clone(),
            settings: parent.settings.values().cloned().collect(),
        });
        self
    }

    /// Declare a setting whose kind is inferred from `default`.
    pub fn value(mut self, name: impl Into<String>, default: impl Into<Value>) -> Self {
        self.declarations
            .push(Declaration::Inferred(name.into(), default.into()));
        self
    }

    /// Declare a setting of an explicit kind; `default` is converted to it.
    pub fn typed(mut self, name: impl Into<String>, kind: Kind, default: impl Into<Value>) -> Self {
        self.declarations.push(Declaration::Explicit {
            name: name.into(),
            kind,
            value: Some(default.into()),
        });
        self
    }

    /// Declare a list setting whose element kind comes from `T`, so an
    /// empty default still has a usable kind.
    pub fn list<T>(mut self, name: impl Into<String>, default: Vec<T>) -> Self
    where
        T: FromValue + Into<Value>,
    {
        self.declarations.push(Declaration::Explicit {
            name: name.into(),
            kind: Kind::list_of(T::kind()),
            value: Some(default.into()),
        });
        self
    }

    /// Declare a setting of an explicit kind that starts without a value.
    pub fn unset(mut self, name: impl Into<String>, kind: Kind) -> Self {
        self.declarations.push(Declaration::Explicit {
            name: name.into(),
            kind,
            value: None,
        });
        self
    }

    /// Declare a prepared setting.
    pub fn setting(mut self, setting: Setting) -> Self {
        self.declarations.push(Declaration::Setting(setting));
        self
    }

    /// Build the section and bind it to its configuration file.
    ///
    /// Fails only if a declared default cannot be converted to its kind,
    /// or if the kind of an inferred default cannot be determined. Invalid values in the file are logged and skipped.
    pub fn build(self, store: &ConfigStore) -> Result<Section, ConfigError> {
        let config_file = self.config_file.unwrap_or_else(|| {
            self.parents
                .iter()
                .find_map(|p| p.config_file.clone())
        });
        let header = self
            .section
            .unwrap_or_else(|| self.parents.iter().find_map(|p| p.section.clone()));

        let declared: HashSet<String> = self
            .declarations
            .iter()
            .map(|d| d.name().to_string())
            .collect();

        let mut settings = BTreeMap::new();
        for parent in self.parents {
            for setting in parent.settings {
                if declared.contains(setting.name()) || settings.contains_key(setting.name()) {
                    continue;
                }
                settings.insert(setting.name().to_string(), setting);
            }
        }

        for declaration in self.declarations {
            if is_reserved(declaration.name()) {
                tracing::debug!(
                    section = %self.name,
                    name = declaration.name(),
                    "skipping reserved name"
                );
                continue;
            }
            let setting = declaration.into_setting()?;
            settings.insert(setting.name().to_string(), setting);
        }

        let defaults = settings
            .iter()
            .map(|(name, setting)| (name.clone(), setting.get().cloned()))
            .collect();

        let mut section = Section {
            name: self.name,
            config_file,
            section: header,
            settings,
            defaults,
            binding: None,
        };

        if let (Some(filename), Some(header)) =
            (section.config_file.clone(), section.section.clone())
        {
            let file = store.get_or_create(&filename);
            let report = file.apply_to_section(&header, &mut section);
            section.binding = Some(report);
        }

        Ok(section)
    }
}

/// Build `decl` against `store`. Same as [`SectionDecl::build`].
pub fn build_section(decl: SectionDecl, store: &ConfigStore) -> Result<Section, ConfigError> {
    decl.build(store)
}

fn is_reserved(name: &str) -> bool {
    name.is_empty() || name.starts_with("__")
}

/// A named group of typed settings, optionally bound to a file section.
///
/// Sections are only obtained from [`SectionDecl::build`]. Their set of
/// settings is fixed: values can change, names cannot be added or removed.
#[derive(Debug)]
pub struct Section {
    name: String,
    config_file: Option<String>,
    section: Option<String>,
    settings: BTreeMap<String, Setting>,
    defaults: BTreeMap<String, Option<Value>>,
    binding: Option<ApplyReport>,
}

impl Section {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config_file(&self) -> Option<&str> {
        self.config_file.as_deref()
    }

    pub fn section(&self) -> Option<&str> {
        self.section.as_deref()
    }

    /// What the file binding applied and rejected, if the section is bound.
    pub fn binding(&self) -> Option<&ApplyReport> {
        self.binding.as_ref()
    }

    pub fn len(&self) -> usize {
        self.settings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.settings.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.settings.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.settings.keys().map(String::as_str)
    }

    pub fn setting(&self, name: &str) -> Option<&Setting> {
        self.settings.get(name)
    }

    /// Current value of `name`; `Ok(None)` if the setting has no value.
    pub fn get(&self, name: &str) -> Result<Option<&Value>, ConfigError> {
        Ok(self.registered(name)?.get())
    }

    /// Current value of `name` as a Rust type matching its kind.
    pub fn get_as<T: FromValue>(&self, name: &str) -> Result<Option<T>, ConfigError> {
        let Some(value) = self.get(name)? else {
            return Ok(None);
        };
        match T::from_value(value) {
            Some(v) => Ok(Some(v)),
            None => Err(ConversionError::new(
                T::kind(),
                value.to_string(),
                format!("setting '{name}' is {}", value.kind()),
            )
            .into()),
        }
    }

    /// Assign `value` to `name`, converting it to the setting's kind.
    /// The previous value is kept if conversion fails.
    pub fn set(&mut self, name: &str, value: Option<Value>) -> Result<(), ConfigError> {
        self.registered_mut(name)?.set(value)?;
        Ok(())
    }

    /// Assign a raw string to `name`.
    pub fn set_raw(&mut self, name: &str, raw: &str) -> Result<(), ConfigError> {
        self.registered_mut(name)?.set_raw(raw)?;
        Ok(())
    }

    /// Settings cannot be removed; this always fails and leaves the
    /// section unchanged.
    pub fn remove(&mut self, name: &str) -> Result<(), ConfigError> {
        self.registered(name)?;
        Err(ConfigError::ImmutableSetting {
            section: self.name.clone(),
            name: name.to_string(),
        })
    }

    /// Values the settings had when the section was declared, before any
    /// file values were applied.
    pub fn defaults(&self) -> &BTreeMap<String, Option<Value>> {
        &self.defaults
    }

    pub fn default_of(&self, name: &str) -> Result<Option<&Value>, ConfigError> {
        self.registered(name)?;
        Ok(self.defaults.get(name).and_then(Option::as_ref))
    }

    /// Restore every setting to its declared default.
    pub fn reset(&mut self) {
        for (name, setting) in self.settings.iter_mut() {
            let default = self.defaults.get(name).cloned().flatten();
            if let Err(e) = setting.set(default) {
                tracing::warn!(section = %self.name, setting = %name, error = %e, "cannot restore default");
            }
        }
    }

    /// `(name, value)` pairs for all settings.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&Value>)> {
        self.settings
            .iter()
            .map(|(name, setting)| (name.as_str(), setting.get()))
    }

    fn registered(&self, name: &str) -> Result<&Setting, ConfigError> {
        self.settings
            .get(name)
            .ok_or_else(|| ConfigError::UnknownSetting {
                section: self.name.clone(),
                name: name.to_string(),
            })
    }

    fn registered_mut(&mut self, name: &str) -> Result<&mut Setting, ConfigError> {
        self.settings
            .get_mut(name)
            .ok_or_else(|| ConfigError::UnknownSetting {
                section: self.name.clone(),
                name: name.to_string(),
            })
    }
}

impl<'a> IntoIterator for &'a Section {
    type Item = (&'a str, Option<&'a Value>);
    type IntoIter = Box<dyn Iterator<Item = Self::Item> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}
