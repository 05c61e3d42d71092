//! A single named, typed configuration field

use crate::datatypes::{Kind, Value};
use crate::error::ConversionError;

/// One setting of a section: a name, a declared kind and its current value.
///
/// A present value always has the declared kind. Clones are independent,
/// which is how child sections get their own copy of inherited settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Setting {
    name: String,
    kind: Kind,
    value: Option<Value>,
}

impl Setting {
    /// Declare a setting with an explicit kind. The initial value is
    /// converted to that kind.
    pub fn new(
        name: impl Into<String>,
        kind: Kind,
        value: Option<Value>,
    ) -> Result<Self, ConversionError> {
        let value = value.map(|v| kind.convert(v)).transpose()?;
        Ok(Self {
            name: name.into(),
            kind,
            value,
        })
    }

    /// Declare a setting whose kind is inferred from its default.
    ///
    /// A list takes the kind of its first element and every other element
    /// is converted to it. An empty list carries no element kind and is
    /// rejected; declare it with an explicit kind instead.
    pub fn inferred(
        name: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<Self, ConversionError> {
        let value = value.into();
        if matches!(&value, Value::List(items) if items.is_empty()) {
            return Err(ConversionError::new(
                value.kind(),
                value.to_string(),
                "cannot infer the element kind of an empty list",
            ));
        }
        let kind = value.kind();
        let value = kind.convert(value)?;
        Ok(Self {
            name: name.into(),
            kind,
            value: Some(value),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    pub fn get(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Assign a new value, converting it to the declared kind.
    ///
    /// `None` clears the value. On failure the previous value is kept.
    pub fn set(&mut self, value: Option<Value>) -> Result<(), ConversionError> {
        self.value = match value {
            None => None,
            Some(v) => Some(self.kind.convert(v)?),
        };
        Ok(())
    }

    /// Assign a raw string as read from a configuration file.
    pub fn set_raw(&mut self, raw: &str) -> Result<(), ConversionError> {
        let value = self.kind.coerce(raw)?;
        self.value = Some(value);
        Ok(())
    }
}
