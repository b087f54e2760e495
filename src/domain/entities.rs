//! Domain entities: inventory, package metadata and invocations

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer};

use crate::domain::DomainError;

/// Primitive type tag of a command option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    String,
    Number,
    Integer,
    Boolean,
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            OptionType::String => "string",
            OptionType::Number => "number",
            OptionType::Integer => "integer",
            OptionType::Boolean => "boolean",
        };
        f.write_str(tag)
    }
}

/// A scalar option value, either declared as a default or parsed from argv.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Boolean(bool),
    Integer(i64),
    Number(f64),
    String(String),
}

impl OptionValue {
    /// Type tag a value of this kind implies for an untyped option.
    pub fn option_type(&self) -> OptionType {
        match self {
            OptionValue::Boolean(_) => OptionType::Boolean,
            OptionValue::Integer(_) => OptionType::Integer,
            OptionValue::Number(_) => OptionType::Number,
            OptionValue::String(_) => OptionType::String,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            OptionValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view; integers widen to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            OptionValue::Number(n) => Some(*n),
            OptionValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Boolean(b) => write!(f, "{}", b),
            OptionValue::Integer(i) => write!(f, "{}", i),
            OptionValue::Number(n) => write!(f, "{}", n),
            OptionValue::String(s) => f.write_str(s),
        }
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::String(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        OptionValue::String(value)
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Boolean(value)
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        OptionValue::Integer(value)
    }
}

impl From<f64> for OptionValue {
    fn from(value: f64) -> Self {
        OptionValue::Number(value)
    }
}

/// One option of a command, as declared in the inventory.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OptionSpec {
    pub name: String,
    pub alias: Option<String>,
    pub description: Option<String>,
    pub default: Option<OptionValue>,
    #[serde(rename = "type")]
    pub value_type: Option<OptionType>,
}

impl OptionSpec {
    /// Declared type, else the type of the default, else `string`.
    pub fn effective_type(&self) -> OptionType {
        self.value_type
            .or_else(|| self.default.as_ref().map(OptionValue::option_type))
            .unwrap_or(OptionType::String)
    }
}

/// One command of the inventory.
///
/// `name` and `executor` stay optional here: their absence is reported at
/// dispatch time (`MissingCommandName`, `InvalidExecutor`), not at load time.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CommandSpec {
    pub name: Option<String>,
    pub description: Option<String>,
    pub executor: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub options: Vec<OptionSpec>,
}

/// Inventory document as parsed, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawInventory {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub commands: Vec<CommandSpec>,
}

/// Validated command inventory: a non-empty tool name and at least one command.
#[derive(Debug, Clone, PartialEq)]
pub struct Inventory {
    pub name: String,
    pub commands: Vec<CommandSpec>,
}

impl TryFrom<RawInventory> for Inventory {
    type Error = DomainError;

    fn try_from(raw: RawInventory) -> Result<Self, Self::Error> {
        let name = raw
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .ok_or(DomainError::MissingName)?;
        if raw.commands.is_empty() {
            return Err(DomainError::NoCommands);
        }
        Ok(Self {
            name,
            commands: raw.commands,
        })
    }
}

/// Host package metadata relevant to the generated CLI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageManifest {
    pub name: Option<String>,
    pub version: String,
    /// Executable entry points declared by the package
    pub bins: Vec<String>,
    pub description: Option<String>,
    pub homepage: Option<String>,
}

impl PackageManifest {
    pub fn declares_bin(&self, name: &str) -> bool {
        self.bins.iter().any(|b| b == name)
    }
}

/// The command object handed to an executor: the matched command name and
/// the parsed value of each declared option.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Invocation {
    pub name: String,
    pub options: BTreeMap<String, OptionValue>,
}

impl Invocation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: BTreeMap::new(),
        }
    }

    pub fn with_option(mut self, name: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.options.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.options.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(OptionValue::as_str)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(OptionValue::as_bool)
    }
}

/// Treat an explicit YAML `null` (e.g. `options:` with no items) as an empty list.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
