//! Typed command flags.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// Type tag of a declared flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlagKind {
    /// Free-form text.
    String,
    /// `true` / `false` switch.
    Bool,
    /// Signed 64-bit integer.
    Int,
    /// 64-bit float.
    Float,
}

impl FlagKind {
    /// Zero value for this kind: `""`, `false`, `0` or `0.0`.
    #[must_use]
    pub fn zero(self) -> FlagValue {
        match self {
            Self::String => FlagValue::String(String::new()),
            Self::Bool => FlagValue::Bool(false),
            Self::Int => FlagValue::Int(0),
            Self::Float => FlagValue::Float(0.0),
        }
    }
}

impl Display for FlagKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::String => "string",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
        };
        f.write_str(name)
    }
}

/// A resolved flag value.
#[derive(Debug, Clone, PartialEq)]
pub enum FlagValue {
    /// Text value.
    String(String),
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Float value.
    Float(f64),
}

impl FlagValue {
    /// Type tag of this value.
    #[must_use]
    pub fn kind(&self) -> FlagKind {
        match self {
            Self::String(_) => FlagKind::String,
            Self::Bool(_) => FlagKind::Bool,
            Self::Int(_) => FlagKind::Int,
            Self::Float(_) => FlagKind::Float,
        }
    }
}

impl From<&str> for FlagValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for FlagValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for FlagValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for FlagValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for FlagValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

/// Declarative description of one command option.
#[derive(Debug, Clone, PartialEq)]
pub struct FlagSpec {
    name: String,
    short: Option<char>,
    default: FlagValue,
    help: String,
}

impl FlagSpec {
    /// Declare a flag whose kind is taken from its typed default.
    pub fn new(name: impl Into<String>, default: impl Into<FlagValue>) -> Self {
        Self {
            name: name.into(),
            short: None,
            default: default.into(),
            help: String::new(),
        }
    }

    /// String flag.
    pub fn string(name: impl Into<String>, default: impl Into<String>) -> Self {
        Self::new(name, FlagValue::String(default.into()))
    }

    /// Boolean flag.
    pub fn bool(name: impl Into<String>, default: bool) -> Self {
        Self::new(name, FlagValue::Bool(default))
    }

    /// Integer flag.
    pub fn int(name: impl Into<String>, default: i64) -> Self {
        Self::new(name, FlagValue::Int(default))
    }

    /// Float flag.
    pub fn float(name: impl Into<String>, default: f64) -> Self {
        Self::new(name, FlagValue::Float(default))
    }

    /// Set the one-letter short alias.
    #[must_use]
    pub fn short(mut self, short: char) -> Self {
        self.short = Some(short);
        self
    }

    /// Set the help text.
    #[must_use]
    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    /// Flag name, also used as the query parameter key.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Short alias, if any.
    #[must_use]
    pub fn short_alias(&self) -> Option<char> {
        self.short
    }

    /// Declared type.
    #[must_use]
    pub fn kind(&self) -> FlagKind {
        self.default.kind()
    }

    /// Typed default value.
    #[must_use]
    pub fn default_value(&self) -> &FlagValue {
        &self.default
    }

    /// Help text.
    #[must_use]
    pub fn help_text(&self) -> &str {
        &self.help
    }
}

/// Resolved flag values for one invocation, keyed by flag name.
///
/// Getters return the type's zero value for a missing flag or one of a
/// different kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlagValues(BTreeMap<String, FlagValue>);

impl FlagValues {
    /// Empty value set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Each spec's default value.
    #[must_use]
    pub fn defaults(specs: &[FlagSpec]) -> Self {
        specs
            .iter()
            .map(|spec| (spec.name().to_owned(), spec.default_value().clone()))
            .collect()
    }

    /// Insert or replace a value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FlagValue>) {
        self.0.insert(name.into(), value.into());
    }

    /// Raw lookup.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FlagValue> {
        self.0.get(name)
    }

    /// Iterate in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FlagValue)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Number of values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no values are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// String value of `name`, or `""`.
    #[must_use]
    pub fn get_string(&self, name: &str) -> String {
        match self.0.get(name) {
            Some(FlagValue::String(value)) => value.clone(),
            _ => String::new(),
        }
    }

    /// Boolean value of `name`, or `false`.
    #[must_use]
    pub fn get_bool(&self, name: &str) -> bool {
        matches!(self.0.get(name), Some(FlagValue::Bool(true)))
    }

    /// Integer value of `name`, or `0`.
    #[must_use]
    pub fn get_int(&self, name: &str) -> i64 {
        match self.0.get(name) {
            Some(FlagValue::Int(value)) => *value,
            _ => 0,
        }
    }

    /// Float value of `name`, or `0.0`.
    #[must_use]
    pub fn get_float(&self, name: &str) -> f64 {
        match self.0.get(name) {
            Some(FlagValue::Float(value)) => *value,
            _ => 0.0,
        }
    }
}

impl FromIterator<(String, FlagValue)> for FlagValues {
    fn from_iter<I: IntoIterator<Item = (String, FlagValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
