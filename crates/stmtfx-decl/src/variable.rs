//! Typed statement variables.
//!
//! A variable is declared once per statement with a closed scalar type plus
//! independent flags for nullability and list-ness. Two declarations of the
//! same variable are compared attribute by attribute so that callers can tell
//! benign drift (optionality, default value) apart from structural drift.

use serde::{Deserialize, Serialize};

/// Scalar kinds a variable may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarType {
    String,
    Int,
    Float,
    Bool,
    Timestamp,
}

impl ScalarType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::Timestamp => "timestamp",
        }
    }
}

impl std::fmt::Display for ScalarType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ScalarType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "string" => Ok(Self::String),
            "int" => Ok(Self::Int),
            "float" => Ok(Self::Float),
            "bool" => Ok(Self::Bool),
            "timestamp" => Ok(Self::Timestamp),
            _ => Err(format!("unknown variable type: {s}")),
        }
    }
}

/// Value substituted for an optional variable the caller omits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum DefaultValue {
    Null,
    Int(i64),
    Float(f64),
    Bool(bool),
    String(String),
    /// The current time, resolved by the runtime.
    Now,
}

/// One attribute of a [`VariableDecl`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VarAttribute {
    Type,
    Nullable,
    List,
    Optional,
    DefaultValue,
}

impl VarAttribute {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Type => "type",
            Self::Nullable => "nullable",
            Self::List => "list",
            Self::Optional => "optional",
            Self::DefaultValue => "defaultValue",
        }
    }

    /// Whether a difference in this attribute changes the parameter's shape.
    ///
    /// Optionality and the default value may legitimately vary between
    /// declarations of the same statement; everything else may not.
    pub fn is_structural(self) -> bool {
        !matches!(self, Self::Optional | Self::DefaultValue)
    }
}

impl std::fmt::Display for VarAttribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of comparing two variable declarations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclDiff {
    Same,
    Single(VarAttribute),
    Multiple(Vec<VarAttribute>),
}

impl DeclDiff {
    pub fn attributes(&self) -> &[VarAttribute] {
        match self {
            Self::Same => &[],
            Self::Single(attribute) => std::slice::from_ref(attribute),
            Self::Multiple(attributes) => attributes,
        }
    }

    pub fn is_same(&self) -> bool {
        matches!(self, Self::Same)
    }

    pub fn contains(&self, attribute: VarAttribute) -> bool {
        self.attributes().contains(&attribute)
    }

    /// The differing attributes that are not tolerated across variants.
    pub fn structural(&self) -> Vec<VarAttribute> {
        self.attributes()
            .iter()
            .copied()
            .filter(|attribute| attribute.is_structural())
            .collect()
    }
}

impl std::fmt::Display for DeclDiff {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Same => f.write_str("same"),
            Self::Single(attribute) => write!(f, "{attribute}"),
            Self::Multiple(attributes) => {
                let names: Vec<&str> = attributes.iter().map(|a| a.as_str()).collect();
                write!(f, "multiple: {}", names.join(", "))
            }
        }
    }
}

/// A declared statement variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableDecl {
    #[serde(rename = "type")]
    pub scalar: ScalarType,
    pub nullable: bool,
    pub list: bool,
    pub optional: bool,
    /// Only present when `optional` is set.
    pub default: Option<DefaultValue>,
}

impl VariableDecl {
    pub fn required(scalar: ScalarType) -> Self {
        Self {
            scalar,
            nullable: false,
            list: false,
            optional: false,
            default: None,
        }
    }

    pub fn with_default(mut self, default: DefaultValue) -> Self {
        self.optional = true;
        self.default = Some(default);
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn list(mut self) -> Self {
        self.list = true;
        self
    }

    /// Compare attribute by attribute, in declaration order.
    pub fn diff(&self, other: &Self) -> DeclDiff {
        let mut differing = Vec::new();
        if self.scalar != other.scalar {
            differing.push(VarAttribute::Type);
        }
        if self.nullable != other.nullable {
            differing.push(VarAttribute::Nullable);
        }
        if self.list != other.list {
            differing.push(VarAttribute::List);
        }
        if self.optional != other.optional {
            differing.push(VarAttribute::Optional);
        }
        if self.default != other.default {
            differing.push(VarAttribute::DefaultValue);
        }

        match differing.len() {
            0 => DeclDiff::Same,
            1 => DeclDiff::Single(differing[0]),
            _ => DeclDiff::Multiple(differing),
        }
    }
}
