//! Attribute values of the management model
//!
//! Provides [`ModelValue`], the tagged value stored under each attribute
//! name, and [`Expression`], the unresolved-placeholder variant that older
//! protocol versions cannot carry.

use std::fmt::{self, Display, Formatter};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// An unresolved textual expression (e.g. a `${...}` property placeholder)
///
/// Carries the raw text rather than a concrete value; resolution happens
/// outside the model layer, on a participant that understands expressions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Expression(String);

impl Expression {
    /// Create an expression from its raw text
    #[inline]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Raw expression text
    #[inline]
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.0
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The kind of a [`ModelValue`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValueKind {
    /// Never set
    Undefined,
    /// UTF-8 string
    String,
    /// 32-bit signed integer
    Int,
    /// 64-bit signed integer
    Long,
    /// Boolean
    Boolean,
    /// Ordered list of values
    List,
    /// Named value mapping
    Object,
    /// Unresolved expression
    Expression,
}

impl Display for ValueKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Undefined => "undefined",
            Self::String => "string",
            Self::Int => "int",
            Self::Long => "long",
            Self::Boolean => "boolean",
            Self::List => "list",
            Self::Object => "object",
            Self::Expression => "expression",
        };
        f.write_str(name)
    }
}

/// A tagged attribute value
///
/// The [`Expression`](ModelValue::Expression) variant is the one older
/// protocol versions cannot understand; the transformation pipeline either
/// rejects or discards it depending on the registered chain.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModelValue {
    /// Attribute exists but was never set
    #[default]
    Undefined,
    /// String value
    String(String),
    /// 32-bit integer value
    Int(i32),
    /// 64-bit integer value
    Long(i64),
    /// Boolean value
    Boolean(bool),
    /// Ordered list of values
    List(Vec<ModelValue>),
    /// Named value mapping, insertion-ordered
    Object(IndexMap<String, ModelValue>),
    /// Unresolved expression
    Expression(Expression),
}

impl ModelValue {
    /// Kind of this value
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Undefined => ValueKind::Undefined,
            Self::String(_) => ValueKind::String,
            Self::Int(_) => ValueKind::Int,
            Self::Long(_) => ValueKind::Long,
            Self::Boolean(_) => ValueKind::Boolean,
            Self::List(_) => ValueKind::List,
            Self::Object(_) => ValueKind::Object,
            Self::Expression(_) => ValueKind::Expression,
        }
    }

    /// Check if the value is defined (not [`ModelValue::Undefined`])
    #[inline]
    #[must_use]
    pub fn is_defined(&self) -> bool {
        !matches!(self, Self::Undefined)
    }

    /// Check if the value is an unresolved expression
    #[inline]
    #[must_use]
    pub fn is_expression(&self) -> bool {
        matches!(self, Self::Expression(_))
    }

    /// String content, if this is a string value
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Boolean content, if this is a boolean value
    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer content, if this is an int value
    #[inline]
    #[must_use]
    pub fn as_int(&self) -> Option<i32> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Long content, widening from int if needed
    #[inline]
    #[must_use]
    pub fn as_long(&self) -> Option<i64> {
        match self {
            Self::Long(l) => Some(*l),
            Self::Int(i) => Some(i64::from(*i)),
            _ => None,
        }
    }

    /// List content, if this is a list value
    #[inline]
    #[must_use]
    pub fn as_list(&self) -> Option<&[ModelValue]> {
        match self {
            Self::List(values) => Some(values),
            _ => None,
        }
    }

    /// Object content, if this is an object value
    #[inline]
    #[must_use]
    pub fn as_object(&self) -> Option<&IndexMap<String, ModelValue>> {
        match self {
            Self::Object(entries) => Some(entries),
            _ => None,
        }
    }

    /// Expression content, if this is an expression value
    #[inline]
    #[must_use]
    pub fn as_expression(&self) -> Option<&Expression> {
        match self {
            Self::Expression(expression) => Some(expression),
            _ => None,
        }
    }
}

impl Display for ModelValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => f.write_str("undefined"),
            Self::String(s) => f.write_str(s),
            Self::Int(i) => write!(f, "{i}"),
            Self::Long(l) => write!(f, "{l}"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::List(values) => {
                f.write_str("[")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{value}")?;
                }
                f.write_str("]")
            }
            Self::Object(entries) => {
                f.write_str("{")?;
                for (i, (name, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{name}={value}")?;
                }
                f.write_str("}")
            }
            Self::Expression(expression) => write!(f, "{expression}"),
        }
    }
}

impl From<&str> for ModelValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for ModelValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i32> for ModelValue {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<i64> for ModelValue {
    fn from(value: i64) -> Self {
        Self::Long(value)
    }
}

impl From<bool> for ModelValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<Expression> for ModelValue {
    fn from(expression: Expression) -> Self {
        Self::Expression(expression)
    }
}

impl FromIterator<ModelValue> for ModelValue {
    fn from_iter<I: IntoIterator<Item = ModelValue>>(iter: I) -> Self {
        Self::List(iter.into_iter().collect())
    }
}
