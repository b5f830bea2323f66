use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    And(Box<Node>, Box<Node>),
    Or(Box<Node>, Box<Node>),
    Constraint {
        selector: String,
        comparison: Comparison,
        argument: Argument,
    },
}

impl Node {
    pub fn and(left: Node, right: Node) -> Self {
        Node::And(Box::new(left), Box::new(right))
    }

    pub fn or(left: Node, right: Node) -> Self {
        Node::Or(Box::new(left), Box::new(right))
    }

    pub fn constraint(
        selector: impl Into<String>,
        comparison: Comparison,
        argument: impl Into<Argument>,
    ) -> Self {
        Node::Constraint {
            selector: selector.into(),
            comparison,
            argument: argument.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    And,
    Or,
}

impl Operator {
    pub fn sign(self) -> &'static str {
        match self {
            Operator::And => ",",
            Operator::Or => ";",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Equals,
    NotEquals,
    GreaterThan,
    GreaterEquals,
    LessThan,
    LessEquals,
}

impl Comparison {
    pub const ALL: [Comparison; 6] = [
        Comparison::Equals,
        Comparison::NotEquals,
        Comparison::GreaterThan,
        Comparison::GreaterEquals,
        Comparison::LessThan,
        Comparison::LessEquals,
    ];

    pub fn sign(self) -> &'static str {
        match self {
            Comparison::Equals => "==",
            Comparison::NotEquals => "!=",
            Comparison::GreaterThan => "=gt=",
            Comparison::GreaterEquals => "=ge=",
            Comparison::LessThan => "=lt=",
            Comparison::LessEquals => "=le=",
        }
    }

    fn short_name(self) -> &'static str {
        match self {
            Comparison::Equals => "eq",
            Comparison::NotEquals => "ne",
            Comparison::GreaterThan => "gt",
            Comparison::GreaterEquals => "ge",
            Comparison::LessThan => "lt",
            Comparison::LessEquals => "le",
        }
    }

    pub fn from_sign(sign: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.sign() == sign)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownComparison(pub String);

impl fmt::Display for UnknownComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Unknown comparison '{}' (expected ==, !=, =gt=, =ge=, =lt=, =le= or eq, ne, gt, ge, lt, le)",
            self.0
        )
    }
}

impl std::error::Error for UnknownComparison {}

impl FromStr for Comparison {
    type Err = UnknownComparison;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::from_sign(s)
            .or_else(|| {
                Self::ALL
                    .into_iter()
                    .find(|c| c.short_name().eq_ignore_ascii_case(s))
            })
            .ok_or_else(|| UnknownComparison(s.to_string()))
    }
}

/// A typed scalar compared against a selector.
///
/// `Calendar` carries its own offset and renders date-only when it falls on
/// midnight. `LocalDate` is always date-only and `Instant` always a full
/// date-time.
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    Bool(bool),
    Byte(i8),
    Short(i16),
    Int(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    Calendar(DateTime<FixedOffset>),
    LocalDate(NaiveDate),
    Instant(DateTime<FixedOffset>),
    Enum(String),
    Text(String),
    Other(Opaque),
}

impl Argument {
    pub fn enumeration(name: impl Into<String>) -> Self {
        Argument::Enum(name.into())
    }

    pub fn instant<Tz: TimeZone>(value: DateTime<Tz>) -> Self {
        Argument::Instant(value.fixed_offset())
    }

    pub fn other(value: impl fmt::Display + Send + Sync + 'static) -> Self {
        Argument::Other(Opaque(Arc::new(value)))
    }
}

/// Any value that only offers a string form.
#[derive(Clone)]
pub struct Opaque(Arc<dyn fmt::Display + Send + Sync>);

impl fmt::Display for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Debug for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Opaque").field(&self.0.to_string()).finish()
    }
}

impl PartialEq for Opaque {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_string() == other.0.to_string()
    }
}

macro_rules! argument_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Argument {
                fn from(value: $ty) -> Self {
                    Argument::$variant(value)
                }
            }
        )*
    };
}

argument_from! {
    bool => Bool,
    i8 => Byte,
    i16 => Short,
    i32 => Int,
    f32 => Float,
    i64 => Long,
    f64 => Double,
    NaiveDate => LocalDate,
    String => Text,
}

impl From<&str> for Argument {
    fn from(value: &str) -> Self {
        Argument::Text(value.to_string())
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for Argument {
    fn from(value: DateTime<Tz>) -> Self {
        Argument::Calendar(value.fixed_offset())
    }
}
