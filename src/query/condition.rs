/*!
# Conditions

Predicates evaluated against a single control. Conditions form a tree:
property comparisons and named function predicates are the leaves, `and` /
`or` composites join them, and two variants reach beyond the candidate
itself:

- [`Condition::HasElement`] holds an entire [`Query`] that must yield at
  least one match when rooted at the candidate.
- [`Condition::RelativeTo`] holds another condition that must be satisfied by
  some control within a [`Distance`] of the candidate.

Evaluation itself lives in the search engine, since both of those variants
need to walk the live tree.
*/
use regex::{Regex, RegexBuilder};
use std::{fmt, sync::Arc};

use super::Query;
use super::property::{PropertyId, PropertyValue};

/// How a [`PropertyCondition`] compares the actual value to the expected one.
#[derive(Debug, Clone)]
pub enum MatchMode {
    /// Values must be equal. Strings compare by content; values of different
    /// kinds are never equal.
    Exact,
    /// The rendered actual value must contain the expected value.
    Contains,
    /// The rendered actual value must match the compiled expression.
    Regex(Regex),
}

impl PartialEq for MatchMode {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Exact, Self::Exact) | (Self::Contains, Self::Contains) => {
                true
            }
            (Self::Regex(a), Self::Regex(b)) => a.as_str() == b.as_str(),
            _ => false,
        }
    }
}

/// Option flags of a [`PropertyCondition`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PropertyOptions {
    /// Compare strings case-insensitively.
    pub ignore_case: bool,
    /// Negate the comparison.
    pub unequal: bool,
}

impl PropertyOptions {
    /// Case-insensitive comparison.
    pub const IGNORE_CASE: Self = Self {
        ignore_case: true,
        unequal: false,
    };
    /// Negated comparison.
    pub const UNEQUAL: Self = Self {
        ignore_case: false,
        unequal: true,
    };
}

/// Compares one property of the candidate with an expected value.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyCondition {
    property: PropertyId,
    value: PropertyValue,
    mode: MatchMode,
    options: PropertyOptions,
}

impl PropertyCondition {
    /// Equality (or, with `options.unequal`, inequality) comparison.
    pub fn equals(
        property: PropertyId,
        value: impl Into<PropertyValue>,
        options: PropertyOptions,
    ) -> Self {
        Self {
            property,
            value: value.into(),
            mode: MatchMode::Exact,
            options,
        }
    }

    /// Substring comparison against the rendered property value.
    pub fn contains(
        property: PropertyId,
        needle: impl Into<String>,
        options: PropertyOptions,
    ) -> Self {
        Self {
            property,
            value: PropertyValue::Str(needle.into()),
            mode: MatchMode::Contains,
            options,
        }
    }

    /// Regular-expression comparison against the rendered property value.
    ///
    /// # Errors
    ///
    /// Returns the [`regex::Error`] if `pattern` does not compile.
    pub fn regex(
        property: PropertyId,
        pattern: &str,
        options: PropertyOptions,
    ) -> Result<Self, regex::Error> {
        let compiled = RegexBuilder::new(pattern)
            .case_insensitive(options.ignore_case)
            .build()?;
        Ok(Self {
            property,
            value: PropertyValue::Str(pattern.to_string()),
            mode: MatchMode::Regex(compiled),
            options,
        })
    }

    #[must_use]
    pub const fn property(&self) -> &PropertyId {
        &self.property
    }

    #[must_use]
    pub const fn value(&self) -> &PropertyValue {
        &self.value
    }

    #[must_use]
    pub const fn mode(&self) -> &MatchMode {
        &self.mode
    }

    #[must_use]
    pub const fn options(&self) -> PropertyOptions {
        self.options
    }

    /// Returns the control type name if this is a plain, case-sensitive
    /// equality test on `ControlType` whose value is a CPath identifier,
    /// i.e. a CPath node test.
    pub(crate) fn as_node_test(&self) -> Option<&str> {
        let plain = matches!(self.mode, MatchMode::Exact)
            && self.options == PropertyOptions::default()
            && self.property == PropertyId::CONTROL_TYPE;
        if !plain {
            return None;
        }
        self.value.as_str().filter(|name| is_identifier(name))
    }

    /// Tests an actual property value. An absent value never matches,
    /// regardless of `unequal`.
    #[must_use]
    pub fn test(&self, actual: Option<&PropertyValue>) -> bool {
        let Some(actual) = actual else {
            return false;
        };
        let ignore_case = self.options.ignore_case;
        let hit = match &self.mode {
            MatchMode::Exact => match (&self.value, actual) {
                (PropertyValue::Str(expected), PropertyValue::Str(actual))
                    if ignore_case =>
                {
                    expected.to_lowercase() == actual.to_lowercase()
                }
                (expected, actual) => expected == actual,
            },
            MatchMode::Contains => {
                let (haystack, needle) =
                    (actual.to_string(), self.value.to_string());
                if ignore_case {
                    haystack.to_lowercase().contains(&needle.to_lowercase())
                } else {
                    haystack.contains(&needle)
                }
            }
            MatchMode::Regex(re) => re.is_match(&actual.to_string()),
        };
        hit != self.options.unequal
    }
}

impl fmt::Display for PropertyCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match (&self.mode, self.options.unequal) {
            (MatchMode::Exact, false) => "=",
            (MatchMode::Exact, true) => "!=",
            (MatchMode::Contains, false) => "*=",
            (MatchMode::Contains, true) => "!*=",
            (MatchMode::Regex(_), false) => "~=",
            (MatchMode::Regex(_), true) => "!~=",
        };
        write!(f, "@{}{op}", self.property)?;
        self.value.write_literal(f)?;
        if self.options.ignore_case {
            f.write_str(" i")?;
        }
        Ok(())
    }
}

/// Read access to the properties of the control being evaluated, handed to
/// [`FunctionCondition`] predicates.
pub trait PropertySource {
    /// Returns the property value, or `None` if the control does not report
    /// it (or is no longer present).
    fn property(&self, id: &PropertyId) -> Option<PropertyValue>;
}

type Predicate = dyn Fn(&dyn PropertySource) -> bool + Send + Sync;

/// A named, caller-supplied predicate.
#[derive(Clone)]
pub struct FunctionCondition {
    name: String,
    predicate: Arc<Predicate>,
}

impl FunctionCondition {
    pub fn new<F>(name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&dyn PropertySource) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            predicate: Arc::new(predicate),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&self, source: &dyn PropertySource) -> bool {
        (self.predicate)(source)
    }
}

impl fmt::Debug for FunctionCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionCondition").field("name", &self.name).finish()
    }
}

/// Two function conditions are equal only if they share the same predicate.
impl PartialEq for FunctionCondition {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && Arc::ptr_eq(&self.predicate, &other.predicate)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

impl LogicalOp {
    const fn keyword(self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
        }
    }
}

/// How far, and in which direction, a [`Condition::RelativeTo`] looks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Distance {
    /// Up to `n` parent steps.
    Ancestors(usize),
    /// Up to `n` levels below the candidate.
    Descendants(usize),
    /// Up to `n` steps along parent or child edges in any combination, so a
    /// sibling is at distance 2.
    Any(usize),
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ancestors(n) => write!(f, "-{n}"),
            Self::Descendants(n) => write!(f, "{n}"),
            Self::Any(n) => write!(f, "~{n}"),
        }
    }
}

/// A boolean predicate tree over a single control.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Property(PropertyCondition),
    Function(FunctionCondition),
    Composite {
        op: LogicalOp,
        left: Box<Self>,
        right: Box<Self>,
    },
    /// True iff the query yields a match when rooted at the candidate.
    HasElement(Box<Query>),
    /// True iff some control within `distance` of the candidate satisfies
    /// `condition` (or, if `None`, if any such control exists).
    RelativeTo {
        distance: Distance,
        condition: Option<Box<Self>>,
    },
}

impl Condition {
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        Self::Composite {
            op: LogicalOp::And,
            left: Box::new(self),
            right: Box::new(other),
        }
    }

    #[must_use]
    pub fn or(self, other: Self) -> Self {
        Self::Composite {
            op: LogicalOp::Or,
            left: Box::new(self),
            right: Box::new(other),
        }
    }

    /// Combines an optional existing condition with `other` using `and`.
    #[must_use]
    pub fn append(existing: Option<Self>, other: Self) -> Self {
        match existing {
            Some(existing) => existing.and(other),
            None => other,
        }
    }

    /// Removes every occurrence of `target` from the `and`-spine of this
    /// condition. Returns `None` if nothing remains, meaning "match any".
    /// `or` composites are only removed when they equal `target` as a whole.
    #[must_use]
    pub fn remove(self, target: &Self) -> Option<Self> {
        if &self == target {
            return None;
        }
        match self {
            Self::Composite { op: LogicalOp::And, left, right } => {
                match (left.remove(target), right.remove(target)) {
                    (Some(left), Some(right)) => Some(left.and(right)),
                    (Some(remaining), None) | (None, Some(remaining)) => {
                        Some(remaining)
                    }
                    (None, None) => None,
                }
            }
            other => Some(other),
        }
    }

    /// Splits a leading `ControlType` node test off the `and`-spine, as the
    /// CPath renderer writes it in front of the predicate brackets.
    pub(crate) fn split_node_test(&self) -> (Option<&str>, Option<Self>) {
        match self {
            Self::Property(property) => match property.as_node_test() {
                Some(name) => (Some(name), None),
                None => (None, Some(self.clone())),
            },
            Self::Composite { op: LogicalOp::And, left, right } => {
                match left.split_node_test() {
                    (Some(name), rest) => (
                        Some(name),
                        Some(Self::append(rest, (**right).clone())),
                    ),
                    (None, _) => (None, Some(self.clone())),
                }
            }
            _ => (None, Some(self.clone())),
        }
    }

    fn write_operand(
        &self,
        f: &mut fmt::Formatter<'_>,
        parent: LogicalOp,
    ) -> fmt::Result {
        match self {
            Self::Composite { op, .. } if *op != parent => write!(f, "({self})"),
            _ => write!(f, "{self}"),
        }
    }
}

impl From<PropertyCondition> for Condition {
    fn from(condition: PropertyCondition) -> Self {
        Self::Property(condition)
    }
}

impl From<FunctionCondition> for Condition {
    fn from(condition: FunctionCondition) -> Self {
        Self::Function(condition)
    }
}

/// Renders the condition in CPath predicate syntax.
impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Property(property) => write!(f, "{property}"),
            Self::Function(function) => write!(f, "fn('{}')", function.name()),
            Self::Composite { op, left, right } => {
                left.write_operand(f, *op)?;
                write!(f, " {} ", op.keyword())?;
                right.write_operand(f, *op)
            }
            Self::HasElement(query) => write!(f, ".{query}"),
            Self::RelativeTo { distance, condition } => match condition {
                Some(condition) => write!(f, "relative({distance}, {condition})"),
                None => write!(f, "relative({distance}, *)"),
            },
        }
    }
}

/// `[A-Za-z_][A-Za-z0-9_]*`, the identifiers a CPath node test accepts.
fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    chars
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
