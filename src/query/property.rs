/*!
# Control Properties

Identifiers and values of the properties a tree provider exposes for a
control. Property names are a closed set: both the fluent builder and the
CPath parser refer to them by the names rendered here, and unknown names are
rejected rather than silently compared against nothing.
*/
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use std::{fmt, str::FromStr};

/// Declares a fieldless enum together with its canonical string names.
macro_rules! named_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $text:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        $vis enum $name {
            $($(#[$vmeta])* $variant,)+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant,)+];

            /// Canonical name used in CPath text and diagnostics.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }

            fn lookup(name: &str) -> Option<Self> {
                match name {
                    $($text => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

named_enum! {
    /// Control patterns whose availability can be queried, e.g.
    /// `IsInvokePatternAvailable`.
    pub enum Pattern {
        Invoke => "Invoke",
        Value => "Value",
        Toggle => "Toggle",
        Selection => "Selection",
        SelectionItem => "SelectionItem",
        ExpandCollapse => "ExpandCollapse",
        Scroll => "Scroll",
        ScrollItem => "ScrollItem",
        RangeValue => "RangeValue",
        Text => "Text",
        Window => "Window",
        Grid => "Grid",
        GridItem => "GridItem",
        Table => "Table",
        TableItem => "TableItem",
        Transform => "Transform",
        Dock => "Dock",
        LegacyIAccessible => "LegacyIAccessible",
    }
}

named_enum! {
    /// Plain (non-pattern) properties of a control.
    pub enum BasicProperty {
        AutomationId => "AutomationId",
        Name => "Name",
        ClassName => "ClassName",
        ControlType => "ControlType",
        FrameworkId => "FrameworkId",
        HelpText => "HelpText",
        LocalizedControlType => "LocalizedControlType",
        ProcessId => "ProcessId",
        IsEnabled => "IsEnabled",
        IsOffscreen => "IsOffscreen",
        IsKeyboardFocusable => "IsKeyboardFocusable",
        HasKeyboardFocus => "HasKeyboardFocus",
        Value => "Value",
    }
}

/// Identifies a single property of a control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PropertyId {
    /// A plain property such as `Name` or `ControlType`.
    Basic(BasicProperty),
    /// Whether the control supports the given pattern
    /// (`Is<Pattern>PatternAvailable`).
    PatternAvailable(Pattern),
}

impl PropertyId {
    pub const AUTOMATION_ID: Self = Self::Basic(BasicProperty::AutomationId);
    pub const NAME: Self = Self::Basic(BasicProperty::Name);
    pub const CLASS_NAME: Self = Self::Basic(BasicProperty::ClassName);
    pub const CONTROL_TYPE: Self = Self::Basic(BasicProperty::ControlType);
    pub const IS_ENABLED: Self = Self::Basic(BasicProperty::IsEnabled);
    pub const VALUE: Self = Self::Basic(BasicProperty::Value);
}

impl From<BasicProperty> for PropertyId {
    fn from(property: BasicProperty) -> Self {
        Self::Basic(property)
    }
}

impl From<Pattern> for PropertyId {
    fn from(pattern: Pattern) -> Self {
        Self::PatternAvailable(pattern)
    }
}

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic(property) => f.write_str(property.as_str()),
            Self::PatternAvailable(pattern) => {
                write!(f, "Is{}PatternAvailable", pattern.as_str())
            }
        }
    }
}

/// Error returned when a property name is not part of the known set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPropertyError(pub String);

impl fmt::Display for UnknownPropertyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown property `{}`", self.0)
    }
}

impl std::error::Error for UnknownPropertyError {}

impl FromStr for PropertyId {
    type Err = UnknownPropertyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(property) = BasicProperty::lookup(s) {
            return Ok(Self::Basic(property));
        }
        s.strip_prefix("Is")
            .and_then(|rest| rest.strip_suffix("PatternAvailable"))
            .and_then(Pattern::lookup)
            .map(Self::PatternAvailable)
            .ok_or_else(|| UnknownPropertyError(s.to_string()))
    }
}

impl Serialize for PropertyId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PropertyId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(de::Error::custom)
    }
}

/// The value of a property as reported by a tree provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl PropertyValue {
    /// Returns the string payload, if this is a string value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Writes the value as a CPath literal: strings are single-quoted with
    /// `'` and `\` escaped, booleans and integers are written bare.
    ///
    /// # Errors
    ///
    /// Propagates formatter errors.
    pub fn write_literal(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Str(s) => {
                f.write_str("'")?;
                for c in s.chars() {
                    if matches!(c, '\'' | '\\') {
                        f.write_str("\\")?;
                    }
                    write!(f, "{c}")?;
                }
                f.write_str("'")
            }
        }
    }
}

/// Plain rendering without quoting, used for substring and regex matching.
impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}
