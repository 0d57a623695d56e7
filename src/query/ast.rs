/*!
# Query Model and Builder

A [`Query`] (also called a location key) describes where a control lives in
an accessibility tree. It is an ordered path of [`SearchPart`]s that narrow
the set of context controls, ending in one [`ElementPart`] that holds the
final condition and pagination.

Queries are values: every builder method consumes the query and returns the
updated one, and every composition method clones its operand, so two queries
built from a shared base never alias each other.

# Examples

Find the "OK" button anywhere below the root:

```
use ctrlsearch::query::Query;
let query = Query::new().and_control_type("Button").and_name("OK");
assert_eq!(query.to_string(), "//Button[@Name='OK']");
```

The same query can be written in CPath:

```
use ctrlsearch::query::Query;
let parsed: Query = "//Button[@Name='OK']".parse().expect("Invalid query");
assert_eq!(parsed, Query::new().and_control_type("Button").and_name("OK"));
```
*/
use std::{fmt, str::FromStr};

use super::condition::{
    Condition, Distance, FunctionCondition, PropertyCondition,
    PropertyOptions, PropertySource,
};
use super::part::{ElementPart, Scope, SearchPart};
use super::property::{Pattern, PropertyId, PropertyValue};
use super::{ParseError, parse_cpath};

/// Programmatic misuse of the builder API.
#[derive(Debug, Clone)]
pub enum CompositionError {
    /// The requested composition cannot be expressed as a traversal.
    InvalidComposition(String),
    /// A regular expression did not compile.
    InvalidPattern(regex::Error),
}

impl std::error::Error for CompositionError {}

impl fmt::Display for CompositionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidComposition(reason) => {
                write!(f, "Invalid composition: {reason}")
            }
            Self::InvalidPattern(err) => write!(f, "Invalid pattern: {err}"),
        }
    }
}

/// A composable control-search query.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    /// Context-narrowing stages, applied left to right.
    path: Vec<SearchPart>,
    /// The terminal stage producing the matches.
    element: ElementPart,
}

impl Query {
    /// Creates a query matching every descendant of the root.
    #[must_use]
    pub fn new() -> Self {
        Self {
            path: Vec::new(),
            element: ElementPart::scoped(vec![SearchPart::descendants(None)]),
        }
    }

    /// Assembles a query from explicit parts.
    #[must_use]
    pub const fn from_parts(path: Vec<SearchPart>, element: ElementPart) -> Self {
        Self { path, element }
    }

    /// Parses a CPath expression.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] pointing at the offending input.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        parse_cpath(text)
    }

    #[must_use]
    pub fn path(&self) -> &[SearchPart] {
        &self.path
    }

    #[must_use]
    pub const fn element(&self) -> &ElementPart {
        &self.element
    }

    /// Number of stages, including the terminal element part; never zero.
    #[must_use]
    pub const fn step_count(&self) -> usize {
        self.path.len() + 1
    }

    /// Nesting depth of [`Condition::HasElement`] sub-queries; a query with
    /// none has depth 1.
    #[must_use]
    pub fn depth(&self) -> usize {
        fn condition_depth(condition: &Condition) -> usize {
            match condition {
                Condition::Composite { left, right, .. } => {
                    condition_depth(left).max(condition_depth(right))
                }
                Condition::HasElement(query) => query.depth(),
                Condition::RelativeTo { condition: Some(inner), .. } => {
                    condition_depth(inner)
                }
                _ => 0,
            }
        }
        fn element_depth(element: &ElementPart) -> usize {
            let own = element.condition.as_ref().map_or(0, condition_depth);
            element.parts.iter().map(part_depth).fold(own, usize::max)
        }
        fn part_depth(part: &SearchPart) -> usize {
            match part {
                SearchPart::Composite(element) => element_depth(element),
                _ => 0,
            }
        }
        let nested = self
            .path
            .iter()
            .map(part_depth)
            .fold(element_depth(&self.element), usize::max);
        1 + nested
    }

    /// `and`s an arbitrary condition onto the element condition.
    #[must_use]
    pub fn and_where(mut self, condition: impl Into<Condition>) -> Self {
        self.element.append_condition(condition.into());
        self
    }

    /// Requires `property` to equal `value`.
    #[must_use]
    pub fn and_property(
        self,
        property: impl Into<PropertyId>,
        value: impl Into<PropertyValue>,
    ) -> Self {
        self.and_property_with(property, value, PropertyOptions::default())
    }

    /// Equality comparison with explicit option flags.
    #[must_use]
    pub fn and_property_with(
        self,
        property: impl Into<PropertyId>,
        value: impl Into<PropertyValue>,
        options: PropertyOptions,
    ) -> Self {
        self.and_where(PropertyCondition::equals(property.into(), value, options))
    }

    /// Requires the rendered value of `property` to contain `needle`.
    #[must_use]
    pub fn and_property_contains(
        self,
        property: impl Into<PropertyId>,
        needle: impl Into<String>,
        options: PropertyOptions,
    ) -> Self {
        self.and_where(PropertyCondition::contains(property.into(), needle, options))
    }

    /// Requires the rendered value of `property` to match `pattern`.
    ///
    /// # Errors
    ///
    /// Returns [`CompositionError::InvalidPattern`] if `pattern` is not a
    /// valid regular expression.
    pub fn and_property_regex(
        self,
        property: impl Into<PropertyId>,
        pattern: &str,
        options: PropertyOptions,
    ) -> Result<Self, CompositionError> {
        let condition = PropertyCondition::regex(property.into(), pattern, options)
            .map_err(CompositionError::InvalidPattern)?;
        Ok(self.and_where(condition))
    }

    #[must_use]
    pub fn and_name(self, name: impl Into<String>) -> Self {
        self.and_property(PropertyId::NAME, name.into())
    }

    #[must_use]
    pub fn and_automation_id(self, id: impl Into<String>) -> Self {
        self.and_property(PropertyId::AUTOMATION_ID, id.into())
    }

    #[must_use]
    pub fn and_class_name(self, class_name: impl Into<String>) -> Self {
        self.and_property(PropertyId::CLASS_NAME, class_name.into())
    }

    #[must_use]
    pub fn and_control_type(self, control_type: impl Into<String>) -> Self {
        self.and_property(PropertyId::CONTROL_TYPE, control_type.into())
    }

    /// Requires the control to support `pattern`.
    #[must_use]
    pub fn and_pattern_available(self, pattern: Pattern) -> Self {
        self.and_property(PropertyId::PatternAvailable(pattern), true)
    }

    /// `and`s a named predicate onto the element condition.
    ///
    /// # Examples
    ///
    /// ```
    /// use ctrlsearch::query::{PropertyId, PropertySource, Query};
    /// let query = Query::new().and_condition("long name", |control| {
    ///     control
    ///         .property(&PropertyId::NAME)
    ///         .is_some_and(|name| name.to_string().len() > 10)
    /// });
    /// assert_eq!(query.to_string(), "//*[fn('long name')]");
    /// ```
    #[must_use]
    pub fn and_condition<F>(self, name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&dyn PropertySource) -> bool + Send + Sync + 'static,
    {
        self.and_where(FunctionCondition::new(name, predicate))
    }

    /// Replaces the element scope.
    ///
    /// # Errors
    ///
    /// Returns [`CompositionError::InvalidComposition`] if `scope` is empty
    /// or mixes upward and downward flags.
    pub fn and_scope(mut self, scope: Scope) -> Result<Self, CompositionError> {
        self.element.parts =
            scope.to_parts().map_err(CompositionError::InvalidComposition)?;
        Ok(self)
    }

    /// Restricts the element scope to direct children.
    #[must_use]
    pub fn and_children(mut self) -> Self {
        self.element.parts = vec![SearchPart::children()];
        self
    }

    /// Restricts the element scope to descendants at most `max_depth`
    /// levels down.
    #[must_use]
    pub fn and_descendants(mut self, max_depth: usize) -> Self {
        self.element.parts = vec![SearchPart::descendants(Some(max_depth))];
        self
    }

    /// Sets the depth limit of every depth-bearing part of the element
    /// scope. `None` removes the limit.
    #[must_use]
    pub fn and_max_depth(mut self, max_depth: Option<usize>) -> Self {
        for part in &mut self.element.parts {
            part.set_max_depth(max_depth);
        }
        self
    }

    #[must_use]
    pub const fn and_skip(mut self, count: usize) -> Self {
        self.element.skip = Some(count);
        self
    }

    #[must_use]
    pub const fn and_take(mut self, count: usize) -> Self {
        self.element.take = Some(count);
        self
    }

    /// Requires the match to be found below a match of `parent`: the
    /// parent's path and its element part are cloned in as context stages
    /// directly ahead of this query's element part, after its own path.
    #[must_use]
    pub fn and_child_of(mut self, parent: &Self) -> Self {
        self.path.extend(parent.path.iter().cloned());
        self.path.push(SearchPart::Composite(parent.element.clone()));
        self
    }

    /// Requires `child` to match at least once when rooted at the candidate.
    #[must_use]
    pub fn and_has_child(self, child: &Self) -> Self {
        self.and_where(Condition::HasElement(Box::new(child.clone())))
    }

    /// Requires a control satisfying `other`'s element condition within
    /// `distance` of the candidate.
    #[must_use]
    pub fn and_relative_to(self, other: &Self, distance: Distance) -> Self {
        self.and_where(Condition::RelativeTo {
            distance,
            condition: other.element.condition.clone().map(Box::new),
        })
    }

    /// Merges `other` into this query: its path stages are appended to this
    /// path, and its element condition is `and`ed onto this one. Optionally
    /// takes over `other`'s pagination and element scope.
    #[must_use]
    pub fn append(
        mut self,
        other: &Self,
        overwrite_skip_take: bool,
        overwrite_scope: bool,
    ) -> Self {
        self.path.extend(other.path.iter().cloned());
        if let Some(condition) = &other.element.condition {
            self.element.append_condition(condition.clone());
        }
        if overwrite_skip_take {
            self.element.skip = other.element.skip;
            self.element.take = other.element.take;
        }
        if overwrite_scope {
            self.element.parts.clone_from(&other.element.parts);
        }
        self
    }

    /// Parses `text` as CPath and [`append`](Self::append)s it, taking over
    /// its scope and pagination.
    ///
    /// # Errors
    ///
    /// Returns the [`ParseError`] if `text` is not valid CPath.
    pub fn and_cpath(self, text: &str) -> Result<Self, ParseError> {
        let parsed = parse_cpath(text)?;
        Ok(self.append(&parsed, true, true))
    }

    /// Removes `target` from the element condition's `and`-spine.
    #[must_use]
    pub fn remove_condition(mut self, target: &Condition) -> Self {
        self.element.remove_condition(target);
        self
    }
}

impl Default for Query {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for Query {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_cpath(s)
    }
}

/// Renders the query as canonical CPath. The rendering is deterministic and
/// parses back into an equivalent query, except for function conditions,
/// which render as `fn('name')`.
impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for part in &self.path {
            write!(f, "{part}")?;
        }
        write!(f, "{}", self.element)
    }
}
