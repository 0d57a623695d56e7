/*!
# Search Parts

A search part is one traversal stage of a query. Given a stream of context
controls, a part produces the controls reachable from them:

- [`SearchPart::Identity`] passes each context through unchanged.
- [`SearchPart::Ancestors`] walks parent links, nearest first.
- [`SearchPart::Descendants`] walks the subtree in pre-order.
- [`SearchPart::Composite`] runs its own scope parts as a pipeline, then
  filters by its condition and paginates (see [`ElementPart`]).
*/
use std::{fmt, ops::BitOr};

use super::condition::Condition;

/// Describes which controls an [`ElementPart`] considers, relative to its
/// context. Flags combine with `|`, e.g. `Scope::ELEMENT | Scope::ANCESTORS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Scope(u8);

impl Scope {
    /// The context control itself.
    pub const ELEMENT: Self = Self(1);
    /// Direct children of the context.
    pub const CHILDREN: Self = Self(1 << 1);
    /// All descendants of the context.
    pub const DESCENDANTS: Self = Self(1 << 2);
    /// The direct parent of the context.
    pub const PARENT: Self = Self(1 << 3);
    /// All ancestors of the context.
    pub const ANCESTORS: Self = Self(1 << 4);
    /// The context and everything below it.
    pub const SUBTREE: Self = Self(1 | 1 << 1 | 1 << 2);

    const DOWN: u8 = Self::CHILDREN.0 | Self::DESCENDANTS.0;
    const UP: u8 = Self::PARENT.0 | Self::ANCESTORS.0;

    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Translates the flags into the scope pipeline of an element part.
    ///
    /// # Errors
    ///
    /// Returns a description of the problem if the scope is empty or mixes
    /// upward and downward flags, which no single traversal can express.
    pub fn to_parts(self) -> Result<Vec<SearchPart>, String> {
        let include_self = self.contains(Self::ELEMENT);
        match (self.0 & Self::DOWN, self.0 & Self::UP) {
            (0, 0) if include_self => Ok(Vec::new()),
            (0, 0) => Err("empty scope".to_string()),
            (down, 0) => Ok(vec![SearchPart::Descendants {
                max_depth: (down & Self::DESCENDANTS.0 == 0).then_some(1),
                include_self,
            }]),
            (0, up) => Ok(vec![SearchPart::Ancestors {
                max_depth: (up & Self::ANCESTORS.0 == 0).then_some(1),
                include_self,
            }]),
            _ => Err(format!(
                "scope {self:?} mixes upward and downward traversal"
            )),
        }
    }
}

impl BitOr for Scope {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// A single traversal stage.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchPart {
    Identity,
    /// Parent links upward; `max_depth` of `None` is unbounded.
    Ancestors {
        max_depth: Option<usize>,
        include_self: bool,
    },
    /// Pre-order subtree walk; `max_depth` of `None` is unbounded and
    /// `Some(1)` means children only.
    Descendants {
        max_depth: Option<usize>,
        include_self: bool,
    },
    Composite(ElementPart),
}

impl SearchPart {
    #[must_use]
    pub const fn children() -> Self {
        Self::Descendants {
            max_depth: Some(1),
            include_self: false,
        }
    }

    #[must_use]
    pub const fn descendants(max_depth: Option<usize>) -> Self {
        Self::Descendants {
            max_depth,
            include_self: false,
        }
    }

    #[must_use]
    pub const fn parent() -> Self {
        Self::Ancestors {
            max_depth: Some(1),
            include_self: false,
        }
    }

    #[must_use]
    pub const fn ancestors(max_depth: Option<usize>) -> Self {
        Self::Ancestors {
            max_depth,
            include_self: false,
        }
    }

    /// Returns the depth limit if this part has one; the outer `None` means
    /// the part carries no depth at all.
    #[must_use]
    pub const fn max_depth(&self) -> Option<Option<usize>> {
        match self {
            Self::Ancestors { max_depth, .. }
            | Self::Descendants { max_depth, .. } => Some(*max_depth),
            Self::Identity | Self::Composite(_) => None,
        }
    }

    /// Sets the depth limit on depth-bearing parts. Returns `false` if this
    /// part has no depth.
    pub fn set_max_depth(&mut self, depth: Option<usize>) -> bool {
        match self {
            Self::Ancestors { max_depth, .. }
            | Self::Descendants { max_depth, .. } => {
                *max_depth = depth;
                true
            }
            Self::Identity | Self::Composite(_) => false,
        }
    }

    /// The CPath axis this part renders as, or `None` for composites.
    fn axis(&self) -> Option<String> {
        let axis = |name: &str, or_self: &str, max: Option<usize>, include_self: bool| {
            let name = if include_self { or_self } else { name };
            match max {
                Some(n) => format!("{name}{{{n}}}"),
                None => name.to_string(),
            }
        };
        match *self {
            Self::Identity => Some("self".to_string()),
            Self::Descendants { max_depth: Some(1), include_self: false } => {
                Some("child".to_string())
            }
            Self::Ancestors { max_depth: Some(1), include_self: false } => {
                Some("parent".to_string())
            }
            Self::Descendants { max_depth, include_self } => Some(axis(
                "descendant",
                "descendant-or-self",
                max_depth,
                include_self,
            )),
            Self::Ancestors { max_depth, include_self } => Some(axis(
                "ancestor",
                "ancestor-or-self",
                max_depth,
                include_self,
            )),
            Self::Composite(_) => None,
        }
    }

    /// Writes this part as a CPath step with the given node test.
    fn write_step(&self, f: &mut fmt::Formatter<'_>, test: &str) -> fmt::Result {
        match self {
            Self::Descendants { max_depth: None, include_self: false } => {
                write!(f, "//{test}")
            }
            Self::Descendants { max_depth: Some(1), include_self: false } => {
                write!(f, "/{test}")
            }
            Self::Composite(element) => {
                // A nested composite becomes its own step(s), followed by a
                // trivial self step carrying the outer node test.
                write!(f, "{element}")?;
                write!(f, "/self::{test}")
            }
            other => match other.axis() {
                Some(axis) => write!(f, "/{axis}::{test}"),
                None => Ok(()),
            },
        }
    }
}

impl fmt::Display for SearchPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Composite(element) => write!(f, "{element}"),
            part => part.write_step(f, "*"),
        }
    }
}

/// A composite stage: scope pipeline, then condition, then skip, then take.
///
/// An empty `parts` list means "the context control only".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementPart {
    /// `None` matches any control.
    pub condition: Option<Condition>,
    /// Scope pipeline; each part's output is the next part's input.
    pub parts: Vec<SearchPart>,
    pub skip: Option<usize>,
    pub take: Option<usize>,
}

impl ElementPart {
    #[must_use]
    pub const fn scoped(parts: Vec<SearchPart>) -> Self {
        Self {
            condition: None,
            parts,
            skip: None,
            take: None,
        }
    }

    /// `and`s `condition` onto the existing condition.
    pub fn append_condition(&mut self, condition: Condition) {
        self.condition = Some(Condition::append(self.condition.take(), condition));
    }

    /// Removes `target` from the `and`-spine of the condition.
    pub fn remove_condition(&mut self, target: &Condition) {
        self.condition = self.condition.take().and_then(|c| c.remove(target));
    }

    const fn is_paginated(&self) -> bool {
        self.skip.is_some() || self.take.is_some()
    }

    fn write_pagination(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.skip.unwrap_or(0), self.take) {
            // Bounds past `usize::MAX` select nothing either way.
            (skip, Some(1)) => write!(f, "[{}]", skip.saturating_add(1)),
            (0, Some(take)) => write!(f, "[:{take}]"),
            (skip, Some(take)) => {
                write!(f, "[{skip}:{}]", skip.saturating_add(take))
            }
            (skip, None) => write!(f, "[{skip}:]"),
        }
    }
}

/// Renders the element part as one or more CPath steps.
impl fmt::Display for ElementPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (test, rest) = match &self.condition {
            Some(condition) => condition.split_node_test(),
            None => (None, None),
        };
        let test = test.unwrap_or("*");

        let identity = SearchPart::Identity;
        let (last, leading) = match self.parts.split_last() {
            Some((last, leading)) => (last, leading),
            None => (&identity, &[][..]),
        };
        for part in leading {
            write!(f, "{part}")?;
        }
        last.write_step(f, test)?;

        if let Some(rest) = rest {
            write!(f, "[{rest}]")?;
        }
        if self.is_paginated() {
            self.write_pagination(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_translation() {
        assert_eq!(Scope::ELEMENT.to_parts(), Ok(vec![]));
        assert_eq!(Scope::CHILDREN.to_parts(), Ok(vec![SearchPart::children()]));
        assert_eq!(
            Scope::SUBTREE.to_parts(),
            Ok(vec![SearchPart::Descendants { max_depth: None, include_self: true }])
        );
        assert_eq!(
            (Scope::ELEMENT | Scope::ANCESTORS).to_parts(),
            Ok(vec![SearchPart::Ancestors { max_depth: None, include_self: true }])
        );
        assert_eq!(Scope::PARENT.to_parts(), Ok(vec![SearchPart::parent()]));
        assert!((Scope::PARENT | Scope::CHILDREN).to_parts().is_err());
        assert!(Scope(0).to_parts().is_err());
    }

    #[test]
    fn depth_accessors() {
        let mut part = SearchPart::descendants(None);
        assert_eq!(part.max_depth(), Some(None));
        assert!(part.set_max_depth(Some(3)));
        assert_eq!(part.max_depth(), Some(Some(3)));

        let mut identity = SearchPart::Identity;
        assert!(!identity.set_max_depth(Some(3)));
        assert_eq!(identity.max_depth(), None);
    }

    #[test]
    fn bare_parts_render_as_wildcard_steps() {
        assert_eq!(SearchPart::descendants(None).to_string(), "//*");
        assert_eq!(SearchPart::children().to_string(), "/*");
        assert_eq!(SearchPart::parent().to_string(), "/parent::*");
        assert_eq!(SearchPart::descendants(Some(3)).to_string(), "/descendant{3}::*");
        assert_eq!(
            SearchPart::Ancestors { max_depth: None, include_self: true }.to_string(),
            "/ancestor-or-self::*"
        );
        assert_eq!(SearchPart::Identity.to_string(), "/self::*");
    }

    #[test]
    fn pagination_rendering() {
        let mut element = ElementPart::scoped(vec![SearchPart::children()]);
        element.skip = Some(1);
        element.take = Some(1);
        assert_eq!(element.to_string(), "/*[2]");
        element.take = Some(3);
        assert_eq!(element.to_string(), "/*[1:4]");
        element.take = None;
        assert_eq!(element.to_string(), "/*[1:]");
        element.skip = None;
        element.take = Some(2);
        assert_eq!(element.to_string(), "/*[:2]");
    }
}
