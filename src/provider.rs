/*!
# Tree Providers

The search engine never talks to a platform accessibility API directly. It
walks whatever implements [`TreeProvider`]: a live UI automation binding, a
recorded [`SnapshotTree`](crate::snapshot::SnapshotTree), or a test double.

Providers report two kinds of trouble through [`ProviderError`]. A
[`Stale`](ProviderError::Stale) node disappeared from the UI between being
discovered and being inspected; the engine treats it as having no children,
no parent and no properties. A [`Failure`](ProviderError::Failure) is
anything else and aborts the search.
*/
use std::{error::Error, fmt, hash::Hash};

use crate::query::{PropertyId, PropertyValue};

/// Errors a [`TreeProvider`] may report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The node no longer exists.
    Stale,
    /// The provider could not answer.
    Failure(String),
}

impl Error for ProviderError {}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stale => write!(f, "Stale node"),
            Self::Failure(reason) => write!(f, "Provider failure: {reason}"),
        }
    }
}

/// Read access to a tree of controls.
///
/// Node handles are cheap to clone and compare: the engine keeps them in
/// hash sets to drop duplicates, and equal handles must denote the same
/// control.
pub trait TreeProvider {
    type Node: Clone + Eq + Hash + fmt::Debug;

    /// The parent of `node`, or `None` at the root.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Stale`] if `node` has vanished.
    fn parent(&self, node: &Self::Node) -> Result<Option<Self::Node>, ProviderError>;

    /// The children of `node` in document order.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Stale`] if `node` has vanished.
    fn children(&self, node: &Self::Node) -> Result<Vec<Self::Node>, ProviderError>;

    /// The value of `property` on `node`, or `None` if the control does not
    /// report it.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Stale`] if `node` has vanished.
    fn property(
        &self,
        node: &Self::Node,
        property: &PropertyId,
    ) -> Result<Option<PropertyValue>, ProviderError>;

    /// Whether `node` still refers to a live control.
    fn is_valid(&self, node: &Self::Node) -> bool;
}

impl<P: TreeProvider + ?Sized> TreeProvider for &P {
    type Node = P::Node;

    fn parent(&self, node: &Self::Node) -> Result<Option<Self::Node>, ProviderError> {
        (**self).parent(node)
    }

    fn children(&self, node: &Self::Node) -> Result<Vec<Self::Node>, ProviderError> {
        (**self).children(node)
    }

    fn property(
        &self,
        node: &Self::Node,
        property: &PropertyId,
    ) -> Result<Option<PropertyValue>, ProviderError> {
        (**self).property(node, property)
    }

    fn is_valid(&self, node: &Self::Node) -> bool {
        (**self).is_valid(node)
    }
}
