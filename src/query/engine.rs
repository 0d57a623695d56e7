/*!
# Search Engine

Evaluates a [`Query`] against a [`TreeProvider`].

A query is run as a pipeline of lazy iterators. The root seeds the pipeline,
and each [`SearchPart`] of the path turns the stream of context controls it
receives into the stream of controls it reaches. The terminal
[`ElementPart`] then filters the stream by its condition and paginates it.
Nothing is read from the provider until a result is pulled, so
[`SearchEngine::find_first`] stops walking the tree at the first match.

```
use ctrlsearch::query::{Query, SearchEngine};
use ctrlsearch::snapshot::{SnapshotNode, SnapshotTree};

let tree = SnapshotTree::new(
    SnapshotNode::new("Window")
        .child(SnapshotNode::new("Button").named("OK"))
        .child(SnapshotNode::new("Button").named("Cancel")),
);
let engine = SearchEngine::new(&tree);
let query = Query::new().and_control_type("Button");

let names: Vec<String> = engine
    .find_all(&query, &tree.root())
    .map(|node| tree.label(node.unwrap()))
    .collect();
assert_eq!(names, ["Button 'OK'", "Button 'Cancel'"]);
```

## Stale controls

Controls may disappear while a search runs. A control the provider reports
as stale has no children, no parent and no properties: the traversal skips
its subtree and every property condition on it is false. Provider failures
are different and end the search with [`SearchError::ProviderFailure`].
*/
use std::{
    cell::RefCell,
    collections::{HashSet, VecDeque},
    error::Error,
    fmt, iter,
};

use crate::provider::{ProviderError, TreeProvider};
use crate::query::{
    Condition, Distance, ElementPart, LogicalOp, PropertyId, PropertySource,
    PropertyValue, Query, SearchPart,
};

/// Default limit on nested [`Condition::HasElement`] sub-queries.
pub const DEFAULT_MAX_NESTING: usize = 32;

/// Errors produced while running a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    /// [`SearchEngine::find_required`] found nothing. Carries the rendered
    /// query so the search can be reproduced from the message alone.
    NotFound { query: String },
    /// The tree provider failed.
    ProviderFailure(String),
    /// The query cannot be evaluated as composed.
    InvalidComposition(String),
}

impl Error for SearchError {}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { query } => write!(f, "No control matches {query}"),
            Self::ProviderFailure(reason) => {
                write!(f, "Tree provider failed: {reason}")
            }
            Self::InvalidComposition(reason) => {
                write!(f, "Invalid composition: {reason}")
            }
        }
    }
}

type NodeResult<N> = Result<N, SearchError>;
type NodeStream<'a, N> = Box<dyn Iterator<Item = NodeResult<N>> + 'a>;

/// Runs queries against a tree provider.
#[derive(Debug)]
pub struct SearchEngine<'p, P: TreeProvider> {
    provider: &'p P,
    max_nesting: usize,
}

impl<P: TreeProvider> Clone for SearchEngine<'_, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P: TreeProvider> Copy for SearchEngine<'_, P> {}

impl<'p, P: TreeProvider> SearchEngine<'p, P> {
    #[must_use]
    pub const fn new(provider: &'p P) -> Self {
        Self {
            provider,
            max_nesting: DEFAULT_MAX_NESTING,
        }
    }

    /// Sets the maximum depth of nested sub-queries.
    #[must_use]
    pub const fn with_max_nesting(mut self, max_nesting: usize) -> Self {
        self.max_nesting = max_nesting;
        self
    }

    /// Returns the first control matching `query` below `root`, stopping the
    /// traversal as soon as it is found.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::ProviderFailure`] if the provider fails, or
    /// [`SearchError::InvalidComposition`] if the query nests deeper than
    /// the configured limit.
    pub fn find_first(
        &self,
        query: &Query,
        root: &P::Node,
    ) -> Result<Option<P::Node>, SearchError> {
        log::debug!("find_first {query} from {root:?}");
        self.check(query)?;
        self.stream(query, root.clone()).next().transpose()
    }

    /// Like [`find_first`](Self::find_first), but absence is an error.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::NotFound`] with the rendered query if nothing
    /// matches, and the errors of [`find_first`](Self::find_first).
    pub fn find_required(
        &self,
        query: &Query,
        root: &P::Node,
    ) -> Result<P::Node, SearchError> {
        self.find_first(query, root)?
            .ok_or_else(|| SearchError::NotFound { query: query.to_string() })
    }

    /// Lazily yields every control matching `query` below `root` in document
    /// order. Each call walks the tree afresh.
    pub fn find_all<'a>(
        &'a self,
        query: &'a Query,
        root: &P::Node,
    ) -> Matches<'a, P::Node> {
        log::debug!("find_all {query} from {root:?}");
        let inner = match self.check(query) {
            Ok(()) => self.stream(query, root.clone()),
            Err(err) => Box::new(iter::once(Err(err))),
        };
        Matches {
            inner,
            fused: false,
        }
    }

    fn check(&self, query: &Query) -> Result<(), SearchError> {
        let depth = query.depth();
        if depth > self.max_nesting {
            return Err(SearchError::InvalidComposition(format!(
                "sub-queries nest {depth} deep, the limit is {}",
                self.max_nesting
            )));
        }
        Ok(())
    }

    /// Builds the lazy pipeline for `query` rooted at `root`.
    fn stream<'a>(
        &'a self,
        query: &'a Query,
        root: P::Node,
    ) -> NodeStream<'a, P::Node> {
        if !self.provider.is_valid(&root) {
            log::trace!("search root {root:?} is stale");
            return Box::new(iter::empty());
        }
        let seed: NodeStream<'a, P::Node> = Box::new(iter::once(Ok(root)));
        let narrowed = query
            .path()
            .iter()
            .fold(seed, |contexts, part| self.resolve(part, contexts));
        self.resolve_element(query.element(), narrowed)
    }

    fn resolve<'a>(
        &'a self,
        part: &'a SearchPart,
        contexts: NodeStream<'a, P::Node>,
    ) -> NodeStream<'a, P::Node> {
        match *part {
            SearchPart::Identity => contexts,
            SearchPart::Ancestors { max_depth, include_self } => {
                Self::expand(contexts, move |node| {
                    Ancestors::new(self.provider, node, max_depth, include_self)
                })
            }
            SearchPart::Descendants { max_depth, include_self } => {
                Self::expand(contexts, move |node| {
                    Descendants::new(self.provider, node, max_depth, include_self)
                })
            }
            SearchPart::Composite(ref element) => {
                self.resolve_element(element, contexts)
            }
        }
    }

    /// Scope parts, then condition, then skip, then take.
    fn resolve_element<'a>(
        &'a self,
        element: &'a ElementPart,
        contexts: NodeStream<'a, P::Node>,
    ) -> NodeStream<'a, P::Node> {
        let scoped = element
            .parts
            .iter()
            .fold(contexts, |stream, part| self.resolve(part, stream));

        let filtered: NodeStream<'a, P::Node> = match &element.condition {
            None => scoped,
            Some(condition) => Box::new(scoped.filter_map(move |candidate| {
                let node = match candidate {
                    Ok(node) => node,
                    Err(err) => return Some(Err(err)),
                };
                match self.evaluate(condition, &node) {
                    Ok(true) => Some(Ok(node)),
                    Ok(false) => None,
                    Err(err) => Some(Err(err)),
                }
            })),
        };

        if element.skip.is_none() && element.take.is_none() {
            return filtered;
        }
        Box::new(Paginate {
            inner: filtered,
            skip: element.skip.unwrap_or(0),
            remaining: element.take,
        })
    }

    /// Replaces every context with the nodes `walk` reaches from it, dropping
    /// nodes reached from more than one context.
    fn expand<'a, I, F>(
        contexts: NodeStream<'a, P::Node>,
        walk: F,
    ) -> NodeStream<'a, P::Node>
    where
        P::Node: 'a,
        I: Iterator<Item = NodeResult<P::Node>> + 'a,
        F: Fn(P::Node) -> I + 'a,
    {
        let reached = contexts.flat_map(move |context| -> NodeStream<'a, P::Node> {
            match context {
                Ok(node) => Box::new(walk(node)),
                Err(err) => Box::new(iter::once(Err(err))),
            }
        });
        Box::new(Distinct {
            inner: reached,
            seen: HashSet::new(),
        })
    }

    /// Evaluates `condition` on `node`. `and` and `or` short-circuit.
    fn evaluate(
        &self,
        condition: &Condition,
        node: &P::Node,
    ) -> Result<bool, SearchError> {
        match condition {
            Condition::Property(property) => {
                match self.provider.property(node, property.property()) {
                    Ok(value) => Ok(property.test(value.as_ref())),
                    Err(ProviderError::Stale) => {
                        log::trace!(
                            "{node:?} went stale while reading {}",
                            property.property()
                        );
                        Ok(false)
                    }
                    Err(ProviderError::Failure(reason)) => {
                        Err(SearchError::ProviderFailure(reason))
                    }
                }
            }
            Condition::Function(function) => {
                let source = NodeProperties {
                    provider: self.provider,
                    node,
                    failure: RefCell::new(None),
                };
                let hit = function.call(&source);
                match source.failure.into_inner() {
                    Some(reason) => Err(SearchError::ProviderFailure(reason)),
                    None => Ok(hit),
                }
            }
            Condition::Composite { op: LogicalOp::And, left, right } => {
                Ok(self.evaluate(left, node)? && self.evaluate(right, node)?)
            }
            Condition::Composite { op: LogicalOp::Or, left, right } => {
                Ok(self.evaluate(left, node)? || self.evaluate(right, node)?)
            }
            Condition::HasElement(query) => {
                Ok(self.stream(query, node.clone()).next().transpose()?.is_some())
            }
            Condition::RelativeTo { distance, condition } => {
                self.evaluate_relative(node, *distance, condition.as_deref())
            }
        }
    }

    fn evaluate_relative(
        &self,
        node: &P::Node,
        distance: Distance,
        condition: Option<&Condition>,
    ) -> Result<bool, SearchError> {
        let related: NodeStream<'_, P::Node> = match distance {
            Distance::Ancestors(steps) => Box::new(Ancestors::new(
                self.provider,
                node.clone(),
                Some(steps),
                false,
            )),
            Distance::Descendants(steps) => Box::new(Descendants::new(
                self.provider,
                node.clone(),
                Some(steps),
                false,
            )),
            Distance::Any(steps) => {
                Box::new(Neighbourhood::new(self.provider, node.clone(), steps))
            }
        };
        for candidate in related {
            let candidate = candidate?;
            let hit = match condition {
                Some(condition) => self.evaluate(condition, &candidate)?,
                None => true,
            };
            if hit {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// Lazy results of [`SearchEngine::find_all`]. The iterator ends after the
/// first error it yields.
pub struct Matches<'a, N> {
    inner: NodeStream<'a, N>,
    fused: bool,
}

impl<N> Iterator for Matches<'_, N> {
    type Item = Result<N, SearchError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.fused {
            return None;
        }
        let item = self.inner.next();
        self.fused = !matches!(item, Some(Ok(_)));
        item
    }
}

impl<N> iter::FusedIterator for Matches<'_, N> {}

impl<N> fmt::Debug for Matches<'_, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Matches").field("fused", &self.fused).finish_non_exhaustive()
    }
}

/// Exposes one node's properties to a
/// [`FunctionCondition`](crate::query::FunctionCondition).
/// A provider failure reads as an absent value and is reported once the
/// predicate returns.
struct NodeProperties<'e, P: TreeProvider> {
    provider: &'e P,
    node: &'e P::Node,
    failure: RefCell<Option<String>>,
}

impl<P: TreeProvider> PropertySource for NodeProperties<'_, P> {
    fn property(&self, property: &PropertyId) -> Option<PropertyValue> {
        match self.provider.property(self.node, property) {
            Ok(value) => value,
            Err(ProviderError::Stale) => None,
            Err(ProviderError::Failure(reason)) => {
                self.failure.borrow_mut().get_or_insert(reason);
                None
            }
        }
    }
}

/// Pre-order walk below a node. Children of a yielded node are fetched only
/// when the walk is resumed.
struct Descendants<'p, P: TreeProvider> {
    provider: &'p P,
    max_depth: Option<usize>,
    stack: Vec<(P::Node, usize)>,
    /// Yielded node whose children are not on the stack yet.
    pending: Option<(P::Node, usize)>,
}

impl<'p, P: TreeProvider> Descendants<'p, P> {
    fn new(
        provider: &'p P,
        root: P::Node,
        max_depth: Option<usize>,
        include_self: bool,
    ) -> Self {
        if include_self {
            Self {
                provider,
                max_depth,
                stack: vec![(root, 0)],
                pending: None,
            }
        } else {
            Self {
                provider,
                max_depth,
                stack: Vec::new(),
                pending: Some((root, 0)),
            }
        }
    }

    fn expand(&mut self, node: &P::Node, depth: usize) -> Result<(), SearchError> {
        if self.max_depth.is_some_and(|max| depth >= max) {
            return Ok(());
        }
        match self.provider.children(node) {
            Ok(children) => {
                let provider = self.provider;
                let valid = children
                    .into_iter()
                    .filter(|child| provider.is_valid(child))
                    .map(|child| (child, depth + 1));
                let start = self.stack.len();
                self.stack.extend(valid);
                self.stack[start..].reverse();
                Ok(())
            }
            Err(ProviderError::Stale) => {
                log::trace!("skipping children of stale {node:?}");
                Ok(())
            }
            Err(ProviderError::Failure(reason)) => {
                Err(SearchError::ProviderFailure(reason))
            }
        }
    }
}

impl<P: TreeProvider> Iterator for Descendants<'_, P> {
    type Item = NodeResult<P::Node>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some((node, depth)) = self.pending.take() {
            if let Err(err) = self.expand(&node, depth) {
                self.stack.clear();
                return Some(Err(err));
            }
        }
        loop {
            let (node, depth) = self.stack.pop()?;
            // Pushed while valid, but the walk may have paused since.
            if !self.provider.is_valid(&node) {
                log::trace!("skipping stale {node:?}");
                continue;
            }
            self.pending = Some((node.clone(), depth));
            return Some(Ok(node));
        }
    }
}

/// Parent links upward, nearest first.
struct Ancestors<'p, P: TreeProvider> {
    provider: &'p P,
    current: Option<P::Node>,
    remaining: Option<usize>,
    include_self: bool,
}

impl<'p, P: TreeProvider> Ancestors<'p, P> {
    const fn new(
        provider: &'p P,
        start: P::Node,
        max_depth: Option<usize>,
        include_self: bool,
    ) -> Self {
        Self {
            provider,
            current: Some(start),
            remaining: max_depth,
            include_self,
        }
    }
}

impl<P: TreeProvider> Iterator for Ancestors<'_, P> {
    type Item = NodeResult<P::Node>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.include_self {
            self.include_self = false;
            return self.current.clone().map(Ok);
        }
        if self.remaining == Some(0) {
            return None;
        }
        let node = self.current.take()?;
        match self.provider.parent(&node) {
            Ok(Some(parent)) if self.provider.is_valid(&parent) => {
                self.remaining = self.remaining.map(|n| n - 1);
                self.current = Some(parent.clone());
                Some(Ok(parent))
            }
            Ok(_) => None,
            Err(ProviderError::Stale) => {
                log::trace!("ancestor walk stopped at stale {node:?}");
                None
            }
            Err(ProviderError::Failure(reason)) => {
                Some(Err(SearchError::ProviderFailure(reason)))
            }
        }
    }
}

/// Breadth-first walk over parent and child links, excluding the start node.
struct Neighbourhood<'p, P: TreeProvider> {
    provider: &'p P,
    max_steps: usize,
    queue: VecDeque<(P::Node, usize)>,
    seen: HashSet<P::Node>,
}

impl<'p, P: TreeProvider> Neighbourhood<'p, P> {
    fn new(provider: &'p P, start: P::Node, max_steps: usize) -> Self {
        let seen = HashSet::from([start.clone()]);
        Self {
            provider,
            max_steps,
            queue: VecDeque::from([(start, 0)]),
            seen,
        }
    }

    fn neighbours(&self, node: &P::Node) -> Result<Vec<P::Node>, ProviderError> {
        let mut neighbours = Vec::new();
        if let Some(parent) = self.provider.parent(node)? {
            neighbours.push(parent);
        }
        neighbours.extend(self.provider.children(node)?);
        Ok(neighbours)
    }
}

impl<P: TreeProvider> Iterator for Neighbourhood<'_, P> {
    type Item = NodeResult<P::Node>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((node, steps)) = self.queue.pop_front() {
            if !self.provider.is_valid(&node) {
                log::trace!("skipping stale {node:?}");
                continue;
            }
            if steps < self.max_steps {
                match self.neighbours(&node) {
                    Ok(neighbours) => {
                        for next in neighbours {
                            if self.provider.is_valid(&next)
                                && self.seen.insert(next.clone())
                            {
                                self.queue.push_back((next, steps + 1));
                            }
                        }
                    }
                    Err(ProviderError::Stale) => {}
                    Err(ProviderError::Failure(reason)) => {
                        self.queue.clear();
                        return Some(Err(SearchError::ProviderFailure(reason)));
                    }
                }
            }
            if steps > 0 {
                return Some(Ok(node));
            }
        }
        None
    }
}

/// Drops nodes already yielded.
struct Distinct<I, N> {
    inner: I,
    seen: HashSet<N>,
}

impl<I, N> Iterator for Distinct<I, N>
where
    I: Iterator<Item = NodeResult<N>>,
    N: Clone + Eq + std::hash::Hash,
{
    type Item = NodeResult<N>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.inner.next()? {
                Ok(node) if !self.seen.insert(node.clone()) => {}
                item => return Some(item),
            }
        }
    }
}

/// Skips then takes over a whole stream. Errors pass through uncounted.
struct Paginate<I> {
    inner: I,
    skip: usize,
    remaining: Option<usize>,
}

impl<I, N> Iterator for Paginate<I>
where
    I: Iterator<Item = NodeResult<N>>,
{
    type Item = NodeResult<N>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.remaining == Some(0) {
                return None;
            }
            match self.inner.next()? {
                Ok(_) if self.skip > 0 => self.skip -= 1,
                Ok(node) => {
                    if let Some(remaining) = &mut self.remaining {
                        *remaining -= 1;
                    }
                    return Some(Ok(node));
                }
                Err(err) => return Some(Err(err)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{PropertyOptions, Scope};
    use crate::snapshot::{NodeId, SnapshotNode, SnapshotTree};

    /// Window
    /// ├── Pane "Left"
    /// │   ├── Button "OK"
    /// │   └── Button "Cancel"
    /// ├── Pane "Right"
    /// │   ├── Text "User"
    /// │   ├── Edit
    /// │   └── Pane "Nested"
    /// │       └── Button "Apply"
    /// └── Button "Help"
    fn window() -> SnapshotTree {
        SnapshotTree::new(
            SnapshotNode::new("Window")
                .named("Main")
                .child(
                    SnapshotNode::new("Pane")
                        .named("Left")
                        .child(SnapshotNode::new("Button").named("OK"))
                        .child(SnapshotNode::new("Button").named("Cancel")),
                )
                .child(
                    SnapshotNode::new("Pane")
                        .named("Right")
                        .child(SnapshotNode::new("Text").named("User"))
                        .child(SnapshotNode::new("Edit"))
                        .child(
                            SnapshotNode::new("Pane")
                                .named("Nested")
                                .child(SnapshotNode::new("Button").named("Apply")),
                        ),
                )
                .child(SnapshotNode::new("Button").named("Help")),
        )
    }

    fn names(tree: &SnapshotTree, query: &Query) -> Vec<String> {
        SearchEngine::new(tree)
            .find_all(query, &tree.root())
            .map(|node| tree.label(node.unwrap()))
            .collect()
    }

    fn cpath(text: &str) -> Query {
        text.parse().unwrap()
    }

    #[test]
    fn descendants_in_document_order() {
        let tree = window();
        let ids: Vec<NodeId> = SearchEngine::new(&tree)
            .find_all(&Query::new(), &tree.root())
            .map(Result::unwrap)
            .collect();
        assert_eq!(ids.len(), tree.node_count() - 1);
        assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn find_first_matches_find_all() {
        let tree = window();
        let engine = SearchEngine::new(&tree);
        let query = Query::new().and_control_type("Button");
        let first = engine.find_first(&query, &tree.root()).unwrap();
        let all = engine.find_all(&query, &tree.root()).next().transpose().unwrap();
        assert_eq!(first, all);
        assert_eq!(first.map(|node| tree.label(node)), Some("Button 'OK'".to_string()));
    }

    #[test]
    fn children_only() {
        let tree = window();
        let query = Query::new().and_children().and_control_type("Button");
        assert_eq!(names(&tree, &query), ["Button 'Help'"]);
    }

    #[test]
    fn bounded_descendants() {
        let tree = window();
        let query = Query::new().and_descendants(2).and_control_type("Button");
        assert_eq!(
            names(&tree, &query),
            ["Button 'OK'", "Button 'Cancel'", "Button 'Help'"]
        );
    }

    #[test]
    fn path_stages_narrow_the_context() {
        let tree = window();
        assert_eq!(
            names(&tree, &cpath("//Pane[@Name='Right']//Button")),
            ["Button 'Apply'"]
        );
        assert_eq!(
            names(&tree, &cpath("/Pane/Button")),
            ["Button 'OK'", "Button 'Cancel'"]
        );
    }

    #[test]
    fn overlapping_contexts_yield_each_node_once() {
        let tree = window();
        // Both the outer and the nested pane reach "Apply".
        assert_eq!(
            names(&tree, &cpath("//Pane//Button[@Name='Apply']")),
            ["Button 'Apply'"]
        );
    }

    #[test]
    fn ancestors_nearest_first() {
        let tree = window();
        let engine = SearchEngine::new(&tree);
        let apply = engine
            .find_required(&Query::new().and_name("Apply"), &tree.root())
            .unwrap();
        let query = Query::new().and_scope(Scope::ANCESTORS).unwrap();
        let labels: Vec<String> = engine
            .find_all(&query, &apply)
            .map(|node| tree.label(node.unwrap()))
            .collect();
        assert_eq!(labels, ["Pane 'Nested'", "Pane 'Right'", "Window 'Main'"]);

        let query = Query::new().and_scope(Scope::ELEMENT | Scope::PARENT).unwrap();
        assert_eq!(engine.find_all(&query, &apply).count(), 2);
    }

    #[test]
    fn pagination_applies_after_the_condition() {
        let tree = window();
        let query = Query::new().and_control_type("Button").and_skip(1).and_take(2);
        assert_eq!(names(&tree, &query), ["Button 'Cancel'", "Button 'Apply'"]);
        assert_eq!(names(&tree, &cpath("//Button[4]")), ["Button 'Help'"]);
        assert!(names(&tree, &cpath("//Button[5]")).is_empty());
    }

    #[test]
    fn has_element_runs_the_sub_query_at_the_candidate() {
        let tree = window();
        let query = Query::new()
            .and_control_type("Pane")
            .and_has_child(&Query::new().and_children().and_control_type("Edit"));
        assert_eq!(names(&tree, &query), ["Pane 'Right'"]);
        assert_eq!(
            names(&tree, &cpath("//Pane[./Button]")),
            ["Pane 'Left'", "Pane 'Nested'"]
        );
    }

    #[test]
    fn relative_distances() {
        let tree = window();
        // The edit box sits next to the "User" label: two undirected steps.
        let label = Query::new().and_control_type("Text").and_name("User");
        let query = Query::new()
            .and_control_type("Edit")
            .and_relative_to(&label, Distance::Any(2));
        assert_eq!(names(&tree, &query), ["Edit"]);
        let query = Query::new()
            .and_control_type("Edit")
            .and_relative_to(&label, Distance::Any(1));
        assert!(names(&tree, &query).is_empty());

        assert_eq!(
            names(&tree, &cpath("//Button[relative(-2, @Name='Right')]")),
            ["Button 'Apply'"]
        );
        assert_eq!(
            names(&tree, &cpath("//Pane[relative(1, @Name='Apply')]")),
            ["Pane 'Nested'"]
        );
        assert_eq!(names(&tree, &cpath("//Pane[relative(2, @Name='Apply')]")).len(), 2);
    }

    #[test]
    fn function_conditions_read_properties() {
        let tree = window();
        let query = Query::new().and_condition("short name", |control| {
            control
                .property(&PropertyId::NAME)
                .is_some_and(|name| name.to_string().len() == 2)
        });
        assert_eq!(names(&tree, &query), ["Button 'OK'"]);
    }

    #[test]
    fn case_insensitive_contains() {
        let tree = window();
        let query = Query::new()
            .and_control_type("Button")
            .and_property_contains(PropertyId::NAME, "o", PropertyOptions::IGNORE_CASE);
        assert_eq!(names(&tree, &query), ["Button 'OK'"]);
    }

    fn left_pane(tree: &SnapshotTree) -> NodeId {
        SearchEngine::new(tree)
            .find_required(&cpath("//Pane[@Name='Left']"), &tree.root())
            .unwrap()
    }

    #[test]
    fn stale_root_yields_nothing() {
        let tree = window();
        let pane = left_pane(&tree);
        tree.remove(pane);
        let engine = SearchEngine::new(&tree);
        assert_eq!(engine.find_first(&Query::new(), &pane), Ok(None));
    }

    #[test]
    fn removed_subtrees_are_skipped() {
        let tree = window();
        tree.remove(left_pane(&tree));
        assert_eq!(
            names(&tree, &Query::new().and_control_type("Button")),
            ["Button 'Apply'", "Button 'Help'"]
        );
    }

    #[test]
    fn nesting_limit() {
        let tree = window();
        let mut query = Query::new();
        for _ in 0..3 {
            query = Query::new().and_has_child(&query);
        }
        assert_eq!(query.depth(), 4);

        let engine = SearchEngine::new(&tree).with_max_nesting(3);
        assert!(matches!(
            engine.find_first(&query, &tree.root()),
            Err(SearchError::InvalidComposition(_))
        ));
        let mut matches = engine.find_all(&query, &tree.root());
        assert!(matches!(
            matches.next(),
            Some(Err(SearchError::InvalidComposition(_)))
        ));
        assert!(matches.next().is_none());

        let engine = engine.with_max_nesting(4);
        assert!(engine.find_first(&query, &tree.root()).is_ok());
    }

    #[test]
    fn find_required_reports_the_query() {
        let tree = window();
        let query = Query::new().and_name("Missing");
        let err = SearchEngine::new(&tree)
            .find_required(&query, &tree.root())
            .unwrap_err();
        assert_eq!(
            err,
            SearchError::NotFound { query: "//*[@Name='Missing']".to_string() }
        );
    }

    #[test]
    fn find_required_renders_unreachable_pages() {
        let tree = window();
        let query = Query::new().and_name("OK").and_skip(usize::MAX).and_take(2);
        let err = SearchEngine::new(&tree)
            .find_required(&query, &tree.root())
            .unwrap_err();
        let expected = format!("//*[@Name='OK'][{}:{}]", usize::MAX, usize::MAX);
        assert_eq!(err, SearchError::NotFound { query: expected });
    }

    #[test]
    fn neighbourhood_skips_controls_removed_while_queued() {
        let tree = window();
        let mut near = Neighbourhood::new(&tree, tree.root(), 2);
        let first = near.next().unwrap().unwrap();
        assert_eq!(tree.label(first), "Pane 'Left'");

        // "Right" is already queued when it goes away.
        let right = SearchEngine::new(&tree)
            .find_required(&cpath("/Pane[@Name='Right']"), &tree.root())
            .unwrap();
        tree.remove(right);
        let rest: Vec<String> = near.map(|node| tree.label(node.unwrap())).collect();
        assert_eq!(rest, ["Button 'Help'", "Button 'OK'", "Button 'Cancel'"]);
    }
}
