/*!
# `ctrlsearch` Library

Locates controls in accessibility trees. Queries are composed with a fluent
builder or written in the CPath path language, then evaluated lazily against
any [`TreeProvider`](provider::TreeProvider).

```
use ctrlsearch::query::{Query, SearchEngine};
use ctrlsearch::snapshot::{SnapshotNode, SnapshotTree};

let tree = SnapshotTree::new(
    SnapshotNode::new("Window")
        .child(SnapshotNode::new("Pane").child(SnapshotNode::new("Button").named("OK"))),
);
let query: Query = "//Pane/Button[@Name='OK']".parse().expect("Invalid query");
let ok = SearchEngine::new(&tree).find_required(&query, &tree.root());
assert!(ok.is_ok());
```
*/

pub mod commands;
pub mod provider;
pub mod query;
pub mod snapshot;
pub mod utils;
