//! An example of using the fluent [`Query`] builder and CPath text to locate
//! controls in a recorded accessibility tree.
use ctrlsearch::query::{
    Distance, Pattern, PropertyId, PropertyOptions, Query, SearchEngine,
};
use ctrlsearch::snapshot::{SnapshotNode, SnapshotTree};

fn main() {
    // A login dialog with a labelled edit box and two buttons
    let tree = SnapshotTree::new(
        SnapshotNode::new("Window")
            .named("Login")
            .child(
                SnapshotNode::new("Pane")
                    .named("Credentials")
                    .child(SnapshotNode::new("Text").named("User"))
                    .child(
                        SnapshotNode::new("Edit")
                            .with(PropertyId::AUTOMATION_ID, "user"),
                    ),
            )
            .child(
                SnapshotNode::new("Pane")
                    .named("Actions")
                    .child(
                        SnapshotNode::new("Button")
                            .named("OK")
                            .with(Pattern::Invoke, true),
                    )
                    .child(SnapshotNode::new("Button").named("Cancel")),
            ),
    );
    let engine = SearchEngine::new(&tree);

    // Construct the query "//Pane[@Name='Actions']//Button[@Name='OK']"
    let actions = Query::new().and_control_type("Pane").and_name("Actions");
    let ok = Query::new()
        .and_control_type("Button")
        .and_name("OK")
        .and_child_of(&actions);
    assert_eq!("//Pane[@Name='Actions']//Button[@Name='OK']", ok.to_string());

    // The same query written as CPath evaluates identically
    let parsed: Query = ok.to_string().parse().expect("Invalid query");
    assert_eq!(
        engine.find_first(&ok, &tree.root()),
        engine.find_first(&parsed, &tree.root())
    );

    // Pattern availability and case-insensitive matching
    let invokable = Query::new()
        .and_pattern_available(Pattern::Invoke)
        .and_property_with(PropertyId::NAME, "ok", PropertyOptions::IGNORE_CASE);
    assert_eq!(
        "//*[@IsInvokePatternAvailable=true and @Name='ok' i]",
        invokable.to_string()
    );
    let found = engine
        .find_first(&invokable, &tree.root())
        .expect("search failed");
    assert!(found.is_some());

    // The edit box next to the "User" label
    let label = Query::new().and_control_type("Text").and_name("User");
    let user_box = Query::new()
        .and_control_type("Edit")
        .and_relative_to(&label, Distance::Any(2));
    let found = engine
        .find_required(&user_box, &tree.root())
        .expect("edit box not found");
    println!("{} -> {}", user_box, tree.label(found));
}
