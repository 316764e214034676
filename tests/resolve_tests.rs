use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use pretty_assertions::assert_eq;

use cmdtree::tree::{BranchNode, Children, LeafNode, ProducerError};
use cmdtree::{CommandSource, Node, Outcome, Palette, ResolveError};

fn noop(_: &LeafNode) {}

fn titles(path: &[Node]) -> Vec<String> {
    path.iter().map(|node| node.title().to_string()).collect()
}

#[tokio::test]
async fn test_empty_address_resolves_to_root_alone() {
    let root = Node::branch("root", vec![Node::leaf("a", noop)]);

    let empty: [&str; 0] = [];
    let path = root.resolve(&empty).await.unwrap();

    assert_eq!(titles(&path), vec!["root"]);
}

#[tokio::test]
async fn test_exact_depth_address_returns_full_path() {
    let root = Node::branch("root", vec![Node::leaf("a", noop)]);

    let path = root.resolve(&["a"]).await.unwrap();

    assert_eq!(titles(&path), vec!["root", "a"]);
    assert!(path[1].is_leaf());
}

#[tokio::test]
async fn test_unmatched_label_fails_and_tree_survives() {
    let root = Node::branch("root", vec![Node::leaf("a", noop)]);

    let err = root.resolve(&["b"]).await.unwrap_err();
    assert!(matches!(err, ResolveError::BadPath { .. }));

    // The failed resolution did not disturb the tree.
    let path = root.resolve(&["a"]).await.unwrap();
    assert_eq!(titles(&path), vec!["root", "a"]);
}

#[tokio::test]
async fn test_address_continuing_past_leaf_fails() {
    let root = Node::branch("root", vec![Node::leaf("a", noop)]);

    let err = root.resolve(&["a", "x"]).await.unwrap_err();

    match err {
        ResolveError::BadPath { segment, under } => {
            assert_eq!(segment, "x");
            assert_eq!(under, "a");
        }
        other => panic!("expected BadPath, got {other:?}"),
    }
}

#[tokio::test]
async fn test_async_producer_invoked_exactly_once_per_resolve() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let root = Node::dynamic_async("root", move |_: &BranchNode| {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(vec![Node::leaf("a", noop)])
        }
    });

    root.resolve(&["a"]).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    // No caching between calls: a second resolution re-invokes the producer.
    root.resolve(&["a"]).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_duplicate_titles_resolve_to_first_occurrence() {
    let root = Node::branch(
        "root",
        vec![
            Node::leaf("x", noop),
            Node::branch("x", vec![Node::leaf("inner", noop)]),
        ],
    );

    let path = root.resolve(&["x"]).await.unwrap();
    assert!(path[1].is_leaf());
}

#[tokio::test]
async fn test_mixed_sync_and_async_levels() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let jobs = Node::dynamic_async("jobs", move |_: &BranchNode| {
        let counter = counter.clone();
        async move {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(vec![Node::leaf(format!("run-{n}"), noop)])
        }
    });
    let root = Node::branch("root", vec![jobs]);

    // The static level costs no producer call; the async level costs one.
    let path = root.resolve(&["jobs", "run-1"]).await.unwrap();

    assert_eq!(titles(&path), vec!["root", "jobs", "run-1"]);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_async_producer_error_propagates_unwrapped() {
    let root = Node::dynamic_async("root", |_: &BranchNode| async {
        Err::<Children, ProducerError>("listing service unreachable".into())
    });

    let err = root.resolve(&["anything"]).await.unwrap_err();

    match err {
        ResolveError::Producer(inner) => {
            assert_eq!(inner.to_string(), "listing service unreachable");
        }
        other => panic!("expected Producer, got {other:?}"),
    }
}

#[tokio::test]
async fn test_producers_invoked_in_path_order() {
    let order = Arc::new(std::sync::Mutex::new(Vec::new()));

    let inner_log = order.clone();
    let inner = Node::dynamic("inner", move |_| {
        inner_log.lock().unwrap().push("inner");
        Ok(vec![Node::leaf("go", noop)])
    });

    let outer_log = order.clone();
    let root = Node::dynamic("root", move |_| {
        outer_log.lock().unwrap().push("root");
        Ok(vec![inner.clone()])
    });

    root.resolve(&["inner", "go"]).await.unwrap();
    assert_eq!(*order.lock().unwrap(), vec!["root", "inner"]);
}

#[tokio::test]
async fn test_palette_run_invokes_resolved_leaf() {
    let fired = Arc::new(AtomicBool::new(false));
    let flag = fired.clone();
    let root = Node::branch(
        "root",
        vec![Node::branch(
            "experiments",
            vec![Node::leaf("pause", move |_| {
                flag.store(true, Ordering::SeqCst);
            })],
        )],
    );
    let palette = Palette::new(root);

    let outcome = palette.run("experiments pause").await.unwrap();

    assert_eq!(
        outcome,
        Outcome::Executed {
            command: "experiments pause".to_string()
        }
    );
    assert!(fired.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_palette_run_on_branch_reports_next_level() {
    let root = Node::branch(
        "root",
        vec![Node::branch(
            "experiments",
            vec![Node::leaf("pause", noop), Node::leaf("kill", noop)],
        )],
    );
    let palette = Palette::new(root);

    let outcome = palette.run("experiments").await.unwrap();

    assert_eq!(
        outcome,
        Outcome::Incomplete {
            suggestions: vec!["pause".to_string(), "kill".to_string()]
        }
    );
}

#[tokio::test]
async fn test_palette_suggestions_filter_trailing_partial_token() {
    let root = Node::branch(
        "root",
        vec![Node::branch(
            "experiments",
            vec![
                Node::leaf("pause", noop),
                Node::leaf("kill", noop),
                Node::leaf("Parameters", noop),
            ],
        )],
    );
    let palette = Palette::new(root);

    // Prefix filtering is case-insensitive; matching of complete tokens is not.
    let suggestions = palette.suggestions("experiments pa").await.unwrap();
    assert_eq!(suggestions, vec!["pause".to_string(), "Parameters".to_string()]);

    // A trailing space treats the last token as complete.
    let suggestions = palette.suggestions("experiments ").await.unwrap();
    assert_eq!(
        suggestions,
        vec![
            "pause".to_string(),
            "kill".to_string(),
            "Parameters".to_string()
        ]
    );
}

#[tokio::test]
async fn test_palette_suggestions_empty_input_lists_top_level() {
    let root = Node::branch(
        "root",
        vec![Node::branch("a", vec![]), Node::leaf("b", noop)],
    );
    let palette = Palette::new(root);

    let suggestions = palette.suggestions("").await.unwrap();
    assert_eq!(suggestions, vec!["a".to_string(), "b".to_string()]);
}

struct FixedListing {
    names: Vec<String>,
}

#[async_trait::async_trait]
impl CommandSource for FixedListing {
    async fn children(&self, _branch: &BranchNode) -> Result<Children, ProducerError> {
        Ok(self
            .names
            .iter()
            .map(|name| Node::leaf(name.clone(), noop))
            .collect())
    }
}

#[tokio::test]
async fn test_source_backed_branch_resolves() {
    let listing = Arc::new(FixedListing {
        names: vec!["nb-alpha".to_string(), "nb-beta".to_string()],
    });
    let root = Node::branch("root", vec![Node::from_source("notebooks", listing)]);

    let path = root.resolve(&["notebooks", "nb-beta"]).await.unwrap();
    assert_eq!(titles(&path), vec!["root", "notebooks", "nb-beta"]);
}

#[tokio::test]
async fn test_menu_json_end_to_end() {
    use cmdtree::menu::{from_json, ActionRegistry};

    let fired = Arc::new(AtomicBool::new(false));
    let flag = fired.clone();
    let mut actions = ActionRegistry::new();
    actions.register("stop-experiment", move |_| {
        flag.store(true, Ordering::SeqCst);
    });

    let json = r#"{
        "title": "root",
        "children": [
            { "title": "experiments", "children": [
                { "title": "stop", "action": "stop-experiment" }
            ]}
        ]
    }"#;

    let root = from_json(json, &actions).unwrap();
    let palette = Palette::new(root);

    let outcome = palette.run("experiments stop").await.unwrap();
    assert!(matches!(outcome, Outcome::Executed { .. }));
    assert!(fired.load(Ordering::SeqCst));
}
