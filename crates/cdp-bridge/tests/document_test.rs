// Integration tests for documents and the frame registry
//
// The mock page has a main frame with two child frames. Each frame gets its
// own isolated world; the world id tells the callFunctionOn handler which
// frame a call runs in.

use cdp_bridge::dom::{
    DOCUMENT_NODE, DOCUMENT_NODE_NAME, DocumentHandle, ElementHandle, FrameInfo, FrameStore, Node,
    QuerySelector,
};
use cdp_bridge::eval::Runtime;
use cdp_bridge::server::types::{ExecutionContextId, FrameId, RemoteObjectId};
use cdp_bridge::{CancellationToken, Error, Value};
use serde_json::{Value as JsonValue, json};
use std::sync::Arc;

mod common;

use common::MockConnection;

const FRAMES: [&str; 3] = ["main", "child-a", "child-b"];

fn context_of(frame_id: &str) -> i64 {
    FRAMES
        .iter()
        .position(|id| *id == frame_id)
        .map(|n| n as i64 + 1)
        .unwrap_or(0)
}

fn frame_of(params: &JsonValue) -> &'static str {
    let context = params["executionContextId"].as_i64().unwrap_or_default();
    FRAMES
        .get((context - 1) as usize)
        .copied()
        .unwrap_or("unknown")
}

/// A page whose frames answer the document templates.
fn page() -> Arc<MockConnection> {
    let conn = MockConnection::new();

    conn.reply(
        "Page.getFrameTree",
        common::frame_tree_reply("main", &["child-a", "child-b"]),
    );
    conn.on("Page.createIsolatedWorld", |params| {
        let frame_id = params["frameId"].as_str().unwrap_or_default();
        Ok(json!({ "executionContextId": context_of(frame_id) }))
    });
    conn.on("Runtime.callFunctionOn", |params| {
        let frame = frame_of(params);
        let reply = match common::declaration(params) {
            "() => document" => common::node_reply(&format!("doc-{}", frame), "HTMLDocument"),
            "() => document.title" => common::value_reply(json!(format!("Title of {}", frame))),
            "() => window.location.toString()" => {
                common::value_reply(json!(format!("https://example.test/{}#live", frame)))
            }
            source if source.contains("el.querySelector(selector)") => {
                common::node_reply(&format!("{}-span", frame), "HTMLSpanElement")
            }
            source if source.contains("el.ownerDocument") => {
                common::node_reply(&format!("doc-{}", frame), "HTMLDocument")
            }
            _ => common::value_reply(json!(null)),
        };
        Ok(reply)
    });

    conn
}

#[tokio::test]
async fn test_load_frame_tree_registers_every_frame() {
    common::init_tracing();

    let conn = page();
    let store = FrameStore::new(common::channel(&conn));

    let root = store.load_frame_tree().await.unwrap();

    assert_eq!(root.frame_id().as_str(), "main");
    assert_eq!(root.remote_id().as_str(), "doc-main");
    assert!(root.parent_frame_id().is_none());
    assert_eq!(store.len(), 3);
    assert_eq!(conn.call_count("Page.createIsolatedWorld"), 3);

    let child = store.get(&FrameId::new("child-b")).unwrap();
    assert_eq!(child.remote_id().as_str(), "doc-child-b");
    assert_eq!(child.url(), "https://example.test/child-b");
    assert_eq!(child.runtime().context().id(), Some(ExecutionContextId(3)));
}

#[tokio::test]
async fn test_document_node_identity_is_local() {
    common::init_tracing();

    let conn = page();
    let store = FrameStore::new(common::channel(&conn));
    let root = store.load_frame_tree().await.unwrap();
    let before = conn.calls().len();

    assert_eq!(root.node_type(), DOCUMENT_NODE);
    assert_eq!(root.node_name(), DOCUMENT_NODE_NAME);
    assert_eq!(conn.calls().len(), before);
}

#[tokio::test]
async fn test_parent_and_child_documents() -> anyhow::Result<()> {
    common::init_tracing();

    let conn = page();
    let store = FrameStore::new(common::channel(&conn));
    let root = store.load_frame_tree().await?;

    let children = root.child_documents().await?;
    let ids: Vec<&str> = children.iter().map(|d| d.frame_id().as_str()).collect();
    assert_eq!(ids, vec!["child-a", "child-b"]);

    let parent = children[0]
        .parent_document()
        .await?
        .ok_or_else(|| anyhow::anyhow!("child-a has no parent document"))?;
    assert_eq!(parent, root);
    assert!(root.parent_document().await?.is_none());

    // A frame that navigated away stops resolving
    store.remove(&FrameId::new("child-a"));
    let children = root.child_documents().await?;
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].frame_id().as_str(), "child-b");

    Ok(())
}

#[tokio::test]
async fn test_title_and_live_url() -> anyhow::Result<()> {
    common::init_tracing();

    let conn = page();
    let store = FrameStore::new(common::channel(&conn));
    store.load_frame_tree().await?;

    let child = store
        .get(&FrameId::new("child-a"))
        .ok_or_else(|| anyhow::anyhow!("child-a was not registered"))?;
    assert_eq!(child.title().await?, "Title of child-a");

    let url = child.live_url().await?;
    assert_eq!(url.path(), "/child-a");
    assert_eq!(url.fragment(), Some("live"));

    Ok(())
}

#[tokio::test]
async fn test_invalid_live_url_is_protocol_error() {
    common::init_tracing();

    let conn = MockConnection::new();
    conn.reply("Runtime.callFunctionOn", common::value_reply(json!("about blank")));
    let document = detached_document(&conn);

    let err = document.live_url().await.unwrap_err();
    assert!(matches!(err, Error::Protocol(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_query_loads_elements_through_registry() {
    common::init_tracing();

    let conn = page();
    let store = FrameStore::new(common::channel(&conn));
    store.load_frame_tree().await.unwrap();

    let child = store.get(&FrameId::new("child-b")).unwrap();
    let span = child
        .query_selector(&QuerySelector::css("span"))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(span.remote_id().as_str(), "child-b-span");
    assert_eq!(span.frame_id().as_str(), "child-b");
    assert_eq!(span.runtime().context().id(), Some(ExecutionContextId(3)));
}

#[tokio::test]
async fn test_document_results_load_as_documents() {
    common::init_tracing();

    let conn = page();
    let store = FrameStore::new(common::channel(&conn));
    let root = store.load_frame_tree().await.unwrap();

    let out = root.xpath("/").await.unwrap();
    match out {
        Value::Node(Node::Document(document)) => assert_eq!(document, root),
        other => panic!("expected the document, got {:?}", other),
    }
}

#[tokio::test]
async fn test_dropped_store_detaches_documents() {
    common::init_tracing();

    let conn = page();
    let store = FrameStore::new(common::channel(&conn));
    let root = store.load_frame_tree().await.unwrap();
    let child = store.get(&FrameId::new("child-a")).unwrap();

    drop(store);

    let err = root.child_documents().await.unwrap_err();
    assert!(matches!(err, Error::Detached(_)), "got {:?}", err);

    let err = child.parent_document().await.unwrap_err();
    assert!(matches!(err, Error::Detached(_)), "got {:?}", err);

    // Node loading goes through the registry too
    let err = child
        .query_selector(&QuerySelector::css("span"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Detached(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_child_frames_are_discovered_lazily() {
    common::init_tracing();

    let conn = page();
    let store = FrameStore::new(common::channel(&conn));

    let runtime = Runtime::create(common::channel(&conn), FrameId::new("main"))
        .await
        .unwrap();
    let document = DocumentHandle::new(
        ElementHandle::new(runtime, RemoteObjectId::new("doc-main")),
        FrameInfo {
            id: FrameId::new("main"),
            parent_id: None,
            url: "https://example.test/".to_string(),
            name: None,
        },
        None,
        store.registry(),
    );
    assert_eq!(conn.call_count("Page.getFrameTree"), 0);

    let ids = document.child_frame_ids().await.unwrap();
    assert_eq!(ids, vec![FrameId::new("child-a"), FrameId::new("child-b")]);

    document.child_frame_ids().await.unwrap();
    assert_eq!(conn.call_count("Page.getFrameTree"), 1);

    // Nothing is registered yet
    assert!(document.child_documents().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_register_replaces_document() {
    common::init_tracing();

    let conn = page();
    let store = FrameStore::new(common::channel(&conn));
    let root = store.load_frame_tree().await.unwrap();

    let replacement = DocumentHandle::new(
        ElementHandle::new(root.runtime().clone(), RemoteObjectId::new("doc-main-2")),
        root.frame().clone(),
        Some(Vec::new()),
        store.registry(),
    );

    let previous = store.register(replacement).unwrap();
    assert_eq!(previous, root);
    assert_eq!(
        store.get(&FrameId::new("main")).unwrap().remote_id().as_str(),
        "doc-main-2"
    );
    assert_eq!(store.len(), 3);
}

/// Document of frame F1 whose registry is already gone.
fn detached_document(conn: &Arc<MockConnection>) -> DocumentHandle {
    let store = FrameStore::new(common::channel(conn));
    let registry = store.registry();
    drop(store);

    DocumentHandle::new(
        ElementHandle::new(common::runtime(conn), RemoteObjectId::new("doc-1")),
        FrameInfo {
            id: FrameId::new(common::FRAME_ID),
            parent_id: None,
            url: "about:blank".to_string(),
            name: None,
        },
        Some(Vec::new()),
        registry,
    )
}

#[tokio::test]
async fn test_registry_loaded_nodes_keep_cancellation_scope() -> anyhow::Result<()> {
    common::init_tracing();

    let conn = page();
    let store = FrameStore::new(common::channel(&conn));
    store.load_frame_tree().await?;
    let child = store
        .get(&FrameId::new("child-a"))
        .ok_or_else(|| anyhow::anyhow!("child-a was not registered"))?;

    let token = CancellationToken::new();
    let scoped = child.with_cancellation(token.clone());
    let span = scoped
        .query_selector(&QuerySelector::css("span"))
        .await?
        .ok_or_else(|| anyhow::anyhow!("span not found"))?;
    assert_eq!(span.remote_id().as_str(), "child-a-span");

    token.cancel();
    assert!(span.runtime().cancellation().is_cancelled());

    let err = span.node_type().await.unwrap_err();
    assert!(matches!(err, Error::Cancelled), "got {:?}", err);

    // The registered document is not affected
    assert_eq!(child.title().await?, "Title of child-a");

    Ok(())
}
