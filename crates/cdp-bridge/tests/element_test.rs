// Integration tests for ElementHandle
//
// The mock answers Runtime.callFunctionOn by looking at the function source,
// which is enough to tell the element templates apart.

use cdp_bridge::dom::{ElementHandle, QuerySelector};
use cdp_bridge::server::types::RemoteObjectId;
use cdp_bridge::{CancellationToken, Error, Value};
use serde_json::json;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

mod common;

use common::MockConnection;

fn element(conn: &Arc<MockConnection>, id: &str) -> ElementHandle {
    ElementHandle::new(common::element_runtime(conn), RemoteObjectId::new(id))
}

#[tokio::test]
async fn test_node_type_is_evaluated_once_under_concurrency() {
    common::init_tracing();

    let conn = MockConnection::new();
    conn.on("Runtime.callFunctionOn", |params| {
        match common::declaration(params) {
            "(el) => el.nodeType" => Ok(common::value_reply(json!(1))),
            "(el) => el.nodeName" => Ok(common::value_reply(json!("DIV"))),
            other => panic!("unexpected template {}", other),
        }
    });
    let el = element(&conn, "obj-1");

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let el = el.clone();
        tasks.push(tokio::spawn(async move { el.node_type().await }));
    }
    for task in tasks {
        assert_eq!(task.await.unwrap().unwrap(), 1);
    }

    assert_eq!(conn.call_count("Runtime.callFunctionOn"), 1);

    // Clones share the cache; node name has its own
    assert_eq!(el.clone().node_type().await.unwrap(), 1);
    assert_eq!(el.node_name().await.unwrap(), "DIV");
    assert_eq!(el.node_name().await.unwrap(), "DIV");
    assert_eq!(conn.call_count("Runtime.callFunctionOn"), 2);
}

#[tokio::test]
async fn test_failed_node_type_is_retried() {
    common::init_tracing();

    let conn = MockConnection::new();
    conn.reply(
        "Runtime.callFunctionOn",
        common::exception_reply("TypeError: el is null"),
    );
    let el = element(&conn, "obj-1");

    assert!(el.node_type().await.is_err());

    conn.reply("Runtime.callFunctionOn", common::value_reply(json!(3)));
    assert_eq!(el.node_type().await.unwrap(), 3);
    assert_eq!(conn.call_count("Runtime.callFunctionOn"), 2);
}

#[tokio::test]
async fn test_concurrent_failed_node_type_is_evaluated_once() {
    common::init_tracing();

    let conn = MockConnection::new();
    conn.set_latency(Duration::from_millis(20));
    conn.reply(
        "Runtime.callFunctionOn",
        common::exception_reply("TypeError: el is null"),
    );
    let el = element(&conn, "obj-1");

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let el = el.clone();
        tasks.push(tokio::spawn(async move { el.node_type().await }));
    }
    for task in tasks {
        let err = task.await.unwrap().unwrap_err();
        assert!(matches!(err, Error::Unexpected(_)), "got {:?}", err);
    }

    assert_eq!(conn.call_count("Runtime.callFunctionOn"), 1);

    // Reads after the failed evaluation try again
    conn.reply("Runtime.callFunctionOn", common::value_reply(json!(1)));
    assert_eq!(el.node_type().await.unwrap(), 1);
    assert_eq!(conn.call_count("Runtime.callFunctionOn"), 2);
}

#[tokio::test]
async fn test_attributes() {
    common::init_tracing();

    let conn = MockConnection::new();
    conn.on("Runtime.callFunctionOn", |params| {
        let source = common::declaration(params);
        let reply = if source.contains("getAttributeNames") {
            common::value_reply(json!({"id": "main", "style": {"color": "red"}}))
        } else if source.contains("getAttribute(name)") {
            match params["arguments"][1]["value"].as_str() {
                Some("id") => common::value_reply(json!("main")),
                _ => common::value_reply(json!(null)),
            }
        } else {
            common::undefined_reply()
        };
        Ok(reply)
    });
    let el = element(&conn, "obj-1");

    let all = el.attributes().await.unwrap();
    assert_eq!(all["id"], Value::from("main"));
    assert_eq!(
        all["style"],
        Value::Object(BTreeMap::from([("color".to_string(), Value::from("red"))]))
    );

    assert_eq!(el.attribute("id").await.unwrap(), Value::from("main"));
    assert_eq!(el.attribute("title").await.unwrap(), Value::None);

    el.set_attribute("title", "hello").await.unwrap();
    let set = conn.calls_to("Runtime.callFunctionOn").pop().unwrap();
    assert_eq!(
        set["arguments"],
        json!([{"objectId": "obj-1"}, {"value": "title"}, {"value": "hello"}])
    );
    assert_eq!(set["returnByValue"], false);

    el.remove_attributes(&["title", "hidden"]).await.unwrap();
    let removed = conn.calls_to("Runtime.callFunctionOn").pop().unwrap();
    assert_eq!(removed["arguments"][1], json!({"value": ["title", "hidden"]}));
}

#[tokio::test]
async fn test_styles() {
    common::init_tracing();

    let conn = MockConnection::new();
    conn.on("Runtime.callFunctionOn", |params| {
        let source = common::declaration(params);
        let reply = if source.contains("styles.length") {
            common::value_reply(json!({"color": "red", "margin-top": "4px"}))
        } else if source.contains("getPropertyValue(name)") {
            common::value_reply(json!(null))
        } else {
            common::undefined_reply()
        };
        Ok(reply)
    });
    let el = element(&conn, "obj-1");

    let styles = el.styles().await.unwrap();
    assert_eq!(styles.get("margin-top").map(String::as_str), Some("4px"));
    assert_eq!(styles.len(), 2);

    assert_eq!(el.style("display").await.unwrap(), None);

    let values = BTreeMap::from([("display".to_string(), "none".to_string())]);
    el.set_styles(&values).await.unwrap();
    let set = conn.calls_to("Runtime.callFunctionOn").pop().unwrap();
    assert_eq!(set["arguments"][1], json!({"value": {"display": "none"}}));
}

#[tokio::test]
async fn test_query_selector_picks_template_by_kind() {
    common::init_tracing();

    let conn = MockConnection::new();
    conn.on("Runtime.callFunctionOn", |params| {
        let source = common::declaration(params);
        if source.contains("el.querySelector(selector)") {
            Ok(common::node_reply("css-1", "HTMLSpanElement"))
        } else if source.contains("FIRST_ORDERED_NODE_TYPE") {
            Ok(common::node_reply("xpath-1", "HTMLSpanElement"))
        } else {
            Ok(common::value_reply(json!(null)))
        }
    });
    let el = element(&conn, "obj-1");

    let css = el
        .query_selector(&QuerySelector::css("span.title"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(css.remote_id().as_str(), "css-1");
    assert_eq!(css.frame_id(), el.frame_id());

    let xpath = el
        .query_selector(&QuerySelector::xpath("//span"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(xpath.remote_id().as_str(), "xpath-1");

    let calls = conn.calls_to("Runtime.callFunctionOn");
    assert_eq!(calls[0]["arguments"][1], json!({"value": "span.title"}));
    assert_eq!(calls[1]["arguments"][1], json!({"value": "//span"}));
}

#[tokio::test]
async fn test_query_selector_all_and_children() {
    common::init_tracing();

    let conn = MockConnection::new();
    conn.reply("Runtime.callFunctionOn", common::array_reply("arr-1"));
    conn.reply(
        "Runtime.getProperties",
        json!({
            "result": [
                common::property("0", true, common::node_object("li-1", "HTMLLIElement")),
                common::property("1", true, common::node_object("li-2", "HTMLLIElement")),
                common::property("length", false, common::primitive(json!(2)))
            ]
        }),
    );
    let el = element(&conn, "ul-1");

    let items = el
        .query_selector_all(&QuerySelector::css("li"))
        .await
        .unwrap();
    let ids: Vec<&str> = items.iter().map(|e| e.remote_id().as_str()).collect();
    assert_eq!(ids, vec!["li-1", "li-2"]);

    let children = el.children().await.unwrap();
    assert_eq!(children, items);
    assert!(common::declaration(&conn.calls_to("Runtime.callFunctionOn")[1]).contains("el.children"));
}

#[tokio::test]
async fn test_count_and_exists() {
    common::init_tracing();

    let conn = MockConnection::new();
    conn.on("Runtime.callFunctionOn", |params| {
        let source = common::declaration(params);
        if source.contains("found.length") {
            Ok(common::value_reply(json!(3)))
        } else if source.contains("found != null") {
            Ok(common::value_reply(json!(false)))
        } else {
            Ok(common::value_reply(json!(-1)))
        }
    });
    let el = element(&conn, "obj-1");
    let selector = QuerySelector::css("p");

    assert_eq!(el.count_by_selector(&selector).await.unwrap(), 3);
    assert!(!el.exists_by_selector(&selector).await.unwrap());

    // A negative children count is a protocol violation
    let err = el.length().await.unwrap_err();
    assert!(err.to_string().contains("children count"), "got {}", err);
}

#[tokio::test]
async fn test_inner_text_by_selector() {
    common::init_tracing();

    let conn = MockConnection::new();
    conn.on("Runtime.callFunctionOn", |params| {
        let source = common::declaration(params);
        if source.contains("found.map") {
            Ok(common::value_reply(json!(["one", "two"])))
        } else if params["arguments"][1]["value"] == "#missing" {
            Ok(common::exception_reply("Error: element(s) not found"))
        } else {
            Ok(common::value_reply(json!("hello")))
        }
    });
    let el = element(&conn, "obj-1");

    assert_eq!(
        el.inner_text_by_selector(&QuerySelector::css("h1"))
            .await
            .unwrap(),
        "hello"
    );
    assert_eq!(
        el.inner_text_by_selector_all(&QuerySelector::css("li"))
            .await
            .unwrap(),
        vec!["one".to_string(), "two".to_string()]
    );

    let err = el
        .inner_text_by_selector(&QuerySelector::css("#missing"))
        .await
        .unwrap_err();
    assert!(err.is_not_found(), "got {:?}", err);
}

#[tokio::test]
async fn test_select_returns_selected_values() {
    common::init_tracing();

    let conn = MockConnection::new();
    conn.reply("Runtime.callFunctionOn", common::value_reply(json!(["b"])));
    let el = element(&conn, "select-1");

    let selected = el
        .select(&["b".to_string(), "z".to_string()])
        .await
        .unwrap();
    assert_eq!(selected, vec!["b".to_string()]);

    let call = &conn.calls_to("Runtime.callFunctionOn")[0];
    assert!(common::declaration(call).contains("values.includes"));
    assert_eq!(call["arguments"][1], json!({"value": ["b", "z"]}));
}

#[tokio::test]
async fn test_xpath_resolves_nodes_and_primitives() {
    common::init_tracing();

    let conn = MockConnection::new();
    conn.on("Runtime.callFunctionOn", |params| {
        match params["arguments"][1]["value"].as_str() {
            Some("count(//p)") => Ok(common::value_reply(json!(4))),
            _ => Ok(common::node_reply("p-1", "HTMLParagraphElement")),
        }
    });
    let el = element(&conn, "obj-1");

    assert_eq!(el.xpath("count(//p)").await.unwrap(), Value::Int(4));

    let node = el.xpath("//p[1]").await.unwrap();
    let found = node.into_element().expect("expected a node");
    assert_eq!(found.remote_id().as_str(), "p-1");

    // Results are fetched by reference so nodes survive the round trip
    for call in conn.calls_to("Runtime.callFunctionOn") {
        assert_eq!(call["returnByValue"], false);
    }
}

#[tokio::test]
async fn test_relatives_can_be_absent() {
    common::init_tracing();

    let conn = MockConnection::new();
    conn.on("Runtime.callFunctionOn", |params| {
        if common::declaration(params).contains("parentElement") {
            Ok(common::node_reply("parent-1", "HTMLBodyElement"))
        } else {
            Ok(common::value_reply(json!(null)))
        }
    });
    let el = element(&conn, "obj-1");

    let parent = el.parent().await.unwrap().unwrap();
    assert_eq!(parent.remote_id().as_str(), "parent-1");
    assert!(el.next_sibling().await.unwrap().is_none());
    assert!(el.child(5).await.unwrap().is_none());
}

#[tokio::test]
async fn test_equality_uses_remote_id() {
    common::init_tracing();

    let conn = MockConnection::new();
    let a = element(&conn, "obj-1");
    let b = element(&conn, "obj-1");
    let c = element(&conn, "obj-2");

    assert_eq!(a, b);
    assert_ne!(a, c);

    let set: HashSet<ElementHandle> = [a, b, c].into_iter().collect();
    assert_eq!(set.len(), 2);
}

#[tokio::test]
async fn test_stale_element_surfaces_error() {
    common::init_tracing();

    let conn = MockConnection::new();
    conn.on("Runtime.callFunctionOn", |_| {
        Err(Error::Protocol("Could not find object with given id".to_string()))
    });
    let el = element(&conn, "gone");

    let err = el.inner_text().await.unwrap_err();
    assert!(matches!(err, Error::Protocol(_)), "got {:?}", err);
}

#[tokio::test]
async fn test_loaded_elements_keep_cancellation_scope() {
    common::init_tracing();

    let conn = MockConnection::new();
    conn.on("Runtime.callFunctionOn", |params| {
        let source = common::declaration(params);
        let reply = if source.contains("el.querySelector(selector)") {
            common::node_reply("obj-2", "HTMLSpanElement")
        } else {
            common::value_reply(json!(1))
        };
        Ok(reply)
    });

    let token = CancellationToken::new();
    let el = ElementHandle::new(
        common::element_runtime(&conn).with_cancellation(token.clone()),
        RemoteObjectId::new("obj-1"),
    );

    let span = el
        .query_selector(&QuerySelector::css("span"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(span.node_type().await.unwrap(), 1);

    token.cancel();

    let err = span.node_name().await.unwrap_err();
    assert!(matches!(err, Error::Cancelled), "got {:?}", err);
}
