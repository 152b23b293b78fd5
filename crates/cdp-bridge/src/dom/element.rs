// Copyright 2026 Paul Adamson
// Licensed under the Apache License, Version 2.0
//
// ElementHandle - a DOM element living in the remote target
//
// Every operation builds a template expression with the element's remote id
// as the first argument and executes it through the frame's Runtime. Node type
// and node name are read at most once per handle.

use crate::dom::lazy::LazyValue;
use crate::dom::selector::QuerySelector;
use crate::error::{Error, Result};
use crate::eval::{Expression, Runtime, Value};
use crate::events::{WaitEvent, WaitOptions, wait_for};
use crate::server::types::{FrameId, RemoteObjectId};
use crate::templates;
use futures_util::FutureExt;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Handle to a DOM element
///
/// Cloning is cheap and clones share the cached node type and name. Equality
/// and hashing use the remote object id only.
///
/// A handle never stores its parent or children; those are re-resolved on
/// every call. Once the element's frame navigates away, calls fail with
/// [`Error::NotFound`] or [`Error::Unexpected`] instead of returning stale data.
#[derive(Clone)]
pub struct ElementHandle {
    inner: Arc<ElementInner>,
}

struct ElementInner {
    runtime: Runtime,
    id: RemoteObjectId,
    node_type: LazyValue<i64>,
    node_name: LazyValue<String>,
}

impl ElementHandle {
    pub fn new(runtime: Runtime, id: RemoteObjectId) -> Self {
        let node_type = {
            let runtime = runtime.clone();
            let id = id.clone();
            LazyValue::new(move || {
                let runtime = runtime.clone();
                let id = id.clone();
                async move {
                    let out = runtime.eval_value(&templates::get_node_type(&id)).await?;
                    expect_int(out, "nodeType")
                }
                .boxed()
            })
        };

        let node_name = {
            let runtime = runtime.clone();
            let id = id.clone();
            LazyValue::new(move || {
                let runtime = runtime.clone();
                let id = id.clone();
                async move {
                    let out = runtime.eval_value(&templates::get_node_name(&id)).await?;
                    Ok(out.to_text())
                }
                .boxed()
            })
        };

        Self {
            inner: Arc::new(ElementInner {
                runtime,
                id,
                node_type,
                node_name,
            }),
        }
    }

    pub fn remote_id(&self) -> &RemoteObjectId {
        &self.inner.id
    }

    pub fn runtime(&self) -> &Runtime {
        &self.inner.runtime
    }

    pub fn frame_id(&self) -> &FrameId {
        self.inner.runtime.frame_id()
    }

    /// Handle to the same node whose calls fail with [`Error::Cancelled`]
    /// once `token` fires. Cached node type and name are not carried over.
    pub fn with_cancellation(&self, token: CancellationToken) -> Self {
        Self::new(
            self.inner.runtime.with_cancellation(token),
            self.inner.id.clone(),
        )
    }

    fn id(&self) -> &RemoteObjectId {
        &self.inner.id
    }

    async fn value_of(&self, expr: Expression) -> Result<Value> {
        self.inner.runtime.eval_value(&expr).await
    }

    async fn run(&self, expr: Expression) -> Result<()> {
        self.inner.runtime.eval(&expr).await
    }

    async fn element_of(&self, expr: Expression) -> Result<Option<ElementHandle>> {
        self.inner.runtime.eval_element(&expr).await
    }

    async fn elements_of(&self, expr: Expression) -> Result<Vec<ElementHandle>> {
        self.inner.runtime.eval_elements(&expr).await
    }

    async fn wait(&self, expr: Expression, options: Option<WaitOptions>) -> Result<()> {
        wait_for(&self.inner.runtime, expr, options).await?;
        Ok(())
    }

    // Node identity

    /// DOM `nodeType`, evaluated once per handle.
    pub async fn node_type(&self) -> Result<i64> {
        self.inner.node_type.read().await
    }

    /// DOM `nodeName`, evaluated once per handle.
    pub async fn node_name(&self) -> Result<String> {
        self.inner.node_name.read().await
    }

    // Value

    pub async fn value(&self) -> Result<Value> {
        self.value_of(templates::get_value(self.id())).await
    }

    pub async fn set_value(&self, value: &Value) -> Result<()> {
        self.run(templates::set_value(self.id(), value)).await
    }

    /// Number of child elements.
    pub async fn length(&self) -> Result<usize> {
        let out = self
            .value_of(templates::get_children_count(self.id()))
            .await
            .map_err(|e| e.context("Failed to get children count"))?;

        expect_count(out, "children count")
    }

    // Styles

    pub async fn styles(&self) -> Result<BTreeMap<String, String>> {
        let out = self.value_of(templates::get_styles(self.id())).await?;
        Ok(into_string_map(out))
    }

    pub async fn style(&self, name: &str) -> Result<Option<String>> {
        let out = self.value_of(templates::get_style(self.id(), name)).await?;
        Ok(into_optional_string(out))
    }

    pub async fn set_styles(&self, values: &BTreeMap<String, String>) -> Result<()> {
        self.run(templates::set_styles(self.id(), values)).await
    }

    pub async fn set_style(&self, name: &str, value: &str) -> Result<()> {
        self.run(templates::set_style(self.id(), name, value)).await
    }

    pub async fn remove_styles(&self, names: &[&str]) -> Result<()> {
        self.run(templates::remove_styles(self.id(), names)).await
    }

    // Attributes

    /// All attributes; `style` is returned as a map of declarations.
    pub async fn attributes(&self) -> Result<BTreeMap<String, Value>> {
        let out = self.value_of(templates::get_attributes(self.id())).await?;

        match out {
            Value::Object(map) => Ok(map),
            Value::None => Ok(BTreeMap::new()),
            other => Err(Error::Protocol(format!(
                "attributes is not an object: {}",
                other.to_text()
            ))),
        }
    }

    /// One attribute, or [`Value::None`] when it is not set.
    pub async fn attribute(&self, name: &str) -> Result<Value> {
        self.value_of(templates::get_attribute(self.id(), name)).await
    }

    pub async fn set_attributes(&self, values: &BTreeMap<String, String>) -> Result<()> {
        self.run(templates::set_attributes(self.id(), values)).await
    }

    pub async fn set_attribute(&self, name: &str, value: &str) -> Result<()> {
        self.run(templates::set_attribute(self.id(), name, value)).await
    }

    pub async fn remove_attribute(&self, name: &str) -> Result<()> {
        self.run(templates::remove_attribute(self.id(), name)).await
    }

    pub async fn remove_attributes(&self, names: &[&str]) -> Result<()> {
        self.run(templates::remove_attributes(self.id(), names)).await
    }

    // Tree navigation

    pub async fn children(&self) -> Result<Vec<ElementHandle>> {
        self.elements_of(templates::get_children(self.id())).await
    }

    pub async fn child(&self, index: usize) -> Result<Option<ElementHandle>> {
        self.element_of(templates::get_child_by_index(self.id(), index))
            .await
    }

    pub async fn parent(&self) -> Result<Option<ElementHandle>> {
        self.element_of(templates::get_parent(self.id())).await
    }

    pub async fn previous_sibling(&self) -> Result<Option<ElementHandle>> {
        self.element_of(templates::get_previous_element_sibling(self.id()))
            .await
    }

    pub async fn next_sibling(&self) -> Result<Option<ElementHandle>> {
        self.element_of(templates::get_next_element_sibling(self.id()))
            .await
    }

    // Queries

    pub async fn query_selector(&self, selector: &QuerySelector) -> Result<Option<ElementHandle>> {
        self.element_of(templates::query_selector(self.id(), selector))
            .await
    }

    pub async fn query_selector_all(&self, selector: &QuerySelector) -> Result<Vec<ElementHandle>> {
        self.elements_of(templates::query_selector_all(self.id(), selector))
            .await
    }

    pub async fn count_by_selector(&self, selector: &QuerySelector) -> Result<usize> {
        let out = self
            .value_of(templates::count_by_selector(self.id(), selector))
            .await?;
        expect_count(out, "match count")
    }

    pub async fn exists_by_selector(&self, selector: &QuerySelector) -> Result<bool> {
        let out = self
            .value_of(templates::exists_by_selector(self.id(), selector))
            .await?;
        Ok(out.is_truthy())
    }

    /// Evaluates an XPath expression with this element as the context node.
    ///
    /// Node results are loaded as handles, so the result is fetched by
    /// reference and resolved afterwards.
    pub async fn xpath(&self, expression: &str) -> Result<Value> {
        let runtime = &self.inner.runtime;
        let out = runtime
            .eval_ref(&templates::xpath(self.id(), expression))
            .await?;
        runtime.resolver().to_value(&out).await
    }

    // Inner text

    pub async fn inner_text(&self) -> Result<String> {
        let out = self.value_of(templates::get_inner_text(self.id())).await?;
        Ok(out.to_text())
    }

    pub async fn set_inner_text(&self, value: &str) -> Result<()> {
        self.run(templates::set_inner_text(self.id(), value)).await
    }

    pub async fn inner_text_by_selector(&self, selector: &QuerySelector) -> Result<String> {
        let out = self
            .value_of(templates::get_inner_text_by_selector(self.id(), selector))
            .await?;
        Ok(out.to_text())
    }

    pub async fn set_inner_text_by_selector(&self, selector: &QuerySelector, value: &str) -> Result<()> {
        self.run(templates::set_inner_text_by_selector(self.id(), selector, value))
            .await
    }

    pub async fn inner_text_by_selector_all(&self, selector: &QuerySelector) -> Result<Vec<String>> {
        let out = self
            .value_of(templates::get_inner_text_by_selector_all(self.id(), selector))
            .await?;
        Ok(into_string_list(out))
    }

    // Inner HTML

    pub async fn inner_html(&self) -> Result<String> {
        let out = self.value_of(templates::get_inner_html(self.id())).await?;
        Ok(out.to_text())
    }

    pub async fn set_inner_html(&self, value: &str) -> Result<()> {
        self.run(templates::set_inner_html(self.id(), value)).await
    }

    pub async fn inner_html_by_selector(&self, selector: &QuerySelector) -> Result<String> {
        let out = self
            .value_of(templates::get_inner_html_by_selector(self.id(), selector))
            .await?;
        Ok(out.to_text())
    }

    pub async fn set_inner_html_by_selector(&self, selector: &QuerySelector, value: &str) -> Result<()> {
        self.run(templates::set_inner_html_by_selector(self.id(), selector, value))
            .await
    }

    pub async fn inner_html_by_selector_all(&self, selector: &QuerySelector) -> Result<Vec<String>> {
        let out = self
            .value_of(templates::get_inner_html_by_selector_all(self.id(), selector))
            .await?;
        Ok(into_string_list(out))
    }

    // Focus

    pub async fn focus(&self) -> Result<()> {
        self.run(templates::focus(self.id())).await
    }

    pub async fn focus_by_selector(&self, selector: &QuerySelector) -> Result<()> {
        self.run(templates::focus_by_selector(self.id(), selector))
            .await
    }

    pub async fn blur(&self) -> Result<()> {
        self.run(templates::blur(self.id())).await
    }

    pub async fn blur_by_selector(&self, selector: &QuerySelector) -> Result<()> {
        self.run(templates::blur_by_selector(self.id(), selector))
            .await
    }

    // Select options

    /// Selects `<option>`s by value and returns the values now selected.
    pub async fn select(&self, values: &[String]) -> Result<Vec<String>> {
        let out = self.value_of(templates::select(self.id(), values)).await?;
        Ok(into_string_list(out))
    }

    pub async fn select_by_selector(
        &self,
        selector: &QuerySelector,
        values: &[String],
    ) -> Result<Vec<String>> {
        let out = self
            .value_of(templates::select_by_selector(self.id(), selector, values))
            .await?;
        Ok(into_string_list(out))
    }

    // Waits

    pub async fn wait_for_element(
        &self,
        selector: &QuerySelector,
        when: WaitEvent,
        options: Option<WaitOptions>,
    ) -> Result<()> {
        self.wait(templates::wait_for_element(self.id(), selector, when), options)
            .await
    }

    pub async fn wait_for_element_all(
        &self,
        selector: &QuerySelector,
        when: WaitEvent,
        options: Option<WaitOptions>,
    ) -> Result<()> {
        self.wait(
            templates::wait_for_element_all(self.id(), selector, when),
            options,
        )
        .await
    }

    pub async fn wait_for_class(
        &self,
        class: &str,
        when: WaitEvent,
        options: Option<WaitOptions>,
    ) -> Result<()> {
        self.wait(templates::wait_for_class(self.id(), class, when), options)
            .await
    }

    pub async fn wait_for_class_by_selector(
        &self,
        selector: &QuerySelector,
        class: &str,
        when: WaitEvent,
        options: Option<WaitOptions>,
    ) -> Result<()> {
        self.wait(
            templates::wait_for_class_by_selector(self.id(), selector, class, when),
            options,
        )
        .await
    }

    pub async fn wait_for_class_by_selector_all(
        &self,
        selector: &QuerySelector,
        class: &str,
        when: WaitEvent,
        options: Option<WaitOptions>,
    ) -> Result<()> {
        self.wait(
            templates::wait_for_class_by_selector_all(self.id(), selector, class, when),
            options,
        )
        .await
    }

    pub async fn wait_for_attribute(
        &self,
        name: &str,
        value: &Value,
        when: WaitEvent,
        options: Option<WaitOptions>,
    ) -> Result<()> {
        self.wait(
            templates::wait_for_attribute(self.id(), name, value, when),
            options,
        )
        .await
    }

    pub async fn wait_for_attribute_by_selector(
        &self,
        selector: &QuerySelector,
        name: &str,
        value: &Value,
        when: WaitEvent,
        options: Option<WaitOptions>,
    ) -> Result<()> {
        self.wait(
            templates::wait_for_attribute_by_selector(self.id(), selector, name, value, when),
            options,
        )
        .await
    }

    pub async fn wait_for_attribute_by_selector_all(
        &self,
        selector: &QuerySelector,
        name: &str,
        value: &Value,
        when: WaitEvent,
        options: Option<WaitOptions>,
    ) -> Result<()> {
        self.wait(
            templates::wait_for_attribute_by_selector_all(self.id(), selector, name, value, when),
            options,
        )
        .await
    }

    pub async fn wait_for_style(
        &self,
        name: &str,
        value: &Value,
        when: WaitEvent,
        options: Option<WaitOptions>,
    ) -> Result<()> {
        self.wait(
            templates::wait_for_style(self.id(), name, value, when),
            options,
        )
        .await
    }

    pub async fn wait_for_style_by_selector(
        &self,
        selector: &QuerySelector,
        name: &str,
        value: &Value,
        when: WaitEvent,
        options: Option<WaitOptions>,
    ) -> Result<()> {
        self.wait(
            templates::wait_for_style_by_selector(self.id(), selector, name, value, when),
            options,
        )
        .await
    }

    pub async fn wait_for_style_by_selector_all(
        &self,
        selector: &QuerySelector,
        name: &str,
        value: &Value,
        when: WaitEvent,
        options: Option<WaitOptions>,
    ) -> Result<()> {
        self.wait(
            templates::wait_for_style_by_selector_all(self.id(), selector, name, value, when),
            options,
        )
        .await
    }
}

impl PartialEq for ElementHandle {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for ElementHandle {}

impl Hash for ElementHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.id.hash(state);
    }
}

impl fmt::Debug for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementHandle")
            .field("id", &self.inner.id)
            .field("frame_id", self.frame_id())
            .finish()
    }
}

fn expect_int(value: Value, what: &str) -> Result<i64> {
    value
        .as_i64()
        .ok_or_else(|| Error::Protocol(format!("{} is not an integer: {}", what, value.to_text())))
}

fn expect_count(value: Value, what: &str) -> Result<usize> {
    let n = expect_int(value, what)?;
    usize::try_from(n).map_err(|_| Error::Protocol(format!("{} is negative: {}", what, n)))
}

fn into_optional_string(value: Value) -> Option<String> {
    match value {
        Value::None => None,
        other => Some(other.to_text()),
    }
}

fn into_string_list(value: Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().map(Value::to_text).collect(),
        Value::None => Vec::new(),
        other => vec![other.to_text()],
    }
}

fn into_string_map(value: Value) -> BTreeMap<String, String> {
    match value {
        Value::Object(map) => map.into_iter().map(|(k, v)| (k, v.to_text())).collect(),
        _ => BTreeMap::new(),
    }
}
