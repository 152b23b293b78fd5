// Wait predicate templates
//
// Every predicate returns `true` once the condition holds and `null` while it
// does not, so the wait engine keeps polling on null. The `op` argument picks
// presence (0) or absence (1) of the checked value. Checks read their own
// extra arguments through `args`.

use super::{
    CSS_QUERY_ALL_FRAGMENT, CSS_QUERY_FRAGMENT, XPATH_QUERY_ALL_FRAGMENT, XPATH_QUERY_FRAGMENT,
    function, selector_variants,
};
use crate::dom::QuerySelector;
use crate::eval::{Expression, Value};
use crate::events::WaitEvent;
use crate::server::types::RemoteObjectId;

const EXISTENCE_VERDICT: &str = "
    if (op === 0) {
        if (actual != null) {
            return true;
        }
    } else if (actual == null) {
        return true;
    }

    // null means we need to repeat
    return null;";

const EQUALITY_VERDICT: &str = "
    if (op === 0) {
        if (actual === expected) {
            return true;
        }
    } else if (actual !== expected) {
        return true;
    }

    // null means we need to repeat
    return null;";

// A missing target counts as absent
const SINGLE_MISSING_GUARD: &str = "if (found == null) { return op === 0 ? null : true; }";

const ALL_MISSING_GUARD: &str = "if (found.length === 0) { return op === 0 ? null : true; }";

const EXISTENCE_MATCH: &str = "op === 0 ? actual != null : actual == null";

const EQUALITY_MATCH: &str = "op === 0 ? actual === expected : actual !== expected";

const ELEMENT_CSS_CHECK: &str = "el.querySelector(args[0])";

const ELEMENT_ALL_CSS_CHECK: &str = "(el.querySelectorAll(args[0]).length || null)";

const CLASS_CHECK: &str = "(el.classList.contains(args[0]) || null)";

const ATTRIBUTE_CHECK: &str = "el.getAttribute(args[0])";

const STYLE_CHECK: &str = "window.getComputedStyle(el).getPropertyValue(args[0])";

#[derive(Clone, Copy)]
enum Verdict {
    Existence,
    Equality,
}

impl Verdict {
    fn single(self) -> &'static str {
        match self {
            Verdict::Existence => EXISTENCE_VERDICT,
            Verdict::Equality => EQUALITY_VERDICT,
        }
    }

    fn each(self) -> &'static str {
        match self {
            Verdict::Existence => EXISTENCE_MATCH,
            Verdict::Equality => EQUALITY_MATCH,
        }
    }
}

fn xpath_element_check() -> String {
    ["((selector) => {", XPATH_QUERY_FRAGMENT, "return found;\n})(args[0])"].concat()
}

fn xpath_element_all_check() -> String {
    [
        "((selector) => {",
        XPATH_QUERY_ALL_FRAGMENT,
        "return found.length || null;\n})(args[0])",
    ]
    .concat()
}

/// Predicate over the element itself.
fn on_element(params: &str, check: &str, verdict: Verdict) -> String {
    let actual = format!("const actual = {check}; // check");
    function(params, &[actual.as_str(), verdict.single()])
}

/// Predicate over the first selector match.
fn on_selector(selector: &QuerySelector, params: &str, check: &str, verdict: Verdict) -> Expression {
    let actual = format!("const actual = ((el) => {check})(found); // check");
    let (css, xpath) = selector_variants(
        params,
        CSS_QUERY_FRAGMENT,
        XPATH_QUERY_FRAGMENT,
        &[SINGLE_MISSING_GUARD, actual.as_str(), verdict.single()],
    );

    Expression::for_selector(selector, &css, &xpath)
}

/// Predicate that must hold for every selector match.
fn on_selector_all(
    selector: &QuerySelector,
    params: &str,
    check: &str,
    verdict: Verdict,
) -> Expression {
    let matched = format!(
        "const matched = found.filter((el) => {{\n        const actual = {check}; // check\n\n        return {};\n    }});",
        verdict.each()
    );
    let (css, xpath) = selector_variants(
        params,
        CSS_QUERY_ALL_FRAGMENT,
        XPATH_QUERY_ALL_FRAGMENT,
        &[
            ALL_MISSING_GUARD,
            matched.as_str(),
            "return matched.length === found.length ? true : null;",
        ],
    );

    Expression::for_selector(selector, &css, &xpath)
}

pub fn wait_for_element(id: &RemoteObjectId, selector: &QuerySelector, when: WaitEvent) -> Expression {
    let params = "el, op, ...args";
    let css = on_element(params, ELEMENT_CSS_CHECK, Verdict::Existence);
    let xpath = on_element(params, &xpath_element_check(), Verdict::Existence);

    Expression::for_selector(selector, &css, &xpath)
        .arg_ref(id.clone())
        .arg(when.op())
        .arg_selector(selector)
}

/// Waits until the selector matches at least one element (or none).
pub fn wait_for_element_all(
    id: &RemoteObjectId,
    selector: &QuerySelector,
    when: WaitEvent,
) -> Expression {
    let params = "el, op, ...args";
    let css = on_element(params, ELEMENT_ALL_CSS_CHECK, Verdict::Existence);
    let xpath = on_element(params, &xpath_element_all_check(), Verdict::Existence);

    Expression::for_selector(selector, &css, &xpath)
        .arg_ref(id.clone())
        .arg(when.op())
        .arg_selector(selector)
}

pub fn wait_for_class(id: &RemoteObjectId, class: &str, when: WaitEvent) -> Expression {
    Expression::new(on_element("el, op, ...args", CLASS_CHECK, Verdict::Existence))
        .arg_ref(id.clone())
        .arg(when.op())
        .arg(class)
}

pub fn wait_for_class_by_selector(
    id: &RemoteObjectId,
    selector: &QuerySelector,
    class: &str,
    when: WaitEvent,
) -> Expression {
    on_selector(selector, "el, selector, op, ...args", CLASS_CHECK, Verdict::Existence)
        .arg_ref(id.clone())
        .arg_selector(selector)
        .arg(when.op())
        .arg(class)
}

pub fn wait_for_class_by_selector_all(
    id: &RemoteObjectId,
    selector: &QuerySelector,
    class: &str,
    when: WaitEvent,
) -> Expression {
    on_selector_all(selector, "el, selector, op, ...args", CLASS_CHECK, Verdict::Existence)
        .arg_ref(id.clone())
        .arg_selector(selector)
        .arg(when.op())
        .arg(class)
}

pub fn wait_for_attribute(
    id: &RemoteObjectId,
    name: &str,
    expected: &Value,
    when: WaitEvent,
) -> Expression {
    Expression::new(on_element(
        "el, expected, op, ...args",
        ATTRIBUTE_CHECK,
        Verdict::Equality,
    ))
    .arg_ref(id.clone())
    .arg_value(expected)
    .arg(when.op())
    .arg(name)
}

pub fn wait_for_attribute_by_selector(
    id: &RemoteObjectId,
    selector: &QuerySelector,
    name: &str,
    expected: &Value,
    when: WaitEvent,
) -> Expression {
    on_selector(
        selector,
        "el, selector, expected, op, ...args",
        ATTRIBUTE_CHECK,
        Verdict::Equality,
    )
    .arg_ref(id.clone())
    .arg_selector(selector)
    .arg_value(expected)
    .arg(when.op())
    .arg(name)
}

pub fn wait_for_attribute_by_selector_all(
    id: &RemoteObjectId,
    selector: &QuerySelector,
    name: &str,
    expected: &Value,
    when: WaitEvent,
) -> Expression {
    on_selector_all(
        selector,
        "el, selector, expected, op, ...args",
        ATTRIBUTE_CHECK,
        Verdict::Equality,
    )
    .arg_ref(id.clone())
    .arg_selector(selector)
    .arg_value(expected)
    .arg(when.op())
    .arg(name)
}

pub fn wait_for_style(
    id: &RemoteObjectId,
    name: &str,
    expected: &Value,
    when: WaitEvent,
) -> Expression {
    Expression::new(on_element(
        "el, expected, op, ...args",
        STYLE_CHECK,
        Verdict::Equality,
    ))
    .arg_ref(id.clone())
    .arg_value(expected)
    .arg(when.op())
    .arg(name)
}

pub fn wait_for_style_by_selector(
    id: &RemoteObjectId,
    selector: &QuerySelector,
    name: &str,
    expected: &Value,
    when: WaitEvent,
) -> Expression {
    on_selector(
        selector,
        "el, selector, expected, op, ...args",
        STYLE_CHECK,
        Verdict::Equality,
    )
    .arg_ref(id.clone())
    .arg_selector(selector)
    .arg_value(expected)
    .arg(when.op())
    .arg(name)
}

pub fn wait_for_style_by_selector_all(
    id: &RemoteObjectId,
    selector: &QuerySelector,
    name: &str,
    expected: &Value,
    when: WaitEvent,
) -> Expression {
    on_selector_all(
        selector,
        "el, selector, expected, op, ...args",
        STYLE_CHECK,
        Verdict::Equality,
    )
    .arg_ref(id.clone())
    .arg_selector(selector)
    .arg_value(expected)
    .arg(when.op())
    .arg(name)
}
