use crate::eval::Expression;

/// Returns true once the document finished loading, null otherwise.
const DOM_READY: &str = "() => {
    if (document.readyState === 'complete') {
        return true;
    }

    return null;
}";

const GET_TITLE: &str = "() => document.title";

const GET_DOCUMENT: &str = "() => document";

const GET_URL: &str = "() => window.location.toString()";

pub fn dom_ready() -> Expression {
    Expression::new(DOM_READY)
}

pub fn get_title() -> Expression {
    Expression::new(GET_TITLE)
}

pub fn get_document() -> Expression {
    Expression::new(GET_DOCUMENT)
}

pub fn get_url() -> Expression {
    Expression::new(GET_URL)
}
