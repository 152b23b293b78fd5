use crate::eval::Expression;
use crate::server::types::RemoteObjectId;

const GET_CHILDREN: &str = "(el) => Array.from(el.children)";

const GET_CHILDREN_COUNT: &str = "(el) => el.children.length";

const GET_CHILD_BY_INDEX: &str = "(el, idx) => el.children[idx]";

pub fn get_children(id: &RemoteObjectId) -> Expression {
    Expression::new(GET_CHILDREN).arg_ref(id.clone())
}

pub fn get_children_count(id: &RemoteObjectId) -> Expression {
    Expression::new(GET_CHILDREN_COUNT).arg_ref(id.clone())
}

pub fn get_child_by_index(id: &RemoteObjectId, index: usize) -> Expression {
    Expression::new(GET_CHILD_BY_INDEX)
        .arg_ref(id.clone())
        .arg(index)
}
