use crate::eval::Expression;
use crate::server::types::RemoteObjectId;

const GET_PARENT: &str = "(el) => el.parentElement";

const GET_PREVIOUS_ELEMENT_SIBLING: &str = "(el) => el.previousElementSibling";

const GET_NEXT_ELEMENT_SIBLING: &str = "(el) => el.nextElementSibling";

pub fn get_parent(id: &RemoteObjectId) -> Expression {
    Expression::new(GET_PARENT).arg_ref(id.clone())
}

pub fn get_previous_element_sibling(id: &RemoteObjectId) -> Expression {
    Expression::new(GET_PREVIOUS_ELEMENT_SIBLING).arg_ref(id.clone())
}

pub fn get_next_element_sibling(id: &RemoteObjectId) -> Expression {
    Expression::new(GET_NEXT_ELEMENT_SIBLING).arg_ref(id.clone())
}
