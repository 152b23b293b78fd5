use crate::eval::{Expression, Value};
use crate::server::types::RemoteObjectId;

const GET_VALUE: &str = "(el) => {
    return el.value;
}";

const SET_VALUE: &str = "(el, value) => {
    el.value = value;
}";

pub fn get_value(id: &RemoteObjectId) -> Expression {
    Expression::new(GET_VALUE).arg_ref(id.clone())
}

pub fn set_value(id: &RemoteObjectId, value: &Value) -> Expression {
    Expression::new(SET_VALUE)
        .arg_ref(id.clone())
        .arg_value(value)
}
