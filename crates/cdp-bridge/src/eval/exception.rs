// Translation of remote exceptions into crate errors

use crate::error::{Error, NOT_FOUND_MARKER, Result};
use crate::server::types::ExceptionDetails;

/// Maps an exception descriptor returned alongside a result into an error.
///
/// A description containing [`NOT_FOUND_MARKER`] becomes [`Error::NotFound`];
/// anything else becomes [`Error::Unexpected`] carrying the description.
pub(crate) fn check(details: Option<&ExceptionDetails>) -> Result<()> {
    match details {
        None => Ok(()),
        Some(details) => Err(classify(details)),
    }
}

pub(crate) fn classify(details: &ExceptionDetails) -> Error {
    let description = details.description();

    if description.contains(NOT_FOUND_MARKER) {
        return Error::NotFound;
    }

    Error::Unexpected(description.to_string())
}
