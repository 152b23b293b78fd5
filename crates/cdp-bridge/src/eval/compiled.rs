// Compiled expressions
//
// A script persisted in the target by `Runtime.compileScript`. Running it
// again reuses the same script id; the arguments are the ones inlined when
// the source expression was compiled.

use crate::eval::expression::{Expression, ReturnMode};
use crate::server::types::{ExecutionContextId, RunScriptParams, ScriptId};

#[derive(Debug, Clone, PartialEq)]
pub struct CompiledExpression {
    script_id: ScriptId,
    source: Expression,
}

impl CompiledExpression {
    pub(crate) fn new(script_id: ScriptId, source: Expression) -> Self {
        Self { script_id, source }
    }

    pub fn script_id(&self) -> &ScriptId {
        &self.script_id
    }

    /// Expression this script was compiled from.
    pub fn source(&self) -> &Expression {
        &self.source
    }

    pub(crate) fn run_params(
        &self,
        context_id: Option<ExecutionContextId>,
        returns: ReturnMode,
    ) -> RunScriptParams {
        RunScriptParams {
            script_id: self.script_id.clone(),
            execution_context_id: context_id,
            await_promise: self.source.is_async(),
            return_by_value: returns == ReturnMode::Value,
        }
    }
}
