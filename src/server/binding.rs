//! Binding request parameters to an operation.

use super::executor::OperationInvocation;
use crate::convert::decode;
use crate::protocol::LiveTestRequest;
use crate::schema::OperationData;

/// Decode the request's parameters against `operation`.
///
/// Keys resolve to a parameter by name, then by JSON rename (both
/// case-insensitive). Unresolved keys are dropped; `__reserved` never binds.
pub fn bind_invocation(request: &LiveTestRequest, operation: &OperationData) -> OperationInvocation {
    let mut invocation = OperationInvocation {
        operation_id: operation.operation_id.clone(),
        command: operation.command.clone(),
        ..OperationInvocation::default()
    };

    for (key, value) in request.operation_params() {
        match operation.find_parameter(key) {
            Some(parameter) => {
                let decoded = decode(value, parameter.type_data.as_ref());
                invocation
                    .parameters
                    .insert(parameter.name.clone(), decoded);
            }
            None => crate::debug_event!(
                "binding",
                "dropped",
                "{}: no parameter for '{key}'",
                operation.operation_id
            ),
        }
    }

    invocation
}
