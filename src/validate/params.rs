//! Required-parameter validation against the registry's declared specs.
//!
//! Advisory only: a node failing these checks still converts with a
//! best-effort placeholder value for the missing field.

use crate::convert::ConverterRegistry;
use crate::error::ConvertError;
use crate::graph::types::Workflow;

pub fn validate_params(workflow: &Workflow, registry: &ConverterRegistry) -> Vec<ConvertError> {
    let mut errors = Vec::new();

    for node in &workflow.nodes {
        // Unknown types are handled by dispatch (placeholder + warning),
        // not here.
        let Some(converter) = registry.get(&node.node_type) else {
            continue;
        };

        for spec in converter.required_parameters() {
            match node.param(spec.name) {
                None => errors.push(ConvertError::MissingParameter {
                    node_id: node.id.clone(),
                    name: spec.name.to_string(),
                }),
                Some(param) if param.value.is_null() => {
                    errors.push(ConvertError::MissingParameter {
                        node_id: node.id.clone(),
                        name: spec.name.to_string(),
                    })
                }
                Some(param) if !spec.param_type.matches(&param.value) => {
                    errors.push(ConvertError::InvalidParameter {
                        node_id: node.id.clone(),
                        name: spec.name.to_string(),
                        expected: spec.param_type.name().to_string(),
                        actual: param.value.type_name().to_string(),
                    })
                }
                Some(_) => {}
            }
        }
    }

    errors
}
