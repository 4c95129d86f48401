// SPDX-License-Identifier: MIT OR Apache-2.0
//! Script functions.

use crate::method::{Argument, MethodInfo};
use crate::node::NodeId;
use crate::pin::{Pin, PinType};
use serde::{Deserialize, Serialize};

/// A named callable backed by a function graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    /// Function name
    pub name: String,
    /// Ordered parameter list
    pub arguments: Vec<Argument>,
    /// Return type, `None` for void
    pub return_type: Option<PinType>,
    /// The entry marker node
    pub owning_node_id: NodeId,
    /// Backing function graph
    pub graph_name: String,
    /// The result marker node, if one was spawned
    pub result_node_id: Option<NodeId>,
}

impl Function {
    /// Number of parameters
    pub fn argument_count(&self) -> usize {
        self.arguments.len()
    }

    /// Whether the function returns a value
    pub fn has_return_value(&self) -> bool {
        self.return_type.is_some()
    }

    /// Signature of the function as a method descriptor
    pub fn method_info(&self) -> MethodInfo {
        MethodInfo {
            name: self.name.clone(),
            arguments: self.arguments.clone(),
            return_type: self.return_type.clone(),
        }
    }
}

/// Pin shapes for each kind of node that mirrors a signature
pub(crate) mod shapes {
    use super::*;

    pub fn entry_outputs(method: &MethodInfo) -> Vec<Pin> {
        std::iter::once(Pin::exec_out())
            .chain(
                method
                    .arguments
                    .iter()
                    .map(|a| Pin::output(a.name.clone(), a.pin_type.clone())),
            )
            .collect()
    }

    pub fn result_inputs(method: &MethodInfo) -> Vec<Pin> {
        let mut pins = vec![Pin::exec_in()];
        if let Some(ty) = &method.return_type {
            pins.push(Pin::input("return_value", ty.clone()));
        }
        pins
    }

    pub fn call_inputs(method: &MethodInfo) -> Vec<Pin> {
        std::iter::once(Pin::exec_in())
            .chain(method.arguments.iter().map(|a| {
                let pin = Pin::input(a.name.clone(), a.pin_type.clone());
                match a.pin_type.default_value() {
                    Some(value) => pin.with_default(value),
                    None => pin,
                }
            }))
            .collect()
    }

    pub fn call_outputs(method: &MethodInfo) -> Vec<Pin> {
        let mut pins = vec![Pin::exec_out()];
        if let Some(ty) = &method.return_type {
            pins.push(Pin::output("return_value", ty.clone()));
        }
        pins
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_shape_mirrors_signature() {
        let method = MethodInfo::new("Score")
            .with_argument(Argument::new("points", PinType::Int))
            .with_argument(Argument::new("label", PinType::String))
            .with_return(PinType::Bool);

        let inputs = shapes::call_inputs(&method);
        assert_eq!(inputs.len(), 3);
        assert!(inputs[0].is_execution());
        assert_eq!(inputs[1].name, "points");
        assert_eq!(inputs[2].pin_type, PinType::String);

        let outputs = shapes::call_outputs(&method);
        assert_eq!(outputs.len(), 2);
        assert_eq!(outputs[1].pin_type, PinType::Bool);
    }

    #[test]
    fn test_void_result_has_only_exec() {
        let method = MethodInfo::new("Void");
        assert_eq!(shapes::result_inputs(&method).len(), 1);
        assert_eq!(shapes::entry_outputs(&method).len(), 1);
    }
}
