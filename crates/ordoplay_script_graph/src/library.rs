// SPDX-License-Identifier: MIT OR Apache-2.0
//! Built-in script node library (Blueprint-like).
//!
//! Supports execution flow and data flow.

use crate::node::{NodeCategory, NodeRegistry, NodeType};
use crate::pin::{Pin, PinType, PinValue};

/// Create the script node registry
pub fn create_script_registry() -> NodeRegistry {
    let mut registry = NodeRegistry::new();

    // Flow control
    registry.register(NodeType {
        id: "branch".to_string(),
        name: "Branch".to_string(),
        category: NodeCategory::Flow,
        description: "If/else branching".to_string(),
        inputs: vec![
            Pin::exec_in(),
            Pin::input("Condition", PinType::Bool).with_default(PinValue::Bool(false)),
        ],
        outputs: vec![
            Pin::output("True", PinType::Exec),
            Pin::output("False", PinType::Exec),
        ],
        can_duplicate: true,
    });

    registry.register(NodeType {
        id: "sequence".to_string(),
        name: "Sequence".to_string(),
        category: NodeCategory::Flow,
        description: "Run each output in order".to_string(),
        inputs: vec![Pin::exec_in()],
        outputs: vec![
            Pin::output("Then 0", PinType::Exec),
            Pin::output("Then 1", PinType::Exec),
        ],
        can_duplicate: true,
    });

    // Print string (for debugging)
    registry.register(NodeType {
        id: "print_string".to_string(),
        name: "Print String".to_string(),
        category: NodeCategory::Utility,
        description: "Print a string to the console".to_string(),
        inputs: vec![
            Pin::exec_in(),
            Pin::input("String", PinType::String).with_default(PinValue::String(String::new())),
        ],
        outputs: vec![Pin::exec_out()],
        can_duplicate: true,
    });

    registry.register(NodeType {
        id: "roll_dice".to_string(),
        name: "Roll Dice".to_string(),
        category: NodeCategory::Utility,
        description: "Roll a six-sided die".to_string(),
        inputs: vec![Pin::exec_in()],
        outputs: vec![Pin::exec_out(), Pin::output("Value", PinType::Int)],
        can_duplicate: true,
    });

    registry.register(NodeType {
        id: "set_score".to_string(),
        name: "Set Score".to_string(),
        category: NodeCategory::Utility,
        description: "Store the player's score".to_string(),
        inputs: vec![Pin::exec_in(), Pin::input("Score", PinType::Int).required()],
        outputs: vec![Pin::exec_out()],
        can_duplicate: true,
    });

    // Math
    registry.register(NodeType {
        id: "add_int".to_string(),
        name: "Add (Int)".to_string(),
        category: NodeCategory::Math,
        description: "A + B".to_string(),
        inputs: vec![
            Pin::input("A", PinType::Int).with_default(PinValue::Int(0)),
            Pin::input("B", PinType::Int).with_default(PinValue::Int(0)),
        ],
        outputs: vec![Pin::output("Result", PinType::Int)],
        can_duplicate: true,
    });

    // Values
    registry.register(NodeType {
        id: "int_literal".to_string(),
        name: "Integer".to_string(),
        category: NodeCategory::Value,
        description: "Constant integer".to_string(),
        inputs: vec![],
        outputs: vec![Pin::output("Value", PinType::Int)],
        can_duplicate: true,
    });

    registry.register(NodeType {
        id: "to_string".to_string(),
        name: "To String".to_string(),
        category: NodeCategory::Value,
        description: "Convert any value to a string".to_string(),
        inputs: vec![Pin::input("Value", PinType::Any).required()],
        outputs: vec![Pin::output("String", PinType::String)],
        can_duplicate: true,
    });

    // Scene access; one per graph
    registry.register(NodeType {
        id: "scene_root".to_string(),
        name: "Get Scene Root".to_string(),
        category: NodeCategory::Scene,
        description: "The root node of the owning scene".to_string(),
        inputs: vec![],
        outputs: vec![Pin::output("Root", PinType::Object)],
        can_duplicate: false,
    });

    registry
}
