// SPDX-License-Identifier: MIT OR Apache-2.0
//! Method signatures used to initialize entry, event and call nodes.

use crate::pin::PinType;
use serde::{Deserialize, Serialize};

/// A named, typed parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argument {
    /// Parameter name
    pub name: String,
    /// Parameter type
    pub pin_type: PinType,
}

impl Argument {
    /// Create a new argument
    pub fn new(name: impl Into<String>, pin_type: PinType) -> Self {
        Self {
            name: name.into(),
            pin_type,
        }
    }
}

/// Method signature descriptor
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MethodInfo {
    /// Method name
    pub name: String,
    /// Ordered parameter list
    pub arguments: Vec<Argument>,
    /// Return type, `None` for void
    pub return_type: Option<PinType>,
}

impl MethodInfo {
    /// Create a void method without parameters
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: Vec::new(),
            return_type: None,
        }
    }

    /// Append a parameter
    pub fn with_argument(mut self, argument: Argument) -> Self {
        self.arguments.push(argument);
        self
    }

    /// Set the return type
    pub fn with_return(mut self, pin_type: PinType) -> Self {
        self.return_type = Some(pin_type);
        self
    }
}

/// Context handed to node creation
#[derive(Debug, Clone, Default)]
pub struct NodeInitContext {
    /// Signature for entry/result/call/event nodes
    pub method: Option<MethodInfo>,
}

impl NodeInitContext {
    /// Context carrying a method signature
    pub fn for_method(method: MethodInfo) -> Self {
        Self {
            method: Some(method),
        }
    }
}

/// Whether `name` is usable as a function name: an ASCII letter or `_`, then
/// letters, digits or `_`.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifiers() {
        assert!(is_valid_identifier("NewFunction1"));
        assert!(is_valid_identifier("_private"));
        assert!(!is_valid_identifier(""));
        assert!(!is_valid_identifier("1st"));
        assert!(!is_valid_identifier("two words"));
    }
}
