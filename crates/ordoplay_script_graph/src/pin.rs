// SPDX-License-Identifier: MIT OR Apache-2.0
//! Pin definitions for node inputs/outputs.

use serde::{Deserialize, Serialize};

/// Pin direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PinDirection {
    /// Input pin
    Input,
    /// Output pin
    Output,
}

/// Type carried by a pin.
///
/// [`PinType::Exec`] marks an execution-flow pin; every other variant is a data pin.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PinType {
    /// Execution flow
    Exec,
    /// Boolean value
    Bool,
    /// Integer value
    Int,
    /// Floating point value
    Float,
    /// String value
    String,
    /// 2D vector
    Vector2,
    /// 3D vector
    Vector3,
    /// Color (RGBA)
    Color,
    /// Object reference
    Object,
    /// Any data type (for generic nodes)
    Any,
    /// Custom type
    Custom(String),
}

impl PinType {
    /// Whether this is the execution-flow type
    pub fn is_execution(&self) -> bool {
        matches!(self, Self::Exec)
    }

    /// Parse a type name as written in callback signatures (`"int"`, `"Vector2"`, ...).
    ///
    /// Unknown names become [`PinType::Custom`].
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "exec" => Self::Exec,
            "bool" => Self::Bool,
            "int" => Self::Int,
            "float" => Self::Float,
            "string" | "stringname" => Self::String,
            "vector2" => Self::Vector2,
            "vector3" => Self::Vector3,
            "color" => Self::Color,
            "object" => Self::Object,
            "variant" | "any" => Self::Any,
            _ => Self::Custom(name.trim().to_string()),
        }
    }

    /// Check if this type can connect to another type
    pub fn can_connect_to(&self, other: &PinType) -> bool {
        // Execution only ever pairs with execution
        if self.is_execution() || other.is_execution() {
            return self == other;
        }

        if matches!(self, Self::Any) || matches!(other, Self::Any) {
            return true;
        }

        if self == other {
            return true;
        }

        match (self, other) {
            (Self::Int, Self::Float) | (Self::Float, Self::Int) => true,
            (Self::Float, Self::Vector2 | Self::Vector3) => true,
            (Self::Vector2, Self::Vector3) => true,
            _ => false,
        }
    }

    /// Zero value for the type, used when a shallow duplicate resets defaults
    pub fn default_value(&self) -> Option<PinValue> {
        match self {
            Self::Bool => Some(PinValue::Bool(false)),
            Self::Int => Some(PinValue::Int(0)),
            Self::Float => Some(PinValue::Float(0.0)),
            Self::String => Some(PinValue::String(String::new())),
            Self::Vector2 => Some(PinValue::Vector2([0.0; 2])),
            Self::Vector3 => Some(PinValue::Vector3([0.0; 3])),
            Self::Color => Some(PinValue::Color([0.0, 0.0, 0.0, 1.0])),
            Self::Exec | Self::Object | Self::Any | Self::Custom(_) => None,
        }
    }
}

/// A pin on a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pin {
    /// Display name
    pub name: String,
    /// Pin direction
    pub direction: PinDirection,
    /// Pin type
    pub pin_type: PinType,
    /// Default value (for data inputs)
    pub default_value: Option<PinValue>,
    /// Whether a value must reach this pin (for data inputs)
    pub required: bool,
    /// Whether multiple wires may attach to this pin
    pub multi_connect: bool,
}

impl Pin {
    /// Create a new pin.
    ///
    /// Execution outputs and data inputs accept a single wire; execution inputs and
    /// data outputs fan in/out freely.
    pub fn new(name: impl Into<String>, pin_type: PinType, direction: PinDirection) -> Self {
        let multi_connect = match direction {
            PinDirection::Input => pin_type.is_execution(),
            PinDirection::Output => !pin_type.is_execution(),
        };
        Self {
            name: name.into(),
            direction,
            pin_type,
            default_value: None,
            required: false,
            multi_connect,
        }
    }

    /// Create a new input pin
    pub fn input(name: impl Into<String>, pin_type: PinType) -> Self {
        Self::new(name, pin_type, PinDirection::Input)
    }

    /// Create a new output pin
    pub fn output(name: impl Into<String>, pin_type: PinType) -> Self {
        Self::new(name, pin_type, PinDirection::Output)
    }

    /// Execution input named `ExecIn`
    pub fn exec_in() -> Self {
        Self::input("ExecIn", PinType::Exec)
    }

    /// Execution output named `ExecOut`
    pub fn exec_out() -> Self {
        Self::output("ExecOut", PinType::Exec)
    }

    /// Set the default value
    pub fn with_default(mut self, value: PinValue) -> Self {
        self.default_value = Some(value);
        self
    }

    /// Mark as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Whether this is an execution pin
    pub fn is_execution(&self) -> bool {
        self.pin_type.is_execution()
    }

    /// Whether this is an input pin
    pub fn is_input(&self) -> bool {
        self.direction == PinDirection::Input
    }

    /// Check if a wire from this pin to `other` is valid
    pub fn can_connect(&self, other: &Pin) -> bool {
        if self.direction == other.direction {
            return false;
        }
        self.pin_type.can_connect_to(&other.pin_type)
    }
}

/// Value that can be stored on a pin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PinValue {
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Float
    Float(f64),
    /// String
    String(String),
    /// 2D vector
    Vector2([f32; 2]),
    /// 3D vector
    Vector3([f32; 3]),
    /// Color
    Color([f32; 4]),
}

impl PinValue {
    /// Get the pin type for this value
    pub fn pin_type(&self) -> PinType {
        match self {
            Self::Bool(_) => PinType::Bool,
            Self::Int(_) => PinType::Int,
            Self::Float(_) => PinType::Float,
            Self::String(_) => PinType::String,
            Self::Vector2(_) => PinType::Vector2,
            Self::Vector3(_) => PinType::Vector3,
            Self::Color(_) => PinType::Color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exec_only_connects_to_exec() {
        assert!(PinType::Exec.can_connect_to(&PinType::Exec));
        assert!(!PinType::Exec.can_connect_to(&PinType::Any));
        assert!(!PinType::Any.can_connect_to(&PinType::Exec));
        assert!(PinType::Int.can_connect_to(&PinType::Any));
        assert!(PinType::Int.can_connect_to(&PinType::Float));
        assert!(!PinType::Int.can_connect_to(&PinType::String));
    }

    #[test]
    fn test_multi_connect_defaults() {
        assert!(!Pin::exec_out().multi_connect);
        assert!(Pin::exec_in().multi_connect);
        assert!(!Pin::input("Value", PinType::Int).multi_connect);
        assert!(Pin::output("Value", PinType::Int).multi_connect);
    }

    #[test]
    fn test_type_from_name() {
        assert_eq!(PinType::from_name("int"), PinType::Int);
        assert_eq!(PinType::from_name(" Vector2 "), PinType::Vector2);
        assert_eq!(PinType::from_name("Node3D"), PinType::Custom("Node3D".to_string()));
    }
}
