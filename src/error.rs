//! Error types for the circuit engine.
//!
//! This module provides a unified error type [`CircuitError`] that covers
//! structural failures (capacity, parameters, unknown components) and the
//! layout document conversions. Lookups that simply find nothing are not
//! errors; they return `Option` or an empty `Vec`.

use thiserror::Error;

use crate::circuit::ComponentId;

/// Result type alias using [`CircuitError`].
pub type Result<T> = std::result::Result<T, CircuitError>;

/// Unified error type for all circuit operations.
#[derive(Error, Debug)]
pub enum CircuitError {
    // ============ Structural Errors ============
    /// Connecting more points than the component has terminals
    #[error("Component '{component}' accepts {capacity} connection(s), {requested} requested")]
    CapacityExceeded {
        component: String,
        capacity: usize,
        requested: usize,
    },

    /// Non-physical parameter value
    #[error("Invalid parameter '{param}' for {component}: {message}")]
    InvalidParameter {
        component: String,
        param: String,
        message: String,
    },

    /// Component id does not refer to a live component
    #[error("Component {id} not found in circuit")]
    ComponentNotFound { id: ComponentId },

    /// Kind-specific operation requested on a component of another kind
    #[error("Component '{component}' does not support {operation}")]
    UnsupportedOperation {
        component: String,
        operation: &'static str,
    },

    // ============ Layout Errors ============
    /// Unknown type tag in a layout document
    #[error("Unknown component type '{type_tag}'")]
    UnknownComponentType { type_tag: String },

    /// Layout document is not valid JSON for the expected shape
    #[error("Invalid layout document: {0}")]
    LayoutFormat(#[from] serde_json::Error),

    // ============ I/O Errors ============
    /// Error reading a layout file
    #[error("Failed to read layout file '{path}': {source}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl CircuitError {
    /// Create an invalid parameter error
    pub fn invalid_parameter(
        component: impl Into<String>,
        param: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            component: component.into(),
            param: param.into(),
            message: message.into(),
        }
    }

    /// Create an unsupported operation error
    pub fn unsupported(component: impl Into<String>, operation: &'static str) -> Self {
        Self::UnsupportedOperation {
            component: component.into(),
            operation,
        }
    }
}
