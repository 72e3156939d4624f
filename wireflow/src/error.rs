use wireflow_config::{Address, Direction};
use wireflow_link::{SlotError, TypeTag};

/// Errors returned by graph wiring calls.
///
/// Every variant names the operation that failed and the endpoint it failed
/// on. Wiring never aborts; each failure comes back to the caller, who
/// decides whether to retry.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{op}: process `{process}` not found")]
    ProcessNotFound { op: &'static str, process: String },
    #[error("{op}: process `{process}` is aliased elsewhere and cannot be wired")]
    ProcessNotSettable { op: &'static str, process: String },
    #[error("{op}: process `{process}` does not have port `{port}`")]
    PortNotFound {
        op: &'static str,
        process: String,
        port: String,
    },
    #[error("connect `{endpoint}`: port direction {declared} does not allow {required}")]
    PortWrongDirection {
        endpoint: Address,
        required: Direction,
        declared: Direction,
    },
    #[error("connect `{endpoint}`: port is already attached to a different channel")]
    PortNotAssignable { endpoint: Address },
    #[error("connect `{endpoint}`: channel carries {found} but the port expects {expected}")]
    ChannelTypeMismatch {
        endpoint: Address,
        expected: TypeTag,
        found: TypeTag,
    },
    #[error("connect `{endpoint}`: channel is closed")]
    ChannelClosed { endpoint: Address },
}

impl Error {
    pub fn process_not_found(op: &'static str, process: impl Into<String>) -> Self {
        Self::ProcessNotFound {
            op,
            process: process.into(),
        }
    }

    pub fn process_not_settable(op: &'static str, process: impl Into<String>) -> Self {
        Self::ProcessNotSettable {
            op,
            process: process.into(),
        }
    }

    pub fn port_not_found(
        op: &'static str,
        process: impl Into<String>,
        port: impl Into<String>,
    ) -> Self {
        Self::PortNotFound {
            op,
            process: process.into(),
            port: port.into(),
        }
    }

    /// Wrap an attach-level refusal with the endpoint it occurred on.
    pub(crate) fn attach(endpoint: &Address, error: SlotError) -> Self {
        let endpoint = endpoint.clone();
        match error {
            SlotError::WrongDirection { required, declared } => Self::PortWrongDirection {
                endpoint,
                required,
                declared,
            },
            SlotError::NotAssignable => Self::PortNotAssignable { endpoint },
            SlotError::TypeMismatch { expected, found } => Self::ChannelTypeMismatch {
                endpoint,
                expected,
                found,
            },
            SlotError::Closed => Self::ChannelClosed { endpoint },
        }
    }
}
