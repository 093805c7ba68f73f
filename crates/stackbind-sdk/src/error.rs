//! Interpreter-level faults raised by trampolines

/// Result type for trampoline execution
pub type VmResult<T> = Result<T, VmError>;

/// Result type for native entry points
pub type NativeResult<T> = Result<T, NativeError>;

/// Faults surfaced to the interpreter by a trampoline.
///
/// A trampoline never swallows these; the interpreter decides whether they
/// become script exceptions.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum VmError {
    /// The argument window reaches below the bottom of the stack
    #[error("Stack underflow: window of {window} slots at stack top {top}")]
    StackUnderflow {
        /// Requested window size
        window: usize,
        /// Stack top at the time of the call
        top: usize,
    },

    /// A null value was found where an instance is required
    #[error("Null reference: {0}")]
    NullReference(String),

    /// A slot or heap value does not satisfy the expected type
    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch {
        /// Expected type (reference string or value kind)
        expected: String,
        /// What was actually found
        got: String,
    },

    /// A reference slot points outside the live stack
    #[error("Invalid stack reference: slot {0}")]
    InvalidReference(usize),

    /// A heap-object index is not live
    #[error("Invalid heap object index: {0}")]
    InvalidObject(usize),

    /// A field ordinal is out of range for its owner
    #[error("Invalid field {field} on {owner}")]
    InvalidField {
        /// Owner description
        owner: String,
        /// Field ordinal
        field: usize,
    },

    /// A static-field reference names an unregistered type
    #[error("Unknown type id: {0}")]
    UnknownType(u32),

    /// The native method itself failed
    #[error("Native call failed: {0}")]
    Native(#[from] NativeError),

    /// The binding initializer ran twice against one registry
    #[error("Bindings already initialized for this registry")]
    AlreadyInitialized,
}

/// Errors raised by native entry points.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NativeError {
    /// Argument had the wrong shape for the native method
    #[error("Argument error: {0}")]
    ArgumentError(String),

    /// Native method panicked or otherwise aborted
    #[error("Native method aborted: {0}")]
    Aborted(String),

    /// No native entry point is bound for the invoked method
    #[error("No native entry for {0}")]
    Unbound(String),
}

impl From<String> for NativeError {
    fn from(s: String) -> Self {
        NativeError::ArgumentError(s)
    }
}

impl From<&str> for NativeError {
    fn from(s: &str) -> Self {
        NativeError::ArgumentError(s.to_string())
    }
}
