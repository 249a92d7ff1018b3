use thiserror::Error;

/// Failures while converting between bytes, host values and Clarity values
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("Invalid hex: {0}")]
    InvalidHex(String),
    #[error("Unexpected end of input at byte {0}")]
    UnexpectedEof(usize),
    #[error("Unknown type prefix 0x{prefix:02x} at byte {offset}")]
    UnknownPrefix { prefix: u8, offset: usize },
    #[error("{0} trailing bytes after value")]
    TrailingBytes(usize),
    #[error("Value nesting exceeds depth {0}")]
    DepthExceeded(usize),
    #[error("Invalid UTF-8 in {0}")]
    InvalidUtf8(&'static str),
    #[error("Invalid principal: {0}")]
    InvalidPrincipal(String),
    #[error("Invalid contract name: {0}")]
    InvalidName(String),
    #[error("Expected {expected}, got {found}")]
    TypeMismatch { expected: String, found: String },
}

/// Errors surfaced by contract calls and transactions
#[derive(Error, Debug)]
pub enum ClarigenError {
    #[error("Passing `sender` is required.")]
    MissingSender,

    #[error("Contract `{0}` must have an address")]
    MissingAddress(String),

    #[error("Transaction has already been submitted")]
    DoubleSubmit,

    #[error("Function `{function}` expects {expected} arguments, got {actual}")]
    Arity {
        function: String,
        expected: usize,
        actual: usize,
    },

    #[error("Argument {position} of `{function}`: {source}")]
    TypeMismatch {
        function: String,
        position: usize,
        #[source]
        source: CodecError,
    },

    #[error("Evaluation failed: {0}")]
    Evaluation(String),

    #[error("Native provider failed: {0}")]
    Provider(String),

    #[error("Invalid ABI: {0}")]
    Abi(String),

    #[error("No method `{0}` on contract")]
    UnknownMethod(String),

    #[error("Expected transaction {expected}, got {actual}")]
    UnexpectedOutcome {
        expected: &'static str,
        actual: String,
    },

    #[error(transparent)]
    Codec(#[from] CodecError),
}

pub type Result<T, E = ClarigenError> = std::result::Result<T, E>;
