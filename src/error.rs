//! Error types for parsing and simulating qsel programs.

use std::path::PathBuf;

use thiserror::Error;

use crate::instructions::GateKind;

/// Result type alias used across the crate.
pub type Result<T> = std::result::Result<T, QselError>;

/// Why a single program line could not be turned into a gate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseCause {
    /// A token that is neither of the two vocabulary symbols.
    #[error("only {p0:?} and {p1:?} are allowed, found {found:?}")]
    Vocabulary {
        p0: String,
        p1: String,
        found: String,
    },

    /// Fewer than two header tokens plus one qubit pair.
    #[error("not enough tokens: need at least 4, got {count}")]
    InsufficientTokens { count: usize },

    /// Qubit tokens are consumed in pairs.
    #[error("invalid number of qubit tokens {count}, must be even")]
    OddQubitTokens { count: usize },

    /// A separator pair with no binary digits before it, or a trailing one.
    #[error("empty qubit identifier between separators")]
    EmptyIdentifier,

    #[error("qubit identifier with {digits} binary digits does not fit in 64 bits")]
    IdentifierOverflow { digits: usize },

    /// Decoded qubit count does not match the gate inferred from the header.
    #[error("{gate} gate requires {expected} qubit(s), got {found}")]
    Arity {
        gate: GateKind,
        expected: usize,
        found: usize,
    },

    #[error("CP gate requires two distinct qubits, got {qubit} twice")]
    RepeatedQubit { qubit: u64 },
}

/// Errors that can occur while configuring, parsing or running a program.
#[derive(Error, Debug)]
pub enum QselError {
    /// The first malformed line of a program. No partial program is kept.
    #[error("malformed program on line {line}: {cause}\n{text:?}")]
    MalformedProgram {
        line: usize,
        cause: ParseCause,
        text: String,
    },

    /// Wrong number of positional arguments.
    #[error(
        "command must be called with a file and optionally two tokens \
         (got {given} argument(s)): qsel <file.qsel> [<superposition token> <entanglement token>]"
    )]
    Usage { given: usize },

    /// The register would need more qubits than the configured ceiling.
    #[error("program uses {requested} qubits, more than the configured limit of {limit}")]
    RegisterTooLarge { requested: usize, limit: usize },

    /// The state vector for a register of this size could not be allocated.
    #[error("cannot allocate a {qubits}-qubit state vector")]
    OutOfMemory { qubits: usize },

    /// A gate addresses a qubit the register was not built for.
    #[error("qubit {0} is not part of the register")]
    UnmappedQubit(u64),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("numerical error: {0}")]
    Numerical(String),

    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl QselError {
    /// Create a malformed-program error for a 1-based line number.
    pub fn malformed(line: usize, cause: ParseCause, text: &str) -> Self {
        Self::MalformedProgram {
            line,
            cause,
            text: text.to_string(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// The parse cause, if this is a malformed-program error.
    pub fn cause(&self) -> Option<&ParseCause> {
        match self {
            Self::MalformedProgram { cause, .. } => Some(cause),
            _ => None,
        }
    }
}
