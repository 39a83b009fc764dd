pub mod config; // vocabulary and limits
pub mod error; // crate error type
pub mod instructions; // gate records and the two-symbol parser
pub mod mapping; // identifier to dense index mapping
pub mod random; // random sources for measurement
pub mod runtime; // state vector simulation

pub use config::{SimConfig, Vocabulary};
pub use error::{ParseCause, QselError, Result};
pub use instructions::{decode_qubits, parse_file, parse_line, parse_program, Gate, GateKind, Program, QubitId};
pub use mapping::QubitMap;
pub use random::{FixedSequence, RandomSource, SeededRandom};
pub use runtime::{Measurement, QuantumState, RunReport, Simulator};
