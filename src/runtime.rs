/*
    simulation runtime: binds a mapped program to a state vector and a random source
*/

use std::fmt;
use std::io::Write;

use log::{debug, info, warn};
use serde::Serialize;

use crate::error::{QselError, Result};
use crate::instructions::{Gate, QubitId};
use crate::mapping::QubitMap;
use crate::random::RandomSource;

pub mod quantum_state;
pub use quantum_state::{one_projector, QuantumState};

/// Outcome of one executed measurement gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Measurement {
    /// Dense register index, the one reported on stdout.
    pub qubit: usize,
    /// Identifier as written in the program.
    pub source_qubit: QubitId,
    pub outcome: u8,
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Measured {} on qubit {}.", self.outcome, self.qubit)
    }
}

/// Summary of a run, written with `--report`. Holds no amplitudes.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub num_qubits: usize,
    /// Source identifier of each dense index.
    pub qubit_map: Vec<QubitId>,
    pub gates_executed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub measurements: Vec<Measurement>,
}

/// Executes gates in order against one register.
pub struct Simulator<R: RandomSource> {
    map: QubitMap,
    state: QuantumState,
    random: R,
    executed: usize,
}

impl<R: RandomSource> Simulator<R> {
    /// Allocate the |0...0> register for `map`.
    pub fn new(map: QubitMap, random: R) -> Result<Self> {
        let state = QuantumState::try_new(map.len())?;
        info!("initialized {}-qubit register ({} amplitudes)", map.len(), state.amplitudes().len());
        Ok(Simulator {
            map,
            state,
            random,
            executed: 0,
        })
    }

    pub fn state(&self) -> &QuantumState {
        &self.state
    }

    pub fn map(&self) -> &QubitMap {
        &self.map
    }

    pub fn gates_executed(&self) -> usize {
        self.executed
    }

    /// Apply one dense gate, returning a record for measurements.
    pub fn execute(&mut self, gate: &Gate<usize>) -> Result<Option<Measurement>> {
        debug!("executing {}", gate);
        let outcome = self.state.apply(gate, &mut self.random)?;
        self.executed += 1;
        match (gate, outcome) {
            (Gate::M(q), Some(outcome)) => {
                let source_qubit = self.map.identifier(*q).ok_or(QselError::UnmappedQubit(*q as u64))?;
                Ok(Some(Measurement {
                    qubit: *q,
                    source_qubit,
                    outcome,
                }))
            }
            _ => Ok(None),
        }
    }

    /// Run every gate in order, writing one line per measurement to `sink`.
    pub fn run(&mut self, gates: &[Gate<usize>], sink: &mut dyn Write) -> Result<Vec<Measurement>> {
        let mut measurements = Vec::new();
        for gate in gates {
            if let Some(m) = self.execute(gate)? {
                writeln!(sink, "{}", m).map_err(|e| QselError::io("<output>", e))?;
                measurements.push(m);
            }
        }
        if let Err(e) = self.state.validate() {
            warn!("final state check failed: {}", e);
        }
        info!(
            "executed {} gate(s), {} measurement(s)",
            self.executed,
            measurements.len()
        );
        Ok(measurements)
    }

    pub fn report(&self, measurements: Vec<Measurement>, seed: Option<u64>) -> RunReport {
        RunReport {
            num_qubits: self.map.len(),
            qubit_map: self.map.identifiers().to_vec(),
            gates_executed: self.executed,
            seed,
            measurements,
        }
    }
}
