use std::collections::BTreeSet;

use log::debug;

use crate::error::{QselError, Result};
use crate::instructions::{Gate, Program, QubitId};

/// Bijection from a program's qubit identifiers to dense register indices.
///
/// Identifiers are assigned in ascending order, so the smallest identifier
/// becomes bit 0 of the state vector index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QubitMap {
    // sorted ascending; position is the dense index
    identifiers: Vec<QubitId>,
}

impl QubitMap {
    /// Fails with [`QselError::RegisterTooLarge`] when more than `max_qubits`
    /// identifiers are in use.
    pub fn new(qubits: &BTreeSet<QubitId>, max_qubits: usize) -> Result<Self> {
        if qubits.len() > max_qubits {
            return Err(QselError::RegisterTooLarge {
                requested: qubits.len(),
                limit: max_qubits,
            });
        }
        let identifiers: Vec<QubitId> = qubits.iter().copied().collect();
        debug!("qubit map: {:?}", identifiers);
        Ok(QubitMap { identifiers })
    }

    pub fn for_program(program: &Program, max_qubits: usize) -> Result<Self> {
        Self::new(program.qubits(), max_qubits)
    }

    /// Register size n.
    pub fn len(&self) -> usize {
        self.identifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identifiers.is_empty()
    }

    pub fn dense(&self, id: QubitId) -> Option<usize> {
        self.identifiers.binary_search(&id).ok()
    }

    pub fn identifier(&self, dense: usize) -> Option<QubitId> {
        self.identifiers.get(dense).copied()
    }

    /// Identifiers in dense index order.
    pub fn identifiers(&self) -> &[QubitId] {
        &self.identifiers
    }

    pub fn map_gate(&self, gate: &Gate<QubitId>) -> Result<Gate<usize>> {
        gate.try_map(|id| self.dense(id).ok_or(QselError::UnmappedQubit(id)))
    }

    pub fn map_program(&self, program: &Program) -> Result<Vec<Gate<usize>>> {
        program.gates().iter().map(|gate| self.map_gate(gate)).collect()
    }
}
