// gate records and the two-symbol program parser

use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::Path;

use itertools::Itertools;
use log::{debug, info};

use crate::config::Vocabulary;
use crate::error::{ParseCause, QselError, Result};

/// A qubit as written in the program text. Not necessarily contiguous.
pub type QubitId = u64;

/// Gate kind inferred from the two header tokens of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GateKind {
    H,
    Cp,
    M,
}

impl GateKind {
    /// (p0, p0) is H, (p1, p1) is CP, any mixed header is M.
    pub fn from_header(first_is_p1: bool, second_is_p1: bool) -> Self {
        match (first_is_p1, second_is_p1) {
            (false, false) => GateKind::H,
            (true, true) => GateKind::Cp,
            _ => GateKind::M,
        }
    }

    pub fn arity(self) -> usize {
        match self {
            GateKind::H | GateKind::M => 1,
            GateKind::Cp => 2,
        }
    }
}

impl fmt::Display for GateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GateKind::H => "H",
            GateKind::Cp => "CP",
            GateKind::M => "M",
        };
        f.write_str(name)
    }
}

/// One gate of a program.
///
/// `Q` is the qubit addressing: [`QubitId`] straight out of the parser,
/// `usize` dense indices once the program has been mapped onto a register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gate<Q> {
    /// Hadamard.
    H(Q),
    /// Controlled phase of 90 degrees. Symmetric in its operands.
    Cp(Q, Q),
    /// Measurement in the computational basis.
    M(Q),
}

impl Gate<QubitId> {
    /// Build a gate of `kind`, rejecting a qubit list of the wrong length.
    pub fn from_qubits(kind: GateKind, qubits: &[QubitId]) -> std::result::Result<Self, ParseCause> {
        if qubits.len() != kind.arity() {
            return Err(ParseCause::Arity {
                gate: kind,
                expected: kind.arity(),
                found: qubits.len(),
            });
        }
        match kind {
            GateKind::H => Ok(Gate::H(qubits[0])),
            GateKind::M => Ok(Gate::M(qubits[0])),
            GateKind::Cp if qubits[0] == qubits[1] => {
                Err(ParseCause::RepeatedQubit { qubit: qubits[0] })
            }
            GateKind::Cp => Ok(Gate::Cp(qubits[0], qubits[1])),
        }
    }
}

impl<Q: Copy> Gate<Q> {
    pub fn kind(&self) -> GateKind {
        match self {
            Gate::H(_) => GateKind::H,
            Gate::Cp(_, _) => GateKind::Cp,
            Gate::M(_) => GateKind::M,
        }
    }

    pub fn qubits(&self) -> Vec<Q> {
        match *self {
            Gate::H(q) | Gate::M(q) => vec![q],
            Gate::Cp(a, b) => vec![a, b],
        }
    }

    /// Re-address the gate's qubits, e.g. from identifiers to dense indices.
    pub fn try_map<R, E>(self, mut f: impl FnMut(Q) -> std::result::Result<R, E>) -> std::result::Result<Gate<R>, E> {
        Ok(match self {
            Gate::H(q) => Gate::H(f(q)?),
            Gate::Cp(a, b) => Gate::Cp(f(a)?, f(b)?),
            Gate::M(q) => Gate::M(f(q)?),
        })
    }
}

impl<Q: fmt::Display> fmt::Display for Gate<Q> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gate::H(q) => write!(f, "H({})", q),
            Gate::Cp(a, b) => write!(f, "CP({}, {})", a, b),
            Gate::M(q) => write!(f, "M({})", q),
        }
    }
}

/// Gates in declaration order, plus every qubit identifier they touch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    gates: Vec<Gate<QubitId>>,
    qubits: BTreeSet<QubitId>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, gate: Gate<QubitId>) {
        self.qubits.extend(gate.qubits());
        self.gates.push(gate);
    }

    pub fn gates(&self) -> &[Gate<QubitId>] {
        &self.gates
    }

    /// Distinct identifiers, ascending.
    pub fn qubits(&self) -> &BTreeSet<QubitId> {
        &self.qubits
    }

    pub fn len(&self) -> usize {
        self.gates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }
}

impl FromIterator<Gate<QubitId>> for Program {
    fn from_iter<I: IntoIterator<Item = Gate<QubitId>>>(iter: I) -> Self {
        let mut program = Program::new();
        for gate in iter {
            program.push(gate);
        }
        program
    }
}

fn vocabulary_error(vocab: &Vocabulary, found: &str) -> ParseCause {
    ParseCause::Vocabulary {
        p0: vocab.p0().to_string(),
        p1: vocab.p1().to_string(),
        found: found.to_string(),
    }
}

fn parse_binary_run(run: &str) -> std::result::Result<QubitId, ParseCause> {
    if run.is_empty() {
        return Err(ParseCause::EmptyIdentifier);
    }
    // a run only ever holds '0' and '1', so the only possible failure is overflow
    QubitId::from_str_radix(run, 2).map_err(|_| ParseCause::IdentifierOverflow { digits: run.len() })
}

/// Decode the qubit part of a line into identifiers.
///
/// Tokens are read in pairs: (p0, p0) is a binary 0, (p1, p1) a binary 1 and
/// a mixed pair separates one identifier from the next.
pub fn decode_qubits(tokens: &[&str], vocab: &Vocabulary) -> std::result::Result<Vec<QubitId>, ParseCause> {
    if tokens.len() % 2 != 0 {
        return Err(ParseCause::OddQubitTokens { count: tokens.len() });
    }

    let mut qubits = Vec::new();
    let mut run = String::new();
    for (&a, &b) in tokens.iter().tuples() {
        let first = vocab.classify(a).ok_or_else(|| vocabulary_error(vocab, a))?;
        let second = vocab.classify(b).ok_or_else(|| vocabulary_error(vocab, b))?;
        match (first, second) {
            (false, false) => run.push('0'),
            (true, true) => run.push('1'),
            _ => {
                qubits.push(parse_binary_run(&run)?);
                run.clear();
            }
        }
    }
    qubits.push(parse_binary_run(&run)?);
    Ok(qubits)
}

/// Interpret one line as a gate.
pub fn parse_line(line: &str, vocab: &Vocabulary) -> std::result::Result<Gate<QubitId>, ParseCause> {
    let tokens: Vec<&str> = line.split_whitespace().collect();

    if let Some(bad) = tokens.iter().find(|t| vocab.classify(t).is_none()) {
        return Err(vocabulary_error(vocab, bad));
    }
    if tokens.len() < 4 {
        return Err(ParseCause::InsufficientTokens { count: tokens.len() });
    }

    let kind = GateKind::from_header(tokens[0] == vocab.p1(), tokens[1] == vocab.p1());
    let qubits = decode_qubits(&tokens[2..], vocab)?;
    Gate::from_qubits(kind, &qubits)
}

/// Parse a whole program. The first malformed line aborts the parse.
pub fn parse_program(source: &str, vocab: &Vocabulary) -> Result<Program> {
    let mut program = Program::new();
    // lines() strips the trailing "\n" or "\r\n" of every line
    for (idx, line) in source.lines().enumerate() {
        let gate = parse_line(line, vocab).map_err(|cause| QselError::malformed(idx + 1, cause, line))?;
        debug!("line {}: {}", idx + 1, gate);
        program.push(gate);
    }
    Ok(program)
}

pub fn parse_file(path: impl AsRef<Path>, vocab: &Vocabulary) -> Result<Program> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|e| QselError::io(path, e))?;
    let program = parse_program(&source, vocab)?;
    info!(
        "parsed {} gate(s) over {} qubit(s) from {}",
        program.len(),
        program.qubits().len(),
        path.display()
    );
    Ok(program)
}
