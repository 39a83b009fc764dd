use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{QselError, Result};

pub const DEFAULT_SUPERPOSITION: &str = "superposition";
pub const DEFAULT_ENTANGLEMENT: &str = "entanglement";

// 2^24 amplitudes is 256 MiB of Complex64
pub const DEFAULT_MAX_QUBITS: usize = 24;
// 2^30 amplitudes is 16 GiB
pub const HARD_MAX_QUBITS: usize = 30;

/// The two symbols a program is written in.
///
/// `p0` plays the role of the binary digit 0 (and the H header), `p1` the
/// digit 1 (and the CP header).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Vocabulary {
    p0: String,
    p1: String,
}

impl Vocabulary {
    pub fn new(p0: impl Into<String>, p1: impl Into<String>) -> Result<Self> {
        let p0 = p0.into();
        let p1 = p1.into();
        for token in [&p0, &p1] {
            if token.is_empty() {
                return Err(QselError::InvalidConfig(
                    "vocabulary tokens must not be empty".to_string(),
                ));
            }
            if token.chars().any(char::is_whitespace) {
                return Err(QselError::InvalidConfig(format!(
                    "vocabulary token {:?} contains whitespace",
                    token
                )));
            }
        }
        if p0 == p1 {
            return Err(QselError::InvalidConfig(format!(
                "vocabulary tokens must differ, both are {:?}",
                p0
            )));
        }
        Ok(Vocabulary { p0, p1 })
    }

    pub fn p0(&self) -> &str {
        &self.p0
    }

    pub fn p1(&self) -> &str {
        &self.p1
    }

    /// Returns `Some(false)` for p0, `Some(true)` for p1, `None` otherwise.
    pub fn classify(&self, token: &str) -> Option<bool> {
        if token == self.p0 {
            Some(false)
        } else if token == self.p1 {
            Some(true)
        } else {
            None
        }
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Vocabulary {
            p0: DEFAULT_SUPERPOSITION.to_string(),
            p1: DEFAULT_ENTANGLEMENT.to_string(),
        }
    }
}

/// Settings for one simulation run.
///
/// Loaded from defaults, then an optional JSON file, then overridden by the
/// command line.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub superposition: String,
    pub entanglement: String,
    pub max_qubits: usize,
    /// Fixed seed for the measurement random source. `None` seeds from the clock.
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            superposition: DEFAULT_SUPERPOSITION.to_string(),
            entanglement: DEFAULT_ENTANGLEMENT.to_string(),
            max_qubits: DEFAULT_MAX_QUBITS,
            seed: None,
        }
    }
}

impl SimConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| QselError::io(path, e))?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_qubits == 0 || self.max_qubits > HARD_MAX_QUBITS {
            return Err(QselError::InvalidConfig(format!(
                "max_qubits must be between 1 and {}, got {}",
                HARD_MAX_QUBITS, self.max_qubits
            )));
        }
        self.vocabulary().map(|_| ())
    }

    pub fn vocabulary(&self) -> Result<Vocabulary> {
        Vocabulary::new(self.superposition.as_str(), self.entanglement.as_str())
    }
}

/// Positional arguments of the command line: the program file, optionally
/// followed by replacements for both vocabulary tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub tokens: Option<(String, String)>,
}

impl Invocation {
    /// Accepts exactly one or exactly three arguments. Nothing is read from
    /// disk here, so a usage error always comes before any file access.
    pub fn from_args(args: &[String]) -> Result<Self> {
        match args {
            [program] => Ok(Invocation {
                program: PathBuf::from(program),
                tokens: None,
            }),
            [program, p0, p1] => Ok(Invocation {
                program: PathBuf::from(program),
                tokens: Some((p0.clone(), p1.clone())),
            }),
            _ => Err(QselError::Usage { given: args.len() }),
        }
    }

    pub fn apply_to(&self, config: &mut SimConfig) {
        if let Some((p0, p1)) = &self.tokens {
            config.superposition = p0.clone();
            config.entanglement = p1.clone();
        }
    }
}
