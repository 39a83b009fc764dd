use log::{debug, warn};
use num_complex::Complex64;
use rayon::prelude::*; // parallel per-amplitude loops
use std::f64::consts::FRAC_1_SQRT_2;

use crate::error::{QselError, Result};
use crate::instructions::Gate;
use crate::random::RandomSource;

// tolerance for the imaginary remainder of a probability and for the norm check
pub const PROBABILITY_EPSILON: f64 = 1e-9;

const ZERO: Complex64 = Complex64::new(0.0, 0.0);

/// The 0/1 pattern marking basis positions where qubit `index` is 1.
///
/// Period is 2^(index+1): 2^index zeros then 2^index ones, tiled
/// 2^(n-index-1) times. For n = 3, index = 1 this is [0, 0, 1, 1, 0, 0, 1, 1].
pub fn one_projector(n: usize, index: usize) -> Vec<u8> {
    let half = 1usize << index;
    let period: Vec<u8> = std::iter::repeat(0)
        .take(half)
        .chain(std::iter::repeat(1).take(half))
        .collect();
    period
        .iter()
        .copied()
        .cycle()
        .take(1usize << n)
        .collect()
}

/// Dense state vector of n qubits.
///
/// Position x holds the amplitude of the basis state whose dense qubit i
/// equals bit i of x, bit 0 being the least significant.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantumState {
    n: usize,
    amps: Vec<Complex64>,
}

impl QuantumState {
    /// |0...0>
    pub fn new(n: usize) -> Self {
        let mut amps = vec![ZERO; 1 << n];
        amps[0] = Complex64::new(1.0, 0.0);
        QuantumState { n, amps }
    }

    /// |0...0>, reporting a failed allocation instead of aborting.
    pub fn try_new(n: usize) -> Result<Self> {
        if n >= usize::BITS as usize - 4 {
            return Err(QselError::OutOfMemory { qubits: n });
        }
        let len = 1usize << n;
        let mut amps = Vec::new();
        amps.try_reserve_exact(len)
            .map_err(|_| QselError::OutOfMemory { qubits: n })?;
        amps.resize(len, ZERO);
        amps[0] = Complex64::new(1.0, 0.0);
        Ok(QuantumState { n, amps })
    }

    /// Wrap raw amplitudes. The length must be a power of two.
    pub fn from_amplitudes(amps: Vec<Complex64>) -> Result<Self> {
        if amps.is_empty() || !amps.len().is_power_of_two() {
            return Err(QselError::Numerical(format!(
                "state vector length {} is not a power of two",
                amps.len()
            )));
        }
        let n = amps.len().trailing_zeros() as usize;
        Ok(QuantumState { n, amps })
    }

    /// Computational basis state |x>.
    pub fn basis(n: usize, x: usize) -> Self {
        let mut amps = vec![ZERO; 1 << n];
        amps[x] = Complex64::new(1.0, 0.0);
        QuantumState { n, amps }
    }

    pub fn num_qubits(&self) -> usize {
        self.n
    }

    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amps
    }

    pub fn norm_sqr(&self) -> f64 {
        self.amps.par_iter().map(|a| a.norm_sqr()).sum()
    }

    pub fn probabilities(&self) -> Vec<f64> {
        self.amps.par_iter().map(|a| a.norm_sqr()).collect()
    }

    /// Rejects NaN or infinite amplitudes and a norm away from 1.
    pub fn validate(&self) -> Result<()> {
        if self.amps.par_iter().any(|a| !a.re.is_finite() || !a.im.is_finite()) {
            return Err(QselError::Numerical(
                "state vector contains NaN or infinite amplitudes".to_string(),
            ));
        }
        let norm = self.norm_sqr();
        if (norm - 1.0).abs() > PROBABILITY_EPSILON {
            return Err(QselError::Numerical(format!(
                "state vector is not normalized, norm squared {}",
                norm
            )));
        }
        Ok(())
    }

    fn check_qubit(&self, q: usize) -> Result<()> {
        if q < self.n {
            Ok(())
        } else {
            Err(QselError::Numerical(format!(
                "qubit index {} out of bounds for {}-qubit state",
                q, self.n
            )))
        }
    }

    /// new[x] = (sign * old[x] + old[x ^ mask]) / sqrt(2), sign = -1 where bit q is set.
    pub fn apply_h(&mut self, q: usize) -> Result<()> {
        self.check_qubit(q)?;
        let mask = 1 << q;
        let old_amps = &self.amps; // read-only snapshot, results go to a fresh vector
        let new_amps: Vec<Complex64> = (0..old_amps.len())
            .into_par_iter()
            .map(|i| {
                let flipped = old_amps[i ^ mask];
                if i & mask == 0 {
                    FRAC_1_SQRT_2 * (old_amps[i] + flipped)
                } else {
                    FRAC_1_SQRT_2 * (flipped - old_amps[i])
                }
            })
            .collect();
        self.amps = new_amps;
        Ok(())
    }

    /// Multiplies by i wherever both qubits are 1.
    pub fn apply_cp(&mut self, a: usize, b: usize) -> Result<()> {
        self.check_qubit(a)?;
        self.check_qubit(b)?;
        if a == b {
            return Err(QselError::Numerical(format!(
                "controlled phase needs two distinct qubits, got {} twice",
                a
            )));
        }
        let mask = (1 << a) | (1 << b);
        self.amps.par_iter_mut().enumerate().for_each(|(i, amp)| {
            if i & mask == mask {
                *amp *= Complex64::i();
            }
        });
        Ok(())
    }

    // squared weight of the q = 0 and q = 1 halves of the register, each summed
    // as a complex value; an imaginary remainder above PROBABILITY_EPSILON is an error
    fn branch_weights(&self, q: usize) -> Result<(f64, f64)> {
        self.check_qubit(q)?;
        let mask = 1usize << q;
        let (zero, one) = self
            .amps
            .par_iter()
            .enumerate()
            .map(|(x, a)| {
                let w = a * a.conj();
                if x & mask == 0 {
                    (w, ZERO)
                } else {
                    (ZERO, w)
                }
            })
            .reduce(|| (ZERO, ZERO), |(a0, a1), (b0, b1)| (a0 + b0, a1 + b1));
        for w in [zero, one] {
            if w.im.abs() > PROBABILITY_EPSILON {
                return Err(QselError::Numerical(format!(
                    "probability of qubit {} has imaginary part {}",
                    q, w.im
                )));
            }
        }
        Ok((zero.re.max(0.0), one.re.max(0.0)))
    }

    /// Probability of reading 0 on qubit `q`, clamped into [0, 1].
    pub fn prob_zero(&self, q: usize) -> Result<f64> {
        let (zero, _) = self.branch_weights(q)?;
        Ok(zero.clamp(0.0, 1.0))
    }

    /// Collapse qubit `q` using one draw from `random`, returning 0 or 1.
    ///
    /// Both branch weights are summed directly, so a branch with no amplitude
    /// is never chosen, whatever the draw. The surviving branch is divided by
    /// the square root of its own weight.
    pub fn measure(&mut self, q: usize, random: &mut dyn RandomSource) -> Result<u8> {
        let (weight0, weight1) = self.branch_weights(q)?;
        let total = weight0 + weight1;
        if total <= 0.0 || !total.is_finite() {
            return Err(QselError::Numerical(format!(
                "cannot measure qubit {}: state has total weight {}",
                q, total
            )));
        }
        let r = random.next_f64();
        let outcome = if weight1 <= 0.0 {
            0u8
        } else if weight0 <= 0.0 {
            1u8
        } else if r * total < weight0 {
            0u8
        } else {
            1u8
        };
        debug!(
            "measure qubit {}: p0 = {:.6}, r = {:.6} -> {}",
            q,
            weight0 / total,
            r,
            outcome
        );

        let norm = (if outcome == 0 { weight0 } else { weight1 }).sqrt();
        let mask = 1usize << q;
        let keep_one = outcome == 1;
        self.amps.par_iter_mut().enumerate().for_each(|(x, amp)| {
            if (x & mask != 0) == keep_one {
                *amp /= norm;
            } else {
                *amp = ZERO;
            }
        });
        Ok(outcome)
    }

    /// Apply one dense gate. Returns the outcome for measurements.
    pub fn apply(&mut self, gate: &Gate<usize>, random: &mut dyn RandomSource) -> Result<Option<u8>> {
        let outcome = match *gate {
            Gate::H(q) => {
                self.apply_h(q)?;
                None
            }
            Gate::Cp(a, b) => {
                self.apply_cp(a, b)?;
                None
            }
            Gate::M(q) => Some(self.measure(q, random)?),
        };
        // full O(2^n) pass, debug builds only
        if cfg!(debug_assertions) {
            let norm = self.norm_sqr();
            if (norm - 1.0).abs() > PROBABILITY_EPSILON {
                warn!("norm drifted to {} after {}", norm, gate);
            }
        }
        Ok(outcome)
    }
}
