// Copyright (c) Facebook, Inc. and its affiliates.
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! Security parameter definitions.
//!
//! The default values give 80-bit statistical security and 112-bit
//! computational security (the paper claims 128-bit computational security,
//! but a 2048-bit Paillier modulus only provides 112 bits according to NIST
//! SP 800-57).
//!
//! Values are sourced from CGGMP'21[^cite], Figure 1 and Table 2.
//!
//! Unlike a set of global constants, [`SecurityParameters`] is an ordinary
//! value passed to every `prove` and `verify` call, so tests can exercise
//! reduced parameters.
//!
//! [^cite]: Ran Canetti, Rosario Gennaro, Steven Goldfeder, Nikolaos
//! Makriyannis, and Udi Peled. UC Non-Interactive, Proactive, Threshold ECDSA
//! with Identifiable Aborts. [EPrint archive,
//! 2021](https://eprint.iacr.org/2021/060.pdf).

use crate::errors::{CallerError, Result};
use serde::{Deserialize, Serialize};
use tracing::error;

/// Security parameter κ; the bit size of an elliptic curve scalar.
const SECURITY_PARAM: usize = 256;

/// Bit size of the prime factors of Paillier and ring-Pedersen moduli.
///
/// The product of two 1024-bit primes produces a 2048-bit modulus.
pub const PRIME_BITS: usize = 1024;

/// Range and repetition parameters shared by prover and verifier.
///
/// - `ell` (`ℓ`): honest secrets lie in `±2^ℓ`.
/// - `epsilon` (`ε`): the slack added to masks, so masked responses lie in
///   `±2^(ℓ+ε)`.
/// - `soundness`: number of repetitions in proofs where a cheating prover
///   guesses a one-bit challenge with probability 1/2 (`Π[prm]`); the
///   soundness error is `2^-soundness`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityParameters {
    ell: usize,
    epsilon: usize,
    soundness: usize,
}

impl Default for SecurityParameters {
    fn default() -> Self {
        Self {
            ell: SECURITY_PARAM,
            epsilon: 2 * SECURITY_PARAM,
            soundness: 80,
        }
    }
}

impl SecurityParameters {
    /// Build a custom parameter set. All values must be non-zero.
    pub fn new(ell: usize, epsilon: usize, soundness: usize) -> Result<Self> {
        if ell == 0 || epsilon == 0 || soundness == 0 {
            error!(
                "Security parameters must be non-zero (ell={}, epsilon={}, soundness={})",
                ell, epsilon, soundness
            );
            Err(CallerError::BadInput)?
        }
        Ok(Self {
            ell,
            epsilon,
            soundness,
        })
    }

    /// Bit size `ℓ` of honestly generated secrets.
    pub fn ell(&self) -> usize {
        self.ell
    }

    /// Statistical slack `ε`.
    pub fn epsilon(&self) -> usize {
        self.epsilon
    }

    /// Bit size `ℓ + ε` of the extended interval.
    pub fn ell_plus_epsilon(&self) -> usize {
        self.ell + self.epsilon
    }

    /// Number of `Π[prm]` repetitions.
    pub fn soundness(&self) -> usize {
        self.soundness
    }
}
