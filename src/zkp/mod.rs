// Copyright (c) Facebook, Inc. and its affiliates.
// Modifications Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! Non-interactive zero-knowledge proofs.
//!
//! Each proof implements [`Proof`]: [`Proof::prove`] builds a proof from a
//! public statement and the prover's secret, and [`Proof::verify`] checks it
//! against the same statement. Both absorb the statement and the prover's
//! commitment into a [`Transcript`] and derive the challenge from it
//! (Fiat-Shamir), so the transcript passed to `verify` must be in the same
//! state as the one passed to `prove`.
//!
//! Verification runs a fixed, ordered list of named checks and stops at the
//! first failure. The returned error is always
//! [`InternalError::ProtocolError`]; the name of the failing check only goes
//! to the log.

pub mod pidec;
pub mod pimulg;
pub mod piprm;
pub(crate) mod transcript;

use crate::{
    errors::{InternalError, Result},
    parameters::SecurityParameters,
};
use merlin::Transcript;
use rand::{CryptoRng, RngCore};
use std::fmt::Debug;
use tracing::error;

/// A non-interactive zero-knowledge proof.
///
/// [`Proof::CommonInput`] is the statement known to both the prover and the
/// verifier; [`Proof::ProverSecret`] is the witness known only to the
/// prover. Both borrow from the caller.
pub trait Proof: Sized + Clone + Debug + PartialEq {
    type CommonInput<'a>: Copy;
    type ProverSecret<'a>;

    /// Build a proof that `secret` is a witness for `input`.
    fn prove<R: RngCore + CryptoRng>(
        input: Self::CommonInput<'_>,
        secret: Self::ProverSecret<'_>,
        params: &SecurityParameters,
        transcript: &mut Transcript,
        rng: &mut R,
    ) -> Result<Self>;

    /// Check the proof against `input`.
    fn verify(
        &self,
        input: Self::CommonInput<'_>,
        params: &SecurityParameters,
        transcript: &mut Transcript,
    ) -> Result<()>;

    /// Canonical binary encoding.
    fn to_bytes(&self) -> Vec<u8>;

    /// Parse the encoding produced by [`Proof::to_bytes`].
    fn try_from_bytes(bytes: &[u8]) -> Result<Self>;
}

/// A named verification check.
pub(crate) trait VerificationCheck: Copy + Debug {
    fn name(self) -> &'static str;
}

/// Evaluate `checks` in order, stopping at the first one that does not hold.
///
/// A check that cannot be evaluated (for example because the proof contains a
/// non-invertible element) counts as failed.
pub(crate) fn run_checks<K: VerificationCheck>(
    proof_name: &str,
    checks: &[K],
    mut evaluate: impl FnMut(K) -> Result<bool>,
) -> Result<()> {
    for &check in checks {
        match evaluate(check) {
            Ok(true) => {}
            Ok(false) => {
                error!("{proof_name}: {} check failed", check.name());
                return Err(InternalError::ProtocolError);
            }
            Err(e) => {
                error!(
                    "{proof_name}: {} check could not be evaluated ({e})",
                    check.name()
                );
                return Err(InternalError::ProtocolError);
            }
        }
    }
    Ok(())
}
