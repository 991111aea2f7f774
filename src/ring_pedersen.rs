// Copyright (c) Facebook, Inc. and its affiliates.
// Modifications Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! Ring-Pedersen commitments.
//!
//! The setup consists of an RSA modulus `N = pq` and two elements `s, t ∊
//! Z*_N` with `s = t^λ mod N`. A commitment to `x` with randomness `r` is
//! `s^x t^r mod N`; both `x` and `r` may be negative.
//!
//! The party that generates the setup proves it is well formed with
//! [`Π[prm]`](crate::zkp::piprm); [`VerifiedRingPedersen`] bundles the
//! parameters with that proof, and can only be obtained by generating the
//! parameters or by verifying someone else's proof.

use crate::{
    errors::{CallerError, Result},
    parameters::{SecurityParameters, PRIME_BITS},
    utils::{
        self, bn_to_signed_bytes, is_in_z_star, random_bn_in_z_star, random_plusminus_scaled,
        random_positive_bn, CRYPTOGRAPHIC_RETRY_MAX,
    },
    zkp::{
        piprm::{PiPrmInput, PiPrmProof, PiPrmSecret},
        Proof,
    },
};
use libpaillier::unknown_order::BigNumber;
use merlin::Transcript;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use tracing::{error, instrument};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A ring-Pedersen commitment `s^x t^r mod N`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commitment(BigNumber);

impl Commitment {
    pub(crate) fn to_bytes(&self) -> Vec<u8> {
        self.0.to_bytes()
    }

    pub(crate) fn try_from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(Self(utils::bn_from_unsigned_bytes(bytes)?))
    }
}

/// The randomness `r` used to form a [`Commitment`].
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub(crate) struct CommitmentRandomness(BigNumber);

impl Debug for CommitmentRandomness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CommitmentRandomness([redacted])")
    }
}

impl CommitmentRandomness {
    /// Mask this randomness with `randomizer`: `randomizer + challenge · self`.
    pub(crate) fn mask(
        &self,
        randomizer: &CommitmentRandomness,
        challenge: &BigNumber,
    ) -> MaskedRandomness {
        MaskedRandomness(&randomizer.0 + challenge * &self.0)
    }
}

/// Commitment randomness masked by a challenge. Safe to publish.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskedRandomness(BigNumber);

impl MaskedRandomness {
    pub(crate) fn to_bytes(&self) -> Vec<u8> {
        bn_to_signed_bytes(&self.0)
    }

    pub(crate) fn try_from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(Self(utils::bn_from_signed_bytes(bytes)?))
    }
}

/// Ring-Pedersen parameters `(N, s, t)`.
///
/// These parameters carry no proof of correctness; use
/// [`VerifiedRingPedersen`] for parameters that came from another party.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RingPedersen {
    modulus: BigNumber,
    s: BigNumber,
    t: BigNumber,
}

/// The secret trapdoor of a [`RingPedersen`] setup: `λ` with `s = t^λ`, and
/// `φ(N)`.
#[derive(Zeroize, ZeroizeOnDrop)]
pub(crate) struct RingPedersenWitness {
    lambda: BigNumber,
    totient: BigNumber,
}

impl Debug for RingPedersenWitness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RingPedersenWitness")
            .field("lambda", &"[redacted]")
            .field("totient", &"[redacted]")
            .finish()
    }
}

impl RingPedersenWitness {
    pub(crate) fn lambda(&self) -> &BigNumber {
        &self.lambda
    }

    pub(crate) fn totient(&self) -> &BigNumber {
        &self.totient
    }
}

impl RingPedersen {
    /// Build parameters from raw values. No validation happens here; see
    /// [`RingPedersen::validate`].
    pub fn from_parts(modulus: BigNumber, s: BigNumber, t: BigNumber) -> Self {
        Self { modulus, s, t }
    }

    /// Generate fresh parameters over `N = pq`, returning the trapdoor too.
    pub(crate) fn from_primes<R: RngCore + CryptoRng>(
        p: &BigNumber,
        q: &BigNumber,
        rng: &mut R,
    ) -> Result<(Self, RingPedersenWitness)> {
        if p == q {
            error!("Ring-Pedersen primes must be distinct");
            Err(CallerError::BadInput)?
        }
        let modulus = p * q;
        let totient = (p - 1) * (q - 1);
        let tau = random_bn_in_z_star(rng, &modulus)?;
        let t = tau.modmul(&tau, &modulus);
        let lambda = random_positive_bn(rng, &totient);
        let s = t.modpow(&lambda, &modulus);
        let scheme = Self { modulus, s, t };
        scheme.validate()?;
        Ok((scheme, RingPedersenWitness { lambda, totient }))
    }

    /// The modulus `N`.
    pub fn modulus(&self) -> &BigNumber {
        &self.modulus
    }

    /// The commitment base for values.
    pub fn s(&self) -> &BigNumber {
        &self.s
    }

    /// The commitment base for randomness.
    pub fn t(&self) -> &BigNumber {
        &self.t
    }

    /// Check that the parameters are structurally sound: `N` is odd and
    /// larger than one, `s` and `t` lie in `Z*_N`, differ from each other,
    /// and neither is `1`.
    pub fn validate(&self) -> Result<()> {
        let one = BigNumber::one();
        if self.modulus <= one || self.modulus.nmod(&BigNumber::from(2u64)) == BigNumber::zero()
        {
            error!("Ring-Pedersen modulus must be odd and larger than one");
            Err(CallerError::BadInput)?
        }
        if !is_in_z_star(&self.s, &self.modulus) || !is_in_z_star(&self.t, &self.modulus) {
            error!("Ring-Pedersen bases must be elements of Z*_N");
            Err(CallerError::BadInput)?
        }
        if self.s == one || self.t == one || self.s == self.t {
            error!("Ring-Pedersen bases must be distinct and non-trivial");
            Err(CallerError::BadInput)?
        }
        Ok(())
    }

    /// Commit to `value` with randomness sampled from `±2^range · N`.
    pub(crate) fn commit<R: RngCore + CryptoRng>(
        &self,
        value: &BigNumber,
        range: usize,
        rng: &mut R,
    ) -> Result<(Commitment, CommitmentRandomness)> {
        let randomness =
            CommitmentRandomness(random_plusminus_scaled(rng, range, &self.modulus));
        let commitment = self.commit_with_randomness(value, &randomness)?;
        Ok((commitment, randomness))
    }

    /// Compute `s^value t^randomness mod N`.
    pub(crate) fn commit_with_randomness(
        &self,
        value: &BigNumber,
        randomness: &CommitmentRandomness,
    ) -> Result<Commitment> {
        self.pow_pair(value, &randomness.0)
    }

    /// Compute `s^value t^masked_randomness mod N` from masked proof values.
    pub(crate) fn reconstruct(
        &self,
        masked_value: &BigNumber,
        masked_randomness: &MaskedRandomness,
    ) -> Result<Commitment> {
        self.pow_pair(masked_value, &masked_randomness.0)
    }

    /// Compute `a · b^challenge mod N`.
    pub(crate) fn combine(
        &self,
        a: &Commitment,
        b: &Commitment,
        challenge: &BigNumber,
    ) -> Result<Commitment> {
        let power = utils::modpow(&b.0, challenge, &self.modulus)?;
        Ok(Commitment(a.0.modmul(&power, &self.modulus)))
    }

    /// Check the opening equation `s^z1 t^z2 == a · b^e mod N` used by the
    /// proofs, where `a` commits to the mask and `b` to the secret.
    ///
    /// `z2` must lie within the range an honest prover produces (see
    /// [`RingPedersen::masked_randomness_bound`]); anything larger is
    /// rejected before exponentiating.
    pub(crate) fn verify_masked(
        &self,
        masked_value: &BigNumber,
        masked_randomness: &MaskedRandomness,
        mask_commit: &Commitment,
        secret_commit: &Commitment,
        challenge: &BigNumber,
        params: &SecurityParameters,
    ) -> Result<bool> {
        if !is_in_z_star(&mask_commit.0, &self.modulus)
            || !is_in_z_star(&secret_commit.0, &self.modulus)
        {
            return Ok(false);
        }
        let bound = self.masked_randomness_bound(challenge, params);
        if masked_randomness.0 > bound || masked_randomness.0 < -bound {
            error!("Masked commitment randomness is out of range");
            return Ok(false);
        }
        let lhs = self.reconstruct(masked_value, masked_randomness)?;
        let rhs = self.combine(mask_commit, secret_commit, challenge)?;
        Ok(lhs == rhs)
    }

    /// `(2^(ℓ+ε) + |e|·2^ℓ) · N`: the mask randomness is drawn from
    /// `±2^(ℓ+ε)·N` and the secret randomness from `±2^ℓ·N`.
    fn masked_randomness_bound(
        &self,
        challenge: &BigNumber,
        params: &SecurityParameters,
    ) -> BigNumber {
        let challenge = if challenge < &BigNumber::zero() {
            -challenge.clone()
        } else {
            challenge.clone()
        };
        let mask_bound = BigNumber::one() << params.ell_plus_epsilon();
        let secret_bound = BigNumber::one() << params.ell();
        (mask_bound + challenge * secret_bound) * &self.modulus
    }

    fn pow_pair(&self, s_exp: &BigNumber, t_exp: &BigNumber) -> Result<Commitment> {
        let a = utils::modpow(&self.s, s_exp, &self.modulus)?;
        let b = utils::modpow(&self.t, t_exp, &self.modulus)?;
        Ok(Commitment(a.modmul(&b, &self.modulus)))
    }

    /// Canonical byte encoding used when absorbing the setup into a
    /// transcript.
    pub(crate) fn to_bytes(&self) -> Vec<u8> {
        [
            utils::encode_field(&self.modulus.to_bytes()),
            utils::encode_field(&self.s.to_bytes()),
            utils::encode_field(&self.t.to_bytes()),
        ]
        .concat()
    }
}

/// Ring-Pedersen parameters together with a valid [`PiPrmProof`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerifiedRingPedersen {
    scheme: RingPedersen,
    proof: PiPrmProof,
}

impl VerifiedRingPedersen {
    fn new_transcript() -> Transcript {
        Transcript::new(b"RingPedersenParameters")
    }

    /// Generate fresh parameters from two safe primes of [`PRIME_BITS`] bits,
    /// along with the proof that they are well formed.
    ///
    /// This is slow; expect it to take seconds.
    pub fn gen<R: RngCore + CryptoRng>(
        rng: &mut R,
        params: &SecurityParameters,
    ) -> Result<Self> {
        let p = BigNumber::safe_prime_from_rng(PRIME_BITS, rng);
        let q = std::iter::repeat_with(|| BigNumber::safe_prime_from_rng(PRIME_BITS, rng))
            .take(CRYPTOGRAPHIC_RETRY_MAX)
            .find(|q| q != &p)
            .ok_or(CallerError::RetryFailed)?;
        Self::from_primes(&p, &q, params, rng)
    }

    /// Generate parameters over `N = pq` and prove them.
    pub fn from_primes<R: RngCore + CryptoRng>(
        p: &BigNumber,
        q: &BigNumber,
        params: &SecurityParameters,
        rng: &mut R,
    ) -> Result<Self> {
        let (scheme, witness) = RingPedersen::from_primes(p, q, rng)?;
        let proof = PiPrmProof::prove(
            PiPrmInput::new(&scheme),
            PiPrmSecret::new(witness.lambda(), witness.totient()),
            params,
            &mut Self::new_transcript(),
            rng,
        )?;
        Ok(Self { scheme, proof })
    }

    /// Accept parameters from another party after checking their proof.
    #[instrument(skip_all, err(Debug))]
    pub fn extract(
        scheme: RingPedersen,
        proof: PiPrmProof,
        params: &SecurityParameters,
    ) -> Result<Self> {
        proof.verify(PiPrmInput::new(&scheme), params, &mut Self::new_transcript())?;
        Ok(Self { scheme, proof })
    }

    /// The verified parameters.
    pub fn scheme(&self) -> &RingPedersen {
        &self.scheme
    }

    /// The proof that the parameters are well formed.
    pub fn proof(&self) -> &PiPrmProof {
        &self.proof
    }
}

impl From<VerifiedRingPedersen> for (RingPedersen, PiPrmProof) {
    fn from(verified: VerifiedRingPedersen) -> Self {
        (verified.scheme, verified.proof)
    }
}
