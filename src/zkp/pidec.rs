// Copyright (c) Facebook, Inc. and its affiliates.
// Modifications Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! Implements a zero-knowledge proof that a Paillier ciphertext decrypts to a
//! value consistent with a public scalar.
//!
//! In more detail, the prover knows `y` and a nonce `ρ` such that the public
//! ciphertext `C = Enc(N0, y; ρ)` and the public scalar `X = y mod q`, where
//! `q` is the order of the curve. This is `Π[dec]` from CGGMP[^cite]
//! (Figure 30 of the full version).
//!
//! The challenge absorbs, in order: the domain tag, `N0`, the verifier's
//! ring-Pedersen parameters `(N̂, s, t)`, `C`, `X`, then the commitments
//! `S`, `T`, `A` and `γ`.
//!
//! This implementation uses a standard Fiat-Shamir transformation to make the
//! proof non-interactive.
//!
//! [^cite]: Ran Canetti, Rosario Gennaro, Steven Goldfeder, Nikolaos
//! Makriyannis, and Udi Peled. UC Non-Interactive, Proactive, Threshold ECDSA
//! with Identifiable Aborts. [EPrint archive,
//! 2021](https://eprint.iacr.org/2021/060.pdf).

use crate::{
    curve::{CurveTrait, ScalarTrait},
    errors::Result,
    paillier::{Ciphertext, EncryptionKey, MaskedNonce, Nonce},
    parameters::SecurityParameters,
    ring_pedersen::{Commitment, MaskedRandomness, VerifiedRingPedersen},
    utils::{encode_bn, encode_field, random_plusminus_by_size, within_bound_by_size, ParseBytes},
    zkp::{run_checks, transcript::TranscriptProtocol, Proof, VerificationCheck},
};
use libpaillier::unknown_order::BigNumber;
use merlin::Transcript;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use tracing::instrument;
use zeroize::Zeroizing;

const TAG: &[u8] = b"PiDecProof";

/// Proof that a Paillier ciphertext decrypts to a value congruent to a
/// public scalar modulo the curve order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct PiDecProof<C: CurveTrait> {
    /// Commitment to the plaintext (`S` in the paper).
    plaintext_commit: Commitment,
    /// Commitment to the mask (`T` in the paper).
    mask_commit: Commitment,
    /// Encryption of the mask (`A` in the paper).
    mask_ciphertext: Ciphertext,
    /// The mask reduced into the scalar field (`γ` in the paper).
    mask_scalar: C::Scalar,
    /// Masked plaintext (`z1` in the paper).
    masked_plaintext: BigNumber,
    /// Masked commitment randomness (`z2` in the paper).
    masked_commit_randomness: MaskedRandomness,
    /// Masked encryption nonce (`w` in the paper).
    masked_nonce: MaskedNonce,
}

/// Public statement for [`PiDecProof`].
#[derive(Debug, Clone, Copy)]
pub struct PiDecInput<'a, C: CurveTrait> {
    /// The prover's Paillier key (`N0` in the paper).
    encryption_key: &'a EncryptionKey,
    /// The verifier's ring-Pedersen parameters (`(N̂, s, t)` in the paper).
    setup: &'a VerifiedRingPedersen,
    /// The ciphertext (`C` in the paper).
    ciphertext: &'a Ciphertext,
    /// The claimed plaintext modulo `q` (`X` in the paper).
    scalar: &'a C::Scalar,
}

impl<'a, C: CurveTrait> PiDecInput<'a, C> {
    pub fn new(
        encryption_key: &'a EncryptionKey,
        setup: &'a VerifiedRingPedersen,
        ciphertext: &'a Ciphertext,
        scalar: &'a C::Scalar,
    ) -> Self {
        Self {
            encryption_key,
            setup,
            ciphertext,
            scalar,
        }
    }
}

/// The plaintext `y` and nonce `ρ` with `C = Enc(y; ρ)`.
pub struct PiDecSecret<'a> {
    plaintext: &'a BigNumber,
    nonce: &'a Nonce,
}

impl Debug for PiDecSecret<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("pidec::PiDecSecret")
            .field("plaintext", &"[redacted]")
            .field("nonce", &"[redacted]")
            .finish()
    }
}

impl<'a> PiDecSecret<'a> {
    pub fn new(plaintext: &'a BigNumber, nonce: &'a Nonce) -> Self {
        Self { plaintext, nonce }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PiDecCheck {
    /// `z1 ∊ ±2^(ℓ+ε)`.
    ResponseInRange,
    /// `Enc(z1; w) = A ⊕ (e ⊙ C)`.
    PaillierEquation,
    /// `z1 mod q = γ + e·X`.
    ScalarEquation,
    /// `s^z1 t^z2 = T · S^e mod N̂`.
    RingPedersenEquation,
}

impl VerificationCheck for PiDecCheck {
    fn name(self) -> &'static str {
        match self {
            Self::ResponseInRange => "response in range",
            Self::PaillierEquation => "Paillier equation",
            Self::ScalarEquation => "scalar equation",
            Self::RingPedersenEquation => "ring-Pedersen equation",
        }
    }
}

const CHECKS: [PiDecCheck; 4] = [
    PiDecCheck::ResponseInRange,
    PiDecCheck::PaillierEquation,
    PiDecCheck::ScalarEquation,
    PiDecCheck::RingPedersenEquation,
];

impl<C: CurveTrait> Proof for PiDecProof<C> {
    type CommonInput<'a> = PiDecInput<'a, C>;
    type ProverSecret<'a> = PiDecSecret<'a>;

    fn prove<R: RngCore + CryptoRng>(
        input: Self::CommonInput<'_>,
        secret: Self::ProverSecret<'_>,
        params: &SecurityParameters,
        transcript: &mut Transcript,
        rng: &mut R,
    ) -> Result<Self> {
        let scheme = input.setup.scheme();

        // `α` in the paper.
        let mask = Zeroizing::new(random_plusminus_by_size(rng, params.ell_plus_epsilon()));
        // `S` and `μ`.
        let (plaintext_commit, plaintext_commit_randomness) =
            scheme.commit(secret.plaintext, params.ell(), rng)?;
        // `T` and `ν`.
        let (mask_commit, mask_commit_randomness) =
            scheme.commit(&mask, params.ell_plus_epsilon(), rng)?;
        // `A` and `r`.
        let (mask_ciphertext, mask_nonce) = input.encryption_key.encrypt(rng, &mask)?;
        // `γ`.
        let mask_scalar = C::bn_to_scalar(&mask)?;

        let challenge = Self::generate_challenge(
            transcript,
            input,
            &plaintext_commit,
            &mask_commit,
            &mask_ciphertext,
            &mask_scalar,
        )?;

        let masked_plaintext = &*mask + &challenge * secret.plaintext;
        let masked_commit_randomness =
            plaintext_commit_randomness.mask(&mask_commit_randomness, &challenge);
        let masked_nonce = input
            .encryption_key
            .mask(secret.nonce, &mask_nonce, &challenge)?;

        Ok(Self {
            plaintext_commit,
            mask_commit,
            mask_ciphertext,
            mask_scalar,
            masked_plaintext,
            masked_commit_randomness,
            masked_nonce,
        })
    }

    #[instrument(skip_all, err(Debug))]
    fn verify(
        &self,
        input: Self::CommonInput<'_>,
        params: &SecurityParameters,
        transcript: &mut Transcript,
    ) -> Result<()> {
        let challenge = Self::generate_challenge(
            transcript,
            input,
            &self.plaintext_commit,
            &self.mask_commit,
            &self.mask_ciphertext,
            &self.mask_scalar,
        )?;
        run_checks("PiDecProof", &CHECKS, |check| {
            self.evaluate(check, input, params, &challenge)
        })
    }

    fn to_bytes(&self) -> Vec<u8> {
        [
            TAG.to_vec(),
            encode_field(&self.plaintext_commit.to_bytes()),
            encode_field(&self.mask_commit.to_bytes()),
            encode_field(&self.mask_ciphertext.to_bytes()),
            encode_field(&self.mask_scalar.to_bytes()),
            encode_bn(&self.masked_plaintext),
            encode_field(&self.masked_commit_randomness.to_bytes()),
            encode_field(&self.masked_nonce.to_bytes()),
        ]
        .concat()
    }

    fn try_from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut parser = ParseBytes::new(bytes.to_vec());
        parser.take_tag(TAG)?;
        let plaintext_commit = Commitment::try_from_bytes(parser.take_field()?)?;
        let mask_commit = Commitment::try_from_bytes(parser.take_field()?)?;
        let mask_ciphertext = Ciphertext::try_from_bytes(parser.take_field()?)?;
        let mask_scalar = C::Scalar::try_from_bytes(parser.take_field()?)?;
        let masked_plaintext = parser.take_bn()?;
        let masked_commit_randomness = MaskedRandomness::try_from_bytes(parser.take_field()?)?;
        let masked_nonce = MaskedNonce::try_from_bytes(parser.take_field()?)?;
        parser.finish()?;
        Ok(Self {
            plaintext_commit,
            mask_commit,
            mask_ciphertext,
            mask_scalar,
            masked_plaintext,
            masked_commit_randomness,
            masked_nonce,
        })
    }
}

impl<C: CurveTrait> PiDecProof<C> {
    fn generate_challenge(
        transcript: &mut Transcript,
        input: PiDecInput<'_, C>,
        plaintext_commit: &Commitment,
        mask_commit: &Commitment,
        mask_ciphertext: &Ciphertext,
        mask_scalar: &C::Scalar,
    ) -> Result<BigNumber> {
        transcript.domain_sep(TAG);
        transcript.append_encryption_key(b"N0", input.encryption_key);
        transcript.append_ring_pedersen(b"(Nhat, s, t)", input.setup.scheme());
        transcript.append_ciphertext(b"C", input.ciphertext);
        transcript.append_scalar::<C>(b"X", input.scalar);
        transcript.append_commitment(b"S", plaintext_commit);
        transcript.append_commitment(b"T", mask_commit);
        transcript.append_ciphertext(b"A", mask_ciphertext);
        transcript.append_scalar::<C>(b"gamma", mask_scalar);
        transcript.positive_challenge(b"e", &C::order())
    }

    fn evaluate(
        &self,
        check: PiDecCheck,
        input: PiDecInput<'_, C>,
        params: &SecurityParameters,
        challenge: &BigNumber,
    ) -> Result<bool> {
        match check {
            PiDecCheck::ResponseInRange => Ok(within_bound_by_size(
                &self.masked_plaintext,
                params.ell_plus_epsilon(),
            )),
            PiDecCheck::PaillierEquation => {
                let lhs = input
                    .encryption_key
                    .encrypt_with_nonce(&self.masked_plaintext, &self.masked_nonce)?;
                let rhs = input.encryption_key.multiply_and_add(
                    challenge,
                    input.ciphertext,
                    &self.mask_ciphertext,
                )?;
                Ok(lhs == rhs)
            }
            PiDecCheck::ScalarEquation => {
                let lhs = C::bn_to_scalar(&self.masked_plaintext)?;
                let rhs = self
                    .mask_scalar
                    .add(&C::bn_to_scalar(challenge)?.mul(input.scalar));
                Ok(lhs == rhs)
            }
            PiDecCheck::RingPedersenEquation => input.setup.scheme().verify_masked(
                &self.masked_plaintext,
                &self.masked_commit_randomness,
                &self.mask_commit,
                &self.plaintext_commit,
                challenge,
                params,
            ),
        }
    }
}
