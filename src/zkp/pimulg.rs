// Copyright (c) Facebook, Inc. and its affiliates.
// Modifications Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! Implements a zero-knowledge proof that a Paillier ciphertext was obtained
//! by multiplying another ciphertext by the discrete log of a public point.
//!
//! In more detail, the prover knows `x ∊ ±2^ℓ` and a nonce `ρ` such that
//! `D = (x ⊙ C) · ρ^N0 mod N0²` and `X = g^x`, where `C`, `D` are public
//! Paillier ciphertexts under the prover's key `N0` and `X` is a public
//! curve point. This is `Π[mul*]` of CGGMP[^cite] (Figure 31 of the full
//! version), with `X` in the curve group.
//!
//! The challenge absorbs, in order: the domain tag, `N0`, the verifier's
//! ring-Pedersen parameters `(N̂, s, t)`, `C`, `D`, `X`, then the
//! commitments `A`, `B_x`, `E` and `S`.
//!
//! [^cite]: Ran Canetti, Rosario Gennaro, Steven Goldfeder, Nikolaos
//! Makriyannis, and Udi Peled. UC Non-Interactive, Proactive, Threshold ECDSA
//! with Identifiable Aborts. [EPrint archive,
//! 2021](https://eprint.iacr.org/2021/060.pdf).

use crate::{
    curve::CurveTrait,
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

const TAG: &[u8] = b"PiMulgProof";

/// Proof that `D = x ⊙ C` (re-randomized) for the discrete log `x` of `X`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct PiMulgProof<C: CurveTrait> {
    /// `α ⊙ C`, re-randomized (`A` in the paper).
    mask_ciphertext: Ciphertext,
    /// `g^α` (`B_x` in the paper).
    mask_point: C,
    /// Commitment to the mask (`E` in the paper).
    mask_commit: Commitment,
    /// Commitment to the secret multiplier (`S` in the paper).
    secret_commit: Commitment,
    /// `α + e·x` (`z1` in the paper).
    masked_secret: BigNumber,
    /// Masked commitment randomness (`z2` in the paper).
    masked_commit_randomness: MaskedRandomness,
    /// Masked nonce (`w` in the paper).
    masked_nonce: MaskedNonce,
}

/// Public statement for [`PiMulgProof`].
#[derive(Debug, Clone, Copy)]
pub struct PiMulgInput<'a, C: CurveTrait> {
    /// The prover's Paillier key (`N0`).
    encryption_key: &'a EncryptionKey,
    /// The verifier's ring-Pedersen parameters.
    setup: &'a VerifiedRingPedersen,
    /// The input ciphertext (`C`).
    input_ciphertext: &'a Ciphertext,
    /// The output ciphertext (`D`).
    output_ciphertext: &'a Ciphertext,
    /// The public point (`X`).
    point: &'a C,
}

impl<'a, C: CurveTrait> PiMulgInput<'a, C> {
    pub fn new(
        encryption_key: &'a EncryptionKey,
        setup: &'a VerifiedRingPedersen,
        input_ciphertext: &'a Ciphertext,
        output_ciphertext: &'a Ciphertext,
        point: &'a C,
    ) -> Self {
        Self {
            encryption_key,
            setup,
            input_ciphertext,
            output_ciphertext,
            point,
        }
    }
}

/// The multiplier `x` and the re-randomization nonce `ρ`.
pub struct PiMulgSecret<'a> {
    multiplier: &'a BigNumber,
    nonce: &'a Nonce,
}

impl Debug for PiMulgSecret<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("pimulg::PiMulgSecret")
            .field("multiplier", &"[redacted]")
            .field("nonce", &"[redacted]")
            .finish()
    }
}

impl<'a> PiMulgSecret<'a> {
    pub fn new(multiplier: &'a BigNumber, nonce: &'a Nonce) -> Self {
        Self { multiplier, nonce }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PiMulgCheck {
    /// `z1 ∊ ±2^(ℓ+ε)`.
    ResponseInRange,
    /// `C^z1 · w^N0 = A · D^e mod N0²`.
    PaillierEquation,
    /// `g^z1 = B_x + e·X`.
    GroupEquation,
    /// `s^z1 t^z2 = E · S^e mod N̂`.
    RingPedersenEquation,
}

impl VerificationCheck for PiMulgCheck {
    fn name(self) -> &'static str {
        match self {
            Self::ResponseInRange => "response in range",
            Self::PaillierEquation => "Paillier equation",
            Self::GroupEquation => "group equation",
            Self::RingPedersenEquation => "ring-Pedersen equation",
        }
    }
}

const CHECKS: [PiMulgCheck; 4] = [
    PiMulgCheck::ResponseInRange,
    PiMulgCheck::PaillierEquation,
    PiMulgCheck::GroupEquation,
    PiMulgCheck::RingPedersenEquation,
];

impl<C: CurveTrait> Proof for PiMulgProof<C> {
    type CommonInput<'a> = PiMulgInput<'a, C>;
    type ProverSecret<'a> = PiMulgSecret<'a>;

    fn prove<R: RngCore + CryptoRng>(
        input: Self::CommonInput<'_>,
        secret: Self::ProverSecret<'_>,
        params: &SecurityParameters,
        transcript: &mut Transcript,
        rng: &mut R,
    ) -> Result<Self> {
        let key = input.encryption_key;
        let scheme = input.setup.scheme();

        let mask = Zeroizing::new(random_plusminus_by_size(rng, params.ell_plus_epsilon()));
        let mask_nonce = key.random_nonce(rng)?;
        let mask_ciphertext =
            key.randomize(&key.multiply(input.input_ciphertext, &mask)?, &mask_nonce)?;
        let mask_point = C::scale_generator(&mask)?;
        let (mask_commit, mask_commit_randomness) =
            scheme.commit(&mask, params.ell_plus_epsilon(), rng)?;
        let (secret_commit, secret_commit_randomness) =
            scheme.commit(secret.multiplier, params.ell(), rng)?;

        let challenge = Self::generate_challenge(
            transcript,
            input,
            &mask_ciphertext,
            &mask_point,
            &mask_commit,
            &secret_commit,
        )?;

        let masked_secret = &*mask + &challenge * secret.multiplier;
        let masked_commit_randomness =
            secret_commit_randomness.mask(&mask_commit_randomness, &challenge);
        let masked_nonce = key.mask(secret.nonce, &mask_nonce, &challenge)?;

        Ok(Self {
            mask_ciphertext,
            mask_point,
            mask_commit,
            secret_commit,
            masked_secret,
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
            &self.mask_ciphertext,
            &self.mask_point,
            &self.mask_commit,
            &self.secret_commit,
        )?;
        run_checks("PiMulgProof", &CHECKS, |check| {
            self.evaluate(check, input, params, &challenge)
        })
    }

    fn to_bytes(&self) -> Vec<u8> {
        [
            TAG.to_vec(),
            encode_field(&self.mask_ciphertext.to_bytes()),
            encode_field(&self.mask_point.to_bytes()),
            encode_field(&self.mask_commit.to_bytes()),
            encode_field(&self.secret_commit.to_bytes()),
            encode_bn(&self.masked_secret),
            encode_field(&self.masked_commit_randomness.to_bytes()),
            encode_field(&self.masked_nonce.to_bytes()),
        ]
        .concat()
    }

    fn try_from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut parser = ParseBytes::new(bytes.to_vec());
        parser.take_tag(TAG)?;
        let mask_ciphertext = Ciphertext::try_from_bytes(parser.take_field()?)?;
        let mask_point = C::try_from_bytes(parser.take_field()?)?;
        let mask_commit = Commitment::try_from_bytes(parser.take_field()?)?;
        let secret_commit = Commitment::try_from_bytes(parser.take_field()?)?;
        let masked_secret = parser.take_bn()?;
        let masked_commit_randomness = MaskedRandomness::try_from_bytes(parser.take_field()?)?;
        let masked_nonce = MaskedNonce::try_from_bytes(parser.take_field()?)?;
        parser.finish()?;
        Ok(Self {
            mask_ciphertext,
            mask_point,
            mask_commit,
            secret_commit,
            masked_secret,
            masked_commit_randomness,
            masked_nonce,
        })
    }
}

impl<C: CurveTrait> PiMulgProof<C> {
    fn generate_challenge(
        transcript: &mut Transcript,
        input: PiMulgInput<'_, C>,
        mask_ciphertext: &Ciphertext,
        mask_point: &C,
        mask_commit: &Commitment,
        secret_commit: &Commitment,
    ) -> Result<BigNumber> {
        transcript.domain_sep(TAG);
        transcript.append_encryption_key(b"N0", input.encryption_key);
        transcript.append_ring_pedersen(b"(Nhat, s, t)", input.setup.scheme());
        transcript.append_ciphertext(b"C", input.input_ciphertext);
        transcript.append_ciphertext(b"D", input.output_ciphertext);
        transcript.append_point(b"X", input.point);
        transcript.append_ciphertext(b"A", mask_ciphertext);
        transcript.append_point(b"B_x", mask_point);
        transcript.append_commitment(b"E", mask_commit);
        transcript.append_commitment(b"S", secret_commit);
        transcript.positive_challenge(b"e", &C::order())
    }

    fn evaluate(
        &self,
        check: PiMulgCheck,
        input: PiMulgInput<'_, C>,
        params: &SecurityParameters,
        challenge: &BigNumber,
    ) -> Result<bool> {
        let key = input.encryption_key;
        match check {
            PiMulgCheck::ResponseInRange => Ok(within_bound_by_size(
                &self.masked_secret,
                params.ell_plus_epsilon(),
            )),
            PiMulgCheck::PaillierEquation => {
                let lhs = key.randomize(
                    &key.multiply(input.input_ciphertext, &self.masked_secret)?,
                    &self.masked_nonce,
                )?;
                let rhs =
                    key.multiply_and_add(challenge, input.output_ciphertext, &self.mask_ciphertext)?;
                Ok(lhs == rhs)
            }
            PiMulgCheck::GroupEquation => {
                let lhs = C::scale_generator(&self.masked_secret)?;
                let rhs = self.mask_point + input.point.mul_by_bn(challenge)?;
                Ok(lhs == rhs)
            }
            PiMulgCheck::RingPedersenEquation => input.setup.scheme().verify_masked(
                &self.masked_secret,
                &self.masked_commit_randomness,
                &self.mask_commit,
                &self.secret_commit,
                challenge,
                params,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        curve::{Secp256r1, TestCurve},
        errors::{CallerError, InternalError},
        k256::K256,
        paillier::tests::{ciphertext_from, encryption_key_from_modulus, insecure_decryption_key},
        ring_pedersen::tests::{
            commitment_from, fixed_unproven_ring_pedersen, insecure_verified_ring_pedersen,
        },
        utils::testing::{init_testing, pad_field},
    };

    fn transcript() -> Transcript {
        Transcript::new(b"PiMulgProof Test")
    }

    struct Setup<C: CurveTrait> {
        encryption_key: EncryptionKey,
        ring_pedersen: VerifiedRingPedersen,
        multiplier: BigNumber,
        nonce: Nonce,
        input_ciphertext: Ciphertext,
        output_ciphertext: Ciphertext,
        point: C,
    }

    impl<C: CurveTrait> Setup<C> {
        fn new<R: RngCore + CryptoRng>(rng: &mut R, params: &SecurityParameters) -> Self {
            let encryption_key = insecure_decryption_key(rng).encryption_key();
            let ring_pedersen = insecure_verified_ring_pedersen(rng);
            let multiplier = random_plusminus_by_size(rng, params.ell());
            let plaintext = random_plusminus_by_size(rng, params.ell());
            let (input_ciphertext, _) = encryption_key.encrypt(rng, &plaintext).unwrap();
            let nonce = encryption_key.random_nonce(rng).unwrap();
            let output_ciphertext = encryption_key
                .randomize(
                    &encryption_key
                        .multiply(&input_ciphertext, &multiplier)
                        .unwrap(),
                    &nonce,
                )
                .unwrap();
            let point = C::scale_generator(&multiplier).unwrap();
            Self {
                encryption_key,
                ring_pedersen,
                multiplier,
                nonce,
                input_ciphertext,
                output_ciphertext,
                point,
            }
        }

        fn input(&self) -> PiMulgInput<'_, C> {
            PiMulgInput::new(
                &self.encryption_key,
                &self.ring_pedersen,
                &self.input_ciphertext,
                &self.output_ciphertext,
                &self.point,
            )
        }

        fn prove<R: RngCore + CryptoRng>(
            &self,
            rng: &mut R,
            params: &SecurityParameters,
        ) -> PiMulgProof<C> {
            PiMulgProof::prove(
                self.input(),
                PiMulgSecret::new(&self.multiplier, &self.nonce),
                params,
                &mut transcript(),
                rng,
            )
            .unwrap()
        }

        fn challenge(&self, proof: &PiMulgProof<C>) -> BigNumber {
            PiMulgProof::<C>::generate_challenge(
                &mut transcript(),
                self.input(),
                &proof.mask_ciphertext,
                &proof.mask_point,
                &proof.mask_commit,
                &proof.secret_commit,
            )
            .unwrap()
        }
    }

    /// Assert that `check` passes on `good` and fails on `bad`, while every
    /// other check still passes on `bad`.
    fn only_check_fails<C: CurveTrait>(
        setup: &Setup<C>,
        params: &SecurityParameters,
        good: &PiMulgProof<C>,
        bad: &PiMulgProof<C>,
        check: PiMulgCheck,
    ) {
        let e = setup.challenge(good);
        assert!(good.evaluate(check, setup.input(), params, &e).unwrap());
        assert!(!bad.evaluate(check, setup.input(), params, &e).unwrap());
        for other in CHECKS.into_iter().filter(|c| *c != check) {
            assert!(bad.evaluate(other, setup.input(), params, &e).unwrap());
        }
        assert_eq!(
            bad.verify(setup.input(), params, &mut transcript()),
            Err(InternalError::ProtocolError)
        );
    }

    fn honest_proof_verifies<C: CurveTrait>() {
        let rng = &mut init_testing();
        let params = SecurityParameters::default();
        let setup = Setup::<C>::new(rng, &params);
        let proof = setup.prove(rng, &params);
        assert!(proof
            .verify(setup.input(), &params, &mut transcript())
            .is_ok());
    }

    #[test]
    fn honest_proof_verifies_on_both_curves() {
        honest_proof_verifies::<TestCurve>();
        honest_proof_verifies::<Secp256r1>();
    }

    #[test]
    fn proof_bytes_round_trip() {
        let rng = &mut init_testing();
        let params = SecurityParameters::default();
        let setup = Setup::<TestCurve>::new(rng, &params);
        let proof = setup.prove(rng, &params);

        let bytes = proof.to_bytes();
        let decoded = PiMulgProof::<TestCurve>::try_from_bytes(&bytes).unwrap();
        assert_eq!(decoded, proof);
        assert_eq!(decoded.to_bytes(), bytes);
        assert!(decoded
            .verify(setup.input(), &params, &mut transcript())
            .is_ok());
    }

    #[test]
    fn malformed_encodings_are_rejected() {
        let rng = &mut init_testing();
        let params = SecurityParameters::default();
        let setup = Setup::<TestCurve>::new(rng, &params);
        let bytes = setup.prove(rng, &params).to_bytes();

        assert!(PiMulgProof::<TestCurve>::try_from_bytes(&[]).is_err());
        assert!(PiMulgProof::<TestCurve>::try_from_bytes(&bytes[..bytes.len() / 2]).is_err());
        assert!(
            PiMulgProof::<TestCurve>::try_from_bytes(&[bytes.as_slice(), &[7]].concat()).is_err()
        );

        // Corrupt the SEC1 prefix of `B_x`, which follows the tag and `A`.
        let ciphertext_len = usize::from_le_bytes(
            bytes[TAG.len()..TAG.len() + 8].try_into().unwrap(),
        );
        let point_prefix = TAG.len() + 8 + ciphertext_len + 8;
        let mut bad_point = bytes.clone();
        bad_point[point_prefix] = 0x07;
        assert!(PiMulgProof::<TestCurve>::try_from_bytes(&bad_point).is_err());
    }

    /// Offset of the `index`-th length-prefixed field after the tag.
    fn field_offset(bytes: &[u8], index: usize) -> usize {
        (0..index).fold(TAG.len(), |offset, _| {
            offset + 8 + usize::from_le_bytes(bytes[offset..offset + 8].try_into().unwrap())
        })
    }

    #[test]
    fn padded_fields_are_rejected() {
        let rng = &mut init_testing();
        let params = SecurityParameters::default();
        let setup = Setup::<TestCurve>::new(rng, &params);
        let bytes = setup.prove(rng, &params).to_bytes();

        // A leading zero byte would parse to the same `A`.
        let padded_commitment = pad_field(&bytes, field_offset(&bytes, 0), 0);
        assert_eq!(
            PiMulgProof::<TestCurve>::try_from_bytes(&padded_commitment),
            Err(CallerError::DeserializationFailed.into())
        );

        // `z1` is signed; pad its magnitude after the sign byte.
        let padded_response = pad_field(&bytes, field_offset(&bytes, 4), 1);
        assert_eq!(
            PiMulgProof::<TestCurve>::try_from_bytes(&padded_response),
            Err(CallerError::DeserializationFailed.into())
        );

        // `w` is the last field.
        let last = field_offset(&bytes, 6);
        let padded_nonce = pad_field(&bytes, last, 0);
        assert!(PiMulgProof::<TestCurve>::try_from_bytes(&padded_nonce).is_err());
        assert!(PiMulgProof::<TestCurve>::try_from_bytes(&bytes).is_ok());
    }

    #[test]
    fn wrong_point_is_rejected() {
        let rng = &mut init_testing();
        let params = SecurityParameters::default();
        let setup = Setup::<TestCurve>::new(rng, &params);
        let proof = setup.prove(rng, &params);

        let other_point = setup.point + TestCurve::GENERATOR;
        let input = PiMulgInput::new(
            &setup.encryption_key,
            &setup.ring_pedersen,
            &setup.input_ciphertext,
            &setup.output_ciphertext,
            &other_point,
        );
        assert!(proof.verify(input, &params, &mut transcript()).is_err());
    }

    #[test]
    fn swapped_ciphertexts_are_rejected() {
        let rng = &mut init_testing();
        let params = SecurityParameters::default();
        let setup = Setup::<TestCurve>::new(rng, &params);
        let proof = setup.prove(rng, &params);

        let input = PiMulgInput::new(
            &setup.encryption_key,
            &setup.ring_pedersen,
            &setup.output_ciphertext,
            &setup.input_ciphertext,
            &setup.point,
        );
        assert!(proof.verify(input, &params, &mut transcript()).is_err());
    }

    #[test]
    fn wrong_witness_does_not_verify() {
        let rng = &mut init_testing();
        let params = SecurityParameters::default();
        let setup = Setup::<TestCurve>::new(rng, &params);

        let other_multiplier = &setup.multiplier + BigNumber::one();
        let proof = PiMulgProof::<TestCurve>::prove(
            setup.input(),
            PiMulgSecret::new(&other_multiplier, &setup.nonce),
            &params,
            &mut transcript(),
            rng,
        )
        .unwrap();
        assert!(proof
            .verify(setup.input(), &params, &mut transcript())
            .is_err());
    }

    #[test]
    fn proof_is_bound_to_the_transcript() {
        let rng = &mut init_testing();
        let params = SecurityParameters::default();
        let setup = Setup::<TestCurve>::new(rng, &params);
        let proof = setup.prove(rng, &params);
        let mut other = Transcript::new(b"another session");
        assert!(proof.verify(setup.input(), &params, &mut other).is_err());
    }

    #[test]
    fn challenge_matches_known_answer() {
        let encryption_key = encryption_key_from_modulus(0xF1E2_D3C4_B5A6_9787);
        let setup = fixed_unproven_ring_pedersen();
        let input_ciphertext = ciphertext_from(0x0011_2233_4455_6677);
        let output_ciphertext = ciphertext_from(0x8899_AABB_CCDD_EEFF);
        let point = K256::GENERATOR.mul_by_bn(&BigNumber::from(5u64)).unwrap();
        let input = PiMulgInput::new(
            &encryption_key,
            &setup,
            &input_ciphertext,
            &output_ciphertext,
            &point,
        );

        let e = PiMulgProof::<K256>::generate_challenge(
            &mut transcript(),
            input,
            &ciphertext_from(0x0F0F_0F0F_0F0F_0F0F),
            &K256::GENERATOR,
            &commitment_from(0x5555_AAAA_5555_AAAB),
            &commitment_from(0xAAAA_5555_AAAA_5555),
        )
        .unwrap();
        let expected = BigNumber::from_slice([
            0x6f, 0xb8, 0x61, 0xf2, 0xd4, 0xa4, 0xd1, 0x87, 0xe2, 0xcc, 0xb6, 0x05, 0xb9, 0x74,
            0x48, 0xae, 0xa1, 0xa3, 0xbb, 0x2a, 0x7b, 0x04, 0xf7, 0xcd, 0x8a, 0x60, 0x03, 0xf3,
            0xd2, 0x63, 0x96, 0xa5,
        ]);
        assert_eq!(e, expected);
    }

    #[test]
    fn challenge_is_deterministic() {
        let rng = &mut init_testing();
        let params = SecurityParameters::default();
        let setup = Setup::<TestCurve>::new(rng, &params);
        let proof = setup.prove(rng, &params);
        assert_eq!(setup.challenge(&proof), setup.challenge(&proof));
    }

    #[test]
    fn range_check_rejects_oversized_response() {
        let rng = &mut init_testing();
        let params = SecurityParameters::default();
        let setup = Setup::<TestCurve>::new(rng, &params);
        let proof = setup.prove(rng, &params);
        let e = setup.challenge(&proof);
        assert!(proof
            .evaluate(PiMulgCheck::ResponseInRange, setup.input(), &params, &e)
            .unwrap());

        let mut bad = proof.clone();
        bad.masked_secret = (BigNumber::one() << params.ell_plus_epsilon()) + BigNumber::one();
        assert!(!bad
            .evaluate(PiMulgCheck::ResponseInRange, setup.input(), &params, &e)
            .unwrap());
        assert!(bad
            .verify(setup.input(), &params, &mut transcript())
            .is_err());

        // A tighter verifier rejects an honest proof for the default range.
        let tight = SecurityParameters::new(params.ell(), 1, params.soundness()).unwrap();
        assert!(!proof
            .evaluate(PiMulgCheck::ResponseInRange, setup.input(), &tight, &e)
            .unwrap());
    }

    #[test]
    fn paillier_check_rejects_wrong_mask_ciphertext() {
        let rng = &mut init_testing();
        let params = SecurityParameters::default();
        let setup = Setup::<TestCurve>::new(rng, &params);
        let proof = setup.prove(rng, &params);

        let mut bad = proof.clone();
        bad.mask_ciphertext = setup
            .encryption_key
            .add(&proof.mask_ciphertext, &setup.input_ciphertext)
            .unwrap();
        only_check_fails(&setup, &params, &proof, &bad, PiMulgCheck::PaillierEquation);
    }

    #[test]
    fn group_check_rejects_wrong_mask_point() {
        let rng = &mut init_testing();
        let params = SecurityParameters::default();
        let setup = Setup::<TestCurve>::new(rng, &params);
        let proof = setup.prove(rng, &params);

        let mut bad = proof.clone();
        bad.mask_point = proof.mask_point + TestCurve::GENERATOR;
        only_check_fails(&setup, &params, &proof, &bad, PiMulgCheck::GroupEquation);
    }

    #[test]
    fn ring_pedersen_check_rejects_swapped_commitments() {
        let rng = &mut init_testing();
        let params = SecurityParameters::default();
        let setup = Setup::<TestCurve>::new(rng, &params);
        let proof = setup.prove(rng, &params);

        let mut bad = proof.clone();
        std::mem::swap(&mut bad.mask_commit, &mut bad.secret_commit);
        only_check_fails(
            &setup,
            &params,
            &proof,
            &bad,
            PiMulgCheck::RingPedersenEquation,
        );
    }

    #[test]
    fn perturbed_response_is_rejected() {
        let rng = &mut init_testing();
        let params = SecurityParameters::default();
        let setup = Setup::<TestCurve>::new(rng, &params);
        let proof = setup.prove(rng, &params);

        let mut bad = proof.clone();
        bad.masked_secret = &proof.masked_secret - BigNumber::one();
        assert!(bad
            .verify(setup.input(), &params, &mut transcript())
            .is_err());

        let mut bad = proof;
        bad.masked_commit_randomness = MaskedRandomness::try_from_bytes(&[0, 1]).unwrap();
        assert!(bad
            .verify(setup.input(), &params, &mut transcript())
            .is_err());
    }
}
