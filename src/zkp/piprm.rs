// Copyright (c) Facebook, Inc. and its affiliates.
// Modifications Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! Implements the ZKP from Figure 17 of <https://eprint.iacr.org/2021/060.pdf>
//!
//! The prover shows that ring-Pedersen parameters `(N, s, t)` are well formed,
//! that is, it knows `λ` with `s = t^λ mod N`.
//!
//! For each of `soundness` rounds the prover commits to `A_i = t^{a_i}` for a
//! random `a_i ∊ [0, φ(N))`. A challenge bit `e_i` then asks it to open either
//! `a_i` or `a_i + λ mod φ(N)`; the verifier checks `t^{Z_i} = A_i · s^{e_i}`.
//! A prover that does not know `λ` must guess every bit in advance, so the
//! soundness error is `2^-soundness`.
//!
//! Transcript order: domain tag, `(N, s, t)`, then `A_0, ..., A_{m-1}`; the
//! challenge is `m` bits.

use crate::{
    errors::{CallerError, Result},
    parameters::SecurityParameters,
    ring_pedersen::RingPedersen,
    utils::{encode_bn, is_in_z_star, random_positive_bn, ParseBytes},
    zkp::{run_checks, transcript::TranscriptProtocol, Proof, VerificationCheck},
};
use libpaillier::unknown_order::BigNumber;
use merlin::Transcript;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use tracing::{error, instrument};
use zeroize::Zeroizing;

const TAG: &[u8] = b"PiPrmProof";

/// Proof that ring-Pedersen parameters are well formed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PiPrmProof {
    /// Commitments `A_i = t^{a_i} mod N`.
    commitments: Vec<BigNumber>,
    /// Responses `Z_i`.
    responses: Vec<BigNumber>,
}

/// The ring-Pedersen parameters being proven.
#[derive(Debug, Clone, Copy)]
pub struct PiPrmInput<'a> {
    setup: &'a RingPedersen,
}

impl<'a> PiPrmInput<'a> {
    pub fn new(setup: &'a RingPedersen) -> Self {
        Self { setup }
    }
}

/// The trapdoor `λ` (with `s = t^λ`) and `φ(N)`.
pub struct PiPrmSecret<'a> {
    lambda: &'a BigNumber,
    totient: &'a BigNumber,
}

impl Debug for PiPrmSecret<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("piprm::PiPrmSecret")
            .field("lambda", &"[redacted]")
            .field("totient", &"[redacted]")
            .finish()
    }
}

impl<'a> PiPrmSecret<'a> {
    pub fn new(lambda: &'a BigNumber, totient: &'a BigNumber) -> Self {
        Self { lambda, totient }
    }
}

/// Verification checks, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PiPrmCheck {
    /// There is one commitment and one response per challenge bit.
    Lengths,
    /// Every `A_i ∊ Z*_N` and every `Z_i ∊ [0, N)`.
    ElementsInRange,
    /// The parameters pass [`RingPedersen::validate`].
    ValidSetup,
    /// No `A_i` equals `1`.
    NoTrivialCommitment,
    /// `t^{Z_i} = A_i · s^{e_i} mod N` for every round.
    Openings,
}

impl VerificationCheck for PiPrmCheck {
    fn name(self) -> &'static str {
        match self {
            Self::Lengths => "lengths",
            Self::ElementsInRange => "elements in range",
            Self::ValidSetup => "valid setup",
            Self::NoTrivialCommitment => "no trivial commitment",
            Self::Openings => "openings",
        }
    }
}

const CHECKS: [PiPrmCheck; 5] = [
    PiPrmCheck::Lengths,
    PiPrmCheck::ElementsInRange,
    PiPrmCheck::ValidSetup,
    PiPrmCheck::NoTrivialCommitment,
    PiPrmCheck::Openings,
];

impl Proof for PiPrmProof {
    type CommonInput<'a> = PiPrmInput<'a>;
    type ProverSecret<'a> = PiPrmSecret<'a>;

    fn prove<R: RngCore + CryptoRng>(
        input: Self::CommonInput<'_>,
        secret: Self::ProverSecret<'_>,
        params: &SecurityParameters,
        transcript: &mut Transcript,
        rng: &mut R,
    ) -> Result<Self> {
        if secret.totient <= &BigNumber::one() {
            error!("The totient of a ring-Pedersen modulus must exceed one");
            Err(CallerError::BadInput)?
        }
        let modulus = input.setup.modulus();

        let secret_exponents: Zeroizing<Vec<BigNumber>> = Zeroizing::new(
            std::iter::repeat_with(|| random_positive_bn(rng, secret.totient))
                .take(params.soundness())
                .collect(),
        );
        let commitments: Vec<BigNumber> = secret_exponents
            .iter()
            .map(|a| input.setup.t().modpow(a, modulus))
            .collect();

        let challenge = Self::generate_challenge(transcript, input, &commitments, params);

        let responses = secret_exponents
            .iter()
            .zip(&challenge)
            .map(|(a, e)| match e {
                true => a.modadd(secret.lambda, secret.totient),
                false => a.clone(),
            })
            .collect();

        Ok(Self {
            commitments,
            responses,
        })
    }

    #[instrument(skip_all, err(Debug))]
    fn verify(
        &self,
        input: Self::CommonInput<'_>,
        params: &SecurityParameters,
        transcript: &mut Transcript,
    ) -> Result<()> {
        let challenge = Self::generate_challenge(transcript, input, &self.commitments, params);
        run_checks("PiPrmProof", &CHECKS, |check| {
            self.evaluate(check, input, params, &challenge)
        })
    }

    fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = TAG.to_vec();
        for values in [&self.commitments, &self.responses] {
            bytes.extend(values.len().to_le_bytes());
            for value in values {
                bytes.extend(encode_bn(value));
            }
        }
        bytes
    }

    fn try_from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut parser = ParseBytes::new(bytes.to_vec());
        parser.take_tag(TAG)?;
        let commitments = take_bn_vec(&mut parser)?;
        let responses = take_bn_vec(&mut parser)?;
        parser.finish()?;
        Ok(Self {
            commitments,
            responses,
        })
    }
}

fn take_bn_vec(parser: &mut ParseBytes) -> Result<Vec<BigNumber>> {
    let count = parser.take_len()?;
    // `count` is attacker-controlled; grow the vector only as entries parse.
    let mut values = Vec::new();
    for _ in 0..count {
        values.push(parser.take_bn()?);
    }
    Ok(values)
}

impl PiPrmProof {
    fn generate_challenge(
        transcript: &mut Transcript,
        input: PiPrmInput<'_>,
        commitments: &[BigNumber],
        params: &SecurityParameters,
    ) -> Vec<bool> {
        transcript.domain_sep(TAG);
        transcript.append_ring_pedersen(b"(N, s, t)", input.setup);
        for commitment in commitments {
            transcript.append_bn(b"A_i", commitment);
        }
        transcript.bit_challenge(b"e", params.soundness())
    }

    fn evaluate(
        &self,
        check: PiPrmCheck,
        input: PiPrmInput<'_>,
        params: &SecurityParameters,
        challenge: &[bool],
    ) -> Result<bool> {
        let setup = input.setup;
        let modulus = setup.modulus();
        Ok(match check {
            PiPrmCheck::Lengths => {
                self.commitments.len() == params.soundness()
                    && self.responses.len() == params.soundness()
                    && challenge.len() == params.soundness()
            }
            PiPrmCheck::ElementsInRange => {
                self.commitments.iter().all(|a| is_in_z_star(a, modulus))
                    && self
                        .responses
                        .iter()
                        .all(|z| z >= &BigNumber::zero() && z < modulus)
            }
            PiPrmCheck::ValidSetup => setup.validate().is_ok(),
            PiPrmCheck::NoTrivialCommitment => {
                self.commitments.iter().all(|a| a != &BigNumber::one())
            }
            PiPrmCheck::Openings => self
                .commitments
                .iter()
                .zip(&self.responses)
                .zip(challenge)
                .all(|((a, z), e)| {
                    let lhs = setup.t().modpow(z, modulus);
                    let rhs = match e {
                        true => a.modmul(setup.s(), modulus),
                        false => a.clone(),
                    };
                    lhs == rhs
                }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        errors::InternalError,
        ring_pedersen::tests::{fixed_ring_pedersen, insecure_ring_pedersen},
        utils::{
            random_bn_in_z_star,
            testing::{init_testing, pad_field},
        },
    };
    use rand::Rng;

    fn transcript() -> Transcript {
        Transcript::new(b"PiPrmProof Test")
    }

    fn honest_proof<R: RngCore + CryptoRng>(
        rng: &mut R,
        params: &SecurityParameters,
    ) -> (RingPedersen, PiPrmProof) {
        let (setup, witness) = insecure_ring_pedersen(rng);
        let proof = PiPrmProof::prove(
            PiPrmInput::new(&setup),
            PiPrmSecret::new(witness.lambda(), witness.totient()),
            params,
            &mut transcript(),
            rng,
        )
        .unwrap();
        (setup, proof)
    }

    fn challenge_for(
        proof: &PiPrmProof,
        setup: &RingPedersen,
        params: &SecurityParameters,
    ) -> Vec<bool> {
        PiPrmProof::generate_challenge(
            &mut transcript(),
            PiPrmInput::new(setup),
            &proof.commitments,
            params,
        )
    }

    /// A prover without `λ` who commits to a guessed challenge: `A_i = t^z`
    /// for a guessed 0 bit and `A_i = t^z · s^-1` for a guessed 1 bit.
    fn cheating_proof<R: RngCore + CryptoRng>(
        rng: &mut R,
        setup: &RingPedersen,
        guess: &[bool],
    ) -> PiPrmProof {
        let modulus = setup.modulus();
        let s_inverse = setup.s().invert(modulus).unwrap();
        let (commitments, responses): (Vec<BigNumber>, Vec<BigNumber>) = guess
            .iter()
            .map(|bit| {
                let z = random_positive_bn(rng, modulus);
                let t_z = setup.t().modpow(&z, modulus);
                let a = match bit {
                    true => t_z.modmul(&s_inverse, modulus),
                    false => t_z,
                };
                (a, z)
            })
            .unzip();
        PiPrmProof {
            commitments,
            responses,
        }
    }

    #[test]
    fn honest_proof_verifies() {
        let rng = &mut init_testing();
        let params = SecurityParameters::default();
        let (setup, proof) = honest_proof(rng, &params);
        assert!(proof
            .verify(PiPrmInput::new(&setup), &params, &mut transcript())
            .is_ok());
    }

    #[test]
    fn proof_bytes_round_trip() {
        let rng = &mut init_testing();
        let params = SecurityParameters::default();
        let (setup, proof) = honest_proof(rng, &params);

        let bytes = proof.to_bytes();
        let decoded = PiPrmProof::try_from_bytes(&bytes).unwrap();
        assert_eq!(decoded, proof);
        assert_eq!(decoded.to_bytes(), bytes);
        assert!(decoded
            .verify(PiPrmInput::new(&setup), &params, &mut transcript())
            .is_ok());
    }

    #[test]
    fn malformed_encodings_are_rejected() {
        let rng = &mut init_testing();
        let params = SecurityParameters::new(256, 512, 8).unwrap();
        let (_, proof) = honest_proof(rng, &params);
        let bytes = proof.to_bytes();

        assert!(PiPrmProof::try_from_bytes(&[]).is_err());
        assert!(PiPrmProof::try_from_bytes(&bytes[..bytes.len() - 1]).is_err());
        assert!(PiPrmProof::try_from_bytes(&[bytes.as_slice(), &[0]].concat()).is_err());

        let mut bad_tag = bytes.clone();
        bad_tag[0] ^= 1;
        assert!(PiPrmProof::try_from_bytes(&bad_tag).is_err());

        // Claim far more commitments than the input holds.
        let mut bad_count = bytes.clone();
        bad_count[TAG.len()..TAG.len() + 8].copy_from_slice(&u64::MAX.to_le_bytes());
        assert_eq!(
            PiPrmProof::try_from_bytes(&bad_count),
            Err(CallerError::DeserializationFailed.into())
        );
    }

    #[test]
    fn challenge_matches_known_answer() {
        let params = SecurityParameters::new(256, 512, 8).unwrap();
        let setup = fixed_ring_pedersen();
        let commitments: Vec<BigNumber> = (2..10u64).map(BigNumber::from).collect();
        assert_eq!(
            PiPrmProof::generate_challenge(
                &mut transcript(),
                PiPrmInput::new(&setup),
                &commitments,
                &params,
            ),
            [false, true, true, false, true, false, true, true]
        );
    }

    #[test]
    fn padded_commitments_are_rejected() {
        let rng = &mut init_testing();
        let params = SecurityParameters::new(256, 512, 8).unwrap();
        let (setup, proof) = honest_proof(rng, &params);
        let bytes = proof.to_bytes();

        // `A_0` follows the tag and the commitment count. Padding its
        // magnitude leaves the value, and so the challenge, unchanged.
        let padded = pad_field(&bytes, TAG.len() + 8, 1);
        assert_eq!(
            PiPrmProof::try_from_bytes(&padded),
            Err(CallerError::DeserializationFailed.into())
        );

        let decoded = PiPrmProof::try_from_bytes(&bytes).unwrap();
        assert_eq!(decoded.to_bytes(), bytes);
        assert!(decoded
            .verify(PiPrmInput::new(&setup), &params, &mut transcript())
            .is_ok());
    }

    #[test]
    fn proof_does_not_verify_against_other_parameters() {
        let rng = &mut init_testing();
        let params = SecurityParameters::default();
        let (_, proof) = honest_proof(rng, &params);
        let (other_setup, _) = insecure_ring_pedersen(rng);
        assert_eq!(
            proof.verify(PiPrmInput::new(&other_setup), &params, &mut transcript()),
            Err(InternalError::ProtocolError)
        );
    }

    #[test]
    fn proof_does_not_verify_with_other_transcript() {
        let rng = &mut init_testing();
        let params = SecurityParameters::default();
        let (setup, proof) = honest_proof(rng, &params);
        let mut other = Transcript::new(b"some other context");
        assert!(proof
            .verify(PiPrmInput::new(&setup), &params, &mut other)
            .is_err());
    }

    #[test]
    fn flipped_response_bit_is_rejected() {
        let rng = &mut init_testing();
        let params = SecurityParameters::default();
        let (setup, proof) = honest_proof(rng, &params);
        let index = rng.gen_range(0..params.soundness());

        let mut flipped = proof.responses[index].to_bytes();
        let last = flipped.len() - 1;
        flipped[last] ^= 1;
        let mut bad = proof.clone();
        bad.responses[index] = BigNumber::from_slice(flipped);
        assert!(bad
            .verify(PiPrmInput::new(&setup), &params, &mut transcript())
            .is_err());
    }

    #[test]
    fn lengths_check_rejects_short_proofs() {
        let rng = &mut init_testing();
        let params = SecurityParameters::default();
        let (setup, proof) = honest_proof(rng, &params);
        let challenge = challenge_for(&proof, &setup, &params);
        let input = PiPrmInput::new(&setup);
        assert!(proof
            .evaluate(PiPrmCheck::Lengths, input, &params, &challenge)
            .unwrap());

        let mut short = proof.clone();
        short.responses.pop();
        assert!(!short
            .evaluate(PiPrmCheck::Lengths, input, &params, &challenge)
            .unwrap());
        assert!(short
            .verify(input, &params, &mut transcript())
            .is_err());

        // Dropping a round on both sides is still caught, since the proof no
        // longer has `soundness` rounds.
        let mut truncated = proof;
        truncated.commitments.pop();
        truncated.responses.pop();
        assert!(truncated.verify(input, &params, &mut transcript()).is_err());
    }

    #[test]
    fn range_check_rejects_out_of_range_elements() {
        let rng = &mut init_testing();
        let params = SecurityParameters::default();
        let (setup, proof) = honest_proof(rng, &params);
        let challenge = challenge_for(&proof, &setup, &params);
        let input = PiPrmInput::new(&setup);
        assert!(proof
            .evaluate(PiPrmCheck::ElementsInRange, input, &params, &challenge)
            .unwrap());

        // `Z + N` satisfies the same exponent equation but is not reduced.
        let mut unreduced = proof.clone();
        unreduced.responses[0] = &unreduced.responses[0] + setup.modulus();
        assert!(!unreduced
            .evaluate(PiPrmCheck::ElementsInRange, input, &params, &challenge)
            .unwrap());

        let mut negative = proof.clone();
        negative.responses[0] = -BigNumber::one();
        assert!(!negative
            .evaluate(PiPrmCheck::ElementsInRange, input, &params, &challenge)
            .unwrap());

        let mut zero_commitment = proof;
        zero_commitment.commitments[0] = BigNumber::zero();
        assert!(!zero_commitment
            .evaluate(PiPrmCheck::ElementsInRange, input, &params, &challenge)
            .unwrap());
    }

    #[test]
    fn setup_check_rejects_degenerate_parameters() {
        let rng = &mut init_testing();
        let params = SecurityParameters::default();
        let (setup, proof) = honest_proof(rng, &params);
        let challenge = challenge_for(&proof, &setup, &params);
        assert!(proof
            .evaluate(
                PiPrmCheck::ValidSetup,
                PiPrmInput::new(&setup),
                &params,
                &challenge
            )
            .unwrap());

        // With `s = t` the trapdoor is `λ = 1`, which proves nothing.
        let degenerate =
            RingPedersen::from_parts(setup.modulus().clone(), setup.t().clone(), setup.t().clone());
        assert!(!proof
            .evaluate(
                PiPrmCheck::ValidSetup,
                PiPrmInput::new(&degenerate),
                &params,
                &challenge
            )
            .unwrap());
    }

    #[test]
    fn trivial_commitment_is_rejected_even_when_it_opens() {
        let rng = &mut init_testing();
        let params = SecurityParameters::default();
        let (setup, proof) = honest_proof(rng, &params);
        let input = PiPrmInput::new(&setup);
        let mut challenge = challenge_for(&proof, &setup, &params);

        // `A_0 = 1 = t^0` opens correctly for a zero challenge bit.
        let mut degenerate = proof;
        degenerate.commitments[0] = BigNumber::one();
        degenerate.responses[0] = BigNumber::zero();
        challenge[0] = false;

        assert!(degenerate
            .evaluate(PiPrmCheck::Openings, input, &params, &challenge)
            .unwrap());
        assert!(!degenerate
            .evaluate(PiPrmCheck::NoTrivialCommitment, input, &params, &challenge)
            .unwrap());
        assert!(degenerate.verify(input, &params, &mut transcript()).is_err());
    }

    #[test]
    fn openings_check_detects_wrong_response() {
        let rng = &mut init_testing();
        let params = SecurityParameters::default();
        let (setup, proof) = honest_proof(rng, &params);
        let input = PiPrmInput::new(&setup);
        let challenge = challenge_for(&proof, &setup, &params);
        assert!(proof
            .evaluate(PiPrmCheck::Openings, input, &params, &challenge)
            .unwrap());

        // Flip one challenge bit: the response no longer matches.
        let mut flipped = challenge.clone();
        flipped[0] = !flipped[0];
        assert!(!proof
            .evaluate(PiPrmCheck::Openings, input, &params, &flipped)
            .unwrap());
    }

    #[test]
    fn cheating_prover_passes_exactly_when_guess_matches() {
        let rng = &mut init_testing();
        let params = SecurityParameters::new(256, 512, 4).unwrap();
        let (honest_setup, _) = insecure_ring_pedersen(rng);
        // A fresh `s` whose discrete log the prover does not know.
        let s = std::iter::repeat_with(|| random_bn_in_z_star(rng, honest_setup.modulus()).unwrap())
            .find(|s| s != honest_setup.t() && s != &BigNumber::one())
            .unwrap();
        let setup = RingPedersen::from_parts(
            honest_setup.modulus().clone(),
            s,
            honest_setup.t().clone(),
        );
        let input = PiPrmInput::new(&setup);

        let trials = 200;
        let mut passes = 0;
        for _ in 0..trials {
            let guess: Vec<bool> = (0..params.soundness()).map(|_| rng.gen()).collect();
            let proof = cheating_proof(rng, &setup, &guess);
            let derived = challenge_for(&proof, &setup, &params);
            let verified = proof.verify(input, &params, &mut transcript()).is_ok();
            assert_eq!(verified, derived == guess);
            if verified {
                passes += 1;
            }
        }
        // Expected 200 / 16 = 12.5 passes.
        assert!(passes >= 1, "cheating prover never passed");
        assert!(passes <= 40, "cheating prover passed {passes} times");
    }

    #[test]
    fn soundness_parameter_sets_the_number_of_rounds() {
        let rng = &mut init_testing();
        let params = SecurityParameters::new(256, 512, 13).unwrap();
        let (setup, proof) = honest_proof(rng, &params);
        assert_eq!(proof.commitments.len(), 13);
        assert_eq!(proof.responses.len(), 13);
        assert!(proof
            .verify(PiPrmInput::new(&setup), &params, &mut transcript())
            .is_ok());

        // A verifier expecting more rounds rejects.
        assert!(proof
            .verify(
                PiPrmInput::new(&setup),
                &SecurityParameters::default(),
                &mut transcript()
            )
            .is_err());
    }

    #[test]
    fn prover_rejects_degenerate_totient() {
        let rng = &mut init_testing();
        let (setup, witness) = insecure_ring_pedersen(rng);
        let one = BigNumber::one();
        assert!(PiPrmProof::prove(
            PiPrmInput::new(&setup),
            PiPrmSecret::new(witness.lambda(), &one),
            &SecurityParameters::default(),
            &mut transcript(),
            rng,
        )
        .is_err());
    }
}
