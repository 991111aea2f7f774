// Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! Fiat-Shamir helpers on top of [`merlin::Transcript`].
//!
//! Every value is absorbed under a label, and every encoding is canonical, so
//! the prover and the verifier derive the same challenge exactly when they
//! absorb the same values in the same order.

use crate::{
    curve::{CurveTrait, ScalarTrait},
    errors::{CallerError, Result},
    paillier::{Ciphertext, EncryptionKey},
    ring_pedersen::{Commitment, RingPedersen},
    utils::{bn_to_signed_bytes, CRYPTOGRAPHIC_RETRY_MAX},
};
use libpaillier::unknown_order::BigNumber;
use merlin::Transcript;
use tracing::error;

pub(crate) trait TranscriptProtocol {
    /// Absorb a proof's domain-separation tag.
    fn domain_sep(&mut self, tag: &'static [u8]);
    fn append_bn(&mut self, label: &'static [u8], value: &BigNumber);
    fn append_point<C: CurveTrait>(&mut self, label: &'static [u8], point: &C);
    fn append_scalar<C: CurveTrait>(&mut self, label: &'static [u8], scalar: &C::Scalar);
    fn append_ciphertext(&mut self, label: &'static [u8], ciphertext: &Ciphertext);
    fn append_encryption_key(&mut self, label: &'static [u8], key: &EncryptionKey);
    fn append_ring_pedersen(&mut self, label: &'static [u8], setup: &RingPedersen);
    fn append_commitment(&mut self, label: &'static [u8], commitment: &Commitment);

    /// Squeeze a challenge distributed uniformly in `[0, n)`.
    ///
    /// Reads as many bytes as `n` occupies and rejects candidates `>= n`,
    /// reading again under the same label until one is accepted.
    fn positive_challenge(&mut self, label: &'static [u8], n: &BigNumber) -> Result<BigNumber>;

    /// Squeeze `count` challenge bits, one per output byte.
    fn bit_challenge(&mut self, label: &'static [u8], count: usize) -> Vec<bool>;
}

impl TranscriptProtocol for Transcript {
    fn domain_sep(&mut self, tag: &'static [u8]) {
        self.append_message(b"dom-sep", tag);
    }

    fn append_bn(&mut self, label: &'static [u8], value: &BigNumber) {
        self.append_message(label, &bn_to_signed_bytes(value));
    }

    fn append_point<C: CurveTrait>(&mut self, label: &'static [u8], point: &C) {
        self.append_message(label, &point.to_bytes());
    }

    fn append_scalar<C: CurveTrait>(&mut self, label: &'static [u8], scalar: &C::Scalar) {
        self.append_message(label, &scalar.to_bytes());
    }

    fn append_ciphertext(&mut self, label: &'static [u8], ciphertext: &Ciphertext) {
        self.append_message(label, &ciphertext.to_bytes());
    }

    fn append_encryption_key(&mut self, label: &'static [u8], key: &EncryptionKey) {
        self.append_message(label, &key.to_bytes());
    }

    fn append_ring_pedersen(&mut self, label: &'static [u8], setup: &RingPedersen) {
        self.append_message(label, &setup.to_bytes());
    }

    fn append_commitment(&mut self, label: &'static [u8], commitment: &Commitment) {
        self.append_message(label, &commitment.to_bytes());
    }

    fn positive_challenge(&mut self, label: &'static [u8], n: &BigNumber) -> Result<BigNumber> {
        if n <= &BigNumber::zero() {
            error!("Challenge range must be positive");
            Err(CallerError::BadInput)?
        }
        let mut buf = vec![0u8; n.to_bytes().len()];
        for _ in 0..CRYPTOGRAPHIC_RETRY_MAX {
            self.challenge_bytes(label, &mut buf);
            let candidate = BigNumber::from_slice(&buf);
            if &candidate < n {
                return Ok(candidate);
            }
        }
        error!("Failed to sample a challenge below the given bound");
        Err(CallerError::RetryFailed)?
    }

    fn bit_challenge(&mut self, label: &'static [u8], count: usize) -> Vec<bool> {
        let mut buf = vec![0u8; count];
        self.challenge_bytes(label, &mut buf);
        buf.iter().map(|byte| byte & 1 == 1).collect()
    }
}
