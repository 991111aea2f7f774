// Copyright (c) Facebook, Inc. and its affiliates.
// Modifications Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! Paillier encryption and the ciphertext algebra used by the proofs.
//!
//! Key material comes from [`libpaillier`]; the homomorphic operations are
//! computed directly on [`BigNumber`]s so that signed plaintexts and signed
//! scalars (which the range proofs rely on) are handled explicitly:
//!
//! - `Enc(x; r) = (1 + N)^x · r^N mod N²`, for `x ∊ [-N/2, N/2]`;
//! - `c₁ ⊕ c₂ = c₁ · c₂ mod N²`;
//! - `k ⊙ c = c^k mod N²` (using `c⁻¹` when `k` is negative);
//! - `randomize(c, r) = c · r^N mod N²`.

use crate::{
    errors::{CallerError, InternalError, Result},
    parameters::PRIME_BITS,
    utils::{self, bn_to_signed_bytes, is_in_z_star, random_bn_in_z_star},
};
use libpaillier::unknown_order::BigNumber;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use thiserror::Error;
use tracing::error;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Paillier-specific errors.
#[derive(Clone, Copy, Eq, PartialEq, Error, Debug)]
pub enum PaillierError {
    #[error("Plaintext is outside of the range [-N/2, N/2]")]
    PlaintextOutOfRange,
    #[error("Nonce is not an element of Z*_N")]
    InvalidNonce,
    #[error("Ciphertext is not an element of Z*_(N^2)")]
    InvalidCiphertext,
    #[error("Failed to decrypt ciphertext")]
    DecryptionFailed,
    #[error("Failed to build a key from the provided primes")]
    InvalidPrimes,
}

impl From<PaillierError> for InternalError {
    fn from(err: PaillierError) -> Self {
        error!("Paillier operation failed: {err}");
        match err {
            PaillierError::InvalidPrimes => CallerError::BadInput.into(),
            _ => InternalError::InternalInvariantFailed,
        }
    }
}

/// A Paillier ciphertext.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ciphertext(BigNumber);

impl Ciphertext {
    /// Big-endian encoding of the ciphertext.
    pub(crate) fn to_bytes(&self) -> Vec<u8> {
        self.0.to_bytes()
    }

    /// Parse a ciphertext produced by [`Ciphertext::to_bytes`]. The value is
    /// not checked against any key here; see
    /// [`EncryptionKey::is_valid_ciphertext`].
    pub(crate) fn try_from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(Self(utils::bn_from_unsigned_bytes(bytes)?))
    }
}

impl AsRef<BigNumber> for Ciphertext {
    fn as_ref(&self) -> &BigNumber {
        &self.0
    }
}

/// The randomness used to produce a [`Ciphertext`].
///
/// # 🔒 Storage requirements
/// A nonce, together with its ciphertext, reveals the plaintext. It must be
/// kept as secret as the plaintext itself.
#[derive(Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct Nonce(BigNumber);

impl Debug for Nonce {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Nonce([redacted])")
    }
}

impl AsRef<BigNumber> for Nonce {
    fn as_ref(&self) -> &BigNumber {
        &self.0
    }
}

/// A nonce masked by a challenge: `w = r · ρ^e mod N`. Safe to publish.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskedNonce(BigNumber);

impl MaskedNonce {
    pub(crate) fn to_bytes(&self) -> Vec<u8> {
        self.0.to_bytes()
    }

    pub(crate) fn try_from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(Self(utils::bn_from_unsigned_bytes(bytes)?))
    }
}

impl AsRef<BigNumber> for MaskedNonce {
    fn as_ref(&self) -> &BigNumber {
        &self.0
    }
}

/// A Paillier public key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptionKey {
    modulus: BigNumber,
    modulus_squared: BigNumber,
}

impl EncryptionKey {
    fn from_modulus(modulus: BigNumber) -> Self {
        let modulus_squared = &modulus * &modulus;
        Self {
            modulus,
            modulus_squared,
        }
    }

    /// The modulus `N`.
    pub fn modulus(&self) -> &BigNumber {
        &self.modulus
    }

    /// `N/2`, rounded down.
    fn half_modulus(&self) -> BigNumber {
        self.modulus.clone() >> 1
    }

    /// Returns `true` if `c ∊ Z*_(N²)`.
    pub fn is_valid_ciphertext(&self, c: &Ciphertext) -> bool {
        is_in_z_star(&c.0, &self.modulus_squared)
    }

    fn check_ciphertext(&self, c: &Ciphertext) -> std::result::Result<(), PaillierError> {
        if self.is_valid_ciphertext(c) {
            Ok(())
        } else {
            Err(PaillierError::InvalidCiphertext)
        }
    }

    /// Sample a fresh nonce uniformly from `Z*_N`.
    pub fn random_nonce<R: RngCore + CryptoRng>(&self, rng: &mut R) -> Result<Nonce> {
        Ok(Nonce(random_bn_in_z_star(rng, &self.modulus)?))
    }

    /// Encrypt `x` under a fresh nonce, returning both.
    pub fn encrypt<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
        x: &BigNumber,
    ) -> std::result::Result<(Ciphertext, Nonce), PaillierError> {
        let nonce = self
            .random_nonce(rng)
            .map_err(|_| PaillierError::InvalidNonce)?;
        let c = self.encrypt_with_nonce(x, &nonce)?;
        Ok((c, nonce))
    }

    /// Encrypt `x` using the given nonce (either a fresh [`Nonce`] or a
    /// [`MaskedNonce`] from a proof).
    pub fn encrypt_with_nonce(
        &self,
        x: &BigNumber,
        nonce: &impl AsRef<BigNumber>,
    ) -> std::result::Result<Ciphertext, PaillierError> {
        let half = self.half_modulus();
        if x > &half || x < &-half {
            return Err(PaillierError::PlaintextOutOfRange);
        }
        let nonce = nonce.as_ref();
        if !is_in_z_star(nonce, &self.modulus) {
            return Err(PaillierError::InvalidNonce);
        }
        // (1 + N)^x = 1 + x·N (mod N²)
        let x = x.nmod(&self.modulus);
        let message_part = (BigNumber::one() + x * &self.modulus).nmod(&self.modulus_squared);
        let nonce_part = nonce.modpow(&self.modulus, &self.modulus_squared);
        Ok(Ciphertext(
            message_part.modmul(&nonce_part, &self.modulus_squared),
        ))
    }

    /// Homomorphic addition: the result decrypts to the sum of the
    /// plaintexts.
    pub fn add(
        &self,
        c1: &Ciphertext,
        c2: &Ciphertext,
    ) -> std::result::Result<Ciphertext, PaillierError> {
        self.check_ciphertext(c1)?;
        self.check_ciphertext(c2)?;
        Ok(Ciphertext(c1.0.modmul(&c2.0, &self.modulus_squared)))
    }

    /// Homomorphic scalar multiplication `k ⊙ c`; `k` may be negative.
    pub fn multiply(
        &self,
        c: &Ciphertext,
        k: &BigNumber,
    ) -> std::result::Result<Ciphertext, PaillierError> {
        self.check_ciphertext(c)?;
        let product = utils::modpow(&c.0, k, &self.modulus_squared)
            .map_err(|_| PaillierError::InvalidCiphertext)?;
        Ok(Ciphertext(product))
    }

    /// Compute `(k ⊙ c1) ⊕ c2`.
    pub fn multiply_and_add(
        &self,
        k: &BigNumber,
        c1: &Ciphertext,
        c2: &Ciphertext,
    ) -> std::result::Result<Ciphertext, PaillierError> {
        self.add(&self.multiply(c1, k)?, c2)
    }

    /// Re-randomize `c` with `nonce`, without changing its plaintext.
    pub fn randomize(
        &self,
        c: &Ciphertext,
        nonce: &impl AsRef<BigNumber>,
    ) -> std::result::Result<Ciphertext, PaillierError> {
        self.check_ciphertext(c)?;
        let nonce = nonce.as_ref();
        if !is_in_z_star(nonce, &self.modulus) {
            return Err(PaillierError::InvalidNonce);
        }
        let nonce_part = nonce.modpow(&self.modulus, &self.modulus_squared);
        Ok(Ciphertext(c.0.modmul(&nonce_part, &self.modulus_squared)))
    }

    /// Compute the masked nonce `randomizer · nonce^challenge mod N`.
    pub(crate) fn mask(
        &self,
        nonce: &Nonce,
        randomizer: &Nonce,
        challenge: &BigNumber,
    ) -> Result<MaskedNonce> {
        let power = utils::modpow(&nonce.0, challenge, &self.modulus)?;
        Ok(MaskedNonce(randomizer.0.modmul(&power, &self.modulus)))
    }

    /// Canonical byte encoding used when absorbing the key into a transcript.
    pub(crate) fn to_bytes(&self) -> Vec<u8> {
        bn_to_signed_bytes(&self.modulus)
    }
}

/// A Paillier private key.
///
/// # 🔒 Storage requirements
/// This type must be stored securely by the calling application.
pub struct DecryptionKey {
    inner: libpaillier::DecryptionKey,
    encryption_key: EncryptionKey,
}

impl Debug for DecryptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecryptionKey")
            .field("inner", &"[redacted]")
            .field("encryption_key", &self.encryption_key)
            .finish()
    }
}

impl DecryptionKey {
    /// Generate a key from two fresh safe primes of [`PRIME_BITS`] bits.
    ///
    /// This is slow; expect it to take seconds.
    pub fn new<R: RngCore + CryptoRng>(rng: &mut R) -> Result<Self> {
        let p = BigNumber::safe_prime_from_rng(PRIME_BITS, rng);
        let q = std::iter::repeat_with(|| BigNumber::safe_prime_from_rng(PRIME_BITS, rng))
            .take(utils::CRYPTOGRAPHIC_RETRY_MAX)
            .find(|q| q != &p)
            .ok_or(CallerError::RetryFailed)?;
        Ok(Self::from_primes(&p, &q)?)
    }

    /// Build a key from the two prime factors of the modulus.
    ///
    /// The primes are not checked for primality.
    pub fn from_primes(
        p: &BigNumber,
        q: &BigNumber,
    ) -> std::result::Result<Self, PaillierError> {
        if p == q || p <= &BigNumber::one() || q <= &BigNumber::one() {
            return Err(PaillierError::InvalidPrimes);
        }
        let inner = libpaillier::DecryptionKey::with_primes_unchecked(p, q)
            .ok_or(PaillierError::InvalidPrimes)?;
        Ok(Self {
            inner,
            encryption_key: EncryptionKey::from_modulus(p * q),
        })
    }

    /// The matching public key.
    pub fn encryption_key(&self) -> EncryptionKey {
        self.encryption_key.clone()
    }

    /// Decrypt `c`, returning the signed representative in `[-N/2, N/2]`.
    pub fn decrypt(&self, c: &Ciphertext) -> std::result::Result<BigNumber, PaillierError> {
        self.encryption_key.check_ciphertext(c)?;
        let bytes = self
            .inner
            .decrypt(&c.0)
            .ok_or(PaillierError::DecryptionFailed)?;
        let x = BigNumber::from_slice(bytes);
        let modulus = self.encryption_key.modulus();
        if x > self.encryption_key.half_modulus() {
            Ok(x - modulus)
        } else {
            Ok(x)
        }
    }
}
