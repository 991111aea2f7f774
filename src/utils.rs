// Copyright (c) Facebook, Inc. and its affiliates.
// Modifications Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

use crate::errors::{CallerError, InternalError, Result};
use libpaillier::unknown_order::BigNumber;
use rand::{CryptoRng, Rng, RngCore};
use tracing::error;
use zeroize::Zeroize;

pub(crate) const CRYPTOGRAPHIC_RETRY_MAX: usize = 500usize;

/// Number of bytes used to encode a field length or a vector count.
const LENGTH_BYTES: usize = 8;

/// Helper type for parsing byte array into slices.
///
/// This type implements [`Zeroize`]. When parsing secret types, you should
/// manually call `zeroize()` after parsing is complete.
#[derive(Zeroize)]
pub(crate) struct ParseBytes {
    bytes: Vec<u8>,
    offset: usize,
}

impl ParseBytes {
    /// Consume bytes for parsing.
    pub(crate) fn new(bytes: Vec<u8>) -> ParseBytes {
        ParseBytes { bytes, offset: 0 }
    }

    /// Take next `n` bytes from array.
    pub(crate) fn take_bytes(&mut self, n: usize) -> Result<&[u8]> {
        let end = self
            .offset
            .checked_add(n)
            .ok_or(CallerError::DeserializationFailed)?;
        let slice = self
            .bytes
            .get(self.offset..end)
            .ok_or(CallerError::DeserializationFailed)?;
        self.offset = end;
        Ok(slice)
    }

    /// Parse the next 8 bytes as a little-endian encoded usize.
    pub(crate) fn take_len(&mut self) -> Result<usize> {
        let len_slice = self.take_bytes(LENGTH_BYTES)?;
        let len_bytes: [u8; LENGTH_BYTES] = len_slice.try_into().map_err(|_| {
            error!(
                "Failed to convert byte array (should always work because we
                   defined it to be exactly 8 bytes"
            );
            InternalError::InternalInvariantFailed
        })?;
        Ok(usize::from_le_bytes(len_bytes))
    }

    /// Take a length-prefixed field, as written by [`encode_field`].
    pub(crate) fn take_field(&mut self) -> Result<&[u8]> {
        let len = self.take_len()?;
        self.take_bytes(len)
    }

    /// Consume `tag`, failing if the input starts with anything else.
    pub(crate) fn take_tag(&mut self, tag: &[u8]) -> Result<()> {
        if self.take_bytes(tag.len())? != tag {
            error!("Encoding does not start with the expected tag");
            Err(CallerError::DeserializationFailed)?
        }
        Ok(())
    }

    /// Take a length-prefixed signed big number, as written by
    /// [`encode_field`] over [`bn_to_signed_bytes`].
    pub(crate) fn take_bn(&mut self) -> Result<BigNumber> {
        bn_from_signed_bytes(self.take_field()?)
    }

    /// Check that every byte was consumed.
    pub(crate) fn finish(&self) -> Result<()> {
        if self.offset != self.bytes.len() {
            Err(CallerError::DeserializationFailed)?
        }
        Ok(())
    }
}

/// Prefix `field` with its length as an 8-byte little-endian integer.
pub(crate) fn encode_field(field: &[u8]) -> Vec<u8> {
    [field.len().to_le_bytes().as_slice(), field].concat()
}

/// Length-prefixed signed encoding of `value`; read back with
/// [`ParseBytes::take_bn`].
pub(crate) fn encode_bn(value: &BigNumber) -> Vec<u8> {
    encode_field(&bn_to_signed_bytes(value))
}

/// Encode a [`BigNumber`] as a sign byte (`0` for non-negative, `1` for
/// negative) followed by the big-endian magnitude.
pub(crate) fn bn_to_signed_bytes(value: &BigNumber) -> Vec<u8> {
    let is_negative = value < &BigNumber::zero();
    let magnitude = if is_negative {
        -value.clone()
    } else {
        value.clone()
    };
    [[u8::from(is_negative)].as_slice(), &magnitude.to_bytes()].concat()
}

/// Parse a big-endian magnitude as written by [`BigNumber::to_bytes`].
///
/// Leading zero bytes are rejected, so each value has a single encoding.
pub(crate) fn bn_from_unsigned_bytes(bytes: &[u8]) -> Result<BigNumber> {
    if bytes.first() == Some(&0) {
        error!("Big number encoding has a leading zero byte");
        Err(CallerError::DeserializationFailed)?
    }
    Ok(BigNumber::from_slice(bytes))
}

/// Inverse of [`bn_to_signed_bytes`].
pub(crate) fn bn_from_signed_bytes(bytes: &[u8]) -> Result<BigNumber> {
    let (sign, magnitude) = bytes
        .split_first()
        .ok_or(CallerError::DeserializationFailed)?;
    let magnitude = bn_from_unsigned_bytes(magnitude)?;
    match sign {
        0 => Ok(magnitude),
        // Negative zero has no canonical encoding.
        1 if magnitude != BigNumber::zero() => Ok(-magnitude),
        _ => {
            error!("Invalid sign byte in big number encoding");
            Err(CallerError::DeserializationFailed)?
        }
    }
}

/// Returns `true` if `value ∊ [-2^n, 2^n]`.
pub(crate) fn within_bound_by_size(value: &BigNumber, n: usize) -> bool {
    let bound = BigNumber::one() << n;
    value <= &bound && value >= &-bound
}

/// Compute a^e (mod n), where `e` may be negative.
///
/// A negative exponent requires `a` to be invertible mod `n`; otherwise this
/// returns an error rather than panicking, since `a` may come from an
/// untrusted proof.
pub(crate) fn modpow(a: &BigNumber, e: &BigNumber, n: &BigNumber) -> Result<BigNumber> {
    if e < &BigNumber::zero() {
        let inverse = a.invert(n).ok_or_else(|| {
            error!("Base is not invertible for a negative exponent");
            InternalError::InternalInvariantFailed
        })?;
        Ok(inverse.modpow(&-e.clone(), n))
    } else {
        Ok(a.modpow(e, n))
    }
}

/// Returns `true` if `value` lies in `[1, n)` and is coprime to `n`.
pub(crate) fn is_in_z_star(value: &BigNumber, n: &BigNumber) -> bool {
    value >= &BigNumber::one() && value < n && value.gcd(n) == BigNumber::one()
}

/// Sample a number uniformly at random from the range [0, n). This can be used
/// for sampling from a prime field `F_p` or the integers modulo `n` (for any
/// `n`).
pub(crate) fn random_positive_bn<R: RngCore + CryptoRng>(rng: &mut R, n: &BigNumber) -> BigNumber {
    BigNumber::from_rng(n, rng)
}

/// Sample a number uniformly at random from the range [-n, n].
pub(crate) fn random_plusminus<R: RngCore + CryptoRng>(rng: &mut R, n: &BigNumber) -> BigNumber {
    // `from_rng()` samples the _open_ interval, so add 1 to get the closed interval
    // for `n`
    let open_interval_max: BigNumber = n + 1;
    let val = BigNumber::from_rng(&open_interval_max, rng);
    let is_positive: bool = rng.gen();
    match is_positive {
        true => val,
        false => -val,
    }
}

/// Sample a number uniformly at random from the range `[-2^n, 2^n]`.
pub(crate) fn random_plusminus_by_size<R: RngCore + CryptoRng>(rng: &mut R, n: usize) -> BigNumber {
    let range = BigNumber::one() << n;
    random_plusminus(rng, &range)
}

/// Sample a number uniformly at random from the range `[-scale * 2^n, scale *
/// 2^n]`.
pub(crate) fn random_plusminus_scaled<R: RngCore + CryptoRng>(
    rng: &mut R,
    n: usize,
    scale: &BigNumber,
) -> BigNumber {
    let range = (BigNumber::one() << n) * scale;
    random_plusminus(rng, &range)
}

/// Generate a random `BigNumber` that is in the multiplicative group of
/// integers modulo `n`.
///
/// Note: In this application, `n` is typically the product of two primes. If
/// the drawn element is not coprime with `n` and is not `0 mod n`, then the
/// caller has accidentally stumbled upon the factorization of `n`!
/// This is a security issue when `n` is someone else's Paillier modulus, but
/// the chance of this happening is basically 0 and we drop the element anyway.
pub(crate) fn random_bn_in_z_star<R: RngCore + CryptoRng>(
    rng: &mut R,
    n: &BigNumber,
) -> Result<BigNumber> {
    // Try up to `CRYPTOGRAPHIC_RETRY_MAX` times to draw a non-zero element. This
    // should virtually never error, though.
    std::iter::repeat_with(|| BigNumber::from_rng(n, rng))
        .take(CRYPTOGRAPHIC_RETRY_MAX)
        .find(|result| result != &BigNumber::zero() && result.gcd(n) == BigNumber::one())
        .ok_or(InternalError::CallingApplicationMistake(
            CallerError::RetryFailed,
        ))
}


////////////////////////////
// Test Utility Functions //
////////////////////////////
