//! Elliptic Curve abstraction
//!
//! The proofs in [`crate::zkp`] are generic over [`CurveTrait`] so they can
//! be instantiated with either secp256k1 ([`Secp256k1`]) or P-256
//! ([`Secp256r1`]).
use crate::{
    errors::{CallerError, Result},
    k256::K256,
    p256::P256,
};
use libpaillier::unknown_order::BigNumber;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use std::{fmt::Debug, ops::Add};
use tracing::error;
use zeroize::{Zeroize, Zeroizing};

/// Generic elliptic curve point.
pub trait CurveTrait:
    'static
    + Clone
    + Copy
    + Debug
    + Send
    + Sync
    + Eq
    + PartialEq
    + Serialize
    + for<'de> Deserialize<'de>
    + Add<Output = Self>
    + Zeroize
{
    /// A generator point.
    const GENERATOR: Self;

    /// The identity point.
    const IDENTITY: Self;

    /// The type of scalars.
    type Scalar: ScalarTrait;

    /// The order of the curve.
    fn order() -> BigNumber;

    /// Multiply `self` by a [`BigNumber`], which is first converted to the
    /// curve [`Self::Scalar`] field (taken mod `q`, where `q` is the order of
    /// the curve).
    fn mul_by_bn(&self, scalar: &BigNumber) -> Result<Self>;

    /// Multiply the generator by a [`BigNumber`] scalar.
    fn scale_generator(scalar: &BigNumber) -> Result<Self> {
        Self::GENERATOR.mul_by_bn(scalar)
    }

    /// Multiply `self` by a [`Self::Scalar`].
    fn mul(&self, scalar: &Self::Scalar) -> Self;

    /// Serialize the point as a compressed SEC1 byte array.
    fn to_bytes(self) -> Vec<u8>;

    /// Deserialize a point from a compressed SEC1 byte array.
    fn try_from_bytes(bytes: &[u8]) -> Result<Self>;

    /// Convert a (possibly negative) [`BigNumber`] to a scalar mod `q`.
    fn bn_to_scalar(bn: &BigNumber) -> Result<Self::Scalar>;

    /// Convert a scalar to its canonical [`BigNumber`] in `[0, q)`.
    fn scalar_to_bn(x: &Self::Scalar) -> BigNumber;

    /// Random point.
    fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self;
}

/// Scalar trait.
pub trait ScalarTrait:
    Sync
    + Send
    + Clone
    + Copy
    + Debug
    + PartialEq
    + Eq
    + Zeroize
    + Serialize
    + for<'de> Deserialize<'de>
{
    /// Return the zero scalar.
    fn zero() -> Self;

    /// Return the one scalar.
    fn one() -> Self;

    /// Add two scalars.
    fn add(&self, other: &Self) -> Self;

    /// Multiply two scalars.
    fn mul(&self, other: &Self) -> Self;

    /// Random scalar.
    fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self;

    /// Convert to 32 big-endian bytes.
    fn to_bytes(&self) -> Vec<u8>;

    /// Convert from 32 big-endian bytes, rejecting any other length and any
    /// value not reduced mod `q`.
    fn try_from_bytes(bytes: &[u8]) -> Result<Self>;
}

/// Size in bytes of an encoded scalar.
pub(crate) const SCALAR_BYTES: usize = 32;

/// Length of a compressed SEC1 point on either supported curve.
pub(crate) const COMPRESSED_POINT_BYTES: usize = 33;

/// Reduce `x` (possibly negative) modulo `order` and encode the result as a
/// fixed-width big-endian scalar representation.
pub(crate) fn reduced_scalar_repr(x: &BigNumber, order: &BigNumber) -> Zeroizing<Vec<u8>> {
    let reduced = Zeroizing::new(x.nmod(order));
    let magnitude = Zeroizing::new(reduced.to_bytes());
    let mut repr = Zeroizing::new(vec![0u8; SCALAR_BYTES.saturating_sub(magnitude.len())]);
    repr.extend_from_slice(&magnitude);
    repr
}

/// Check that `bytes` has the length of a compressed point.
pub(crate) fn compressed_point_repr(bytes: &[u8]) -> Result<[u8; COMPRESSED_POINT_BYTES]> {
    bytes.try_into().map_err(|_| {
        error!(
            "Curve point encoding has {} bytes, expected {}",
            bytes.len(),
            COMPRESSED_POINT_BYTES
        );
        CallerError::DeserializationFailed.into()
    })
}

/// Check that `bytes` has the length of a scalar.
pub(crate) fn scalar_repr(bytes: &[u8]) -> Result<[u8; SCALAR_BYTES]> {
    bytes.try_into().map_err(|_| {
        error!("Scalar encoding has {} bytes, expected {}", bytes.len(), SCALAR_BYTES);
        CallerError::DeserializationFailed.into()
    })
}

/// Default curve type.
pub type TestCurve = K256;

/// K256 curve type.
pub type Secp256k1 = K256;

/// P256 curve type.
pub type Secp256r1 = P256;
