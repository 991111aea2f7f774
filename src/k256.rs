//! secp256k1 instantiation of [`CurveTrait`].

use crate::{
    curve::{compressed_point_repr, reduced_scalar_repr, scalar_repr, CurveTrait, ScalarTrait},
    errors::{CallerError, InternalError, Result},
};
use generic_array::GenericArray;
use k256::{
    elliptic_curve::{
        bigint::Encoding, group::GroupEncoding, AffinePoint, Curve, Field, Group, PrimeField,
    },
    ProjectivePoint, Scalar, Secp256k1,
};
use libpaillier::unknown_order::BigNumber;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::error;
use zeroize::{Zeroize, Zeroizing};

/// A secp256k1 point.
///
/// Serializes through its affine form so that the encoding does not depend
/// on the projective representative.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Zeroize)]
pub struct K256(pub ProjectivePoint);

impl std::ops::Add for K256 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl From<ProjectivePoint> for K256 {
    fn from(p: ProjectivePoint) -> Self {
        Self(p)
    }
}

impl Serialize for K256 {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        AffinePoint::<Secp256k1>::from(self.0).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for K256 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        AffinePoint::<Secp256k1>::deserialize(deserializer).map(|p| Self(p.into()))
    }
}

/// The group order `q`.
pub(crate) fn k256_order() -> BigNumber {
    BigNumber::from_slice(Secp256k1::ORDER.to_be_bytes())
}

impl CurveTrait for K256 {
    const GENERATOR: Self = K256(ProjectivePoint::GENERATOR);
    const IDENTITY: Self = K256(ProjectivePoint::IDENTITY);
    type Scalar = Scalar;

    fn order() -> BigNumber {
        k256_order()
    }

    fn mul_by_bn(&self, scalar: &BigNumber) -> Result<Self> {
        let scalar = Zeroizing::new(Self::bn_to_scalar(scalar)?);
        Ok(Self(self.0 * *scalar))
    }

    fn mul(&self, scalar: &Self::Scalar) -> Self {
        Self(self.0 * scalar)
    }

    fn to_bytes(self) -> Vec<u8> {
        AffinePoint::<Secp256k1>::from(self.0).to_bytes().to_vec()
    }

    fn try_from_bytes(bytes: &[u8]) -> Result<Self> {
        let repr = compressed_point_repr(bytes)?;
        Option::<AffinePoint<Secp256k1>>::from(AffinePoint::<Secp256k1>::from_bytes(
            &repr.into(),
        ))
        .map(|point| Self(point.into()))
        .ok_or_else(|| {
            error!("Bytes do not encode a secp256k1 point");
            CallerError::DeserializationFailed.into()
        })
    }

    fn bn_to_scalar(x: &BigNumber) -> Result<Self::Scalar> {
        let repr = reduced_scalar_repr(x, &Self::order());
        Option::from(Scalar::from_repr(GenericArray::clone_from_slice(&repr))).ok_or_else(|| {
            error!("Reduced value does not fit in a secp256k1 scalar");
            InternalError::InternalInvariantFailed
        })
    }

    fn scalar_to_bn(x: &Self::Scalar) -> BigNumber {
        BigNumber::from_slice(x.to_repr())
    }

    fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        Self(ProjectivePoint::random(rng))
    }
}

impl ScalarTrait for Scalar {
    fn zero() -> Self {
        Scalar::ZERO
    }

    fn one() -> Self {
        Scalar::ONE
    }

    fn add(&self, other: &Self) -> Self {
        self + other
    }

    fn mul(&self, other: &Self) -> Self {
        self * other
    }

    fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        <Scalar as Field>::random(rng)
    }

    fn to_bytes(&self) -> Vec<u8> {
        self.to_repr().to_vec()
    }

    fn try_from_bytes(bytes: &[u8]) -> Result<Self> {
        let repr = scalar_repr(bytes)?;
        Option::from(Scalar::from_repr(repr.into())).ok_or_else(|| {
            error!("Scalar encoding is not reduced modulo the secp256k1 order");
            CallerError::DeserializationFailed.into()
        })
    }
}
