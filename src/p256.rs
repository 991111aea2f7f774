//! NIST P-256 instantiation of [`CurveTrait`].

use crate::{
    curve::{compressed_point_repr, reduced_scalar_repr, scalar_repr, CurveTrait, ScalarTrait},
    errors::{CallerError, InternalError, Result},
};
use generic_array::GenericArray;
use p256::{
    elliptic_curve::{
        bigint::Encoding, group::GroupEncoding, AffinePoint, Curve, Field, Group, PrimeField,
    },
    NistP256, ProjectivePoint, Scalar,
};
use libpaillier::unknown_order::BigNumber;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::error;
use zeroize::{Zeroize, Zeroizing};

/// A P-256 point.
///
/// Serializes through its affine form so that the encoding does not depend
/// on the projective representative.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Zeroize)]
pub struct P256(pub ProjectivePoint);

impl std::ops::Add for P256 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl From<ProjectivePoint> for P256 {
    fn from(p: ProjectivePoint) -> Self {
        Self(p)
    }
}

impl Serialize for P256 {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        AffinePoint::<NistP256>::from(self.0).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for P256 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        AffinePoint::<NistP256>::deserialize(deserializer).map(|p| Self(p.into()))
    }
}

/// The group order `q`.
pub(crate) fn p256_order() -> BigNumber {
    BigNumber::from_slice(NistP256::ORDER.to_be_bytes())
}

impl CurveTrait for P256 {
    const GENERATOR: Self = P256(ProjectivePoint::GENERATOR);
    const IDENTITY: Self = P256(ProjectivePoint::IDENTITY);
    type Scalar = Scalar;

    fn order() -> BigNumber {
        p256_order()
    }

    fn mul_by_bn(&self, scalar: &BigNumber) -> Result<Self> {
        let scalar = Zeroizing::new(Self::bn_to_scalar(scalar)?);
        Ok(Self(self.0 * *scalar))
    }

    fn mul(&self, scalar: &Self::Scalar) -> Self {
        Self(self.0 * scalar)
    }

    fn to_bytes(self) -> Vec<u8> {
        AffinePoint::<NistP256>::from(self.0).to_bytes().to_vec()
    }

    fn try_from_bytes(bytes: &[u8]) -> Result<Self> {
        let repr = compressed_point_repr(bytes)?;
        Option::<AffinePoint<NistP256>>::from(AffinePoint::<NistP256>::from_bytes(
            &repr.into(),
        ))
        .map(|point| Self(point.into()))
        .ok_or_else(|| {
            error!("Bytes do not encode a P-256 point");
            CallerError::DeserializationFailed.into()
        })
    }

    fn bn_to_scalar(x: &BigNumber) -> Result<Self::Scalar> {
        let repr = reduced_scalar_repr(x, &Self::order());
        Option::from(Scalar::from_repr(GenericArray::clone_from_slice(&repr))).ok_or_else(|| {
            error!("Reduced value does not fit in a P-256 scalar");
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
            error!("Scalar encoding is not reduced modulo the P-256 order");
            CallerError::DeserializationFailed.into()
        })
    }
}
