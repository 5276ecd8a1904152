// Copyright © 2019 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

//! Ed25519 group adapter.
//!
//! Protocol arithmetic above this module works in `BigInt`; this is the one
//! place that converts to and from curve25519-dalek scalars and points.

use curve25519_dalek::constants::ED25519_BASEPOINT_COMPRESSED;
use curve25519_dalek::edwards::{CompressedEdwardsY, EdwardsPoint};
use curve25519_dalek::scalar::Scalar;
use num_bigint::{BigInt, Sign};
use num_integer::Integer;
use once_cell::sync::Lazy;

/// Prime order of the Ed25519 base point subgroup,
/// `l = 2^252 + 27742317777372353535851937790883648493`.
static CURVE_ORDER: Lazy<BigInt> = Lazy::new(|| {
    (BigInt::from(1u8) << 252)
        + "27742317777372353535851937790883648493"
            .parse::<BigInt>()
            .expect("curve order constant")
});

static INV_EIGHT: Lazy<Scalar> = Lazy::new(|| Scalar::from(8u8).invert());

pub fn curve_order() -> &'static BigInt {
    &CURVE_ORDER
}

/// Compressed base point bytes, used as a curve domain constant when
/// deriving session identifiers.
pub fn basepoint_bytes() -> [u8; 32] {
    ED25519_BASEPOINT_COMPRESSED.to_bytes()
}

/// Reduces a (possibly negative) big integer into the scalar field.
pub fn scalar_from_bigint(x: &BigInt) -> Scalar {
    let reduced = x.mod_floor(&CURVE_ORDER);
    let (_, le) = reduced.to_bytes_le();
    let mut bytes = [0u8; 32];
    bytes[..le.len()].copy_from_slice(&le);
    Scalar::from_bytes_mod_order(bytes)
}

pub fn bigint_from_scalar(s: &Scalar) -> BigInt {
    BigInt::from_bytes_le(Sign::Plus, &s.to_bytes())
}

/// `x · G` for a big-integer scalar.
pub fn scalar_base_mult(x: &BigInt) -> EdwardsPoint {
    EdwardsPoint::mul_base(&scalar_from_bigint(x))
}

pub fn compress(point: &EdwardsPoint) -> [u8; 32] {
    point.compress().to_bytes()
}

/// Decompresses 32 bytes into a curve point; `None` for wrong length or an
/// encoding that is not on the curve.
pub fn decompress(bytes: &[u8]) -> Option<EdwardsPoint> {
    let arr: [u8; 32] = bytes.try_into().ok()?;
    CompressedEdwardsY(arr).decompress()
}

/// Clears any small-order torsion component: `[8⁻¹][8]P`. The prime-order
/// component is unchanged, so honest points pass through intact.
pub fn eight_inv_eight(point: &EdwardsPoint) -> EdwardsPoint {
    point.mul_by_cofactor() * *INV_EIGHT
}

/// EdDSA's wide scalar reduction of a 64-byte SHA-512 digest. This is the
/// reduction rule the signing challenge uses; it is distinct from the
/// rejection sampling used for keygen challenges.
pub fn scalar_reduce_wide(bytes: &[u8; 64]) -> Scalar {
    Scalar::from_bytes_mod_order_wide(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use curve25519_dalek::constants::EIGHT_TORSION;
    use num_traits::One;
    use rand::rngs::OsRng;

    use crate::common::random::get_random_positive_int;

    #[test]
    fn scalar_round_trip() {
        let x = get_random_positive_int(&mut OsRng, curve_order());
        let s = scalar_from_bigint(&x);
        assert_eq!(bigint_from_scalar(&s), x);
    }

    #[test]
    fn negative_scalar_wraps() {
        let minus_one = BigInt::from(-1);
        let expected = curve_order() - BigInt::one();
        assert_eq!(bigint_from_scalar(&scalar_from_bigint(&minus_one)), expected);
    }

    #[test]
    fn compress_round_trip() {
        let x = get_random_positive_int(&mut OsRng, curve_order());
        let p = scalar_base_mult(&x);
        let q = decompress(&compress(&p)).unwrap();
        assert_eq!(p, q);
        assert!(decompress(&[0u8; 31]).is_none());
    }

    #[test]
    fn cofactor_clearing_removes_torsion() {
        let x = get_random_positive_int(&mut OsRng, curve_order());
        let p = scalar_base_mult(&x);
        let dirty = p + EIGHT_TORSION[1];
        assert!(!dirty.is_torsion_free());
        let cleared = eight_inv_eight(&dirty);
        assert_eq!(cleared, p);
        assert!(cleared.is_torsion_free());
    }
}
