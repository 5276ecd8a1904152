// Copyright © 2019 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

//! Schnorr proof of knowledge of a discrete log over Ed25519, with an
//! externally derived challenge.
//!
//! Keygen derives the challenge from the XOR-combined session randomness
//! rather than from a local transcript hash, so the challenge is an input
//! here instead of being computed internally.

use curve25519_dalek::edwards::EdwardsPoint;
use num_bigint::BigInt;

use crate::common::int::ModInt;
use crate::crypto::curve;

/// `z = tau + c * x mod q`, where `A = tau * G` was committed beforehand.
pub fn prove(q: &BigInt, tau: &BigInt, challenge: &BigInt, x: &BigInt) -> BigInt {
    let mod_q = ModInt::new(q.clone());
    mod_q.add(tau, &mod_q.mul(challenge, x))
}

/// Checks `z * G == A + c * X`.
pub fn verify(commit_a: &EdwardsPoint, pub_x: &EdwardsPoint, challenge: &BigInt, z: &BigInt) -> bool {
    let lhs = curve::scalar_base_mult(z);
    let rhs = commit_a + pub_x * curve::scalar_from_bigint(challenge);
    lhs == rhs
}
