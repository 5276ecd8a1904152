// Copyright © 2019 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

//! Range proof for a Paillier ciphertext ("enc" proof).
//!
//! Proves knowledge of a plaintext `k` with `|k| < 2^ell` and randomness
//! `rho` such that `K = (1 + N0)^k * rho^N0 mod N0^2`, committed under the
//! *verifier's* ring-Pedersen parameters. A proof produced for one verifier
//! does not verify under another verifier's parameters.

use num_bigint::{BigInt, Sign};
use num_traits::Signed;
use prost::Message;
use rand::{CryptoRng, Rng};

use crate::common::hash::sha512_256i_tagged;
use crate::common::hash_utils::rejection_sample;
use crate::common::int::ModInt;
use crate::common::random::{get_random_coprime_int, get_random_int_in_symmetric_range};
use crate::crypto::pedersen::PedersenParams;
use crate::crypto::proof_config::{ProofConfig, ProofError};

/// Proof transcript: commitments `(S, A, C)` and responses `(z1, z2, z3)`.
/// `z1` and `z3` are signed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncProof {
    pub s: BigInt,
    pub a: BigInt,
    pub c: BigInt,
    pub z1: BigInt,
    pub z2: BigInt,
    pub z3: BigInt,
}

#[derive(Clone, PartialEq, Message)]
struct EncProofPb {
    #[prost(bytes = "vec", tag = "1")]
    s: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    a: Vec<u8>,
    #[prost(bytes = "vec", tag = "3")]
    c: Vec<u8>,
    #[prost(bytes = "vec", tag = "4")]
    z1: Vec<u8>,
    #[prost(bytes = "vec", tag = "5")]
    z2: Vec<u8>,
    #[prost(bytes = "vec", tag = "6")]
    z3: Vec<u8>,
}

#[allow(clippy::too_many_arguments)]
fn challenge(
    config: &ProofConfig,
    context: &[u8],
    n0: &BigInt,
    ped: &PedersenParams,
    k_ciphertext: &BigInt,
    s: &BigInt,
    a: &BigInt,
    c: &BigInt,
) -> BigInt {
    let e_hash = sha512_256i_tagged(
        context,
        &[n0, &ped.n, &ped.s, &ped.t, k_ciphertext, s, a, c],
    );
    rejection_sample(config.q(), &e_hash)
}

/// Produces an enc proof for `K = Enc_{N0}(k; rho)`, bound to `context` and
/// to the verifier's ring-Pedersen parameters.
#[allow(clippy::too_many_arguments)]
pub fn prove<R: Rng + CryptoRng>(
    rng: &mut R,
    config: &ProofConfig,
    context: &[u8],
    k_ciphertext: &BigInt,
    n0: &BigInt,
    k: &BigInt,
    rho: &BigInt,
    ped: &PedersenParams,
) -> Result<EncProof, ProofError> {
    if !ped.validate() {
        return Err(ProofError::InvalidParameters("ring-Pedersen parameters"));
    }
    if k.is_negative() || k.abs() >= config.two_pow_ell() {
        return Err(ProofError::InvalidParameters("witness out of range"));
    }

    let alpha = get_random_int_in_symmetric_range(rng, &config.two_pow_ell_eps());
    let mu = get_random_int_in_symmetric_range(rng, &(config.two_pow_ell() * &ped.n));
    let gamma = get_random_int_in_symmetric_range(rng, &(config.two_pow_ell_eps() * &ped.n));
    let r = get_random_coprime_int(rng, n0);

    let s = ped
        .commit(k, &mu)
        .ok_or(ProofError::InvalidParameters("ring-Pedersen parameters"))?;
    let c = ped
        .commit(&alpha, &gamma)
        .ok_or(ProofError::InvalidParameters("ring-Pedersen parameters"))?;

    let mod_nn = ModInt::new(n0 * n0);
    let g_alpha = mod_nn
        .exp_signed(&(n0 + BigInt::from(1u8)), &alpha)
        .ok_or(ProofError::InvalidParameters("Paillier modulus"))?;
    let a = mod_nn.mul(&g_alpha, &mod_nn.exp(&r, n0));

    let e = challenge(config, context, n0, ped, k_ciphertext, &s, &a, &c);

    let mod_n0 = ModInt::new(n0.clone());
    let z1 = &alpha + &e * k;
    let z2 = mod_n0.mul(&r, &mod_n0.exp(rho, &e));
    let z3 = &gamma + &e * &mu;

    Ok(EncProof { s, a, c, z1, z2, z3 })
}

/// Verifies an enc proof against `K`, the prover's Paillier modulus `N0` and
/// the verifier's own ring-Pedersen parameters.
pub fn verify(
    config: &ProofConfig,
    context: &[u8],
    k_ciphertext: &BigInt,
    n0: &BigInt,
    ped: &PedersenParams,
    proof: &EncProof,
) -> Result<(), ProofError> {
    if !ped.validate() {
        return Err(ProofError::InvalidParameters("ring-Pedersen parameters"));
    }
    if proof.z1.abs() > config.two_pow_ell_eps() {
        return Err(ProofError::VerificationFailed("z1 out of range"));
    }

    let e = challenge(config, context, n0, ped, k_ciphertext, &proof.s, &proof.a, &proof.c);

    // (1 + N0)^z1 * z2^N0 == A * K^e mod N0^2
    let mod_nn = ModInt::new(n0 * n0);
    let lhs = {
        let g_z1 = mod_nn
            .exp_signed(&(n0 + BigInt::from(1u8)), &proof.z1)
            .ok_or(ProofError::VerificationFailed("degenerate modulus"))?;
        mod_nn.mul(&g_z1, &mod_nn.exp(&proof.z2, n0))
    };
    let rhs = mod_nn.mul(&proof.a, &mod_nn.exp(k_ciphertext, &e));
    if lhs != rhs {
        return Err(ProofError::VerificationFailed("ciphertext equation"));
    }

    // s^z1 * t^z3 == C * S^e mod N-hat
    let mod_nhat = ModInt::new(ped.n.clone());
    let lhs = ped
        .commit(&proof.z1, &proof.z3)
        .ok_or(ProofError::VerificationFailed("degenerate commitment"))?;
    let rhs = mod_nhat.mul(&proof.c, &mod_nhat.exp(&proof.s, &e));
    if lhs != rhs {
        return Err(ProofError::VerificationFailed("commitment equation"));
    }

    Ok(())
}

impl EncProof {
    pub fn to_bytes(&self) -> Vec<u8> {
        EncProofPb {
            s: self.s.to_bytes_be().1,
            a: self.a.to_bytes_be().1,
            c: self.c.to_bytes_be().1,
            z1: self.z1.to_signed_bytes_be(),
            z2: self.z2.to_bytes_be().1,
            z3: self.z3.to_signed_bytes_be(),
        }
        .encode_to_vec()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ProofError> {
        let pb = EncProofPb::decode(bytes).map_err(|e| ProofError::Malformed(e.to_string()))?;
        for field in [&pb.s, &pb.a, &pb.c, &pb.z1, &pb.z2, &pb.z3] {
            if field.is_empty() {
                return Err(ProofError::Malformed("empty proof field".into()));
            }
        }
        Ok(EncProof {
            s: BigInt::from_bytes_be(Sign::Plus, &pb.s),
            a: BigInt::from_bytes_be(Sign::Plus, &pb.a),
            c: BigInt::from_bytes_be(Sign::Plus, &pb.c),
            z1: BigInt::from_signed_bytes_be(&pb.z1),
            z2: BigInt::from_bytes_be(Sign::Plus, &pb.z2),
            z3: BigInt::from_signed_bytes_be(&pb.z3),
        })
    }
}
