// Copyright © 2019 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

//! "Know exponent and matching Paillier plaintext" proof ("log" proof).
//!
//! Proves knowledge of `k` and `rho` such that both `K = Enc_{N0}(k; rho)`
//! and `X = k * G` hold for the same `k`, committed under the verifier's
//! ring-Pedersen parameters. Signing uses this to tie each party's revealed
//! nonce point `R_i` to the ciphertext it broadcast in round one.

use curve25519_dalek::edwards::EdwardsPoint;
use num_bigint::{BigInt, Sign};
use num_traits::{One, Signed};
use prost::Message;
use rand::{CryptoRng, Rng};

use crate::common::hash::sha512_256i_tagged;
use crate::common::hash_utils::rejection_sample;
use crate::common::int::ModInt;
use crate::common::random::{get_random_coprime_int, get_random_int_in_symmetric_range};
use crate::crypto::curve;
use crate::crypto::pedersen::PedersenParams;
use crate::crypto::proof_config::{ProofConfig, ProofError};

/// Proof transcript: commitments `(S, A, Y, D)` and responses
/// `(z1, z2, z3)`. `Y = alpha * G` carries the curve side of the statement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogProof {
    pub s: BigInt,
    pub a: BigInt,
    pub y: EdwardsPoint,
    pub d: BigInt,
    pub z1: BigInt,
    pub z2: BigInt,
    pub z3: BigInt,
}

#[derive(Clone, PartialEq, Message)]
struct LogProofPb {
    #[prost(bytes = "vec", tag = "1")]
    s: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    a: Vec<u8>,
    #[prost(bytes = "vec", tag = "3")]
    y: Vec<u8>,
    #[prost(bytes = "vec", tag = "4")]
    d: Vec<u8>,
    #[prost(bytes = "vec", tag = "5")]
    z1: Vec<u8>,
    #[prost(bytes = "vec", tag = "6")]
    z2: Vec<u8>,
    #[prost(bytes = "vec", tag = "7")]
    z3: Vec<u8>,
}

#[allow(clippy::too_many_arguments)]
fn challenge(
    config: &ProofConfig,
    context: &[u8],
    n0: &BigInt,
    ped: &PedersenParams,
    k_ciphertext: &BigInt,
    big_x: &EdwardsPoint,
    s: &BigInt,
    a: &BigInt,
    y: &EdwardsPoint,
    d: &BigInt,
) -> BigInt {
    let x_int = BigInt::from_bytes_be(Sign::Plus, &curve::compress(big_x));
    let y_int = BigInt::from_bytes_be(Sign::Plus, &curve::compress(y));
    let e_hash = sha512_256i_tagged(
        context,
        &[n0, &ped.n, &ped.s, &ped.t, k_ciphertext, &x_int, s, a, &y_int, d],
    );
    rejection_sample(config.q(), &e_hash)
}

/// Produces a log proof for `K = Enc_{N0}(k; rho)` and `X = k * G`, bound to
/// `context` and the verifier's ring-Pedersen parameters.
#[allow(clippy::too_many_arguments)]
pub fn prove<R: Rng + CryptoRng>(
    rng: &mut R,
    config: &ProofConfig,
    context: &[u8],
    k: &BigInt,
    rho: &BigInt,
    k_ciphertext: &BigInt,
    n0: &BigInt,
    ped: &PedersenParams,
    big_x: &EdwardsPoint,
) -> Result<LogProof, ProofError> {
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
    let d = ped
        .commit(&alpha, &gamma)
        .ok_or(ProofError::InvalidParameters("ring-Pedersen parameters"))?;

    let mod_nn = ModInt::new(n0 * n0);
    let g_alpha = mod_nn
        .exp_signed(&(n0 + BigInt::one()), &alpha)
        .ok_or(ProofError::InvalidParameters("Paillier modulus"))?;
    let a = mod_nn.mul(&g_alpha, &mod_nn.exp(&r, n0));

    let y = curve::scalar_base_mult(&alpha);

    let e = challenge(config, context, n0, ped, k_ciphertext, big_x, &s, &a, &y, &d);

    let mod_n0 = ModInt::new(n0.clone());
    let z1 = &alpha + &e * k;
    let z2 = mod_n0.mul(&r, &mod_n0.exp(rho, &e));
    let z3 = &gamma + &e * &mu;

    Ok(LogProof { s, a, y, d, z1, z2, z3 })
}

/// Verifies a log proof against `K`, `X`, the prover's Paillier modulus and
/// the verifier's own ring-Pedersen parameters.
pub fn verify(
    config: &ProofConfig,
    context: &[u8],
    k_ciphertext: &BigInt,
    n0: &BigInt,
    ped: &PedersenParams,
    big_x: &EdwardsPoint,
    proof: &LogProof,
) -> Result<(), ProofError> {
    if !ped.validate() {
        return Err(ProofError::InvalidParameters("ring-Pedersen parameters"));
    }
    if proof.z1.abs() > config.two_pow_ell_eps() {
        return Err(ProofError::VerificationFailed("z1 out of range"));
    }

    let e = challenge(
        config, context, n0, ped, k_ciphertext, big_x, &proof.s, &proof.a, &proof.y, &proof.d,
    );

    // (1 + N0)^z1 * z2^N0 == A * K^e mod N0^2
    let mod_nn = ModInt::new(n0 * n0);
    let lhs = {
        let g_z1 = mod_nn
            .exp_signed(&(n0 + BigInt::one()), &proof.z1)
            .ok_or(ProofError::VerificationFailed("degenerate modulus"))?;
        mod_nn.mul(&g_z1, &mod_nn.exp(&proof.z2, n0))
    };
    let rhs = mod_nn.mul(&proof.a, &mod_nn.exp(k_ciphertext, &e));
    if lhs != rhs {
        return Err(ProofError::VerificationFailed("ciphertext equation"));
    }

    // z1 * G == Y + e * X
    let lhs = curve::scalar_base_mult(&proof.z1);
    let rhs = proof.y + big_x * curve::scalar_from_bigint(&e);
    if lhs != rhs {
        return Err(ProofError::VerificationFailed("curve equation"));
    }

    // s^z1 * t^z3 == D * S^e mod N-hat
    let mod_nhat = ModInt::new(ped.n.clone());
    let lhs = ped
        .commit(&proof.z1, &proof.z3)
        .ok_or(ProofError::VerificationFailed("degenerate commitment"))?;
    let rhs = mod_nhat.mul(&proof.d, &mod_nhat.exp(&proof.s, &e));
    if lhs != rhs {
        return Err(ProofError::VerificationFailed("commitment equation"));
    }

    Ok(())
}

impl LogProof {
    pub fn to_bytes(&self) -> Vec<u8> {
        LogProofPb {
            s: self.s.to_bytes_be().1,
            a: self.a.to_bytes_be().1,
            y: curve::compress(&self.y).to_vec(),
            d: self.d.to_bytes_be().1,
            z1: self.z1.to_signed_bytes_be(),
            z2: self.z2.to_bytes_be().1,
            z3: self.z3.to_signed_bytes_be(),
        }
        .encode_to_vec()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ProofError> {
        let pb = LogProofPb::decode(bytes).map_err(|e| ProofError::Malformed(e.to_string()))?;
        for field in [&pb.s, &pb.a, &pb.y, &pb.d, &pb.z1, &pb.z2, &pb.z3] {
            if field.is_empty() {
                return Err(ProofError::Malformed("empty proof field".into()));
            }
        }
        let y = curve::decompress(&pb.y)
            .ok_or_else(|| ProofError::Malformed("Y is not a curve point".into()))?;
        Ok(LogProof {
            s: BigInt::from_bytes_be(Sign::Plus, &pb.s),
            a: BigInt::from_bytes_be(Sign::Plus, &pb.a),
            y,
            d: BigInt::from_bytes_be(Sign::Plus, &pb.d),
            z1: BigInt::from_signed_bytes_be(&pb.z1),
            z2: BigInt::from_bytes_be(Sign::Plus, &pb.z2),
            z3: BigInt::from_signed_bytes_be(&pb.z3),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    use crate::common::random::get_random_positive_int;
    use crate::crypto::paillier::generate_keypair;
    use crate::crypto::pedersen::generate_from_paillier;

    struct Fixture {
        n0: BigInt,
        k: BigInt,
        rho: BigInt,
        k_ct: BigInt,
        big_x: EdwardsPoint,
        ped: PedersenParams,
    }

    fn setup() -> Fixture {
        let (_, pk) = generate_keypair(&mut OsRng, 512).unwrap();
        let k = get_random_positive_int(&mut OsRng, curve::curve_order());
        let (k_ct, rho) = pk.encrypt_and_return_randomness(&mut OsRng, &k).unwrap();
        let big_x = curve::scalar_base_mult(&k);
        let (ver_sk, _) = generate_keypair(&mut OsRng, 512).unwrap();
        let ped = generate_from_paillier(&mut OsRng, &ver_sk).params().clone();
        Fixture { n0: pk.n, k, rho, k_ct, big_x, ped }
    }

    #[test]
    fn prove_verify_round_trip() {
        let f = setup();
        let cfg = ProofConfig::for_edwards();
        let ctx = b"log-proof-test-context";

        let proof = prove(&mut OsRng, &cfg, ctx, &f.k, &f.rho, &f.k_ct, &f.n0, &f.ped, &f.big_x)
            .unwrap();
        assert!(verify(&cfg, ctx, &f.k_ct, &f.n0, &f.ped, &f.big_x, &proof).is_ok());
    }

    #[test]
    fn mismatched_point_fails() {
        let f = setup();
        let cfg = ProofConfig::for_edwards();
        let ctx = b"log-proof-test-context";
        let proof = prove(&mut OsRng, &cfg, ctx, &f.k, &f.rho, &f.k_ct, &f.n0, &f.ped, &f.big_x)
            .unwrap();

        let other = curve::scalar_base_mult(&(&f.k + BigInt::one()));
        assert!(verify(&cfg, ctx, &f.k_ct, &f.n0, &f.ped, &other, &proof).is_err());
    }

    #[test]
    fn wrong_context_fails() {
        let f = setup();
        let cfg = ProofConfig::for_edwards();
        let proof = prove(&mut OsRng, &cfg, b"ctx-a", &f.k, &f.rho, &f.k_ct, &f.n0, &f.ped, &f.big_x)
            .unwrap();
        assert!(verify(&cfg, b"ctx-b", &f.k_ct, &f.n0, &f.ped, &f.big_x, &proof).is_err());
    }

    #[test]
    fn tampered_response_fails() {
        let f = setup();
        let cfg = ProofConfig::for_edwards();
        let ctx = b"log-proof-test-context";
        let mut proof = prove(&mut OsRng, &cfg, ctx, &f.k, &f.rho, &f.k_ct, &f.n0, &f.ped, &f.big_x)
            .unwrap();
        proof.z3 += BigInt::one();
        assert!(verify(&cfg, ctx, &f.k_ct, &f.n0, &f.ped, &f.big_x, &proof).is_err());
    }

    #[test]
    fn serialization_round_trip() {
        let f = setup();
        let cfg = ProofConfig::for_edwards();
        let ctx = b"log-proof-test-context";
        let proof = prove(&mut OsRng, &cfg, ctx, &f.k, &f.rho, &f.k_ct, &f.n0, &f.ped, &f.big_x)
            .unwrap();

        let decoded = LogProof::from_bytes(&proof.to_bytes()).unwrap();
        assert_eq!(decoded, proof);
        assert!(verify(&cfg, ctx, &f.k_ct, &f.n0, &f.ped, &f.big_x, &decoded).is_ok());
        assert!(LogProof::from_bytes(&[0xFFu8; 7]).is_err());
    }
}
