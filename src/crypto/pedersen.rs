// Copyright © 2019 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

//! Ring-Pedersen commitment parameters.
//!
//! A party derives its parameters from its own Paillier key: `t = tau^2 mod
//! N`, `s = t^lambda mod N` with `lambda` sampled below `phi(N)`. Only the
//! public triple `(N, s, t)` is ever shared; counterparts use it to verify
//! range and log proofs addressed to them.

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed};
use rand::{CryptoRng, Rng};

use crate::common::int::ModInt;
use crate::common::random::{get_random_coprime_int, get_random_positive_int};
use crate::crypto::paillier::PrivateKey;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PedersenParams {
    pub n: BigInt,
    pub s: BigInt,
    pub t: BigInt,
}

impl PedersenParams {
    pub fn new(n: BigInt, s: BigInt, t: BigInt) -> Self {
        PedersenParams { n, s, t }
    }

    /// Structural validity: `s` and `t` are units of `Z/N` and `N > 1`.
    pub fn validate(&self) -> bool {
        self.n > BigInt::one()
            && in_unit_group(&self.s, &self.n)
            && in_unit_group(&self.t, &self.n)
    }

    /// `s^a * t^b mod N` with signed exponents.
    pub fn commit(&self, a: &BigInt, b: &BigInt) -> Option<BigInt> {
        let mod_n = ModInt::new(self.n.clone());
        let sa = mod_n.exp_signed(&self.s, a)?;
        let tb = mod_n.exp_signed(&self.t, b)?;
        Some(mod_n.mul(&sa, &tb))
    }
}

fn in_unit_group(x: &BigInt, n: &BigInt) -> bool {
    x.is_positive() && x < n && x.gcd(n).is_one()
}

/// Private generation record; the secret `lambda` stays with the owner.
#[derive(Clone, Debug)]
pub struct PedersenPrivate {
    params: PedersenParams,
    lambda: BigInt,
}

impl PedersenPrivate {
    pub fn params(&self) -> &PedersenParams {
        &self.params
    }

    pub fn lambda(&self) -> &BigInt {
        &self.lambda
    }
}

/// Derives ring-Pedersen parameters from a Paillier private key.
pub fn generate_from_paillier<R: Rng + CryptoRng>(rng: &mut R, sk: &PrivateKey) -> PedersenPrivate {
    let n = &sk.public_key().n;
    let mod_n = ModInt::new(n.clone());
    let lambda = get_random_positive_int(rng, sk.phi_n());
    let tau = get_random_coprime_int(rng, n);
    let t = mod_n.mul(&tau, &tau);
    let s = mod_n.exp(&t, &lambda);
    PedersenPrivate {
        params: PedersenParams::new(n.clone(), s, t),
        lambda,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::paillier::generate_keypair;
    use num_traits::Zero;
    use rand::rngs::OsRng;

    #[test]
    fn generated_params_validate() {
        let (sk, _) = generate_keypair(&mut OsRng, 512).unwrap();
        let ped = generate_from_paillier(&mut OsRng, &sk);
        assert!(ped.params().validate());
    }

    #[test]
    fn commit_handles_signed_exponents() {
        let (sk, _) = generate_keypair(&mut OsRng, 512).unwrap();
        let ped = generate_from_paillier(&mut OsRng, &sk).params().clone();
        let a = BigInt::from(17u32);
        let c1 = ped.commit(&a, &BigInt::from(-5i32)).unwrap();
        let c2 = ped.commit(&a, &BigInt::from(5u32)).unwrap();
        let mod_n = ModInt::new(ped.n.clone());
        assert_eq!(mod_n.mul(&c1, &mod_n.exp(&ped.t, &BigInt::from(10u32))), c2);
        assert!(!c1.is_zero());
    }

    #[test]
    fn invalid_params_fail_validation() {
        let (sk, _) = generate_keypair(&mut OsRng, 512).unwrap();
        let mut params = generate_from_paillier(&mut OsRng, &sk).params().clone();
        params.s = params.n.clone();
        assert!(!params.validate());
    }
}
