// Copyright © 2019 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

//! Paillier cryptosystem over `num-bigint`.
//!
//! Signing only ever uses the public operations: each party encrypts its own
//! nonce share under its own key, and the ciphertexts are consumed solely by
//! the range / log proofs. Decryption exists for completeness and tests.

use num_bigint::{BigInt, BigUint, Sign};
use num_integer::Integer;
use num_prime::RandPrime;
use num_traits::{One, Signed};
use rand::{CryptoRng, Rng};
use thiserror::Error;

use crate::common::int::ModInt;
use crate::common::random::get_random_coprime_int;

/// Paillier modulus length used for production pre-parameters.
pub const PAILLIER_MODULUS_BITS: usize = 2048;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PaillierError {
    #[error("message is negative or not smaller than the modulus")]
    MessageTooLong,
    #[error("ciphertext is malformed (out of range or gcd(c, N^2) != 1)")]
    MalformedCiphertext,
    #[error("key generation failed: {0}")]
    KeyGeneration(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKey {
    pub n: BigInt,
}

#[derive(Clone, Debug)]
pub struct PrivateKey {
    public_key: PublicKey,
    p: BigInt,
    q: BigInt,
    phi_n: BigInt,
}

impl PublicKey {
    pub fn new(n: BigInt) -> Self {
        PublicKey { n }
    }

    pub fn n_squared(&self) -> BigInt {
        &self.n * &self.n
    }

    fn gamma(&self) -> BigInt {
        &self.n + BigInt::one()
    }

    /// Encrypts `m` with fresh randomness, returning `(ciphertext, rho)`.
    /// The caller keeps `rho` when it must later prove facts about the
    /// ciphertext.
    pub fn encrypt_and_return_randomness<R: Rng + CryptoRng>(
        &self,
        rng: &mut R,
        m: &BigInt,
    ) -> Result<(BigInt, BigInt), PaillierError> {
        let rho = get_random_coprime_int(rng, &self.n);
        let c = self.encrypt_with_randomness(m, &rho)?;
        Ok((c, rho))
    }

    /// `c = (1 + N)^m * rho^N mod N^2`.
    pub fn encrypt_with_randomness(&self, m: &BigInt, rho: &BigInt) -> Result<BigInt, PaillierError> {
        if m.is_negative() || m >= &self.n {
            return Err(PaillierError::MessageTooLong);
        }
        let mod_nn = ModInt::new(self.n_squared());
        let gm = mod_nn.exp(&self.gamma(), m);
        let rn = mod_nn.exp(rho, &self.n);
        Ok(mod_nn.mul(&gm, &rn))
    }

    /// Homomorphic addition of plaintexts: `c1 * c2 mod N^2`.
    pub fn homo_add(&self, c1: &BigInt, c2: &BigInt) -> Result<BigInt, PaillierError> {
        let nn = self.n_squared();
        if !in_ciphertext_range(c1, &nn) || !in_ciphertext_range(c2, &nn) {
            return Err(PaillierError::MalformedCiphertext);
        }
        Ok(ModInt::new(nn).mul(c1, c2))
    }

    /// Homomorphic scalar multiplication of the plaintext: `c^m mod N^2`.
    pub fn homo_mult(&self, m: &BigInt, c: &BigInt) -> Result<BigInt, PaillierError> {
        if m.is_negative() || m >= &self.n {
            return Err(PaillierError::MessageTooLong);
        }
        let nn = self.n_squared();
        if !in_ciphertext_range(c, &nn) {
            return Err(PaillierError::MalformedCiphertext);
        }
        Ok(ModInt::new(nn).exp(c, m))
    }
}

fn in_ciphertext_range(c: &BigInt, nn: &BigInt) -> bool {
    !c.is_negative() && c < nn
}

impl PrivateKey {
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn phi_n(&self) -> &BigInt {
        &self.phi_n
    }

    pub fn primes(&self) -> (&BigInt, &BigInt) {
        (&self.p, &self.q)
    }

    /// `m = L(c^phi mod N^2) * phi^{-1} mod N`, with `L(x) = (x - 1) / N`.
    pub fn decrypt(&self, c: &BigInt) -> Result<BigInt, PaillierError> {
        let n = &self.public_key.n;
        let nn = self.public_key.n_squared();
        if !in_ciphertext_range(c, &nn) || !c.gcd(&nn).is_one() {
            return Err(PaillierError::MalformedCiphertext);
        }
        let l = (c.modpow(&self.phi_n, &nn) - BigInt::one()).div_floor(n);
        let phi_inv = self
            .phi_n
            .modinv(n)
            .ok_or_else(|| PaillierError::KeyGeneration("phi(N) not invertible".into()))?;
        Ok(ModInt::new(n.clone()).mul(&l, &phi_inv))
    }
}

/// Generates a Paillier key pair with an `n` of roughly `modulus_bits` bits.
/// Tests pass a reduced size; production uses [`PAILLIER_MODULUS_BITS`].
pub fn generate_keypair<R: Rng + CryptoRng>(
    rng: &mut R,
    modulus_bits: usize,
) -> Result<(PrivateKey, PublicKey), PaillierError> {
    if modulus_bits < 64 {
        return Err(PaillierError::KeyGeneration(format!(
            "modulus of {} bits is too small",
            modulus_bits
        )));
    }
    let prime_bits = modulus_bits / 2;
    loop {
        let p: BigUint = rng.gen_prime(prime_bits, None);
        let q: BigUint = rng.gen_prime(prime_bits, None);
        if p == q {
            continue;
        }
        let p = BigInt::from_biguint(Sign::Plus, p);
        let q = BigInt::from_biguint(Sign::Plus, q);
        let n = &p * &q;
        let phi_n = (&p - BigInt::one()) * (&q - BigInt::one());
        let public_key = PublicKey::new(n);
        let private_key = PrivateKey {
            public_key: public_key.clone(),
            p,
            q,
            phi_n,
        };
        return Ok((private_key, public_key));
    }
}
