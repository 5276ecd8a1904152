// Copyright © 2019 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::Signed;

/// Modular arithmetic under a fixed positive modulus.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModInt {
    modulus: BigInt,
}

impl ModInt {
    pub fn new(modulus: BigInt) -> Self {
        assert!(modulus.is_positive(), "modulus must be positive");
        ModInt { modulus }
    }

    pub fn modulus(&self) -> &BigInt {
        &self.modulus
    }

    pub fn add(&self, x: &BigInt, y: &BigInt) -> BigInt {
        (x + y).mod_floor(&self.modulus)
    }

    pub fn sub(&self, x: &BigInt, y: &BigInt) -> BigInt {
        (x - y).mod_floor(&self.modulus)
    }

    pub fn mul(&self, x: &BigInt, y: &BigInt) -> BigInt {
        (x * y).mod_floor(&self.modulus)
    }

    /// `base^exponent mod m` for a non-negative exponent.
    pub fn exp(&self, base: &BigInt, exponent: &BigInt) -> BigInt {
        base.modpow(exponent, &self.modulus)
    }

    /// `base^exponent mod m` where the exponent may be negative; requires
    /// `base` invertible modulo `m` in that case.
    pub fn exp_signed(&self, base: &BigInt, exponent: &BigInt) -> Option<BigInt> {
        if exponent.is_negative() {
            let inv = self.mod_inverse(base)?;
            Some(inv.modpow(&exponent.abs(), &self.modulus))
        } else {
            Some(base.modpow(exponent, &self.modulus))
        }
    }

    /// Modular multiplicative inverse; `None` when `gcd(g, m) != 1`.
    pub fn mod_inverse(&self, g: &BigInt) -> Option<BigInt> {
        g.mod_floor(&self.modulus).modinv(&self.modulus)
    }
}
