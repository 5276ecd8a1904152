use num_bigint::{BigInt, RandBigInt};
use num_integer::Integer;
use num_traits::{One, Zero};
use rand::{CryptoRng, Rng, RngCore};

/// Fills and returns `len` bytes from the given RNG.
pub fn get_random_bytes<R: RngCore + CryptoRng>(rng: &mut R, len: usize) -> Vec<u8> {
    let mut buf = vec![0u8; len];
    rng.fill_bytes(&mut buf);
    buf
}

/// Uniform integer in `[1, less_than)`.
pub fn get_random_positive_int<R: Rng>(rng: &mut R, less_than: &BigInt) -> BigInt {
    debug_assert!(*less_than > BigInt::one());
    rng.gen_bigint_range(&BigInt::one(), less_than)
}

/// Uniform signed integer in `[-bound, bound]`, used for proof masks.
pub fn get_random_int_in_symmetric_range<R: Rng>(rng: &mut R, bound: &BigInt) -> BigInt {
    let two_bound = bound + bound;
    rng.gen_bigint_range(&BigInt::zero(), &(two_bound + BigInt::one())) - bound
}

/// Uniform integer in `[1, n)` that is coprime to `n`.
pub fn get_random_coprime_int<R: Rng>(rng: &mut R, n: &BigInt) -> BigInt {
    loop {
        let candidate = rng.gen_bigint_range(&BigInt::one(), n);
        if candidate.gcd(n).is_one() {
            return candidate;
        }
    }
}
