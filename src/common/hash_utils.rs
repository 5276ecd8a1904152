// Copyright © 2019 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

use num_bigint::BigInt;

use crate::common::hash::sha512_256i;

/// Maps a hash-derived value into `[0, q)` by rejection sampling: the value
/// is re-hashed (chained) until it falls strictly below `q`. Unlike a plain
/// `mod q` reduction this introduces no modulo bias.
///
/// `q` must exceed 2^224 or so for the expected number of iterations to stay
/// small; protocol group orders are ~2^252.
pub fn rejection_sample(q: &BigInt, e_hash: &BigInt) -> BigInt {
    let mut candidate = e_hash.clone();
    while &candidate >= q {
        candidate = sha512_256i(&[&candidate]);
    }
    candidate
}
