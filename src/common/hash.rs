// Copyright © 2019 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

use num_bigint::{BigInt, Sign};
use sha2::{Digest, Sha512_256};

const HASH_INPUT_DELIMITER: u8 = b'$';

/// Frames the inputs with a count prefix plus per-input delimiter and length
/// suffix, so that `H(a, b)` can never collide with `H(ab)` or `H(b, a)`.
fn prepare_hash_data(inputs: &[&[u8]]) -> Vec<u8> {
    let input_len = inputs.len();
    let bz_size: usize = inputs.iter().map(|bz| bz.len()).sum();

    let mut data = Vec::with_capacity(8 + bz_size + input_len * 9);
    data.extend_from_slice(&(input_len as u64).to_le_bytes());
    for bz in inputs {
        data.extend_from_slice(bz);
        data.push(HASH_INPUT_DELIMITER);
        data.extend_from_slice(&(bz.len() as u64).to_le_bytes());
    }
    data
}

/// SHA-512/256 over framed byte slices.
pub fn sha512_256(inputs: &[&[u8]]) -> Vec<u8> {
    let data = prepare_hash_data(inputs);
    Sha512_256::digest(&data).to_vec()
}

/// SHA-512/256 over framed big integers (big-endian magnitudes).
pub fn sha512_256i(inputs: &[&BigInt]) -> BigInt {
    let input_bytes: Vec<Vec<u8>> = inputs.iter().map(|n| n.to_bytes_be().1).collect();
    let input_slices: Vec<&[u8]> = input_bytes.iter().map(|v| v.as_slice()).collect();
    let data = prepare_hash_data(&input_slices);
    BigInt::from_bytes_be(Sign::Plus, &Sha512_256::digest(&data))
}

/// Tagged SHA-512/256 over big integers. The tag hash is absorbed twice
/// before the framed inputs, keeping tagged and untagged domains disjoint.
pub fn sha512_256i_tagged(tag: &[u8], inputs: &[&BigInt]) -> BigInt {
    let tag_hash = Sha512_256::digest(tag);

    let mut state = Sha512_256::new();
    state.update(tag_hash);
    state.update(tag_hash);

    let input_bytes: Vec<Vec<u8>> = inputs.iter().map(|n| n.to_bytes_be().1).collect();
    let input_slices: Vec<&[u8]> = input_bytes.iter().map(|v| v.as_slice()).collect();
    state.update(prepare_hash_data(&input_slices));

    BigInt::from_bytes_be(Sign::Plus, &state.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_and_framing_matter() {
        let h1 = sha512_256(&[b"hello", b"world"]);
        let h2 = sha512_256(&[b"world", b"hello"]);
        let h3 = sha512_256(&[b"helloworld"]);
        assert_ne!(h1, h2);
        assert_ne!(h1, h3);
        assert_eq!(h1.len(), 32);
    }

    #[test]
    fn bigint_inputs_are_framed() {
        let a = BigInt::from(0x1234u32);
        let b = BigInt::from(0x5678u32);
        let concat = BigInt::from(0x12345678u64);
        assert_ne!(sha512_256i(&[&a, &b]), sha512_256i(&[&concat]));
    }

    #[test]
    fn tag_separates_domains() {
        let a = BigInt::from(42u32);
        let h1 = sha512_256i_tagged(b"tag-one", &[&a]);
        let h2 = sha512_256i_tagged(b"tag-two", &[&a]);
        let h3 = sha512_256i(&[&a]);
        assert_ne!(h1, h2);
        assert_ne!(h1, h3);
    }
}
