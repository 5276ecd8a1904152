pub fn non_empty_bytes(bz: &[u8]) -> bool {
    !bz.is_empty()
}

/// Byte-wise XOR of two equal-length slices.
pub fn xor(a: &[u8], b: &[u8]) -> Vec<u8> {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b.iter()).map(|(x, y)| x ^ y).collect()
}

/// Left-pads `src` with zero bytes up to `length`.
pub fn pad_to_length(src: &[u8], length: usize) -> Vec<u8> {
    if src.len() >= length {
        return src.to_vec();
    }
    let mut out = vec![0u8; length - src.len()];
    out.extend_from_slice(src);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xor_is_involutive() {
        let a = vec![0xAAu8; 32];
        let b = vec![0x55u8; 32];
        assert_eq!(xor(&xor(&a, &b), &b), a);
    }

    #[test]
    fn pad_prepends_zeros() {
        assert_eq!(pad_to_length(&[1, 2], 4), vec![0, 0, 1, 2]);
        assert_eq!(pad_to_length(&[1, 2, 3, 4], 4), vec![1, 2, 3, 4]);
    }
}
