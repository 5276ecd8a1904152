// Copyright © Swingby

//! Non-hardened child key derivation for Ed25519 shares.
//!
//! Adapts a keygen share to a wallet derivation path: every level derives an
//! additive offset from HMAC-SHA512 over the (combined) parent public key
//! and the owner's chain code. The offset shifts the private share and each
//! public share consistently, so the re-summed child public key stays in
//! step with the child shares.

use curve25519_dalek::edwards::EdwardsPoint;
use hmac::{Hmac, Mac};
use num_bigint::{BigInt, Sign};
use num_integer::Integer;
use num_traits::Zero;
use sha2::Sha512;
use thiserror::Error;

use crate::crypto::curve;

type HmacSha512 = Hmac<Sha512>;

/// Hardened derivation boundary; only non-hardened indices are supported.
pub const HARDENED_KEY_START: u32 = 0x8000_0000;

/// Maximum number of path levels.
pub const MAX_DEPTH: usize = 255;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CkdError {
    #[error("derivation path is malformed: {0}")]
    InvalidPath(String),
    #[error("index {0} is hardened; only non-hardened derivation is supported")]
    HardenedIndex(u32),
    #[error("derivation path exceeds the maximum depth of {MAX_DEPTH}")]
    MaxDepthExceeded,
    #[error("derived offset is zero; the path is unusable")]
    InvalidDerivedKey,
}

/// Parses `m/a/b/...` into its non-hardened indices.
pub fn parse_path(path: &str) -> Result<Vec<u32>, CkdError> {
    let mut parts = path.split('/');
    if parts.next() != Some("m") {
        return Err(CkdError::InvalidPath(format!("path must start with 'm': {}", path)));
    }
    let mut indices = Vec::new();
    for part in parts {
        let index: u32 = part
            .parse()
            .map_err(|_| CkdError::InvalidPath(format!("bad path segment: {}", part)))?;
        if index >= HARDENED_KEY_START {
            return Err(CkdError::HardenedIndex(index));
        }
        indices.push(index);
    }
    if indices.is_empty() {
        return Err(CkdError::InvalidPath(format!("path has no indices: {}", path)));
    }
    if indices.len() > MAX_DEPTH {
        return Err(CkdError::MaxDepthExceeded);
    }
    Ok(indices)
}

/// Walks the path, accumulating the total additive offset (mod the group
/// order) and the final chain code. The walk is a pure function of the
/// parent public key, the chain code and the path, so private- and
/// public-share derivation agree on the offset.
fn derive_offset(
    parent_pub: &EdwardsPoint,
    chain_code: &[u8],
    path: &str,
) -> Result<(BigInt, Vec<u8>), CkdError> {
    let indices = parse_path(path)?;
    let q = curve::curve_order();

    let mut point = *parent_pub;
    let mut cc = chain_code.to_vec();
    let mut offset = BigInt::zero();

    for index in indices {
        let mut mac = HmacSha512::new_from_slice(&cc)
            .map_err(|e| CkdError::InvalidPath(e.to_string()))?;
        mac.update(&curve::compress(&point));
        mac.update(&index.to_be_bytes());
        let digest = mac.finalize().into_bytes();

        let il = BigInt::from_bytes_be(Sign::Plus, &digest[..32]).mod_floor(q);
        if il.is_zero() {
            return Err(CkdError::InvalidDerivedKey);
        }

        offset = (offset + &il).mod_floor(q);
        point += curve::scalar_base_mult(&il);
        cc = digest[32..].to_vec();
    }

    Ok((offset, cc))
}

/// Derives the child private share for the owner of `chain_code`. Returns
/// the child share and the final chain code.
pub fn derive_child_private_share(
    priv_xi: &BigInt,
    parent_pub: &EdwardsPoint,
    chain_code: &[u8],
    path: &str,
) -> Result<(BigInt, Vec<u8>), CkdError> {
    let (offset, cc) = derive_offset(parent_pub, chain_code, path)?;
    let child = (priv_xi + offset).mod_floor(curve::curve_order());
    Ok((child, cc))
}

/// Derives the child public share of the party owning `chain_code`.
pub fn derive_child_public_share(
    pub_xj: &EdwardsPoint,
    parent_pub: &EdwardsPoint,
    chain_code: &[u8],
    path: &str,
) -> Result<EdwardsPoint, CkdError> {
    let (offset, _) = derive_offset(parent_pub, chain_code, path)?;
    Ok(pub_xj + curve::scalar_base_mult(&offset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    use crate::common::random::{get_random_bytes, get_random_positive_int};

    #[test]
    fn path_parsing() {
        assert_eq!(parse_path("m/44/0/0/0").unwrap(), vec![44, 0, 0, 0]);
        assert!(parse_path("x/44/0").is_err());
        assert!(parse_path("m").is_err());
        assert!(parse_path("m/abc").is_err());
        assert!(matches!(
            parse_path("m/2147483648"),
            Err(CkdError::HardenedIndex(_))
        ));
    }

    #[test]
    fn private_and_public_derivation_agree() {
        let q = curve::curve_order();
        let xi = get_random_positive_int(&mut OsRng, q);
        let pub_xi = curve::scalar_base_mult(&xi);
        let parent_pub = curve::scalar_base_mult(&get_random_positive_int(&mut OsRng, q));
        let cc = get_random_bytes(&mut OsRng, 32);
        let path = "m/44/60/0/1";

        let (child_xi, _) = derive_child_private_share(&xi, &parent_pub, &cc, path).unwrap();
        let child_pub = derive_child_public_share(&pub_xi, &parent_pub, &cc, path).unwrap();
        assert_eq!(curve::scalar_base_mult(&child_xi), child_pub);
    }

    #[test]
    fn different_paths_derive_different_keys() {
        let q = curve::curve_order();
        let xi = get_random_positive_int(&mut OsRng, q);
        let parent_pub = curve::scalar_base_mult(&get_random_positive_int(&mut OsRng, q));
        let cc = get_random_bytes(&mut OsRng, 32);

        let (a, _) = derive_child_private_share(&xi, &parent_pub, &cc, "m/0/0").unwrap();
        let (b, _) = derive_child_private_share(&xi, &parent_pub, &cc, "m/0/1").unwrap();
        assert_ne!(a, b);
    }
}
