// Copyright © 2019 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

//! Persisted keygen artifacts.
//!
//! `LocalPartySaveData` is the per-party output of a completed keygen run:
//! the private share, every party's public share, the combined public key
//! and every party's Paillier / ring-Pedersen public parameters. It is
//! serialized as a single opaque blob; the private share never appears in
//! any round message.

use curve25519_dalek::edwards::EdwardsPoint;
use num_bigint::{BigInt, Sign};
use prost::Message;
use rand::{CryptoRng, Rng};

use crate::crypto::curve;
use crate::crypto::paillier::{self, PublicKey as PaillierPublicKey};
use crate::crypto::pedersen::{self, PedersenParams, PedersenPrivate};
use crate::tss::error::ErrorKind;
use crate::tss::party_id::SortedPartyIDs;

/// Pre-computed local parameters: the party's Paillier key pair and the
/// ring-Pedersen parameters derived from it. Generating the 2048-bit
/// modulus is slow, so sessions accept these pre-built (tests use reduced
/// moduli).
#[derive(Clone, Debug)]
pub struct LocalPreParams {
    pub paillier_sk: paillier::PrivateKey,
    pub paillier_pk: PaillierPublicKey,
    pub pedersen: PedersenPrivate,
}

/// Generates fresh pre-parameters with a Paillier modulus of `modulus_bits`.
pub fn generate_pre_params<R: Rng + CryptoRng>(
    rng: &mut R,
    modulus_bits: usize,
) -> Result<LocalPreParams, ErrorKind> {
    let (paillier_sk, paillier_pk) = paillier::generate_keypair(rng, modulus_bits)
        .map_err(|e| ErrorKind::Crypto(e.to_string()))?;
    let pedersen = pedersen::generate_from_paillier(rng, &paillier_sk);
    Ok(LocalPreParams { paillier_sk, paillier_pk, pedersen })
}

#[derive(Clone, Debug)]
pub struct LocalPartySaveData {
    /// This party's private share `x_i`; never serialized into messages.
    pub priv_xi: Option<BigInt>,
    /// This party's original index key.
    pub share_id: Option<BigInt>,
    /// Optional per-party chain codes for child key derivation.
    pub chain_codes: Option<Vec<BigInt>>,
    /// Original index keys of all parties, in canonical order.
    pub ks: Vec<BigInt>,
    /// Public shares `X_j = x_j * G` for each party.
    pub pub_xj: Vec<Option<EdwardsPoint>>,
    /// Combined EdDSA public key `Y = sum X_j`.
    pub eddsa_pub: Option<EdwardsPoint>,
    /// Per-party Paillier public keys.
    pub paillier_pks: Vec<Option<PaillierPublicKey>>,
    /// Per-party ring-Pedersen public parameters.
    pub ring_pedersen_pks: Vec<Option<PedersenParams>>,
}

#[derive(Clone, PartialEq, Message)]
struct PedersenPb {
    #[prost(bytes = "vec", tag = "1")]
    n: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    s: Vec<u8>,
    #[prost(bytes = "vec", tag = "3")]
    t: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
struct SaveDataPb {
    #[prost(bytes = "vec", tag = "1")]
    priv_xi: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    share_id: Vec<u8>,
    #[prost(bytes = "vec", repeated, tag = "3")]
    chain_codes: Vec<Vec<u8>>,
    #[prost(bytes = "vec", repeated, tag = "4")]
    ks: Vec<Vec<u8>>,
    #[prost(bytes = "vec", repeated, tag = "5")]
    pub_xj: Vec<Vec<u8>>,
    #[prost(bytes = "vec", tag = "6")]
    eddsa_pub: Vec<u8>,
    #[prost(bytes = "vec", repeated, tag = "7")]
    paillier_ns: Vec<Vec<u8>>,
    #[prost(message, repeated, tag = "8")]
    ring_pedersen_pks: Vec<PedersenPb>,
}

impl LocalPartySaveData {
    pub fn new(party_count: usize) -> Self {
        LocalPartySaveData {
            priv_xi: None,
            share_id: None,
            chain_codes: None,
            ks: Vec::new(),
            pub_xj: vec![None; party_count],
            eddsa_pub: None,
            paillier_pks: vec![None; party_count],
            ring_pedersen_pks: vec![None; party_count],
        }
    }

    pub fn party_count(&self) -> usize {
        self.pub_xj.len()
    }

    /// Serializes completed save data. Every per-party entry must be
    /// present and `len(pub_xj) == len(ks) == party_count`.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ErrorKind> {
        let n = self.party_count();
        if self.ks.len() != n {
            return Err(ErrorKind::MissingParameter("party index keys"));
        }
        let priv_xi = self
            .priv_xi
            .as_ref()
            .ok_or(ErrorKind::MissingParameter("private share"))?;
        let share_id = self
            .share_id
            .as_ref()
            .ok_or(ErrorKind::MissingParameter("share id"))?;
        let eddsa_pub = self
            .eddsa_pub
            .as_ref()
            .ok_or(ErrorKind::MissingParameter("combined public key"))?;

        let mut pub_xj = Vec::with_capacity(n);
        for share in &self.pub_xj {
            let point = share.as_ref().ok_or(ErrorKind::MissingParameter("public share"))?;
            pub_xj.push(curve::compress(point).to_vec());
        }
        let mut paillier_ns = Vec::with_capacity(n);
        for pk in &self.paillier_pks {
            let pk = pk
                .as_ref()
                .ok_or(ErrorKind::MissingParameter("Paillier public key"))?;
            paillier_ns.push(pk.n.to_bytes_be().1);
        }
        let mut ring_pedersen_pks = Vec::with_capacity(n);
        for ped in &self.ring_pedersen_pks {
            let ped = ped
                .as_ref()
                .ok_or(ErrorKind::MissingParameter("ring-Pedersen parameters"))?;
            ring_pedersen_pks.push(PedersenPb {
                n: ped.n.to_bytes_be().1,
                s: ped.s.to_bytes_be().1,
                t: ped.t.to_bytes_be().1,
            });
        }

        let pb = SaveDataPb {
            priv_xi: priv_xi.to_bytes_be().1,
            share_id: share_id.to_bytes_be().1,
            chain_codes: self
                .chain_codes
                .as_ref()
                .map(|codes| codes.iter().map(|c| c.to_bytes_be().1).collect())
                .unwrap_or_default(),
            ks: self.ks.iter().map(|k| k.to_bytes_be().1).collect(),
            pub_xj,
            eddsa_pub: curve::compress(eddsa_pub).to_vec(),
            paillier_ns,
            ring_pedersen_pks,
        };
        Ok(pb.encode_to_vec())
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ErrorKind> {
        let pb = SaveDataPb::decode(bytes)
            .map_err(|e| ErrorKind::MalformedMessage(format!("save data decode: {}", e)))?;
        let n = pb.ks.len();
        if n < 2 {
            return Err(ErrorKind::MalformedMessage("save data has fewer than two parties".into()));
        }
        if pb.pub_xj.len() != n || pb.paillier_ns.len() != n || pb.ring_pedersen_pks.len() != n {
            return Err(ErrorKind::MalformedMessage("save data arrays disagree on party count".into()));
        }
        if !pb.chain_codes.is_empty() && pb.chain_codes.len() != n {
            return Err(ErrorKind::MalformedMessage("chain code count mismatch".into()));
        }

        let mut pub_xj = Vec::with_capacity(n);
        for bytes in &pb.pub_xj {
            let point = curve::decompress(bytes).ok_or_else(|| {
                ErrorKind::MalformedMessage("public share is not a curve point".into())
            })?;
            pub_xj.push(Some(point));
        }
        let eddsa_pub = curve::decompress(&pb.eddsa_pub).ok_or_else(|| {
            ErrorKind::MalformedMessage("combined public key is not a curve point".into())
        })?;

        Ok(LocalPartySaveData {
            priv_xi: Some(BigInt::from_bytes_be(Sign::Plus, &pb.priv_xi)),
            share_id: Some(BigInt::from_bytes_be(Sign::Plus, &pb.share_id)),
            chain_codes: if pb.chain_codes.is_empty() {
                None
            } else {
                Some(
                    pb.chain_codes
                        .iter()
                        .map(|c| BigInt::from_bytes_be(Sign::Plus, c))
                        .collect(),
                )
            },
            ks: pb.ks.iter().map(|k| BigInt::from_bytes_be(Sign::Plus, k)).collect(),
            pub_xj,
            eddsa_pub: Some(eddsa_pub),
            paillier_pks: pb
                .paillier_ns
                .iter()
                .map(|n| Some(PaillierPublicKey::new(BigInt::from_bytes_be(Sign::Plus, n))))
                .collect(),
            ring_pedersen_pks: pb
                .ring_pedersen_pks
                .iter()
                .map(|p| {
                    Some(PedersenParams::new(
                        BigInt::from_bytes_be(Sign::Plus, &p.n),
                        BigInt::from_bytes_be(Sign::Plus, &p.s),
                        BigInt::from_bytes_be(Sign::Plus, &p.t),
                    ))
                })
                .collect(),
        })
    }
}

/// Re-indexes save data for the party set of a signing run. Fails with an
/// explicit error when a signer is unknown to the source data.
pub fn build_local_save_data_subset(
    source: &LocalPartySaveData,
    sorted_ids: &SortedPartyIDs,
) -> Result<LocalPartySaveData, ErrorKind> {
    let mut new_data = LocalPartySaveData::new(sorted_ids.len());
    new_data.priv_xi = source.priv_xi.clone();
    new_data.share_id = source.share_id.clone();
    new_data.eddsa_pub = source.eddsa_pub;

    let mut ks = Vec::with_capacity(sorted_ids.len());
    let mut chain_codes = source.chain_codes.as_ref().map(|_| Vec::with_capacity(sorted_ids.len()));
    for (j, id) in sorted_ids.iter().enumerate() {
        let saved_idx = source
            .ks
            .iter()
            .position(|k| k == id.key())
            .ok_or_else(|| {
                ErrorKind::MalformedMessage(format!(
                    "signer party {} not found in local save data",
                    id.key()
                ))
            })?;
        ks.push(source.ks[saved_idx].clone());
        new_data.pub_xj[j] = source.pub_xj[saved_idx];
        new_data.paillier_pks[j] = source.paillier_pks[saved_idx].clone();
        new_data.ring_pedersen_pks[j] = source.ring_pedersen_pks[saved_idx].clone();
        if let (Some(out), Some(src)) = (chain_codes.as_mut(), source.chain_codes.as_ref()) {
            out.push(src[saved_idx].clone());
        }
    }
    new_data.ks = ks;
    new_data.chain_codes = chain_codes;
    Ok(new_data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    use crate::common::random::get_random_positive_int;
    use crate::tss::party_id::SortedPartyIDs;

    fn dummy_save_data(keys: &[u64]) -> LocalPartySaveData {
        let n = keys.len();
        let mut data = LocalPartySaveData::new(n);
        let q = curve::curve_order();
        let (sk, pk) = paillier::generate_keypair(&mut OsRng, 256).unwrap();
        let ped = pedersen::generate_from_paillier(&mut OsRng, &sk).params().clone();
        data.priv_xi = Some(get_random_positive_int(&mut OsRng, q));
        data.share_id = Some(BigInt::from(keys[0]));
        data.ks = keys.iter().map(|k| BigInt::from(*k)).collect();
        for j in 0..n {
            data.pub_xj[j] = Some(curve::scalar_base_mult(&BigInt::from(j as u64 + 1)));
            data.paillier_pks[j] = Some(pk.clone());
            data.ring_pedersen_pks[j] = Some(ped.clone());
        }
        data.eddsa_pub = Some(curve::scalar_base_mult(&BigInt::from(9u8)));
        data
    }

    #[test]
    fn blob_round_trip() {
        let data = dummy_save_data(&[10, 20, 30]);
        let blob = data.to_bytes().unwrap();
        let decoded = LocalPartySaveData::from_bytes(&blob).unwrap();
        assert_eq!(decoded.priv_xi, data.priv_xi);
        assert_eq!(decoded.ks, data.ks);
        assert_eq!(decoded.pub_xj, data.pub_xj);
        assert_eq!(decoded.eddsa_pub, data.eddsa_pub);
        assert_eq!(decoded.paillier_pks, data.paillier_pks);
        assert_eq!(decoded.ring_pedersen_pks, data.ring_pedersen_pks);
    }

    #[test]
    fn incomplete_data_does_not_serialize() {
        let mut data = dummy_save_data(&[10, 20]);
        data.pub_xj[1] = None;
        assert_eq!(data.to_bytes(), Err(ErrorKind::MissingParameter("public share")));
    }

    #[test]
    fn subset_reindexes_by_key() {
        let data = dummy_save_data(&[10, 20, 30]);
        let signers =
            SortedPartyIDs::from_keys(&[BigInt::from(30), BigInt::from(10), BigInt::from(20)])
                .unwrap();
        let subset = build_local_save_data_subset(&data, &signers).unwrap();
        assert_eq!(subset.ks, data.ks);
        assert_eq!(subset.pub_xj, data.pub_xj);
    }

    #[test]
    fn subset_with_unknown_signer_fails() {
        let data = dummy_save_data(&[10, 20, 30]);
        let signers =
            SortedPartyIDs::from_keys(&[BigInt::from(10), BigInt::from(99)]).unwrap();
        assert!(build_local_save_data_subset(&data, &signers).is_err());
    }

    #[test]
    fn malformed_blob_is_rejected() {
        assert!(LocalPartySaveData::from_bytes(&[1, 2, 3]).is_err());
    }
}
