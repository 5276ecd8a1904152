// Copyright © 2019 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

//! Keygen wire messages.
//!
//! A single envelope embeds a closed payload union, one variant per round;
//! each accept function decodes once at the boundary and statically matches
//! its expected variant.

use curve25519_dalek::edwards::EdwardsPoint;
use num_bigint::{BigInt, Sign};
use prost::Message;

use crate::common::slice::non_empty_bytes;
use crate::crypto::curve;
use crate::crypto::paillier::PublicKey as PaillierPublicKey;
use crate::crypto::pedersen::PedersenParams;
use crate::tss::error::ErrorKind;

#[derive(Clone, PartialEq, Message)]
pub struct KeygenEnvelope {
    #[prost(uint32, tag = "1")]
    pub from: u32,
    #[prost(bool, tag = "2")]
    pub is_broadcast: bool,
    #[prost(oneof = "KeygenPayload", tags = "3, 4, 5")]
    pub payload: Option<KeygenPayload>,
}

#[derive(Clone, PartialEq, ::prost::Oneof)]
pub enum KeygenPayload {
    #[prost(message, tag = "3")]
    Round1(KgRound1Message),
    #[prost(message, tag = "4")]
    Round2(KgRound2Message),
    #[prost(message, tag = "5")]
    Round3(KgRound3Message),
}

/// Round 1: the commitment hash `V_i`; the opened values follow in round 2.
#[derive(Clone, PartialEq, Message)]
pub struct KgRound1Message {
    #[prost(bytes = "vec", tag = "1")]
    pub commitment: Vec<u8>,
}

/// Round 2: the commitment opening, plus the sender's Paillier modulus and
/// ring-Pedersen parameters for later signing runs.
#[derive(Clone, PartialEq, Message)]
pub struct KgRound2Message {
    #[prost(bytes = "vec", tag = "1")]
    pub ssid: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub srid: Vec<u8>,
    #[prost(bytes = "vec", tag = "3")]
    pub pub_x: Vec<u8>,
    #[prost(bytes = "vec", tag = "4")]
    pub commitment_a: Vec<u8>,
    #[prost(bytes = "vec", tag = "5")]
    pub u: Vec<u8>,
    #[prost(bytes = "vec", tag = "6")]
    pub paillier_n: Vec<u8>,
    #[prost(bytes = "vec", tag = "7")]
    pub pedersen_n: Vec<u8>,
    #[prost(bytes = "vec", tag = "8")]
    pub pedersen_s: Vec<u8>,
    #[prost(bytes = "vec", tag = "9")]
    pub pedersen_t: Vec<u8>,
}

/// Round 3: the Schnorr proof response scalar.
#[derive(Clone, PartialEq, Message)]
pub struct KgRound3Message {
    #[prost(bytes = "vec", tag = "1")]
    pub sch_proof: Vec<u8>,
}

impl KgRound1Message {
    pub fn validate_basic(&self) -> bool {
        self.commitment.len() == 32
    }
}

impl KgRound2Message {
    pub fn validate_basic(&self) -> bool {
        non_empty_bytes(&self.ssid)
            && self.srid.len() == 32
            && self.pub_x.len() == 32
            && self.commitment_a.len() == 32
            && self.u.len() == 32
            && non_empty_bytes(&self.paillier_n)
            && non_empty_bytes(&self.pedersen_n)
            && non_empty_bytes(&self.pedersen_s)
            && non_empty_bytes(&self.pedersen_t)
    }

    pub fn pub_x_point(&self) -> Result<EdwardsPoint, ErrorKind> {
        curve::decompress(&self.pub_x)
            .ok_or_else(|| ErrorKind::MalformedMessage("public share is not a curve point".into()))
    }

    pub fn commitment_point(&self) -> Result<EdwardsPoint, ErrorKind> {
        curve::decompress(&self.commitment_a).ok_or_else(|| {
            ErrorKind::MalformedMessage("Schnorr commitment is not a curve point".into())
        })
    }

    pub fn paillier_pk(&self) -> PaillierPublicKey {
        PaillierPublicKey::new(BigInt::from_bytes_be(Sign::Plus, &self.paillier_n))
    }

    pub fn pedersen_params(&self) -> PedersenParams {
        PedersenParams::new(
            BigInt::from_bytes_be(Sign::Plus, &self.pedersen_n),
            BigInt::from_bytes_be(Sign::Plus, &self.pedersen_s),
            BigInt::from_bytes_be(Sign::Plus, &self.pedersen_t),
        )
    }
}

impl KgRound3Message {
    pub fn validate_basic(&self) -> bool {
        non_empty_bytes(&self.sch_proof)
    }

    pub fn sch_proof_int(&self) -> BigInt {
        BigInt::from_bytes_be(Sign::Plus, &self.sch_proof)
    }
}

pub fn new_envelope(from: usize, payload: KeygenPayload) -> KeygenEnvelope {
    KeygenEnvelope {
        from: from as u32,
        is_broadcast: true,
        payload: Some(payload),
    }
}

pub fn encode(envelope: &KeygenEnvelope) -> Vec<u8> {
    envelope.encode_to_vec()
}

/// Decodes the envelope and requires a payload to be present.
pub fn decode(bytes: &[u8]) -> Result<KeygenEnvelope, ErrorKind> {
    let envelope = KeygenEnvelope::decode(bytes)
        .map_err(|e| ErrorKind::MalformedMessage(format!("envelope decode: {}", e)))?;
    if envelope.payload.is_none() {
        return Err(ErrorKind::MalformedMessage("envelope has no payload".into()));
    }
    Ok(envelope)
}

/// Rejects an envelope whose declared sender disagrees with the transport's
/// delivery index.
pub fn check_sender(envelope: &KeygenEnvelope, from: usize) -> Result<(), ErrorKind> {
    if envelope.from as usize != from {
        return Err(ErrorKind::MalformedMessage(format!(
            "envelope sender {} does not match delivery index {}",
            envelope.from, from
        )));
    }
    Ok(())
}

pub fn expect_round1(envelope: &KeygenEnvelope) -> Result<&KgRound1Message, ErrorKind> {
    match envelope.payload {
        Some(KeygenPayload::Round1(ref msg)) if msg.validate_basic() => Ok(msg),
        Some(KeygenPayload::Round1(_)) => {
            Err(ErrorKind::MalformedMessage("round 1 commitment has wrong shape".into()))
        }
        _ => Err(ErrorKind::UnexpectedMessageType { expected: "KGRound1Message" }),
    }
}

pub fn expect_round2(envelope: &KeygenEnvelope) -> Result<&KgRound2Message, ErrorKind> {
    match envelope.payload {
        Some(KeygenPayload::Round2(ref msg)) if msg.validate_basic() => Ok(msg),
        Some(KeygenPayload::Round2(_)) => {
            Err(ErrorKind::MalformedMessage("round 2 opening has wrong shape".into()))
        }
        _ => Err(ErrorKind::UnexpectedMessageType { expected: "KGRound2Message" }),
    }
}

pub fn expect_round3(envelope: &KeygenEnvelope) -> Result<&KgRound3Message, ErrorKind> {
    match envelope.payload {
        Some(KeygenPayload::Round3(ref msg)) if msg.validate_basic() => Ok(msg),
        Some(KeygenPayload::Round3(_)) => {
            Err(ErrorKind::MalformedMessage("round 3 proof has wrong shape".into()))
        }
        _ => Err(ErrorKind::UnexpectedMessageType { expected: "KGRound3Message" }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_round_trip() {
        let env = new_envelope(
            2,
            KeygenPayload::Round1(KgRound1Message { commitment: vec![7u8; 32] }),
        );
        let decoded = decode(&encode(&env)).unwrap();
        assert_eq!(decoded, env);
        assert!(decoded.is_broadcast);
        assert_eq!(decoded.from, 2);
    }

    #[test]
    fn payloadless_envelope_is_rejected() {
        let env = KeygenEnvelope { from: 0, is_broadcast: true, payload: None };
        assert!(decode(&encode(&env)).is_err());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(decode(&[0xFF, 0xFF, 0xFF]).is_err());
    }

    #[test]
    fn validate_basic_checks_lengths() {
        assert!(!KgRound1Message { commitment: vec![] }.validate_basic());
        assert!(!KgRound1Message { commitment: vec![1u8; 31] }.validate_basic());
        assert!(KgRound1Message { commitment: vec![1u8; 32] }.validate_basic());
        assert!(!KgRound3Message { sch_proof: vec![] }.validate_basic());
    }
}
