// Copyright © 2019 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

//! Signing wire messages.
//!
//! The envelope carries routing metadata for both broadcast and
//! point-to-point payloads; rounds one and two send distinct per-recipient
//! proofs, so the envelope records the intended recipient as well.

use num_bigint::{BigInt, Sign};
use prost::Message;

use crate::common::slice::non_empty_bytes;
use crate::tss::error::ErrorKind;

#[derive(Clone, PartialEq, Message)]
pub struct SigningEnvelope {
    #[prost(uint32, tag = "1")]
    pub from: u32,
    /// Recipient index; meaningful only when `is_broadcast` is false.
    #[prost(uint32, tag = "2")]
    pub to: u32,
    #[prost(bool, tag = "3")]
    pub is_broadcast: bool,
    #[prost(oneof = "SigningPayload", tags = "4, 5, 6, 7")]
    pub payload: Option<SigningPayload>,
}

#[derive(Clone, PartialEq, ::prost::Oneof)]
pub enum SigningPayload {
    #[prost(message, tag = "4")]
    Round1Cipher(SignRound1Message1),
    #[prost(message, tag = "5")]
    Round1Proof(SignRound1Message2),
    #[prost(message, tag = "6")]
    Round2(SignRound2Message),
    #[prost(message, tag = "7")]
    Round3(SignRound3Message),
}

/// Round 1 broadcast: the Paillier ciphertext of the nonce share.
#[derive(Clone, PartialEq, Message)]
pub struct SignRound1Message1 {
    #[prost(bytes = "vec", tag = "1")]
    pub k_ciphertext: Vec<u8>,
}

/// Round 1 point-to-point: the range proof for the broadcast ciphertext,
/// bound to the recipient's ring-Pedersen parameters.
#[derive(Clone, PartialEq, Message)]
pub struct SignRound1Message2 {
    #[prost(bytes = "vec", tag = "1")]
    pub enc_proof: Vec<u8>,
}

/// Round 2 point-to-point: the revealed nonce point and its log proof.
#[derive(Clone, PartialEq, Message)]
pub struct SignRound2Message {
    #[prost(bytes = "vec", tag = "1")]
    pub big_r: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub log_proof: Vec<u8>,
}

/// Round 3 broadcast: the 32-byte partial signature scalar.
#[derive(Clone, PartialEq, Message)]
pub struct SignRound3Message {
    #[prost(bytes = "vec", tag = "1")]
    pub sigma_share: Vec<u8>,
}

impl SignRound1Message1 {
    pub fn validate_basic(&self) -> bool {
        non_empty_bytes(&self.k_ciphertext)
    }

    pub fn k_ciphertext_int(&self) -> BigInt {
        BigInt::from_bytes_be(Sign::Plus, &self.k_ciphertext)
    }
}

impl SignRound1Message2 {
    pub fn validate_basic(&self) -> bool {
        non_empty_bytes(&self.enc_proof)
    }
}

impl SignRound2Message {
    pub fn validate_basic(&self) -> bool {
        self.big_r.len() == 32 && non_empty_bytes(&self.log_proof)
    }
}

impl SignRound3Message {
    pub fn validate_basic(&self) -> bool {
        self.sigma_share.len() == 32
    }
}

/// The session's persisted output: the assembled signature, its components
/// and the signed message digest.
#[derive(Clone, PartialEq, Message)]
pub struct SignatureData {
    #[prost(bytes = "vec", tag = "1")]
    pub signature: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub r: Vec<u8>,
    #[prost(bytes = "vec", tag = "3")]
    pub s: Vec<u8>,
    #[prost(bytes = "vec", tag = "4")]
    pub m: Vec<u8>,
}

pub fn new_broadcast(from: usize, payload: SigningPayload) -> SigningEnvelope {
    SigningEnvelope { from: from as u32, to: 0, is_broadcast: true, payload: Some(payload) }
}

pub fn new_p2p(from: usize, to: usize, payload: SigningPayload) -> SigningEnvelope {
    SigningEnvelope { from: from as u32, to: to as u32, is_broadcast: false, payload: Some(payload) }
}

pub fn encode(envelope: &SigningEnvelope) -> Vec<u8> {
    envelope.encode_to_vec()
}

pub fn decode(bytes: &[u8]) -> Result<SigningEnvelope, ErrorKind> {
    let envelope = SigningEnvelope::decode(bytes)
        .map_err(|e| ErrorKind::MalformedMessage(format!("envelope decode: {}", e)))?;
    if envelope.payload.is_none() {
        return Err(ErrorKind::MalformedMessage("envelope has no payload".into()));
    }
    Ok(envelope)
}

pub fn check_sender(envelope: &SigningEnvelope, from: usize) -> Result<(), ErrorKind> {
    if envelope.from as usize != from {
        return Err(ErrorKind::MalformedMessage(format!(
            "envelope sender {} does not match delivery index {}",
            envelope.from, from
        )));
    }
    Ok(())
}

/// Point-to-point payloads must be addressed to the accepting party.
pub fn check_recipient(envelope: &SigningEnvelope, own_index: usize) -> Result<(), ErrorKind> {
    if envelope.is_broadcast {
        return Err(ErrorKind::MalformedMessage(
            "expected a point-to-point message, got a broadcast".into(),
        ));
    }
    if envelope.to as usize != own_index {
        return Err(ErrorKind::MalformedMessage(format!(
            "point-to-point message addressed to {}, not to this party ({})",
            envelope.to, own_index
        )));
    }
    Ok(())
}

pub fn expect_round1_cipher(envelope: &SigningEnvelope) -> Result<&SignRound1Message1, ErrorKind> {
    match envelope.payload {
        Some(SigningPayload::Round1Cipher(ref msg)) if msg.validate_basic() => Ok(msg),
        Some(SigningPayload::Round1Cipher(_)) => {
            Err(ErrorKind::MalformedMessage("round 1 ciphertext has wrong shape".into()))
        }
        _ => Err(ErrorKind::UnexpectedMessageType { expected: "SignRound1Message1" }),
    }
}

pub fn expect_round1_proof(envelope: &SigningEnvelope) -> Result<&SignRound1Message2, ErrorKind> {
    match envelope.payload {
        Some(SigningPayload::Round1Proof(ref msg)) if msg.validate_basic() => Ok(msg),
        Some(SigningPayload::Round1Proof(_)) => {
            Err(ErrorKind::MalformedMessage("round 1 proof has wrong shape".into()))
        }
        _ => Err(ErrorKind::UnexpectedMessageType { expected: "SignRound1Message2" }),
    }
}

pub fn expect_round2(envelope: &SigningEnvelope) -> Result<&SignRound2Message, ErrorKind> {
    match envelope.payload {
        Some(SigningPayload::Round2(ref msg)) if msg.validate_basic() => Ok(msg),
        Some(SigningPayload::Round2(_)) => {
            Err(ErrorKind::MalformedMessage("round 2 message has wrong shape".into()))
        }
        _ => Err(ErrorKind::UnexpectedMessageType { expected: "SignRound2Message" }),
    }
}

pub fn expect_round3(envelope: &SigningEnvelope) -> Result<&SignRound3Message, ErrorKind> {
    match envelope.payload {
        Some(SigningPayload::Round3(ref msg)) if msg.validate_basic() => Ok(msg),
        Some(SigningPayload::Round3(_)) => {
            Err(ErrorKind::MalformedMessage("round 3 message has wrong shape".into()))
        }
        _ => Err(ErrorKind::UnexpectedMessageType { expected: "SignRound3Message" }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broadcast_round_trip() {
        let env = new_broadcast(
            1,
            SigningPayload::Round3(SignRound3Message { sigma_share: vec![3u8; 32] }),
        );
        let decoded = decode(&encode(&env)).unwrap();
        assert_eq!(decoded, env);
        assert!(decoded.is_broadcast);
    }

    #[test]
    fn p2p_recipient_is_enforced() {
        let env = new_p2p(
            0,
            2,
            SigningPayload::Round1Proof(SignRound1Message2 { enc_proof: vec![1, 2, 3] }),
        );
        assert!(check_recipient(&env, 2).is_ok());
        assert!(check_recipient(&env, 1).is_err());

        let broadcast = new_broadcast(
            0,
            SigningPayload::Round1Cipher(SignRound1Message1 { k_ciphertext: vec![9] }),
        );
        assert!(check_recipient(&broadcast, 0).is_err());
    }

    #[test]
    fn sender_mismatch_is_rejected() {
        let env = new_broadcast(
            1,
            SigningPayload::Round1Cipher(SignRound1Message1 { k_ciphertext: vec![9] }),
        );
        assert!(check_sender(&env, 1).is_ok());
        assert!(check_sender(&env, 0).is_err());
    }

    #[test]
    fn wrong_round_payload_is_unexpected() {
        let env = new_broadcast(
            0,
            SigningPayload::Round1Cipher(SignRound1Message1 { k_ciphertext: vec![9] }),
        );
        assert!(matches!(
            expect_round2(&env),
            Err(ErrorKind::UnexpectedMessageType { .. })
        ));
    }
}
