// Copyright © 2019 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

//! Signing round 2: verify range proofs, send log proofs.
//!
//! Every received range proof is checked against the sender's ciphertext
//! using this party's own ring-Pedersen parameters. The nonce point
//! `R_i = k_i * G` is then revealed to each counterpart alongside a log
//! proof tying it to the round-1 ciphertext. There is no broadcast output;
//! all round-2 payloads are per-recipient.

use log::{error, info};

use crate::crypto::{curve, encproof, logproof};
use crate::eddsa::signing::message::{self, SigningPayload, SignRound2Message};
use crate::eddsa::signing::SigningSession;
use crate::tss::error::{ErrorKind, TssError};

impl SigningSession {
    pub fn round2_exec(&mut self) -> Result<(), TssError> {
        self.stage.begin(2).map_err(|k| self.error(2, k))?;

        let i = self.params.party_index();
        info!("party {}: signing round 2 start", i);

        let ped_i = self.keys.ring_pedersen_pks[i]
            .clone()
            .ok_or_else(|| self.error(2, ErrorKind::MissingParameter("own ring-Pedersen parameters")))?;

        for j in 0..self.params.party_count() {
            if j == i {
                continue;
            }
            let cipher_bytes = self
                .temp
                .round1_cipher_msgs
                .get(j)
                .map_err(|k| self.error(2, k))?
                .to_vec();
            let envelope = message::decode(&cipher_bytes).map_err(|k| self.error_from(2, k, j))?;
            let r1_msg1 =
                message::expect_round1_cipher(&envelope).map_err(|k| self.error_from(2, k, j))?;
            let k_ciphertext = r1_msg1.k_ciphertext_int();

            let proof_bytes = self
                .temp
                .round1_proof_msgs
                .get(j)
                .map_err(|k| self.error(2, k))?
                .to_vec();
            let envelope = message::decode(&proof_bytes).map_err(|k| self.error_from(2, k, j))?;
            let r1_msg2 =
                message::expect_round1_proof(&envelope).map_err(|k| self.error_from(2, k, j))?;
            let enc_proof = encproof::EncProof::from_bytes(&r1_msg2.enc_proof)
                .map_err(|e| self.error_from(2, ErrorKind::MalformedMessage(e.to_string()), j))?;

            let n_j = self.keys.paillier_pks[j]
                .as_ref()
                .ok_or_else(|| self.error_from(2, ErrorKind::MissingParameter("Paillier key"), j))?
                .n
                .clone();
            let context_j = self.proof_context(j);
            if let Err(e) = encproof::verify(
                &self.proof_config,
                &context_j,
                &k_ciphertext,
                &n_j,
                &ped_i,
                &enc_proof,
            ) {
                error!("party {}: enc proof of party {} rejected: {}", i, j, e);
                return Err(self.error_from(
                    2,
                    ErrorKind::ProofVerificationFailed { proof: "enc", party: j },
                    j,
                ));
            }
            self.temp.k_ciphertexts[j] = Some(k_ciphertext);
        }

        let k = self
            .temp
            .k
            .clone()
            .ok_or_else(|| self.error(2, ErrorKind::MissingParameter("nonce share")))?;
        let rho = self
            .temp
            .rho
            .clone()
            .ok_or_else(|| self.error(2, ErrorKind::MissingParameter("encryption randomness")))?;
        let k_ciphertext_i = self.temp.k_ciphertexts[i]
            .clone()
            .ok_or_else(|| self.error(2, ErrorKind::MissingParameter("own nonce ciphertext")))?;
        let n0 = self.keys.paillier_pks[i]
            .as_ref()
            .ok_or_else(|| self.error(2, ErrorKind::MissingParameter("own Paillier key")))?
            .n
            .clone();

        let big_r_i = curve::scalar_base_mult(&k);
        let context_i = self.proof_context(i);

        for j in 0..self.params.party_count() {
            let ped_j = self.keys.ring_pedersen_pks[j].as_ref().ok_or_else(|| {
                self.error_from(2, ErrorKind::MissingParameter("ring-Pedersen parameters"), j)
            })?;
            let log_proof = logproof::prove(
                &mut rand::rngs::OsRng,
                &self.proof_config,
                &context_i,
                &k,
                &rho,
                &k_ciphertext_i,
                &n0,
                ped_j,
                &big_r_i,
            )
            .map_err(|e| self.error_from(2, ErrorKind::Crypto(e.to_string()), j))?;

            // Check the fresh proof before it leaves the party.
            logproof::verify(
                &self.proof_config,
                &context_i,
                &k_ciphertext_i,
                &n0,
                ped_j,
                &big_r_i,
                &log_proof,
            )
            .map_err(|e| self.error_from(2, ErrorKind::Crypto(e.to_string()), j))?;

            let p2p = message::new_p2p(
                i,
                j,
                SigningPayload::Round2(SignRound2Message {
                    big_r: curve::compress(&big_r_i).to_vec(),
                    log_proof: log_proof.to_bytes(),
                }),
            );
            let p2p_bytes = message::encode(&p2p);
            if j == i {
                self.temp
                    .round2_messages
                    .store_own(i, &p2p_bytes)
                    .map_err(|k| self.error(2, k))?;
            }
            self.temp.send_round2[j] = p2p_bytes;
        }

        Ok(())
    }

    /// Per-recipient outbound log proof, available after round 2 exec.
    pub fn round2_message_for(&self, to: usize) -> Result<Vec<u8>, TssError> {
        if to >= self.params.party_count() {
            return Err(self.error(2, ErrorKind::InvalidPartyIndex(to)));
        }
        let bytes = &self.temp.send_round2[to];
        if bytes.is_empty() {
            return Err(self.error(
                2,
                ErrorKind::OutOfOrderRound { round: 2, expected: "this round's exec to have run" },
            ));
        }
        Ok(bytes.clone())
    }

    pub fn round2_accept(&mut self, from: usize, bytes: &[u8]) -> Result<(), TssError> {
        self.stage.require_open(2).map_err(|k| self.error(2, k))?;

        let envelope = message::decode(bytes).map_err(|k| self.error_from(2, k, from))?;
        message::check_sender(&envelope, from).map_err(|k| self.error_from(2, k, from))?;
        message::expect_round2(&envelope).map_err(|k| self.error_from(2, k, from))?;
        message::check_recipient(&envelope, self.params.party_index())
            .map_err(|k| self.error_from(2, k, from))?;

        self.temp
            .round2_messages
            .store(from, bytes)
            .map_err(|k| self.error_from(2, k, from))
    }

    pub fn round2_finish(&mut self) -> Result<(), TssError> {
        self.stage.require_open(2).map_err(|k| self.error(2, k))?;
        self.temp.round2_messages.finish().map_err(|k| self.error(2, k))?;
        self.stage.complete(2).map_err(|k| self.error(2, k))
    }
}
