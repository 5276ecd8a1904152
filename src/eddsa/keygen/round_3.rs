// Copyright © 2019 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

//! Keygen round 3: verify openings, fold session randomness, prove.
//!
//! Every peer's reveal is checked against its cached round-1 commitment and
//! against the locally derived session id. The srid contributions are
//! XOR-combined (one honest contribution randomizes the aggregate) and
//! the result seeds the Fiat-Shamir challenge for this party's Schnorr
//! knowledge proof.

use log::{error, info};

use crate::common::slice::xor;
use crate::crypto::{curve, schnorr};
use crate::eddsa::keygen::local_party::Round2Payload;
use crate::eddsa::keygen::message::{self, KeygenPayload, KgRound3Message};
use crate::eddsa::keygen::KeygenSession;
use crate::tss::error::{ErrorKind, TssError};

impl KeygenSession {
    pub fn round3_exec(&mut self) -> Result<Vec<u8>, TssError> {
        self.stage.begin(3).map_err(|k| self.error(3, k))?;

        let i = self.params.party_index();
        info!("party {}: keygen round 3 start", i);

        for j in 0..self.params.party_count() {
            if j == i {
                continue;
            }
            let bytes = self
                .temp
                .round2_messages
                .get(j)
                .map_err(|k| self.error(3, k))?
                .to_vec();
            let envelope = message::decode(&bytes).map_err(|k| self.error_from(3, k, j))?;
            let r2_msg = message::expect_round2(&envelope).map_err(|k| self.error_from(3, k, j))?;

            if r2_msg.ssid != self.temp.ssid {
                error!("party {}: ssid mismatch in round 2 reveal of party {}", i, j);
                return Err(self.error_from(3, ErrorKind::SessionIdMismatch(j), j));
            }

            let pub_x = r2_msg.pub_x_point().map_err(|k| self.error_from(3, k, j))?;
            let commited_a = r2_msg.commitment_point().map_err(|k| self.error_from(3, k, j))?;

            let v = Self::commitment_hash(
                &self.temp.ssid,
                j,
                &r2_msg.srid,
                &pub_x,
                &commited_a,
                &r2_msg.u,
            );
            let cached = self.temp.vs[j]
                .as_ref()
                .ok_or_else(|| self.error(3, ErrorKind::MissingParameter("cached commitment")))?;
            if &v != cached {
                error!("party {}: commitment mismatch for party {}", i, j);
                return Err(self.error_from(3, ErrorKind::CommitmentMismatch(j), j));
            }

            let ped = r2_msg.pedersen_params();
            if !ped.validate() {
                return Err(self.error_from(
                    3,
                    ErrorKind::MalformedMessage(format!(
                        "ring-Pedersen parameters of party {} are invalid",
                        j
                    )),
                    j,
                ));
            }
            self.save.pub_xj[j] = Some(pub_x);
            self.save.paillier_pks[j] = Some(r2_msg.paillier_pk());
            self.save.ring_pedersen_pks[j] = Some(ped);

            // Fold this peer's contribution into the combined randomness.
            let srid = self
                .temp
                .srid
                .take()
                .ok_or_else(|| self.error(3, ErrorKind::MissingParameter("session randomness seed")))?;
            self.temp.srid = Some(xor(&srid, &r2_msg.srid));

            self.temp.payloads[j] = Some(Round2Payload {
                srid: r2_msg.srid.clone(),
                pub_x,
                commited_a,
                u: r2_msg.u.clone(),
            });
        }

        let pub_xi = self.save.pub_xj[i]
            .as_ref()
            .ok_or_else(|| self.error(3, ErrorKind::MissingParameter("own public share")))?;
        let commited_a = self
            .temp
            .commited_a
            .ok_or_else(|| self.error(3, ErrorKind::MissingParameter("Schnorr commitment")))?;
        let challenge = self
            .schnorr_challenge(i, pub_xi, &commited_a)
            .map_err(|k| self.error(3, k))?;

        let tau = self
            .temp
            .tau
            .as_ref()
            .ok_or_else(|| self.error(3, ErrorKind::MissingParameter("Schnorr nonce")))?;
        let priv_xi = self
            .save
            .priv_xi
            .as_ref()
            .ok_or_else(|| self.error(3, ErrorKind::MissingParameter("private share")))?;
        let z = schnorr::prove(curve::curve_order(), tau, &challenge, priv_xi);

        let envelope = message::new_envelope(
            i,
            KeygenPayload::Round3(KgRound3Message { sch_proof: z.to_bytes_be().1 }),
        );
        let bytes = message::encode(&envelope);
        self.temp
            .round3_messages
            .store_own(i, &bytes)
            .map_err(|k| self.error(3, k))?;
        Ok(bytes)
    }

    pub fn round3_accept(&mut self, from: usize, bytes: &[u8]) -> Result<(), TssError> {
        self.stage.require_open(3).map_err(|k| self.error(3, k))?;

        let envelope = message::decode(bytes).map_err(|k| self.error_from(3, k, from))?;
        message::check_sender(&envelope, from).map_err(|k| self.error_from(3, k, from))?;
        message::expect_round3(&envelope).map_err(|k| self.error_from(3, k, from))?;

        self.temp
            .round3_messages
            .store(from, bytes)
            .map_err(|k| self.error_from(3, k, from))
    }

    pub fn round3_finish(&mut self) -> Result<(), TssError> {
        self.stage.require_open(3).map_err(|k| self.error(3, k))?;
        self.temp.round3_messages.finish().map_err(|k| self.error(3, k))?;
        self.stage.complete(3).map_err(|k| self.error(3, k))
    }
}
