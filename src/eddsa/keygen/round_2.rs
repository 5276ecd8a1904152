// Copyright © 2019 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

//! Keygen round 2: reveal.
//!
//! Caches every peer's round-1 commitment hash for the round-3 check, then
//! broadcasts the opening: ssid, srid, public share, Schnorr commitment and
//! blinding, together with this party's Paillier and ring-Pedersen public
//! parameters.

use log::info;

use crate::crypto::curve;
use crate::eddsa::keygen::message::{self, KeygenPayload, KgRound2Message};
use crate::eddsa::keygen::KeygenSession;
use crate::tss::error::{ErrorKind, TssError};

impl KeygenSession {
    pub fn round2_exec(&mut self) -> Result<Vec<u8>, TssError> {
        self.stage.begin(2).map_err(|k| self.error(2, k))?;

        let i = self.params.party_index();
        info!("party {}: keygen round 2 start", i);

        for j in 0..self.params.party_count() {
            let bytes = self
                .temp
                .round1_messages
                .get(j)
                .map_err(|k| self.error(2, k))?
                .to_vec();
            let envelope = message::decode(&bytes).map_err(|k| self.error_from(2, k, j))?;
            let r1_msg = message::expect_round1(&envelope).map_err(|k| self.error_from(2, k, j))?;
            self.temp.vs[j] = Some(r1_msg.commitment.clone());
        }

        let srid = self
            .temp
            .srid
            .as_ref()
            .ok_or_else(|| self.error(2, ErrorKind::MissingParameter("session randomness seed")))?;
        let u = self
            .temp
            .u
            .as_ref()
            .ok_or_else(|| self.error(2, ErrorKind::MissingParameter("commitment blinding")))?;
        let pub_xi = self.save.pub_xj[i]
            .as_ref()
            .ok_or_else(|| self.error(2, ErrorKind::MissingParameter("own public share")))?;
        let commited_a = self
            .temp
            .commited_a
            .as_ref()
            .ok_or_else(|| self.error(2, ErrorKind::MissingParameter("Schnorr commitment")))?;
        let ped = self.pre_params.pedersen.params();

        let msg = KgRound2Message {
            ssid: self.temp.ssid.clone(),
            srid: srid.clone(),
            pub_x: curve::compress(pub_xi).to_vec(),
            commitment_a: curve::compress(commited_a).to_vec(),
            u: u.clone(),
            paillier_n: self.pre_params.paillier_pk.n.to_bytes_be().1,
            pedersen_n: ped.n.to_bytes_be().1,
            pedersen_s: ped.s.to_bytes_be().1,
            pedersen_t: ped.t.to_bytes_be().1,
        };
        let envelope = message::new_envelope(i, KeygenPayload::Round2(msg));
        let bytes = message::encode(&envelope);
        self.temp
            .round2_messages
            .store_own(i, &bytes)
            .map_err(|k| self.error(2, k))?;
        Ok(bytes)
    }

    pub fn round2_accept(&mut self, from: usize, bytes: &[u8]) -> Result<(), TssError> {
        self.stage.require_open(2).map_err(|k| self.error(2, k))?;

        let envelope = message::decode(bytes).map_err(|k| self.error_from(2, k, from))?;
        message::check_sender(&envelope, from).map_err(|k| self.error_from(2, k, from))?;
        message::expect_round2(&envelope).map_err(|k| self.error_from(2, k, from))?;

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
