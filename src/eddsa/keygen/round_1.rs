// Copyright © 2019 Binance
//
// This file is part of Binance. The full Binance copyright notice, including
// terms governing use, modification, and redistribution, is contained in the
// file LICENSE at the root of the source code distribution tree.

//! Keygen round 1: commit.
//!
//! Samples the private share (unless pre-seeded), the Schnorr nonce and the
//! commit-reveal seeds, then broadcasts only the commitment hash `V_i`. The
//! opened values follow in round 2, so no party can pick its randomness
//! contribution after seeing others'.

use log::info;
use num_bigint::BigInt;
use num_traits::Zero;
use rand::rngs::OsRng;

use crate::common::random::{get_random_bytes, get_random_positive_int};
use crate::crypto::curve;
use crate::eddsa::keygen::message::{self, KeygenPayload, KgRound1Message};
use crate::eddsa::keygen::KeygenSession;
use crate::tss::error::TssError;
use crate::tss::ssid::keygen_ssid;

impl KeygenSession {
    pub fn round1_exec(&mut self) -> Result<Vec<u8>, TssError> {
        self.stage.begin(1).map_err(|k| self.error(1, k))?;

        let i = self.params.party_index();
        info!("party {}: keygen round 1 start", i);

        self.temp.ssid_nonce = BigInt::zero();
        self.temp.ssid = keygen_ssid(&self.params, 1, &self.temp.ssid_nonce);

        let q = curve::curve_order();
        let priv_xi = match &self.save.priv_xi {
            Some(seeded) => seeded.clone(),
            None => {
                let sampled = get_random_positive_int(&mut OsRng, q);
                self.save.priv_xi = Some(sampled.clone());
                sampled
            }
        };
        let pub_xi = curve::scalar_base_mult(&priv_xi);
        self.save.pub_xj[i] = Some(pub_xi);

        let tau = get_random_positive_int(&mut OsRng, q);
        let commited_a = curve::scalar_base_mult(&tau);
        self.temp.tau = Some(tau);
        self.temp.commited_a = Some(commited_a);

        let u = get_random_bytes(&mut OsRng, 32);
        let srid = get_random_bytes(&mut OsRng, 32);

        self.save.ks = self.params.parties().keys();
        self.save.share_id = Some(self.save.ks[i].clone());
        self.save.paillier_pks[i] = Some(self.pre_params.paillier_pk.clone());
        self.save.ring_pedersen_pks[i] = Some(self.pre_params.pedersen.params().clone());

        let commitment =
            Self::commitment_hash(&self.temp.ssid, i, &srid, &pub_xi, &commited_a, &u);
        self.temp.srid = Some(srid);
        self.temp.u = Some(u);

        let envelope =
            message::new_envelope(i, KeygenPayload::Round1(KgRound1Message { commitment }));
        let bytes = message::encode(&envelope);
        self.temp
            .round1_messages
            .store_own(i, &bytes)
            .map_err(|k| self.error(1, k))?;
        Ok(bytes)
    }

    pub fn round1_accept(&mut self, from: usize, bytes: &[u8]) -> Result<(), TssError> {
        self.stage.require_open(1).map_err(|k| self.error(1, k))?;

        let envelope = message::decode(bytes).map_err(|k| self.error_from(1, k, from))?;
        message::check_sender(&envelope, from).map_err(|k| self.error_from(1, k, from))?;
        message::expect_round1(&envelope).map_err(|k| self.error_from(1, k, from))?;

        self.temp
            .round1_messages
            .store(from, bytes)
            .map_err(|k| self.error_from(1, k, from))
    }

    pub fn round1_finish(&mut self) -> Result<(), TssError> {
        self.stage.require_open(1).map_err(|k| self.error(1, k))?;
        self.temp.round1_messages.finish().map_err(|k| self.error(1, k))?;
        self.stage.complete(1).map_err(|k| self.error(1, k))
    }
}
