//! Session binder.
//!
//! Derives the per-run session identifier (SSID) binding the curve domain
//! parameters, the sorted party set, the round number at derivation time
//! and a nonce. Every commitment and zero-knowledge proof in a run is bound
//! to this value, so messages cannot be replayed across runs or rounds.

use curve25519_dalek::edwards::EdwardsPoint;
use num_bigint::{BigInt, Sign};

use crate::common::hash::sha512_256i;
use crate::crypto::curve;
use crate::crypto::pedersen::PedersenParams;
use crate::tss::error::ErrorKind;
use crate::tss::params::Parameters;

fn curve_domain_ints() -> [BigInt; 2] {
    [
        curve::curve_order().clone(),
        BigInt::from_bytes_be(Sign::Plus, &curve::basepoint_bytes()),
    ]
}

/// SSID for a keygen run: curve domain, sorted party keys, round, nonce.
pub fn keygen_ssid(params: &Parameters, round: u32, nonce: &BigInt) -> Vec<u8> {
    let domain = curve_domain_ints();
    let keys = params.parties().keys();
    let round = BigInt::from(round);

    let mut ints: Vec<&BigInt> = domain.iter().collect();
    ints.extend(keys.iter());
    ints.push(&round);
    ints.push(nonce);

    sha512_256i(&ints).to_bytes_be().1
}

/// SSID for a signing run. In addition to the keygen inputs this binds every
/// party's public share and ring-Pedersen parameters; a missing counterpart
/// parameter is an error, not a silent omission.
pub fn signing_ssid(
    params: &Parameters,
    pub_xj: &[Option<EdwardsPoint>],
    ring_pedersen: &[Option<PedersenParams>],
    round: u32,
    nonce: &BigInt,
) -> Result<Vec<u8>, ErrorKind> {
    let domain = curve_domain_ints();
    let keys = params.parties().keys();
    let round = BigInt::from(round);

    let mut share_ints = Vec::with_capacity(pub_xj.len());
    for share in pub_xj {
        let point = share.as_ref().ok_or(ErrorKind::MissingParameter("public share"))?;
        share_ints.push(BigInt::from_bytes_be(Sign::Plus, &curve::compress(point)));
    }

    let mut ped_ints = Vec::with_capacity(ring_pedersen.len() * 3);
    for ped in ring_pedersen {
        let ped = ped
            .as_ref()
            .ok_or(ErrorKind::MissingParameter("ring-Pedersen parameters"))?;
        ped_ints.push(ped.n.clone());
        ped_ints.push(ped.s.clone());
        ped_ints.push(ped.t.clone());
    }

    let mut ints: Vec<&BigInt> = domain.iter().collect();
    ints.extend(keys.iter());
    ints.extend(share_ints.iter());
    ints.push(&round);
    ints.push(nonce);
    ints.extend(ped_ints.iter());

    Ok(sha512_256i(&ints).to_bytes_be().1)
}
