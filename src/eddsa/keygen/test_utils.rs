//! Shared helpers for the keygen and signing end-to-end tests.

use num_bigint::BigInt;
use rand::rngs::OsRng;

use crate::eddsa::keygen::save_data::generate_pre_params;
use crate::eddsa::keygen::KeygenSession;

/// Reduced Paillier modulus so tests stay fast; production uses 2048.
pub(crate) const TEST_PAILLIER_BITS: usize = 512;

pub(crate) fn test_party_keys(n: usize) -> Vec<BigInt> {
    (0..n).map(|i| BigInt::from(1000u64 + 7 * i as u64)).collect()
}

pub(crate) fn new_keygen_sessions(n: usize) -> Vec<KeygenSession> {
    let keys = test_party_keys(n);
    (0..n)
        .map(|i| {
            let pre = generate_pre_params(&mut OsRng, TEST_PAILLIER_BITS).unwrap();
            KeygenSession::new(i, &keys, None, Some(pre)).unwrap()
        })
        .collect()
}

/// Delivers each party's broadcast to every other party.
pub(crate) fn exchange<S>(
    sessions: &mut [S],
    msgs: &[Vec<u8>],
    mut accept: impl FnMut(&mut S, usize, &[u8]),
) {
    let n = sessions.len();
    for i in 0..n {
        for j in 0..n {
            if i != j {
                accept(&mut sessions[i], j, &msgs[j]);
            }
        }
    }
}

/// Drives the given sessions through all four keygen rounds, returning the
/// serialized save blobs.
pub(crate) fn run_keygen_rounds(sessions: &mut [KeygenSession]) -> Vec<Vec<u8>> {
    let r1: Vec<Vec<u8>> = sessions.iter_mut().map(|s| s.round1_exec().unwrap()).collect();
    exchange(sessions, &r1, |s, from, bytes| s.round1_accept(from, bytes).unwrap());
    for s in sessions.iter_mut() {
        s.round1_finish().unwrap();
    }

    let r2: Vec<Vec<u8>> = sessions.iter_mut().map(|s| s.round2_exec().unwrap()).collect();
    exchange(sessions, &r2, |s, from, bytes| s.round2_accept(from, bytes).unwrap());
    for s in sessions.iter_mut() {
        s.round2_finish().unwrap();
    }

    let r3: Vec<Vec<u8>> = sessions.iter_mut().map(|s| s.round3_exec().unwrap()).collect();
    exchange(sessions, &r3, |s, from, bytes| s.round3_accept(from, bytes).unwrap());
    for s in sessions.iter_mut() {
        s.round3_finish().unwrap();
    }

    sessions.iter_mut().map(|s| s.round4_exec().unwrap()).collect()
}

/// Full keygen over `n` fresh sessions.
pub(crate) fn run_keygen(n: usize) -> (Vec<KeygenSession>, Vec<Vec<u8>>) {
    let mut sessions = new_keygen_sessions(n);
    let blobs = run_keygen_rounds(&mut sessions);
    (sessions, blobs)
}
