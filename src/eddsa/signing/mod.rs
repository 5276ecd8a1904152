//! Four-round threshold signing over a message digest.
//!
//! `Round1` Paillier-encrypts a fresh nonce share, broadcasts the
//! ciphertext and sends each counterpart a per-recipient range proof;
//! `Round2` verifies the range proofs and sends per-recipient log proofs
//! tying the revealed nonce point to the ciphertext; `Round3` verifies the
//! log proofs, cofactor-clears and aggregates the nonce points, and
//! broadcasts the partial signature scalar; the final round sums the
//! partials and self-verifies the assembled signature before release.

mod local_party;
pub mod message;
mod round_1;
mod round_2;
mod round_3;
mod round_final;

pub use local_party::SigningSession;
pub use message::SignatureData;

pub(crate) const TASK_NAME: &str = "signing";
