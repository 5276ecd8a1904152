//! Four-round distributed key generation.
//!
//! `Round1` commits to the party's public share, Schnorr commitment and
//! randomness seeds via a hash; `Round2` reveals the opening together with
//! the party's Paillier and ring-Pedersen public parameters; `Round3`
//! checks every opening against the cached commitment, folds the session
//! randomness and broadcasts a Schnorr knowledge proof; `Round4` verifies
//! all proofs and emits the combined public key and save data.

mod local_party;
pub mod message;
mod round_1;
mod round_2;
mod round_3;
mod round_4;
pub mod save_data;
#[cfg(test)]
pub(crate) mod test_utils;

pub use local_party::KeygenSession;
pub use save_data::{
    build_local_save_data_subset, generate_pre_params, LocalPartySaveData, LocalPreParams,
};

pub(crate) const TASK_NAME: &str = "keygen";
