//! Core value types: addresses, chain ids, hashes and Move type descriptors.
//!
//! These are plain values with no shared mutable state and may be freely
//! cloned across concurrent transaction flows.

mod address;
mod chain_id;
mod hash;
mod move_types;
mod u256;

pub use address::{AccountAddress, ADDRESS_LENGTH};
pub use chain_id::ChainId;
pub use hash::{HashValue, HASH_LENGTH};
pub use move_types::{EntryFunctionId, Identifier, MoveModuleId, StructTag, TypeTag};
pub use u256::U256;
