//! REST access to an Aptos fullnode.

mod fullnode;
mod response;

pub use fullnode::FullnodeClient;
pub use response::{AccountData, AptosResponse, LedgerInfo, PendingTransaction};
