//! Transaction construction and signing.
//!
//! A transaction starts as a [`TransactionPayload`], is assembled into a
//! [`RawTransaction`] together with the sender, sequence number, gas and
//! expiration, and becomes a [`SignedTransaction`] once a
//! [`TransactionSigner`](crate::crypto::TransactionSigner) has signed its
//! canonical bytes.

mod authenticator;
mod builder;
mod input;
mod payload;
mod types;

pub use authenticator::TransactionAuthenticator;
pub use builder::{
    sign_transaction, TransactionBuilder, DEFAULT_EXPIRATION_SECONDS, DEFAULT_GAS_UNIT_PRICE,
    DEFAULT_MAX_GAS_AMOUNT,
};
pub use input::{encode_json_arg, EntryFunctionBuilder};
pub use payload::{
    EntryFunction, Module, ModuleBundle, Script, TransactionArgument, TransactionPayload,
};
pub use types::{ExecutionInfo, RawTransaction, SignedTransaction};
