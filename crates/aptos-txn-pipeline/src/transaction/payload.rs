//! Transaction payloads.

use crate::error::PipelineResult;
use crate::types::{AccountAddress, EntryFunctionId, Identifier, MoveModuleId, TypeTag, U256};
use serde::{Deserialize, Serialize};

/// What a transaction does when executed.
///
/// The variant order is the canonical variant index: `Script` = 0,
/// `ModuleBundle` = 1, `EntryFunction` = 2.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionPayload {
    /// Execute inline script bytecode.
    Script(Script),
    /// Publish a bundle of modules. Deprecated on current networks, kept so
    /// variant indices line up.
    ModuleBundle(ModuleBundle),
    /// Call a published entry function.
    EntryFunction(EntryFunction),
}

/// A script payload with inline bytecode.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    /// The Move bytecode to execute.
    #[serde(with = "serde_bytes")]
    pub code: Vec<u8>,
    /// Type arguments for the script.
    pub ty_args: Vec<TypeTag>,
    /// Arguments to the script.
    pub args: Vec<TransactionArgument>,
}

impl Script {
    /// Creates a new script payload.
    pub fn new(code: Vec<u8>, ty_args: Vec<TypeTag>, args: Vec<TransactionArgument>) -> Self {
        Self {
            code,
            ty_args,
            args,
        }
    }
}

/// A typed script argument.
///
/// Unlike entry function arguments these carry their own variant tag, in
/// the order below.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionArgument {
    /// `u8` (0)
    U8(u8),
    /// `u64` (1)
    U64(u64),
    /// `u128` (2)
    U128(u128),
    /// `address` (3)
    Address(AccountAddress),
    /// `vector<u8>` (4)
    U8Vector(#[serde(with = "serde_bytes")] Vec<u8>),
    /// `bool` (5)
    Bool(bool),
    /// `u16` (6)
    U16(u16),
    /// `u32` (7)
    U32(u32),
    /// `u256` (8)
    U256(U256),
}

/// A single compiled module.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    /// Module bytecode.
    #[serde(with = "serde_bytes")]
    pub code: Vec<u8>,
}

/// A list of modules published together.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleBundle {
    /// The modules, in publishing order.
    pub codes: Vec<Module>,
}

/// A call to a published entry function.
///
/// The arguments are opaque byte strings, each of which must already be the
/// canonical encoding of the value the function expects at that position.
/// Nothing here checks that the function exists or that the argument bytes
/// match its parameter types; the network does that during execution.
///
/// # Example
///
/// ```rust
/// use aptos_txn_pipeline::bcs;
/// use aptos_txn_pipeline::transaction::EntryFunction;
/// use aptos_txn_pipeline::types::{AccountAddress, MoveModuleId, TypeTag};
///
/// let recipient = AccountAddress::from_hex("0x123").unwrap();
/// let payload = EntryFunction::new(
///     MoveModuleId::from_str_strict("0x1::coin").unwrap(),
///     "transfer".parse().unwrap(),
///     vec![TypeTag::aptos_coin()],
///     vec![bcs::to_bytes(&recipient).unwrap(), bcs::to_bytes(&1000u64).unwrap()],
/// );
/// assert_eq!(payload.args.len(), 2);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryFunction {
    /// The module containing the function.
    pub module: MoveModuleId,
    /// The function name.
    pub function: Identifier,
    /// Type arguments for generic functions.
    pub ty_args: Vec<TypeTag>,
    /// Canonically encoded arguments, in parameter order.
    pub args: Vec<Vec<u8>>,
}

impl EntryFunction {
    /// Creates a new entry function payload.
    pub fn new(
        module: MoveModuleId,
        function: Identifier,
        ty_args: Vec<TypeTag>,
        args: Vec<Vec<u8>>,
    ) -> Self {
        Self {
            module,
            function,
            ty_args,
            args,
        }
    }

    /// Creates a payload from its individual parts: module address, module
    /// name and function name.
    ///
    /// # Errors
    ///
    /// Returns an error if either name is not a valid identifier.
    pub fn from_parts(
        module_address: AccountAddress,
        module_name: &str,
        function_name: &str,
        ty_args: Vec<TypeTag>,
        args: Vec<Vec<u8>>,
    ) -> PipelineResult<Self> {
        Ok(Self::new(
            MoveModuleId::new(module_address, Identifier::new(module_name)?),
            Identifier::new(function_name)?,
            ty_args,
            args,
        ))
    }

    /// Creates a payload from a function id such as `0x1::coin::transfer`.
    ///
    /// # Errors
    ///
    /// Returns an error if `function_id` does not parse.
    pub fn from_function_id(
        function_id: &str,
        ty_args: Vec<TypeTag>,
        args: Vec<Vec<u8>>,
    ) -> PipelineResult<Self> {
        let id = EntryFunctionId::from_str_strict(function_id)?;
        Ok(Self::new(id.module, id.name, ty_args, args))
    }

    /// Transfers `amount` of `coin_type` via `0x1::coin::transfer`.
    ///
    /// # Errors
    ///
    /// Only fails if the arguments cannot be encoded.
    pub fn coin_transfer(
        coin_type: TypeTag,
        recipient: AccountAddress,
        amount: u64,
    ) -> PipelineResult<Self> {
        Ok(Self::new(
            MoveModuleId::new(AccountAddress::ONE, Identifier::from_static("coin")),
            Identifier::from_static("transfer"),
            vec![coin_type],
            vec![crate::bcs::to_bytes(&recipient)?, crate::bcs::to_bytes(&amount)?],
        ))
    }

    /// Transfers `amount` octas of APT via `0x1::aptos_account::transfer`,
    /// creating the recipient account if needed.
    ///
    /// # Errors
    ///
    /// Only fails if the arguments cannot be encoded.
    pub fn apt_transfer(recipient: AccountAddress, amount: u64) -> PipelineResult<Self> {
        Ok(Self::new(
            MoveModuleId::new(AccountAddress::ONE, Identifier::from_static("aptos_account")),
            Identifier::from_static("transfer"),
            vec![],
            vec![crate::bcs::to_bytes(&recipient)?, crate::bcs::to_bytes(&amount)?],
        ))
    }

    /// Returns the function id, `address::module::function`.
    pub fn function_id(&self) -> EntryFunctionId {
        EntryFunctionId::new(self.module.clone(), self.function.clone())
    }
}

impl From<EntryFunction> for TransactionPayload {
    fn from(entry_function: EntryFunction) -> Self {
        TransactionPayload::EntryFunction(entry_function)
    }
}

impl From<Script> for TransactionPayload {
    fn from(script: Script) -> Self {
        TransactionPayload::Script(script)
    }
}

impl From<ModuleBundle> for TransactionPayload {
    fn from(bundle: ModuleBundle) -> Self {
        TransactionPayload::ModuleBundle(bundle)
    }
}
