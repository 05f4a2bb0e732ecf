//! Builders that encode entry function arguments.
//!
//! [`EntryFunctionBuilder`] runs typed Rust values through the canonical
//! encoder, so callers never handle argument bytes directly.
//! [`encode_json_arg`] does the same for a JSON value checked against a
//! declared Move type, which is how arguments arrive from configuration
//! files or RPC front-ends.

use crate::bcs::{self, serialize_into, write_uleb128};
use crate::error::{PipelineError, PipelineResult};
use crate::transaction::{EntryFunction, TransactionPayload};
use crate::types::{AccountAddress, EntryFunctionId, Identifier, MoveModuleId, TypeTag, U256};
use serde::Serialize;
use serde_json::Value;

/// Accumulates the parts of an entry function call.
///
/// Errors are deferred: the first failing `type_arg` or `arg` call is
/// reported by [`EntryFunctionBuilder::build`] and later errors are dropped.
///
/// # Example
///
/// ```rust
/// use aptos_txn_pipeline::transaction::EntryFunctionBuilder;
/// use aptos_txn_pipeline::types::AccountAddress;
///
/// let payload = EntryFunctionBuilder::new("0x1::coin::transfer")
///     .type_arg("0x1::aptos_coin::AptosCoin")
///     .arg(AccountAddress::from_hex("0x123").unwrap())
///     .arg(1_000_000u64)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug)]
pub struct EntryFunctionBuilder {
    module: Option<MoveModuleId>,
    function: Option<Identifier>,
    ty_args: Vec<TypeTag>,
    args: Vec<Vec<u8>>,
    error: Option<PipelineError>,
}

impl EntryFunctionBuilder {
    /// Starts a call to `function_id`, e.g. `0x1::coin::transfer`.
    pub fn new(function_id: &str) -> Self {
        match EntryFunctionId::from_str_strict(function_id) {
            Ok(id) => Self::from_parts(id.module, id.name),
            Err(e) => Self {
                module: None,
                function: None,
                ty_args: Vec::new(),
                args: Vec::new(),
                error: Some(e),
            },
        }
    }

    /// Starts a call from an already parsed module and function name.
    pub fn from_parts(module: MoveModuleId, function: Identifier) -> Self {
        Self {
            module: Some(module),
            function: Some(function),
            ty_args: Vec::new(),
            args: Vec::new(),
            error: None,
        }
    }

    fn record(&mut self, result: PipelineResult<()>) {
        if let Err(e) = result {
            self.error.get_or_insert(e);
        }
    }

    /// Adds a type argument parsed from its textual form.
    #[must_use]
    pub fn type_arg(mut self, type_arg: &str) -> Self {
        let result = TypeTag::from_str_strict(type_arg).map(|tag| self.ty_args.push(tag));
        self.record(result);
        self
    }

    /// Adds a type argument.
    #[must_use]
    pub fn type_arg_typed(mut self, type_arg: TypeTag) -> Self {
        self.ty_args.push(type_arg);
        self
    }

    /// Adds an argument, canonically encoding `value`.
    ///
    /// The Rust type decides the encoding: `u64` becomes 8 bytes, `String`
    /// a length-prefixed UTF-8 string, `Vec<T>` a length-prefixed sequence.
    #[must_use]
    pub fn arg<T: Serialize>(mut self, value: T) -> Self {
        let result = bcs::to_bytes(&value)
            .map(|bytes| self.args.push(bytes))
            .map_err(PipelineError::from);
        self.record(result);
        self
    }

    /// Adds an argument that is already canonically encoded.
    #[must_use]
    pub fn arg_raw(mut self, bytes: Vec<u8>) -> Self {
        self.args.push(bytes);
        self
    }

    /// Adds an argument given as JSON, encoded as `type_tag`.
    ///
    /// See [`encode_json_arg`] for the accepted shapes.
    #[must_use]
    pub fn json_arg(mut self, type_tag: &TypeTag, value: Value) -> Self {
        let result = encode_json_arg(type_tag, &value).map(|bytes| self.args.push(bytes));
        self.record(result);
        self
    }

    /// Finishes the call as an [`EntryFunction`].
    ///
    /// # Errors
    ///
    /// Returns the first error raised while adding arguments.
    pub fn build_entry_function(self) -> PipelineResult<EntryFunction> {
        if let Some(e) = self.error {
            return Err(e);
        }
        match (self.module, self.function) {
            (Some(module), Some(function)) => {
                Ok(EntryFunction::new(module, function, self.ty_args, self.args))
            }
            _ => Err(PipelineError::transaction("entry function id is missing")),
        }
    }

    /// Finishes the call as a [`TransactionPayload`].
    ///
    /// # Errors
    ///
    /// Returns the first error raised while adding arguments.
    pub fn build(self) -> PipelineResult<TransactionPayload> {
        self.build_entry_function().map(TransactionPayload::from)
    }
}

/// Canonically encodes a JSON value as the Move type `type_tag`.
///
/// | Move type | JSON |
/// |-----------|------|
/// | `bool` | `true` / `false` |
/// | `u8`..`u128` | number or decimal string, range checked |
/// | `u256` | number or decimal string |
/// | `address` | hex string |
/// | `vector<u8>` | hex string or array of numbers |
/// | `vector<T>` | array |
/// | `0x1::string::String` | string |
/// | `0x1::object::Object<T>` | address hex string |
/// | `0x1::option::Option<T>` | `null` or a `T` |
///
/// # Errors
///
/// Returns [`PipelineError::InvalidArgument`] if the value has the wrong
/// shape or is out of range (e.g. `300` as `u8`), or the type is `signer` or
/// another struct.
pub fn encode_json_arg(type_tag: &TypeTag, value: &Value) -> PipelineResult<Vec<u8>> {
    let mut out = Vec::new();
    write_json_arg(&mut out, type_tag, value)?;
    Ok(out)
}

fn mismatch(type_tag: &TypeTag, value: &Value) -> PipelineError {
    PipelineError::InvalidArgument(format!("expected {type_tag}, got {value}"))
}

fn is_framework_struct(tag: &crate::types::StructTag, module: &str, name: &str) -> bool {
    tag.address == AccountAddress::ONE && tag.module.as_str() == module && tag.name.as_str() == name
}

fn write_json_arg(out: &mut Vec<u8>, type_tag: &TypeTag, value: &Value) -> PipelineResult<()> {
    match type_tag {
        TypeTag::Bool => {
            let b = value.as_bool().ok_or_else(|| mismatch(type_tag, value))?;
            serialize_into(out, &b)?;
        }
        TypeTag::U8 => serialize_into(out, &uint::<u8>(type_tag, value)?)?,
        TypeTag::U16 => serialize_into(out, &uint::<u16>(type_tag, value)?)?,
        TypeTag::U32 => serialize_into(out, &uint::<u32>(type_tag, value)?)?,
        TypeTag::U64 => serialize_into(out, &uint::<u64>(type_tag, value)?)?,
        TypeTag::U128 => serialize_into(out, &uint::<u128>(type_tag, value)?)?,
        TypeTag::U256 => serialize_into(out, &U256::from_dec_str(&number_text(type_tag, value)?)?)?,
        TypeTag::Address => serialize_into(out, &address(type_tag, value)?)?,
        TypeTag::Signer => {
            return Err(PipelineError::InvalidArgument(
                "signer arguments are supplied by the sender, not the caller".into(),
            ));
        }
        TypeTag::Vector(inner) => match (inner.as_ref(), value) {
            (TypeTag::U8, Value::String(s)) => {
                let bytes = hex::decode(s.strip_prefix("0x").unwrap_or(s)).map_err(|e| {
                    PipelineError::InvalidArgument(format!("vector<u8> hex `{s}`: {e}"))
                })?;
                serialize_into(out, &serde_bytes::Bytes::new(&bytes))?;
            }
            (_, Value::Array(items)) => {
                if items.len() > bcs::MAX_SEQUENCE_LENGTH {
                    return Err(bcs::Error::ExceededMaxLen(items.len()).into());
                }
                write_uleb128(out, items.len() as u64)?;
                for item in items {
                    write_json_arg(out, inner, item)?;
                }
            }
            _ => return Err(mismatch(type_tag, value)),
        },
        TypeTag::Struct(tag) if is_framework_struct(tag, "string", "String") => {
            let s = value.as_str().ok_or_else(|| mismatch(type_tag, value))?;
            serialize_into(out, s)?;
        }
        TypeTag::Struct(tag) if is_framework_struct(tag, "object", "Object") => {
            serialize_into(out, &address(type_tag, value)?)?;
        }
        TypeTag::Struct(tag)
            if is_framework_struct(tag, "option", "Option") && tag.type_args.len() == 1 =>
        {
            // Option<T> is a vector of zero or one element.
            if value.is_null() {
                write_uleb128(out, 0)?;
            } else {
                write_uleb128(out, 1)?;
                write_json_arg(out, &tag.type_args[0], value)?;
            }
        }
        TypeTag::Struct(tag) => {
            return Err(PipelineError::InvalidArgument(format!(
                "struct `{tag}` cannot be built from JSON"
            )));
        }
    }
    Ok(())
}

fn number_text(type_tag: &TypeTag, value: &Value) -> PipelineResult<String> {
    match value {
        Value::Number(n) => Ok(n.to_string()),
        Value::String(s) => Ok(s.clone()),
        _ => Err(mismatch(type_tag, value)),
    }
}

fn uint<T: TryFrom<u128>>(type_tag: &TypeTag, value: &Value) -> PipelineResult<T> {
    let text = number_text(type_tag, value)?;
    let wide: u128 = text
        .parse()
        .map_err(|_| PipelineError::InvalidArgument(format!("`{text}` is not a valid {type_tag}")))?;
    T::try_from(wide)
        .map_err(|_| PipelineError::InvalidArgument(format!("{wide} is out of range for {type_tag}")))
}

fn address(type_tag: &TypeTag, value: &Value) -> PipelineResult<AccountAddress> {
    let s = value.as_str().ok_or_else(|| mismatch(type_tag, value))?;
    AccountAddress::from_hex(s)
}
