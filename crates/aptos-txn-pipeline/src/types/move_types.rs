//! Move type descriptors: identifiers, module ids, struct tags and type tags.
//!
//! All textual parsing is bounded: type tag strings are limited to 1024
//! bytes and 8 levels of generic nesting, identifiers to 128 characters.

use crate::error::{PipelineError, PipelineResult};
use crate::types::AccountAddress;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const MAX_TYPE_TAG_LENGTH: usize = 1024;
const MAX_IDENTIFIER_LENGTH: usize = 128;
const MAX_TYPE_NESTING_DEPTH: usize = 8;

/// A Move identifier (module, struct or function name).
///
/// Identifiers are non-empty, start with an ASCII letter or underscore and
/// contain only ASCII alphanumerics and underscores.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identifier(String);

impl Identifier {
    /// Creates a new identifier, validating the format.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidIdentifier`] if the identifier is empty,
    /// longer than 128 characters, or has an invalid character.
    pub fn new(s: impl Into<String>) -> PipelineResult<Self> {
        let s = s.into();
        if s.len() > MAX_IDENTIFIER_LENGTH {
            return Err(PipelineError::InvalidIdentifier(format!(
                "identifier too long: {} bytes (max {MAX_IDENTIFIER_LENGTH})",
                s.len()
            )));
        }
        let Some(first) = s.chars().next() else {
            return Err(PipelineError::InvalidIdentifier(
                "identifier cannot be empty".into(),
            ));
        };
        if !first.is_ascii_alphabetic() && first != '_' {
            return Err(PipelineError::InvalidIdentifier(format!(
                "`{s}` must start with a letter or underscore"
            )));
        }
        if s == "_" {
            return Err(PipelineError::InvalidIdentifier(
                "`_` alone is not an identifier".into(),
            ));
        }
        if let Some(bad) = s.chars().find(|c| !c.is_ascii_alphanumeric() && *c != '_') {
            return Err(PipelineError::InvalidIdentifier(format!(
                "`{s}` contains invalid character {bad:?}"
            )));
        }
        Ok(Self(s))
    }

    /// Wraps a literal that is known to be a valid identifier.
    pub(crate) fn from_static(s: &'static str) -> Self {
        Self(s.to_string())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Identifier {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// A Move module identifier (`address::module_name`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MoveModuleId {
    /// The address where the module is published.
    pub address: AccountAddress,
    /// The name of the module.
    pub name: Identifier,
}

impl MoveModuleId {
    /// Creates a new module ID.
    pub fn new(address: AccountAddress, name: Identifier) -> Self {
        Self { address, name }
    }

    /// Parses a module ID such as `0x1::coin`.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not `address::module_name`, the
    /// address is invalid, or the module name is not a valid identifier.
    pub fn from_str_strict(s: &str) -> PipelineResult<Self> {
        let parts: Vec<&str> = s.split("::").map(str::trim).collect();
        let [address, name] = parts.as_slice() else {
            return Err(PipelineError::InvalidTypeTag(format!(
                "`{s}`: expected `address::module`"
            )));
        };
        Ok(Self {
            address: AccountAddress::from_hex(address)?,
            name: Identifier::new(*name)?,
        })
    }
}

impl fmt::Display for MoveModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.address.to_short_string(), self.name)
    }
}

impl FromStr for MoveModuleId {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_strict(s)
    }
}

/// A fully-qualified struct type: `address::module::Name<T1, T2, ...>`.
///
/// Generic argument order is significant.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StructTag {
    /// The address where the module is published.
    pub address: AccountAddress,
    /// The module name.
    pub module: Identifier,
    /// The struct name.
    pub name: Identifier,
    /// Generic type arguments.
    #[serde(default)]
    pub type_args: Vec<TypeTag>,
}

impl StructTag {
    /// Creates a new struct tag.
    pub fn new(
        address: AccountAddress,
        module: Identifier,
        name: Identifier,
        type_args: Vec<TypeTag>,
    ) -> Self {
        Self {
            address,
            module,
            name,
            type_args,
        }
    }

    /// The `AptosCoin` struct tag (`0x1::aptos_coin::AptosCoin`).
    pub fn aptos_coin() -> Self {
        Self {
            address: AccountAddress::ONE,
            module: Identifier::from_static("aptos_coin"),
            name: Identifier::from_static("AptosCoin"),
            type_args: vec![],
        }
    }

    /// Parses a struct tag such as `0x1::coin::CoinStore<0x1::aptos_coin::AptosCoin>`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidTypeTag`] describing the offending
    /// segment when the module or name is missing, the angle brackets are
    /// unbalanced, or a generic argument does not parse.
    ///
    /// # Example
    ///
    /// ```rust
    /// use aptos_txn_pipeline::types::{AccountAddress, StructTag};
    ///
    /// let tag = StructTag::from_str_strict("0x1::aptos_coin::AptosCoin").unwrap();
    /// assert_eq!(tag.address, AccountAddress::ONE);
    /// assert_eq!(tag.module.as_str(), "aptos_coin");
    /// assert_eq!(tag.name.as_str(), "AptosCoin");
    /// assert!(tag.type_args.is_empty());
    /// ```
    pub fn from_str_strict(s: &str) -> PipelineResult<Self> {
        let s = check_input(s)?;
        parse_struct_tag(s, 0)
    }
}

impl fmt::Display for StructTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}::{}::{}",
            self.address.to_short_string(),
            self.module,
            self.name
        )?;
        if !self.type_args.is_empty() {
            write!(f, "<")?;
            for (i, arg) in self.type_args.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{arg}")?;
            }
            write!(f, ">")?;
        }
        Ok(())
    }
}

impl FromStr for StructTag {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_strict(s)
    }
}

/// A Move type usable as a generic argument.
///
/// Variant order is the canonical encoding's variant index and must not be
/// changed: `u16`, `u32` and `u256` were appended after `struct`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeTag {
    /// `bool` (0)
    Bool,
    /// `u8` (1)
    U8,
    /// `u64` (2)
    U64,
    /// `u128` (3)
    U128,
    /// `address` (4)
    Address,
    /// `signer` (5)
    Signer,
    /// `vector<T>` (6)
    Vector(Box<TypeTag>),
    /// A struct type (7)
    Struct(Box<StructTag>),
    /// `u16` (8)
    U16,
    /// `u32` (9)
    U32,
    /// `u256` (10)
    U256,
}

impl TypeTag {
    /// Creates a vector type tag with the given element type.
    pub fn vector(element: TypeTag) -> Self {
        Self::Vector(Box::new(element))
    }

    /// Creates a struct type tag.
    pub fn struct_tag(tag: StructTag) -> Self {
        Self::Struct(Box::new(tag))
    }

    /// Returns the `AptosCoin` type tag (`0x1::aptos_coin::AptosCoin`).
    pub fn aptos_coin() -> Self {
        Self::struct_tag(StructTag::aptos_coin())
    }

    /// Parses a type tag.
    ///
    /// Accepts the primitive keywords (`bool`, `u8`, `u16`, `u32`, `u64`,
    /// `u128`, `u256`, `address`, `signer`), `vector<T>`, and struct types
    /// `address::module::Name<T, ...>` whose generic arguments are parsed
    /// recursively with the same grammar. Whitespace around separators is
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidTypeTag`] when the input is longer than
    /// 1024 bytes, nested deeper than 8 levels, has unbalanced angle
    /// brackets, names an unknown primitive, or has a malformed struct
    /// segment.
    ///
    /// # Example
    ///
    /// ```rust
    /// use aptos_txn_pipeline::types::TypeTag;
    ///
    /// assert_eq!(TypeTag::from_str_strict("u64").unwrap(), TypeTag::U64);
    /// assert_eq!(
    ///     TypeTag::from_str_strict("vector<u8>").unwrap(),
    ///     TypeTag::vector(TypeTag::U8)
    /// );
    /// assert!(TypeTag::from_str_strict("0x1::coin::Coin<u64").is_err());
    /// ```
    pub fn from_str_strict(s: &str) -> PipelineResult<Self> {
        let s = check_input(s)?;
        parse_type_tag(s, 0)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::Bool => write!(f, "bool"),
            TypeTag::U8 => write!(f, "u8"),
            TypeTag::U16 => write!(f, "u16"),
            TypeTag::U32 => write!(f, "u32"),
            TypeTag::U64 => write!(f, "u64"),
            TypeTag::U128 => write!(f, "u128"),
            TypeTag::U256 => write!(f, "u256"),
            TypeTag::Address => write!(f, "address"),
            TypeTag::Signer => write!(f, "signer"),
            TypeTag::Vector(inner) => write!(f, "vector<{inner}>"),
            TypeTag::Struct(tag) => write!(f, "{tag}"),
        }
    }
}

impl FromStr for TypeTag {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_strict(s)
    }
}

impl From<StructTag> for TypeTag {
    fn from(tag: StructTag) -> Self {
        Self::struct_tag(tag)
    }
}

/// An entry function identifier (`address::module::function`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryFunctionId {
    /// The module containing the function.
    pub module: MoveModuleId,
    /// The function name.
    pub name: Identifier,
}

impl EntryFunctionId {
    /// Creates a new entry function ID.
    pub fn new(module: MoveModuleId, name: Identifier) -> Self {
        Self { module, name }
    }

    /// Parses an entry function ID such as `0x1::coin::transfer`.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not `address::module::function`,
    /// the address is invalid, or a name is not a valid identifier.
    pub fn from_str_strict(s: &str) -> PipelineResult<Self> {
        let parts: Vec<&str> = s.split("::").map(str::trim).collect();
        let [address, module, name] = parts.as_slice() else {
            return Err(PipelineError::InvalidTypeTag(format!(
                "`{s}`: expected `address::module::function`"
            )));
        };
        Ok(Self {
            module: MoveModuleId::new(AccountAddress::from_hex(address)?, Identifier::new(*module)?),
            name: Identifier::new(*name)?,
        })
    }
}

impl fmt::Display for EntryFunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.module, self.name)
    }
}

impl FromStr for EntryFunctionId {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_strict(s)
    }
}

fn invalid(input: &str, reason: impl fmt::Display) -> PipelineError {
    PipelineError::InvalidTypeTag(format!("`{input}`: {reason}"))
}

/// Trims the input and applies the length and bracket-balance checks shared
/// by every entry point of the parser.
fn check_input(s: &str) -> PipelineResult<&str> {
    let s = s.trim();
    if s.len() > MAX_TYPE_TAG_LENGTH {
        return Err(PipelineError::InvalidTypeTag(format!(
            "type tag too long: {} bytes (max {MAX_TYPE_TAG_LENGTH})",
            s.len()
        )));
    }
    let mut open = 0usize;
    for (offset, c) in s.char_indices() {
        match c {
            '<' => open += 1,
            '>' => {
                open = open
                    .checked_sub(1)
                    .ok_or_else(|| invalid(s, format!("unmatched `>` at offset {offset}")))?;
            }
            _ => {}
        }
    }
    if open != 0 {
        return Err(invalid(s, "unbalanced angle brackets: missing `>`"));
    }
    Ok(s)
}

fn parse_type_tag(s: &str, depth: usize) -> PipelineResult<TypeTag> {
    if depth > MAX_TYPE_NESTING_DEPTH {
        return Err(invalid(
            s,
            format!("nesting deeper than {MAX_TYPE_NESTING_DEPTH} levels"),
        ));
    }
    let s = s.trim();
    let tag = match s {
        "" => return Err(invalid(s, "empty type")),
        "bool" => TypeTag::Bool,
        "u8" => TypeTag::U8,
        "u16" => TypeTag::U16,
        "u32" => TypeTag::U32,
        "u64" => TypeTag::U64,
        "u128" => TypeTag::U128,
        "u256" => TypeTag::U256,
        "address" => TypeTag::Address,
        "signer" => TypeTag::Signer,
        _ => {
            if let Some(inner) = s
                .strip_prefix("vector")
                .map(str::trim_start)
                .and_then(|rest| rest.strip_prefix('<'))
                .and_then(|rest| rest.strip_suffix('>'))
            {
                let args = split_type_args(inner, s)?;
                let [element] = args.as_slice() else {
                    return Err(invalid(
                        s,
                        format!("vector takes one type argument, got {}", args.len()),
                    ));
                };
                return Ok(TypeTag::vector(parse_type_tag(element, depth + 1)?));
            }
            if !s.contains("::") {
                return Err(invalid(s, format!("unknown primitive type `{s}`")));
            }
            TypeTag::struct_tag(parse_struct_tag(s, depth)?)
        }
    };
    Ok(tag)
}

fn parse_struct_tag(s: &str, depth: usize) -> PipelineResult<StructTag> {
    let (base, args) = match s.find('<') {
        Some(open) => {
            let Some(inner) = s[open + 1..].strip_suffix('>') else {
                return Err(invalid(s, "unexpected characters after type arguments"));
            };
            (s[..open].trim_end(), split_type_args(inner, s)?)
        }
        None => (s, Vec::new()),
    };

    let parts: Vec<&str> = base.split("::").map(str::trim).collect();
    let [address, module, name] = parts.as_slice() else {
        return Err(invalid(
            s,
            format!("expected `address::module::name`, got `{base}`"),
        ));
    };
    let address =
        AccountAddress::from_hex(address).map_err(|e| invalid(s, format!("address segment: {e}")))?;
    let module = Identifier::new(*module).map_err(|e| invalid(s, format!("module segment: {e}")))?;
    let name = Identifier::new(*name).map_err(|e| invalid(s, format!("name segment: {e}")))?;

    let type_args = args
        .into_iter()
        .map(|arg| parse_type_tag(arg, depth + 1))
        .collect::<PipelineResult<Vec<_>>>()?;

    Ok(StructTag {
        address,
        module,
        name,
        type_args,
    })
}

/// Splits the inside of `<...>` on top-level commas.
fn split_type_args<'a>(inner: &'a str, whole: &str) -> PipelineResult<Vec<&'a str>> {
    let mut args = Vec::new();
    let mut open = 0usize;
    let mut start = 0;
    for (i, c) in inner.char_indices() {
        match c {
            '<' => open += 1,
            '>' => {
                open = open
                    .checked_sub(1)
                    .ok_or_else(|| invalid(whole, "unbalanced angle brackets"))?;
            }
            ',' if open == 0 => {
                args.push(inner[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    if open != 0 {
        return Err(invalid(whole, "unbalanced angle brackets"));
    }
    args.push(inner[start..].trim());
    if args.iter().any(|arg| arg.is_empty()) {
        return Err(invalid(whole, "empty type argument"));
    }
    Ok(args)
}
