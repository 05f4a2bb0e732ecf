//! A hand-written BCS reader, independent of the encoder under test.

use aptos_txn_pipeline::transaction::{
    EntryFunction, Module, ModuleBundle, RawTransaction, Script, TransactionArgument,
    TransactionPayload,
};
use aptos_txn_pipeline::types::{
    AccountAddress, ChainId, Identifier, MoveModuleId, StructTag, TypeTag, U256,
};

pub type DecodeResult<T> = Result<T, String>;

pub struct Decoder<'a> {
    input: &'a [u8],
}

impl<'a> Decoder<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self { input }
    }

    pub fn remaining(&self) -> usize {
        self.input.len()
    }

    /// Fails unless every byte was consumed.
    pub fn finish(self) -> DecodeResult<()> {
        if self.input.is_empty() {
            Ok(())
        } else {
            Err(format!("{} trailing bytes", self.input.len()))
        }
    }

    pub fn take(&mut self, n: usize) -> DecodeResult<&'a [u8]> {
        if self.input.len() < n {
            return Err(format!("need {n} bytes, have {}", self.input.len()));
        }
        let (head, tail) = self.input.split_at(n);
        self.input = tail;
        Ok(head)
    }

    pub fn fixed<const N: usize>(&mut self) -> DecodeResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn u8(&mut self) -> DecodeResult<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn u16(&mut self) -> DecodeResult<u16> {
        Ok(u16::from_le_bytes(self.fixed()?))
    }

    pub fn u32(&mut self) -> DecodeResult<u32> {
        Ok(u32::from_le_bytes(self.fixed()?))
    }

    pub fn u64(&mut self) -> DecodeResult<u64> {
        Ok(u64::from_le_bytes(self.fixed()?))
    }

    pub fn u128(&mut self) -> DecodeResult<u128> {
        Ok(u128::from_le_bytes(self.fixed()?))
    }

    pub fn bool(&mut self) -> DecodeResult<bool> {
        match self.u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(format!("invalid bool byte {other}")),
        }
    }

    /// Reads a ULEB128 value and rejects non-minimal encodings.
    pub fn uleb128(&mut self) -> DecodeResult<u64> {
        let mut value = 0u64;
        for shift in (0..64).step_by(7) {
            let byte = self.u8()?;
            let digit = u64::from(byte & 0x7f);
            value |= digit
                .checked_shl(shift)
                .filter(|v| v >> shift == digit)
                .ok_or("uleb128 overflow")?;
            if byte & 0x80 == 0 {
                if shift > 0 && digit == 0 {
                    return Err("non-minimal uleb128".into());
                }
                return Ok(value);
            }
        }
        Err("uleb128 too long".into())
    }

    pub fn len(&mut self) -> DecodeResult<usize> {
        let len = self.uleb128()?;
        if len > (1 << 31) - 1 {
            return Err(format!("length {len} over the maximum"));
        }
        usize::try_from(len).map_err(|e| e.to_string())
    }

    pub fn bytes(&mut self) -> DecodeResult<Vec<u8>> {
        let len = self.len()?;
        Ok(self.take(len)?.to_vec())
    }

    pub fn string(&mut self) -> DecodeResult<String> {
        String::from_utf8(self.bytes()?).map_err(|e| e.to_string())
    }

    pub fn seq<T>(&mut self, mut item: impl FnMut(&mut Self) -> DecodeResult<T>) -> DecodeResult<Vec<T>> {
        let len = self.len()?;
        (0..len).map(|_| item(self)).collect()
    }

    pub fn option<T>(&mut self, item: impl FnOnce(&mut Self) -> DecodeResult<T>) -> DecodeResult<Option<T>> {
        match self.u8()? {
            0 => Ok(None),
            1 => item(self).map(Some),
            other => Err(format!("invalid option tag {other}")),
        }
    }

    pub fn address(&mut self) -> DecodeResult<AccountAddress> {
        Ok(AccountAddress::new(self.fixed()?))
    }

    pub fn identifier(&mut self) -> DecodeResult<Identifier> {
        Identifier::new(self.string()?).map_err(|e| e.to_string())
    }

    pub fn struct_tag(&mut self) -> DecodeResult<StructTag> {
        Ok(StructTag {
            address: self.address()?,
            module: self.identifier()?,
            name: self.identifier()?,
            type_args: self.seq(Self::type_tag)?,
        })
    }

    pub fn type_tag(&mut self) -> DecodeResult<TypeTag> {
        Ok(match self.uleb128()? {
            0 => TypeTag::Bool,
            1 => TypeTag::U8,
            2 => TypeTag::U64,
            3 => TypeTag::U128,
            4 => TypeTag::Address,
            5 => TypeTag::Signer,
            6 => TypeTag::Vector(Box::new(self.type_tag()?)),
            7 => TypeTag::Struct(Box::new(self.struct_tag()?)),
            8 => TypeTag::U16,
            9 => TypeTag::U32,
            10 => TypeTag::U256,
            other => return Err(format!("unknown type tag variant {other}")),
        })
    }

    pub fn transaction_argument(&mut self) -> DecodeResult<TransactionArgument> {
        Ok(match self.uleb128()? {
            0 => TransactionArgument::U8(self.u8()?),
            1 => TransactionArgument::U64(self.u64()?),
            2 => TransactionArgument::U128(self.u128()?),
            3 => TransactionArgument::Address(self.address()?),
            4 => TransactionArgument::U8Vector(self.bytes()?),
            5 => TransactionArgument::Bool(self.bool()?),
            6 => TransactionArgument::U16(self.u16()?),
            7 => TransactionArgument::U32(self.u32()?),
            8 => TransactionArgument::U256(U256::from_le_bytes(self.fixed()?)),
            other => return Err(format!("unknown argument variant {other}")),
        })
    }

    pub fn entry_function(&mut self) -> DecodeResult<EntryFunction> {
        Ok(EntryFunction {
            module: MoveModuleId {
                address: self.address()?,
                name: self.identifier()?,
            },
            function: self.identifier()?,
            ty_args: self.seq(Self::type_tag)?,
            args: self.seq(Self::bytes)?,
        })
    }

    pub fn payload(&mut self) -> DecodeResult<TransactionPayload> {
        Ok(match self.uleb128()? {
            0 => TransactionPayload::Script(Script {
                code: self.bytes()?,
                ty_args: self.seq(Self::type_tag)?,
                args: self.seq(Self::transaction_argument)?,
            }),
            1 => TransactionPayload::ModuleBundle(ModuleBundle {
                codes: self.seq(|d| Ok(Module { code: d.bytes()? }))?,
            }),
            2 => TransactionPayload::EntryFunction(self.entry_function()?),
            other => return Err(format!("unknown payload variant {other}")),
        })
    }

    pub fn raw_transaction(&mut self) -> DecodeResult<RawTransaction> {
        Ok(RawTransaction {
            sender: self.address()?,
            sequence_number: self.u64()?,
            payload: self.payload()?,
            max_gas_amount: self.u64()?,
            gas_unit_price: self.u64()?,
            expiration_timestamp_secs: self.u64()?,
            chain_id: ChainId::new(self.u8()?),
        })
    }
}

/// Decodes a complete value, failing on trailing bytes.
pub fn decode_all<'a, T>(
    bytes: &'a [u8],
    read: impl FnOnce(&mut Decoder<'a>) -> DecodeResult<T>,
) -> DecodeResult<T> {
    let mut decoder = Decoder::new(bytes);
    let value = read(&mut decoder)?;
    decoder.finish()?;
    Ok(value)
}
