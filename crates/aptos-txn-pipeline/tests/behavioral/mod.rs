//! Behavioral tests for the pipeline.
//!
//! Encoded bytes are checked against a hand-written decoder and against the
//! crates.io `bcs` crate; none of these tests touch the network.

mod decoder;

mod strategies {
    use aptos_txn_pipeline::transaction::{
        EntryFunction, Module, ModuleBundle, RawTransaction, Script, TransactionArgument,
        TransactionPayload,
    };
    use aptos_txn_pipeline::types::{
        AccountAddress, ChainId, Identifier, MoveModuleId, StructTag, TypeTag, U256,
    };
    use proptest::prelude::*;

    pub fn address() -> impl Strategy<Value = AccountAddress> {
        any::<[u8; 32]>().prop_map(AccountAddress::new)
    }

    pub fn identifier() -> impl Strategy<Value = Identifier> {
        "[a-zA-Z_][a-zA-Z0-9_]{0,20}".prop_map(|s| Identifier::new(s).unwrap())
    }

    pub fn type_tag() -> impl Strategy<Value = TypeTag> {
        let leaf = prop_oneof![
            Just(TypeTag::Bool),
            Just(TypeTag::U8),
            Just(TypeTag::U16),
            Just(TypeTag::U32),
            Just(TypeTag::U64),
            Just(TypeTag::U128),
            Just(TypeTag::U256),
            Just(TypeTag::Address),
            Just(TypeTag::Signer),
        ];
        leaf.prop_recursive(4, 24, 3, |inner| {
            prop_oneof![
                inner.clone().prop_map(TypeTag::vector),
                (
                    address(),
                    identifier(),
                    identifier(),
                    prop::collection::vec(inner, 0..3)
                )
                    .prop_map(|(address, module, name, type_args)| {
                        TypeTag::Struct(Box::new(StructTag {
                            address,
                            module,
                            name,
                            type_args,
                        }))
                    }),
            ]
        })
    }

    fn transaction_argument() -> impl Strategy<Value = TransactionArgument> {
        prop_oneof![
            any::<u8>().prop_map(TransactionArgument::U8),
            any::<u16>().prop_map(TransactionArgument::U16),
            any::<u32>().prop_map(TransactionArgument::U32),
            any::<u64>().prop_map(TransactionArgument::U64),
            any::<u128>().prop_map(TransactionArgument::U128),
            any::<[u8; 32]>().prop_map(|b| TransactionArgument::U256(U256::from_le_bytes(b))),
            address().prop_map(TransactionArgument::Address),
            prop::collection::vec(any::<u8>(), 0..300).prop_map(TransactionArgument::U8Vector),
            any::<bool>().prop_map(TransactionArgument::Bool),
        ]
    }

    pub fn payload() -> impl Strategy<Value = TransactionPayload> {
        let bytes = || prop::collection::vec(any::<u8>(), 0..200);
        prop_oneof![
            4 => (
                address(),
                identifier(),
                identifier(),
                prop::collection::vec(type_tag(), 0..3),
                prop::collection::vec(bytes(), 0..5)
            )
                .prop_map(|(address, module, function, ty_args, args)| {
                    TransactionPayload::EntryFunction(EntryFunction::new(
                        MoveModuleId::new(address, module),
                        function,
                        ty_args,
                        args,
                    ))
                }),
            1 => (
                bytes(),
                prop::collection::vec(type_tag(), 0..3),
                prop::collection::vec(transaction_argument(), 0..5)
            )
                .prop_map(|(code, ty_args, args)| {
                    TransactionPayload::Script(Script { code, ty_args, args })
                }),
            1 => prop::collection::vec(bytes().prop_map(|code| Module { code }), 0..3)
                .prop_map(|codes| TransactionPayload::ModuleBundle(ModuleBundle { codes })),
        ]
    }

    pub fn raw_transaction() -> impl Strategy<Value = RawTransaction> {
        (
            address(),
            any::<u64>(),
            payload(),
            any::<u64>(),
            any::<u64>(),
            any::<u64>(),
            any::<u8>(),
        )
            .prop_map(
                |(sender, sequence_number, payload, max_gas, price, expiration, chain_id)| {
                    RawTransaction::new(
                        sender,
                        sequence_number,
                        payload,
                        max_gas,
                        price,
                        expiration,
                        ChainId::new(chain_id),
                    )
                },
            )
    }
}

mod encoding_tests {
    use super::decoder::{decode_all, Decoder};
    use aptos_txn_pipeline::bcs;
    use aptos_txn_pipeline::transaction::{
        Script, TransactionArgument, TransactionPayload,
    };
    use aptos_txn_pipeline::types::{AccountAddress, StructTag, TypeTag, U256};
    use std::collections::HashMap;

    #[test]
    fn test_integers_are_little_endian() {
        assert_eq!(bcs::to_bytes(&717u64).unwrap(), vec![0xcd, 0x02, 0, 0, 0, 0, 0, 0]);
        assert_eq!(bcs::to_bytes(&0x0102u16).unwrap(), vec![0x02, 0x01]);
        assert_eq!(bcs::to_bytes(&u128::MAX).unwrap(), vec![0xff; 16]);
    }

    #[test]
    fn test_uleb128_length_boundaries() {
        for (len, prefix) in [
            (0usize, vec![0x00]),
            (1, vec![0x01]),
            (127, vec![0x7f]),
            (128, vec![0x80, 0x01]),
            (16_383, vec![0xff, 0x7f]),
            (16_384, vec![0x80, 0x80, 0x01]),
        ] {
            let bytes = bcs::to_bytes(&vec![0u8; len]).unwrap();
            assert_eq!(&bytes[..prefix.len()], &prefix[..], "length {len}");
            assert_eq!(bytes.len(), prefix.len() + len);
            assert_eq!(bcs::uleb128_len(len as u64), prefix.len());

            let mut decoder = Decoder::new(&bytes);
            assert_eq!(decoder.len().unwrap(), len);
            assert_eq!(decoder.remaining(), len);
        }
    }

    #[test]
    fn test_option_encoding() {
        assert_eq!(bcs::to_bytes(&None::<u8>).unwrap(), vec![0]);
        let bytes = bcs::to_bytes(&Some(5u16)).unwrap();
        assert_eq!(bytes, vec![1, 5, 0]);
        let decoded = decode_all(&bytes, |d| d.option(Decoder::u16)).unwrap();
        assert_eq!(decoded, Some(5));
    }

    #[test]
    fn test_map_is_sorted_by_encoded_key() {
        let map: HashMap<String, u8> = [("b", 2), ("aa", 3), ("a", 1)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        let bytes = bcs::to_bytes(&map).unwrap();
        // "a" (01 61) < "b" (01 62) < "aa" (02 61 61)
        assert_eq!(
            bytes,
            vec![3, 1, b'a', 1, 1, b'b', 2, 2, b'a', b'a', 3]
        );
        assert_eq!(bytes, bcs_reference::to_bytes(&map).unwrap());
    }

    #[test]
    fn test_floats_rejected() {
        assert!(matches!(
            bcs::to_bytes(&1.5f64),
            Err(bcs::Error::NotSupported(_))
        ));
    }

    #[test]
    fn test_type_tag_variant_indices() {
        let expected = [
            (TypeTag::Bool, 0u8),
            (TypeTag::U8, 1),
            (TypeTag::U64, 2),
            (TypeTag::U128, 3),
            (TypeTag::Address, 4),
            (TypeTag::Signer, 5),
            (TypeTag::U16, 8),
            (TypeTag::U32, 9),
            (TypeTag::U256, 10),
        ];
        for (tag, index) in expected {
            assert_eq!(bcs::to_bytes(&tag).unwrap(), vec![index], "{tag}");
        }
        let nested = TypeTag::vector(TypeTag::vector(TypeTag::U8));
        assert_eq!(bcs::to_bytes(&nested).unwrap(), vec![6, 6, 1]);
        assert_eq!(bcs::to_bytes(&TypeTag::aptos_coin()).unwrap()[0], 7);
    }

    #[test]
    fn test_struct_tag_matches_reference() {
        let tag = StructTag::from_str_strict(
            "0x1::coin::CoinStore<0x1::aptos_coin::AptosCoin>",
        )
        .unwrap();
        let bytes = bcs::to_bytes(&tag).unwrap();
        assert_eq!(bytes, bcs_reference::to_bytes(&tag).unwrap());
        assert_eq!(decode_all(&bytes, Decoder::struct_tag).unwrap(), tag);
    }

    #[test]
    fn test_script_payload_round_trip() {
        let payload = TransactionPayload::Script(Script {
            code: vec![0xa1, 0x1c, 0xeb, 0x0b],
            ty_args: vec![TypeTag::aptos_coin()],
            args: vec![
                TransactionArgument::Address(AccountAddress::ONE),
                TransactionArgument::U64(717),
                TransactionArgument::U256(U256::MAX),
                TransactionArgument::U8Vector(b"memo".to_vec()),
            ],
        });
        let bytes = bcs::to_bytes(&payload).unwrap();
        assert_eq!(bytes[0], 0);
        assert_eq!(bytes, bcs_reference::to_bytes(&payload).unwrap());
        assert_eq!(decode_all(&bytes, Decoder::payload).unwrap(), payload);
    }
}

mod encoding_properties {
    use super::decoder::{decode_all, Decoder};
    use super::strategies;
    use aptos_txn_pipeline::bcs;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn raw_transaction_decodes_to_itself(txn in strategies::raw_transaction()) {
            let bytes = txn.to_bcs().unwrap();
            prop_assert_eq!(decode_all(&bytes, Decoder::raw_transaction).unwrap(), txn);
        }

        #[test]
        fn raw_transaction_matches_reference_encoder(txn in strategies::raw_transaction()) {
            prop_assert_eq!(bcs::to_bytes(&txn).unwrap(), bcs_reference::to_bytes(&txn).unwrap());
        }

        #[test]
        fn encoding_is_deterministic(txn in strategies::raw_transaction()) {
            let copy = txn.clone();
            prop_assert_eq!(txn.to_bcs().unwrap(), copy.to_bcs().unwrap());
            prop_assert_eq!(bcs::serialized_size(&txn).unwrap(), txn.to_bcs().unwrap().len());
        }

        #[test]
        fn type_tag_decodes_to_itself(tag in strategies::type_tag()) {
            let bytes = bcs::to_bytes(&tag).unwrap();
            prop_assert_eq!(decode_all(&bytes, Decoder::type_tag).unwrap(), tag);
        }

        #[test]
        fn distinct_addresses_encode_differently(a in strategies::address(), b in strategies::address()) {
            prop_assume!(a != b);
            prop_assert_ne!(bcs::to_bytes(&a).unwrap(), bcs::to_bytes(&b).unwrap());
        }

        #[test]
        fn uleb128_decodes_to_itself(value in any::<u64>()) {
            let mut bytes = vec![];
            bcs::write_uleb128(&mut bytes, value).unwrap();
            prop_assert_eq!(bytes.len(), bcs::uleb128_len(value));
            prop_assert_eq!(decode_all(&bytes, Decoder::uleb128).unwrap(), value);
        }

        #[test]
        fn strings_match_reference_encoder(s in ".{0,200}") {
            let bytes = bcs::to_bytes(&s).unwrap();
            prop_assert_eq!(&bytes, &bcs_reference::to_bytes(&s).unwrap());
            prop_assert_eq!(decode_all(&bytes, Decoder::string).unwrap(), s);
        }
    }
}

mod parsing_tests {
    use aptos_txn_pipeline::types::{AccountAddress, StructTag, TypeTag};
    use aptos_txn_pipeline::PipelineError;

    #[test]
    fn test_short_address_forms() {
        let expected = {
            let mut bytes = [0u8; 32];
            bytes[31] = 1;
            AccountAddress::new(bytes)
        };
        for input in ["0x1", "0x01", "1"] {
            assert_eq!(AccountAddress::from_hex(input).unwrap(), expected, "{input}");
        }
    }

    #[test]
    fn test_address_rejections() {
        let too_long = format!("0x{}", "1".repeat(65));
        for input in ["0xg", "hello", too_long.as_str(), ""] {
            assert!(
                matches!(AccountAddress::from_hex(input), Err(PipelineError::InvalidAddress(_))),
                "{input}"
            );
        }
    }

    #[test]
    fn test_aptos_coin_struct_tag() {
        let tag = StructTag::from_str_strict("0x1::aptos_coin::AptosCoin").unwrap();
        assert_eq!(tag.address, AccountAddress::ONE);
        assert_eq!(tag.module.as_str(), "aptos_coin");
        assert_eq!(tag.name.as_str(), "AptosCoin");
        assert!(tag.type_args.is_empty());
    }

    #[test]
    fn test_nested_generics() {
        let tag: TypeTag = "0x1::pool::Pool<0x1::coin::Coin<u64>, vector<0x1::string::String>>"
            .parse()
            .unwrap();
        let TypeTag::Struct(pool) = &tag else {
            panic!("expected struct, got {tag:?}");
        };
        assert_eq!(pool.type_args.len(), 2);
        assert_eq!(
            tag.to_string(),
            "0x1::pool::Pool<0x1::coin::Coin<u64>, vector<0x1::string::String>>"
        );
    }

    #[test]
    fn test_type_tag_rejections() {
        for input in [
            "0x1::coin",
            "0x1::coin::Coin<u64",
            "0x1::coin::Coin<u64>>",
            "0x1::coin::Coin<>",
            "u512",
            "vector<u8, u8>",
            "0x1::1coin::Coin",
        ] {
            assert!(TypeTag::from_str_strict(input).is_err(), "{input}");
        }
    }
}

mod signing_tests {
    use aptos_txn_pipeline::account::Ed25519Account;
    use aptos_txn_pipeline::bcs;
    use aptos_txn_pipeline::crypto::{Ed25519PrivateKey, TransactionSigner};
    use aptos_txn_pipeline::transaction::{
        sign_transaction, EntryFunction, RawTransaction, TransactionBuilder, TransactionPayload,
    };
    use aptos_txn_pipeline::types::{AccountAddress, ChainId, TypeTag};
    use aptos_txn_pipeline::PipelineError;

    fn account() -> Ed25519Account {
        Ed25519Account::from_private_key(Ed25519PrivateKey::from_bytes(&[42u8; 32]).unwrap())
    }

    fn coin_transfer_payload() -> EntryFunction {
        EntryFunction::from_function_id(
            "0x1::coin::transfer",
            vec![TypeTag::aptos_coin()],
            vec![bcs::to_bytes(&717u64).unwrap()],
        )
        .unwrap()
    }

    fn raw(sender: AccountAddress) -> RawTransaction {
        TransactionBuilder::new()
            .sender(sender)
            .sequence_number(5)
            .payload(coin_transfer_payload().into())
            .max_gas_amount(1_000_000)
            .gas_unit_price(1)
            .expiration_from_now(10)
            .chain_id(ChainId::new(4))
            .build()
            .unwrap()
    }

    #[test]
    fn test_end_to_end_encoded_length() {
        let account = account();
        let txn = raw(account.address());
        let bytes = txn.to_bcs().unwrap();

        let payload_len = 1 // variant
            + 32 + (1 + "coin".len()) // module id
            + (1 + "transfer".len())
            + 1 + (1 + 32 + (1 + "aptos_coin".len()) + (1 + "AptosCoin".len()) + 1) // ty_args
            + 1 + (1 + 8); // args
        let expected = 32 + 8 + payload_len + 8 + 8 + 8 + 1;
        assert_eq!(bytes.len(), expected);
        assert_eq!(expected, 178);
        assert_eq!(&bytes[..32], account.address().as_bytes());

        let signed = sign_transaction(txn, &account).unwrap();
        assert_eq!(signed.to_bcs().unwrap().len(), expected + 99);
        assert_eq!(&signed.to_bcs().unwrap()[..expected], &bytes[..]);
    }

    #[test]
    fn test_signing_is_deterministic_and_verifies() {
        let account = account();
        let txn = raw(account.address());
        let first = sign_transaction(txn.clone(), &account).unwrap();
        let second = sign_transaction(txn, &account).unwrap();
        assert_eq!(first, second);
        first.verify_signature().unwrap();
        assert_eq!(first.hash().unwrap(), second.hash().unwrap());
    }

    #[test]
    fn test_mutating_any_field_breaks_the_signature() {
        let account = account();
        let signed = sign_transaction(raw(account.address()), &account).unwrap();
        let (original, authenticator) = signed.into_parts();

        let mutations: [(&str, fn(&mut RawTransaction)); 7] = [
            ("sender", |t: &mut RawTransaction| t.sender = AccountAddress::ONE),
            ("sequence_number", |t: &mut RawTransaction| t.sequence_number += 1),
            ("max_gas_amount", |t: &mut RawTransaction| t.max_gas_amount -= 1),
            ("gas_unit_price", |t: &mut RawTransaction| t.gas_unit_price += 1),
            ("expiration", |t: &mut RawTransaction| t.expiration_timestamp_secs += 1),
            ("chain_id", |t: &mut RawTransaction| t.chain_id = ChainId::mainnet()),
            (
                "argument",
                |t: &mut RawTransaction| {
                    if let TransactionPayload::EntryFunction(f) = &mut t.payload {
                        f.args[0] = bcs::to_bytes(&718u64).unwrap();
                    }
                },
            ),
        ];
        for (field, mutate) in mutations {
            let mut tampered = original.clone();
            mutate(&mut tampered);
            let message = tampered.signing_message().unwrap();
            assert!(
                matches!(
                    authenticator.verify(&message),
                    Err(PipelineError::SignatureVerificationFailed)
                ),
                "mutating {field} kept the signature valid"
            );
        }
        authenticator.verify(&original.signing_message().unwrap()).unwrap();
    }

    #[test]
    fn test_signing_message_prefix() {
        let account = account();
        let txn = raw(account.address());
        let message = txn.signing_message().unwrap();
        let prefix = aptos_txn_pipeline::HashValue::sha3_256(b"APTOS::RawTransaction");
        assert_eq!(&message[..32], prefix.as_bytes());
        assert_eq!(&message[32..], &txn.to_bcs().unwrap()[..]);
    }

    #[test]
    fn test_signer_address_is_derived_from_key() {
        let account = account();
        let mut preimage = account.public_key().to_bytes().to_vec();
        preimage.push(0);
        assert_eq!(
            TransactionSigner::address(&account).as_bytes(),
            aptos_txn_pipeline::HashValue::sha3_256(&preimage).as_bytes()
        );
    }
}
