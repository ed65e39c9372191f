//! End-to-end translation tests over the shipped SGTIN-96 and SSCC-96
//! scheme definitions.
//!
//! Error-path tests live in `errors.rs`; round-trip and idempotence laws in
//! `roundtrip.rs`.

mod common;

use common::{ENGINE, HINTS, hints};
use epc_tdt_core::LevelType;

/// The 96-bit SGTIN tag for GTIN 00037000302414, serial 1041970, filter 3,
/// with a 7-digit company prefix.
const SGTIN_TAG_BITS: &str = "001100000111010000000010010000100010000000011101100010000100000000000000000011111110011000110010";

const SGTIN_LEGACY: &str = "gtin=00037000302414;serial=1041970";
const SGTIN_AI: &str = "(01)00037000302414(21)1041970";
const SGTIN_TAG_URI: &str = "urn:epc:tag:sgtin-96:3.0037000.030241.1041970";
const SGTIN_PURE_URI: &str = "urn:epc:id:sgtin:0037000.030241.1041970";

// ─── SGTIN-96 seed scenarios ─────────────────────────────────────────────────

#[test]
fn sgtin_legacy_to_binary() {
    let out = ENGINE
        .translate(SGTIN_LEGACY, &hints(), LevelType::Binary)
        .unwrap();
    assert_eq!(out, SGTIN_TAG_BITS);
}

#[test]
fn sgtin_ai_to_binary() {
    let out = ENGINE
        .translate(SGTIN_AI, &hints(), LevelType::Binary)
        .unwrap();
    assert_eq!(out, SGTIN_TAG_BITS);
}

#[test]
fn sgtin_binary_to_pure_identity() {
    let out = ENGINE
        .translate(SGTIN_TAG_BITS, &hints(), LevelType::PureIdentity)
        .unwrap();
    assert_eq!(out, SGTIN_PURE_URI);
}

#[test]
fn sgtin_binary_to_tag_encoding() {
    let out = ENGINE
        .translate(SGTIN_TAG_BITS, &hints(), LevelType::TagEncoding)
        .unwrap();
    assert_eq!(out, SGTIN_TAG_URI);
}

#[test]
fn sgtin_legacy_to_tag_encoding() {
    let out = ENGINE
        .translate(SGTIN_LEGACY, &hints(), LevelType::TagEncoding)
        .unwrap();
    assert_eq!(out, SGTIN_TAG_URI);
}

#[test]
fn sgtin_tag_encoding_to_legacy_rebuilds_check_digit() {
    let out = ENGINE
        .translate(SGTIN_TAG_URI, &hints(), LevelType::Legacy)
        .unwrap();
    assert_eq!(out, SGTIN_LEGACY);
}

#[test]
fn sgtin_pure_identity_to_binary_takes_filter_from_hints() {
    let out = ENGINE
        .translate(SGTIN_PURE_URI, &hints(), LevelType::Binary)
        .unwrap();
    assert_eq!(out, SGTIN_TAG_BITS);
}

#[test]
fn sgtin_legacy_to_ons_hostname() {
    let out = ENGINE
        .translate(SGTIN_LEGACY, &hints(), LevelType::OnsHostname)
        .unwrap();
    assert_eq!(out, "030241.0037000.sgtin.id.onsepc.com");
}

#[test]
fn sgtin_binary_output_is_taglength_bits_of_zero_one() {
    let out = ENGINE
        .translate(SGTIN_AI, &hints(), LevelType::Binary)
        .unwrap();
    assert_eq!(out.len(), 96);
    assert!(out.bytes().all(|b| b == b'0' || b == b'1'));
}

#[test]
fn sgtin_six_digit_prefix_option() {
    // Same GTIN, but read with a six-digit company prefix.
    let hints = epc_tdt_core::parse_hints("taglength=96;filter=3;gs1companyprefixlength=6");
    let out = ENGINE
        .translate(SGTIN_LEGACY, &hints, LevelType::PureIdentity)
        .unwrap();
    assert_eq!(out, "urn:epc:id:sgtin:003700.0030241.1041970");
}

// ─── SSCC-96 seed scenarios ─────────────────────────────────────────────────

const SSCC_AI: &str = "(00)100370001234567898";
const SSCC_TAG_BITS: &str = "001100010111010000000010010000100010000001000010111101101001011100010101000000000000000000000000";

#[test]
fn sscc_ai_to_binary_has_sscc_header() {
    let out = ENGINE
        .translate(SSCC_AI, &hints(), LevelType::Binary)
        .unwrap();
    assert_eq!(out.len(), 96);
    assert!(out.bytes().all(|b| b == b'0' || b == b'1'));
    // High-order eight bits are the SSCC-96 header 0x31.
    assert_eq!(&out[..8], "00110001");
    assert_eq!(out, SSCC_TAG_BITS);
}

#[test]
fn sscc_binary_back_to_ai() {
    let out = ENGINE
        .translate(SSCC_TAG_BITS, &hints(), LevelType::LegacyAi)
        .unwrap();
    assert_eq!(out, SSCC_AI);
}

#[test]
fn sscc_legacy_to_tag_encoding() {
    let out = ENGINE
        .translate("sscc=100370001234567898", &hints(), LevelType::TagEncoding)
        .unwrap();
    assert_eq!(out, "urn:epc:tag:sscc-96:3.0037000.1123456789");
}

#[test]
fn sscc_tag_encoding_to_pure_identity() {
    let out = ENGINE
        .translate(
            "urn:epc:tag:sscc-96:3.0037000.1123456789",
            &hints(),
            LevelType::PureIdentity,
        )
        .unwrap();
    assert_eq!(out, "urn:epc:id:sscc:0037000.1123456789");
}

// ─── Façade behavior ────────────────────────────────────────────────────────

#[test]
fn translate_params_overload_matches_typed_call() {
    let typed = ENGINE
        .translate(SGTIN_LEGACY, &hints(), LevelType::Binary)
        .unwrap();
    let stringly = ENGINE
        .translate_params(SGTIN_LEGACY, HINTS, "BINARY")
        .unwrap();
    assert_eq!(typed, stringly);
}

#[test]
fn input_is_trimmed_and_percent_decoded() {
    let padded = format!("  {SGTIN_LEGACY}\n");
    let out = ENGINE
        .translate(&padded, &hints(), LevelType::Binary)
        .unwrap();
    assert_eq!(out, SGTIN_TAG_BITS);

    let encoded = "gtin%3D00037000302414%3Bserial%3D1041970";
    let out = ENGINE
        .translate(encoded, &hints(), LevelType::Binary)
        .unwrap();
    assert_eq!(out, SGTIN_TAG_BITS);
}

#[test]
fn scheme_set_exposes_loaded_schemes() {
    assert_eq!(ENGINE.schemes().len(), 2);
    assert!(ENGINE.schemes().scheme("SGTIN-96").is_some());
    assert!(ENGINE.schemes().scheme("SSCC-96").is_some());
    assert!(!ENGINE.company_prefixes().is_empty());
}
