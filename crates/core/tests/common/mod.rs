//! Shared test helpers for `epc_tdt_core` integration tests.

#![allow(unreachable_pub)]

use std::collections::HashMap;
use std::sync::LazyLock;

use epc_tdt_core::{Engine, parse_hints};
use epc_tdt_loader::DirectorySource;

/// Engine loaded once per test binary from the shipped scheme directory.
pub static ENGINE: LazyLock<Engine> = LazyLock::new(|| {
    let dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../schemes");
    Engine::from_source(Box::new(DirectorySource::new(dir)))
        .unwrap_or_else(|e| panic!("failed to load shipped schemes: {e}"))
});

/// The hint set used by most SGTIN-96/SSCC-96 scenarios.
#[allow(dead_code)]
pub const HINTS: &str = "taglength=96;filter=3;gs1companyprefixlength=7";

/// [`HINTS`] parsed into a map.
#[allow(dead_code)]
pub fn hints() -> HashMap<String, String> {
    parse_hints(HINTS)
}

/// Build an engine over inline scheme markup (no company-prefix table).
#[allow(dead_code)]
pub fn engine_from_xml(xml: &str) -> Engine {
    let schemes = epc_tdt_loader::parse_scheme_file(xml)
        .unwrap_or_else(|e| panic!("inline scheme markup failed to parse: {e}"));
    Engine::new(
        epc_tdt_core::SchemeSet::new(schemes),
        epc_tdt_core::CompanyPrefixTable::new(),
    )
}
