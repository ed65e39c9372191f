//! EPC Tag Data Translation scheme tables.
//!
//! Defines the data structures for the TDT markup: coding schemes, their
//! representation levels, per-company-prefix-length options, field layouts,
//! and conversion rules.  These tables are deserialized from EPCglobal TDT
//! scheme files and consumed by the translation engine.

#![warn(missing_docs)]

/// The `SchemeSource` seam between the engine and scheme loading.
pub mod source;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

// ─── Enumerations ───────────────────────────────────────────────────────────

/// Representation level of an EPC identifier within a coding scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LevelType {
    /// Raw tag bit string (`0`/`1` characters, `tagLength` bits).
    Binary,
    /// `urn:epc:tag:…` URI carrying the filter value.
    TagEncoding,
    /// `urn:epc:id:…` URI without tag-specific control fields.
    PureIdentity,
    /// Legacy serialized form (e.g. `gtin=…;serial=…`).
    Legacy,
    /// GS1 Application Identifier form (e.g. `(01)…(21)…`).
    LegacyAi,
    /// ONS hostname form (output only).
    OnsHostname,
}

impl LevelType {
    /// Whether values at this level are percent-decoded on emission.
    pub fn is_uri_form(self) -> bool {
        matches!(self, LevelType::TagEncoding | LevelType::PureIdentity)
    }

    /// Whether input selection at this level disambiguates options by the
    /// scheme's option-key hint instead of by pattern alone.
    pub fn selects_by_option_key(self) -> bool {
        !matches!(
            self,
            LevelType::Binary | LevelType::TagEncoding | LevelType::PureIdentity
        )
    }
}

impl fmt::Display for LevelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LevelType::Binary => "BINARY",
            LevelType::TagEncoding => "TAG_ENCODING",
            LevelType::PureIdentity => "PURE_IDENTITY",
            LevelType::Legacy => "LEGACY",
            LevelType::LegacyAi => "LEGACY_AI",
            LevelType::OnsHostname => "ONS_HOSTNAME",
        };
        write!(f, "{s}")
    }
}

/// Error returned when a string does not name a [`LevelType`].
///
/// Matching is case-sensitive: `"BINARY"` parses, `"binary"` does not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLevelType(pub String);

impl fmt::Display for UnknownLevelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown representation level {:?}", self.0)
    }
}

impl std::error::Error for UnknownLevelType {}

impl FromStr for LevelType {
    type Err = UnknownLevelType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BINARY" => Ok(LevelType::Binary),
            "TAG_ENCODING" => Ok(LevelType::TagEncoding),
            "PURE_IDENTITY" => Ok(LevelType::PureIdentity),
            "LEGACY" => Ok(LevelType::Legacy),
            "LEGACY_AI" => Ok(LevelType::LegacyAi),
            "ONS_HOSTNAME" => Ok(LevelType::OnsHostname),
            other => Err(UnknownLevelType(other.to_string())),
        }
    }
}

/// Direction text padding or bit padding is applied from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PadDir {
    /// Pad characters sit at the start of the value.
    Left,
    /// Pad characters sit at the end of the value.
    Right,
}

/// Bits-per-character compaction used to pack alphanumeric fields into tag
/// bits (ISO 15962 character compaction families).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Compaction {
    /// 5 bits per character (uppercase alphabet).
    #[serde(rename = "5-bit", alias = "5bit")]
    FiveBit,
    /// 6 bits per character.
    #[serde(rename = "6-bit", alias = "6bit")]
    SixBit,
    /// 7 bits per character (ISO 646).
    #[serde(rename = "7-bit", alias = "7bit")]
    SevenBit,
    /// 8 bits per character.
    #[serde(rename = "8-bit", alias = "8bit")]
    EightBit,
}

impl Compaction {
    /// Number of bits one character occupies.
    pub fn bits(self) -> u32 {
        match self {
            Compaction::FiveBit => 5,
            Compaction::SixBit => 6,
            Compaction::SevenBit => 7,
            Compaction::EightBit => 8,
        }
    }
}

/// Whether a rule runs on the input level (`EXTRACT`) or the output level
/// (`FORMAT`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RuleType {
    /// Runs after tokenization, on the input level.
    Extract,
    /// Runs before emission, on the output level.
    Format,
}

// ─── Markup tree ────────────────────────────────────────────────────────────

/// A single field of an option: one capture group of the option's pattern,
/// with its validation and codec attributes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Field {
    /// Field name; the key under which the decoded value enters the token map.
    #[serde(rename = "@name")]
    pub name: String,
    /// 1-based capture-group index within the owning option's pattern.
    #[serde(rename = "@seq")]
    pub seq: usize,
    /// Length in characters (text levels) or bits (BINARY levels).
    #[serde(rename = "@length", default, skip_serializing_if = "Option::is_none")]
    pub length: Option<usize>,
    /// Regex fragment the value must match (trailing `*` implied).
    #[serde(
        rename = "@characterSet",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub character_set: Option<String>,
    /// Character compaction for alphanumeric binary fields.
    #[serde(
        rename = "@compaction",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub compaction: Option<Compaction>,
    /// Text padding character; meaningful together with [`Field::pad_dir`].
    #[serde(rename = "@padChar", default, skip_serializing_if = "Option::is_none")]
    pub pad_char: Option<char>,
    /// Text padding direction.
    #[serde(rename = "@padDir", default, skip_serializing_if = "Option::is_none")]
    pub pad_dir: Option<PadDir>,
    /// Bit padding direction for BINARY levels.
    #[serde(
        rename = "@bitPadDir",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub bit_pad_dir: Option<PadDir>,
    /// Inclusive lower bound for decimal values.
    #[serde(
        rename = "@decimalMinimum",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub decimal_minimum: Option<String>,
    /// Inclusive upper bound for decimal values.
    #[serde(
        rename = "@decimalMaximum",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub decimal_maximum: Option<String>,
}

impl Field {
    /// The text padding pair, when both character and direction are declared.
    pub fn text_padding(&self) -> Option<(PadDir, char)> {
        match (self.pad_dir, self.pad_char) {
            (Some(dir), Some(ch)) => Some((dir, ch)),
            _ => None,
        }
    }
}

/// A derivation rule: computes a new token from existing ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    /// When the rule runs (input vs output level).
    #[serde(rename = "@type")]
    pub kind: RuleType,
    /// Call expression of the form `name(arg1,arg2,…)`.
    #[serde(rename = "@function")]
    pub function: String,
    /// Token-map key the result is bound to.
    #[serde(rename = "@newFieldName")]
    pub new_field_name: String,
}

/// A disambiguated variant of a level, typically one per company-prefix
/// length.  Carries the recognition pattern, the field layout, and the
/// emission grammar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemeOption {
    /// Value the scheme's option-key hint must equal to select this option.
    #[serde(rename = "@optionKey")]
    pub option_key: String,
    /// Unanchored regex with one capture group per field; the engine matches
    /// it anchored at both ends.
    #[serde(rename = "@pattern")]
    pub pattern: String,
    /// Whitespace-separated emission grammar: field names and `'…'` literals.
    #[serde(rename = "@grammar")]
    pub grammar: String,
    /// Field layout, one entry per meaningful capture group.
    #[serde(rename = "field", default)]
    pub fields: Vec<Field>,
}

impl SchemeOption {
    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// The grammar split into its whitespace-separated elements.
    pub fn grammar_elements(&self) -> impl Iterator<Item = &str> {
        self.grammar.split_whitespace()
    }
}

/// One representation level of a scheme.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Level {
    /// The representation this level encodes.
    #[serde(rename = "@type")]
    pub kind: LevelType,
    /// Literal prefix an identifier must start with to be considered at this
    /// level.  Levels without one (e.g. ONS hostnames) are output-only.
    #[serde(
        rename = "@prefixMatch",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub prefix_match: Option<String>,
    /// Options in document order.
    #[serde(rename = "option", default)]
    pub options: Vec<SchemeOption>,
    /// Rules in document order.
    #[serde(rename = "rule", default)]
    pub rules: Vec<Rule>,
}

impl Level {
    /// Look up an option by its option key.
    pub fn option_by_key(&self, key: &str) -> Option<&SchemeOption> {
        self.options.iter().find(|o| o.option_key == key)
    }

    /// Rules of the given type, in document order.
    pub fn rules_of(&self, kind: RuleType) -> impl Iterator<Item = &Rule> {
        self.rules.iter().filter(move |r| r.kind == kind)
    }
}

/// A coding scheme (SGTIN-96, SSCC-96, …) with its levels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scheme {
    /// Scheme name as used in tag URIs (e.g. `SGTIN-96`).
    #[serde(rename = "@name")]
    pub name: String,
    /// Total tag width in bits for the BINARY level.
    #[serde(rename = "@tagLength")]
    pub tag_length: u32,
    /// Name of the caller hint that disambiguates options
    /// (typically `gs1companyprefixlength`).
    #[serde(rename = "@optionKey")]
    pub option_key: String,
    /// Levels in document order.
    #[serde(rename = "level", default)]
    pub levels: Vec<Level>,
}

impl Scheme {
    /// Look up the level of the given type.
    pub fn level(&self, kind: LevelType) -> Option<&Level> {
        self.levels.iter().find(|l| l.kind == kind)
    }
}

/// Root of one TDT scheme file: `<epcTagDataTranslation>` with one or more
/// `<scheme>` children.
#[derive(Debug, Clone, Deserialize)]
pub struct SchemeFile {
    /// Markup version string, when present.
    #[serde(rename = "@version", default)]
    pub version: Option<String>,
    /// Schemes defined by this file.
    #[serde(rename = "scheme", default)]
    pub schemes: Vec<Scheme>,
}

// ─── SchemeSet ──────────────────────────────────────────────────────────────

/// A `(scheme, level, option)` triple borrowed from a [`SchemeSet`].
#[derive(Debug, Clone, Copy)]
pub struct Triple<'a> {
    /// The owning scheme.
    pub scheme: &'a Scheme,
    /// The level within the scheme.
    pub level: &'a Level,
    /// The option within the level.
    pub option: &'a SchemeOption,
}

/// All loaded schemes, flattened for selection.
///
/// Immutable once handed to the engine; a refresh builds a new set.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SchemeSet {
    schemes: Vec<Scheme>,
}

impl SchemeSet {
    /// Build a set from already-parsed schemes.
    pub fn new(schemes: Vec<Scheme>) -> Self {
        Self { schemes }
    }

    /// Append a scheme.
    pub fn push(&mut self, scheme: Scheme) {
        self.schemes.push(scheme);
    }

    /// All schemes, in load order.
    pub fn schemes(&self) -> &[Scheme] {
        &self.schemes
    }

    /// Look up a scheme by name.
    pub fn scheme(&self, name: &str) -> Option<&Scheme> {
        self.schemes.iter().find(|s| s.name == name)
    }

    /// Number of schemes in the set.
    pub fn len(&self) -> usize {
        self.schemes.len()
    }

    /// Whether the set holds no schemes.
    pub fn is_empty(&self) -> bool {
        self.schemes.is_empty()
    }

    /// Flat iteration over every `(scheme, level, option)` triple.
    pub fn triples(&self) -> impl Iterator<Item = Triple<'_>> {
        self.schemes.iter().flat_map(|scheme| {
            scheme.levels.iter().flat_map(move |level| {
                level
                    .options
                    .iter()
                    .map(move |option| Triple {
                        scheme,
                        level,
                        option,
                    })
            })
        })
    }
}

// ─── Company prefix table ───────────────────────────────────────────────────

/// Auxiliary GS1 table mapping 64-bit company-prefix indexes to company
/// prefixes, loaded from `ManagerTranslation.xml`.
#[derive(Debug, Clone, Default)]
pub struct CompanyPrefixTable {
    entries: HashMap<String, String>,
}

impl CompanyPrefixTable {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an `index → companyPrefix` entry.
    pub fn insert(&mut self, index: impl Into<String>, prefix: impl Into<String>) {
        self.entries.insert(index.into(), prefix.into());
    }

    /// Company prefix registered under the given index, if any.
    pub fn prefix_for_index(&self, index: &str) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, String)> for CompanyPrefixTable {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNIPPET: &str = r#"
        <epcTagDataTranslation version="1.11">
          <scheme name="DEMO-96" tagLength="96" optionKey="gs1companyprefixlength">
            <level type="TAG_ENCODING" prefixMatch="urn:epc:tag:demo-96:">
              <option optionKey="7" pattern="urn:epc:tag:demo-96:([0-9])\.([0-9]{7})"
                      grammar="'urn:epc:tag:demo-96:' filter '.' companyprefix">
                <field seq="1" name="filter" length="1" decimalMinimum="0" decimalMaximum="7"/>
                <field seq="2" name="companyprefix" length="7" characterSet="[0-9]"
                       padChar="0" padDir="LEFT"/>
              </option>
              <rule type="EXTRACT" inputFormat="STRING" newFieldName="half"
                    function="substr(companyprefix,0,3)"/>
            </level>
            <level type="BINARY" prefixMatch="00110011">
              <option optionKey="7" pattern="00110011([01]{3})([01]{24})"
                      grammar="'00110011' filter companyprefix">
                <field seq="1" name="filter" length="3" bitPadDir="LEFT"/>
                <field seq="2" name="companyprefix" length="24" compaction="5-bit"
                       bitPadDir="RIGHT"/>
              </option>
            </level>
          </scheme>
        </epcTagDataTranslation>"#;

    fn parse_snippet() -> SchemeFile {
        quick_xml::de::from_str(SNIPPET).expect("snippet parses")
    }

    #[test]
    fn scheme_attributes_deserialize() {
        let file = parse_snippet();
        assert_eq!(file.version.as_deref(), Some("1.11"));
        assert_eq!(file.schemes.len(), 1);
        let scheme = &file.schemes[0];
        assert_eq!(scheme.name, "DEMO-96");
        assert_eq!(scheme.tag_length, 96);
        assert_eq!(scheme.option_key, "gs1companyprefixlength");
        assert_eq!(scheme.levels.len(), 2);
    }

    #[test]
    fn level_and_option_deserialize() {
        let file = parse_snippet();
        let level = &file.schemes[0].levels[0];
        assert_eq!(level.kind, LevelType::TagEncoding);
        assert_eq!(level.prefix_match.as_deref(), Some("urn:epc:tag:demo-96:"));
        let option = level.option_by_key("7").expect("option 7");
        assert_eq!(option.fields.len(), 2);
        assert_eq!(
            option.grammar_elements().collect::<Vec<_>>(),
            ["'urn:epc:tag:demo-96:'", "filter", "'.'", "companyprefix"],
        );
    }

    #[test]
    fn field_attributes_deserialize() {
        let file = parse_snippet();
        let option = &file.schemes[0].levels[0].options[0];
        let cp = option.field("companyprefix").expect("companyprefix field");
        assert_eq!(cp.seq, 2);
        assert_eq!(cp.length, Some(7));
        assert_eq!(cp.character_set.as_deref(), Some("[0-9]"));
        assert_eq!(cp.text_padding(), Some((PadDir::Left, '0')));
        assert!(cp.compaction.is_none());

        let filter = option.field("filter").expect("filter field");
        assert_eq!(filter.decimal_minimum.as_deref(), Some("0"));
        assert_eq!(filter.decimal_maximum.as_deref(), Some("7"));
        assert_eq!(filter.text_padding(), None);
    }

    #[test]
    fn binary_field_attributes_deserialize() {
        let file = parse_snippet();
        let option = &file.schemes[0].levels[1].options[0];
        let cp = option.field("companyprefix").expect("companyprefix field");
        assert_eq!(cp.compaction, Some(Compaction::FiveBit));
        assert_eq!(cp.bit_pad_dir, Some(PadDir::Right));
        assert_eq!(cp.length, Some(24));
    }

    #[test]
    fn rule_deserializes_and_ignores_foreign_attributes() {
        let file = parse_snippet();
        let level = &file.schemes[0].levels[0];
        assert_eq!(level.rules.len(), 1);
        let rule = &level.rules[0];
        assert_eq!(rule.kind, RuleType::Extract);
        assert_eq!(rule.new_field_name, "half");
        assert_eq!(rule.function, "substr(companyprefix,0,3)");
        assert_eq!(level.rules_of(RuleType::Format).count(), 0);
        assert_eq!(level.rules_of(RuleType::Extract).count(), 1);
    }

    #[test]
    fn level_type_round_trips_through_str() {
        for (text, kind) in [
            ("BINARY", LevelType::Binary),
            ("TAG_ENCODING", LevelType::TagEncoding),
            ("PURE_IDENTITY", LevelType::PureIdentity),
            ("LEGACY", LevelType::Legacy),
            ("LEGACY_AI", LevelType::LegacyAi),
            ("ONS_HOSTNAME", LevelType::OnsHostname),
        ] {
            assert_eq!(text.parse::<LevelType>().unwrap(), kind);
            assert_eq!(kind.to_string(), text);
        }
    }

    #[test]
    fn level_type_parse_is_case_sensitive() {
        assert!("binary".parse::<LevelType>().is_err());
        assert!("Binary".parse::<LevelType>().is_err());
        let err = "tag".parse::<LevelType>().unwrap_err();
        assert_eq!(err, UnknownLevelType("tag".into()));
    }

    #[test]
    fn selects_by_option_key_partition() {
        assert!(!LevelType::Binary.selects_by_option_key());
        assert!(!LevelType::TagEncoding.selects_by_option_key());
        assert!(!LevelType::PureIdentity.selects_by_option_key());
        assert!(LevelType::Legacy.selects_by_option_key());
        assert!(LevelType::LegacyAi.selects_by_option_key());
        assert!(LevelType::OnsHostname.selects_by_option_key());
    }

    #[test]
    fn triples_flatten_in_document_order() {
        let file = parse_snippet();
        let set = SchemeSet::new(file.schemes);
        let triples: Vec<_> = set.triples().collect();
        assert_eq!(triples.len(), 2);
        assert_eq!(triples[0].level.kind, LevelType::TagEncoding);
        assert_eq!(triples[1].level.kind, LevelType::Binary);
        assert!(triples.iter().all(|t| t.scheme.name == "DEMO-96"));
    }

    #[test]
    fn scheme_set_serializes_for_inspection_output() {
        let file = parse_snippet();
        let set = SchemeSet::new(file.schemes);
        let json = serde_json::to_string(&set).expect("set serializes");
        assert!(json.contains("DEMO-96"), "{json}");
        assert!(json.contains("TAG_ENCODING"), "{json}");
    }

    #[test]
    fn company_prefix_table_lookup() {
        let mut table = CompanyPrefixTable::new();
        assert!(table.is_empty());
        table.insert("1", "0037000");
        table.insert("2", "0614141");
        assert_eq!(table.len(), 2);
        assert_eq!(table.prefix_for_index("1"), Some("0037000"));
        assert_eq!(table.prefix_for_index("9"), None);
    }
}
