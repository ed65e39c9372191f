//! Scheme-file loading for the EPC TDT engine.
//!
//! Reads a directory of EPCglobal TDT scheme files plus the auxiliary
//! `ManagerTranslation.xml` company-prefix table, and exposes both as a
//! [`SchemeSource`] the engine can re-execute on refresh.

#![warn(missing_docs)]

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use walkdir::WalkDir;

use epc_tdt_scheme_tables::source::{SchemeSource, SourceError};
use epc_tdt_scheme_tables::{CompanyPrefixTable, Scheme, SchemeFile, SchemeSet};

/// File name of the auxiliary GS1 company-prefix table.
pub const COMPANY_PREFIX_FILE: &str = "ManagerTranslation.xml";

// ─── Scheme files ───────────────────────────────────────────────────────────

/// Parse one scheme file's XML text.
pub fn parse_scheme_file(xml: &str) -> Result<Vec<Scheme>> {
    let file: SchemeFile =
        quick_xml::de::from_str(xml).context("deserializing TDT scheme markup")?;
    Ok(file.schemes)
}

/// Load every `*.xml` scheme file under `dir` (recursively) into one set.
///
/// The auxiliary table file is skipped; other extensions are ignored.  An
/// empty result is an error — an engine with no schemes can only say
/// `NoMatch`.
pub fn load_scheme_dir(dir: &Path) -> Result<SchemeSet> {
    if !dir.is_dir() {
        bail!("scheme directory {} not found", dir.display());
    }
    let mut set = SchemeSet::default();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.with_context(|| format!("reading scheme directory {}", dir.display()))?;
        if !entry.file_type().is_file()
            || entry.path().extension() != Some(OsStr::new("xml"))
            || entry.path().file_name() == Some(OsStr::new(COMPANY_PREFIX_FILE))
        {
            continue;
        }
        let text = std::fs::read_to_string(entry.path())
            .with_context(|| format!("reading {}", entry.path().display()))?;
        let schemes = parse_scheme_file(&text)
            .with_context(|| format!("parsing {}", entry.path().display()))?;
        for scheme in schemes {
            set.push(scheme);
        }
    }
    if set.is_empty() {
        bail!("no scheme files found in {}", dir.display());
    }
    Ok(set)
}

// ─── Company prefix table ───────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct PrefixTableFile {
    #[serde(rename = "entry", default)]
    entries: Vec<PrefixEntry>,
}

#[derive(Debug, Deserialize)]
struct PrefixEntry {
    #[serde(rename = "@index")]
    index: String,
    #[serde(rename = "@companyPrefix")]
    company_prefix: String,
}

/// Parse the auxiliary table's XML text.
pub fn parse_company_prefix_table(xml: &str) -> Result<CompanyPrefixTable> {
    let file: PrefixTableFile =
        quick_xml::de::from_str(xml).context("deserializing company-prefix table")?;
    Ok(file
        .entries
        .into_iter()
        .map(|e| (e.index, e.company_prefix))
        .collect())
}

/// Load the auxiliary table from `path`.
pub fn load_company_prefix_table(path: &Path) -> Result<CompanyPrefixTable> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    parse_company_prefix_table(&text)
        .with_context(|| format!("parsing {}", path.display()))
}

// ─── DirectorySource ────────────────────────────────────────────────────────

/// A [`SchemeSource`] backed by a directory of scheme files.
///
/// `ManagerTranslation.xml` inside the directory is picked up automatically
/// when present; [`DirectorySource::with_prefix_table`] points elsewhere.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    scheme_dir: PathBuf,
    prefix_table: Option<PathBuf>,
}

impl DirectorySource {
    /// A source over the given scheme directory.
    pub fn new(scheme_dir: impl Into<PathBuf>) -> Self {
        Self {
            scheme_dir: scheme_dir.into(),
            prefix_table: None,
        }
    }

    /// Use an explicit auxiliary-table path instead of the in-directory one.
    pub fn with_prefix_table(mut self, path: impl Into<PathBuf>) -> Self {
        self.prefix_table = Some(path.into());
        self
    }

    fn prefix_table_path(&self) -> Option<PathBuf> {
        match &self.prefix_table {
            Some(path) => Some(path.clone()),
            None => {
                let candidate = self.scheme_dir.join(COMPANY_PREFIX_FILE);
                candidate.is_file().then_some(candidate)
            }
        }
    }

    fn load_inner(&self) -> Result<(SchemeSet, CompanyPrefixTable)> {
        let set = load_scheme_dir(&self.scheme_dir)?;
        let prefixes = match self.prefix_table_path() {
            Some(path) => load_company_prefix_table(&path)?,
            None => CompanyPrefixTable::new(),
        };
        Ok((set, prefixes))
    }
}

impl SchemeSource for DirectorySource {
    fn load(&self) -> std::result::Result<(SchemeSet, CompanyPrefixTable), SourceError> {
        self.load_inner().map_err(Into::into)
    }
}
