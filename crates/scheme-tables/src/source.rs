//! The seam between the translation engine and scheme loading.
//!
//! The engine never touches the filesystem itself: it consumes a
//! [`SchemeSource`] that produces a fresh [`SchemeSet`] and
//! [`CompanyPrefixTable`] on demand, both at construction and on refresh.

use crate::{CompanyPrefixTable, SchemeSet};

/// Error type produced by a [`SchemeSource`].
///
/// Loading is performed by external collaborators with their own error
/// stacks, so the seam carries a boxed error rather than prescribing one.
pub type SourceError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Produces the engine's scheme tables.
///
/// Implementations are expected to re-read their backing store on every
/// call so that a refresh observes edited scheme files.
pub trait SchemeSource: Send + Sync {
    /// Load the scheme set and the auxiliary company-prefix table.
    fn load(&self) -> Result<(SchemeSet, CompanyPrefixTable), SourceError>;
}

impl<T: SchemeSource + ?Sized> SchemeSource for Box<T> {
    fn load(&self) -> Result<(SchemeSet, CompanyPrefixTable), SourceError> {
        (**self).load()
    }
}
