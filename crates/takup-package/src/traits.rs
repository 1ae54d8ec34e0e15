//! Capability traits implemented by package-format backends.

use std::path::Path;

use crate::{
    error::Result,
    manifest::{AttrValue, ManifestInfo},
};

/// Maps resource references to their concrete values.
pub trait ResourceResolver {
    /// Returns every value recorded for `id`, one per configuration, in table
    /// order. References are followed; an unknown id yields an empty list.
    fn resolve_id(&self, id: u32) -> Vec<AttrValue>;

    /// Resolves an attribute value. Literals resolve to themselves.
    fn resolve(&self, value: &AttrValue) -> Vec<AttrValue> {
        match value {
            AttrValue::Reference(id) => self.resolve_id(*id),
            other => vec![other.clone()],
        }
    }
}

/// An opened package that exposes its manifest, its resource table and its
/// raw entries.
///
/// The handle is released when the value is dropped; [`ManifestSource::close`]
/// makes the release explicit at the call site.
pub trait ManifestSource: Sized {
    type Resources: ResourceResolver;

    /// Opens the package at `path` and parses its manifest.
    fn open(path: &Path) -> Result<Self>;

    fn manifest(&self) -> &ManifestInfo;

    fn resources(&self) -> &Self::Resources;

    /// Reads the bytes of an arbitrary entry inside the package.
    fn extract(&mut self, entry: &str) -> Result<Vec<u8>>;

    fn close(self) {}
}
