//! Decoder for `resources.arsc`, the compiled resource table.
//!
//! Only simple entries are kept: strings, references, integers and booleans
//! are what manifest attributes point at. Complex (bag) entries such as styles
//! and plurals are skipped.

use std::collections::HashMap;

use tracing::{debug, trace};

use super::chunk::{
    decode_value, u16_at, u32_at, u8_at, ChunkHeader, Chunks, StringPool, NO_ENTRY,
    RES_STRING_POOL_TYPE, RES_TABLE_PACKAGE_TYPE, RES_TABLE_TYPE, RES_TABLE_TYPE_TYPE,
};
use crate::{
    error::{malformed, Result},
    manifest::AttrValue,
    traits::ResourceResolver,
};

const FLAG_SPARSE: u8 = 0x01;
const FLAG_OFFSET16: u8 = 0x02;

const ENTRY_FLAG_COMPLEX: u16 = 0x0001;
const ENTRY_FLAG_COMPACT: u16 = 0x0008;

const NO_ENTRY16: u16 = 0xFFFF;

/// Reference chains longer than this are treated as unresolvable.
const MAX_REFERENCE_DEPTH: usize = 8;

/// Resource values indexed by resource id.
#[derive(Debug, Default)]
pub struct ResourceTable {
    entries: HashMap<u32, Vec<AttrValue>>,
}

impl ResourceTable {
    /// A table with no entries, for packages that ship without
    /// `resources.arsc`.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn parse(data: &[u8]) -> Result<Self> {
        let header = ChunkHeader::read(data, 0)?;
        if header.ty != RES_TABLE_TYPE {
            return Err(malformed(format!(
                "not a resource table (chunk type {:#06x})",
                header.ty
            )));
        }

        let mut table = Self::default();
        let mut strings: Option<StringPool> = None;

        for chunk in Chunks::new(data, header.body_start(), header.end()) {
            let chunk = chunk?;
            match chunk.ty {
                RES_STRING_POOL_TYPE if strings.is_none() => {
                    strings = Some(StringPool::parse(data, &chunk)?);
                }
                RES_TABLE_PACKAGE_TYPE => {
                    let pool = strings
                        .as_ref()
                        .ok_or_else(|| malformed("resource package before value string pool"))?;
                    table.read_package(data, &chunk, pool)?;
                }
                _ => {}
            }
        }

        debug!(entries = table.entries.len(), "parsed resource table");
        Ok(table)
    }

    fn read_package(&mut self, data: &[u8], chunk: &ChunkHeader, strings: &StringPool) -> Result<()> {
        let package_id = u32_at(data, chunk.start + 8)?;
        trace!(package_id, "resource package");

        for child in Chunks::new(data, chunk.body_start(), chunk.end()) {
            let child = child?;
            if child.ty == RES_TABLE_TYPE_TYPE {
                self.read_type(data, &child, package_id, strings)?;
            }
        }
        Ok(())
    }

    fn read_type(
        &mut self,
        data: &[u8],
        chunk: &ChunkHeader,
        package_id: u32,
        strings: &StringPool,
    ) -> Result<()> {
        let type_id = u8_at(data, chunk.start + 8)? as u32;
        let flags = u8_at(data, chunk.start + 9)?;
        let entry_count = u32_at(data, chunk.start + 12)? as usize;
        let entries_start = chunk.start + u32_at(data, chunk.start + 16)? as usize;
        let index_start = chunk.body_start();

        for (index, offset) in entry_offsets(data, index_start, entry_count, flags)? {
            let at = entries_start + offset;
            if at >= chunk.end() {
                return Err(malformed(format!("resource entry {index} outside its type chunk")));
            }

            let size = u16_at(data, at)? as usize;
            let entry_flags = u16_at(data, at + 2)?;
            let (data_type, value) = if entry_flags & ENTRY_FLAG_COMPACT != 0 {
                ((entry_flags >> 8) as u8, u32_at(data, at + 4)?)
            } else if entry_flags & ENTRY_FLAG_COMPLEX != 0 {
                continue;
            } else {
                (u8_at(data, at + size + 3)?, u32_at(data, at + size + 4)?)
            };

            let id = (package_id << 24) | (type_id << 16) | index;
            let decoded = decode_value(strings, data_type, value)?;
            self.entries.entry(id).or_default().push(decoded);
        }
        Ok(())
    }

    fn resolve_at_depth(&self, id: u32, depth: usize, out: &mut Vec<AttrValue>) {
        let Some(values) = self.entries.get(&id) else {
            return;
        };
        for value in values {
            match value {
                AttrValue::Reference(target) => {
                    if depth < MAX_REFERENCE_DEPTH && *target != 0 {
                        self.resolve_at_depth(*target, depth + 1, out);
                    }
                }
                other => out.push(other.clone()),
            }
        }
    }
}

impl ResourceResolver for ResourceTable {
    fn resolve_id(&self, id: u32) -> Vec<AttrValue> {
        let mut out = Vec::new();
        self.resolve_at_depth(id, 0, &mut out);
        out
    }
}

/// Reads the entry index of a type chunk as `(entry index, byte offset)`
/// pairs, skipping absent entries.
fn entry_offsets(data: &[u8], start: usize, count: usize, flags: u8) -> Result<Vec<(u32, usize)>> {
    let mut offsets = Vec::with_capacity(count.min(data.len() / 2));
    for i in 0..count {
        if flags & FLAG_SPARSE != 0 {
            let index = u16_at(data, start + i * 4)? as u32;
            let offset = u16_at(data, start + i * 4 + 2)? as usize * 4;
            offsets.push((index, offset));
        } else if flags & FLAG_OFFSET16 != 0 {
            let offset = u16_at(data, start + i * 2)?;
            if offset != NO_ENTRY16 {
                offsets.push((i as u32, offset as usize * 4));
            }
        } else {
            let offset = u32_at(data, start + i * 4)?;
            if offset != NO_ENTRY {
                offsets.push((i as u32, offset as usize));
            }
        }
    }
    Ok(offsets)
}
