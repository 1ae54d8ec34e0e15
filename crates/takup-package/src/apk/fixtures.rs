//! Builders for the binary formats the decoders read, so tests can assemble
//! manifests, resource tables and whole packages in memory.

use std::{collections::HashMap, fs::File, io::Write, path::Path};

use zip::{write::SimpleFileOptions, CompressionMethod, ZipWriter};

use super::chunk::{
    NO_ENTRY, RES_STRING_POOL_TYPE, RES_TABLE_PACKAGE_TYPE, RES_TABLE_TYPE, RES_TABLE_TYPE_TYPE,
    RES_XML_END_ELEMENT_TYPE, RES_XML_RESOURCE_MAP_TYPE, RES_XML_START_ELEMENT_TYPE, RES_XML_TYPE,
    TYPE_INT_BOOLEAN, TYPE_INT_DEC, TYPE_REFERENCE, TYPE_STRING,
};

#[derive(Debug, Clone, Copy)]
pub enum Value {
    Str(&'static str),
    Int(u32),
    Ref(u32),
    Bool(bool),
}

#[derive(Debug, Clone, Copy)]
enum AttrName {
    Named(&'static str),
    Stripped(u32),
}

#[derive(Debug, Clone)]
pub struct Element {
    name: &'static str,
    attrs: Vec<(AttrName, Value)>,
    children: Vec<Element>,
}

impl Element {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(mut self, name: &'static str, value: Value) -> Self {
        self.attrs.push((AttrName::Named(name), value));
        self
    }

    /// An attribute whose name string is empty, identified only through the
    /// resource map.
    pub fn stripped_attr(mut self, resource_id: u32, value: Value) -> Self {
        self.attrs.push((AttrName::Stripped(resource_id), value));
        self
    }

    pub fn child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }
}

/// How type chunks lay out their entry index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Dense,
    Sparse,
    Offset16,
    Compact,
}

fn chunk(ty: u16, header_size: u16, header_rest: &[u8], body: &[u8]) -> Vec<u8> {
    let size = 8 + header_rest.len() + body.len();
    assert_eq!(8 + header_rest.len(), header_size as usize);
    let mut out = Vec::with_capacity(size);
    out.extend_from_slice(&ty.to_le_bytes());
    out.extend_from_slice(&header_size.to_le_bytes());
    out.extend_from_slice(&(size as u32).to_le_bytes());
    out.extend_from_slice(header_rest);
    out.extend_from_slice(body);
    out
}

fn pad4(buf: &mut Vec<u8>) {
    while buf.len() % 4 != 0 {
        buf.push(0);
    }
}

fn pool_chunk(strings: &[String], utf8: bool) -> Vec<u8> {
    let mut offsets = Vec::new();
    let mut data = Vec::new();
    for s in strings {
        offsets.extend_from_slice(&(data.len() as u32).to_le_bytes());
        if utf8 {
            data.push(s.encode_utf16().count() as u8);
            data.push(s.len() as u8);
            data.extend_from_slice(s.as_bytes());
            data.push(0);
        } else {
            let units: Vec<u16> = s.encode_utf16().collect();
            data.extend_from_slice(&(units.len() as u16).to_le_bytes());
            for unit in units {
                data.extend_from_slice(&unit.to_le_bytes());
            }
            data.extend_from_slice(&0u16.to_le_bytes());
        }
    }
    pad4(&mut data);

    let flags: u32 = if utf8 { 1 << 8 } else { 0 };
    let strings_start = 28 + offsets.len() as u32;

    let mut header = Vec::new();
    header.extend_from_slice(&(strings.len() as u32).to_le_bytes());
    header.extend_from_slice(&0u32.to_le_bytes());
    header.extend_from_slice(&flags.to_le_bytes());
    header.extend_from_slice(&strings_start.to_le_bytes());
    header.extend_from_slice(&0u32.to_le_bytes());

    let mut body = offsets;
    body.extend(data);
    chunk(RES_STRING_POOL_TYPE, 28, &header, &body)
}

pub fn string_pool_chunk(strings: &[String]) -> Vec<u8> {
    pool_chunk(strings, false)
}

pub fn utf8_string_pool_chunk(strings: &[String]) -> Vec<u8> {
    pool_chunk(strings, true)
}

#[derive(Default)]
struct Interner {
    strings: Vec<String>,
    lookup: HashMap<String, u32>,
}

impl Interner {
    fn intern(&mut self, s: &str) -> u32 {
        if let Some(idx) = self.lookup.get(s) {
            return *idx;
        }
        let idx = self.strings.len() as u32;
        self.strings.push(s.to_string());
        self.lookup.insert(s.to_string(), idx);
        idx
    }
}

fn encode_value(strings: &mut Interner, value: Value) -> (u8, u32) {
    match value {
        Value::Str(s) => (TYPE_STRING, strings.intern(s)),
        Value::Int(n) => (TYPE_INT_DEC, n),
        Value::Ref(id) => (TYPE_REFERENCE, id),
        Value::Bool(b) => (TYPE_INT_BOOLEAN, if b { 0xFFFF_FFFF } else { 0 }),
    }
}

fn collect_stripped(element: &Element, ids: &mut Vec<u32>) {
    for (name, _) in &element.attrs {
        if let AttrName::Stripped(id) = name {
            ids.push(*id);
        }
    }
    for child in &element.children {
        collect_stripped(child, ids);
    }
}

struct XmlEncoder {
    strings: Interner,
    next_stripped: u32,
    body: Vec<u8>,
}

impl XmlEncoder {
    fn element(&mut self, element: &Element) {
        let name = self.strings.intern(element.name);

        let mut attrs = Vec::new();
        for (attr_name, value) in &element.attrs {
            let name_idx = match attr_name {
                AttrName::Named(name) => self.strings.intern(name),
                AttrName::Stripped(_) => {
                    let idx = self.next_stripped;
                    self.next_stripped += 1;
                    idx
                }
            };
            let (data_type, data) = encode_value(&mut self.strings, *value);
            let raw = if data_type == TYPE_STRING { data } else { NO_ENTRY };

            attrs.extend_from_slice(&NO_ENTRY.to_le_bytes());
            attrs.extend_from_slice(&name_idx.to_le_bytes());
            attrs.extend_from_slice(&raw.to_le_bytes());
            attrs.extend_from_slice(&8u16.to_le_bytes());
            attrs.push(0);
            attrs.push(data_type);
            attrs.extend_from_slice(&data.to_le_bytes());
        }

        let mut node_header = Vec::new();
        node_header.extend_from_slice(&1u32.to_le_bytes());
        node_header.extend_from_slice(&NO_ENTRY.to_le_bytes());

        let mut ext = Vec::new();
        ext.extend_from_slice(&NO_ENTRY.to_le_bytes());
        ext.extend_from_slice(&name.to_le_bytes());
        ext.extend_from_slice(&20u16.to_le_bytes());
        ext.extend_from_slice(&20u16.to_le_bytes());
        ext.extend_from_slice(&(element.attrs.len() as u16).to_le_bytes());
        ext.extend_from_slice(&[0u8; 6]);
        ext.extend(attrs);
        self.body
            .extend(chunk(RES_XML_START_ELEMENT_TYPE, 16, &node_header, &ext));

        for child in &element.children {
            self.element(child);
        }

        let mut end = Vec::new();
        end.extend_from_slice(&NO_ENTRY.to_le_bytes());
        end.extend_from_slice(&name.to_le_bytes());
        self.body
            .extend(chunk(RES_XML_END_ELEMENT_TYPE, 16, &node_header, &end));
    }
}

/// Encodes an element tree as a compiled XML document.
pub fn encode_xml(root: &Element) -> Vec<u8> {
    let mut stripped = Vec::new();
    collect_stripped(root, &mut stripped);

    // stripped names occupy the leading pool slots, matched by the resource map
    let mut strings = Interner::default();
    strings.strings = vec![String::new(); stripped.len()];

    let mut encoder = XmlEncoder {
        strings,
        next_stripped: 0,
        body: Vec::new(),
    };
    encoder.element(root);

    let mut doc = string_pool_chunk(&encoder.strings.strings);
    if !stripped.is_empty() {
        let ids: Vec<u8> = stripped.iter().flat_map(|id| id.to_le_bytes()).collect();
        doc.extend(chunk(RES_XML_RESOURCE_MAP_TYPE, 8, &[], &ids));
    }
    doc.extend(encoder.body);
    chunk(RES_XML_TYPE, 8, &[], &doc)
}

/// Encodes a resource table for package `0x7f`. Each inner slice becomes one
/// configuration; ids in it must all belong to package `0x7f`.
pub fn encode_table(configs: &[&[(u32, Value)]]) -> Vec<u8> {
    encode_table_with(configs, Layout::Dense)
}

pub fn encode_table_with(configs: &[&[(u32, Value)]], layout: Layout) -> Vec<u8> {
    let mut strings = Interner::default();
    let mut type_chunks = Vec::new();

    for config in configs {
        let mut by_type: Vec<(u8, Vec<(u32, Value)>)> = Vec::new();
        for (id, value) in config.iter() {
            let type_id = ((id >> 16) & 0xff) as u8;
            let index = id & 0xffff;
            match by_type.iter_mut().find(|(ty, _)| *ty == type_id) {
                Some((_, entries)) => entries.push((index, *value)),
                None => by_type.push((type_id, vec![(index, *value)])),
            }
        }
        by_type.sort_by_key(|(ty, _)| *ty);

        for (type_id, mut entries) in by_type {
            entries.sort_by_key(|(index, _)| *index);
            type_chunks.extend(type_chunk(&mut strings, type_id, &entries, layout));
        }
    }

    let mut package_header = Vec::new();
    package_header.extend_from_slice(&0x7fu32.to_le_bytes());
    let mut name = [0u8; 256];
    for (i, unit) in "com.example".encode_utf16().enumerate() {
        name[i * 2..i * 2 + 2].copy_from_slice(&unit.to_le_bytes());
    }
    package_header.extend_from_slice(&name);
    package_header.extend_from_slice(&[0u8; 20]);

    let mut package_body = string_pool_chunk(&["string".to_string()]);
    package_body.extend(string_pool_chunk(&["entry".to_string()]));
    package_body.extend(type_chunks);
    let package = chunk(RES_TABLE_PACKAGE_TYPE, 288, &package_header, &package_body);

    let mut body = string_pool_chunk(&strings.strings);
    body.extend(package);
    chunk(RES_TABLE_TYPE, 12, &1u32.to_le_bytes(), &body)
}

fn type_chunk(
    strings: &mut Interner,
    type_id: u8,
    entries: &[(u32, Value)],
    layout: Layout,
) -> Vec<u8> {
    let slot_count = entries.last().map(|(index, _)| index + 1).unwrap_or(0) as usize;

    let mut entry_data = Vec::new();
    let mut offsets: Vec<(u32, usize)> = Vec::new();
    for (index, value) in entries {
        offsets.push((*index, entry_data.len()));
        let (data_type, data) = encode_value(strings, *value);
        if layout == Layout::Compact {
            let flags = 0x0008u16 | ((data_type as u16) << 8);
            entry_data.extend_from_slice(&0u16.to_le_bytes());
            entry_data.extend_from_slice(&flags.to_le_bytes());
            entry_data.extend_from_slice(&data.to_le_bytes());
        } else {
            entry_data.extend_from_slice(&8u16.to_le_bytes());
            entry_data.extend_from_slice(&0u16.to_le_bytes());
            entry_data.extend_from_slice(&0u32.to_le_bytes());
            entry_data.extend_from_slice(&8u16.to_le_bytes());
            entry_data.push(0);
            entry_data.push(data_type);
            entry_data.extend_from_slice(&data.to_le_bytes());
        }
    }

    let (flags, entry_count, mut index) = match layout {
        Layout::Dense | Layout::Compact => {
            let mut index = vec![0xffu8; slot_count * 4];
            for (slot, offset) in &offsets {
                let at = *slot as usize * 4;
                index[at..at + 4].copy_from_slice(&(*offset as u32).to_le_bytes());
            }
            (0u8, slot_count, index)
        }
        Layout::Offset16 => {
            let mut index = vec![0xffu8; slot_count * 2];
            for (slot, offset) in &offsets {
                let at = *slot as usize * 2;
                index[at..at + 2].copy_from_slice(&((*offset / 4) as u16).to_le_bytes());
            }
            (0x02u8, slot_count, index)
        }
        Layout::Sparse => {
            let mut index = Vec::new();
            for (slot, offset) in &offsets {
                index.extend_from_slice(&(*slot as u16).to_le_bytes());
                index.extend_from_slice(&((*offset / 4) as u16).to_le_bytes());
            }
            (0x01u8, offsets.len(), index)
        }
    };
    pad4(&mut index);

    let entries_start = 84 + index.len() as u32;
    let mut header = Vec::new();
    header.push(type_id);
    header.push(flags);
    header.extend_from_slice(&0u16.to_le_bytes());
    header.extend_from_slice(&(entry_count as u32).to_le_bytes());
    header.extend_from_slice(&entries_start.to_le_bytes());
    let mut config = [0u8; 64];
    config[0..4].copy_from_slice(&64u32.to_le_bytes());
    header.extend_from_slice(&config);

    index.extend(entry_data);
    chunk(RES_TABLE_TYPE_TYPE, 84, &header, &index)
}

/// Writes a zip archive at `path` holding the given entries.
pub fn build_apk(path: &Path, entries: &[(&str, &[u8])]) {
    let file = File::create(path).unwrap();
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, data) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap();
}
