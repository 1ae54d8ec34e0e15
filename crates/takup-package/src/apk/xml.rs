//! Decoder for Android's compiled (binary) XML, as used by
//! `AndroidManifest.xml` inside an APK.

use tracing::trace;

use super::chunk::{
    decode_value, u16_at, u32_at, u8_at, ChunkHeader, Chunks, StringPool, NO_ENTRY,
    RES_STRING_POOL_TYPE, RES_XML_END_ELEMENT_TYPE, RES_XML_RESOURCE_MAP_TYPE,
    RES_XML_START_ELEMENT_TYPE, RES_XML_TYPE, TYPE_NULL,
};
use crate::{
    error::{malformed, Result},
    manifest::{AttrValue, XmlAttribute, XmlElement},
};

/// Framework attribute ids for the attributes the reader looks up. Shrunk or
/// obfuscated manifests may drop attribute name strings; the resource map
/// still carries these ids.
const WELL_KNOWN_ATTRIBUTES: &[(u32, &str)] = &[
    (0x0101_0001, "label"),
    (0x0101_0002, "icon"),
    (0x0101_0003, "name"),
    (0x0101_0020, "description"),
    (0x0101_0024, "value"),
    (0x0101_020c, "minSdkVersion"),
    (0x0101_021b, "versionCode"),
    (0x0101_021c, "versionName"),
];

fn well_known_attribute(id: u32) -> Option<&'static str> {
    WELL_KNOWN_ATTRIBUTES
        .iter()
        .find(|(known, _)| *known == id)
        .map(|(_, name)| *name)
}

/// Decodes a compiled XML document into its element tree and returns the root.
pub fn parse_xml(data: &[u8]) -> Result<XmlElement> {
    let header = ChunkHeader::read(data, 0)?;
    if header.ty != RES_XML_TYPE {
        return Err(malformed(format!(
            "not a binary XML document (chunk type {:#06x})",
            header.ty
        )));
    }

    let mut strings = StringPool::default();
    let mut resource_ids: Vec<u32> = Vec::new();
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    for chunk in Chunks::new(data, header.body_start(), header.end()) {
        let chunk = chunk?;
        match chunk.ty {
            RES_STRING_POOL_TYPE => strings = StringPool::parse(data, &chunk)?,
            RES_XML_RESOURCE_MAP_TYPE => {
                let count = (chunk.end() - chunk.body_start()) / 4;
                resource_ids = (0..count)
                    .map(|i| u32_at(data, chunk.body_start() + i * 4))
                    .collect::<Result<_>>()?;
            }
            RES_XML_START_ELEMENT_TYPE => {
                let element = read_start_element(data, &chunk, &strings, &resource_ids)?;
                trace!(element = %element.name, "start element");
                stack.push(element);
            }
            RES_XML_END_ELEMENT_TYPE => {
                let element = stack
                    .pop()
                    .ok_or_else(|| malformed("end element without matching start"))?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None if root.is_none() => root = Some(element),
                    None => return Err(malformed("binary XML has more than one root element")),
                }
            }
            // namespaces and CDATA carry nothing the manifest reader needs
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(malformed("binary XML ended inside an open element"));
    }
    root.ok_or_else(|| malformed("binary XML has no root element"))
}

fn read_start_element(
    data: &[u8],
    chunk: &ChunkHeader,
    strings: &StringPool,
    resource_ids: &[u32],
) -> Result<XmlElement> {
    let ext = chunk.body_start();
    let name_idx = u32_at(data, ext + 4)?;
    let attribute_start = u16_at(data, ext + 8)? as usize;
    let attribute_size = u16_at(data, ext + 10)? as usize;
    let attribute_count = u16_at(data, ext + 12)? as usize;

    let name = strings
        .get(name_idx)
        .ok_or_else(|| malformed(format!("element name index {name_idx} out of range")))?
        .to_string();

    let mut attributes = Vec::with_capacity(attribute_count);
    for i in 0..attribute_count {
        let at = ext + attribute_start + i * attribute_size;
        let name_idx = u32_at(data, at + 4)?;
        let raw_value = u32_at(data, at + 8)?;
        let data_type = u8_at(data, at + 15)?;
        let value_data = u32_at(data, at + 16)?;

        let attr_name = match strings.get(name_idx) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => {
                let by_id = resource_ids
                    .get(name_idx as usize)
                    .and_then(|id| well_known_attribute(*id));
                match by_id {
                    Some(name) => name.to_string(),
                    None => continue,
                }
            }
        };

        let value = if data_type == TYPE_NULL && raw_value != NO_ENTRY {
            match strings.get(raw_value) {
                Some(raw) => AttrValue::String(raw.to_string()),
                None => AttrValue::Other {
                    data_type,
                    data: value_data,
                },
            }
        } else {
            decode_value(strings, data_type, value_data)?
        };

        attributes.push(XmlAttribute {
            name: attr_name,
            value,
        });
    }

    Ok(XmlElement {
        name,
        attributes,
        children: Vec::new(),
    })
}
