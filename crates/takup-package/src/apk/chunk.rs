//! Chunk framing shared by compiled XML and the resource table.

use byteorder::{LittleEndian, ReadBytesExt};

use crate::{
    error::{malformed, Result},
    manifest::AttrValue,
};

pub const RES_STRING_POOL_TYPE: u16 = 0x0001;
pub const RES_TABLE_TYPE: u16 = 0x0002;
pub const RES_XML_TYPE: u16 = 0x0003;
pub const RES_XML_START_ELEMENT_TYPE: u16 = 0x0102;
pub const RES_XML_END_ELEMENT_TYPE: u16 = 0x0103;
pub const RES_XML_RESOURCE_MAP_TYPE: u16 = 0x0180;
pub const RES_TABLE_PACKAGE_TYPE: u16 = 0x0200;
pub const RES_TABLE_TYPE_TYPE: u16 = 0x0201;

pub const NO_ENTRY: u32 = 0xFFFF_FFFF;

const STRING_FLAG_UTF8: u32 = 1 << 8;

pub const TYPE_NULL: u8 = 0x00;
pub const TYPE_REFERENCE: u8 = 0x01;
pub const TYPE_STRING: u8 = 0x03;
pub const TYPE_INT_DEC: u8 = 0x10;
pub const TYPE_INT_HEX: u8 = 0x11;
pub const TYPE_INT_BOOLEAN: u8 = 0x12;

pub fn u8_at(data: &[u8], offset: usize) -> Result<u8> {
    let mut slice = data.get(offset..).ok_or_else(|| truncated(offset))?;
    slice.read_u8().map_err(|_| truncated(offset))
}

pub fn u16_at(data: &[u8], offset: usize) -> Result<u16> {
    let mut slice = data.get(offset..).ok_or_else(|| truncated(offset))?;
    slice
        .read_u16::<LittleEndian>()
        .map_err(|_| truncated(offset))
}

pub fn u32_at(data: &[u8], offset: usize) -> Result<u32> {
    let mut slice = data.get(offset..).ok_or_else(|| truncated(offset))?;
    slice
        .read_u32::<LittleEndian>()
        .map_err(|_| truncated(offset))
}

fn truncated(offset: usize) -> crate::error::PackageError {
    malformed(format!("unexpected end of data at offset {offset:#x}"))
}

/// The 8-byte header that starts every chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    pub ty: u16,
    pub header_size: u16,
    pub size: u32,
    /// Absolute offset of the chunk within the buffer.
    pub start: usize,
}

impl ChunkHeader {
    pub fn read(data: &[u8], start: usize) -> Result<Self> {
        let ty = u16_at(data, start)?;
        let header_size = u16_at(data, start + 2)?;
        let size = u32_at(data, start + 4)?;

        if header_size < 8 || size < header_size as u32 {
            return Err(malformed(format!(
                "invalid chunk sizing at offset {start:#x} (header {header_size}, size {size})"
            )));
        }
        let end = start
            .checked_add(size as usize)
            .ok_or_else(|| malformed("chunk size overflow"))?;
        if end > data.len() {
            return Err(malformed(format!(
                "chunk at offset {start:#x} extends past end of data"
            )));
        }

        Ok(Self {
            ty,
            header_size,
            size,
            start,
        })
    }

    pub fn body_start(&self) -> usize {
        self.start + self.header_size as usize
    }

    pub fn end(&self) -> usize {
        self.start + self.size as usize
    }
}

/// Iterates sibling chunks laid out back to back in `start..end`.
pub struct Chunks<'a> {
    data: &'a [u8],
    pos: usize,
    end: usize,
    failed: bool,
}

impl<'a> Chunks<'a> {
    pub fn new(data: &'a [u8], start: usize, end: usize) -> Self {
        Self {
            data,
            pos: start,
            end,
            failed: false,
        }
    }
}

impl Iterator for Chunks<'_> {
    type Item = Result<ChunkHeader>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.pos + 8 > self.end {
            return None;
        }
        match ChunkHeader::read(self.data, self.pos) {
            Ok(header) => {
                self.pos = header.end();
                Some(Ok(header))
            }
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct StringPool {
    strings: Vec<String>,
}

impl StringPool {
    pub fn parse(data: &[u8], header: &ChunkHeader) -> Result<Self> {
        let base = header.start + 8;
        let string_count = u32_at(data, base)? as usize;
        let flags = u32_at(data, base + 8)?;
        let strings_start = u32_at(data, base + 12)? as usize;

        let is_utf8 = flags & STRING_FLAG_UTF8 != 0;
        let offsets_start = header.body_start();
        let strings_base = header.start + strings_start;
        let limit = header.end();

        let mut strings = Vec::with_capacity(string_count.min(limit));
        for i in 0..string_count {
            let offset = u32_at(data, offsets_start + i * 4)? as usize;
            let absolute = strings_base + offset;
            let text = if is_utf8 {
                read_utf8_string(data, absolute, limit)?
            } else {
                read_utf16_string(data, absolute, limit)?
            };
            strings.push(text);
        }

        Ok(Self { strings })
    }

    pub fn get(&self, idx: u32) -> Option<&str> {
        if idx == NO_ENTRY {
            return None;
        }
        self.strings.get(idx as usize).map(String::as_str)
    }
}

fn read_utf8_length(data: &[u8], offset: usize) -> Result<(usize, usize)> {
    let first = u8_at(data, offset)?;
    if first & 0x80 == 0 {
        Ok((first as usize, 1))
    } else {
        let second = u8_at(data, offset + 1)?;
        Ok(((((first & 0x7F) as usize) << 8) | second as usize, 2))
    }
}

fn read_utf16_length(data: &[u8], offset: usize) -> Result<(usize, usize)> {
    let first = u16_at(data, offset)?;
    if first & 0x8000 == 0 {
        Ok((first as usize, 2))
    } else {
        let second = u16_at(data, offset + 2)?;
        Ok(((((first & 0x7FFF) as usize) << 16) | second as usize, 4))
    }
}

fn read_utf8_string(data: &[u8], offset: usize, limit: usize) -> Result<String> {
    // utf-8 pool entries carry the utf-16 length first, then the byte length
    let (_, char_len_size) = read_utf8_length(data, offset)?;
    let (byte_len, byte_len_size) = read_utf8_length(data, offset + char_len_size)?;
    let start = offset + char_len_size + byte_len_size;
    if start + byte_len > limit {
        return Err(malformed("UTF-8 string exceeds string pool bounds"));
    }
    Ok(String::from_utf8_lossy(&data[start..start + byte_len]).into_owned())
}

fn read_utf16_string(data: &[u8], offset: usize, limit: usize) -> Result<String> {
    let (char_count, len_size) = read_utf16_length(data, offset)?;
    let start = offset + len_size;
    let byte_len = char_count * 2;
    if start + byte_len > limit {
        return Err(malformed("UTF-16 string exceeds string pool bounds"));
    }
    let units: Vec<u16> = data[start..start + byte_len]
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    Ok(String::from_utf16_lossy(&units))
}

/// Decodes a `Res_value` payload against the string pool it refers to.
pub fn decode_value(strings: &StringPool, data_type: u8, data: u32) -> Result<AttrValue> {
    let value = match data_type {
        TYPE_REFERENCE => AttrValue::Reference(data),
        TYPE_STRING => {
            let s = strings
                .get(data)
                .ok_or_else(|| malformed(format!("string index {data} out of range")))?;
            AttrValue::String(s.to_string())
        }
        TYPE_INT_DEC | TYPE_INT_HEX => AttrValue::Int(data as i32 as i64),
        TYPE_INT_BOOLEAN => AttrValue::Bool(data != 0),
        _ => AttrValue::Other { data_type, data },
    };
    Ok(value)
}
