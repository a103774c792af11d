//! WOFF2 encoding without table transforms.
//!
//! Every table is stored with the null transform, so only the brotli stage of the format is used.
//! This produces slightly larger files than a transforming encoder, but any conforming decoder
//! reads them.

use crate::encode::sfnt::{align4, push_u16, push_u32, Sfnt, SfntTable};
use anyhow::*;
use std::io::Write;

const WOFF2_HEADER_LEN: usize = 48;

/// Table flag marking a tag that is written out in full rather than taken from the known-tag list.
const ARBITRARY_TAG: u8 = 0x3F;
/// Transform version 3 is the null transform for `glyf` and `loca`.
const NULL_TRANSFORM_GLYF: u8 = 0xC0;

fn write_base128(out: &mut Vec<u8>, mut value: u32) {
    let mut bytes = [0u8; 5];
    let mut len = 0;
    loop {
        bytes[len] = (value & 0x7F) as u8;
        value >>= 7;
        len += 1;
        if value == 0 {
            break;
        }
    }
    for i in (0..len).rev() {
        out.push(if i != 0 { bytes[i] | 0x80 } else { bytes[i] });
    }
}

fn brotli(data: &[u8]) -> Result<Vec<u8>> {
    let mut writer = brotli::CompressorWriter::new(Vec::new(), 4096, 11, 22);
    writer.write_all(data)?;
    Ok(writer.into_inner())
}

/// `loca` has to directly follow `glyf` in the table directory.
fn directory_order<'a, 'b>(tables: &'b [SfntTable<'a>]) -> Vec<&'b SfntTable<'a>> {
    let mut ordered: Vec<_> = tables.iter().filter(|x| &x.tag != b"loca").collect();
    if let Some(loca) = tables.iter().find(|x| &x.tag == b"loca") {
        match ordered.iter().position(|x| &x.tag == b"glyf") {
            Some(glyf) => ordered.insert(glyf + 1, loca),
            None => ordered.push(loca),
        }
    }
    ordered
}

pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    let sfnt = Sfnt::read(data)?;
    let tables = directory_order(&sfnt.tables);

    let mut directory = Vec::new();
    let mut stream = Vec::new();
    for table in &tables {
        let transform = match &table.tag {
            b"glyf" | b"loca" => NULL_TRANSFORM_GLYF,
            _ => 0,
        };
        directory.push(ARBITRARY_TAG | transform);
        directory.extend_from_slice(&table.tag);
        write_base128(&mut directory, table.data.len() as u32);
        stream.extend_from_slice(table.data);
    }
    let compressed = brotli(&stream)?;

    let mut out = Vec::new();
    out.extend_from_slice(b"wOF2");
    push_u32(&mut out, sfnt.flavor);
    push_u32(&mut out, 0); // length, filled in below
    push_u16(&mut out, tables.len() as u16);
    push_u16(&mut out, 0);
    push_u32(&mut out, sfnt.sfnt_size() as u32);
    push_u32(&mut out, compressed.len() as u32);
    push_u16(&mut out, 1); // majorVersion
    push_u16(&mut out, 0); // minorVersion
    push_u32(&mut out, 0); // metaOffset
    push_u32(&mut out, 0); // metaLength
    push_u32(&mut out, 0); // metaOrigLength
    push_u32(&mut out, 0); // privOffset
    push_u32(&mut out, 0); // privLength
    debug_assert_eq!(out.len(), WOFF2_HEADER_LEN);
    out.extend(directory);
    out.extend(compressed);
    align4(&mut out);

    let len = (out.len() as u32).to_be_bytes();
    out[8..12].copy_from_slice(&len);
    Ok(out)
}
