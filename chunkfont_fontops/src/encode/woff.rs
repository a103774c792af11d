//! WOFF 1.0 encoding, with each table zlib-compressed where that helps.

use crate::encode::sfnt::{align4, push_u16, push_u32, Sfnt};
use anyhow::*;
use flate2::{write::ZlibEncoder, Compression};
use std::io::Write;

const WOFF_HEADER_LEN: usize = 44;
const WOFF_ENTRY_LEN: usize = 20;

fn zlib(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    let sfnt = Sfnt::read(data)?;

    let data_start = WOFF_HEADER_LEN + WOFF_ENTRY_LEN * sfnt.tables.len();
    let mut directory = Vec::new();
    let mut table_data = Vec::new();
    for table in &sfnt.tables {
        let compressed = zlib(table.data)?;
        let stored = if compressed.len() < table.data.len() { compressed.as_slice() } else { table.data };

        directory.extend_from_slice(&table.tag);
        push_u32(&mut directory, (data_start + table_data.len()) as u32);
        push_u32(&mut directory, stored.len() as u32);
        push_u32(&mut directory, table.data.len() as u32);
        push_u32(&mut directory, table.checksum);

        table_data.extend_from_slice(stored);
        align4(&mut table_data);
    }

    let mut out = Vec::with_capacity(data_start + table_data.len());
    out.extend_from_slice(b"wOFF");
    push_u32(&mut out, sfnt.flavor);
    push_u32(&mut out, (data_start + table_data.len()) as u32);
    push_u16(&mut out, sfnt.tables.len() as u16);
    push_u16(&mut out, 0);
    push_u32(&mut out, sfnt.sfnt_size() as u32);
    push_u16(&mut out, 1); // majorVersion
    push_u16(&mut out, 0); // minorVersion
    push_u32(&mut out, 0); // metaOffset
    push_u32(&mut out, 0); // metaLength
    push_u32(&mut out, 0); // metaOrigLength
    push_u32(&mut out, 0); // privOffset
    push_u32(&mut out, 0); // privLength
    out.extend(directory);
    out.extend(table_data);
    Ok(out)
}
