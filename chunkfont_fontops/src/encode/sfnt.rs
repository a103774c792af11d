use anyhow::*;
use ttf_parser::RawFace;

pub struct SfntTable<'a> {
    pub tag: [u8; 4],
    pub checksum: u32,
    pub data: &'a [u8],
}

/// The table directory of a single (non-collection) sfnt, sorted by tag.
pub struct Sfnt<'a> {
    pub flavor: u32,
    pub tables: Vec<SfntTable<'a>>,
}
impl<'a> Sfnt<'a> {
    pub fn read(data: &'a [u8]) -> Result<Sfnt<'a>> {
        ensure!(data.len() >= 12, "Font data is too short to be an sfnt.");
        ensure!(&data[0..4] != b"ttcf", "Font collections cannot be encoded directly.");
        let flavor = u32::from_be_bytes([data[0], data[1], data[2], data[3]]);

        let face = RawFace::parse(data, 0).map_err(|e| anyhow!("Could not parse sfnt: {e}"))?;
        let mut tables = Vec::new();
        for record in face.table_records {
            let start = record.offset as usize;
            let end = start + record.length as usize;
            let Some(table) = data.get(start..end) else {
                bail!("Table {:?} lies outside of the font data.", record.tag);
            };
            tables.push(SfntTable { tag: record.tag.to_bytes(), checksum: record.check_sum, data: table });
        }
        tables.sort_by_key(|x| x.tag);

        Ok(Sfnt { flavor, tables })
    }

    /// The size of the equivalent uncompressed sfnt, including padding.
    pub fn sfnt_size(&self) -> usize {
        12 + 16 * self.tables.len() + self.tables.iter().map(|x| pad4(x.data.len())).sum::<usize>()
    }
}

pub fn pad4(len: usize) -> usize {
    (len + 3) & !3
}

pub fn push_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_be_bytes());
}
pub fn push_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_be_bytes());
}
pub fn align4(out: &mut Vec<u8>) {
    out.resize(pad4(out.len()), 0);
}
