//! dBASE III (`.dbf`) attribute table reader and writer.
//!
//! Only the two field types the toolkit's data uses are supported:
//! Character (`C`) and Numeric (`N`). Values are fixed-width ASCII;
//! numeric fields are right-justified and empty cells read as NaN.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use log::warn;

use crate::error::VectorError;
use crate::feature::AttrValue;

const FIELD_TERMINATOR: u8 = 0x0D;
const EOF_MARKER: u8 = 0x1A;
const DELETED_FLAG: u8 = b'*';

#[derive(Clone, Debug)]
struct FieldDescriptor {
    name: String,
    kind: u8,
    length: usize,
}

/// Read every record of a `.dbf` attribute table.
pub fn read_dbf(path: &Path) -> Result<Vec<IndexMap<String, AttrValue>>, VectorError> {
    let data = fs::read(path)?;
    if data.len() < 32 {
        return Err(VectorError::InvalidFormat {
            detail: "file shorter than the dBASE header".to_string(),
        });
    }
    let n_records = u32::from_le_bytes(data[4..8].try_into().expect("length checked")) as usize;
    let header_size = u16::from_le_bytes(data[8..10].try_into().expect("length checked")) as usize;
    let record_size = u16::from_le_bytes(data[10..12].try_into().expect("length checked")) as usize;
    if data.len() < header_size {
        return Err(VectorError::InvalidFormat {
            detail: format!("header claims {header_size} bytes, file has {}", data.len()),
        });
    }

    let mut fields: Vec<FieldDescriptor> = Vec::new();
    let mut off = 32;
    while off + 32 <= header_size && data.get(off) != Some(&FIELD_TERMINATOR) {
        let raw_name = &data[off..off + 11];
        let end = raw_name.iter().position(|&b| b == 0).unwrap_or(11);
        let name = String::from_utf8_lossy(&raw_name[..end]).trim().to_string();
        let kind = data[off + 11];
        let length = data[off + 16] as usize;
        match kind {
            b'C' | b'N' | b'F' => {}
            other => {
                return Err(VectorError::Unsupported {
                    feature: format!("dBASE field type '{}'", other as char),
                })
            }
        }
        fields.push(FieldDescriptor { name, kind, length });
        off += 32;
    }
    let expected_record = 1 + fields.iter().map(|f| f.length).sum::<usize>();
    if expected_record != record_size {
        return Err(VectorError::InvalidFormat {
            detail: format!(
                "record size {record_size} does not match field widths ({expected_record})"
            ),
        });
    }

    let mut records = Vec::with_capacity(n_records);
    for i in 0..n_records {
        let start = header_size + i * record_size;
        let bytes = data
            .get(start..start + record_size)
            .ok_or_else(|| VectorError::InvalidFormat {
                detail: format!("truncated dBASE record {i}"),
            })?;
        if bytes[0] == DELETED_FLAG {
            warn!("dBASE record {i} is flagged deleted; keeping it");
        }
        let mut row = IndexMap::with_capacity(fields.len());
        let mut pos = 1;
        for field in &fields {
            let cell = String::from_utf8_lossy(&bytes[pos..pos + field.length]);
            let cell = cell.trim_matches(|c: char| c == ' ' || c == '\0').to_string();
            let value = match field.kind {
                b'N' | b'F' => AttrValue::Number(cell.parse().unwrap_or(f64::NAN)),
                _ => AttrValue::Text(cell),
            };
            row.insert(field.name.clone(), value);
            pos += field.length;
        }
        records.push(row);
    }
    Ok(records)
}

/// Column widths derived from the data itself.
fn plan_fields(records: &[IndexMap<String, AttrValue>]) -> Vec<FieldDescriptor> {
    let mut fields: Vec<FieldDescriptor> = Vec::new();
    for record in records {
        for (name, value) in record {
            if !fields.iter().any(|f| &f.name == name) {
                fields.push(FieldDescriptor {
                    name: name.clone(),
                    kind: b'N',
                    length: 18,
                });
            }
            if matches!(value, AttrValue::Text(_)) {
                let field = fields
                    .iter_mut()
                    .find(|f| &f.name == name)
                    .expect("just ensured");
                field.kind = b'C';
            }
        }
    }
    for field in &mut fields {
        if field.kind == b'C' {
            let widest = records
                .iter()
                .filter_map(|r| r.get(&field.name))
                .map(|v| v.as_text().len())
                .max()
                .unwrap_or(1);
            field.length = widest.clamp(1, 254);
        }
    }
    fields
}

/// Write records as a dBASE III table.
///
/// Field types and widths are derived from the data: columns whose every
/// value is numeric become Numeric(18, 6), everything else Character
/// sized to the widest value.
pub fn write_dbf(path: &Path, records: &[IndexMap<String, AttrValue>]) -> Result<(), VectorError> {
    let fields = plan_fields(records);
    let record_size = 1 + fields.iter().map(|f| f.length).sum::<usize>();
    let header_size = 32 + fields.len() * 32 + 1;

    let mut out = Vec::with_capacity(header_size + records.len() * record_size + 1);
    out.push(0x03);
    out.extend_from_slice(&[95, 1, 1]); // last-update date, unused
    out.extend_from_slice(&(records.len() as u32).to_le_bytes());
    out.extend_from_slice(&(header_size as u16).to_le_bytes());
    out.extend_from_slice(&(record_size as u16).to_le_bytes());
    out.extend_from_slice(&[0u8; 20]);

    for field in &fields {
        let mut name = field.name.as_bytes().to_vec();
        name.truncate(10);
        name.resize(11, 0);
        out.extend_from_slice(&name);
        out.push(field.kind);
        out.extend_from_slice(&[0u8; 4]);
        out.push(field.length as u8);
        out.push(if field.kind == b'N' { 6 } else { 0 });
        out.extend_from_slice(&[0u8; 14]);
    }
    out.push(FIELD_TERMINATOR);

    for record in records {
        out.push(b' ');
        for field in &fields {
            let cell = match record.get(&field.name) {
                Some(AttrValue::Number(v)) if field.kind == b'N' => {
                    if v.is_finite() {
                        format!("{v:>width$.6}", width = field.length)
                    } else {
                        " ".repeat(field.length)
                    }
                }
                Some(value) => format!("{:<width$}", value.as_text(), width = field.length),
                None => " ".repeat(field.length),
            };
            let mut bytes = cell.into_bytes();
            bytes.truncate(field.length);
            bytes.resize(field.length, b' ');
            out.extend_from_slice(&bytes);
        }
    }
    out.push(EOF_MARKER);

    fs::write(path, out)?;
    Ok(())
}
