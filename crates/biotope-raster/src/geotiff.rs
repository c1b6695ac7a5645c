//! Self-contained GeoTIFF reader and writer.
//!
//! Supports the baseline profile the toolkit needs and nothing more:
//! uncompressed, strip-organized TIFF; chunky (pixel-interleaved) bands;
//! `f32` and `u8` samples; georeferencing through the ModelPixelScale and
//! ModelTiepoint tags; the CRS through a minimal GeoKey directory; nodata
//! through the GDAL_NODATA ASCII tag. Either byte order is read, files
//! are written little-endian. Anything outside the profile fails loudly
//! with [`RasterError::Unsupported`] naming the construct.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use biotope_core::{Crs, GeoTransform, Grid};
use log::debug;

use crate::error::RasterError;
use crate::raster::Raster;

// TIFF tag numbers used by the profile.
const TAG_IMAGE_WIDTH: u16 = 256;
const TAG_IMAGE_LENGTH: u16 = 257;
const TAG_BITS_PER_SAMPLE: u16 = 258;
const TAG_COMPRESSION: u16 = 259;
const TAG_PHOTOMETRIC: u16 = 262;
const TAG_STRIP_OFFSETS: u16 = 273;
const TAG_SAMPLES_PER_PIXEL: u16 = 277;
const TAG_ROWS_PER_STRIP: u16 = 278;
const TAG_STRIP_BYTE_COUNTS: u16 = 279;
const TAG_PLANAR_CONFIG: u16 = 284;
const TAG_TILE_WIDTH: u16 = 322;
const TAG_SAMPLE_FORMAT: u16 = 339;
const TAG_MODEL_PIXEL_SCALE: u16 = 33550;
const TAG_MODEL_TIEPOINT: u16 = 33922;
const TAG_GEO_KEY_DIRECTORY: u16 = 34735;
const TAG_GDAL_NODATA: u16 = 42113;

// TIFF value types.
const TYPE_BYTE: u16 = 1;
const TYPE_ASCII: u16 = 2;
const TYPE_SHORT: u16 = 3;
const TYPE_LONG: u16 = 4;
const TYPE_FLOAT: u16 = 11;
const TYPE_DOUBLE: u16 = 12;

// GeoKey ids.
const KEY_MODEL_TYPE: u16 = 1024;
const KEY_RASTER_TYPE: u16 = 1025;
const KEY_GEOGRAPHIC_TYPE: u16 = 2048;
const KEY_PROJECTED_TYPE: u16 = 3072;

/// On-disk sample representation for [`write_geotiff`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SampleKind {
    /// 32-bit IEEE floats; the default for continuous covariates.
    F32,
    /// Unsigned bytes; used for presence grids and category stacks.
    /// Values are clamped to `[0, 255]` and rounded.
    U8,
}

fn type_size(type_: u16) -> Option<usize> {
    match type_ {
        TYPE_BYTE | TYPE_ASCII => Some(1),
        TYPE_SHORT => Some(2),
        TYPE_LONG | TYPE_FLOAT => Some(4),
        TYPE_DOUBLE => Some(8),
        _ => None,
    }
}

#[derive(Clone, Copy, Debug)]
struct Entry {
    type_: u16,
    count: usize,
    /// Absolute offset of the value bytes (inline or external).
    data_off: usize,
}

struct Reader<'a> {
    data: &'a [u8],
    le: bool,
}

impl<'a> Reader<'a> {
    fn bytes(&self, off: usize, len: usize) -> Result<&'a [u8], RasterError> {
        self.data
            .get(off..off + len)
            .ok_or_else(|| RasterError::InvalidFormat {
                detail: format!("truncated file: need {len} bytes at offset {off}"),
            })
    }

    fn u16_at(&self, off: usize) -> Result<u16, RasterError> {
        let b: [u8; 2] = self.bytes(off, 2)?.try_into().expect("length checked");
        Ok(if self.le {
            u16::from_le_bytes(b)
        } else {
            u16::from_be_bytes(b)
        })
    }

    fn u32_at(&self, off: usize) -> Result<u32, RasterError> {
        let b: [u8; 4] = self.bytes(off, 4)?.try_into().expect("length checked");
        Ok(if self.le {
            u32::from_le_bytes(b)
        } else {
            u32::from_be_bytes(b)
        })
    }

    fn f32_at(&self, off: usize) -> Result<f32, RasterError> {
        let b: [u8; 4] = self.bytes(off, 4)?.try_into().expect("length checked");
        Ok(if self.le {
            f32::from_le_bytes(b)
        } else {
            f32::from_be_bytes(b)
        })
    }

    fn f64_at(&self, off: usize) -> Result<f64, RasterError> {
        let b: [u8; 8] = self.bytes(off, 8)?.try_into().expect("length checked");
        Ok(if self.le {
            f64::from_le_bytes(b)
        } else {
            f64::from_be_bytes(b)
        })
    }

    /// Integer values of an entry (BYTE, SHORT, or LONG).
    fn uints(&self, e: &Entry) -> Result<Vec<u64>, RasterError> {
        let size = type_size(e.type_).ok_or_else(|| RasterError::InvalidFormat {
            detail: format!("unknown TIFF value type {}", e.type_),
        })?;
        let mut out = Vec::with_capacity(e.count);
        for i in 0..e.count {
            let off = e.data_off + i * size;
            let v = match e.type_ {
                TYPE_BYTE => u64::from(*self.bytes(off, 1)?.first().expect("length checked")),
                TYPE_SHORT => u64::from(self.u16_at(off)?),
                TYPE_LONG => u64::from(self.u32_at(off)?),
                other => {
                    return Err(RasterError::InvalidFormat {
                        detail: format!("expected integer values, got type {other}"),
                    })
                }
            };
            out.push(v);
        }
        Ok(out)
    }

    /// Floating-point values of an entry (DOUBLE or FLOAT).
    fn doubles(&self, e: &Entry) -> Result<Vec<f64>, RasterError> {
        let mut out = Vec::with_capacity(e.count);
        for i in 0..e.count {
            let v = match e.type_ {
                TYPE_DOUBLE => self.f64_at(e.data_off + i * 8)?,
                TYPE_FLOAT => f64::from(self.f32_at(e.data_off + i * 4)?),
                other => {
                    return Err(RasterError::InvalidFormat {
                        detail: format!("expected floating-point values, got type {other}"),
                    })
                }
            };
            out.push(v);
        }
        Ok(out)
    }

    fn ascii(&self, e: &Entry) -> Result<String, RasterError> {
        let bytes = self.bytes(e.data_off, e.count)?;
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        Ok(String::from_utf8_lossy(&bytes[..end]).into_owned())
    }
}

/// Read a GeoTIFF file into a [`Raster`].
pub fn read_geotiff(path: &Path) -> Result<Raster, RasterError> {
    let data = fs::read(path)?;
    parse_geotiff(&data)
}

/// Parse GeoTIFF bytes into a [`Raster`].
pub fn parse_geotiff(data: &[u8]) -> Result<Raster, RasterError> {
    if data.len() < 8 {
        return Err(RasterError::InvalidFormat {
            detail: "file shorter than the TIFF header".to_string(),
        });
    }
    let le = match &data[0..2] {
        b"II" => true,
        b"MM" => false,
        other => {
            return Err(RasterError::InvalidFormat {
                detail: format!("bad byte-order mark {other:?}"),
            })
        }
    };
    let r = Reader { data, le };
    if r.u16_at(2)? != 42 {
        return Err(RasterError::InvalidFormat {
            detail: "missing TIFF magic number 42".to_string(),
        });
    }

    let ifd_off = r.u32_at(4)? as usize;
    let n_entries = r.u16_at(ifd_off)? as usize;
    let mut entries: BTreeMap<u16, Entry> = BTreeMap::new();
    for i in 0..n_entries {
        let e_off = ifd_off + 2 + i * 12;
        let tag = r.u16_at(e_off)?;
        let type_ = r.u16_at(e_off + 2)?;
        let count = r.u32_at(e_off + 4)? as usize;
        let size = type_size(type_).unwrap_or(0);
        let data_off = if size * count <= 4 {
            e_off + 8
        } else {
            r.u32_at(e_off + 8)? as usize
        };
        entries.insert(
            tag,
            Entry {
                type_,
                count,
                data_off,
            },
        );
    }

    let first_uint = |tag: u16| -> Result<Option<u64>, RasterError> {
        entries
            .get(&tag)
            .map(|e| {
                r.uints(e).and_then(|v| {
                    v.first().copied().ok_or_else(|| RasterError::InvalidFormat {
                        detail: format!("tag {tag} has no values"),
                    })
                })
            })
            .transpose()
    };

    let width = first_uint(TAG_IMAGE_WIDTH)?.ok_or_else(|| RasterError::InvalidFormat {
        detail: "missing ImageWidth".to_string(),
    })? as usize;
    let height = first_uint(TAG_IMAGE_LENGTH)?.ok_or_else(|| RasterError::InvalidFormat {
        detail: "missing ImageLength".to_string(),
    })? as usize;

    let compression = first_uint(TAG_COMPRESSION)?.unwrap_or(1);
    if compression != 1 {
        return Err(RasterError::Unsupported {
            feature: format!("compression scheme {compression}"),
        });
    }
    if entries.contains_key(&TAG_TILE_WIDTH) {
        return Err(RasterError::Unsupported {
            feature: "tiled layout".to_string(),
        });
    }
    let planar = first_uint(TAG_PLANAR_CONFIG)?.unwrap_or(1);
    if planar != 1 {
        return Err(RasterError::Unsupported {
            feature: format!("planar configuration {planar}"),
        });
    }

    let samples = first_uint(TAG_SAMPLES_PER_PIXEL)?.unwrap_or(1) as usize;
    let bits = match entries.get(&TAG_BITS_PER_SAMPLE) {
        Some(e) => r.uints(e)?,
        None => vec![1],
    };
    let formats = match entries.get(&TAG_SAMPLE_FORMAT) {
        Some(e) => r.uints(e)?,
        None => vec![1; samples],
    };

    let is_f32 = bits.iter().all(|&b| b == 32) && formats.iter().all(|&f| f == 3);
    let is_u8 = bits.iter().all(|&b| b == 8) && formats.iter().all(|&f| f == 1);
    if !is_f32 && !is_u8 {
        return Err(RasterError::Unsupported {
            feature: format!("sample layout: bits {bits:?}, formats {formats:?}"),
        });
    }
    let bps = if is_f32 { 4 } else { 1 };

    let strip_offsets = entries
        .get(&TAG_STRIP_OFFSETS)
        .map(|e| r.uints(e))
        .transpose()?
        .ok_or_else(|| RasterError::InvalidFormat {
            detail: "missing StripOffsets".to_string(),
        })?;
    let strip_counts = entries
        .get(&TAG_STRIP_BYTE_COUNTS)
        .map(|e| r.uints(e))
        .transpose()?
        .ok_or_else(|| RasterError::InvalidFormat {
            detail: "missing StripByteCounts".to_string(),
        })?;
    if strip_offsets.len() != strip_counts.len() {
        return Err(RasterError::InvalidFormat {
            detail: "StripOffsets and StripByteCounts disagree".to_string(),
        });
    }

    let expected = width * height * samples * bps;
    let mut pixel_bytes: Vec<u8> = Vec::with_capacity(expected);
    for (&off, &count) in strip_offsets.iter().zip(&strip_counts) {
        pixel_bytes.extend_from_slice(r.bytes(off as usize, count as usize)?);
    }
    if pixel_bytes.len() != expected {
        return Err(RasterError::InvalidFormat {
            detail: format!(
                "pixel data has {} bytes, expected {expected}",
                pixel_bytes.len()
            ),
        });
    }

    // Deinterleave chunky samples into per-band grids.
    let mut bands: Vec<Grid> = Vec::with_capacity(samples);
    for b in 0..samples {
        let mut cells = Vec::with_capacity(width * height);
        for i in 0..width * height {
            let off = (i * samples + b) * bps;
            let v = if is_f32 {
                let raw: [u8; 4] = pixel_bytes[off..off + 4].try_into().expect("length checked");
                if le {
                    f32::from_le_bytes(raw)
                } else {
                    f32::from_be_bytes(raw)
                }
            } else {
                f32::from(pixel_bytes[off])
            };
            cells.push(v);
        }
        bands.push(Grid::from_cells(width, height, cells)?);
    }

    // Georeferencing: pixel scale + tiepoint are required.
    let scale = entries
        .get(&TAG_MODEL_PIXEL_SCALE)
        .map(|e| r.doubles(e))
        .transpose()?
        .ok_or(RasterError::MissingGeoreference)?;
    let tie = entries
        .get(&TAG_MODEL_TIEPOINT)
        .map(|e| r.doubles(e))
        .transpose()?
        .ok_or(RasterError::MissingGeoreference)?;
    if scale.len() < 2 || tie.len() < 6 {
        return Err(RasterError::MissingGeoreference);
    }
    let transform = GeoTransform {
        origin_x: tie[3] - tie[0] * scale[0],
        origin_y: tie[4] + tie[1] * scale[1],
        pixel_width: scale[0],
        pixel_height: -scale[1],
    };

    let crs = match entries.get(&TAG_GEO_KEY_DIRECTORY) {
        Some(e) => {
            let keys = r.uints(e)?;
            let mut crs = Crs::WGS84;
            let mut i = 4;
            while i + 3 < keys.len() {
                let (key, location, value) = (keys[i], keys[i + 1], keys[i + 3]);
                if location == 0 && (key == u64::from(KEY_GEOGRAPHIC_TYPE) || key == u64::from(KEY_PROJECTED_TYPE))
                {
                    crs = Crs(value as u32);
                }
                i += 4;
            }
            crs
        }
        None => {
            debug!("no GeoKey directory, assuming {}", Crs::WGS84);
            Crs::WGS84
        }
    };

    let nodata = match entries.get(&TAG_GDAL_NODATA) {
        Some(e) => r.ascii(e)?.trim().parse::<f32>().ok(),
        None => None,
    };

    Raster::new(bands, transform, crs, nodata)
}

struct EntryOut {
    tag: u16,
    type_: u16,
    count: u32,
    payload: Vec<u8>,
}

fn push_u16(buf: &mut Vec<u8>, v: u16) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn push_u32(buf: &mut Vec<u8>, v: u32) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn shorts_payload(values: &[u16]) -> Vec<u8> {
    let mut out = Vec::with_capacity(values.len() * 2);
    for &v in values {
        push_u16(&mut out, v);
    }
    out
}

fn doubles_payload(values: &[f64]) -> Vec<u8> {
    let mut out = Vec::with_capacity(values.len() * 8);
    for &v in values {
        out.extend_from_slice(&v.to_le_bytes());
    }
    out
}

/// Write a [`Raster`] as a little-endian, single-strip GeoTIFF.
pub fn write_geotiff(raster: &Raster, path: &Path, kind: SampleKind) -> Result<(), RasterError> {
    fs::write(path, encode_geotiff(raster, kind))?;
    Ok(())
}

/// Encode a [`Raster`] into GeoTIFF bytes.
pub fn encode_geotiff(raster: &Raster, kind: SampleKind) -> Vec<u8> {
    let (height, width) = raster.shape();
    let samples = raster.band_count();
    let bps = match kind {
        SampleKind::F32 => 4usize,
        SampleKind::U8 => 1usize,
    };

    // Chunky interleave: pixel-major, band-minor.
    let mut pixels: Vec<u8> = Vec::with_capacity(width * height * samples * bps);
    for i in 0..width * height {
        for band in raster.bands() {
            let v = band.cells()[i];
            match kind {
                SampleKind::F32 => pixels.extend_from_slice(&v.to_le_bytes()),
                SampleKind::U8 => pixels.push(v.round().clamp(0.0, 255.0) as u8),
            }
        }
    }

    let t = raster.transform();
    let (bits, fmt) = match kind {
        SampleKind::F32 => (32u16, 3u16),
        SampleKind::U8 => (8u16, 1u16),
    };
    let crs = raster.crs();
    let (model, key, code) = if crs.is_geographic() {
        (2u16, KEY_GEOGRAPHIC_TYPE, crs.code() as u16)
    } else {
        (1u16, KEY_PROJECTED_TYPE, crs.code() as u16)
    };

    let data_start = 8u32;
    let data_len = pixels.len() as u32;

    let mut entries = vec![
        EntryOut {
            tag: TAG_IMAGE_WIDTH,
            type_: TYPE_LONG,
            count: 1,
            payload: (width as u32).to_le_bytes().to_vec(),
        },
        EntryOut {
            tag: TAG_IMAGE_LENGTH,
            type_: TYPE_LONG,
            count: 1,
            payload: (height as u32).to_le_bytes().to_vec(),
        },
        EntryOut {
            tag: TAG_BITS_PER_SAMPLE,
            type_: TYPE_SHORT,
            count: samples as u32,
            payload: shorts_payload(&vec![bits; samples]),
        },
        EntryOut {
            tag: TAG_COMPRESSION,
            type_: TYPE_SHORT,
            count: 1,
            payload: shorts_payload(&[1]),
        },
        EntryOut {
            tag: TAG_PHOTOMETRIC,
            type_: TYPE_SHORT,
            count: 1,
            payload: shorts_payload(&[1]),
        },
        EntryOut {
            tag: TAG_STRIP_OFFSETS,
            type_: TYPE_LONG,
            count: 1,
            payload: data_start.to_le_bytes().to_vec(),
        },
        EntryOut {
            tag: TAG_SAMPLES_PER_PIXEL,
            type_: TYPE_SHORT,
            count: 1,
            payload: shorts_payload(&[samples as u16]),
        },
        EntryOut {
            tag: TAG_ROWS_PER_STRIP,
            type_: TYPE_LONG,
            count: 1,
            payload: (height as u32).to_le_bytes().to_vec(),
        },
        EntryOut {
            tag: TAG_STRIP_BYTE_COUNTS,
            type_: TYPE_LONG,
            count: 1,
            payload: data_len.to_le_bytes().to_vec(),
        },
        EntryOut {
            tag: TAG_PLANAR_CONFIG,
            type_: TYPE_SHORT,
            count: 1,
            payload: shorts_payload(&[1]),
        },
        EntryOut {
            tag: TAG_SAMPLE_FORMAT,
            type_: TYPE_SHORT,
            count: samples as u32,
            payload: shorts_payload(&vec![fmt; samples]),
        },
        EntryOut {
            tag: TAG_MODEL_PIXEL_SCALE,
            type_: TYPE_DOUBLE,
            count: 3,
            payload: doubles_payload(&[t.pixel_width, -t.pixel_height, 0.0]),
        },
        EntryOut {
            tag: TAG_MODEL_TIEPOINT,
            type_: TYPE_DOUBLE,
            count: 6,
            payload: doubles_payload(&[0.0, 0.0, 0.0, t.origin_x, t.origin_y, 0.0]),
        },
        EntryOut {
            tag: TAG_GEO_KEY_DIRECTORY,
            type_: TYPE_SHORT,
            count: 16,
            payload: shorts_payload(&[
                1, 1, 0, 3, //
                KEY_MODEL_TYPE, 0, 1, model, //
                KEY_RASTER_TYPE, 0, 1, 1, //
                key, 0, 1, code,
            ]),
        },
    ];
    if let Some(nodata) = raster.nodata() {
        let mut text = format!("{nodata}").into_bytes();
        text.push(0);
        entries.push(EntryOut {
            tag: TAG_GDAL_NODATA,
            type_: TYPE_ASCII,
            count: text.len() as u32,
            payload: text,
        });
    }
    entries.sort_by_key(|e| e.tag);

    // Layout: header, pixel strip, IFD, external payloads.
    let mut ifd_off = data_start + data_len;
    if ifd_off % 2 == 1 {
        ifd_off += 1;
    }
    let ifd_size = 2 + entries.len() as u32 * 12 + 4;
    let mut external_off = ifd_off + ifd_size;

    let mut ifd: Vec<u8> = Vec::new();
    let mut external: Vec<u8> = Vec::new();
    push_u16(&mut ifd, entries.len() as u16);
    for e in &entries {
        push_u16(&mut ifd, e.tag);
        push_u16(&mut ifd, e.type_);
        push_u32(&mut ifd, e.count);
        if e.payload.len() <= 4 {
            let mut inline = e.payload.clone();
            inline.resize(4, 0);
            ifd.extend_from_slice(&inline);
        } else {
            push_u32(&mut ifd, external_off);
            external.extend_from_slice(&e.payload);
            if e.payload.len() % 2 == 1 {
                external.push(0);
                external_off += 1;
            }
            external_off += e.payload.len() as u32;
        }
    }
    push_u32(&mut ifd, 0);

    let mut out: Vec<u8> = Vec::with_capacity(external_off as usize);
    out.extend_from_slice(b"II");
    push_u16(&mut out, 42);
    push_u32(&mut out, ifd_off);
    out.extend_from_slice(&pixels);
    while out.len() < ifd_off as usize {
        out.push(0);
    }
    out.extend_from_slice(&ifd);
    out.extend_from_slice(&external);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use biotope_core::Bounds;

    fn sample_raster() -> Raster {
        let mut g = Grid::new(6, 4).unwrap();
        g.set(0, 0, 1.5).unwrap();
        g.set(3, 5, -2.25).unwrap();
        g.set(2, 2, 255.0).unwrap();
        Raster::single(g, GeoTransform::global(30.0), Crs::WGS84, Some(-9999.0)).unwrap()
    }

    #[test]
    fn f32_roundtrip_preserves_everything() {
        let r = sample_raster();
        let bytes = encode_geotiff(&r, SampleKind::F32);
        let back = parse_geotiff(&bytes).unwrap();
        assert_eq!(back.shape(), r.shape());
        assert_eq!(back.transform(), r.transform());
        assert_eq!(back.crs(), Crs::WGS84);
        assert_eq!(back.nodata(), Some(-9999.0));
        assert_eq!(back.band(1).unwrap(), r.band(1).unwrap());
    }

    #[test]
    fn u8_roundtrip_of_presence_grid() {
        let mut g = Grid::new(4, 4).unwrap();
        g.set(1, 1, 1.0).unwrap();
        g.set(2, 3, 1.0).unwrap();
        let r = Raster::single(g, GeoTransform::global(1.0), Crs::WGS84, Some(0.0)).unwrap();
        let back = parse_geotiff(&encode_geotiff(&r, SampleKind::U8)).unwrap();
        assert_eq!(back.band(1).unwrap(), r.band(1).unwrap());
        assert!(back.band(1).unwrap().is_binary());
    }

    #[test]
    fn multiband_roundtrip_keeps_band_order() {
        let mut a = Grid::new(3, 2).unwrap();
        a.set(0, 0, 1.0).unwrap();
        let mut b = Grid::new(3, 2).unwrap();
        b.set(1, 2, 1.0).unwrap();
        let r = Raster::new(
            vec![a.clone(), b.clone()],
            GeoTransform::global(60.0),
            Crs::WGS84,
            Some(0.0),
        )
        .unwrap();
        let back = parse_geotiff(&encode_geotiff(&r, SampleKind::U8)).unwrap();
        assert_eq!(back.band_count(), 2);
        assert_eq!(back.band(1).unwrap(), &a);
        assert_eq!(back.band(2).unwrap(), &b);
    }

    #[test]
    fn projected_crs_survives_roundtrip() {
        let g = Grid::new(2, 2).unwrap();
        let t = GeoTransform {
            origin_x: -20037508.34,
            origin_y: 20037508.34,
            pixel_width: 20037508.34,
            pixel_height: -20037508.34,
        };
        let r = Raster::single(g, t, Crs::WEB_MERCATOR, None).unwrap();
        let back = parse_geotiff(&encode_geotiff(&r, SampleKind::F32)).unwrap();
        assert_eq!(back.crs(), Crs::WEB_MERCATOR);
        assert_eq!(back.nodata(), None);
    }

    #[test]
    fn bounds_reconstructed_from_tags() {
        let r = sample_raster();
        let back = parse_geotiff(&encode_geotiff(&r, SampleKind::F32)).unwrap();
        let b = back.bounds();
        let expected = Bounds::new(-180.0, -30.0, 0.0, 90.0);
        assert_eq!(b, expected);
    }

    #[test]
    fn rejects_garbage_and_truncation() {
        assert!(matches!(
            parse_geotiff(b"not a tiff"),
            Err(RasterError::InvalidFormat { .. })
        ));
        let bytes = encode_geotiff(&sample_raster(), SampleKind::F32);
        assert!(matches!(
            parse_geotiff(&bytes[..bytes.len() / 2]),
            Err(RasterError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn rejects_unsupported_compression() {
        let mut bytes = encode_geotiff(&sample_raster(), SampleKind::F32);
        // Find the Compression entry in the IFD and patch its value to 5
        // (LZW), which the profile does not support.
        let tag = TAG_COMPRESSION.to_le_bytes();
        let pos = bytes
            .windows(2)
            .position(|w| w == tag)
            .expect("compression entry present");
        bytes[pos + 8] = 5;
        assert!(matches!(
            parse_geotiff(&bytes),
            Err(RasterError::Unsupported { .. })
        ));
    }

    #[test]
    fn file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layer.tif");
        let r = sample_raster();
        write_geotiff(&r, &path, SampleKind::F32).unwrap();
        let back = read_geotiff(&path).unwrap();
        assert_eq!(back, r);
    }
}
