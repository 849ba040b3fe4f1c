//! Pixel-density (DPI) metadata.
//!
//! PNG stores density in its `pHYs` chunk as pixels per metre; JPEG stores it
//! in the JFIF `APP0` segment as dots per inch (or per centimetre). WebP has
//! no density field of its own, so the stamp goes into an `EXIF` chunk as a
//! minimal TIFF block with `XResolution`, `YResolution` and `ResolutionUnit`.
//!
//! The readers here only look at headers. They are used to confirm the stamp
//! after encoding.

use crate::config::OutputFormat;
use std::io::Cursor;

const METERS_PER_INCH: f64 = 0.0254;

const TAG_X_RESOLUTION: u16 = 0x011A;
const TAG_Y_RESOLUTION: u16 = 0x011B;
const TAG_RESOLUTION_UNIT: u16 = 0x0128;
const TIFF_SHORT: u16 = 3;
const TIFF_RATIONAL: u16 = 5;
const UNIT_INCH: u16 = 2;
const UNIT_CENTIMETER: u16 = 3;

pub fn dpi_to_ppm(dpi: u32) -> u32 {
    (dpi as f64 / METERS_PER_INCH).round() as u32
}

pub fn ppm_to_dpi(ppm: u32) -> u32 {
    (ppm as f64 * METERS_PER_INCH).round() as u32
}

/// Density stamped in an encoded image, in DPI.
///
/// `None` when the format has no density field or the file carries none.
pub fn read_dpi(bytes: &[u8], format: OutputFormat) -> Option<u32> {
    match format {
        OutputFormat::Png => read_png_dpi(bytes),
        OutputFormat::Jpeg => read_jpeg_dpi(bytes),
        OutputFormat::Webp => read_webp_dpi(bytes),
    }
}

pub fn read_png_dpi(bytes: &[u8]) -> Option<u32> {
    let reader = png::Decoder::new(Cursor::new(bytes)).read_info().ok()?;
    let dims = reader.info().pixel_dims?;
    match dims.unit {
        png::Unit::Meter => Some(ppm_to_dpi(dims.xppu)),
        png::Unit::Unspecified => None,
    }
}

/// Read the horizontal density from a JFIF `APP0` segment directly after SOI.
pub fn read_jpeg_dpi(bytes: &[u8]) -> Option<u32> {
    // SOI, APP0 marker, length (2), "JFIF\0", version (2), units, Xdensity, Ydensity
    if bytes.len() < 18 || bytes[0..4] != [0xFF, 0xD8, 0xFF, 0xE0] || bytes[6..11] != *b"JFIF\0" {
        return None;
    }
    let units = bytes[13];
    let x_density = u16::from_be_bytes([bytes[14], bytes[15]]) as u32;
    match units {
        1 => Some(x_density),
        2 => Some((x_density as f64 * 2.54).round() as u32),
        _ => None,
    }
}

/// Little-endian TIFF block holding only the resolution tags.
///
/// Layout: 8-byte header, one IFD with three entries, then the two rationals.
pub fn exif_resolution(dpi: u32) -> Vec<u8> {
    const IFD_OFFSET: u32 = 8;
    const ENTRIES: u16 = 3;
    // count + entries + next-IFD offset
    const RATIONALS_OFFSET: u32 = IFD_OFFSET + 2 + ENTRIES as u32 * 12 + 4;

    let mut out = Vec::with_capacity(RATIONALS_OFFSET as usize + 16);
    out.extend_from_slice(b"II");
    out.extend_from_slice(&42u16.to_le_bytes());
    out.extend_from_slice(&IFD_OFFSET.to_le_bytes());

    out.extend_from_slice(&ENTRIES.to_le_bytes());
    let mut entry = |tag: u16, kind: u16, value: [u8; 4]| {
        out.extend_from_slice(&tag.to_le_bytes());
        out.extend_from_slice(&kind.to_le_bytes());
        out.extend_from_slice(&1u32.to_le_bytes());
        out.extend_from_slice(&value);
    };
    entry(TAG_X_RESOLUTION, TIFF_RATIONAL, RATIONALS_OFFSET.to_le_bytes());
    entry(TAG_Y_RESOLUTION, TIFF_RATIONAL, (RATIONALS_OFFSET + 8).to_le_bytes());
    let [lo, hi] = UNIT_INCH.to_le_bytes();
    entry(TAG_RESOLUTION_UNIT, TIFF_SHORT, [lo, hi, 0, 0]);
    out.extend_from_slice(&0u32.to_le_bytes());

    for _ in 0..2 {
        out.extend_from_slice(&dpi.to_le_bytes());
        out.extend_from_slice(&1u32.to_le_bytes());
    }
    out
}

/// Find the `EXIF` chunk of a RIFF/WebP file and read its resolution.
pub fn read_webp_dpi(bytes: &[u8]) -> Option<u32> {
    if bytes.get(0..4)? != b"RIFF" || bytes.get(8..12)? != b"WEBP" {
        return None;
    }
    let mut pos = 12;
    while let Some(header) = bytes.get(pos..pos + 8) {
        let size = u32::from_le_bytes(header[4..8].try_into().ok()?) as usize;
        let start = pos + 8;
        let data = bytes.get(start..start.checked_add(size)?)?;
        if &header[0..4] == b"EXIF" {
            return read_tiff_dpi(data.strip_prefix(b"Exif\0\0").unwrap_or(data));
        }
        // chunks are padded to an even length
        pos = start + size + (size & 1);
    }
    None
}

/// Read `XResolution` and `ResolutionUnit` from IFD0 of a TIFF block.
pub fn read_tiff_dpi(tiff: &[u8]) -> Option<u32> {
    let little = match tiff.get(0..2)? {
        b"II" => true,
        b"MM" => false,
        _ => return None,
    };
    let u16_at = |at: usize| -> Option<u16> {
        let b: [u8; 2] = tiff.get(at..at + 2)?.try_into().ok()?;
        Some(if little { u16::from_le_bytes(b) } else { u16::from_be_bytes(b) })
    };
    let u32_at = |at: usize| -> Option<u32> {
        let b: [u8; 4] = tiff.get(at..at + 4)?.try_into().ok()?;
        Some(if little { u32::from_le_bytes(b) } else { u32::from_be_bytes(b) })
    };
    if u16_at(2)? != 42 {
        return None;
    }

    let ifd = u32_at(4)? as usize;
    let mut resolution = None;
    // TIFF default unit is inches
    let mut unit = UNIT_INCH;
    for i in 0..u16_at(ifd)? as usize {
        let entry = ifd + 2 + i * 12;
        match u16_at(entry)? {
            TAG_X_RESOLUTION => {
                let at = u32_at(entry + 8)? as usize;
                let (num, den) = (u32_at(at)?, u32_at(at + 4)?);
                if den == 0 {
                    return None;
                }
                resolution = Some(num as f64 / den as f64);
            }
            TAG_RESOLUTION_UNIT => unit = u16_at(entry + 8)?,
            _ => {}
        }
    }
    let per_unit = resolution?;
    match unit {
        UNIT_INCH => Some(per_unit.round() as u32),
        UNIT_CENTIMETER => Some((per_unit * 2.54).round() as u32),
        _ => None,
    }
}
