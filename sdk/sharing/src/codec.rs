//! Part Formats
//!
//! Every part carries the format version it was issued under. Text parsing
//! reads the leading version number and dispatches through [`FORMATS`];
//! unknown versions are rejected.
//!
//! ```text
//! V0 text:  0//<length>//<required>//<modulus>//<x>//<y>      (lowercase hex fields)
//! V1 text:  1-<hex of the binary form>
//!
//! binary:   version   u8
//!           length    u32 BE
//!           required  u32 BE
//!           modulus   u16 BE byte count, big-endian magnitude
//!           x         u16 BE byte count, big-endian magnitude
//!           y         u32 BE byte count, big-endian magnitude
//! ```
//!
//! Magnitudes are minimal: no leading zero byte, and zero is a single `0x00`.

use num_bigint::BigUint;

use crate::error::{Result, SharingError};
use crate::part::{Part, Point};

/// Format versions understood by this crate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FormatVersion {
    V0,
    V1,
}

impl FormatVersion {
    /// Version given to freshly split parts when the caller does not choose.
    pub const CURRENT: FormatVersion = FormatVersion::V1;

    pub fn number(self) -> u32 {
        match self {
            Self::V0 => 0,
            Self::V1 => 1,
        }
    }

    pub fn from_number(number: u32) -> Result<Self> {
        FORMATS
            .iter()
            .map(|f| f.version)
            .find(|v| v.number() == number)
            .ok_or_else(|| SharingError::format(format!("unknown part format version {number}")))
    }
}

impl Default for FormatVersion {
    fn default() -> Self {
        Self::CURRENT
    }
}

impl TryFrom<u32> for FormatVersion {
    type Error = SharingError;

    fn try_from(number: u32) -> Result<Self> {
        Self::from_number(number)
    }
}

/// A text format: how one version writes and reads parts
struct PartFormat {
    version: FormatVersion,
    format: fn(&Part) -> String,
    parse: fn(&str) -> Result<Part>,
}

static FORMATS: [PartFormat; 2] = [
    PartFormat {
        version: FormatVersion::V0,
        format: format_v0,
        parse: parse_v0,
    },
    PartFormat {
        version: FormatVersion::V1,
        format: format_v1,
        parse: parse_v1,
    },
];

fn lookup(version: FormatVersion) -> &'static PartFormat {
    match version {
        FormatVersion::V0 => &FORMATS[0],
        FormatVersion::V1 => &FORMATS[1],
    }
}

pub fn format_part(part: &Part) -> String {
    (lookup(part.version()).format)(part)
}

pub fn parse_part(s: &str) -> Result<Part> {
    let digits = s.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return Err(SharingError::format("missing format version"));
    }
    let number: u32 = s[..digits]
        .parse()
        .map_err(|_| SharingError::format("format version out of range"))?;
    let version = FormatVersion::from_number(number)?;
    (lookup(version).parse)(s)
}

// ----------------------------------------------------------------------------
// V0: delimited hex
// ----------------------------------------------------------------------------

const V0_SEPARATOR: &str = "//";

fn format_v0(part: &Part) -> String {
    format!(
        "0//{:x}//{:x}//{:x}//{:x}//{:x}",
        part.length(),
        part.required_parts(),
        part.modulus(),
        part.point().x(),
        part.point().y()
    )
}

fn parse_v0(s: &str) -> Result<Part> {
    let fields: Vec<&str> = s.split(V0_SEPARATOR).collect();
    let [version, length, required, modulus, x, y] = fields.as_slice() else {
        return Err(SharingError::format(format!(
            "v0 part has {} fields, expected 6",
            fields.len()
        )));
    };
    if *version != "0" {
        return Err(SharingError::format("v0 part must start with \"0//\""));
    }

    Part::decoded(
        FormatVersion::V0,
        hex_usize(length, "length")?,
        hex_usize(required, "required parts")?,
        hex_biguint(modulus, "modulus")?,
        Point::new(hex_biguint(x, "x")?, hex_biguint(y, "y")?),
    )
}

/// Canonical lowercase hex without leading zeros.
fn check_hex(field: &str, name: &str) -> Result<()> {
    if field.is_empty() {
        return Err(SharingError::format(format!("{name} is empty")));
    }
    if !field.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
        return Err(SharingError::format(format!("{name} is not lowercase hex")));
    }
    if field.len() > 1 && field.starts_with('0') {
        return Err(SharingError::format(format!("{name} has leading zeros")));
    }
    Ok(())
}

fn hex_biguint(field: &str, name: &str) -> Result<BigUint> {
    check_hex(field, name)?;
    BigUint::parse_bytes(field.as_bytes(), 16)
        .ok_or_else(|| SharingError::format(format!("{name} is not a hex integer")))
}

fn hex_usize(field: &str, name: &str) -> Result<usize> {
    check_hex(field, name)?;
    usize::from_str_radix(field, 16)
        .map_err(|_| SharingError::format(format!("{name} is out of range")))
}

// ----------------------------------------------------------------------------
// V1: hex of the binary form
// ----------------------------------------------------------------------------

const V1_PREFIX: &str = "1-";

fn format_v1(part: &Part) -> String {
    format!("{V1_PREFIX}{}", hex::encode(encode_binary(part)))
}

fn parse_v1(s: &str) -> Result<Part> {
    let body = s
        .strip_prefix(V1_PREFIX)
        .ok_or_else(|| SharingError::format("v1 part must start with \"1-\""))?;
    if body.bytes().any(|b| b.is_ascii_uppercase()) {
        return Err(SharingError::format("v1 body is not lowercase hex"));
    }
    let bytes = hex::decode(body).map_err(|e| SharingError::format(format!("v1 body: {e}")))?;
    let part = decode_binary(&bytes)?;
    if part.version() != FormatVersion::V1 {
        return Err(SharingError::format("v1 text wraps a part of another version"));
    }
    Ok(part)
}

// ----------------------------------------------------------------------------
// Binary form
// ----------------------------------------------------------------------------

/// Binary form of a part; the first byte is its format version.
///
/// Lengths and thresholds are written as `u32`, so parts describing secrets
/// of 4 GiB or more cannot be encoded.
pub fn encode_binary(part: &Part) -> Vec<u8> {
    let modulus = part.modulus().to_bytes_be();
    let x = part.point().x().to_bytes_be();
    let y = part.point().y().to_bytes_be();

    let mut out = Vec::with_capacity(1 + 4 + 4 + 2 + modulus.len() + 2 + x.len() + 4 + y.len());
    out.push(part.version().number() as u8);
    out.extend_from_slice(&(part.length() as u32).to_be_bytes());
    out.extend_from_slice(&(part.required_parts() as u32).to_be_bytes());
    out.extend_from_slice(&(modulus.len() as u16).to_be_bytes());
    out.extend_from_slice(&modulus);
    out.extend_from_slice(&(x.len() as u16).to_be_bytes());
    out.extend_from_slice(&x);
    out.extend_from_slice(&(y.len() as u32).to_be_bytes());
    out.extend_from_slice(&y);
    out
}

pub fn decode_binary(bytes: &[u8]) -> Result<Part> {
    let mut reader = Reader { bytes, pos: 0 };

    let version = FormatVersion::from_number(reader.u8()? as u32)?;
    let length = reader.u32()? as usize;
    let required = reader.u32()? as usize;
    let modulus_len = reader.u16()? as usize;
    let modulus = reader.magnitude(modulus_len, "modulus")?;
    let x_len = reader.u16()? as usize;
    let x = reader.magnitude(x_len, "x")?;
    let y_len = reader.u32()? as usize;
    let y = reader.magnitude(y_len, "y")?;

    if reader.pos != bytes.len() {
        return Err(SharingError::format(format!(
            "{} trailing bytes after part",
            bytes.len() - reader.pos
        )));
    }

    Part::decoded(version, length, required, modulus, Point::new(x, y))
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| SharingError::format("part is truncated"))?;
        let out = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(out)
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> Result<u32> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn magnitude(&mut self, n: usize, name: &str) -> Result<BigUint> {
        let b = self.take(n)?;
        match b {
            [] => Err(SharingError::format(format!("{name} is empty"))),
            [0, _, ..] => Err(SharingError::format(format!("{name} has leading zeros"))),
            _ => Ok(BigUint::from_bytes_be(b)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(v: u32) -> BigUint {
        BigUint::from(v)
    }

    fn sample(version: FormatVersion) -> Part {
        // two one-byte chunks under p = 257, y slots 9 bits wide
        let y = n(0x10 + (0x20 << 9));
        Part::from_components(version, 2, 2, n(257), Point::new(n(3), y)).unwrap()
    }

    #[test]
    fn test_v0_text() {
        let part = sample(FormatVersion::V0);
        let s = part.format();
        assert_eq!(s, "0//2//2//101//3//4010");
        assert_eq!(parse_part(&s).unwrap(), part);
    }

    #[test]
    fn test_v1_text() {
        let part = sample(FormatVersion::V1);
        let s = part.format();
        assert!(s.starts_with("1-01"));
        assert_eq!(parse_part(&s).unwrap(), part);
    }

    #[test]
    fn test_binary_layout() {
        let part = sample(FormatVersion::V1);
        let bytes = encode_binary(&part);
        assert_eq!(
            bytes,
            vec![
                1, // version
                0, 0, 0, 2, // length
                0, 0, 0, 2, // required
                0, 2, 0x01, 0x01, // modulus
                0, 1, 3, // x
                0, 0, 0, 2, 0x40, 0x10, // y
            ]
        );
        assert_eq!(decode_binary(&bytes).unwrap(), part);
    }

    #[test]
    fn test_unknown_version() {
        assert!(FormatVersion::from_number(2).is_err());
        let err = parse_part("7//2//2//101//3//4010").unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Format);
        assert!(parse_part("99999999999999//1").is_err());
        assert!(parse_part("//2").is_err());

        let mut bytes = encode_binary(&sample(FormatVersion::V1));
        bytes[0] = 9;
        assert!(decode_binary(&bytes).is_err());
    }

    #[test]
    fn test_v0_rejects_noncanonical() {
        assert!(parse_part("0//2//2//101//3").is_err());
        assert!(parse_part("0//2//2//101//3//4010//").is_err());
        assert!(parse_part("0//02//2//101//3//4010").is_err());
        assert!(parse_part("0//2//2//101//3//4A10").is_err());
        assert!(parse_part("0//2//2//101//+3//4010").is_err());
        assert!(parse_part("0//2//2//1_01//3//4010").is_err());
        assert!(parse_part("00//2//2//101//3//4010").is_err());
    }

    #[test]
    fn test_range_violations_are_format_errors() {
        let cases = [
            "0//2//0//101//3//4010",   // required = 0
            "0//2//2//fb//3//4010",    // modulus too small
            "0//2//2//101//0//4010",   // x = 0
            "0//2//2//101//101//4010", // x = p
            "0//2//2//101//3//101",    // chunk 0 = p
            "0//2//2//101//3//40000",  // too many bits
        ];
        for case in cases {
            let err = parse_part(case).unwrap_err();
            assert_eq!(err.kind(), crate::ErrorKind::Format, "{case}");
        }
    }

    #[test]
    fn test_binary_rejects_malformed() {
        let bytes = encode_binary(&sample(FormatVersion::V1));
        assert!(decode_binary(&bytes[..bytes.len() - 1]).is_err());
        let mut longer = bytes.clone();
        longer.push(0);
        assert!(decode_binary(&longer).is_err());
        assert!(decode_binary(&[]).is_err());

        // modulus with a leading zero byte
        let mut padded = bytes[..9].to_vec();
        padded.extend_from_slice(&[0, 3, 0, 1, 1]);
        padded.extend_from_slice(&bytes[13..]);
        assert!(decode_binary(&padded).is_err());
    }

    #[test]
    fn test_v1_rejects_mismatched_wrapper() {
        let v0_bytes = encode_binary(&sample(FormatVersion::V0));
        let s = format!("1-{}", hex::encode(v0_bytes));
        assert!(parse_part(&s).is_err());
        let part = Part::from_components(FormatVersion::V1, 1, 1, n(257), Point::new(n(0xab), n(1)))
            .unwrap();
        let upper = part.format().to_uppercase();
        assert!(upper.contains("AB"));
        assert!(parse_part(&upper).is_err());
        assert!(parse_part("1-zz").is_err());
    }
}
