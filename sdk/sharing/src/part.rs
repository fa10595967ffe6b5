//! Secret parts
//!
//! A [`Part`] is the unit handed to each participant. Its public half is
//! identical across all parts of one secret; its private half is one point
//! on the (packed) sharing polynomials.

use std::fmt;
use std::str::FromStr;

use num_bigint::BigUint;
use num_traits::Zero;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::codec::{self, FormatVersion};
use crate::error::{Result, SharingError};
use crate::multibyte::ChunkLayout;

/// A point `(x, y)` over the part's field
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Point {
    x: BigUint,
    y: BigUint,
}

impl Point {
    pub fn new(x: BigUint, y: BigUint) -> Self {
        Self { x, y }
    }

    pub fn x(&self) -> &BigUint {
        &self.x
    }

    pub fn y(&self) -> &BigUint {
        &self.y
    }
}

/// The public components of a part, shared by every part of a secret
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PublicSecretPart {
    /// Secret length in bytes
    length: usize,
    /// Number of parts needed to reconstruct
    required_parts: usize,
    /// Prime modulus of the field
    modulus: BigUint,
}

impl PublicSecretPart {
    /// Fails with `InvalidArgument` if the modulus is absent or the threshold
    /// is zero.
    pub fn new(
        length: usize,
        required_parts: usize,
        modulus: impl Into<Option<BigUint>>,
    ) -> Result<Self> {
        let modulus = modulus
            .into()
            .ok_or_else(|| SharingError::invalid("public part requires a modulus"))?;
        if required_parts == 0 {
            return Err(SharingError::invalid("required parts must be at least 1"));
        }
        Ok(Self {
            length,
            required_parts,
            modulus,
        })
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn required_parts(&self) -> usize {
        self.required_parts
    }

    pub fn modulus(&self) -> &BigUint {
        &self.modulus
    }

    pub fn layout(&self) -> Result<ChunkLayout> {
        ChunkLayout::new(self.length, &self.modulus)
    }
}

/// The private component of a part, different for every part
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PrivateSecretPart {
    point: Point,
}

impl PrivateSecretPart {
    pub fn new(point: impl Into<Option<Point>>) -> Result<Self> {
        let point = point
            .into()
            .ok_or_else(|| SharingError::invalid("private part requires a point"))?;
        Ok(Self { point })
    }

    pub fn point(&self) -> &Point {
        &self.point
    }
}

/// One participant's share of a secret
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Part {
    version: FormatVersion,
    public: PublicSecretPart,
    private: PrivateSecretPart,
}

impl Part {
    /// Assemble a part, checking that the point is usable under the public
    /// parameters.
    pub fn new(
        version: FormatVersion,
        public: PublicSecretPart,
        private: PrivateSecretPart,
    ) -> Result<Self> {
        let part = Self {
            version,
            public,
            private,
        };
        part.check().map_err(SharingError::InvalidArgument)?;
        Ok(part)
    }

    pub fn from_components(
        version: FormatVersion,
        length: usize,
        required_parts: usize,
        modulus: BigUint,
        point: Point,
    ) -> Result<Self> {
        Self::new(
            version,
            PublicSecretPart::new(length, required_parts, modulus)?,
            PrivateSecretPart::new(point)?,
        )
    }

    /// Like [`Part::from_components`] but reports violations as format
    /// errors, for use by decoders.
    pub(crate) fn decoded(
        version: FormatVersion,
        length: usize,
        required_parts: usize,
        modulus: BigUint,
        point: Point,
    ) -> Result<Self> {
        if required_parts == 0 {
            return Err(SharingError::format("required parts must be at least 1"));
        }
        let part = Self {
            version,
            public: PublicSecretPart {
                length,
                required_parts,
                modulus,
            },
            private: PrivateSecretPart { point },
        };
        part.check().map_err(SharingError::Format)?;
        Ok(part)
    }

    fn check(&self) -> Result<(), String> {
        let modulus = self.modulus();
        // bounds of the binary form
        if u32::try_from(self.length()).is_err() || u32::try_from(self.required_parts()).is_err() {
            return Err("length and required parts must fit in 32 bits".into());
        }
        if modulus.bits() > u64::from(u16::MAX) * 8 {
            return Err("modulus is too large to encode".into());
        }
        if self.point().y().bits() > u64::from(u32::MAX) * 8 {
            return Err("packed value is too large to encode".into());
        }
        let layout = self.public.layout().map_err(|e| e.to_string())?;
        let x = self.point().x();
        if x.is_zero() {
            return Err("x = 0 is not a valid share coordinate".into());
        }
        if x >= modulus {
            return Err("x coordinate is not below the modulus".into());
        }
        layout.check_packed(self.point().y(), modulus)
    }

    pub fn version(&self) -> FormatVersion {
        self.version
    }

    pub fn public_part(&self) -> &PublicSecretPart {
        &self.public
    }

    pub fn private_part(&self) -> &PrivateSecretPart {
        &self.private
    }

    pub fn length(&self) -> usize {
        self.public.length
    }

    pub fn required_parts(&self) -> usize {
        self.public.required_parts
    }

    pub fn modulus(&self) -> &BigUint {
        &self.public.modulus
    }

    pub fn point(&self) -> &Point {
        &self.private.point
    }

    /// Canonical text form under this part's own format version.
    pub fn format(&self) -> String {
        codec::format_part(self)
    }

    /// Parse the canonical text form of any known version.
    pub fn parse(s: &str) -> Result<Self> {
        codec::parse_part(s)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        codec::encode_binary(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        codec::decode_binary(bytes)
    }

    /// Join this part with `others` to recover the secret.
    pub fn join(&self, others: &[Part]) -> Result<Vec<u8>> {
        let mut parts = Vec::with_capacity(others.len() + 1);
        parts.extend_from_slice(others);
        parts.push(self.clone());
        crate::secrets::join(&parts)
    }
}

impl fmt::Display for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}

impl FromStr for Part {
    type Err = SharingError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for Part {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Part {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
