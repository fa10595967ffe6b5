//! Multibyte secret layout.
//!
//! A secret of `L` bytes is cut into big-endian chunks of `W` bytes, where
//! `W = (bits(p) - 1) / 8`, so `256^W <= 2^(bits(p) - 1) < p`. The final chunk
//! may be shorter. Each chunk is shared with its own polynomial.
//!
//! The per-chunk y-values of one share are packed into a single integer:
//!
//! ```text
//!   packed = y_0 + y_1 * 2^s + y_2 * 2^(2s) + ...      s = bits(p)
//!
//!   | y_{c-1} | ... |   y_1   |   y_0   |
//!   ^ high bits                low bits ^
//! ```

use num_bigint::BigUint;
use num_traits::{One, Zero};

use crate::error::{Result, SharingError};

/// How a secret of a given length is laid out over a given modulus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkLayout {
    length: usize,
    chunk_width: usize,
    slot_bits: u64,
}

/// Chunk width in bytes implied by `modulus`.
pub fn chunk_width_for_modulus(modulus: &BigUint) -> usize {
    (modulus.bits().saturating_sub(1) / 8) as usize
}

impl ChunkLayout {
    pub fn new(length: usize, modulus: &BigUint) -> Result<Self> {
        let chunk_width = chunk_width_for_modulus(modulus);
        if chunk_width == 0 {
            return Err(SharingError::invalid(format!(
                "modulus {modulus} is too small to hold a one-byte chunk"
            )));
        }
        Ok(Self {
            length,
            chunk_width,
            slot_bits: modulus.bits(),
        })
    }

    /// Secret length in bytes
    pub fn length(&self) -> usize {
        self.length
    }

    pub fn chunk_width(&self) -> usize {
        self.chunk_width
    }

    pub fn chunk_count(&self) -> usize {
        self.length.div_ceil(self.chunk_width)
    }

    /// Width in bytes of chunk `index`; only the last one can be short.
    fn width_of(&self, index: usize) -> usize {
        let start = index * self.chunk_width;
        self.chunk_width.min(self.length - start)
    }

    /// Split `secret` into chunk values.
    pub fn encode(&self, secret: &[u8]) -> Result<Vec<BigUint>> {
        if secret.len() != self.length {
            return Err(SharingError::invalid(format!(
                "secret is {} bytes, layout expects {}",
                secret.len(),
                self.length
            )));
        }
        Ok(secret
            .chunks(self.chunk_width)
            .map(BigUint::from_bytes_be)
            .collect())
    }

    /// Reassemble exactly `length` bytes from chunk values.
    ///
    /// Each value is left-padded or truncated to its chunk's width, so the
    /// output length never depends on leading zero bytes.
    pub fn decode(&self, chunks: &[BigUint]) -> Result<Vec<u8>> {
        if chunks.len() != self.chunk_count() {
            return Err(SharingError::invalid(format!(
                "expected {} chunks, got {}",
                self.chunk_count(),
                chunks.len()
            )));
        }

        let mut secret = Vec::with_capacity(self.length);
        for (index, value) in chunks.iter().enumerate() {
            let width = self.width_of(index);
            let bytes = if value.is_zero() {
                Vec::new()
            } else {
                value.to_bytes_be()
            };
            if bytes.len() >= width {
                secret.extend_from_slice(&bytes[bytes.len() - width..]);
            } else {
                secret.resize(secret.len() + width - bytes.len(), 0);
                secret.extend_from_slice(&bytes);
            }
        }
        Ok(secret)
    }

    /// Pack per-chunk y-values into one integer.
    pub fn pack(&self, values: &[BigUint]) -> BigUint {
        values
            .iter()
            .enumerate()
            .fold(BigUint::zero(), |acc, (index, value)| {
                acc | (value << (index as u64 * self.slot_bits) as usize)
            })
    }

    /// Recover the per-chunk y-values from a packed integer.
    pub fn unpack(&self, packed: &BigUint) -> Vec<BigUint> {
        let mask = (BigUint::one() << self.slot_bits as usize) - BigUint::one();
        (0..self.chunk_count())
            .map(|index| (packed >> (index as u64 * self.slot_bits) as usize) & &mask)
            .collect()
    }

    /// Check that `packed` is a well-formed packing under `modulus`.
    ///
    /// Only the slots below `packed.bits()` are visited; the rest are zero.
    /// The cost is bounded by the size of `packed`, not by `length`.
    pub fn check_packed(&self, packed: &BigUint, modulus: &BigUint) -> Result<(), String> {
        let capacity = (self.chunk_count() as u64).saturating_mul(self.slot_bits);
        if packed.bits() > capacity {
            return Err(format!(
                "packed value has {} bits, layout allows {capacity}",
                packed.bits()
            ));
        }

        let mask = (BigUint::one() << self.slot_bits as usize) - BigUint::one();
        let mut rest = packed.clone();
        let mut index = 0usize;
        while !rest.is_zero() {
            if (&rest & &mask) >= *modulus {
                return Err(format!("chunk {index} value is not below the modulus"));
            }
            rest >>= self.slot_bits as usize;
            index += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(length: usize, p: u64) -> ChunkLayout {
        ChunkLayout::new(length, &BigUint::from(p)).unwrap()
    }

    #[test]
    fn test_chunk_width() {
        assert_eq!(chunk_width_for_modulus(&BigUint::from(257u32)), 1);
        assert_eq!(chunk_width_for_modulus(&BigUint::from(65_521u32)), 1);
        assert_eq!(chunk_width_for_modulus(&BigUint::from(65_537u32)), 2);
        assert_eq!(chunk_width_for_modulus(&BigUint::from(251u32)), 0);
        assert!(ChunkLayout::new(4, &BigUint::from(251u32)).is_err());
    }

    #[test]
    fn test_encode_short_last_chunk() {
        let l = layout(5, 65_537);
        assert_eq!(l.chunk_count(), 3);
        let chunks = l.encode(&[0x01, 0x02, 0x03, 0x04, 0x05]).unwrap();
        assert_eq!(
            chunks,
            vec![
                BigUint::from(0x0102u32),
                BigUint::from(0x0304u32),
                BigUint::from(0x05u32)
            ]
        );
        assert_eq!(l.decode(&chunks).unwrap(), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_leading_zeros_survive() {
        let l = layout(6, 65_537);
        let secret = [0u8, 0, 0, 7, 0, 0];
        let chunks = l.encode(&secret).unwrap();
        assert!(chunks[0].is_zero());
        assert_eq!(l.decode(&chunks).unwrap(), secret.to_vec());
    }

    #[test]
    fn test_decode_truncates_oversized_values() {
        let l = layout(2, 65_537);
        // 0x1_0203 does not fit two bytes; only the low bytes are kept
        let out = l.decode(&[BigUint::from(0x1_0203u32)]).unwrap();
        assert_eq!(out, vec![0x02, 0x03]);
    }

    #[test]
    fn test_encode_length_mismatch() {
        let l = layout(3, 257);
        assert!(l.encode(&[1, 2]).is_err());
        assert!(l.decode(&[BigUint::from(1u32)]).is_err());
    }

    #[test]
    fn test_pack_layout() {
        let l = layout(3, 257);
        let ys = [
            BigUint::from(1u32),
            BigUint::from(256u32),
            BigUint::from(3u32),
        ];
        let packed = l.pack(&ys);
        // slots are 9 bits wide
        assert_eq!(packed, BigUint::from(1u32 + (256 << 9) + (3 << 18)));
        assert_eq!(l.unpack(&packed), ys.to_vec());
    }

    #[test]
    fn test_empty_layout() {
        let l = layout(0, 257);
        assert_eq!(l.chunk_count(), 0);
        assert!(l.encode(&[]).unwrap().is_empty());
        assert!(l.decode(&[]).unwrap().is_empty());
        assert!(l.pack(&[]).is_zero());
        assert!(l.unpack(&BigUint::zero()).is_empty());
        assert!(l.check_packed(&BigUint::zero(), &BigUint::from(257u32)).is_ok());
        assert!(l.check_packed(&BigUint::one(), &BigUint::from(257u32)).is_err());
    }

    #[test]
    fn test_check_packed_rejects_slot_overflow() {
        let l = layout(2, 257);
        let p = BigUint::from(257u32);
        assert!(l.check_packed(&l.pack(&[BigUint::from(256u32), BigUint::from(5u32)]), &p).is_ok());
        // 511 fits the 9-bit slot but is not a field element
        assert!(l.check_packed(&BigUint::from(511u32), &p).is_err());
        assert!(l.check_packed(&(BigUint::one() << 18usize), &p).is_err());
    }

    #[test]
    fn test_check_packed_ignores_empty_high_slots() {
        let p = BigUint::from(257u32);
        let l = layout(u32::MAX as usize, 257);
        assert_eq!(l.chunk_count(), u32::MAX as usize);

        assert!(l.check_packed(&BigUint::one(), &p).is_ok());
        assert!(l.check_packed(&BigUint::zero(), &p).is_ok());
        // third slot holds 300
        let bad = BigUint::from(300u32) << 18usize;
        assert_eq!(
            l.check_packed(&bad, &p),
            Err("chunk 2 value is not below the modulus".to_string())
        );
    }
}
