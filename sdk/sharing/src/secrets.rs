//! Splitting and joining whole secrets.
//!
//! A secret is laid out in chunks ([`ChunkLayout`]), each chunk gets its own
//! random polynomial, and the n evaluations at `x = 1..=n` are packed into one
//! [`Part`] per participant.

use std::collections::HashSet;

use num_bigint::BigUint;
use rand::{CryptoRng, RngCore};

use crate::codec::FormatVersion;
use crate::error::{Result, SharingError};
use crate::field::PrimeField;
use crate::multibyte::ChunkLayout;
use crate::part::{Part, Point, PrivateSecretPart, PublicSecretPart};
use crate::polynomial::{CoefficientSource, split_chunk};
use crate::prime::{self, DEFAULT_PRIMALITY_ROUNDS};
use crate::reconstruct::interpolate_at_zero;

/// Widest chunk used when the caller does not choose
pub const DEFAULT_MAX_CHUNK_BYTES: usize = 64;

/// Caller-chosen parameters of a split
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitOptions {
    /// Format version stamped on every issued part
    pub version: FormatVersion,
    /// Use this prime instead of generating one
    pub modulus: Option<BigUint>,
    /// Upper bound on the chunk width when generating a prime
    pub max_chunk_bytes: usize,
    /// Miller-Rabin rounds for prime generation
    pub primality_rounds: usize,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            version: FormatVersion::CURRENT,
            modulus: None,
            max_chunk_bytes: DEFAULT_MAX_CHUNK_BYTES,
            primality_rounds: DEFAULT_PRIMALITY_ROUNDS,
        }
    }
}

impl SplitOptions {
    pub fn with_version(mut self, version: FormatVersion) -> Self {
        self.version = version;
        self
    }

    pub fn with_modulus(mut self, modulus: BigUint) -> Self {
        self.modulus = Some(modulus);
        self
    }

    pub fn with_max_chunk_bytes(mut self, max_chunk_bytes: usize) -> Self {
        self.max_chunk_bytes = max_chunk_bytes;
        self
    }

    pub fn with_primality_rounds(mut self, rounds: usize) -> Self {
        self.primality_rounds = rounds;
        self
    }
}

fn check_counts(total: usize, required: usize) -> Result<()> {
    if total == 0 || required == 0 || required > total {
        return Err(SharingError::invalid(format!(
            "invalid threshold: k={required}, n={total}"
        )));
    }
    Ok(())
}

/// Split `secret` into `total` parts, any `required` of which recover it.
pub fn split<R: RngCore + CryptoRng + ?Sized>(
    secret: &[u8],
    total: usize,
    required: usize,
    rng: &mut R,
) -> Result<Vec<Part>> {
    split_with(secret, total, required, &SplitOptions::default(), rng)
}

/// [`split`] with explicit options.
pub fn split_with<R: RngCore + CryptoRng + ?Sized>(
    secret: &[u8],
    total: usize,
    required: usize,
    options: &SplitOptions,
    rng: &mut R,
) -> Result<Vec<Part>> {
    check_counts(total, required)?;
    if options.primality_rounds == 0 {
        return Err(SharingError::invalid("primality rounds must be at least 1"));
    }

    let modulus = match &options.modulus {
        Some(modulus) => {
            if !prime::is_probable_prime(modulus, options.primality_rounds, rng) {
                return Err(SharingError::invalid(format!(
                    "modulus {modulus} is not prime"
                )));
            }
            modulus.clone()
        }
        None => {
            if options.max_chunk_bytes == 0 {
                return Err(SharingError::invalid("max chunk width must be at least 1"));
            }
            let width = secret.len().clamp(1, options.max_chunk_bytes);
            prime::select_modulus(width, total, options.primality_rounds, rng)?
        }
    };

    let field = PrimeField::new(modulus)?;
    split_in_field(secret, total, required, options.version, &field, rng)
}

/// Split over a fixed field with coefficients from `source`.
///
/// Deterministic for a deterministic source, which is what test vectors need.
pub fn split_in_field<S: CoefficientSource + ?Sized>(
    secret: &[u8],
    total: usize,
    required: usize,
    version: FormatVersion,
    field: &PrimeField,
    source: &mut S,
) -> Result<Vec<Part>> {
    check_counts(total, required)?;
    if BigUint::from(total) >= *field.modulus() {
        return Err(SharingError::invalid(format!(
            "{total} parts need more distinct nonzero coordinates than the modulus allows"
        )));
    }

    let layout = ChunkLayout::new(secret.len(), field.modulus())?;
    let chunks = layout.encode(secret)?;
    let xs: Vec<BigUint> = (1..=total).map(BigUint::from).collect();

    log::debug!(
        "splitting {} byte secret into {} parts (threshold {}, {} chunks, {}-bit modulus)",
        secret.len(),
        total,
        required,
        chunks.len(),
        field.bits()
    );

    // ys[share][chunk]
    let mut ys: Vec<Vec<BigUint>> = vec![Vec::with_capacity(chunks.len()); total];
    for (index, chunk) in chunks.iter().enumerate() {
        log::trace!("sharing chunk {index}");
        for (share, point) in split_chunk(chunk, required, &xs, field, source)?
            .into_iter()
            .enumerate()
        {
            ys[share].push(point.y().clone());
        }
    }

    let public = PublicSecretPart::new(secret.len(), required, field.modulus().clone())?;
    xs.into_iter()
        .zip(ys)
        .map(|(x, ys)| {
            let private = PrivateSecretPart::new(Point::new(x, layout.pack(&ys)))?;
            Part::new(version, public.clone(), private)
        })
        .collect()
}

/// Recover the secret from a set of parts.
///
/// At least `required_parts` parts must be given, all from the same split
/// and with distinct x coordinates. Parts that are well formed but come from
/// a different secret produce a wrong result without any error.
pub fn join(parts: &[Part]) -> Result<Vec<u8>> {
    let first = parts
        .first()
        .ok_or_else(|| SharingError::invalid("no parts to join"))?;

    if let Some(other) = parts[1..].iter().find(|p| {
        p.version() != first.version() || p.public_part() != first.public_part()
    }) {
        return Err(SharingError::invalid(format!(
            "parts disagree: x={} does not match x={}",
            other.point().x(),
            first.point().x()
        )));
    }

    let required = first.required_parts();
    if parts.len() < required {
        return Err(SharingError::invalid(format!(
            "insufficient parts: got {}, need {required}",
            parts.len()
        )));
    }

    let mut seen = HashSet::with_capacity(parts.len());
    if let Some(dup) = parts.iter().find(|p| !seen.insert(p.point().x())) {
        return Err(SharingError::invalid(format!(
            "duplicate part x={}",
            dup.point().x()
        )));
    }

    if first.length() == 0 {
        log::debug!("joining empty secret");
        return Ok(Vec::new());
    }

    let field = PrimeField::new(first.modulus().clone())?;
    let layout = first.public_part().layout()?;
    let parts = &parts[..required];
    let unpacked: Vec<Vec<BigUint>> = parts
        .iter()
        .map(|p| layout.unpack(p.point().y()))
        .collect();

    log::debug!(
        "joining {} parts into {} byte secret ({} chunks)",
        parts.len(),
        layout.length(),
        layout.chunk_count()
    );

    let chunks = (0..layout.chunk_count())
        .map(|index| {
            let points: Vec<Point> = parts
                .iter()
                .zip(&unpacked)
                .map(|(p, ys)| Point::new(p.point().x().clone(), ys[index].clone()))
                .collect();
            interpolate_at_zero(&points, required, &field)
        })
        .collect::<Result<Vec<_>>>()?;

    layout.decode(&chunks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_split_and_join() {
        let mut rng = StdRng::seed_from_u64(42);
        let secret = [42u8; 32];

        let parts = split(&secret, 5, 3, &mut rng).unwrap();
        assert_eq!(parts.len(), 5);

        assert_eq!(join(&parts[0..3]).unwrap(), secret);
        assert_eq!(join(&parts[1..4]).unwrap(), secret);
        assert_eq!(join(&parts[2..5]).unwrap(), secret);
        assert_eq!(join(&parts).unwrap(), secret);
    }

    #[test]
    fn test_parts_share_public_half() {
        let mut rng = StdRng::seed_from_u64(1);
        let parts = split(b"hello world", 4, 2, &mut rng).unwrap();
        for part in &parts {
            assert_eq!(part.public_part(), parts[0].public_part());
            assert_eq!(part.version(), FormatVersion::CURRENT);
        }
        let xs: Vec<_> = parts.iter().map(|p| p.point().x().clone()).collect();
        assert_eq!(xs, (1..=4u32).map(BigUint::from).collect::<Vec<_>>());
    }

    #[test]
    fn test_invalid_threshold() {
        let mut rng = StdRng::seed_from_u64(2);
        let secret = [42u8; 8];

        // k > n
        assert!(split(&secret, 3, 5, &mut rng).is_err());
        // k = 0
        assert!(split(&secret, 3, 0, &mut rng).is_err());
        // n = 0
        let err = split(&secret, 0, 0, &mut rng).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_insufficient_parts() {
        let mut rng = StdRng::seed_from_u64(3);
        let parts = split(&[7u8; 8], 5, 3, &mut rng).unwrap();
        let err = join(&parts[0..2]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(join(&[]).is_err());
    }

    #[test]
    fn test_duplicate_parts() {
        let mut rng = StdRng::seed_from_u64(4);
        let parts = split(&[7u8; 8], 5, 2, &mut rng).unwrap();
        let err = join(&[parts[0].clone(), parts[0].clone()]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_mixed_secrets_rejected() {
        let mut rng = StdRng::seed_from_u64(5);
        let a = split(&[1u8; 8], 3, 2, &mut rng).unwrap();
        let b = split(&[2u8; 8], 3, 2, &mut rng).unwrap();
        // independently generated primes differ
        assert!(join(&[a[0].clone(), b[1].clone()]).is_err());
    }

    #[test]
    fn test_modulus_too_small_for_count() {
        let mut rng = StdRng::seed_from_u64(6);
        let options = SplitOptions::default().with_modulus(BigUint::from(257u32));
        assert!(split_with(&[1], 256, 2, &options, &mut rng).is_ok());
        assert!(split_with(&[1], 257, 2, &options, &mut rng).is_err());
    }

    #[test]
    fn test_composite_modulus_rejected() {
        let mut rng = StdRng::seed_from_u64(8);
        for composite in [256u32, 257 * 263] {
            let options = SplitOptions::default().with_modulus(BigUint::from(composite));
            let err = split_with(&[1, 2, 3], 5, 2, &options, &mut rng).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        }

        let no_rounds = SplitOptions::default()
            .with_modulus(BigUint::from(257u32))
            .with_primality_rounds(0);
        assert!(split_with(&[1], 3, 2, &no_rounds, &mut rng).is_err());
    }

    #[test]
    fn test_modulus_grows_with_part_count() {
        let mut rng = StdRng::seed_from_u64(9);
        let parts = split_with(&[0xaa], 70_000, 2, &SplitOptions::default(), &mut rng).unwrap();
        assert_eq!(parts.len(), 70_000);
        assert_eq!(parts[0].modulus().bits(), 18);
        assert_eq!(parts[69_999].point().x(), &BigUint::from(70_000u32));
        assert_eq!(
            join(&[parts[69_999].clone(), parts[12_345].clone()]).unwrap(),
            vec![0xaa]
        );
    }

    #[test]
    fn test_chunk_width_follows_options() {
        let mut rng = StdRng::seed_from_u64(7);
        let options = SplitOptions::default().with_max_chunk_bytes(4);
        let secret: Vec<u8> = (0..=40).collect();
        let parts = split_with(&secret, 3, 2, &options, &mut rng).unwrap();
        assert_eq!(parts[0].modulus().bits(), 40);
        assert_eq!(join(&parts[..2]).unwrap(), secret);

        let zero = SplitOptions::default().with_max_chunk_bytes(0);
        assert!(split_with(&secret, 3, 2, &zero, &mut rng).is_err());
    }
}
