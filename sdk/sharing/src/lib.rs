//! Tessera Secret Sharing
//!
//! Shamir k-of-n secret sharing over prime fields, for byte secrets of any
//! length, with a versioned share format.
//!
//! # Architecture
//!
//! ```text
//!  secret bytes
//!       │
//!       ▼
//!  ┌────────────┐  chunks   ┌──────────────┐  (x, y) per chunk  ┌───────────┐
//!  │ multibyte  │──────────▶│  polynomial  │───────────────────▶│  pack y   │
//!  │  (layout)  │           │ (random, k-1)│                    │ into Part │
//!  └────────────┘           └──────────────┘                    └─────┬─────┘
//!        ▲                        │ field / prime                     │ codec
//!        │                        ▼                                   ▼
//!  ┌────────────┐          ┌──────────────┐                     "1-0100…"
//!  │   decode   │◀─────────│ reconstruct  │◀──── k parts ─────── parse
//!  └────────────┘  chunks  │ (Lagrange@0) │
//!                          └──────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use rand::rngs::OsRng;
//! use tessera_sharing::{join, split, Part};
//!
//! let parts = split(b"correct horse", 5, 3, &mut OsRng).unwrap();
//! let text: Vec<String> = parts.iter().map(Part::format).collect();
//!
//! let received: Vec<Part> = text[1..4].iter().map(|s| s.parse().unwrap()).collect();
//! assert_eq!(join(&received).unwrap(), b"correct horse");
//! ```
//!
//! Parts carry no integrity tag. Joining well-formed parts from the wrong
//! secret yields a wrong secret, not an error.

pub mod codec;
pub mod error;
pub mod field;
pub mod multibyte;
pub mod part;
pub mod polynomial;
pub mod prime;
pub mod reconstruct;
pub mod secrets;

pub use codec::FormatVersion;
pub use error::{ErrorKind, SharingError};
pub use field::PrimeField;
pub use multibyte::ChunkLayout;
pub use part::{Part, Point, PrivateSecretPart, PublicSecretPart};
pub use polynomial::{CoefficientSource, Polynomial};
pub use secrets::{SplitOptions, join, split, split_in_field, split_with};
