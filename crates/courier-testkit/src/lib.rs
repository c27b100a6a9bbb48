//! # Courier Testkit
//!
//! Testing utilities for Courier.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Known encodings and frames for cross-client verification
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: An in-memory world with message blocks, a recording
//!   actuator, and pre-keyed parties
//!
//! ## Golden Vectors
//!
//! ```rust
//! use courier_testkit::vectors::verify_all_vectors;
//!
//! for (name, ok) in verify_all_vectors() {
//!     assert!(ok, "{name}");
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use courier_testkit::generators::{encoding, payload};
//!
//! proptest! {
//!     #[test]
//!     fn decode_inverts_encode(enc in encoding(), data in payload(256)) {
//!         prop_assert_eq!(enc.decode(&enc.encode(&data)).unwrap(), data);
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use courier::MessageTransmission;
//! use courier_testkit::fixtures::{introduced_parties, MemoryMedium};
//!
//! let mut parties = introduced_parties(&["alice", "bob"]);
//! let mut medium = MemoryMedium::with_block(0, 0);
//!
//! parties[0]
//!     .session
//!     .send(&mut medium, &MessageTransmission::new("hi"), Some("bob"))
//!     .unwrap();
//! parties[0].drain(&mut medium, 0);
//! assert!(parties[1].session.poll(&mut medium).unwrap().is_some());
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{introduced_parties, two_key_store, MemoryMedium, Party, RecordingActuator};
