#![deny(missing_docs)]

//! # fibsquare
//!
//! A STARK prover for the FibonacciSq statement: the sequence
//! `a[0] = 1`, `a[1] = x`, `a[n+2] = a[n+1]^2 + a[n]^2` over the prime field
//! `p = 3·2^30 + 1` reaches a claimed value at step 1022.
//!
//! The crate is organised bottom-up:
//!
//! * [`field`] implements arithmetic modulo `p` and its multiplicative subgroups.
//! * [`polynomial`] provides dense polynomials with exact division and
//!   Lagrange interpolation.
//! * [`merkle`] commits to vectors of field elements with SHA-256.
//! * [`channel`] is the Fiat–Shamir transcript that records every message and
//!   derives the verifier's randomness from the mixed ones.
//! * [`prover`] chains them into trace commitment, constraint composition,
//!   FRI folding and decommitment, producing a [`Proof`].
//!
//! ```no_run
//! use fibsquare::{Proof, ProverConfig};
//!
//! let proof = Proof::prove(&ProverConfig::default()).unwrap();
//! println!("{}", proof.compact.to_json_string().unwrap());
//! ```

pub mod channel;
pub mod config;
pub mod constraints;
pub mod domain;
pub mod error;
pub mod field;
pub mod fri;
mod io;
pub mod merkle;
pub mod polynomial;
pub mod proof;
pub mod prover;
pub mod trace;

pub use channel::{render_lines, Channel, Direction, Message, Mix, TranscriptEntry};
pub use config::ProverConfig;
pub use constraints::Constraints;
pub use error::{StarkError, StarkResult};
pub use field::{FieldElement, FieldError, MODULUS};
pub use fri::{FriCommitment, FriLayer};
pub use io::{write_proof_json, write_text_series, write_transcript};
pub use merkle::{verify_decommitment, CommitmentError, Digest, MerkleTree};
pub use polynomial::{Polynomial, PolynomialError};
pub use proof::{CompactProof, FriLayerProof, Opening, Proof};
pub use prover::{ProofStats, Stage};
pub use trace::FibSquare;
