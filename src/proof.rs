//! Proof artifacts.
//!
//! A [`Proof`] pairs the interactive transcript with the [`CompactProof`]
//! record consumed by downstream formatters.  The record serializes to the
//! JSON shape
//!
//! ```text
//! {
//!   "p_mt_root": 104500214297066916…9768,
//!   "query_index": 1234,
//!   "evals": [[value, [digest, …]], …],
//!   "fri_layers": [[root, beta, value, [digest, …], sibling_value, [digest, …]], …],
//!   "fri_last_layer": value
//! }
//! ```
//!
//! where every digest is a bare JSON integer (the SHA-256 output read
//! big-endian) and authentication paths are listed root-to-leaf.  In memory,
//! paths keep the leaf-first order produced by
//! [`MerkleTree::authentication_path`].
//!
//! [`MerkleTree::authentication_path`]: crate::merkle::MerkleTree::authentication_path

use serde::{Deserialize, Serialize};

use crate::channel::TranscriptEntry;
use crate::error::{StarkError, StarkResult};
use crate::field::FieldElement;
use crate::merkle::{verify_decommitment, Digest};

/// A committed value together with its authentication path (leaf-first).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "OpeningRecord", from = "OpeningRecord")]
pub struct Opening {
    /// Opened leaf value.
    pub value: FieldElement,
    /// Sibling digests, leaf-first.
    pub path: Vec<Digest>,
}

impl Opening {
    /// Checks the opening at `index` against `root`.
    pub fn verify(&self, index: usize, root: &Digest) -> bool {
        verify_decommitment(index, self.value, &self.path, root)
    }
}

impl From<Opening> for OpeningRecord {
    fn from(opening: Opening) -> Self {
        let mut path = opening.path;
        path.reverse();
        (opening.value, path)
    }
}

impl From<OpeningRecord> for Opening {
    fn from((value, mut path): OpeningRecord) -> Self {
        path.reverse();
        Opening { value, path }
    }
}

/// Serialized form of an [`Opening`]: value and root-to-leaf path.
type OpeningRecord = (FieldElement, Vec<Digest>);

/// Serialized form of a [`FriLayerProof`].
type LayerRecord = (Digest, FieldElement, FieldElement, Vec<Digest>, FieldElement, Vec<Digest>);

/// Openings of one FRI layer at the query point and its negation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "LayerRecord", from = "LayerRecord")]
pub struct FriLayerProof {
    /// Root of the layer commitment.
    pub root: Digest,
    /// Coefficient folding this layer into the next.
    pub beta: FieldElement,
    /// Opening at `query mod len`.
    pub opening: Opening,
    /// Opening at `(query + len/2) mod len`.
    pub sibling: Opening,
}

impl From<FriLayerProof> for LayerRecord {
    fn from(layer: FriLayerProof) -> Self {
        let (value, path): OpeningRecord = layer.opening.into();
        let (sibling_value, sibling_path): OpeningRecord = layer.sibling.into();
        (layer.root, layer.beta, value, path, sibling_value, sibling_path)
    }
}

impl From<LayerRecord> for FriLayerProof {
    fn from((root, beta, value, path, sibling_value, sibling_path): LayerRecord) -> Self {
        FriLayerProof {
            root,
            beta,
            opening: (value, path).into(),
            sibling: (sibling_value, sibling_path).into(),
        }
    }
}

/// The compact proof record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompactProof {
    /// Root of the trace polynomial commitment.
    pub p_mt_root: Digest,
    /// Index drawn into the extended evaluation domain.
    pub query_index: usize,
    /// Trace openings at `x`, `g·x` and `g²·x`.
    pub evals: [Opening; 3],
    /// Every FRI layer but the last, composition layer first.
    pub fri_layers: Vec<FriLayerProof>,
    /// Constant value of the last FRI layer.
    pub fri_last_layer: FieldElement,
}

impl CompactProof {
    /// Serializes the record as pretty-printed JSON.
    pub fn to_json_string(&self) -> StarkResult<String> {
        serde_json::to_string_pretty(self).map_err(|err| StarkError::Serialization(err.to_string()))
    }

    /// Parses a record produced by [`CompactProof::to_json_string`].
    pub fn from_json_str(input: &str) -> StarkResult<Self> {
        serde_json::from_str(input).map_err(|err| StarkError::Serialization(err.to_string()))
    }

    /// Checks every Merkle opening against its committed root.
    ///
    /// `extension_factor` is the blow-up of the extended domain, which
    /// fixes the index distance between consecutive trace steps.  This is a
    /// decommitment check only; it does not test the FRI folding equations.
    pub fn verify_openings(&self, extension_factor: usize, extended_size: usize) -> bool {
        let trace_ok = self.evals.iter().enumerate().all(|(step, opening)| {
            let index = (self.query_index + step * extension_factor) % extended_size;
            opening.verify(index, &self.p_mt_root)
        });
        let mut len = extended_size;
        let fri_ok = self.fri_layers.iter().all(|layer| {
            let index = self.query_index % len;
            let sibling = (self.query_index + len / 2) % len;
            let ok = layer.opening.verify(index, &layer.root)
                && layer.sibling.verify(sibling, &layer.root);
            len /= 2;
            ok
        });
        trace_ok && fri_ok
    }
}

/// A complete proof: the interactive transcript and the compact record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proof {
    /// Every message exchanged, in protocol order.
    pub transcript: Vec<TranscriptEntry>,
    /// Structured record of commitments and openings.
    pub compact: CompactProof,
}
