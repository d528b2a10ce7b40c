//! SHA-256 Merkle commitments over field elements.
//!
//! Commitment scheme, version [`MERKLE_SCHEME_VERSION`]:
//!
//! * a leaf is `SHA-256(value)` over the 4-byte big-endian encoding of the
//!   field element;
//! * an internal node is `SHA-256(left ‖ right)` over the raw 32-byte child
//!   digests;
//! * the leaf sequence is padded to the next power of two by repeating its
//!   last leaf, making the tree perfect.  A single leaf is its own root and
//!   the empty sequence commits to `SHA-256("")`.
//!
//! Any change to these rules changes every root, so they are versioned
//! together.  Verification is the free function [`verify_decommitment`],
//! which needs nothing but the root.

use std::fmt;
use std::str::FromStr;

use num_bigint::BigUint;
use serde::{de, ser::Error as _, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Number;
use sha2::{Digest as _, Sha256};
use thiserror::Error;

use crate::field::FieldElement;

/// Version of the leaf/node hashing and padding rules.
pub const MERKLE_SCHEME_VERSION: u32 = 1;

/// Failures raised by the commitment scheme.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommitmentError {
    /// An authentication path was requested for a leaf outside the committed range.
    #[error("leaf index {index} out of range for {leaf_count} committed leaves")]
    IndexOutOfRange {
        /// Requested leaf index.
        index: usize,
        /// Number of leaves committed before padding.
        leaf_count: usize,
    },
    /// A digest encoding was not a 256-bit value.
    #[error("invalid digest encoding: {0}")]
    InvalidDigest(String),
}

/// A 256-bit SHA-256 digest.
///
/// Displays as a `0x`-prefixed hex string.  Serializes as the digest read as
/// a big-endian 256-bit unsigned integer, written as a bare JSON number.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Digest(pub [u8; 32]);

impl Digest {
    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Encodes the digest as `0x` followed by 64 hex digits.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Parses a digest from hex, with or without the `0x` prefix.
    pub fn from_hex(input: &str) -> Result<Self, CommitmentError> {
        let trimmed = input.strip_prefix("0x").unwrap_or(input);
        let bytes =
            hex::decode(trimmed).map_err(|err| CommitmentError::InvalidDigest(err.to_string()))?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|v: Vec<u8>| CommitmentError::InvalidDigest(format!("{} bytes", v.len())))?;
        Ok(Digest(bytes))
    }

    /// The digest as a big-endian unsigned integer.
    pub fn to_biguint(&self) -> BigUint {
        BigUint::from_bytes_be(&self.0)
    }

    /// Rebuilds a digest from an integer below `2^256`.
    pub fn from_biguint(value: &BigUint) -> Result<Self, CommitmentError> {
        let bytes = value.to_bytes_be();
        if bytes.len() > 32 {
            return Err(CommitmentError::InvalidDigest(format!(
                "{value} does not fit in 256 bits"
            )));
        }
        let mut out = [0u8; 32];
        out[32 - bytes.len()..].copy_from_slice(&bytes);
        Ok(Digest(out))
    }

    /// Parses the decimal integer form produced by serialization.
    pub fn from_decimal(input: &str) -> Result<Self, CommitmentError> {
        let value = BigUint::from_str(input)
            .map_err(|err| CommitmentError::InvalidDigest(format!("{input:?}: {err}")))?;
        Self::from_biguint(&value)
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self.to_hex())
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let number = Number::from_str(&self.to_biguint().to_string()).map_err(S::Error::custom)?;
        number.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let number = Number::deserialize(deserializer)?;
        Digest::from_decimal(&number.to_string()).map_err(de::Error::custom)
    }
}

fn finish(hasher: Sha256) -> Digest {
    let mut out = [0u8; 32];
    out.copy_from_slice(&hasher.finalize());
    Digest(out)
}

/// Hashes a single leaf value.
pub fn hash_leaf(value: FieldElement) -> Digest {
    let mut hasher = Sha256::new();
    hasher.update(value.to_bytes());
    finish(hasher)
}

/// Hashes two child digests into their parent.
pub fn hash_pair(left: &Digest, right: &Digest) -> Digest {
    let mut hasher = Sha256::new();
    hasher.update(left.0);
    hasher.update(right.0);
    finish(hasher)
}

fn hash_empty() -> Digest {
    finish(Sha256::new())
}

/// Pads hashed leaves to a power of two by repeating the last one.
fn pad_leaves(mut leaves: Vec<Digest>) -> Vec<Digest> {
    if let Some(&last) = leaves.last() {
        leaves.resize(leaves.len().next_power_of_two(), last);
    }
    leaves
}

/// A perfect binary Merkle tree over a sequence of field elements.
///
/// Every level is kept so authentication paths are simple lookups.
#[derive(Debug, Clone)]
pub struct MerkleTree {
    leaf_count: usize,
    levels: Vec<Vec<Digest>>,
}

impl MerkleTree {
    /// Commits to `leaves`.
    pub fn build(leaves: &[FieldElement]) -> Self {
        let hashed = pad_leaves(leaves.iter().map(|&v| hash_leaf(v)).collect());
        let mut levels = vec![hashed];
        while levels.last().map_or(false, |level| level.len() > 1) {
            let next = levels[levels.len() - 1]
                .chunks_exact(2)
                .map(|pair| hash_pair(&pair[0], &pair[1]))
                .collect();
            levels.push(next);
        }
        Self {
            leaf_count: leaves.len(),
            levels,
        }
    }

    /// The committed root.
    pub fn root(&self) -> Digest {
        self.levels
            .last()
            .and_then(|level| level.first())
            .copied()
            .unwrap_or_else(hash_empty)
    }

    /// Number of leaves committed, before padding.
    pub fn leaf_count(&self) -> usize {
        self.leaf_count
    }

    /// Sibling digests from the leaf at `index` up to, but excluding, the root.
    pub fn authentication_path(&self, index: usize) -> Result<Vec<Digest>, CommitmentError> {
        if index >= self.leaf_count {
            return Err(CommitmentError::IndexOutOfRange {
                index,
                leaf_count: self.leaf_count,
            });
        }
        let mut idx = index;
        let path = self.levels[..self.levels.len() - 1]
            .iter()
            .map(|level| {
                let sibling = level[idx ^ 1];
                idx >>= 1;
                sibling
            })
            .collect();
        Ok(path)
    }
}

/// Checks that `value` sits at `index` under `root`.
///
/// `path` lists sibling digests leaf-first; bit `k` of `index` tells whether
/// the running hash is the right (1) or left (0) child at level `k`.
pub fn verify_decommitment(
    index: usize,
    value: FieldElement,
    path: &[Digest],
    root: &Digest,
) -> bool {
    if path.len() < usize::BITS as usize && index >> path.len() != 0 {
        return false;
    }
    let mut hash = hash_leaf(value);
    for (level, sibling) in path.iter().enumerate() {
        hash = if (index >> level) & 1 == 0 {
            hash_pair(&hash, sibling)
        } else {
            hash_pair(sibling, &hash)
        };
    }
    hash == *root
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn values(n: u64) -> Vec<FieldElement> {
        (0..n).map(|i| FieldElement::new(i * 7 + 1)).collect()
    }

    #[test]
    fn every_leaf_verifies_for_awkward_lengths() {
        for n in [1u64, 2, 3, 5, 8, 13, 100] {
            let leaves = values(n);
            let tree = MerkleTree::build(&leaves);
            for (i, &leaf) in leaves.iter().enumerate() {
                let path = tree.authentication_path(i).unwrap();
                assert_eq!(path.len(), (n as usize).next_power_of_two().trailing_zeros() as usize);
                assert!(verify_decommitment(i, leaf, &path, &tree.root()));
            }
        }
    }

    #[test]
    fn empty_and_single_leaf_trees() {
        let empty = MerkleTree::build(&[]);
        assert_eq!(empty.root(), hash_empty());
        assert_eq!(
            empty.authentication_path(0),
            Err(CommitmentError::IndexOutOfRange { index: 0, leaf_count: 0 })
        );

        let leaf = FieldElement::new(42);
        let single = MerkleTree::build(&[leaf]);
        assert_eq!(single.root(), hash_leaf(leaf));
        assert!(single.authentication_path(0).unwrap().is_empty());
        assert!(verify_decommitment(0, leaf, &[], &single.root()));
        assert!(!verify_decommitment(1, leaf, &[], &single.root()));
    }

    #[test]
    fn padding_repeats_the_last_leaf() {
        let three = values(3);
        let mut four = three.clone();
        four.push(three[2]);
        assert_eq!(MerkleTree::build(&three).root(), MerkleTree::build(&four).root());
        assert!(MerkleTree::build(&three).authentication_path(3).is_err());
    }

    #[test]
    fn tampering_is_detected() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for _ in 0..10 {
            let len = rng.gen_range(0..=2000usize);
            let data: Vec<_> = (0..len).map(|_| FieldElement::random_element(&mut rng)).collect();
            let tree = MerkleTree::build(&data);
            if len == 0 {
                assert!(tree.authentication_path(0).is_err());
                continue;
            }
            let index = rng.gen_range(0..len);
            let path = tree.authentication_path(index).unwrap();
            let content = data[index];
            assert!(verify_decommitment(index, content, &path, &tree.root()));

            if !path.is_empty() {
                let mut altered = path.clone();
                let at = rng.gen_range(0..altered.len());
                let mut hasher = Sha256::new();
                hasher.update(altered[at].0);
                altered[at] = finish(hasher);
                assert!(!verify_decommitment(index, content, &altered, &tree.root()));
            }

            let other = data[rng.gen_range(0..len)];
            assert!(!verify_decommitment(index, other, &path, &tree.root()) || other == content);
        }
    }

    #[test]
    fn known_decommitment_verifies() {
        let root =
            Digest::from_hex("e7090678303730d51aee399664256de5f6476ec86fb4d45fbf0556535fb09f48")
                .unwrap();
        let path: Vec<Digest> = [
            "5870e2a3a3e1eda5fd4c6f19333d853bf58feffd41ee3577e805d5aaa6fad8f5",
            "96d8d725074e0127bf9111800eb0ff5a23c3552ad2705fc23b0b4f790343e12c",
            "6216f1400e1cfc2e747c3391fa8575f98dffae5e533cf3bfe13096cd407c2241",
            "85dfba1e44c4567e570e17c6f69e6cd3465aaaa24ba919c5e4803bbc2ecafac1",
            "af24050a4f278e4540d5992832a3a9389d1a2f9a73bbc7a2a4a92f5bda02e671",
            "be426a44a7e746a080cf0236a6b621401abfe6d5c2ebad3c4031e2e1b9f49ed5",
            "5ddbaae5b236ff9ee820c5a3c41a0135ff19b70bcaac15ef79bee1fbd9647251",
            "de3c030814f68bcb8c81645140fec0db12f44ab2d76dc59fbf4de37aeaf37fff",
            "4340668c64a5ef413649583fad31f4cc4340556bf84c3141839652b3205597a3",
            "d1ad91883aa7458eda55146c74c8b8052a5b99acf8cec14ec7339cf86f050c1a",
            "5d860ee4ec8d7ce9c229c3fcd6aefe4aa8ad7ba3449607cefeb77b13c6358106",
            "97a9e1f7d545dc7d71893f4128b64c98a6dd5f3364d748cec2430cb575df2c2a",
            "7df684aedf82b8c82d917b4478d6286a0eeadce71e6631989c116f54a5a04364",
        ]
        .iter()
        .map(|h| Digest::from_hex(h).unwrap())
        .collect();
        let leaf = FieldElement::new(2915689030);
        assert!(verify_decommitment(365, leaf, &path, &root));
        assert!(!verify_decommitment(366, leaf, &path, &root));
        assert!(!verify_decommitment(365, leaf + FieldElement::ONE, &path, &root));
    }

    #[test]
    fn digest_hex_round_trip() {
        let digest = hash_leaf(FieldElement::new(9));
        assert_eq!(Digest::from_hex(&digest.to_hex()).unwrap(), digest);
        assert!(Digest::from_hex("0x1234").is_err());
    }

    #[test]
    fn digest_serializes_as_bare_integer() {
        let root =
            Digest::from_hex("e7090678303730d51aee399664256de5f6476ec86fb4d45fbf0556535fb09f48")
                .unwrap();
        let decimal =
            "104500214297066916133126671825692285761566746556879834723302550549120383229768";
        assert_eq!(serde_json::to_string(&root).unwrap(), decimal);
        assert_eq!(serde_json::from_str::<Digest>(decimal).unwrap(), root);

        let value = serde_json::to_value(root).unwrap();
        assert!(value.is_number());
        assert_eq!(serde_json::from_value::<Digest>(value).unwrap(), root);
    }

    #[test]
    fn small_and_oversized_integers() {
        let one = serde_json::from_str::<Digest>("1").unwrap();
        let mut expected = [0u8; 32];
        expected[31] = 1;
        assert_eq!(one, Digest(expected));
        assert_eq!(serde_json::to_string(&one).unwrap(), "1");

        let max = Digest([0xff; 32]);
        let text = serde_json::to_string(&max).unwrap();
        assert_eq!(
            text,
            "115792089237316195423570985008687907853269984665640564039457584007913129639935"
        );
        assert_eq!(serde_json::from_str::<Digest>(&text).unwrap(), max);
        let too_big =
            "115792089237316195423570985008687907853269984665640564039457584007913129639936";
        assert!(serde_json::from_str::<Digest>(too_big).is_err());
        assert!(serde_json::from_str::<Digest>("\"0x01\"").is_err());
        assert!(serde_json::from_str::<Digest>("-1").is_err());
    }
}
