//! Fiat–Shamir channel.
//!
//! The [`Channel`] simulates the verifier of the interactive protocol.  It
//! keeps two things: an append-only log of every message exchanged, and a
//! BLAKE2b-256 digest state that absorbs the prover messages marked for
//! mixing.  Verifier randomness is derived from that state and a strictly
//! increasing counter, so every challenge is a deterministic function of the
//! commitments sent before it.

use blake2::digest::{consts::U32, Digest as _};
use blake2::Blake2b;
use serde::{Deserialize, Serialize};

use crate::error::StarkError;
use crate::field::{FieldElement, MODULUS};
use crate::merkle::Digest;

type Blake2b256 = Blake2b<U32>;

const CHANNEL_DOMAIN: &[u8] = b"fibsquare:v1:channel";
const MIX_DOMAIN: &[u8] = b"fibsquare:v1:mix";
const DRAW_DOMAIN: &[u8] = b"fibsquare:v1:draw";
const ADVANCE_DOMAIN: &[u8] = b"fibsquare:v1:advance";

/// The closed set of values a prover sends through the channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// A single field element.
    Field(FieldElement),
    /// A Merkle root.
    Digest(Digest),
    /// A Merkle authentication path, leaf-first.
    Path(Vec<Digest>),
    /// A plain integer.
    Int(u64),
}

impl Message {
    /// Human-readable form recorded in the transcript log.
    pub fn render(&self) -> String {
        match self {
            Message::Field(value) => value.to_string(),
            Message::Digest(digest) => digest.to_hex(),
            Message::Path(path) => path
                .iter()
                .map(Digest::to_hex)
                .collect::<Vec<_>>()
                .join(","),
            Message::Int(value) => value.to_string(),
        }
    }

    /// Canonical bytes absorbed into the digest state.
    fn to_bytes(&self) -> Vec<u8> {
        match self {
            Message::Field(value) => value.to_bytes().to_vec(),
            Message::Digest(digest) => digest.as_bytes().to_vec(),
            Message::Path(path) => path.iter().flat_map(|d| d.as_bytes().iter().copied()).collect(),
            Message::Int(value) => value.to_be_bytes().to_vec(),
        }
    }
}

impl From<FieldElement> for Message {
    fn from(value: FieldElement) -> Self {
        Message::Field(value)
    }
}

impl From<Digest> for Message {
    fn from(digest: Digest) -> Self {
        Message::Digest(digest)
    }
}

impl From<u64> for Message {
    fn from(value: u64) -> Self {
        Message::Int(value)
    }
}

impl From<Vec<Digest>> for Message {
    fn from(path: Vec<Digest>) -> Self {
        Message::Path(path)
    }
}

/// Whether a sent message is absorbed into the randomness state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mix {
    /// Later challenges depend on this message.
    Yes,
    /// Logged only.
    No,
}

/// Which side of the simulated interaction produced an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Sent by the prover.
    Prover,
    /// Derived on behalf of the verifier.
    Verifier,
}

/// One line of the interactive transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    /// Message origin.
    pub direction: Direction,
    /// Protocol label, e.g. `"fri polynomial beta #3"`.
    pub label: String,
    /// Rendered value.
    pub value: String,
}

/// Stateful Fiat–Shamir transcript for a single proof.
#[derive(Debug, Clone)]
pub struct Channel {
    state: [u8; 32],
    counter: u64,
    mixed: usize,
    log: Vec<TranscriptEntry>,
}

impl Default for Channel {
    fn default() -> Self {
        Self::new()
    }
}

impl Channel {
    /// Creates a channel with the deterministic initial state.
    pub fn new() -> Self {
        let mut hasher = Blake2b256::new();
        hasher.update(CHANNEL_DOMAIN);
        let mut state = [0u8; 32];
        state.copy_from_slice(&hasher.finalize());
        Self {
            state,
            counter: 0,
            mixed: 0,
            log: Vec::new(),
        }
    }

    /// Records a prover message, absorbing it when `mix` is [`Mix::Yes`].
    pub fn send(&mut self, label: impl Into<String>, message: impl Into<Message>, mix: Mix) {
        let message = message.into();
        if mix == Mix::Yes {
            let mut hasher = Blake2b256::new();
            hasher.update(MIX_DOMAIN);
            hasher.update(self.state);
            hasher.update(message.to_bytes());
            self.state.copy_from_slice(&hasher.finalize());
            self.mixed += 1;
        }
        self.log.push(TranscriptEntry {
            direction: Direction::Prover,
            label: label.into(),
            value: message.render(),
        });
    }

    /// Derives a field element from the current state.
    pub fn receive_random_field_element(
        &mut self,
        label: &str,
    ) -> Result<FieldElement, StarkError> {
        let raw = self.draw(label)?;
        let value = FieldElement::new((raw % MODULUS as u128) as u64);
        self.log_verifier(label, value.into());
        Ok(value)
    }

    /// Derives an integer in the inclusive range `[low, high]`.
    pub fn receive_random_int(
        &mut self,
        low: u64,
        high: u64,
        label: &str,
    ) -> Result<u64, StarkError> {
        if low > high {
            return Err(StarkError::InvalidRange { low, high });
        }
        let raw = self.draw(label)?;
        let span = (high - low) as u128 + 1;
        let value = low + (raw % span) as u64;
        self.log_verifier(label, value.into());
        Ok(value)
    }

    fn draw(&mut self, label: &str) -> Result<u128, StarkError> {
        if self.mixed == 0 {
            log::error!("channel asked for `{label}` before any commitment was mixed in");
            return Err(StarkError::ProtocolOrder(
                "randomness requested before any message was mixed in",
            ));
        }
        self.counter += 1;
        let counter = self.counter.to_be_bytes();

        let mut hasher = Blake2b256::new();
        hasher.update(DRAW_DOMAIN);
        hasher.update(self.state);
        hasher.update(counter);
        let seed = hasher.finalize();

        let mut advance = Blake2b256::new();
        advance.update(ADVANCE_DOMAIN);
        advance.update(self.state);
        advance.update(counter);
        self.state.copy_from_slice(&advance.finalize());

        let mut head = [0u8; 16];
        head.copy_from_slice(&seed[..16]);
        Ok(u128::from_be_bytes(head))
    }

    fn log_verifier(&mut self, label: &str, message: Message) {
        self.log.push(TranscriptEntry {
            direction: Direction::Verifier,
            label: label.to_string(),
            value: message.render(),
        });
    }

    /// The transcript recorded so far.
    pub fn log(&self) -> &[TranscriptEntry] {
        &self.log
    }

    /// Number of randomness derivations performed.
    pub fn draws(&self) -> u64 {
        self.counter
    }

    /// Renders the transcript as `"<direction> <label>: <value>"` lines.
    pub fn transcript_lines(&self) -> Vec<String> {
        render_lines(&self.log)
    }

    /// Consumes the channel, returning its transcript.
    pub fn into_log(self) -> Vec<TranscriptEntry> {
        self.log
    }
}

/// Renders transcript entries one per line.
pub fn render_lines(entries: &[TranscriptEntry]) -> Vec<String> {
    entries
        .iter()
        .map(|entry| {
            let side = match entry.direction {
                Direction::Prover => "prover",
                Direction::Verifier => "verifier",
            };
            format!("{side} {}: {}", entry.label, entry.value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merkle::hash_leaf;

    fn seeded() -> Channel {
        let mut channel = Channel::new();
        channel.send("root", hash_leaf(FieldElement::new(1)), Mix::Yes);
        channel
    }

    #[test]
    fn identical_transcripts_give_identical_randomness() {
        let mut a = seeded();
        let mut b = seeded();
        for i in 0..5 {
            let label = format!("challenge #{i}");
            assert_eq!(
                a.receive_random_field_element(&label).unwrap(),
                b.receive_random_field_element(&label).unwrap()
            );
        }
        assert_eq!(a.log(), b.log());
    }

    #[test]
    fn repeated_draws_differ() {
        let mut channel = seeded();
        let first = channel.receive_random_field_element("a").unwrap();
        let second = channel.receive_random_field_element("b").unwrap();
        assert_ne!(first, second);
        assert_eq!(channel.draws(), 2);
    }

    #[test]
    fn mixed_messages_bind_randomness() {
        let mut a = seeded();
        let mut b = seeded();
        a.send("x", FieldElement::new(5), Mix::Yes);
        b.send("x", FieldElement::new(6), Mix::Yes);
        assert_ne!(
            a.receive_random_field_element("c").unwrap(),
            b.receive_random_field_element("c").unwrap()
        );
    }

    #[test]
    fn unmixed_messages_are_logged_only() {
        let mut a = seeded();
        let mut b = seeded();
        b.send("answer", FieldElement::new(77), Mix::No);
        assert_eq!(
            a.receive_random_field_element("c").unwrap(),
            b.receive_random_field_element("c").unwrap()
        );
        assert_eq!(b.log().len(), a.log().len() + 1);
    }

    #[test]
    fn randomness_requires_a_prior_commitment() {
        let mut channel = Channel::new();
        assert!(matches!(
            channel.receive_random_field_element("too early"),
            Err(StarkError::ProtocolOrder(_))
        ));
        assert!(channel.log().is_empty());
    }

    #[test]
    fn random_int_respects_bounds() {
        let mut channel = seeded();
        for _ in 0..200 {
            let v = channel.receive_random_int(10, 17, "q").unwrap();
            assert!((10..=17).contains(&v));
        }
        assert_eq!(channel.receive_random_int(3, 3, "fixed").unwrap(), 3);
        assert!(matches!(
            channel.receive_random_int(4, 3, "bad"),
            Err(StarkError::InvalidRange { low: 4, high: 3 })
        ));
    }

    #[test]
    fn transcript_lines_render_direction_and_label() {
        let mut channel = seeded();
        channel.send("path", vec![hash_leaf(FieldElement::ONE)], Mix::No);
        let beta = channel.receive_random_field_element("beta").unwrap();
        let lines = channel.transcript_lines();
        assert!(lines[0].starts_with("prover root: 0x"));
        assert!(lines[1].starts_with("prover path: 0x"));
        assert_eq!(lines[2], format!("verifier beta: {beta}"));
    }

    #[test]
    fn integers_are_messages() {
        let mut a = seeded();
        let mut b = seeded();
        a.send("count", 7u64, Mix::Yes);
        b.send("count", 8u64, Mix::Yes);
        assert_eq!(a.log()[1].value, "7");
        assert_ne!(
            a.receive_random_int(0, u64::MAX, "q").unwrap(),
            b.receive_random_int(0, u64::MAX, "q").unwrap()
        );
        let query = a.receive_random_int(0, 8191, "query").unwrap();
        let entry = a.log().last().unwrap();
        assert_eq!(entry.direction, Direction::Verifier);
        assert_eq!(entry.value, Message::Int(query).render());
    }
}
