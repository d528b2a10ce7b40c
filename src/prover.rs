//! FibonacciSq STARK prover.
//!
//! The pipeline runs strictly in protocol order, threading one [`Channel`]
//! through every stage:
//!
//! 1. generate the trace and the domains;
//! 2. interpolate the trace, commit to its coset evaluations and mix the root;
//! 3. build the constraint quotients and draw the composition coefficients;
//! 4. commit to the composition polynomial and run the FRI folding loop;
//! 5. draw the query index and open every commitment around it.
//!
//! Every stage returns a `Result`; the first failure aborts the run and no
//! partial proof is produced.

use std::fmt;
use std::time::{Duration, Instant};

use crate::channel::{Channel, Mix};
use crate::config::ProverConfig;
use crate::constraints::Constraints;
use crate::domain::{evaluate_over, left_coset, subgroup};
use crate::error::StarkResult;
use crate::field::FieldElement;
use crate::fri::{FriCommitment, FriLayer};
use crate::merkle::MerkleTree;
use crate::polynomial::Polynomial;
use crate::proof::{CompactProof, FriLayerProof, Opening, Proof};
use crate::trace::FibSquare;

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Trace generation and domain construction.
    Setup,
    /// Interpolation and trace commitment.
    TraceCommitment,
    /// Constraint quotients and composition polynomial.
    Composition,
    /// FRI folding and layer commitments.
    Fri,
    /// Query selection and decommitment.
    Decommitment,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Setup => "setup",
            Stage::TraceCommitment => "trace commitment",
            Stage::Composition => "composition",
            Stage::Fri => "fri",
            Stage::Decommitment => "decommitment",
        };
        f.pad(name)
    }
}

/// Timing information collected while producing a proof.
#[derive(Debug, Clone)]
pub struct ProofStats {
    /// Total wall-clock time taken to produce the proof.
    pub total_duration: Duration,
    /// Duration of each stage, in execution order.
    pub stage_durations: Vec<(Stage, Duration)>,
    /// Number of committed FRI layers, composition layer included.
    pub fri_layers: usize,
}

struct StageTimer {
    started: Instant,
    durations: Vec<(Stage, Duration)>,
}

impl StageTimer {
    fn new() -> Self {
        Self {
            started: Instant::now(),
            durations: Vec::new(),
        }
    }

    fn run<T>(&mut self, stage: Stage, f: impl FnOnce() -> StarkResult<T>) -> StarkResult<T> {
        let start = Instant::now();
        let out = f();
        let elapsed = start.elapsed();
        log::debug!("stage {stage} finished in {:.3}s", elapsed.as_secs_f64());
        self.durations.push((stage, elapsed));
        out
    }
}

/// Trace polynomial committed over the extended domain.
struct TraceCommitment {
    polynomial: Polynomial,
    evaluations: Vec<FieldElement>,
    tree: MerkleTree,
}

impl TraceCommitment {
    /// Interpolates `trace` over the leading points of `domain` and commits
    /// to its evaluations over `extended`.
    fn build(
        trace: &[FieldElement],
        domain: &[FieldElement],
        extended: &[FieldElement],
        parallel_threshold: usize,
    ) -> StarkResult<Self> {
        let polynomial = Polynomial::interpolate(&domain[..trace.len()], trace)?;
        let evaluations = evaluate_over(&polynomial, extended, parallel_threshold);
        let tree = MerkleTree::build(&evaluations);
        log::debug!("trace polynomial degree {:?}, root {}", polynomial.degree(), tree.root());
        Ok(Self {
            polynomial,
            evaluations,
            tree,
        })
    }
}

impl Proof {
    /// Produces a proof for the statement described by `config`.
    pub fn prove(config: &ProverConfig) -> StarkResult<Self> {
        Self::prove_with_stats(config).map(|(proof, _)| proof)
    }

    /// Produces a proof together with per-stage timing information.
    pub fn prove_with_stats(config: &ProverConfig) -> StarkResult<(Self, ProofStats)> {
        config.validate()?;
        log::info!(
            "proving FibonacciSq: {} steps, domain {}, blow-up {}",
            config.trace_length,
            config.domain_size,
            config.extension_factor
        );
        let mut timer = StageTimer::new();
        let mut channel = Channel::new();
        let threshold = config.parallel_threshold;

        let (trace, domain, extended) = timer.run(Stage::Setup, || {
            let trace = FibSquare::from_config(config).generate();
            let domain = subgroup(config.domain_size)?;
            let extended = left_coset(config.extended_size())?;
            Ok((trace, domain, extended))
        })?;

        let committed = timer.run(Stage::TraceCommitment, || {
            TraceCommitment::build(&trace, &domain, &extended, threshold)
        })?;
        channel.send("trace polynomial merkle root", committed.tree.root(), Mix::Yes);

        let composition_layer = timer.run(Stage::Composition, || {
            let constraints = Constraints::build(
                &committed.polynomial,
                &domain,
                config.trace_length,
                FieldElement::new(config.first),
                FieldElement::new(config.claimed_output),
            )?;
            let (composition, _) = constraints.compose(&mut channel)?;
            let layer = FriLayer::commit(composition, extended.clone(), threshold);
            channel.send("composition polynomial merkle root", layer.tree.root(), Mix::Yes);
            Ok(layer)
        })?;

        let fri = timer.run(Stage::Fri, || {
            FriCommitment::build(composition_layer, &mut channel, threshold)
        })?;

        let compact = timer.run(Stage::Decommitment, || {
            let last_index = extended.len() as u64 - 1;
            let query_index = channel.receive_random_int(0, last_index, "query")? as usize;
            log::debug!("query index {query_index}");
            decommit_all(&mut channel, config, &committed, &fri, query_index)
        })?;
        channel.send("last FRI polynomial free term", compact.fri_last_layer, Mix::No);

        let stats = ProofStats {
            total_duration: timer.started.elapsed(),
            stage_durations: timer.durations,
            fri_layers: fri.layers.len(),
        };
        log::info!(
            "proof complete in {:.3}s with {} FRI layers",
            stats.total_duration.as_secs_f64(),
            stats.fri_layers
        );
        let proof = Proof {
            transcript: channel.into_log(),
            compact,
        };
        Ok((proof, stats))
    }
}

/// Opens the trace and every non-final FRI layer around `query_index`.
fn decommit_all(
    channel: &mut Channel,
    config: &ProverConfig,
    trace: &TraceCommitment,
    fri: &FriCommitment,
    query_index: usize,
) -> StarkResult<CompactProof> {
    let extended_size = trace.evaluations.len();
    // Consecutive trace steps sit `extension_factor` coset indices apart; the
    // coset is cyclic, so the offsets wrap around.
    let step = |k: usize| (query_index + k * config.extension_factor) % extended_size;
    let evals = [
        decommit(channel, &trace.evaluations, &trace.tree, step(0), "f(x)")?,
        decommit(channel, &trace.evaluations, &trace.tree, step(1), "f(gx)")?,
        decommit(channel, &trace.evaluations, &trace.tree, step(2), "f(ggx)")?,
    ];

    let mut fri_layers = Vec::with_capacity(fri.betas.len());
    for (i, (layer, &beta)) in fri.layers.iter().zip(&fri.betas).enumerate() {
        let len = layer.len();
        let index = query_index % len;
        let sibling_index = (query_index + len / 2) % len;
        let label = format!("cp_{i}");
        let opening = decommit(channel, &layer.evaluations, &layer.tree, index, &label)?;
        let sibling = decommit(
            channel,
            &layer.evaluations,
            &layer.tree,
            sibling_index,
            &format!("{label} sibling"),
        )?;
        fri_layers.push(FriLayerProof {
            root: layer.tree.root(),
            beta,
            opening,
            sibling,
        });
    }

    Ok(CompactProof {
        p_mt_root: trace.tree.root(),
        query_index,
        evals,
        fri_layers,
        fri_last_layer: fri.last_value(),
    })
}

/// Sends the value at `index` and its authentication path, unmixed.
fn decommit(
    channel: &mut Channel,
    evaluations: &[FieldElement],
    tree: &MerkleTree,
    index: usize,
    label: &str,
) -> StarkResult<Opening> {
    let path = tree.authentication_path(index)?;
    let value = evaluations[index];
    channel.send(label, value, Mix::No);
    channel.send(format!("{label} auth"), path.clone(), Mix::No);
    Ok(Opening { value, path })
}
