//! Command-line front end for the FibonacciSq prover.
//!
//! ```text
//! fibsquare [--output <proof.json>] [--transcript <dir>] [--config <config.json>]
//! ```

use std::{env, fs, path::PathBuf};

use fibsquare::{write_proof_json, write_transcript, Proof, ProverConfig};

fn fatal(message: &str) -> ! {
    eprintln!("{message}");
    std::process::exit(1);
}

fn print_help() {
    println!(
        "Usage: fibsquare [--output <proof.json>] [--transcript <dir>] [--config <config.json>]"
    );
    println!("  --output      write the compact proof record (default: stdout)");
    println!("  --transcript  write the transcript to <dir>/transcript_0000.txt");
    println!("  --config      load prover parameters from JSON");
}

#[derive(Default)]
struct Options {
    output: Option<PathBuf>,
    transcript: Option<PathBuf>,
    config: Option<PathBuf>,
}

fn parse_args(args: Vec<String>) -> Options {
    let mut options = Options::default();
    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        let mut value = |flag: &str| {
            iter.next()
                .map(PathBuf::from)
                .unwrap_or_else(|| fatal(&format!("{flag} expects a value")))
        };
        match arg.as_str() {
            "--output" => options.output = Some(value("--output")),
            "--transcript" => options.transcript = Some(value("--transcript")),
            "--config" => options.config = Some(value("--config")),
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            other => fatal(&format!("unknown argument: {other}")),
        }
    }
    options
}

fn load_config(path: Option<&PathBuf>) -> ProverConfig {
    let Some(path) = path else {
        return ProverConfig::default();
    };
    let raw = fs::read_to_string(path)
        .unwrap_or_else(|err| fatal(&format!("failed to read {}: {err}", path.display())));
    ProverConfig::from_json_str(&raw).unwrap_or_else(|err| fatal(&err.to_string()))
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let options = parse_args(env::args().skip(1).collect());
    let config = load_config(options.config.as_ref());
    let (proof, stats) = Proof::prove_with_stats(&config)
        .unwrap_or_else(|err| fatal(&format!("proof failed: {err}")));

    for (stage, duration) in &stats.stage_durations {
        log::info!("{stage:>16}: {:.3}s", duration.as_secs_f64());
    }

    if let Some(dir) = &options.transcript {
        let path = write_transcript(dir, 0, &proof.transcript)
            .unwrap_or_else(|err| fatal(&format!("failed to write transcript: {err}")));
        log::info!("transcript written to {}", path.display());
    }

    match &options.output {
        Some(path) => {
            write_proof_json(path, &proof.compact)
                .unwrap_or_else(|err| fatal(&format!("failed to write proof: {err}")));
            log::info!("proof written to {}", path.display());
        }
        None => {
            let json = proof
                .compact
                .to_json_string()
                .unwrap_or_else(|err| fatal(&err.to_string()));
            println!("{json}");
        }
    }
}
