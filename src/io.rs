//! Output files of a proving run.
//!
//! A run leaves two artifacts: the rendered transcript, one
//! `"<direction> <label>: <value>"` line per message in
//! `<dir>/transcript_0000.txt`, and the compact record as pretty JSON with
//! digests written as bare integers.

use std::fs::{create_dir_all, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::channel::{render_lines, TranscriptEntry};
use crate::proof::CompactProof;

const TRANSCRIPT_PREFIX: &str = "transcript";

/// Writes `lines` to `base_dir/<prefix>_<index>.txt`, one per line.
pub fn write_text_series(
    base_dir: impl AsRef<Path>,
    prefix: &str,
    index: usize,
    lines: &[String],
) -> io::Result<PathBuf> {
    let dir = base_dir.as_ref();
    create_dir_all(dir)?;
    let path = dir.join(format!("{prefix}_{index:04}.txt"));
    let mut writer = BufWriter::new(File::create(&path)?);
    for line in lines {
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(path)
}

/// Writes the transcript of run `index` under `base_dir`.
pub fn write_transcript(
    base_dir: impl AsRef<Path>,
    index: usize,
    transcript: &[TranscriptEntry],
) -> io::Result<PathBuf> {
    write_text_series(base_dir, TRANSCRIPT_PREFIX, index, &render_lines(transcript))
}

/// Writes the compact record to `path` as pretty-printed JSON.
pub fn write_proof_json(path: impl AsRef<Path>, proof: &CompactProof) -> io::Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, proof)?;
    writer.write_all(b"\n")?;
    writer.flush()
}
