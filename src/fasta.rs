//! FASTA file reader.
//!
//! This module handles reading the sequence to display. It supports both
//! single-line and multi-line FASTA records, and plain files holding nothing
//! but residues.
//!
//! ## FASTA Format
//!
//! ```text
//! >sequence_identifier optional description
//! ACGTACGTACGT...
//! >another_sequence
//! TGCATGCATGCA...
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use thiserror::Error;

use crate::model::Sequence;

/// Errors that can occur while reading a sequence file.
#[derive(Error, Debug)]
pub enum FastaError {
    #[error("Failed to open file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Empty sequence file")]
    EmptyFile,

    #[error("Invalid FASTA format: {0}")]
    InvalidFormat(String),

    #[error("Sequence without header at line {0}")]
    SequenceWithoutHeader(usize),

    #[error("Record {requested} requested but the file holds {available}")]
    NoSuchRecord { requested: usize, available: usize },
}

/// Result type for FASTA operations.
pub type FastaResult<T> = Result<T, FastaError>;

/// Parses FASTA content from a reader.
///
/// This function handles both single-line and multi-line sequences.
pub fn parse_fasta<R: BufRead>(reader: R) -> FastaResult<Vec<Sequence>> {
    let mut sequences = Vec::new();
    let mut current_id: Option<String> = None;
    let mut current_seq = String::new();
    let mut line_number = 0;

    for line_result in reader.lines() {
        line_number += 1;
        let line = line_result?;
        let line = line.trim();

        // Skip empty lines
        if line.is_empty() {
            continue;
        }

        if let Some(header) = line.strip_prefix('>') {
            if let Some(id) = current_id.take() {
                if !current_seq.is_empty() {
                    sequences.push(Sequence::new(id, std::mem::take(&mut current_seq)));
                }
            }

            // Everything after '>' and before the first space is the ID
            let id = header.split_whitespace().next().unwrap_or(header).to_string();
            if id.is_empty() {
                return Err(FastaError::InvalidFormat(format!(
                    "Empty sequence identifier at line {}",
                    line_number
                )));
            }

            current_id = Some(id);
            current_seq.clear();
        } else {
            if current_id.is_none() {
                return Err(FastaError::SequenceWithoutHeader(line_number));
            }
            current_seq.push_str(line);
        }
    }

    // Don't forget the last sequence
    if let Some(id) = current_id {
        if !current_seq.is_empty() {
            sequences.push(Sequence::new(id, current_seq));
        }
    }

    if sequences.is_empty() {
        return Err(FastaError::EmptyFile);
    }

    Ok(sequences)
}

/// Parses FASTA content from a string.
pub fn parse_fasta_str(content: &str) -> FastaResult<Vec<Sequence>> {
    parse_fasta(content.as_bytes())
}

/// Reads one sequence from `content`.
///
/// Content whose first non-blank line starts with `>` is FASTA and `record`
/// (0-based) picks the entry; anything else is taken as bare residues named
/// `fallback_id`.
pub fn read_sequence(content: &str, record: usize, fallback_id: &str) -> FastaResult<Sequence> {
    let is_fasta = content
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .is_some_and(|l| l.starts_with('>'));

    if !is_fasta {
        let sequence = Sequence::new(fallback_id, content);
        if sequence.is_empty() {
            return Err(FastaError::EmptyFile);
        }
        return Ok(sequence);
    }

    let mut sequences = parse_fasta_str(content)?;
    let available = sequences.len();
    if record >= available {
        return Err(FastaError::NoSuchRecord {
            requested: record + 1,
            available,
        });
    }
    Ok(sequences.swap_remove(record))
}

/// Reads one sequence from a file, see [`read_sequence`].
///
/// # Examples
///
/// ```no_run
/// use seqview::fasta::read_sequence_file;
///
/// let sequence = read_sequence_file("P12345.fasta", 0).unwrap();
/// println!("Loaded {} ({} residues)", sequence.id, sequence.len());
/// ```
pub fn read_sequence_file<P: AsRef<Path>>(path: P, record: usize) -> FastaResult<Sequence> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut content = String::new();
    reader.read_to_string(&mut content)?;

    let fallback_id = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    read_sequence(&content, record, &fallback_id)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_parse_simple_fasta() {
        let content = ">seq1\nACGT\n>seq2\nTGCA\n";
        let sequences = parse_fasta_str(content).unwrap();

        assert_eq!(sequences.len(), 2);
        assert_eq!(sequences[0].id, "seq1");
        assert_eq!(sequences[0].as_str(), "ACGT");
        assert_eq!(sequences[1].id, "seq2");
        assert_eq!(sequences[1].as_str(), "TGCA");
    }

    #[test]
    fn test_parse_multiline_sequence() {
        let content = ">seq1\nACGT\nTGCA\nAAAA\n";
        let sequences = parse_fasta_str(content).unwrap();
        assert_eq!(sequences[0].as_str(), "ACGTTGCAAAAA");
    }

    #[test]
    fn test_parse_with_description() {
        let content = ">sp|P12345|AATM_RABIT Aspartate aminotransferase\nMALLH\n";
        let sequences = parse_fasta_str(content).unwrap();
        assert_eq!(sequences[0].id, "sp|P12345|AATM_RABIT");
    }

    #[test]
    fn test_empty_file() {
        assert!(matches!(parse_fasta_str(""), Err(FastaError::EmptyFile)));
        assert!(matches!(read_sequence("  \n", 0, "x"), Err(FastaError::EmptyFile)));
    }

    #[test]
    fn test_sequence_without_header() {
        let content = "ACGT\n>seq1\nTGCA\n";
        assert!(matches!(parse_fasta_str(content), Err(FastaError::SequenceWithoutHeader(1))));
    }

    #[test]
    fn test_empty_identifier() {
        let content = ">seq1\nTGCA\n>\nAC\n";
        assert!(matches!(parse_fasta_str(content), Err(FastaError::InvalidFormat(_))));
    }

    #[test]
    fn test_read_record() {
        let content = "\n>seq1\nACGT\n>seq2\nTGCA\n";
        assert_eq!(read_sequence(content, 1, "x").unwrap().id, "seq2");
        assert!(matches!(
            read_sequence(content, 2, "x"),
            Err(FastaError::NoSuchRecord { requested: 3, available: 2 })
        ));
    }

    #[test]
    fn test_read_bare_residues() {
        let sequence = read_sequence("MKTAYIAK\nQRQISFVK\n", 0, "protein").unwrap();
        assert_eq!(sequence.id, "protein");
        assert_eq!(sequence.as_str(), "MKTAYIAKQRQISFVK");
    }

    #[test]
    fn test_read_file_uses_stem_as_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("insulin.txt");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "MALWMRLLPLLALLALWGPDPAAA").unwrap();

        let sequence = read_sequence_file(&path, 0).unwrap();
        assert_eq!(sequence.id, "insulin");
        assert_eq!(sequence.len(), 24);
    }
}
