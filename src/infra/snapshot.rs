// ============================================================
// Layer 6 — Snapshot Codec
// ============================================================
// Persists a ResultStore's sample list and records to one file.
//
// File layout:
//   bytes 0..4   magic  b"PRES"
//   bytes 4..6   format version, u16 little-endian
//   bytes 6..    bincode (standard config) of
//                { samples: Vec<S>, records: Vec<PredictionRecord> }
//
// Readers accept every version up to FORMAT_VERSION. Writers go
// through a temp file in the destination directory and rename it
// over the target, so an existing snapshot is either fully
// replaced or left alone.

use std::{
    fs,
    io::Write,
    path::Path,
};

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::domain::prediction::PredictionRecord;
use crate::error::{Error, Result};

/// Leading bytes of every snapshot file.
pub const MAGIC: &[u8; 4] = b"PRES";

/// Version written by this build.
pub const FORMAT_VERSION: u16 = 1;

const HEADER_LEN: usize = MAGIC.len() + 2;

#[derive(Serialize)]
struct SnapshotRef<'a, S> {
    samples: &'a [S],
    records: &'a [PredictionRecord],
}

#[derive(Deserialize)]
struct SnapshotOwned<S> {
    samples: Vec<S>,
    records: Vec<PredictionRecord>,
}

/// Encode samples and records into snapshot bytes.
pub fn encode<S: Serialize>(samples: &[S], records: &[PredictionRecord]) -> Result<Vec<u8>> {
    let body = bincode::serde::encode_to_vec(
        SnapshotRef { samples, records },
        bincode::config::standard(),
    )
    .map_err(|e| Error::CorruptData(format!("cannot encode snapshot: {e}")))?;

    let mut bytes = Vec::with_capacity(HEADER_LEN + body.len());
    bytes.extend_from_slice(MAGIC);
    bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    bytes.extend_from_slice(&body);
    Ok(bytes)
}

/// Decode snapshot bytes back into samples and records.
pub fn decode<S: DeserializeOwned>(bytes: &[u8]) -> Result<(Vec<S>, Vec<PredictionRecord>)> {
    if bytes.len() < HEADER_LEN {
        return Err(Error::CorruptData(format!(
            "file too short for header ({} bytes)",
            bytes.len()
        )));
    }
    if &bytes[..MAGIC.len()] != MAGIC {
        return Err(Error::CorruptData("bad magic bytes".to_string()));
    }

    let version = u16::from_le_bytes([bytes[4], bytes[5]]);
    if version == 0 || version > FORMAT_VERSION {
        return Err(Error::UnsupportedVersion {
            found:     version,
            supported: FORMAT_VERSION,
        });
    }

    let (snap, read): (SnapshotOwned<S>, usize) =
        bincode::serde::decode_from_slice(&bytes[HEADER_LEN..], bincode::config::standard())
            .map_err(|e| Error::CorruptData(e.to_string()))?;

    let trailing = bytes.len() - HEADER_LEN - read;
    if trailing != 0 {
        return Err(Error::CorruptData(format!("{trailing} trailing bytes after snapshot body")));
    }

    Ok((snap.samples, snap.records))
}

/// Write a snapshot to `path`, replacing any existing file atomically.
pub fn write<S: Serialize>(path: &Path, samples: &[S], records: &[PredictionRecord]) -> Result<()> {
    let bytes = encode(samples, records)?;

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| Error::io(dir, e))?;
    tmp.write_all(&bytes).map_err(|e| Error::io(tmp.path(), e))?;
    tmp.as_file().sync_all().map_err(|e| Error::io(tmp.path(), e))?;
    tmp.persist(path).map_err(|e| Error::io(path, e.error))?;

    tracing::debug!(
        "Wrote snapshot '{}' ({} samples, {} records, {} bytes)",
        path.display(),
        samples.len(),
        records.len(),
        bytes.len(),
    );
    Ok(())
}

/// Read a snapshot from `path`.
pub fn read<S: DeserializeOwned>(path: &Path) -> Result<(Vec<S>, Vec<PredictionRecord>)> {
    let bytes = fs::read(path).map_err(|e| Error::io(path, e))?;
    decode(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sample::Sample;

    fn record(idx: usize) -> PredictionRecord {
        PredictionRecord::new(idx, &[0.9, 0.0, 0.1], &[0.2; 10], &[0.0; 72], &[[0.1, 0.2, 0.3]])
    }

    #[test]
    fn test_header_layout() {
        let bytes = encode::<Sample>(&[], &[]).unwrap();
        assert_eq!(&bytes[..4], MAGIC);
        assert_eq!(u16::from_le_bytes([bytes[4], bytes[5]]), FORMAT_VERSION);
    }

    #[test]
    fn test_rejects_bad_magic() {
        let mut bytes = encode(&[Sample::new("a.jpg")], &[record(0)]).unwrap();
        bytes[0] = b'X';
        assert!(matches!(decode::<Sample>(&bytes), Err(Error::CorruptData(_))));
    }

    #[test]
    fn test_rejects_newer_version() {
        let mut bytes = encode(&[Sample::new("a.jpg")], &[record(0)]).unwrap();
        bytes[4..6].copy_from_slice(&(FORMAT_VERSION + 1).to_le_bytes());
        assert!(matches!(
            decode::<Sample>(&bytes),
            Err(Error::UnsupportedVersion { found, .. }) if found == FORMAT_VERSION + 1
        ));
    }

    #[test]
    fn test_rejects_truncated_body() {
        let bytes = encode(&[Sample::new("a.jpg")], &[record(0), record(0)]).unwrap();
        let cut   = &bytes[..bytes.len() - 5];
        assert!(matches!(decode::<Sample>(cut), Err(Error::CorruptData(_))));
    }

    #[test]
    fn test_rejects_short_file() {
        assert!(matches!(decode::<Sample>(b"PRE"), Err(Error::CorruptData(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let res = read::<Sample>(&dir.path().join("nope.snap"));
        assert!(matches!(res, Err(Error::Io { .. })));
    }

    #[test]
    fn test_write_replaces_existing_file() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("eval_result.snap");

        write(&path, &[Sample::new("a.jpg")], &[record(0)]).unwrap();
        write(&path, &[Sample::new("b.jpg")], &[record(0), record(0)]).unwrap();

        let (samples, records) = read::<Sample>(&path).unwrap();
        assert_eq!(samples, vec![Sample::new("b.jpg")]);
        assert_eq!(records.len(), 2);

        // Only the snapshot itself remains, no stray temp files
        let entries = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }
}
