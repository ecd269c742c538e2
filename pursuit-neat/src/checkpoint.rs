//! Durable snapshots of evolutionary state.
//!
//! An artifact is the magic bytes `PNCK`, a little-endian
//! `u32` format version, and the lz4-compressed bincode
//! encoding of the saved value. Artifacts are named
//! `checkpoint-<generation>`, and only the most recent
//! few are kept in a directory.
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const MAGIC: &[u8; 4] = b"PNCK";
/// Version of the artifact layout written by this crate.
pub const FORMAT_VERSION: u32 = 1;
const PREFIX: &str = "checkpoint-";
const HEADER_LEN: usize = MAGIC.len() + 4;

/// Failures to save or restore a checkpoint.
#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("checkpoint i/o failed on {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to encode checkpoint: {0}")]
    Encode(String),
    #[error("corrupt checkpoint, failed to decode: {0}")]
    Decode(String),
    #[error("corrupt checkpoint, failed to decompress")]
    Decompress(#[from] lz4_flex::block::DecompressError),
    #[error("{0:?} is not a checkpoint artifact")]
    UnrecognizedArtifact(PathBuf),
    #[error("checkpoint format version {found} is not supported (expected {expected})")]
    IncompatibleVersion { found: u32, expected: u32 },
    #[error("no checkpoint found in {0:?}")]
    NotFound(PathBuf),
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> CheckpointError + '_ {
    move |source| CheckpointError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Saves numbered checkpoints to a directory at a
/// fixed generation interval, keeping only the newest.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Checkpointer {
    directory: PathBuf,
    interval: usize,
    retained: usize,
    last_saved_generation: usize,
}

impl Checkpointer {
    /// Returns a checkpointer saving every 5 generations
    /// to `directory`, keeping at most 3 artifacts.
    pub fn new(directory: impl Into<PathBuf>) -> Checkpointer {
        Checkpointer {
            directory: directory.into(),
            interval: 5,
            retained: 3,
            last_saved_generation: 0,
        }
    }

    /// Returns a default checkpointer continuing
    /// from a checkpoint saved at `generation`.
    pub fn resumed(directory: impl Into<PathBuf>, generation: usize) -> Checkpointer {
        Checkpointer::new(directory).resumed_at(generation)
    }

    /// Counts the next interval from `generation`,
    /// keeping every other setting.
    pub fn resumed_at(mut self, generation: usize) -> Checkpointer {
        self.last_saved_generation = generation;
        self
    }

    /// Sets the number of generations between saves.
    pub fn with_interval(mut self, interval: usize) -> Checkpointer {
        self.interval = interval;
        self
    }

    /// Sets the number of artifacts kept on disk (at least 1).
    pub fn with_retained(mut self, retained: usize) -> Checkpointer {
        self.retained = retained.max(1);
        self
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn last_saved_generation(&self) -> usize {
        self.last_saved_generation
    }

    /// Saves `state` if at least the configured interval has
    /// elapsed since the last save. Returns the artifact's path
    /// if one was written.
    pub fn end_generation<T: Serialize>(
        &mut self,
        state: &T,
        generation: usize,
    ) -> Result<Option<PathBuf>, CheckpointError> {
        if generation.saturating_sub(self.last_saved_generation) >= self.interval {
            self.save(state, generation).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Saves `state` as the checkpoint for `generation`, first
    /// evicting the oldest artifacts so no more than the retained
    /// count remain afterwards. Nothing is evicted if `state`
    /// fails to encode.
    pub fn save<T: Serialize>(
        &mut self,
        state: &T,
        generation: usize,
    ) -> Result<PathBuf, CheckpointError> {
        let bytes = encode(state)?;
        fs::create_dir_all(&self.directory).map_err(io_error(&self.directory))?;

        let existing: Vec<(usize, PathBuf)> = list_checkpoints(&self.directory)?
            .into_iter()
            .filter(|(g, _)| *g != generation)
            .collect();
        let excess = (existing.len() + 1).saturating_sub(self.retained);
        for (old, path) in &existing[..excess] {
            log::debug!("evicting checkpoint of generation {}", old);
            fs::remove_file(path).map_err(io_error(path))?;
        }

        let path = self.directory.join(format!("{}{}", PREFIX, generation));
        let temp_path = self.directory.join(format!(".{}{}.tmp", PREFIX, generation));
        fs::write(&temp_path, &bytes).map_err(io_error(&temp_path))?;
        fs::rename(&temp_path, &path).map_err(io_error(&path))?;

        log::info!(
            "saved checkpoint {:?} ({} bytes compressed)",
            path,
            bytes.len()
        );
        self.last_saved_generation = generation;
        Ok(path)
    }
}

/// Restores the value saved in the artifact at `path`.
pub fn restore<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, CheckpointError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(io_error(path))?;
    decode(path, &bytes)
}

/// Restores the newest checkpoint in `directory`, along with
/// its generation. Returns `None` if the directory holds no
/// checkpoint or doesn't exist.
pub fn restore_latest<T: DeserializeOwned>(
    directory: impl AsRef<Path>,
) -> Result<Option<(T, usize)>, CheckpointError> {
    let directory = directory.as_ref();
    if !directory.exists() {
        return Ok(None);
    }
    match list_checkpoints(directory)?.pop() {
        Some((generation, path)) => {
            log::info!("restoring checkpoint {:?}", path);
            restore(&path).map(|state| Some((state, generation)))
        }
        None => Ok(None),
    }
}

/// Returns the checkpoints in `directory` as
/// `(generation, path)`, oldest first. Files not
/// named like a checkpoint are ignored.
pub fn list_checkpoints(directory: &Path) -> Result<Vec<(usize, PathBuf)>, CheckpointError> {
    let mut checkpoints = vec![];
    for entry in fs::read_dir(directory).map_err(io_error(directory))? {
        let entry = entry.map_err(io_error(directory))?;
        let name = entry.file_name();
        let generation = name
            .to_str()
            .and_then(|name| name.strip_prefix(PREFIX))
            .and_then(|suffix| suffix.parse::<usize>().ok());
        if let Some(generation) = generation {
            checkpoints.push((generation, entry.path()));
        }
    }
    checkpoints.sort_by_key(|(generation, _)| *generation);
    Ok(checkpoints)
}

fn encode<T: Serialize>(state: &T) -> Result<Vec<u8>, CheckpointError> {
    let serialized = bincode_next::serde::encode_to_vec(state, bincode_next::config::standard())
        .map_err(|e| CheckpointError::Encode(e.to_string()))?;
    let compressed = lz4_flex::compress_prepend_size(&serialized);

    let mut bytes = Vec::with_capacity(HEADER_LEN + compressed.len());
    bytes.extend_from_slice(MAGIC);
    bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    bytes.extend_from_slice(&compressed);
    Ok(bytes)
}

fn decode<T: DeserializeOwned>(path: &Path, bytes: &[u8]) -> Result<T, CheckpointError> {
    if bytes.len() < HEADER_LEN || &bytes[..MAGIC.len()] != MAGIC {
        return Err(CheckpointError::UnrecognizedArtifact(path.to_path_buf()));
    }
    let mut version = [0; 4];
    version.copy_from_slice(&bytes[MAGIC.len()..HEADER_LEN]);
    let found = u32::from_le_bytes(version);
    if found != FORMAT_VERSION {
        return Err(CheckpointError::IncompatibleVersion {
            found,
            expected: FORMAT_VERSION,
        });
    }

    let serialized = lz4_flex::decompress_size_prepended(&bytes[HEADER_LEN..])?;
    let (state, _): (T, usize) =
        bincode_next::serde::decode_from_slice(&serialized, bincode_next::config::standard())
            .map_err(|e| CheckpointError::Decode(e.to_string()))?;
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct State {
        generation: usize,
        values: Vec<f32>,
    }

    fn state(generation: usize) -> State {
        State {
            generation,
            values: vec![1.5, -2.0],
        }
    }

    fn generations(directory: &Path) -> Vec<usize> {
        list_checkpoints(directory)
            .unwrap()
            .into_iter()
            .map(|(g, _)| g)
            .collect()
    }

    #[test]
    fn save_then_restore() {
        let dir = tempfile::tempdir().unwrap();
        let mut checkpointer = Checkpointer::new(dir.path());
        let path = checkpointer.save(&state(7), 7).unwrap();

        assert_eq!(path.file_name().unwrap(), "checkpoint-7");
        assert_eq!(restore::<State>(&path).unwrap(), state(7));
        assert_eq!(checkpointer.last_saved_generation(), 7);
    }

    #[test]
    fn retains_three_newest() {
        let dir = tempfile::tempdir().unwrap();
        let mut checkpointer = Checkpointer::new(dir.path());
        for generation in [2, 9, 10, 11, 30] {
            checkpointer.save(&state(generation), generation).unwrap();
        }
        assert_eq!(generations(dir.path()), vec![10, 11, 30]);
    }

    #[test]
    fn sorts_numerically_and_ignores_strangers() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("notes.txt"), "hello").unwrap();
        fs::write(dir.path().join("checkpoint-x"), "hello").unwrap();
        let mut checkpointer = Checkpointer::new(dir.path());
        checkpointer.save(&state(9), 9).unwrap();
        checkpointer.save(&state(10), 10).unwrap();

        assert_eq!(generations(dir.path()), vec![9, 10]);
        let (latest, generation) = restore_latest::<State>(dir.path()).unwrap().unwrap();
        assert_eq!((latest, generation), (state(10), 10));
    }

    #[test]
    fn saves_at_interval() {
        let dir = tempfile::tempdir().unwrap();
        let mut checkpointer = Checkpointer::new(dir.path());
        let saved: Vec<usize> = (2..=12)
            .filter(|g| checkpointer.end_generation(&state(*g), *g).unwrap().is_some())
            .collect();
        assert_eq!(saved, vec![5, 10]);

        let mut resumed = Checkpointer::resumed(dir.path(), 10);
        assert!(resumed.end_generation(&state(14), 14).unwrap().is_none());
        assert!(resumed.end_generation(&state(15), 15).unwrap().is_some());
    }

    struct Unencodable;

    impl Serialize for Unencodable {
        fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("no encoding"))
        }
    }

    #[test]
    fn failed_save_keeps_previous_checkpoints() {
        let dir = tempfile::tempdir().unwrap();
        let mut checkpointer = Checkpointer::new(dir.path());
        for generation in [5, 10, 15] {
            checkpointer.save(&state(generation), generation).unwrap();
        }
        assert!(matches!(
            checkpointer.save(&Unencodable, 20),
            Err(CheckpointError::Encode(_))
        ));
        assert_eq!(generations(dir.path()), vec![5, 10, 15]);
        assert_eq!(checkpointer.last_saved_generation(), 15);
    }

    #[test]
    fn missing_directory_has_no_latest() {
        let dir = tempfile::tempdir().unwrap();
        let restored = restore_latest::<State>(dir.path().join("absent")).unwrap();
        assert!(restored.is_none());
    }

    #[test]
    fn rejects_foreign_and_future_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let foreign = dir.path().join("checkpoint-1");
        fs::write(&foreign, b"not a checkpoint").unwrap();
        assert!(matches!(
            restore::<State>(&foreign),
            Err(CheckpointError::UnrecognizedArtifact(_))
        ));

        let mut future = b"PNCK".to_vec();
        future.extend_from_slice(&(FORMAT_VERSION + 1).to_le_bytes());
        let path = dir.path().join("checkpoint-2");
        fs::write(&path, future).unwrap();
        assert!(matches!(
            restore::<State>(&path),
            Err(CheckpointError::IncompatibleVersion { found, .. }) if found == FORMAT_VERSION + 1
        ));
    }

    #[test]
    fn rejects_truncated_payload() {
        let dir = tempfile::tempdir().unwrap();
        let path = Checkpointer::new(dir.path()).save(&state(3), 3).unwrap();
        let bytes = fs::read(&path).unwrap();
        fs::write(&path, &bytes[..bytes.len() - 4]).unwrap();
        assert!(restore::<State>(&path).is_err());
    }
}
