//! Query output bundling and its binary on-disk form.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::model::timetable::Timetable;
use crate::routing::journey::Journey;

/// The result of one query: the chosen journey plus the metadata needed to
/// interpret it later. Serialized as an opaque binary blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmOutput {
    pub journey: Journey,
    /// Requested departure time, `HH:MM:SS`.
    pub departure_time: String,
    /// Service date of the timetable, `YYYYMMDD`.
    pub date: Option<String>,
    /// Directory of the feed the timetable was generated from.
    pub original_gtfs_dir: Option<PathBuf>,
}

impl AlgorithmOutput {
    /// File name used inside the output directory.
    pub const DEFAULT_FILENAME: &'static str = "algo-output";

    /// Bundles a journey with the timetable's provenance metadata.
    pub fn new(timetable: &Timetable, journey: Journey, departure_time: &str) -> Self {
        AlgorithmOutput {
            journey,
            departure_time: departure_time.to_string(),
            date: timetable.date.clone(),
            original_gtfs_dir: timetable.original_source_dir.clone(),
        }
    }

    /// Writes the output into `output_dir` (created if missing) and returns
    /// the path of the written blob.
    pub fn save_to_dir(&self, output_dir: impl AsRef<Path>) -> Result<PathBuf, Error> {
        let output_dir = output_dir.as_ref();
        fs::create_dir_all(output_dir)?;

        let path = output_dir.join(Self::DEFAULT_FILENAME);
        let bytes = rmp_serde::to_vec(self)?;
        fs::write(&path, bytes)?;
        info!("Wrote algorithm output to {}", path.display());
        Ok(path)
    }

    /// Reads an output blob previously written by [`Self::save_to_dir`].
    pub fn read_from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        debug!("Loading algorithm output from {}", path.display());
        let bytes = fs::read(path)?;
        Ok(rmp_serde::from_slice(&bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::timetable::Time;

    fn output() -> AlgorithmOutput {
        AlgorithmOutput {
            journey: Journey {
                departure_secs: 8 * 3600 as Time,
                legs: Vec::new(),
            },
            departure_time: "08:00:00".to_string(),
            date: Some("20260801".to_string()),
            original_gtfs_dir: Some(PathBuf::from("data/input")),
        }
    }

    #[test]
    fn blob_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = output().save_to_dir(dir.path()).unwrap();
        assert!(path.ends_with(AlgorithmOutput::DEFAULT_FILENAME));

        let restored = AlgorithmOutput::read_from_file(&path).unwrap();
        assert_eq!(restored, output());
    }

    #[test]
    fn serialization_is_reproducible() {
        let a = rmp_serde::to_vec(&output()).unwrap();
        let b = rmp_serde::to_vec(&output()).unwrap();
        assert_eq!(a, b);
    }
}
