//! Persistence of a built roadmap.
//!
//! A roadmap is stored next to the metadata of the map it was built from
//! (origin, resolution and segment count), inside a directory named after a
//! content hash of the occupancy grid. Rebuilding can be skipped whenever an
//! archive exists for the hash of the current map.
//!
//! ```text
//!   <root>/
//!     00000000deadbeef/
//!       graph.json.gz
//! ```

use crate::{CodecError, Segment, SegmentId};

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use geo::{Coord, LineString};
use log::{debug, info};
use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};

use std::fs::File;
use std::hash::Hasher;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointRecord {
    pub x: f64,
    pub y: f64,
}

impl From<Coord> for PointRecord {
    fn from(value: Coord) -> Self {
        Self {
            x: value.x,
            y: value.y,
        }
    }
}

impl From<PointRecord> for Coord {
    fn from(value: PointRecord) -> Self {
        Coord {
            x: value.x,
            y: value.y,
        }
    }
}

/// Metadata of the map a roadmap was built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphInfo {
    pub origin: PointRecord,
    pub resolution: f64,
    pub segment_count: usize,
}

/// Flat representation of a [`Segment`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentRecord {
    pub id: SegmentId,
    pub predecessors: Vec<SegmentId>,
    pub successors: Vec<SegmentId>,
    pub min_path_space: f64,
    pub points: Vec<PointRecord>,
}

impl From<&Segment> for SegmentRecord {
    fn from(segment: &Segment) -> Self {
        Self {
            id: segment.id(),
            predecessors: segment.predecessors().to_vec(),
            successors: segment.successors().to_vec(),
            min_path_space: segment.min_path_space(),
            points: segment.path().0.iter().map(|c| PointRecord::from(*c)).collect(),
        }
    }
}

impl TryFrom<SegmentRecord> for Segment {
    type Error = CodecError;

    fn try_from(record: SegmentRecord) -> Result<Self, Self::Error> {
        let path = record.points.into_iter().map(Coord::from).collect::<LineString>();

        Ok(Segment::new(record.id, path, record.min_path_space)?
            .with_links(record.predecessors, record.successors))
    }
}

/// A roadmap together with the metadata of its source map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphArchive {
    pub info: GraphInfo,
    pub segments: Vec<SegmentRecord>,
}

impl GraphArchive {
    pub fn new<'a>(
        segments: impl IntoIterator<Item = &'a Segment>,
        origin: Coord,
        resolution: f64,
    ) -> Self {
        let segments = segments
            .into_iter()
            .map(SegmentRecord::from)
            .collect::<Vec<_>>();

        Self {
            info: GraphInfo {
                origin: origin.into(),
                resolution,
                segment_count: segments.len(),
            },
            segments,
        }
    }

    /// Rebuilds the stored segments, in their stored order.
    pub fn into_segments(self) -> Result<Vec<Segment>, CodecError> {
        self.validate()?;
        self.segments.into_iter().map(Segment::try_from).collect()
    }

    pub fn validate(&self) -> Result<(), CodecError> {
        if self.info.segment_count != self.segments.len() {
            return Err(CodecError::Inconsistent(format!(
                "expected {} segments, found {}",
                self.info.segment_count,
                self.segments.len()
            )));
        }

        Ok(())
    }
}

/// Saves and loads [`GraphArchive`]s below a root directory.
#[derive(Debug, Clone)]
pub struct Serializer {
    root: PathBuf,
}

impl Serializer {
    pub const FILE_NAME: &'static str = "graph.json.gz";

    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Content hash of an occupancy grid together with its placement.
    ///
    /// Two maps only share a hash if their cells, origin and resolution
    /// are identical.
    pub fn hash(map: &[i8], origin: Coord, resolution: f64) -> u64 {
        let mut hasher = FxHasher::default();
        hasher.write_usize(map.len());
        map.iter().for_each(|cell| hasher.write_i8(*cell));
        hasher.write_u64(origin.x.to_bits());
        hasher.write_u64(origin.y.to_bits());
        hasher.write_u64(resolution.to_bits());
        hasher.finish()
    }

    fn file(&self, hash: u64) -> PathBuf {
        self.root.join(format!("{hash:016x}")).join(Self::FILE_NAME)
    }

    pub fn exists(&self, hash: u64) -> bool {
        self.file(hash).is_file()
    }

    /// Writes the archive, replacing any previous archive for this hash.
    pub fn save(&self, hash: u64, archive: &GraphArchive) -> Result<PathBuf, CodecError> {
        archive.validate()?;

        let file = self.file(hash);
        if let Some(parent) = file.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let writer = BufWriter::new(File::create(&file)?);
        let mut encoder = GzEncoder::new(writer, Compression::default());
        serde_json::to_writer(&mut encoder, archive)?;
        encoder.finish()?.flush()?;

        info!(
            "Saved roadmap of {} segments to {}",
            archive.info.segment_count,
            file.display()
        );

        Ok(file)
    }

    /// Reads the archive stored for this hash, if any.
    pub fn load(&self, hash: u64) -> Result<Option<GraphArchive>, CodecError> {
        let file = self.file(hash);
        if !file.is_file() {
            debug!("No roadmap archived for {hash:016x}");
            return Ok(None);
        }

        let decoder = GzDecoder::new(BufReader::new(File::open(&file)?));
        let archive: GraphArchive = serde_json::from_reader(decoder)?;
        archive.validate()?;

        debug!(
            "Loaded roadmap of {} segments from {}",
            archive.info.segment_count,
            file.display()
        );

        Ok(Some(archive))
    }
}
