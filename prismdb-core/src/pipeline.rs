//! Batch indexing pipeline: encode, fuse, add, then save once.
//!
//! The pipeline walks a dataset directory laid out as:
//! ```text
//! <data_dir>/dataset.json        JSON array of DatasetRecord
//! <data_dir>/images/<image_name> image bytes handed to the image encoder
//! ```
//! Encoders are external; they are plugged in through [`ImageEncoder`] and
//! [`TextEncoder`]. A bad record is logged and skipped; it never aborts the
//! batch.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::collection::IndexedCollection;
use crate::error::{Error, Result};
use crate::fusion::FusionCombiner;
use crate::payload::{Payload, Value};
use crate::vector::{Vector, VectorId};

/// Dataset file name inside the data directory.
pub const DATASET_FILE: &str = "dataset.json";
/// Image directory name inside the data directory.
pub const IMAGES_DIR: &str = "images";
/// Snapshot directory name inside the data directory, unless overridden.
pub const DEFAULT_STORE_DIR: &str = "vector_store";
/// Records processed per run, unless overridden.
pub const DEFAULT_MAX_ITEMS: usize = 1000;

/// Turns raw image bytes into an embedding.
pub trait ImageEncoder: Send + Sync {
    fn encode_image(&self, image: &[u8]) -> Result<Vector>;
}

/// Turns text into an embedding in the same space as [`ImageEncoder`].
pub trait TextEncoder: Send + Sync {
    fn encode_text(&self, text: &str) -> Result<Vector>;
}

/// One item of `dataset.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetRecord {
    /// File name under `<data_dir>/images`.
    pub image_name: String,
    /// Free-text description, embedded by the text encoder.
    pub description: String,
    #[serde(default)]
    pub category: Option<String>,
    /// Arbitrary structured attributes, stored as-is.
    #[serde(default)]
    pub attributes: Option<Value>,
}

impl DatasetRecord {
    /// Builds the metadata stored alongside the record's vector.
    fn to_payload(&self, image_path: &Path) -> Payload {
        Payload::new()
            .with_field("text", self.description.as_str())
            .with_field("image_url", image_path.to_string_lossy().into_owned())
            .with_field("category", self.category.clone().unwrap_or_default())
            .with_field(
                "attributes",
                self.attributes
                    .clone()
                    .unwrap_or_else(|| Value::Map(Default::default())),
            )
    }
}

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory holding `dataset.json` and `images/`.
    pub data_dir: PathBuf,
    /// Maximum records to process per run.
    pub max_items: usize,
    /// Snapshot directory; defaults to `<data_dir>/vector_store`.
    pub store_dir: Option<PathBuf>,
}

impl PipelineConfig {
    /// Creates a config for a data directory with default limits.
    pub fn new<P: Into<PathBuf>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.into(),
            max_items: DEFAULT_MAX_ITEMS,
            store_dir: None,
        }
    }

    /// Sets the maximum number of records. Chainable.
    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = max_items;
        self
    }

    /// Sets the snapshot directory. Chainable.
    pub fn with_store_dir<P: Into<PathBuf>>(mut self, store_dir: P) -> Self {
        self.store_dir = Some(store_dir.into());
        self
    }

    pub fn dataset_path(&self) -> PathBuf {
        self.data_dir.join(DATASET_FILE)
    }

    pub fn images_dir(&self) -> PathBuf {
        self.data_dir.join(IMAGES_DIR)
    }

    pub fn store_dir(&self) -> PathBuf {
        self.store_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join(DEFAULT_STORE_DIR))
    }
}

/// Statistics from an indexing run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IndexingStats {
    /// Records attempted.
    pub processed: usize,
    /// Records stored in the collection.
    pub added: usize,
    /// Records skipped because their image is missing.
    pub skipped: usize,
    /// Records that failed to read, encode, fuse or add.
    pub errors: usize,
}

/// Drives encoders and fusion over a dataset into a collection.
pub struct IndexingPipeline<I: ImageEncoder, T: TextEncoder> {
    image_encoder: Arc<I>,
    text_encoder: Arc<T>,
    fusion: FusionCombiner,
    collection: Arc<IndexedCollection>,
    config: PipelineConfig,
}

impl<I: ImageEncoder, T: TextEncoder> IndexingPipeline<I, T> {
    /// Creates a pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] if the fusion dimension differs
    /// from the collection dimension.
    pub fn new(
        image_encoder: Arc<I>,
        text_encoder: Arc<T>,
        fusion: FusionCombiner,
        collection: Arc<IndexedCollection>,
        config: PipelineConfig,
    ) -> Result<Self> {
        if fusion.dimension() != collection.dimension() {
            return Err(Error::DimensionMismatch {
                expected: collection.dimension(),
                got: fusion.dimension(),
            });
        }

        Ok(Self {
            image_encoder,
            text_encoder,
            fusion,
            collection,
            config,
        })
    }

    /// Returns the collection being filled.
    pub fn collection(&self) -> &Arc<IndexedCollection> {
        &self.collection
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Reads and parses `dataset.json`.
    pub fn load_dataset(&self) -> Result<Vec<DatasetRecord>> {
        let path = self.config.dataset_path();
        let bytes = fs::read(&path).map_err(|e| {
            Error::IoError(format!("read dataset {} failed: {}", path.display(), e))
        })?;
        serde_json::from_slice(&bytes).map_err(|e| {
            Error::InvalidInput(format!("parse dataset {} failed: {}", path.display(), e))
        })
    }

    /// Indexes up to `max_items` dataset records, then saves once.
    ///
    /// # Errors
    ///
    /// Fails only if the dataset cannot be loaded or the final save fails.
    /// Per-record failures are logged and counted in the returned stats.
    pub fn run(&self) -> Result<IndexingStats> {
        let records = self.load_dataset()?;
        let limit = records.len().min(self.config.max_items);

        info!(
            total = records.len(),
            limit,
            dataset = %self.config.dataset_path().display(),
            "indexing dataset"
        );

        let stats = self.index_records(&records[..limit]);

        info!(
            processed = stats.processed,
            added = stats.added,
            skipped = stats.skipped,
            errors = stats.errors,
            "indexing finished"
        );

        self.collection.save(self.config.store_dir())?;
        Ok(stats)
    }

    /// Indexes records without loading a dataset or saving.
    pub fn index_records(&self, records: &[DatasetRecord]) -> IndexingStats {
        let mut stats = IndexingStats::default();

        for record in records {
            stats.processed += 1;
            match self.index_record(record) {
                Ok(Some(id)) => {
                    debug!(id, image = %record.image_name, "record indexed");
                    stats.added += 1;
                }
                Ok(None) => stats.skipped += 1,
                Err(e) => {
                    warn!(image = %record.image_name, error = %e, "failed to index record");
                    stats.errors += 1;
                }
            }
        }

        stats
    }

    /// Indexes one record. Returns `Ok(None)` if its image is missing.
    fn index_record(&self, record: &DatasetRecord) -> Result<Option<VectorId>> {
        let image_path = self.config.images_dir().join(&record.image_name);
        if !image_path.is_file() {
            warn!(path = %image_path.display(), "image not found, skipping");
            return Ok(None);
        }

        let image = fs::read(&image_path)
            .map_err(|e| Error::IoError(format!("read {} failed: {}", image_path.display(), e)))?;

        let image_embedding = self.image_encoder.encode_image(&image)?;
        let text_embedding = self.text_encoder.encode_text(&record.description)?;

        let combined = self.fusion.combine(
            Some(image_embedding.as_slice()),
            Some(text_embedding.as_slice()),
        )?;

        let id = self
            .collection
            .add(combined, record.to_payload(&image_path))?;
        Ok(Some(id))
    }
}
