//! Runs the indexing pipeline over a generated toy dataset.
//!
//! The encoders here are stand-ins that hash bytes into a small vector;
//! a real deployment plugs in its image and text models instead.
//!
//! Run with: RUST_LOG=debug cargo run --example index_dataset

use std::fs;
use std::sync::Arc;

use prismdb::pipeline::{DATASET_FILE, IMAGES_DIR};
use prismdb::prelude::*;
use prismdb::DEFAULT_ALPHA;
use tracing_subscriber::EnvFilter;

const DIM: usize = 8;

/// Buckets byte values into `DIM` counters.
fn histogram(bytes: &[u8]) -> Vector {
    let mut data = vec![0.0f32; DIM];
    for b in bytes {
        data[*b as usize % DIM] += 1.0;
    }
    let total = bytes.len().max(1) as f32;
    Vector::from_vec(data.into_iter().map(|x| x / total).collect())
}

struct HistogramImageEncoder;

impl ImageEncoder for HistogramImageEncoder {
    fn encode_image(&self, image: &[u8]) -> Result<Vector> {
        if image.is_empty() {
            return Err(Error::Encoding("empty image".into()));
        }
        Ok(histogram(image))
    }
}

struct HistogramTextEncoder;

impl TextEncoder for HistogramTextEncoder {
    fn encode_text(&self, text: &str) -> Result<Vector> {
        Ok(histogram(text.to_lowercase().as_bytes()))
    }
}

fn write_dataset(data_dir: &std::path::Path) -> std::io::Result<()> {
    let images = data_dir.join(IMAGES_DIR);
    fs::create_dir_all(&images)?;

    let records = serde_json::json!([
        {"image_name": "dress.jpg", "description": "Red floral summer dress", "category": "women"},
        {"image_name": "jeans.jpg", "description": "Slim fit blue jeans", "category": "men",
         "attributes": {"size": "32", "material": "denim"}},
        {"image_name": "boots.jpg", "description": "Black leather ankle boots"},
        {"image_name": "missing.jpg", "description": "This image was never downloaded"},
        {"image_name": "empty.jpg", "description": "Zero-byte image fails to encode"}
    ]);
    fs::write(data_dir.join(DATASET_FILE), records.to_string())?;

    fs::write(images.join("dress.jpg"), b"red red floral cotton")?;
    fs::write(images.join("jeans.jpg"), b"blue indigo denim")?;
    fs::write(images.join("boots.jpg"), b"black leather sole")?;
    fs::write(images.join("empty.jpg"), b"")?;
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let data_dir = std::env::temp_dir().join("prismdb_index_dataset");
    let _ = fs::remove_dir_all(&data_dir);
    write_dataset(&data_dir).map_err(|e| Error::IoError(e.to_string()))?;

    let config = PipelineConfig::new(&data_dir).with_max_items(100);
    let collection = Arc::new(IndexedCollection::open_or_create(
        config.store_dir(),
        CollectionConfig::new(DIM),
    )?);

    let pipeline = IndexingPipeline::new(
        Arc::new(HistogramImageEncoder),
        Arc::new(HistogramTextEncoder),
        FusionCombiner::new(DEFAULT_ALPHA, DIM)?,
        Arc::clone(&collection),
        config.clone(),
    )?;

    let stats = pipeline.run()?;
    println!(
        "processed {}, added {}, skipped {}, errors {}",
        stats.processed, stats.added, stats.skipped, stats.errors
    );

    let query = HistogramTextEncoder.encode_text("blue denim")?;
    for result in collection.search(query.as_slice(), 2)? {
        println!(
            "  [{}] {} ({:.3})",
            result.id,
            result.payload.get_str("text").unwrap_or("unknown"),
            result.score()
        );
    }

    let reloaded = IndexedCollection::load(config.store_dir())?;
    tracing::info!(vectors = reloaded.len(), "snapshot reloaded");

    let _ = fs::remove_dir_all(&data_dir);
    Ok(())
}
