//! Quick start example for PrismDB.
//!
//! Adds a handful of catalog items, fuses a query from an image and a
//! description, and prints the closest matches.

use prismdb::prelude::*;
use prismdb::DEFAULT_ALPHA;

fn main() -> Result<()> {
    println!("PrismDB Quick Start Example\n");

    // Small dimension for demonstration; real embeddings are 768-dim
    let collection = IndexedCollection::new(CollectionConfig::new(4))?;

    let items: [(&str, &str, [f32; 4]); 4] = [
        ("red summer dress", "women", [0.9, 0.1, 0.0, 0.2]),
        ("blue denim jeans", "men", [0.1, 0.9, 0.1, 0.0]),
        ("red evening gown", "women", [0.8, 0.0, 0.1, 0.4]),
        ("black leather boots", "shoes", [0.0, 0.2, 0.9, 0.1]),
    ];

    println!("Adding {} items...", items.len());
    for (text, category, embedding) in &items {
        let payload = Payload::new()
            .with_field("text", *text)
            .with_field("category", *category);
        let id = collection.add(embedding, payload)?;
        println!("   [{}] {}", id, text);
    }
    println!("Collection contains {} vectors\n", collection.len());

    // Pretend these came from the image and text encoders
    let image_embedding: [f32; 4] = [1.0, 0.0, 0.0, 0.3];
    let text_embedding: [f32; 4] = [0.8, 0.2, 0.0, 0.1];

    let fusion = FusionCombiner::new(DEFAULT_ALPHA, collection.dimension())?;
    let query = fusion.combine(Some(&image_embedding[..]), Some(&text_embedding[..]))?;

    println!("Top 3 results for the fused query:");
    println!("{:-<60}", "");
    for (rank, result) in collection.search(query.as_slice(), 3)?.iter().enumerate() {
        println!(
            "  {}. [ID: {}] {} (distance: {:.4}, score: {:.4})",
            rank + 1,
            result.id,
            result.payload.get_str("text").unwrap_or("unknown"),
            result.distance,
            result.score()
        );
    }
    println!("{:-<60}\n", "");

    // Text-only query: the description embedding is used unchanged
    let text_only = fusion.combine(None, Some(&[0.0, 0.1, 1.0, 0.0][..]))?;
    let best = collection.search(text_only.as_slice(), 1)?;
    if let Some(hit) = best.first() {
        println!(
            "Text-only best match: {}",
            hit.payload.get_str("text").unwrap_or("unknown")
        );
    }

    Ok(())
}
