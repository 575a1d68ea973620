//! Persistence demonstration for PrismDB.
//!
//! This example shows how to:
//! 1. Create a collection and add vectors
//! 2. Save a snapshot
//! 3. Load it back (simulating a restart)
//! 4. Keep adding with identifiers continuing where they left off

use prismdb::prelude::*;
use std::fs;

fn main() -> Result<()> {
    let store_dir = std::env::temp_dir().join("prismdb_persistence_demo");
    let _ = fs::remove_dir_all(&store_dir);

    println!("PrismDB Persistence Demo\n");

    println!("Phase 1: creating collection and adding vectors...");
    {
        let collection = IndexedCollection::open_or_create(&store_dir, CollectionConfig::new(3))?;

        let docs: [(&str, [f32; 3]); 3] = [
            ("linen shirt", [0.9, 0.1, 0.0]),
            ("wool sweater", [0.7, 0.3, 0.1]),
            ("rain jacket", [0.0, 0.2, 0.9]),
        ];
        for (text, embedding) in &docs {
            collection.add(embedding, Payload::new().with_field("text", *text))?;
        }

        println!("   Added {} vectors", collection.len());
        collection.save(&store_dir)?;
        println!("   Snapshot written to {}\n", store_dir.display());
    }

    println!("Phase 2: loading after 'restart'...");
    let collection = IndexedCollection::load(&store_dir)?;
    println!("   Loaded {} vectors", collection.len());

    for id in 0..collection.len() as VectorId {
        let (vector, payload) = collection.get(id)?;
        println!(
            "   [{}] {} {:?}",
            id,
            payload.get_str("text").unwrap_or("unknown"),
            vector.as_slice()
        );
    }

    let id = collection.add([0.1, 0.9, 0.0], Payload::new().with_field("text", "cotton tee"))?;
    println!("\n   New item received id {} (next id is {})", id, collection.next_id());
    collection.save(&store_dir)?;

    let _ = fs::remove_dir_all(&store_dir);
    println!("\nDone.");
    Ok(())
}
