//! Async API demo using AsyncCollection.
//!
//! Run with: cargo run --example async_demo --features async

#[cfg(feature = "async")]
use prismdb::prelude::*;
#[cfg(feature = "async")]
use prismdb::AsyncCollection;

#[cfg(feature = "async")]
#[tokio::main]
async fn main() -> Result<()> {
    println!("Async PrismDB Demo\n");

    let store_dir = std::env::temp_dir().join("prismdb_async_demo");
    let _ = std::fs::remove_dir_all(&store_dir);

    let collection = AsyncCollection::open_or_create(&store_dir, CollectionConfig::new(64)).await?;

    println!("Adding 500 vectors from concurrent tasks...");
    let start = std::time::Instant::now();

    let mut handles = vec![];
    for i in 0..500 {
        let col = collection.clone();
        handles.push(tokio::spawn(async move {
            let vector: Vec<f32> = (0..64).map(|j| ((i * 64 + j) as f32).sin()).collect();
            let payload = Payload::new()
                .with_field("n", i as i64)
                .with_field("category", if i % 2 == 0 { "even" } else { "odd" });
            col.add(vector, payload).await
        }));
    }

    for handle in handles {
        handle
            .await
            .map_err(|e| Error::Runtime(e.to_string()))??;
    }

    println!("   Added {} vectors in {:?}\n", collection.len(), start.elapsed());

    let query: Vec<f32> = (0..64).map(|i| (i as f32 * 0.1).cos()).collect();
    let results = collection.search(&query, 5).await?;

    println!("Top 5 results:");
    for (i, r) in results.iter().enumerate() {
        println!("   {}. ID {} (distance: {:.4})", i + 1, r.id, r.distance);
    }

    collection.save(&store_dir).await?;
    let reloaded = AsyncCollection::load(&store_dir).await?;
    println!("\nReloaded {} vectors from snapshot", reloaded.len());

    let _ = std::fs::remove_dir_all(&store_dir);
    Ok(())
}

#[cfg(not(feature = "async"))]
fn main() {
    println!("Run with: cargo run --example async_demo --features async");
}
