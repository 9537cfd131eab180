//! Getting started with pointstore
//!
//! Walks through grid points, regions, the in-memory store, key-granular
//! scans, snapshots and the async adapter.

#[cfg(feature = "async")]
use futures::StreamExt;
use pointstore::prelude::*;

fn main() -> Result<()> {
    env_logger::init();

    println!("pointstore {} - getting started", pointstore::VERSION);
    println!("==============================\n");

    demonstrate_points()?;
    let store = demonstrate_store()?;
    demonstrate_snapshot(&store)?;
    demonstrate_async()?;

    println!("\nDone.");
    Ok(())
}

/// Points are ordered by their Z-order key
fn demonstrate_points() -> Result<()> {
    println!("1. Points and keys");
    println!("------------------");

    for coords in [[0, 0], [1, 0], [0, 1], [1, 1], [-1, -1]] {
        let point = GridPoint::new(coords);
        println!("  {:?}", point);
    }

    let factory = GridPointFactory::with_resolution(2, Resolution::new(16, 16))?;
    let a = factory.create(&[70_000, 70_000])?;
    let b = factory.create(&[70_001, 70_500])?;
    println!("  coarse cells: {:?} == {:?}: {}", a, b, a == b);
    println!();
    Ok(())
}

fn demonstrate_store() -> Result<MemoryPointStore<GridPoint, String>> {
    println!("2. In-memory store");
    println!("------------------");

    let mut store = MemoryPointStore::new();
    let places = [
        ([2, 3], "bakery"),
        ([2, 3], "bakery"),
        ([5, 1], "library"),
        ([6, 6], "station"),
        ([40, 40], "harbour"),
    ];
    for (coords, name) in places {
        store.insert(GridPoint::new(coords), name.to_string())?;
    }

    let bakeries: Vec<String> = store.at(&GridPoint::new([2, 3]))?.collect();
    println!("  at [2, 3]: {:?}", bakeries);

    let region = Region::create(GridPoint::new([0, 0]), GridPoint::new([7, 7]))?;
    println!("  within [0,0]..[7,7]:");
    for (point, name) in store.within(&region)? {
        println!("    {:?} -> {}", point.coordinates(), name);
    }

    // One line per key, skipping duplicate values
    let mut cursor = store.within(&region)?;
    while let Some(key) = cursor.next_key() {
        let mut count = 0;
        while cursor.has_next_value_in_key() {
            cursor.next();
            count += 1;
        }
        println!("    key {:?} holds {} value(s)", key.coordinates(), count);
    }
    drop(cursor);

    let stats = store.stats();
    println!(
        "  stats: {} points, {} values, {} writes",
        stats.point_count, stats.value_count, stats.operations_count
    );
    println!();
    Ok(store)
}

#[cfg(feature = "snapshot")]
fn demonstrate_snapshot(store: &MemoryPointStore<GridPoint, String>) -> Result<()> {
    println!("3. Snapshots");
    println!("------------");

    let path = std::env::temp_dir().join("pointstore_getting_started.snapshot");
    let snapshot = SnapshotFile::new(&path);
    snapshot.save(store)?;
    let restored: MemoryPointStore<GridPoint, String> = snapshot.load()?;
    println!(
        "  saved and restored {} points via {}",
        restored.len(),
        path.display()
    );
    std::fs::remove_file(&path)?;
    println!();
    Ok(())
}

#[cfg(not(feature = "snapshot"))]
fn demonstrate_snapshot(_store: &MemoryPointStore<GridPoint, String>) -> Result<()> {
    println!("3. Snapshots not enabled (compile with --features snapshot)\n");
    Ok(())
}

#[cfg(feature = "async")]
fn demonstrate_async() -> Result<()> {
    println!("4. Async adapter");
    println!("----------------");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .map_err(PointStoreError::Io)?;

    runtime.block_on(async {
        let store = BlockingStoreAdapter::new(MemoryPointStore::new());
        for x in 0..5 {
            store.insert(GridPoint::new([x, x]), x * 10).await?;
        }

        let region = Region::create(GridPoint::new([1, 1]), GridPoint::new([3, 3]))?;
        let mut stream = store.within(region);
        while let Some(item) = stream.next().await {
            let (point, value) = item?;
            println!("  streamed {:?} -> {}", point.coordinates(), value);
        }
        Ok::<(), PointStoreError>(())
    })?;
    Ok(())
}

#[cfg(not(feature = "async"))]
fn demonstrate_async() -> Result<()> {
    println!("4. Async adapter not enabled (compile with --features async)");
    Ok(())
}
