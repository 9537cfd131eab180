use pointstore::{
    Config, DualIterator, GridPoint, GridPointFactory, Located, MemoryPointStore, PointFactory,
    PointSet, PointStore, PointStoreError, Region, Resolution, SnapshotFile, hash, scale_unsigned,
};
use tempfile::TempDir;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn gp(coords: &[i32]) -> GridPoint {
    GridPoint::new(coords)
}

#[test]
fn test_basic_operations() {
    init_logging();
    let mut store = MemoryPointStore::new();

    // Appends, never overwrites
    store.insert(gp(&[10, 20]), "first").unwrap();
    store.insert(gp(&[10, 20]), "second").unwrap();
    store.insert(gp(&[10, 20]), "first").unwrap();

    let values: Vec<_> = store.at(&gp(&[10, 20])).unwrap().collect();
    assert_eq!(values, vec!["first", "second", "first"]);
    assert_eq!(store.at(&gp(&[20, 10])).unwrap().count(), 0);

    // Remove returns everything that was there
    let removed = store.remove_at(&gp(&[10, 20])).unwrap();
    assert_eq!(removed.len(), 3);
    assert!(store.remove_at(&gp(&[10, 20])).unwrap().is_empty());
    assert!(store.is_empty());
}

#[test]
fn test_region_query_yields_every_occurrence() {
    init_logging();
    let mut store = MemoryPointStore::new();
    store.insert(gp(&[1, 1]), "shared").unwrap();
    store.insert(gp(&[2, 2]), "shared").unwrap();
    store.insert(gp(&[2, 2]), "shared").unwrap();
    store.insert(gp(&[100, 100]), "far").unwrap();

    let region = Region::create(gp(&[0, 0]), gp(&[3, 3])).unwrap();
    let found: Vec<_> = store.within(&region).unwrap().collect();
    assert_eq!(found.len(), 3);
    assert!(found.iter().all(|(_, value)| *value == "shared"));
    assert_eq!(found[0].0, gp(&[1, 1]));
    assert_eq!(found[2].0, gp(&[2, 2]));
}

#[test]
fn test_neighbouring_3d_points_keep_separate_buckets() {
    init_logging();
    let mut store = MemoryPointStore::new();
    store.insert(gp(&[1, 1, 1]), "a").unwrap();
    store.insert(gp(&[1, 1, 2]), "b").unwrap();
    store.insert(gp(&[1, 1, 1, 1]), "c").unwrap();
    store.insert(gp(&[1, 1, 1, 2]), "d").unwrap();
    assert_eq!(store.len(), 4);

    assert_eq!(store.at(&gp(&[1, 1, 1])).unwrap().collect::<Vec<_>>(), vec!["a"]);
    assert_eq!(store.at(&gp(&[1, 1, 2])).unwrap().collect::<Vec<_>>(), vec!["b"]);

    // A small region away from both points finds nothing
    let elsewhere = Region::create(gp(&[5, 5, 5]), gp(&[6, 6, 6])).unwrap();
    assert_eq!(store.within(&elsewhere).unwrap().count(), 0);

    let exact = Region::create(gp(&[1, 1, 2]), gp(&[1, 1, 2])).unwrap();
    let found: Vec<_> = store.within(&exact).unwrap().collect();
    assert_eq!(found, vec![(gp(&[1, 1, 2]), "b")]);
    assert_eq!(found[0].0.coordinates(), &[1, 1, 2]);
}

#[test]
fn test_regions_reject_mixed_resolutions() {
    let coarse = GridPointFactory::with_resolution(2, Resolution::new(8, 24)).unwrap();
    let fine_low = gp(&[0, 0]);
    let coarse_high = coarse.create(&[100, 100]).unwrap();

    assert!(matches!(
        Region::create(fine_low.clone(), coarse_high.clone()),
        Err(PointStoreError::ResolutionMismatch { .. })
    ));

    let mut set = PointSet::create(vec![Located::new(fine_low, 1)]).unwrap();
    assert!(matches!(
        set.add(Located::new(coarse_high, 2)),
        Err(PointStoreError::ResolutionMismatch { .. })
    ));
    assert_eq!(set.len(), 1);
}

#[test]
fn test_box_query_filters_curve_interval() {
    let mut store = MemoryPointStore::new();
    for x in 0..8 {
        for y in 0..8 {
            store.insert(gp(&[x, y]), (x, y)).unwrap();
        }
    }

    // The Z-order interval between [1,0] and [2,1] also passes through
    // points outside the box spanned by those corners.
    let region = Region::create(gp(&[1, 0]), gp(&[2, 1])).unwrap();
    let interval: Vec<(i32, i32)> = store.within(&region).unwrap().map(|(_, v)| v).collect();
    let boxed: Vec<(i32, i32)> = store
        .within(&region)
        .unwrap()
        .filter(|(point, _)| region.encloses(point))
        .map(|(_, v)| v)
        .collect();

    assert!(interval.len() > boxed.len());
    assert_eq!(boxed.len(), 4);
    for (x, y) in boxed {
        assert!((1..=2).contains(&x) && (0..=1).contains(&y));
    }
}

#[test]
fn test_key_granular_scan() {
    let mut store = MemoryPointStore::new();
    for x in 1..=4 {
        for n in 0..x {
            store.insert(gp(&[x]), x * 100 + n).unwrap();
        }
    }

    // Take the first value of every key only
    let region = Region::create(gp(&[1]), gp(&[4])).unwrap();
    let mut cursor = store.within(&region).unwrap();
    let mut heads = Vec::new();
    while cursor.next_key().is_some() {
        let (_, value) = cursor.next().unwrap();
        heads.push(value);
    }
    assert_eq!(heads, vec![100, 200, 300, 400]);
    assert!(!cursor.has_next_key());
    assert_eq!(cursor.by_ref().map(|(_, v)| v).collect::<Vec<_>>(), vec![401, 402, 403]);
    assert!(!cursor.has_next());
}

#[test]
fn test_remove_key_during_scan() {
    let mut store = MemoryPointStore::new();
    for x in 0..6 {
        store.insert(gp(&[x]), x).unwrap();
        store.insert(gp(&[x]), x + 10).unwrap();
    }

    // Drop every key whose first value is even
    let region = Region::create(gp(&[0]), gp(&[5])).unwrap();
    {
        let mut cursor = store.within(&region).unwrap();
        while cursor.next_key().is_some() {
            let (_, first) = cursor.next().unwrap();
            if first % 2 == 0 {
                cursor.remove_key().unwrap();
                assert!(!cursor.has_next_value_in_key());
            }
        }
    }

    let remaining: Vec<i32> = store
        .within(&region)
        .unwrap()
        .map(|(_, value)| value)
        .collect();
    assert_eq!(remaining, vec![1, 11, 3, 13, 5, 15]);
}

#[test]
fn test_remove_in_keeps_outside_entries() {
    let mut store = MemoryPointStore::new();
    for x in -3..=3 {
        store.insert(gp(&[x, x]), x).unwrap();
    }

    store
        .remove_in(&Region::create(gp(&[0, 0]), gp(&[2, 2])).unwrap())
        .unwrap();

    let left: Vec<i32> = store.buckets().flat_map(|(_, v)| v.to_vec()).collect();
    assert_eq!(left.len(), 4);
    assert!(left.contains(&3));
    assert!(left.contains(&-3));
    assert!(!left.contains(&1));
}

#[test]
fn test_collect_at_builds_point_set() {
    let mut store = MemoryPointStore::new();
    store.insert_all(gp(&[5, 5]), vec!['a', 'b', 'c']).unwrap();

    let mut set = store.collect_at(&gp(&[5, 5])).unwrap();
    assert_eq!(set.len(), 3);
    assert_eq!(set.representative(), Some(&gp(&[5, 5])));

    set.add(Located::new(gp(&[5, 5]), 'd')).unwrap();
    assert!(matches!(
        set.add(Located::new(gp(&[5, 6]), 'e')),
        Err(PointStoreError::NotColocated)
    ));

    let empty = store.collect_at(&gp(&[0, 0])).unwrap();
    assert!(empty.is_empty());
    assert_eq!(empty.degree(), 0);
}

#[test]
fn test_regions_group_by_lower_bound() {
    let a = Region::create(gp(&[1, 1]), gp(&[3, 3])).unwrap();
    let b = Region::create(gp(&[1, 1]), gp(&[9, 9])).unwrap();
    let c = Region::create(gp(&[2, 2]), gp(&[9, 9])).unwrap();

    let mut set = PointSet::create(vec![a, b.clone()]).unwrap();
    assert!(set.add(c).is_err());
    assert_eq!(set.len(), 2);
    assert!(b.contains_region(set.first().unwrap()));
}

#[test]
fn test_factory_from_config() {
    let config = Config::from_json(r#"{ "resolution": { "precision": 8, "shift": 24 } }"#).unwrap();
    let factory = GridPointFactory::from_config(&config, 3).unwrap();
    assert_eq!(factory.resolution(), Resolution::new(8, 24));

    // Coordinates inside one 2^24 cell share a bucket
    let mut store = MemoryPointStore::new();
    let a = factory.create(&[1 << 24, 0, 0]).unwrap();
    let b = factory.create(&[(1 << 24) + 12_345, 77, 1_000]).unwrap();
    store.insert(a, "a").unwrap();
    store.insert(b.clone(), "b").unwrap();
    assert_eq!(store.len(), 1);
    assert_eq!(factory.decompose(&b), vec![(1 << 24) + 12_345, 77, 1_000]);

    assert!(matches!(
        factory.create(&[1, 2]),
        Err(PointStoreError::DegreeMismatch { expected: 3, found: 2 })
    ));

    let too_wide = Config::default().with_resolution(Resolution::new(30, 8));
    assert!(GridPointFactory::from_config(&too_wide, 3).is_err());
}

#[test]
fn test_keys_match_location_hash() {
    let point = gp(&[-7, 42]);
    let expected = hash(0, 32, &[scale_unsigned(-7), scale_unsigned(42)]).unwrap();
    assert_eq!(point.key(), expected);

    let factory = GridPointFactory::new(3);
    let point = factory.create(&[1, 2, 3]).unwrap();
    let scaled: Vec<u64> = [1, 2, 3].iter().map(|&c| scale_unsigned(c)).collect();
    assert_eq!(point.key(), hash(11, 21, &scaled).unwrap());
}

#[test]
fn test_snapshot_persistence() {
    init_logging();
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("points.snapshot");

    {
        let mut store = MemoryPointStore::new();
        for i in 0..100 {
            store.insert(gp(&[i % 10, i / 10]), format!("value_{}", i)).unwrap();
        }
        store.insert(gp(&[0, 0]), "extra".to_string()).unwrap();
        SnapshotFile::new(&path).save(&store).unwrap();
    }

    let mut restored: MemoryPointStore<GridPoint, String> = SnapshotFile::new(&path).load().unwrap();
    assert_eq!(restored.len(), 100);
    assert_eq!(restored.stats().value_count, 101);
    assert_eq!(
        restored.at(&gp(&[0, 0])).unwrap().collect::<Vec<_>>(),
        vec!["value_0".to_string(), "extra".to_string()]
    );

    let region = Region::create(gp(&[0, 0]), gp(&[9, 9])).unwrap();
    assert_eq!(restored.within(&region).unwrap().count(), 101);
}
