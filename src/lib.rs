//! Point and region keyed value stores with Z-order location hashing.
//!
//! Points are linearized into one sortable integer key by interleaving the
//! bits of their scaled coordinates, so spatial neighbours get close keys and a
//! region query becomes a range scan.
//!
//! ```rust
//! use pointstore::prelude::*;
//!
//! let mut store = MemoryPointStore::new();
//! store.insert(GridPoint::new([1, 1]), "cafe")?;
//! store.insert(GridPoint::new([1, 1]), "cafe")?;
//! store.insert(GridPoint::new([2, 3]), "park")?;
//!
//! assert_eq!(store.at(&GridPoint::new([1, 1]))?.count(), 2);
//!
//! let region = Region::create(GridPoint::new([0, 0]), GridPoint::new([3, 3]))?;
//! let found: Vec<_> = store.within(&region)?.map(|(_, value)| value).collect();
//! assert_eq!(found, vec!["cafe", "cafe", "park"]);
//! # Ok::<(), pointstore::PointStoreError>(())
//! ```

pub mod compute;
pub mod config;
pub mod error;
pub mod point;
pub mod point_set;
pub mod region;
pub mod storage;

pub use compute::{hash, hash_signed, hash_unchecked, scale_signed, scale_unsigned};
pub use config::Config;
pub use error::{PointStoreError, Result};
pub use point::{GridPoint, GridPointFactory, Point, PointFactory, Pointed, Resolution};
pub use point_set::PointSet;
pub use region::Region;
pub use storage::{DualIterator, Located, MemoryPointStore, PointStore, RegionCursor, StoreStats};

#[cfg(feature = "async")]
pub use storage::{AsyncPointStore, BlockingStoreAdapter};

#[cfg(feature = "snapshot")]
pub use storage::SnapshotFile;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{PointStoreError, Result};

    pub use crate::{GridPoint, GridPointFactory, Point, PointFactory, Pointed, Resolution};

    pub use crate::{PointSet, Region};

    pub use crate::{DualIterator, Located, MemoryPointStore, PointStore};

    pub use crate::Config;

    #[cfg(feature = "async")]
    pub use crate::{AsyncPointStore, BlockingStoreAdapter};

    #[cfg(feature = "snapshot")]
    pub use crate::SnapshotFile;
}
