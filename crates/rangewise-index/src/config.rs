#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use rangewise_common::{MAX_COL, MAX_ROW};

use crate::bucket_grid::DependencyGrid;
use crate::dependencies_rtree::DependenciesRTree;
use crate::traits::DependencyIndex;

/// Geometry of the bucket grid.
///
/// Buckets are `2^col_shift` columns by `2^row_shift` rows. A dependency whose
/// rectangle spans more than `huge_threshold` buckets along either axis is
/// kept in a global list instead of being copied into every bucket.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketGridConfig {
    pub col_shift: u32,
    pub row_shift: u32,
    pub huge_threshold: u32,
    /// Last column index; a rectangle reaching it from column 0 is a whole-row reference.
    pub max_col: u32,
    /// Last row index; a rectangle reaching it from row 0 is a whole-column reference.
    pub max_row: u32,
}

impl Default for BucketGridConfig {
    fn default() -> Self {
        Self {
            col_shift: 6,
            row_shift: 9,
            huge_threshold: 16,
            max_col: MAX_COL,
            max_row: MAX_ROW,
        }
    }
}

impl BucketGridConfig {
    #[inline]
    pub fn bucket_width(&self) -> u32 {
        1 << self.col_shift
    }

    #[inline]
    pub fn bucket_height(&self) -> u32 {
        1 << self.row_shift
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IndexEngine {
    #[default]
    BucketGrid,
    RTree,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexConfig {
    pub engine: IndexEngine,
    /// Only read by [`IndexEngine::BucketGrid`].
    pub grid: BucketGridConfig,
}

impl IndexConfig {
    pub fn rtree() -> Self {
        Self {
            engine: IndexEngine::RTree,
            ..Self::default()
        }
    }
}

/// Build the dependency index selected by `config`.
pub fn new_dependency_index(config: IndexConfig) -> Box<dyn DependencyIndex> {
    match config.engine {
        IndexEngine::BucketGrid => Box::new(DependencyGrid::with_config(config.grid)),
        IndexEngine::RTree => Box::new(DependenciesRTree::new()),
    }
}
