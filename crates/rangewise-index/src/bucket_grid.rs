//! Fixed-size bucket grid for dependency lookups.
//!
//! Each distinct dependency rectangle gets one [`DependencyGroup`] holding
//! the cells of every formula that reads it. Groups are referenced from the
//! buckets their rectangle overlaps, except for three shapes that would
//! otherwise touch too many buckets:
//!
//! * whole columns (row 0 through the last row) live in a column list,
//! * whole rows (column 0 through the last column) live in a row list,
//! * anything spanning more than `huge_threshold` buckets on one axis lives
//!   in the huge list.
//!
//! Queries deduplicate groups with a per-query stamp instead of a visited set.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use rangewise_common::{BoundingBox, CellPosition, SheetId, Zone};

use crate::config::BucketGridConfig;
use crate::range_set::RangeSet;
use crate::traits::DependencyIndex;

pub type GroupId = u32;

/// All formulas reading one exact rectangle.
#[derive(Debug, Clone)]
pub struct DependencyGroup {
    pub id: GroupId,
    pub source_zone: Zone,
    pub dependents: RangeSet,
    last_visited_query_id: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Buckets,
    Columns,
    Rows,
    Huge,
}

/// How a candidate group must be checked against the query rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Overlap {
    Full,
    ColumnsOnly,
    RowsOnly,
}

#[derive(Debug, Default, Clone)]
struct SheetGrid {
    groups: Vec<DependencyGroup>,
    group_by_zone: FxHashMap<Zone, GroupId>,
    buckets: FxHashMap<(u32, u32), SmallVec<[GroupId; 4]>>,
    full_columns: Vec<GroupId>,
    full_rows: Vec<GroupId>,
    huge: Vec<GroupId>,
}

/// Size counters, for diagnostics and benchmarks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GridStats {
    pub sheets: usize,
    pub groups: usize,
    pub populated_buckets: usize,
    pub bucket_entries: usize,
    pub full_columns: usize,
    pub full_rows: usize,
    pub huge: usize,
}

#[derive(Debug, Clone, Default)]
pub struct DependencyGrid {
    config: BucketGridConfig,
    sheets: FxHashMap<SheetId, SheetGrid>,
    query_id: u64,
}

impl DependencyGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: BucketGridConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &BucketGridConfig {
        &self.config
    }

    /// Record that the formula at `formula` reads `dependency`.
    pub fn add_dependency(&mut self, formula: CellPosition, dependency: &BoundingBox) {
        let route = self.route(&dependency.zone);
        let (col_range, row_range) = self.bucket_span(&dependency.zone);
        let grid = self.sheets.entry(dependency.sheet_id).or_default();

        let id = match grid.group_by_zone.get(&dependency.zone) {
            Some(&id) => id,
            None => {
                let id = grid.groups.len() as GroupId;
                grid.groups.push(DependencyGroup {
                    id,
                    source_zone: dependency.zone,
                    dependents: RangeSet::new(),
                    last_visited_query_id: 0,
                });
                grid.group_by_zone.insert(dependency.zone, id);
                match route {
                    Route::Buckets => {
                        for bc in col_range.clone() {
                            for br in row_range.clone() {
                                grid.buckets.entry((bc, br)).or_default().push(id);
                            }
                        }
                    }
                    Route::Columns => grid.full_columns.push(id),
                    Route::Rows => grid.full_rows.push(id),
                    Route::Huge => grid.huge.push(id),
                }
                #[cfg(feature = "tracing")]
                if route != Route::Buckets {
                    tracing::debug!(
                        sheet = dependency.sheet_id,
                        zone = %dependency.zone,
                        list = ?route,
                        "dependency group routed to a global list"
                    );
                }
                id
            }
        };
        grid.groups[id as usize].dependents.add_position(formula);
    }

    /// Cells of every formula whose dependency intersects `changed`, each reported once.
    pub fn get_range_dependents(&mut self, changed: &BoundingBox) -> RangeSet {
        self.query_id += 1;
        let query_id = self.query_id;
        let mut result = RangeSet::new();
        let (col_range, row_range) = self.bucket_span(&changed.zone);
        let Some(grid) = self.sheets.get_mut(&changed.sheet_id) else {
            return result;
        };
        let zone = changed.zone;
        let SheetGrid {
            groups,
            buckets,
            full_columns,
            full_rows,
            huge,
            ..
        } = grid;

        let span = (col_range.end() - col_range.start() + 1) as u64
            * (row_range.end() - row_range.start() + 1) as u64;
        if span > buckets.len() as u64 {
            for (&(bc, br), ids) in buckets.iter() {
                if col_range.contains(&bc) && row_range.contains(&br) {
                    for &id in ids {
                        visit(&mut groups[id as usize], query_id, &zone, Overlap::Full, &mut result);
                    }
                }
            }
        } else {
            for bc in col_range {
                for br in row_range.clone() {
                    if let Some(ids) = buckets.get(&(bc, br)) {
                        for &id in ids {
                            visit(&mut groups[id as usize], query_id, &zone, Overlap::Full, &mut result);
                        }
                    }
                }
            }
        }
        for &id in full_columns.iter() {
            visit(&mut groups[id as usize], query_id, &zone, Overlap::ColumnsOnly, &mut result);
        }
        for &id in full_rows.iter() {
            visit(&mut groups[id as usize], query_id, &zone, Overlap::RowsOnly, &mut result);
        }
        for &id in huge.iter() {
            visit(&mut groups[id as usize], query_id, &zone, Overlap::Full, &mut result);
        }
        result
    }

    /// Drop `formula` from the group of `dependency`. The group itself is kept.
    pub fn remove_dependency(&mut self, formula: CellPosition, dependency: &BoundingBox) -> bool {
        let Some(grid) = self.sheets.get_mut(&dependency.sheet_id) else {
            return false;
        };
        let Some(&id) = grid.group_by_zone.get(&dependency.zone) else {
            return false;
        };
        let dependents = &mut grid.groups[id as usize].dependents;
        if !dependents.has_position(formula) {
            return false;
        }
        dependents.remove_position(formula);
        true
    }

    pub fn group(&self, sheet_id: SheetId, zone: &Zone) -> Option<&DependencyGroup> {
        let grid = self.sheets.get(&sheet_id)?;
        let &id = grid.group_by_zone.get(zone)?;
        grid.groups.get(id as usize)
    }

    pub fn stats(&self) -> GridStats {
        let mut stats = GridStats {
            sheets: self.sheets.len(),
            ..GridStats::default()
        };
        for grid in self.sheets.values() {
            stats.groups += grid.groups.len();
            stats.populated_buckets += grid.buckets.len();
            stats.bucket_entries += grid.buckets.values().map(|ids| ids.len()).sum::<usize>();
            stats.full_columns += grid.full_columns.len();
            stats.full_rows += grid.full_rows.len();
            stats.huge += grid.huge.len();
        }
        stats
    }

    fn route(&self, zone: &Zone) -> Route {
        let cfg = &self.config;
        if zone.top == 0 && zone.bottom >= cfg.max_row {
            return Route::Columns;
        }
        if zone.left == 0 && zone.right >= cfg.max_col {
            return Route::Rows;
        }
        let (cols, rows) = self.bucket_span(zone);
        if cols.end() - cols.start() + 1 > cfg.huge_threshold
            || rows.end() - rows.start() + 1 > cfg.huge_threshold
        {
            return Route::Huge;
        }
        Route::Buckets
    }

    /// Inclusive bucket index ranges covered by `zone`.
    fn bucket_span(
        &self,
        zone: &Zone,
    ) -> (std::ops::RangeInclusive<u32>, std::ops::RangeInclusive<u32>) {
        let cfg = &self.config;
        let right = zone.right.min(cfg.max_col);
        let bottom = zone.bottom.min(cfg.max_row);
        (
            (zone.left.min(right) >> cfg.col_shift)..=(right >> cfg.col_shift),
            (zone.top.min(bottom) >> cfg.row_shift)..=(bottom >> cfg.row_shift),
        )
    }
}

fn visit(
    group: &mut DependencyGroup,
    query_id: u64,
    zone: &Zone,
    overlap: Overlap,
    result: &mut RangeSet,
) {
    if group.last_visited_query_id == query_id {
        return;
    }
    group.last_visited_query_id = query_id;
    let source = &group.source_zone;
    let hit = match overlap {
        Overlap::Full => source.intersects(zone),
        Overlap::ColumnsOnly => source.left <= zone.right && zone.left <= source.right,
        Overlap::RowsOnly => source.top <= zone.bottom && zone.top <= source.bottom,
    };
    if hit {
        result.union_with(&group.dependents);
    }
}

impl DependencyIndex for DependencyGrid {
    fn insert(&mut self, dependency: &BoundingBox, dependent: CellPosition) {
        self.add_dependency(dependent, dependency);
    }

    fn remove(&mut self, dependency: &BoundingBox, dependent: CellPosition) -> bool {
        self.remove_dependency(dependent, dependency)
    }

    fn search(&mut self, changed: &BoundingBox) -> RangeSet {
        self.get_range_dependents(changed)
    }
}
