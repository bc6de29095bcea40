use rustc_hash::FxHashMap;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use rangewise_common::{BoundingBox, CellPosition, SheetId, Zone};

use crate::zone_set::ZoneSet;

/// Cells across several sheets, one [`ZoneSet`] per sheet.
///
/// This is the result type of every dependency query. Sheets whose set
/// becomes empty are dropped, so two range sets holding the same cells
/// compare equal.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RangeSet {
    sheets: FxHashMap<SheetId, ZoneSet>,
}

impl RangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, sheet_id: SheetId, zone: Zone) {
        self.sheets.entry(sheet_id).or_default().add(zone);
    }

    #[inline]
    pub fn add_position(&mut self, position: CellPosition) {
        self.add(position.sheet_id, position.zone());
    }

    #[inline]
    pub fn add_bounding_box(&mut self, bbox: &BoundingBox) {
        self.add(bbox.sheet_id, bbox.zone);
    }

    pub fn remove(&mut self, sheet_id: SheetId, zone: Zone) {
        if let Some(set) = self.sheets.get_mut(&sheet_id) {
            set.remove(zone);
            if set.is_empty() {
                self.sheets.remove(&sheet_id);
            }
        }
    }

    #[inline]
    pub fn remove_position(&mut self, position: CellPosition) {
        self.remove(position.sheet_id, position.zone());
    }

    pub fn has(&self, sheet_id: SheetId, col: u32, row: u32) -> bool {
        self.sheets
            .get(&sheet_id)
            .is_some_and(|set| set.has(col, row))
    }

    #[inline]
    pub fn has_position(&self, position: CellPosition) -> bool {
        self.has(position.sheet_id, position.col, position.row)
    }

    /// Cells of `self` not in `other`.
    pub fn difference(&self, other: &RangeSet) -> RangeSet {
        let mut sheets = FxHashMap::default();
        for (&sheet_id, set) in &self.sheets {
            let remaining = match other.sheets.get(&sheet_id) {
                Some(theirs) => set.difference(theirs),
                None => set.clone(),
            };
            if !remaining.is_empty() {
                sheets.insert(sheet_id, remaining);
            }
        }
        RangeSet { sheets }
    }

    pub fn union_with(&mut self, other: &RangeSet) {
        for (&sheet_id, set) in &other.sheets {
            match self.sheets.get_mut(&sheet_id) {
                Some(mine) => mine.union_with(set),
                None => {
                    self.sheets.insert(sheet_id, set.clone());
                }
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    pub fn clear(&mut self) {
        self.sheets.clear();
    }

    pub fn zone_set(&self, sheet_id: SheetId) -> Option<&ZoneSet> {
        self.sheets.get(&sheet_id)
    }

    /// Sheets with at least one cell, in ascending id order.
    pub fn sheet_ids(&self) -> Vec<SheetId> {
        let mut ids: Vec<SheetId> = self.sheets.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// `(sheet, zone)` pairs covering the set, ordered by sheet id.
    pub fn iter(&self) -> impl Iterator<Item = (SheetId, Zone)> + '_ {
        self.sheet_ids().into_iter().flat_map(move |sheet_id| {
            self.sheets[&sheet_id]
                .iter()
                .map(move |zone| (sheet_id, zone))
        })
    }

    /// Every cell of the set, sorted. Only meant for small sets.
    pub fn positions(&self) -> Vec<CellPosition> {
        let mut out = Vec::new();
        for (sheet_id, zone) in self.iter() {
            for col in zone.left..=zone.right {
                for row in zone.top..=zone.bottom {
                    out.push(CellPosition::new(sheet_id, col, row));
                }
            }
        }
        out.sort_unstable();
        out
    }
}

impl FromIterator<CellPosition> for RangeSet {
    fn from_iter<I: IntoIterator<Item = CellPosition>>(iter: I) -> Self {
        let mut set = RangeSet::new();
        for position in iter {
            set.add_position(position);
        }
        set
    }
}
