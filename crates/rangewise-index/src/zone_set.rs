//! Exact sets of cells stored as a column sweep-line profile.
//!
//! The plane is cut into vertical strips at every column where the set's
//! shape changes. Each strip carries its row profile: a sorted list of
//! alternating enter/exit boundaries, i.e. half-open row intervals
//! `[top, bottom + 1)`. The strip starting at key `x` covers columns from `x`
//! up to (not including) the next key. Columns before the first key are empty
//! and the last strip is always empty.
//!
//! Two invariants keep the representation canonical, so equal sets compare
//! equal:
//!
//! * within a profile, intervals are disjoint and never touch;
//! * neighbouring strips never carry identical profiles.

use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use rangewise_common::Zone;

type Profile = SmallVec<[u32; 4]>;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ZoneSet {
    strips: BTreeMap<u32, Profile>,
}

impl ZoneSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_zones(zones: impl IntoIterator<Item = Zone>) -> Self {
        let mut set = Self::new();
        for zone in zones {
            set.add(zone);
        }
        set
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.strips.is_empty()
    }

    pub fn clear(&mut self) {
        self.strips.clear();
    }

    /// Union `zone` into the set.
    pub fn add(&mut self, zone: Zone) {
        self.update(zone, |profile, top, end| union_interval(profile, top, end));
    }

    /// Subtract `zone` from the set.
    pub fn remove(&mut self, zone: Zone) {
        if self.is_empty() {
            return;
        }
        self.update(zone, |profile, top, end| subtract_interval(profile, top, end));
    }

    /// Membership test for one cell.
    pub fn has(&self, col: u32, row: u32) -> bool {
        match self.strips.range(..=col).next_back() {
            Some((_, profile)) => profile.partition_point(|&b| b <= row) % 2 == 1,
            None => false,
        }
    }

    /// Cells of `self` not in `other`.
    pub fn difference(&self, other: &ZoneSet) -> ZoneSet {
        let mut out = self.clone();
        for zone in other.iter() {
            out.remove(zone);
        }
        out
    }

    /// Add every cell of `other` to `self`.
    pub fn union_with(&mut self, other: &ZoneSet) {
        for zone in other.iter() {
            self.add(zone);
        }
    }

    /// Whether any cell of `zone` belongs to the set.
    pub fn intersects(&self, zone: &Zone) -> bool {
        self.iter().any(|z| z.intersects(zone))
    }

    /// Disjoint rectangles covering exactly the set, ordered by `(left, top)`.
    ///
    /// A row interval that stays unchanged across consecutive strips is
    /// emitted as one rectangle spanning all of them.
    pub fn iter(&self) -> std::vec::IntoIter<Zone> {
        let mut out = Vec::new();
        // Open intervals as (top, end, column where they started).
        let mut open: Vec<(u32, u32, u32)> = Vec::new();
        for (&col, profile) in &self.strips {
            let intervals: SmallVec<[(u32, u32); 2]> =
                profile.chunks_exact(2).map(|c| (c[0], c[1])).collect();
            open.retain(|&(top, end, left)| {
                if intervals.contains(&(top, end)) {
                    return true;
                }
                out.push(Zone {
                    left,
                    top,
                    right: col - 1,
                    bottom: end - 1,
                });
                false
            });
            for &(top, end) in &intervals {
                if !open.iter().any(|&(t, e, _)| (t, e) == (top, end)) {
                    open.push((top, end, col));
                }
            }
        }
        out.sort_unstable_by_key(|z| (z.left, z.top));
        out.into_iter()
    }

    /// Number of cells in the set.
    pub fn cell_count(&self) -> u64 {
        self.iter().map(|z| z.cell_count()).sum()
    }

    /// Number of strip boundaries, a measure of the representation's size.
    pub fn boundary_count(&self) -> usize {
        self.strips.len()
    }

    fn update(&mut self, zone: Zone, op: impl Fn(&Profile, u32, u32) -> Profile) {
        let end_col = zone.right.saturating_add(1);
        let end_row = zone.bottom.saturating_add(1);
        self.split_at(zone.left);
        self.split_at(end_col);
        for (_, profile) in self.strips.range_mut(zone.left..end_col) {
            *profile = op(profile, zone.top, end_row);
        }
        self.merge_between(zone.left, end_col);
    }

    /// Make `col` a strip boundary, copying the profile of the strip it falls in.
    fn split_at(&mut self, col: u32) {
        if self.strips.contains_key(&col) {
            return;
        }
        let profile = self
            .strips
            .range(..col)
            .next_back()
            .map(|(_, p)| p.clone())
            .unwrap_or_default();
        self.strips.insert(col, profile);
    }

    /// Drop boundaries in `from..=to` that no longer separate different profiles.
    fn merge_between(&mut self, from: u32, to: u32) {
        let keys: SmallVec<[u32; 8]> = self.strips.range(from..=to).map(|(k, _)| *k).collect();
        for key in keys {
            let redundant = match (self.strips.range(..key).next_back(), self.strips.get(&key)) {
                (Some((_, prev)), Some(current)) => prev == current,
                (None, Some(current)) => current.is_empty(),
                _ => false,
            };
            if redundant {
                self.strips.remove(&key);
            }
        }
    }
}

impl<'a> IntoIterator for &'a ZoneSet {
    type Item = Zone;
    type IntoIter = std::vec::IntoIter<Zone>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<Zone> for ZoneSet {
    fn from_iter<I: IntoIterator<Item = Zone>>(iter: I) -> Self {
        Self::from_zones(iter)
    }
}

fn union_interval(profile: &Profile, start: u32, end: u32) -> Profile {
    let mut out = Profile::new();
    let (mut start, mut end) = (start, end);
    let mut i = 0;
    while i < profile.len() && profile[i + 1] < start {
        out.extend_from_slice(&profile[i..i + 2]);
        i += 2;
    }
    // Overlapping or touching intervals fold into the new one.
    while i < profile.len() && profile[i] <= end {
        start = start.min(profile[i]);
        end = end.max(profile[i + 1]);
        i += 2;
    }
    out.push(start);
    out.push(end);
    out.extend_from_slice(&profile[i..]);
    out
}

fn subtract_interval(profile: &Profile, start: u32, end: u32) -> Profile {
    let mut out = Profile::new();
    for pair in profile.chunks_exact(2) {
        let (a, b) = (pair[0], pair[1]);
        if b <= start || a >= end {
            out.extend_from_slice(&[a, b]);
            continue;
        }
        if a < start {
            out.extend_from_slice(&[a, start]);
        }
        if b > end {
            out.extend_from_slice(&[end, b]);
        }
    }
    out
}
