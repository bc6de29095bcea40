use rangewise_common::Range;

/// Kind of effect a structural edit had on one range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeType {
    None,
    Move,
    Resize,
    Remove,
    Change,
}

/// Outcome of applying one structural edit to one range.
///
/// `Remove` keeps the last valid form of the range (with `invalid_sheet_name`
/// set when its sheet was deleted) so a provider can still report what it lost.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeChange {
    None,
    Move(Range),
    Resize(Range),
    Remove(Range),
    Change(Range),
}

impl RangeChange {
    pub fn change_type(&self) -> ChangeType {
        match self {
            RangeChange::None => ChangeType::None,
            RangeChange::Move(_) => ChangeType::Move,
            RangeChange::Resize(_) => ChangeType::Resize,
            RangeChange::Remove(_) => ChangeType::Remove,
            RangeChange::Change(_) => ChangeType::Change,
        }
    }

    pub fn range(&self) -> Option<&Range> {
        match self {
            RangeChange::None => None,
            RangeChange::Move(r)
            | RangeChange::Resize(r)
            | RangeChange::Remove(r)
            | RangeChange::Change(r) => Some(r),
        }
    }

    #[inline]
    pub fn is_removed(&self) -> bool {
        matches!(self, RangeChange::Remove(_))
    }

    /// The range a holder should keep after the edit: `None` when removed,
    /// `original` itself when unaffected.
    pub fn survivor(self, original: &Range) -> Option<Range> {
        match self {
            RangeChange::None => Some(original.clone()),
            RangeChange::Remove(_) => None,
            RangeChange::Move(r) | RangeChange::Resize(r) | RangeChange::Change(r) => Some(r),
        }
    }

    /// Like [`RangeChange::survivor`], except a range removed with its sheet
    /// is kept in orphaned form, so renaming another sheet to the lost name
    /// can repair it. Geometric removals are still dropped.
    pub fn retained(self, original: &Range) -> Option<Range> {
        match self {
            RangeChange::Remove(r) if r.invalid_sheet_name().is_some() => Some(r),
            other => other.survivor(original),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rangewise_common::Zone;

    #[test]
    fn retained_keeps_only_orphaned_removals() {
        let range = Range::from_zone(0, Zone::new(0, 0, 1, 1));
        let orphan = range.with_invalid_sheet_name(Some("Data".to_string()));

        assert_eq!(
            RangeChange::Remove(orphan.clone()).retained(&range),
            Some(orphan)
        );
        assert_eq!(RangeChange::Remove(range.clone()).retained(&range), None);
        assert_eq!(RangeChange::None.retained(&range), Some(range.clone()));
    }
}
