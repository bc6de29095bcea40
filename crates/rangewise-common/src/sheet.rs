use std::collections::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::SheetError;

/// Stable sheet identifier. Ids are never reused after a sheet is deleted.
pub type SheetId = u16;

/// Current extent of a sheet, used to bound whole-row/whole-column ranges.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct SheetDimensions {
    pub number_of_rows: u32,
    pub number_of_cols: u32,
}

impl SheetDimensions {
    pub const fn new(number_of_cols: u32, number_of_rows: u32) -> Self {
        Self {
            number_of_rows,
            number_of_cols,
        }
    }
}

impl Default for SheetDimensions {
    fn default() -> Self {
        Self::new(26, 100)
    }
}

/// Name/id/size lookups the range model needs from the surrounding workbook.
pub trait SheetResolver {
    /// Resolve a sheet name (case-insensitive) to its id.
    fn sheet_id(&self, name: &str) -> Option<SheetId>;
    fn sheet_name(&self, id: SheetId) -> Option<&str>;
    fn sheet_dimensions(&self, id: SheetId) -> Option<SheetDimensions>;
}

#[derive(Debug, Clone)]
struct SheetEntry {
    name: String,
    dims: SheetDimensions,
}

/// In-memory sheet table: ids, names, display order, and dimensions.
#[derive(Default, Debug, Clone)]
pub struct SheetRegistry {
    id_by_name: HashMap<String, SheetId>,
    entries: Vec<Option<SheetEntry>>,
    order: Vec<SheetId>,
}

impl SheetRegistry {
    pub fn new() -> Self {
        SheetRegistry::default()
    }

    /// Return the id for `name`, creating the sheet with default dimensions if needed.
    pub fn id_for(&mut self, name: &str) -> Result<SheetId, SheetError> {
        self.add_sheet(name, SheetDimensions::default())
    }

    /// Create a sheet. If a sheet with that name exists its id is returned unchanged.
    pub fn add_sheet(&mut self, name: &str, dims: SheetDimensions) -> Result<SheetId, SheetError> {
        if let Some(id) = self.get_id(name) {
            return Ok(id);
        }
        let id = SheetId::try_from(self.entries.len())
            .map_err(|_| SheetError::IdsExhausted(name.to_string()))?;
        self.entries.push(Some(SheetEntry {
            name: name.to_string(),
            dims,
        }));
        self.id_by_name.insert(name.to_lowercase(), id);
        self.order.push(id);
        Ok(id)
    }

    pub fn get_id(&self, name: &str) -> Option<SheetId> {
        self.id_by_name.get(&name.to_lowercase()).copied()
    }

    pub fn name(&self, id: SheetId) -> Option<&str> {
        self.entry(id).map(|e| e.name.as_str())
    }

    pub fn dimensions(&self, id: SheetId) -> Option<SheetDimensions> {
        self.entry(id).map(|e| e.dims)
    }

    pub fn contains(&self, id: SheetId) -> bool {
        self.entry(id).is_some()
    }

    /// Sheet ids in display order.
    pub fn order(&self) -> &[SheetId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Rename a sheet, returning the previous name.
    pub fn rename(&mut self, id: SheetId, new_name: &str) -> Option<String> {
        if let Some(existing) = self.get_id(new_name)
            && existing != id
        {
            return None;
        }
        let entry = self.entries.get_mut(id as usize)?.as_mut()?;
        let old = std::mem::replace(&mut entry.name, new_name.to_string());
        self.id_by_name.remove(&old.to_lowercase());
        self.id_by_name.insert(new_name.to_lowercase(), id);
        Some(old)
    }

    /// Move a sheet by `delta` positions in the display order. Returns the new index.
    pub fn move_sheet(&mut self, id: SheetId, delta: i32) -> Option<usize> {
        let from = self.order.iter().position(|&s| s == id)?;
        let to = from as i64 + delta as i64;
        if to < 0 || to >= self.order.len() as i64 {
            return None;
        }
        let to = to as usize;
        self.order.remove(from);
        self.order.insert(to, id);
        Some(to)
    }

    /// Delete a sheet, returning its last name.
    pub fn delete(&mut self, id: SheetId) -> Option<String> {
        let entry = self.entries.get_mut(id as usize)?.take()?;
        self.id_by_name.remove(&entry.name.to_lowercase());
        self.order.retain(|&s| s != id);
        Some(entry.name)
    }

    pub fn resize(&mut self, id: SheetId, dims: SheetDimensions) -> bool {
        match self.entries.get_mut(id as usize).and_then(Option::as_mut) {
            Some(entry) => {
                entry.dims = dims;
                true
            }
            None => false,
        }
    }

    fn entry(&self, id: SheetId) -> Option<&SheetEntry> {
        self.entries.get(id as usize).and_then(Option::as_ref)
    }
}

impl SheetResolver for SheetRegistry {
    fn sheet_id(&self, name: &str) -> Option<SheetId> {
        self.get_id(name)
    }

    fn sheet_name(&self, id: SheetId) -> Option<&str> {
        self.name(id)
    }

    fn sheet_dimensions(&self, id: SheetId) -> Option<SheetDimensions> {
        self.dimensions(id)
    }
}
