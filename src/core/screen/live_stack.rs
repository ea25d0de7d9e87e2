//=========================================================================
// Live Stack
//=========================================================================
//
// Ordered list of presented screens, bottom first.
//
// Invariant: sorted ascending by layer; among equal layers the most
// recently inserted-from-top entry sits nearest the top.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use super::{Layer, ScreenHandle};

//=== LiveEntry ===========================================================

/// One presented screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveEntry {
    id: u32,
    name: String,
    layer: Layer,
    handle: ScreenHandle,
    focused: bool,
}

impl LiveEntry {
    pub(crate) fn new(id: u32, name: impl Into<String>, layer: Layer, handle: ScreenHandle) -> Self {
        Self {
            id,
            name: name.into(),
            layer,
            handle,
            focused: false,
        }
    }

    /// Id unique within the entry's layer.
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn layer(&self) -> Layer {
        self.layer
    }

    pub fn handle(&self) -> ScreenHandle {
        self.handle
    }

    /// Whether the screen has received `on_focus` without a matching
    /// `on_lost_focus` since.
    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub(crate) fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn same_slot(&self, other: &LiveEntry) -> bool {
        self.name == other.name && self.layer == other.layer
    }
}

//=== LiveStack ===========================================================

#[derive(Debug, Default)]
pub(crate) struct LiveStack {
    entries: Vec<LiveEntry>,
}

impl LiveStack {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    //--- Queries ----------------------------------------------------------

    pub(crate) fn entries(&self) -> &[LiveEntry] {
        &self.entries
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn top(&self) -> Option<&LiveEntry> {
        self.entries.last()
    }

    pub(crate) fn get(&self, handle: ScreenHandle) -> Option<&LiveEntry> {
        self.entries.iter().find(|entry| entry.handle == handle)
    }

    pub(crate) fn get_mut(&mut self, handle: ScreenHandle) -> Option<&mut LiveEntry> {
        self.entries.iter_mut().find(|entry| entry.handle == handle)
    }

    pub(crate) fn contains(&self, handle: ScreenHandle) -> bool {
        self.get(handle).is_some()
    }

    /// True when the entry directly below `handle` shows the same screen
    /// (same name and layer) through a different instance.
    pub(crate) fn is_superseded(&self, handle: ScreenHandle) -> bool {
        let Some(index) = self.position(handle) else {
            return false;
        };
        index > 0 && self.entries[index - 1].same_slot(&self.entries[index])
    }

    /// Smallest positive id not used by a live entry of `layer`.
    pub(crate) fn next_id(&self, layer: Layer) -> u32 {
        let mut id = 1;
        while self
            .entries
            .iter()
            .any(|entry| entry.layer == layer && entry.id == id)
        {
            id += 1;
        }
        id
    }

    pub(crate) fn is_sorted(&self) -> bool {
        self.entries.windows(2).all(|pair| pair[0].layer <= pair[1].layer)
    }

    //--- Mutation ---------------------------------------------------------

    /// Scans from the top down for the first entry with a layer at or below
    /// the new one and inserts right above it.
    pub(crate) fn insert_from_top(&mut self, entry: LiveEntry) {
        let index = self
            .entries
            .iter()
            .rposition(|existing| existing.layer <= entry.layer)
            .map_or(0, |found| found + 1);
        self.entries.insert(index, entry);
    }

    /// Scans from the bottom up for the first entry with a layer at or above
    /// the new one and inserts right below it.
    pub(crate) fn insert_from_bottom(&mut self, entry: LiveEntry) {
        let index = self
            .entries
            .iter()
            .position(|existing| existing.layer >= entry.layer)
            .unwrap_or(self.entries.len());
        self.entries.insert(index, entry);
    }

    pub(crate) fn remove(&mut self, handle: ScreenHandle) -> Option<LiveEntry> {
        let index = self.position(handle)?;
        Some(self.entries.remove(index))
    }

    fn position(&self, handle: ScreenHandle) -> Option<usize> {
        self.entries.iter().position(|entry| entry.handle == handle)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
