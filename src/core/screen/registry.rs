//=========================================================================
// Screen Registry
//=========================================================================
//
// Templates keyed by logical name. At most one entry per name; live
// entries are the template itself (Low/High) or copies of it
// (Alert/Popup).
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;

//=== Internal Dependencies ===============================================

use super::ScreenHandle;

//=== RegistryEntry =======================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RegistryEntry {
    pub(crate) handle: ScreenHandle,
    pub(crate) cached: bool,
}

//=== Registry ============================================================

#[derive(Debug, Default)]
pub(crate) struct Registry {
    entries: HashMap<String, RegistryEntry>,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn get(&self, name: &str) -> Option<RegistryEntry> {
        self.entries.get(name).copied()
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registers a template, returning the entry it replaced.
    pub(crate) fn insert(
        &mut self,
        name: impl Into<String>,
        handle: ScreenHandle,
        cached: bool,
    ) -> Option<RegistryEntry> {
        self.entries.insert(name.into(), RegistryEntry { handle, cached })
    }

    pub(crate) fn set_cached(&mut self, name: &str, cached: bool) {
        if let Some(entry) = self.entries.get_mut(name) {
            entry.cached = cached;
        }
    }

    pub(crate) fn remove(&mut self, name: &str) -> Option<RegistryEntry> {
        self.entries.remove(name)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_entry_per_name() {
        let mut registry = Registry::new();

        assert!(registry.insert("Main", ScreenHandle::from_raw(1), false).is_none());
        let replaced = registry.insert("Main", ScreenHandle::from_raw(2), true);

        assert_eq!(replaced.map(|entry| entry.handle), Some(ScreenHandle::from_raw(1)));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("Main").map(|entry| entry.cached), Some(true));
    }

    #[test]
    fn set_cached_updates_existing_only() {
        let mut registry = Registry::new();
        registry.insert("Main", ScreenHandle::from_raw(1), false);

        registry.set_cached("Main", true);
        registry.set_cached("Missing", true);

        assert_eq!(registry.get("Main").map(|entry| entry.cached), Some(true));
        assert!(!registry.contains("Missing"));
    }
}
