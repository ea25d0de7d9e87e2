//=========================================================================
// Asset Source
//=========================================================================
//
// Contract for the collaborator that actually reads assets.
//
// The resource manager asks a source to begin one load at a time and
// polls the returned handle once per tick. What an asset is stays opaque
// to the crate; consumers downcast the `Rc<dyn Any>` they receive.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::{Any, TypeId};
use std::rc::Rc;

//=== Asset ===============================================================

/// A loaded asset, shared between the cache and every consumer.
pub type Asset = Rc<dyn Any>;

//=== AssetLoad ===========================================================

/// One in-progress load started by an [`AssetSource`].
pub trait AssetLoad {
    /// Returns the loaded assets once finished. An empty list is a valid
    /// result (nothing found at the path).
    fn poll(&mut self) -> Option<Vec<Asset>>;

    /// Stops the load and releases whatever it already produced.
    fn cancel(&mut self) {}
}

//=== AssetSource =========================================================

/// Starts asset loads by path.
pub trait AssetSource {
    /// Begins loading everything at `path`, restricted to `type_filter`
    /// when given. An empty path means the source root.
    fn begin(&mut self, path: &str, type_filter: Option<TypeId>) -> Box<dyn AssetLoad>;
}

//=== EmptyAssetSource ====================================================

/// Source with no assets. Every load completes on its first poll with an
/// empty result.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyAssetSource;

struct EmptyLoad;

impl AssetLoad for EmptyLoad {
    fn poll(&mut self) -> Option<Vec<Asset>> {
        Some(Vec::new())
    }
}

impl AssetSource for EmptyAssetSource {
    fn begin(&mut self, _path: &str, _type_filter: Option<TypeId>) -> Box<dyn AssetLoad> {
        Box::new(EmptyLoad)
    }
}
