//=========================================================================
// Layer
//=========================================================================
//
// Priority tier of a screen. The ordinal decides stacking order and
// which screens a transition closes.
//
//   Low < Popup < High < Alert
//
//=========================================================================

//=== Layer ===============================================================

/// Priority tier controlling stacking order.
///
/// The derived ordering follows declaration order, so `Layer::Low` is the
/// smallest and `Layer::Alert` the largest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Layer {
    /// Full-screen content (main menu, gameplay HUD).
    Low,

    /// Dialogs stacked over content; at most one kind live at a time.
    Popup,

    /// Full-screen overlays that replace the current content (loading).
    High,

    /// Notifications that always stack on top and never close others.
    Alert,
}

//=========================================================================
// Unit Tests
//=========================================================================
