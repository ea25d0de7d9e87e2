//=========================================================================
// Payload
//=========================================================================
//
// Shared, type-erased data travelling with a load job. The same payload
// reaches `on_created` and `on_start`, and a loading screen forwards it
// unchanged to the screen it opens next.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::Any;
use std::fmt;
use std::rc::Rc;

//=== Payload =============================================================

/// Opaque job payload. Cloning shares the underlying value.
#[derive(Clone, Default)]
pub struct Payload(Option<Rc<dyn Any>>);

impl Payload {
    /// Payload carrying nothing.
    pub fn none() -> Self {
        Self(None)
    }

    /// Wraps an owned value.
    pub fn new<T: Any>(value: T) -> Self {
        Self(Some(Rc::new(value)))
    }

    /// Wraps an already shared value without copying it.
    pub fn from_rc<T: Any>(value: Rc<T>) -> Self {
        Self(Some(value))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    /// Borrows the value if it has type `T`.
    pub fn get<T: Any>(&self) -> Option<&T> {
        self.0.as_deref().and_then(|value| value.downcast_ref::<T>())
    }

    /// Returns a shared pointer to the value if it has type `T`.
    pub fn shared<T: Any>(&self) -> Option<Rc<T>> {
        self.0.clone().and_then(|value| value.downcast::<T>().ok())
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(_) => f.write_str("Payload(..)"),
            None => f.write_str("Payload(None)"),
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
