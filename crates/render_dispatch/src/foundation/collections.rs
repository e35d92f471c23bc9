//! Handle types for referencing host-owned domain objects

use slotmap::new_key_type;

new_key_type! {
    /// Non-owning reference to a domain object (unit, structure, effect, ...)
    ///
    /// The dispatcher copies handles around but never dereferences them; only
    /// the host's own storage and render callbacks give them meaning. A handle
    /// is valid for the frame it was submitted in.
    pub struct ObjectHandle;
}

/// Host-side storage keyed by [`ObjectHandle`]
pub type HandleMap<T> = slotmap::SlotMap<ObjectHandle, T>;
