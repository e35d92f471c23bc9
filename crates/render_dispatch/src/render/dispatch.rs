//! # Dispatcher
//!
//! Walks the ordered buffer and calls the render callback registered for each
//! entry's kind. Callbacks live in a [`DispatchTable`] indexed by
//! [`DrawableKind`], one slot per kind.
//!
//! A failing callback never stops the frame: the error is logged, counted in
//! the [`DispatchReport`], and dispatch moves on to the next entry.

use thiserror::Error;

use crate::foundation::collections::ObjectHandle;
use crate::foundation::math::ViewTransform;
use crate::render::kinds::DrawableKind;
use crate::render::submission::SubmissionEntry;

/// Failure of a single draw
#[derive(Error, Debug)]
pub enum DrawError {
    /// No callback registered for the entry's kind
    #[error("No renderer registered for {0:?}")]
    NoRenderer(DrawableKind),

    /// The handle's visual data is unavailable (model failed to load, object gone)
    #[error("Missing render data for {kind:?}: {reason}")]
    MissingRenderData {
        /// Kind of the failed entry
        kind: DrawableKind,
        /// What was missing
        reason: String,
    },

    /// The underlying renderer rejected the draw
    #[error("Rendering error: {0}")]
    Backend(String),
}

/// Render callback for one kind
pub type RenderFn<'a> = Box<dyn FnMut(ObjectHandle, &ViewTransform) -> Result<(), DrawError> + 'a>;

/// Fixed table of per-kind render callbacks
pub struct DispatchTable<'a> {
    slots: [Option<RenderFn<'a>>; DrawableKind::COUNT],
}

impl<'a> DispatchTable<'a> {
    /// Create a table with no callbacks registered
    pub fn new() -> Self {
        Self {
            slots: std::array::from_fn(|_| None),
        }
    }

    /// Register the callback for `kind`, replacing any previous one
    pub fn set<F>(&mut self, kind: DrawableKind, render: F)
    where
        F: FnMut(ObjectHandle, &ViewTransform) -> Result<(), DrawError> + 'a,
    {
        self.slots[kind.index()] = Some(Box::new(render));
    }

    /// Builder form of [`set`](Self::set)
    pub fn with<F>(mut self, kind: DrawableKind, render: F) -> Self
    where
        F: FnMut(ObjectHandle, &ViewTransform) -> Result<(), DrawError> + 'a,
    {
        self.set(kind, render);
        self
    }

    /// Whether `kind` has a callback
    pub fn has(&self, kind: DrawableKind) -> bool {
        self.slots[kind.index()].is_some()
    }

    /// Render one object through its kind's callback
    pub fn render(&mut self, kind: DrawableKind, handle: ObjectHandle, view: &ViewTransform) -> Result<(), DrawError> {
        match self.slots[kind.index()].as_mut() {
            Some(render) => render(handle, view),
            None => Err(DrawError::NoRenderer(kind)),
        }
    }
}

impl Default for DispatchTable<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DispatchTable<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let registered: Vec<_> = DrawableKind::ALL.iter().filter(|k| self.has(**k)).collect();
        f.debug_struct("DispatchTable").field("registered", &registered).finish()
    }
}

/// Outcome of dispatching one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Callbacks invoked, successful or not
    pub dispatched: usize,
    /// Callbacks that returned an error (including missing callbacks)
    pub failed: usize,
    /// Consecutive entries whose render state differed
    pub state_changes: usize,
}

/// Calls render callbacks in buffer order
pub struct Dispatcher;

impl Dispatcher {
    /// Dispatch every entry exactly once, in order
    pub fn dispatch(entries: &[SubmissionEntry], view: &ViewTransform, table: &mut DispatchTable<'_>) -> DispatchReport {
        let mut report = DispatchReport::default();
        let mut warned_missing = [false; DrawableKind::COUNT];
        let mut last_state = None;

        for entry in entries {
            if last_state.is_some_and(|state| state != entry.render_state) {
                report.state_changes += 1;
            }
            last_state = Some(entry.render_state);

            report.dispatched += 1;
            match table.render(entry.kind, entry.handle, view) {
                Ok(()) => {}
                Err(DrawError::NoRenderer(kind)) => {
                    report.failed += 1;
                    if !std::mem::replace(&mut warned_missing[kind.index()], true) {
                        log::warn!("No renderer registered for {:?}; skipping its entries this frame", kind);
                    }
                }
                Err(e) => {
                    report.failed += 1;
                    log::warn!("Skipping {:?} {:?}: {}", entry.kind, entry.handle, e);
                }
            }
        }

        report
    }
}
