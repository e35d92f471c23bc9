//! # Depth-Ordered Render Dispatch
//!
//! Collects every potentially visible drawable once per frame, keys it by
//! depth or render state, orders the lot far to near and calls the matching
//! per-kind render callback.
//!
//! ## Pipeline
//!
//! - **Depth-Key Calculator** ([`depth_key`]): clip test and key per kind
//! - **Submission Buffer** ([`submission`]): reusable per-frame entry arena
//! - **Orderer** ([`ordering`]): full sort or bucket quantization
//! - **Dispatcher** ([`dispatch`]): per-kind callback table
//! - **Frame Controller** ([`frame`]): begin / submit / render lifecycle
//!
//! Everything here runs on the thread that owns the graphics context, within
//! one render-loop iteration.

pub mod kinds;
pub mod projection;
pub mod depth_key;
pub mod submission;
pub mod ordering;
pub mod dispatch;
pub mod frame;

#[cfg(test)]
mod tests;

pub use kinds::{DrawableKind, DrawableDesc, DrawableSource, EffectGroup, KindDetail, OrderingTier};
pub use projection::{PerspectiveProjector, Projection, Projector, Viewport};
pub use depth_key::{DepthKey, DepthKeyCalculator, FrameView, KeyVerdict, RejectReason};
pub use submission::{SubmissionBuffer, SubmissionEntry};
pub use ordering::Orderer;
pub use dispatch::{DispatchReport, DispatchTable, Dispatcher, DrawError, RenderFn};
pub use frame::{FrameController, FrameError, FrameState, FrameStats, SubmitOutcome};
