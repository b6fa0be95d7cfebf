//! # Relay Core
//!
//! Vendor-neutral building blocks for wrapping a callback-based SDK in
//! streams and futures.
//!
//! ## Event Fan-Out
//!
//! An SDK that accepts a single delegate per event category is registered
//! against once, and every callback is republished as an [`EventEnvelope`] on
//! a [`Broadcast`]. Consumers attach [`FilteredView`]s scoped to one entity (or
//! to [`Scope::Global`]) without registering anything with the SDK themselves:
//!
//! ```text
//!                    ┌───────────┐     ┌──────────────────────┐
//! ┌──────────┐       │           │────▶│ FilteredView(ch-42)  │
//! │   SDK    │──────▶│ Broadcast │────▶│ FilteredView(ch-7)   │
//! │ callback │       │           │────▶│ FilteredView(global) │
//! └──────────┘       └───────────┘     └──────────────────────┘
//! ```
//!
//! Routing compares [`EntityId`]s, never object identity. The process-wide
//! instance of whatever owns the broadcasts lives in a [`Singleton`].
//!
//! ## Request Adaptation
//!
//! The [`request`](mod@request) module turns `(value?, error?)` completion handlers into:
//!
//! - [`CallbackFuture`] for single results,
//! - [`ProgressStream`] for transfers that report progress,
//! - [`PendingSend`] for sends that return a provisional object first.
//!
//! ## Example
//!
//! ```rust,ignore
//! use relay_core::{Broadcast, EventEnvelope, EntityId, FilteredView, Scope};
//!
//! let bus = Broadcast::new();
//! let mut view = FilteredView::new(&bus, Scope::Entity("channel-42".into()));
//!
//! bus.publish(EventEnvelope::for_entity(&EntityId::from("channel-7"), "ignored"));
//! bus.publish(EventEnvelope::for_entity(&EntityId::from("channel-42"), "hello"));
//!
//! assert_eq!(view.recv().await, Some("hello"));
//! ```

pub mod broadcast;
pub mod entity;
pub mod error;
pub mod request;
pub mod singleton;
pub mod view;

pub use broadcast::{Broadcast, Subscription};
pub use entity::{Entity, EntityId, EventEnvelope, Scope};
pub use error::{InvariantViolation, RequestError, RequestResult, SendFailure, SendResult};
pub use request::{
    CallbackFuture, Completion, ErrorCompletion, PendingSend, Progress, ProgressHandler,
    ProgressStream, SendEvent, SignalCompletion, TransferProgress, request, request_message,
    request_or_default, request_unit, request_with_progress, send, send_with_progress, signal,
};
pub use singleton::Singleton;
pub use view::FilteredView;

/// Prelude for common imports.
pub mod prelude {
    pub use super::entity::{Entity, EntityId, Scope};
    pub use super::error::{RequestError, SendFailure};
    pub use super::request::{Progress, SendEvent, TransferProgress};
    pub use super::view::FilteredView;
}
