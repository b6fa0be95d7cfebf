//! Entity identity and event envelopes.
//!
//! The wrapped SDK hands out fresh in-memory objects for the same logical
//! channel or call on every callback. Routing therefore never compares those
//! objects; it compares the [`EntityId`] each one reports through [`Entity`].

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

// ============================================================================
// EntityId
// ============================================================================

/// Logical identifier of a channel, call or user.
///
/// Two `EntityId`s are equal exactly when their string forms are equal,
/// regardless of which object produced them. Cloning is cheap.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(Arc<str>);

impl EntityId {
    /// Creates an identifier from any string-like value.
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({:?})", &*self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        Self(Arc::from(id))
    }
}

impl From<&String> for EntityId {
    fn from(id: &String) -> Self {
        Self::new(id)
    }
}

impl From<i64> for EntityId {
    fn from(id: i64) -> Self {
        Self(Arc::from(id.to_string()))
    }
}

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        Self(Arc::from(id.to_string()))
    }
}

impl Borrow<str> for EntityId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// Entity
// ============================================================================

/// Anything that can be routed by logical identity.
///
/// Implementations must return the same id for every representation of the
/// same logical entity (for channels, the channel URL; for calls, the call id).
pub trait Entity {
    /// Returns the logical identifier of this entity.
    fn entity_id(&self) -> EntityId;
}

impl Entity for EntityId {
    fn entity_id(&self) -> EntityId {
        self.clone()
    }
}

impl<T: Entity + ?Sized> Entity for &T {
    fn entity_id(&self) -> EntityId {
        (**self).entity_id()
    }
}

impl<T: Entity + ?Sized> Entity for Arc<T> {
    fn entity_id(&self) -> EntityId {
        (**self).entity_id()
    }
}

// ============================================================================
// Scope
// ============================================================================

/// Routing scope of an event.
///
/// User-level and connection-level events have no owning entity and use
/// [`Scope::Global`]; everything else names the entity it concerns.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    /// No owning entity.
    Global,
    /// Events concerning a single entity.
    Entity(EntityId),
}

impl Scope {
    /// Scope for the given entity.
    pub fn of(entity: &impl Entity) -> Self {
        Self::Entity(entity.entity_id())
    }

    /// Returns the entity id, or `None` for global events.
    pub fn entity_id(&self) -> Option<&EntityId> {
        match self {
            Self::Global => None,
            Self::Entity(id) => Some(id),
        }
    }

    /// Returns `true` if this is the global scope.
    pub fn is_global(&self) -> bool {
        matches!(self, Self::Global)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => f.write_str("<global>"),
            Self::Entity(id) => id.fmt(f),
        }
    }
}

impl From<EntityId> for Scope {
    fn from(id: EntityId) -> Self {
        Self::Entity(id)
    }
}

// ============================================================================
// EventEnvelope
// ============================================================================

/// A single delegate callback, paired with the scope it belongs to.
///
/// Envelopes are created when the external source calls in, published once,
/// and dropped.
#[derive(Debug, Clone)]
pub struct EventEnvelope<E> {
    /// Which entity the event concerns.
    pub scope: Scope,
    /// The event payload.
    pub event: E,
}

impl<E> EventEnvelope<E> {
    /// Wraps an event concerning `entity`.
    pub fn for_entity(entity: &impl Entity, event: E) -> Self {
        Self {
            scope: Scope::of(entity),
            event,
        }
    }

    /// Wraps an event with no owning entity.
    pub fn global(event: E) -> Self {
        Self {
            scope: Scope::Global,
            event,
        }
    }

    /// Returns `true` if this envelope belongs to `scope`.
    pub fn is_in(&self, scope: &Scope) -> bool {
        &self.scope == scope
    }

    /// Discards the scope and returns the payload.
    pub fn into_event(self) -> E {
        self.event
    }
}
