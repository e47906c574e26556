//! State identifier abstraction.
//!
//! Transitions are generic over the identifier type the owning machine
//! uses as its state keys. The crate imposes only equality, hashing and
//! cloning on that type, so small integers, interned strings and plain
//! enums all work unchanged.

use std::fmt::Debug;
use std::hash::Hash;

/// Marker trait for state identifier types.
///
/// Blanket-implemented for every type meeting the bounds, so callers
/// never implement it by hand.
///
/// # Example
///
/// ```rust
/// use segue::core::StateId;
///
/// #[derive(Clone, PartialEq, Eq, Hash, Debug)]
/// enum PlayerState {
///     Idle,
///     Run,
/// }
///
/// fn takes_id<S: StateId>(_id: S) {}
///
/// takes_id(PlayerState::Idle);
/// takes_id("idle");
/// takes_id(7u32);
/// ```
pub trait StateId: Clone + Eq + Hash + Debug + Send + Sync {}

impl<T: Clone + Eq + Hash + Debug + Send + Sync> StateId for T {}
