//! Spatial constraints consumed by the generator
//!
//! The generator never decides what "adjacent" means on a grid; it asks an
//! implementation of [`Constraints`] instead. Implementations map abstract
//! room ids onto whatever space the dungeon will eventually be rendered into.

use std::collections::BTreeSet;

use crate::graph::{RoomId, RoomLayout, Symbol, Vec2};

/// Spatial and budget facts the generator builds against.
///
/// Implementations are treated as read-only for the duration of one
/// generation: repeated calls with the same arguments must return the same
/// answers within a single [`Generator::generate`](crate::Generator::generate)
/// invocation.
pub trait Constraints {
    /// Number of rooms the finished layout must contain.
    fn max_rooms(&self) -> usize;

    /// Number of distinct key symbols to place.
    fn max_keys(&self) -> usize;

    /// Switch budget. Zero disables the switch phase entirely.
    fn max_switches(&self) -> usize;

    /// Room ids the entrance may be placed in. Must be non-empty.
    fn initial_rooms(&self) -> Vec<RoomId>;

    /// Grid coordinates covered by a room.
    fn coords_of(&self, id: RoomId) -> BTreeSet<Vec2>;

    /// Ids of rooms spatially adjacent to `id`.
    ///
    /// `key_level_ceiling` is the highest key level the caller is currently
    /// building at; implementations may use it to withhold space reserved
    /// for later levels. `None` means no filtering.
    fn adjacent_rooms(&self, id: RoomId, key_level_ceiling: Option<usize>) -> Vec<RoomId>;

    /// Whether the room can physically host the given item.
    fn room_can_fit_item(&self, id: RoomId, item: Symbol) -> bool;

    /// Probability in `[0, 1]` of adding an extra edge between two adjacent
    /// rooms during graphification.
    fn edge_densification_probability(&self, a: RoomId, b: RoomId) -> f64;

    /// Final global check over a finished layout. Returning false discards
    /// the layout and retries the whole pipeline.
    fn is_acceptable(&self, layout: &RoomLayout) -> bool;
}
