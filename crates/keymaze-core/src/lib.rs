//! keymaze-core: Lock-and-key dungeon topology generation
//!
//! This crate decides which rooms a dungeon has, which passages between them
//! are gated by which key or switch requirement, where the start, boss, goal,
//! switch, and key items sit, and how intense each room should feel. It knows
//! nothing about tiles or walls: spatial facts (coordinates, adjacency, item
//! fit) come from a caller-supplied [`Constraints`] implementation, and all
//! randomness flows through a caller-supplied [`RandomSource`].
//!
//! The output of a successful [`Generator::generate`] call is a
//! [`RoomLayout`] in which every room is reachable by a player who explores
//! and collects keys in graph order.

pub mod constraints;
pub mod error;
pub mod generate;
pub mod graph;
pub mod rng;

pub use constraints::Constraints;
pub use error::GenerateError;
pub use generate::{Generator, GeneratorConfig};
pub use graph::{Condition, Edge, Rect, Room, RoomId, RoomLayout, SwitchState, Symbol, Vec2};
pub use rng::{GenRng, RandomSource};
