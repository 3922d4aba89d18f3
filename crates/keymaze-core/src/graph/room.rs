//! Rooms of the dungeon graph

use core::fmt;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::condition::Condition;
use super::edge::Edge;
use super::geom::Vec2;
use super::symbol::Symbol;

/// Identifier of a room. Ids are assigned by the spatial constraints
/// collaborator, not by this crate.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct RoomId(pub i32);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A node of the dungeon graph.
///
/// A room owns the grid coordinates it covers, at most one item, a
/// precondition describing what a player needs to get here, its outgoing
/// edges, and an intensity score. The `parent`/`children` links form the
/// spanning tree the generator grew the room from; they are ids into the
/// owning [`RoomLayout`](super::RoomLayout) and stay in place after
/// generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    id: RoomId,
    coords: BTreeSet<Vec2>,
    center: Vec2,
    item: Option<Symbol>,
    edges: Vec<Edge>,
    precond: Condition,
    intensity: f64,
    parent: Option<RoomId>,
    children: Vec<RoomId>,
}

impl Room {
    /// Create a room covering `coords`. The center is the integer-truncated
    /// average of the coordinates.
    pub fn new(
        id: RoomId,
        coords: BTreeSet<Vec2>,
        parent: Option<RoomId>,
        item: Option<Symbol>,
        precond: Condition,
    ) -> Self {
        let center = centroid(&coords);
        Self {
            id,
            coords,
            center,
            item,
            edges: Vec::new(),
            precond,
            intensity: 0.0,
            parent,
            children: Vec::new(),
        }
    }

    pub const fn id(&self) -> RoomId {
        self.id
    }

    pub const fn coords(&self) -> &BTreeSet<Vec2> {
        &self.coords
    }

    pub const fn center(&self) -> Vec2 {
        self.center
    }

    pub const fn item(&self) -> Option<Symbol> {
        self.item
    }

    pub fn set_item(&mut self, item: Option<Symbol>) {
        self.item = item;
    }

    pub const fn precond(&self) -> Condition {
        self.precond
    }

    pub fn set_precond(&mut self, precond: Condition) {
        self.precond = precond;
    }

    pub const fn intensity(&self) -> f64 {
        self.intensity
    }

    pub fn set_intensity(&mut self, intensity: f64) {
        self.intensity = intensity;
    }

    /// Outgoing edges, in creation order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// The outgoing edge to `target`, if one exists.
    pub fn edge(&self, target: RoomId) -> Option<&Edge> {
        self.edges.iter().find(|edge| edge.target() == target)
    }

    /// Set or replace the outgoing edge to `target`. Targets stay unique.
    pub fn set_edge(&mut self, target: RoomId, symbol: Option<Symbol>) {
        let edge = Edge::new(target, symbol);
        match self.edges.iter_mut().find(|e| e.target() == target) {
            Some(existing) => *existing = edge,
            None => self.edges.push(edge),
        }
    }

    pub const fn parent(&self) -> Option<RoomId> {
        self.parent
    }

    pub fn set_parent(&mut self, parent: Option<RoomId>) {
        self.parent = parent;
    }

    /// Construction-tree children, in placement order.
    pub fn children(&self) -> &[RoomId] {
        &self.children
    }

    pub fn add_child(&mut self, child: RoomId) {
        self.children.push(child);
    }

    /// Check if this room has no construction-tree children
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_start(&self) -> bool {
        self.item == Some(Symbol::Start)
    }

    pub fn is_goal(&self) -> bool {
        self.item == Some(Symbol::Goal)
    }

    pub fn is_boss(&self) -> bool {
        self.item == Some(Symbol::Boss)
    }

    pub fn is_switch(&self) -> bool {
        self.item == Some(Symbol::Switch)
    }
}

/// Integer-truncated average of a coordinate set. Empty sets center on the
/// origin.
fn centroid(coords: &BTreeSet<Vec2>) -> Vec2 {
    if coords.is_empty() {
        return Vec2::new(0, 0);
    }
    let mut sum_x: i64 = 0;
    let mut sum_y: i64 = 0;
    for point in coords {
        sum_x += i64::from(point.x);
        sum_y += i64::from(point.y);
    }
    let count = coords.len() as i64;
    Vec2::new((sum_x / count) as i32, (sum_y / count) as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coords(points: &[(i32, i32)]) -> BTreeSet<Vec2> {
        points.iter().map(|&(x, y)| Vec2::new(x, y)).collect()
    }

    fn room(points: &[(i32, i32)]) -> Room {
        Room::new(RoomId(1), coords(points), None, None, Condition::new())
    }

    #[test]
    fn test_center_is_truncated_average() {
        assert_eq!(room(&[(0, 0), (1, 1), (2, 2)]).center(), Vec2::new(1, 1));
        // 0+1 = 1, 1/2 truncates to 0.
        assert_eq!(room(&[(0, 0), (1, 1)]).center(), Vec2::new(0, 0));
    }

    #[test]
    fn test_set_edge_replaces_existing_target() {
        let mut r = room(&[(0, 0)]);
        r.set_edge(RoomId(2), None);
        r.set_edge(RoomId(3), None);
        r.set_edge(RoomId(2), Some(Symbol::Key(0)));

        assert_eq!(r.edges().len(), 2);
        assert_eq!(r.edge(RoomId(2)).unwrap().symbol(), Some(Symbol::Key(0)));
        assert_eq!(r.edge(RoomId(3)).unwrap().symbol(), None);
        assert!(r.edge(RoomId(4)).is_none());
    }

    #[test]
    fn test_item_predicates() {
        let mut r = room(&[(0, 0)]);
        assert!(!r.is_start() && !r.is_goal() && !r.is_boss() && !r.is_switch());
        r.set_item(Some(Symbol::Boss));
        assert!(r.is_boss());
    }

    #[test]
    fn test_tree_links() {
        let mut r = room(&[(0, 0)]);
        assert!(r.is_leaf());
        r.add_child(RoomId(5));
        r.add_child(RoomId(6));
        assert!(!r.is_leaf());
        assert_eq!(r.children(), &[RoomId(5), RoomId(6)]);
    }
}
