//! Container for the rooms of one dungeon

use std::collections::BTreeMap;
use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use super::geom::Rect;
use super::room::{Room, RoomId};
use super::symbol::Symbol;

/// All rooms of one dungeon, indexed by id, plus the union bounding
/// rectangle of their coordinates.
///
/// Rooms iterate in insertion order. The bounds only ever grow as rooms are
/// added. During generation the layout is exclusively owned by the
/// generator; afterwards it is handed to whatever renders it onto a grid.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "LayoutRepr", into = "LayoutRepr")]
pub struct RoomLayout {
    rooms: Vec<Room>,
    index: BTreeMap<RoomId, usize>,
    bounds: Option<Rect>,
}

/// Serialized form: the id index is derived, so only rooms and bounds are
/// persisted.
#[derive(Serialize, Deserialize)]
#[serde(rename = "RoomLayout")]
struct LayoutRepr {
    rooms: Vec<Room>,
    bounds: Option<Rect>,
}

impl From<LayoutRepr> for RoomLayout {
    fn from(repr: LayoutRepr) -> Self {
        let index = repr
            .rooms
            .iter()
            .enumerate()
            .map(|(slot, room)| (room.id(), slot))
            .collect();
        Self {
            rooms: repr.rooms,
            index,
            bounds: repr.bounds,
        }
    }
}

impl From<RoomLayout> for LayoutRepr {
    fn from(layout: RoomLayout) -> Self {
        Self {
            rooms: layout.rooms,
            bounds: layout.bounds,
        }
    }
}

impl RoomLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a room and grow the bounds over its coordinates.
    ///
    /// Ids are unique; inserting a duplicate is a logic error in the
    /// generator.
    pub fn add(&mut self, room: Room) {
        assert!(
            !self.index.contains_key(&room.id()),
            "duplicate room id {}",
            room.id()
        );
        for &point in room.coords() {
            self.bounds = Some(match self.bounds {
                None => Rect::from_point(point),
                Some(bounds) => bounds.expanded_to(point),
            });
        }
        self.index.insert(room.id(), self.rooms.len());
        self.rooms.push(room);
    }

    pub fn get(&self, id: RoomId) -> Option<&Room> {
        self.index.get(&id).map(|&slot| &self.rooms[slot])
    }

    pub fn get_mut(&mut self, id: RoomId) -> Option<&mut Room> {
        match self.index.get(&id) {
            Some(&slot) => Some(&mut self.rooms[slot]),
            None => None,
        }
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// All rooms, in insertion order.
    pub fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.rooms.iter()
    }

    /// Ids of all rooms, in insertion order.
    pub fn room_ids(&self) -> Vec<RoomId> {
        self.rooms.iter().map(Room::id).collect()
    }

    /// Set or replace the edge from `from` to `to`.
    pub fn link_one_way(&mut self, from: RoomId, to: RoomId, symbol: Option<Symbol>) {
        self[from].set_edge(to, symbol);
    }

    /// Set or replace the edges between `a` and `b` in both directions.
    pub fn link(&mut self, a: RoomId, b: RoomId, symbol: Option<Symbol>) {
        self.link_one_way(a, b, symbol);
        self.link_one_way(b, a, symbol);
    }

    /// Check if an edge exists in either direction
    pub fn rooms_are_linked(&self, a: RoomId, b: RoomId) -> bool {
        self[a].edge(b).is_some() || self[b].edge(a).is_some()
    }

    /// The unique room carrying the start marker, if placed yet.
    pub fn find_start(&self) -> Option<&Room> {
        self.find_item(Symbol::Start)
    }

    /// The unique room carrying the boss marker, if placed yet.
    pub fn find_boss(&self) -> Option<&Room> {
        self.find_item(Symbol::Boss)
    }

    /// The unique room carrying the goal marker, if placed yet.
    pub fn find_goal(&self) -> Option<&Room> {
        self.find_item(Symbol::Goal)
    }

    /// The unique room carrying the switch item, if placed yet.
    pub fn find_switch(&self) -> Option<&Room> {
        self.find_item(Symbol::Switch)
    }

    /// Union bounding rectangle over every room's coordinates. `None` while
    /// the layout is empty.
    pub fn extent_bounds(&self) -> Option<Rect> {
        self.bounds
    }

    fn find_item(&self, item: Symbol) -> Option<&Room> {
        self.rooms.iter().find(|room| room.item() == Some(item))
    }
}

impl Index<RoomId> for RoomLayout {
    type Output = Room;

    fn index(&self, id: RoomId) -> &Room {
        match self.get(id) {
            Some(room) => room,
            None => panic!("no room with id {id}"),
        }
    }
}

impl IndexMut<RoomId> for RoomLayout {
    fn index_mut(&mut self, id: RoomId) -> &mut Room {
        match self.index.get(&id) {
            Some(&slot) => &mut self.rooms[slot],
            None => panic!("no room with id {id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::super::condition::Condition;
    use super::super::geom::Vec2;
    use super::*;

    fn room_at(id: i32, x: i32, y: i32) -> Room {
        let coords: BTreeSet<Vec2> = [Vec2::new(x, y)].into_iter().collect();
        Room::new(RoomId(id), coords, None, None, Condition::new())
    }

    fn room_with_item(id: i32, item: Symbol) -> Room {
        let mut room = room_at(id, id, 0);
        room.set_item(Some(item));
        room
    }

    #[test]
    fn test_add_preserves_insertion_order() {
        let mut layout = RoomLayout::new();
        layout.add(room_at(5, 0, 0));
        layout.add(room_at(2, 1, 0));
        layout.add(room_at(9, 2, 0));
        let ids: Vec<RoomId> = layout.rooms().map(Room::id).collect();
        assert_eq!(ids, vec![RoomId(5), RoomId(2), RoomId(9)]);
        assert_eq!(layout.room_count(), 3);
    }

    #[test]
    fn test_bounds_grow_over_added_rooms() {
        let mut layout = RoomLayout::new();
        assert_eq!(layout.extent_bounds(), None);

        layout.add(room_at(1, 0, 0));
        let first = layout.extent_bounds().unwrap();
        assert_eq!((first.width, first.height), (1, 1));

        layout.add(room_at(2, 4, -2));
        let grown = layout.extent_bounds().unwrap();
        assert!(grown.contains(Vec2::new(0, 0)));
        assert!(grown.contains(Vec2::new(4, -2)));
        assert_eq!((grown.x, grown.y), (0, -2));
    }

    #[test]
    fn test_link_is_symmetric_and_replaces() {
        let mut layout = RoomLayout::new();
        layout.add(room_at(1, 0, 0));
        layout.add(room_at(2, 1, 0));

        assert!(!layout.rooms_are_linked(RoomId(1), RoomId(2)));
        layout.link(RoomId(1), RoomId(2), None);
        assert!(layout.rooms_are_linked(RoomId(1), RoomId(2)));

        layout.link(RoomId(1), RoomId(2), Some(Symbol::Key(0)));
        assert_eq!(
            layout[RoomId(1)].edge(RoomId(2)).unwrap().symbol(),
            Some(Symbol::Key(0))
        );
        assert_eq!(
            layout[RoomId(2)].edge(RoomId(1)).unwrap().symbol(),
            Some(Symbol::Key(0))
        );
        // Relinking replaced the edge rather than adding a second one.
        assert_eq!(layout[RoomId(1)].edges().len(), 1);
    }

    #[test]
    fn test_link_one_way_is_directed() {
        let mut layout = RoomLayout::new();
        layout.add(room_at(1, 0, 0));
        layout.add(room_at(2, 1, 0));
        layout.link_one_way(RoomId(1), RoomId(2), None);
        assert!(layout[RoomId(1)].edge(RoomId(2)).is_some());
        assert!(layout[RoomId(2)].edge(RoomId(1)).is_none());
        // Either direction counts as linked.
        assert!(layout.rooms_are_linked(RoomId(1), RoomId(2)));
    }

    #[test]
    fn test_marker_room_search() {
        let mut layout = RoomLayout::new();
        layout.add(room_with_item(1, Symbol::Start));
        layout.add(room_at(2, 2, 0));
        layout.add(room_with_item(3, Symbol::Boss));
        layout.add(room_with_item(4, Symbol::Goal));

        assert_eq!(layout.find_start().unwrap().id(), RoomId(1));
        assert_eq!(layout.find_boss().unwrap().id(), RoomId(3));
        assert_eq!(layout.find_goal().unwrap().id(), RoomId(4));
        assert!(layout.find_switch().is_none());
    }

    #[test]
    #[should_panic(expected = "duplicate room id")]
    fn test_duplicate_id_panics() {
        let mut layout = RoomLayout::new();
        layout.add(room_at(1, 0, 0));
        layout.add(room_at(1, 5, 5));
    }

    #[test]
    fn test_serde_round_trip() {
        let mut layout = RoomLayout::new();
        layout.add(room_with_item(1, Symbol::Start));
        layout.add(room_at(2, 3, 4));
        layout.link(RoomId(1), RoomId(2), Some(Symbol::Key(0)));

        let json = serde_json::to_string(&layout).unwrap();
        let restored: RoomLayout = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.room_count(), 2);
        assert_eq!(restored.find_start().unwrap().id(), RoomId(1));
        assert_eq!(
            restored[RoomId(1)].edge(RoomId(2)).unwrap().symbol(),
            Some(Symbol::Key(0))
        );
        assert_eq!(restored.extent_bounds(), layout.extent_bounds());
    }
}
