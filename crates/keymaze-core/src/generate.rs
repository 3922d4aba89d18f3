//! Dungeon graph construction
//!
//! Grows a spanning tree of rooms over the constraint space, places the
//! boss, goal, switch, and key items, densifies the tree into a graph, and
//! scores every room's intensity. Construction is randomized and runs under
//! a bounded retry loop: a phase that cannot satisfy its invariant discards
//! the half-built layout and the whole pipeline starts over.

use crate::constraints::Constraints;
use crate::error::GenerateError;
use crate::graph::{Condition, Room, RoomId, RoomLayout, SwitchState, Symbol};
use crate::rng::RandomSource;

use serde::{Deserialize, Serialize};

/// Full-pipeline restarts before generation gives up.
pub const MAX_RETRIES: u32 = 20;

/// Odds (1 in N) of ignoring the same-key-level parent preference while
/// growing the room tree.
pub const SAME_LEVEL_PARENT_ODDS: usize = 10;

/// Chance of gating any one tree edge below the chosen branch room during
/// switch placement.
pub const SWITCH_GATE_CHANCE: f64 = 0.25;

/// Branch-room draws before the switch phase gives up on the current layout.
pub const MAX_SWITCH_ATTEMPTS: u32 = 10;

/// How far each key level's base intensity backs off from the deepest point
/// of the previous level.
pub const INTENSITY_EASE_OFF: f64 = 0.2;

/// Total spread of the random jitter applied to intensities while walking a
/// level (half below, half above).
pub const INTENSITY_GROWTH_JITTER: f64 = 0.1;

/// Upper bound of the normalized intensity range. Only the boss room sits
/// above it, at exactly 1.0.
pub const INTENSITY_CEILING: f64 = 0.99;

/// Knobs for one generator instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Place a goal room behind the boss. When disabled the chosen dead-end
    /// leaf becomes the boss room itself.
    pub generate_goal: bool,
    /// Reserve the final key for the edge into the boss room.
    pub boss_room_locked: bool,
    /// Full-pipeline restarts to attempt before failing.
    pub max_retries: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            generate_goal: true,
            boss_room_locked: true,
            max_retries: MAX_RETRIES,
        }
    }
}

/// A randomized structural choice failed its invariant; the pipeline
/// restarts from a blank layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Retry;

/// No room anywhere has a free adjacent slot; room placement re-runs with a
/// smaller per-lock target without consuming the retry budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OutOfRooms;

enum AttemptFailure {
    Retry,
    Fatal(GenerateError),
}

/// Rooms grouped by the key level of their precondition. Used to pick
/// same-level parents, relocate the boss behind its own key level, seed the
/// intensity walks, and place keys.
#[derive(Debug, Clone, Default)]
struct KeyLevelMap {
    levels: Vec<Vec<RoomId>>,
}

impl KeyLevelMap {
    fn add_room(&mut self, level: usize, id: RoomId) {
        if self.levels.len() <= level {
            self.levels.resize_with(level + 1, Vec::new);
        }
        self.levels[level].push(id);
    }

    fn remove_room(&mut self, level: usize, id: RoomId) {
        if let Some(rooms) = self.levels.get_mut(level) {
            rooms.retain(|&other| other != id);
        }
    }

    fn rooms(&self, level: usize) -> &[RoomId] {
        self.levels.get(level).map_or(&[], Vec::as_slice)
    }

    fn level_count(&self) -> usize {
        self.levels.len()
    }
}

/// Builds lock-and-key dungeon graphs against a [`Constraints`] space.
///
/// One `generate` call runs the whole retry loop to completion and either
/// retains a finished [`RoomLayout`] or reports a fatal error. Nothing
/// partial is ever observable.
pub struct Generator<C, R> {
    constraints: C,
    rng: R,
    config: GeneratorConfig,
    layout: Option<RoomLayout>,
}

impl<C: Constraints, R: RandomSource> Generator<C, R> {
    pub fn new(constraints: C, rng: R, config: GeneratorConfig) -> Self {
        Self {
            constraints,
            rng,
            config,
            layout: None,
        }
    }

    pub fn constraints(&self) -> &C {
        &self.constraints
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// The most recently generated layout, if any.
    pub fn layout(&self) -> Option<&RoomLayout> {
        self.layout.as_ref()
    }

    /// Build a dungeon graph.
    ///
    /// Runs the pipeline under the configured retry bound. On success the
    /// layout is retained (see [`layout`](Self::layout)) and returned. A
    /// fatal error means the room/key/switch budgets cannot be satisfied
    /// against the constraint space and the configuration must change.
    pub fn generate(&mut self) -> Result<&RoomLayout, GenerateError> {
        let max_keys = self.constraints.max_keys();
        let mut rooms_per_lock = if max_keys > 0 {
            self.constraints.max_rooms() / max_keys
        } else {
            self.constraints.max_rooms()
        };

        let mut attempts = 0;
        loop {
            match self.attempt(&mut rooms_per_lock) {
                Ok(layout) => return Ok(self.layout.insert(layout)),
                Err(AttemptFailure::Fatal(error)) => return Err(error),
                Err(AttemptFailure::Retry) => {
                    attempts += 1;
                    if attempts >= self.config.max_retries {
                        return Err(GenerateError::RetryLimitExceeded { attempts });
                    }
                }
            }
        }
    }

    /// One full pipeline pass over a blank layout.
    fn attempt(&mut self, rooms_per_lock: &mut usize) -> Result<RoomLayout, AttemptFailure> {
        let (mut layout, mut levels) = loop {
            let mut layout = RoomLayout::new();
            let mut levels = KeyLevelMap::default();
            self.init_entrance(&mut layout, &mut levels)
                .map_err(AttemptFailure::Fatal)?;
            match self.place_rooms(&mut layout, &mut levels, *rooms_per_lock) {
                Ok(()) => break (layout, levels),
                Err(OutOfRooms) => {
                    // Not enough space for the current per-lock target; try
                    // again with locks packed closer together. A target of
                    // zero cannot be shrunk further.
                    let max_keys = self.constraints.max_keys();
                    *rooms_per_lock = *rooms_per_lock * max_keys / (max_keys + 1);
                    if *rooms_per_lock == 0 {
                        return Err(AttemptFailure::Fatal(GenerateError::RoomBudgetExhausted {
                            max_rooms: self.constraints.max_rooms(),
                            max_keys,
                        }));
                    }
                }
            }
        };

        self.place_boss_goal(&mut layout, &mut levels)
            .map_err(|_| AttemptFailure::Retry)?;
        self.place_switches(&mut layout)
            .map_err(|_| AttemptFailure::Retry)?;
        self.graphify(&mut layout);
        self.compute_intensity(&mut layout, &levels);
        self.place_keys(&mut layout, &levels)
            .map_err(|_| AttemptFailure::Retry)?;
        self.check_acceptable(&layout, &levels)
            .map_err(|_| AttemptFailure::Retry)?;
        Ok(layout)
    }

    /// Create the entrance room in one of the candidate start positions.
    fn init_entrance(
        &mut self,
        layout: &mut RoomLayout,
        levels: &mut KeyLevelMap,
    ) -> Result<(), GenerateError> {
        let candidates = self.constraints.initial_rooms();
        let Some(&id) = self.rng.choose(&candidates) else {
            return Err(GenerateError::NoEntranceCandidates);
        };
        let room = Room::new(
            id,
            self.constraints.coords_of(id),
            None,
            Some(Symbol::Start),
            Condition::new(),
        );
        layout.add(room);
        levels.add_room(0, id);
        Ok(())
    }

    /// Grow the spanning tree until the layout holds `max_rooms` rooms.
    ///
    /// A new key level opens whenever the current one has collected
    /// `rooms_per_lock` rooms and the key budget (minus the boss's reserved
    /// key) still allows it; the edge crossing into the new level is locked
    /// with the freshly introduced key.
    fn place_rooms(
        &mut self,
        layout: &mut RoomLayout,
        levels: &mut KeyLevelMap,
        rooms_per_lock: usize,
    ) -> Result<(), OutOfRooms> {
        let max_rooms = self.constraints.max_rooms();
        let max_keys = self.constraints.max_keys();
        let usable_keys = if self.config.boss_room_locked {
            max_keys.saturating_sub(1)
        } else {
            max_keys
        };

        let mut key_level: usize = 0;
        let mut latest_key: Option<Symbol> = None;
        let mut cond = Condition::new();

        while layout.room_count() < max_rooms {
            let mut lock_edge = false;

            if levels.rooms(key_level).len() >= rooms_per_lock && key_level < usable_keys {
                let key = Symbol::Key(key_level as u32);
                key_level += 1;
                cond = cond.and(key);
                latest_key = Some(key);
                lock_edge = true;
            }

            let mut parent = None;
            if !lock_edge && self.rng.next_int(SAME_LEVEL_PARENT_ODDS) != 0 {
                parent =
                    self.choose_room_with_free_slot(layout, levels.rooms(key_level), key_level);
            }
            let parent = match parent {
                Some(id) => id,
                None => {
                    // Crossing key levels always locks the connecting edge.
                    lock_edge = true;
                    let everywhere = layout.room_ids();
                    match self.choose_room_with_free_slot(layout, &everywhere, key_level) {
                        Some(id) => id,
                        None => return Err(OutOfRooms),
                    }
                }
            };

            let Some(child) = self.choose_free_slot(layout, parent, key_level) else {
                return Err(OutOfRooms);
            };
            let room = Room::new(
                child,
                self.constraints.coords_of(child),
                Some(parent),
                None,
                cond,
            );
            layout.add(room);
            layout[parent].add_child(child);
            layout.link(parent, child, if lock_edge { latest_key } else { None });
            levels.add_room(key_level, child);
        }
        Ok(())
    }

    /// A random room from `rooms` that still has an unoccupied adjacent
    /// slot, respecting the key-level ceiling.
    fn choose_room_with_free_slot(
        &mut self,
        layout: &RoomLayout,
        rooms: &[RoomId],
        key_level: usize,
    ) -> Option<RoomId> {
        let mut pool = rooms.to_vec();
        self.rng.shuffle(&mut pool);
        pool.into_iter().find(|&id| {
            self.constraints
                .adjacent_rooms(id, Some(key_level))
                .into_iter()
                .any(|adjacent| layout.get(adjacent).is_none())
        })
    }

    /// A random unoccupied slot adjacent to `room`.
    fn choose_free_slot(
        &mut self,
        layout: &RoomLayout,
        room: RoomId,
        key_level: usize,
    ) -> Option<RoomId> {
        let mut adjacent = self.constraints.adjacent_rooms(room, Some(key_level));
        self.rng.shuffle(&mut adjacent);
        adjacent.into_iter().find(|&id| layout.get(id).is_none())
    }

    /// Put the boss (and, when enabled, the goal) into a genuine dead end:
    /// an itemless leaf whose single-child parent already satisfies its
    /// precondition.
    ///
    /// With goal generation on, the leaf becomes the goal and its parent the
    /// boss room; with it off, the leaf itself becomes the boss. A locked
    /// boss moves one key level past the current maximum and its entry edge
    /// is relocked with the reserved final key.
    fn place_boss_goal(
        &mut self,
        layout: &mut RoomLayout,
        levels: &mut KeyLevelMap,
    ) -> Result<(), Retry> {
        let mut candidates: Vec<(RoomId, RoomId)> = Vec::new();
        for room in layout.rooms() {
            if !room.is_leaf() || room.item().is_some() {
                continue;
            }
            let Some(parent) = room.parent() else { continue };
            let parent_room = &layout[parent];
            if parent_room.children().len() != 1
                || !parent_room.precond().implies(&room.precond())
            {
                continue;
            }
            if self.config.generate_goal {
                // The parent hosts the boss, so it must be free of items
                // (in particular it must not be the entrance).
                if parent_room.item().is_some()
                    || !self.constraints.room_can_fit_item(room.id(), Symbol::Goal)
                    || !self.constraints.room_can_fit_item(parent, Symbol::Boss)
                {
                    continue;
                }
            } else if !self.constraints.room_can_fit_item(room.id(), Symbol::Boss) {
                continue;
            }
            candidates.push((room.id(), parent));
        }

        let Some(&(leaf, leaf_parent)) = self.rng.choose(&candidates) else {
            return Err(Retry);
        };

        let (boss, goal) = if self.config.generate_goal {
            (leaf_parent, Some(leaf))
        } else {
            (leaf, None)
        };

        if let Some(goal) = goal {
            layout[goal].set_item(Some(Symbol::Goal));
        }
        layout[boss].set_item(Some(Symbol::Boss));

        if self.config.boss_room_locked {
            let old_level = layout[boss].precond().key_level() as usize;
            let new_level = levels.level_count().min(self.constraints.max_keys());
            levels.remove_room(old_level, boss);
            levels.add_room(new_level, boss);
            if let Some(goal) = goal {
                levels.remove_room(old_level, goal);
                levels.add_room(new_level, goal);
            }

            if new_level > 0 {
                let boss_key = Symbol::Key(new_level as u32 - 1);
                let precond = layout[boss].precond().and(boss_key);
                layout[boss].set_precond(precond);
                if let Some(goal) = goal {
                    layout[goal].set_precond(precond);
                }
                if let Some(parent) = layout[boss].parent() {
                    layout.link(parent, boss, Some(boss_key));
                }
            } else if let Some(parent) = layout[boss].parent() {
                // Level 0 has no prior key to require.
                layout.link(parent, boss, None);
            }
            if let Some(goal) = goal {
                layout.link(boss, goal, None);
            }
        }
        Ok(())
    }

    /// Gate a branch of the solution path behind the switch.
    ///
    /// Picks a branching room on the solution path, switch-locks a random
    /// subset of the tree edges below it, and places the switch item
    /// somewhere reachable without crossing those locks.
    fn place_switches(&mut self, layout: &mut RoomLayout) -> Result<(), Retry> {
        if self.constraints.max_switches() == 0 {
            return Ok(());
        }

        let mut solution = self.solution_path(layout);
        for _ in 0..MAX_SWITCH_ATTEMPTS {
            let mut pool = layout.room_ids();
            self.rng.shuffle(&mut pool);
            self.rng.shuffle(&mut solution);

            let base = solution
                .iter()
                .copied()
                .find(|&id| layout[id].children().len() > 1 && layout[id].parent().is_some());
            let Some(base) = base else {
                return Err(Retry);
            };

            let base_cond = layout[base].precond();
            remove_subtree_from_pool(layout, &mut pool, base);

            let switch_room = pool.iter().copied().find(|&id| {
                layout[id].item().is_none()
                    && base_cond.implies(&layout[id].precond())
                    && self.constraints.room_can_fit_item(id, Symbol::Switch)
            });
            let Some(switch_room) = switch_room else {
                continue;
            };

            if self.switch_lock_descendants(layout, base, SwitchState::Either) {
                layout[switch_room].set_item(Some(Symbol::Switch));
                return Ok(());
            }
        }
        Err(Retry)
    }

    /// The room ids from the goal (or the boss, when goals are disabled)
    /// back up the parent chain to the entrance.
    fn solution_path(&self, layout: &RoomLayout) -> Vec<RoomId> {
        let mut path = Vec::new();
        let mut current = layout
            .find_goal()
            .or_else(|| layout.find_boss())
            .map(Room::id);
        while let Some(id) = current {
            path.push(id);
            current = layout[id].parent();
        }
        path
    }

    /// Walk the tree below `room`, switch-locking some of its unlocked
    /// edges. Descendants behind a fresh lock inherit the requirement in
    /// their preconditions; the walk does not continue past a lock, and the
    /// required state alternates as it descends.
    fn switch_lock_descendants(
        &mut self,
        layout: &mut RoomLayout,
        room: RoomId,
        given: SwitchState,
    ) -> bool {
        let state = match given {
            SwitchState::Either => {
                if self.rng.next_bool() {
                    SwitchState::On
                } else {
                    SwitchState::Off
                }
            }
            concrete => concrete,
        };
        let Some(gate) = state.to_symbol() else {
            return false;
        };

        let mut any_locks = false;
        for child in layout[room].children().to_vec() {
            let unlocked = layout[room]
                .edge(child)
                .is_some_and(|edge| !edge.has_symbol());
            if unlocked && self.rng.next_double() < SWITCH_GATE_CHANCE {
                layout.link(room, child, Some(gate));
                add_precond_to_subtree(layout, child, &Condition::from_symbol(gate));
                any_locks = true;
            } else {
                any_locks |= self.switch_lock_descendants(layout, child, state.invert());
            }
        }
        any_locks
    }

    /// Add shortcut edges between spatially adjacent rooms whose
    /// preconditions allow it, turning the tree into a graph.
    ///
    /// Rooms with equal preconditions are joined with the constraint-supplied
    /// probability; rooms one symbol apart are joined through an edge gated
    /// by that symbol, unconditionally for switch gates and probabilistically
    /// for keys. Goal and boss rooms are left alone.
    fn graphify(&mut self, layout: &mut RoomLayout) {
        for id in layout.room_ids() {
            if layout[id].is_goal() || layout[id].is_boss() {
                continue;
            }
            for next in self.constraints.adjacent_rooms(id, None) {
                if layout.get(next).is_none()
                    || layout[next].is_goal()
                    || layout[next].is_boss()
                    || layout.rooms_are_linked(id, next)
                {
                    continue;
                }

                let here = layout[id].precond();
                let there = layout[next].precond();
                if here.implies(&there) && there.implies(&here) {
                    if self.rng.next_double()
                        < self.constraints.edge_densification_probability(id, next)
                    {
                        layout.link(id, next, None);
                    }
                } else if let Some(symbol) = here.single_symbol_difference(&there) {
                    if symbol.is_switch_state()
                        || self.rng.next_double()
                            < self.constraints.edge_densification_probability(id, next)
                    {
                        layout.link(id, next, Some(symbol));
                    }
                }
            }
        }
    }

    /// Score every room, then pin the boss to 1.0 and the goal to 0.0.
    ///
    /// Each key level walks its entry rooms (rooms whose parent does not
    /// already satisfy their precondition), growing by 1.0 per tree depth
    /// with a little jitter; the next level starts eased off from the
    /// deepest point reached so far.
    fn compute_intensity(&mut self, layout: &mut RoomLayout, levels: &KeyLevelMap) {
        let mut next_level_base = 0.0_f64;
        for level in 0..levels.level_count() {
            let base = next_level_base * (1.0 - INTENSITY_EASE_OFF);
            for &id in levels.rooms(level) {
                let is_level_entry = match layout[id].parent() {
                    None => true,
                    Some(parent) => !layout[parent].precond().implies(&layout[id].precond()),
                };
                if is_level_entry {
                    let deepest = self.apply_intensity(layout, id, base);
                    next_level_base = next_level_base.max(deepest);
                }
            }
        }

        normalize_intensity(layout);
        if let Some(boss) = layout.find_boss().map(Room::id) {
            layout[boss].set_intensity(1.0);
        }
        if let Some(goal) = layout.find_goal().map(Room::id) {
            layout[goal].set_intensity(0.0);
        }
    }

    fn apply_intensity(&mut self, layout: &mut RoomLayout, room: RoomId, intensity: f64) -> f64 {
        let jittered = intensity
            * (1.0 - INTENSITY_GROWTH_JITTER / 2.0
                + INTENSITY_GROWTH_JITTER * self.rng.next_double());
        layout[room].set_intensity(jittered);

        let mut deepest = jittered;
        for child in layout[room].children().to_vec() {
            if layout[room].precond().implies(&layout[child].precond()) {
                deepest = deepest.max(self.apply_intensity(layout, child, jittered + 1.0));
            }
        }
        deepest
    }

    /// Place each level's key in that level's most intense free room.
    ///
    /// The shuffle before the stable sort randomizes the order among rooms
    /// of equal intensity. The last level holds no key; its lock is opened
    /// by the key placed one level below.
    fn place_keys(&mut self, layout: &mut RoomLayout, levels: &KeyLevelMap) -> Result<(), Retry> {
        for level in 0..levels.level_count().saturating_sub(1) {
            let mut rooms = levels.rooms(level).to_vec();
            self.rng.shuffle(&mut rooms);
            rooms.sort_by(|a, b| layout[*b].intensity().total_cmp(&layout[*a].intensity()));

            let key = Symbol::Key(level as u32);
            let target = rooms.iter().copied().find(|&id| {
                layout[id].item().is_none() && self.constraints.room_can_fit_item(id, key)
            });
            match target {
                Some(id) => layout[id].set_item(Some(key)),
                None => return Err(Retry),
            }
        }
        Ok(())
    }

    /// Final gate: the caller's global predicate, plus the requirement that
    /// construction actually produced the configured number of key levels.
    fn check_acceptable(&self, layout: &RoomLayout, levels: &KeyLevelMap) -> Result<(), Retry> {
        if levels.level_count() != self.constraints.max_keys() + 1 {
            return Err(Retry);
        }
        if !self.constraints.is_acceptable(layout) {
            return Err(Retry);
        }
        Ok(())
    }
}

/// Conjoin `cond` onto `room` and every room below it in the tree.
fn add_precond_to_subtree(layout: &mut RoomLayout, room: RoomId, cond: &Condition) {
    let updated = layout[room].precond().and_condition(cond);
    layout[room].set_precond(updated);
    for child in layout[room].children().to_vec() {
        add_precond_to_subtree(layout, child, cond);
    }
}

/// Drop `room` and its whole subtree from a candidate pool.
fn remove_subtree_from_pool(layout: &RoomLayout, pool: &mut Vec<RoomId>, room: RoomId) {
    pool.retain(|&id| id != room);
    for &child in layout[room].children() {
        remove_subtree_from_pool(layout, pool, child);
    }
}

/// Rescale all intensities into `[0, INTENSITY_CEILING]`. Layouts whose raw
/// intensities are all zero are left untouched.
fn normalize_intensity(layout: &mut RoomLayout) {
    let observed_max = layout.rooms().map(Room::intensity).fold(0.0_f64, f64::max);
    if observed_max <= 0.0 {
        return;
    }
    let scale = INTENSITY_CEILING / observed_max;
    for id in layout.room_ids() {
        // Rounding must not push the maximal room past the ceiling.
        let scaled = (layout[id].intensity() * scale).min(INTENSITY_CEILING);
        layout[id].set_intensity(scaled);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_level_map_grows_on_demand() {
        let mut levels = KeyLevelMap::default();
        assert_eq!(levels.level_count(), 0);
        assert!(levels.rooms(3).is_empty());

        levels.add_room(2, RoomId(7));
        assert_eq!(levels.level_count(), 3);
        assert!(levels.rooms(0).is_empty());
        assert_eq!(levels.rooms(2), &[RoomId(7)]);
    }

    #[test]
    fn test_key_level_map_remove() {
        let mut levels = KeyLevelMap::default();
        levels.add_room(1, RoomId(4));
        levels.add_room(1, RoomId(5));
        levels.remove_room(1, RoomId(4));
        assert_eq!(levels.rooms(1), &[RoomId(5)]);
        // Removing from a level that was never created is a no-op.
        levels.remove_room(9, RoomId(5));
    }

    #[test]
    fn test_config_defaults() {
        let config = GeneratorConfig::default();
        assert!(config.generate_goal);
        assert!(config.boss_room_locked);
        assert_eq!(config.max_retries, MAX_RETRIES);
    }
}
