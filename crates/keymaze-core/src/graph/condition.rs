//! Preconditions for entering rooms and traversing edges

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use super::symbol::Symbol;

/// Requirement on the dungeon's single switch.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
pub enum SwitchState {
    /// No requirement; the identity element for comparison.
    #[default]
    Either,
    On,
    Off,
}

impl SwitchState {
    /// The opposite requirement. `Either` is its own opposite.
    pub const fn invert(self) -> Self {
        match self {
            SwitchState::Either => SwitchState::Either,
            SwitchState::On => SwitchState::Off,
            SwitchState::Off => SwitchState::On,
        }
    }

    /// The edge-gate symbol for a concrete requirement
    pub const fn to_symbol(self) -> Option<Symbol> {
        match self {
            SwitchState::Either => None,
            SwitchState::On => Some(Symbol::SwitchOn),
            SwitchState::Off => Some(Symbol::SwitchOff),
        }
    }
}

/// What a player must have before reaching a room or crossing an edge: a key
/// level (how many distinct keys have been collected) and a switch
/// requirement.
///
/// Key levels are monotone under conjunction. A concrete switch requirement
/// is set at most once; conjoining conflicting concrete requirements is a
/// logic error in the caller, not a recoverable condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Condition {
    key_level: u32,
    switch_state: SwitchState,
}

impl Condition {
    /// The trivially satisfied condition: no keys, no switch requirement.
    pub const fn new() -> Self {
        Self {
            key_level: 0,
            switch_state: SwitchState::Either,
        }
    }

    /// The condition granted by holding a single symbol.
    pub fn from_symbol(symbol: Symbol) -> Self {
        Self::new().and(symbol)
    }

    /// Number of distinct keys required.
    pub const fn key_level(&self) -> u32 {
        self.key_level
    }

    /// Switch requirement.
    pub const fn switch_state(&self) -> SwitchState {
        self.switch_state
    }

    /// Conjunction with one symbol.
    ///
    /// `Key(k)` raises the key level to at least `k + 1`; `SwitchOn` /
    /// `SwitchOff` fix the switch requirement. Marker symbols are inert.
    #[must_use]
    pub fn and(&self, symbol: Symbol) -> Condition {
        let mut result = *self;
        result.add(symbol);
        result
    }

    /// Conjunction with another condition.
    #[must_use]
    pub fn and_condition(&self, other: &Condition) -> Condition {
        let mut result = *self;
        result.key_level = result.key_level.max(other.key_level);
        if let Some(symbol) = other.switch_state.to_symbol() {
            result.add(symbol);
        }
        result
    }

    /// Whether satisfying `self` also satisfies `other`. Reflexive and
    /// transitive.
    pub fn implies(&self, other: &Condition) -> bool {
        self.key_level >= other.key_level
            && (self.switch_state == other.switch_state
                || other.switch_state == SwitchState::Either)
    }

    /// The one symbol that reconciles `self` with `other`, if any.
    ///
    /// Equal conditions need nothing. Conditions that differ only in key
    /// level are reconciled by the key unlocking the higher level. Conditions
    /// at the same key level where exactly one side has a concrete switch
    /// requirement are reconciled by that switch symbol. Anything else needs
    /// more than one symbol.
    pub fn single_symbol_difference(&self, other: &Condition) -> Option<Symbol> {
        if self == other {
            return None;
        }
        if self.switch_state == other.switch_state {
            let level = self.key_level.max(other.key_level);
            Some(Symbol::Key(level - 1))
        } else {
            if self.key_level != other.key_level {
                return None;
            }
            if self.switch_state != SwitchState::Either
                && other.switch_state != SwitchState::Either
            {
                return None;
            }
            let concrete = if self.switch_state != SwitchState::Either {
                self.switch_state
            } else {
                other.switch_state
            };
            concrete.to_symbol()
        }
    }

    fn add(&mut self, symbol: Symbol) {
        match symbol {
            Symbol::Key(index) => {
                self.key_level = self.key_level.max(index + 1);
            }
            Symbol::SwitchOn | Symbol::SwitchOff => {
                let wanted = if symbol == Symbol::SwitchOn {
                    SwitchState::On
                } else {
                    SwitchState::Off
                };
                assert!(
                    self.switch_state == SwitchState::Either || self.switch_state == wanted,
                    "conflicting switch requirement: {} and {}",
                    self.switch_state,
                    wanted
                );
                self.switch_state = wanted;
            }
            Symbol::Start | Symbol::Goal | Symbol::Boss | Symbol::Switch => {}
        }
    }
}
