//! Key and marker symbols

use core::fmt;

use serde::{Deserialize, Serialize};

/// Identifier attached to room items and edge gates.
///
/// `Key(0)` opens the first lock, `Key(1)` the second, and so on. The other
/// variants are markers: `Start`, `Goal`, `Boss`, and `Switch` can be placed
/// as room items; `SwitchOn` and `SwitchOff` only ever appear on edges and in
/// preconditions. "No symbol" is expressed as `Option::<Symbol>::None` at
/// every use site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Symbol {
    /// Ordinary key, numbered from 0.
    Key(u32),
    /// The dungeon entrance marker.
    Start,
    /// The dungeon goal marker.
    Goal,
    /// The boss room marker.
    Boss,
    /// The toggle item itself.
    Switch,
    /// Requires the switch to be on. Edge/condition gate only.
    SwitchOn,
    /// Requires the switch to be off. Edge/condition gate only.
    SwitchOff,
}

impl Symbol {
    /// Check if this is an ordinary key
    pub const fn is_key(&self) -> bool {
        matches!(self, Symbol::Key(_))
    }

    /// The key number, if this is an ordinary key
    pub const fn key_index(&self) -> Option<u32> {
        match self {
            Symbol::Key(index) => Some(*index),
            _ => None,
        }
    }

    /// Check if this is a switch-state requirement (on/off)
    pub const fn is_switch_state(&self) -> bool {
        matches!(self, Symbol::SwitchOn | Symbol::SwitchOff)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Key(index) => write!(f, "{index}"),
            Symbol::Start => write!(f, "Start"),
            Symbol::Goal => write!(f, "Goal"),
            Symbol::Boss => write!(f, "Boss"),
            Symbol::Switch => write!(f, "SW"),
            Symbol::SwitchOn => write!(f, "SW-ON"),
            Symbol::SwitchOff => write!(f, "SW-OFF"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_predicates() {
        assert!(Symbol::Key(0).is_key());
        assert_eq!(Symbol::Key(3).key_index(), Some(3));
        assert!(!Symbol::Boss.is_key());
        assert_eq!(Symbol::Start.key_index(), None);
    }

    #[test]
    fn test_switch_state_predicates() {
        assert!(Symbol::SwitchOn.is_switch_state());
        assert!(Symbol::SwitchOff.is_switch_state());
        assert!(!Symbol::Switch.is_switch_state());
        assert!(!Symbol::Key(0).is_switch_state());
    }

    #[test]
    fn test_display() {
        assert_eq!(Symbol::Key(2).to_string(), "2");
        assert_eq!(Symbol::Switch.to_string(), "SW");
        assert_eq!(Symbol::Goal.to_string(), "Goal");
    }
}
