//! Passages between rooms

use serde::{Deserialize, Serialize};

use super::room::RoomId;
use super::symbol::Symbol;

/// A directed passage to another room, optionally gated by a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    target: RoomId,
    symbol: Option<Symbol>,
}

impl Edge {
    pub const fn new(target: RoomId, symbol: Option<Symbol>) -> Self {
        Self { target, symbol }
    }

    /// Id of the room this edge leads to.
    pub const fn target(&self) -> RoomId {
        self.target
    }

    /// The gate symbol, if any.
    pub const fn symbol(&self) -> Option<Symbol> {
        self.symbol
    }

    /// Check if traversal requires a symbol
    pub const fn has_symbol(&self) -> bool {
        self.symbol.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_symbol() {
        assert!(!Edge::new(RoomId(1), None).has_symbol());
        assert!(Edge::new(RoomId(1), Some(Symbol::Key(0))).has_symbol());
    }
}
