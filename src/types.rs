//! Type-safe identifiers for agents, propositions, worlds and events.
//!
//! Every identifier is an opaque index into its own domain. Newtypes keep
//! a world index from being passed where an event index is expected, which
//! is easy to do by accident inside the product update, where both live
//! side by side.
use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
        pub struct $name(u32);

        impl $name {
            /// Creates a new identifier with the given raw index.
            pub const fn new(id: u32) -> Self {
                $name(id)
            }

            /// Returns the raw identifier as a `u32`.
            pub const fn id(self) -> u32 {
                self.0
            }

            /// Returns the identifier as a `usize`, suitable for indexing.
            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $prefix, self.0)
            }
        }

        impl From<$name> for u32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl From<u32> for $name {
            fn from(id: u32) -> Self {
                $name(id)
            }
        }

        impl From<usize> for $name {
            fn from(index: usize) -> Self {
                $name(u32::try_from(index).expect("identifier index does not fit into u32"))
            }
        }
    };
}

define_id!(
    /// An agent, i.e. the owner of an accessibility relation.
    AgentId,
    "a"
);

define_id!(
    /// A proposition, i.e. a bit position in every valuation.
    PropositionId,
    "p"
);

define_id!(
    /// A world of a [`State`][crate::state::State].
    ///
    /// World `0` is the designated (actual) world.
    WorldId,
    "w"
);

define_id!(
    /// An event of an [`Action`][crate::action::Action].
    ///
    /// Event `0` is the designated event.
    EventId,
    "e"
);

define_id!(
    /// Position of a state in the [`Domain`][crate::domain::Domain] history.
    StateId,
    "s"
);

define_id!(
    /// Position of an action in the [`Domain`][crate::domain::Domain] history.
    ActionId,
    "act"
);
