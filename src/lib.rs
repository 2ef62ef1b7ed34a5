//! # del-rs: Dynamic Epistemic Logic in Rust
//!
//! **`del-rs`** is a small kernel for Dynamic Epistemic Logic (DEL): it represents
//! what a group of agents believe about the world and about each other, and how
//! those beliefs change when something happens.
//!
//! ## Model
//!
//! - A **state** ([`State`][crate::state::State]) is a Kripke model: a set of worlds,
//!   a valuation of propositions per world, and one accessibility relation per agent.
//!   World `0` is the *designated* (actual) world.
//! - An **action** ([`Action`][crate::action::Action]) is an event model: events with
//!   preconditions and postconditions, plus per-agent event accessibility given by
//!   formulas that are evaluated in the world an agent comes from.
//! - The **product update** ([`State::product_update`][crate::state::State::product_update])
//!   applies an action to a state, producing a new state.
//! - **Formulas** ([`Formula`][crate::formula::Formula]) live in an append-only arena
//!   and are evaluated directly on a state: propositional connectives, individual
//!   belief, and bounded "everyone believes".
//!
//! Propositions and valuations are stored in compact bit sets
//! ([`Bitset`][crate::bitset::Bitset]) whose size lives in a shared
//! [`CommonState`][crate::bitset::CommonState].
//!
//! ## Basic Usage
//!
//! ```rust
//! use del_rs::domain::Domain;
//! use del_rs::formula::Formula;
//!
//! let mut domain = Domain::new(&["alice", "bob"], &["p"], &[false]).unwrap();
//! let alice = domain.agent_id("alice").unwrap();
//! let bob = domain.agent_id("bob").unwrap();
//! let p = domain.proposition_id("p").unwrap();
//!
//! // Both agents pay attention to `p`, which is false.
//! let attention: Vec<_> = [alice, bob]
//!     .into_iter()
//!     .map(|a| domain.attention_proposition_id(a, p))
//!     .collect();
//! domain.add_initial_state(&attention);
//!
//! // Alice makes `p` true; Bob notices because he pays attention.
//! let (_, s1) = domain.perform_do(alice, &[p], &[]).unwrap();
//!
//! let mut f = Formula::new();
//! let fp = f.mk_prop(p);
//! let bob_believes_p = f.mk_believes(bob, fp);
//! assert!(domain.evaluate_formula(s1, &f, bob_believes_p).unwrap());
//! ```
//!
//! ## Core Components
//!
//! - **[`state`]**, **[`action`]**, **[`update`]**: the kernel.
//! - **[`formula`]**: formula arena and evaluator.
//! - **[`domain`]**: named agents and propositions, attention, and ready-made scenario actions.
//! - **[`debug`]**, **[`dot`]**: text dumps and Graphviz export of states.

pub mod action;
pub mod bitset;
pub mod debug;
pub mod domain;
pub mod dot;
pub mod error;
pub mod formula;
pub mod state;
pub mod types;
pub mod update;
pub mod utils;
