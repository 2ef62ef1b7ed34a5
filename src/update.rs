//! Product update of a state with an action.
//!
//! Given a state `S` with worlds `W` and an action `A` with events `E`, the
//! updated state has one world for every pair `(w, e)` such that `w` is
//! reachable in `S` and `w` satisfies `pre(e)`. Pairs are enumerated world by
//! world, event by event, and the position of a pair becomes its new world
//! index. Hence `(w0, e0)`, if it survives, is the new designated world.
//!
//! - Valuation: `V'(w, e) = (V(w) \ del(e)) ∪ add(e)`.
//! - Accessibility: `(w, e) R'_a (v, f)` iff `w R_a v` and `Q_a(e, f)` holds at `w` in `S`.
//! - Reachability: BFS from new world `0` over the union of all `R'_a`.
//!
//! Unreachable worlds are kept in the result but contribute no pairs to the
//! next update. This is a cheap stand-in for bisimulation contraction:
//! formulas are evaluated over exactly this model, not over its quotient.

use std::collections::VecDeque;

use log::{debug, trace, warn};

use crate::action::Action;
use crate::state::State;
use crate::types::{AgentId, EventId, WorldId};

impl State {
    /// Applies `action` to this state, producing a new state.
    ///
    /// # Panics
    ///
    /// Panics if the state and the action disagree on the number of agents
    /// or on the size of the proposition universe.
    pub fn product_update(&self, action: &Action) -> State {
        assert_eq!(
            self.num_agents(),
            action.num_agents(),
            "State and action must have the same number of agents"
        );
        assert_eq!(
            self.props(),
            action.props(),
            "State and action must share the proposition universe"
        );

        debug!(
            "product_update(worlds = {}, events = {}, agents = {})",
            self.get_num_worlds(),
            action.num_events(),
            self.num_agents()
        );

        let formula = action.formula();
        let props = self.props();

        // Worlds.
        let mut pairs: Vec<(WorldId, EventId)> = Vec::new();
        for w in (0..self.get_num_worlds()).map(WorldId::from) {
            if !self.get_reachable_world_boolean(w) {
                trace!("product_update: skipping unreachable {}", w);
                continue;
            }
            for e in (0..action.num_events()).map(EventId::from) {
                if formula.evaluate(self, w, action.get_pre(e)) {
                    trace!("product_update: new world {} = ({}, {})", pairs.len(), w, e);
                    pairs.push((w, e));
                }
            }
        }

        let mut new_state = State::new(self.num_agents(), pairs.len(), props);

        for (i, &(w, e)) in pairs.iter().enumerate() {
            let nw1 = WorldId::from(i);

            // Valuation.
            new_state
                .valuation_mut(nw1)
                .copy_from(props, self.valuation(w))
                .difference(props, action.get_post_del(e))
                .union(props, action.get_post_add(e));

            // Accessibility.
            for agent in (0..self.num_agents()).map(AgentId::from) {
                for (j, &(v, f)) in pairs.iter().enumerate() {
                    if self.get_accessible(agent, w, v) && formula.evaluate(self, w, action.get_accessible(agent, e, f)) {
                        new_state.set_accessible(agent, nw1, WorldId::from(j), true);
                    }
                }
            }
        }

        if pairs.is_empty() {
            warn!("product_update: no (world, event) pair satisfies its precondition");
        }

        new_state.recompute_reachability();
        new_state
    }

    /// Marks exactly the worlds reachable from world `0` along any agent's
    /// accessibility, including world `0` itself.
    pub fn recompute_reachability(&mut self) {
        let n = self.get_num_worlds();
        for w in (0..n).map(WorldId::from) {
            self.set_reachable(w, false);
        }
        if n == 0 {
            return;
        }

        let joint = self.joint_relation();
        let rcs = self.relation_cs();

        let mut queue = VecDeque::from([0usize]);
        self.set_reachable(WorldId::new(0), true);
        while let Some(w) = queue.pop_front() {
            for v in 0..n {
                if joint.get(rcs, w * n + v) && !self.get_reachable_world_boolean(WorldId::from(v)) {
                    self.set_reachable(WorldId::from(v), true);
                    queue.push_back(v);
                }
            }
        }

        debug!(
            "recompute_reachability: {} of {} worlds reachable",
            self.reachable_worlds().count(),
            n
        );
    }
}
