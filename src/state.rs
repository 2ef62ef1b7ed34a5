//! Kripke states: worlds, valuations and per-agent accessibility.
//!
//! A [`State`] with `n` worlds stores:
//!
//! - one valuation bit set per world, over the whole proposition universe;
//! - one accessibility bit set per agent, of size `n * n`, where bit
//!   `w1 * n + w2` means that the agent, in world `w1`, considers `w2` possible;
//! - a reachability bit set over worlds.
//!
//! World `0` is the designated world. Worlds that are not reachable from it
//! are kept, but do not take part in the next
//! [`product_update`][State::product_update].

use crate::bitset::{Bitset, CommonState, Ones};
use crate::types::{AgentId, PropositionId, WorldId};

/// A Kripke model.
#[derive(Debug, Clone)]
pub struct State {
    num_worlds: usize,
    /// Size of every valuation.
    props: CommonState,
    /// Size of every accessibility relation (`num_worlds^2`).
    relation_cs: CommonState,
    relations: Vec<Bitset>,
    valuations: Vec<Bitset>,
    worlds_cs: CommonState,
    reachable: Bitset,
}

impl State {
    /// Creates a state where every proposition is false in every world and no
    /// agent considers any world possible.
    ///
    /// All worlds start out reachable.
    pub fn new(num_agents: usize, num_worlds: usize, props: CommonState) -> Self {
        let relation_cs = CommonState::new(num_worlds * num_worlds);
        let worlds_cs = CommonState::new(num_worlds);
        Self {
            num_worlds,
            props,
            relation_cs,
            relations: (0..num_agents).map(|_| Bitset::new(relation_cs)).collect(),
            valuations: (0..num_worlds).map(|_| Bitset::new(props)).collect(),
            worlds_cs,
            reachable: Bitset::full(worlds_cs),
        }
    }

    pub fn get_num_worlds(&self) -> usize {
        self.num_worlds
    }

    pub fn num_agents(&self) -> usize {
        self.relations.len()
    }

    /// Returns the common state of the valuations.
    pub fn props(&self) -> CommonState {
        self.props
    }

    pub(crate) fn relation_cs(&self) -> CommonState {
        self.relation_cs
    }

    pub(crate) fn relation(&self, agent: AgentId) -> &Bitset {
        &self.relations[agent.index()]
    }

    pub(crate) fn valuation(&self, world: WorldId) -> &Bitset {
        &self.valuations[world.index()]
    }

    pub(crate) fn valuation_mut(&mut self, world: WorldId) -> &mut Bitset {
        &mut self.valuations[world.index()]
    }

    fn edge(&self, w1: WorldId, w2: WorldId) -> usize {
        assert!(
            w1.index() < self.num_worlds && w2.index() < self.num_worlds,
            "World pair ({}, {}) out of range for state with {} worlds",
            w1,
            w2,
            self.num_worlds
        );
        w1.index() * self.num_worlds + w2.index()
    }

    pub fn get_valuation(&self, world: WorldId, prop: PropositionId) -> bool {
        self.valuations[world.index()].get(self.props, prop.index())
    }

    pub fn set_valuation(&mut self, world: WorldId, prop: PropositionId, value: bool) {
        let props = self.props;
        self.valuations[world.index()].set(props, prop.index(), value);
    }

    /// Returns the valuation of `prop` in the designated world.
    pub fn actual_valuation(&self, prop: PropositionId) -> bool {
        self.get_valuation(WorldId::new(0), prop)
    }

    pub fn get_accessible(&self, agent: AgentId, w1: WorldId, w2: WorldId) -> bool {
        let edge = self.edge(w1, w2);
        self.relations[agent.index()].get(self.relation_cs, edge)
    }

    pub fn set_accessible(&mut self, agent: AgentId, w1: WorldId, w2: WorldId, value: bool) {
        let edge = self.edge(w1, w2);
        let cs = self.relation_cs;
        self.relations[agent.index()].set(cs, edge, value);
    }

    /// Returns true if `world` is reachable from the designated world.
    pub fn get_reachable_world_boolean(&self, world: WorldId) -> bool {
        self.reachable.get(self.worlds_cs, world.index())
    }

    pub fn set_reachable(&mut self, world: WorldId, value: bool) {
        let cs = self.worlds_cs;
        self.reachable.set(cs, world.index(), value);
    }

    /// Returns an iterator over all reachable worlds, in ascending order.
    pub fn reachable_worlds(&self) -> impl Iterator<Item = WorldId> + '_ {
        let ones: Ones<'_> = self.reachable.ones(self.worlds_cs);
        ones.map(WorldId::from)
    }

    /// Returns the union of the accessibility relations of all agents.
    pub(crate) fn joint_relation(&self) -> Bitset {
        let mut joint = Bitset::new(self.relation_cs);
        for relation in &self.relations {
            joint.union(self.relation_cs, relation);
        }
        joint
    }
}
