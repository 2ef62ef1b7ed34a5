//! Event models.
//!
//! An [`Action`] with `m` events stores, per event, a precondition formula and
//! a postcondition given as two proposition bit sets (`add` and `del`). For
//! every agent, the event accessibility table holds one formula per ordered
//! event pair, at index `e1 * m + e2`.
//!
//! Event accessibility formulas are evaluated against the *source* state of
//! a product update, not against the event model. This lets what an agent
//! perceives depend on facts that held before the update, such as whether
//! the agent was paying attention to a proposition.
//!
//! All formulas live in the action's private [`Formula`] arena; build them
//! through [`Action::formula_mut`].

use crate::bitset::{Bitset, CommonState};
use crate::formula::{Formula, NodeId};
use crate::types::{AgentId, EventId, PropositionId};

/// An event model.
#[derive(Debug)]
pub struct Action {
    num_agents: usize,
    num_events: usize,
    props: CommonState,
    formula: Formula,
    top: NodeId,
    bot: NodeId,
    /// Event accessibility: `agent -> (e1 * num_events + e2) -> formula`.
    accessibility: Vec<NodeId>,
    pre: Vec<NodeId>,
    post_add: Vec<Bitset>,
    post_del: Vec<Bitset>,
}

impl Action {
    /// Creates an action where every precondition is `TOP`, every
    /// postcondition leaves the valuation unchanged, and no event is
    /// accessible from any other (`BOT`).
    pub fn new(num_agents: usize, num_events: usize, props: CommonState) -> Self {
        let mut formula = Formula::new();
        let bot = formula.mk_bot();
        let top = formula.mk_top();
        Self {
            num_agents,
            num_events,
            props,
            formula,
            top,
            bot,
            accessibility: vec![bot; num_agents * num_events * num_events],
            pre: vec![top; num_events],
            post_add: (0..num_events).map(|_| Bitset::new(props)).collect(),
            post_del: (0..num_events).map(|_| Bitset::new(props)).collect(),
        }
    }

    pub fn num_events(&self) -> usize {
        self.num_events
    }

    pub fn num_agents(&self) -> usize {
        self.num_agents
    }

    /// Returns the common state of the postcondition bit sets.
    pub fn props(&self) -> CommonState {
        self.props
    }

    pub fn formula(&self) -> &Formula {
        &self.formula
    }

    pub fn formula_mut(&mut self) -> &mut Formula {
        &mut self.formula
    }

    /// The `TOP` node every precondition starts with.
    pub fn top(&self) -> NodeId {
        self.top
    }

    /// The `BOT` node every event accessibility entry starts with.
    pub fn bot(&self) -> NodeId {
        self.bot
    }

    fn edge(&self, agent: AgentId, e1: EventId, e2: EventId) -> usize {
        assert!(
            agent.index() < self.num_agents,
            "Agent {} out of range for action with {} agents",
            agent,
            self.num_agents
        );
        assert!(
            e1.index() < self.num_events && e2.index() < self.num_events,
            "Event pair ({}, {}) out of range for action with {} events",
            e1,
            e2,
            self.num_events
        );
        (agent.index() * self.num_events + e1.index()) * self.num_events + e2.index()
    }

    fn check_node(&self, node: NodeId) {
        assert!(
            node.index() < self.formula.len(),
            "Node {} out of range for this action's formula of size {}",
            node,
            self.formula.len()
        );
    }

    pub fn get_pre(&self, event: EventId) -> NodeId {
        self.pre[event.index()]
    }

    pub fn set_pre(&mut self, event: EventId, node: NodeId) {
        self.check_node(node);
        self.pre[event.index()] = node;
    }

    /// Records that `event` sets `prop` to `value`.
    ///
    /// `true` adds `prop` to the event's add set, `false` to its delete set.
    /// Deletions are applied before additions, so a proposition in both ends
    /// up true.
    pub fn set_post(&mut self, event: EventId, prop: PropositionId, value: bool) {
        let props = self.props;
        if value {
            self.post_add[event.index()].set(props, prop.index(), true);
        } else {
            self.post_del[event.index()].set(props, prop.index(), true);
        }
    }

    /// Returns what `event` does to `prop`: `Some(value)` if it is set, `None` if unchanged.
    pub fn get_post(&self, event: EventId, prop: PropositionId) -> Option<bool> {
        if self.post_add[event.index()].get(self.props, prop.index()) {
            Some(true)
        } else if self.post_del[event.index()].get(self.props, prop.index()) {
            Some(false)
        } else {
            None
        }
    }

    pub fn get_post_add(&self, event: EventId) -> &Bitset {
        &self.post_add[event.index()]
    }

    pub fn get_post_del(&self, event: EventId) -> &Bitset {
        &self.post_del[event.index()]
    }

    pub fn get_accessible(&self, agent: AgentId, e1: EventId, e2: EventId) -> NodeId {
        self.accessibility[self.edge(agent, e1, e2)]
    }

    pub fn set_accessible(&mut self, agent: AgentId, e1: EventId, e2: EventId, node: NodeId) {
        self.check_node(node);
        let edge = self.edge(agent, e1, e2);
        self.accessibility[edge] = node;
    }
}
