//! Epistemic formulas stored in an append-only arena.
//!
//! A [`Formula`] is a flat vector of [`Node`]s. Every `mk_*` constructor
//! appends exactly one node and returns its [`NodeId`]. Children are
//! referenced by index and always point to earlier nodes, so the arena is
//! topologically sorted by construction and can be moved freely.
//!
//! Nodes are never removed or mutated once appended. Accessibility tables of
//! an [`Action`][crate::action::Action] store raw [`NodeId`]s into its
//! arena, and rely on this.
//!
//! # Grammar
//!
//! ```text
//! phi ::= TOP | BOT | p | NOT phi | AND(phi, ...) | OR(phi, ...)
//!       | B_a phi | E_G^k phi | C_G phi
//! ```
//!
//! `C_G` (common belief) can be built and printed, but not evaluated.

use std::collections::VecDeque;

use crate::bitset::{Bitset, CommonState};
use crate::state::State;
use crate::types::{AgentId, PropositionId, WorldId};

/// Index of a node inside a [`Formula`] arena.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A single formula node.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Node {
    /// Placeholder for a slot that never received a formula. Evaluates to false.
    Empty,
    Top,
    Bot,
    Prop(PropositionId),
    Not(NodeId),
    And(Vec<NodeId>),
    Or(Vec<NodeId>),
    /// `B_a f`: `f` holds in every world agent `a` considers possible.
    Believes(AgentId, NodeId),
    /// `E_G^k f`: `f` holds in every world within `order` hops along the union
    /// of the relations of `agents`, including the current world.
    EveryoneBelieves(Vec<AgentId>, u32, NodeId),
    /// `C_G f`: common belief. Not evaluable.
    CommonBelief(Vec<AgentId>, NodeId),
}

/// Resolves identifiers to human-readable names.
pub trait Naming {
    fn agent_name(&self, agent: AgentId) -> &str;
    fn proposition_name(&self, prop: PropositionId) -> &str;
}

/// Append-only arena of formula nodes.
#[derive(Debug, Default)]
pub struct Formula {
    nodes: Vec<Node>,
}

impl Formula {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of nodes in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the node with the given id.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Returns true if `id` points to an [`Node::Empty`] placeholder.
    pub fn is_null(&self, id: NodeId) -> bool {
        matches!(self.node(id), Node::Empty)
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(u32::try_from(self.nodes.len()).expect("formula arena overflow"));
        self.nodes.push(node);
        id
    }

    fn check_child(&self, child: NodeId) {
        assert!(
            child.index() < self.nodes.len(),
            "Child node {} out of range for arena of size {}",
            child,
            self.nodes.len()
        );
    }

    pub fn mk_null(&mut self) -> NodeId {
        self.push(Node::Empty)
    }

    pub fn mk_top(&mut self) -> NodeId {
        self.push(Node::Top)
    }

    pub fn mk_bot(&mut self) -> NodeId {
        self.push(Node::Bot)
    }

    pub fn mk_prop(&mut self, p: PropositionId) -> NodeId {
        self.push(Node::Prop(p))
    }

    pub fn mk_not(&mut self, f: NodeId) -> NodeId {
        self.check_child(f);
        self.push(Node::Not(f))
    }

    /// Conjunction of `conjuncts`. The empty conjunction is true.
    pub fn mk_and(&mut self, conjuncts: impl IntoIterator<Item = NodeId>) -> NodeId {
        let conjuncts: Vec<NodeId> = conjuncts.into_iter().collect();
        for &c in &conjuncts {
            self.check_child(c);
        }
        self.push(Node::And(conjuncts))
    }

    /// Disjunction of `disjuncts`. The empty disjunction is false.
    pub fn mk_or(&mut self, disjuncts: impl IntoIterator<Item = NodeId>) -> NodeId {
        let disjuncts: Vec<NodeId> = disjuncts.into_iter().collect();
        for &d in &disjuncts {
            self.check_child(d);
        }
        self.push(Node::Or(disjuncts))
    }

    pub fn mk_believes(&mut self, agent: AgentId, f: NodeId) -> NodeId {
        self.check_child(f);
        self.push(Node::Believes(agent, f))
    }

    pub fn mk_everyone_believes(&mut self, agents: &[AgentId], order: u32, f: NodeId) -> NodeId {
        self.check_child(f);
        self.push(Node::EveryoneBelieves(agents.to_vec(), order, f))
    }

    pub fn mk_common_belief(&mut self, agents: &[AgentId], f: NodeId) -> NodeId {
        self.check_child(f);
        self.push(Node::CommonBelief(agents.to_vec(), f))
    }
}

impl Formula {
    /// Evaluates the formula rooted at `node` in world `world` of `state`.
    ///
    /// # Panics
    ///
    /// Panics on [`Node::CommonBelief`], which is not implemented, and on
    /// out-of-range world, agent or proposition indices.
    pub fn evaluate(&self, state: &State, world: WorldId, node: NodeId) -> bool {
        match self.node(node) {
            Node::Top => true,
            Node::Bot => false,
            Node::Empty => false,
            Node::Prop(p) => state.get_valuation(world, *p),
            Node::Not(f) => !self.evaluate(state, world, *f),
            Node::And(conjuncts) => conjuncts.iter().all(|&f| self.evaluate(state, world, f)),
            Node::Or(disjuncts) => disjuncts.iter().any(|&f| self.evaluate(state, world, f)),
            Node::Believes(agent, f) => (0..state.get_num_worlds()).map(WorldId::from).all(|v| {
                // Vacuously true without accessible worlds.
                !state.get_accessible(*agent, world, v) || self.evaluate(state, v, *f)
            }),
            Node::EveryoneBelieves(agents, order, f) => self.evaluate_everyone_believes(state, world, agents, *order, *f),
            Node::CommonBelief(..) => unimplemented!("evaluation of common belief is not implemented"),
        }
    }

    /// Breadth-first search by distance class over the joint relation of
    /// `agents`, checking `f` at every world with distance `0..=order`.
    fn evaluate_everyone_believes(&self, state: &State, world: WorldId, agents: &[AgentId], order: u32, f: NodeId) -> bool {
        let n = state.get_num_worlds();
        let rcs = state.relation_cs();
        let mut joint = Bitset::new(rcs);
        for &agent in agents {
            joint.union(rcs, state.relation(agent));
        }

        let vcs = CommonState::new(n);
        let mut visited = Bitset::new(vcs);
        visited.set(vcs, world.index(), true);

        let mut queue: VecDeque<usize> = VecDeque::from([world.index()]);
        let mut next_queue: VecDeque<usize> = VecDeque::new();

        for distance in 0..=order {
            for &v in &queue {
                if !self.evaluate(state, WorldId::from(v), f) {
                    return false;
                }
            }
            if distance == order {
                break;
            }
            while let Some(v) = queue.pop_front() {
                for u in 0..n {
                    if joint.get(rcs, v * n + u) && !visited.get(vcs, u) {
                        visited.set(vcs, u, true);
                        next_queue.push_back(u);
                    }
                }
            }
            if next_queue.is_empty() {
                break;
            }
            std::mem::swap(&mut queue, &mut next_queue);
        }

        true
    }
}

impl Formula {
    /// Renders the formula rooted at `node`, resolving names through `naming`.
    pub fn to_string(&self, naming: &impl Naming, node: NodeId) -> String {
        match self.node(node) {
            Node::Empty => "EMPTY".to_string(),
            Node::Top => "TOP".to_string(),
            Node::Bot => "BOT".to_string(),
            Node::Prop(p) => naming.proposition_name(*p).to_string(),
            Node::Not(f) => format!("NOT({})", self.to_string(naming, *f)),
            Node::And(fs) => format!("AND({})", self.join(naming, fs)),
            Node::Or(fs) => format!("OR({})", self.join(naming, fs)),
            Node::Believes(a, f) => format!("BELIEVES[{}]({})", naming.agent_name(*a), self.to_string(naming, *f)),
            Node::EveryoneBelieves(agents, order, f) => format!(
                "EVERYONE_BELIEVES[{}]^{}({})",
                join_agents(naming, agents),
                order,
                self.to_string(naming, *f)
            ),
            Node::CommonBelief(agents, f) => format!(
                "COMMON_BELIEF[{}]({})",
                join_agents(naming, agents),
                self.to_string(naming, *f)
            ),
        }
    }

    fn join(&self, naming: &impl Naming, nodes: &[NodeId]) -> String {
        nodes
            .iter()
            .map(|&f| self.to_string(naming, f))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn join_agents(naming: &impl Naming, agents: &[AgentId]) -> String {
    agents
        .iter()
        .map(|&a| naming.agent_name(a))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    use crate::bitset::CommonState;

    struct Names;

    impl Naming for Names {
        fn agent_name(&self, agent: AgentId) -> &str {
            ["alice", "bob"][agent.index()]
        }
        fn proposition_name(&self, prop: PropositionId) -> &str {
            ["p", "q", "r"][prop.index()]
        }
    }

    const A: AgentId = AgentId::new(0);
    const B: AgentId = AgentId::new(1);
    const P: PropositionId = PropositionId::new(0);
    const Q: PropositionId = PropositionId::new(1);

    fn w(i: u32) -> WorldId {
        WorldId::new(i)
    }

    /// Chain w0 -A-> w1 -B-> w2 -A-> w3, p true in w0..w2, q true only in w3.
    fn chain() -> State {
        let mut s = State::new(2, 4, CommonState::new(3));
        for i in 0..3 {
            s.set_valuation(w(i), P, true);
        }
        s.set_valuation(w(3), Q, true);
        s.set_accessible(A, w(0), w(1), true);
        s.set_accessible(B, w(1), w(2), true);
        s.set_accessible(A, w(2), w(3), true);
        s
    }

    #[test]
    fn test_constants() {
        let s = chain();
        let mut f = Formula::new();
        let top = f.mk_top();
        let bot = f.mk_bot();
        let null = f.mk_null();
        assert!(f.evaluate(&s, w(0), top));
        assert!(!f.evaluate(&s, w(0), bot));
        assert!(!f.evaluate(&s, w(0), null));
        assert!(f.is_null(null));
        assert!(!f.is_null(top));
    }

    #[test]
    fn test_prop_not() {
        let s = chain();
        let mut f = Formula::new();
        let p = f.mk_prop(P);
        let not_p = f.mk_not(p);
        assert!(f.evaluate(&s, w(0), p));
        assert!(!f.evaluate(&s, w(0), not_p));
        assert!(!f.evaluate(&s, w(3), p));
        assert!(f.evaluate(&s, w(3), not_p));
    }

    #[test]
    fn test_and_or() {
        let s = chain();
        let mut f = Formula::new();
        let p = f.mk_prop(P);
        let q = f.mk_prop(Q);
        let and = f.mk_and([p, q]);
        let or = f.mk_or([p, q]);
        let empty_and = f.mk_and(Vec::new());
        let empty_or = f.mk_or(Vec::new());
        assert!(!f.evaluate(&s, w(0), and));
        assert!(f.evaluate(&s, w(0), or));
        assert!(f.evaluate(&s, w(3), or));
        assert!(f.evaluate(&s, w(0), empty_and));
        assert!(!f.evaluate(&s, w(0), empty_or));
    }

    #[test]
    fn test_and_short_circuits_before_common_belief() {
        let s = chain();
        let mut f = Formula::new();
        let bot = f.mk_bot();
        let top = f.mk_top();
        let cb = f.mk_common_belief(&[A], top);
        let and = f.mk_and([bot, cb]);
        let or = f.mk_or([top, cb]);
        assert!(!f.evaluate(&s, w(0), and));
        assert!(f.evaluate(&s, w(0), or));
    }

    #[test]
    fn test_believes() {
        let s = chain();
        let mut f = Formula::new();
        let p = f.mk_prop(P);
        let q = f.mk_prop(Q);
        let a_p = f.mk_believes(A, p);
        let a_q = f.mk_believes(A, q);
        let b_p = f.mk_believes(B, p);
        assert!(f.evaluate(&s, w(0), a_p));
        assert!(!f.evaluate(&s, w(0), a_q));
        assert!(f.evaluate(&s, w(2), a_q));
        assert!(f.evaluate(&s, w(1), b_p));
    }

    #[test]
    fn test_believes_vacuous() {
        let s = chain();
        let mut f = Formula::new();
        let bot = f.mk_bot();
        let b_bot = f.mk_believes(B, bot);
        // B has no outgoing edge from w0.
        assert!(f.evaluate(&s, w(0), b_bot));
        // A has one from w0.
        let a_bot = f.mk_believes(A, bot);
        assert!(!f.evaluate(&s, w(0), a_bot));
    }

    #[test]
    fn test_everyone_believes_cumulative() {
        let s = chain();
        let mut f = Formula::new();
        let p = f.mk_prop(P);
        let e0 = f.mk_everyone_believes(&[A, B], 0, p);
        let e1 = f.mk_everyone_believes(&[A, B], 1, p);
        let e2 = f.mk_everyone_believes(&[A, B], 2, p);
        let e3 = f.mk_everyone_believes(&[A, B], 3, p);
        let e9 = f.mk_everyone_believes(&[A, B], 9, p);
        assert!(f.evaluate(&s, w(0), e0));
        assert!(f.evaluate(&s, w(0), e1));
        assert!(f.evaluate(&s, w(0), e2));
        // w3 lies at distance 3 and violates p.
        assert!(!f.evaluate(&s, w(0), e3));
        assert!(!f.evaluate(&s, w(0), e9));
    }

    #[test]
    fn test_everyone_believes_checks_current_world() {
        let s = chain();
        let mut f = Formula::new();
        let q = f.mk_prop(Q);
        // A believes q at w2, but q does not hold at w2 itself.
        let a_q = f.mk_believes(A, q);
        let e = f.mk_everyone_believes(&[A], 1, q);
        assert!(f.evaluate(&s, w(2), a_q));
        assert!(!f.evaluate(&s, w(2), e));
    }

    #[test]
    fn test_everyone_believes_single_agent_relation() {
        let s = chain();
        let mut f = Formula::new();
        let p = f.mk_prop(P);
        // Only A's edges: w0 -> w1, and w1 has no A-successor.
        let e = f.mk_everyone_believes(&[A], 5, p);
        assert!(f.evaluate(&s, w(0), e));
    }

    #[test]
    fn test_everyone_believes_monotone_in_order() {
        let s = chain();
        let mut f = Formula::new();
        let p = f.mk_prop(P);
        let nodes: Vec<_> = (0..6).map(|k| f.mk_everyone_believes(&[A, B], k, p)).collect();
        for start in 0..4 {
            let results: Vec<bool> = nodes.iter().map(|&n| f.evaluate(&s, w(start), n)).collect();
            for k in 1..results.len() {
                if results[k] {
                    assert!(results[k - 1], "order {} holds but {} does not at w{}", k, k - 1, start);
                }
            }
        }
    }

    #[test]
    #[should_panic(expected = "not implemented")]
    fn test_common_belief_unimplemented() {
        let s = chain();
        let mut f = Formula::new();
        let p = f.mk_prop(P);
        let cb = f.mk_common_belief(&[A, B], p);
        f.evaluate(&s, w(0), cb);
    }

    #[test]
    #[should_panic(expected = "out of range for arena")]
    fn test_forward_reference_rejected() {
        let mut f = Formula::new();
        f.mk_not(NodeId(5));
    }

    #[test]
    fn test_to_string() {
        let mut f = Formula::new();
        let p = f.mk_prop(P);
        let q = f.mk_prop(Q);
        let not_q = f.mk_not(q);
        let and = f.mk_and([p, not_q]);
        let bel = f.mk_believes(B, and);
        let top = f.mk_top();
        let or = f.mk_or([bel, top]);
        let eb = f.mk_everyone_believes(&[A, B], 2, or);
        let cb = f.mk_common_belief(&[A], p);
        let null = f.mk_null();
        assert_eq!(
            f.to_string(&Names, eb),
            "EVERYONE_BELIEVES[alice,bob]^2(OR(BELIEVES[bob](AND(p, NOT(q))), TOP))"
        );
        assert_eq!(f.to_string(&Names, cb), "COMMON_BELIEF[alice](p)");
        assert_eq!(f.to_string(&Names, null), "EMPTY");
    }

    #[test]
    fn test_arena_is_append_only() {
        let mut f = Formula::new();
        let p = f.mk_prop(P);
        let not_p = f.mk_not(p);
        assert_eq!(p.index(), 0);
        assert_eq!(not_p.index(), 1);
        assert_eq!(f.len(), 2);
        assert_eq!(f.node(not_p), &Node::Not(p));
    }
}
