//! Named agents and propositions, attention propositions, and the history
//! of states and actions.
//!
//! A [`Domain`] is built from a list of agents and a list of *base*
//! propositions. For every agent `a` and base proposition `p` it adds an
//! *attention* proposition `a_is_paying_attention_to_p`, so with `k` base
//! propositions the universe is:
//!
//! ```text
//! 0 .. k                base propositions
//! k + a*k + p           attention of agent a to base proposition p
//! ```
//!
//! The domain keeps an append-only history: every `perform_*` method builds
//! an [`Action`], applies it to the latest state through
//! [`State::product_update`], and appends both.
//!
//! # Events and attention
//!
//! Scenario actions partition their events by which subset of the changed
//! propositions an observer notices. Event `0` is always the designated
//! event. An agent moves from event `0` to the event matching exactly the
//! set of changed propositions it pays attention to, which is decided by an
//! accessibility formula over attention propositions evaluated in the source
//! world.

use std::collections::{BTreeMap, HashMap};

use log::debug;

use crate::action::Action;
use crate::bitset::CommonState;
use crate::error::DelError;
use crate::formula::{Formula, Naming, NodeId};
use crate::state::State;
use crate::types::{ActionId, AgentId, EventId, PropositionId, StateId, WorldId};
use crate::utils::{remainder, subsets};

pub struct Domain {
    agents: Vec<String>,
    agent_ids: HashMap<String, AgentId>,
    propositions: Vec<String>,
    defaults: Vec<bool>,
    proposition_ids: HashMap<String, PropositionId>,
    num_base_propositions: usize,
    props: CommonState,
    states: Vec<State>,
    actions: Vec<Action>,
}

impl std::fmt::Debug for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Domain")
            .field("agents", &self.agents.len())
            .field("propositions", &self.propositions.len())
            .field("states", &self.states.len())
            .field("actions", &self.actions.len())
            .finish()
    }
}

impl Domain {
    /// Creates a domain with the given agents and base propositions.
    ///
    /// `defaults[p]` is the value a base proposition takes in worlds where an
    /// agent falsely believes it is paying attention to `p`. Attention
    /// propositions default to `true`.
    pub fn new(agents: &[&str], propositions: &[&str], defaults: &[bool]) -> Result<Self, DelError> {
        if defaults.len() != propositions.len() {
            return Err(DelError::DefaultsLength {
                expected: propositions.len(),
                actual: defaults.len(),
            });
        }

        let agents: Vec<String> = agents.iter().map(|s| s.to_string()).collect();
        let agent_ids = agents
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), AgentId::from(i)))
            .collect();

        let num_base_propositions = propositions.len();
        let mut all_propositions: Vec<String> = propositions.iter().map(|s| s.to_string()).collect();
        let mut all_defaults = defaults.to_vec();
        for agent in &agents {
            for prop in propositions {
                all_propositions.push(attention_name(agent, prop));
                all_defaults.push(true);
            }
        }
        let proposition_ids = all_propositions
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), PropositionId::from(i)))
            .collect();

        let props = CommonState::new(all_propositions.len());
        debug!(
            "Domain::new(agents = {}, base propositions = {}, total propositions = {})",
            agents.len(),
            num_base_propositions,
            all_propositions.len()
        );

        Ok(Self {
            agents,
            agent_ids,
            propositions: all_propositions,
            defaults: all_defaults,
            proposition_ids,
            num_base_propositions,
            props,
            states: Vec::new(),
            actions: Vec::new(),
        })
    }

    pub fn num_agents(&self) -> usize {
        self.agents.len()
    }

    /// Returns the total number of propositions, attention propositions included.
    pub fn num_propositions(&self) -> usize {
        self.propositions.len()
    }

    /// Returns the common state of every valuation in this domain.
    pub fn props(&self) -> CommonState {
        self.props
    }

    pub fn agent_id(&self, name: &str) -> Result<AgentId, DelError> {
        self.agent_ids
            .get(name)
            .copied()
            .ok_or_else(|| DelError::UnknownAgent(name.to_string()))
    }

    pub fn agent_name(&self, agent: AgentId) -> &str {
        &self.agents[agent.index()]
    }

    pub fn agents(&self) -> impl Iterator<Item = AgentId> {
        (0..self.agents.len()).map(AgentId::from)
    }

    pub fn proposition_id(&self, name: &str) -> Result<PropositionId, DelError> {
        self.proposition_ids
            .get(name)
            .copied()
            .ok_or_else(|| DelError::UnknownProposition(name.to_string()))
    }

    pub fn proposition_name(&self, prop: PropositionId) -> &str {
        &self.propositions[prop.index()]
    }

    pub fn default_value(&self, prop: PropositionId) -> bool {
        self.defaults[prop.index()]
    }

    /// Returns all propositions, attention propositions included.
    pub fn propositions(&self) -> Vec<PropositionId> {
        (0..self.propositions.len()).map(PropositionId::from).collect()
    }

    /// Returns the base (non-attention) propositions.
    pub fn base_propositions(&self) -> Vec<PropositionId> {
        (0..self.num_base_propositions).map(PropositionId::from).collect()
    }

    /// Returns the proposition "`agent` is paying attention to `prop`".
    ///
    /// # Panics
    ///
    /// Panics if `prop` is not a base proposition or `agent` is out of range.
    pub fn attention_proposition_id(&self, agent: AgentId, prop: PropositionId) -> PropositionId {
        let k = self.num_base_propositions;
        assert!(prop.index() < k, "{} is not a base proposition", prop);
        assert!(agent.index() < self.agents.len(), "Agent {} out of range", agent);
        PropositionId::from(k + agent.index() * k + prop.index())
    }

    /// Decomposes an attention proposition into its agent and base proposition.
    pub fn agent_and_proposition(&self, attention: PropositionId) -> Result<(AgentId, PropositionId), DelError> {
        let k = self.num_base_propositions;
        if attention.index() < k || attention.index() >= self.propositions.len() {
            return Err(DelError::NotAttentionProposition(attention));
        }
        let offset = attention.index() - k;
        Ok((AgentId::from(offset / k), PropositionId::from(offset % k)))
    }

    pub fn state(&self, id: StateId) -> Result<&State, DelError> {
        self.states.get(id.index()).ok_or(DelError::UnknownState(id))
    }

    pub fn action(&self, id: ActionId) -> Option<&Action> {
        self.actions.get(id.index())
    }

    /// Returns the latest state of the history.
    pub fn current_state(&self) -> Result<&State, DelError> {
        self.states.last().ok_or(DelError::NoCurrentState)
    }

    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    pub fn num_actions(&self) -> usize {
        self.actions.len()
    }

    /// Evaluates `node` in the designated world of state `id`.
    pub fn evaluate_formula(&self, id: StateId, formula: &Formula, node: NodeId) -> Result<bool, DelError> {
        let state = self.state(id)?;
        Ok(formula.evaluate(state, WorldId::new(0), node))
    }
}

impl Naming for Domain {
    fn agent_name(&self, agent: AgentId) -> &str {
        Domain::agent_name(self, agent)
    }

    fn proposition_name(&self, prop: PropositionId) -> &str {
        Domain::proposition_name(self, prop)
    }
}

fn attention_name(agent: &str, prop: &str) -> String {
    format!("{}_is_paying_attention_to_{}", agent, prop)
}

/// Subsets of changed propositions, one per event.
///
/// Entry `0` is everything (`add`, `del`), entry `1` is nothing, and the
/// remaining entries are all other combinations of a subset of `add` with a
/// subset of `del`.
fn event_partition(add: &[PropositionId], del: &[PropositionId]) -> Vec<(Vec<PropositionId>, Vec<PropositionId>)> {
    let mut events = vec![(add.to_vec(), del.to_vec()), (Vec::new(), Vec::new())];
    for sub_add in subsets(add) {
        for sub_del in subsets(del) {
            if sub_add.len() == add.len() && sub_del.len() == del.len() {
                continue;
            }
            if sub_add.is_empty() && sub_del.is_empty() {
                continue;
            }
            events.push((sub_add.clone(), sub_del));
        }
    }
    events
}

fn concat(a: &[PropositionId], b: &[PropositionId]) -> Vec<PropositionId> {
    a.iter().chain(b).copied().collect()
}

impl Domain {
    /// `AND` of `agent`'s attention to every proposition in `attended` and
    /// inattention to every proposition in `unattended`.
    fn attention_condition(
        &self,
        formula: &mut Formula,
        agent: AgentId,
        attended: &[PropositionId],
        unattended: &[PropositionId],
    ) -> NodeId {
        let mut conditions = Vec::with_capacity(attended.len() + unattended.len());
        for &p in attended {
            conditions.push(formula.mk_prop(self.attention_proposition_id(agent, p)));
        }
        for &p in unattended {
            let att = formula.mk_prop(self.attention_proposition_id(agent, p));
            conditions.push(formula.mk_not(att));
        }
        formula.mk_and(conditions)
    }

    /// Sets, for agent `j`, the accessibility of an action whose events follow
    /// [`event_partition`]: `j` stays in event `0` iff attending to every
    /// changed proposition, moves to event `1` iff attending to none, and to the
    /// matching partial event otherwise.
    fn set_attention_accessibility(
        &self,
        action: &mut Action,
        agent: AgentId,
        events: &[(Vec<PropositionId>, Vec<PropositionId>)],
    ) {
        let e0 = EventId::new(0);
        let e1 = EventId::new(1);
        let top = action.top();
        let changed = concat(&events[0].0, &events[0].1);

        let all = self.attention_condition(action.formula_mut(), agent, &changed, &[]);
        let none = self.attention_condition(action.formula_mut(), agent, &[], &changed);
        action.set_accessible(agent, e0, e0, all);
        action.set_accessible(agent, e0, e1, none);
        action.set_accessible(agent, e1, e1, top);

        for (h, (sub_add, sub_del)) in events.iter().enumerate().skip(2) {
            let subset = concat(sub_add, sub_del);
            let rest = remainder(&subset, &changed);
            let cond = self.attention_condition(action.formula_mut(), agent, &subset, &rest);
            let e = EventId::from(h);
            action.set_accessible(agent, e0, e, cond);
            action.set_accessible(agent, e, e, top);
        }
    }

    /// Applies `action` to the current state and appends both to the history.
    fn commit(&mut self, action: Action) -> Result<(ActionId, StateId), DelError> {
        let new_state = self.current_state()?.product_update(&action);
        let action_id = ActionId::from(self.actions.len());
        let state_id = StateId::from(self.states.len());
        debug!(
            "commit: {} with {} events -> {} with {} worlds",
            action_id,
            action.num_events(),
            state_id,
            new_state.get_num_worlds()
        );
        self.actions.push(action);
        self.states.push(new_state);
        Ok((action_id, state_id))
    }

    /// Adds an initial state where exactly `true_props` hold in the actual world.
    ///
    /// Agents are grouped by their *false attention set*: the base propositions
    /// whose attention proposition is not in `true_props`. Every group gets
    /// one world, in which the group's agents believe they pay attention to
    /// everything; the propositions of the false attention set take their
    /// default values there. The group with the empty set (fully attentive
    /// agents) owns world `0`.
    pub fn add_initial_state(&mut self, true_props: &[PropositionId]) -> StateId {
        let mut groups: BTreeMap<Vec<PropositionId>, Vec<Option<AgentId>>> = BTreeMap::new();
        // The actual world exists even if no agent is fully attentive.
        groups.entry(Vec::new()).or_default().push(None);

        for agent in self.agents() {
            let false_attention: Vec<PropositionId> = self
                .base_propositions()
                .into_iter()
                .filter(|&p| !true_props.contains(&self.attention_proposition_id(agent, p)))
                .collect();
            groups.entry(false_attention).or_default().push(Some(agent));
        }

        let mut state = State::new(self.num_agents(), groups.len(), self.props);
        let w0 = WorldId::new(0);

        for (i, (false_attention, group)) in groups.iter().enumerate() {
            let w = WorldId::from(i);

            for &p in true_props {
                state.set_valuation(w, p, true);
            }
            for &p in false_attention {
                state.set_valuation(w, p, self.default_value(p));
                for agent in self.agents() {
                    let att = self.attention_proposition_id(agent, p);
                    state.set_valuation(w, att, self.default_value(att));
                }
            }

            for agent in group.iter().flatten() {
                state.set_accessible(*agent, w0, w, true);
            }
            if i != 0 {
                for agent in self.agents() {
                    state.set_accessible(agent, w, w, true);
                }
            }
        }

        debug!("add_initial_state: {} worlds", state.get_num_worlds());
        let id = StateId::from(self.states.len());
        self.states.push(state);
        id
    }

    /// Ontic action: `add` become true and `del` become false.
    ///
    /// Every agent perceives the changes it pays attention to and believes
    /// nothing else changed. `agent` is the performer; it is recorded for
    /// tracing only, since perception depends on attention alone.
    pub fn perform_do(
        &mut self,
        agent: AgentId,
        add: &[PropositionId],
        del: &[PropositionId],
    ) -> Result<(ActionId, StateId), DelError> {
        debug!("perform_do(agent = {}, add = {:?}, del = {:?})", self.agent_name(agent), add, del);

        let events = event_partition(add, del);
        let mut action = Action::new(self.num_agents(), events.len(), self.props);

        for (h, (sub_add, sub_del)) in events.iter().enumerate() {
            let e = EventId::from(h);
            for &p in sub_add {
                action.set_post(e, p, true);
            }
            for &p in sub_del {
                action.set_post(e, p, false);
            }
        }

        for j in self.agents() {
            self.set_attention_accessibility(&mut action, j, &events);
        }

        self.commit(action)
    }

    /// Public attention shift, single event: every agent in `shifters` starts
    /// paying attention to `add` and stops paying attention to `del`, and
    /// everyone observes it.
    pub fn perform_minimal_bottom_up(
        &mut self,
        shifters: &[AgentId],
        add: &[PropositionId],
        del: &[PropositionId],
    ) -> Result<(ActionId, StateId), DelError> {
        debug!("perform_minimal_bottom_up(shifters = {:?}, add = {:?}, del = {:?})", shifters, add, del);

        let mut action = Action::new(self.num_agents(), 1, self.props);
        let e0 = EventId::new(0);

        for &i in shifters {
            for &p in del {
                action.set_post(e0, self.attention_proposition_id(i, p), false);
            }
            for &p in add {
                action.set_post(e0, self.attention_proposition_id(i, p), true);
            }
        }

        let top = action.top();
        for j in self.agents() {
            action.set_accessible(j, e0, e0, top);
        }

        self.commit(action)
    }

    /// Public attention shift, one event per subset of `add`.
    ///
    /// Shifters update their attention in every event. Event `0` also restores
    /// the actual value of each proposition in `add`; the event of a proper
    /// subset restores only that subset. Agents attending to all of `add`,
    /// and the shifters, stay in event `0`; every other agent moves to the
    /// event matching its attention.
    pub fn perform_expanded_bottom_up(
        &mut self,
        shifters: &[AgentId],
        add: &[PropositionId],
        del: &[PropositionId],
    ) -> Result<(ActionId, StateId), DelError> {
        debug!("perform_expanded_bottom_up(shifters = {:?}, add = {:?}, del = {:?})", shifters, add, del);

        let current = self.current_state()?;
        let actual: Vec<bool> = add.iter().map(|&p| current.actual_valuation(p)).collect();

        let num_events = 1usize << add.len();
        let mut action = Action::new(self.num_agents(), num_events, self.props);
        let e0 = EventId::new(0);

        for &i in shifters {
            for &p in del {
                let att = self.attention_proposition_id(i, p);
                for e in (0..num_events).map(EventId::from) {
                    action.set_post(e, att, false);
                }
            }
            for (&p, &value) in add.iter().zip(&actual) {
                let att = self.attention_proposition_id(i, p);
                for e in (0..num_events).map(EventId::from) {
                    action.set_post(e, att, true);
                }
                action.set_post(e0, p, value);
            }
        }

        let top = action.top();
        for j in self.agents() {
            let cond = self.attention_condition(action.formula_mut(), j, add, &[]);
            action.set_accessible(j, e0, e0, cond);
        }
        for &i in shifters {
            action.set_accessible(i, e0, e0, top);
        }

        let mut add_subsets = subsets(add);
        add_subsets.pop(); // Full set is event 0.

        for (k, subset) in add_subsets.iter().enumerate() {
            let e = EventId::from(k + 1);
            if !shifters.is_empty() {
                for &p in subset {
                    action.set_post(e, p, current.actual_valuation(p));
                }
            }

            let rest = remainder(subset, add);
            for j in self.agents() {
                let cond = self.attention_condition(action.formula_mut(), j, subset, &rest);
                if shifters.iter().any(|&i| i != j) {
                    action.set_accessible(j, e0, e, cond);
                }
                action.set_accessible(j, e, e, top);
            }
        }

        self.commit(action)
    }

    /// Private attention shift: `agent` starts paying attention to `add` and
    /// stops paying attention to `del`; all other agents believe nothing happened.
    pub fn perform_private_top_down(
        &mut self,
        agent: AgentId,
        add: &[PropositionId],
        del: &[PropositionId],
    ) -> Result<(ActionId, StateId), DelError> {
        debug!(
            "perform_private_top_down(agent = {}, add = {:?}, del = {:?})",
            self.agent_name(agent),
            add,
            del
        );

        let mut action = Action::new(self.num_agents(), 2, self.props);
        let performer = EventId::new(0);
        let others = EventId::new(1);

        for &p in del {
            action.set_post(performer, self.attention_proposition_id(agent, p), false);
        }
        for &p in add {
            action.set_post(performer, self.attention_proposition_id(agent, p), true);
        }

        let top = action.top();
        for j in self.agents() {
            if j == agent {
                action.set_accessible(j, performer, performer, top);
            } else {
                action.set_accessible(j, performer, others, top);
            }
            action.set_accessible(j, others, others, top);
        }

        self.commit(action)
    }

    /// Conscious attention shift: `agent` starts paying attention to `add`
    /// (learning their actual values) and stops paying attention to `del`.
    ///
    /// The acting agent knows exactly what happened; every other agent perceives
    /// the part of the shift it pays attention to.
    pub fn perform_conscious_top_down(
        &mut self,
        agent: AgentId,
        add: &[PropositionId],
        del: &[PropositionId],
    ) -> Result<(ActionId, StateId), DelError> {
        debug!(
            "perform_conscious_top_down(agent = {}, add = {:?}, del = {:?})",
            self.agent_name(agent),
            add,
            del
        );

        let current = self.current_state()?;
        let events = event_partition(add, del);
        let mut action = Action::new(self.num_agents(), events.len(), self.props);

        for (h, (sub_add, sub_del)) in events.iter().enumerate() {
            let e = EventId::from(h);
            for &p in sub_add {
                action.set_post(e, self.attention_proposition_id(agent, p), true);
                action.set_post(e, p, current.actual_valuation(p));
            }
            for &p in sub_del {
                action.set_post(e, self.attention_proposition_id(agent, p), false);
            }
        }

        let top = action.top();
        action.set_accessible(agent, EventId::new(0), EventId::new(0), top);
        action.set_accessible(agent, EventId::new(1), EventId::new(1), top);

        for j in self.agents().filter(|&j| j != agent) {
            self.set_attention_accessibility(&mut action, j, &events);
        }

        self.commit(action)
    }
}
