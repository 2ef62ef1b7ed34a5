//! Debug utilities for inspecting states.
//!
//! These produce human-readable text and are primarily useful in demos,
//! tests and during development.

use std::fmt::Write;

use crate::domain::Domain;
use crate::error::DelError;
use crate::formula::Formula;
use crate::state::State;
use crate::types::{AgentId, PropositionId, StateId, WorldId};

impl Domain {
    /// Dumps every reachable world of `state`: the values of `props`, then
    /// each agent's accessible worlds.
    ///
    /// ```text
    /// ------ World 0 ------
    /// marble_in_box = true.
    /// Accessibility:
    ///  sally: w0: true | w1: false |
    /// ```
    pub fn state_overview(&self, state: &State, props: &[PropositionId]) -> String {
        let mut result = String::new();
        let n = state.get_num_worlds();

        for w in state.reachable_worlds() {
            writeln!(&mut result, "------ World {} ------", w.id()).unwrap();
            for &p in props {
                writeln!(&mut result, "{} = {}.", self.proposition_name(p), state.get_valuation(w, p)).unwrap();
            }
            writeln!(&mut result, "Accessibility:").unwrap();
            for agent in self.agents() {
                write!(&mut result, " {}:", self.agent_name(agent)).unwrap();
                for v in (0..n).map(WorldId::from) {
                    write!(&mut result, " {}: {} |", v, state.get_accessible(agent, w, v)).unwrap();
                }
                writeln!(&mut result).unwrap();
            }
        }
        result
    }

    /// Reports, for every agent, which of `agent`'s attention propositions it
    /// believes to hold in the designated world of state `id`.
    pub fn attention_beliefs(&self, id: StateId, agent: AgentId) -> Result<String, DelError> {
        let state = self.state(id)?;
        let mut result = String::new();
        let mut formula = Formula::new();

        for observer in self.agents() {
            let mut believed = Vec::new();
            for p in self.base_propositions() {
                let att = formula.mk_prop(self.attention_proposition_id(agent, p));
                let belief = formula.mk_believes(observer, att);
                if formula.evaluate(state, WorldId::new(0), belief) {
                    believed.push(belief);
                }
            }

            if believed.is_empty() {
                writeln!(
                    &mut result,
                    "{} believes {} is not paying attention to any proposition",
                    self.agent_name(observer),
                    self.agent_name(agent)
                )
                .unwrap();
            } else {
                for belief in believed {
                    writeln!(&mut result, "{}", formula.to_string(self, belief)).unwrap();
                }
            }
        }
        Ok(result)
    }
}
