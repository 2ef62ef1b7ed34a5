//! State to DOT (Graphviz) conversion.
//!
//! The generated graph follows these conventions:
//! - one node per reachable world, labeled with its index and the listed
//!   propositions that hold there;
//! - the designated world (world `0`) is drawn with its own shape;
//! - one directed edge per agent and accessible pair of reachable worlds,
//!   labeled with the agent's name.
//!
//! # Examples
//!
//! ```
//! use del_rs::domain::Domain;
//!
//! let mut domain = Domain::new(&["alice"], &["p"], &[false]).unwrap();
//! let p = domain.proposition_id("p").unwrap();
//! let s0 = domain.add_initial_state(&[p]);
//!
//! let state = domain.state(s0).unwrap();
//! let dot = state.to_dot(&domain, &domain.base_propositions()).unwrap();
//! // Write to file and render with: dot -Tpng output.dot -o output.png
//! assert!(dot.starts_with("digraph {"));
//! ```

use std::fmt::Write as _;

use crate::formula::Naming;
use crate::state::State;
use crate::types::{AgentId, PropositionId, WorldId};

/// Configuration options for DOT output generation.
///
/// Use `DotConfig::default()` for standard settings.
#[derive(Debug, Clone)]
pub struct DotConfig {
    /// Shape for worlds (default: "ellipse")
    pub world_shape: &'static str,
    /// Shape for the designated world (default: "doublecircle")
    pub designated_shape: &'static str,
    /// Style for accessibility edges (default: "solid")
    pub edge_style: &'static str,
    /// Whether to draw worlds that are not reachable from the designated world (default: false)
    pub show_unreachable: bool,
}

impl Default for DotConfig {
    fn default() -> Self {
        Self {
            world_shape: "ellipse",
            designated_shape: "doublecircle",
            edge_style: "solid",
            show_unreachable: false,
        }
    }
}

impl State {
    /// Converts a state to DOT format.
    ///
    /// World labels list the propositions of `props` that hold there;
    /// names are resolved through `naming`.
    pub fn to_dot(&self, naming: &impl Naming, props: &[PropositionId]) -> Result<String, std::fmt::Error> {
        self.to_dot_with_config(naming, props, &DotConfig::default())
    }

    /// Converts a state to DOT format with custom configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use del_rs::domain::Domain;
    /// use del_rs::dot::DotConfig;
    ///
    /// let mut domain = Domain::new(&["alice", "bob"], &["p"], &[false]).unwrap();
    /// let s0 = domain.add_initial_state(&[]);
    ///
    /// let config = DotConfig {
    ///     show_unreachable: true,
    ///     ..DotConfig::default()
    /// };
    ///
    /// let state = domain.state(s0).unwrap();
    /// let dot = state.to_dot_with_config(&domain, &[], &config).unwrap();
    /// ```
    pub fn to_dot_with_config(
        &self,
        naming: &impl Naming,
        props: &[PropositionId],
        config: &DotConfig,
    ) -> Result<String, std::fmt::Error> {
        let worlds: Vec<WorldId> = if config.show_unreachable {
            (0..self.get_num_worlds()).map(WorldId::from).collect()
        } else {
            self.reachable_worlds().collect()
        };

        let mut dot = String::new();
        writeln!(dot, "digraph {{")?;
        writeln!(dot, "node [shape={}];", config.world_shape)?;

        for &w in &worlds {
            let holds: Vec<&str> = props
                .iter()
                .filter(|&&p| self.get_valuation(w, p))
                .map(|&p| naming.proposition_name(p))
                .collect();
            let label = if holds.is_empty() {
                w.to_string()
            } else {
                format!("{}\\n{}", w, holds.join("\\n"))
            };
            if w.index() == 0 {
                writeln!(dot, "{} [shape={}, label=\"{}\"];", w, config.designated_shape, label)?;
            } else {
                writeln!(dot, "{} [label=\"{}\"];", w, label)?;
            }
        }

        for agent in (0..self.num_agents()).map(AgentId::from) {
            for &w in &worlds {
                for &v in &worlds {
                    if self.get_accessible(agent, w, v) {
                        writeln!(
                            dot,
                            "{} -> {} [label=\"{}\", style={}];",
                            w,
                            v,
                            naming.agent_name(agent),
                            config.edge_style
                        )?;
                    }
                }
            }
        }

        writeln!(dot, "}}")?;
        Ok(dot)
    }
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
            ["p", "q"][prop.index()]
        }
    }

    const A: AgentId = AgentId::new(0);
    const B: AgentId = AgentId::new(1);
    const P: PropositionId = PropositionId::new(0);
    const Q: PropositionId = PropositionId::new(1);

    /// w0 (p) -A-> w1 (q), w2 isolated.
    fn state() -> State {
        let mut s = State::new(2, 3, CommonState::new(2));
        s.set_valuation(WorldId::new(0), P, true);
        s.set_valuation(WorldId::new(1), Q, true);
        s.set_accessible(A, WorldId::new(0), WorldId::new(1), true);
        s.set_accessible(B, WorldId::new(1), WorldId::new(1), true);
        s.recompute_reachability();
        s
    }

    #[test]
    fn test_to_dot_basic() {
        let dot = state().to_dot(&Names, &[P, Q]).unwrap();
        assert!(dot.starts_with("digraph {"));
        assert!(dot.ends_with("}\n"));
        assert!(dot.contains("w0 [shape=doublecircle, label=\"w0\\np\"];"));
        assert!(dot.contains("w1 [label=\"w1\\nq\"];"));
        assert!(dot.contains("w0 -> w1 [label=\"alice\", style=solid];"));
        assert!(dot.contains("w1 -> w1 [label=\"bob\", style=solid];"));
        assert!(!dot.contains("w2"));
    }

    #[test]
    fn test_to_dot_with_config() {
        let config = DotConfig {
            show_unreachable: true,
            edge_style: "dashed",
            ..DotConfig::default()
        };
        let dot = state().to_dot_with_config(&Names, &[], &config).unwrap();
        assert!(dot.contains("w2 [label=\"w2\"];"));
        assert!(dot.contains("w0 -> w1 [label=\"alice\", style=dashed];"));
    }

    #[test]
    fn test_to_dot_empty_state() {
        let s = State::new(2, 0, CommonState::new(2));
        let dot = s.to_dot(&Names, &[P]).unwrap();
        assert_eq!(dot, "digraph {\nnode [shape=ellipse];\n}\n");
    }

    /// Helper test to write DOT file for manual inspection (disabled by default)
    #[test]
    #[ignore]
    fn test_write_dot_file() {
        let dot = state().to_dot(&Names, &[P, Q]).unwrap();
        std::fs::write("test_output.dot", &dot).unwrap();
        println!("DOT output:\n{}", dot);
    }
}
