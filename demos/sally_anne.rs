use clap::{Parser, ValueEnum};

use del_rs::domain::Domain;
use del_rs::formula::{Formula, NodeId};
use del_rs::types::StateId;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Scenario {
    /// Attentive agents learn what they attend to.
    Attentiveness,
    /// Inattentive agents keep their old beliefs.
    Inertia,
    /// Attention shifts, followed by an ontic action.
    Shifts,
}

#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    /// Scenario to run.
    #[arg(value_enum, default_value = "inertia")]
    scenario: Scenario,

    /// Print the final state in DOT format.
    #[clap(long)]
    dot: bool,

    /// Enable debug logging.
    #[clap(short, long)]
    verbose: bool,
}

fn report(domain: &Domain, state: StateId, f: &Formula, queries: &[NodeId]) -> color_eyre::Result<()> {
    for &q in queries {
        println!("{} = {}.", f.to_string(domain, q), domain.evaluate_formula(state, f, q)?);
    }
    Ok(())
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let args = Cli::parse();

    simplelog::TermLogger::init(
        if args.verbose {
            simplelog::LevelFilter::Debug
        } else {
            simplelog::LevelFilter::Info
        },
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    println!("args = {:?}", args);

    let mut domain = Domain::new(
        &["sally", "anne"],
        &["marble_in_basket", "marble_in_box", "marble_in_table"],
        &[false, false, false],
    )?;
    println!("domain = {:?}", domain);

    let sally = domain.agent_id("sally")?;
    let anne = domain.agent_id("anne")?;
    let basket = domain.proposition_id("marble_in_basket")?;
    let box_ = domain.proposition_id("marble_in_box")?;
    let table = domain.proposition_id("marble_in_table")?;

    for p in domain.propositions() {
        println!("{} | {} | default: {}", p, domain.proposition_name(p), domain.default_value(p));
    }

    let mut f = Formula::new();
    let in_basket = f.mk_prop(basket);
    let in_box = f.mk_prop(box_);
    let on_table = f.mk_prop(table);

    let last = match args.scenario {
        Scenario::Attentiveness => {
            // Sally watches the basket and the table, Anne the box and the table.
            let s0 = domain.add_initial_state(&[
                domain.attention_proposition_id(sally, basket),
                domain.attention_proposition_id(sally, table),
                domain.attention_proposition_id(anne, box_),
                domain.attention_proposition_id(anne, table),
            ]);
            let sally_table = f.mk_believes(sally, on_table);
            let anne_table = f.mk_believes(anne, on_table);
            let queries = [on_table, sally_table, anne_table];
            report(&domain, s0, &f, &queries)?;

            println!("**** Anne puts the marble on the table ****");
            let (_, s1) = domain.perform_do(anne, &[table], &[])?;
            report(&domain, s1, &f, &queries)?;
            s1
        }
        Scenario::Inertia => {
            // Sally watches the basket, Anne the box; the marble is in the box.
            let s0 = domain.add_initial_state(&[
                box_,
                domain.attention_proposition_id(sally, basket),
                domain.attention_proposition_id(anne, box_),
            ]);
            let sally_basket = f.mk_believes(sally, in_basket);
            let anne_basket = f.mk_believes(anne, in_basket);
            let anne_box = f.mk_believes(anne, in_box);
            let sally_anne_basket = f.mk_believes(sally, anne_basket);
            let queries = [in_basket, in_box, sally_basket, anne_basket, anne_box, sally_anne_basket];
            report(&domain, s0, &f, &queries)?;

            println!("**** Sally moves the marble from the box to the basket ****");
            let (_, s1) = domain.perform_do(sally, &[basket], &[box_])?;
            report(&domain, s1, &f, &queries)?;
            s1
        }
        Scenario::Shifts => {
            let mut true_props = Vec::new();
            for a in [sally, anne] {
                for p in domain.base_propositions() {
                    true_props.push(domain.attention_proposition_id(a, p));
                }
            }
            domain.add_initial_state(&true_props);

            println!("**** Sally privately stops watching the basket ****");
            domain.perform_private_top_down(sally, &[], &[basket])?;
            println!("**** Anne publicly stops watching the table ****");
            domain.perform_minimal_bottom_up(&[anne], &[], &[table])?;
            println!("**** Anne puts the marble in the basket ****");
            let (_, s3) = domain.perform_do(anne, &[basket], &[])?;

            let sally_basket = f.mk_believes(sally, in_basket);
            let anne_basket = f.mk_believes(anne, in_basket);
            let everyone = f.mk_everyone_believes(&[sally, anne], 2, in_basket);
            report(&domain, s3, &f, &[in_basket, sally_basket, anne_basket, everyone])?;

            for agent in [sally, anne] {
                println!("Beliefs about {}'s attention:", domain.agent_name(agent));
                print!("{}", domain.attention_beliefs(s3, agent)?);
            }
            s3
        }
    };

    let state = domain.state(last)?;
    print!("{}", domain.state_overview(state, &domain.base_propositions()));

    if args.dot {
        println!("{}", state.to_dot(&domain, &domain.base_propositions())?);
    }

    Ok(())
}
