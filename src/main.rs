/*!
 * schedsim - Main Entry Point
 *
 * Loads a process script, simulates it under the selected scheduling
 * policy, and prints the per-tick trace
 */

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use schedsim::{load_script, report, PolicyKind, Simulation};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "schedsim",
    about = "Discrete-time simulator of single-CPU process scheduling with resource contention"
)]
struct Args {
    /// Process script to simulate
    script: PathBuf,

    /// Scheduling policy
    #[arg(short, long, value_enum, default_value_t = PolicyKind::Fifo)]
    policy: PolicyKind,

    /// Suppress the banner and the per-process briefing
    #[arg(short, long)]
    quiet: bool,

    /// Print the final simulation state as JSON after the run
    #[arg(long)]
    dump: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let scripts = load_script(&args.script)
        .with_context(|| format!("loading script {}", args.script.display()))?;
    info!("loaded {} process(es) from {}", scripts.len(), args.script.display());

    let mut sim = Simulation::new(args.policy, &scripts).context("loading simulation")?;
    if !args.quiet {
        print!("{}", report::banner(args.policy.name()));
        println!();
        print!("{}", report::briefing(&scripts));
        println!();
    }

    let summary = sim.run().context("simulation aborted")?;
    eprint!("{}", report::render_trace(sim.state().events()));

    if args.dump {
        println!(
            "{}",
            serde_json::to_string_pretty(&sim.state().snapshot())
                .context("serializing final state")?
        );
    }
    if !args.quiet {
        println!(
            "completed {} process(es) in {} tick(s)",
            summary.completed, summary.ticks
        );
    }
    Ok(())
}
