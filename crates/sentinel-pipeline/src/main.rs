use clap::{value_parser, Arg, ArgAction, Command};
use sentinel_pipeline::simulator::{run_simulator, SimulatorConfig};
use sentinel_pipeline::PipelineConfig;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Command::new("sentinel")
        .version(sentinel_pipeline::VERSION)
        .about("Warehouse task-failure investigation pipeline")
        .subcommand_required(true)
        .subcommand(
            Command::new("demo")
                .about("Run the pipeline against the built-in demo scenario")
                .arg(
                    Arg::new("config")
                        .long("config")
                        .value_parser(value_parser!(PathBuf))
                        .help("Pipeline configuration file (TOML)"),
                )
                .arg(
                    Arg::new("approve-all")
                        .long("approve-all")
                        .action(ArgAction::SetTrue)
                        .help("Approve every pending investigation and deliver notifications"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print the run summary as JSON"),
                ),
        )
        .subcommand(
            Command::new("check-config")
                .about("Parse a configuration file and print the effective settings")
                .arg(
                    Arg::new("config")
                        .long("config")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Pipeline configuration file (TOML)"),
                ),
        );

    match cli.get_matches().subcommand() {
        Some(("demo", matches)) => {
            let mut config = SimulatorConfig::default();
            if let Some(path) = matches.get_one::<PathBuf>("config") {
                config.pipeline = PipelineConfig::load(path)?;
            }
            config.approve_all = matches.get_flag("approve-all");

            let outcome = run_simulator(config).await?;

            if matches.get_flag("json") {
                println!("{}", serde_json::to_string_pretty(&outcome.summary)?);
            } else {
                println!(
                    "run {}: {} incidents, {} diagnosed, {} notified, projected savings ${:.2}/yr",
                    outcome.summary.run_id,
                    outcome.summary.counters.collected,
                    outcome.summary.counters.diagnosed,
                    outcome.summary.counters.notified,
                    outcome.summary.total_projected_savings_usd(),
                );
                for (fingerprint, report) in &outcome.summary.incidents {
                    println!(
                        "  {} {} [{}] approval={}",
                        fingerprint.short(),
                        report.task_name,
                        report.investigation_state,
                        report.approval_state,
                    );
                }
            }
        }
        Some(("check-config", matches)) => {
            let path = matches
                .get_one::<PathBuf>("config")
                .ok_or_else(|| anyhow::anyhow!("--config is required"))?;
            let config = PipelineConfig::load(path)?;
            println!("{config:#?}");
        }
        _ => unreachable!("subcommand_required"),
    }

    Ok(())
}
