use clap::{Parser, Subcommand};
use loco_cli::{LogConfig, Result, SimulationConfig, run_simulation};
use loco_connection::DEFAULT_SERVICE_TYPE;
use loco_game::WorkerRole;

#[derive(Parser)]
#[command(name = "loco-cli")]
#[command(version, about = "Loco session CLI - nearby multiplayer sessions, simulated")]
struct Cli {
    /// Verbose logging
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a host and N participants over an in-memory network
    Simulate {
        /// Number of participants joining the host
        #[arg(short = 'p', long, default_value_t = 2)]
        participants: usize,

        /// Init payload broadcast with gameStarted
        #[arg(short = 's', long, default_value = "seed=42")]
        seed: String,

        /// Worker payloads each participant sends
        #[arg(short = 'r', long, default_value_t = 3)]
        rounds: usize,

        /// Discovery service type
        #[arg(long, default_value = DEFAULT_SERVICE_TYPE)]
        service: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_config = if cli.verbose {
        LogConfig::dev()
    } else {
        LogConfig::default()
    };
    log_config.init()?;

    match cli.command {
        Commands::Simulate {
            participants,
            seed,
            rounds,
            service,
        } => {
            let config = SimulationConfig {
                participants,
                seed,
                rounds,
                service_type: service,
                ..SimulationConfig::default()
            };

            let report = run_simulation(config).await?;

            println!("\n📊 Simulation summary");
            println!(
                "{:<12} {:<12} {:<16} {:>8} {:>8} {:>9}",
                "DEVICE", "ROLE", "SEED", "RECEIVED", "ECHOED", "CONNECTED"
            );
            for device in &report.devices {
                let role = match device.role {
                    Some(WorkerRole::Host) => "host",
                    Some(WorkerRole::Participant) => "participant",
                    None => "-",
                };
                println!(
                    "{:<12} {:<12} {:<16} {:>8} {:>8} {:>9}",
                    device.name, role, device.seed, device.received, device.echoed, device.connected
                );
            }
        }
    }

    Ok(())
}
