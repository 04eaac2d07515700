mod commands;
mod terminal;

use commands::{CommandLine, Commands, probe, run};
use terminal::{logging, print};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    logging::init_logging(commands.verbose);

    let cfg = commands.config();

    match commands.command {
        Commands::Run(args) => {
            print::header("fingerprint dispatch");
            run::run(args, &cfg).await
        }
        Commands::Probe { url } => {
            print::header("single probe");
            probe::probe(&url, &cfg).await
        }
    }
}
