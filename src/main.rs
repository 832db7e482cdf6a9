//! Binary entry point for `m2g`.

use clap::Parser;

use mantis2github::cli::commands::{backlink, convert, migrate};
use mantis2github::cli::{Cli, Commands};
use mantis2github::logging;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init_logging(
        cli.global.verbose,
        cli.global.quiet,
        cli.global.log_file.as_deref(),
    ) {
        eprintln!("error: failed to initialize logging: {e}");
        std::process::exit(1);
    }

    let result = match &cli.command {
        Commands::Migrate(args) => migrate::execute(args),
        Commands::Convert(args) => convert::execute(args),
        Commands::Backlink(args) => backlink::execute(args),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
