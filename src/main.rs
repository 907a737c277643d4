use clap::Parser;
use homeshell::cli::commands::Cli;
use homeshell::cli::handlers;
use homeshell::io::{config_io, logging};

fn main() {
    let cli = Cli::parse();
    let data_dir = config_io::resolve_data_dir(cli.data_dir.as_deref());

    let config = match config_io::read_config(&data_dir) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    };
    logging::init_logging(&data_dir, &config.log);

    let result = match cli.command {
        // No subcommand → launch TUI
        None => homeshell::tui::run(&data_dir, &config),
        Some(command) => handlers::dispatch(command, &data_dir, cli.json),
    };
    if let Err(e) = result {
        tracing::error!(error = %e, "exiting with error");
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
