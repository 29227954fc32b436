use clap::Parser;
use muster::cli::commands::Cli;
use muster::cli::handlers;

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        None => {
            // No subcommand → launch TUI
            handlers::load_config_for(cli.dir.as_deref())
                .and_then(|loaded| muster::tui::run(loaded, cli.kind, cli.target))
        }
        Some(_) => handlers::dispatch(cli),
    };

    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
