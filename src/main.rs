use hangman::cli::{CliInterface, parse_cli};
use hangman::logging::{default_log_path, init_logging};
use hangman::provider::ApiWordProvider;
use hangman::tui::TuiInterface;
use hangman::{GameInterface, game_loop};
use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = parse_cli();

    if let Some(path) = cli.log_file.clone().or_else(default_log_path)
        && let Err(e) = init_logging(&path)
    {
        eprintln!("Failed to open log file '{}': {e}", path.display());
    }
    log::info!("Starting hangman against {}", cli.api_url);

    let provider = match ApiWordProvider::new(cli.api_url.clone(), cli.timeout()) {
        Ok(provider) => provider,
        Err(e) => {
            eprintln!("Failed to set up the word service client: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut interface: Box<dyn GameInterface> = if cli.plain {
        Box::new(CliInterface::new(io::stdin().lock()))
    } else {
        match TuiInterface::new() {
            Ok(tui) => Box::new(tui),
            Err(e) => {
                eprintln!("Failed to start the terminal interface: {e}");
                return ExitCode::FAILURE;
            }
        }
    };

    let result = game_loop(&provider, interface.as_mut(), &cli.game_config());
    // Restore the terminal before printing anything
    drop(interface);

    match result {
        Ok(summary) => {
            println!(
                "Rounds won: {}, rounds lost: {}",
                summary.rounds_won, summary.rounds_lost
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
