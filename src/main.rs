use anyhow::Result;

use tennis_predictor::cli::Command;
use tennis_predictor::config::AppConfig;
use tennis_predictor::model::PredictionRequest;
use tennis_predictor::{
    handle_batch, handle_form, handle_ingest, handle_predict, handle_serve, handle_table, interpret,
};

fn main() {
    setup_logging();
    parse_and_execute().unwrap_or_else(|e| {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    });
}

fn setup_logging() {
    sensible_env_logger::init!();
}

fn parse_and_execute() -> Result<()> {
    let cli = interpret();
    let config = AppConfig::for_session(cli.tour, cli.table_until);
    execute_command(&cli.command, config)
}

fn execute_command(command: &Command, config: AppConfig) -> Result<()> {
    match command {
        Command::Ingest {
            input,
            append,
            supplement,
        } => handle_ingest(config, input, *append, *supplement),
        Command::Predict {
            player_a,
            player_b,
            lambda,
            gamma,
            as_of,
        } => handle_predict(
            config,
            &PredictionRequest {
                player_a: player_a.clone(),
                player_b: player_b.clone(),
                lambda: *lambda,
                gamma: *gamma,
                as_of: *as_of,
            },
        ),
        Command::Batch { input } => handle_batch(config, input),
        Command::Form { player } => handle_form(config, player),
        Command::Table => handle_table(config),
        Command::Serve { port } => handle_serve(config, *port),
    }
}
