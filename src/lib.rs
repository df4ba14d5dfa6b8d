pub mod api;
pub mod cache;
pub mod cli;
pub mod config;
pub mod domain;
pub mod errors;
pub mod model;
pub mod services;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use std::path::Path;

use crate::cache::CorpusKind;
use crate::config::settings::AppConfig;
use crate::model::PredictionRequest;
use crate::services::ingestion::IngestionService;
use crate::services::prediction::PredictionService;
use crate::services::server::ServerService;

pub fn interpret() -> Cli {
    Cli::parse()
}

pub fn handle_ingest(config: AppConfig, input: &Path, append: bool, supplement: bool) -> Result<()> {
    let kind = if supplement {
        CorpusKind::Supplement
    } else {
        CorpusKind::Archive
    };
    let service = IngestionService::new(&config)?;
    service.run(input, append, kind)?;
    Ok(())
}

pub fn handle_predict(config: AppConfig, request: &PredictionRequest) -> Result<()> {
    let service = PredictionService::new(config)?;
    service.run_predict(request)
}

pub fn handle_batch(config: AppConfig, input: &Path) -> Result<()> {
    let service = PredictionService::new(config)?;
    service.run_batch(input)
}

pub fn handle_form(config: AppConfig, player: &str) -> Result<()> {
    let service = PredictionService::new(config)?;
    service.run_form(player)
}

pub fn handle_table(config: AppConfig) -> Result<()> {
    let service = PredictionService::new(config)?;
    service.run_table();
    Ok(())
}

pub fn handle_serve(config: AppConfig, port: u16) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let service = ServerService::new(port, config);
        service.run().await
    })
}
