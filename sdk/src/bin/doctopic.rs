use anyhow::{Context, Result};
use clap::Parser;
use doctopic_core::config::AppConfig;
use doctopic_core::ingest::IngestionRequest;
use doctopic_sdk::{AnalysisResponse, DocumentAnalyzer, UploadedFile};
use slm::OpenAiJudge;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(
    name = "doctopic",
    about = "Extract a weighted topic hierarchy from PDF documents"
)]
struct Cli {
    /// Documents to analyze together
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Directory holding default.toml and per-mode overrides
    #[arg(long, env = "DOCTOPIC_CONFIG_DIR", default_value = "config")]
    config_dir: PathBuf,

    /// Treat inputs as plain text instead of PDF uploads
    #[arg(long, default_value_t = false)]
    text: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    doctopic_core::init_tracing();
    let cli = Cli::parse();

    let config = AppConfig::load_from(&cli.config_dir)
        .with_context(|| format!("failed to load config from {}", cli.config_dir.display()))?;
    let judge = OpenAiJudge::from_settings(&config.judge)?;
    let analyzer = DocumentAnalyzer::new(&config, Arc::new(judge));

    let response = if cli.text {
        let mut requests = Vec::with_capacity(cli.files.len());
        for path in &cli.files {
            let content = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("failed to read {}", path.display()))?;
            let mut metadata = HashMap::new();
            metadata.insert("source".to_string(), path.display().to_string());
            requests.push(IngestionRequest::text(content, metadata));
        }
        AnalysisResponse::from_result(analyzer.analyze_requests(requests).await)
    } else {
        let mut uploads = Vec::with_capacity(cli.files.len());
        for path in &cli.files {
            let bytes = tokio::fs::read(path)
                .await
                .with_context(|| format!("failed to read {}", path.display()))?;
            let content_type = match path.extension().and_then(|e| e.to_str()) {
                Some(ext) if ext.eq_ignore_ascii_case("pdf") => "application/pdf",
                _ => "application/octet-stream",
            };
            uploads.push(UploadedFile::new(
                path.display().to_string(),
                content_type,
                bytes,
            ));
        }
        analyzer.respond_to_uploads(uploads).await
    };

    println!("{}", serde_json::to_string_pretty(&response)?);
    if response.is_error() {
        std::process::exit(1);
    }
    Ok(())
}
