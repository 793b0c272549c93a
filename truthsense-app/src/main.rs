use anyhow::{bail, Context as _, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use truthsense_actors::{spawn_actor, ContextActor, ContextLimits};
use truthsense_analysis::{Analyzer, AttachedImage};
use truthsense_common::observability::{init_logging, LogConfig};
use truthsense_config::{RetentionConfig, TruthSenseConfig, TruthSenseConfigLoader};
use truthsense_llm::GeminiClient;
use truthsense_sources::{NewsClient, SearchClient, SourceAggregator};
use truthsense_video::VideoClient;

use engine::Engine;

mod engine;

const CONTEXT_MAILBOX: usize = 64;

/// Analyze a claim, document, or YouTube video for misinformation.
#[derive(Debug, Parser)]
#[command(name = "truthsense", version)]
struct Cli {
    /// Claim text or a YouTube URL to analyze.
    #[arg(required_unless_present = "file", conflicts_with = "file")]
    query: Option<String>,

    /// Read the claim text from a file instead.
    #[arg(long)]
    file: Option<PathBuf>,

    /// Image files to attach to a claim analysis (repeatable).
    #[arg(long = "image")]
    images: Vec<PathBuf>,

    /// Path to the configuration file.
    #[arg(long, default_value = "truthsense.yaml")]
    config: PathBuf,

    /// Also print a conversation title generated from the input.
    #[arg(long)]
    title: bool,

    /// Duplicate logs to stderr.
    #[arg(long)]
    verbose: bool,
}

fn image_mime(path: &PathBuf) -> Result<&'static str> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => Ok("image/jpeg"),
        "png" => Ok("image/png"),
        "webp" => Ok("image/webp"),
        "gif" => Ok("image/gif"),
        other => bail!("unsupported image type: .{other} ({})", path.display()),
    }
}

fn load_images(paths: &[PathBuf]) -> Result<Vec<AttachedImage>> {
    paths
        .iter()
        .map(|path| {
            let bytes = std::fs::read(path)
                .with_context(|| format!("failed to read image: {}", path.display()))?;
            let name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("image")
                .to_string();
            Ok(AttachedImage {
                mime_type: image_mime(path)?.to_string(),
                name,
                bytes,
            })
        })
        .collect()
}

fn context_limits(retention: &RetentionConfig) -> ContextLimits {
    ContextLimits {
        max_queries: retention.queries,
        max_videos: retention.videos,
        max_documents: retention.documents,
        max_images: retention.images,
        max_sources: retention.sources,
        max_verdicts: retention.verdicts,
    }
}

fn build_engine(cfg: &TruthSenseConfig) -> Result<Engine> {
    let llm = GeminiClient::new(
        &cfg.model.endpoint,
        cfg.model.api_key.clone(),
        cfg.model.name.clone(),
    )?;
    let news = NewsClient::new(&cfg.news.endpoint, cfg.news.api_key.clone())?;
    let search = SearchClient::new(&cfg.search.endpoint, cfg.search.api_key.clone())?;
    let video = VideoClient::new(&cfg.video.endpoint, cfg.video.api_key.clone())?;

    let analyzer = Analyzer::new(Arc::new(llm), SourceAggregator::new(news, search));
    let context = spawn_actor(
        ContextActor::new(context_limits(&cfg.retention)),
        CONTEXT_MAILBOX,
    );

    Ok(Engine::new(analyzer, video, Some(context.addr)))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let cfg: TruthSenseConfig = TruthSenseConfigLoader::new()
        .with_file(&cli.config)
        .load()
        .with_context(|| format!("failed to load config: {}", cli.config.display()))?;

    init_logging(LogConfig {
        emit_stderr: cli.verbose,
        ..Default::default()
    })?;

    let (query, document_name) = match (&cli.query, &cli.file) {
        (Some(q), _) => (q.clone(), None),
        (None, Some(path)) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read claim file: {}", path.display()))?;
            let name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("document")
                .to_string();
            (text.trim().to_string(), Some(name))
        }
        (None, None) => bail!("provide a claim, a YouTube URL, or --file"),
    };
    if query.is_empty() {
        bail!("the claim text is empty");
    }

    let images = load_images(&cli.images)?;

    let mut engine = build_engine(&cfg)?;

    if cli.title {
        println!("Title: {}", engine.title(&query).await);
    }

    let result = engine.run(&query, &images, document_name.as_deref()).await;
    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(())
}
