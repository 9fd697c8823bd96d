use anyhow::{Context, Result};
use nutrigen::{Pipeline, PipelineConfig, UnitSystem};
use std::env;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

struct CliArgs {
    recipe_path: PathBuf,
    data_dir: Option<PathBuf>,
    panels_dir: Option<PathBuf>,
    units: UnitSystem,
    api_key: Option<String>,
}

fn usage() -> &'static str {
    "Usage: nutrigen <recipe-text-file> [--data-dir DIR] [--panels-dir DIR] [--units us|metric] [--api-key KEY]\n\
     \n\
     Produces the per-serving nutrition artifact for an extracted recipe\n\
     document as JSON on stdout. The FDC credential falls back to the\n\
     FDC_API_KEY environment variable."
}

fn parse_args() -> Result<CliArgs> {
    let mut args = env::args().skip(1);
    let mut recipe_path: Option<PathBuf> = None;
    let mut data_dir: Option<PathBuf> = None;
    let mut panels_dir: Option<PathBuf> = None;
    let mut units = UnitSystem::Us;
    let mut api_key: Option<String> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--data-dir" => {
                data_dir = Some(PathBuf::from(
                    args.next().context("--data-dir requires a value")?,
                ));
            }
            "--panels-dir" => {
                panels_dir = Some(PathBuf::from(
                    args.next().context("--panels-dir requires a value")?,
                ));
            }
            "--units" => {
                let value = args.next().context("--units requires a value")?;
                units = value
                    .parse()
                    .map_err(|e: String| anyhow::anyhow!("{}\n{}", e, usage()))?;
            }
            "--api-key" => {
                api_key = Some(args.next().context("--api-key requires a value")?);
            }
            "-h" | "--help" => {
                println!("{}", usage());
                std::process::exit(0);
            }
            other if recipe_path.is_none() => recipe_path = Some(PathBuf::from(other)),
            other => anyhow::bail!("unexpected argument '{}'\n{}", other, usage()),
        }
    }

    Ok(CliArgs {
        recipe_path: recipe_path.with_context(|| format!("missing recipe file\n{}", usage()))?,
        data_dir,
        panels_dir,
        units,
        api_key,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args()?;

    let api_key = args
        .api_key
        .or_else(|| env::var("FDC_API_KEY").ok())
        .filter(|k| !k.trim().is_empty());

    let config = PipelineConfig::load(
        args.data_dir.as_deref(),
        args.panels_dir.clone(),
        api_key,
        args.units,
    )?;
    let pipeline = Pipeline::new(config)?;

    let document = args
        .recipe_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| args.recipe_path.display().to_string());
    let text = std::fs::read_to_string(&args.recipe_path)
        .with_context(|| format!("failed to read {}", args.recipe_path.display()))?;

    info!(document = %document, "processing recipe document");
    let artifact = pipeline.process_text(&text, &document).await?;

    println!("{}", serde_json::to_string_pretty(&artifact)?);
    Ok(())
}
