//! heatmap-overlay - render a point-sample heatmap with axes to SVG or PNG.
//!
//! Fetches samples once from the configured endpoint (or renders the fallback
//! set with `--offline`) and writes a single frame.

use anyhow::{bail, Context, Result};
use clap::Parser;
use heatmap_overlay::config::Config;
use heatmap_overlay::geometry::Surface;
use heatmap_overlay::overlay::HeatmapStyle;
use heatmap_overlay::session::{Outcome, Session};
use heatmap_overlay::source::{HttpSource, Mode, SampleSource, StaticSource};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Point-sample heatmap overlay renderer
#[derive(Parser, Debug)]
#[command(name = "heatmap-overlay")]
#[command(author = "PAIML Team")]
#[command(version)]
#[command(about = "Render point-sample heatmaps with hand-drawn axes", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Sample endpoint URL
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Data-source mode passed to the endpoint
    #[arg(short, long)]
    mode: Option<String>,

    /// Surface width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Surface height in pixels
    #[arg(long)]
    height: Option<u32>,

    /// Padding reserved for axes, in pixels
    #[arg(long)]
    padding: Option<u32>,

    /// Output file (.svg or .png)
    #[arg(short, long, default_value = "heatmap.svg")]
    output: PathBuf,

    /// Heat layer style
    #[arg(long, value_enum)]
    style: Option<HeatmapStyle>,

    /// Skip the fetch and render the fallback set
    #[arg(long)]
    offline: bool,
}

impl Cli {
    /// CLI > ENV > file > defaults.
    fn resolve_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => Config::default_path()
                .map(Config::load_or_default)
                .unwrap_or_default(),
        };
        config.apply_env();

        if let Some(endpoint) = &self.endpoint {
            config.source.endpoint.clone_from(endpoint);
        }
        if let Some(mode) = &self.mode {
            config.source.mode = Mode::new(mode.as_str());
        }
        config.surface = Surface {
            width: self.width.unwrap_or(config.surface.width),
            height: self.height.unwrap_or(config.surface.height),
            padding: self.padding.unwrap_or(config.surface.padding),
        };
        if let Some(style) = self.style {
            config.heatmap.style = style;
        }

        config.validate().context("invalid configuration")?;
        Ok(config)
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}

async fn render_once<S: SampleSource>(source: S, config: &Config, output: &Path) -> Result<()> {
    let session = Session::new(source, config.render_config(), config.heatmap.settings())
        .with_mode(config.source.mode.clone())
        .with_failure_policy(config.source.on_fetch_failure);

    match session.load().await? {
        Outcome::Rendered(frame) => {
            frame.write_to_file(output)?;
            let report = frame.report();
            info!(
                output = %output.display(),
                points = report.points.len(),
                used_fallback = report.used_fallback,
                "heatmap written"
            );
            Ok(())
        }
        Outcome::Skipped { error } => {
            bail!("no frame rendered: {error}")
        }
        Outcome::Superseded { generation } => {
            bail!("render cycle {generation} was superseded")
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = cli.resolve_config()?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("starting async runtime")?;

    runtime.block_on(async {
        if cli.offline {
            render_once(StaticSource::default(), &config, &cli.output).await
        } else {
            let source = HttpSource::with_timeout(&config.source.endpoint, config.source.timeout())?;
            render_once(source, &config, &cli.output).await
        }
    })
}
