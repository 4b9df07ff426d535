use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "imagemix", version)]
#[command(about = "Render a batch of creatives from a template")]
struct Cli {
    /// Input template JSON.
    #[arg(long = "template")]
    template_path: PathBuf,

    /// Directory image layer files are read from.
    #[arg(long = "assets")]
    assets_dir: PathBuf,

    /// Font file (TTF/OTF) used by text layers.
    #[arg(long)]
    font: Option<PathBuf>,

    /// Directory the finished creatives are written to.
    #[arg(long = "out")]
    out_dir: PathBuf,

    /// Render entries on a worker pool.
    #[arg(long)]
    parallel: bool,

    /// Worker count (requires --parallel; default: all cores).
    #[arg(long)]
    threads: Option<usize>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let template = read_template_json(&cli.template_path)?;

    let font = match &cli.font {
        Some(path) => Some(imagemix::FontResource::from_path(path)?),
        None => None,
    };

    let assets = Arc::new(imagemix::DirAssetSource::new(&cli.assets_dir));
    let compositor = imagemix::Compositor::new(
        &template,
        assets,
        font,
        imagemix::RenderOptions::default(),
    )?;

    let sink = imagemix::DirOutputSink::new(&cli.out_dir);
    let threading = imagemix::BatchThreading {
        parallel: cli.parallel,
        threads: cli.threads,
    };
    let report = compositor.render_batch(&sink, &threading, &imagemix::CancelFlag::new())?;

    for entry in &report.entries {
        match &entry.outcome {
            imagemix::EntryOutcome::Rendered => {
                println!("rendered {}", entry.output_filename);
            }
            imagemix::EntryOutcome::Failed(e) => {
                eprintln!("failed   {}: {e}", entry.output_filename);
            }
            imagemix::EntryOutcome::Skipped => {
                eprintln!("skipped  {}", entry.output_filename);
            }
        }
    }

    if report.failed() > 0 {
        anyhow::bail!(
            "{} of {} entries failed",
            report.failed(),
            report.entries.len()
        );
    }
    Ok(())
}

fn read_template_json(path: &Path) -> anyhow::Result<imagemix::Template> {
    let f = File::open(path).with_context(|| format!("open template '{}'", path.display()))?;
    let r = BufReader::new(f);
    let template: imagemix::Template =
        serde_json::from_reader(r).with_context(|| "parse template JSON")?;
    Ok(template)
}
