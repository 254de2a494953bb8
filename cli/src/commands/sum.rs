use anyhow::{bail, Context, Result};
use log::{info, warn};
use prorata::{GeoJsonSink, Layer, LogFeedback, Prorata, RunState};

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::SumArgs) -> Result<()> {
    if args.output.exists() && !args.force {
        bail!("Output file already exists (use --force to overwrite): {}", args.output.display());
    }

    info!("[sum] loading target layer from {}", args.target.display());
    let target = Layer::read(&args.target).context("Failed to load target layer")?;

    info!("[sum] loading source layer from {}", args.source.display());
    let source = Layer::read(&args.source).context("Failed to load source layer")?;

    let fields = args.field_names();
    let prorata = Prorata::new(&target, &source, &fields)?;

    let mut sink = GeoJsonSink::create(&args.output, target.name(), prorata.output_fields(), target.epsg())?;

    let feedback = LogFeedback::new();
    let cancel = feedback.cancel_flag();
    ctrlc::set_handler(move || {
        warn!("interrupted, stopping after the current feature...");
        cancel.store(true, std::sync::atomic::Ordering::SeqCst);
    })
    .context("Failed to set Ctrl-C handler")?;

    let summary = match prorata.run(&mut sink, Some(&feedback)) {
        Ok(summary) => summary,
        Err(e) => {
            if let Err(rm) = sink.discard() {
                warn!("[sum] {rm:#}");
            }
            return Err(e.context("Prorata run failed, no output written"));
        }
    };
    let path = sink.finish()?;

    if summary.state == RunState::Canceled {
        warn!("[sum] canceled: output holds the first {} features only", summary.written);
    }
    if summary.skipped > 0 {
        info!("[sum] {} target features without geometry were skipped", summary.skipped);
    }

    println!("[sum] wrote {} of {} features to {}", summary.written, summary.total, path.display());
    Ok(())
}
