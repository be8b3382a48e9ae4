use anyhow::Result;
use clap::Parser;
use wavefield_native::cli::Args;

fn main() -> Result<()> {
    let args = Args::parse();
    let level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::builder()
        .filter_level(level)
        .parse_default_env()
        .init();

    let summary = wavefield_native::run(&args)?;
    log::info!(
        "[run] done: {} frames, {:.0}ms, {} waves emitted, peak energy {:.2}",
        summary.frames,
        summary.simulated_ms,
        summary.waves_emitted,
        summary.peak_energy
    );
    if let Some(secs) = summary.audio_seconds {
        log::info!("[run] {secs:.2}s of audio rendered");
    }
    Ok(())
}
