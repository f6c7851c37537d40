//! Tune an FT-817 over CAT
//! Sets frequency and, optionally, mode, CTCSS tone and repeater shift

use clap::Parser;
use ft817_rs::cli::{self, TuneArgs};
use ft817_rs::core::{is_standard_tone, ToneSquelch};
use ft817_rs::memmap::hexdump;
use ft817_rs::{CatConfig, Ft817Radio, SerialConfig};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = TuneArgs::parse();

    cli::init_tracing(args.verbose);

    let config = CatConfig::default().with_verbose(args.verbose);
    let (radio, mut port, _status) =
        Ft817Radio::connect(&args.port, SerialConfig::default(), config).await?;
    tracing::info!(
        "Port: {} at {} baud",
        port.port_name(),
        port.config().baud_rate
    );

    radio.tune(&mut port, args.freq_hz).await?;
    tracing::info!("Tuned to {:.5} MHz", args.freq_hz as f64 / 1_000_000.0);

    if let Some(mode) = args.mode {
        radio.set_mode(&mut port, mode).await?;
        tracing::info!("Mode {}", mode);
    }

    if let Some(tone) = args.ctcss_decihz {
        if !is_standard_tone(tone) {
            tracing::warn!("{}.{} Hz is not a standard CTCSS tone", tone / 10, tone % 10);
        }
        radio.set_tone_squelch(&mut port, ToneSquelch::CtcssEnable).await?;
        radio.set_ctcss_tone(&mut port, tone).await?;
        tracing::info!("CTCSS {}.{} Hz", tone / 10, tone % 10);
    }

    if let Some(offset_hz) = args.offset_hz {
        radio.set_repeater_offset(&mut port, offset_hz).await?;
        tracing::info!("Repeater offset {} kHz", offset_hz / 1000);
    }

    if let Some(dir) = args.dir {
        radio.set_repeater_dir(&mut port, dir).await?;
        tracing::info!("Repeater shift {:?}", dir);
    }

    let drained = radio.flush(&mut port).await;
    if !drained.is_empty() {
        tracing::info!("Radio sent {} bytes:\n{}", drained.len(), hexdump(&drained, 0));
    }

    port.close()?;
    Ok(())
}
