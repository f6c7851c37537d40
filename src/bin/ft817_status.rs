//! Query an FT-817: status probe, then frequency and mode

use clap::Parser;
use ft817_rs::cli::{self, StatusArgs};
use ft817_rs::{CatConfig, Ft817Radio, SerialConfig};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = StatusArgs::parse();

    cli::init_tracing(args.verbose);

    let config = CatConfig::default().with_verbose(args.verbose);
    let (radio, mut port, status) =
        Ft817Radio::connect(&args.port, SerialConfig::default(), config).await?;

    let reading = radio.read_frequency(&mut port).await?;

    println!("Port:      {} ({} baud)", port.port_name(), port.config().baud_rate);
    println!("Status:    {:02X?}", status.ident());
    if status.had_stale_data() {
        let stale = status.bytes().len() - status.ident().len();
        println!("Stale:     {:02X?}", &status.bytes()[..stale]);
    }
    println!(
        "Frequency: {:.5} MHz",
        reading.frequency_hz as f64 / 1_000_000.0
    );
    match (reading.mode(), reading.mode_byte) {
        (Some(mode), _) => println!("Mode:      {}", mode),
        (None, Some(byte)) => println!("Mode:      unknown (0x{:02X})", byte),
        (None, None) => println!("Mode:      not received"),
    }
    if !reading.is_complete() {
        tracing::warn!("{}: incomplete frequency reply", port.port_name());
    }

    port.close()?;
    Ok(())
}
