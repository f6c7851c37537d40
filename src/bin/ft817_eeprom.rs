//! FT-817 EEPROM dump utility
//! Reads the EEPROM over CAT and saves it for analysis

use clap::Parser;
use ft817_rs::cli::{self, EepromArgs};
use ft817_rs::drivers::Status;
use ft817_rs::{save_img, CatConfig, EepromDumper, Ft817Radio, Metadata, SerialConfig};
use std::fs::File;
use std::io::Write;
use std::sync::Arc;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = EepromArgs::parse();

    cli::init_tracing(args.verbose);

    tracing::info!("FT-817 EEPROM Dump Utility");

    let config = CatConfig::default().with_verbose(args.verbose);
    let (radio, mut port, _status) =
        Ft817Radio::connect(&args.port, SerialConfig::default(), config).await?;
    tracing::info!(
        "Port: {} at {} baud",
        port.port_name(),
        port.config().baud_rate
    );

    // Drop anything left over from the probe
    port.clear_input()?;

    tracing::info!("Reading EEPROM. This takes a few minutes...");

    let progress = |current: usize, total: usize, message: &str| {
        eprint!("\r{}", Status::new(current, total, message));
    };
    let image = EepromDumper::new()
        .with_progress(Arc::new(progress))
        .dump(&radio, &mut port)
        .await?;
    eprintln!();

    port.close()?;

    if let Some(addr) = image.stopped_at() {
        tracing::warn!("Dump stopped at 0x{:04x}; saving the partial image", addr);
    }

    // Full-size image; addresses past a stop stay zero
    let bin_path = format!("{}.bin", args.output_base);
    File::create(&bin_path)?.write_all(image.map().as_bytes())?;
    tracing::info!("Saved raw binary to: {}", bin_path);

    // Hex dump of the part that was read
    let hex_path = format!("{}.hex", args.output_base);
    File::create(&hex_path)?.write_all(image.map().printable(0, image.valid_len()).as_bytes())?;
    tracing::info!("Saved hex dump to: {}", hex_path);

    let img_path = format!("{}.img", args.output_base);
    let mut metadata = Metadata::ft817();
    metadata.insert("valid_len", image.valid_len());
    metadata.insert("complete", image.is_complete());
    save_img(&img_path, image.map(), &metadata)?;
    tracing::info!("Saved image to: {}", img_path);

    println!("\n=== Dump Complete ===");
    println!(
        "Raw binary: {} ({} bytes, {} read)",
        bin_path,
        image.map().len(),
        image.valid_len()
    );
    println!("Hex dump:   {}", hex_path);
    println!("Image:      {}", img_path);

    Ok(())
}
