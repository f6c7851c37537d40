// Command-line definitions shared by the ft817-* tools

use crate::core::{Mode, RepeaterDir};
use clap::Parser;
use tracing_subscriber::{fmt::format::FmtSpan, prelude::*, EnvFilter};

/// Environment variable naming the default serial device
pub const PORT_ENV: &str = "FT817_PORT";

pub const DEFAULT_PORT: &str = "/dev/ttyUSB0";

/// Install the fmt subscriber. `RUST_LOG` wins; otherwise `info`, or
/// `debug` when `verbose` is set.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter_layer =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let format_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::NONE);

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(format_layer)
        .init();
}

/// Tune an FT-817 over CAT: frequency, then optional mode, CTCSS tone and
/// repeater shift.
#[derive(Parser, Debug)]
#[command(name = "ft817-tune", version, about)]
pub struct TuneArgs {
    /// Serial device (e.g. /dev/ttyUSB0)
    pub port: String,

    /// Frequency in MHz (e.g. 145.500)
    #[arg(value_parser = parse_mhz)]
    pub freq_hz: u64,

    /// Operating mode: LSB USB CW CWR AM WFM FM DIG PKT
    #[arg(value_parser = parse_mode)]
    pub mode: Option<Mode>,

    /// Enable CTCSS with this tone in Hz (e.g. 88.5)
    #[arg(long = "ctcss", value_parser = parse_tone)]
    pub ctcss_decihz: Option<u32>,

    /// Repeater offset in kHz (e.g. 600)
    #[arg(long = "offset", value_parser = parse_khz)]
    pub offset_hz: Option<u64>,

    /// Repeater shift: plus, minus or simplex
    #[arg(long, value_parser = parse_dir)]
    pub dir: Option<RepeaterDir>,

    /// Trace every byte sent and received
    #[arg(short, long)]
    pub verbose: bool,
}

/// Dump the FT-817 EEPROM to <output_base>.bin, .hex and .img
#[derive(Parser, Debug)]
#[command(name = "ft817-eeprom", version, about)]
pub struct EepromArgs {
    /// Serial device
    #[arg(env = PORT_ENV, default_value = DEFAULT_PORT)]
    pub port: String,

    /// Output file name without extension
    #[arg(default_value = "ft817_eeprom")]
    pub output_base: String,

    /// Trace every byte sent and received
    #[arg(short, long)]
    pub verbose: bool,
}

/// Print the FT-817 status reply, frequency and mode
#[derive(Parser, Debug)]
#[command(name = "ft817-status", version, about)]
pub struct StatusArgs {
    /// Serial device
    #[arg(env = PORT_ENV, default_value = DEFAULT_PORT)]
    pub port: String,

    /// Trace every byte sent and received
    #[arg(short, long)]
    pub verbose: bool,
}

/// Parse a decimal MHz string into Hz, rounded to the nearest Hz
pub fn parse_mhz(text: &str) -> Result<u64, String> {
    match text.parse::<f64>() {
        Ok(mhz) if mhz.is_finite() && mhz > 0.0 => Ok((mhz * 1_000_000.0).round() as u64),
        _ => Err(format!("bad frequency '{}'", text)),
    }
}

/// Parse a tone in Hz ("88.5") into 0.1 Hz units
pub fn parse_tone(text: &str) -> Result<u32, String> {
    match text.parse::<f64>() {
        Ok(hz) if hz.is_finite() && hz > 0.0 && hz < 1000.0 => Ok((hz * 10.0).round() as u32),
        _ => Err(format!("bad CTCSS tone '{}'", text)),
    }
}

/// Parse a repeater offset in kHz into Hz
pub fn parse_khz(text: &str) -> Result<u64, String> {
    match text.parse::<f64>() {
        Ok(khz) if khz.is_finite() && khz >= 0.0 => Ok((khz * 1000.0).round() as u64),
        _ => Err(format!("bad offset '{}'", text)),
    }
}

pub fn parse_mode(text: &str) -> Result<Mode, String> {
    Mode::from_name(text).ok_or_else(|| format!("unknown mode '{}'", text))
}

pub fn parse_dir(text: &str) -> Result<RepeaterDir, String> {
    RepeaterDir::from_name(text).ok_or_else(|| format!("unknown repeater shift '{}'", text))
}
