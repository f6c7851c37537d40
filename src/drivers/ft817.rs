// Yaesu FT-817 CAT driver
// Each command is one transaction: write a 5-byte frame, then optionally
// gather a reply whose size is fixed per opcode

use super::traits::{RadioError, RadioResult};
use crate::bitwise::{pack_bcd, unpack_bcd};
use crate::core::{Mode, RepeaterDir, ToneSquelch};
use crate::serial::{
    CatFrame, Opcode, ReadDeadline, ResponseReader, SerialConfig, SerialPort, Transport,
};
use std::time::Duration;

/// Bytes in a status probe reply
pub const PROBE_REPLY_LEN: usize = 9;

/// Receive buffer for the probe; anything past the reply is stale input
const PROBE_BUF_LEN: usize = 128;

const PROBE_TIMEOUT: Duration = Duration::from_millis(100);

/// Frequency/mode reply: 4 BCD bytes + mode byte
const FREQ_REPLY_LEN: usize = 5;

const FREQ_TIMEOUT: Duration = Duration::from_millis(1000);

const FLUSH_BUF_LEN: usize = 128;

const FLUSH_TIMEOUT: Duration = Duration::from_millis(500);

/// Bytes returned by one EEPROM read command
pub const EEPROM_CELL_LEN: usize = 2;

const EEPROM_BUF_LEN: usize = 16;

const EEPROM_TIMEOUT: Duration = Duration::from_millis(100);

/// BCD digits of the tune and readback frequency fields (10 Hz resolution)
const FREQ_DIGITS: usize = 8;

/// BCD digits of the CTCSS tone and repeater offset fields
const SHORT_FIELD_DIGITS: usize = 4;

/// Repeater offsets are sent in 10 kHz steps
const OFFSET_STEP_HZ: u64 = 10_000;

/// Protocol-level settings, fixed when the driver is built
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatConfig {
    /// Trace every frame sent and every chunk received
    pub verbose: bool,

    /// Timeout policy of response reads
    pub read_deadline: ReadDeadline,
}

impl CatConfig {
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_read_deadline(mut self, read_deadline: ReadDeadline) -> Self {
        self.read_deadline = read_deadline;
        self
    }
}

/// Reply to the status probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    bytes: Vec<u8>,
}

impl StatusReport {
    /// Everything received, stale leading bytes included
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The probe reply proper: the last nine bytes received
    pub fn ident(&self) -> &[u8] {
        &self.bytes[self.bytes.len().saturating_sub(PROBE_REPLY_LEN)..]
    }

    /// True when more than a probe reply was received
    pub fn had_stale_data(&self) -> bool {
        self.bytes.len() > PROBE_REPLY_LEN
    }
}

/// Frequency and mode as read back from the radio
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrequencyReading {
    /// Frequency in Hz (10 Hz resolution)
    pub frequency_hz: u64,

    /// Raw mode byte, if the reply was long enough to carry one
    pub mode_byte: Option<u8>,

    /// Bytes actually received
    pub received: usize,
}

impl FrequencyReading {
    pub fn mode(&self) -> Option<Mode> {
        self.mode_byte.and_then(Mode::from_byte)
    }

    pub fn is_complete(&self) -> bool {
        self.received == FREQ_REPLY_LEN
    }
}

/// FT-817 CAT command set
#[derive(Debug, Clone)]
pub struct Ft817Radio {
    port_name: String,
    config: CatConfig,
}

impl Ft817Radio {
    /// Create a driver; `port_name` only labels log messages
    pub fn new(port_name: impl Into<String>) -> Self {
        Self::with_config(port_name, CatConfig::default())
    }

    pub fn with_config(port_name: impl Into<String>, config: CatConfig) -> Self {
        Self {
            port_name: port_name.into(),
            config,
        }
    }

    /// Open the serial port and confirm a radio answers the status probe
    pub async fn connect(
        port_name: &str,
        serial_config: SerialConfig,
        config: CatConfig,
    ) -> RadioResult<(Self, SerialPort, StatusReport)> {
        let mut port = SerialPort::open(port_name, serial_config)?;
        let radio = Self::with_config(port_name, config);
        let status = radio.probe(&mut port).await?;
        Ok((radio, port, status))
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    pub fn config(&self) -> &CatConfig {
        &self.config
    }

    /// Toggle byte tracing; has no effect on what goes over the wire
    pub fn set_verbose(&mut self, verbose: bool) {
        self.config.verbose = verbose;
    }

    fn reader(&self) -> ResponseReader {
        ResponseReader::new(self.config.read_deadline).with_verbose(self.config.verbose)
    }

    async fn send<T: Transport>(&self, port: &mut T, frame: CatFrame) -> RadioResult<()> {
        let bytes = frame.to_bytes();
        if self.config.verbose {
            tracing::debug!("Sending: {:02X?}", bytes);
        }

        port.write_all(&bytes).await.map_err(|e| {
            tracing::error!("{}: write of {} failed: {}", self.port_name, frame.opcode(), e);
            RadioError::from(e)
        })
    }

    /// Send a status probe and check that a full reply comes back.
    ///
    /// Fewer than nine bytes means no radio is listening and is an error.
    /// More than nine is accepted with a warning.
    pub async fn probe<T: Transport>(&self, port: &mut T) -> RadioResult<StatusReport> {
        self.send(port, CatFrame::bare(Opcode::StatusProbe)).await?;

        let mut buf = [0u8; PROBE_BUF_LEN];
        let outcome = self
            .reader()
            .accumulate(port, &mut buf, PROBE_REPLY_LEN, PROBE_TIMEOUT)
            .await?;

        if outcome.len < PROBE_REPLY_LEN {
            return Err(RadioError::ShortResponse {
                port: self.port_name.clone(),
                expected: PROBE_REPLY_LEN,
                got: outcome.len,
            });
        }

        if outcome.len > PROBE_REPLY_LEN {
            tracing::warn!(
                "{}: ignoring stale data: read {} bytes",
                self.port_name,
                outcome.len
            );
        }

        let report = StatusReport {
            bytes: buf[..outcome.len].to_vec(),
        };
        tracing::info!("{}: {:02X?}", self.port_name, report.ident());
        Ok(report)
    }

    /// Tune the main VFO. Sent with 10 Hz resolution; digits above
    /// 100 MHz wrap.
    pub async fn tune<T: Transport>(&self, port: &mut T, freq_hz: u64) -> RadioResult<()> {
        let field = pack_bcd(freq_hz / 10, FREQ_DIGITS)?;
        tracing::debug!("Tuning to {} Hz", freq_hz);
        self.send(port, CatFrame::with_lead(&field, Opcode::Tune)).await
    }

    pub async fn set_mode<T: Transport>(&self, port: &mut T, mode: Mode) -> RadioResult<()> {
        self.send(port, CatFrame::with_lead(&[mode.to_byte()], Opcode::SetMode))
            .await
    }

    /// Read back frequency and mode.
    ///
    /// A reply of the wrong length is logged and decoded as far as it goes:
    /// missing frequency bytes read as zero, and a missing mode byte leaves
    /// `mode_byte` empty.
    pub async fn read_frequency<T: Transport>(
        &self,
        port: &mut T,
    ) -> RadioResult<FrequencyReading> {
        self.send(port, CatFrame::bare(Opcode::ReadFreqMode)).await?;

        let mut buf = [0u8; FREQ_REPLY_LEN];
        let len = match self
            .reader()
            .accumulate(port, &mut buf, FREQ_REPLY_LEN, FREQ_TIMEOUT)
            .await
        {
            Ok(outcome) => outcome.len,
            Err(e) => {
                tracing::warn!("{}: frequency read failed: {}", self.port_name, e);
                buf = [0u8; FREQ_REPLY_LEN];
                0
            }
        };

        if len != FREQ_REPLY_LEN {
            tracing::warn!(
                "{}: frequency read returned {} bytes, expected {}",
                self.port_name,
                len,
                FREQ_REPLY_LEN
            );
        }

        let frequency_hz = unpack_bcd(&buf, FREQ_DIGITS)? * 10;
        let mode_byte = (len >= FREQ_REPLY_LEN).then(|| buf[FREQ_REPLY_LEN - 1]);

        Ok(FrequencyReading {
            frequency_hz,
            mode_byte,
            received: len,
        })
    }

    /// Select CTCSS/DCS squelch
    pub async fn set_tone_squelch<T: Transport>(
        &self,
        port: &mut T,
        squelch: ToneSquelch,
    ) -> RadioResult<()> {
        self.send(
            port,
            CatFrame::with_lead(&[squelch.to_byte()], Opcode::CtcssDcsMode),
        )
        .await
    }

    /// Set the CTCSS tone, given in 0.1 Hz units (141.3 Hz = 1413)
    pub async fn set_ctcss_tone<T: Transport>(
        &self,
        port: &mut T,
        tone_decihz: u32,
    ) -> RadioResult<()> {
        let field = pack_bcd(u64::from(tone_decihz), SHORT_FIELD_DIGITS)?;
        self.send(port, CatFrame::with_lead(&field, Opcode::CtcssTone))
            .await
    }

    pub async fn set_repeater_dir<T: Transport>(
        &self,
        port: &mut T,
        dir: RepeaterDir,
    ) -> RadioResult<()> {
        self.send(port, CatFrame::with_lead(&[dir.to_byte()], Opcode::RepeaterDir))
            .await
    }

    /// Set the repeater offset. Only the 10 MHz..10 kHz decades are sent,
    /// so anything below 10 kHz is dropped.
    pub async fn set_repeater_offset<T: Transport>(
        &self,
        port: &mut T,
        offset_hz: u64,
    ) -> RadioResult<()> {
        if offset_hz % OFFSET_STEP_HZ != 0 {
            tracing::warn!(
                "{}: repeater offset {} Hz truncated to 10 kHz steps",
                self.port_name,
                offset_hz
            );
        }

        let field = pack_bcd(offset_hz / OFFSET_STEP_HZ, SHORT_FIELD_DIGITS)?;
        self.send(port, CatFrame::with_lead(&field, Opcode::RepeaterOffset))
            .await
    }

    /// Drain pending input. Never fails; returns whatever was discarded.
    pub async fn flush<T: Transport>(&self, port: &mut T) -> Vec<u8> {
        let mut buf = [0u8; FLUSH_BUF_LEN];
        match self
            .reader()
            .accumulate(port, &mut buf, FLUSH_BUF_LEN, FLUSH_TIMEOUT)
            .await
        {
            Ok(outcome) => {
                if outcome.len > 0 {
                    tracing::debug!("{}: flushed {} bytes", self.port_name, outcome.len);
                }
                buf[..outcome.len].to_vec()
            }
            Err(e) => {
                tracing::warn!("{}: flush failed: {}", self.port_name, e);
                Vec::new()
            }
        }
    }

    /// Read the two EEPROM bytes at `addr`. The returned vector holds
    /// whatever arrived, which may be empty or short.
    ///
    /// Only a failed write is an error. A failed read is logged and comes
    /// back as an empty cell.
    pub async fn read_eeprom_cell<T: Transport>(
        &self,
        port: &mut T,
        addr: u16,
    ) -> RadioResult<Vec<u8>> {
        let [hi, lo] = addr.to_be_bytes();
        self.send(port, CatFrame::with_lead(&[hi, lo], Opcode::EepromRead))
            .await?;

        let mut buf = [0u8; EEPROM_BUF_LEN];
        match self
            .reader()
            .accumulate(port, &mut buf, EEPROM_CELL_LEN, EEPROM_TIMEOUT)
            .await
        {
            Ok(outcome) => Ok(buf[..outcome.len].to_vec()),
            Err(e) => {
                tracing::warn!("{}: read at 0x{:04x} failed: {}", self.port_name, addr, e);
                Ok(Vec::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serial::mock::{mock_port_with_response, MockEvent, MockSerialPort};
    use std::io;

    const PROBE: [u8; 5] = [0x00, 0x00, 0x00, 0x00, 0xA7];

    fn radio() -> Ft817Radio {
        Ft817Radio::new("/dev/ttyTEST")
    }

    #[tokio::test(start_paused = true)]
    async fn test_probe_accepts_nine_bytes() {
        let reply = [0xA1, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09];
        let mut port = mock_port_with_response(&reply);

        let report = radio().probe(&mut port).await.unwrap();

        assert_eq!(port.written_frames(), &[PROBE.to_vec()]);
        assert_eq!(report.bytes(), &reply);
        assert_eq!(report.ident(), &reply);
        assert!(!report.had_stale_data());
    }

    #[tokio::test(start_paused = true)]
    async fn test_probe_short_reply_is_fatal() {
        let mut port = mock_port_with_response(&[0xA1; 8]);

        let err = radio().probe(&mut port).await.unwrap_err();

        assert!(matches!(
            err,
            RadioError::ShortResponse {
                expected: 9,
                got: 8,
                ..
            }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_probe_surplus_is_kept() {
        let stale = [0xEE, 0xEE, 0xEE];
        let reply = [0xA1, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09];
        let mut port = MockSerialPort::new();
        port.push_read_data(&[&stale[..], &reply[..]].concat());

        let report = radio().probe(&mut port).await.unwrap();

        assert_eq!(report.bytes().len(), 12);
        assert!(report.had_stale_data());
        assert_eq!(report.ident(), &reply);
    }

    #[tokio::test(start_paused = true)]
    async fn test_probe_reply_in_chunks() {
        let mut port = MockSerialPort::new();
        port.push_event(MockEvent::Data(vec![1, 2, 3]));
        port.push_event(MockEvent::Delayed(Duration::from_millis(20), vec![4, 5, 6, 7]));
        port.push_event(MockEvent::Data(vec![8, 9]));

        let report = radio().probe(&mut port).await.unwrap();
        assert_eq!(report.bytes(), &[1, 2, 3, 4, 5, 6, 7, 8, 9]);
    }

    #[tokio::test]
    async fn test_write_failure_is_fatal() {
        let mut port = MockSerialPort::new();
        port.set_write_error(io::ErrorKind::BrokenPipe);

        let err = radio().tune(&mut port, 144_012_345).await.unwrap_err();
        assert!(matches!(err, RadioError::Serial(_)));

        let err = radio().probe(&mut port).await.unwrap_err();
        assert!(matches!(err, RadioError::Serial(_)));
    }

    #[tokio::test]
    async fn test_tune_frame() {
        let mut port = MockSerialPort::new();

        radio().tune(&mut port, 144_012_345).await.unwrap();
        radio().tune(&mut port, 7_074_000).await.unwrap();
        radio().tune(&mut port, 432_100_000).await.unwrap();

        assert_eq!(
            port.written_frames(),
            &[
                vec![0x14, 0x40, 0x12, 0x34, 0x01],
                vec![0x00, 0x70, 0x74, 0x00, 0x01],
                vec![0x43, 0x21, 0x00, 0x00, 0x01],
            ]
        );
        // Writes only; nothing is read
        assert_eq!(port.wait_count(), 0);
    }

    #[tokio::test]
    async fn test_set_mode_frame() {
        let mut port = MockSerialPort::new();

        radio().set_mode(&mut port, Mode::Fm).await.unwrap();
        radio().set_mode(&mut port, Mode::Usb).await.unwrap();

        assert_eq!(
            port.written_frames(),
            &[
                vec![0x08, 0x00, 0x00, 0x00, 0x07],
                vec![0x01, 0x00, 0x00, 0x00, 0x07],
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_read_frequency() {
        let mut port = mock_port_with_response(&[0x14, 0x40, 0x12, 0x34, 0x08]);

        let reading = radio().read_frequency(&mut port).await.unwrap();

        assert!(port.was_written(&[0x00, 0x00, 0x00, 0x00, 0x03]));
        assert_eq!(reading.frequency_hz, 144_012_340);
        assert_eq!(reading.mode(), Some(Mode::Fm));
        assert!(reading.is_complete());
    }

    #[tokio::test(start_paused = true)]
    async fn test_read_frequency_short_reply_is_best_effort() {
        let mut port = mock_port_with_response(&[0x14, 0x40, 0x12]);

        let reading = radio().read_frequency(&mut port).await.unwrap();

        assert_eq!(reading.received, 3);
        assert!(!reading.is_complete());
        assert_eq!(reading.frequency_hz, 144_012_000);
        assert_eq!(reading.mode_byte, None);
        assert_eq!(reading.mode(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_read_frequency_unknown_mode() {
        // 0x88 is narrow FM, outside the settable modes
        let mut port = mock_port_with_response(&[0x01, 0x45, 0x20, 0x00, 0x88]);

        let reading = radio().read_frequency(&mut port).await.unwrap();

        assert_eq!(reading.frequency_hz, 14_520_000);
        assert_eq!(reading.mode_byte, Some(0x88));
        assert_eq!(reading.mode(), None);
    }

    #[tokio::test]
    async fn test_ctcss_frames() {
        let mut port = MockSerialPort::new();
        let radio = radio();

        radio
            .set_tone_squelch(&mut port, ToneSquelch::CtcssEnable)
            .await
            .unwrap();
        radio.set_ctcss_tone(&mut port, 1413).await.unwrap();
        radio
            .set_tone_squelch(&mut port, ToneSquelch::Disable)
            .await
            .unwrap();

        assert_eq!(
            port.written_frames(),
            &[
                vec![0x2A, 0x00, 0x00, 0x00, 0x0A],
                vec![0x14, 0x13, 0x00, 0x00, 0x0B],
                vec![0x8A, 0x00, 0x00, 0x00, 0x0A],
            ]
        );
    }

    #[tokio::test]
    async fn test_repeater_frames() {
        let mut port = MockSerialPort::new();
        let radio = radio();

        radio.set_repeater_offset(&mut port, 600_000).await.unwrap();
        radio.set_repeater_offset(&mut port, 5_000_000).await.unwrap();
        // 1.234567 MHz keeps only the 10 kHz decades
        radio.set_repeater_offset(&mut port, 1_234_567).await.unwrap();
        radio
            .set_repeater_dir(&mut port, RepeaterDir::Plus)
            .await
            .unwrap();
        radio
            .set_repeater_dir(&mut port, RepeaterDir::Simplex)
            .await
            .unwrap();

        assert_eq!(
            port.written_frames(),
            &[
                vec![0x00, 0x60, 0x00, 0x00, 0xF9],
                vec![0x05, 0x00, 0x00, 0x00, 0xF9],
                vec![0x01, 0x23, 0x00, 0x00, 0xF9],
                vec![0x49, 0x00, 0x00, 0x00, 0x09],
                vec![0x89, 0x00, 0x00, 0x00, 0x09],
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_drains_and_never_fails() {
        let mut port = mock_port_with_response(&[0x01, 0x02, 0x03]);
        let radio = radio();

        assert_eq!(radio.flush(&mut port).await, vec![0x01, 0x02, 0x03]);
        assert!(port.written_frames().is_empty());

        // Nothing pending
        assert!(radio.flush(&mut port).await.is_empty());

        // Hard error is swallowed
        port.push_event(MockEvent::Fail(io::ErrorKind::BrokenPipe));
        assert!(radio.flush(&mut port).await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_read_eeprom_cell() {
        let mut port = mock_port_with_response(&[0xDE, 0xAD]);

        let cell = radio().read_eeprom_cell(&mut port, 0x1924).await.unwrap();

        assert_eq!(cell, vec![0xDE, 0xAD]);
        assert!(port.was_written(&[0x19, 0x24, 0x00, 0x00, 0xBB]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_read_eeprom_cell_no_reply() {
        let mut port = MockSerialPort::new();

        let cell = radio().read_eeprom_cell(&mut port, 0x0000).await.unwrap();
        assert!(cell.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_read_eeprom_cell_read_error_is_empty() {
        let mut port = MockSerialPort::new();
        port.push_event(MockEvent::Fail(io::ErrorKind::BrokenPipe));

        let cell = radio().read_eeprom_cell(&mut port, 0x0100).await.unwrap();

        assert!(cell.is_empty());
        assert!(port.was_written(&[0x01, 0x00, 0x00, 0x00, 0xBB]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_read_frequency_read_error_is_best_effort() {
        let mut port = MockSerialPort::new();
        port.push_event(MockEvent::Data(vec![0x14, 0x40]));
        port.push_event(MockEvent::Fail(io::ErrorKind::BrokenPipe));

        let reading = radio().read_frequency(&mut port).await.unwrap();

        assert_eq!(reading.received, 0);
        assert_eq!(reading.frequency_hz, 0);
        assert_eq!(reading.mode_byte, None);
        assert!(!reading.is_complete());
    }

    #[tokio::test(start_paused = true)]
    async fn test_verbose_does_not_change_traffic() {
        let reply = [0xA1; 9];
        let mut quiet_port = mock_port_with_response(&reply);
        let mut loud_port = mock_port_with_response(&reply);

        let quiet = radio();
        let mut loud = radio();
        loud.set_verbose(true);
        assert!(loud.config().verbose);

        quiet.probe(&mut quiet_port).await.unwrap();
        loud.probe(&mut loud_port).await.unwrap();
        quiet.tune(&mut quiet_port, 50_125_000).await.unwrap();
        loud.tune(&mut loud_port, 50_125_000).await.unwrap();

        assert_eq!(quiet_port.written_frames(), loud_port.written_frames());
    }

    #[test]
    fn test_cat_config() {
        let config = CatConfig::default();
        assert!(!config.verbose);
        assert_eq!(config.read_deadline, ReadDeadline::PerWait);

        let config = CatConfig::default()
            .with_verbose(true)
            .with_read_deadline(ReadDeadline::Absolute);
        let radio = Ft817Radio::with_config("/dev/ttyUSB0", config);
        assert_eq!(radio.port_name(), "/dev/ttyUSB0");
        assert_eq!(radio.config().read_deadline, ReadDeadline::Absolute);
    }
}
