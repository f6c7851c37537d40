// Response accumulation for CAT replies
// Replies are unframed raw bytes whose length depends on the command, so a
// read is "gather at least N bytes, give up after a quiet period"

use super::comm::{Readiness, Result, Transport};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Progress callback type
/// Arguments: (bytes_transferred, total_bytes, status_message)
pub type ProgressCallback = Arc<dyn Fn(usize, usize, &str) + Send + Sync>;

/// How the timeout of [`ResponseReader::accumulate`] is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadDeadline {
    /// Every wait gets the full timeout, so a peer trickling bytes can
    /// stretch the total read time past the timeout
    #[default]
    PerWait,

    /// One deadline for the whole accumulation
    Absolute,
}

/// Why an accumulation stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadStatus {
    /// At least `min_len` bytes were gathered
    Complete,
    /// No data arrived before the deadline
    TimedOut,
    /// The link reported end of stream
    Closed,
}

/// Result of one accumulation: how many bytes landed in the buffer and why
/// reading stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadOutcome {
    pub len: usize,
    pub status: ReadStatus,
}

/// Gathers a response from a [`Transport`] into a caller buffer
#[derive(Debug, Clone, Default)]
pub struct ResponseReader {
    deadline: ReadDeadline,
    verbose: bool,
}

impl ResponseReader {
    pub fn new(deadline: ReadDeadline) -> Self {
        Self {
            deadline,
            verbose: false,
        }
    }

    /// Trace every received chunk
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn deadline(&self) -> ReadDeadline {
        self.deadline
    }

    /// Read into `buf` until at least `min_len` bytes have arrived.
    ///
    /// `buf.len()` is the maximum accepted; a single delivery may overshoot
    /// `min_len` up to that limit. A timeout or a closed link ends the
    /// accumulation early and is not an error: the caller gets the count
    /// gathered so far and decides whether a shortfall matters. Interrupted
    /// waits and reads are retried. Only a hard transport error fails.
    pub async fn accumulate<T: Transport>(
        &self,
        port: &mut T,
        buf: &mut [u8],
        min_len: usize,
        timeout: Duration,
    ) -> Result<ReadOutcome> {
        let min_len = min_len.min(buf.len());
        let started = Instant::now();
        let mut offset = 0;

        while offset < min_len {
            let wait = match self.deadline {
                ReadDeadline::PerWait => timeout,
                ReadDeadline::Absolute => timeout.saturating_sub(started.elapsed()),
            };

            match port.wait_readable(wait).await {
                Ok(Readiness::Ready) => {}
                Ok(Readiness::TimedOut) => {
                    return Ok(ReadOutcome {
                        len: offset,
                        status: ReadStatus::TimedOut,
                    })
                }
                Err(e) if e.is_transient() => continue,
                Err(e) => return Err(e),
            }

            let n = match port.read_available(&mut buf[offset..]).await {
                Ok(n) => n,
                Err(e) if e.is_transient() => continue,
                Err(e) => return Err(e),
            };

            if n == 0 {
                return Ok(ReadOutcome {
                    len: offset,
                    status: ReadStatus::Closed,
                });
            }

            if self.verbose {
                tracing::debug!("Read {}: {:02X?}", n, &buf[offset..offset + n]);
            }

            offset += n;
        }

        Ok(ReadOutcome {
            len: offset,
            status: ReadStatus::Complete,
        })
    }
}
