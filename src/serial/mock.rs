// Mock serial port for testing without hardware
// Replays a script of deliveries and records every frame written

use super::comm::{Readiness, Result, SerialError, Transport};
use std::collections::VecDeque;
use std::io;
use std::time::Duration;

/// One scripted step on the input side of the mock link
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockEvent {
    /// Bytes that are readable right away
    Data(Vec<u8>),
    /// Bytes that become readable after a delay
    Delayed(Duration, Vec<u8>),
    /// Nothing arrives during one wait
    Silence,
    /// The wait is interrupted before anything happens
    Interrupted,
    /// The wait fails with a hard error
    Fail(io::ErrorKind),
    /// Readiness is reported, then the read itself is interrupted
    ReadInterrupted,
    /// The link reports readable, then end of stream
    Closed,
}

type Responder = Box<dyn FnMut(&[u8]) -> Vec<MockEvent> + Send>;

/// Mock serial port for testing
pub struct MockSerialPort {
    /// Scripted input (simulates radio responses)
    events: VecDeque<MockEvent>,

    /// Frames that were written, one entry per write_all call
    written: Vec<Vec<u8>>,

    /// Generates input for each written frame
    responder: Option<Responder>,

    /// Fail writes with this error kind
    write_error: Option<io::ErrorKind>,

    /// Number of wait_readable calls seen
    waits: usize,
}

impl MockSerialPort {
    /// Create a new mock serial port
    pub fn new() -> Self {
        Self {
            events: VecDeque::new(),
            written: Vec::new(),
            responder: None,
            write_error: None,
            waits: 0,
        }
    }

    /// Answer each written frame with the events the closure returns
    pub fn with_responder<F>(mut self, responder: F) -> Self
    where
        F: FnMut(&[u8]) -> Vec<MockEvent> + Send + 'static,
    {
        self.responder = Some(Box::new(responder));
        self
    }

    /// Push data to be read (simulates radio sending data)
    pub fn push_read_data(&mut self, data: &[u8]) {
        self.events.push_back(MockEvent::Data(data.to_vec()));
    }

    /// Push an arbitrary scripted event
    pub fn push_event(&mut self, event: MockEvent) {
        self.events.push_back(event);
    }

    /// Make every following write fail
    pub fn set_write_error(&mut self, kind: io::ErrorKind) {
        self.write_error = Some(kind);
    }

    /// Frames written so far
    pub fn written_frames(&self) -> &[Vec<u8>] {
        &self.written
    }

    /// All written bytes, concatenated
    pub fn get_written_data(&self) -> Vec<u8> {
        self.written.concat()
    }

    /// Check if a specific command was written
    pub fn was_written(&self, expected: &[u8]) -> bool {
        self.written.iter().any(|frame| frame == expected)
    }

    /// Bytes still queued for reading, including delayed ones
    pub fn bytes_available(&self) -> usize {
        self.events
            .iter()
            .map(|event| match event {
                MockEvent::Data(data) | MockEvent::Delayed(_, data) => data.len(),
                _ => 0,
            })
            .sum()
    }

    /// Number of readiness waits performed
    pub fn wait_count(&self) -> usize {
        self.waits
    }
}

impl Default for MockSerialPort {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for MockSerialPort {
    async fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        if let Some(kind) = self.write_error {
            return Err(SerialError::Io(io::Error::new(kind, "Mock write error")));
        }

        self.written.push(buf.to_vec());
        if let Some(responder) = self.responder.as_mut() {
            self.events.extend(responder(buf));
        }
        Ok(())
    }

    async fn wait_readable(&mut self, timeout: Duration) -> Result<Readiness> {
        self.waits += 1;

        match self.events.pop_front() {
            None => {
                tokio::time::sleep(timeout).await;
                Ok(Readiness::TimedOut)
            }
            Some(MockEvent::Silence) => {
                tokio::time::sleep(timeout).await;
                Ok(Readiness::TimedOut)
            }
            Some(MockEvent::Delayed(delay, data)) => {
                if delay <= timeout {
                    tokio::time::sleep(delay).await;
                    self.events.push_front(MockEvent::Data(data));
                    Ok(Readiness::Ready)
                } else {
                    tokio::time::sleep(timeout).await;
                    self.events
                        .push_front(MockEvent::Delayed(delay - timeout, data));
                    Ok(Readiness::TimedOut)
                }
            }
            Some(MockEvent::Interrupted) => Err(SerialError::Io(io::Error::new(
                io::ErrorKind::Interrupted,
                "Mock interrupted wait",
            ))),
            Some(MockEvent::Fail(kind)) => {
                Err(SerialError::Io(io::Error::new(kind, "Mock wait error")))
            }
            Some(event) => {
                // Data, Closed and ReadInterrupted are consumed by the read
                self.events.push_front(event);
                Ok(Readiness::Ready)
            }
        }
    }

    async fn read_available(&mut self, buf: &mut [u8]) -> Result<usize> {
        match self.events.pop_front() {
            Some(MockEvent::Data(mut data)) => {
                let n = data.len().min(buf.len());
                buf[..n].copy_from_slice(&data[..n]);
                if n < data.len() {
                    self.events.push_front(MockEvent::Data(data.split_off(n)));
                }
                Ok(n)
            }
            Some(MockEvent::Closed) => Ok(0),
            Some(MockEvent::ReadInterrupted) => Err(SerialError::Io(io::Error::new(
                io::ErrorKind::Interrupted,
                "Mock interrupted read",
            ))),
            other => {
                if let Some(event) = other {
                    self.events.push_front(event);
                }
                Err(SerialError::Io(io::Error::new(
                    io::ErrorKind::WouldBlock,
                    "Mock read without ready data",
                )))
            }
        }
    }
}

/// Helper to create a mock port with pre-loaded response data
pub fn mock_port_with_response(response: &[u8]) -> MockSerialPort {
    let mut port = MockSerialPort::new();
    port.push_read_data(response);
    port
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_serial_basic() {
        let mut port = mock_port_with_response(b"Hello");

        assert_eq!(
            port.wait_readable(Duration::from_millis(10)).await.unwrap(),
            Readiness::Ready
        );
        let mut buf = [0u8; 5];
        assert_eq!(port.read_available(&mut buf).await.unwrap(), 5);
        assert_eq!(&buf, b"Hello");

        port.write_all(b"World").await.unwrap();
        assert_eq!(port.get_written_data(), b"World");
    }

    #[tokio::test(start_paused = true)]
    async fn test_mock_serial_timeout() {
        let mut port = MockSerialPort::new();

        let readiness = port.wait_readable(Duration::from_millis(50)).await.unwrap();
        assert_eq!(readiness, Readiness::TimedOut);
        assert_eq!(port.wait_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_serial_partial_read() {
        let mut port = mock_port_with_response(b"Hi there");

        let mut buf = [0u8; 2];
        assert_eq!(port.read_available(&mut buf).await.unwrap(), 2);
        assert_eq!(&buf, b"Hi");
        assert_eq!(port.bytes_available(), 6);
    }

    #[tokio::test]
    async fn test_mock_was_written() {
        let mut port = MockSerialPort::new();

        port.write_all(&[0x00, 0x00, 0x00, 0x00, 0xA7]).await.unwrap();
        port.write_all(&[0x14, 0x40, 0x12, 0x34, 0x01]).await.unwrap();

        assert!(port.was_written(&[0x00, 0x00, 0x00, 0x00, 0xA7]));
        assert!(!port.was_written(&[0x00, 0x00, 0x00, 0x00, 0x03]));
        assert_eq!(port.written_frames().len(), 2);
    }

    #[tokio::test]
    async fn test_mock_responder() {
        let mut port = MockSerialPort::new()
            .with_responder(|frame| vec![MockEvent::Data(vec![frame[4]])]);

        port.write_all(&[0, 0, 0, 0, 0x03]).await.unwrap();
        assert_eq!(port.bytes_available(), 1);

        let mut buf = [0u8; 1];
        port.read_available(&mut buf).await.unwrap();
        assert_eq!(buf[0], 0x03);
    }

    #[tokio::test]
    async fn test_mock_write_error() {
        let mut port = MockSerialPort::new();
        port.set_write_error(io::ErrorKind::BrokenPipe);

        assert!(port.write_all(&[0x01]).await.is_err());
        assert!(port.written_frames().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_mock_delayed_data_spans_waits() {
        let mut port = MockSerialPort::new();
        port.push_event(MockEvent::Delayed(Duration::from_millis(150), vec![0x55]));

        let short = Duration::from_millis(100);
        assert_eq!(port.wait_readable(short).await.unwrap(), Readiness::TimedOut);
        assert_eq!(port.wait_readable(short).await.unwrap(), Readiness::Ready);
    }
}
