//! Forwarding of PTY output to a local sink.
//!
//! The PTY reader blocks, so it runs on the blocking pool and hands chunks
//! to an async writer through a channel. The runtime is never blocked on
//! PTY reads.

use std::io::Read;
use std::time::Duration;

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, trace, warn};

/// Default buffer size for reading PTY output.
const READ_BUFFER_SIZE: usize = 4096;

/// Chunks buffered between the reader and the writer.
const CHANNEL_CAPACITY: usize = 64;

/// A running reader/writer pair copying PTY output into a sink.
pub struct OutputPump {
    writer: JoinHandle<u64>,
}

impl OutputPump {
    /// Start copying `reader` into `sink` on the given runtime.
    ///
    /// The pump stops when the reader reaches EOF (or `EIO`, which is how a
    /// Unix PTY reports that the shell went away).
    pub fn start<R, W>(runtime: &tokio::runtime::Handle, reader: R, sink: W) -> Self
    where
        R: Read + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<Vec<u8>>(CHANNEL_CAPACITY);
        runtime.spawn_blocking(move || read_loop(reader, tx));
        let writer = runtime.spawn(write_loop(rx, sink));
        Self { writer }
    }

    /// Wait for the pump to drain, up to `timeout`.
    ///
    /// Returns the number of bytes forwarded, or `None` on timeout.
    pub async fn finish(self, timeout: Duration) -> Option<u64> {
        match tokio::time::timeout(timeout, self.writer).await {
            Ok(Ok(bytes)) => Some(bytes),
            Ok(Err(e)) => {
                error!("output writer task failed: {}", e);
                None
            }
            Err(_) => {
                warn!("output pump did not drain within {:?}", timeout);
                None
            }
        }
    }
}

fn read_loop<R: Read>(mut reader: R, tx: mpsc::Sender<Vec<u8>>) {
    let mut buf = vec![0u8; READ_BUFFER_SIZE];

    loop {
        match reader.read(&mut buf) {
            Ok(0) => {
                debug!("PTY reader: EOF");
                break;
            }
            Ok(n) => {
                trace!("PTY reader: read {} bytes", n);
                if tx.blocking_send(buf[..n].to_vec()).is_err() {
                    debug!("PTY reader: channel closed");
                    break;
                }
            }
            Err(e) => {
                #[cfg(unix)]
                if e.raw_os_error() == Some(libc::EIO) {
                    debug!("PTY reader: PTY closed (EIO)");
                    break;
                }

                if e.kind() == std::io::ErrorKind::Interrupted {
                    continue;
                }

                if e.kind() != std::io::ErrorKind::BrokenPipe {
                    error!("PTY reader error: {}", e);
                }
                break;
            }
        }
    }
}

async fn write_loop<W: AsyncWrite + Unpin>(mut rx: mpsc::Receiver<Vec<u8>>, mut sink: W) -> u64 {
    let mut forwarded = 0u64;

    while let Some(chunk) = rx.recv().await {
        if let Err(e) = sink.write_all(&chunk).await {
            error!("output write error: {}", e);
            break;
        }
        if let Err(e) = sink.flush().await {
            error!("output flush error: {}", e);
            break;
        }
        forwarded += chunk.len() as u64;
    }

    forwarded
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[tokio::test]
    async fn test_pump_forwards_everything() {
        let data = b"Hello, World!\nTest line 2\n";
        let (sink, mut out) = tokio::io::duplex(1024);

        let pump = OutputPump::start(
            &tokio::runtime::Handle::current(),
            Cursor::new(data.to_vec()),
            sink,
        );

        let forwarded = pump.finish(Duration::from_secs(2)).await;
        assert_eq!(forwarded, Some(data.len() as u64));

        let mut received = vec![0u8; data.len()];
        tokio::io::AsyncReadExt::read_exact(&mut out, &mut received)
            .await
            .unwrap();
        assert_eq!(received, data);
    }

    #[tokio::test]
    async fn test_pump_empty_reader() {
        let pump = OutputPump::start(
            &tokio::runtime::Handle::current(),
            Cursor::new(Vec::new()),
            tokio::io::sink(),
        );

        assert_eq!(pump.finish(Duration::from_secs(2)).await, Some(0));
    }

    #[tokio::test]
    async fn test_reader_stops_when_channel_closed() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);

        let handle = tokio::task::spawn_blocking(move || {
            read_loop(Cursor::new(vec![1u8; 10_000]), tx);
        });
        let result = tokio::time::timeout(Duration::from_secs(2), handle).await;
        assert!(result.is_ok());
    }
}
