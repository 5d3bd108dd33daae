use crate::constants::MAX_LINE_LENGTH;
use crate::core_ftpcommand::reply::FtpReply;
use crate::core_tls::{BoxedTransport, TlsError, TransportFactory};
use log::trace;
use std::io;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};

/// Result of [`ControlChannel::read_line`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineRead {
    Eof,
    /// A line of this many bytes was appended to the buffer.
    Line(usize),
    TooLong,
}

/// Reply channel and line reader for one control connection.
///
/// The transport can be swapped in place ([`ControlChannel::upgrade`]);
/// once a swap fails the channel is closed and every further read or write
/// reports `NotConnected`.
pub struct ControlChannel {
    inner: Option<BufReader<BoxedTransport>>,
}

impl ControlChannel {
    pub fn new(transport: BoxedTransport) -> Self {
        Self {
            inner: Some(BufReader::new(transport)),
        }
    }

    pub fn is_open(&self) -> bool {
        self.inner.is_some()
    }

    fn stream(&mut self) -> io::Result<&mut BufReader<BoxedTransport>> {
        self.inner
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "control channel closed"))
    }

    /// Reads one line into `buf`.
    ///
    /// Invalid UTF-8 is replaced rather than rejected. A line longer than
    /// [`MAX_LINE_LENGTH`] is consumed up to its terminator and dropped, so
    /// the next read starts on a fresh line.
    pub async fn read_line(&mut self, buf: &mut String) -> io::Result<LineRead> {
        let stream = self.stream()?;
        let mut raw = Vec::new();
        let n = (&mut *stream)
            .take(MAX_LINE_LENGTH as u64)
            .read_until(b'\n', &mut raw)
            .await?;
        if n == 0 {
            return Ok(LineRead::Eof);
        }
        if n == MAX_LINE_LENGTH && !raw.ends_with(b"\n") {
            discard_line(stream).await?;
            return Ok(LineRead::TooLong);
        }
        buf.push_str(&String::from_utf8_lossy(&raw));
        Ok(LineRead::Line(n))
    }

    pub async fn send(&mut self, reply: &FtpReply) -> io::Result<()> {
        let wire = reply.to_wire();
        trace!("--> {}", wire.trim_end());
        let stream = self.stream()?.get_mut();
        stream.write_all(wire.as_bytes()).await?;
        stream.flush().await
    }

    /// Replaces the transport with the encrypted one built by `factory`.
    ///
    /// Bytes the client pipelined after the upgrade command are still in
    /// the plaintext read buffer; they are dropped, never parsed.
    pub async fn upgrade(&mut self, factory: &dyn TransportFactory) -> Result<(), TlsError> {
        let reader = self.inner.take().ok_or(TlsError::ChannelClosed)?;
        let plaintext = reader.into_inner();
        let secured = factory.create_secure(plaintext).await?;
        self.inner = Some(BufReader::new(secured));
        Ok(())
    }

    pub async fn shutdown(&mut self) {
        if let Some(reader) = self.inner.as_mut() {
            let _ = reader.get_mut().shutdown().await;
        }
        self.inner = None;
    }
}

async fn discard_line(stream: &mut BufReader<BoxedTransport>) -> io::Result<()> {
    loop {
        let available = stream.fill_buf().await?;
        if available.is_empty() {
            return Ok(());
        }
        let (done, used) = match available.iter().position(|&b| b == b'\n') {
            Some(end) => (true, end + 1),
            None => (false, available.len()),
        };
        stream.consume(used);
        if done {
            return Ok(());
        }
    }
}
