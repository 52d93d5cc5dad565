use tokio::io::{AsyncRead, AsyncWrite, DuplexStream, ReadHalf, WriteHalf};

/// A full-duplex byte link that can be split into independent halves.
///
/// The reader half is driven by a single background task while the writer
/// half is shared by command senders, so the two must never block each other.
pub trait ByteTransport: Send + 'static {
    /// Incoming byte source.
    type Reader: AsyncRead + Unpin + Send + 'static;
    /// Outgoing byte sink.
    type Writer: AsyncWrite + Unpin + Send + 'static;

    /// Split into reader and writer halves.
    fn into_split(self) -> (Self::Reader, Self::Writer);

    /// Short human-readable description used in logs.
    fn describe(&self) -> String {
        "byte-stream".to_string()
    }
}

impl ByteTransport for DuplexStream {
    type Reader = ReadHalf<DuplexStream>;
    type Writer = WriteHalf<DuplexStream>;

    fn into_split(self) -> (Self::Reader, Self::Writer) {
        tokio::io::split(self)
    }

    fn describe(&self) -> String {
        "in-memory duplex".to_string()
    }
}

#[cfg(unix)]
impl ByteTransport for tokio::net::UnixStream {
    type Reader = tokio::net::unix::OwnedReadHalf;
    type Writer = tokio::net::unix::OwnedWriteHalf;

    fn into_split(self) -> (Self::Reader, Self::Writer) {
        tokio::net::UnixStream::into_split(self)
    }

    fn describe(&self) -> String {
        match self.peer_addr() {
            Ok(addr) => match addr.as_pathname() {
                Some(path) => format!("unix:{}", path.display()),
                None => "unix:<unnamed>".to_string(),
            },
            Err(_) => "unix:<unknown>".to_string(),
        }
    }
}
