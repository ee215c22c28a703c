//! Connections to an out-of-process host.

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
#[cfg(unix)]
use std::os::unix::net::UnixStream;
#[cfg(unix)]
use std::path::PathBuf;
use std::time::Duration;

use crate::error::IpcError;

/// Opens byte-stream connections to the host.
pub trait Connector {
    type Stream: Read + Write;

    /// Open a connection with `io_timeout` as its read and write deadline.
    fn connect(&self, io_timeout: Option<Duration>) -> Result<Self::Stream, IpcError>;
}

/// Connects over a Unix domain socket.
#[cfg(unix)]
#[derive(Debug, Clone)]
pub struct UnixConnector {
    path: PathBuf,
}

#[cfg(unix)]
impl UnixConnector {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[cfg(unix)]
impl Connector for UnixConnector {
    type Stream = UnixStream;

    fn connect(&self, io_timeout: Option<Duration>) -> Result<UnixStream, IpcError> {
        let stream = UnixStream::connect(&self.path)?;
        stream.set_read_timeout(io_timeout)?;
        stream.set_write_timeout(io_timeout)?;
        Ok(stream)
    }
}

/// Connects over TCP.
#[derive(Debug, Clone)]
pub struct TcpConnector {
    addr: SocketAddr,
}

impl TcpConnector {
    pub fn new(addr: SocketAddr) -> Self {
        Self { addr }
    }
}

impl Connector for TcpConnector {
    type Stream = TcpStream;

    fn connect(&self, io_timeout: Option<Duration>) -> Result<TcpStream, IpcError> {
        let stream = match io_timeout {
            Some(timeout) => TcpStream::connect_timeout(&self.addr, timeout)?,
            None => TcpStream::connect(self.addr)?,
        };
        stream.set_nodelay(true)?;
        stream.set_read_timeout(io_timeout)?;
        stream.set_write_timeout(io_timeout)?;
        Ok(stream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    #[test]
    fn test_tcp_connect_applies_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let connector = TcpConnector::new(listener.local_addr().unwrap());
        let stream = connector
            .connect(Some(Duration::from_millis(250)))
            .unwrap();
        assert_eq!(stream.read_timeout().unwrap(), Some(Duration::from_millis(250)));
        assert_eq!(stream.write_timeout().unwrap(), Some(Duration::from_millis(250)));
    }

    #[cfg(unix)]
    #[test]
    fn test_unix_connect_missing_socket() {
        let connector = UnixConnector::new("/nonexistent/quarry-hostd.sock");
        assert!(matches!(connector.connect(None), Err(IpcError::Io(_))));
    }
}
