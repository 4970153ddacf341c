use std::io;

use async_trait::async_trait;
use tokio::{
    fs::{File, OpenOptions},
    io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader},
    net::{
        tcp::{OwnedReadHalf, OwnedWriteHalf},
        TcpStream,
    },
};
use tracing::{debug, trace};

pub const LINE_TERMINATOR: &str = "\n";

/// Half-duplex, line-oriented link to the arbiter.
///
/// Implementations don't apply deadlines themselves; callers wrap `read_line` in a timeout.
#[async_trait]
pub trait LineChannel: Send {
    /// Write `line` followed by the line terminator.
    async fn write_line(&mut self, line: &str) -> io::Result<()>;

    /// Read one line, without its terminator. End of stream is an `UnexpectedEof` error.
    async fn read_line(&mut self) -> io::Result<String>;

    async fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub struct LineStream<R, W> {
    name: String,
    reader: BufReader<R>,
    writer: W,
}
impl<R, W> LineStream<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(name: impl ToString, reader: R, writer: W) -> Self {
        LineStream {
            name: name.to_string(),
            reader: BufReader::new(reader),
            writer,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl LineStream<OwnedReadHalf, OwnedWriteHalf> {
    pub async fn connect(address: &str) -> io::Result<Self> {
        let stream = TcpStream::connect(address).await?;
        stream.set_nodelay(true)?;
        let (read, write) = stream.into_split();
        Ok(LineStream::new(address, read, write))
    }
}

impl LineStream<File, File> {
    pub async fn open_device(path: &str) -> io::Result<Self> {
        let reader = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .await?;
        let writer = reader.try_clone().await?;
        Ok(LineStream::new(path, reader, writer))
    }
}

/// Open the channel named by a configured port: `host:port` connects over TCP, anything else is
/// opened as a device path.
pub async fn open(port: &str) -> io::Result<Box<dyn LineChannel>> {
    debug!("Opening channel {}", port);
    if is_network_address(port) {
        Ok(Box::new(LineStream::connect(port).await?))
    } else {
        Ok(Box::new(LineStream::open_device(port).await?))
    }
}

fn is_network_address(port: &str) -> bool {
    match port.rsplit_once(':') {
        Some((host, number)) => {
            !host.is_empty() && !host.contains(['/', '\\']) && number.parse::<u16>().is_ok()
        }
        None => false,
    }
}

#[async_trait]
impl<R, W> LineChannel for LineStream<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn write_line(&mut self, line: &str) -> io::Result<()> {
        trace!("{} <- {:?}", self.name, line);
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(LINE_TERMINATOR.as_bytes()).await?;
        self.writer.flush().await
    }

    async fn read_line(&mut self) -> io::Result<String> {
        let mut buffer = String::new();
        if self.reader.read_line(&mut buffer).await? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("{} closed", self.name),
            ));
        }
        trace!("{} -> {:?}", self.name, buffer);
        Ok(buffer.trim_end_matches(['\r', '\n']).to_owned())
    }

    async fn close(&mut self) -> io::Result<()> {
        debug!("Closing channel {}", self.name);
        self.writer.shutdown().await
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{duplex, split};

    use super::*;

    #[tokio::test]
    async fn lines_cross_a_duplex_pipe() {
        let (local, remote) = duplex(64);
        let (local_read, local_write) = split(local);
        let (remote_read, remote_write) = split(remote);
        let mut client = LineStream::new("client", local_read, local_write);
        let mut arbiter = LineStream::new("arbiter", remote_read, remote_write);

        client.write_line("reset=1").await.unwrap();
        assert_eq!(arbiter.read_line().await.unwrap(), "reset=1");

        arbiter.write_line("ok;game_reset;\r").await.unwrap();
        assert_eq!(client.read_line().await.unwrap(), "ok;game_reset;");
    }

    #[tokio::test]
    async fn closed_peer_is_an_error() {
        let (local, remote) = duplex(64);
        let (local_read, local_write) = split(local);
        let mut client = LineStream::new("client", local_read, local_write);
        drop(remote);

        let error = client.read_line().await.unwrap_err();
        assert_eq!(error.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn network_addresses() {
        assert!(is_network_address("127.0.0.1:7000"));
        assert!(is_network_address("arbiter.local:7000"));
        assert!(!is_network_address("/dev/ttyUSB0"));
        assert!(!is_network_address("COM3"));
        assert!(!is_network_address("C:\\ports\\com1:12"));
    }
}
