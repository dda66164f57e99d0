use crate::error::{LineError, LineResult};
use std::io::{ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::time::Duration;

/// A station's single outbound connection to the PLC. Adapted from the
/// reference crate's `TcpComm`: same `connect_timeout` + `set_nodelay`
/// dance, but owned directly rather than behind a `Mutex<Option<_>>`,
/// since a station is single-threaded and never shares this handle.
pub struct StationLink {
    stream: TcpStream,
    /// Bytes read from the socket but not yet claimed by a complete frame.
    /// A frame can legitimately arrive split across multiple non-blocking
    /// `read`s; without this, a split read would lose the partial bytes
    /// and desync every frame for the rest of the connection's life.
    pending: Vec<u8>,
}

impl StationLink {
    pub fn connect(addr: SocketAddr, timeout: Duration) -> LineResult<Self> {
        let stream =
            TcpStream::connect_timeout(&addr, timeout).map_err(|source| LineError::ConnectFailed {
                addr: addr.to_string(),
                source,
            })?;
        stream.set_nodelay(true)?;
        stream.set_nonblocking(true)?;
        Ok(Self {
            stream,
            pending: Vec::new(),
        })
    }

    pub fn send(&mut self, buf: &[u8]) -> LineResult<()> {
        self.stream.write_all(buf)?;
        Ok(())
    }

    /// Pulls a frame of exactly `len` bytes once that many bytes have
    /// actually arrived. Bytes read past a complete frame are kept in
    /// `pending` for the next call rather than discarded, so a read that
    /// lands mid-frame never desyncs later frames on this connection.
    /// Returns `Ok(None)` for "nothing pending yet" (a non-event per §4.2).
    pub fn try_recv(&mut self, len: usize) -> LineResult<Option<Vec<u8>>> {
        let mut chunk = [0u8; 256];
        loop {
            if self.pending.len() >= len {
                return Ok(Some(self.pending.drain(..len).collect()));
            }
            match self.stream.read(&mut chunk) {
                Ok(0) => return Ok(None),
                Ok(n) => self.pending.extend_from_slice(&chunk[..n]),
                Err(e) if e.kind() == ErrorKind::WouldBlock => return Ok(None),
                Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Ok(None),
                Err(e) => return Err(e.into()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::thread;

    /// A frame split across two separate writes (and so, very likely, two
    /// separate non-blocking reads on the receiving end) must not lose
    /// bytes or misalign the frame that follows it.
    #[test]
    fn split_frame_does_not_desync_the_next_frame() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let writer = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let first = [1u8, 0, 0, 1, 0, 0, 0, 2, 0];
            let second = [0u8, 1, 0, 2, 0, 0, 0, 3, 0];
            stream.write_all(&first[..4]).unwrap();
            stream.flush().unwrap();
            thread::sleep(Duration::from_millis(20));
            stream.write_all(&first[4..]).unwrap();
            stream.write_all(&second).unwrap();
        });

        let mut link = StationLink::connect(addr, Duration::from_secs(5)).unwrap();

        let mut frames = Vec::new();
        for _ in 0..200 {
            if let Some(buf) = link.try_recv(9).unwrap() {
                frames.push(buf);
                if frames.len() == 2 {
                    break;
                }
            }
            thread::sleep(Duration::from_millis(2));
        }
        writer.join().unwrap();

        assert_eq!(frames.len(), 2, "both frames should eventually arrive intact");
        assert_eq!(frames[0], vec![1, 0, 0, 1, 0, 0, 0, 2, 0]);
        assert_eq!(frames[1], vec![0, 1, 0, 2, 0, 0, 0, 3, 0]);
    }
}
