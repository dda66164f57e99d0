use crate::error::{LineError, LineResult};
use std::io::{ErrorKind, Read, Write};
use std::net::{TcpListener, TcpStream};

/// The PLC's side of one station's connection. Bound at startup, the
/// station connects out; this mirrors the original fabric's per-port
/// `tcpListen` plus its "handle learning" quirk, where the listen-side
/// write handle wasn't valid until the first frame had been received from
/// that peer. A real `accept()`ed `TcpStream` is bidirectional immediately,
/// so here that quirk is modelled explicitly: `send` is a no-op until at
/// least one frame has come in from the peer.
pub struct PlcStationLink {
    port: u16,
    listener: TcpListener,
    peer: Option<TcpStream>,
    learned_peer: bool,
    /// Bytes read from the peer but not yet claimed by a complete frame;
    /// see [`crate::comm::tcp::StationLink::try_recv`] for why this can't
    /// be a fresh one-shot read every tick.
    pending: Vec<u8>,
}

impl PlcStationLink {
    pub fn bind(port: u16) -> LineResult<Self> {
        let listener = TcpListener::bind(("0.0.0.0", port))
            .map_err(|source| LineError::ListenFailed { port, source })?;
        listener.set_nonblocking(true)?;
        Ok(Self {
            port,
            listener,
            peer: None,
            learned_peer: false,
            pending: Vec::new(),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Accepts a pending connection if one is waiting and none is held yet.
    /// Safe to call every scan tick.
    pub fn poll_accept(&mut self) -> LineResult<()> {
        if self.peer.is_some() {
            return Ok(());
        }
        match self.listener.accept() {
            Ok((stream, _addr)) => {
                stream.set_nodelay(true)?;
                stream.set_nonblocking(true)?;
                self.peer = Some(stream);
                self.learned_peer = false;
                self.pending.clear();
            }
            Err(e) if e.kind() == ErrorKind::WouldBlock => {}
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }

    /// Pulls a frame of exactly `len` bytes once that many bytes have
    /// actually arrived, buffering any bytes read past a complete frame
    /// for the next call instead of discarding them on a short read.
    /// Marks the peer handle as learned on the first complete frame.
    /// A closed peer is dropped so `poll_accept` can accept a new one.
    pub fn try_recv(&mut self, len: usize) -> LineResult<Option<Vec<u8>>> {
        let Some(stream) = self.peer.as_mut() else {
            return Ok(None);
        };
        let mut chunk = [0u8; 256];
        let mut disconnected = false;
        let mut result = Ok(None);
        loop {
            if self.pending.len() >= len {
                self.learned_peer = true;
                result = Ok(Some(self.pending.drain(..len).collect()));
                break;
            }
            match stream.read(&mut chunk) {
                Ok(0) => {
                    disconnected = true;
                    break;
                }
                Ok(n) => self.pending.extend_from_slice(&chunk[..n]),
                Err(e) if e.kind() == ErrorKind::WouldBlock => break,
                Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                    disconnected = true;
                    break;
                }
                Err(e) => {
                    result = Err(e.into());
                    break;
                }
            }
        }
        if disconnected {
            self.peer = None;
            self.learned_peer = false;
            self.pending.clear();
        }
        result
    }

    /// Writes `buf` to the station, but only once its peer handle has been
    /// learned from an inbound frame; before that this is a silent no-op,
    /// matching the original handle-learning gate.
    pub fn send(&mut self, buf: &[u8]) -> LineResult<()> {
        if !self.learned_peer {
            return Ok(());
        }
        if let Some(stream) = self.peer.as_mut() {
            stream.write_all(buf)?;
        }
        Ok(())
    }
}
