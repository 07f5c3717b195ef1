// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 runway contributors

//! Blocking `Read`/`Write` adapters over bounded tokio channels
//!
//! tar and flate2 are synchronous; these adapters let them run on a blocking
//! thread while the async side moves chunks to and from the network.

use std::io::{self, Read, Write};
use tokio::sync::mpsc::{Receiver, Sender};

/// One chunk of archive bytes, or the error that ended the stream
pub type Chunk = io::Result<Vec<u8>>;

/// Writes each buffer as a chunk; must be used off the async runtime
pub struct ChannelWriter {
    tx: Sender<Chunk>,
}

impl ChannelWriter {
    pub fn new(tx: Sender<Chunk>) -> Self {
        Self { tx }
    }
}

impl Write for ChannelWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        self.tx
            .blocking_send(Ok(buf.to_vec()))
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "archive consumer went away"))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Reads chunks until the sender side is dropped; must be used off the
/// async runtime
pub struct ChannelReader {
    rx: Receiver<Chunk>,
    current: Vec<u8>,
    pos: usize,
}

impl ChannelReader {
    pub fn new(rx: Receiver<Chunk>) -> Self {
        Self {
            rx,
            current: Vec::new(),
            pos: 0,
        }
    }
}

impl Read for ChannelReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        while self.pos >= self.current.len() {
            match self.rx.blocking_recv() {
                Some(Ok(chunk)) => {
                    self.current = chunk;
                    self.pos = 0;
                }
                Some(Err(e)) => return Err(e),
                None => return Ok(0),
            }
        }

        let n = buf.len().min(self.current.len() - self.pos);
        buf[..n].copy_from_slice(&self.current[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}
