/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::net::SocketAddr;
use std::rc::Rc;

use crate::connection::{FtpConnectionProvider, FtpStream};

/// Scripted stream, every queued chunk is returned by at most one read call.
pub(crate) struct MockStream {
    reads: VecDeque<Result<Vec<u8>, io::ErrorKind>>,
    written: Rc<RefCell<Vec<u8>>>,
    read_calls: Rc<Cell<usize>>,
    closed: Rc<Cell<bool>>,
    close_error: Option<io::ErrorKind>,
}

impl MockStream {
    pub(crate) fn with_reads<I, T>(chunks: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        MockStream {
            reads: chunks
                .into_iter()
                .map(|c| Ok(c.as_ref().to_vec()))
                .collect(),
            written: Rc::new(RefCell::new(Vec::new())),
            read_calls: Rc::new(Cell::new(0)),
            closed: Rc::new(Cell::new(false)),
            close_error: None,
        }
    }

    pub(crate) fn one_byte_reads(data: &[u8]) -> Self {
        MockStream::with_reads(data.iter().map(|b| [*b]))
    }

    pub(crate) fn push_read_error(mut self, kind: io::ErrorKind) -> Self {
        self.reads.push_back(Err(kind));
        self
    }

    pub(crate) fn fail_close(mut self, kind: io::ErrorKind) -> Self {
        self.close_error = Some(kind);
        self
    }

    pub(crate) fn written(&self) -> Rc<RefCell<Vec<u8>>> {
        self.written.clone()
    }

    pub(crate) fn read_calls(&self) -> Rc<Cell<usize>> {
        self.read_calls.clone()
    }

    pub(crate) fn closed(&self) -> Rc<Cell<bool>> {
        self.closed.clone()
    }
}

impl Read for MockStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.read_calls.set(self.read_calls.get() + 1);
        match self.reads.pop_front() {
            Some(Ok(mut chunk)) => {
                let n = chunk.len().min(buf.len());
                buf[..n].copy_from_slice(&chunk[..n]);
                if n < chunk.len() {
                    self.reads.push_front(Ok(chunk.split_off(n)));
                }
                Ok(n)
            }
            Some(Err(kind)) => Err(io::Error::new(kind, "mock read error")),
            None => Ok(0),
        }
    }
}

impl Write for MockStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.closed.get() {
            return Err(io::Error::from(io::ErrorKind::BrokenPipe));
        }
        self.written.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl FtpStream for MockStream {
    fn close(&mut self) -> io::Result<()> {
        self.closed.set(true);
        match self.close_error {
            Some(kind) => Err(io::Error::new(kind, "mock close error")),
            None => Ok(()),
        }
    }
}

/// Hands out one control stream and a queue of data streams.
pub(crate) struct MockConnectionProvider {
    control: Option<MockStream>,
    data: VecDeque<io::Result<MockStream>>,
    pub(crate) data_addrs: Rc<RefCell<Vec<SocketAddr>>>,
}

impl MockConnectionProvider {
    pub(crate) fn new(control: MockStream) -> Self {
        MockConnectionProvider {
            control: Some(control),
            data: VecDeque::new(),
            data_addrs: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub(crate) fn push_data(mut self, stream: MockStream) -> Self {
        self.data.push_back(Ok(stream));
        self
    }

    pub(crate) fn push_data_error(mut self, kind: io::ErrorKind) -> Self {
        self.data.push_back(Err(io::Error::from(kind)));
        self
    }
}

impl FtpConnectionProvider<MockStream> for MockConnectionProvider {
    fn new_control_connection(&mut self, _host: &str, _port: u16) -> io::Result<MockStream> {
        self.control
            .take()
            .ok_or_else(|| io::Error::from(io::ErrorKind::ConnectionRefused))
    }

    fn new_data_connection(&mut self, addr: SocketAddr) -> io::Result<MockStream> {
        self.data_addrs.borrow_mut().push(addr);
        self.data
            .pop_front()
            .unwrap_or_else(|| Err(io::Error::from(io::ErrorKind::ConnectionRefused)))
    }
}
