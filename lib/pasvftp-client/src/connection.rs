/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use log::debug;

use crate::FtpClientConfig;

/// A connected byte stream that can be closed explicitly.
pub trait FtpStream: Read + Write {
    fn close(&mut self) -> io::Result<()>;
}

impl FtpStream for TcpStream {
    fn close(&mut self) -> io::Result<()> {
        match self.shutdown(Shutdown::Both) {
            Ok(_) => Ok(()),
            // the peer may have closed it already
            Err(e) if e.kind() == io::ErrorKind::NotConnected => Ok(()),
            Err(e) => Err(e),
        }
    }
}

pub trait FtpConnectionProvider<S: FtpStream> {
    fn new_control_connection(&mut self, host: &str, port: u16) -> io::Result<S>;
    fn new_data_connection(&mut self, addr: SocketAddr) -> io::Result<S>;
}

pub struct TcpConnectionProvider {
    connect_timeout: Duration,
    io_timeout: Option<Duration>,
    pasv_use_control_host: bool,
    remote_addr: Option<SocketAddr>,
}

impl TcpConnectionProvider {
    pub fn new(config: &FtpClientConfig) -> Self {
        TcpConnectionProvider {
            connect_timeout: config.connect_timeout,
            io_timeout: config.io_timeout,
            pasv_use_control_host: config.pasv_use_control_host,
            remote_addr: None,
        }
    }

    /// The peer address of the control connection, if connected.
    pub fn remote_addr(&self) -> Option<SocketAddr> {
        self.remote_addr
    }

    fn connect(&self, addr: SocketAddr) -> io::Result<TcpStream> {
        let stream = TcpStream::connect_timeout(&addr, self.connect_timeout)?;
        stream.set_read_timeout(self.io_timeout)?;
        stream.set_write_timeout(self.io_timeout)?;
        Ok(stream)
    }
}

impl Default for TcpConnectionProvider {
    fn default() -> Self {
        TcpConnectionProvider::new(&FtpClientConfig::default())
    }
}

impl FtpConnectionProvider<TcpStream> for TcpConnectionProvider {
    fn new_control_connection(&mut self, host: &str, port: u16) -> io::Result<TcpStream> {
        let mut err = io::Error::new(io::ErrorKind::AddrNotAvailable, "no addr resolved");
        for addr in (host, port).to_socket_addrs()? {
            match self.connect(addr) {
                Ok(stream) => {
                    debug!("control connection established to {addr}");
                    self.remote_addr = Some(addr);
                    return Ok(stream);
                }
                Err(e) => err = e,
            }
        }

        Err(err)
    }

    fn new_data_connection(&mut self, addr: SocketAddr) -> io::Result<TcpStream> {
        let data_addr = if self.pasv_use_control_host {
            match self.remote_addr {
                Some(remote) => SocketAddr::new(remote.ip(), addr.port()),
                None => {
                    return Err(io::Error::new(
                        io::ErrorKind::AddrNotAvailable,
                        "no resolved control addr found",
                    ));
                }
            }
        } else {
            addr
        };
        debug!("opening data connection to {data_addr}");
        self.connect(data_addr)
    }
}
