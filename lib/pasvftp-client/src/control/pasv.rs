/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::net::{Ipv4Addr, SocketAddrV4};
use std::str::FromStr;

use log::debug;

use super::{FtpCommand, FtpControlChannel};
use crate::connection::FtpStream;
use crate::error::FtpCommandError;

/// Find the `(h1,h2,h3,h4,p1,p2)` tuple in a 227 reply text.
///
/// Returns the reason on failure.
pub(crate) fn parse_pasv_227_reply(msg: &str) -> Result<SocketAddrV4, &'static str> {
    let Some(p_start) = memchr::memchr(b'(', msg.as_bytes()) else {
        return Err("address tuple not found");
    };
    let Some(p_end) = memchr::memchr(b')', &msg.as_bytes()[p_start..]) else {
        return Err("address tuple not closed");
    };
    let p_end = p_start + p_end;

    let a: Vec<&str> = msg[p_start + 1..p_end].split(',').map(|s| s.trim()).collect();
    if a.len() != 6 {
        return Err("invalid address tuple length");
    }

    let mut h = [0u8; 4];
    for (i, v) in a[..4].iter().enumerate() {
        h[i] = u8::from_str(v).map_err(|_| "invalid host octet")?;
    }
    let p1 = u8::from_str(a[4]).map_err(|_| "invalid port number")?;
    let p2 = u8::from_str(a[5]).map_err(|_| "invalid port number")?;

    let ip = Ipv4Addr::new(h[0], h[1], h[2], h[3]);
    let port = ((p1 as u16) << 8) + (p2 as u16);
    Ok(SocketAddrV4::new(ip, port))
}

impl<T: FtpStream> FtpControlChannel<T> {
    /// Ask the server to listen for a data connection.
    ///
    /// Each returned address should be used by exactly one transfer.
    pub fn request_pasv_addr(&mut self) -> Result<SocketAddrV4, FtpCommandError> {
        let cmd = FtpCommand::PASV;
        let reply = self.execute(cmd, None)?;
        match reply.code() {
            227 => match parse_pasv_227_reply(reply.message()) {
                Ok(addr) => {
                    debug!("server entered passive mode at {addr}");
                    Ok(addr)
                }
                Err(reason) => Err(FtpCommandError::InvalidReplySyntax {
                    cmd,
                    reason,
                    message: reply.into_message(),
                }),
            },
            n => Err(FtpCommandError::unexpected(cmd, n, reply.into_message())),
        }
    }
}
