/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt;

use crate::error::FtpCommandError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FtpCommand(&'static str);

impl FtpCommand {
    /// Use a verb that has no predefined constant.
    pub const fn new(verb: &'static str) -> Self {
        FtpCommand(verb)
    }

    #[inline]
    pub fn verb(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for FtpCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

macro_rules! ftp_commands {
    (
        $(
            $(#[$docs:meta])*
            ($konst:ident, $phrase:expr);
        )+
    ) => {
        impl FtpCommand {
        $(
            $(#[$docs])*
            pub const $konst: FtpCommand = FtpCommand($phrase);
        )+
        }
    };
}

ftp_commands! {
    /// a fake command for greeting
    (GREETING, "-");
    (USER, "USER");
    (PASS, "PASS");
    (QUIT, "QUIT");
    (PWD, "PWD");
    (CWD, "CWD");
    (MKD, "MKD");
    (RMD, "RMD");
    (DELE, "DELE");
    (SIZE, "SIZE");
    (TYPE, "TYPE");
    (PASV, "PASV");
    (LIST, "LIST");
    (RETR, "RETR");
    (STOR, "STOR");
}

/// Frame `cmd[ SP param] CRLF` into `buf`.
///
/// An empty param is the same as no param. Nothing is written to `buf` on error.
pub(crate) fn frame_command(
    buf: &mut Vec<u8>,
    cmd: FtpCommand,
    param: Option<&str>,
    max_len: usize,
) -> Result<(), FtpCommandError> {
    let param = param.filter(|p| !p.is_empty());

    let mut len = cmd.0.len() + 2;
    if let Some(p) = param {
        if memchr::memchr2(b'\r', b'\n', p.as_bytes()).is_some() {
            return Err(FtpCommandError::InvalidParameter(cmd));
        }
        len += 1 + p.len();
    }
    if len > max_len {
        return Err(FtpCommandError::CommandTooLong(len));
    }

    buf.clear();
    buf.extend_from_slice(cmd.0.as_bytes());
    if let Some(p) = param {
        buf.push(b' ');
        buf.extend_from_slice(p.as_bytes());
    }
    buf.extend_from_slice(b"\r\n");
    Ok(())
}
