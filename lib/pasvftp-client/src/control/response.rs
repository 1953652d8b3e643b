/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io::{self, Read};

use crate::error::FtpRawResponseError;

const LINE_END: &[u8] = b"\r\n";

/// A status reply, the code and the text after it.
///
/// For multi-line replies the message is all text lines joined by `\n`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FtpResponse {
    code: u16,
    message: String,
}

impl FtpResponse {
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        FtpResponse {
            code,
            message: message.into(),
        }
    }

    #[inline]
    pub fn code(&self) -> u16 {
        self.code
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn into_message(self) -> String {
        self.message
    }
}

pub(crate) enum FtpReplyLine<'a> {
    Single(u16, &'a [u8]),
    MultiStart(u16, &'a [u8]),
}

fn parse_code(line: &[u8]) -> Result<u16, FtpRawResponseError> {
    if line.len() < 3 {
        return Err(FtpRawResponseError::LineTooShort);
    }
    let mut code = 0u16;
    for c in &line[..3] {
        if !c.is_ascii_digit() {
            return Err(FtpRawResponseError::InvalidReplyCode(
                String::from_utf8_lossy(&line[..3]).to_string(),
            ));
        }
        code = code * 10 + (c - b'0') as u16;
    }
    Ok(code)
}

impl<'a> FtpReplyLine<'a> {
    /// Decode the first line of a reply, without the CRLF.
    pub(crate) fn parse(line: &'a [u8]) -> Result<Self, FtpRawResponseError> {
        let code = parse_code(line)?;
        if line.len() < 4 {
            return Ok(FtpReplyLine::Single(code, b""));
        }
        if line[3] == b'-' {
            Ok(FtpReplyLine::MultiStart(code, &line[4..]))
        } else {
            Ok(FtpReplyLine::Single(code, &line[4..]))
        }
    }
}

/// Collect the lines of a `CCC-` reply until the `CCC ` one.
///
/// Lines over the limit are still consumed, but not kept.
pub(crate) struct FtpMultiLineReplyParser {
    code: u16,
    end_prefix: [u8; 4],
    message: String,
    lines: usize,
    max_lines: usize,
    line_too_long: bool,
}

impl FtpMultiLineReplyParser {
    pub(crate) fn new(code: u16, first: &[u8], max_lines: usize) -> Self {
        let end_prefix = [
            b'0' + (code / 100) as u8,
            b'0' + (code / 10 % 10) as u8,
            b'0' + (code % 10) as u8,
            b' ',
        ];
        FtpMultiLineReplyParser {
            code,
            end_prefix,
            message: String::from_utf8_lossy(first).to_string(),
            lines: 1,
            max_lines,
            line_too_long: false,
        }
    }

    /// One of the lines has been dropped by the line buffer.
    pub(crate) fn mark_line_too_long(&mut self) {
        self.line_too_long = true;
    }

    /// Returns true if this is the last line.
    pub(crate) fn feed_line(&mut self, line: &[u8]) -> bool {
        self.lines += 1;
        let keep = self.lines <= self.max_lines;

        if line.starts_with(&self.end_prefix) {
            if keep {
                self.message.push('\n');
                self.message.push_str(&String::from_utf8_lossy(&line[4..]));
            }
            true
        } else if line == &self.end_prefix[..3] {
            if keep {
                self.message.push('\n');
            }
            true
        } else {
            if keep {
                self.message.push('\n');
                self.message.push_str(&String::from_utf8_lossy(line));
            }
            false
        }
    }

    pub(crate) fn finish(self) -> Result<FtpResponse, FtpRawResponseError> {
        if self.line_too_long {
            return Err(FtpRawResponseError::LineTooLong);
        }
        if self.lines > self.max_lines {
            return Err(FtpRawResponseError::TooManyLines);
        }
        Ok(FtpResponse {
            code: self.code,
            message: self.message,
        })
    }
}

const MIN_LINE_BUFFER_SIZE: usize = 8;

/// Fixed capacity buffer holding at most one reply line.
///
/// Bytes received after a line end are kept for the next line.
pub(crate) struct FtpLineBuffer {
    buf: Box<[u8]>,
    start: usize,
    end: usize,
    dropped_head: [u8; 4],
    dropped_head_len: usize,
}

impl FtpLineBuffer {
    pub(crate) fn new(capacity: usize) -> Self {
        FtpLineBuffer {
            buf: vec![0u8; capacity.max(MIN_LINE_BUFFER_SIZE)].into_boxed_slice(),
            start: 0,
            end: 0,
            dropped_head: [0u8; 4],
            dropped_head_len: 0,
        }
    }

    /// The first bytes of the last line dropped as too long.
    pub(crate) fn dropped_head(&self) -> &[u8] {
        &self.dropped_head[..self.dropped_head_len]
    }

    #[cfg(test)]
    pub(crate) fn pending(&self) -> &[u8] {
        &self.buf[self.start..self.end]
    }

    fn reset(&mut self) {
        self.start = 0;
        self.end = 0;
    }

    /// Read until a CRLF shows up, and return the line without it.
    ///
    /// A line that does not fit is read through to its CRLF and dropped,
    /// then `LineTooLong` is returned.
    pub(crate) fn read_line<R: Read>(
        &mut self,
        reader: &mut R,
    ) -> Result<&[u8], FtpRawResponseError> {
        if self.start > 0 {
            self.buf.copy_within(self.start..self.end, 0);
            self.end -= self.start;
            self.start = 0;
        }

        let mut scan_from = 0;
        let mut too_long = false;
        loop {
            if let Some(p) = memchr::memmem::find(&self.buf[scan_from..self.end], LINE_END) {
                let line_end = scan_from + p;
                self.start = line_end + LINE_END.len();
                if too_long {
                    return Err(FtpRawResponseError::LineTooLong);
                }
                return Ok(&self.buf[..line_end]);
            }
            if self.end == self.buf.len() {
                if !too_long {
                    let n = self.end.min(self.dropped_head.len());
                    self.dropped_head[..n].copy_from_slice(&self.buf[..n]);
                    self.dropped_head_len = n;
                    too_long = true;
                }
                // drop all but the last byte, it may be the CR
                self.buf[0] = self.buf[self.end - 1];
                self.end = 1;
            }
            // the CR may be the last byte we have
            scan_from = self.end.saturating_sub(1);

            match reader.read(&mut self.buf[self.end..]) {
                Ok(0) => {
                    self.reset();
                    return Err(FtpRawResponseError::ConnectionClosed);
                }
                Ok(n) => self.end += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => {
                    self.reset();
                    return Err(FtpRawResponseError::ReadFailed(e));
                }
            }
        }
    }
}
