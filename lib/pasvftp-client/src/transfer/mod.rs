/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io::{self, Read, Write};

use log::{debug, warn};

use crate::connection::FtpStream;
use crate::control::FtpControlChannel;
use crate::error::FtpTransferEndError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FtpTransferType {
    Ascii,
    Binary,
}

impl FtpTransferType {
    pub(crate) fn as_param(&self) -> &'static str {
        match self {
            FtpTransferType::Ascii => "A",
            FtpTransferType::Binary => "I",
        }
    }
}

/// The data connection of a single transfer.
///
/// It holds the control channel mutably, so no other command can be sent
/// until it is closed. The transfer end reply is read on close, or on drop
/// if it was not closed explicitly.
pub struct FtpDataChannel<'a, S: FtpStream> {
    control: &'a mut FtpControlChannel<S>,
    stream: S,
    finished: bool,
}

impl<'a, S: FtpStream> FtpDataChannel<'a, S> {
    pub(crate) fn new(control: &'a mut FtpControlChannel<S>, stream: S) -> Self {
        FtpDataChannel {
            control,
            stream,
            finished: false,
        }
    }

    /// Close the data connection and wait for the transfer end reply.
    pub fn close(mut self) -> Result<(), FtpTransferEndError> {
        self.finish()
    }

    fn finish(&mut self) -> Result<(), FtpTransferEndError> {
        self.finished = true;

        let close_result = self.stream.close();
        // the reply is always read, or the next command will get it
        let reply = self.control.read_response()?;
        debug!("transfer end reply: {} {}", reply.code(), reply.message());
        if reply.code() != 226 {
            return Err(FtpTransferEndError::UnexpectedReplyCode {
                code: reply.code(),
                message: reply.into_message(),
            });
        }
        close_result.map_err(FtpTransferEndError::ShutdownFailed)
    }
}

impl<S: FtpStream> Read for FtpDataChannel<'_, S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream.read(buf)
    }
}

impl<S: FtpStream> Write for FtpDataChannel<'_, S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stream.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stream.flush()
    }
}

impl<S: FtpStream> Drop for FtpDataChannel<'_, S> {
    fn drop(&mut self) {
        if !self.finished
            && let Err(e) = self.finish()
        {
            warn!("data channel dropped without close: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FtpControlConfig;
    use crate::mock::MockStream;

    fn new_control(io: MockStream) -> FtpControlChannel<MockStream> {
        FtpControlChannel::new(io, &FtpControlConfig::default())
    }

    #[test]
    fn close_ok() {
        let control_io = MockStream::with_reads(["226 Transfer complete\r\n"]);
        let read_calls = control_io.read_calls();
        let mut control = new_control(control_io);

        let data_io = MockStream::with_reads(["hello"]);
        let closed = data_io.closed();
        let mut data = FtpDataChannel::new(&mut control, data_io);
        let mut s = String::new();
        data.read_to_string(&mut s).unwrap();
        assert_eq!(s, "hello");

        data.close().unwrap();
        assert!(closed.get());
        assert_eq!(read_calls.get(), 1);
    }

    #[test]
    fn close_unexpected_code() {
        let mut control = new_control(MockStream::with_reads(["426 Connection closed\r\n"]));

        let data = FtpDataChannel::new(&mut control, MockStream::with_reads(["x"]));
        let err = data.close().unwrap_err();
        let FtpTransferEndError::UnexpectedReplyCode { code, message } = err else {
            panic!("not an unexpected reply code error");
        };
        assert_eq!(code, 426);
        assert_eq!(message, "Connection closed");
    }

    #[test]
    fn close_failed_still_reads_reply() {
        let control_io = MockStream::with_reads(["226 Transfer complete\r\n"]);
        let read_calls = control_io.read_calls();
        let mut control = new_control(control_io);

        let data_io = MockStream::with_reads(Vec::<&[u8]>::new())
            .fail_close(io::ErrorKind::ConnectionReset);
        let data = FtpDataChannel::new(&mut control, data_io);
        let err = data.close().unwrap_err();
        assert!(matches!(err, FtpTransferEndError::ShutdownFailed(_)));
        assert_eq!(read_calls.get(), 1);

        // the reply has been consumed
        let control_io = MockStream::with_reads(["550 Failed\r\n"]);
        let mut control = new_control(control_io);
        let data_io = MockStream::with_reads(Vec::<&[u8]>::new())
            .fail_close(io::ErrorKind::ConnectionReset);
        let err = FtpDataChannel::new(&mut control, data_io)
            .close()
            .unwrap_err();
        assert!(matches!(
            err,
            FtpTransferEndError::UnexpectedReplyCode { code: 550, .. }
        ));
    }

    #[test]
    fn read_error_wins() {
        let control_io =
            MockStream::with_reads(Vec::<&[u8]>::new()).push_read_error(io::ErrorKind::TimedOut);
        let mut control = new_control(control_io);

        let data_io = MockStream::with_reads(Vec::<&[u8]>::new())
            .fail_close(io::ErrorKind::ConnectionReset);
        let err = FtpDataChannel::new(&mut control, data_io)
            .close()
            .unwrap_err();
        assert!(matches!(err, FtpTransferEndError::RecvFailed(_)));
    }

    #[test]
    fn drop_reads_reply() {
        let control_io = MockStream::with_reads(["226 Transfer complete\r\n", "257 \"/\"\r\n"]);
        let read_calls = control_io.read_calls();
        let mut control = new_control(control_io);

        let data_io = MockStream::with_reads(["ignored"]);
        let closed = data_io.closed();
        drop(FtpDataChannel::new(&mut control, data_io));
        assert!(closed.get());
        assert_eq!(read_calls.get(), 1);

        assert_eq!(control.print_working_dir().unwrap(), "\"/\"");
    }

    #[test]
    fn write_through() {
        let mut control = new_control(MockStream::with_reads(["226 ok\r\n"]));
        let data_io = MockStream::with_reads(Vec::<&[u8]>::new());
        let written = data_io.written();

        let mut data = FtpDataChannel::new(&mut control, data_io);
        data.write_all(b"some payload").unwrap();
        data.close().unwrap();
        assert_eq!(written.borrow().as_slice(), b"some payload");
    }
}
