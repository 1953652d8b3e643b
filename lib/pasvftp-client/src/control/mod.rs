/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io;
use std::str::FromStr;

use log::debug;

use crate::FtpControlConfig;
use crate::connection::FtpStream;
use crate::error::{FtpAuthStatus, FtpCommandError, FtpRawResponseError};
use crate::transfer::FtpTransferType;

mod command;
pub use command::FtpCommand;

mod pasv;

mod response;
pub use response::FtpResponse;
use response::{FtpLineBuffer, FtpMultiLineReplyParser, FtpReplyLine};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChannelState {
    Idle,
    AwaitingResponse(FtpCommand),
}

/// The command / reply exchange on the control connection.
///
/// Commands and replies must strictly alternate. Sending a command while
/// the reply of the previous one has not been read is refused.
pub struct FtpControlChannel<T: FtpStream> {
    config: FtpControlConfig,
    stream: T,
    cmd_buf: Vec<u8>,
    line_buf: FtpLineBuffer,
    state: ChannelState,
}

impl<T: FtpStream> FtpControlChannel<T> {
    pub fn new(stream: T, config: &FtpControlConfig) -> Self {
        FtpControlChannel {
            config: config.clone(),
            stream,
            cmd_buf: Vec::with_capacity(config.max_cmd_len),
            line_buf: FtpLineBuffer::new(config.max_line_len),
            state: ChannelState::Idle,
        }
    }

    /// Frame and write one command.
    pub fn send_cmd(
        &mut self,
        cmd: FtpCommand,
        param: Option<&str>,
    ) -> Result<(), FtpCommandError> {
        if let ChannelState::AwaitingResponse(_) = self.state {
            return Err(FtpCommandError::OutOfSequence(cmd));
        }

        command::frame_command(&mut self.cmd_buf, cmd, param, self.config.max_cmd_len)?;

        #[cfg(feature = "log-raw-io")]
        crate::debug::log_cmd(&String::from_utf8_lossy(&self.cmd_buf));

        self.send_all().map_err(FtpCommandError::SendFailed)?;
        self.state = ChannelState::AwaitingResponse(cmd);
        Ok(())
    }

    fn send_all(&mut self) -> io::Result<()> {
        self.stream.write_all(&self.cmd_buf)?;
        self.stream.flush()
    }

    /// Read exactly one reply.
    ///
    /// This is also used to read replies that are not triggered by a
    /// command, like the greeting and the transfer end reply.
    pub fn read_response(&mut self) -> Result<FtpResponse, FtpRawResponseError> {
        self.state = ChannelState::Idle;

        let mut ml_parser = match self.line_buf.read_line(&mut self.stream) {
            Ok(line) => {
                #[cfg(feature = "log-raw-io")]
                crate::debug::log_rsp(line);

                match FtpReplyLine::parse(line)? {
                    FtpReplyLine::Single(code, msg) => {
                        return Ok(FtpResponse::new(code, String::from_utf8_lossy(msg)));
                    }
                    FtpReplyLine::MultiStart(code, msg) => {
                        FtpMultiLineReplyParser::new(code, msg, self.config.max_multi_lines)
                    }
                }
            }
            Err(FtpRawResponseError::LineTooLong) => {
                // the rest of a multi-line reply should also be skipped
                let Ok(FtpReplyLine::MultiStart(code, _)) =
                    FtpReplyLine::parse(self.line_buf.dropped_head())
                else {
                    return Err(FtpRawResponseError::LineTooLong);
                };
                let mut ml_parser =
                    FtpMultiLineReplyParser::new(code, b"", self.config.max_multi_lines);
                ml_parser.mark_line_too_long();
                ml_parser
            }
            Err(e) => return Err(e),
        };

        loop {
            match self.line_buf.read_line(&mut self.stream) {
                Ok(line) => {
                    #[cfg(feature = "log-raw-io")]
                    crate::debug::log_rsp(line);

                    if ml_parser.feed_line(line) {
                        return ml_parser.finish();
                    }
                }
                Err(FtpRawResponseError::LineTooLong) => ml_parser.mark_line_too_long(),
                Err(e) => return Err(e),
            }
        }
    }

    /// Mark that one more reply for `cmd` is still owed by the server.
    ///
    /// Commands will be refused until it is read by [`Self::read_response`].
    pub(crate) fn expect_response(&mut self, cmd: FtpCommand) {
        self.state = ChannelState::AwaitingResponse(cmd);
    }

    /// Send a command and read its reply.
    pub fn execute(
        &mut self,
        cmd: FtpCommand,
        param: Option<&str>,
    ) -> Result<FtpResponse, FtpCommandError> {
        self.send_cmd(cmd, param)?;
        let reply = self.read_response()?;
        Ok(reply)
    }

    /// Close the underlying connection, without sending QUIT.
    pub fn close(&mut self) -> io::Result<()> {
        self.stream.close()
    }

    pub(crate) fn wait_greetings(&mut self) -> Result<FtpResponse, FtpCommandError> {
        loop {
            let reply = self.read_response()?;
            match reply.code() {
                120 => debug!("server not ready yet: {}", reply.message()),
                220 => {
                    debug!("greeting from server: {}", reply.message());
                    return Ok(reply);
                }
                n => {
                    return Err(FtpCommandError::unexpected(
                        FtpCommand::GREETING,
                        n,
                        reply.into_message(),
                    ));
                }
            }
        }
    }

    pub(crate) fn send_username(&mut self, name: &str) -> Result<FtpAuthStatus, FtpCommandError> {
        let cmd = FtpCommand::USER;
        let reply = self.execute(cmd, Some(name))?;
        match reply.code() {
            230 => Ok(FtpAuthStatus::LoggedIn),
            331 => Ok(FtpAuthStatus::NeedPassword(reply.into_message())),
            332 => Ok(FtpAuthStatus::NeedAccount),
            530 => Ok(FtpAuthStatus::NotLoggedIn(reply.into_message())),
            n => Err(FtpCommandError::unexpected(cmd, n, reply.into_message())),
        }
    }

    pub(crate) fn send_password(&mut self, pass: &str) -> Result<FtpAuthStatus, FtpCommandError> {
        let cmd = FtpCommand::PASS;
        let reply = self.execute(cmd, Some(pass))?;
        match reply.code() {
            230 => Ok(FtpAuthStatus::LoggedIn),
            331 => Ok(FtpAuthStatus::NeedPassword(reply.into_message())),
            332 => Ok(FtpAuthStatus::NeedAccount),
            530 => Ok(FtpAuthStatus::NotLoggedIn(reply.into_message())),
            n => Err(FtpCommandError::unexpected(cmd, n, reply.into_message())),
        }
    }

    pub(crate) fn send_quit(&mut self) -> Result<(), FtpCommandError> {
        self.execute_expect(FtpCommand::QUIT, None, &[221])?;
        Ok(())
    }

    fn execute_expect(
        &mut self,
        cmd: FtpCommand,
        param: Option<&str>,
        expected: &[u16],
    ) -> Result<FtpResponse, FtpCommandError> {
        let reply = self.execute(cmd, param)?;
        if expected.contains(&reply.code()) {
            Ok(reply)
        } else {
            Err(FtpCommandError::unexpected(
                cmd,
                reply.code(),
                reply.into_message(),
            ))
        }
    }

    pub fn set_transfer_type(&mut self, ty: FtpTransferType) -> Result<(), FtpCommandError> {
        self.execute_expect(FtpCommand::TYPE, Some(ty.as_param()), &[200])?;
        Ok(())
    }

    /// Returns the raw 257 reply text.
    pub fn print_working_dir(&mut self) -> Result<String, FtpCommandError> {
        let reply = self.execute_expect(FtpCommand::PWD, None, &[257])?;
        Ok(reply.into_message())
    }

    pub fn change_working_dir(&mut self, path: &str) -> Result<String, FtpCommandError> {
        let reply = self.execute_expect(FtpCommand::CWD, Some(path), &[250])?;
        Ok(reply.into_message())
    }

    pub fn make_dir(&mut self, path: &str) -> Result<String, FtpCommandError> {
        let reply = self.execute_expect(FtpCommand::MKD, Some(path), &[257, 250])?;
        Ok(reply.into_message())
    }

    pub fn remove_dir(&mut self, path: &str) -> Result<String, FtpCommandError> {
        let reply = self.execute_expect(FtpCommand::RMD, Some(path), &[250])?;
        Ok(reply.into_message())
    }

    pub fn delete_file(&mut self, path: &str) -> Result<String, FtpCommandError> {
        let reply = self.execute_expect(FtpCommand::DELE, Some(path), &[250])?;
        Ok(reply.into_message())
    }

    /// SIZE is only reliable in binary mode, so we switch to it first.
    pub fn request_size(&mut self, path: &str) -> Result<u64, FtpCommandError> {
        self.set_transfer_type(FtpTransferType::Binary)?;

        let cmd = FtpCommand::SIZE;
        let reply = self.execute_expect(cmd, Some(path), &[213])?;
        u64::from_str(reply.message().trim()).map_err(|_| FtpCommandError::InvalidReplySyntax {
            cmd,
            reason: "invalid size value",
            message: reply.into_message(),
        })
    }
}

/// Get the path quoted in a 257 reply, with doubled quotes unescaped.
pub fn parse_quoted_path(msg: &str) -> Option<String> {
    let start = memchr::memchr(b'"', msg.as_bytes())?;
    let mut path = String::new();
    let mut chars = msg[start + 1..].chars().peekable();
    while let Some(c) = chars.next() {
        if c == '"' {
            if chars.peek() == Some(&'"') {
                chars.next();
            } else {
                return Some(path);
            }
        }
        path.push(c);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockStream;

    fn new_channel(io: MockStream) -> FtpControlChannel<MockStream> {
        FtpControlChannel::new(io, &FtpControlConfig::default())
    }

    #[test]
    fn send_and_read() {
        let io = MockStream::with_reads(["250 CWD command successful\r\n"]);
        let written = io.written();
        let mut control = new_channel(io);

        control.send_cmd(FtpCommand::CWD, Some("/pub")).unwrap();
        let reply = control.read_response().unwrap();
        assert_eq!(reply, FtpResponse::new(250, "CWD command successful"));
        assert_eq!(written.borrow().as_slice(), b"CWD /pub\r\n");
    }

    #[test]
    fn out_of_sequence() {
        let io = MockStream::with_reads(["200 Type set to I\r\n", "257 \"/\"\r\n"]);
        let written = io.written();
        let mut control = new_channel(io);

        control.send_cmd(FtpCommand::TYPE, Some("I")).unwrap();
        let err = control.send_cmd(FtpCommand::PWD, None).unwrap_err();
        assert!(matches!(err, FtpCommandError::OutOfSequence(FtpCommand::PWD)));
        assert_eq!(written.borrow().as_slice(), b"TYPE I\r\n");

        assert_eq!(control.read_response().unwrap().code(), 200);
        assert_eq!(control.print_working_dir().unwrap(), "\"/\"");
    }

    #[test]
    fn frame_error_keeps_channel_usable() {
        let io = MockStream::with_reads(["250 ok\r\n"]);
        let written = io.written();
        let config = FtpControlConfig {
            max_cmd_len: 16,
            ..Default::default()
        };
        let mut control = FtpControlChannel::new(io, &config);

        let err = control
            .send_cmd(FtpCommand::CWD, Some("/a/very/long/path"))
            .unwrap_err();
        assert!(matches!(err, FtpCommandError::CommandTooLong(23)));
        assert!(written.borrow().is_empty());

        assert_eq!(control.change_working_dir("/a").unwrap(), "ok");
    }

    #[test]
    fn send_failed() {
        let mut io = MockStream::with_reads(Vec::<&[u8]>::new());
        io.close().unwrap();
        let mut control = new_channel(io);

        let err = control.send_cmd(FtpCommand::QUIT, None).unwrap_err();
        assert!(matches!(err, FtpCommandError::SendFailed(_)));
        // nothing is pending after a failed write
        assert!(!matches!(
            control.send_cmd(FtpCommand::QUIT, None),
            Err(FtpCommandError::OutOfSequence(_))
        ));
    }

    #[test]
    fn read_failed() {
        let io = MockStream::with_reads(["220 partial"])
            .push_read_error(io::ErrorKind::ConnectionReset);
        let mut control = new_channel(io);

        let err = control.read_response().unwrap_err();
        assert!(matches!(err, FtpRawResponseError::ReadFailed(_)));
    }

    #[test]
    fn long_line_is_skipped() {
        let long_reply = format!("550 {}\r\n", "a".repeat(28));
        let io = MockStream::with_reads([long_reply.as_str(), "250 ok\r\n"]);
        let config = FtpControlConfig {
            max_line_len: 16,
            ..Default::default()
        };
        let mut control = FtpControlChannel::new(io, &config);

        let err = control.change_working_dir("/x").unwrap_err();
        assert!(matches!(
            err,
            FtpCommandError::RecvFailed(FtpRawResponseError::LineTooLong)
        ));
        assert_eq!(control.change_working_dir("/a").unwrap(), "ok");

        // a too long line in a multi-line reply
        let long_line = format!(" {}\r\n", "b".repeat(20));
        let io = MockStream::with_reads([
            "211-a\r\n",
            long_line.as_str(),
            "211 end\r\n250 ok\r\n",
        ]);
        let mut control = FtpControlChannel::new(io, &config);
        control.send_cmd(FtpCommand::PWD, None).unwrap();
        let err = control.read_response().unwrap_err();
        assert!(matches!(err, FtpRawResponseError::LineTooLong));
        assert_eq!(control.change_working_dir("/a").unwrap(), "ok");

        // the first line of a multi-line reply is too long
        let long_first = format!("211-{}\r\n", "c".repeat(20));
        let io = MockStream::with_reads([long_first.as_str(), " d\r\n211 end\r\n250 ok\r\n"]);
        let mut control = FtpControlChannel::new(io, &config);
        control.send_cmd(FtpCommand::PWD, None).unwrap();
        let err = control.read_response().unwrap_err();
        assert!(matches!(err, FtpRawResponseError::LineTooLong));
        assert_eq!(control.change_working_dir("/a").unwrap(), "ok");
    }

    #[test]
    fn too_many_lines_consumed() {
        let io = MockStream::with_reads(["211-a\r\n b\r\n c\r\n211 end\r\n250 ok\r\n"]);
        let config = FtpControlConfig {
            max_multi_lines: 2,
            ..Default::default()
        };
        let mut control = FtpControlChannel::new(io, &config);

        control.send_cmd(FtpCommand::PWD, None).unwrap();
        let err = control.read_response().unwrap_err();
        assert!(matches!(err, FtpRawResponseError::TooManyLines));
        assert_eq!(control.change_working_dir("/a").unwrap(), "ok");
    }

    #[test]
    fn multi_line_reply() {
        let io = MockStream::with_reads([
            "220-Welcome\r\n",
            "220-to the\r\n  test server\r\n",
            "220 ready\r\n",
        ]);
        let mut control = new_channel(io);

        let reply = control.wait_greetings().unwrap();
        assert_eq!(reply.code(), 220);
        assert_eq!(reply.message(), "Welcome\n220-to the\n  test server\nready");
    }

    #[test]
    fn greeting() {
        let io = MockStream::with_reads(["120 wait a moment\r\n220 ready\r\n"]);
        let mut control = new_channel(io);
        assert_eq!(control.wait_greetings().unwrap().message(), "ready");

        let io = MockStream::with_reads(["421 too many users\r\n"]);
        let mut control = new_channel(io);
        let err = control.wait_greetings().unwrap_err();
        assert!(err.is_service_not_available());
    }

    #[test]
    fn named_commands() {
        let io = MockStream::with_reads([
            "257 \"/home\" created\r\n",
            "250 Directory removed\r\n",
            "550 No such file\r\n",
            "200 Type set to I\r\n",
            "213 170\r\n",
            "200 Type set to I\r\n",
            "213 big\r\n",
            "221 Goodbye\r\n",
        ]);
        let written = io.written();
        let mut control = new_channel(io);

        assert_eq!(control.make_dir("home").unwrap(), "\"/home\" created");
        assert_eq!(control.remove_dir("home").unwrap(), "Directory removed");

        let err = control.delete_file("/100.txt").unwrap_err();
        let FtpCommandError::UnexpectedReplyCode { cmd, code, message } = err else {
            panic!("not an unexpected reply code error");
        };
        assert_eq!(cmd, FtpCommand::DELE);
        assert_eq!(code, 550);
        assert_eq!(message, "No such file");

        assert_eq!(control.request_size("/test.go").unwrap(), 170);
        let err = control.request_size("/test.go").unwrap_err();
        assert!(matches!(
            err,
            FtpCommandError::InvalidReplySyntax {
                cmd: FtpCommand::SIZE,
                ..
            }
        ));
        control.send_quit().unwrap();

        assert_eq!(
            written.borrow().as_slice(),
            b"MKD home\r\nRMD home\r\nDELE /100.txt\r\nTYPE I\r\nSIZE /test.go\r\n\
              TYPE I\r\nSIZE /test.go\r\nQUIT\r\n"
        );
    }

    #[test]
    fn quoted_path() {
        assert_eq!(
            parse_quoted_path("\"/\" is the current directory.").as_deref(),
            Some("/")
        );
        assert_eq!(
            parse_quoted_path("\"/a \"\"b\"\"\" is current").as_deref(),
            Some("/a \"b\"")
        );
        assert_eq!(parse_quoted_path("no quote"), None);
        assert_eq!(parse_quoted_path("\"unterminated"), None);
    }
}
