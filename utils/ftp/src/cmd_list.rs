/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io;

use clap::{Arg, ArgMatches, Command};

use pasvftp_client::{FtpClient, FtpConnectionProvider, FtpStream};

pub(super) const COMMAND: &str = "list";

const COMMAND_ARG_PATH: &str = "path";

pub(super) fn command() -> Command {
    Command::new(COMMAND).about("List path").arg(
        Arg::new(COMMAND_ARG_PATH)
            .value_name("FILE PATH")
            .num_args(1),
    )
}

pub(super) fn run<CP, S>(client: &mut FtpClient<CP, S>, args: &ArgMatches) -> anyhow::Result<()>
where
    CP: FtpConnectionProvider<S>,
    S: FtpStream,
{
    let path = args
        .get_one::<String>(COMMAND_ARG_PATH)
        .map(|s| s.as_str())
        .unwrap_or_default();

    let mut data = client.list(path)?;
    let copied = io::copy(&mut data, &mut io::stdout().lock());
    data.close()?;
    copied?;
    Ok(())
}
