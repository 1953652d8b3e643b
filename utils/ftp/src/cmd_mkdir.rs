/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use anyhow::anyhow;
use clap::{Arg, ArgMatches, Command};

use pasvftp_client::{FtpClient, FtpConnectionProvider, FtpStream};

pub(super) const COMMAND: &str = "mkdir";

const COMMAND_ARG_PATH: &str = "path";

pub(super) fn command() -> Command {
    Command::new(COMMAND).about("Create directory").arg(
        Arg::new(COMMAND_ARG_PATH)
            .value_name("PATH")
            .num_args(1)
            .required(true),
    )
}

pub(super) fn run<CP, S>(client: &mut FtpClient<CP, S>, args: &ArgMatches) -> anyhow::Result<()>
where
    CP: FtpConnectionProvider<S>,
    S: FtpStream,
{
    let Some(path) = args.get_one::<String>(COMMAND_ARG_PATH) else {
        return Err(anyhow!("no path set"));
    };

    let msg = client.make_dir(path)?;
    println!("{msg}");
    Ok(())
}
