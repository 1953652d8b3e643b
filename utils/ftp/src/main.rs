/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, anyhow};
use clap::{Arg, ArgAction, Command, value_parser};
use clap_complete::Shell;

use pasvftp_client::{FtpClient, FtpClientConfig, TcpConnectionProvider};

mod logger;

mod cmd_del;
mod cmd_get;
mod cmd_list;
mod cmd_mkdir;
mod cmd_put;
mod cmd_pwd;
mod cmd_rmdir;
mod cmd_size;

const GLOBAL_ARG_COMPLETION: &str = "completion";
const GLOBAL_ARG_SERVER: &str = "server";
const GLOBAL_ARG_USERNAME: &str = "username";
const GLOBAL_ARG_PASSWORD: &str = "password";
const GLOBAL_ARG_CONFIG: &str = "config";
const GLOBAL_ARG_VERBOSE: &str = "verbose";

const DEFAULT_FTP_PORT: u16 = 21;

fn build_cli_args() -> Command {
    Command::new("pasvftp")
        .arg(
            Arg::new(GLOBAL_ARG_COMPLETION)
                .num_args(1)
                .value_name("SHELL")
                .long("completion")
                .value_parser(value_parser!(Shell))
                .exclusive(true),
        )
        .arg(
            Arg::new(GLOBAL_ARG_SERVER)
                .help("FTP server address, in HOST[:PORT] form")
                .num_args(1)
                .value_name("SERVER ADDRESS")
                .required_unless_present(GLOBAL_ARG_COMPLETION),
        )
        .arg(
            Arg::new(GLOBAL_ARG_USERNAME)
                .help("FTP username")
                .num_args(1)
                .value_name("USERNAME")
                .short('u')
                .global(true),
        )
        .arg(
            Arg::new(GLOBAL_ARG_PASSWORD)
                .help("FTP password")
                .num_args(1)
                .value_name("PASSWORD")
                .short('p')
                .global(true),
        )
        .arg(
            Arg::new(GLOBAL_ARG_CONFIG)
                .help("YAML client config file")
                .num_args(1)
                .value_name("CONFIG FILE")
                .value_parser(value_parser!(PathBuf))
                .long("config")
                .short('c')
                .global(true),
        )
        .arg(
            Arg::new(GLOBAL_ARG_VERBOSE)
                .help("show verbose message")
                .num_args(0)
                .action(ArgAction::Count)
                .short('v')
                .global(true),
        )
        .subcommand(cmd_list::command())
        .subcommand(cmd_get::command())
        .subcommand(cmd_put::command())
        .subcommand(cmd_del::command())
        .subcommand(cmd_mkdir::command())
        .subcommand(cmd_rmdir::command())
        .subcommand(cmd_pwd::command())
        .subcommand(cmd_size::command())
}

/// Split `HOST[:PORT]`, IPv6 hosts should be enclosed in `[]` if a port is given.
fn parse_server(s: &str) -> anyhow::Result<(String, u16)> {
    if let Some(v6) = s.strip_prefix('[') {
        let Some((host, left)) = v6.split_once(']') else {
            return Err(anyhow!("no ending ']' found in {s}"));
        };
        let port = match left.strip_prefix(':') {
            Some(p) => u16::from_str(p).map_err(|e| anyhow!("invalid port {p}: {e}"))?,
            None if left.is_empty() => DEFAULT_FTP_PORT,
            None => return Err(anyhow!("invalid server address {s}")),
        };
        return Ok((host.to_string(), port));
    }

    match s.rsplit_once(':') {
        Some((host, p)) if !host.contains(':') => {
            let port = u16::from_str(p).map_err(|e| anyhow!("invalid port {p}: {e}"))?;
            Ok((host.to_string(), port))
        }
        _ => Ok((s.to_string(), DEFAULT_FTP_PORT)),
    }
}

fn load_config(path: &PathBuf) -> anyhow::Result<FtpClientConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {e}", path.display()))?;
    let docs = yaml_rust::YamlLoader::load_from_str(&content)
        .map_err(|e| anyhow!("invalid yaml file {}: {e}", path.display()))?;
    match docs.first() {
        Some(doc) => FtpClientConfig::parse_yaml(doc)
            .context(format!("invalid ftp client config in {}", path.display())),
        None => Ok(FtpClientConfig::default()),
    }
}

fn main() -> anyhow::Result<()> {
    let args = build_cli_args().get_matches();

    if let Some(target) = args.get_one::<Shell>(GLOBAL_ARG_COMPLETION) {
        let mut app = build_cli_args();
        let bin_name = app.get_name().to_string();
        clap_complete::generate(*target, &mut app, bin_name, &mut io::stdout());
        return Ok(());
    }

    let verbose_level = args
        .get_one::<u8>(GLOBAL_ARG_VERBOSE)
        .copied()
        .unwrap_or_default();
    let logger = logger::SyncLogger::new(verbose_level);
    logger.into_global_logger()?;

    let Some(server) = args.get_one::<String>(GLOBAL_ARG_SERVER) else {
        return Err(anyhow!("no server address set"));
    };
    let (host, port) = parse_server(server)?;

    let username = args.get_one::<String>(GLOBAL_ARG_USERNAME);
    let password = args.get_one::<String>(GLOBAL_ARG_PASSWORD);

    let config = match args.get_one::<PathBuf>(GLOBAL_ARG_CONFIG) {
        Some(path) => load_config(path)?,
        None => FtpClientConfig::default(),
    };
    let conn_provider = TcpConnectionProvider::new(&config);

    if let Some((subcommand, args)) = args.subcommand() {
        let mut client = FtpClient::connect_to(&host, port, conn_provider, &config)
            .context(format!("failed to connect to {host}:{port}"))?;
        client.new_user_session(username.map(|s| s.as_str()), password.map(|s| s.as_str()))?;

        let ret = match subcommand {
            cmd_list::COMMAND => cmd_list::run(&mut client, args),
            cmd_get::COMMAND => cmd_get::run(&mut client, args),
            cmd_put::COMMAND => cmd_put::run(&mut client, args),
            cmd_del::COMMAND => cmd_del::run(&mut client, args),
            cmd_mkdir::COMMAND => cmd_mkdir::run(&mut client, args),
            cmd_rmdir::COMMAND => cmd_rmdir::run(&mut client, args),
            cmd_pwd::COMMAND => cmd_pwd::run(&mut client, args),
            cmd_size::COMMAND => cmd_size::run(&mut client, args),
            cmd => Err(anyhow!("invalid subcommand {cmd}")),
        };

        client.quit_and_close()?;

        ret
    } else {
        Err(anyhow!("no subcommand found"))
    }
}
