/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::io;
use std::path::PathBuf;

use anyhow::{Context, anyhow};
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use clap_complete::Shell;

use ezftp_session::{
    FtpBatchPolicy, FtpSecurityMode, FtpSession, FtpSessionConfig, FtpSessionError,
    ProtoFtpEngine,
};

mod logger;

mod cmd_del;
mod cmd_get;
mod cmd_get_dir;
mod cmd_list;
mod cmd_put;
mod cmd_put_dir;
mod cmd_rmd;

pub(crate) type CliSession = FtpSession<ProtoFtpEngine>;

const GLOBAL_ARG_COMPLETION: &str = "completion";
const GLOBAL_ARG_CONFIG: &str = "config";
const GLOBAL_ARG_SERVER: &str = "server";
const GLOBAL_ARG_USERNAME: &str = "username";
const GLOBAL_ARG_PASSWORD: &str = "password";
const GLOBAL_ARG_TLS: &str = "tls";
const GLOBAL_ARG_INSECURE: &str = "insecure";
const GLOBAL_ARG_CONTINUE_ON_ERROR: &str = "continue-on-error";
const GLOBAL_ARG_VERBOSE: &str = "verbose";

fn build_cli_args() -> Command {
    Command::new("ezftp")
        .arg(
            Arg::new(GLOBAL_ARG_COMPLETION)
                .num_args(1)
                .value_name("SHELL")
                .long("completion")
                .value_parser(value_parser!(Shell))
                .exclusive(true),
        )
        .arg(
            Arg::new(GLOBAL_ARG_CONFIG)
                .help("Load the session config from a yaml file")
                .num_args(1)
                .value_name("CONFIG FILE")
                .value_parser(value_parser!(PathBuf))
                .long("config")
                .short('c')
                .global(true),
        )
        .arg(
            Arg::new(GLOBAL_ARG_SERVER)
                .help("FTP server address, in form host[:port]")
                .num_args(1)
                .value_name("SERVER ADDRESS")
                .required_unless_present_any([GLOBAL_ARG_COMPLETION, GLOBAL_ARG_CONFIG]),
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
            Arg::new(GLOBAL_ARG_TLS)
                .help("Secure the connection with TLS")
                .num_args(1)
                .value_name("MODE")
                .long("tls")
                .value_parser(["implicit", "explicit"])
                .global(true),
        )
        .arg(
            Arg::new(GLOBAL_ARG_INSECURE)
                .help("Skip verification of the server certificate")
                .action(ArgAction::SetTrue)
                .long("insecure")
                .short('k')
                .global(true),
        )
        .arg(
            Arg::new(GLOBAL_ARG_CONTINUE_ON_ERROR)
                .help("Keep going when one file of a batch fails")
                .action(ArgAction::SetTrue)
                .long("continue-on-error")
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
        .subcommand(cmd_get_dir::command())
        .subcommand(cmd_put::command())
        .subcommand(cmd_put_dir::command())
        .subcommand(cmd_del::command())
        .subcommand(cmd_rmd::command())
}

/// Split `host[:port]`, with IPv6 literals in brackets.
fn parse_server(s: &str) -> anyhow::Result<(String, Option<u16>)> {
    let parse_port = |p: &str| -> anyhow::Result<u16> {
        match p.parse::<u16>() {
            Ok(0) => Err(anyhow!("zero port is not allowed")),
            Ok(port) => Ok(port),
            Err(e) => Err(anyhow!("invalid port {p}: {e}")),
        }
    };

    if let Some(left) = s.strip_prefix('[') {
        let (host, rest) = left
            .split_once(']')
            .ok_or_else(|| anyhow!("unclosed bracket in server address {s}"))?;
        return match rest.strip_prefix(':') {
            Some(port) => Ok((host.to_string(), Some(parse_port(port)?))),
            None if rest.is_empty() => Ok((host.to_string(), None)),
            None => Err(anyhow!("invalid server address {s}")),
        };
    }

    match s.split_once(':') {
        Some((host, port)) if !port.contains(':') => {
            if host.is_empty() {
                return Err(anyhow!("empty host in server address {s}"));
            }
            Ok((host.to_string(), Some(parse_port(port)?)))
        }
        // bare ipv6 address
        _ => Ok((s.to_string(), None)),
    }
}

fn build_session_config(args: &ArgMatches) -> anyhow::Result<FtpSessionConfig> {
    let mut config = match args.get_one::<PathBuf>(GLOBAL_ARG_CONFIG) {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .context(format!("failed to read config file {}", path.display()))?;
            let doc = ezftp_yaml::load_first_doc(&content)?;
            FtpSessionConfig::parse_yaml(&doc)
                .context(format!("invalid config file {}", path.display()))?
        }
        None => FtpSessionConfig::default(),
    };

    if let Some(server) = args.get_one::<String>(GLOBAL_ARG_SERVER) {
        let (host, port) = parse_server(server)?;
        config.host = host;
        if port.is_some() {
            config.port = port;
        }
    }
    if let Some(username) = args.get_one::<String>(GLOBAL_ARG_USERNAME) {
        config.username = username.to_string();
    }
    if let Some(password) = args.get_one::<String>(GLOBAL_ARG_PASSWORD) {
        config.password = password.to_string();
    }
    if config.username.is_empty() {
        config.username = "anonymous".to_string();
        if config.password.is_empty() {
            config.password = "anonymous@".to_string();
        }
    }
    match args.get_one::<String>(GLOBAL_ARG_TLS).map(|s| s.as_str()) {
        Some("implicit") => config.security = FtpSecurityMode::ImplicitTls,
        Some("explicit") => config.security = FtpSecurityMode::ExplicitTls,
        _ => {}
    }
    if args.get_flag(GLOBAL_ARG_INSECURE) {
        config.certificate_bypass = true;
    }
    if args.get_flag(GLOBAL_ARG_CONTINUE_ON_ERROR) {
        config.batch_policy = FtpBatchPolicy::ContinueOnError;
    }
    Ok(config)
}

fn install_crypto_provider() -> anyhow::Result<()> {
    #[cfg(feature = "rustls-aws-lc")]
    let provider = rustls::crypto::aws_lc_rs::default_provider();
    #[cfg(all(feature = "rustls-ring", not(feature = "rustls-aws-lc")))]
    let provider = rustls::crypto::ring::default_provider();
    #[cfg(not(any(feature = "rustls-aws-lc", feature = "rustls-ring")))]
    compile_error!("either rustls-aws-lc or rustls-ring should be enabled");

    provider
        .install_default()
        .map_err(|_| anyhow!("failed to install the rustls crypto provider"))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
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
    logger
        .into_global_logger()
        .context("failed to setup logger")?;

    install_crypto_provider()?;

    let config = build_session_config(&args)?;
    let Some((subcommand, args)) = args.subcommand() else {
        return Err(anyhow!("no subcommand found"));
    };

    let engine = ProtoFtpEngine::new(config.client.clone());
    let mut session = FtpSession::with_config(engine, config);
    session.configure()?;
    session.connect().await?;
    if let Err(e) = session.login().await {
        let _ = session.disconnect().await;
        return Err(e.into());
    }

    let ret = match subcommand {
        cmd_list::COMMAND => cmd_list::run(&mut session, args).await,
        cmd_get::COMMAND => cmd_get::run(&mut session, args).await,
        cmd_get_dir::COMMAND => cmd_get_dir::run(&mut session, args).await,
        cmd_put::COMMAND => cmd_put::run(&mut session, args).await,
        cmd_put_dir::COMMAND => cmd_put_dir::run(&mut session, args).await,
        cmd_del::COMMAND => cmd_del::run(&mut session, args).await,
        cmd_rmd::COMMAND => cmd_rmd::run(&mut session, args).await,
        cmd => Err(anyhow!("invalid subcommand {cmd}")),
    };

    let closed = session.disconnect().await;
    merge_close_result(ret, closed)
}

/// The subcommand error wins over the one of closing the session.
fn merge_close_result(
    ret: anyhow::Result<()>,
    closed: Result<(), FtpSessionError>,
) -> anyhow::Result<()> {
    match (ret, closed) {
        (Ok(_), closed) => closed.context("failed to close the ftp session"),
        (Err(e), Ok(_)) => Err(e),
        (Err(e), Err(close_e)) => {
            log::warn!("failed to close the ftp session: {close_e}");
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_address() {
        assert_eq!(
            parse_server("ftp.example.net").unwrap(),
            ("ftp.example.net".to_string(), None)
        );
        assert_eq!(
            parse_server("ftp.example.net:2121").unwrap(),
            ("ftp.example.net".to_string(), Some(2121))
        );
        assert_eq!(
            parse_server("[::1]:990").unwrap(),
            ("::1".to_string(), Some(990))
        );
        assert_eq!(parse_server("::1").unwrap(), ("::1".to_string(), None));
        assert!(parse_server("host:0").is_err());
        assert!(parse_server("host:ftp").is_err());
        assert!(parse_server("[::1").is_err());
        assert!(parse_server(":21").is_err());
    }

    #[test]
    fn cli_config() {
        let args = build_cli_args()
            .try_get_matches_from([
                "ezftp",
                "ftp.example.net:2121",
                "-u",
                "alice",
                "-p",
                "secret",
                "--tls",
                "explicit",
                "-k",
                "list",
                "/pub",
            ])
            .unwrap();
        let config = build_session_config(&args).unwrap();
        assert_eq!(config.host, "ftp.example.net");
        assert_eq!(config.port(), 2121);
        assert_eq!(config.username, "alice");
        assert_eq!(config.security, FtpSecurityMode::ExplicitTls);
        assert!(config.certificate_bypass);
        assert_eq!(config.batch_policy, FtpBatchPolicy::AbortOnError);
    }

    #[test]
    fn keep_command_error() {
        use ezftp_session::FtpPreconditionError;

        let closed = Err(FtpSessionError::Precondition(
            FtpPreconditionError::NotConnected,
        ));
        let e = merge_close_result(Err(anyhow!("list failed")), closed).unwrap_err();
        assert_eq!(e.to_string(), "list failed");

        let closed = Err(FtpSessionError::Precondition(
            FtpPreconditionError::NotConnected,
        ));
        let e = merge_close_result(Ok(()), closed).unwrap_err();
        assert_eq!(e.to_string(), "failed to close the ftp session");

        assert!(merge_close_result(Ok(()), Ok(())).is_ok());
        assert!(merge_close_result(Err(anyhow!("get failed")), Ok(())).is_err());
    }

    #[test]
    fn anonymous_login() {
        let args = build_cli_args()
            .try_get_matches_from(["ezftp", "ftp.example.net", "rmd", "/old"])
            .unwrap();
        let config = build_session_config(&args).unwrap();
        assert_eq!(config.username, "anonymous");
        assert!(!config.password.is_empty());
        assert_eq!(config.port(), 21);
    }
}
