/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::path::PathBuf;

use anyhow::anyhow;
use clap::{Arg, ArgMatches, Command, value_parser};

use super::CliSession;

pub(super) const COMMAND: &str = "put";

const COMMAND_ARG_LOCAL_FILE: &str = "local-file";
const COMMAND_ARG_REMOTE_DIR: &str = "remote-dir";

pub(super) fn command() -> Command {
    Command::new(COMMAND)
        .about("Upload a local file")
        .arg(
            Arg::new(COMMAND_ARG_LOCAL_FILE)
                .value_name("LOCAL FILE")
                .value_parser(value_parser!(PathBuf))
                .num_args(1)
                .required(true),
        )
        .arg(
            Arg::new(COMMAND_ARG_REMOTE_DIR)
                .value_name("REMOTE DIR")
                .num_args(1)
                .default_value("/"),
        )
}

pub(super) async fn run(session: &mut CliSession, args: &ArgMatches) -> anyhow::Result<()> {
    let local_file = args
        .get_one::<PathBuf>(COMMAND_ARG_LOCAL_FILE)
        .ok_or_else(|| anyhow!("no local file set"))?;
    let remote_dir = args
        .get_one::<String>(COMMAND_ARG_REMOTE_DIR)
        .map(|s| s.as_str())
        .unwrap_or("/");

    session.upload_file(local_file, remote_dir).await?;
    Ok(())
}
