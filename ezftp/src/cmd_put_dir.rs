/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::path::PathBuf;

use anyhow::anyhow;
use clap::{Arg, ArgMatches, Command, value_parser};

use super::CliSession;

pub(super) const COMMAND: &str = "put-dir";

const COMMAND_ARG_LOCAL_DIR: &str = "local-dir";
const COMMAND_ARG_REMOTE_DIR: &str = "remote-dir";

pub(super) fn command() -> Command {
    Command::new(COMMAND)
        .about("Upload all regular files of a local directory")
        .arg(
            Arg::new(COMMAND_ARG_LOCAL_DIR)
                .value_name("LOCAL DIR")
                .value_parser(value_parser!(PathBuf))
                .num_args(1)
                .required(true),
        )
        .arg(
            Arg::new(COMMAND_ARG_REMOTE_DIR)
                .value_name("REMOTE DIR")
                .num_args(1)
                .required(true),
        )
}

pub(super) async fn run(session: &mut CliSession, args: &ArgMatches) -> anyhow::Result<()> {
    let local_dir = args
        .get_one::<PathBuf>(COMMAND_ARG_LOCAL_DIR)
        .ok_or_else(|| anyhow!("no local dir set"))?;
    let remote_dir = args
        .get_one::<String>(COMMAND_ARG_REMOTE_DIR)
        .ok_or_else(|| anyhow!("no remote dir set"))?;

    session.upload_directory(local_dir, remote_dir).await?;
    Ok(())
}
