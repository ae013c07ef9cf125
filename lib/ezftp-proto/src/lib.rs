/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

mod config;
pub use config::{FtpClientConfig, FtpControlConfig, FtpTransferConfig};

mod control;
pub use control::FtpCommand;

pub mod error;

mod facts;
pub use facts::{FtpFileEntryType, FtpFileFacts};

mod transfer;
pub use transfer::{FtpLineDataReceiver, FtpTransferType};

mod stream;
pub use stream::FtpStream;

mod client;
pub use client::{FtpClient, FtpControlSecurity};

pub mod debug;
mod io;
