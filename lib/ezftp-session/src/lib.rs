/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

mod config;
pub use config::{FtpBatchPolicy, FtpSecurityMode, FtpSessionConfig};

mod error;
pub use error::{FtpConfigError, FtpPreconditionError, FtpSessionError};

mod engine;
pub use engine::{FtpEngine, FtpEngineError, FtpRemoteEntry, FtpRemoteEntryKind, ProtoFtpEngine};

mod local;
pub use local::{LocalFileSystem, TokioLocalFileSystem};

pub mod path;

mod tls;
mod trust;
pub use trust::InsecureTrustPolicy;

mod session;
pub use session::{FtpSession, FtpSessionPhase, FtpTransferDirection, FtpTransferRequest};

#[cfg(test)]
mod mock;
