/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::str::FromStr;

use anyhow::{Context, anyhow};
use yaml_rust::Yaml;

use ezftp_proto::FtpClientConfig;

use super::{FtpBatchPolicy, FtpSecurityMode, FtpSessionConfig};

impl FtpSessionConfig {
    pub fn parse_yaml(value: &Yaml) -> anyhow::Result<Self> {
        if let Yaml::Hash(map) = value {
            let mut config = FtpSessionConfig::default();
            ezftp_yaml::foreach_kv(map, |k, v| match ezftp_yaml::normalize_key(k).as_str() {
                "host" | "server" => {
                    config.host = ezftp_yaml::value::as_string(v)
                        .context(format!("invalid string value for key {k}"))?;
                    Ok(())
                }
                "port" => {
                    let port = ezftp_yaml::value::as_u16(v)
                        .context(format!("invalid u16 value for key {k}"))?;
                    if port == 0 {
                        return Err(anyhow!("zero port is not allowed"));
                    }
                    config.port = Some(port);
                    Ok(())
                }
                "username" | "user" => {
                    config.username = ezftp_yaml::value::as_string(v)
                        .context(format!("invalid string value for key {k}"))?;
                    Ok(())
                }
                "password" | "pass" => {
                    config.password = ezftp_yaml::value::as_string(v)
                        .context(format!("invalid string value for key {k}"))?;
                    Ok(())
                }
                "security" | "tls" => {
                    let s = ezftp_yaml::value::as_string(v)
                        .context(format!("invalid string value for key {k}"))?;
                    config.security = FtpSecurityMode::from_str(&s)
                        .map_err(|_| anyhow!("invalid security mode {s}"))?;
                    Ok(())
                }
                "certificate_bypass" | "insecure" => {
                    config.certificate_bypass = ezftp_yaml::value::as_bool(v)
                        .context(format!("invalid bool value for key {k}"))?;
                    Ok(())
                }
                "batch_policy" => {
                    let s = ezftp_yaml::value::as_string(v)
                        .context(format!("invalid string value for key {k}"))?;
                    config.batch_policy = FtpBatchPolicy::from_str(&s)
                        .map_err(|_| anyhow!("invalid batch policy {s}"))?;
                    Ok(())
                }
                "client" => {
                    config.client = FtpClientConfig::parse_yaml(v)
                        .context(format!("invalid ftp client config value for key {k}"))?;
                    Ok(())
                }
                _ => Err(anyhow!("invalid key {k}")),
            })?;
            Ok(config)
        } else {
            Err(anyhow!("invalid yaml type"))
        }
    }
}
