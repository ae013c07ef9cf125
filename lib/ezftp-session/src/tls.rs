/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::sync::Arc;

use log::{debug, warn};
use rustls::crypto::CryptoProvider;
use rustls::{ClientConfig, RootCertStore};

use crate::{FtpConfigError, FtpSessionConfig};

#[cfg(feature = "rustls-aws-lc")]
fn fallback_provider() -> Option<CryptoProvider> {
    Some(rustls::crypto::aws_lc_rs::default_provider())
}

#[cfg(all(feature = "rustls-ring", not(feature = "rustls-aws-lc")))]
fn fallback_provider() -> Option<CryptoProvider> {
    Some(rustls::crypto::ring::default_provider())
}

#[cfg(not(any(feature = "rustls-ring", feature = "rustls-aws-lc")))]
fn fallback_provider() -> Option<CryptoProvider> {
    None
}

/// The process default provider if one is installed, else the one selected
/// by cargo features.
fn crypto_provider() -> Result<Arc<CryptoProvider>, FtpConfigError> {
    if let Some(provider) = CryptoProvider::get_default() {
        return Ok(provider.clone());
    }
    fallback_provider()
        .map(Arc::new)
        .ok_or(FtpConfigError::NoCryptoProvider)
}

fn load_native_roots() -> Result<RootCertStore, FtpConfigError> {
    let result = rustls_native_certs::load_native_certs();
    for e in &result.errors {
        warn!("error when loading native root certificates: {e}");
    }
    if result.certs.is_empty() {
        if let Some(e) = result.errors.into_iter().next() {
            return Err(FtpConfigError::LoadNativeCerts(e));
        }
        return Err(FtpConfigError::NoRootCertificate);
    }

    let mut roots = RootCertStore::empty();
    let (added, ignored) = roots.add_parsable_certificates(result.certs);
    debug!("{added} native root certificates added, {ignored} ignored");
    if added == 0 {
        return Err(FtpConfigError::NoRootCertificate);
    }
    Ok(roots)
}

/// Build the TLS client config for the session, `None` for plain FTP.
pub(crate) fn build_client_config(
    config: &FtpSessionConfig,
) -> Result<Option<Arc<ClientConfig>>, FtpConfigError> {
    if !config.security.is_tls() {
        if config.certificate_bypass {
            warn!(
                "certificate bypass has no effect on plain ftp connection to {}",
                config.host
            );
        }
        return Ok(None);
    }

    let provider = crypto_provider()?;
    let builder = ClientConfig::builder_with_provider(provider.clone())
        .with_safe_default_protocol_versions()
        .map_err(FtpConfigError::UnsupportedProtocolVersions)?;

    let client_config = if config.certificate_bypass {
        if cfg!(feature = "deny-insecure-trust") {
            return Err(FtpConfigError::InsecureTrustDenied);
        }
        warn!(
            "certificate verification for {} is disabled, the server identity will not be checked",
            config.host
        );
        builder
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(crate::InsecureTrustPolicy::new(provider)))
            .with_no_client_auth()
    } else {
        builder
            .with_root_certificates(load_native_roots()?)
            .with_no_client_auth()
    };

    Ok(Some(Arc::new(client_config)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FtpSecurityMode;

    #[test]
    fn plain_no_tls() {
        let mut config = FtpSessionConfig::new("ftp.example.net", "u", "p");
        config.certificate_bypass = true;
        assert!(build_client_config(&config).unwrap().is_none());
    }

    #[cfg(all(
        any(feature = "rustls-ring", feature = "rustls-aws-lc"),
        not(feature = "deny-insecure-trust")
    ))]
    #[test]
    fn bypass() {
        let mut config = FtpSessionConfig::new("ftp.example.net", "u", "p");
        config.security = FtpSecurityMode::ExplicitTls;
        config.certificate_bypass = true;
        assert!(build_client_config(&config).unwrap().is_some());
    }

    #[cfg(feature = "deny-insecure-trust")]
    #[test]
    fn bypass_denied() {
        let mut config = FtpSessionConfig::new("ftp.example.net", "u", "p");
        config.security = FtpSecurityMode::ImplicitTls;
        config.certificate_bypass = true;
        assert!(matches!(
            build_client_config(&config),
            Err(FtpConfigError::InsecureTrustDenied)
        ));
    }
}
