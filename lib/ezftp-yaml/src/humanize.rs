/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::str::FromStr;
use std::time::Duration;

use anyhow::anyhow;
use humanize_rs::ParseError;
use humanize_rs::bytes::Bytes;
use yaml_rust::Yaml;

pub fn as_usize(v: &Yaml) -> anyhow::Result<usize> {
    match v {
        Yaml::String(value) => {
            let v = value.parse::<Bytes>()?;
            Ok(v.size())
        }
        Yaml::Integer(value) => Ok(usize::try_from(*value)?),
        _ => Err(anyhow!(
            "yaml value type for humanize usize should be 'string' or 'integer'"
        )),
    }
}

pub fn as_duration(v: &Yaml) -> anyhow::Result<Duration> {
    match v {
        Yaml::String(value) => match humanize_rs::duration::parse(value) {
            Ok(v) => Ok(v),
            Err(ParseError::MissingUnit) => {
                if let Ok(u) = u64::from_str(value) {
                    Ok(Duration::from_secs(u))
                } else if let Ok(f) = f64::from_str(value) {
                    Duration::try_from_secs_f64(f).map_err(anyhow::Error::new)
                } else {
                    Err(anyhow!("invalid duration string"))
                }
            }
            Err(e) => Err(anyhow!("invalid humanize duration string: {e}")),
        },
        Yaml::Integer(value) => {
            let u = u64::try_from(*value).map_err(|_| anyhow!("negative duration value"))?;
            Ok(Duration::from_secs(u))
        }
        Yaml::Real(s) => {
            let f = f64::from_str(s).map_err(|e| anyhow!("invalid f64 value: {e}"))?;
            Duration::try_from_secs_f64(f).map_err(anyhow::Error::new)
        }
        _ => Err(anyhow!(
            "yaml value type for humanize duration should be 'string' or 'integer' or 'real'"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn t_usize() {
        assert_eq!(as_usize(&Yaml::String("1K".to_string())).unwrap(), 1000);
        assert_eq!(as_usize(&Yaml::String("1KiB".to_string())).unwrap(), 1024);
        assert_eq!(as_usize(&Yaml::Integer(2048)).unwrap(), 2048);
        assert!(as_usize(&Yaml::Integer(-1)).is_err());
    }

    #[test]
    fn t_duration() {
        let v = Yaml::String("30s".to_string());
        assert_eq!(as_duration(&v).unwrap(), Duration::from_secs(30));

        let v = Yaml::String("2".to_string());
        assert_eq!(as_duration(&v).unwrap(), Duration::from_secs(2));

        let v = Yaml::Real("1.5".to_string());
        assert_eq!(as_duration(&v).unwrap(), Duration::from_millis(1500));

        let v = Yaml::Integer(-3);
        assert!(as_duration(&v).is_err());
    }
}
