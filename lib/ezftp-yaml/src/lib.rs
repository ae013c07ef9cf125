/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use anyhow::{Context, anyhow};
use yaml_rust::{Yaml, YamlLoader, yaml};

pub mod humanize;
pub mod value;

pub fn foreach_kv<F>(table: &yaml::Hash, mut f: F) -> anyhow::Result<()>
where
    F: FnMut(&str, &Yaml) -> anyhow::Result<()>,
{
    for (k, v) in table.iter() {
        if let Yaml::String(key) = k {
            f(key, v).context(format!("failed to parse value of key {key}"))?;
        } else {
            return Err(anyhow!("key in hash should be string"));
        }
    }
    Ok(())
}

pub fn normalize_key(raw: &str) -> String {
    raw.to_lowercase().replace('-', "_")
}

/// Load the first document of a yaml string.
pub fn load_first_doc(s: &str) -> anyhow::Result<Yaml> {
    let mut docs = YamlLoader::load_from_str(s).map_err(|e| anyhow!("invalid yaml: {e}"))?;
    if docs.is_empty() {
        Err(anyhow!("no yaml document found"))
    } else {
        Ok(docs.swap_remove(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn foreach_kv_ok() {
        let doc = load_first_doc("a: 1\nb: 2").unwrap();
        let hash = doc.as_hash().unwrap();
        let mut result = Vec::new();
        foreach_kv(hash, |k, v| {
            result.push((k.to_owned(), v.as_i64().unwrap()));
            Ok(())
        })
        .unwrap();
        assert_eq!(result, vec![("a".to_string(), 1), ("b".to_string(), 2)]);
    }

    #[test]
    fn foreach_kv_non_string_key() {
        let doc = load_first_doc("123: 1").unwrap();
        let hash = doc.as_hash().unwrap();
        assert!(foreach_kv(hash, |_, _| Ok(())).is_err());
    }

    #[test]
    fn normalize() {
        assert_eq!(normalize_key("Abc"), "abc");
        assert_eq!(normalize_key("A-B_C"), "a_b_c");
    }

    #[test]
    fn empty_doc() {
        assert!(load_first_doc("").is_err());
    }
}
