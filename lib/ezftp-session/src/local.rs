/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2023-2025 ByteDance and/or its affiliates.
 */

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

/// Local filesystem access needed by the directory operations.
#[async_trait]
pub trait LocalFileSystem: Send + Sync {
    /// Regular files directly inside `dir`, sorted by path.
    async fn list_regular_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>>;
    async fn is_file(&self, path: &Path) -> bool;
    async fn is_dir(&self, path: &Path) -> bool;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct TokioLocalFileSystem;

#[async_trait]
impl LocalFileSystem for TokioLocalFileSystem {
    async fn list_regular_files(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        let mut read_dir = tokio::fs::read_dir(dir).await?;
        while let Some(entry) = read_dir.next_entry().await? {
            // symlinks to regular files are followed
            if tokio::fs::metadata(entry.path())
                .await
                .map(|m| m.is_file())
                .unwrap_or(false)
            {
                files.push(entry.path());
            }
        }
        files.sort();
        Ok(files)
    }

    async fn is_file(&self, path: &Path) -> bool {
        tokio::fs::metadata(path)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false)
    }

    async fn is_dir(&self, path: &Path) -> bool {
        tokio::fs::metadata(path)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn list_files() {
        let dir = std::env::temp_dir().join(format!("ezftp-local-{}", std::process::id()));
        tokio::fs::create_dir_all(dir.join("sub")).await.unwrap();
        tokio::fs::write(dir.join("b.txt"), b"b").await.unwrap();
        tokio::fs::write(dir.join("a.txt"), b"a").await.unwrap();

        let fs = TokioLocalFileSystem;
        let files = fs.list_regular_files(&dir).await.unwrap();
        assert_eq!(files, vec![dir.join("a.txt"), dir.join("b.txt")]);
        assert!(fs.is_dir(&dir).await);
        assert!(!fs.is_dir(&dir.join("a.txt")).await);
        assert!(fs.is_file(&dir.join("a.txt")).await);
        assert!(!fs.is_file(&dir.join("sub")).await);
        assert!(!fs.is_file(&dir.join("missing")).await);
        assert!(fs.list_regular_files(&dir.join("missing")).await.is_err());

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
