use std::path::PathBuf;

use crate::{auth::token::Token, error::Result};

/// JSON file holding the last known token.
#[derive(Debug, Clone)]
pub struct TokenCache {
    path: PathBuf,
}

impl TokenCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Reads the cached token. A missing file yields `None`.
    pub async fn load(&self) -> Result<Option<Token>> {
        let content = match async_fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let token: Token = serde_json::from_str(&content)?;
        Ok(Some(token))
    }

    pub async fn persist(&self, token: &Token) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(token)?;
        async_fs::write(&self.path, json).await?;
        Ok(())
    }

    pub async fn clear(&self) -> Result<()> {
        match async_fs::remove_file(&self.path).await {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("spotapi-test-{}-{name}", std::process::id()));
        path.push("token.json");
        path
    }

    #[tokio::test]
    async fn test_persist_then_load() {
        let cache = TokenCache::new(temp_path("roundtrip"));
        let token = Token::new(
            "access",
            Utc::now() + Duration::seconds(3600),
            Some("refresh".to_string()),
            vec!["user-read-private".to_string()],
        );

        cache.persist(&token).await.unwrap();
        let loaded = cache.load().await.unwrap();
        assert_eq!(loaded, Some(token));

        cache.clear().await.unwrap();
        assert_eq!(cache.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_missing_file_is_none() {
        let cache = TokenCache::new(temp_path("missing"));
        assert!(cache.load().await.unwrap().is_none());
        cache.clear().await.unwrap();
    }
}
