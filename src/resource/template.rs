//! Templates: declared file content at a destination path.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::{Result, StewardError};

use super::Reconcile;
use super::status::Status;

/// Default value recorded when the destination file does not exist yet.
const FILE_MISSING: &str = "<file-missing>";

/// A file whose content is declared in configuration.
///
/// Content is compared and written literally; evaluating a templating
/// language over it is a separate concern.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Template {
    /// Template name, taken from the block label.
    #[serde(skip)]
    pub name: String,
    /// Declared file content.
    #[serde(default)]
    pub content: String,
    /// Destination path the content belongs at.
    #[serde(default)]
    pub destination: String,
}

#[async_trait]
impl Reconcile for Template {
    fn name(&self) -> &str {
        &self.name
    }

    async fn check(&self) -> Result<Status> {
        let mut status = Status::new(&self.name);

        match tokio::fs::read_to_string(&self.destination).await {
            Ok(existing) => {
                status.add_difference("content", existing, &self.content, "");
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                status.add_difference("content", "", &self.content, FILE_MISSING);
            }
            Err(e) => return Err(e.into()),
        }

        status.settle();
        Ok(status)
    }

    async fn apply(&self) -> Result<()> {
        tokio::fs::write(&self.destination, &self.content)
            .await
            .map_err(|source| StewardError::TemplateWrite {
                name: self.name.clone(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template_at(dir: &tempfile::TempDir, content: &str) -> Template {
        Template {
            name: String::from("motd"),
            content: content.to_string(),
            destination: dir
                .path()
                .join("motd")
                .to_string_lossy()
                .into_owned(),
        }
    }

    #[tokio::test]
    async fn test_missing_destination_will_change() {
        let dir = tempfile::tempdir().unwrap();
        let template = template_at(&dir, "hello\n");

        let status = template.check().await.unwrap();
        assert!(status.will_change);
        assert_eq!(status.differences[0].default, FILE_MISSING);
    }

    #[tokio::test]
    async fn test_matching_destination_is_converged() {
        let dir = tempfile::tempdir().unwrap();
        let template = template_at(&dir, "hello\n");
        template.apply().await.unwrap();

        let status = template.check().await.unwrap();
        assert!(!status.will_change);
        assert!(status.differences.iter().all(|d| !d.changed()));
    }

    #[tokio::test]
    async fn test_apply_overwrites_stale_content() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("motd"), "old").await.unwrap();
        let template = template_at(&dir, "new");

        let status = template.check().await.unwrap();
        assert!(status.will_change);

        template.apply().await.unwrap();
        let written = tokio::fs::read_to_string(dir.path().join("motd")).await.unwrap();
        assert_eq!(written, "new");
    }
}
