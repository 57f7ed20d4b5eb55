use std::io::Write;
use std::path::PathBuf;

use super::{Backend, BackendError, FormAction, Location, Navigation, Page};

/// Serves a page recorded as JSON and records every form post as one JSON
/// line in an outbox file. It never changes the listings itself.
#[derive(Debug, Clone, Default)]
pub struct SnapshotBackend {
    page: Option<PathBuf>,
    outbox: Option<PathBuf>,
}

impl SnapshotBackend {
    pub fn new(page: Option<PathBuf>, outbox: Option<PathBuf>) -> Self {
        Self { page, outbox }
    }
}

impl Backend for SnapshotBackend {
    fn load(&self, location: &Location) -> Result<Page, BackendError> {
        let Some(path) = &self.page else {
            tracing::debug!("No page snapshot, rendering an empty dashboard for {}", location);
            return Ok(Page::default());
        };

        let content = std::fs::read_to_string(path).map_err(|source| BackendError::Snapshot {
            path: path.clone(),
            source,
        })?;
        let page: Page =
            serde_json::from_str(&content).map_err(|source| BackendError::InvalidSnapshot {
                path: path.clone(),
                source,
            })?;

        tracing::info!("Loaded {} with {} listing(s)", location, page.listings.len());
        Ok(page)
    }

    fn submit(&self, navigation: &Navigation) -> Result<Location, BackendError> {
        let line = serde_json::to_string(&navigation.to_json())?;

        match &self.outbox {
            Some(path) => {
                let mut file = std::fs::OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .map_err(|source| BackendError::Outbox {
                        path: path.clone(),
                        source,
                    })?;
                writeln!(file, "{}", line).map_err(|source| BackendError::Outbox {
                    path: path.clone(),
                    source,
                })?;
            }
            None => tracing::info!("Submitted {}", line),
        }

        let redirect = match navigation.action {
            FormAction::Create => "/dashboard?success=created",
            FormAction::Update(_) | FormAction::Delete(_) => "/dashboard",
        };
        Ok(Location::parse(redirect))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_missing_snapshot_renders_empty_page() {
        let backend = SnapshotBackend::default();
        let page = backend.load(&Location::default()).unwrap();
        assert!(page.listings.is_empty());
    }

    #[test]
    fn test_invalid_snapshot_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.json");
        std::fs::write(&path, "{ listings: nope }").unwrap();

        let backend = SnapshotBackend::new(Some(path), None);
        assert!(matches!(
            backend.load(&Location::default()),
            Err(BackendError::InvalidSnapshot { .. })
        ));
    }

    #[test]
    fn test_submissions_are_appended_and_redirected() {
        let dir = tempfile::tempdir().unwrap();
        let outbox = dir.path().join("outbox.jsonl");
        let backend = SnapshotBackend::new(None, Some(outbox.clone()));

        let mut fields = BTreeMap::new();
        fields.insert("item_name".to_string(), "Millet".to_string());
        let created = backend
            .submit(&Navigation {
                action: FormAction::Create,
                fields,
            })
            .unwrap();
        let deleted = backend
            .submit(&Navigation {
                action: FormAction::Delete("42".to_string()),
                fields: BTreeMap::new(),
            })
            .unwrap();

        assert!(created.is_created_redirect());
        assert_eq!(deleted.to_string(), "/dashboard");

        let content = std::fs::read_to_string(&outbox).unwrap();
        let lines: Vec<serde_json::Value> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["action"], "/create_listing");
        assert_eq!(lines[0]["fields"]["item_name"], "Millet");
        assert_eq!(lines[1]["action"], "/delete_listing/42");
    }
}
