pub mod snapshot;

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::app::Panel;
use crate::notice::Severity;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("cannot read page snapshot {path}: {source}")]
    Snapshot {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid page snapshot {path}: {source}")]
    InvalidSnapshot {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("cannot record submission in {path}: {source}")]
    Outbox {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("backend worker stopped: {0}")]
    Worker(String),
}

/// One food listing as the server renders it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: String,
    pub item_name: String,
    pub quantity: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default = "default_true")]
    pub is_available: bool,
    pub contact: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Listing {
    /// "12.50 USD", or "-" when there is no price
    pub fn price_label(&self) -> String {
        match self.price {
            Some(price) => format!(
                "{:.2} {}",
                price,
                self.currency.as_deref().unwrap_or(crate::form::DEFAULT_CURRENCY)
            ),
            None => "-".to_string(),
        }
    }
}

/// Server flash message carried into the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    #[serde(default = "default_category")]
    pub category: String,
    pub message: String,
}

fn default_category() -> String {
    "info".to_string()
}

impl Flash {
    pub fn severity(&self) -> Severity {
        Severity::from_category(&self.category)
    }
}

/// Everything the server rendered for the dashboard
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub listings: Vec<Listing>,
    #[serde(default)]
    pub flashes: Vec<Flash>,
    #[serde(default)]
    pub section: Panel,
    /// Values already in the create form (field name -> value)
    #[serde(default)]
    pub create_form: BTreeMap<String, String>,
}

/// Path plus query parameters of the current page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl Location {
    pub fn parse(url: &str) -> Self {
        // Drop any scheme/host and fragment, keep path + query
        let rest = match url.find("://") {
            Some(i) => {
                let after = &url[i + 3..];
                after.find('/').map(|j| &after[j..]).unwrap_or("/")
            }
            None => url,
        };
        let rest = rest.split('#').next().unwrap_or("");

        let (path, query) = match rest.split_once('?') {
            Some((path, query)) => (path, query),
            None => (rest, ""),
        };

        let query = query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| match pair.split_once('=') {
                Some((k, v)) => (decode_component(k), decode_component(v)),
                None => (decode_component(pair), String::new()),
            })
            .collect();

        Self {
            path: if path.is_empty() { "/".to_string() } else { path.to_string() },
            query,
        }
    }

    /// First value of a query parameter
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set by the server when it redirects after creating a listing
    pub fn is_created_redirect(&self) -> bool {
        self.param("success") == Some("created")
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::parse("/dashboard")
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path)?;
        for (i, (k, v)) in self.query.iter().enumerate() {
            write!(f, "{}{}={}", if i == 0 { '?' } else { '&' }, k, v)?;
        }
        Ok(())
    }
}

/// Percent-decode one query component, `+` is a space. Malformed escapes
/// are kept as typed.
fn decode_component(s: &str) -> String {
    let spaced = s.replace('+', " ");
    String::from_utf8_lossy(&urlencoding::decode_binary(spaced.as_bytes())).into_owned()
}

/// Where a form posts to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormAction {
    Create,
    Update(String),
    Delete(String),
}

impl FormAction {
    pub fn path(&self) -> String {
        match self {
            FormAction::Create => "/create_listing".to_string(),
            FormAction::Update(id) => format!("/update_listing/{}", id),
            FormAction::Delete(id) => format!("/delete_listing/{}", id),
        }
    }
}

/// A native form post that takes the user away from the current page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub action: FormAction,
    pub fields: BTreeMap<String, String>,
}

impl Navigation {
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "method": "POST",
            "action": self.action.path(),
            "fields": self.fields,
        })
    }
}

/// The server side of the dashboard: renders pages and receives form posts
pub trait Backend: Send + Sync {
    fn load(&self, location: &Location) -> Result<Page, BackendError>;

    /// Deliver a form post, returning the redirect target
    fn submit(&self, navigation: &Navigation) -> Result<Location, BackendError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_flag_among_other_params() {
        let location = Location::parse("/dashboard?foo=1&success=created");
        assert_eq!(location.path, "/dashboard");
        assert_eq!(location.param("foo"), Some("1"));
        assert!(location.is_created_redirect());
    }

    #[test]
    fn test_other_success_values_are_not_creation() {
        assert!(!Location::parse("/dashboard?success=updated").is_created_redirect());
        assert!(!Location::parse("/dashboard").is_created_redirect());
    }

    #[test]
    fn test_full_url_and_decoding() {
        let location = Location::parse("http://localhost:5000/farmer_dashboard?search=sweet+potato%21&flag#top");
        assert_eq!(location.path, "/farmer_dashboard");
        assert_eq!(location.param("search"), Some("sweet potato!"));
        assert_eq!(location.param("flag"), Some(""));
    }

    #[test]
    fn test_first_occurrence_wins() {
        let location = Location::parse("/?success=created&success=deleted");
        assert_eq!(location.param("success"), Some("created"));
    }

    #[test]
    fn test_malformed_escape_is_kept() {
        assert_eq!(decode_component("100%"), "100%");
        assert_eq!(decode_component("%zz"), "%zz");
        assert_eq!(decode_component("%2B"), "+");
    }

    #[test]
    fn test_signed_hex_is_not_an_escape() {
        let location = Location::parse("/dashboard?q=%+1&r=%-f");
        assert_eq!(location.param("q"), Some("% 1"));
        assert_eq!(location.param("r"), Some("%-f"));
    }

    #[test]
    fn test_price_label() {
        let mut listing = Listing {
            id: "l1".to_string(),
            item_name: "Plantain".to_string(),
            quantity: "2 bunches".to_string(),
            price: Some(12.5),
            currency: None,
            is_available: true,
            contact: "0803".to_string(),
            created_at: None,
        };
        assert_eq!(listing.price_label(), "12.50 USD");
        listing.price = None;
        assert_eq!(listing.price_label(), "-");
    }

    #[test]
    fn test_page_snapshot_defaults() {
        let page: Page = serde_json::from_str(
            r#"{"listings":[{"id":"a","item_name":"Okra","quantity":"1kg","contact":"x"}],
                "flashes":[{"message":"Welcome back"}]}"#,
        )
        .unwrap();
        assert!(page.listings[0].is_available);
        assert_eq!(page.flashes[0].severity(), Severity::Info);
        assert_eq!(page.section, Panel::Create);
    }
}
