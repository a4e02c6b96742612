//! Word source backed by the random words API.

use crate::{debug_log, info_log};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "https://random-words-api.kushcreates.com/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("the combination {language}/{category} does not exist, try another one")]
    InvalidSelection { language: String, category: String },
    #[error("word service unavailable: {0}")]
    ServiceUnavailable(#[from] ServiceFailure),
}

#[derive(Debug, Error)]
pub enum ServiceFailure {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("malformed response: {0}")]
    Json(#[from] serde_json::Error),
    #[error("the service offered no words")]
    Empty,
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        Self::ServiceUnavailable(ServiceFailure::Http(err))
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        Self::ServiceUnavailable(ServiceFailure::Json(err))
    }
}

/// One word as returned by the service.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct WordEntry {
    pub word: String,
    #[serde(default)]
    pub length: Option<u32>,
    pub category: String,
    pub language: String,
}

/// Languages and categories offered by the service.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Catalog {
    pub languages: BTreeSet<String>,
    pub categories: BTreeSet<String>,
}

/// A language/category pair picked by the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selection {
    pub language: String,
    pub category: String,
}

impl Selection {
    pub fn new(language: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            category: category.into(),
        }
    }
}

pub trait WordProvider {
    /// # Errors
    /// `ServiceUnavailable` when the listing cannot be fetched or parsed.
    fn categories_and_languages(&self) -> Result<Catalog, ProviderError>;

    /// # Errors
    /// `InvalidSelection` when the service has no words for the pair,
    /// `ServiceUnavailable` when the call itself fails.
    fn random_word(&self, language: &str, category: &str) -> Result<String, ProviderError>;
}

/// Collect the unique languages and categories from a full listing.
///
/// # Errors
/// Fails if `body` is not a JSON list of words or the list is empty.
pub fn parse_catalog(body: &str) -> Result<Catalog, ProviderError> {
    let entries: Vec<WordEntry> = serde_json::from_str(body)?;
    if entries.is_empty() {
        return Err(ServiceFailure::Empty.into());
    }
    let mut catalog = Catalog::default();
    for entry in entries {
        catalog.languages.insert(entry.language);
        catalog.categories.insert(entry.category);
    }
    Ok(catalog)
}

/// Parse the answer to a word request.
///
/// The service answers `null` for pairs it does not know; an empty list is
/// treated the same way. Words without a single letter cannot be played and
/// are dropped.
///
/// # Errors
/// `InvalidSelection` for `null`, `[]` or a list with no playable word,
/// `ServiceUnavailable` for anything that is not a list of words.
pub fn parse_word_entries(body: &str, selection: &Selection) -> Result<Vec<WordEntry>, ProviderError> {
    let entries: Vec<WordEntry> = serde_json::from_str::<Option<Vec<WordEntry>>>(body)?
        .unwrap_or_default()
        .into_iter()
        .filter(|entry| entry.word.chars().any(char::is_alphabetic))
        .collect();
    if entries.is_empty() {
        return Err(ProviderError::InvalidSelection {
            language: selection.language.clone(),
            category: selection.category.clone(),
        });
    }
    Ok(entries)
}

/// Pick one word uniformly at random.
pub fn choose_word<R: Rng + ?Sized>(entries: &[WordEntry], rng: &mut R) -> Option<String> {
    entries.choose(rng).map(|entry| entry.word.clone())
}

/// [`WordProvider`] that talks to the HTTP API with a blocking client.
pub struct ApiWordProvider {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl ApiWordProvider {
    /// # Errors
    /// Fails if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ProviderError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn get(&self, query: &[(&str, &str)]) -> Result<String, ProviderError> {
        debug_log!("GET {} {:?}", self.base_url, query);
        let response = self
            .client
            .get(&self.base_url)
            .query(query)
            .send()?
            .error_for_status()?;
        Ok(response.text()?)
    }
}

impl WordProvider for ApiWordProvider {
    fn categories_and_languages(&self) -> Result<Catalog, ProviderError> {
        let body = self.get(&[])?;
        let catalog = parse_catalog(&body)?;
        info_log!(
            "Catalog loaded: {} languages, {} categories",
            catalog.languages.len(),
            catalog.categories.len()
        );
        Ok(catalog)
    }

    fn random_word(&self, language: &str, category: &str) -> Result<String, ProviderError> {
        let selection = Selection::new(language.trim(), category.trim());
        if selection.language.is_empty() || selection.category.is_empty() {
            return Err(ProviderError::InvalidSelection {
                language: selection.language,
                category: selection.category,
            });
        }

        let body = self.get(&[
            ("language", selection.language.as_str()),
            ("category", selection.category.as_str()),
        ])?;
        let entries = parse_word_entries(&body, &selection)?;
        info_log!(
            "{} words for {}/{}",
            entries.len(),
            selection.language,
            selection.category
        );
        choose_word(&entries, &mut rand::thread_rng()).ok_or(ServiceFailure::Empty.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const LISTING: &str = r#"[
        {"word": "cat", "length": 3, "category": "animals", "language": "en"},
        {"word": "dog", "length": 3, "category": "animals", "language": "en"},
        {"word": "pera", "length": 4, "category": "food", "language": "es"},
        {"word": "apple", "length": 5, "category": "food", "language": "en"}
    ]"#;

    fn selection() -> Selection {
        Selection::new("en", "animals")
    }

    #[test]
    fn test_parse_catalog_deduplicates() {
        let catalog = parse_catalog(LISTING).unwrap();
        assert_eq!(
            catalog.languages.iter().collect::<Vec<_>>(),
            vec!["en", "es"]
        );
        assert_eq!(
            catalog.categories.iter().collect::<Vec<_>>(),
            vec!["animals", "food"]
        );
    }

    #[test]
    fn test_parse_catalog_empty_is_unavailable() {
        let err = parse_catalog("[]").unwrap_err();
        assert!(matches!(
            err,
            ProviderError::ServiceUnavailable(ServiceFailure::Empty)
        ));
    }

    #[test]
    fn test_parse_catalog_garbage_is_unavailable() {
        let err = parse_catalog("<html>bad gateway</html>").unwrap_err();
        assert!(matches!(
            err,
            ProviderError::ServiceUnavailable(ServiceFailure::Json(_))
        ));
    }

    #[test]
    fn test_parse_word_entries_null_is_invalid_selection() {
        match parse_word_entries("null", &selection()) {
            Err(ProviderError::InvalidSelection { language, category }) => {
                assert_eq!(language, "en");
                assert_eq!(category, "animals");
            }
            other => panic!("Expected InvalidSelection, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_word_entries_empty_is_invalid_selection() {
        assert!(matches!(
            parse_word_entries("[]", &selection()),
            Err(ProviderError::InvalidSelection { .. })
        ));
    }

    #[test]
    fn test_parse_word_entries_without_letters_is_invalid_selection() {
        let body = r#"[
            {"word": "42", "length": 2, "category": "animals", "language": "en"},
            {"word": "  ", "length": 2, "category": "animals", "language": "en"}
        ]"#;
        assert!(matches!(
            parse_word_entries(body, &selection()),
            Err(ProviderError::InvalidSelection { .. })
        ));
    }

    #[test]
    fn test_parse_word_entries_drops_unplayable_words() {
        let body = r#"[
            {"word": "42", "length": 2, "category": "animals", "language": "en"},
            {"word": "cat", "length": 3, "category": "animals", "language": "en"}
        ]"#;
        let entries = parse_word_entries(body, &selection()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].word, "cat");
    }

    #[test]
    fn test_parse_word_entries_wrong_shape_is_unavailable() {
        assert!(matches!(
            parse_word_entries(r#"{"error": "oops"}"#, &selection()),
            Err(ProviderError::ServiceUnavailable(_))
        ));
    }

    #[test]
    fn test_parse_word_entries_without_length() {
        let entries = parse_word_entries(
            r#"[{"word": "gato", "category": "animals", "language": "es"}]"#,
            &selection(),
        )
        .unwrap();
        assert_eq!(entries[0].word, "gato");
        assert_eq!(entries[0].length, None);
    }

    #[test]
    fn test_choose_word_picks_from_entries() {
        let entries = parse_word_entries(LISTING, &selection()).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..20 {
            let word = choose_word(&entries, &mut rng).unwrap();
            assert!(entries.iter().any(|e| e.word == word));
        }
        assert_eq!(choose_word(&[], &mut rng), None);
    }

    #[test]
    fn test_blank_selection_rejected_without_request() {
        // Unroutable URL: the check must happen before any request is sent
        let provider =
            ApiWordProvider::new("http://127.0.0.1:9/api", Duration::from_secs(1)).unwrap();
        assert!(matches!(
            provider.random_word("  ", "animals"),
            Err(ProviderError::InvalidSelection { .. })
        ));
        assert!(matches!(
            provider.random_word("en", ""),
            Err(ProviderError::InvalidSelection { .. })
        ));
    }

    #[test]
    fn test_unreachable_service_is_unavailable() {
        let provider =
            ApiWordProvider::new("http://127.0.0.1:9/api", Duration::from_secs(2)).unwrap();
        assert!(matches!(
            provider.categories_and_languages(),
            Err(ProviderError::ServiceUnavailable(ServiceFailure::Http(_)))
        ));
        assert!(matches!(
            provider.random_word("en", "animals"),
            Err(ProviderError::ServiceUnavailable(ServiceFailure::Http(_)))
        ));
    }

    #[test]
    fn test_error_messages() {
        let err = ProviderError::InvalidSelection {
            language: "xx".to_string(),
            category: "animals".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "the combination xx/animals does not exist, try another one"
        );
        let err: ProviderError = ServiceFailure::Empty.into();
        assert_eq!(
            err.to_string(),
            "word service unavailable: the service offered no words"
        );
    }
}
