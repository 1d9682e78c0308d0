//! Comic Vine response envelope.
//!
//! Every Comic Vine response wraps its payload in the same envelope. Only the
//! fields below are read; everything inside `results` is passed through.

use gateway::{CatalogError, CatalogRecord, SearchPage};
use serde::Deserialize;
use serde_json::Value;

/// Envelope `status_code` meaning success.
const STATUS_OK: i64 = 1;

#[derive(Debug, Deserialize)]
pub(crate) struct Envelope {
    #[serde(default)]
    status_code: Option<i64>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    number_of_total_results: Option<Value>,
    #[serde(default)]
    results: Option<Value>,
}

impl Envelope {
    /// Fails if the catalog reported an application-level error.
    ///
    /// An absent `status_code` is accepted.
    pub(crate) fn check_status(&self) -> Result<(), CatalogError> {
        match self.status_code {
            Some(code) if code != STATUS_OK => Err(CatalogError::Rejected {
                code,
                message: self.error.clone().unwrap_or_default(),
            }),
            _ => Ok(()),
        }
    }

    /// Search payload: `results` must be a list. The total may be missing or
    /// sent as a numeric string.
    pub(crate) fn into_search_page(self) -> Result<SearchPage, CatalogError> {
        let total = self.number_of_total_results.as_ref().and_then(count);
        match self.results {
            Some(Value::Array(results)) => Ok(SearchPage { results, total }),
            Some(_) => Err(CatalogError::Malformed("search results are not a list".into())),
            None => Err(CatalogError::Malformed("search results are missing".into())),
        }
    }

    /// Detail payload: any non-null `results` value.
    pub(crate) fn into_record(self) -> Result<CatalogRecord, CatalogError> {
        self.results
            .map(CatalogRecord::new)
            .ok_or_else(|| CatalogError::Malformed("detail record is missing".into()))
    }
}

fn count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn envelope(value: Value) -> Envelope {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn non_ok_status_code_is_rejected_with_catalog_message() {
        let env = envelope(json!({"status_code": 101, "error": "Object Not Found", "results": []}));
        assert_eq!(
            env.check_status(),
            Err(CatalogError::Rejected {
                code: 101,
                message: "Object Not Found".into()
            })
        );
        assert_eq!(envelope(json!({"status_code": 1})).check_status(), Ok(()));
        assert_eq!(envelope(json!({})).check_status(), Ok(()));
    }

    #[test]
    fn total_accepts_numbers_and_numeric_strings() {
        let page = envelope(json!({"results": [], "number_of_total_results": "45"}))
            .into_search_page()
            .unwrap();
        assert_eq!(page.total, Some(45));

        let page = envelope(json!({"results": [], "number_of_total_results": -3}))
            .into_search_page()
            .unwrap();
        assert_eq!(page.total, None);
    }

    #[test]
    fn null_results_are_missing() {
        assert!(matches!(
            envelope(json!({"results": null})).into_record(),
            Err(CatalogError::Malformed(_))
        ));
        assert!(matches!(
            envelope(json!({"results": null})).into_search_page(),
            Err(CatalogError::Malformed(_))
        ));
    }
}
