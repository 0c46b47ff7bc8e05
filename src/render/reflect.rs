//! Query text reflection into the page address

use super::traits::UrlReflector;
use parking_lot::Mutex;
use url::Url;

/// Rewrites one query parameter of the page URL with the current search text
pub struct QueryParamReflector {
    param: String,
    current: Mutex<Url>,
}

impl QueryParamReflector {
    pub fn new(page_url: &str, param: impl Into<String>) -> Result<Self, url::ParseError> {
        Ok(Self {
            param: param.into(),
            current: Mutex::new(Url::parse(page_url)?),
        })
    }

    /// Address as of the last reflected query
    pub fn current_url(&self) -> Url {
        self.current.lock().clone()
    }
}

impl UrlReflector for QueryParamReflector {
    fn reflect_query(&self, query: &str) {
        let mut url = self.current.lock();

        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| *key != self.param.as_str())
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();

        url.set_query(None);
        if kept.is_empty() && query.is_empty() {
            return;
        }

        let mut pairs = url.query_pairs_mut();
        pairs.extend_pairs(kept);
        if !query.is_empty() {
            pairs.append_pair(&self.param, query);
        }
    }
}
