//! Request-side models for the proxy API
//!
//! Query parameters are kept as ordered pairs so they can be forwarded exactly
//! as received while still producing an order-independent cache key.

use url::form_urlencoded;

/// Name of the proxy-only parameter that selects the explorer path
pub const ENDPOINT_PARAM: &str = "endpoint";

/// Query parameters of an incoming proxy request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new(pairs: Vec<(String, String)>) -> Self {
        Self { pairs }
    }

    /// Pairs in the order the client sent them.
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Removes every occurrence of `name`, returning the first value.
    pub fn take(&mut self, name: &str) -> Option<String> {
        let first = self.get(name).map(str::to_string);
        self.pairs.retain(|(key, _)| key != name);
        first
    }

    /// Form-encoded query with pairs sorted by name, then value.
    pub fn canonical(&self) -> String {
        let mut sorted: Vec<&(String, String)> = self.pairs.iter().collect();
        sorted.sort();

        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(sorted)
            .finish()
    }

    /// Cache key for a request on `path` carrying these parameters.
    pub fn cache_key(&self, path: &str) -> String {
        if self.pairs.is_empty() {
            path.to_string()
        } else {
            format!("{}?{}", path, self.canonical())
        }
    }
}

impl From<Vec<(String, String)>> for QueryParams {
    fn from(pairs: Vec<(String, String)>) -> Self {
        Self::new(pairs)
    }
}
