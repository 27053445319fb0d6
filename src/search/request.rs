use url::form_urlencoded;

pub const DEFAULT_BASE_URL: &str = "https://api.elsevier.com/content/search/";

/// A query against one search index. The request URI is fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    query: String,
    index_label: String,
    uri: String,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, index_label: impl Into<String>) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, query, index_label)
    }

    /// Same as [`SearchRequest::new`] but against another host (e.g. a proxy or mock server).
    pub fn with_base_url(
        base_url: &str,
        query: impl Into<String>,
        index_label: impl Into<String>,
    ) -> Self {
        let query = query.into();
        let index_label = index_label.into();
        let separator = if base_url.ends_with('/') { "" } else { "/" };
        let uri = format!(
            "{}{}{}?query={}",
            base_url,
            separator,
            index_label,
            encode_query(&query)
        );

        Self {
            query,
            index_label,
            uri,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn index_label(&self) -> &str {
        &self.index_label
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }
}

/// Form-style percent encoding: spaces become `+`. Only `A-Za-z0-9_.-~` stay
/// literal, so the Scopus wildcard `*` is escaped as `%2A`.
fn encode_query(query: &str) -> String {
    let mut encoded = String::with_capacity(query.len());
    for chunk in form_urlencoded::byte_serialize(query.as_bytes()) {
        match chunk {
            "%7E" => encoded.push('~'),
            // unreserved runs arrive as one chunk and may contain `*`
            _ => encoded.push_str(&chunk.replace('*', "%2A")),
        }
    }
    encoded
}
