//! UTM attribution capture from the hosting page's location

use crate::models::UtmParams;

pub const UTM_SOURCE: &str = "utm_source";
pub const UTM_MEDIUM: &str = "utm_medium";
pub const UTM_CAMPAIGN: &str = "utm_campaign";
pub const UTM_TERM: &str = "utm_term";
pub const UTM_CONTENT: &str = "utm_content";

/// Read access to the current navigational context (the page location)
pub trait NavigationContext: Send + Sync {
    /// Raw query string, with or without the leading `?`
    fn query_string(&self) -> String;
}

/// A fixed location, for hosts that know the query string up front
#[derive(Debug, Clone, Default)]
pub struct StaticLocation {
    query: String,
}

impl StaticLocation {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
        }
    }
}

impl NavigationContext for StaticLocation {
    fn query_string(&self) -> String {
        self.query.clone()
    }
}

/// Look up the first value for `key`, decoded like `URLSearchParams::get`
pub fn query_param(query: &str, key: &str) -> Option<String> {
    query
        .strip_prefix('?')
        .unwrap_or(query)
        .split('&')
        .filter(|pair| !pair.is_empty())
        .find_map(|pair| {
            let (raw_key, raw_value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode(raw_key) == key).then(|| decode(raw_value))
        })
}

fn decode(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        // Malformed escapes are kept verbatim
        Err(_) => spaced,
    }
}

/// Capture the five UTM parameters. Absent or empty values fall back to
/// `default_source` for `utm_source` and to the empty string otherwise.
pub fn capture_utm(context: &dyn NavigationContext, default_source: &str) -> UtmParams {
    let query = context.query_string();
    let get = |key: &str| query_param(&query, key).filter(|v| !v.is_empty());

    let utm = UtmParams {
        source: get(UTM_SOURCE).unwrap_or_else(|| default_source.to_string()),
        medium: get(UTM_MEDIUM).unwrap_or_default(),
        campaign: get(UTM_CAMPAIGN).unwrap_or_default(),
        term: get(UTM_TERM).unwrap_or_default(),
        content: get(UTM_CONTENT).unwrap_or_default(),
    };

    tracing::debug!(
        "Captured UTM: source='{}' medium='{}' campaign='{}'",
        utm.source,
        utm.medium,
        utm.campaign
    );
    utm
}
