//! Host rules deciding which targets go through the relay.

use url::Url;

/// Domain fragments whose hosts are routed through the relay.
///
/// A target matches when its host contains any fragment, ignoring case, so
/// `"thegraph"` covers `api.thegraph.com` and `gateway.thegraph.network`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterceptRules {
    domains: Vec<String>,
}

impl InterceptRules {
    pub fn new<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            domains: domains
                .into_iter()
                .map(|d| d.into().trim().to_lowercase())
                .filter(|d| !d.is_empty())
                .collect(),
        }
    }

    pub fn domains(&self) -> &[String] {
        &self.domains
    }

    pub fn should_relay(&self, target: &Url) -> bool {
        let Some(host) = target.host_str() else {
            return false;
        };
        let host = host.to_lowercase();
        self.domains.iter().any(|d| host.contains(d.as_str()))
    }
}
