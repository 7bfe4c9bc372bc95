//! Target URL normalization and the self-reference loop guard.

use tether_core::ShortenerError;
use tracing::warn;
use url::Url;

const HTTP: &str = "http://";
const HTTPS: &str = "https://";

fn has_prefix_ignore_case(value: &str, prefix: &str) -> bool {
    value
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

/// Trims the target and prefixes `https://` unless it already starts with an
/// HTTP(S) scheme.
///
/// Nothing else about the URL is validated.
pub fn normalize(raw: &str) -> Result<String, ShortenerError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ShortenerError::BadInput(
            "target URL cannot be empty".to_string(),
        ));
    }

    if has_prefix_ignore_case(trimmed, HTTP) || has_prefix_ignore_case(trimmed, HTTPS) {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("{HTTPS}{trimmed}"))
    }
}

/// Rejects targets that point back at the service's own public address.
///
/// Both sides are parsed as URLs, so host and port are compared in their
/// canonical form. If the configured domain has an explicit port, the target
/// must match host and port to be rejected; otherwise any port on that host
/// is rejected. An empty domain disables the guard.
#[derive(Debug, Clone, Default)]
pub struct SelfReferenceGuard {
    host: Option<String>,
    port: Option<u16>,
}

impl SelfReferenceGuard {
    /// Builds a guard from a public domain such as `localhost:3000` or
    /// `https://teth.er`.
    pub fn new(public_domain: &str) -> Self {
        let domain = public_domain.trim();
        if domain.is_empty() {
            return Self::default();
        }

        let candidate = if domain.contains("://") {
            domain.to_string()
        } else {
            format!("{HTTP}{domain}")
        };

        match Url::parse(&candidate) {
            Ok(url) => match url.host_str() {
                Some(host) => Self {
                    host: Some(host.to_string()),
                    port: url.port(),
                },
                None => {
                    warn!(
                        public_domain = domain,
                        "public domain has no host, self-reference guard disabled"
                    );
                    Self::default()
                }
            },
            Err(e) => {
                warn!(
                    public_domain = domain,
                    error = %e,
                    "unparseable public domain, self-reference guard disabled"
                );
                Self::default()
            }
        }
    }

    /// Whether the guard has a domain to compare against.
    pub fn is_enabled(&self) -> bool {
        self.host.is_some()
    }

    /// Whether `target` (already normalized) points at the service itself.
    ///
    /// A target that does not parse as a URL cannot be followed back here by
    /// a client either, so it is not treated as a self-reference.
    pub fn is_self_reference(&self, target: &str) -> bool {
        let Some(own_host) = self.host.as_deref() else {
            return false;
        };
        let Ok(url) = Url::parse(target) else {
            return false;
        };

        if url.host_str() != Some(own_host) {
            return false;
        }

        match self.port {
            Some(own_port) => url.port_or_known_default() == Some(own_port),
            None => true,
        }
    }

    pub fn check(&self, target: &str) -> Result<(), ShortenerError> {
        if self.is_self_reference(target) {
            return Err(ShortenerError::Forbidden(format!(
                "target '{target}' points back at this service"
            )));
        }
        Ok(())
    }
}
