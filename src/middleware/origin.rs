use axum::http::HeaderMap;
use axum::http::header::{AsHeaderName, HOST};

const FORWARDED_HOST: &str = "x-forwarded-host";
const FORWARDED_PROTO: &str = "x-forwarded-proto";

/// Allowlist of public origins this app may redirect to.
///
/// Anything derived from request headers that is not on the list is replaced
/// by the canonical origin, so a spoofed `Host` can never steer a redirect.
#[derive(Debug, Clone)]
pub struct OriginPolicy {
    allowed: Vec<String>,
    canonical: String,
}

impl OriginPolicy {
    #[must_use]
    pub fn new(canonical: impl Into<String>, allowed: Vec<String>) -> Self {
        Self {
            canonical: canonical.into(),
            allowed,
        }
    }

    #[must_use]
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    #[must_use]
    pub fn allowed(&self) -> &[String] {
        &self.allowed
    }

    /// Derive the public `scheme://host` for this request.
    ///
    /// Never fails: untrusted or missing headers yield the canonical origin.
    #[must_use]
    pub fn resolve_origin(&self, headers: &HeaderMap) -> String {
        let forwarded = header_str(headers, FORWARDED_HOST);
        let Some(host) = forwarded.or_else(|| header_str(headers, HOST)) else {
            return self.canonical.clone();
        };

        let proto = header_str(headers, FORWARDED_PROTO)
            .unwrap_or(if is_dev_host(host) { "http" } else { "https" });

        let candidate = format!("{proto}://{host}");
        if self.allowed.iter().any(|origin| *origin == candidate) {
            candidate
        } else {
            self.canonical.clone()
        }
    }
}

fn header_str(headers: &HeaderMap, name: impl AsHeaderName) -> Option<&str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn is_dev_host(host: &str) -> bool {
    let hostname = host.split(':').next().unwrap_or(host);
    matches!(hostname, "localhost" | "0.0.0.0" | "127.0.0.1")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn policy() -> OriginPolicy {
        OriginPolicy::new(
            "https://owlsinsight.com",
            vec![
                "https://owlsinsight.com".into(),
                "https://www.owlsinsight.com".into(),
                "http://localhost:3000".into(),
            ],
        )
    }

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn allowlisted_forwarded_host_is_used() {
        let h = headers(&[("x-forwarded-host", "www.owlsinsight.com")]);
        assert_eq!(policy().resolve_origin(&h), "https://www.owlsinsight.com");
    }

    #[test]
    fn forwarded_host_wins_over_host() {
        let h = headers(&[
            ("x-forwarded-host", "www.owlsinsight.com"),
            ("host", "0.0.0.0:3000"),
        ]);
        assert_eq!(policy().resolve_origin(&h), "https://www.owlsinsight.com");
    }

    #[test]
    fn localhost_defaults_to_http() {
        let h = headers(&[("host", "localhost:3000")]);
        assert_eq!(policy().resolve_origin(&h), "http://localhost:3000");
    }

    #[test]
    fn explicit_proto_is_respected() {
        let h = headers(&[("host", "localhost:3000"), ("x-forwarded-proto", "https")]);
        // https://localhost:3000 is not on the list.
        assert_eq!(policy().resolve_origin(&h), "https://owlsinsight.com");
    }

    #[test]
    fn unknown_hosts_fall_back_to_canonical() {
        for host in [
            "evil.example",
            "owlsinsight.com.evil.example",
            "owlsinsight.com@evil.example",
            "0.0.0.0:3000",
            "www.owlsinsight.com:8443",
        ] {
            let mut h = HeaderMap::new();
            h.insert("x-forwarded-host", HeaderValue::from_str(host).unwrap());
            assert_eq!(policy().resolve_origin(&h), "https://owlsinsight.com", "{host}");
        }
    }

    #[test]
    fn missing_headers_fall_back_to_canonical() {
        assert_eq!(policy().resolve_origin(&HeaderMap::new()), "https://owlsinsight.com");
        let h = headers(&[("x-forwarded-host", ""), ("host", "")]);
        assert_eq!(policy().resolve_origin(&h), "https://owlsinsight.com");
    }
}
