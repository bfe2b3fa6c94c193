use url::Url;

use crate::error::{AnalyzeError, Result};

const INVALID_URL: &str = "Invalid URL. Use https://example.com";
const FALLBACK_SEED: &str = "site";

// Validated analysis target: the hostname shown to the client and the
// keyword seed sent upstream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub domain: String,
    pub seed: String,
}

impl Target {
    pub fn parse(raw: &str) -> Result<Self> {
        let input = raw.trim();
        if input.is_empty() {
            return Err(AnalyzeError::InvalidInput(INVALID_URL.to_string()));
        }

        let url = Url::parse(input).map_err(|_| AnalyzeError::InvalidInput(INVALID_URL.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(AnalyzeError::InvalidInput(INVALID_URL.to_string()));
        }
        let host = url
            .host_str()
            .ok_or_else(|| AnalyzeError::InvalidInput(INVALID_URL.to_string()))?;

        Ok(Self::from_host(host))
    }

    // host is expected lowercase already, as the url parser normalizes it
    pub fn from_host(host: &str) -> Self {
        let domain = host.strip_prefix("www.").unwrap_or(host);
        let seed = match domain.split('.').next() {
            Some(label) if !label.is_empty() => label,
            _ => FALLBACK_SEED,
        };

        Self {
            domain: domain.to_string(),
            seed: seed.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_www_and_lowercases() {
        let target = Target::parse("https://www.Example.com/page").unwrap();
        assert_eq!(target.seed, "example");
        assert_eq!(target.domain, "example.com");
    }

    #[test]
    fn takes_leading_label_of_subdomains() {
        let target = Target::parse("https://sub.test.org").unwrap();
        assert_eq!(target.seed, "sub");
        assert_eq!(target.domain, "sub.test.org");
    }

    #[test]
    fn empty_leading_label_falls_back_to_site() {
        assert_eq!(Target::from_host("www.").seed, "site");
        assert_eq!(Target::from_host(".b").seed, "site");
        assert_eq!(Target::from_host("").seed, "site");
    }

    #[test]
    fn keeps_hosts_without_dots() {
        let target = Target::parse("http://localhost:3000/x").unwrap();
        assert_eq!(target.seed, "localhost");
        assert_eq!(target.domain, "localhost");
    }

    #[test]
    fn rejects_missing_relative_and_non_http_urls() {
        for raw in ["", "   ", "example.com", "/path", "ftp://example.com", "mailto:a@b.c"] {
            let err = Target::parse(raw).unwrap_err();
            assert!(matches!(err, AnalyzeError::InvalidInput(_)), "{raw:?}");
        }
    }
}
