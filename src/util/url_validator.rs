use std::net::IpAddr;
use thiserror::Error;
use url::{Host, Url};

/// Reasons an article link is refused before it reaches the browser.
#[derive(Error, Debug)]
pub enum UrlValidationError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
    #[error("URL has no host")]
    MissingHost,
    #[error("URLs with embedded credentials are not opened")]
    EmbeddedCredentials,
    #[error("Private IP address not allowed: {0}")]
    PrivateIp(String),
    #[error("Localhost not allowed")]
    Localhost,
}

/// Check an article URL from the API before handing it to the system opener.
///
/// Only public `http`/`https` links with a host are accepted. Links with a
/// `user:pass@` part, and links to localhost or private address ranges, are
/// refused.
///
/// ```
/// use newsdesk::util::validate_article_url;
///
/// assert!(validate_article_url("https://news.example.com/story/1").is_ok());
/// assert!(validate_article_url("javascript:alert(1)").is_err());
/// assert!(validate_article_url("http://192.168.1.1/admin").is_err());
/// ```
pub fn validate_article_url(url_str: &str) -> Result<Url, UrlValidationError> {
    let url = Url::parse(url_str.trim())?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlValidationError::UnsupportedScheme(scheme.to_owned())),
    }

    if !url.username().is_empty() || url.password().is_some() {
        return Err(UrlValidationError::EmbeddedCredentials);
    }

    let ip = match url.host() {
        None => return Err(UrlValidationError::MissingHost),
        Some(Host::Domain(domain)) => {
            if domain.eq_ignore_ascii_case("localhost") || domain.ends_with(".localhost") {
                return Err(UrlValidationError::Localhost);
            }
            return Ok(url);
        }
        Some(Host::Ipv4(v4)) => IpAddr::V4(v4),
        Some(Host::Ipv6(v6)) => IpAddr::V6(v6),
    };

    if ip.is_loopback() {
        return Err(UrlValidationError::Localhost);
    }
    if is_private_ip(&ip) {
        return Err(UrlValidationError::PrivateIp(ip.to_string()));
    }
    Ok(url)
}

fn is_private_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => v4.is_private() || v4.is_link_local() || v4.is_unspecified(),
        IpAddr::V6(v6) => {
            let first = v6.segments()[0];
            v6.is_unspecified()
                || (first & 0xfe00) == 0xfc00 // unique local fc00::/7
                || (first & 0xffc0) == 0xfe80 // link local fe80::/10
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_links_accepted() {
        assert!(validate_article_url("https://news.example.com/a?b=c").is_ok());
        assert!(validate_article_url("http://example.org:8080/x").is_ok());
        assert!(validate_article_url("  https://example.com/padded  ").is_ok());
    }

    #[test]
    fn test_schemes_rejected() {
        for bad in ["file:///etc/passwd", "javascript:alert(1)", "ftp://example.com"] {
            assert!(matches!(
                validate_article_url(bad),
                Err(UrlValidationError::UnsupportedScheme(_))
            ));
        }
    }

    #[test]
    fn test_credentials_rejected() {
        assert!(matches!(
            validate_article_url("https://user:pw@example.com/"),
            Err(UrlValidationError::EmbeddedCredentials)
        ));
    }

    #[test]
    fn test_local_targets_rejected() {
        assert!(validate_article_url("http://localhost/x").is_err());
        assert!(validate_article_url("http://app.localhost/x").is_err());
        assert!(validate_article_url("http://127.0.0.1/x").is_err());
        assert!(validate_article_url("http://[::1]/x").is_err());
        assert!(validate_article_url("http://0.0.0.0/x").is_err());
    }

    #[test]
    fn test_private_ranges_rejected() {
        for bad in [
            "http://10.0.0.1/",
            "http://172.16.0.1/",
            "http://192.168.1.1:8080/",
            "http://169.254.1.1/",
            "http://[fe80::1]/",
            "http://[fd00::1]/",
        ] {
            assert!(
                matches!(validate_article_url(bad), Err(UrlValidationError::PrivateIp(_))),
                "{bad} should be refused"
            );
        }
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(matches!(
            validate_article_url("not a url"),
            Err(UrlValidationError::InvalidUrl(_))
        ));
    }
}
