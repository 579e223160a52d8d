//! Proxy list loader for comma-delimited `address,type` files

use crate::proxy::models::{ProxyEndpoint, ProxyType};
use crate::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Regex pattern to match HOST:PORT addresses
static ADDRESS_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([^:\s]+):(\d{1,5})$").expect("Invalid HOST:PORT regex"));

/// Loader for proxy list files
pub struct ProxyLoader;

impl ProxyLoader {
    /// Parse a single `address,type` line
    ///
    /// Returns `None` for lines that should be skipped: fewer than two
    /// comma-separated fields, an unknown proxy type, or an address that
    /// is not HOST:PORT. Fields past the second are ignored.
    pub fn parse_line(line: &str) -> Option<ProxyEndpoint> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }

        let mut fields = line.split(',');
        let address = fields.next()?.trim();
        let type_field = fields.next()?.trim();

        let proxy_type: ProxyType = match type_field.parse() {
            Ok(t) => t,
            Err(e) => {
                log::debug!("skipping line ({}): {}", e, line);
                return None;
            }
        };

        let caps = match ADDRESS_REGEX.captures(address) {
            Some(caps) => caps,
            None => {
                log::debug!("skipping line with malformed address: {}", line);
                return None;
            }
        };

        let host = caps[1].to_string();
        let port: u16 = caps[2].parse().ok()?;

        Some(ProxyEndpoint::new(host, port, proxy_type))
    }

    /// Parse endpoints from a string (multiple lines), preserving input order
    pub fn parse_string(content: &str) -> Vec<ProxyEndpoint> {
        content.lines().filter_map(Self::parse_line).collect()
    }

    /// Load endpoints from a file
    ///
    /// Malformed lines are skipped; a missing or unreadable file is an error.
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Vec<ProxyEndpoint>> {
        let content = fs::read_to_string(path)?;
        Ok(Self::parse_string(&content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_http_line() {
        let endpoint = ProxyLoader::parse_line("1.2.3.4:8080,http").unwrap();
        assert_eq!(endpoint.host, "1.2.3.4");
        assert_eq!(endpoint.port, 8080);
        assert_eq!(endpoint.proxy_type, ProxyType::Http);
    }

    #[test]
    fn test_parse_type_case_insensitive() {
        let endpoint = ProxyLoader::parse_line("1.2.3.4:1080,SOCKS5").unwrap();
        assert_eq!(endpoint.proxy_type, ProxyType::Socks5);
    }

    #[test]
    fn test_parse_line_trims_whitespace() {
        let endpoint = ProxyLoader::parse_line("  1.2.3.4:8080 , https ").unwrap();
        assert_eq!(endpoint.address(), "1.2.3.4:8080");
        assert_eq!(endpoint.proxy_type, ProxyType::Https);
    }

    #[test]
    fn test_parse_extra_fields_ignored() {
        let endpoint = ProxyLoader::parse_line("1.2.3.4:8080,http,US,fast").unwrap();
        assert_eq!(endpoint.address(), "1.2.3.4:8080");
    }

    #[test]
    fn test_skip_short_line() {
        assert!(ProxyLoader::parse_line("badline").is_none());
        assert!(ProxyLoader::parse_line("1.2.3.4:8080").is_none());
    }

    #[test]
    fn test_skip_unknown_type() {
        assert!(ProxyLoader::parse_line("9.9.9.9:3128,ftp").is_none());
    }

    #[test]
    fn test_skip_malformed_address() {
        assert!(ProxyLoader::parse_line("1.2.3.4,http").is_none());
        assert!(ProxyLoader::parse_line("1.2.3.4:notaport,http").is_none());
        assert!(ProxyLoader::parse_line("1.2.3.4:99999999,http").is_none());
    }

    #[test]
    fn test_skip_empty_and_comment_lines() {
        assert!(ProxyLoader::parse_line("").is_none());
        assert!(ProxyLoader::parse_line("   ").is_none());
        assert!(ProxyLoader::parse_line("# 1.2.3.4:8080,http").is_none());
    }

    #[test]
    fn test_parse_string_drops_bad_lines() {
        let content = "1.2.3.4:8080,http\n5.6.7.8:1080,socks5\nbadline\n9.9.9.9:3128,ftp\n";
        let endpoints = ProxyLoader::parse_string(content);

        assert_eq!(
            endpoints,
            vec![
                ProxyEndpoint::new("1.2.3.4".to_string(), 8080, ProxyType::Http),
                ProxyEndpoint::new("5.6.7.8".to_string(), 1080, ProxyType::Socks5),
            ]
        );
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "1.2.3.4:8080,http").unwrap();
        writeln!(file, "5.6.7.8:1080,socks4").unwrap();

        let endpoints = ProxyLoader::load_file(file.path()).unwrap();
        assert_eq!(endpoints.len(), 2);
        assert_eq!(endpoints[1].proxy_type, ProxyType::Socks4);
    }

    #[test]
    fn test_load_missing_file_is_error() {
        assert!(ProxyLoader::load_file("/nonexistent/proxylist.csv").is_err());
    }
}
