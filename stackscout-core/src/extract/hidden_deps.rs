//! Hidden dependency scan: hardcoded endpoints in critical-file contents.

use std::collections::BTreeMap;

use crate::types::{CriticalFileEntry, HiddenDepsSummary};

/// Addresses that never count as a hidden dependency.
const LOCAL_HOSTS: &[&str] = &["localhost", "127.0.0.1", "0.0.0.0"];

/// Scan fetched critical files for hardcoded IPv4 literals and remote URLs.
pub fn scan_hidden_dependencies(
    files: &BTreeMap<String, CriticalFileEntry>,
) -> HiddenDepsSummary {
    let mut summary = HiddenDepsSummary::default();

    for (category, entry) in files {
        let mut count = 0u32;
        let contents: Vec<&str> = match entry {
            CriticalFileEntry::Single(f) => vec![f.content.as_str()],
            CriticalFileEntry::Many(fs) => fs.iter().map(|f| f.content.as_str()).collect(),
        };

        for content in contents {
            let ips = count_ipv4_literals(content);
            let urls = count_remote_urls(content);
            summary.hardcoded_ips += ips;
            summary.hardcoded_urls += urls;
            count += ips + urls;
        }

        if count > 0 {
            summary.per_file.insert(category.clone(), count);
        }
    }

    summary.total = summary.hardcoded_ips + summary.hardcoded_urls;
    summary
}

/// Count IPv4 literals, excluding loopback and the wildcard address.
fn count_ipv4_literals(text: &str) -> u32 {
    let bytes = text.as_bytes();
    let mut count = 0u32;
    let mut i = 0usize;

    while i < bytes.len() {
        if bytes[i].is_ascii_digit() && (i == 0 || !is_addr_byte(bytes[i - 1])) {
            if let Some((end, addr)) = parse_ipv4(text, i) {
                let boundary_ok = end >= bytes.len() || !is_addr_byte(bytes[end]);
                if boundary_ok && !LOCAL_HOSTS.contains(&addr.as_str()) {
                    count += 1;
                }
                i = end;
                continue;
            }
        }
        i += 1;
    }

    count
}

fn is_addr_byte(b: u8) -> bool {
    b.is_ascii_digit() || b == b'.'
}

/// Parse four dot-separated octets (each 1-3 digits, ≤255) starting at
/// `start`; returns the end offset and the literal.
fn parse_ipv4(text: &str, start: usize) -> Option<(usize, String)> {
    let bytes = text.as_bytes();
    let mut pos = start;

    for octet_index in 0..4 {
        let digits_start = pos;
        while pos < bytes.len() && bytes[pos].is_ascii_digit() && pos - digits_start < 3 {
            pos += 1;
        }
        if pos == digits_start {
            return None;
        }
        let octet: u32 = text[digits_start..pos].parse().ok()?;
        if octet > 255 {
            return None;
        }
        if octet_index < 3 {
            if pos >= bytes.len() || bytes[pos] != b'.' {
                return None;
            }
            pos += 1;
        }
    }

    Some((pos, text[start..pos].to_string()))
}

/// Count `http(s)://` URLs whose host is not local.
fn count_remote_urls(text: &str) -> u32 {
    let mut count = 0u32;

    for scheme in ["http://", "https://"] {
        let mut search = text;
        while let Some(pos) = search.find(scheme) {
            let after = &search[pos + scheme.len()..];
            let host: String = after
                .chars()
                .take_while(|c| !matches!(c, '/' | ':' | '"' | '\'' | ')' | ',') && !c.is_whitespace())
                .collect();
            if !host.is_empty() && !LOCAL_HOSTS.iter().any(|l| host.starts_with(l)) {
                count += 1;
            }
            search = &search[pos + scheme.len()..];
        }
    }

    count
}
