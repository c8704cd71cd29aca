//! `Forwarded` header parsing into an ordered hop chain.

use std::collections::HashMap;

use axum::http::HeaderMap;

/// Header name defined by RFC 7239.
pub const FORWARDED: &str = "forwarded";

/// One proxy hop's declared parameters.
///
/// Names are stored lowercased. A name that repeats within one hop keeps all
/// of its values in header order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HopRecord {
    parameters: HashMap<String, Vec<String>>,
}

impl HopRecord {
    /// All values declared for `name` in this hop, in order.
    pub fn values(&self, name: &str) -> &[String] {
        self.parameters
            .get(&name.to_ascii_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// First value declared for `name` in this hop.
    pub fn first(&self, name: &str) -> Option<&str> {
        self.values(name).first().map(String::as_str)
    }

    /// Whether no well-formed parameter survived parsing.
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    fn push(&mut self, name: &str, value: String) {
        self.parameters
            .entry(name.to_ascii_lowercase())
            .or_default()
            .push(value);
    }
}

/// Ordered hop records, client-nearest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HopChain {
    hops: Vec<HopRecord>,
}

impl HopChain {
    pub fn hops(&self) -> &[HopRecord] {
        &self.hops
    }

    pub fn len(&self) -> usize {
        self.hops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hops.is_empty()
    }

    /// The hop appended by the proxy closest to the client.
    pub fn nearest(&self) -> Option<&HopRecord> {
        self.hops.first()
    }

    /// First value of `name` from the nearest hop that declares it.
    pub fn first_value(&self, name: &str) -> Option<&str> {
        self.hops.iter().find_map(|hop| hop.first(name))
    }
}

/// Parse a raw `Forwarded` header value.
///
/// Absent or blank input yields an empty chain. Assignments without `=`, with
/// an empty name, or with an empty value are skipped.
pub fn parse_forwarded(header: Option<&str>) -> HopChain {
    let mut chain = HopChain::default();
    let Some(header) = header else {
        return chain;
    };

    for hop in split_unquoted(header, ',') {
        if hop.trim().is_empty() {
            continue;
        }

        let mut record = HopRecord::default();
        for assignment in split_unquoted(hop, ';') {
            let Some((key, value)) = assignment.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let value = unquote(value.trim());
            if key.is_empty() || value.is_empty() {
                continue;
            }
            record.push(key, value);
        }
        chain.hops.push(record);
    }

    chain
}

/// Parse every `Forwarded` field line of a request.
///
/// Multiple field lines are equivalent to one line joined with commas, so
/// hops from earlier lines come first.
pub fn parse_forwarded_headers(headers: &HeaderMap) -> HopChain {
    let lines: Vec<&str> = headers
        .get_all(FORWARDED)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .collect();

    if lines.is_empty() {
        return HopChain::default();
    }
    parse_forwarded(Some(&lines.join(",")))
}

/// Split on `delimiter` outside of double-quoted strings.
fn split_unquoted(input: &str, delimiter: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    let mut escaped = false;

    for (idx, ch) in input.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            c if c == delimiter && !in_quotes => {
                parts.push(&input[start..idx]);
                start = idx + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);
    parts
}

/// Strip surrounding double quotes and resolve quoted-pair escapes.
fn unquote(value: &str) -> String {
    let inner = match value
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    {
        Some(inner) => inner,
        None => return value.to_string(),
    };

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(ch);
        }
    }
    out
}
