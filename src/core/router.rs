//! Deep-link fragments: `#<app id>[?key=value[&key=value...]]`.
//!
//! The app id, keys and values are percent-encoded on the way out and decoded
//! on the way in, so `parse(format(id, p)) == (id, p)`.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::collections::BTreeMap;

use super::error::{DesktopError, Result};
use super::registry::AppId;

/// RFC 3986 unreserved characters stay literal, everything else is escaped.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

pub type Params = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeepLink {
    pub app: AppId,
    pub params: Params,
}

impl DeepLink {
    pub fn new(app: impl Into<AppId>) -> Self {
        Self {
            app: app.into(),
            params: Params::new(),
        }
    }

    pub fn with_param(mut self, key: &str, value: &str) -> Self {
        self.params.insert(key.to_string(), value.to_string());
        self
    }

    pub fn to_fragment(&self) -> String {
        format(&self.app, &self.params)
    }
}

pub fn parse(fragment: &str) -> Result<DeepLink> {
    let body = fragment.strip_prefix('#').unwrap_or(fragment);
    let (raw_id, query) = match body.split_once('?') {
        Some((id, q)) => (id, Some(q)),
        None => (body, None),
    };

    let id = decode(raw_id, fragment)?;
    if id.is_empty() {
        return Err(DesktopError::InvalidFragment(fragment.to_string()));
    }

    let mut params = Params::new();
    for pair in query.into_iter().flat_map(|q| q.split('&')) {
        if pair.is_empty() {
            continue;
        }
        let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
        params.insert(decode(k, fragment)?, decode(v, fragment)?);
    }

    Ok(DeepLink {
        app: AppId::from(id),
        params,
    })
}

pub fn format(app: &AppId, params: &Params) -> String {
    let mut out = format!("#{}", encode(app.as_str()));
    if !params.is_empty() {
        let query: Vec<String> = params
            .iter()
            .map(|(k, v)| format!("{}={}", encode(k), encode(v)))
            .collect();
        out.push('?');
        out.push_str(&query.join("&"));
    }
    out
}

/// Absolute link suitable for sharing, e.g. `https://vixen.example/#lemon-list?search=car`.
pub fn deep_link(origin: &str, app: &AppId, params: &Params) -> String {
    format!("{}/{}", origin.trim_end_matches('/'), format(app, params))
}

fn encode(s: &str) -> String {
    utf8_percent_encode(s, COMPONENT).to_string()
}

fn decode(s: &str, fragment: &str) -> Result<String> {
    percent_decode_str(s)
        .decode_utf8()
        .map(|c| c.into_owned())
        .map_err(|_| DesktopError::InvalidFragment(fragment.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_app_id() {
        let link = parse("#system").unwrap();
        assert_eq!(link.app.as_str(), "system");
        assert!(link.params.is_empty());
    }

    #[test]
    fn hash_prefix_is_optional() {
        assert_eq!(parse("maps").unwrap(), parse("#maps").unwrap());
    }

    #[test]
    fn decodes_id_and_params() {
        let link = parse("#Lemon%20List?search=fast%20cars&filters=%F0%9F%9A%97").unwrap();
        assert_eq!(link.app.as_str(), "Lemon List");
        assert_eq!(link.params.get("search").map(String::as_str), Some("fast cars"));
        assert_eq!(link.params.get("filters").map(String::as_str), Some("🚗"));
    }

    #[test]
    fn key_without_value_maps_to_empty_string() {
        let link = parse("#alibi?witness").unwrap();
        assert_eq!(link.params.get("witness").map(String::as_str), Some(""));
    }

    #[test]
    fn empty_fragment_is_rejected() {
        assert!(matches!(parse("#"), Err(DesktopError::InvalidFragment(_))));
        assert!(matches!(parse("#?a=b"), Err(DesktopError::InvalidFragment(_))));
    }

    #[test]
    fn invalid_utf8_escape_is_rejected() {
        assert!(matches!(parse("#%FF"), Err(DesktopError::InvalidFragment(_))));
    }

    #[test]
    fn format_escapes_reserved_characters() {
        let link = DeepLink::new("lemon-list")
            .with_param("search", "a&b=c?d#e f")
            .with_param("filters", "");
        assert_eq!(
            link.to_fragment(),
            "#lemon-list?filters=&search=a%26b%3Dc%3Fd%23e%20f"
        );
    }

    #[test]
    fn round_trips_ascii_ids_and_params() {
        let cases = [
            ("system", vec![]),
            ("Lemon List", vec![("search", "50% off"), ("filters", "a,b")]),
            ("we?rd#id", vec![("k=1", "v&2"), ("+plus", "~tilde")]),
        ];
        for (id, params) in cases {
            let mut p = Params::new();
            for (k, v) in params {
                p.insert(k.to_string(), v.to_string());
            }
            let app = AppId::from(id);
            let parsed = parse(&format(&app, &p)).unwrap();
            assert_eq!(parsed, DeepLink { app, params: p });
        }
    }

    #[test]
    fn deep_link_joins_origin_once() {
        let p = Params::new();
        assert_eq!(
            deep_link("https://vixen.example/", &AppId::from("maps"), &p),
            "https://vixen.example/#maps"
        );
    }
}
