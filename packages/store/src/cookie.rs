//! # Draft persistence as a single cookie
//!
//! The text the user was typing when the page went away survives as one
//! cookie, independent of the note list. This module keeps the codec pure
//! and pushes platform IO behind the [`CookieJar`] seam.
//!
//! ## Value encoding
//!
//! Values are percent-encoded byte by byte (UTF-8, unreserved bytes pass
//! through, uppercase hex otherwise), and then a denylist of encoded
//! sequences is stripped from the result:
//!
//! | Stripped | Characters |
//! |----------|------------|
//! | `%23 %24 %26 %2B` | `#` `$` `&` `+` |
//! | `%3A %3C %3E %3D` | `:` `<` `>` `=` |
//! | `%2F %3F %40` | `/` `?` `@` |
//! | `%5B %5D %5E %60` | `[` `]` `^` `` ` `` |
//! | `%7B %7D %7C` | `{` `}` `\|` |
//!
//! The stripped characters could otherwise confuse cookie-attribute
//! parsing once decoded downstream; a value that used them comes back with
//! them missing, which is accepted for draft text.
//!
//! ## Wire shape
//!
//! `name=value; expires=<UTC date>; path=<p>; domain=<d>; secure` with the
//! empty attributes omitted, `expires` given as whole days from now and
//! `-1` used to expire a cookie immediately.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, NaiveDateTime, Utc};

use crate::config::CookieConfig;

/// Encoded sequences removed from values after percent-encoding.
const STRIPPED_SEQUENCES: [&str; 18] = [
    "%23", "%24", "%26", "%2B", "%3A", "%3C", "%3E", "%3D", "%2F", "%3F", "%40", "%5B", "%5D",
    "%5E", "%60", "%7B", "%7D", "%7C",
];

/// Format cookies use for absolute expiry dates.
const EXPIRES_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

fn is_unreserved(byte: u8) -> bool {
    byte.is_ascii_alphanumeric()
        || matches!(
            byte,
            b'-' | b'_' | b'.' | b'!' | b'~' | b'*' | b'\'' | b'(' | b')'
        )
}

/// Percent-encode `value` and strip the denylisted sequences.
pub fn encode(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    for byte in value.bytes() {
        if is_unreserved(byte) {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("%{byte:02X}"));
        }
    }
    for sequence in STRIPPED_SEQUENCES {
        if encoded.contains(sequence) {
            encoded = encoded.replace(sequence, "");
        }
    }
    encoded
}

/// Reverse the percent-encoding. Malformed escapes pass through verbatim.
pub fn decode(value: &str) -> String {
    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(hi), Some(lo)) = (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                out.push(hi * 16 + lo);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

/// Optional cookie attributes appended after the name/value pair.
#[derive(Clone, Debug, Default)]
pub struct CookieAttributes {
    /// Whole days from now until expiry; negative expires the cookie. A
    /// count the calendar cannot represent renders no `expires` attribute.
    pub expires: Option<i64>,
    /// Overrides the store's configured path when set.
    pub path: Option<String>,
    pub domain: Option<String>,
    pub secure: bool,
}

impl CookieAttributes {
    pub fn expires_in_days(days: i64) -> Self {
        Self {
            expires: Some(days),
            ..Self::default()
        }
    }
}

/// Render the `; attr=value` tail, in the order expires, path, domain,
/// secure.
fn attribute_string(
    attributes: &CookieAttributes,
    default_path: &str,
    now: DateTime<Utc>,
) -> String {
    let mut out = String::new();
    if let Some(date) = attributes
        .expires
        .and_then(Duration::try_days)
        .and_then(|offset| now.checked_add_signed(offset))
    {
        out.push_str(&format!("; expires={}", date.format(EXPIRES_FORMAT)));
    }
    let path = attributes.path.as_deref().unwrap_or(default_path);
    if !path.is_empty() {
        out.push_str(&format!("; path={path}"));
    }
    if let Some(domain) = attributes.domain.as_deref().filter(|domain| !domain.is_empty()) {
        out.push_str(&format!("; domain={domain}"));
    }
    if attributes.secure {
        out.push_str("; secure");
    }
    out
}

/// Where cookie strings actually live.
///
/// The browser backs this with `document.cookie`; natively a [`MemoryJar`]
/// stands in. A jar without a document context reads as `None` and drops
/// writes.
pub trait CookieJar {
    /// The full `name=value; name2=value2` header, or `None` without a
    /// document context.
    fn cookie_header(&self) -> Option<String>;

    /// Hand one serialized cookie string to the platform.
    fn write(&self, cookie: &str);
}

/// In-process jar with browser-like expiry handling.
#[derive(Clone, Debug, Default)]
pub struct MemoryJar {
    cookies: Arc<Mutex<BTreeMap<String, String>>>,
}

impl MemoryJar {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CookieJar for MemoryJar {
    fn cookie_header(&self) -> Option<String> {
        let cookies = self.cookies.lock().unwrap();
        let header = cookies
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; ");
        Some(header)
    }

    fn write(&self, cookie: &str) {
        let mut segments = cookie.split(';');
        let Some((name, value)) = segments.next().and_then(|pair| pair.split_once('=')) else {
            return;
        };
        let expired = segments
            .filter_map(|segment| segment.trim_start().strip_prefix("expires="))
            .any(|date| {
                NaiveDateTime::parse_from_str(date, EXPIRES_FORMAT)
                    .map(|parsed| parsed.and_utc() <= Utc::now())
                    .unwrap_or(false)
            });
        let mut cookies = self.cookies.lock().unwrap();
        if expired {
            cookies.remove(name);
        } else {
            cookies.insert(name.to_string(), value.to_string());
        }
    }
}

/// `document.cookie` behind the [`CookieJar`] seam.
#[cfg(all(target_arch = "wasm32", feature = "web"))]
#[derive(Clone, Debug, Default)]
pub struct DocumentJar;

#[cfg(all(target_arch = "wasm32", feature = "web"))]
impl DocumentJar {
    pub fn new() -> Self {
        Self
    }

    fn document() -> Option<web_sys::HtmlDocument> {
        use wasm_bindgen::JsCast;

        web_sys::window()?.document()?.dyn_into().ok()
    }
}

#[cfg(all(target_arch = "wasm32", feature = "web"))]
impl CookieJar for DocumentJar {
    fn cookie_header(&self) -> Option<String> {
        Self::document()?.cookie().ok()
    }

    fn write(&self, cookie: &str) {
        if let Some(document) = Self::document() {
            let _ = document.set_cookie(cookie);
        }
    }
}

/// The one named cookie holding the draft text.
///
/// Called by UI glue directly; drafts do not go through the note backends.
#[derive(Clone, Debug)]
pub struct CookieStore<J> {
    jar: J,
    key: String,
    path: String,
}

impl<J: CookieJar> CookieStore<J> {
    pub fn new(jar: J, config: &CookieConfig) -> Self {
        Self {
            jar,
            key: config.name.clone(),
            path: config.path.clone(),
        }
    }

    /// Write `value` under the configured name. A store without a key and a
    /// jar without a document context are both silent no-ops.
    pub fn set(&self, value: &str, attributes: &CookieAttributes) {
        if self.key.is_empty() {
            return;
        }
        let cookie = format!(
            "{}={}{}",
            encode(&self.key),
            encode(value),
            attribute_string(attributes, &self.path, Utc::now())
        );
        self.jar.write(&cookie);
    }

    /// The decoded stored value, or an empty string when the cookie, key, or
    /// document context is missing.
    pub fn get(&self) -> String {
        if self.key.is_empty() {
            return String::new();
        }
        let Some(header) = self.jar.cookie_header() else {
            return String::new();
        };
        let prefix = format!("{}=", encode(&self.key));
        for segment in header.split(';') {
            if let Some(value) = segment.trim_start().strip_prefix(&prefix) {
                return decode(value);
            }
        }
        String::new()
    }

    /// Expire the cookie immediately.
    pub fn remove(&self) {
        self.set("", &CookieAttributes::expires_in_days(-1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> CookieStore<MemoryJar> {
        CookieStore::new(MemoryJar::new(), &CookieConfig::default())
    }

    #[test]
    fn test_unreserved_characters_pass_through() {
        assert_eq!(encode("AZaz09-_.!~*'()"), "AZaz09-_.!~*'()");
    }

    #[test]
    fn test_encoding_strips_the_denylisted_sequences() {
        assert_eq!(encode("a=b; c/d?"), "ab%3B%20cd");
        assert_eq!(encode("#$&+:<>=/?@[]^`{}|"), "");
    }

    #[test]
    fn test_multibyte_text_is_percent_encoded() {
        assert_eq!(encode("café"), "caf%C3%A9");
        assert_eq!(decode("caf%C3%A9"), "café");
    }

    #[test]
    fn test_decode_reverses_the_encoding() {
        assert_eq!(decode("ab%3B%20cd"), "ab; cd");
    }

    #[test]
    fn test_malformed_escapes_pass_through_decode() {
        assert_eq!(decode("100%"), "100%");
        assert_eq!(decode("%GG"), "%GG");
        assert_eq!(decode("%4"), "%4");
    }

    #[test]
    fn test_attributes_render_in_a_fixed_order() {
        let attributes = CookieAttributes {
            expires: Some(1),
            path: None,
            domain: Some("example.com".to_string()),
            secure: true,
        };
        let epoch = DateTime::from_timestamp(0, 0).unwrap();
        assert_eq!(
            attribute_string(&attributes, "/", epoch),
            "; expires=Fri, 02 Jan 1970 00:00:00 GMT; path=/; domain=example.com; secure"
        );
    }

    #[test]
    fn test_negative_expiry_renders_a_past_date() {
        let epoch = DateTime::from_timestamp(0, 0).unwrap();
        let attributes = CookieAttributes::expires_in_days(-1);
        assert_eq!(
            attribute_string(&attributes, "/", epoch),
            "; expires=Wed, 31 Dec 1969 00:00:00 GMT; path=/"
        );
    }

    #[test]
    fn test_out_of_range_expiry_renders_no_expires_attribute() {
        let epoch = DateTime::from_timestamp(0, 0).unwrap();
        assert_eq!(
            attribute_string(&CookieAttributes::expires_in_days(i64::MAX), "/", epoch),
            "; path=/"
        );
        assert_eq!(
            attribute_string(&CookieAttributes::expires_in_days(i64::MIN), "/", epoch),
            "; path=/"
        );
    }

    #[test]
    fn test_out_of_range_expiry_falls_back_to_a_session_cookie() {
        let jar = MemoryJar::new();
        let store = CookieStore::new(jar.clone(), &CookieConfig::default());

        store.set("hello", &CookieAttributes::expires_in_days(i64::MAX));
        assert_eq!(jar.cookie_header().unwrap(), "draft=hello");
        assert_eq!(store.get(), "hello");
    }

    #[test]
    fn test_set_then_get_round_trips_the_draft() {
        let store = store();
        store.set("hello world", &CookieAttributes::default());
        assert_eq!(store.get(), "hello world");
    }

    #[test]
    fn test_denylisted_characters_never_reach_the_jar() {
        let jar = MemoryJar::new();
        let store = CookieStore::new(jar.clone(), &CookieConfig::default());

        store.set("a=b;c/d", &CookieAttributes::default());
        assert_eq!(jar.cookie_header().unwrap(), "draft=ab%3Bcd");
        assert_eq!(store.get(), "ab;cd");
    }

    #[test]
    fn test_get_matches_only_its_own_cookie() {
        let jar = MemoryJar::new();
        jar.write("other=value");
        jar.write("notdraft=decoy");

        let store = CookieStore::new(jar, &CookieConfig::default());
        store.set("mine", &CookieAttributes::default());
        assert_eq!(store.get(), "mine");
    }

    #[test]
    fn test_remove_expires_the_cookie() {
        let store = store();
        store.set("hello", &CookieAttributes::default());
        store.remove();
        assert_eq!(store.get(), "");
    }

    #[test]
    fn test_missing_cookie_reads_as_empty() {
        assert_eq!(store().get(), "");
    }

    #[test]
    fn test_empty_key_is_a_silent_no_op() {
        let jar = MemoryJar::new();
        let config = CookieConfig {
            name: String::new(),
            ..CookieConfig::default()
        };
        let store = CookieStore::new(jar.clone(), &config);

        store.set("hello", &CookieAttributes::default());
        assert_eq!(jar.cookie_header().unwrap(), "");
        assert_eq!(store.get(), "");
    }

    #[test]
    fn test_encoded_keys_round_trip() {
        let jar = MemoryJar::new();
        let config = CookieConfig {
            name: "my draft".to_string(),
            ..CookieConfig::default()
        };
        let store = CookieStore::new(jar.clone(), &config);

        store.set("hello", &CookieAttributes::default());
        assert_eq!(jar.cookie_header().unwrap(), "my%20draft=hello");
        assert_eq!(store.get(), "hello");
    }
}
