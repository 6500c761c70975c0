//! Object name encoding
//!
//! Object names are placed into a single URI path segment. With auto-encode
//! enabled every byte outside the unreserved set is percent-encoded, which
//! also turns `/` into `%2F` and therefore rules out virtual folders. With
//! auto-encode disabled names pass through untouched and the caller is
//! responsible for URI safety.

use std::borrow::Cow;

/// Percent-encode a single URI component, independent of any policy.
///
/// Used for values that are always encoded on assignment (zone, access key).
pub fn encode_component(value: &str) -> Cow<'_, str> {
    urlencoding::encode(value)
}

/// Encoder/decoder for object names governed by the auto-encode policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameCodec {
    auto_encode: bool,
}

impl NameCodec {
    pub const fn new(auto_encode: bool) -> Self {
        Self { auto_encode }
    }

    pub const fn auto_encode(&self) -> bool {
        self.auto_encode
    }

    /// Encode a name for use in a request URI
    pub fn encode<'a>(&self, name: &'a str) -> Cow<'a, str> {
        if self.auto_encode {
            urlencoding::encode(name)
        } else {
            Cow::Borrowed(name)
        }
    }

    /// Decode a name returned by the service for display
    ///
    /// Input that does not decode to valid UTF-8 is returned unchanged.
    pub fn decode<'a>(&self, name: &'a str) -> Cow<'a, str> {
        if !self.auto_encode {
            return Cow::Borrowed(name);
        }

        match urlencoding::decode(name) {
            Ok(decoded) => decoded,
            Err(e) => {
                tracing::warn!(name, error = %e, "Object name is not valid percent-encoded UTF-8");
                Cow::Borrowed(name)
            }
        }
    }
}

impl Default for NameCodec {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAMES: &[&str] = &[
        "plain.txt",
        "with space.txt",
        "10/15/2026 9:41 AM test.test",
        "a/b/c.txt",
        "100% legit?.bin",
        "ünïcödé ☃.md",
        "+plus&amp=eq#hash",
        "",
    ];

    #[test]
    fn test_round_trip_with_auto_encode() {
        let codec = NameCodec::new(true);
        for name in NAMES {
            let encoded = codec.encode(name);
            assert_eq!(codec.decode(&encoded), *name, "round trip of {name:?}");
        }
    }

    #[test]
    fn test_identity_without_auto_encode() {
        let codec = NameCodec::new(false);
        for name in NAMES {
            assert_eq!(codec.encode(name), *name);
            assert_eq!(codec.decode(name), *name);
        }
    }

    #[test]
    fn test_encode_escapes_separators() {
        let codec = NameCodec::new(true);
        assert_eq!(codec.encode("a/b c.txt"), "a%2Fb%20c.txt");
    }

    #[test]
    fn test_encode_leaves_unreserved() {
        let codec = NameCodec::new(true);
        assert_eq!(codec.encode("Az09-._~"), "Az09-._~");
    }

    #[test]
    fn test_decode_invalid_utf8_passes_through() {
        let codec = NameCodec::new(true);
        assert_eq!(codec.decode("bad%FFname"), "bad%FFname");
    }

    #[test]
    fn test_default_encodes() {
        assert!(NameCodec::default().auto_encode());
    }

    #[test]
    fn test_encode_component() {
        assert_eq!(encode_component("my zone"), "my%20zone");
        assert_eq!(encode_component("key/+="), "key%2F%2B%3D");
    }
}
