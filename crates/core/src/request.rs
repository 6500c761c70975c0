//! Request URI construction
//!
//! Every operation addresses `{endpoint}/{zone}/{name}?AccessKey={key}`. The
//! listing uses an empty name, which yields the zone root.

use crate::codec::NameCodec;
use crate::config::ClientConfig;

/// Name of the query parameter carrying the credential
const ACCESS_KEY_PARAM: &str = "AccessKey";

/// Builds request URIs from a client configuration
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    endpoint: String,
    zone: String,
    access_key: String,
    codec: NameCodec,
}

impl RequestBuilder {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            endpoint: config.endpoint().to_string(),
            zone: config.zone().to_string(),
            access_key: config.access_key().to_string(),
            codec: NameCodec::new(config.auto_encode()),
        }
    }

    pub fn codec(&self) -> NameCodec {
        self.codec
    }

    /// URI addressing a single object
    pub fn object_uri(&self, name: &str) -> String {
        format!(
            "{}/{}/{}?{}={}",
            self.endpoint,
            self.zone,
            self.codec.encode(name),
            ACCESS_KEY_PARAM,
            self.access_key
        )
    }

    /// URI addressing the zone root, used for listings
    pub fn zone_uri(&self) -> String {
        self.object_uri("")
    }

    /// Copy of `uri` with the access key masked, safe for logs and errors
    pub fn redacted(uri: &str) -> String {
        let marker = format!("{ACCESS_KEY_PARAM}=");
        match uri.find(&marker) {
            Some(pos) => {
                let value_start = pos + marker.len();
                let value_end = uri[value_start..]
                    .find('&')
                    .map_or(uri.len(), |i| value_start + i);
                format!("{}***{}", &uri[..value_start], &uri[value_end..])
            }
            None => uri.to_string(),
        }
    }
}
