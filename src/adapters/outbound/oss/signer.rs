//! OSS header signing.
//!
//! ```text
//! Authorization = "OSS " + AccessKeyId + ":" + Signature
//! Signature     = Base64(HMAC-SHA1(AccessKeySecret, StringToSign))
//! StringToSign  = VERB + "\n" + Content-MD5 + "\n" + Content-Type + "\n" + Date + "\n"
//!                 + CanonicalizedOSSHeaders + CanonicalizedResource
//! ```

use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha1::Sha1;

use super::error::OssError;

type HmacSha1 = Hmac<Sha1>;

pub const SECURITY_TOKEN_HEADER: &str = "x-oss-security-token";

/// Static access key credentials, optionally from an STS session
#[derive(Clone)]
pub struct OssCredentials {
    pub access_key_id: String,
    pub access_key_secret: String,
    pub security_token: Option<String>,
}

impl std::fmt::Debug for OssCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OssCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("access_key_secret", &"***")
            .field("security_token", &self.security_token.as_ref().map(|_| "***"))
            .finish()
    }
}

/// The parts of a request that take part in the signature
#[derive(Debug, Default)]
pub struct SignableRequest<'a> {
    pub method: &'a str,
    pub content_md5: &'a str,
    pub content_type: &'a str,
    pub date: &'a str,
    /// `x-oss-*` headers; names are lowercased before signing
    pub oss_headers: BTreeMap<String, String>,
    /// `/<bucket>/?<sub-resource>`
    pub resource: &'a str,
}

impl SignableRequest<'_> {
    pub fn string_to_sign(&self) -> String {
        let mut headers = String::new();
        let lowered: BTreeMap<String, &str> = self
            .oss_headers
            .iter()
            .map(|(name, value)| (name.to_ascii_lowercase(), value.trim()))
            .filter(|(name, _)| name.starts_with("x-oss-"))
            .collect();
        for (name, value) in lowered {
            headers.push_str(&name);
            headers.push(':');
            headers.push_str(value);
            headers.push('\n');
        }

        format!(
            "{}\n{}\n{}\n{}\n{}{}",
            self.method, self.content_md5, self.content_type, self.date, headers, self.resource
        )
    }
}

/// Base64(HMAC-SHA1(secret, string_to_sign))
pub fn signature(secret: &str, string_to_sign: &str) -> Result<String, OssError> {
    let mut mac = HmacSha1::new_from_slice(secret.as_bytes())
        .map_err(|e| OssError::Signing(e.to_string()))?;
    mac.update(string_to_sign.as_bytes());
    Ok(BASE64.encode(mac.finalize().into_bytes()))
}

/// Value of the `Authorization` header for `request`
pub fn authorization(
    credentials: &OssCredentials,
    request: &SignableRequest<'_>,
) -> Result<String, OssError> {
    let signature = signature(&credentials.access_key_secret, &request.string_to_sign())?;
    Ok(format!("OSS {}:{}", credentials.access_key_id, signature))
}

/// Base64 of the MD5 digest of the body
pub fn content_md5(body: &[u8]) -> String {
    BASE64.encode(md5::compute(body).0)
}

/// RFC 1123 date as the `Date` header expects it
pub fn http_date(now: DateTime<Utc>) -> String {
    now.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}
