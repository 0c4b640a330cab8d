//! Request descriptions
//!
//! A [`RequestSpec`] is everything needed to send one request: method, URL
//! (query included), headers and body. Building one does no I/O.

use crate::error::{HttpError, Result};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use std::collections::HashMap;
use std::fmt;
use ureq::http::{HeaderName, HeaderValue};
use url::Url;

/// Content type used for every JSON body
pub const JSON: &str = "application/json; charset=utf-8";

/// Content type used for form bodies
pub const FORM: &str = "application/x-www-form-urlencoded";

/// Bytes escaped in a query key or value. Space becomes `%20`, and `+`, `&`
/// and `=` are escaped so they survive both RFC 3986 and form decoding.
const QUERY_COMPONENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'!')
    .add(b'"')
    .add(b'#')
    .add(b'$')
    .add(b'%')
    .add(b'&')
    .add(b'\'')
    .add(b'(')
    .add(b')')
    .add(b'+')
    .add(b',')
    .add(b'/')
    .add(b':')
    .add(b';')
    .add(b'<')
    .add(b'=')
    .add(b'>')
    .add(b'?')
    .add(b'@')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}')
    .add(b'~');

/// Header map, one value per name
pub type Headers = HashMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
        }
    }
}

/// Encoded request body and its media type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestBody {
    content_type: Option<String>,
    bytes: Vec<u8>,
}

impl RequestBody {
    /// Raw JSON text, sent as-is
    pub fn json(json: impl Into<String>) -> Self {
        Self {
            content_type: Some(JSON.to_string()),
            bytes: json.into().into_bytes(),
        }
    }

    /// Empty JSON-typed body
    pub fn empty_json() -> Self {
        Self::json("")
    }

    /// Form-urlencoded pairs, in iteration order
    pub fn form<I, K, V>(params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (key, value) in params {
            serializer.append_pair(key.as_ref(), value.as_ref());
        }
        let encoded = serializer.finish();
        Self {
            content_type: Some(FORM.to_string()),
            bytes: encoded.into_bytes(),
        }
    }

    /// Arbitrary bytes; without a content type none is sent
    pub fn bytes(content_type: Option<&str>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            content_type: content_type.map(String::from),
            bytes: bytes.into(),
        }
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// One outgoing request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSpec {
    method: Method,
    url: Url,
    headers: Vec<(String, String)>,
    body: Option<RequestBody>,
}

fn parse_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url).map_err(|e| HttpError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(HttpError::InvalidUrl {
            url: url.to_string(),
            reason: format!("unsupported scheme '{}'", scheme),
        }),
    }
}

impl RequestSpec {
    pub fn get(url: &str) -> Result<Self> {
        Ok(Self {
            method: Method::Get,
            url: parse_url(url)?,
            headers: Vec::new(),
            body: None,
        })
    }

    pub fn post(url: &str, body: RequestBody) -> Result<Self> {
        Ok(Self {
            method: Method::Post,
            url: parse_url(url)?,
            headers: Vec::new(),
            body: Some(body),
        })
    }

    /// Add headers; a name that is already present gets its value replaced
    pub fn headers<I, K, V>(mut self, headers: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (name, value) in headers {
            let (name, value) = (name.as_ref(), value.as_ref());
            if HeaderName::from_bytes(name.as_bytes()).is_err()
                || HeaderValue::from_str(value).is_err()
            {
                return Err(HttpError::InvalidHeader {
                    name: name.to_string(),
                });
            }

            self.headers.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
            self.headers.push((name.to_string(), value.to_string()));
        }
        Ok(self)
    }

    /// Append query parameters in iteration order. Repeated keys are kept.
    pub fn query<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let appended: Vec<String> = params
            .into_iter()
            .map(|(key, value)| {
                format!(
                    "{}={}",
                    utf8_percent_encode(key.as_ref(), QUERY_COMPONENT),
                    utf8_percent_encode(value.as_ref(), QUERY_COMPONENT)
                )
            })
            .collect();
        if appended.is_empty() {
            return self;
        }

        let query = match self.url.query() {
            Some(existing) if !existing.is_empty() => {
                format!("{}&{}", existing, appended.join("&"))
            }
            _ => appended.join("&"),
        };
        self.url.set_query(Some(&query));
        self
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn headers_list(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn body(&self) -> Option<&RequestBody> {
        self.body.as_ref()
    }
}
