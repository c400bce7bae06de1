//! Media types exchanged with registries.
//!
//! The adapter speaks a small, versioned set of vendor media types. Report
//! negotiation is strict: the `Accept` header must name the one report type
//! this adapter produces, parameters included. There is no fallback for an
//! empty header or `*/*`.

use std::{collections::BTreeMap, fmt, str::FromStr, sync::LazyLock};

use crate::error::{ModelError, Result};

/// A parsed `type/subtype; name=value` media type.
///
/// Type, subtype and parameter names are case-insensitive and stored
/// lowercased. Parameter values keep their case.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MimeType {
    type_: String,
    subtype: String,
    params: BTreeMap<String, String>,
}

/// `application/vnd.oci.image.manifest.v1+json`
pub static OCI_IMAGE_MANIFEST: LazyLock<MimeType> = LazyLock::new(|| {
    MimeType::new("application", "vnd.oci.image.manifest.v1+json")
});

/// `application/vnd.docker.distribution.manifest.v2+json`
pub static DOCKER_IMAGE_MANIFEST_V2: LazyLock<MimeType> = LazyLock::new(|| {
    MimeType::new("application", "vnd.docker.distribution.manifest.v2+json")
});

/// Content type of the `202 Accepted` body returned on scan submission.
pub static SCAN_RESPONSE: LazyLock<MimeType> = LazyLock::new(|| {
    MimeType::new("application", "vnd.scanner.adapter.scan.response+json")
        .with_param("version", "1.0")
});

/// The vulnerability report produced for finished scan jobs.
pub static SECURITY_VULNERABILITY_REPORT: LazyLock<MimeType> =
    LazyLock::new(|| {
        MimeType::new("application", "vnd.security.vulnerability.report")
            .with_param("version", "1.1")
    });

/// Content type of the scanner adapter metadata document.
pub static METADATA: LazyLock<MimeType> = LazyLock::new(|| {
    MimeType::new("application", "vnd.scanner.adapter.metadata+json")
        .with_param("version", "1.0")
});

/// Content type of every error envelope.
pub static ERROR: LazyLock<MimeType> = LazyLock::new(|| {
    MimeType::new("application", "vnd.scanner.adapter.error")
        .with_param("version", "1.0")
});

/// Report media types a client may request through `Accept`.
pub fn report_mime_types() -> [&'static MimeType; 1] {
    [&*SECURITY_VULNERABILITY_REPORT]
}

impl MimeType {
    pub fn new(type_: impl Into<String>, subtype: impl Into<String>) -> Self {
        Self {
            type_: type_.into().to_ascii_lowercase(),
            subtype: subtype.into().to_ascii_lowercase(),
            params: BTreeMap::new(),
        }
    }

    pub fn with_param(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.params
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    pub fn type_(&self) -> &str {
        &self.type_
    }

    pub fn subtype(&self) -> &str {
        &self.subtype
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Resolve the report media type requested by an `Accept` header value.
    ///
    /// Only an explicit, recognized report type is accepted. The error
    /// carries the raw header value so callers can echo it back.
    pub fn from_accept_header(value: &str) -> Result<Self> {
        let unsupported = || ModelError::UnsupportedMediaType(value.to_string());

        let parsed: MimeType = value.parse().map_err(|_| unsupported())?;

        report_mime_types()
            .into_iter()
            .find(|known| **known == parsed)
            .cloned()
            .ok_or_else(unsupported)
    }
}

impl fmt::Display for MimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.type_, self.subtype)?;
        for (name, value) in &self.params {
            if !value.is_empty() && value.chars().all(is_token_char) {
                write!(f, "; {name}={value}")?;
            } else {
                let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
                write!(f, "; {name}=\"{escaped}\"")?;
            }
        }
        Ok(())
    }
}

impl FromStr for MimeType {
    type Err = ModelError;

    fn from_str(raw: &str) -> Result<Self> {
        let invalid = |reason| ModelError::InvalidMediaType {
            value: raw.to_string(),
            reason,
        };

        let mut sections = raw.split(';');
        let essence = sections.next().unwrap_or_default().trim();
        if essence.is_empty() {
            return Err(invalid("empty media type"));
        }

        let (type_, subtype) = essence
            .split_once('/')
            .ok_or_else(|| invalid("expected type/subtype"))?;
        if !is_token(type_) || !is_token(subtype) {
            return Err(invalid("type and subtype must be tokens"));
        }
        if type_ == "*" || subtype == "*" {
            return Err(invalid("wildcards do not name a media type"));
        }

        let mut mime = MimeType::new(type_, subtype);
        for section in sections {
            let section = section.trim();
            if section.is_empty() {
                continue;
            }
            let (name, value) = section
                .split_once('=')
                .ok_or_else(|| invalid("parameter without value"))?;
            let name = name.trim();
            if !is_token(name) {
                return Err(invalid("parameter name must be a token"));
            }
            let value = parse_param_value(value.trim())
                .ok_or_else(|| invalid("malformed parameter value"))?;
            let key = name.to_ascii_lowercase();
            if mime.params.contains_key(&key) {
                return Err(invalid("duplicate parameter"));
            }
            mime.params.insert(key, value);
        }

        Ok(mime)
    }
}

fn parse_param_value(value: &str) -> Option<String> {
    if let Some(quoted) = value.strip_prefix('"') {
        let inner = quoted.strip_suffix('"')?;
        let mut out = String::with_capacity(inner.len());
        let mut chars = inner.chars();
        while let Some(c) = chars.next() {
            match c {
                '\\' => out.push(chars.next()?),
                '"' => return None,
                c => out.push(c),
            }
        }
        Some(out)
    } else if is_token(value) {
        Some(value.to_string())
    } else {
        None
    }
}

fn is_token(value: &str) -> bool {
    !value.is_empty() && value.chars().all(is_token_char)
}

// RFC 7230 tchar
fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "!#$%&'*+-.^_`|~".contains(c)
}
