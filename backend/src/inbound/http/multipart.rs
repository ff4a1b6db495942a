//! `multipart/form-data` decoding.
//!
//! [`decode`] is a pure parser over an in-memory body: it never touches the
//! filesystem, so callers decide where attachment bytes end up. Text parts
//! land in [`MultipartForm::fields`], parts carrying a `filename` land in
//! [`MultipartForm::files`]. When a name repeats, the last part wins.

use std::collections::HashMap;

/// Longest boundary RFC 2046 allows.
const MAX_BOUNDARY_LEN: usize = 70;

/// A decoded file part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    /// Client-supplied filename, possibly empty.
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Text fields and file parts of a decoded body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartForm {
    pub fields: HashMap<String, String>,
    pub files: HashMap<String, FilePart>,
}

impl MultipartForm {
    /// Text value of `name`, if sent.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Remove and return the file part called `name`.
    pub fn take_file(&mut self, name: &str) -> Option<FilePart> {
        self.files.remove(name)
    }
}

/// Why a body could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MultipartError {
    #[error("expected a multipart/form-data request")]
    NotMultipart,
    #[error("multipart boundary is missing")]
    MissingBoundary,
    #[error("multipart boundary is invalid")]
    InvalidBoundary,
    #[error("declared content length {declared} does not match body length {actual}")]
    LengthMismatch { declared: u64, actual: u64 },
    #[error("multipart body has no parts")]
    NoParts,
    #[error("multipart body is not terminated")]
    Unterminated,
    #[error("multipart part is missing its header separator")]
    MissingHeaderSeparator,
    #[error("field {name} is not valid UTF-8")]
    InvalidUtf8 { name: String },
}

/// Extract the boundary token from a `Content-Type` header value.
///
/// # Examples
/// ```
/// use pet_adoption::inbound::http::multipart::boundary_from_content_type;
///
/// let boundary = boundary_from_content_type("multipart/form-data; boundary=\"abc 123\"");
/// assert_eq!(boundary.as_deref(), Ok("abc 123"));
/// assert!(boundary_from_content_type("application/json").is_err());
/// ```
pub fn boundary_from_content_type(content_type: &str) -> Result<String, MultipartError> {
    let mut params = split_params(content_type).into_iter();
    let media_type = params.next().unwrap_or_default();
    if !media_type.trim().eq_ignore_ascii_case("multipart/form-data") {
        return Err(MultipartError::NotMultipart);
    }
    let boundary = params
        .filter_map(|param| parse_param(&param))
        .find(|(key, _)| key.eq_ignore_ascii_case("boundary"))
        .map(|(_, value)| value)
        .ok_or(MultipartError::MissingBoundary)?;
    validate_boundary(&boundary)?;
    Ok(boundary)
}

/// Reject a body whose length differs from its `Content-Length` header.
pub fn check_length(declared: Option<u64>, body: &[u8]) -> Result<(), MultipartError> {
    let actual = u64::try_from(body.len()).unwrap_or(u64::MAX);
    match declared {
        Some(declared) if declared != actual => {
            Err(MultipartError::LengthMismatch { declared, actual })
        }
        _ => Ok(()),
    }
}

fn validate_boundary(boundary: &str) -> Result<(), MultipartError> {
    if boundary.is_empty() {
        return Err(MultipartError::MissingBoundary);
    }
    if boundary.len() > MAX_BOUNDARY_LEN || boundary.contains(['\r', '\n']) {
        return Err(MultipartError::InvalidBoundary);
    }
    Ok(())
}

/// Decode `body` framed by `boundary`.
///
/// # Examples
/// ```
/// use pet_adoption::inbound::http::multipart::decode;
///
/// let body = b"--xyz\r\n\
/// Content-Disposition: form-data; name=\"name\"\r\n\r\n\
/// Rex\r\n\
/// --xyz\r\n\
/// Content-Disposition: form-data; name=\"image\"; filename=\"rex.png\"\r\n\
/// Content-Type: image/png\r\n\r\n\
/// \x89PNG\r\n\
/// --xyz--\r\n";
/// let form = decode(body, "xyz").expect("well-formed body");
/// assert_eq!(form.field("name"), Some("Rex"));
/// assert_eq!(form.files["image"].bytes, b"\x89PNG");
/// ```
pub fn decode(body: &[u8], boundary: &str) -> Result<MultipartForm, MultipartError> {
    validate_boundary(boundary)?;
    let delimiter = format!("--{boundary}");
    let mut segments = split_on(body, delimiter.as_bytes()).into_iter();
    // Preamble.
    segments.next();

    let mut form = MultipartForm::default();
    let mut saw_part = false;
    for segment in segments {
        if segment.starts_with(b"--") {
            return if saw_part {
                Ok(form)
            } else {
                Err(MultipartError::NoParts)
            };
        }
        saw_part = true;
        decode_part(strip_leading_line_break(segment), &mut form)?;
    }
    if saw_part {
        Err(MultipartError::Unterminated)
    } else {
        Err(MultipartError::NoParts)
    }
}

fn decode_part(part: &[u8], form: &mut MultipartForm) -> Result<(), MultipartError> {
    let (head, content) = split_headers(part).ok_or(MultipartError::MissingHeaderSeparator)?;
    let content = strip_trailing_line_break(content);
    let head = String::from_utf8_lossy(head);

    let mut name = None;
    let mut file_name = None;
    let mut content_type = None;
    for line in head.lines() {
        let Some((header, value)) = line.split_once(':') else {
            continue;
        };
        let header = header.trim();
        if header.eq_ignore_ascii_case("content-disposition") {
            for (key, param) in split_params(value).iter().filter_map(|p| parse_param(p)) {
                if key.eq_ignore_ascii_case("name") {
                    name = Some(param);
                } else if key.eq_ignore_ascii_case("filename") {
                    file_name = Some(param);
                }
            }
        } else if header.eq_ignore_ascii_case("content-type") {
            content_type = Some(value.trim().to_owned());
        }
    }

    let Some(name) = name else {
        return Ok(());
    };
    match file_name {
        Some(file_name) => {
            form.files.insert(
                name,
                FilePart {
                    file_name,
                    content_type,
                    bytes: content.to_vec(),
                },
            );
        }
        None => {
            let text = std::str::from_utf8(content)
                .map_err(|_| MultipartError::InvalidUtf8 { name: name.clone() })?;
            form.fields.insert(name, text.to_owned());
        }
    }
    Ok(())
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

fn split_on<'a>(body: &'a [u8], delimiter: &[u8]) -> Vec<&'a [u8]> {
    let mut parts = Vec::new();
    let mut rest = body;
    while let Some(at) = find(rest, delimiter) {
        let (head, tail) = rest.split_at(at);
        parts.push(head);
        rest = tail.get(delimiter.len()..).unwrap_or_default();
    }
    parts.push(rest);
    parts
}

fn split_headers(part: &[u8]) -> Option<(&[u8], &[u8])> {
    [&b"\r\n\r\n"[..], &b"\n\n"[..]]
        .into_iter()
        .filter_map(|separator| find(part, separator).map(|at| (at, separator.len())))
        .min_by_key(|(at, _)| *at)
        .map(|(at, len)| {
            let (head, rest) = part.split_at(at);
            (head, rest.get(len..).unwrap_or_default())
        })
}

fn strip_leading_line_break(segment: &[u8]) -> &[u8] {
    segment
        .strip_prefix(b"\r\n")
        .or_else(|| segment.strip_prefix(b"\n"))
        .unwrap_or(segment)
}

fn strip_trailing_line_break(content: &[u8]) -> &[u8] {
    content
        .strip_suffix(b"\r\n")
        .or_else(|| content.strip_suffix(b"\n"))
        .unwrap_or(content)
}

/// Split a header value on `;` outside double quotes.
fn split_params(value: &str) -> Vec<String> {
    let mut params = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut escaped = false;
    for ch in value.chars() {
        match ch {
            _ if escaped => {
                current.push(ch);
                escaped = false;
            }
            '\\' if quoted => {
                current.push(ch);
                escaped = true;
            }
            '"' => {
                current.push(ch);
                quoted = !quoted;
            }
            ';' if !quoted => params.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    params.push(current);
    params
}

/// Parse `key=value` or `key="quoted value"`.
fn parse_param(param: &str) -> Option<(String, String)> {
    let (key, value) = param.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    let value = value.trim();
    let value = match value
        .strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
    {
        Some(inner) => unescape(inner),
        None => value.to_owned(),
    };
    Some((key.to_owned(), value))
}

fn unescape(quoted: &str) -> String {
    let mut out = String::with_capacity(quoted.len());
    let mut chars = quoted.chars();
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
