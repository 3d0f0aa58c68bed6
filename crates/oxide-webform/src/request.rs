//! Request snapshot consumed by forms.
//!
//! Forms never read from a socket. The host hands over an already decoded
//! request: the method string, the query and body parameter bags and the
//! uploaded files.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::FormError;
use crate::values::parse_name;

/// Form submission methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    /// GET method
    Get,
    /// POST method
    #[default]
    Post,
}

impl Method {
    /// Returns the method as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl FromStr for Method {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            _ => Err(FormError::InvalidMethod(s.to_string())),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A submitted parameter value.
///
/// Bracketed names (`tags[]`, `record[1][x]`) produce nested values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// A plain string value.
    Scalar(String),
    /// Values appended with `name[]`.
    List(Vec<ParamValue>),
    /// Values keyed with `name[key]`.
    Map(IndexMap<String, ParamValue>),
}

impl ParamValue {
    /// Returns the string if this is a scalar.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Returns whether this is a scalar.
    pub fn is_scalar(&self) -> bool {
        matches!(self, Self::Scalar(_))
    }

    /// Returns whether the value carries no data: an empty string or an
    /// empty collection.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Scalar(s) => s.is_empty(),
            Self::List(items) => items.is_empty(),
            Self::Map(map) => map.is_empty(),
        }
    }

    /// Looks up a child by key. Lists accept numeric keys as indexes.
    pub fn get(&self, key: &str) -> Option<&Self> {
        match self {
            Self::Scalar(_) => None,
            Self::List(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
            Self::Map(map) => map.get(key),
        }
    }

    /// Returns the scalar members of this value.
    ///
    /// A scalar yields itself, collections yield their direct scalar
    /// children.
    pub fn scalars(&self) -> Vec<&str> {
        match self {
            Self::Scalar(s) => vec![s.as_str()],
            Self::List(items) => items.iter().filter_map(Self::as_str).collect(),
            Self::Map(map) => map.values().filter_map(Self::as_str).collect(),
        }
    }

    /// Returns whether the value is, or directly contains, the given string.
    pub fn contains(&self, needle: &str) -> bool {
        self.scalars().contains(&needle)
    }

    /// Applies `f` to every scalar, recursing into collections.
    #[must_use]
    pub fn map_scalars(&self, f: &dyn Fn(&str) -> String) -> Self {
        match self {
            Self::Scalar(s) => Self::Scalar(f(s)),
            Self::List(items) => Self::List(items.iter().map(|v| v.map_scalars(f)).collect()),
            Self::Map(map) => Self::Map(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.map_scalars(f)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Scalar(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Scalar(value)
    }
}

impl From<Vec<&str>> for ParamValue {
    fn from(values: Vec<&str>) -> Self {
        Self::List(values.into_iter().map(Self::from).collect())
    }
}

/// Query or body parameters, in submission order.
pub type ParamBag = IndexMap<String, ParamValue>;

/// Status code reported by the transport for an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UploadStatus {
    /// The file arrived intact.
    #[default]
    Ok,
    /// Larger than the server-wide limit.
    IniSize,
    /// Larger than the limit declared by the form.
    FormSize,
    /// Only part of the file arrived.
    Partial,
    /// No file was chosen.
    NoFile,
    /// The server has no temporary directory.
    NoTmpDir,
    /// Writing the temporary file failed.
    CantWrite,
    /// A server extension stopped the upload.
    Extension,
}

impl UploadStatus {
    /// Maps the conventional numeric upload error codes.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Ok),
            1 => Some(Self::IniSize),
            2 => Some(Self::FormSize),
            3 => Some(Self::Partial),
            4 => Some(Self::NoFile),
            6 => Some(Self::NoTmpDir),
            7 => Some(Self::CantWrite),
            8 => Some(Self::Extension),
            _ => None,
        }
    }
}

/// An uploaded file, already stored in temporary storage by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    /// Filename declared by the client.
    pub name: String,
    /// Where the host stored the file.
    pub tmp_path: PathBuf,
    /// Size declared by the transport, in bytes.
    pub size: u64,
    /// Transport status.
    pub status: UploadStatus,
}

impl UploadedFile {
    /// Creates a successfully uploaded file.
    pub fn new(name: impl Into<String>, tmp_path: impl Into<PathBuf>, size: u64) -> Self {
        Self {
            name: name.into(),
            tmp_path: tmp_path.into(),
            size,
            status: UploadStatus::Ok,
        }
    }

    /// Creates the entry browsers send for an empty file input.
    pub fn empty() -> Self {
        Self {
            name: String::new(),
            tmp_path: PathBuf::new(),
            size: 0,
            status: UploadStatus::NoFile,
        }
    }

    /// Sets the transport status.
    #[must_use]
    pub fn status(mut self, status: UploadStatus) -> Self {
        self.status = status;
        self
    }

    /// Returns whether no file was chosen.
    pub fn is_empty(&self) -> bool {
        self.status == UploadStatus::NoFile || self.name.is_empty()
    }

    /// Returns the lowercased extension of the declared filename.
    pub fn extension(&self) -> Option<String> {
        self.name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .filter(|ext| !ext.is_empty())
    }
}

/// An incoming request, as seen by a form.
#[derive(Debug, Clone, Default)]
pub struct Request {
    /// Transport method string, if the transport reported one.
    pub method: Option<String>,
    /// Query string parameters.
    pub query: ParamBag,
    /// Body parameters.
    pub body: ParamBag,
    /// Uploaded files keyed by field name.
    pub files: IndexMap<String, UploadedFile>,
}

impl Request {
    /// Creates a request without method metadata.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a GET request.
    pub fn get() -> Self {
        Self::new().method("GET")
    }

    /// Creates a POST request.
    pub fn post() -> Self {
        Self::new().method("POST")
    }

    /// Sets the transport method string, verbatim.
    #[must_use]
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// Sets a query parameter.
    #[must_use]
    pub fn query_param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Sets a body parameter.
    #[must_use]
    pub fn body_param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.body.insert(key.into(), value.into());
        self
    }

    /// Adds an uploaded file.
    #[must_use]
    pub fn file(mut self, key: impl Into<String>, file: UploadedFile) -> Self {
        self.files.insert(key.into(), file);
        self
    }

    /// Parses a query string into the query bag.
    #[must_use]
    pub fn query_string(mut self, query: &str) -> Self {
        self.query = parse_urlencoded(query);
        self
    }

    /// Parses an `application/x-www-form-urlencoded` body into the body bag.
    #[must_use]
    pub fn form_body(mut self, body: &str) -> Self {
        self.body = parse_urlencoded(body);
        self
    }

    /// Returns the parameter bag for the given method.
    pub fn bag(&self, method: Method) -> &ParamBag {
        match method {
            Method::Get => &self.query,
            Method::Post => &self.body,
        }
    }

    /// Returns the parameter bag for the given method, mutably.
    pub fn bag_mut(&mut self, method: Method) -> &mut ParamBag {
        match method {
            Method::Get => &mut self.query,
            Method::Post => &mut self.body,
        }
    }
}

/// Parses urlencoded pairs into a bag, expanding bracketed names into
/// nested values.
pub fn parse_urlencoded(input: &str) -> ParamBag {
    let mut bag = ParamBag::new();
    for pair in input.split('&').filter(|pair| !pair.is_empty()) {
        let mut parts = pair.splitn(2, '=');
        let key = urlencoding_decode(parts.next().unwrap_or(""));
        let value = urlencoding_decode(parts.next().unwrap_or(""));
        insert_param(&mut bag, &key, value);
    }
    bag
}

/// Inserts a raw `name=value` pair, expanding `a[b][]` into nested values.
pub fn insert_param(bag: &mut ParamBag, raw_key: &str, value: String) {
    let Some((base, keys)) = parse_name(raw_key) else {
        bag.insert(raw_key.to_string(), ParamValue::Scalar(value));
        return;
    };

    let slot = bag
        .entry(base)
        .or_insert_with(|| empty_container(keys.first().map(String::as_str)));
    insert_nested(slot, &keys, value);
}

fn empty_container(next_key: Option<&str>) -> ParamValue {
    match next_key {
        Some("") => ParamValue::List(Vec::new()),
        _ => ParamValue::Map(IndexMap::new()),
    }
}

fn insert_nested(slot: &mut ParamValue, keys: &[String], value: String) {
    let Some((key, rest)) = keys.split_first() else {
        *slot = ParamValue::Scalar(value);
        return;
    };

    // A scalar sitting where a collection is needed gets replaced, the same
    // way a later duplicate key wins.
    if slot.is_scalar() {
        *slot = empty_container(Some(key));
    }

    let next = rest.first().map(String::as_str);
    match slot {
        ParamValue::List(items) => {
            if key.is_empty() {
                items.push(empty_container(next));
                if let Some(last) = items.last_mut() {
                    insert_nested(last, rest, value);
                }
            } else {
                // Keyed access on an appended list turns it into a map.
                let map: IndexMap<String, ParamValue> = items
                    .drain(..)
                    .enumerate()
                    .map(|(i, v)| (i.to_string(), v))
                    .collect();
                *slot = ParamValue::Map(map);
                insert_nested(slot, keys, value);
            }
        }
        ParamValue::Map(map) => {
            // A push takes the next index after the largest numeric key.
            let key = if key.is_empty() {
                map.keys()
                    .filter_map(|k| k.parse::<usize>().ok())
                    .max()
                    .map_or(0, |last| last + 1)
                    .to_string()
            } else {
                key.clone()
            };
            let child = map.entry(key).or_insert_with(|| empty_container(next));
            insert_nested(child, rest, value);
        }
        ParamValue::Scalar(_) => {}
    }
}

/// Simple URL decoding.
fn urlencoding_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut result = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'%' if i + 2 < bytes.len() => {
                let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).ok();
                match hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                    Some(byte) => {
                        result.push(byte);
                        i += 3;
                        continue;
                    }
                    None => result.push(b'%'),
                }
            }
            b'+' => result.push(b' '),
            other => result.push(other),
        }
        i += 1;
    }

    String::from_utf8_lossy(&result).into_owned()
}
