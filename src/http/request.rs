use std::fmt;
use std::path::PathBuf;

use bytes::Bytes;

use crate::http::docroot::{DocumentRoot, PathKind};
use crate::http::parser::{
    MultipartError, RequestLine, find_boundary, parse_multipart, parse_request_line,
    plain_payload, validate_part_name,
};

/// Classification of a request by what the server will do with it.
///
/// `Error` and `Pause` are never produced from client bytes; the connection
/// worker injects them for internal faults and maintenance mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Error,
    Pause,
    Get,
    Put,
    Post,
    /// DELETE is recognised but refused.
    NotAllowed,
    /// OPTIONS, HEAD, TRACE and CONNECT.
    NotImplemented,
    WrongHttp,
    Bad,
}

impl Method {
    /// Maps a method token read off the wire.
    ///
    /// # Example
    ///
    /// ```
    /// # use docroot::http::request::Method;
    /// assert_eq!(Method::from_token("GET"), Method::Get);
    /// assert_eq!(Method::from_token("HEAD"), Method::NotImplemented);
    /// assert_eq!(Method::from_token("get"), Method::Bad);
    /// ```
    pub fn from_token(token: &str) -> Self {
        match token {
            "GET" => Method::Get,
            "PUT" => Method::Put,
            "POST" => Method::Post,
            "DELETE" => Method::NotAllowed,
            "OPTIONS" | "HEAD" | "TRACE" | "CONNECT" => Method::NotImplemented,
            _ => Method::Bad,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Error => "ERROR",
            Method::Pause => "PAUSE",
            Method::Get => "GET",
            Method::Put => "PUT",
            Method::Post => "POST",
            Method::NotAllowed => "NOT_ALLOWED",
            Method::NotImplemented => "NOT_IMP",
            Method::WrongHttp => "WRONG_HTTP",
            Method::Bad => "BAD",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the connection worker hands to the engine.
#[derive(Debug, Clone)]
pub enum Incoming {
    /// Bytes read off the wire, complete or cut short by end-of-stream.
    Message(Bytes),
    /// Maintenance mode is on; nothing was read.
    Pause,
    /// Building the real response failed.
    Error,
}

/// A request target resolved against the document root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// The target as given in the request line (or rewritten by an upload).
    pub relative: String,
    pub absolute: PathBuf,
    pub kind: PathKind,
}

impl Target {
    /// Resolves and classifies `relative`.
    ///
    /// With `follow_index`, a directory holding `index.htm`/`index.html` is
    /// swapped for that file and classified again, once.
    pub async fn locate(root: &DocumentRoot, relative: String, follow_index: bool) -> Self {
        let Some(mut absolute) = root.resolve(&relative) else {
            let absolute = root.path().join(relative.trim_start_matches('/'));
            return Self {
                relative,
                absolute,
                kind: PathKind::Forbidden,
            };
        };

        let mut kind = root.classify(&absolute).await;
        if kind == PathKind::Directory && follow_index {
            if let Some(index) = root.index_file(&absolute).await {
                absolute = index;
                kind = root.classify(&absolute).await;
            }
        }

        Self {
            relative,
            absolute,
            kind,
        }
    }
}

/// A parsed and classified request. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Get(Target),
    Put { target: Target, payload: Vec<u8> },
    Post { target: Target, payload: Vec<u8> },
    NotAllowed,
    NotImplemented,
    WrongHttp,
    Bad,
    Error,
    Pause,
}

enum Payload {
    Plain(Vec<u8>),
    Upload { name: Option<String>, content: Vec<u8> },
}

impl Request {
    pub async fn from_incoming(incoming: &Incoming, root: &DocumentRoot) -> Self {
        match incoming {
            Incoming::Message(bytes) => Self::parse(bytes, root).await,
            Incoming::Pause => Request::Pause,
            Incoming::Error => Request::Error,
        }
    }

    /// Parses framed bytes and classifies the target path.
    pub async fn parse(message: &[u8], root: &DocumentRoot) -> Self {
        let (token, relative) = match parse_request_line(message) {
            RequestLine::Parsed { method, target } => (method, target),
            RequestLine::UnsupportedVersion(version) => {
                tracing::debug!(%version, "Unsupported HTTP version");
                return Request::WrongHttp;
            }
            RequestLine::Malformed => return Request::Bad,
        };

        match Method::from_token(&token) {
            Method::Get => Request::Get(Target::locate(root, relative, true).await),
            Method::Put => {
                let payload = match extract_payload(message) {
                    Ok(Payload::Plain(bytes)) => bytes,
                    Ok(Payload::Upload { content, .. }) => content,
                    Err(e) => return Self::rejected_upload(e),
                };
                let target = Target::locate(root, relative, false).await;
                Request::Put { target, payload }
            }
            Method::Post => {
                let (relative, payload) = match extract_payload(message) {
                    Ok(Payload::Plain(bytes)) => (relative, bytes),
                    Ok(Payload::Upload { name, content }) => {
                        let renamed = name
                            .ok_or(MultipartError::MissingName)
                            .and_then(|name| validate_part_name(&name).map(|n| replace_file_name(&relative, n)));
                        match renamed {
                            Ok(relative) => (relative, content),
                            Err(e) => return Self::rejected_upload(e),
                        }
                    }
                    Err(e) => return Self::rejected_upload(e),
                };
                let target = Target::locate(root, relative, false).await;
                Request::Post { target, payload }
            }
            Method::NotAllowed => Request::NotAllowed,
            Method::NotImplemented => Request::NotImplemented,
            Method::Error | Method::Pause | Method::WrongHttp | Method::Bad => Request::Bad,
        }
    }

    fn rejected_upload(error: MultipartError) -> Self {
        tracing::debug!(?error, "Rejected multipart payload");
        Request::Bad
    }

    pub fn method(&self) -> Method {
        match self {
            Request::Get(_) => Method::Get,
            Request::Put { .. } => Method::Put,
            Request::Post { .. } => Method::Post,
            Request::NotAllowed => Method::NotAllowed,
            Request::NotImplemented => Method::NotImplemented,
            Request::WrongHttp => Method::WrongHttp,
            Request::Bad => Method::Bad,
            Request::Error => Method::Error,
            Request::Pause => Method::Pause,
        }
    }

    pub fn target(&self) -> Option<&Target> {
        match self {
            Request::Get(target) | Request::Put { target, .. } | Request::Post { target, .. } => Some(target),
            _ => None,
        }
    }

    pub fn payload(&self) -> Option<&[u8]> {
        match self {
            Request::Put { payload, .. } | Request::Post { payload, .. } => Some(payload.as_slice()),
            _ => None,
        }
    }
}

fn extract_payload(message: &[u8]) -> Result<Payload, MultipartError> {
    match find_boundary(message) {
        Some((boundary, from)) => {
            let part = parse_multipart(message, &boundary, from)?;
            Ok(Payload::Upload {
                name: part.name,
                content: part.content,
            })
        }
        None => Ok(Payload::Plain(plain_payload(message))),
    }
}

/// Swaps the last segment of a request target for `name`.
pub(crate) fn replace_file_name(relative: &str, name: &str) -> String {
    let dir_end = relative.rfind('/').map_or(0, |i| i + 1);
    format!("{}{}", &relative[..dir_end], name)
}
