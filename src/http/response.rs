/// HTTP status codes the server answers with.
///
/// - `Ok` (200): File delivered
/// - `Created` (201): File created by PUT or POST
/// - `NoContent` (204): Existing file overwritten or appended to
/// - `BadRequest` (400): Malformed request
/// - `Forbidden` (403): Path not accessible, or a handler's file I/O failed
/// - `NotFound` (404): Nothing at the path
/// - `MethodNotAllowed` (405): DELETE
/// - `UnsupportedMediaType` (415): File type not served
/// - `InternalServerError` (500): Response construction failed
/// - `NotImplemented` (501): OPTIONS, HEAD, TRACE, CONNECT
/// - `ServiceUnavailable` (503): Maintenance mode
/// - `HttpVersionNotSupported` (505): Anything but HTTP/1.1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    Ok,
    Created,
    NoContent,
    BadRequest,
    Forbidden,
    NotFound,
    MethodNotAllowed,
    UnsupportedMediaType,
    InternalServerError,
    NotImplemented,
    ServiceUnavailable,
    HttpVersionNotSupported,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use docroot::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::HttpVersionNotSupported.as_u16(), 505);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::Created => 201,
            StatusCode::NoContent => 204,
            StatusCode::BadRequest => 400,
            StatusCode::Forbidden => 403,
            StatusCode::NotFound => 404,
            StatusCode::MethodNotAllowed => 405,
            StatusCode::UnsupportedMediaType => 415,
            StatusCode::InternalServerError => 500,
            StatusCode::NotImplemented => 501,
            StatusCode::ServiceUnavailable => 503,
            StatusCode::HttpVersionNotSupported => 505,
        }
    }

    /// Returns the reason phrase sent on the status line.
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::Created => "Created",
            StatusCode::NoContent => "No Content",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::Forbidden => "Forbidden",
            StatusCode::NotFound => "Not Found",
            StatusCode::MethodNotAllowed => "Method Not Allowed",
            StatusCode::UnsupportedMediaType => "Unsupported Media Type",
            StatusCode::InternalServerError => "Internal Server Error",
            StatusCode::NotImplemented => "Not Implemented",
            StatusCode::ServiceUnavailable => "Service Unavailable",
            StatusCode::HttpVersionNotSupported => "HTTP Version Not Supported",
        }
    }
}

/// A complete response, headers in wire order. Never mutated once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: StatusCode,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

/// Builder for [`Response`].
///
/// Header order is fixed: `Server`, `Content-Length`, `Content-Type`,
/// `Location`, `Connection`. 204 responses carry neither `Server` nor
/// `Content-Length`.
///
/// # Example
///
/// ```
/// # use docroot::http::response::{ResponseBuilder, StatusCode};
/// let response = ResponseBuilder::new(StatusCode::Ok)
///     .server("docroot")
///     .content_type("text/plain")
///     .body(b"hi".to_vec())
///     .build();
/// assert_eq!(response.header("Content-Length"), Some("2"));
/// ```
pub struct ResponseBuilder {
    status: StatusCode,
    server: Option<String>,
    content_type: Option<String>,
    location: Option<String>,
    body: Vec<u8>,
}

impl ResponseBuilder {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            server: None,
            content_type: None,
            location: None,
            body: Vec::new(),
        }
    }

    pub fn server(mut self, name: impl Into<String>) -> Self {
        self.server = Some(name.into());
        self
    }

    pub fn content_type(mut self, value: impl Into<String>) -> Self {
        self.content_type = Some(value.into());
        self
    }

    pub fn location(mut self, value: impl Into<String>) -> Self {
        self.location = Some(value.into());
        self
    }

    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// Builds the final Response, computing `Content-Length` from the body.
    pub fn build(self) -> Response {
        let mut headers = Vec::with_capacity(5);
        let no_content = self.status == StatusCode::NoContent;

        if let Some(server) = self.server.filter(|_| !no_content) {
            headers.push(("Server".to_string(), server));
        }
        if !no_content {
            headers.push(("Content-Length".to_string(), self.body.len().to_string()));
        }
        if let Some(content_type) = self.content_type {
            headers.push(("Content-Type".to_string(), content_type));
        }
        if let Some(location) = self.location {
            headers.push(("Location".to_string(), location));
        }
        headers.push(("Connection".to_string(), "close".to_string()));

        Response {
            status: self.status,
            headers,
            body: if no_content { Vec::new() } else { self.body },
        }
    }
}

impl Response {
    /// A fixed HTML page naming the status, e.g. 404's
    /// `<html><body><h1>404 Not Found</h1></body></html>` (48 bytes).
    pub fn status_page(status: StatusCode, server: &str) -> Self {
        let body = format!(
            "<html><body><h1>{} {}</h1></body></html>",
            status.as_u16(),
            status.reason_phrase()
        );
        ResponseBuilder::new(status)
            .server(server)
            .content_type("text/html")
            .body(body.into_bytes())
            .build()
    }

    /// 200 with a file body.
    pub fn ok(server: &str, content_type: &str, body: Vec<u8>) -> Self {
        ResponseBuilder::new(StatusCode::Ok)
            .server(server)
            .content_type(content_type)
            .body(body)
            .build()
    }

    /// 201 pointing at the created resource.
    pub fn created(server: &str, location: &str) -> Self {
        ResponseBuilder::new(StatusCode::Created)
            .server(server)
            .location(location)
            .build()
    }

    pub fn no_content() -> Self {
        ResponseBuilder::new(StatusCode::NoContent).build()
    }

    /// Retrieves a header value by exact name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}
