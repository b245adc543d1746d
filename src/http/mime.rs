//! Content-type detection by file extension.

use std::path::Path;

/// Returns the content type served for `path`, or `None` when the extension
/// is not one the server delivers.
///
/// # Example
///
/// ```
/// # use docroot::http::mime::content_type;
/// # use std::path::Path;
/// assert_eq!(content_type(Path::new("www/index.HTML")), Some("text/html"));
/// assert_eq!(content_type(Path::new("www/photo.jpg")), None);
/// ```
pub fn content_type(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "htm" | "html" => Some("text/html"),
        "png" => Some("image/png"),
        "txt" => Some("text/plain"),
        _ => None,
    }
}
