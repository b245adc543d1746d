//! Maps a classified request to its response.
//!
//! File reads and writes are the only side effects. Any I/O failure inside a
//! handler becomes a 403; nothing here returns an error or panics on bad
//! input.

use std::io;

use tracing::warn;

use crate::http::docroot::{DocumentRoot, PathKind};
use crate::http::mime;
use crate::http::request::{Incoming, Request, Target, replace_file_name};
use crate::http::response::{Response, StatusCode};
use crate::server::context::ServerContext;

/// Only targets below this directory are writable through POST.
pub const POST_DIR: &str = "post";

/// Parses `incoming` and builds its response.
pub async fn respond(incoming: &Incoming, ctx: &ServerContext) -> Response {
    let request = Request::from_incoming(incoming, &ctx.root).await;
    let response = build_response(&request, ctx).await;

    tracing::info!(
        method = %request.method(),
        path = request.target().map(|t| t.relative.as_str()).unwrap_or("-"),
        status = response.status.as_u16(),
        "Request handled"
    );

    response
}

pub async fn build_response(request: &Request, ctx: &ServerContext) -> Response {
    let server = ctx.server_name.as_str();

    match request {
        Request::Get(target) => match target.kind {
            PathKind::File => serve_file(target, ctx).await,
            PathKind::Forbidden | PathKind::Directory => Response::status_page(StatusCode::Forbidden, server),
            PathKind::NotExist => Response::status_page(StatusCode::NotFound, server),
        },
        Request::Put { target, payload } => match target.kind {
            PathKind::File => {
                let written = ctx.root.write(&target.absolute, payload).await;
                or_forbidden(written.map(|_| Response::no_content()), target, ctx)
            }
            PathKind::Forbidden | PathKind::Directory => Response::status_page(StatusCode::Forbidden, server),
            PathKind::NotExist => {
                let written = ctx.root.write(&target.absolute, payload).await;
                or_forbidden(written.map(|_| Response::created(server, &target.relative)), target, ctx)
            }
        },
        Request::Post { target, payload } => post(target, payload, ctx).await,
        Request::NotAllowed => Response::status_page(StatusCode::MethodNotAllowed, server),
        Request::NotImplemented => Response::status_page(StatusCode::NotImplemented, server),
        Request::WrongHttp => Response::status_page(StatusCode::HttpVersionNotSupported, server),
        Request::Bad => Response::status_page(StatusCode::BadRequest, server),
        Request::Error => Response::status_page(StatusCode::InternalServerError, server),
        Request::Pause => Response::status_page(StatusCode::ServiceUnavailable, server),
    }
}

async fn serve_file(target: &Target, ctx: &ServerContext) -> Response {
    let server = ctx.server_name.as_str();

    let Some(content_type) = mime::content_type(&target.absolute) else {
        return Response::status_page(StatusCode::UnsupportedMediaType, server);
    };

    let read = ctx.root.read(&target.absolute).await;
    or_forbidden(read.map(|body| Response::ok(server, content_type, body)), target, ctx)
}

/// POST creates new files, appends to the append target, and otherwise
/// stores the upload next to the existing file under a fresh name.
async fn post(target: &Target, payload: &[u8], ctx: &ServerContext) -> Response {
    let server = ctx.server_name.as_str();

    if !ctx.root.is_below(POST_DIR, &target.absolute) {
        return Response::status_page(StatusCode::Forbidden, server);
    }

    match target.kind {
        PathKind::NotExist => {
            let written = ctx.root.write(&target.absolute, payload).await;
            or_forbidden(written.map(|_| Response::created(server, &target.relative)), target, ctx)
        }
        PathKind::File if target.absolute == ctx.append_target => {
            let appended = ctx.root.append(&target.absolute, payload).await;
            or_forbidden(appended.map(|_| Response::no_content()), target, ctx)
        }
        PathKind::File => {
            let copy = DocumentRoot::unique_sibling(&target.absolute);
            let copy_name = copy
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let location = replace_file_name(&target.relative, &copy_name);

            let written = ctx.root.write(&copy, payload).await;
            or_forbidden(written.map(|_| Response::created(server, &location)), target, ctx)
        }
        PathKind::Directory | PathKind::Forbidden => Response::status_page(StatusCode::Forbidden, server),
    }
}

fn or_forbidden(result: io::Result<Response>, target: &Target, ctx: &ServerContext) -> Response {
    result.unwrap_or_else(|e| {
        warn!(error = %e, path = %target.absolute.display(), "File access failed");
        Response::status_page(StatusCode::Forbidden, &ctx.server_name)
    })
}
