//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: body collection, path validation,
//! and dispatch to the page handlers.

use crate::config::AppState;
use crate::handler::pages::handler_for;
use crate::http::{self, PageRequest};
use crate::logger::{self, AccessLogEntry};
use crate::routing;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::header::{CONTENT_LENGTH, CONTENT_TYPE, REFERER, SERVER, USER_AGENT};
use hyper::{HeaderMap, Request, Response, Version};
use percent_encoding::percent_decode_str;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body,
    B::Error: std::error::Error + Send + Sync + 'static,
{
    let started = Instant::now();
    let (parts, body) = req.into_parts();

    let mut entry = state.config.logging.access_log.then(|| {
        let mut entry = AccessLogEntry::new(
            peer_addr.ip().to_string(),
            parts.method.to_string(),
            parts.uri.path().to_string(),
        );
        entry.query = parts.uri.query().map(ToString::to_string);
        entry.http_version = version_label(parts.version).to_string();
        entry.referer = header_string(&parts.headers, REFERER.as_str());
        entry.user_agent = header_string(&parts.headers, USER_AGENT.as_str());
        entry
    });

    let max_body_size = state.config.http.max_body_size;
    let mut response = if declared_too_large(&parts.headers, max_body_size) {
        http::build_413_response()
    } else {
        match collect_body(body, max_body_size).await {
            Ok(bytes) => {
                let mut request = PageRequest::new(parts.method);
                request.query = parts.uri.query().map(ToString::to_string);
                request.content_type = header_string(&parts.headers, CONTENT_TYPE.as_str());
                request.body = bytes;
                dispatch(parts.uri.path(), &request, &state).await
            }
            Err(resp) => resp,
        }
    };

    if let Ok(value) = state.config.http.server_name.parse() {
        response.headers_mut().insert(SERVER, value);
    }

    if let Some(entry) = entry.as_mut() {
        entry.status = response.status().as_u16();
        entry.body_bytes = response
            .body()
            .size_hint()
            .exact()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(0);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Route a validated request to its page handler
///
/// Paths outside `/(view|edit|save)/<title>` get a 404 without touching the
/// page store. Every method reaches the matched handler.
pub async fn dispatch(path: &str, request: &PageRequest, state: &AppState) -> Response<Full<Bytes>> {
    // Titles are matched against the decoded path, so `/view/Te%73t` is `Test`
    let Ok(decoded) = percent_decode_str(path).decode_utf8() else {
        logger::log_debug(&format!("Path is not UTF-8 once decoded: {path}"));
        return http::build_404_response();
    };
    let Some((operation, title)) = routing::match_path(&decoded) else {
        logger::log_debug(&format!("No page route for {path}"));
        return http::build_404_response();
    };
    logger::log_debug(&format!("Matched {operation} for page {title}"));

    handler_for(operation).handle(&title, request, state).await
}

/// Check the declared Content-Length against the configured limit
fn declared_too_large(headers: &HeaderMap, max_body_size: u64) -> bool {
    let Some(value) = headers.get(CONTENT_LENGTH) else {
        return false;
    };
    match value.to_str().ok().and_then(|v| v.parse::<u64>().ok()) {
        Some(size) if size > max_body_size => {
            logger::log_warning(&format!(
                "Request body too large: {size} bytes (max: {max_body_size})"
            ));
            true
        }
        Some(_) => false,
        None => {
            logger::log_warning("Invalid Content-Length header, skipping size check");
            false
        }
    }
}

/// Read the whole body, enforcing the size limit on the actual bytes
async fn collect_body<B>(body: B, max_body_size: u64) -> Result<Bytes, Response<Full<Bytes>>>
where
    B: Body,
    B::Error: std::error::Error + Send + Sync + 'static,
{
    let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            logger::log_warning(&format!("Request body exceeded {max_body_size} bytes"));
            Err(http::build_413_response())
        }
        Err(e) => {
            logger::log_error(&format!("Failed to read request body: {e}"));
            Err(http::build_400_response("unreadable request body"))
        }
    }
}

fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

const fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}
