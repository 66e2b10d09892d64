//! Page operation handlers
//!
//! One handler per operation. The router only calls a handler after the path
//! has been validated, so every title seen here is well formed. Handlers serve
//! every method; HEAD only strips the rendered body.

use std::future::Future;
use std::pin::Pin;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;

use crate::config::AppState;
use crate::error::StoreError;
use crate::http::{self, PageRequest};
use crate::logger;
use crate::page::{Page, Title};
use crate::render::View;
use crate::routing::Operation;

/// Form field carrying the page content on save
pub const BODY_FIELD: &str = "body";

pub type HandlerFuture<'a> = Pin<Box<dyn Future<Output = Response<Full<Bytes>>> + 'a>>;

/// A page operation, invoked with an already validated title
pub trait PageHandler: Sync {
    fn handle<'a>(
        &'a self,
        title: &'a Title,
        request: &'a PageRequest,
        state: &'a AppState,
    ) -> HandlerFuture<'a>;
}

/// Handler for an operation
pub fn handler_for(operation: Operation) -> &'static dyn PageHandler {
    match operation {
        Operation::View => &ViewHandler,
        Operation::Edit => &EditHandler,
        Operation::Save => &SaveHandler,
    }
}

/// Renders a stored page, or sends the client to the editor when it is absent
pub struct ViewHandler;

/// Renders the edit form for a stored or blank page
pub struct EditHandler;

/// Persists the submitted body and redirects to the page view
pub struct SaveHandler;

impl PageHandler for ViewHandler {
    fn handle<'a>(
        &'a self,
        title: &'a Title,
        request: &'a PageRequest,
        state: &'a AppState,
    ) -> HandlerFuture<'a> {
        Box::pin(async move {
            match state.store.load(title).await {
                Ok(page) => render_page(state, View::View, &page, request.is_head()),
                Err(StoreError::NotFound { .. }) => {
                    http::build_redirect_response(&Operation::Edit.path_for(title.as_str()))
                }
                Err(e) => storage_failure(&e),
            }
        })
    }
}

impl PageHandler for EditHandler {
    fn handle<'a>(
        &'a self,
        title: &'a Title,
        request: &'a PageRequest,
        state: &'a AppState,
    ) -> HandlerFuture<'a> {
        Box::pin(async move {
            let page = match state.store.load(title).await {
                Ok(page) => page,
                Err(StoreError::NotFound { .. }) => Page::blank(title.clone()),
                Err(e) => return storage_failure(&e),
            };
            render_page(state, View::Edit, &page, request.is_head())
        })
    }
}

impl PageHandler for SaveHandler {
    fn handle<'a>(
        &'a self,
        title: &'a Title,
        request: &'a PageRequest,
        state: &'a AppState,
    ) -> HandlerFuture<'a> {
        Box::pin(async move {
            let body = request.form_value(BODY_FIELD).unwrap_or_default();
            let page = Page::new(title.clone(), body);
            match state.store.save(&page).await {
                Ok(()) => http::build_redirect_response(&Operation::View.path_for(title.as_str())),
                Err(e) => storage_failure(&e),
            }
        })
    }
}

fn render_page(state: &AppState, view: View, page: &Page, is_head: bool) -> Response<Full<Bytes>> {
    match state.renderer.render(view, page) {
        Ok(html) => http::build_html_response(html, is_head),
        Err(e) => {
            logger::log_error(&format!("Rendering {view} for {}: {e}", page.title));
            http::build_500_response(&e.to_string())
        }
    }
}

fn storage_failure(err: &StoreError) -> Response<Full<Bytes>> {
    logger::log_error(&err.to_string());
    http::build_500_response(&err.to_string())
}
