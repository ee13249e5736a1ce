//! Server-rendered HTML pages.
//!
//! Templates are embedded at compile time and registered once in a shared
//! Handlebars registry. Two helpers are available to templates:
//!
//! - `{{markdown text}}` renders Markdown to HTML (raw HTML escaped).
//! - `{{proxy_image url}}` rewrites external image URLs through the proxy.
//! - `{{url_encode value}}` percent-encodes a query string value.

pub mod markdown;

use std::sync::LazyLock;

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use handlebars::{
    Context, Handlebars, Helper, HelperResult, Output, RenderContext, TemplateError,
};
use reqwest::Url;
use ocwiki_core::error::CoreError;
use ocwiki_db::models::site_settings::SiteSettings;
use serde::Serialize;
use serde_json::json;

use crate::error::AppError;
use crate::image_proxy::proxied_image_url;

/// `(name, source)` of every page template.
const TEMPLATES: &[(&str, &str)] = &[
    ("home", include_str!("../../templates/home.hbs")),
    ("oc_list", include_str!("../../templates/oc_list.hbs")),
    ("oc_detail", include_str!("../../templates/oc_detail.hbs")),
    ("world_list", include_str!("../../templates/world_list.hbs")),
    ("world_detail", include_str!("../../templates/world_detail.hbs")),
    ("timeline_list", include_str!("../../templates/timeline_list.hbs")),
    ("timeline_detail", include_str!("../../templates/timeline_detail.hbs")),
    ("prompt_list", include_str!("../../templates/prompt_list.hbs")),
    ("error", include_str!("../../templates/error.hbs")),
    ("admin_login", include_str!("../../templates/admin_login.hbs")),
    ("admin_setup", include_str!("../../templates/admin_setup.hbs")),
    ("admin_dashboard", include_str!("../../templates/admin_dashboard.hbs")),
    ("admin_list", include_str!("../../templates/admin_list.hbs")),
    ("admin_edit", include_str!("../../templates/admin_edit.hbs")),
    ("admin_settings", include_str!("../../templates/admin_settings.hbs")),
];

/// `(name, source)` of shared partials.
const PARTIALS: &[(&str, &str)] = &[
    ("layout", include_str!("../../templates/partials/layout.hbs")),
    ("admin_layout", include_str!("../../templates/partials/admin_layout.hbs")),
    ("oc_card", include_str!("../../templates/partials/oc_card.hbs")),
    ("admin_field", include_str!("../../templates/partials/admin_field.hbs")),
];

static REGISTRY: LazyLock<Handlebars<'static>> =
    LazyLock::new(|| build_registry().expect("embedded templates are valid"));

/// Build the template registry.
pub fn build_registry() -> Result<Handlebars<'static>, TemplateError> {
    let mut hb = Handlebars::new();
    for (name, source) in PARTIALS {
        hb.register_partial(name, *source)?;
    }
    for (name, source) in TEMPLATES {
        hb.register_template_string(name, *source)?;
    }
    hb.register_helper("markdown", Box::new(markdown_helper));
    hb.register_helper("proxy_image", Box::new(proxy_image_helper));
    hb.register_helper("url_encode", Box::new(url_encode_helper));
    Ok(hb)
}

/// Render a registered template to HTML.
pub fn render<T: Serialize>(name: &str, ctx: &T) -> Result<Html<String>, PageError> {
    REGISTRY
        .render(name, ctx)
        .map(Html)
        .map_err(|e| PageError(AppError::InternalError(format!("render {name}: {e}"))))
}

/// Render a template with an explicit status code (e.g. a form re-shown
/// with an error message).
pub fn render_with_status<T: Serialize>(status: StatusCode, name: &str, ctx: &T) -> Response {
    match render(name, ctx) {
        Ok(html) => (status, html).into_response(),
        Err(e) => e.into_response(),
    }
}

fn markdown_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    if let Some(src) = h.param(0).and_then(|p| p.value().as_str()) {
        out.write(&markdown::render_markdown(src))?;
    }
    Ok(())
}

fn proxy_image_helper(
    h: &Helper,
    hb: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    if let Some(src) = h.param(0).and_then(|p| p.value().as_str()) {
        out.write(&hb.get_escape_fn()(&proxied_image_url(src)))?;
    }
    Ok(())
}

fn url_encode_helper(
    h: &Helper,
    hb: &Handlebars,
    _: &Context,
    _: &mut RenderContext,
    out: &mut dyn Output,
) -> HelperResult {
    if let Some(value) = h.param(0).and_then(|p| p.value().as_str()) {
        out.write(&hb.get_escape_fn()(&encode_query_value(value)))?;
    }
    Ok(())
}

/// `application/x-www-form-urlencoded` encoding of a single value.
fn encode_query_value(value: &str) -> String {
    Url::parse("http://query.invalid/")
        .map(|mut base| {
            base.query_pairs_mut().append_pair("v", value);
            base.query()
                .and_then(|q| q.strip_prefix("v="))
                .unwrap_or_default()
                .to_string()
        })
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error type for HTML handlers: same classification as [`AppError`], but
/// rendered as an error page instead of JSON.
#[derive(Debug)]
pub struct PageError(pub AppError);

pub type PageResult<T> = Result<T, PageError>;

impl From<AppError> for PageError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<CoreError> for PageError {
    fn from(err: CoreError) -> Self {
        Self(AppError::Core(err))
    }
}

impl From<sqlx::Error> for PageError {
    fn from(err: sqlx::Error) -> Self {
        Self(AppError::Database(err))
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let (status, _code, message) = self.0.classify();
        error_page(status, &message)
    }
}

/// Render the error page. Uses default site settings so it never needs the
/// database.
pub fn error_page(status: StatusCode, message: &str) -> Response {
    let ctx = json!({
        "site": SiteSettings::default(),
        "title": status.canonical_reason().unwrap_or("Error"),
        "status": status.as_u16(),
        "message": message,
    });
    match REGISTRY.render("error", &ctx) {
        Ok(body) => (status, Html(body)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to render error page");
            (status, message.to_string()).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_templates_compile() {
        build_registry().expect("templates should compile");
    }

    #[test]
    fn markdown_helper_renders_html() {
        let html = REGISTRY
            .render_template("{{markdown text}}", &json!({ "text": "**bold**" }))
            .unwrap();
        assert!(html.contains("<strong>bold</strong>"));
    }

    #[test]
    fn markdown_helper_ignores_null() {
        let html = REGISTRY
            .render_template("[{{markdown text}}]", &json!({ "text": null }))
            .unwrap();
        assert_eq!(html, "[]");
    }

    #[test]
    fn proxy_image_helper_rewrites_external_urls() {
        let html = REGISTRY
            .render_template(
                "{{proxy_image src}}",
                &json!({ "src": "https://img.example.com/a.png" }),
            )
            .unwrap();
        // `=` is HTML-escaped by the default escape function.
        assert!(html.starts_with("/api/image-proxy?url"));
        assert!(!html.contains("https://"));
    }

    #[test]
    fn url_encode_helper_escapes_query_delimiters() {
        let html = REGISTRY
            .render_template(
                r#"<a href="/ocs?q={{url_encode tag}}">"#,
                &json!({ "tag": "a&b #c+d/é" }),
            )
            .unwrap();
        assert_eq!(html, r#"<a href="/ocs?q=a%26b+%23c%2Bd%2F%C3%A9">"#);
    }

    #[test]
    fn error_page_keeps_status() {
        let response = error_page(StatusCode::NOT_FOUND, "OC 'x' not found");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
