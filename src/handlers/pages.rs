//! Static result pages the storefront lands on after checkout.

use axum::{Router, extract::State, response::Html, routing::get};
use serde::Deserialize;

use crate::error::Result;
use crate::extractors::Query;
use crate::state::AppState;
use crate::storefront::ReturnView;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/success", get(success_page))
        .route("/failed", get(failed_page))
        .route("/return", get(return_page))
}

fn page(title: &str, body: &str, back_url: &str) -> Html<String> {
    Html(format!(
        "<!doctype html>\n<html><head><meta charset=\"utf-8\"><title>{title}</title></head>\
         <body style=\"display:flex;flex-direction:column;align-items:center;justify-content:center;height:100vh;gap:1rem;font-family:sans-serif\">\
         <h1>{title}</h1>{body}<a href=\"{back}\">Back to Products</a></body></html>",
        title = escape(title),
        body = body,
        back = escape(back_url),
    ))
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

pub async fn success_page(State(state): State<AppState>) -> Html<String> {
    page("Payment Successful!", "", &state.app_url)
}

pub async fn failed_page(State(state): State<AppState>) -> Html<String> {
    page("Payment Failed!", "", &state.app_url)
}

#[derive(Debug, Deserialize)]
pub struct ReturnQuery {
    #[serde(default)]
    pub session_id: String,
}

/// Landing page for the embedded checkout. Re-reads the session to decide
/// which message to show.
pub async fn return_page(
    State(state): State<AppState>,
    Query(query): Query<ReturnQuery>,
) -> Result<Html<String>> {
    let status = state.checkout.session_status(&query.session_id).await?;
    let view = ReturnView::from_status(status.status.as_deref(), status.customer_email);

    let html = match view {
        ReturnView::Complete { customer_email } => {
            let body = match customer_email {
                Some(email) => format!(
                    "<p>A confirmation email will be sent to {}.</p>",
                    escape(&email)
                ),
                None => String::new(),
            };
            page("Payment Successful!", &body, &state.app_url)
        }
        ReturnView::Open => page(
            "Payment not completed",
            "<p>Your checkout is still open.</p>",
            &state.app_url,
        ),
        ReturnView::Failed => page("Payment Failed!", "", &state.app_url),
    };

    Ok(html)
}
