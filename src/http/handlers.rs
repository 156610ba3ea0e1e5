//! Request handlers: the observable contract of the sample app.
//!
//! Every trace-emitting handler follows the same order: open the span, emit
//! an event, perform the traced side effect, update the request metrics, and
//! only then build the response from the span's trace identifier.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::http::outbound::{self, OutboundError};
use crate::http::server::AppState;
use crate::trace::xray::TraceIdResponse;
use crate::trace::ActiveSpan;

/// Error surfaced when a traced outbound call fails. The request dies with a
/// server error; the process keeps serving.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct HandlerError(#[from] OutboundError);

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self.0, "outbound call failed");
        (StatusCode::BAD_GATEWAY, self.0.to_string()).into_response()
    }
}

/// `GET /`: liveness probe. No span, no metrics.
pub async fn root() -> &'static str {
    "healthcheck"
}

/// `GET /outgoing-http-call`: one traced fetch of the external URL.
pub async fn outgoing_http_call(
    State(state): State<AppState>,
) -> Result<Json<TraceIdResponse>, HandlerError> {
    let span = state.engine.start_root("outgoing-http-call");
    span.add_event(format!("Making a request to {}", state.external_url));

    let result = outbound::http_get(&state.http, &state.external_url).await;
    fail_span_on_error(&span, result)?;

    state.request_metrics.record_request();
    let response = TraceIdResponse::new(span.trace_id());
    span.end();
    Ok(Json(response))
}

/// `GET /aws-sdk-call`: one traced cloud-storage listing.
pub async fn aws_sdk_call(
    State(state): State<AppState>,
) -> Result<Json<TraceIdResponse>, HandlerError> {
    let span = state.engine.start_root("aws-sdk-call");
    span.add_event("listing s3 buckets");

    let buckets = fail_span_on_error(&span, state.store.list_buckets().await)?;
    span.set_attribute("bucket.count", buckets.to_string());

    state.request_metrics.record_request();
    let response = TraceIdResponse::new(span.trace_id());
    span.end();
    Ok(Json(response))
}

/// `GET /outgoing-sampleapp`: sequential fan-out to every configured
/// downstream instance, or one fallback external fetch.
///
/// The parent span covers the whole fan-out; each downstream call gets its
/// own child span, ended before the next iteration starts. The response
/// encodes the parent's trace id, never a child's.
pub async fn outgoing_sampleapp(
    State(state): State<AppState>,
) -> Result<Json<TraceIdResponse>, HandlerError> {
    let parent = state.engine.start_root("invoke-sample-apps");

    if state.settings.sample_app_ports.is_empty() {
        let child = state.engine.start_child("leaf-request", &parent);
        child.add_event(format!("Making a request to {}", state.external_url));
        let result = outbound::http_get(&state.http, &state.external_url).await;
        fail_span_on_error(&child, result)?;
        child.end();
    } else {
        for port in &state.settings.sample_app_ports {
            parent.add_event("Sampleapp detected. Generating nested span.");
            let child = state.engine.start_child("invoke-sampleapp", &parent);
            let url = format!("http://127.0.0.1:{port}/outgoing-sampleapp");
            tracing::debug!(%url, "invoking downstream sample app");
            let result = outbound::http_get(&state.http, &url).await;
            fail_span_on_error(&child, result)?;
            child.end();
        }
    }

    state.request_metrics.record_request();
    let response = TraceIdResponse::new(parent.trace_id());
    parent.end();
    Ok(Json(response))
}

/// Mark the span failed and convert the error. Open spans still end when the
/// handler's scope unwinds, so the error path never leaks a span.
fn fail_span_on_error<T>(
    span: &ActiveSpan,
    result: Result<T, OutboundError>,
) -> Result<T, HandlerError> {
    result.map_err(|err| {
        span.fail(&err);
        HandlerError(err)
    })
}
