//! HTTP mapping for domain errors.
//!
//! Business-rule refusals (`not_found`, `conflict`) share 400 with
//! validation failures. The JSON body carries the message under `error`.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use tracing::error;

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

const fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest | ErrorCode::NotFound | ErrorCode::Conflict => {
            StatusCode::BAD_REQUEST
        }
        ErrorCode::Unauthenticated => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn redact_if_internal(error: &Error) -> Error {
    if error.code() != ErrorCode::InternalError {
        return error.clone();
    }
    error!(message = error.message(), trace_id = error.trace_id(), "internal error");
    let redacted = Error::internal("Internal server error");
    match error.trace_id() {
        Some(id) => redacted.with_trace_id(id),
        None => redacted,
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        builder.json(redact_if_internal(self))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        error!(error = %err, "actix error promoted to domain error");
        Self::internal("Internal server error")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use rstest::rstest;
    use serde_json::Value;

    async fn body_of(error: &Error) -> Value {
        let bytes = to_bytes(error.error_response().into_body())
            .await
            .expect("body bytes");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[rstest]
    #[case(Error::invalid_request("All fields are required"), StatusCode::BAD_REQUEST)]
    #[case(Error::not_found("Pet not available"), StatusCode::BAD_REQUEST)]
    #[case(Error::conflict("You have already applied for this pet"), StatusCode::BAD_REQUEST)]
    #[case(Error::unauthenticated("Not authenticated"), StatusCode::UNAUTHORIZED)]
    #[case(Error::forbidden("Unauthorized"), StatusCode::FORBIDDEN)]
    #[case(Error::service_unavailable("pool exhausted"), StatusCode::SERVICE_UNAVAILABLE)]
    #[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
    fn codes_map_to_statuses(#[case] error: Error, #[case] expected: StatusCode) {
        assert_eq!(error.status_code(), expected);
    }

    #[rstest]
    #[actix_web::test]
    async fn business_errors_keep_their_message() {
        let body = body_of(&Error::conflict("Pet not available")).await;
        assert_eq!(body["error"], "Pet not available");
        assert_eq!(body["code"], "conflict");
    }

    #[rstest]
    #[actix_web::test]
    async fn internal_errors_are_redacted() {
        let error = Error::internal("relation \"pets\" does not exist");
        let body = body_of(&error).await;
        assert_eq!(body["error"], "Internal server error");
    }

    #[rstest]
    fn trace_identifier_is_sent_as_header() {
        let error = Error::invalid_request("bad").with_trace_id("abc");
        let response = error.error_response();
        assert_eq!(
            response
                .headers()
                .get(TRACE_ID_HEADER)
                .and_then(|value| value.to_str().ok()),
            Some("abc")
        );
    }
}
