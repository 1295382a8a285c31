use crate::domain::{
    errors::{GatewayError, GatewayOperation},
    value_objects::BucketName,
};
use serde::Deserialize;
use thiserror::Error as ThisError;

/// Remote error codes worth retrying
const TRANSIENT_CODES: &[&str] = &[
    "InternalError",
    "ServiceUnavailable",
    "RequestTimeout",
    "Throttling",
];

/// Remote error codes meaning "nothing there"
const NOT_FOUND_CODES: &[&str] = &["NoSuchBucket", "NoSuchLifecycle"];

/// Error body OSS returns with every non-2xx response
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename = "Error", rename_all = "PascalCase")]
pub struct ErrorResponse {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub request_id: String,
    #[serde(default)]
    pub host_id: String,
}

#[derive(ThisError, Debug)]
pub enum OssError {
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("OSS returned {status}: {code}: {message} (request {request_id})")]
    Service {
        status: u16,
        code: String,
        message: String,
        request_id: String,
    },

    #[error("XML error: {0}")]
    Xml(String),

    #[error("Request signing failed: {0}")]
    Signing(String),

    #[error("Invalid header value: {0}")]
    InvalidHeader(String),
}

impl OssError {
    /// Build a service error from a non-2xx status and its body
    pub fn from_response(status: reqwest::StatusCode, body: &str) -> Self {
        let parsed: ErrorResponse = quick_xml::de::from_str(body).unwrap_or_default();
        let code = if parsed.code.is_empty() {
            status
                .canonical_reason()
                .unwrap_or("UnknownError")
                .replace(' ', "")
        } else {
            parsed.code
        };

        OssError::Service {
            status: status.as_u16(),
            code,
            message: parsed.message,
            request_id: parsed.request_id,
        }
    }

    /// Classify into the port's error, attaching operation and bucket
    pub fn into_gateway_error(self, operation: GatewayOperation, bucket: &BucketName) -> GatewayError {
        match self {
            OssError::Transport(e) => {
                let code = if e.is_timeout() { "RequestTimeout" } else { "RequestError" };
                GatewayError::transient(operation, bucket, code, e.to_string())
            }
            OssError::Service {
                status,
                code,
                message,
                ..
            } => {
                if NOT_FOUND_CODES.contains(&code.as_str()) {
                    GatewayError::not_found(operation, bucket, code, message)
                } else if TRANSIENT_CODES.contains(&code.as_str()) || status >= 500 || status == 429
                {
                    GatewayError::transient(operation, bucket, code, message)
                } else {
                    GatewayError::terminal(operation, bucket, code, message)
                }
            }
            other @ OssError::Xml(_) => {
                GatewayError::terminal(operation, bucket, "InvalidResponse", other.to_string())
            }
            other @ (OssError::Signing(_) | OssError::InvalidHeader(_)) => {
                GatewayError::terminal(operation, bucket, "InvalidRequest", other.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    fn classify(status: StatusCode, body: &str) -> GatewayError {
        let bucket = BucketName::new("examplebucket".to_string()).unwrap();
        OssError::from_response(status, body)
            .into_gateway_error(GatewayOperation::DeleteAllRules, &bucket)
    }

    fn body(code: &str) -> String {
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
             <Error><Code>{}</Code><Message>details</Message>\
             <RequestId>5C3D9175B6FC201293AD****</RequestId>\
             <HostId>examplebucket.oss-cn-hangzhou.aliyuncs.com</HostId></Error>",
            code
        )
    }

    #[test]
    fn test_parse_error_body() {
        match OssError::from_response(StatusCode::FORBIDDEN, &body("AccessDenied")) {
            OssError::Service {
                status,
                code,
                message,
                request_id,
            } => {
                assert_eq!(status, 403);
                assert_eq!(code, "AccessDenied");
                assert_eq!(message, "details");
                assert_eq!(request_id, "5C3D9175B6FC201293AD****");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_classification() {
        let denied = classify(StatusCode::FORBIDDEN, &body("AccessDenied"));
        assert!(matches!(denied, GatewayError::Terminal { .. }));
        assert_eq!(denied.code(), "AccessDenied");

        assert!(classify(StatusCode::NOT_FOUND, &body("NoSuchBucket")).is_not_found());
        assert!(classify(StatusCode::NOT_FOUND, &body("NoSuchLifecycle")).is_not_found());
        assert!(classify(StatusCode::SERVICE_UNAVAILABLE, &body("ServiceUnavailable")).is_retryable());
        assert!(classify(StatusCode::INTERNAL_SERVER_ERROR, "").is_retryable());
        assert!(!classify(StatusCode::BAD_REQUEST, &body("MalformedXML")).is_retryable());
    }

    #[test]
    fn test_unparseable_body_falls_back_to_status() {
        let err = classify(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>");
        assert!(err.is_retryable());
        assert_eq!(err.code(), "BadGateway");
    }
}
