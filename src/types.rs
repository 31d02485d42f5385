//! Request and response types exchanged with a device.
//!
//! [`DeviceRequest`] describes one call against the device's HTTP API:
//! method, endpoint path, optional body, extra headers. [`DeviceResponse`]
//! is the raw terminal outcome: status, headers, and the collected body.
//!
//! The crate deliberately does not model endpoint semantics. ISAPI paths,
//! XML/JSON payload schemas and their meaning belong to the caller; a 4xx or
//! 5xx device status is returned as a normal response, not as an error.
//!
//! # Examples
//!
//! ```
//! use isapi_client::{DeviceRequest, Method};
//!
//! let request = DeviceRequest::new(Method::PUT, "/ISAPI/System/deviceName")
//!     .with_body(r#"<DeviceName><name>lobby</name></DeviceName>"#.to_string());
//! assert_eq!(request.path(), "/ISAPI/System/deviceName");
//! ```

use bytes::Bytes;
use http::header::{HeaderMap, HeaderName, HeaderValue};
use http::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{IsapiError, Result};

/// One request against the device API.
///
/// Built with chainable `with_*` methods and handed to
/// [`Client::request`](crate::Client::request) or
/// [`AsyncClient::request`](crate::AsyncClient::request). The path is joined
/// onto the client's base URL; it may carry a query string.
#[derive(Debug, Clone)]
pub struct DeviceRequest {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) body: Option<Bytes>,
    pub(crate) headers: HeaderMap,
}

impl DeviceRequest {
    /// Create a request with no body and no extra headers.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        DeviceRequest {
            method,
            path: path.into(),
            body: None,
            headers: HeaderMap::new(),
        }
    }

    /// Attach a raw body. Callers set `Content-Type` themselves via
    /// [`with_header`](Self::with_header) when the device cares.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serialize `value` as the JSON body and set `Content-Type:
    /// application/json`.
    pub fn with_json_body<T: Serialize>(mut self, value: &T) -> Result<Self> {
        self.body = Some(Bytes::from(serde_json::to_vec(value)?));
        self.headers.insert(
            http::header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        Ok(self)
    }

    /// Add one header to the request. Later calls with the same name replace
    /// the earlier value.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// The HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The endpoint path this request targets.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The body, if one was attached.
    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Extra headers attached so far.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}

/// The raw outcome of a device exchange: status, headers, collected body.
///
/// Any HTTP status is a successful outcome of this layer, including device
/// errors; interpreting them against the device's API semantics is the
/// caller's job. [`error_for_status`](Self::error_for_status) is available
/// for callers who prefer non-2xx statuses as errors.
#[derive(Debug, Clone)]
pub struct DeviceResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl DeviceResponse {
    pub(crate) fn new(status: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
        DeviceResponse {
            status,
            headers,
            body,
        }
    }

    /// The HTTP status returned by the device.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The collected response body.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Consume the response, keeping only the body.
    pub fn into_body(self) -> Bytes {
        self.body
    }

    /// The body decoded as UTF-8, with invalid sequences replaced.
    ///
    /// Device XML is ASCII-clean in practice, so lossy decoding is safe for
    /// inspection and logging.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decode the body as JSON.
    ///
    /// # Errors
    ///
    /// [`IsapiError::Body`] when the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Promote a non-2xx status to [`IsapiError::DeviceStatus`].
    ///
    /// The crate never does this on its own; it mirrors what `requests`'
    /// `raise_for_status` offers callers who treat device errors as failures.
    pub fn error_for_status(self) -> Result<Self> {
        if self.status.is_success() {
            Ok(self)
        } else {
            Err(IsapiError::DeviceStatus(self.status))
        }
    }
}
