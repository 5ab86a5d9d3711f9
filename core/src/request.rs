//! Request specification and the dispatch path.
//!
//! # Design
//! A [`RequestSpec`] carries everything needed to issue one call: method,
//! host selector, path, resolved parameters, and the expected response
//! shape. Dispatch resolves the host selector against the client's config,
//! hands the request to the injected transport, and interprets the result:
//! 4xx/5xx responses are classified into typed errors, everything else is
//! decoded as JSON or passed through raw (redirect responses must survive
//! untouched so callers can read their `Location` header). No retries and
//! no timeout logic live here — those are transport concerns.

use serde_json::Value;
use tracing::debug;

use crate::client::Client;
use crate::error::{classify, ApiError};
use crate::http::{Host, HttpMethod, HttpRequest, HttpResponse, Params, Transport};

/// Expected shape of a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// Decode the body as JSON.
    Json,
    /// Hand back the raw response, headers included.
    Raw,
}

/// One fully-resolved API request.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub method: HttpMethod,
    pub host: Host,
    pub path: String,
    pub params: Params,
    pub shape: ResponseShape,
}

impl RequestSpec {
    pub fn get(path: impl Into<String>, params: Params) -> Self {
        Self {
            method: HttpMethod::Get,
            host: Host::Api,
            path: path.into(),
            params,
            shape: ResponseShape::Json,
        }
    }

    pub fn post(path: impl Into<String>, params: Params) -> Self {
        Self {
            method: HttpMethod::Post,
            host: Host::Api,
            path: path.into(),
            params,
            shape: ResponseShape::Json,
        }
    }

    pub fn delete(path: impl Into<String>, params: Params) -> Self {
        Self {
            method: HttpMethod::Delete,
            host: Host::Api,
            path: path.into(),
            params,
            shape: ResponseShape::Json,
        }
    }

    /// Route this request to the search host.
    pub fn on_search_host(mut self) -> Self {
        self.host = Host::Search;
        self
    }

    /// Expect a raw response instead of a JSON body.
    pub fn raw(mut self) -> Self {
        self.shape = ResponseShape::Raw;
        self
    }
}

/// Dispatch result, per the request's expected response shape.
#[derive(Debug)]
pub enum Decoded {
    Json(Value),
    Raw(HttpResponse),
}

impl<T: Transport> Client<T> {
    /// Execute one request: select the host, invoke the transport, classify
    /// failures, and decode per the expected response shape.
    pub fn execute(&self, spec: &RequestSpec) -> Result<Decoded, ApiError> {
        match spec.shape {
            ResponseShape::Json => self.execute_json(spec).map(Decoded::Json),
            ResponseShape::Raw => self.round_trip(spec).map(Decoded::Raw),
        }
    }

    /// Execute and decode a JSON body.
    pub(crate) fn execute_json(&self, spec: &RequestSpec) -> Result<Value, ApiError> {
        let response = self.round_trip(spec)?;
        serde_json::from_str(&response.body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Execute and return the raw response (2xx/3xx only; failures are
    /// classified like everywhere else).
    pub(crate) fn round_trip(&self, spec: &RequestSpec) -> Result<HttpResponse, ApiError> {
        let base = match spec.host {
            Host::Api => self.config().api_host_url(),
            Host::Search => self.config().search_host_url(),
        };
        let request = HttpRequest {
            method: spec.method,
            url: format!("{}{}", base.trim_end_matches('/'), spec.path),
            params: spec.params.clone(),
        };
        debug!(method = ?request.method, url = %request.url, "issuing request");
        let response = self.transport().send(&request)?;
        debug!(status = response.status, url = %request.url, "response received");
        if response.status >= 400 {
            return Err(classify(response.status, &response.body).into());
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::error::ErrorKind;
    use crate::testing::ScriptedTransport;

    fn spec(path: &str) -> RequestSpec {
        RequestSpec::get(path, Params::new())
    }

    #[test]
    fn selects_api_host_by_default() {
        let transport = ScriptedTransport::replying(200, "{}");
        let client = Client::new(
            Config::new().api_host("http://api.test/").search_host("http://search.test"),
            transport,
        );
        client.execute(&spec("/1/users/show.json")).unwrap();
        let sent = client.transport().take_sent();
        assert_eq!(sent[0].url, "http://api.test/1/users/show.json");
    }

    #[test]
    fn search_selector_routes_to_search_host() {
        let transport = ScriptedTransport::replying(200, "{}");
        let client = Client::new(
            Config::new().api_host("http://api.test").search_host("http://search.test"),
            transport,
        );
        client
            .execute(&spec("/phoenix_search.phoenix").on_search_host())
            .unwrap();
        let sent = client.transport().take_sent();
        assert_eq!(sent[0].url, "http://search.test/phoenix_search.phoenix");
    }

    #[test]
    fn json_shape_decodes_the_body() {
        let transport = ScriptedTransport::replying(200, r#"{"id":7505382}"#);
        let client = Client::new(Config::new(), transport);
        match client.execute(&spec("/1/users/show.json")).unwrap() {
            Decoded::Json(value) => assert_eq!(value["id"], 7505382),
            Decoded::Raw(_) => panic!("expected JSON"),
        }
    }

    #[test]
    fn invalid_json_is_a_decode_error() {
        let transport = ScriptedTransport::replying(200, "not json");
        let client = Client::new(Config::new(), transport);
        let err = client.execute(&spec("/1/users/show.json")).unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[test]
    fn raw_shape_passes_redirects_through() {
        let transport = ScriptedTransport::new();
        transport.push_response(HttpResponse {
            status: 302,
            headers: vec![("Location".to_string(), "http://img.test/a.png".to_string())],
            body: String::new(),
        });
        let client = Client::new(Config::new(), transport);
        match client.execute(&spec("/1/users/profile_image/sferik").raw()).unwrap() {
            Decoded::Raw(response) => {
                assert_eq!(response.status, 302);
                assert_eq!(response.header("location"), Some("http://img.test/a.png"));
            }
            Decoded::Json(_) => panic!("expected raw"),
        }
    }

    #[test]
    fn failure_statuses_are_classified_even_for_raw_shape() {
        let transport = ScriptedTransport::replying(404, r#"{"error":"User not found."}"#);
        let client = Client::new(Config::new(), transport);
        let err = client
            .execute(&spec("/1/users/show.json").raw())
            .unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::NotFound));
    }

    #[test]
    fn transport_failure_propagates_untouched() {
        let transport = ScriptedTransport::failing("connection refused");
        let client = Client::new(Config::new(), transport);
        let err = client.execute(&spec("/1/users/show.json")).unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }
}
