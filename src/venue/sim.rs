use crate::venue::{TransportError, VenueTransport};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

#[derive(Clone)]
enum ResponseMode {
    Success,
    VenueError { code: String, message: String },
    TransportFailure(String),
}

/// Records every submitted request and answers with a configurable canned
/// response. Stands in for the live venue in tests and the demo binary.
#[derive(Clone)]
pub struct SimulatedVenue {
    requests: Arc<Mutex<Vec<Value>>>,
    mode: Arc<Mutex<ResponseMode>>,
}

impl SimulatedVenue {
    pub fn new() -> Self {
        Self {
            requests: Arc::new(Mutex::new(Vec::new())),
            mode: Arc::new(Mutex::new(ResponseMode::Success)),
        }
    }

    /// All requests submitted so far, in order
    pub fn requests(&self) -> Vec<Value> {
        self.requests.lock().unwrap().clone()
    }

    pub fn respond_ok(&self) {
        *self.mode.lock().unwrap() = ResponseMode::Success;
    }

    /// Answer subsequent sends with a venue-level error object
    pub fn respond_with_error(&self, code: &str, message: &str) {
        *self.mode.lock().unwrap() = ResponseMode::VenueError {
            code: code.to_string(),
            message: message.to_string(),
        };
    }

    /// Fail subsequent sends at the transport level
    pub fn fail_transport(&self, message: &str) {
        *self.mode.lock().unwrap() = ResponseMode::TransportFailure(message.to_string());
    }
}

impl Default for SimulatedVenue {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VenueTransport for SimulatedVenue {
    async fn send(&self, request: Value) -> Result<Value, TransportError> {
        let mode = self.mode.lock().unwrap().clone();
        match mode {
            ResponseMode::TransportFailure(message) => Err(TransportError(message)),
            ResponseMode::VenueError { code, message } => {
                self.requests.lock().unwrap().push(request);
                Ok(json!({
                    "error": { "code": code, "message": message }
                }))
            }
            ResponseMode::Success => {
                let tokens = request
                    .get("tokens")
                    .and_then(Value::as_array)
                    .map(|t| t.len())
                    .unwrap_or(0);
                self.requests.lock().unwrap().push(request);
                Ok(json!({
                    "buy_contract_for_multiple_accounts": {
                        "result": (0..tokens).map(|i| json!({
                            "contract_id": 1_000_000 + i as u64,
                            "token": i,
                        })).collect::<Vec<_>>()
                    }
                }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_requests_in_order() {
        let venue = SimulatedVenue::new();
        venue.send(json!({"price": 1})).await.unwrap();
        venue.send(json!({"price": 2})).await.unwrap();

        let requests = venue.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0]["price"], 1);
        assert_eq!(requests[1]["price"], 2);
    }

    #[tokio::test]
    async fn test_venue_error_mode() {
        let venue = SimulatedVenue::new();
        venue.respond_with_error("InvalidToken", "token expired");

        let response = venue.send(json!({})).await.unwrap();
        assert_eq!(response["error"]["code"], "InvalidToken");
    }

    #[tokio::test]
    async fn test_transport_failure_mode_records_nothing() {
        let venue = SimulatedVenue::new();
        venue.fail_transport("socket closed");

        let err = venue.send(json!({})).await.unwrap_err();
        assert_eq!(err, TransportError("socket closed".to_string()));
        assert!(venue.requests().is_empty());
    }
}
