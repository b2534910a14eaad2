//! # Channel Protocol
//!
//! Every WebSocket text frame is an envelope `{ "event": <channel>, "data": <payload> }`.

use serde::{Deserialize, Serialize};
use threat_domain::{GeoPosition, PositionUpdate, SYSTEM_UPDATE_CHANNEL, ThreatUpdatePayload};

use crate::error::{ApiError, ApiResult};

/// Greeting sent once to every new observer
pub const WELCOME_MESSAGE: &str = "Connected to real-time threat feed.";

/// Messages sent from the gateway to observers
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerMessage {
    #[serde(rename = "threatUpdate")]
    ThreatUpdate(ThreatUpdatePayload),

    #[serde(rename = "welcome")]
    Welcome { message: String },

    #[serde(rename = "ack")]
    Ack(Ack),
}

impl ServerMessage {
    pub fn welcome() -> Self {
        Self::Welcome {
            message: WELCOME_MESSAGE.to_string(),
        }
    }

    pub fn received() -> Self {
        Self::Ack(Ack {
            status: AckStatus::Received,
            code: None,
        })
    }

    pub fn rejected(err: &ApiError) -> Self {
        Self::Ack(Ack {
            status: AckStatus::Rejected,
            code: Some(err.error_code()),
        })
    }
}

/// Acknowledgement of an inbound update
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ack {
    pub status: AckStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AckStatus {
    Received,
    Rejected,
}

/// Inbound envelope before the payload is interpreted
#[derive(Debug, Deserialize)]
struct ClientEnvelope {
    event: String,
    #[serde(default)]
    data: serde_json::Value,
}

/// Parse and validate a reference-position update frame.
///
/// # Errors
///
/// Returns [`ApiError`] for malformed JSON, a channel other than
/// `systemUpdate`, non-numeric coordinates or out-of-range coordinates.
pub fn parse_position_update(text: &str) -> ApiResult<GeoPosition> {
    let envelope: ClientEnvelope = serde_json::from_str(text)?;
    if envelope.event != SYSTEM_UPDATE_CHANNEL {
        return Err(ApiError::UnsupportedChannel(envelope.event));
    }

    let update: PositionUpdate = serde_json::from_value(envelope.data)?;
    Ok(GeoPosition::try_from(update)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use threat_domain::{ACK_CHANNEL, THREAT_UPDATE_CHANNEL, WELCOME_CHANNEL};

    #[test]
    fn test_server_envelopes_use_channel_names() {
        let welcome = serde_json::to_value(ServerMessage::welcome()).unwrap();
        assert_eq!(welcome["event"], WELCOME_CHANNEL);
        assert_eq!(welcome["data"]["message"], WELCOME_MESSAGE);

        let update = serde_json::to_value(ServerMessage::ThreatUpdate(ThreatUpdatePayload {
            system_position: GeoPosition::default(),
            threat_track: None,
        }))
        .unwrap();
        assert_eq!(update["event"], THREAT_UPDATE_CHANNEL);
        assert_eq!(update["data"]["systemPosition"]["lat"], 52.52);
        assert!(update["data"]["threatTrack"].is_null());

        let ack = serde_json::to_value(ServerMessage::received()).unwrap();
        assert_eq!(ack["event"], ACK_CHANNEL);
        assert_eq!(ack, serde_json::json!({ "event": "ack", "data": { "status": "Received" } }));
    }

    #[test]
    fn test_rejection_carries_error_code() {
        let err = ApiError::UnsupportedChannel("jam".into());
        let ack = serde_json::to_value(ServerMessage::rejected(&err)).unwrap();
        assert_eq!(ack["data"]["status"], "Rejected");
        assert_eq!(ack["data"]["code"], "UNSUPPORTED_CHANNEL");
    }

    #[test]
    fn test_parse_valid_update() {
        let position =
            parse_position_update(r#"{"event":"systemUpdate","data":{"lat":48.8566,"lng":2.3522}}"#)
                .unwrap();
        assert!((position.latitude - 48.8566).abs() < f64::EPSILON);
        assert!((position.longitude - 2.3522).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_rejects_bad_frames() {
        assert!(matches!(
            parse_position_update("not json"),
            Err(ApiError::InvalidMessage(_))
        ));
        assert!(matches!(
            parse_position_update(r#"{"event":"systemUpdate","data":{"lat":"x","lng":1.0}}"#),
            Err(ApiError::InvalidMessage(_))
        ));
        assert!(matches!(
            parse_position_update(r#"{"event":"systemUpdate","data":{"lat":95.0,"lng":1.0}}"#),
            Err(ApiError::InvalidPosition(_))
        ));
        assert!(matches!(
            parse_position_update(r#"{"event":"threatUpdate","data":{"lat":1.0,"lng":1.0}}"#),
            Err(ApiError::UnsupportedChannel(_))
        ));
        assert!(matches!(
            parse_position_update(r#"{"event":"systemUpdate"}"#),
            Err(ApiError::InvalidMessage(_))
        ));
    }
}
