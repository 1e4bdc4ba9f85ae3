use base64::prelude::*;
use serde::Deserialize;

use crate::core::error::{AppError, Result};

/// Claims this service consumes from the gateway-verified access token.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayClaims {
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// Decodes the claims payload of a JWS compact token without verifying the
/// signature. The API gateway in front of this service has already rejected
/// unsigned or tampered tokens.
pub fn decode_gateway_claims(token: &str) -> Result<GatewayClaims> {
    let mut segments = token.split('.');
    let payload = match (segments.next(), segments.next(), segments.next()) {
        (Some(_), Some(payload), Some(_)) => payload,
        _ => {
            return Err(AppError::Unauthorized(
                "Malformed bearer token".to_string(),
            ))
        }
    };

    let decoded = BASE64_URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|_| AppError::Unauthorized("Malformed bearer token payload".to_string()))?;

    let claims: GatewayClaims = serde_json::from_slice(&decoded)
        .map_err(|_| AppError::Unauthorized("Unreadable token claims".to_string()))?;

    if claims.sub.is_empty() {
        return Err(AppError::Unauthorized(
            "Token is missing the subject claim".to_string(),
        ));
    }

    Ok(claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_with_payload(payload: &str) -> String {
        let header = BASE64_URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","typ":"JWT"}"#);
        let body = BASE64_URL_SAFE_NO_PAD.encode(payload.as_bytes());
        format!("{}.{}.signature", header, body)
    }

    #[test]
    fn decodes_subject_and_email() {
        let token = token_with_payload(r#"{"sub":"user-123","email":"dispatcher@example.com"}"#);
        let claims = decode_gateway_claims(&token).unwrap();
        assert_eq!(claims.sub, "user-123");
        assert_eq!(claims.email.as_deref(), Some("dispatcher@example.com"));
    }

    #[test]
    fn tolerates_missing_email() {
        let token = token_with_payload(r#"{"sub":"user-123"}"#);
        let claims = decode_gateway_claims(&token).unwrap();
        assert!(claims.email.is_none());
    }

    #[test]
    fn rejects_tokens_without_three_segments() {
        assert!(decode_gateway_claims("not-a-jwt").is_err());
        assert!(decode_gateway_claims("only.two").is_err());
    }

    #[test]
    fn rejects_empty_subject() {
        let token = token_with_payload(r#"{"sub":""}"#);
        assert!(decode_gateway_claims(&token).is_err());
    }
}
