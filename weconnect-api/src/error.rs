use std::str::FromStr;

use anyhow::{anyhow, Context};
use serde_json::json;
use uuid::Uuid;

use crate::{PostId, Time};

#[derive(Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Unknown error: {0}")]
    Unknown(String),

    #[error("Permission denied")]
    PermissionDenied,

    #[error("Post not found {0:?}")]
    PostNotFound(PostId),

    #[error("Uuid already used {0}")]
    UuidAlreadyUsed(Uuid),

    #[error("Null byte in string is not allowed {0:?}")]
    NullByteInString(String),

    #[error("Timestamp out of allowed range {0}")]
    InvalidTime(Time),
}

impl Error {
    pub fn status_code(&self) -> http::StatusCode {
        use http::StatusCode;
        match self {
            Error::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::PermissionDenied => StatusCode::FORBIDDEN,
            Error::PostNotFound(_) => StatusCode::NOT_FOUND,
            Error::UuidAlreadyUsed(_) => StatusCode::CONFLICT,
            Error::NullByteInString(_) => StatusCode::BAD_REQUEST,
            Error::InvalidTime(_) => StatusCode::BAD_REQUEST,
        }
    }

    pub fn contents(&self) -> Vec<u8> {
        serde_json::to_vec(&match self {
            Error::Unknown(msg) => json!({
                "message": msg,
                "type": "unknown",
            }),
            Error::PermissionDenied => json!({
                "message": "permission denied",
                "type": "permission-denied",
            }),
            Error::PostNotFound(p) => json!({
                "message": "post not found",
                "type": "post-not-found",
                "post": p,
            }),
            Error::UuidAlreadyUsed(u) => json!({
                "message": "uuid conflict",
                "type": "conflict-uuid",
                "uuid": u,
            }),
            Error::NullByteInString(s) => json!({
                "message": "there was a null byte in argument string",
                "type": "null-byte",
                "string": s,
            }),
            Error::InvalidTime(t) => json!({
                "message": "timestamp is out of the allowed range",
                "type": "invalid-time",
                "time": t,
            }),
        })
        .expect("serializing error contents")
    }

    pub fn parse(body: &[u8]) -> anyhow::Result<Error> {
        let data: serde_json::Value =
            serde_json::from_slice(body).context("parsing error contents")?;
        Ok(
            match data
                .get("type")
                .and_then(|t| t.as_str())
                .ok_or_else(|| anyhow!("error type is not a string"))?
            {
                "unknown" => Error::Unknown(String::from(
                    data.get("message")
                        .and_then(|msg| msg.as_str())
                        .unwrap_or(""),
                )),
                "permission-denied" => Error::PermissionDenied,
                "post-not-found" => Error::PostNotFound(PostId(
                    data.get("post")
                        .and_then(|p| p.as_str())
                        .and_then(|p| Uuid::from_str(p).ok())
                        .ok_or_else(|| anyhow!("error is a post-not-found without a post id"))?,
                )),
                "conflict-uuid" => Error::UuidAlreadyUsed(
                    data.get("uuid")
                        .and_then(|uuid| uuid.as_str())
                        .and_then(|uuid| Uuid::from_str(uuid).ok())
                        .ok_or_else(|| anyhow!("error is a uuid conflict without a proper uuid"))?,
                ),
                "null-byte" => Error::NullByteInString(String::from(
                    data.get("string").and_then(|s| s.as_str()).ok_or_else(|| {
                        anyhow!("error is a null-byte-in-string without a string")
                    })?,
                )),
                "invalid-time" => Error::InvalidTime(
                    data.get("time")
                        .and_then(|t| serde_json::from_value(t.clone()).ok())
                        .ok_or_else(|| anyhow!("error is an invalid-time without a timestamp"))?,
                ),
                _ => return Err(anyhow!("error contents has unknown type")),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn errors_round_trip_through_json() {
        let errors = vec![
            Error::Unknown(String::from("boom")),
            Error::PermissionDenied,
            Error::PostNotFound(PostId::stub()),
            Error::UuidAlreadyUsed(crate::STUB_UUID),
            Error::NullByteInString(String::from("a\0b")),
            Error::InvalidTime(Utc::now()),
        ];
        for e in errors {
            let parsed = Error::parse(&e.contents()).expect("parsing error contents");
            assert_eq!(parsed, e);
        }
    }
}
