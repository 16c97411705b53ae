//! Uniform response bodies.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const SUCCESS_CODE: i32 = 200;

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ResponseEnvelope<T> {
    pub code: i32,
    pub message: String,
    pub data: T,
}

impl<T> ResponseEnvelope<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            code: SUCCESS_CODE,
            message: message.into(),
            data,
        }
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorEnvelope {
    pub code: i32,
    pub message: String,
}

impl ErrorEnvelope {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn success_carries_data() -> Result<()> {
        let value = serde_json::to_value(ResponseEnvelope::success("ok", 1))?;
        assert_eq!(value, serde_json::json!({"code": 200, "message": "ok", "data": 1}));
        Ok(())
    }

    #[test]
    fn failure_has_no_data_field() -> Result<()> {
        let value = serde_json::to_value(ErrorEnvelope::new(1002, "invalid credential"))?;
        assert!(value.get("data").is_none());
        assert_eq!(value["code"], 1002);
        Ok(())
    }
}
