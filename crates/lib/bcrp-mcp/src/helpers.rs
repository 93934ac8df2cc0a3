use std::borrow::Cow;

use bcrp_core::control::ControlError;
use rmcp::ErrorData;
use rmcp::model::ErrorCode;
use tracing::warn;

pub fn mcp_err(code: ErrorCode, message: impl Into<Cow<'static, str>>) -> ErrorData {
    ErrorData {
        code,
        message: message.into(),
        data: None,
    }
}

/// Bad arguments map to `INVALID_PARAMS`; everything else is an internal error.
pub fn map_err(err: ControlError) -> ErrorData {
    if err.is_invalid_input() {
        return mcp_err(ErrorCode::INVALID_PARAMS, err.to_string());
    }
    warn!(error = %err, "tool call failed");
    mcp_err(ErrorCode::INTERNAL_ERROR, err.to_string())
}
