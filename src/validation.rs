//! Producer-boundary validation for incoming order requests.
//!
//! Malformed orders are rejected here, before anything is persisted or
//! queued; the execution core only ever sees well-formed orders.

use crate::domain::OrderRequest;
use crate::error::{EngineError, Result};

/// Validate a swap input amount (must be a positive, finite number)
pub fn validate_amount(amount: f64, field_name: &str) -> Result<()> {
    if !amount.is_finite() {
        return Err(EngineError::Validation(format!(
            "{} must be a finite number: {}",
            field_name, amount
        )));
    }

    if amount <= 0.0 {
        return Err(EngineError::Validation(format!(
            "{} must be positive: {}",
            field_name, amount
        )));
    }

    Ok(())
}

/// Validate a slippage tolerance (must be between 0 and 1)
pub fn validate_slippage(slippage: f64) -> Result<()> {
    if !slippage.is_finite() || !(0.0..=1.0).contains(&slippage) {
        return Err(EngineError::Validation(format!(
            "slippage must be between 0 and 1: {}",
            slippage
        )));
    }

    Ok(())
}

/// Validate an asset symbol (non-empty after trimming)
pub fn validate_symbol(symbol: &str, field_name: &str) -> Result<()> {
    if symbol.trim().is_empty() {
        return Err(EngineError::Validation(format!(
            "{} must not be empty",
            field_name
        )));
    }

    Ok(())
}

/// Validate a complete order request at the producer boundary
pub fn validate_order_request(request: &OrderRequest) -> Result<()> {
    validate_symbol(&request.user_id, "userId")?;
    validate_symbol(&request.token_in, "tokenIn")?;
    validate_symbol(&request.token_out, "tokenOut")?;

    if request.token_in.trim().eq_ignore_ascii_case(request.token_out.trim()) {
        return Err(EngineError::Validation(
            "tokenIn and tokenOut must differ".to_string(),
        ));
    }

    validate_amount(request.amount_in, "amountIn")?;

    if let Some(slippage) = request.slippage {
        validate_slippage(slippage)?;
    }

    Ok(())
}
