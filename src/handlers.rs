pub mod auth;
pub mod campaigns;
pub mod health;
pub mod investments;
pub mod restaurants;

use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, Func, IntoColumnRef, SimpleExpr};

use crate::error::ApiError;

/// Case-insensitive substring match on a column.
pub(crate) fn contains_ignore_case<C: IntoColumnRef>(column: C, needle: &str) -> SimpleExpr {
    let escaped = needle
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    Expr::expr(Func::lower(Expr::col(column))).like(
        sea_orm::sea_query::LikeExpr::new(format!("%{escaped}%")).escape('\\'),
    )
}

/// Rejects decimals below `min` with a validation error naming `field`.
pub(crate) fn require_at_least(field: &str, value: Decimal, min: Decimal) -> Result<(), ApiError> {
    if value < min {
        return Err(ApiError::Validation(format!("{field}: must be at least {min}")));
    }
    Ok(())
}

/// Rejects decimals a `decimal(precision, scale)` column would round or refuse.
pub(crate) fn require_column_fit(
    field: &str,
    value: Decimal,
    precision: u32,
    scale: u32,
) -> Result<(), ApiError> {
    if !common::fits_column(value, precision, scale) {
        return Err(ApiError::Validation(format!(
            "{field}: must have at most {scale} decimal places and {} integer digits",
            precision - scale
        )));
    }
    Ok(())
}
