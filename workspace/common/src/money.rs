use rust_decimal::Decimal;

/// `decimal(12, 2)`: investment amounts, goals and funding totals.
pub const MONEY_PRECISION: u32 = 12;
pub const MONEY_SCALE: u32 = 2;

/// `decimal(5, 2)`: interest rates in percent.
pub const RATE_PRECISION: u32 = 5;
pub const RATE_SCALE: u32 = 2;

/// Whether `value` is stored exactly by a `decimal(precision, scale)` column.
///
/// Trailing zeros do not count against the scale, so `10.500` fits
/// `decimal(12, 2)` while `0.005` does not.
pub fn fits_column(value: Decimal, precision: u32, scale: u32) -> bool {
    if value.normalize().scale() > scale {
        return false;
    }
    let Some(limit) = 10u64.checked_pow(precision.saturating_sub(scale)) else {
        return true;
    };
    value.abs() < Decimal::from(limit)
}

pub fn is_money(value: Decimal) -> bool {
    fits_column(value, MONEY_PRECISION, MONEY_SCALE)
}

pub fn is_rate(value: Decimal) -> bool {
    fits_column(value, RATE_PRECISION, RATE_SCALE)
}
