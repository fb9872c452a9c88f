use rust_decimal::Decimal;

/// What an investment pays back at the campaign's interest rate:
/// `amount * (1 + rate / 100)`, rounded to cents.
pub fn projected_return(amount: Decimal, interest_rate: Decimal) -> Decimal {
    gross_return(amount, interest_rate).round_dp(2)
}

/// Total payback over `(amount, interest_rate)` pairs, rounded to cents once
/// after summing.
pub fn potential_returns<I>(stakes: I) -> Decimal
where
    I: IntoIterator<Item = (Decimal, Decimal)>,
{
    stakes
        .into_iter()
        .map(|(amount, rate)| gross_return(amount, rate))
        .sum::<Decimal>()
        .round_dp(2)
}

fn gross_return(amount: Decimal, interest_rate: Decimal) -> Decimal {
    amount * (Decimal::ONE + interest_rate / Decimal::ONE_HUNDRED)
}
