use std::fmt;

/// Money is represented in whole units of the smallest denomination the
/// teller deals in. Balances are unsigned: no operation may drive an
/// account below zero, so negative amounts are unrepresentable.
pub type Amount = u64;

/// Cash withdrawals are dispensed in fixed bills, so requested amounts
/// must be exact positive multiples of this denomination.
pub const WITHDRAWAL_DENOMINATION: Amount = 50_000;

/// Returns true if `amount` can be dispensed: positive and an exact
/// multiple of the withdrawal denomination.
pub fn is_denominated(amount: Amount) -> bool {
    amount > 0 && amount % WITHDRAWAL_DENOMINATION == 0
}

/// Format an amount as a currency string with thousands grouping.
/// Example: 500000 -> "$500,000"
pub fn format_amount(amount: Amount) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("${}", grouped)
}

/// Parse a user-entered amount string into an `Amount`.
/// Accepts plain digits with optional surrounding whitespace and an
/// optional leading `$`; grouping commas are accepted only in thousands
/// positions ("100,000", never "1,0,0").
pub fn parse_amount(input: &str) -> Result<Amount, ParseAmountError> {
    let input = input.trim().trim_start_matches('$');
    if input.is_empty() {
        return Err(ParseAmountError::Empty);
    }

    let digits = strip_grouping(input)
        .ok_or_else(|| ParseAmountError::InvalidFormat(input.to_string()))?;
    digits
        .parse()
        .map_err(|_| ParseAmountError::InvalidFormat(input.to_string()))
}

/// Remove grouping commas, rejecting any that are not in thousands
/// positions: 1-3 digits before the first comma, exactly 3 between
/// subsequent ones.
fn strip_grouping(input: &str) -> Option<String> {
    if !input.contains(',') {
        return Some(input.to_string());
    }
    let groups: Vec<&str> = input.split(',').collect();
    let (first, rest) = groups.split_first()?;
    if first.is_empty() || first.len() > 3 || rest.iter().any(|g| g.len() != 3) {
        return None;
    }
    Some(groups.concat())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseAmountError {
    Empty,
    InvalidFormat(String),
}

impl fmt::Display for ParseAmountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseAmountError::Empty => write!(f, "amount is empty"),
            ParseAmountError::InvalidFormat(input) => {
                write!(f, "'{}' is not a valid amount", input)
            }
        }
    }
}

impl std::error::Error for ParseAmountError {}
