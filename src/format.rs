//! Display formatting for market stats
//!
//! Output matches JavaScript `Number.prototype.toFixed` / `toExponential`
//! rendering for finite values below 1e21, which is what the web frontend
//! consuming these strings expects.

/// Enough fraction digits to hold the exact decimal expansion of any finite
/// `f64` (the smallest subnormal needs 1074).
const EXACT_DIGITS: usize = 1100;

/// Renders `value` with a fixed number of fraction digits.
///
/// Ties round away from zero on the exact binary value, so `0.125` becomes
/// `0.13` and `1.005` (really 1.00499...) becomes `1.00`. Negative zero
/// renders unsigned; non-finite values render as `NaN` / `Infinity` /
/// `-Infinity`.
pub fn to_fixed(value: f64, digits: usize) -> String {
    if let Some(s) = non_finite(value) {
        return s.to_string();
    }

    let value = value + 0.0;
    let exact = format!("{:.*}", EXACT_DIGITS, value.abs());
    let (int_part, frac) = exact.split_once('.').unwrap_or((exact.as_str(), ""));
    let (kept, rest) = frac.split_at(digits.min(frac.len()));

    let rounded = round_half_up(&format!("{}{}", int_part, kept), rest);
    let (whole, fraction) = rounded.split_at(rounded.len() - kept.len());
    let sign = if value < 0.0 { "-" } else { "" };

    if fraction.is_empty() {
        format!("{}{}", sign, whole)
    } else {
        format!("{}{}.{}", sign, whole, fraction)
    }
}

/// Renders `value` in exponential notation with `digits` fraction digits and
/// an explicitly signed exponent (`1.2340e-5`, `1.0000e+3`).
///
/// Mantissa ties round away from zero, as in [`to_fixed`].
pub fn to_exponential(value: f64, digits: usize) -> String {
    if let Some(s) = non_finite(value) {
        return s.to_string();
    }

    let value = value + 0.0;
    let exact = format!("{:.*e}", EXACT_DIGITS, value.abs());
    let (mantissa, exponent) = exact.split_once('e').unwrap_or((exact.as_str(), "0"));
    let mut exponent: i32 = exponent.parse().unwrap_or(0);
    let (lead, frac) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let (kept, rest) = frac.split_at(digits.min(frac.len()));

    let mut rounded = round_half_up(&format!("{}{}", lead, kept), rest);
    // 9.99..5 carries into a new leading digit
    if rounded.len() > lead.len() + kept.len() {
        exponent += 1;
        rounded.truncate(lead.len() + kept.len());
    }

    let (lead, fraction) = rounded.split_at(1);
    let sign = if value < 0.0 { "-" } else { "" };
    let exponent_sign = if exponent >= 0 { "+" } else { "" };

    if fraction.is_empty() {
        format!("{}{}e{}{}", sign, lead, exponent_sign, exponent)
    } else {
        format!("{}{}.{}e{}{}", sign, lead, fraction, exponent_sign, exponent)
    }
}

/// Rounds the decimal digit string `kept` by the exact digits that follow it
fn round_half_up(kept: &str, rest: &str) -> String {
    if !rest.as_bytes().first().is_some_and(|&b| b >= b'5') {
        return kept.to_string();
    }

    let mut bytes = kept.as_bytes().to_vec();
    for b in bytes.iter_mut().rev() {
        if *b == b'9' {
            *b = b'0';
        } else {
            *b += 1;
            return bytes.into_iter().map(char::from).collect();
        }
    }
    // all nines
    std::iter::once('1')
        .chain(bytes.into_iter().map(char::from))
        .collect()
}

fn non_finite(value: f64) -> Option<&'static str> {
    if value.is_nan() {
        Some("NaN")
    } else if value.is_infinite() {
        Some(if value > 0.0 { "Infinity" } else { "-Infinity" })
    } else {
        None
    }
}

/// Formats a USD amount abbreviated by magnitude: `$1.50B`, `$1.50M`,
/// `$1.50K` or `$150.50`.
///
/// Each tier includes its lower bound, so exactly `1e9` is `$1.00B`.
pub fn format_number(value: f64) -> String {
    if value >= 1e9 {
        format!("${}B", to_fixed(value / 1e9, 2))
    } else if value >= 1e6 {
        format!("${}M", to_fixed(value / 1e6, 2))
    } else if value >= 1e3 {
        format!("${}K", to_fixed(value / 1e3, 2))
    } else {
        format!("${}", to_fixed(value, 2))
    }
}

/// Formats a percentage with an explicit `+` for non-negative values.
pub fn format_percentage(value: f64) -> String {
    let sign = if value >= 0.0 { "+" } else { "" };
    format!("{}{}%", sign, to_fixed(value, 2))
}

/// Formats a USD price string.
///
/// Sub-cent prices are common for meme tokens, so precision widens as the
/// magnitude shrinks: below 0.0001 exponential with 4 digits, below 0.01
/// six decimals, otherwise four. Unparseable input renders as `$NaN`.
pub fn format_price(price: &str) -> String {
    // Strict parse: "inf" / "infinity" are accepted, but a numeric prefix
    // followed by junk ("1.5abc") is NaN rather than 1.5.
    let value = price.trim().parse::<f64>().unwrap_or(f64::NAN);
    let magnitude = value.abs();

    if magnitude < 0.0001 {
        format!("${}", to_exponential(value, 4))
    } else if magnitude < 0.01 {
        format!("${}", to_fixed(value, 6))
    } else {
        format!("${}", to_fixed(value, 4))
    }
}
