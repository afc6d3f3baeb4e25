//! Exact decimal rendering of statistic values
//!
//! Energy, variance and entropy are printed in plain positional notation with
//! every digit the `f64` carries, up to a configurable number of fractional
//! digits. Rounding beyond that limit happens on the decimal digit string,
//! half to even, so no precision is lost to an intermediate float.

/// Default maximum number of fractional digits
pub const DEFAULT_FRACTION_DIGITS: usize = 100;

/// Decimal formatter with a fractional digit limit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecimalFormat {
    pub max_fraction_digits: usize,
}

impl Default for DecimalFormat {
    fn default() -> Self {
        Self {
            max_fraction_digits: DEFAULT_FRACTION_DIGITS,
        }
    }
}

impl DecimalFormat {
    pub fn new(max_fraction_digits: usize) -> Self {
        Self {
            max_fraction_digits,
        }
    }

    pub fn format(&self, value: f64) -> String {
        format_decimal(value, self.max_fraction_digits)
    }
}

/// Render `value` without exponent or grouping
///
/// The digits are the shortest decimal expansion that reads back as the same
/// `f64`. Fractional digits beyond `max_fraction_digits` are rounded half to
/// even; trailing fractional zeros are dropped.
///
/// ```ignore
/// assert_eq!(format_decimal(0.25, 100), "0.25");
/// assert_eq!(format_decimal(1e-7, 100), "0.0000001");
/// assert_eq!(format_decimal(2.5, 0), "2");
/// ```
pub fn format_decimal(value: f64, max_fraction_digits: usize) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    // f64 Display never switches to exponent notation
    let repr = format!("{}", value.abs());
    let (int_part, frac_part) = repr.split_once('.').unwrap_or((repr.as_str(), ""));

    let (int_digits, frac_digits) = if frac_part.len() > max_fraction_digits {
        round_half_even(int_part, frac_part, max_fraction_digits)
    } else {
        (int_part.to_string(), frac_part.to_string())
    };

    let frac_digits = frac_digits.trim_end_matches('0');
    let is_zero = int_digits.bytes().all(|b| b == b'0') && frac_digits.is_empty();

    let mut out = String::with_capacity(int_digits.len() + frac_digits.len() + 2);
    if value.is_sign_negative() && !is_zero {
        out.push('-');
    }
    out.push_str(&int_digits);
    if !frac_digits.is_empty() {
        out.push('.');
        out.push_str(frac_digits);
    }
    out
}

/// Round the digit string `int.frac` to `keep` fractional digits
fn round_half_even(int_part: &str, frac_part: &str, keep: usize) -> (String, String) {
    let frac = frac_part.as_bytes();
    let mut digits: Vec<u8> = int_part
        .bytes()
        .chain(frac[..keep].iter().copied())
        .map(|b| b - b'0')
        .collect();

    let next = frac[keep] - b'0';
    let rest_nonzero = frac[keep + 1..].iter().any(|&b| b != b'0');
    let last_odd = digits.last().is_some_and(|d| d % 2 == 1);

    let round_up = next > 5 || (next == 5 && (rest_nonzero || last_odd));

    let mut int_len = int_part.len();
    if round_up {
        let mut carry = true;
        for d in digits.iter_mut().rev() {
            if *d == 9 {
                *d = 0;
            } else {
                *d += 1;
                carry = false;
                break;
            }
        }
        if carry {
            digits.insert(0, 1);
            int_len += 1;
        }
    }

    let to_string = |ds: &[u8]| ds.iter().map(|d| (d + b'0') as char).collect::<String>();
    (to_string(&digits[..int_len]), to_string(&digits[int_len..]))
}
