//! Kubernetes resource quantity parsing
//!
//! Quantities arrive as strings such as `250m`, `128Mi`, `1.5` or `12e6`.
//! Values are converted to integers rounding up, matching how the API
//! machinery reports `MilliValue()` and `Value()`.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuantityError {
    #[error("empty quantity")]
    Empty,

    #[error("invalid number in quantity '{0}'")]
    InvalidNumber(String),

    #[error("unknown suffix in quantity '{0}'")]
    UnknownSuffix(String),

    #[error("quantity '{0}' is out of range")]
    Overflow(String),
}

/// Parse a CPU quantity into milli-units (`"1"` -> 1000, `"250m"` -> 250)
pub fn parse_cpu_millis(s: &str) -> Result<i64, QuantityError> {
    Parsed::parse(s)?.scaled(3, s)
}

/// Parse a memory quantity into bytes (`"1Ki"` -> 1024, `"1k"` -> 1000)
pub fn parse_memory_bytes(s: &str) -> Result<i64, QuantityError> {
    Parsed::parse(s)?.scaled(0, s)
}

/// value = mantissa * 10^-frac_digits * 2^pow2 * 10^pow10
#[derive(Debug, PartialEq, Eq)]
struct Parsed {
    mantissa: i128,
    frac_digits: i32,
    pow2: u32,
    pow10: i32,
}

impl Parsed {
    fn parse(s: &str) -> Result<Self, QuantityError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(QuantityError::Empty);
        }

        let (negative, body) = match s.as_bytes()[0] {
            b'-' => (true, &s[1..]),
            b'+' => (false, &s[1..]),
            _ => (false, s),
        };

        let number_len = body
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(body.len());
        let (number, suffix) = body.split_at(number_len);

        let mut mantissa: i128 = 0;
        let mut frac_digits = 0;
        let mut seen_dot = false;
        let mut seen_digit = false;
        for c in number.chars() {
            if c == '.' {
                if seen_dot {
                    return Err(QuantityError::InvalidNumber(s.to_string()));
                }
                seen_dot = true;
                continue;
            }
            let digit = i128::from(c as u8 - b'0');
            mantissa = mantissa
                .checked_mul(10)
                .and_then(|m| m.checked_add(digit))
                .ok_or_else(|| QuantityError::Overflow(s.to_string()))?;
            seen_digit = true;
            if seen_dot {
                frac_digits += 1;
            }
        }
        if !seen_digit {
            return Err(QuantityError::InvalidNumber(s.to_string()));
        }
        if negative {
            mantissa = -mantissa;
        }

        let (pow2, pow10) = parse_suffix(suffix).ok_or_else(|| {
            QuantityError::UnknownSuffix(s.to_string())
        })?;

        Ok(Self {
            mantissa,
            frac_digits,
            pow2,
            pow10,
        })
    }

    /// Value in units of 10^-target, rounded up
    fn scaled(&self, target: i32, original: &str) -> Result<i64, QuantityError> {
        let overflow = || QuantityError::Overflow(original.to_string());

        let base = 2_i128
            .checked_pow(self.pow2)
            .and_then(|p| self.mantissa.checked_mul(p))
            .ok_or_else(overflow)?;
        let exp = self
            .pow10
            .checked_sub(self.frac_digits)
            .and_then(|e| e.checked_add(target))
            .ok_or_else(overflow)?;

        let value = if exp >= 0 {
            10_i128
                .checked_pow(exp as u32)
                .and_then(|p| base.checked_mul(p))
                .ok_or_else(overflow)?
        } else {
            match 10_i128.checked_pow(exp.unsigned_abs()) {
                Some(divisor) => ceil_div(base, divisor),
                // Smaller than any representable unit
                None => i128::from(base > 0),
            }
        };

        i64::try_from(value).map_err(|_| overflow())
    }
}

fn ceil_div(n: i128, d: i128) -> i128 {
    let q = n / d;
    if n % d != 0 && n > 0 { q + 1 } else { q }
}

/// Returns (power of two, power of ten) for a suffix
fn parse_suffix(suffix: &str) -> Option<(u32, i32)> {
    let scale = match suffix {
        "" => (0, 0),
        "Ki" => (10, 0),
        "Mi" => (20, 0),
        "Gi" => (30, 0),
        "Ti" => (40, 0),
        "Pi" => (50, 0),
        "Ei" => (60, 0),
        "n" => (0, -9),
        "u" => (0, -6),
        "m" => (0, -3),
        "k" => (0, 3),
        "M" => (0, 6),
        "G" => (0, 9),
        "T" => (0, 12),
        "P" => (0, 15),
        "E" => (0, 18),
        _ => {
            let exponent = suffix
                .strip_prefix('e')
                .or_else(|| suffix.strip_prefix('E'))?;
            (0, exponent.parse::<i32>().ok()?)
        }
    };
    Some(scale)
}
