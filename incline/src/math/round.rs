/// Rounds the shortest decimal representation of `value` to `places`
/// decimal places, halves away from zero.
///
/// Ties are decided on the printed digits, so `1.005` rounds to `1.01`
/// even though its binary value is slightly below the tie. Non-finite
/// values pass through unchanged.
pub fn round(value: f64, places: usize) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let text = value.abs().to_string();
    let (int, frac) = text.split_once('.').unwrap_or((&text, ""));
    if frac.len() <= places {
        return value;
    }

    let mut digits: Vec<u8> = int.bytes().chain(frac.bytes().take(places)).collect();
    if frac.as_bytes()[places] >= b'5' {
        let mut carry = true;
        for digit in digits.iter_mut().rev() {
            if *digit == b'9' {
                *digit = b'0';
            } else {
                *digit += 1;
                carry = false;
                break;
            }
        }
        if carry {
            digits.insert(0, b'1');
        }
    }

    let split = digits.len() - places;
    let mut rounded: String = digits[..split].iter().map(|&d| char::from(d)).collect();
    if places > 0 {
        rounded.push('.');
        rounded.extend(digits[split..].iter().map(|&d| char::from(d)));
    }
    rounded.parse::<f64>().map_or(value, |r| r.copysign(value))
}

/// Rounds the binary value of `value` to `places` decimal places,
/// halves toward positive infinity.
///
/// Non-finite values pass through unchanged.
pub fn round_half_ceil(value: f64, places: i32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let scale = 10_f64.powi(places);
    (value * scale + 0.5).floor() / scale
}

#[cfg(test)]
mod tests {
    use super::{round, round_half_ceil};

    #[test]
    fn test_round() {
        assert_eq!(round(4.333_333, 2), 4.33);
        assert_eq!(round(1.005, 2), 1.01);
        assert_eq!(round(2.675, 2), 2.68);
        assert_eq!(round(-2.675, 2), -2.68);
        assert_eq!(round(0.125, 2), 0.13);
        assert_eq!(round(-0.125, 2), -0.13);
        assert_eq!(round(9.995, 2), 10.0);
        assert_eq!(round(-0.001, 2), 0.0);
        assert_eq!(round(5.0, 2), 5.0);
        assert_eq!(round(0.1 + 0.2, 7), 0.3);
        assert_eq!(round(1.234_567_891, 7), 1.234_567_9);
        assert!(round(f64::NAN, 2).is_nan());
        assert_eq!(round(f64::INFINITY, 2), f64::INFINITY);
    }

    #[test]
    fn test_round_half_ceil() {
        assert_eq!(round_half_ceil(0.125, 2), 0.13);
        assert_eq!(round_half_ceil(-0.125, 2), -0.12);
        assert_eq!(round_half_ceil(-8.994, 2), -8.99);
        assert_eq!(round_half_ceil(150.124_9, 2), 150.12);
        assert!(round_half_ceil(f64::NAN, 2).is_nan());
    }
}
