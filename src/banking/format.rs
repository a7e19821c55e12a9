use rust_decimal::{Decimal, RoundingStrategy};

/// Grouping and decimal conventions used to render money.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberFormat {
    pub group_separator: char,
    pub decimal_separator: char,
    pub fraction_digits: u32,
}

impl NumberFormat {
    pub fn en_us() -> Self {
        Self {
            group_separator: ',',
            decimal_separator: '.',
            fraction_digits: 2,
        }
    }

    /// Resolves a BCP 47 tag to a format. Unknown tags use `en-US`.
    pub fn for_locale(tag: &str) -> Self {
        let language = tag
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match language.as_str() {
            "de" => Self {
                group_separator: '.',
                decimal_separator: ',',
                ..Self::en_us()
            },
            "fr" => Self {
                group_separator: '\u{202f}',
                decimal_separator: ',',
                ..Self::en_us()
            },
            // Western digits with the Arabic decimal and thousands marks.
            "ar" => Self {
                group_separator: '\u{066c}',
                decimal_separator: '\u{066b}',
                ..Self::en_us()
            },
            _ => Self::en_us(),
        }
    }

    pub fn with_fraction_digits(mut self, digits: u32) -> Self {
        self.fraction_digits = digits;
        self
    }

    pub fn format(&self, amount: Decimal) -> String {
        let rounded = amount
            .round_dp_with_strategy(self.fraction_digits, RoundingStrategy::MidpointAwayFromZero);
        let negative = rounded.is_sign_negative() && !rounded.is_zero();
        let digits = rounded.abs().to_string();
        let (whole, fraction) = match digits.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (digits.as_str(), ""),
        };

        let mut out = String::with_capacity(digits.len() + whole.len() / 3 + 2);
        if negative {
            out.push('-');
        }
        for (i, ch) in whole.chars().enumerate() {
            if i > 0 && (whole.len() - i) % 3 == 0 {
                out.push(self.group_separator);
            }
            out.push(ch);
        }

        if self.fraction_digits > 0 {
            out.push(self.decimal_separator);
            out.push_str(fraction);
            for _ in fraction.len()..self.fraction_digits as usize {
                out.push('0');
            }
        }
        out
    }

    /// Rates carry four decimals.
    pub fn format_rate(&self, rate: Decimal) -> String {
        self.clone().with_fraction_digits(4).format(rate)
    }

    /// Daily change with an explicit sign, e.g. `+0.0010`.
    pub fn format_change(&self, change: Decimal) -> String {
        let body = self.format_rate(change.abs());
        if change > Decimal::ZERO {
            format!("+{body}")
        } else if change < Decimal::ZERO {
            format!("-{body}")
        } else {
            body
        }
    }
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self::en_us()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn groups_thousands() {
        let format = NumberFormat::en_us();
        assert_eq!(format.format(dec!(1367.242)), "1,367.24");
        assert_eq!(format.format(dec!(1234567.5)), "1,234,567.50");
        assert_eq!(format.format(dec!(999)), "999.00");
        assert_eq!(format.format(Decimal::ZERO), "0.00");
    }

    #[test]
    fn rounds_half_away_from_zero() {
        let format = NumberFormat::en_us();
        assert_eq!(format.format(dec!(0.125)), "0.13");
        assert_eq!(format.format(dec!(-0.125)), "-0.13");
    }

    #[test]
    fn negative_amounts_keep_their_sign() {
        assert_eq!(NumberFormat::en_us().format(dec!(-1500)), "-1,500.00");
        assert_eq!(NumberFormat::en_us().format(dec!(-0.001)), "0.00");
    }

    #[test]
    fn locale_presets() {
        assert_eq!(NumberFormat::for_locale("de-DE").format(dec!(1234.5)), "1.234,50");
        assert_eq!(NumberFormat::for_locale("fr_FR").format(dec!(1234.5)), "1\u{202f}234,50");
        assert_eq!(NumberFormat::for_locale("xx").format(dec!(1234.5)), "1,234.50");
    }

    #[test]
    fn formatting_is_stable() {
        let format = NumberFormat::en_us();
        let first = format.format(dec!(98765.4321));
        assert_eq!(first, format.format(dec!(98765.4321)));
        assert_eq!(first, "98,765.43");
    }

    #[test]
    fn whole_number_format() {
        let format = NumberFormat::en_us().with_fraction_digits(0);
        assert_eq!(format.format(dec!(10000.4)), "10,000");
    }

    #[test]
    fn rates_and_changes() {
        let format = NumberFormat::en_us();
        assert_eq!(format.format_rate(dec!(0.2723)), "0.2723");
        assert_eq!(format.format_change(dec!(0.002)), "+0.0020");
        assert_eq!(format.format_change(dec!(-0.0002)), "-0.0002");
        assert_eq!(format.format_change(Decimal::ZERO), "0.0000");
    }
}
