use std::iter;

pub trait IteratorAvg: Iterator<Item = f64> {
    fn avg(self) -> Option<f64>;
    fn avg_with_std(self) -> Option<(f64, f64)>;
}

impl<I> IteratorAvg for I
where
    I: Iterator<Item = f64>,
{
    fn avg(self) -> Option<f64> {
        iter::zip(self, 1usize..)
            .reduce(|(sum, _), (next, cnt)| (sum + next, cnt))
            .map(|(sum, cnt)| sum / cnt as f64)
    }

    fn avg_with_std(self) -> Option<(f64, f64)> {
        let values = self.collect::<Vec<_>>();
        let avg = values.iter().copied().avg()?;
        values
            .into_iter()
            .map(|x| (x - avg).powi(2))
            .avg()
            .map(|std| (avg, std.sqrt()))
    }
}

/// Render `value` with `digits` significant figures, like C's `%g`:
/// fixed notation for moderate exponents, scientific otherwise, trailing
/// zeros trimmed.
#[must_use]
pub fn format_sig(value: f64, digits: usize) -> String {
    assert!(digits > 0);
    if value == 0.0 || !value.is_finite() {
        return format!("{value}");
    }
    let exp = value.abs().log10().floor() as i32;
    if exp < -4 || exp >= digits as i32 {
        let s = format!("{:.*e}", digits - 1, value);
        match s.split_once('e') {
            Some((mantissa, exponent)) => {
                let mantissa = mantissa.trim_end_matches('0').trim_end_matches('.');
                format!("{mantissa}e{exponent}")
            }
            None => s,
        }
    } else {
        let decimals = (digits as i32 - 1 - exp).max(0) as usize;
        let s = format!("{:.*}", decimals, value);
        if s.contains('.') {
            s.trim_end_matches('0').trim_end_matches('.').to_string()
        } else {
            s
        }
    }
}
