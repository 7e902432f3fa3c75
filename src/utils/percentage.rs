use std::{fmt::Display, ops::Deref};

use chrono::Duration;

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Percentage(f64);

impl Display for Percentage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl Percentage {
    /// Whole number percentage, as used for bar widths.
    pub fn rounded(&self) -> u32 {
        self.0.round() as u32
    }
}

impl Deref for Percentage {
    type Target = f64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Share of `value` in `whole`. `whole` is floored at one millisecond so an empty graph doesn't
/// divide by zero, and negative values count as zero.
pub fn duration_percentage(value: Duration, whole: Duration) -> Percentage {
    let whole = whole.num_milliseconds().max(1) as f64;
    let value = value.num_milliseconds().max(0) as f64;
    Percentage(value / whole * 100.)
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::duration_percentage;

    #[test]
    fn percentage_of_zero_whole_is_zero() {
        let p = duration_percentage(Duration::zero(), Duration::zero());
        assert_eq!(*p, 0.);
    }

    #[test]
    fn percentage_rounds_for_display() {
        let p = duration_percentage(Duration::milliseconds(1), Duration::milliseconds(3));
        assert_eq!(p.rounded(), 33);
        assert_eq!(p.to_string().chars().last(), Some('%'));
    }
}
