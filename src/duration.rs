//! Duration text in the format used by the DSL: `1h30m0s`, `5m0s`, `1.5s`, `250ms`.

use std::fmt::{self, Display};
use std::time::Duration;

const NANOS_PER_MICRO: u128 = 1_000;
const NANOS_PER_MILLI: u128 = 1_000_000;
const NANOS_PER_SEC: u128 = 1_000_000_000;

/// A wrapper type that formats a [`Duration`] the way the DSL spells durations.
///
/// Durations under a second use the largest of the `ns`, `µs` and `ms` units that keeps the
/// integral part non-zero. Longer durations are broken into hours, minutes and seconds, omitting
/// only leading zero components: one hour is `1h0m0s`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoDuration(pub Duration);

impl Display for GoDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let nanos = self.0.as_nanos();

        if nanos == 0 {
            return write!(f, "0s");
        }

        if nanos < NANOS_PER_MICRO {
            return write!(f, "{nanos}ns");
        }

        if nanos < NANOS_PER_MILLI {
            return write_fraction(f, nanos, NANOS_PER_MICRO, "µs");
        }

        if nanos < NANOS_PER_SEC {
            return write_fraction(f, nanos, NANOS_PER_MILLI, "ms");
        }

        let secs = self.0.as_secs();
        let hours = secs / 3600;
        let minutes = secs / 60 % 60;

        if hours > 0 {
            write!(f, "{hours}h")?;
        }

        if hours > 0 || minutes > 0 {
            write!(f, "{minutes}m")?;
        }

        let sub_minute_nanos =
            u128::from(secs % 60) * NANOS_PER_SEC + u128::from(self.0.subsec_nanos());

        write_fraction(f, sub_minute_nanos, NANOS_PER_SEC, "s")
    }
}

/// Writes `value / unit` as a decimal number without trailing zeros, followed by `suffix`.
fn write_fraction(f: &mut fmt::Formatter<'_>, value: u128, unit: u128, suffix: &str) -> fmt::Result {
    let whole = value / unit;
    let frac = value % unit;

    write!(f, "{whole}")?;

    if frac > 0 {
        let width = unit.ilog10() as usize;
        let digits = format!("{frac:0width$}");

        write!(f, ".{}", digits.trim_end_matches('0'))?;
    }

    write!(f, "{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(d: Duration) -> String {
        GoDuration(d).to_string()
    }

    #[test]
    fn sub_second_units() {
        assert_eq!(fmt(Duration::ZERO), "0s");
        assert_eq!(fmt(Duration::from_nanos(999)), "999ns");
        assert_eq!(fmt(Duration::from_nanos(1_500)), "1.5µs");
        assert_eq!(fmt(Duration::from_millis(250)), "250ms");
        assert_eq!(fmt(Duration::from_micros(1_250)), "1.25ms");
    }

    #[test]
    fn whole_components() {
        assert_eq!(fmt(Duration::from_secs(1)), "1s");
        assert_eq!(fmt(Duration::from_secs(5 * 60)), "5m0s");
        assert_eq!(fmt(Duration::from_secs(61)), "1m1s");
        assert_eq!(fmt(Duration::from_secs(3600)), "1h0m0s");
        assert_eq!(fmt(Duration::from_secs(26 * 3600 + 5)), "26h0m5s");
    }

    #[test]
    fn fractional_seconds() {
        assert_eq!(fmt(Duration::from_millis(1_500)), "1.5s");
        assert_eq!(fmt(Duration::from_millis(90_500)), "1m30.5s");
        assert_eq!(fmt(Duration::new(2, 1)), "2.000000001s");
    }
}
