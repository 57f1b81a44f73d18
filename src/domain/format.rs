// Value formatting for energy, tree and battery readings
use serde::Serialize;

/// Number of battery icon bands covering 0..=100% state of charge.
pub const BATTERY_BANDS: usize = 8;

const BATTERY_ICONS: [&str; BATTERY_BANDS] = [
    "battery_0_bar",
    "battery_1_bar",
    "battery_2_bar",
    "battery_3_bar",
    "battery_4_bar",
    "battery_5_bar",
    "battery_6_bar",
    "battery_full",
];

/// A reading scaled for display together with the unit it was scaled to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormattedValue {
    pub display: String,
    pub unit: String,
}

impl FormattedValue {
    fn new(display: String, unit: &str) -> Self {
        Self {
            display,
            unit: unit.to_string(),
        }
    }
}

/// Unit triple used when scaling a reading: standard, mega (x1000) and milli (/1000).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitScale {
    pub std_unit: &'static str,
    pub mega_unit: &'static str,
    pub milli_unit: &'static str,
}

impl UnitScale {
    pub const POWER: UnitScale = UnitScale {
        std_unit: "kW",
        mega_unit: "mW",
        milli_unit: "W",
    };

    pub const ENERGY: UnitScale = UnitScale {
        std_unit: "kWh",
        mega_unit: "mWh",
        milli_unit: "Wh",
    };

    pub const CO2: UnitScale = UnitScale {
        std_unit: "kg",
        mega_unit: "mt",
        milli_unit: "g",
    };

    pub fn format(&self, value: f64) -> FormattedValue {
        format_energy(value, self.std_unit, self.mega_unit, self.milli_unit)
    }
}

/// Fixed-point text with exact halves rounded away from zero.
pub fn to_fixed(value: f64, places: usize) -> String {
    let factor = 10f64.powi(places as i32);
    let scaled = value * factor;
    if !scaled.is_finite() {
        return format!("{:.*}", places, value);
    }
    format!("{:.*}", places, scaled.round() / factor)
}

/// Scale an energy/power reading into mega, standard or milli units.
///
/// Readings of 1000 and above always render with 2 decimal places in the
/// mega unit. The caller is expected to pass a finite number, with missing
/// readings already defaulted to zero.
pub fn format_energy(value: f64, std_unit: &str, mega_unit: &str, milli_unit: &str) -> FormattedValue {
    // No separate 1dp band above 10000.
    if value >= 1000.0 {
        FormattedValue::new(to_fixed(value / 1000.0, 2), mega_unit)
    } else if value >= 100.0 {
        FormattedValue::new(to_fixed(value, 0), std_unit)
    } else if value >= 1.0 {
        FormattedValue::new(to_fixed(value, 2), std_unit)
    } else {
        FormattedValue::new(format!("{}", (value * 1000.0).floor() as i64), milli_unit)
    }
}

/// Format an equivalent-trees figure; anything below 0.001 shows as 0.
pub fn format_trees(value: f64) -> FormattedValue {
    let display = if value >= 100.0 {
        to_fixed(value, 0)
    } else if value >= 1.0 {
        to_fixed(value, 2)
    } else if value >= 0.001 {
        to_fixed(value, 3)
    } else {
        "0".to_string()
    };

    FormattedValue::new(display, "trees")
}

/// Map a state of charge percentage onto one of [`BATTERY_BANDS`] equal bands.
pub fn battery_class(soc: f64) -> usize {
    let band_width = 100.0 / BATTERY_BANDS as f64;
    if soc.is_nan() || soc <= 0.0 {
        return 0;
    }
    ((soc / band_width).floor() as usize).min(BATTERY_BANDS - 1)
}

/// Icon name for the battery band of `soc`.
pub fn battery_icon(soc: f64) -> &'static str {
    BATTERY_ICONS[battery_class(soc)]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn energy(value: f64) -> FormattedValue {
        format_energy(value, "kWh", "mWh", "Wh")
    }

    #[test]
    fn test_format_energy_milli() {
        assert_eq!(energy(0.5), FormattedValue::new("500".into(), "Wh"));
        assert_eq!(energy(0.0), FormattedValue::new("0".into(), "Wh"));
        assert_eq!(energy(0.0129), FormattedValue::new("12".into(), "Wh"));
    }

    #[test]
    fn test_format_energy_standard() {
        assert_eq!(energy(1.0), FormattedValue::new("1.00".into(), "kWh"));
        assert_eq!(energy(42.5), FormattedValue::new("42.50".into(), "kWh"));
        assert_eq!(energy(150.0), FormattedValue::new("150".into(), "kWh"));
        assert_eq!(energy(999.0), FormattedValue::new("999".into(), "kWh"));
    }

    #[test]
    fn test_format_energy_mega_is_always_two_places() {
        assert_eq!(energy(2500.0), FormattedValue::new("2.50".into(), "mWh"));
        assert_eq!(energy(1000.0), FormattedValue::new("1.00".into(), "mWh"));
        assert_eq!(energy(12340.0), FormattedValue::new("12.34".into(), "mWh"));
    }

    #[test]
    fn test_halves_round_up() {
        assert_eq!(energy(150.5), FormattedValue::new("151".into(), "kWh"));
        assert_eq!(energy(2.125), FormattedValue::new("2.13".into(), "kWh"));
        assert_eq!(energy(2.375), FormattedValue::new("2.38".into(), "kWh"));
        assert_eq!(format_trees(0.5).display, "0.500");
        assert_eq!(format_trees(100.5).display, "101");
        assert_eq!(format_trees(1.625).display, "1.63");
    }

    #[test]
    fn test_unit_scales() {
        assert_eq!(UnitScale::POWER.format(0.25).unit, "W");
        assert_eq!(UnitScale::CO2.format(3.0), FormattedValue::new("3.00".into(), "kg"));
    }

    #[test]
    fn test_format_trees() {
        assert_eq!(format_trees(0.0), FormattedValue::new("0".into(), "trees"));
        assert_eq!(format_trees(0.0005).display, "0");
        assert_eq!(format_trees(0.005), FormattedValue::new("0.005".into(), "trees"));
        assert_eq!(format_trees(2.5).display, "2.50");
        assert_eq!(format_trees(150.0), FormattedValue::new("150".into(), "trees"));
    }

    #[test]
    fn test_battery_class_bounds() {
        assert_eq!(battery_class(0.0), 0);
        assert_eq!(battery_class(12.4), 0);
        assert_eq!(battery_class(12.5), 1);
        assert_eq!(battery_class(50.0), 4);
        assert_eq!(battery_class(99.9), 7);
        assert_eq!(battery_class(100.0), 7);
        assert_eq!(battery_class(-5.0), 0);
    }

    #[test]
    fn test_battery_icon() {
        assert_eq!(battery_icon(0.0), "battery_0_bar");
        assert_eq!(battery_icon(100.0), "battery_full");
    }
}
