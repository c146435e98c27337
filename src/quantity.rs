#[macro_use]
mod macros;

pub mod cost;
pub mod energy;
pub mod percent;
pub mod power;
pub mod price;
pub mod temperature;
pub mod time;

#[cfg(test)]
mod tests {
    use super::{energy::WattHours, power::Watts, time::Hours};

    #[test]
    fn test_min() {
        assert_eq!(Watts(1.0).min(Watts(2.0)), Watts(1.0));
        assert_eq!(Watts(2.0).min(Watts(1.0)), Watts(1.0));
    }

    #[test]
    fn test_max() {
        assert_eq!(Watts(1.0).max(Watts(2.0)), Watts(2.0));
        assert_eq!(Watts(2.0).max(Watts(1.0)), Watts(2.0));
    }

    #[test]
    fn test_clamp() {
        assert_eq!(Watts(1.0).clamp(Watts(2.0), Watts(3.0)), Watts(2.0));
        assert_eq!(Watts(4.0).clamp(Watts(2.0), Watts(3.0)), Watts(3.0));
        assert_eq!(Watts(2.0).clamp(Watts(1.0), Watts(3.0)), Watts(2.0));
    }

    #[test]
    fn test_power_times_time() {
        assert_eq!(Watts(1500.0) * Hours(2.0), WattHours(3000.0));
    }

    #[test]
    fn test_display() {
        assert_eq!(WattHours(1234.4).to_string(), "1234 Wh");
    }
}
