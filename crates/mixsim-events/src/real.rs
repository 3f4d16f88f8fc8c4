//! The `real` node type.

use crate::error::Result;
use crate::node_type::{EventNodeType, require_drivers};
use crate::value::EventValue;

/// Real-valued event data. Multiple drivers sum.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealType;

/// Format like C's `%15.6e`: two-digit signed exponent, right-aligned.
pub(crate) fn format_exponential(value: f64) -> String {
    let text = format!("{value:.6e}");
    let text = match text.split_once('e') {
        Some((mantissa, exp)) => match exp.parse::<i32>() {
            Ok(exp) => {
                let sign = if exp < 0 { '-' } else { '+' };
                format!("{mantissa}e{sign}{:02}", exp.abs())
            }
            Err(_) => text,
        },
        None => text,
    };
    format!("{text:>15}")
}

impl EventNodeType for RealType {
    fn name(&self) -> &str {
        "real"
    }

    fn description(&self) -> &str {
        "real valued data"
    }

    fn create(&self) -> EventValue {
        EventValue::Real(0.0)
    }

    fn initialize(&self, value: &mut EventValue) {
        *value = EventValue::Real(0.0);
    }

    fn invert(&self, value: &mut EventValue) -> Result<()> {
        *value = EventValue::Real(-value.as_real()?);
        Ok(())
    }

    fn resolve(&self, drivers: &[EventValue]) -> Result<EventValue> {
        require_drivers(drivers)?;
        let mut sum = 0.0;
        for driver in drivers {
            sum += driver.as_real()?;
        }
        Ok(EventValue::Real(sum))
    }

    fn compare(&self, a: &EventValue, b: &EventValue) -> Result<bool> {
        Ok(a.as_real()? == b.as_real()?)
    }

    fn plot_value(&self, value: &EventValue) -> Result<Option<f64>> {
        value.as_real().map(Some)
    }

    fn print_value(&self, value: &EventValue) -> Result<String> {
        value.as_real().map(format_exponential)
    }

    fn export_value(&self, value: &EventValue) -> Result<Vec<u8>> {
        Ok(value.as_real()?.to_le_bytes().to_vec())
    }
}
