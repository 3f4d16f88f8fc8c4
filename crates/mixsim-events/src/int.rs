//! The `int` node type.

use crate::error::Result;
use crate::node_type::{EventNodeType, require_drivers};
use crate::value::EventValue;

/// Integer-valued event data. Multiple drivers sum, wrapping on overflow.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntType;

impl EventNodeType for IntType {
    fn name(&self) -> &str {
        "int"
    }

    fn description(&self) -> &str {
        "integer valued data"
    }

    fn create(&self) -> EventValue {
        EventValue::Int(0)
    }

    fn initialize(&self, value: &mut EventValue) {
        *value = EventValue::Int(0);
    }

    fn invert(&self, value: &mut EventValue) -> Result<()> {
        *value = EventValue::Int(value.as_int()?.wrapping_neg());
        Ok(())
    }

    fn resolve(&self, drivers: &[EventValue]) -> Result<EventValue> {
        require_drivers(drivers)?;
        let mut sum = 0i64;
        for driver in drivers {
            sum = sum.wrapping_add(driver.as_int()?);
        }
        Ok(EventValue::Int(sum))
    }

    fn compare(&self, a: &EventValue, b: &EventValue) -> Result<bool> {
        Ok(a.as_int()? == b.as_int()?)
    }

    fn plot_value(&self, value: &EventValue) -> Result<Option<f64>> {
        Ok(Some(value.as_int()? as f64))
    }

    fn print_value(&self, value: &EventValue) -> Result<String> {
        Ok(value.as_int()?.to_string())
    }

    fn export_value(&self, value: &EventValue) -> Result<Vec<u8>> {
        Ok(value.as_int()?.to_le_bytes().to_vec())
    }
}
