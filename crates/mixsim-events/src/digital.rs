//! The `digital` node type.
//!
//! Resolution is strongest-driver-wins by [`Strength::rank`]. Drivers tied
//! at the winning strength with differing states give `U`, and a node
//! driven only at high impedance resolves to `Uz`. The result does not
//! depend on driver order.

use crate::error::{Error, Result};
use crate::node_type::{EventNodeType, require_drivers};
use crate::value::{Digital, EventValue, State, Strength};

#[derive(Debug, Clone, Copy, Default)]
pub struct DigitalType;

fn state_byte(state: State) -> u8 {
    match state {
        State::Zero => 0,
        State::One => 1,
        State::Unknown => 2,
    }
}

fn strength_byte(strength: Strength) -> u8 {
    match strength {
        Strength::Strong => 0,
        Strength::Resistive => 1,
        Strength::HiImpedance => 2,
        Strength::Undetermined => 3,
    }
}

impl EventNodeType for DigitalType {
    fn name(&self) -> &str {
        "digital"
    }

    fn description(&self) -> &str {
        "12 state digital data"
    }

    fn create(&self) -> EventValue {
        EventValue::Digital(Digital::new(State::Unknown, Strength::Undetermined))
    }

    fn initialize(&self, value: &mut EventValue) {
        *value = EventValue::Digital(Digital::new(State::Zero, Strength::Strong));
    }

    fn invert(&self, value: &mut EventValue) -> Result<()> {
        let d = value.as_digital()?;
        *value = EventValue::Digital(Digital::new(d.state.inverted(), d.strength));
        Ok(())
    }

    fn resolve(&self, drivers: &[EventValue]) -> Result<EventValue> {
        require_drivers(drivers)?;

        let mut winner: Option<Digital> = None;
        for driver in drivers {
            let d = driver.as_digital()?;
            winner = Some(match winner {
                None => d,
                Some(w) if d.strength.rank() > w.strength.rank() => d,
                Some(w) if d.strength.rank() < w.strength.rank() => w,
                Some(w) if w.state == d.state => w,
                Some(w) => Digital::new(State::Unknown, w.strength),
            });
        }

        let Some(winner) = winner else {
            return Err(Error::NoDrivers);
        };
        if winner.strength == Strength::HiImpedance {
            return Ok(EventValue::Digital(Digital::new(
                State::Unknown,
                Strength::HiImpedance,
            )));
        }
        Ok(EventValue::Digital(winner))
    }

    fn compare(&self, a: &EventValue, b: &EventValue) -> Result<bool> {
        Ok(a.as_digital()? == b.as_digital()?)
    }

    fn plot_value(&self, value: &EventValue) -> Result<Option<f64>> {
        let level = match value.as_digital()?.state {
            State::Zero => 0.0,
            State::One => 1.0,
            State::Unknown => 0.5,
        };
        Ok(Some(level))
    }

    fn print_value(&self, value: &EventValue) -> Result<String> {
        Ok(value.as_digital()?.to_string())
    }

    fn export_value(&self, value: &EventValue) -> Result<Vec<u8>> {
        let d = value.as_digital()?;
        Ok(vec![state_byte(d.state), strength_byte(d.strength)])
    }
}
