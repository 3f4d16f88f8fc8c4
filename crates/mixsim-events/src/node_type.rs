//! The operations every event node type provides.

use crate::error::{Error, Result};
use crate::value::EventValue;

/// One kind of event-driven node data.
///
/// The scheduler treats payloads as opaque and goes through these
/// operations for everything it needs. Implementations return
/// [`Error::PayloadMismatch`] when handed a payload of another type.
pub trait EventNodeType: std::fmt::Debug + Send + Sync {
    /// Type name used on connection cards.
    fn name(&self) -> &str;

    /// One-line description.
    fn description(&self) -> &str;

    /// Allocate a payload holding the type's zero or undefined value.
    fn create(&self) -> EventValue;

    /// Release payload-internal allocations.
    fn dismantle(&self, _value: &mut EventValue) {}

    /// Set the payload to the type's value at time zero.
    fn initialize(&self, value: &mut EventValue);

    /// Invert the payload in place, for inverted connections.
    fn invert(&self, value: &mut EventValue) -> Result<()>;

    /// Copy `from` into `to`.
    fn copy(&self, from: &EventValue, to: &mut EventValue) -> Result<()> {
        self.create().same_kind(from)?;
        *to = from.clone();
        Ok(())
    }

    /// Combine all drivers of one node into its effective value.
    ///
    /// The scheduler always supplies at least one driver; an empty slice
    /// gives [`Error::NoDrivers`].
    fn resolve(&self, drivers: &[EventValue]) -> Result<EventValue>;

    /// Check two payloads for equal value.
    fn compare(&self, a: &EventValue, b: &EventValue) -> Result<bool>;

    /// Numeric value for waveform output, `None` if the type has none.
    fn plot_value(&self, value: &EventValue) -> Result<Option<f64>>;

    /// Short human-readable rendering.
    fn print_value(&self, value: &EventValue) -> Result<String>;

    /// Raw bytes for an external consumer, little-endian.
    fn export_value(&self, value: &EventValue) -> Result<Vec<u8>>;
}

/// Check for the empty-driver precondition of [`EventNodeType::resolve`].
pub fn require_drivers(drivers: &[EventValue]) -> Result<()> {
    if drivers.is_empty() {
        Err(Error::NoDrivers)
    } else {
        Ok(())
    }
}
