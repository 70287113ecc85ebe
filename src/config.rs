//! Netlist configuration.

use serde::{Deserialize, Serialize};

use crate::value::{Bit4, Strength};
use crate::{Error, Result};

/// Settings applied by the `Netlist` builder helpers.
///
/// Every field has a default, so a JSON document only needs the keys it
/// wants to change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetlistConfig {
    /// Arena slots reserved up front.
    pub node_capacity: usize,
    /// Drive strength for unconnected `Drive` strength ports and for
    /// promoting logic values into strength signals.
    pub default_drive: Strength,
    /// Initial fill of vector signals created by `Netlist::create_signal`.
    pub signal_init: Bit4,
    /// Emit a `trace!` event for every delivery.
    pub trace_propagation: bool,
}

impl Default for NetlistConfig {
    fn default() -> Self {
        Self {
            node_capacity: 1024,
            default_drive: Strength::Strong,
            signal_init: Bit4::X,
            trace_propagation: false,
        }
    }
}

impl NetlistConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        let config: NetlistConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.default_drive == Strength::HiZ {
            return Err(Error::Config("default_drive cannot be HiZ".into()));
        }
        Ok(())
    }
}
