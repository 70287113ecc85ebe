//! # Signals
//!
//! Stateful nodes that give nets and registers their assignment semantics.
//!
//! ## Ports
//!
//! | Port | Carries | Effect |
//! |------|---------|--------|
//! | 0 | value | the plain input; propagated in `Normal` mode on change |
//! | 1 | value | continuous assign; enters `ContinuousAssign`, propagates |
//! | 2 | value | force; layers `Forced` over either mode, propagates |
//! | 3 | integer | [`SignalCommand`] |
//!
//! Forcing is tracked separately from the assignment mode: a forced signal
//! remembers whether a continuous assignment is underneath it, and keeps
//! tracking the unforced source while its output is pinned. The vector
//! variants force individual bit lanes, so a part-select force leaves the
//! other lanes live.
//!
//! Every variant holds its mode state, its value, and a
//! [`CallbackList`](crate::vpi::CallbackList) side by side. Callbacks run
//! after each output change.

mod real;
mod strength;
mod vector;

use tracing::debug;

use crate::net::{NetPointer, Netlist, NodeId};
use crate::Result;

pub use real::RealSignal;
pub use strength::StrengthSignal;
pub use vector::VectorSignal;

/// Port numbers of the signal command interface.
pub const PORT_INPUT: usize = 0;
pub const PORT_CASSIGN: usize = 1;
pub const PORT_FORCE: usize = 2;
pub const PORT_COMMAND: usize = 3;

// ============================================================================
// Commands
// ============================================================================

/// Integer commands accepted on port 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalCommand {
    /// Leave continuous-assign mode. The output and any force are unchanged.
    Deassign = 1,
    /// Drop the force and propagate the tracked value now.
    ReleaseNet = 2,
    /// Drop the force; the tracked value shows on the next input change.
    ReleaseReg = 3,
}

impl SignalCommand {
    pub const fn code(self) -> i64 {
        self as i64
    }

    /// Decode a command received at `port`. Anything but a known code on
    /// port 3 is fatal.
    pub fn decode(port: NetPointer, code: i64) -> Self {
        if port.port() != PORT_COMMAND {
            contract_violation!("integer {code} sent to signal data port {port}");
        }
        match code {
            1 => SignalCommand::Deassign,
            2 => SignalCommand::ReleaseNet,
            3 => SignalCommand::ReleaseReg,
            _ => contract_violation!("unknown signal command {code} at {port}"),
        }
    }
}

// ============================================================================
// Mode state
// ============================================================================

/// Assignment mode underneath any force.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AssignMode {
    #[default]
    Normal,
    ContinuousAssign,
}

/// The mode bookkeeping shared by all signal variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalState {
    needs_init: bool,
    continuous_assign_active: bool,
    /// Node currently forcing this signal, recorded by procedural code.
    /// `Netlist::signal_command` disconnects it on release.
    pub force_link: Option<NodeId>,
    /// Node currently continuously assigning this signal; disconnected on
    /// deassign.
    pub cassign_link: Option<NodeId>,
}

impl Default for SignalState {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalState {
    pub fn new() -> Self {
        Self {
            needs_init: true,
            continuous_assign_active: false,
            force_link: None,
            cassign_link: None,
        }
    }

    /// True until the first port-0 value has been accepted.
    pub fn needs_init(&self) -> bool {
        self.needs_init
    }

    pub fn mode(&self) -> AssignMode {
        if self.continuous_assign_active {
            AssignMode::ContinuousAssign
        } else {
            AssignMode::Normal
        }
    }

    pub fn is_continuous_assign(&self) -> bool {
        self.continuous_assign_active
    }

    pub(crate) fn mark_initialized(&mut self) {
        self.needs_init = false;
    }

    pub(crate) fn start_continuous_assign(&mut self, kind: &str) {
        if !self.continuous_assign_active {
            debug!(signal = kind, "continuous assign on");
        }
        self.continuous_assign_active = true;
    }

    pub(crate) fn deassign(&mut self, kind: &str) {
        if self.continuous_assign_active {
            debug!(signal = kind, "continuous assign off");
        }
        self.continuous_assign_active = false;
        self.cassign_link = None;
    }

    pub(crate) fn released(&mut self, kind: &str, command: SignalCommand) {
        debug!(signal = kind, ?command, "force released");
        self.force_link = None;
    }
}

// ============================================================================
// Netlist helpers
// ============================================================================

impl Netlist {
    /// Send `command` to the command port of signal `id`.
    ///
    /// The source recorded in `cassign_link` (for `Deassign`) or
    /// `force_link` (for the releases) is disconnected from its port first,
    /// so it cannot re-assert the signal and the port is free for a new
    /// source.
    pub fn signal_command(&mut self, id: NodeId, command: SignalCommand) -> Result<()> {
        let state = self.signal(id)?.state();
        let (link, port) = match command {
            SignalCommand::Deassign => (state.cassign_link, PORT_CASSIGN),
            SignalCommand::ReleaseNet | SignalCommand::ReleaseReg => (state.force_link, PORT_FORCE),
        };
        if let Some(source) = link {
            if self.disconnect(source, NetPointer::new(id, port))? {
                debug!(signal = %id, source = %source, port, "source detached");
            }
        }
        self.deliver_long(NetPointer::new(id, PORT_COMMAND), command.code());
        Ok(())
    }
}
