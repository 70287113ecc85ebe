//! Multi-driver resolution.

use crate::net::{FunctorCapabilities, NetFunctor, NetPointer, Outbox, PORT_COUNT};
use crate::value::{Scalar, Strength, Vector4, Vector8};

/// Resolves up to four drivers of one net.
///
/// Each port keeps the last strength vector it received; ports that have
/// not been driven do not take part. Part-select inputs are widened to the
/// full vector with HiZ around the part, so a partial driver only
/// influences its own lanes. The resolved vector is emitted when it
/// changes.
#[derive(Debug, Clone)]
pub struct Resolver {
    drive: Strength,
    inputs: [Option<Vector8>; PORT_COUNT],
    output: Option<Vector8>,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

impl Resolver {
    /// Logic vectors arriving at the resolver drive at Strong.
    pub fn new() -> Self {
        Self::with_drive(Strength::Strong)
    }

    pub fn with_drive(drive: Strength) -> Self {
        Self { drive, inputs: Default::default(), output: None }
    }

    pub fn output(&self) -> Option<&Vector8> {
        self.output.as_ref()
    }

    fn update(&mut self, port: NetPointer, val: Vector8, out: &mut Outbox) {
        self.inputs[port.port()] = Some(val);

        let mut driven = self.inputs.iter().flatten();
        let Some(first) = driven.next() else { return };
        let mut resolved = first.clone();
        for other in driven {
            if other.size() != resolved.size() {
                contract_violation!(
                    "resolver at {port} has drivers of {} and {} bits",
                    resolved.size(),
                    other.size()
                );
            }
            resolved = resolved.resolve(other);
        }

        if self.output.as_ref().is_some_and(|prev| prev.eeq(&resolved)) {
            return;
        }
        self.output = Some(resolved.clone());
        out.vec8(resolved);
    }
}

impl NetFunctor for Resolver {
    fn kind(&self) -> &'static str {
        "resolv"
    }

    fn recv_vec4(&mut self, port: NetPointer, bit: &Vector4, out: &mut Outbox) {
        let promoted = Vector8::from_vector4(bit, self.drive);
        self.update(port, promoted, out);
    }

    fn recv_vec8(&mut self, port: NetPointer, bit: &Vector8, out: &mut Outbox) {
        self.update(port, bit.clone(), out);
    }

    fn recv_vec4_pv(
        &mut self,
        port: NetPointer,
        bit: &Vector4,
        base: usize,
        wid: usize,
        vwid: usize,
        out: &mut Outbox,
    ) {
        if bit.size() != wid {
            contract_violation!("part of {} bits declared {wid} wide at {port}", bit.size());
        }
        let padded = (0..vwid)
            .map(|idx| {
                if idx >= base && idx < base + wid {
                    Scalar::new(bit.value(idx - base), self.drive)
                } else {
                    Scalar::hiz()
                }
            })
            .collect();
        self.update(port, padded, out);
    }

    fn capabilities(&self) -> FunctorCapabilities {
        FunctorCapabilities { vec8: true, vec4_pv: true, ..Default::default() }
    }
}
