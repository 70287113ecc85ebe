//! Logic-to-strength bridge.

use crate::net::{FunctorCapabilities, NetFunctor, NetPointer, Outbox};
use crate::value::{Strength, Vector4, Vector8};

/// Drives its port-0 vector at `str0`/`str1`, emitting strength vectors
/// only.
///
/// Ports 1 and 2 take integer strength levels (0..=7) for the 0 and 1
/// drive. A change of strength re-emits the last value.
#[derive(Debug, Clone)]
pub struct Drive {
    str0: Strength,
    str1: Strength,
    last: Option<Vector4>,
}

impl Default for Drive {
    fn default() -> Self {
        Self::new(Strength::Strong, Strength::Strong)
    }
}

impl Drive {
    pub fn new(str0: Strength, str1: Strength) -> Self {
        Self { str0, str1, last: None }
    }

    pub fn strengths(&self) -> (Strength, Strength) {
        (self.str0, self.str1)
    }

    fn emit(&self, out: &mut Outbox) {
        if let Some(val) = &self.last {
            out.vec8(Vector8::from_vector4_with(val, self.str0, self.str1));
        }
    }
}

impl NetFunctor for Drive {
    fn kind(&self) -> &'static str {
        "drive"
    }

    fn recv_vec4(&mut self, port: NetPointer, bit: &Vector4, out: &mut Outbox) {
        if port.port() != 0 {
            contract_violation!("drive received a vector on strength port {port}");
        }
        self.last = Some(bit.clone());
        self.emit(out);
    }

    fn recv_long(&mut self, port: NetPointer, bit: i64, out: &mut Outbox) {
        let Ok(strength) = Strength::try_from(bit) else {
            contract_violation!("drive strength {bit} out of range at {port}");
        };
        match port.port() {
            1 => self.str0 = strength,
            2 => self.str1 = strength,
            _ => contract_violation!("drive received a strength on port {port}"),
        }
        self.emit(out);
    }

    fn capabilities(&self) -> FunctorCapabilities {
        FunctorCapabilities { long: true, ..Default::default() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::{Emission, NodeId};
    use crate::value::{Bit4, Scalar};

    fn port(p: usize) -> NetPointer {
        NetPointer::new(NodeId(0), p)
    }

    #[test]
    fn test_defaults_to_strong() {
        let mut drv = Drive::default();
        let mut out = Outbox::default();
        drv.recv_vec4(port(0), &"10".parse().unwrap(), &mut out);
        let Emission::Vec8(v) = &out.emissions()[0] else { panic!("expected vec8") };
        assert_eq!(v.value(1), Scalar::new(Bit4::One, Strength::Strong));
    }

    #[test]
    fn test_strength_ports_reemit() {
        let mut drv = Drive::default();
        let mut out = Outbox::default();
        drv.recv_long(port(1), 5, &mut out);
        assert!(out.is_empty());
        drv.recv_vec4(port(0), &"10".parse().unwrap(), &mut out);
        drv.recv_long(port(2), 3, &mut out);
        assert_eq!(out.len(), 2);
        let Emission::Vec8(v) = &out.emissions()[1] else { panic!("expected vec8") };
        assert_eq!(v.value(0), Scalar::new(Bit4::Zero, Strength::Pull));
        assert_eq!(v.value(1), Scalar::new(Bit4::One, Strength::Weak));
        assert_eq!(drv.strengths(), (Strength::Pull, Strength::Weak));
    }

    #[test]
    #[should_panic(expected = "strength 9 out of range")]
    fn test_bad_strength_is_fatal() {
        Drive::default().recv_long(port(1), 9, &mut Outbox::default());
    }
}
