//! Concatenation of up to four vectors.

use crate::net::{NetFunctor, NetPointer, Outbox, PORT_COUNT};
use crate::sizer::{LpmDevice, LpmType};
use crate::value::Vector4;

/// Concatenates its inputs, port 0 in the least significant bits.
///
/// Every input must arrive at exactly its declared width. The whole output
/// is re-emitted on every input change; inputs that have not arrived yet
/// read as `x`.
#[derive(Debug, Clone)]
pub struct Concat {
    wid: [usize; PORT_COUNT],
    val: Vector4,
}

impl Concat {
    /// Declared input widths; 0 marks an unused port.
    pub fn new(w0: usize, w1: usize, w2: usize, w3: usize) -> Self {
        let wid = [w0, w1, w2, w3];
        Self { wid, val: Vector4::unknown(wid.iter().sum()) }
    }

    pub fn width(&self) -> usize {
        self.val.size()
    }

    pub fn value(&self) -> &Vector4 {
        &self.val
    }

    fn offset(&self, port: usize) -> usize {
        self.wid[..port].iter().sum()
    }
}

impl NetFunctor for Concat {
    fn kind(&self) -> &'static str {
        "concat"
    }

    fn recv_vec4(&mut self, port: NetPointer, bit: &Vector4, out: &mut Outbox) {
        let pdx = port.port();
        if bit.size() != self.wid[pdx] {
            contract_violation!(
                "concat port {pdx} declared {} bits wide received {} bits at {port}",
                self.wid[pdx],
                bit.size()
            );
        }
        let base = self.offset(pdx);
        self.val.set_vec(base, bit);
        out.vec4(self.val.clone());
    }

    fn device_info(&self) -> Option<LpmDevice> {
        Some(LpmDevice::new(LpmType::Concat, self.width()))
    }
}
