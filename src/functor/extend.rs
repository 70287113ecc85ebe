//! Sign extension.

use crate::net::{NetFunctor, NetPointer, Outbox};
use crate::sizer::{LpmDevice, LpmType};
use crate::value::{Bit4, Vector4};

/// Extends its input to `width` bits by replicating the MSB. Inputs already
/// at least `width` bits wide pass through unchanged.
#[derive(Debug, Clone)]
pub struct ExtendSigned {
    width: usize,
}

impl ExtendSigned {
    pub fn new(width: usize) -> Self {
        Self { width }
    }

    pub fn width(&self) -> usize {
        self.width
    }
}

impl NetFunctor for ExtendSigned {
    fn kind(&self) -> &'static str {
        "extend_signed"
    }

    fn recv_vec4(&mut self, _port: NetPointer, bit: &Vector4, out: &mut Outbox) {
        if bit.size() >= self.width {
            out.vec4(bit.clone());
            return;
        }
        let sign = if bit.is_empty() { Bit4::X } else { bit.value(bit.size() - 1) };
        let mut val = Vector4::new(self.width, sign);
        val.set_vec(0, bit);
        out.vec4(val);
    }

    fn device_info(&self) -> Option<LpmDevice> {
        Some(LpmDevice::new(LpmType::SignExt, self.width))
    }
}
