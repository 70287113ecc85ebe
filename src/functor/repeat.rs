//! Replication.

use crate::net::{NetFunctor, NetPointer, Outbox};
use crate::sizer::{LpmDevice, LpmType};
use crate::value::Vector4;
use crate::{Error, Result};

/// Tiles its input `repeat` times, least significant copy first.
#[derive(Debug, Clone)]
pub struct Repeat {
    width: usize,
    repeat: usize,
}

impl Repeat {
    /// `width` is the output width; the input width is `width / repeat`.
    pub fn new(width: usize, repeat: usize) -> Result<Self> {
        if repeat == 0 || width % repeat != 0 {
            return Err(Error::Config(format!("cannot repeat into {width} bits {repeat} times")));
        }
        Ok(Self { width, repeat })
    }

    pub fn input_width(&self) -> usize {
        self.width / self.repeat
    }
}

impl NetFunctor for Repeat {
    fn kind(&self) -> &'static str {
        "repeat"
    }

    fn recv_vec4(&mut self, port: NetPointer, bit: &Vector4, out: &mut Outbox) {
        let iwid = self.input_width();
        if bit.size() != iwid {
            contract_violation!("repeat expects {iwid} bits, received {} at {port}", bit.size());
        }
        let mut val = Vector4::unknown(self.width);
        for copy in 0..self.repeat {
            val.set_vec(copy * iwid, bit);
        }
        out.vec4(val);
    }

    fn device_info(&self) -> Option<LpmDevice> {
        Some(LpmDevice::new(LpmType::Repeat, self.width))
    }
}
