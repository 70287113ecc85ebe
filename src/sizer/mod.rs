//! # Hardware-Cost Statistics
//!
//! A walk over an elaborated scope tree that estimates what the design
//! would cost in hardware.
//!
//! | Device | Cost model |
//! |--------|------------|
//! | part select, concatenation, repeat | free (routing only) |
//! | adder | 2 gates per output bit, plus a per-width count |
//! | flip-flop | 1 flop per Q bit |
//! | mux with ≤ 2 inputs | 2 gates per output bit |
//! | anything else, including wider muxes | counted by type |

use std::fmt;
use std::ops::AddAssign;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::net::Netlist;
use crate::Result;

// ============================================================================
// Devices and scopes
// ============================================================================

/// Device classification produced by elaboration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LpmType {
    Abs,
    Add,
    Sub,
    Mult,
    Divide,
    Mod,
    Pow,
    CmpEq,
    CmpEeq,
    CmpNe,
    CmpNee,
    CmpGe,
    CmpGt,
    Mux,
    FF,
    PartVp,
    PartPv,
    Concat,
    ConcatZ,
    Repeat,
    ShiftL,
    ShiftR,
    SignExt,
    ReAnd,
    ReOr,
    ReXor,
    Array,
    UFunc,
    SFunc,
    Other,
}

/// One device as seen by the statistics pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LpmDevice {
    pub kind: LpmType,
    /// Output width.
    pub width: usize,
    /// Width of the Q output, for flip-flops.
    pub q_width: usize,
    /// Number of selectable inputs, for muxes.
    pub size: usize,
}

impl LpmDevice {
    pub fn new(kind: LpmType, width: usize) -> Self {
        Self { kind, width, q_width: width, size: 0 }
    }

    pub fn with_q_width(mut self, q_width: usize) -> Self {
        self.q_width = q_width;
        self
    }

    pub fn with_size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }
}

/// A named scope holding devices and child scopes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
    pub name: String,
    pub lpms: Vec<LpmDevice>,
    pub children: Vec<Scope>,
}

impl Scope {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Default::default() }
    }

    pub fn with_lpms(mut self, lpms: impl IntoIterator<Item = LpmDevice>) -> Self {
        self.lpms.extend(lpms);
        self
    }

    pub fn with_child(mut self, child: Scope) -> Self {
        self.children.push(child);
        self
    }
}

impl Netlist {
    /// A flat scope of every node whose functor describes itself as a
    /// device.
    pub fn lpm_scope(&self, name: impl Into<String>) -> Scope {
        let lpms = self
            .node_ids()
            .filter_map(|id| self.net(id).ok()?.functor()?.device_info());
        Scope::new(name).with_lpms(lpms)
    }
}

// ============================================================================
// Statistics
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizerStatistics {
    pub flop_count: u64,
    pub gate_count: u64,
    /// Adder width -> number of adders of that width.
    pub adder_count: HashMap<usize, u64>,
    /// Devices with no cost model, by type.
    pub lpm_bytype: HashMap<LpmType, u64>,
}

impl SizerStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl AddAssign<&SizerStatistics> for SizerStatistics {
    fn add_assign(&mut self, that: &SizerStatistics) {
        self.flop_count += that.flop_count;
        self.gate_count += that.gate_count;
        for (wid, count) in &that.adder_count {
            *self.adder_count.entry(*wid).or_default() += count;
        }
        for (kind, count) in &that.lpm_bytype {
            *self.lpm_bytype.entry(*kind).or_default() += count;
        }
    }
}

impl fmt::Display for SizerStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "   Flip-Flops   : {}", self.flop_count)?;
        writeln!(f, "   Logic Gates  : {}", self.gate_count)?;
        let mut adders: Vec<_> = self.adder_count.iter().collect();
        adders.sort();
        for (wid, count) in adders {
            writeln!(f, "   ADDER[{wid}]: {count} units")?;
        }
        let mut other: Vec<_> = self.lpm_bytype.iter().collect();
        other.sort();
        for (kind, count) in other {
            writeln!(f, "   LPM[{kind:?}]: {count} unaccounted")?;
        }
        Ok(())
    }
}

// ============================================================================
// Scan
// ============================================================================

/// Accumulate the cost of the devices directly in `scope`.
pub fn scan_lpms(scope: &Scope, stats: &mut SizerStatistics) {
    for lpm in &scope.lpms {
        match lpm.kind {
            LpmType::PartVp | LpmType::PartPv | LpmType::Concat | LpmType::ConcatZ | LpmType::Repeat => {}
            LpmType::Add => {
                *stats.adder_count.entry(lpm.width).or_default() += 1;
                stats.gate_count += 2 * lpm.width as u64;
            }
            LpmType::FF => stats.flop_count += lpm.q_width as u64,
            LpmType::Mux if lpm.size <= 2 => stats.gate_count += 2 * lpm.width as u64,
            kind => *stats.lpm_bytype.entry(kind).or_default() += 1,
        }
    }
}

/// Accumulate `scope` and all of its descendants.
pub fn scan_scope(scope: &Scope, stats: &mut SizerStatistics) {
    let mut local = SizerStatistics::new();
    scan_lpms(scope, &mut local);
    debug!(
        scope = %scope.name,
        devices = scope.lpms.len(),
        flops = local.flop_count,
        gates = local.gate_count,
        "scope scanned"
    );
    *stats += &local;
    for child in &scope.children {
        scan_scope(child, stats);
    }
}
