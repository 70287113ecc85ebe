//! End-to-end tests for the hardware-cost statistics pass.

use logicnet::functor::{Concat, ExtendSigned, Repeat};
use logicnet::sizer::{LpmDevice, LpmType, Scope, SizerStatistics, scan_lpms, scan_scope};
use logicnet::Netlist;
use pretty_assertions::assert_eq;

fn design() -> Scope {
    let alu = Scope::new("top.alu").with_lpms([
        LpmDevice::new(LpmType::Add, 16),
        LpmDevice::new(LpmType::Sub, 16),
        LpmDevice::new(LpmType::Mux, 16).with_size(2),
        LpmDevice::new(LpmType::Mux, 16).with_size(8),
        LpmDevice::new(LpmType::PartVp, 8),
    ]);
    let regs = Scope::new("top.regs").with_lpms([
        LpmDevice::new(LpmType::FF, 32),
        LpmDevice::new(LpmType::FF, 1).with_q_width(16),
    ]);
    Scope::new("top")
        .with_lpms([LpmDevice::new(LpmType::Add, 4), LpmDevice::new(LpmType::Concat, 32)])
        .with_child(alu)
        .with_child(regs)
}

#[test]
fn test_scan_lpms_is_local() {
    let mut stats = SizerStatistics::new();
    scan_lpms(&design(), &mut stats);
    assert_eq!(stats.gate_count, 8);
    assert_eq!(stats.flop_count, 0);
    assert_eq!(stats.adder_count.len(), 1);
}

#[test]
fn test_scan_scope_totals() {
    let mut stats = SizerStatistics::new();
    scan_scope(&design(), &mut stats);
    assert_eq!(stats.flop_count, 48);
    assert_eq!(stats.gate_count, 2 * 4 + 2 * 16 + 2 * 16);
    assert_eq!(stats.adder_count.get(&16), Some(&1));
    assert_eq!(stats.adder_count.get(&4), Some(&1));

    let mut histogram: Vec<_> = stats.lpm_bytype.iter().map(|(k, c)| (*k, *c)).collect();
    histogram.sort();
    assert_eq!(histogram, vec![(LpmType::Sub, 1), (LpmType::Mux, 1)]);
}

#[test]
fn test_merge_statistics() {
    let mut a = SizerStatistics::new();
    scan_scope(&design(), &mut a);
    let mut total = a.clone();
    total += &a;
    assert_eq!(total.flop_count, 2 * a.flop_count);
    assert_eq!(total.adder_count.get(&16), Some(&2));
    assert_eq!(total.lpm_bytype.get(&LpmType::Mux), Some(&2));
}

#[test]
fn test_netlist_devices_feed_the_scan() {
    let mut net = Netlist::new();
    net.create_net(Concat::new(4, 4, 0, 0));
    net.create_net(Repeat::new(8, 4).unwrap());
    net.create_net(ExtendSigned::new(16));
    net.create_signal(8);

    let scope = net.lpm_scope("netlist");
    assert_eq!(scope.lpms.len(), 3);

    let mut stats = SizerStatistics::new();
    scan_scope(&scope, &mut stats);
    assert_eq!(stats.gate_count, 0);
    assert_eq!(stats.lpm_bytype.get(&LpmType::SignExt), Some(&1));
}

#[test]
fn test_report_json() {
    let mut stats = SizerStatistics::new();
    scan_scope(&design(), &mut stats);
    let json: serde_json::Value = serde_json::from_str(&stats.to_json().unwrap()).unwrap();
    assert_eq!(json["flop_count"], 48);
    assert_eq!(json["lpm_bytype"]["Mux"], 1);
}
