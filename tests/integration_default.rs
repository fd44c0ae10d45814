//! End-to-end runs of the reference fleet scenarios on the default grid.

mod common;

use fleet_soc_sim::fleet::{ChargerId, ScheduleEntry};
use fleet_soc_sim::sim::simulate;
use fleet_soc_sim::sim::types::WarningKind;

use common::{
    RUN_SLOT_KWH, assert_close, default_params, depot_chargers, diesel, ev, ev_all,
};

#[test]
fn all_day_run_strands_and_floors_at_zero() {
    let report = simulate(
        &[ev_all("bus-1", 90.0, ScheduleEntry::run())],
        &default_params(),
        &depot_chargers(),
    );
    assert!(report.global_errors.is_empty());
    let r = report.vehicle("bus-1").unwrap();

    assert_eq!(r.soc_time_series.len(), 97);
    let per_slot_pct = RUN_SLOT_KWH / 435.0 * 100.0;
    assert_close(r.soc_at(1).unwrap(), 90.0 - per_slot_pct, 1e-9);
    assert_close(r.soc_at(10).unwrap(), 90.0 - 10.0 * per_slot_pct, 1e-9);

    assert_eq!(r.trigger_times.low, Some(22));
    assert_eq!(r.trigger_times.critical, Some(25));
    assert_eq!(r.trigger_times.stranded, Some(26));

    assert_eq!(r.final_soc(), Some(0.0));
    assert!(r.soc_time_series[29..].iter().all(|s| *s == Some(0.0)));
    assert_close(r.total_energy_consumed_kwh, 391.5, 1e-6);
    assert_eq!(r.total_energy_charged_kwh, 0.0);

    assert!(r.has_warning(&WarningKind::StrandedAttempt));
    let stranded_alerts = r
        .warnings
        .iter()
        .filter(|w| w.kind == WarningKind::Stranded)
        .count();
    assert_eq!(stranded_alerts, 1);
}

#[test]
fn all_day_break_holds_soc() {
    let report = simulate(
        &[ev_all("bus-2", 50.0, ScheduleEntry::rest())],
        &default_params(),
        &depot_chargers(),
    );
    let r = report.vehicle("bus-2").unwrap();

    assert_eq!(r.soc_time_series.len(), 97);
    assert!(r.soc_time_series.iter().all(|s| *s == Some(50.0)));
    assert_eq!(r.total_energy_consumed_kwh, 0.0);
    assert_eq!(r.total_energy_charged_kwh, 0.0);
    assert!(r.trigger_times.is_empty());
    assert!(r.warnings.is_empty());
}

#[test]
fn charge_truncates_at_full() {
    let mut bus = ev("bus-3", 95.0);
    bus.slots[0] = Some(ScheduleEntry::charge("fast"));
    let report = simulate(&[bus], &default_params(), &depot_chargers());
    let r = report.vehicle("bus-3").unwrap();

    assert_close(r.total_energy_charged_kwh, 21.75, 1e-9);
    assert_eq!(r.soc_at(1), Some(100.0));
    assert_eq!(r.final_soc(), Some(100.0));
}

#[test]
fn charge_without_charger_warns_once() {
    let mut bus = ev("bus-4", 80.0);
    bus.slots[5] = Some(ScheduleEntry::charge_unassigned());
    bus.slots[6] = Some(ScheduleEntry::charge_unassigned());
    let report = simulate(&[bus], &default_params(), &depot_chargers());
    let r = report.vehicle("bus-4").unwrap();

    assert_eq!(r.warnings.len(), 1);
    assert!(r.warnings[0].message.contains("no charger assigned"));
    assert_eq!(r.warnings[0].kind, WarningKind::MissingCharger);
    assert_eq!(r.warnings[0].slot, Some(5));
    assert_eq!(r.soc_at(5), r.soc_at(6));
    assert_eq!(r.total_energy_charged_kwh, 0.0);
}

#[test]
fn unknown_charger_is_reported_by_id() {
    let mut bus = ev("bus-4b", 80.0);
    bus.slots[5] = Some(ScheduleEntry::charge("missing"));
    let report = simulate(&[bus], &default_params(), &depot_chargers());
    let r = report.vehicle("bus-4b").unwrap();

    assert!(r.has_warning(&WarningKind::UnknownCharger {
        charger: ChargerId::from("missing"),
    }));
    assert_eq!(r.final_soc(), Some(80.0));
}

#[test]
fn diesel_gets_placeholder() {
    let mut bus = diesel("diesel-5");
    bus.slots = vec![Some(ScheduleEntry::run()); 96];
    let report = simulate(&[bus], &default_params(), &depot_chargers());
    let r = report.vehicle("diesel-5").unwrap();

    assert!(r.is_diesel);
    assert_eq!(r.soc_time_series.len(), 97);
    assert!(r.soc_time_series.iter().all(Option::is_none));
    assert_eq!(r.total_energy_consumed_kwh, 0.0);
    assert_eq!(r.total_energy_charged_kwh, 0.0);
    assert!(r.trigger_times.is_empty());
}

#[test]
fn empty_schedule_is_a_global_error() {
    let report = simulate(&[], &default_params(), &depot_chargers());
    assert!(report.per_vehicle.is_empty());
    assert!(!report.global_errors.is_empty());
    assert!(report.global_errors[0].contains("empty"));
}

#[test]
fn mixed_fleet_is_keyed_by_vehicle_id() {
    let report = simulate(
        &[
            ev_all("b", 90.0, ScheduleEntry::deadhead()),
            diesel("a"),
            ev("c", 70.0),
        ],
        &default_params(),
        &depot_chargers(),
    );
    let ids: Vec<&str> = report.per_vehicle.keys().map(|k| k.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
    assert!(report.vehicle("a").unwrap().is_diesel);
    assert_eq!(report.vehicle("b").unwrap().trigger_times.stranded, Some(26));
}

#[test]
fn missing_start_soc_defaults_to_ninety() {
    let mut bus = ev("bus-6", 0.0);
    bus.start_soc = None;
    let report = simulate(&[bus], &default_params(), &depot_chargers());
    assert_eq!(report.vehicle("bus-6").unwrap().soc_at(0), Some(90.0));
}
