//! CSV export of per-slot SOC telemetry.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::error::{Error, Result};
use crate::fleet::schedule::SlotActivity;
use crate::fleet::vehicle::VehicleSchedule;
use crate::sim::clock::TimeGrid;
use crate::sim::types::SimulationReport;

/// Column header for SOC telemetry export.
const HEADER: &str = "vehicle_id,slot,time,activity,charger_id,soc_start_pct,soc_end_pct";

/// Exports the SOC trajectory of every EV to a CSV file at the given path.
///
/// Writes a header row followed by one row per (vehicle, slot). Diesel
/// vehicles have no trajectory and are omitted. Produces deterministic
/// output for identical inputs.
///
/// # Arguments
///
/// * `report` - Simulation report to export
/// * `vehicles` - Schedules the report was produced from (for activity columns)
/// * `grid` - Slot calendar used for the run
/// * `path` - Output file path
///
/// # Errors
///
/// Returns an error if file creation or writing fails.
pub fn export_csv(
    report: &SimulationReport,
    vehicles: &[VehicleSchedule],
    grid: &TimeGrid,
    path: &Path,
) -> Result<()> {
    let file = File::create(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let buf = io::BufWriter::new(file);
    write_csv(report, vehicles, grid, buf)
}

/// Writes SOC telemetry as CSV to any writer.
///
/// # Errors
///
/// Returns [`Error::Csv`] if writing fails.
pub fn write_csv(
    report: &SimulationReport,
    vehicles: &[VehicleSchedule],
    grid: &TimeGrid,
    writer: impl Write,
) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    let schedules: HashMap<&str, &VehicleSchedule> =
        vehicles.iter().map(|v| (v.id.as_str(), v)).collect();

    wtr.write_record(HEADER.split(','))?;

    for (id, result) in report.per_vehicle.iter().filter(|(_, r)| !r.is_diesel) {
        let schedule = schedules.get(id.as_str());
        for slot in grid.slots() {
            let entry = schedule.and_then(|s| s.entry(slot));
            let activity = SlotActivity::from(entry);
            let charger = match activity {
                SlotActivity::Charge => entry
                    .and_then(|e| e.charger_ref.as_ref())
                    .map_or("", |c| c.as_str()),
                _ => "",
            };
            wtr.write_record(&[
                id.to_string(),
                slot.to_string(),
                grid.slot_label(slot),
                activity.as_str().to_string(),
                charger.to_string(),
                format_soc(result.soc_at(slot)),
                format_soc(result.soc_at(slot + 1)),
            ])?;
        }
    }

    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

fn format_soc(soc: Option<f64>) -> String {
    soc.map(|s| format!("{s:.4}")).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fleet::charger::Charger;
    use crate::fleet::schedule::ScheduleEntry;
    use crate::fleet::vehicle::{FuelType, VehicleEnergyParameters};
    use crate::sim::engine::Engine;

    fn fixture() -> (TimeGrid, Vec<VehicleSchedule>, SimulationReport) {
        let grid = TimeGrid::new(60, 4);
        let mut bus = VehicleSchedule::new("bus-1", FuelType::Ev, 50.0, &grid);
        bus.assign(0..1, Some(ScheduleEntry::run())).unwrap();
        bus.assign(2..3, Some(ScheduleEntry::charge("c1"))).unwrap();
        let mut diesel = VehicleSchedule::new("d-1", FuelType::Diesel, 100.0, &grid);
        diesel.assign(0..4, Some(ScheduleEntry::run())).unwrap();
        let vehicles = vec![bus, diesel];
        let report = Engine::new(
            grid,
            VehicleEnergyParameters::default(),
            &[Charger::new("c1", 50.0)],
        )
        .run(&vehicles);
        (grid, vehicles, report)
    }

    fn render() -> String {
        let (grid, vehicles, report) = fixture();
        let mut buf = Vec::new();
        write_csv(&report, &vehicles, &grid, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn header_matches_schema() {
        let output = render();
        assert_eq!(output.lines().next(), Some(HEADER));
    }

    #[test]
    fn one_row_per_ev_slot() {
        let output = render();
        // 1 header + 4 slots of the EV; diesel omitted
        assert_eq!(output.lines().count(), 5);
        assert!(!output.contains("d-1"));
    }

    #[test]
    fn deterministic_output() {
        assert_eq!(render(), render());
    }

    #[test]
    fn rows_carry_activity_and_soc() {
        let output = render();
        let mut rdr = csv::ReaderBuilder::new().from_reader(output.as_bytes());
        let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(&rows[0][3], "RUN");
        assert_eq!(&rows[1][3], "IDLE");
        assert_eq!(&rows[2][3], "CHARGE");
        assert_eq!(&rows[2][4], "c1");
        assert_eq!(&rows[0][2], "00:00");
        assert_eq!(&rows[3][2], "03:00");

        let start: f64 = rows[0][5].parse().unwrap();
        let end: f64 = rows[0][6].parse().unwrap();
        assert_eq!(start, 50.0);
        assert!(end < start);
        for row in &rows {
            let soc: f64 = row[6].parse().unwrap();
            assert!((0.0..=100.0).contains(&soc));
        }
    }
}
