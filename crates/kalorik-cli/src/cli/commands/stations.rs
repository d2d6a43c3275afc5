use kalorik_store::{Station, StationKind};

use crate::exit_codes::SUCCESS;

pub fn run() -> i32 {
    for station in Station::all() {
        let collects = match station.kind() {
            StationKind::BarChart => "bar chart",
            StationKind::TimeSeries => "time series",
            StationKind::Observation => "analysis only",
        };
        println!("{}  {}  ({})", station.letter(), station.label(), collects);
        if station.collects_table() {
            println!("   columns: {}", station.template().columns().join(", "));
        }
    }
    SUCCESS
}
