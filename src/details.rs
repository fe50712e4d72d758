//! Detail fields attached to trace nodes and their value generators.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::constants::trace::{CERTIFICATE_DIGITS_MODULUS, SHELF_DATE_FORMAT};
use crate::random::RandomSource;
use crate::types::DetailValue;

const WATER_QUALITY: [&str; 3] = ["Premium", "Grade I", "Superior"];
const FEED_TYPES: [&str; 3] = ["Natural feed", "Organic feed", "Eco mixed feed"];
const PROCESS_TYPES: [&str; 4] = [
    "Cleaning & portioning",
    "Kabayaki roasting",
    "Flash freezing",
    "Vacuum packing",
];
const QUALITY_GRADES: [&str; 3] = ["Special grade", "Grade I", "Superior"];
const DRIVERS: [&str; 4] = ["Driver Wang", "Driver Li", "Driver Zhang", "Driver Chen"];
const TEST_ITEMS: [&str; 3] = [
    "Heavy metals, pesticide residue",
    "Microbiology, sensory evaluation",
    "Full physicochemical panel",
];
const MANAGERS: [&str; 3] = ["Manager Zhang", "Store Lead Li", "Supervisor Wang"];
const VEHICLE_PREFIX: &str = "川A";

/// Every detail key a node template can declare.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailField {
    /// Pond water quality grade.
    WaterQuality,
    /// Feed used at the farm.
    FeedType,
    /// Stocking density.
    Density,
    /// Processing step.
    ProcessType,
    /// Ambient temperature.
    Temperature,
    /// Product quality grade.
    QualityGrade,
    /// Truck license plate.
    VehicleNo,
    /// Truck driver.
    Driver,
    /// Transport time in hours.
    Duration,
    /// Tests performed.
    TestItems,
    /// Overall test verdict.
    TestResult,
    /// Inspection certificate number.
    Certificate,
    /// Ambient humidity.
    Humidity,
    /// Date placed on the shelf.
    ShelfDate,
    /// Store manager.
    Manager,
    /// Inspector signing off the stage.
    Inspector,
}

impl DetailField {
    /// Label used as the key in a node's details map.
    pub const fn label(self) -> &'static str {
        match self {
            DetailField::WaterQuality => "Water Quality",
            DetailField::FeedType => "Feed Type",
            DetailField::Density => "Stocking Density",
            DetailField::ProcessType => "Process",
            DetailField::Temperature => "Ambient Temperature",
            DetailField::QualityGrade => "Quality Grade",
            DetailField::VehicleNo => "Vehicle No.",
            DetailField::Driver => "Driver",
            DetailField::Duration => "Transport Duration",
            DetailField::TestItems => "Test Items",
            DetailField::TestResult => "Test Result",
            DetailField::Certificate => "Certificate No.",
            DetailField::Humidity => "Ambient Humidity",
            DetailField::ShelfDate => "Shelf Date",
            DetailField::Manager => "Manager",
            DetailField::Inspector => "Inspector",
        }
    }

    /// Generate a value for this field. `now` anchors time-derived fields,
    /// which are taken in UTC.
    pub fn generate(self, rng: &mut dyn RandomSource, now: DateTime<FixedOffset>) -> DetailValue {
        match self {
            DetailField::WaterQuality => pick(rng, &WATER_QUALITY),
            DetailField::FeedType => pick(rng, &FEED_TYPES),
            DetailField::Density => format!("{:.1}kg/m³", rng.float_in(3.0, 5.0)),
            DetailField::ProcessType => pick(rng, &PROCESS_TYPES),
            DetailField::Temperature => format!("{:.1}°C", rng.float_in(-2.0, 6.0)),
            DetailField::QualityGrade => pick(rng, &QUALITY_GRADES),
            DetailField::VehicleNo => format!("{VEHICLE_PREFIX}{}", rng.int_in(10_000, 90_000)),
            DetailField::Driver => pick(rng, &DRIVERS),
            DetailField::Duration => format!("{} hours", rng.int_in(4, 20)),
            DetailField::TestItems => pick(rng, &TEST_ITEMS),
            DetailField::TestResult => "All passed".to_string(),
            DetailField::Certificate => {
                let millis = now.timestamp_millis();
                format!("QC{:08}", millis.rem_euclid(CERTIFICATE_DIGITS_MODULUS))
            }
            DetailField::Humidity => format!("{}%", rng.int_in(55, 20)),
            DetailField::ShelfDate => now
                .naive_utc()
                .date()
                .format(SHELF_DATE_FORMAT)
                .to_string(),
            DetailField::Manager => pick(rng, &MANAGERS),
            DetailField::Inspector => {
                if rng.index(2) == 0 {
                    let letter = char::from(b'A' + rng.index(26) as u8);
                    format!("Inspector {letter}")
                } else {
                    format!("Examiner {}", rng.index(100))
                }
            }
        }
    }
}

fn pick(rng: &mut dyn RandomSource, options: &[&str]) -> DetailValue {
    options[rng.index(options.len())].to_string()
}
