use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::ParserError;
use crate::formats::schema::{measurement_columns, RAW_IDENTITY_COLUMNS, REFERENCE_COLUMNS};
use crate::model::{DeviceFamily, Measurement};
use crate::parse_device_file;

fn fixture_path(name: &str) -> PathBuf {
    let base = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    base.join("tests/data").join(name)
}

fn fixture(name: &str) -> (PathBuf, String) {
    let path = fixture_path(name);
    let content = fs::read_to_string(&path)
        .unwrap_or_else(|err| panic!("failed to read fixture {}: {}", path.display(), err));
    (path, content)
}

fn raw_fixed_columns() -> Vec<&'static str> {
    let mut columns = RAW_IDENTITY_COLUMNS.to_vec();
    columns.extend(measurement_columns());
    columns
}

#[test]
fn parses_beta_station_file() {
    let (path, content) = fixture("Beta-19.txt");
    let parsed = parse_device_file(&path, &content).expect("beta station parse failed");

    assert_eq!(parsed.device_id, "Beta-19");
    assert_eq!(parsed.family, DeviceFamily::BetaStation);
    assert_eq!(parsed.df.get_column_names_str(), raw_fixed_columns());

    // device row and calibration row consumed, truncated tail skipped
    assert_eq!(parsed.df.height(), 5);
    assert_eq!(parsed.skipped_rows, 1);

    // whitespace padding stripped from every field
    let time = parsed.df.column("time").expect("time column missing");
    assert_eq!(time.str().unwrap().get(0), Some("9:58:20"));
    let pm = parsed
        .df
        .column("pm2_5_std")
        .expect("pm2_5_std column missing");
    assert_eq!(pm.str().unwrap().get(0), Some("10.0"));
}

#[test]
fn beta_parser_drops_environmental_block() {
    let (path, content) = fixture("Beta-19.txt");
    let parsed = parse_device_file(&path, &content).expect("beta station parse failed");

    for name in ["temp_c", "rh_pct", "pressure_hpa", "altitude_m"] {
        assert!(parsed.df.column(name).is_err(), "unexpected column {name}");
    }
}

#[test]
fn parses_breakout_station_file() {
    let (path, content) = fixture("Breakout-08.txt");
    let parsed = parse_device_file(&path, &content).expect("breakout station parse failed");

    assert_eq!(parsed.device_id, "Breakout-08");
    assert_eq!(parsed.family, DeviceFamily::BreakoutStation);
    assert_eq!(parsed.df.get_column_names_str(), raw_fixed_columns());
    assert_eq!(parsed.df.height(), 2);
    assert_eq!(parsed.skipped_rows, 0);

    let latitude = parsed
        .df
        .column("latitude")
        .expect("latitude column missing");
    assert_eq!(latitude.str().unwrap().get(0), Some("47.659161"));
}

#[test]
fn parses_reference_station_file() {
    let (path, content) = fixture("PugetAir_Bellevue_SE12th.csv");
    let parsed = parse_device_file(&path, &content).expect("reference station parse failed");

    assert_eq!(parsed.device_id, "Bellevue SE 12th");
    assert_eq!(parsed.family, DeviceFamily::ReferenceStation);
    assert_eq!(parsed.df.get_column_names_str(), REFERENCE_COLUMNS.to_vec());
    assert_eq!(parsed.df.height(), 3);

    let stamp = parsed
        .df
        .column("date_time")
        .expect("date_time column missing");
    assert_eq!(stamp.str().unwrap().get(0), Some("9/10/2020 9:00:00 AM"));
}

#[test]
fn reference_station_requires_known_path() {
    let (_, content) = fixture("PugetAir_Bellevue_SE12th.csv");
    let err = parse_device_file(Path::new("PugetAir_Somewhere.csv"), &content)
        .expect_err("unknown station path should not parse");

    match err {
        ParserError::NoMatchingParser { attempts } => assert_eq!(attempts.len(), 3),
        other => panic!("expected NoMatchingParser, got {other:?}"),
    }
}

#[test]
fn rejects_unrecognized_content() {
    let err = parse_device_file(Path::new("notes.txt"), "hello world\n")
        .expect_err("free text should not parse");

    assert!(matches!(err, ParserError::NoMatchingParser { .. }));
}

#[test]
fn fixed_station_without_data_rows_is_empty() {
    let content = "Beta-19\n\
        2020/9/10,0:00:00,4.2,1,0.0,0.0,9,9,9,9,9,9,9,9,9,9,9,9,25.0,40.0,1013.2,30.0\n";
    let err = parse_device_file(Path::new("Beta-19.txt"), content)
        .expect_err("calibration-only file should be empty");

    assert!(matches!(err, ParserError::EmptyData { .. }));
}

#[test]
fn measurement_names_round_trip() {
    assert_eq!(
        Measurement::try_from("PM2.5_Std"),
        Ok(Measurement::Pm25Std)
    );
    assert_eq!(
        Measurement::try_from("dp_gt_0_3"),
        Ok(Measurement::DpAbove0p3)
    );
    assert!(Measurement::try_from("bogus").is_err());
}
