//! Locate a colored block in a synthetic tabletop scan and print the reports.
//!
//! Usage:
//!   cargo run -p scan-calib --example synthetic_block [config.json]

use log::LevelFilter;
use nalgebra::{Point3, Vector3};
use scan_calib::core::{init_with_level, Rgb, RigidTransform};
use scan_calib::records::to_json;
use scan_calib::{CalibrationSession, ScanSnapshot, SessionConfig};
use std::env;
use std::error::Error;

const TABLE_HEIGHT: f64 = -0.24;
const BLOCK_HEIGHT: f64 = -0.19;

fn synthetic_scan(sensor_to_working: &RigidTransform) -> ScanSnapshot {
    let to_sensor = sensor_to_working.inverse();
    let mut points = Vec::new();
    let mut colors = Vec::new();
    for i in 0..40 {
        for j in 0..40 {
            let p = Point3::new(0.3 + i as f64 * 0.01, -0.2 + j as f64 * 0.01, TABLE_HEIGHT);
            points.push(to_sensor.apply_point(&p));
            colors.push(Rgb::new(130, 120, 110));
        }
    }
    for i in 0..5 {
        for j in 0..3 {
            let p = Point3::new(0.45 + i as f64 * 0.01, 0.0 + j as f64 * 0.01, BLOCK_HEIGHT);
            points.push(to_sensor.apply_point(&p));
            colors.push(Rgb::new(210, 190, 175));
        }
    }
    ScanSnapshot::new("head_camera", points).with_colors(colors)
}

fn main() -> Result<(), Box<dyn Error>> {
    init_with_level(LevelFilter::Info)?;

    let config = match env::args().nth(1) {
        Some(path) => SessionConfig::load_json(path)?,
        None => SessionConfig::default(),
    };

    let sensor_to_working = RigidTransform::new(
        nalgebra::Rotation3::from_axis_angle(&Vector3::y_axis(), 0.9),
        Vector3::new(0.1, 0.0, 0.45),
    );

    let mut session = CalibrationSession::new(config);
    session.offer_scan(synthetic_scan(&sensor_to_working))?;
    session.transform_scan(&sensor_to_working)?;

    let table = session
        .scan()?
        .raw()
        .positions()
        .select(&[0, 1, 40, 41, 500, 900]);
    session.set_selection(table);
    session.transform_selection(&sensor_to_working)?;

    println!("{}", to_json(&session.fit_selection_plane()?)?);
    println!("{}", to_json(&session.selection_centroid()?)?);
    println!("{}", to_json(&session.block_report()?)?);
    Ok(())
}
