use approx::assert_relative_eq;
use nalgebra::{Point3, Rotation3, Vector3};
use scan_calib::core::{
    fit_plane, AcceptanceBand, ColoredPointSet, PlaneFitParams, Rgb, RigidTransform,
};
use scan_calib::{
    BlockReport, CalibrationSession, CaptureOutcome, LocateStage, ScanSnapshot, SessionConfig,
    SharedSession,
};

const BLOCK_COLOR: Rgb = Rgb::new(200, 180, 170);
const FLOOR_COLOR: Rgb = Rgb::new(100, 100, 100);
const SPACING: f64 = 0.5;
const BLOCK_TOP: f64 = 1.0;

/// Floor grid at z = 0 with a solid 4×4 block standing on it, both in the
/// working frame. The block has full bottom and top faces plus perimeter
/// points on three side layers. Returns the scene and the top-face center.
fn block_scene() -> (Vec<(Point3<f64>, Rgb)>, Vector3<f64>) {
    let on_block = |i: usize| (8..12).contains(&i);
    let mut scene = Vec::new();
    for i in 0..20 {
        for j in 0..20 {
            if on_block(i) && on_block(j) {
                continue;
            }
            let p = Point3::new(i as f64 * SPACING, j as f64 * SPACING, 0.0);
            scene.push((p, FLOOR_COLOR));
        }
    }
    for layer in 0..=4 {
        let z = layer as f64 * 0.25;
        let solid_face = layer == 0 || layer == 4;
        for i in 0..4 {
            for j in 0..4 {
                let perimeter = i == 0 || i == 3 || j == 0 || j == 3;
                if solid_face || perimeter {
                    let (x, y) = (4.0 + i as f64 * SPACING, 4.0 + j as f64 * SPACING);
                    scene.push((Point3::new(x, y, z), BLOCK_COLOR));
                }
            }
        }
    }
    (scene, Vector3::new(4.75, 4.75, BLOCK_TOP))
}

/// Sensor two meters above the floor, looking down. Every entry is exact in
/// binary so the round trip through the sensor frame is lossless.
fn sensor_to_working() -> RigidTransform {
    RigidTransform::from_external_pose(
        [0.0, 0.0, 2.0],
        [[1.0, 0.0, 0.0], [0.0, -1.0, 0.0], [0.0, 0.0, -1.0]],
    )
    .expect("rigid pose")
}

fn sensor_snapshot(scene: &[(Point3<f64>, Rgb)]) -> ScanSnapshot {
    let to_sensor = sensor_to_working().inverse();
    let (points, colors) = scene
        .iter()
        .map(|(p, c)| (to_sensor.apply_point(p), *c))
        .unzip();
    ScanSnapshot::new("camera_rgb_optical_frame", points).with_colors(colors)
}

/// Start just above the floor, with a band tuned to the block color.
fn floor_config() -> SessionConfig {
    let mut config = SessionConfig::default();
    config.block.start_height = 0.05;
    config.block.band = AcceptanceBand::new(Rgb::new(150, 150, 150), [20, 10, 0]);
    config
}

#[test]
fn locates_block_through_sensor_transform() {
    let (scene, center) = block_scene();
    let mut session = CalibrationSession::new(floor_config());
    assert_eq!(
        session.offer_scan(sensor_snapshot(&scene)).expect("offer"),
        CaptureOutcome::Captured
    );
    session.transform_scan(&sensor_to_working()).expect("transform");

    let det = session.locate_block().expect("block");
    // every band-matching point above the start height supports the estimate
    let estimate = session.block_estimate().expect("estimate");
    assert_eq!(estimate.height, BLOCK_TOP);
    assert_eq!(estimate.support, 16 + 3 * 12);
    assert!((det.centroid - center).norm() < SPACING);
    assert_relative_eq!(det.centroid, center, epsilon = 1e-9);
    let color = BLOCK_COLOR.to_vector();
    assert_relative_eq!(det.average_color, color, epsilon = 1e-9);
    // axis-aligned top face: edge runs along y over three spacings
    let edge = Vector3::new(0.0, 1.5, 0.0);
    assert_relative_eq!(det.orientation, edge, epsilon = 1e-9);

    // side layers fall outside the height band, only the top face is kept
    let top = session.block_points().expect("block points");
    assert_eq!(top.len(), 16);
    assert!(top.iter().all(|p| p.position.z == BLOCK_TOP));
    assert_eq!(session.state(), LocateStage::Located);
}

#[test]
fn block_report_serializes_found_and_not_found() {
    let (scene, _) = block_scene();
    let mut session = CalibrationSession::new(floor_config());
    session.offer_scan(sensor_snapshot(&scene)).expect("offer");
    session.transform_scan(&sensor_to_working()).expect("transform");
    let report = session.block_report().expect("report");
    assert!(report.is_found());
    let json = scan_calib::records::to_json(&report).expect("json");
    assert!(json.contains("\"status\": \"found\""));
    assert!(json.contains("\"frame_id\": \"torso\""));

    let floor_only: Vec<_> = scene
        .into_iter()
        .filter(|(_, c)| *c == FLOOR_COLOR)
        .collect();
    session.clear_scan();
    session.offer_scan(sensor_snapshot(&floor_only)).expect("offer");
    session.transform_scan(&sensor_to_working()).expect("transform");
    let report = session.block_report().expect("report");
    assert!(matches!(report, BlockReport::NotFound { .. }));
}

#[test]
fn selected_patch_gives_floor_plane_in_working_frame() {
    let (scene, _) = block_scene();
    let mut session = CalibrationSession::new(floor_config());
    session.offer_scan(sensor_snapshot(&scene)).expect("offer");

    let to_sensor = sensor_to_working().inverse();
    let patch = session
        .scan()
        .expect("scan")
        .raw()
        .positions()
        .select(&[0, 1, 20, 21, 42]);
    assert_eq!(patch.len(), 5);
    assert_eq!(
        patch.points[2],
        to_sensor.apply_point(&Point3::new(SPACING, 0.0, 0.0))
    );
    session.set_selection(patch);
    session.transform_scan(&sensor_to_working()).expect("transform");
    session.transform_selection(&sensor_to_working()).expect("transform");

    let params = session.fit_selection_plane().expect("plane");
    assert_relative_eq!(params.normal[2].abs(), 1.0, epsilon = 1e-9);
    assert_relative_eq!(params.offset, 0.0, epsilon = 1e-9);

    let coplanar = session.find_coplanar_points().expect("coplanar");
    assert!(coplanar.is_empty(), "strict range on a flat patch is empty");
    // 384 floor points around the block plus its 16-point bottom face
    let floor = session.coplanar_points_at_height(0.0, 1e-6).expect("floor");
    assert_eq!(floor.len(), 400);
}

#[test]
fn plane_fit_recovers_horizontal_grid() {
    let pts: Vec<_> = (0..6)
        .flat_map(|i| (0..6).map(move |j| (i as f64, j as f64)))
        .map(|(x, y)| Point3::new(x, y, 5.0))
        .collect();
    let fit = fit_plane(&pts, &PlaneFitParams::default()).expect("plane");
    assert_relative_eq!(fit.plane.normal.z.abs(), 1.0, epsilon = 1e-9);
    assert_relative_eq!(fit.plane.offset.abs(), 5.0, epsilon = 1e-9);
    let centroid = Vector3::new(2.5, 2.5, 5.0);
    assert_relative_eq!(fit.plane.centroid, centroid, epsilon = 1e-12);
}

#[test]
fn transform_then_inverse_is_identity() {
    let t = RigidTransform::new(
        Rotation3::from_euler_angles(0.3, -0.7, 1.9),
        Vector3::new(0.4, -1.2, 2.5),
    );
    let (scene, _) = block_scene();
    let cloud: ColoredPointSet = scene
        .iter()
        .map(|(p, c)| scan_calib::core::ColoredPoint::new(*p, *c))
        .collect();
    let back = t.inverse().apply(&t.apply(&cloud));
    assert_eq!(back.len(), cloud.len());
    for (a, b) in back.iter().zip(cloud.iter()) {
        assert_relative_eq!(a.position, b.position, epsilon = 1e-9);
        assert_eq!(a.color, b.color);
    }
}

#[test]
fn concurrent_offers_latch_exactly_one_scan() {
    let (scene, _) = block_scene();
    let shared = SharedSession::new(CalibrationSession::new(floor_config()));
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let shared = shared.clone();
            let snapshot = sensor_snapshot(&scene);
            std::thread::spawn(move || shared.offer_scan(snapshot).expect("offer"))
        })
        .collect();
    let captured = handles
        .into_iter()
        .map(|h| h.join().expect("join"))
        .filter(|o| *o == CaptureOutcome::Captured)
        .count();
    assert_eq!(captured, 1);

    let det = shared
        .with(|s| {
            s.transform_scan(&sensor_to_working())?;
            s.locate_block()
        })
        .expect("block");
    let center = Vector3::new(4.75, 4.75, BLOCK_TOP);
    assert_relative_eq!(det.centroid, center, epsilon = 1e-9);
}
