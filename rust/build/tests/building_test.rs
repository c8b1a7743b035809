// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End to end builds through the host boundary.

use approx::assert_relative_eq;
use archgen_build::context::Limits;
use archgen_build::opening::components::{clubbed_widths, leaf_widths};
use archgen_build::opening::parse_components;
use archgen_build::{
    build_floor, build_floorplan, build_opening, build_roof, build_roof_top, build_stairs, BuildConfig,
    FloorParams, FloorplanParams, MemoryHost, ObjectKind, OpeningParams, RoofKind, RoofParams, RoofTopParams,
    StairsParams,
};
use archgen_mesh::{FaceCategory, FaceKey, Mesh};
use nalgebra::Point3;

/// Shows build events with `RUST_LOG=archgen_build=debug`.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn max_z(mesh: &Mesh, faces: &[FaceKey]) -> f64 {
    mesh.points(&mesh.faces_vertices(faces))
        .iter()
        .map(|p| p.z)
        .fold(f64::NEG_INFINITY, f64::max)
}

fn footprint_host(coords: &[(f64, f64)]) -> (MemoryHost, FaceKey) {
    let mut mesh = Mesh::new();
    let verts: Vec<_> = coords.iter().map(|&(x, y)| mesh.add_vertex(x, y, 0.0)).collect();
    let face = mesh.add_face(&verts).unwrap();
    (MemoryHost::new(mesh), face)
}

fn wall_host() -> (MemoryHost, FaceKey) {
    let mut mesh = Mesh::new();
    let face = mesh
        .add_face_from_points(&[
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(4.0, 0.0, 0.0),
            Point3::new(4.0, 0.0, 2.8),
            Point3::new(0.0, 0.0, 2.8),
        ])
        .unwrap();
    (MemoryHost::new(mesh), face)
}

fn roof(kind: RoofKind) -> RoofParams {
    RoofParams {
        kind,
        ..RoofParams::default()
    }
}

#[test]
fn pitched_roofs_reach_their_height() {
    let rectangle = [(0.0, 0.0), (4.0, 0.0), (4.0, 2.0), (0.0, 2.0)];
    let l_shape = [(0.0, 0.0), (4.0, 0.0), (4.0, 2.0), (2.0, 2.0), (2.0, 4.0), (0.0, 4.0)];
    for coords in [&rectangle[..], &l_shape[..]] {
        for kind in [RoofKind::Gable, RoofKind::Hip] {
            let (mut host, f) = footprint_host(coords);
            let out = build_roof(&mut host, &[f], &roof(kind), &BuildConfig::default()).unwrap();
            assert!(!out.faces.is_empty());
            assert_relative_eq!(max_z(&host.mesh, &out.faces), 1.0, epsilon = 1e-3);
            for &face in &out.faces {
                assert_eq!(host.mesh.category(face), Some(FaceCategory::Roof));
            }
        }
    }
}

#[test]
fn hip_roof_gets_an_overhanging_top() {
    init_tracing();
    let (mut host, f) = footprint_host(&[(0.0, 0.0), (4.0, 0.0), (4.0, 2.0), (0.0, 2.0)]);
    let hips = build_roof(&mut host, &[f], &roof(RoofKind::Hip), &BuildConfig::default()).unwrap();
    let params = RoofTopParams {
        thickness: 0.2,
        outset: 0.3,
    };
    let top = build_roof_top(&mut host, &hips.faces, &params).unwrap();
    assert_eq!(host.commits, 2);

    assert_relative_eq!(max_z(&host.mesh, &top.faces), 1.2, epsilon = 1e-3);
    let lowest = host
        .mesh
        .points(&host.mesh.vertex_keys().collect::<Vec<_>>())
        .iter()
        .map(|p| p.z)
        .fold(f64::INFINITY, f64::min);
    assert_relative_eq!(lowest, -0.15, epsilon = 1e-9);
    let edges = host.mesh.faces_in_category(FaceCategory::RoofEdge);
    assert!(!edges.is_empty());
    for face in edges {
        assert!(!top.faces.contains(&face));
    }
}

#[test]
fn downward_footprint_is_rejected_untouched() {
    let (mut host, f) = footprint_host(&[(0.0, 0.0), (0.0, 2.0), (4.0, 2.0), (4.0, 0.0)]);
    let before = host.mesh.face_count();
    let err = build_roof(&mut host, &[f], &roof(RoofKind::Hip), &BuildConfig::default()).unwrap_err();
    assert!(err.is_precondition());
    assert_eq!(host.mesh.face_count(), before);
    assert_eq!(host.commits, 0);
}

#[test]
fn floorplan_to_house() {
    init_tracing();
    let mut host = MemoryHost::default();
    let config = BuildConfig::default();
    let plan = build_floorplan(&mut host, &FloorplanParams::default()).unwrap();
    let params = FloorParams {
        roof: Some(roof(RoofKind::Gable)),
        ..FloorParams::default()
    };
    build_floor(&mut host, &plan.faces, &params, &config).unwrap();

    let roof_faces = host.mesh.faces_in_category(FaceCategory::Roof);
    assert_eq!(roof_faces.len(), 2);
    // Ceiling of the single storey at 3.0, ridge one unit above
    assert_relative_eq!(max_z(&host.mesh, &roof_faces), 4.0, epsilon = 1e-3);
    // A square gable rises to one ridge edge spanning the footprint
    let at_ridge = |v| (host.mesh.vertex_point(v).unwrap().z - 4.0).abs() < 1e-3;
    let ridges: Vec<_> = host
        .mesh
        .faces_edges(&roof_faces)
        .into_iter()
        .filter_map(|e| host.mesh.edge_vertices(e))
        .filter(|&(a, b)| at_ridge(a) && at_ridge(b))
        .collect();
    assert_eq!(ridges.len(), 1);
    let (a, b) = ridges[0];
    let length = (host.mesh.vertex_point(a).unwrap() - host.mesh.vertex_point(b).unwrap()).norm();
    assert_relative_eq!(length, 4.0, epsilon = 1e-3);

    let outer: Vec<FaceKey> = host
        .mesh
        .faces_in_category(FaceCategory::Wall)
        .into_iter()
        .filter(|&f| {
            let c = host.mesh.face_center(f).unwrap();
            let n = host.mesh.face_normal(f).unwrap();
            n.z.abs() < 1e-6 && c.z < 3.0 && c.x.abs().max(c.y.abs()) > 1.95
        })
        .collect();
    assert_eq!(outer.len(), 4);

    let faces_before = host.mesh.face_count();
    let out = build_opening(&mut host, &outer[..1], &OpeningParams::door(), &config).unwrap();
    assert_eq!(out.objects, 4);
    assert!(host.mesh.face_count() > faces_before);
    let objects = host.objects();
    assert_eq!(objects.of_kind(ObjectKind::Frame).len(), 1);
    assert_eq!(objects.of_kind(ObjectKind::Door).len(), 1);
    assert_eq!(objects.of_kind(ObjectKind::Knob).len(), 2);
    assert_eq!(host.commits, 3);
    assert_eq!(host.aborts, 0);
}

#[test]
fn mixed_opening_keeps_the_width_ratio() {
    init_tracing();
    let (mut host, f) = wall_host();
    let params = OpeningParams {
        different_widths: true,
        width_ratio: 1.2,
        ..OpeningParams::multigroup("window,door,window")
    };
    let out = build_opening(&mut host, &[f], &params, &BuildConfig::default()).unwrap();
    let objects = host.objects();
    assert_eq!(objects.of_kind(ObjectKind::Frame).len(), 1);
    let windows = objects.of_kind(ObjectKind::Window);
    let doors = objects.of_kind(ObjectKind::Door);
    assert_eq!(windows.len(), 2);
    assert_eq!(doors.len(), 1);
    assert!(out.objects >= 4);

    let span = |id| {
        let mesh = &objects.get(id).unwrap().mesh;
        let xs: Vec<f64> = mesh.points(&mesh.vertex_keys().collect::<Vec<_>>()).iter().map(|p| p.x).collect();
        xs.iter().cloned().fold(f64::NEG_INFINITY, f64::max) - xs.iter().cloned().fold(f64::INFINITY, f64::min)
    };
    assert_relative_eq!(span(windows[0]), 1.2 * span(doors[0]), epsilon = 1e-6);
    assert_relative_eq!(span(windows[0]), span(windows[1]), epsilon = 1e-6);
}

#[test]
fn clubbed_spans_conserve_width() {
    for components in ["w", "d", "wdw", "dwwd", "wwdww", "ddwdd", "wdwdw"] {
        let groups = parse_components(components).unwrap();
        for margin in [0.02, 0.05, 0.1] {
            let widths = leaf_widths(&groups, 2.5, margin, 1.2);
            let spans = clubbed_widths(&groups, &widths, margin);
            assert_relative_eq!(spans.iter().sum::<f64>(), 2.5, epsilon = 1e-9);
        }
    }
}

#[test]
fn clamped_openings_stay_inside_the_wall() {
    let limits = Limits::new(4.0, 2.8, None, 0.0);
    for size in [[0.5, 0.5], [1.0, 2.0], [3.9, 2.7], [6.0, 4.0]] {
        for offset in [[-1.0, -1.0], [0.0, 0.8], [3.5, 2.5], [10.0, 10.0]] {
            let offset = limits.restricted_offset(size, offset);
            let size = limits.restricted_size(offset, [0.1, 0.1], size);
            assert!(offset[0] >= 0.0);
            assert!(offset[0] + size[0] <= 4.0 + 1e-9);
            assert!(offset[1] + size[1] <= 2.8 + 1e-9);
        }
    }
}

#[test]
fn stairs_climb_from_the_ground() {
    let (mut host, f) = wall_host();
    let params = StairsParams {
        landing: false,
        ..StairsParams::default()
    };
    build_stairs(&mut host, &[f], &params).unwrap();
    let objects = host.objects();
    let stairs = &objects.get(objects.of_kind(ObjectKind::Stairs)[0]).unwrap().mesh;

    let mut treads: Vec<f64> = stairs
        .faces_in_category(FaceCategory::Stairs)
        .into_iter()
        .filter(|&t| stairs.face_normal(t).unwrap().z > 0.99)
        .map(|t| stairs.face_center(t).unwrap().z)
        .collect();
    treads.sort_by(f64::total_cmp);
    assert_eq!(treads.len(), 3);
    for (z, expected) in treads.iter().zip([0.12, 0.24, 0.36]) {
        assert_relative_eq!(*z, expected, epsilon = 1e-9);
    }
    // Each step's riser starts where the one below ends
    let mut bases: Vec<f64> = stairs
        .faces_in_category(FaceCategory::Stairs)
        .into_iter()
        .filter(|&t| stairs.face_normal(t).unwrap().z.abs() < 1e-6)
        .map(|t| stairs.face_center(t).unwrap().z - 0.06)
        .collect();
    bases.sort_by(f64::total_cmp);
    assert_eq!(bases.len(), 3);
    for (z, expected) in bases.iter().zip([0.0, 0.12, 0.24]) {
        assert_relative_eq!(*z, expected, epsilon = 1e-9);
    }
    // The host wall is only a reference
    assert_eq!(host.mesh.face_count(), 1);
}
