//! 内核端到端场景

use kozo_core::prelude::*;
use std::f64::consts::FRAC_PI_2;

fn assert_axes_orthonormal(frame: &Frame) {
    for elem in frame.elems().filter(|e| e.is_line()) {
        let d = frame.direction(elem.num, true).unwrap();
        let s = elem.strong().unwrap();
        let w = elem.weak().unwrap();
        assert!((s.norm() - 1.0).abs() < 1e-9, "element {}", elem.num);
        assert!((w.norm() - 1.0).abs() < 1e-9, "element {}", elem.num);
        assert!(s.dot(&d).abs() < 1e-9, "element {}", elem.num);
        assert!(w.dot(&d).abs() < 1e-9, "element {}", elem.num);
        assert!(s.dot(&w).abs() < 1e-9, "element {}", elem.num);
    }
}

#[test]
fn triangle_plate_normal_and_area() {
    let mut frame = Frame::new();
    let n0 = frame.coord_node(0.0, 0.0, 0.0);
    let n1 = frame.coord_node(1.0, 0.0, 0.0);
    let n2 = frame.coord_node(1.0, 1.0, 0.0);
    let p = frame.add_plate_elem(&[n0, n1, n2], 301, Etype::Slab, None).unwrap();

    let normal = frame.normal(p, true).unwrap();
    assert!((normal - Vector3::new(0.0, 0.0, 1.0)).norm() < 1e-12);
    assert!((frame.area(p).unwrap() - 0.5).abs() < 1e-12);
}

#[test]
fn divide_at_rate_splits_three_seven() {
    let mut frame = Frame::new();
    let n0 = frame.coord_node(0.0, 0.0, 0.0);
    let n1 = frame.coord_node(10.0, 0.0, 0.0);
    let g = frame.add_line_elem([n0, n1], 201, Etype::Girder, None).unwrap();

    let r = frame.divide_at_rate(g, 0.3).unwrap();
    let p = frame.coord(r.nodes[0]).unwrap();
    assert!((p - Vector3::new(3.0, 0.0, 0.0)).norm() < 1e-9);
    let lengths: Vec<f64> = r.elems.iter().map(|&e| frame.length(e).unwrap()).collect();
    assert!((lengths[0] - 3.0).abs() < 1e-9);
    assert!((lengths[1] - 7.0).abs() < 1e-9);
    assert_axes_orthonormal(&frame);
}

#[test]
fn girder_strong_axis_to_vertical() {
    let mut frame = Frame::new();
    let n0 = frame.coord_node(0.0, 0.0, 0.0);
    let n1 = frame.coord_node(1.0, 0.0, 0.0);
    let g = frame.add_line_elem([n0, n1], 201, Etype::Girder, None).unwrap();
    assert_eq!(frame.elem(g).unwrap().cang(), Some(0.0));

    let cang = frame.axis_to_cang(g, &Vector3::new(0.0, 0.0, 1.0), true).unwrap();
    assert!((cang - FRAC_PI_2).abs() < 1e-12);
    let strong = frame.elem(g).unwrap().strong().unwrap();
    assert!((strong - Vector3::new(0.0, 0.0, 1.0)).norm() < 1e-9);
}

#[test]
fn divide_at_ons_uses_middle_node() {
    let mut frame = Frame::new();
    let n0 = frame.coord_node(0.0, 0.0, 0.0);
    let mid = frame.coord_node(0.5, 0.0, 0.0);
    let n1 = frame.coord_node(1.0, 0.0, 0.0);
    let g = frame.add_line_elem([n0, n1], 201, Etype::Girder, None).unwrap();

    let r = frame.divide_at_ons(g).unwrap();
    assert_eq!(r.elems.len(), 2);
    assert_eq!(frame.elem(r.elems[0]).unwrap().enodes, vec![n0, mid]);
    assert_eq!(frame.elem(r.elems[1]).unwrap().enodes, vec![mid, n1]);
    assert_eq!(frame.node_count(), 3);
}

#[test]
fn straight_chain_over_three_girders() {
    let mut frame = Frame::new();
    let n: Vec<_> = (0..4).map(|i| frame.coord_node(2.0 * i as f64, 0.0, 3.0)).collect();
    let g: Vec<_> = (0..3)
        .map(|i| {
            frame
                .add_line_elem([n[i], n[i + 1]], 201, Etype::Girder, None)
                .unwrap()
        })
        .collect();

    let chain = Chain::new(&frame, n[0], g[0], straight(1e-6), never);
    let visited: Vec<_> = chain.collect();
    assert_eq!(visited, vec![g[1], g[2]]);
    assert!(!visited.contains(&g[0]));
}

#[test]
fn divide_keeps_length_for_arbitrary_points() {
    let mut frame = Frame::new();
    let n0 = frame.coord_node(-2.0, 1.0, 0.5);
    let n1 = frame.coord_node(7.0, -3.0, 4.0);
    let g = frame.add_line_elem([n0, n1], 201, Etype::Brace, None).unwrap();
    let total = frame.length(g).unwrap();

    let mut pieces = vec![g];
    for k in [0.5, 0.25, 0.8] {
        let r = frame.divide_at_rate(pieces[0], k).unwrap();
        pieces.extend_from_slice(&r.elems[1..]);
    }
    let sum: f64 = pieces.iter().map(|&e| frame.length(e).unwrap()).sum();
    assert!((sum - total).abs() < 1e-9);
    assert_axes_orthonormal(&frame);
}

#[test]
fn fence_then_divide_at_axis() {
    let mut frame = Frame::new();
    for x in [0.0, 6.0] {
        let a = frame.coord_node(x, 0.0, 0.0);
        let b = frame.coord_node(x, 0.0, 4.0);
        frame.add_line_elem([a, b], 101, Etype::Column, None).unwrap();
    }
    let a = frame.coord_node(0.0, 0.0, 4.0);
    let b = frame.coord_node(6.0, 0.0, 4.0);
    frame.add_line_elem([a, b], 201, Etype::Girder, None).unwrap();

    let crossing = frame.fence(Axis::Z, 2.0, false);
    assert_eq!(crossing.len(), 2);
    for id in crossing {
        frame.divide_at_axis(id, Axis::Z, 2.0).unwrap();
    }
    assert_eq!(frame.elem_count(), 5);
    assert!(frame.fence(Axis::Z, 2.0, false).is_empty());
    assert_eq!(frame.fence(Axis::Z, 2.0, true).len(), 4);
}

#[test]
fn serde_round_trip_rebuilds_index() {
    let mut frame = Frame::new();
    let n0 = frame.coord_node(0.0, 0.0, 0.0);
    let n1 = frame.coord_node(0.0, 0.0, 3.0);
    frame.add_line_elem([n0, n1], 101, Etype::Column, None).unwrap();

    let json = serde_json::to_string(&frame).unwrap();
    let mut back: Frame = serde_json::from_str(&json).unwrap();
    back.rebuild_index();
    assert_eq!(back.coord_node(0.0, 0.0, 3.0), n1);
    assert_eq!(back.node_count(), 2);
}
