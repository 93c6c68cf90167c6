//! End-to-end routing scenarios.
//!
//! Each test pins down the observable contract: exact endpoints, obstacle
//! avoidance, fan-out at shared corners, and stability of results across
//! incremental updates.

use wire_router::{solve_for, GridPoint, GridRect, Router};

fn p(x: i32, y: i32) -> GridPoint {
    GridPoint::new(x, y)
}

/// True if segment `a-b` passes through the strict interior of `rect`.
/// Sampled densely; good enough for integer fixtures.
fn crosses_interior(a: GridPoint, b: GridPoint, rect: GridRect) -> bool {
    let steps = 1000;
    (0..=steps).any(|i| {
        let t = f64::from(i) / f64::from(steps);
        let x = f64::from(a.x) + t * f64::from(b.x - a.x);
        let y = f64::from(a.y) + t * f64::from(b.y - a.y);
        x > f64::from(rect.x) + 1e-9
            && x < f64::from(rect.right()) - 1.0 - 1e-9
            && y > f64::from(rect.y) + 1e-9
            && y < f64::from(rect.bottom()) - 1.0 - 1e-9
    })
}

fn assert_avoids(points: &[GridPoint], rect: GridRect) {
    for w in points.windows(2) {
        assert!(
            !crosses_interior(w[0], w[1], rect),
            "segment {:?} -> {:?} crosses obstacle {rect:?}",
            w[0],
            w[1]
        );
    }
}

#[test]
fn empty_world_routes_straight() {
    let points = solve_for(&[], &[], 0, 0, 10, 10).unwrap();
    assert_eq!(points, vec![p(0, 0), p(10, 10)]);
}

#[test]
fn blocked_wire_detours_around_one_side() {
    let obstacle = GridRect::new(4, 0, 2, 10);
    let points = solve_for(&[(4, 0, 2, 10)], &[], 0, 5, 10, 5).unwrap();

    assert_eq!(points.first(), Some(&p(0, 5)));
    assert_eq!(points.last(), Some(&p(10, 5)));
    // Two bends: one per corner rounded.
    assert_eq!(points.len(), 4);
    // The shorter detour is below the obstacle, pushed outward by the
    // default spacing.
    assert!(points[1].y > 9);
    assert!(points[2].y > 9);
    assert_avoids(&points, obstacle);
}

#[test]
fn blocked_wire_is_deterministic() {
    let first = solve_for(&[(4, 0, 2, 10)], &[], 0, 5, 10, 5).unwrap();
    let second = solve_for(&[(4, 0, 2, 10)], &[], 0, 5, 10, 5).unwrap();
    assert_eq!(first, second);
}

#[test]
fn bendpoint_forces_detour() {
    let points = solve_for(&[], &[(5, 5)], 0, 0, 10, 0).unwrap();
    assert_eq!(points, vec![p(0, 0), p(5, 5), p(10, 0)]);
}

#[test]
fn bendpoints_chain_in_order() {
    let points = solve_for(&[], &[(3, 5), (7, -5)], 0, 0, 10, 0).unwrap();
    assert_eq!(points, vec![p(0, 0), p(3, 5), p(7, -5), p(10, 0)]);
}

#[test]
fn stacked_obstacles_leave_gap_open() {
    // The two boxes leave the rows y in [4, 6) free; the straight wire
    // slips between them.
    let obstacles = [(4, 0, 2, 4), (4, 6, 2, 4)];
    let points = solve_for(&obstacles, &[], 0, 5, 10, 5).unwrap();
    assert_eq!(points, vec![p(0, 5), p(10, 5)]);

    let again = solve_for(&obstacles, &[], 0, 5, 10, 5).unwrap();
    assert_eq!(points, again);
}

#[test]
fn two_wires_fan_out_at_shared_corner() {
    let mut router = Router::new();
    router.add_obstacle(GridRect::new(4, 4, 4, 4));
    let a = router.add_path(p(0, 1), p(10, 9));
    let b = router.add_path(p(0, 2), p(10, 8));

    router.solve().unwrap();

    let pa = router.points(a).unwrap().to_vec();
    let pb = router.points(b).unwrap().to_vec();

    // Both wires bend once, at the obstacle's top-right corner (7, 4),
    // displaced along the outward diagonal by distinct multiples of the
    // default spacing.
    assert_eq!(pa.len(), 3);
    assert_eq!(pb.len(), 3);

    let (ma, mb) = (pa[1], pb[1]);
    assert_ne!(ma, mb);
    for mid in [ma, mb] {
        let dx = mid.x - 7;
        let dy = 4 - mid.y;
        assert_eq!(dx, dy, "bend {mid:?} is not on the corner's outward diagonal");
        assert!(dx > 0);
        assert_eq!(dx % 4, 0, "bend {mid:?} is not a whole multiple of the spacing");
    }

    // The wire ordered outermost takes the larger offset.
    assert_eq!(ma, p(15, -4));
    assert_eq!(mb, p(11, 0));
}

#[test]
fn endpoint_inside_obstacle_excludes_it() {
    let points = solve_for(&[(0, 0, 100, 100)], &[], 10, 10, 90, 90).unwrap();
    assert_eq!(points, vec![p(10, 10), p(90, 90)]);
}

#[test]
fn add_then_remove_obstacle_without_solving_restores_route() {
    let mut router = Router::new();
    let wire = router.add_path(p(0, 5), p(10, 5));
    router.solve().unwrap();
    let original = router.points(wire).unwrap().to_vec();

    router.add_obstacle(GridRect::new(4, 0, 2, 10));
    router.remove_obstacle(GridRect::new(4, 0, 2, 10));
    router.solve().unwrap();

    assert_eq!(router.points(wire).unwrap(), original.as_slice());
}

#[test]
fn add_solve_remove_solve_restores_route() {
    let mut router = Router::new();
    let wire = router.add_path(p(0, 5), p(10, 5));
    router.solve().unwrap();
    let original = router.points(wire).unwrap().to_vec();
    assert_eq!(original, vec![p(0, 5), p(10, 5)]);

    router.add_obstacle(GridRect::new(4, 0, 2, 10));
    router.solve().unwrap();
    assert!(router.points(wire).unwrap().len() > 2);

    router.remove_obstacle(GridRect::new(4, 0, 2, 10));
    router.solve().unwrap();
    assert_eq!(router.points(wire).unwrap(), original.as_slice());
}

#[test]
fn updating_obstacle_in_place_is_a_noop_on_output() {
    let rect = GridRect::new(4, 0, 2, 10);
    let mut router = Router::new();
    router.add_obstacle(rect);
    let wire = router.add_path(p(0, 5), p(10, 5));
    router.solve().unwrap();
    let before = router.points(wire).unwrap().to_vec();

    assert!(router.update_obstacle(rect, rect));
    router.solve().unwrap();

    assert_eq!(router.points(wire).unwrap(), before.as_slice());
}

#[test]
fn resolving_with_nothing_dirty_is_stable() {
    let mut router = Router::new();
    router.add_obstacle(GridRect::new(4, 0, 2, 10));
    let wire = router.add_path(p(0, 5), p(10, 5));
    router.solve().unwrap();
    let first = router.points(wire).unwrap().to_vec();

    router.solve().unwrap();
    let second = router.points(wire).unwrap().to_vec();

    assert_eq!(first, second);
}

#[test]
fn wider_spacing_never_moves_wire_closer_to_corners() {
    let corner_distance = |spacing: i32| -> f64 {
        let mut router = Router::new();
        router.set_spacing(spacing);
        router.add_obstacle(GridRect::new(4, 0, 2, 10));
        let wire = router.add_path(p(0, 5), p(10, 5));
        router.solve().unwrap();

        let corners = [p(4, 0), p(5, 0), p(4, 9), p(5, 9)];
        let mut min = f64::INFINITY;
        for &point in router.points(wire).unwrap() {
            for corner in corners {
                min = min.min(point.distance(corner));
            }
        }
        min
    };

    assert!(corner_distance(8) >= corner_distance(4));
}

#[test]
fn moving_a_bendpoint_reroutes_the_wire() {
    let mut router = Router::new();
    let wire = router.add_path(p(0, 0), p(10, 0));
    router.set_bend_points(wire, Some(vec![p(5, 5)]));
    router.solve().unwrap();
    assert_eq!(
        router.points(wire).unwrap(),
        &[p(0, 0), p(5, 5), p(10, 0)]
    );

    router.set_bend_points(wire, Some(vec![p(5, -5)]));
    router.solve().unwrap();
    assert_eq!(
        router.points(wire).unwrap(),
        &[p(0, 0), p(5, -5), p(10, 0)]
    );
}

#[test]
fn clearing_bendpoints_straightens_the_wire() {
    let mut router = Router::new();
    let wire = router.add_path(p(0, 0), p(10, 0));
    router.set_bend_points(wire, Some(vec![p(3, 5), (p(7, 5))]));
    router.solve().unwrap();
    assert_eq!(router.points(wire).unwrap().len(), 4);

    router.set_bend_points(wire, None);
    router.solve().unwrap();
    assert_eq!(router.points(wire).unwrap(), &[p(0, 0), p(10, 0)]);
}

#[test]
fn bendpoint_legs_route_around_obstacles_independently() {
    // The second leg is blocked; only it detours.
    let mut router = Router::new();
    router.add_obstacle(GridRect::new(14, 0, 2, 20));
    let wire = router.add_path(p(0, 10), p(30, 10));
    router.set_bend_points(wire, Some(vec![p(10, 10)]));
    router.solve().unwrap();

    let points = router.points(wire).unwrap();
    assert_eq!(points.first(), Some(&p(0, 10)));
    assert_eq!(points.last(), Some(&p(30, 10)));
    assert!(points.contains(&p(10, 10)));
    assert!(points.len() > 3);
    assert_avoids(points, GridRect::new(14, 0, 2, 20));
}

#[test]
fn many_wires_share_an_alley_deterministically() {
    // Four wires from the upper left to the lower right, all forced
    // through the alley between the two blocks; they share corners and
    // fan out there.
    let build = || {
        let mut router = Router::new();
        router.add_obstacle(GridRect::new(10, 0, 10, 18));
        router.add_obstacle(GridRect::new(10, 30, 10, 18));
        let wires: Vec<_> = (0..4)
            .map(|i| router.add_path(p(0, 5 + i), p(40, 43 - i)))
            .collect();
        router.solve().unwrap();
        wires
            .into_iter()
            .map(|w| router.points(w).unwrap().to_vec())
            .collect::<Vec<_>>()
    };

    let first = build();
    let second = build();
    assert_eq!(first, second);

    for (i, polyline) in first.iter().enumerate() {
        let i = i32::try_from(i).unwrap();
        assert_eq!(polyline.first(), Some(&p(0, 5 + i)));
        assert_eq!(polyline.last(), Some(&p(40, 43 - i)));
        // Every wire had to bend to thread the alley.
        assert!(polyline.len() > 2);
    }
}
