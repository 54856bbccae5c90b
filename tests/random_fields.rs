mod util;

use std::collections::HashSet;

use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use reeb_graph::prelude::*;
use util::*;

/// A permutation of the ranks `0..n` as scalars.
fn ranks(n: usize) -> impl Strategy<Value = Vec<f64>> {
    Just((0..n).map(|i| i as f64).collect::<Vec<_>>()).prop_shuffle()
}

/// Grid size, a scalar field, a threshold.
fn grid_field() -> impl Strategy<Value = (usize, usize, Vec<f64>, f64)> {
    (2usize..6, 2usize..6).prop_flat_map(|(nx, ny)| (Just(nx), Just(ny), ranks(nx * ny), 0.0f64..1.0))
}

/// Grid size, a scalar field, which cells are cut out, a threshold.
fn holey_grid_field() -> impl Strategy<Value = (usize, usize, Vec<f64>, Vec<bool>, f64)> {
    (3usize..7, 3usize..7).prop_flat_map(|(nx, ny)| {
        (
            Just(nx),
            Just(ny),
            ranks(nx * ny),
            prop::collection::vec(prop::bool::weighted(0.25), (nx - 1) * (ny - 1)),
            0.0f64..1.0,
        )
    })
}

/// Box size, a scalar field, a threshold.
fn box_field() -> impl Strategy<Value = (usize, usize, usize, Vec<f64>, f64)> {
    (2usize..4, 2usize..4, 2usize..4).prop_flat_map(|(nx, ny, nz)| {
        (Just(nx), Just(ny), Just(nz), ranks(nx * ny * nz), 0.0f64..1.0)
    })
}

/// Every mesh vertex is a super-graph vertex or absorbed by one arc, at
/// most once. Returns how many are accounted for.
fn accounted_vertices(g: &ReebGraph) -> usize {
    let sg = g.super_graph();
    let mut seen = HashSet::new();
    for &v in sg.vertices() {
        assert!(seen.insert(v), "vertex {v} listed twice");
    }
    for arc in sg.arcs() {
        for &v in &arc.interior {
            assert!(seen.insert(v), "vertex {v} absorbed twice");
        }
    }
    seen.len()
}

fn ascending(g: &ReebGraph) -> bool {
    let sg = g.super_graph();
    sg.arcs().iter().all(|arc| {
        let (d, u) = sg.arc_endpoints(arc).unwrap();
        let (fd, fu) = (g.vertex_scalar(d).unwrap(), g.vertex_scalar(u).unwrap());
        (fd, d) < (fu, u)
    })
}

/// Structural checks that hold for any closed or simplified graph.
fn check_shape(g: &ReebGraph) -> Result<(), TestCaseError> {
    prop_assert!(g.validate_invariants().is_ok());
    prop_assert_eq!(
        g.number_of_loops() + g.number_of_nodes(),
        g.number_of_arcs() + g.number_of_connected_components()
    );
    prop_assert!(ascending(g));
    Ok(())
}

/// Simplify at `t`, then check that simplifying again changes nothing.
fn check_simplify(g: &mut ReebGraph, t: f64) -> Result<(), TestCaseError> {
    let arcs_before = g.number_of_arcs();
    let loops_before = g.number_of_loops();
    let removed = g.simplify(t, None).unwrap();
    check_shape(g)?;
    prop_assert!(g.number_of_arcs() <= arcs_before);
    prop_assert!(g.number_of_loops() <= loops_before);
    prop_assert!(removed <= arcs_before);

    let arcs = super_arcs(g);
    let nodes = node_vertices(g);
    prop_assert_eq!(g.simplify(t, None).unwrap(), 0);
    prop_assert_eq!(super_arcs(g), arcs);
    prop_assert_eq!(node_vertices(g), nodes);
    Ok(())
}

fn build(mesh: &SimplexMesh, eager_finalization: bool) -> ReebGraph {
    let mut g = ReebGraph::with_opts(ReebGraphOpts {
        eager_finalization,
        ..Default::default()
    });
    g.build(mesh, "f".into()).unwrap();
    g
}

proptest! {
    #[test]
    fn disks_give_trees((nx, ny, values, t) in grid_field()) {
        let n = values.len();
        let mesh = grid_disk(nx, ny, values);
        let mut g = build(&mesh, false);

        check_shape(&g)?;
        prop_assert_eq!(g.number_of_connected_components(), 1);
        prop_assert_eq!(g.number_of_loops(), 0);
        prop_assert_eq!(accounted_vertices(&g), n);

        check_simplify(&mut g, t)?;
        prop_assert_eq!(g.number_of_loops(), 0);
        prop_assert_eq!(g.number_of_connected_components(), 1);
        prop_assert!(accounted_vertices(&g) <= n);
    }

    #[test]
    fn eager_disks_match_lazy_ones((nx, ny, values, _t) in grid_field()) {
        let mesh = grid_disk(nx, ny, values);
        let (lazy, eager) = (build(&mesh, false), build(&mesh, true));
        prop_assert!(eager.validate_invariants().is_ok());
        prop_assert_eq!(node_vertices(&eager), node_vertices(&lazy));
        prop_assert_eq!(super_arcs(&eager), super_arcs(&lazy));
    }

    #[test]
    fn holey_grids_keep_their_shape((nx, ny, values, holes, t) in holey_grid_field()) {
        let mesh = grid_surface(nx, ny, values, |x, y| holes[y * (nx - 1) + x]);
        let mut g = build(&mesh, false);

        check_shape(&g)?;
        prop_assert_eq!(accounted_vertices(&g), referenced_vertices(&mesh));

        check_simplify(&mut g, t)?;
        prop_assert!(accounted_vertices(&g) <= referenced_vertices(&mesh));
    }

    #[test]
    fn boxes_give_trees((nx, ny, nz, values, t) in box_field()) {
        let n = values.len();
        let mesh = grid_volume(nx, ny, nz, values);
        let mut g = build(&mesh, false);

        check_shape(&g)?;
        prop_assert_eq!(g.number_of_connected_components(), 1);
        prop_assert_eq!(g.number_of_loops(), 0);
        prop_assert_eq!(accounted_vertices(&g), n);

        let eager = build(&mesh, true);
        prop_assert_eq!(super_arcs(&eager), super_arcs(&g));

        check_simplify(&mut g, t)?;
        prop_assert_eq!(g.number_of_loops(), 0);
        prop_assert_eq!(g.number_of_connected_components(), 1);
    }

    #[test]
    fn stream_order_is_irrelevant((nx, ny, values, _t) in grid_field(), seed in any::<u64>()) {
        let mesh = grid_disk(nx, ny, values.clone());
        let reference = build(&mesh, false);

        let mut cells: Vec<_> = (0..mesh.num_cells())
            .map(|c| mesh.cell_point_ids(c).to_vec())
            .collect();
        cells.shuffle(&mut SmallRng::seed_from_u64(seed));
        let mut g = ReebGraph::new();
        for cell in cells {
            let at = |i: usize| (cell[i], values[cell[i] as usize]);
            g.stream_triangle([at(2), at(0), at(1)]).unwrap();
        }
        g.close_stream().unwrap();

        prop_assert_eq!(node_vertices(&g), node_vertices(&reference));
        prop_assert_eq!(super_arcs(&g), super_arcs(&reference));
    }
}
