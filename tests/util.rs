#![allow(dead_code)]
use reeb_graph::prelude::*;

/// Id of grid point `(x, y)` in a grid `nx` points wide.
pub fn gid(nx: usize, x: usize, y: usize) -> VertexId {
    (y * nx + x) as VertexId
}

/// The two triangles of grid cell `(x, y)`, split along its rising diagonal.
pub fn cell_triangles(nx: usize, x: usize, y: usize) -> [[VertexId; 3]; 2] {
    let (a, b) = (gid(nx, x, y), gid(nx, x + 1, y));
    let (c, d) = (gid(nx, x + 1, y + 1), gid(nx, x, y + 1));
    [[a, b, c], [a, c, d]]
}

/// Triangulated `nx` x `ny` point grid carrying `values` as field "f",
/// skipping the cells for which `skip` holds.
pub fn grid_surface(
    nx: usize,
    ny: usize,
    values: Vec<f64>,
    skip: impl Fn(usize, usize) -> bool,
) -> SimplexMesh {
    assert_eq!(values.len(), nx * ny);
    let mut tris = Vec::new();
    for y in 0..ny - 1 {
        for x in 0..nx - 1 {
            if !skip(x, y) {
                tris.extend(cell_triangles(nx, x, y));
            }
        }
    }
    SimplexMesh::surface(tris).with_field(FieldArray::scalar("f", values))
}

/// Full grid: a disk.
pub fn grid_disk(nx: usize, ny: usize, values: Vec<f64>) -> SimplexMesh {
    grid_surface(nx, ny, values, |_, _| false)
}

/// 3x3 disk with one minimum (vertex 0), one saddle (vertex 7) and two
/// maxima (vertices 6 and 8). The branch up to vertex 6 has persistence
/// 0.5 / 9.
pub fn two_peak_disk() -> SimplexMesh {
    grid_disk(3, 3, vec![0.0, 1.5, 2.5, 2.0, 3.0, 4.0, 5.0, 4.5, 9.0])
}

/// 4x4 grid without its middle cell, under a tilted linear height.
pub fn tilted_annulus() -> SimplexMesh {
    let values = (0..16)
        .map(|i| (i % 4) as f64 + 0.3 * (i / 4) as f64)
        .collect();
    grid_surface(4, 4, values, |x, y| (x, y) == (1, 1))
}

/// Id of lattice point `(x, y, z)` in an `nx` x `ny` x `nz` box.
pub fn vid(nx: usize, ny: usize, x: usize, y: usize, z: usize) -> VertexId {
    ((z * ny + y) * nx + x) as VertexId
}

/// Tetrahedral `nx` x `ny` x `nz` point box carrying `values` as field "f".
/// Every cube is cut into the six tetrahedra around its main diagonal, so
/// neighbouring cubes agree on their shared faces.
pub fn grid_volume(nx: usize, ny: usize, nz: usize, values: Vec<f64>) -> SimplexMesh {
    assert_eq!(values.len(), nx * ny * nz);
    const AXES: [[usize; 3]; 6] = [
        [0, 1, 2],
        [0, 2, 1],
        [1, 0, 2],
        [1, 2, 0],
        [2, 0, 1],
        [2, 1, 0],
    ];
    let mut tets = Vec::new();
    for z in 0..nz - 1 {
        for y in 0..ny - 1 {
            for x in 0..nx - 1 {
                for order in AXES {
                    let mut at = [x, y, z];
                    let mut tet = [vid(nx, ny, x, y, z); 4];
                    for (k, &axis) in order.iter().enumerate() {
                        at[axis] += 1;
                        tet[k + 1] = vid(nx, ny, at[0], at[1], at[2]);
                    }
                    tets.push(tet);
                }
            }
        }
    }
    SimplexMesh::volume(tets).with_field(FieldArray::scalar("f", values))
}

/// Number of distinct vertices referenced by the cells of `mesh`.
pub fn referenced_vertices(mesh: &SimplexMesh) -> usize {
    let mut vs: Vec<VertexId> = (0..mesh.num_cells())
        .flat_map(|c| mesh.cell_point_ids(c).to_vec())
        .collect();
    vs.sort_unstable();
    vs.dedup();
    vs.len()
}

/// Stream every cell of `mesh` with field "f", without closing.
pub fn stream_all(g: &mut ReebGraph, mesh: &SimplexMesh) {
    let f = mesh.point_data().by_name("f").unwrap();
    let at = |v: VertexId| (v, f.try_scalar(v).unwrap());
    for cell in 0..mesh.num_cells() {
        match *mesh.cell_point_ids(cell) {
            [a, b, c] => g.stream_triangle([at(a), at(b), at(c)]).unwrap(),
            [a, b, c, d] => g.stream_tetrahedron([at(a), at(b), at(c), at(d)]).unwrap(),
            _ => panic!("cell {cell} is not a simplex"),
        }
    }
}

/// Super-arcs as `(down, up, interior)` vertex ids, sorted.
pub fn super_arcs(g: &ReebGraph) -> Vec<(VertexId, VertexId, Vec<VertexId>)> {
    let sg = g.super_graph();
    let mut arcs: Vec<_> = sg
        .arcs()
        .iter()
        .map(|a| {
            let (d, u) = sg.arc_endpoints(a).unwrap();
            (d, u, a.interior.clone())
        })
        .collect();
    arcs.sort();
    arcs
}

/// Vertex ids of the live nodes, sorted.
pub fn node_vertices(g: &ReebGraph) -> Vec<VertexId> {
    let mut vs: Vec<_> = g.nodes().filter_map(|n| g.node_vertex_id(n)).collect();
    vs.sort_unstable();
    vs
}
