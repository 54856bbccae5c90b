mod util;

use reeb_graph::prelude::*;
use util::*;

fn untouched(g: &ReebGraph) {
    assert!(!g.is_closed());
    assert_eq!(g.number_of_nodes(), 0);
    assert_eq!(g.number_of_arcs(), 0);
    assert_eq!(g.scalar_range(), None);
}

#[test]
fn unknown_field_name() {
    let mut g = ReebGraph::new();
    let err = g.build(&two_peak_disk(), "pressure".into()).unwrap_err();
    assert_eq!(err, ReebGraphError::NoSuchField("pressure".into()));
    assert_eq!(err.code(), -2);
    untouched(&g);
}

#[test]
fn field_index_out_of_range() {
    let mut g = ReebGraph::new();
    let err = g.build(&two_peak_disk(), FieldSelector::Index(3)).unwrap_err();
    assert_eq!(err.code(), -2);
    untouched(&g);
}

#[test]
fn field_shorter_than_the_mesh() {
    let mesh = SimplexMesh::surface([[0, 1, 2], [1, 2, 3]]);
    let short = FieldArray::scalar("f", vec![0.0, 1.0, 2.0]);
    let mut g = ReebGraph::new();
    let err = g.build_with_field(&mesh, &short).unwrap_err();
    assert_eq!(
        err,
        ReebGraphError::IncorrectField {
            field: "f".into(),
            vertex: 3
        }
    );
    assert_eq!(err.code(), -1);
    untouched(&g);
}

#[test]
fn field_without_components() {
    let mesh = SimplexMesh::surface([[0, 1, 2]]);
    let empty = FieldArray::new("f", 0, vec![]);
    let mut g = ReebGraph::new();
    assert_eq!(g.build_with_field(&mesh, &empty).unwrap_err().code(), -1);
    untouched(&g);
}

#[test]
fn mixed_cells_are_rejected_before_streaming() {
    let mut mesh = SimplexMesh::surface([[0, 1, 2]]);
    mesh.push_cell(&[1, 2, 3, 4]);
    let f = FieldArray::scalar("f", vec![0.0, 1.0, 2.0, 3.0, 4.0]);
    let mut g = ReebGraph::new();
    let err = g.build_with_field(&mesh, &f).unwrap_err();
    assert_eq!(
        err,
        ReebGraphError::NotASimplicialMesh {
            cell: 1,
            points: 4,
            expected: CellType::Triangle,
        }
    );
    assert_eq!(err.code(), -3);
    untouched(&g);
}

#[test]
fn volume_needs_tetrahedra() {
    let mut mesh = SimplexMesh::new(MeshKind::Volume);
    mesh.push_cell(&[0, 1, 2]);
    mesh.add_field(FieldArray::scalar("f", vec![0.0, 1.0, 2.0]));
    let mut g = ReebGraph::new();
    assert_eq!(g.build(&mesh, "f".into()).unwrap_err().code(), -3);
    untouched(&g);
}

#[test]
fn degenerate_cell() {
    let mesh = SimplexMesh::volume([[0, 1, 2, 2]])
        .with_field(FieldArray::scalar("f", vec![0.0, 1.0, 2.0]));
    let mut g = ReebGraph::new();
    assert_eq!(
        g.build(&mesh, "f".into()),
        Err(ReebGraphError::DegenerateSimplex(2))
    );
    untouched(&g);
}

#[test]
fn building_twice_is_rejected() {
    let mut g = ReebGraph::new();
    g.build(&two_peak_disk(), "f".into()).unwrap();
    assert_eq!(
        g.build(&two_peak_disk(), "f".into()),
        Err(ReebGraphError::StreamClosed)
    );
    assert_eq!(g.number_of_arcs(), 3);
}

#[test]
fn volume_build_from_tetrahedra() {
    let mesh = SimplexMesh::volume([[0, 1, 2, 3], [1, 2, 3, 4]])
        .with_field(FieldArray::scalar("f", vec![0.0, 1.0, 2.0, 3.0, 4.0]));
    let mut g = ReebGraph::new();
    g.build(&mesh, "f".into()).unwrap();
    assert_eq!(node_vertices(&g), vec![0, 4]);
    assert_eq!(super_arcs(&g), vec![(0, 4, vec![1, 2, 3])]);
}
