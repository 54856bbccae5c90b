//! Input meshes and the scalar fields sampled on them.
//!
//! A Reeb graph is built from a simplicial mesh: a surface made only of
//! triangles or a volume made only of tetrahedra, with a scalar value per
//! point. [`SimplicialMesh`] is the seam callers implement for their own
//! mesh types; [`SimplexMesh`] is a plain owned implementation.

use std::fmt;

use crate::reeb_error::ReebGraphError;
use crate::topology::cell_type::CellType;
use crate::topology::handle::VertexId;

/// Whether a mesh is a triangulated surface or a tetrahedral volume.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum MeshKind {
    Surface,
    Volume,
}

impl MeshKind {
    /// The simplex every cell of such a mesh must be.
    pub fn cell_type(self) -> CellType {
        match self {
            MeshKind::Surface => CellType::Triangle,
            MeshKind::Volume => CellType::Tetrahedron,
        }
    }
}

/// A named point array with `num_components` values per point, stored
/// point-major.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldArray {
    name: String,
    num_components: usize,
    values: Vec<f64>,
}

impl FieldArray {
    pub fn new(name: impl Into<String>, num_components: usize, values: Vec<f64>) -> Self {
        FieldArray {
            name: name.into(),
            num_components,
            values,
        }
    }

    /// Single-component array.
    pub fn scalar(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self::new(name, 1, values)
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn num_components(&self) -> usize {
        self.num_components
    }

    /// Number of points the array has a full tuple for.
    pub fn num_tuples(&self) -> usize {
        self.values.len().checked_div(self.num_components).unwrap_or(0)
    }

    /// Component `comp` of the tuple of `point`, if present.
    pub fn component(&self, point: VertexId, comp: usize) -> Option<f64> {
        if comp >= self.num_components {
            return None;
        }
        let point = usize::try_from(point).ok()?;
        if point >= self.num_tuples() {
            return None;
        }
        self.values.get(point * self.num_components + comp).copied()
    }

    /// Scalar sampled at `point`: its first component.
    ///
    /// # Errors
    /// [`ReebGraphError::IncorrectField`] when the array has no value for
    /// `point` (or no components at all).
    pub fn try_scalar(&self, point: VertexId) -> Result<f64, ReebGraphError> {
        self.component(point, 0)
            .ok_or_else(|| ReebGraphError::IncorrectField {
                field: self.name.clone(),
                vertex: point,
            })
    }
}

/// The point arrays attached to a mesh.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PointData {
    arrays: Vec<FieldArray>,
}

impl PointData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an array, returning its index.
    pub fn add_array(&mut self, array: FieldArray) -> usize {
        self.arrays.push(array);
        self.arrays.len() - 1
    }

    pub fn len(&self) -> usize {
        self.arrays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arrays.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&FieldArray> {
        self.arrays.get(index)
    }

    /// First array called `name`.
    pub fn by_name(&self, name: &str) -> Option<&FieldArray> {
        self.arrays.iter().find(|a| a.name == name)
    }

    /// Resolve a selector.
    ///
    /// # Errors
    /// [`ReebGraphError::NoSuchField`] when nothing matches.
    pub fn select(&self, selector: &FieldSelector) -> Result<&FieldArray, ReebGraphError> {
        match selector {
            FieldSelector::Name(name) => self.by_name(name),
            FieldSelector::Index(i) => self.get(*i),
        }
        .ok_or_else(|| ReebGraphError::NoSuchField(selector.to_string()))
    }
}

/// Chooses the scalar field of a mesh.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum FieldSelector {
    Name(String),
    Index(usize),
}

impl fmt::Display for FieldSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldSelector::Name(name) => write!(f, "{name}"),
            FieldSelector::Index(i) => write!(f, "#{i}"),
        }
    }
}

impl From<&str> for FieldSelector {
    fn from(name: &str) -> Self {
        FieldSelector::Name(name.to_owned())
    }
}

impl From<usize> for FieldSelector {
    fn from(index: usize) -> Self {
        FieldSelector::Index(index)
    }
}

/// A mesh whose cells are all simplices of one dimension.
pub trait SimplicialMesh {
    fn kind(&self) -> MeshKind;
    fn num_cells(&self) -> usize;
    /// Vertex ids of cell `cell`, in any order.
    fn cell_point_ids(&self, cell: usize) -> &[VertexId];
    fn point_data(&self) -> &PointData;
}

/// Owned mesh with explicit cell connectivity.
#[derive(Clone, Debug, PartialEq)]
pub struct SimplexMesh {
    kind: MeshKind,
    cells: Vec<Vec<VertexId>>,
    point_data: PointData,
}

impl SimplexMesh {
    pub fn new(kind: MeshKind) -> Self {
        SimplexMesh {
            kind,
            cells: Vec::new(),
            point_data: PointData::new(),
        }
    }

    /// Surface made of the given triangles.
    pub fn surface<I>(triangles: I) -> Self
    where
        I: IntoIterator<Item = [VertexId; 3]>,
    {
        let mut mesh = Self::new(MeshKind::Surface);
        mesh.cells.extend(triangles.into_iter().map(|t| t.to_vec()));
        mesh
    }

    /// Volume made of the given tetrahedra.
    pub fn volume<I>(tetrahedra: I) -> Self
    where
        I: IntoIterator<Item = [VertexId; 4]>,
    {
        let mut mesh = Self::new(MeshKind::Volume);
        mesh.cells.extend(tetrahedra.into_iter().map(|t| t.to_vec()));
        mesh
    }

    /// Append a cell. Its size is checked when the mesh is built.
    pub fn push_cell(&mut self, points: &[VertexId]) {
        self.cells.push(points.to_vec());
    }

    pub fn add_field(&mut self, array: FieldArray) -> usize {
        self.point_data.add_array(array)
    }

    /// Builder form of [`add_field`](Self::add_field).
    pub fn with_field(mut self, array: FieldArray) -> Self {
        self.add_field(array);
        self
    }
}

impl SimplicialMesh for SimplexMesh {
    fn kind(&self) -> MeshKind {
        self.kind
    }

    fn num_cells(&self) -> usize {
        self.cells.len()
    }

    fn cell_point_ids(&self, cell: usize) -> &[VertexId] {
        self.cells.get(cell).map_or(&[], Vec::as_slice)
    }

    fn point_data(&self) -> &PointData {
        &self.point_data
    }
}

/// Check that every cell of `mesh` is the simplex its kind requires, that
/// no cell repeats a vertex, and that `field` has a value for every
/// referenced vertex.
pub fn validate_mesh<M>(mesh: &M, field: &FieldArray) -> Result<(), ReebGraphError>
where
    M: SimplicialMesh + ?Sized,
{
    let expected = mesh.kind().cell_type();
    for cell in 0..mesh.num_cells() {
        let points = mesh.cell_point_ids(cell);
        if points.len() != expected.point_count() {
            return Err(ReebGraphError::NotASimplicialMesh {
                cell,
                points: points.len(),
                expected,
            });
        }
        for (i, &v) in points.iter().enumerate() {
            if points[..i].contains(&v) {
                return Err(ReebGraphError::DegenerateSimplex(v));
            }
            field.try_scalar(v)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn components_are_point_major() {
        let f = FieldArray::new("uv", 2, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(f.num_tuples(), 3);
        assert_eq!(f.component(1, 0), Some(2.0));
        assert_eq!(f.component(2, 1), Some(5.0));
        assert_eq!(f.component(3, 0), None);
        assert_eq!(f.component(0, 2), None);
    }

    #[test]
    fn zero_component_array_has_no_scalars() {
        let f = FieldArray::new("empty", 0, vec![1.0]);
        assert_eq!(f.num_tuples(), 0);
        let err = f.try_scalar(0).unwrap_err();
        assert_eq!(err.code(), -1);
    }

    #[test]
    fn selectors_resolve_by_name_and_index() {
        let mut pd = PointData::new();
        pd.add_array(FieldArray::scalar("a", vec![0.0]));
        pd.add_array(FieldArray::scalar("b", vec![1.0]));
        assert_eq!(pd.select(&"b".into()).unwrap().name(), "b");
        assert_eq!(pd.select(&0usize.into()).unwrap().name(), "a");
        assert_eq!(
            pd.select(&FieldSelector::Index(5)),
            Err(ReebGraphError::NoSuchField("#5".into()))
        );
    }

    #[test]
    fn validation_reports_the_first_bad_cell() {
        let field = FieldArray::scalar("f", vec![0.0, 1.0, 2.0, 3.0]);
        let mut mesh = SimplexMesh::surface([[0, 1, 2]]);
        mesh.push_cell(&[0, 1, 2, 3]);
        assert_eq!(
            validate_mesh(&mesh, &field),
            Err(ReebGraphError::NotASimplicialMesh {
                cell: 1,
                points: 4,
                expected: CellType::Triangle
            })
        );

        let mesh = SimplexMesh::surface([[0, 1, 1]]);
        assert_eq!(
            validate_mesh(&mesh, &field),
            Err(ReebGraphError::DegenerateSimplex(1))
        );

        let mesh = SimplexMesh::volume([[0, 1, 2, 9]]);
        assert_eq!(validate_mesh(&mesh, &field).unwrap_err().code(), -1);
    }
}
