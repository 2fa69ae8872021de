//! Decoded mesh output and its builder.

use std::collections::HashMap;

use crate::PlyError;

/// Decoded geometry: positions plus optional per-vertex channels and
/// triangle indices.
///
/// When present, `normals`, `uvs`, `colors` and every `custom` channel
/// have the same arity as `positions`; `indices` entries are valid
/// positions into `positions`. Color components are normalized to
/// `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mesh {
    pub positions: Vec<[f32; 3]>,
    pub normals: Option<Vec<[f32; 3]>>,
    pub uvs: Option<Vec<[f32; 2]>>,
    pub colors: Option<Vec<[f32; 3]>>,
    /// Verbatim passthrough channels requested via
    /// [`set_custom_property_name_mapping`](crate::PlyParser::set_custom_property_name_mapping).
    pub custom: HashMap<String, Vec<f32>>,
    pub indices: Vec<[u32; 3]>,
}

impl Mesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len()
    }
}

/// What to do with face lists whose length is neither 3 nor 4.
///
/// The default is [`Drop`](FaceListPolicy::Drop), matching common
/// loader behavior; [`Fail`](FaceListPolicy::Fail) aborts the parse
/// with [`PlyError::UnsupportedFaceSize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FaceListPolicy {
    #[default]
    Drop,
    Fail,
}

/// Normalize one color triple. Each component is handled
/// independently: values above 1.0 are assumed to be 0-255 encoded and
/// divided by 255, values in `[0, 1]` pass through. The property's
/// declared type is deliberately not consulted.
pub(crate) fn normalize_color(raw: [f64; 3]) -> [f32; 3] {
    [
        normalize_channel(raw[0]),
        normalize_channel(raw[1]),
        normalize_channel(raw[2]),
    ]
}

fn normalize_channel(value: f64) -> f32 {
    if value > 1.0 {
        (value / 255.0) as f32
    } else {
        value as f32
    }
}

/// Accumulates decoded vertex and face records into a [`Mesh`].
///
/// Vertex records arrive in file order; that order is the index space
/// face lists refer to.
pub(crate) struct MeshBuilder {
    mesh: Mesh,
    policy: FaceListPolicy,
}

impl MeshBuilder {
    pub fn new(policy: FaceListPolicy) -> Self {
        MeshBuilder {
            mesh: Mesh::default(),
            policy,
        }
    }

    pub fn push_position(&mut self, xyz: [f64; 3]) {
        self.mesh
            .positions
            .push([xyz[0] as f32, xyz[1] as f32, xyz[2] as f32]);
    }

    pub fn push_normal(&mut self, xyz: [f64; 3]) {
        self.mesh
            .normals
            .get_or_insert_with(Vec::new)
            .push([xyz[0] as f32, xyz[1] as f32, xyz[2] as f32]);
    }

    pub fn push_uv(&mut self, st: [f64; 2]) {
        self.mesh
            .uvs
            .get_or_insert_with(Vec::new)
            .push([st[0] as f32, st[1] as f32]);
    }

    pub fn push_color(&mut self, rgb: [f64; 3]) {
        self.mesh
            .colors
            .get_or_insert_with(Vec::new)
            .push(normalize_color(rgb));
    }

    pub fn push_custom(&mut self, channel: &str, value: f64) {
        self.mesh
            .custom
            .entry(channel.to_string())
            .or_default()
            .push(value as f32);
    }

    /// Append one face from its vertex-index list.
    ///
    /// A list of length 3 emits one triangle verbatim. A quad
    /// `[a, b, c, d]` emits two triangles by fan decomposition,
    /// `(a, b, c)` and `(c, d, a)` - this convention is fixed. Other
    /// lengths follow the configured [`FaceListPolicy`].
    pub fn push_face(&mut self, list: &[f64]) -> Result<(), PlyError> {
        match list {
            [a, b, c] => {
                self.mesh.indices.push([*a as u32, *b as u32, *c as u32]);
            }
            [a, b, c, d] => {
                let (a, b, c, d) = (*a as u32, *b as u32, *c as u32, *d as u32);
                self.mesh.indices.push([a, b, c]);
                self.mesh.indices.push([c, d, a]);
            }
            other => {
                if self.policy == FaceListPolicy::Fail {
                    return Err(PlyError::UnsupportedFaceSize(other.len()));
                }
            }
        }
        Ok(())
    }

    /// Validate invariants and hand the mesh to the caller.
    pub fn finish(self) -> Result<Mesh, PlyError> {
        let vertex_count = self.mesh.positions.len();
        for triangle in &self.mesh.indices {
            for &index in triangle {
                if index as usize >= vertex_count {
                    return Err(PlyError::FaceIndexOutOfBounds {
                        index,
                        vertex_count,
                    });
                }
            }
        }
        Ok(self.mesh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_normalization_rule() {
        assert_eq!(normalize_color([255.0, 1.0, 0.5]), [1.0, 1.0, 0.5]);
        assert_eq!(normalize_color([0.0, 0.0, 0.0]), [0.0, 0.0, 0.0]);
        // Each component is judged independently.
        assert_eq!(normalize_color([2.0, 0.25, 128.0])[1], 0.25);
    }

    #[test]
    fn quad_fan_decomposition() {
        let mut builder = MeshBuilder::new(FaceListPolicy::Drop);
        for _ in 0..4 {
            builder.push_position([0.0, 0.0, 0.0]);
        }
        builder.push_face(&[0.0, 1.0, 2.0, 3.0]).unwrap();
        let mesh = builder.finish().unwrap();
        assert_eq!(mesh.indices, vec![[0, 1, 2], [2, 3, 0]]);
    }

    #[test]
    fn oversized_faces_follow_policy() {
        let pentagon = [0.0, 1.0, 2.0, 3.0, 4.0];

        let mut dropping = MeshBuilder::new(FaceListPolicy::Drop);
        dropping.push_face(&pentagon).unwrap();
        assert!(dropping.finish().unwrap().indices.is_empty());

        let mut failing = MeshBuilder::new(FaceListPolicy::Fail);
        assert!(matches!(
            failing.push_face(&pentagon),
            Err(PlyError::UnsupportedFaceSize(5))
        ));
    }

    #[test]
    fn out_of_bounds_index_is_rejected() {
        let mut builder = MeshBuilder::new(FaceListPolicy::Drop);
        builder.push_position([0.0, 0.0, 0.0]);
        builder.push_face(&[0.0, 0.0, 7.0]).unwrap();
        assert!(matches!(
            builder.finish(),
            Err(PlyError::FaceIndexOutOfBounds { index: 7, .. })
        ));
    }
}
