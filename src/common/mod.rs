use anyhow::ensure;

/// One triangle of the hand topology, as indices into the tracked point list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriangleIndices {
    pub a: u32,
    pub b: u32,
    pub c: u32,
}

/// Fixed triangle layout of the tracked hand mesh. Delivered once by the
/// tracking subsystem and shared by the visible mesh and the occluder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandTopology {
    pub points_per_detection: usize,
    pub right_indices: Vec<TriangleIndices>,
}

impl HandTopology {
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(self.points_per_detection > 0, "topology has no vertices");
        for tri in &self.right_indices {
            for &index in &[tri.a, tri.b, tri.c] {
                ensure!(
                    (index as usize) < self.points_per_detection,
                    "triangle index {} out of range for {} vertices",
                    index,
                    self.points_per_detection
                );
            }
        }

        Ok(())
    }

    /// Flattens the triangle list into the `[a0, b0, c0, a1, b1, c1, ..]`
    /// index buffer layout the renderer consumes.
    pub fn flat_indices(&self) -> Vec<u32> {
        let mut indices = Vec::with_capacity(3 * self.right_indices.len());
        for tri in &self.right_indices {
            indices.push(tri.a);
            indices.push(tri.b);
            indices.push(tri.c);
        }

        indices
    }
}

/// Whole-hand rigid transform, applied to the hand instance rather than baked
/// into individual vertices.
#[derive(Debug, Clone, Copy)]
pub struct RigidTransform {
    pub position: glm::Vec3,
    pub scale: f32,
}

/// One frame of tracked hand-pose data. `vertices` and `normals` are ordered
/// and must both have length `points_per_detection` of the active topology.
#[derive(Debug, Clone)]
pub struct Detection {
    pub transform: RigidTransform,
    pub vertices: Vec<na::Point3<f32>>,
    pub normals: Vec<na::Vector3<f32>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_well_formed_topology() {
        let topology = HandTopology {
            points_per_detection: 4,
            right_indices: vec![
                TriangleIndices { a: 0, b: 1, c: 2 },
                TriangleIndices { a: 0, b: 2, c: 3 },
            ],
        };

        assert!(topology.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_topology() {
        let topology = HandTopology {
            points_per_detection: 0,
            right_indices: vec![],
        };

        assert!(topology.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_out_of_range_index() {
        let topology = HandTopology {
            points_per_detection: 3,
            right_indices: vec![TriangleIndices { a: 0, b: 1, c: 3 }],
        };

        assert!(topology.validate().is_err());
    }

    #[test]
    fn test_flat_indices_preserves_triangle_order() {
        let topology = HandTopology {
            points_per_detection: 4,
            right_indices: vec![
                TriangleIndices { a: 0, b: 1, c: 2 },
                TriangleIndices { a: 0, b: 2, c: 3 },
            ],
        };

        assert_eq!(topology.flat_indices(), vec![0, 1, 2, 0, 2, 3]);
    }
}
