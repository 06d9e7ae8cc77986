use crate::common::{Detection, HandTopology};

/// Distance each occluder vertex is pushed outward along its normal, in model
/// units. Keeps the occluder from depth-fighting with the visible mesh at
/// shared vertices.
pub const OCCLUDER_SHIFT: f32 = 0.002;

/// One renderer-consumable mesh of a hand instance. The visible mesh leaves
/// `normal` empty; the occluder carries one unit normal per vertex.
pub struct SubMesh {
    pub indices: Vec<u32>,
    pub pos: Vec<na::Point3<f32>>,
    pub normal: Vec<na::Vector3<f32>>,
    pub visible: bool,
    pub frustum_culled: bool,
    pub pos_dirty: bool,
    pub normal_dirty: bool,
}

impl SubMesh {
    fn hidden(indices: Vec<u32>, num_points: usize, with_normals: bool) -> Self {
        SubMesh {
            indices,
            pos: vec![na::Point3::origin(); num_points],
            normal: if with_normals {
                vec![na::Vector3::zeros(); num_points]
            } else {
                vec![]
            },
            visible: false,
            frustum_culled: true,
            pos_dirty: false,
            normal_dirty: false,
        }
    }
}

/// One tracked hand: a visible mesh and an invisible occluder built over the
/// same topology, updated in place from per-frame detections. Allocated once
/// when the topology becomes known and reused for the rest of the session.
pub struct HandMesh {
    log: slog::Logger,
    pub visible: bool,
    pub position: glm::Vec3,
    pub scale: f32,
    pub mesh: SubMesh,
    pub occluder: SubMesh,
}

impl HandMesh {
    /// Allocates both meshes for the given topology, zero-initialized and
    /// hidden. Attaching the result to a scene is the caller's business.
    pub fn build(log: &slog::Logger, topology: &HandTopology) -> anyhow::Result<Self> {
        topology.validate()?;

        let log = log.new(o!("module" => "hand_mesh"));
        let num_points = topology.points_per_detection;
        let indices = topology.flat_indices();
        debug!(log, "building hand mesh";
               "points" => num_points,
               "triangles" => topology.right_indices.len());

        Ok(HandMesh {
            log,
            visible: false,
            position: glm::vec3(0.0, 0.0, 0.0),
            scale: 1.0,
            mesh: SubMesh::hidden(indices.clone(), num_points, false),
            occluder: SubMesh::hidden(indices, num_points, true),
        })
    }

    pub fn points_per_detection(&self) -> usize {
        self.mesh.pos.len()
    }

    /// Overwrites both meshes with this frame's tracked pose and makes the
    /// hand visible. Steady state: no allocation, buffer lengths never change.
    pub fn show(&mut self, detection: &Detection) {
        let num_points = self.mesh.pos.len();
        debug_assert_eq!(detection.vertices.len(), num_points);
        debug_assert_eq!(detection.normals.len(), num_points);
        if detection.vertices.len() != num_points || detection.normals.len() != num_points {
            warn!(self.log, "detection does not match topology, ignoring";
                  "expected" => num_points,
                  "vertices" => detection.vertices.len(),
                  "normals" => detection.normals.len());
            return;
        }

        self.position = detection.transform.position;
        self.scale = detection.transform.scale;

        self.mesh.pos.copy_from_slice(&detection.vertices);
        self.occluder.pos.copy_from_slice(&detection.vertices);
        self.occluder.normal.copy_from_slice(&detection.normals);

        // Shift the occluder outward along this frame's normals.
        for (pos, normal) in self.occluder.pos.iter_mut().zip(&self.occluder.normal) {
            *pos += normal * OCCLUDER_SHIFT;
        }

        self.mesh.pos_dirty = true;
        self.occluder.pos_dirty = true;
        self.occluder.normal_dirty = true;

        // Tracked hands can sit right in front of the camera, so distance
        // culling must stay off for both meshes.
        self.mesh.frustum_culled = false;
        self.mesh.visible = true;
        self.occluder.frustum_culled = false;
        self.occluder.visible = true;
        self.visible = true;
    }

    /// Hides the hand and both meshes. Idempotent; the last written pose
    /// stays in the buffers.
    pub fn hide(&mut self) {
        self.visible = false;
        self.mesh.visible = false;
        self.occluder.visible = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{RigidTransform, TriangleIndices};

    fn test_log() -> slog::Logger {
        slog::Logger::root(slog::Discard, o!())
    }

    fn quad_topology() -> HandTopology {
        HandTopology {
            points_per_detection: 4,
            right_indices: vec![
                TriangleIndices { a: 0, b: 1, c: 2 },
                TriangleIndices { a: 0, b: 2, c: 3 },
            ],
        }
    }

    fn quad_detection() -> Detection {
        Detection {
            transform: RigidTransform {
                position: glm::vec3(0.0, 0.0, 0.0),
                scale: 1.0,
            },
            vertices: vec![
                na::Point3::new(0.0, 0.0, 0.0),
                na::Point3::new(1.0, 0.0, 0.0),
                na::Point3::new(1.0, 1.0, 0.0),
                na::Point3::new(0.0, 1.0, 0.0),
            ],
            normals: vec![na::Vector3::new(0.0, 0.0, 1.0); 4],
        }
    }

    #[test]
    fn test_build_allocates_shared_topology() {
        let hand = HandMesh::build(&test_log(), &quad_topology()).unwrap();

        assert_eq!(hand.mesh.pos.len(), 4);
        assert_eq!(hand.occluder.pos.len(), 4);
        assert_eq!(hand.occluder.normal.len(), 4);
        assert!(hand.mesh.normal.is_empty());
        assert_eq!(hand.mesh.indices, vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(hand.mesh.indices, hand.occluder.indices);
        assert!(!hand.visible);
        assert!(!hand.mesh.visible);
        assert!(!hand.occluder.visible);
    }

    #[test]
    fn test_build_rejects_invalid_topology() {
        let log = test_log();

        let empty = HandTopology {
            points_per_detection: 0,
            right_indices: vec![],
        };
        assert!(HandMesh::build(&log, &empty).is_err());

        let out_of_range = HandTopology {
            points_per_detection: 3,
            right_indices: vec![TriangleIndices { a: 0, b: 1, c: 3 }],
        };
        assert!(HandMesh::build(&log, &out_of_range).is_err());
    }

    #[test]
    fn test_show_overwrites_vertices_verbatim() {
        let mut hand = HandMesh::build(&test_log(), &quad_topology()).unwrap();

        let first = quad_detection();
        hand.show(&first);
        assert_eq!(hand.mesh.pos, first.vertices);

        let mut second = quad_detection();
        for (i, vertex) in second.vertices.iter_mut().enumerate() {
            *vertex = na::Point3::new(i as f32, -(i as f32), 0.5);
        }
        hand.show(&second);
        assert_eq!(hand.mesh.pos, second.vertices);
    }

    #[test]
    fn test_show_offsets_occluder_along_normals() {
        let mut hand = HandMesh::build(&test_log(), &quad_topology()).unwrap();
        let mut detection = quad_detection();
        detection.normals = vec![
            na::Vector3::new(0.0, 0.0, 1.0),
            na::Vector3::new(1.0, 0.0, 0.0),
            na::Vector3::new(0.0, 1.0, 0.0),
            na::Vector3::new(0.0, 0.0, -1.0),
        ];

        hand.show(&detection);

        for i in 0..4 {
            approx::assert_relative_eq!(
                hand.occluder.pos[i],
                detection.vertices[i] + detection.normals[i] * OCCLUDER_SHIFT,
                epsilon = 1e-6
            );
            approx::assert_relative_eq!(hand.occluder.normal[i], detection.normals[i]);
        }
    }

    #[test]
    fn test_show_applies_transform_and_flags() {
        let mut hand = HandMesh::build(&test_log(), &quad_topology()).unwrap();
        let mut detection = quad_detection();
        detection.transform = RigidTransform {
            position: glm::vec3(0.1, -0.2, -0.5),
            scale: 1.5,
        };

        hand.show(&detection);

        approx::assert_relative_eq!(hand.position, glm::vec3(0.1, -0.2, -0.5));
        approx::assert_relative_eq!(hand.scale, 1.5);
        assert!(hand.visible);
        assert!(hand.mesh.visible && hand.occluder.visible);
        assert!(!hand.mesh.frustum_culled && !hand.occluder.frustum_culled);
        assert!(hand.mesh.pos_dirty);
        assert!(hand.occluder.pos_dirty && hand.occluder.normal_dirty);
    }

    // End to end scenario: quad topology, unit-z normals, identity transform.
    #[test]
    fn test_show_quad_end_to_end() {
        let mut hand = HandMesh::build(&test_log(), &quad_topology()).unwrap();
        let detection = quad_detection();

        hand.show(&detection);

        assert!(hand.visible);
        assert_eq!(hand.mesh.pos, detection.vertices);
        for i in 0..4 {
            approx::assert_relative_eq!(
                hand.occluder.pos[i],
                detection.vertices[i] + na::Vector3::new(0.0, 0.0, 0.002),
                epsilon = 1e-6
            );
        }
    }

    #[test]
    fn test_hide_keeps_buffers_and_is_idempotent() {
        let mut hand = HandMesh::build(&test_log(), &quad_topology()).unwrap();
        let detection = quad_detection();

        hand.show(&detection);
        hand.hide();
        assert!(!hand.visible && !hand.mesh.visible && !hand.occluder.visible);
        assert_eq!(hand.mesh.pos, detection.vertices);

        hand.hide();
        assert!(!hand.visible);

        hand.show(&detection);
        assert!(hand.visible);
        assert_eq!(hand.mesh.pos, detection.vertices);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic]
    fn test_show_asserts_on_length_mismatch() {
        let mut hand = HandMesh::build(&test_log(), &quad_topology()).unwrap();
        let mut detection = quad_detection();
        detection.vertices.pop();

        hand.show(&detection);
    }

    #[cfg(not(debug_assertions))]
    #[test]
    fn test_show_ignores_length_mismatch_in_release() {
        let mut hand = HandMesh::build(&test_log(), &quad_topology()).unwrap();
        let mut detection = quad_detection();
        detection.vertices.pop();

        hand.show(&detection);

        assert!(!hand.visible);
        assert_eq!(hand.mesh.pos, vec![na::Point3::origin(); 4]);
    }
}
