//! Synthetic stand-in for the AR tracking subsystem: emits the same event
//! vocabulary (topology, found, updated, lost) with a procedurally waving
//! palm patch, so the full pipeline runs without tracking hardware.

use crate::common::{Detection, HandTopology, RigidTransform, TriangleIndices};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

pub enum HandTrackerEvent {
    TopologyLoaded(HandTopology),
    HandFound(Detection),
    HandUpdated(Detection),
    HandLost,
}

pub struct SyntheticHandTracker {
    log: slog::Logger,
    side: usize,
    time: f32,
    topology_sent: bool,
    tracking: bool,
    announced: bool,
    next_flip: f32,
    simulate_loss: bool,
    rng: SmallRng,
}

fn grid_topology(side: usize) -> HandTopology {
    let mut right_indices = Vec::with_capacity(2 * (side - 1) * (side - 1));
    for row in 0..side - 1 {
        for col in 0..side - 1 {
            let i0 = (row * side + col) as u32;
            let i1 = i0 + 1;
            let i2 = i0 + side as u32;
            let i3 = i2 + 1;
            right_indices.push(TriangleIndices { a: i0, b: i2, c: i1 });
            right_indices.push(TriangleIndices { a: i1, b: i2, c: i3 });
        }
    }

    HandTopology {
        points_per_detection: side * side,
        right_indices,
    }
}

impl SyntheticHandTracker {
    pub fn new(log: &slog::Logger, side: usize, simulate_loss: bool) -> Self {
        assert!(side >= 2, "hand grid needs at least 2 vertices per side");

        SyntheticHandTracker {
            log: log.new(o!("module" => "tracker")),
            side,
            time: 0.0,
            topology_sent: false,
            tracking: true,
            announced: false,
            next_flip: 2.0,
            simulate_loss,
            rng: SmallRng::seed_from_u64(0x8a2d),
        }
    }

    /// Advances the simulation and returns this tick's events, in delivery
    /// order. The topology always precedes the first detection.
    pub fn poll(&mut self, dt: f32) -> Vec<HandTrackerEvent> {
        let mut events = Vec::new();

        if !self.topology_sent {
            events.push(HandTrackerEvent::TopologyLoaded(grid_topology(self.side)));
            self.topology_sent = true;
        }

        self.time += dt;
        if self.simulate_loss && self.time >= self.next_flip {
            self.tracking = !self.tracking;
            self.next_flip = self.time + self.rng.gen_range(0.5, 3.0);
            if !self.tracking {
                debug!(self.log, "simulated tracking loss");
                events.push(HandTrackerEvent::HandLost);
            }
        }

        if self.tracking {
            let detection = self.detection(self.time);
            if self.announced {
                events.push(HandTrackerEvent::HandUpdated(detection));
            } else {
                debug!(self.log, "hand entered tracking");
                self.announced = true;
                events.push(HandTrackerEvent::HandFound(detection));
            }
        } else {
            self.announced = false;
        }

        events
    }

    // Waving palm patch: a height field over the grid with analytic normals.
    fn detection(&self, t: f32) -> Detection {
        let side = self.side;
        let extent = 0.1_f32;
        let spacing = extent / (side - 1) as f32;
        let amp = 0.01_f32;
        let k = 60.0_f32;
        let w = 4.0_f32;

        let num_points = side * side;
        let mut vertices = Vec::with_capacity(num_points);
        let mut normals = Vec::with_capacity(num_points);
        for row in 0..side {
            for col in 0..side {
                let x = col as f32 * spacing - extent / 2.0;
                let y = row as f32 * spacing - extent / 2.0;
                let z = amp * (k * x + w * t).sin() * (k * y).cos();
                let dz_dx = amp * k * (k * x + w * t).cos() * (k * y).cos();
                let dz_dy = -amp * k * (k * x + w * t).sin() * (k * y).sin();

                vertices.push(na::Point3::new(x, y, z));
                normals.push(na::Vector3::new(-dz_dx, -dz_dy, 1.0).normalize());
            }
        }

        Detection {
            transform: RigidTransform {
                position: glm::vec3(0.0, 0.0, -0.3 + 0.02 * (0.7 * t).sin()),
                scale: 1.0,
            },
            vertices,
            normals,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_log() -> slog::Logger {
        slog::Logger::root(slog::Discard, o!())
    }

    #[test]
    fn test_first_poll_sends_topology_then_found() {
        let mut tracker = SyntheticHandTracker::new(&test_log(), 4, false);
        let events = tracker.poll(0.016);

        assert_eq!(events.len(), 2);
        let topology = match &events[0] {
            HandTrackerEvent::TopologyLoaded(topology) => topology,
            _ => panic!("expected topology first"),
        };
        assert!(topology.validate().is_ok());
        assert_eq!(topology.points_per_detection, 16);
        assert_eq!(topology.right_indices.len(), 18);

        match &events[1] {
            HandTrackerEvent::HandFound(detection) => {
                assert_eq!(detection.vertices.len(), topology.points_per_detection);
                assert_eq!(detection.normals.len(), topology.points_per_detection);
            }
            _ => panic!("expected hand found after topology"),
        }
    }

    #[test]
    fn test_detection_normals_are_unit_length() {
        let mut tracker = SyntheticHandTracker::new(&test_log(), 6, false);
        tracker.poll(0.016);
        let events = tracker.poll(0.016);

        let detection = match &events[0] {
            HandTrackerEvent::HandUpdated(detection) => detection,
            _ => panic!("expected an update"),
        };
        for normal in &detection.normals {
            approx::assert_relative_eq!(normal.norm(), 1.0, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_steady_tracker_never_loses_the_hand() {
        let mut tracker = SyntheticHandTracker::new(&test_log(), 4, false);
        tracker.poll(0.016);

        for _ in 0..500 {
            for event in tracker.poll(0.016) {
                assert!(matches!(event, HandTrackerEvent::HandUpdated(_)));
            }
        }
    }

    #[test]
    fn test_lossy_tracker_refinds_after_loss() {
        let mut tracker = SyntheticHandTracker::new(&test_log(), 4, true);
        let mut lost = false;
        let mut refound = false;

        for _ in 0..2000 {
            for event in tracker.poll(0.016) {
                match event {
                    HandTrackerEvent::HandLost => lost = true,
                    HandTrackerEvent::HandFound(_) if lost => refound = true,
                    _ => {}
                }
            }
        }

        assert!(lost && refound);
    }
}
