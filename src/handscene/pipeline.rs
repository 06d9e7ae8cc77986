use crate::common::{Detection, HandTopology};
use crate::handscene::mesh::HandMesh;
use std::cell::RefCell;
use std::rc::Rc;

/// Seam to the host rendering engine. `add_hand` fires exactly once, when the
/// pipeline reaches `Ready`; the scene keeps the shared handle for the rest
/// of the session and reads buffers from it every frame.
pub trait SceneGraph {
    fn add_hand(&mut self, hand: Rc<RefCell<HandMesh>>);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Uninitialized,
    PartiallyReady,
    Ready,
}

/// Bridges tracking-subsystem lifecycle events to a single hand mesh.
///
/// The rendering surface and the topology descriptor arrive in arbitrary
/// order; the mesh is built and registered with the scene exactly once, when
/// both are known. One pipeline instance tracks one hand.
pub struct HandScenePipeline<S> {
    log: slog::Logger,
    surface: Option<S>,
    topology: Option<HandTopology>,
    hand: Option<Rc<RefCell<HandMesh>>>,
    dropped_events: u64,
}

impl<S> HandScenePipeline<S> {
    pub fn new(log: &slog::Logger) -> Self {
        HandScenePipeline {
            log: log.new(o!("module" => "hand_pipeline")),
            surface: None,
            topology: None,
            hand: None,
            dropped_events: 0,
        }
    }

    pub fn state(&self) -> PipelineState {
        match (self.surface.is_some(), self.topology.is_some()) {
            (true, true) => PipelineState::Ready,
            (false, false) => PipelineState::Uninitialized,
            _ => PipelineState::PartiallyReady,
        }
    }

    pub fn hand(&self) -> Option<&Rc<RefCell<HandMesh>>> {
        self.hand.as_ref()
    }

    /// Events that arrived before the pipeline was ready and were dropped.
    pub fn dropped_events(&self) -> u64 {
        self.dropped_events
    }

    /// Records the rendering surface handle. First value wins; repeated
    /// signals are ignored.
    pub fn on_attach(&mut self, surface: S, scene: &mut dyn SceneGraph) {
        if self.surface.is_none() {
            self.surface = Some(surface);
        }
        self.try_init(scene);
    }

    /// Records the mesh topology. First valid value wins; repeated signals
    /// are ignored and invalid topologies are rejected outright.
    pub fn on_topology_loaded(&mut self, topology: HandTopology, scene: &mut dyn SceneGraph) {
        if self.topology.is_none() {
            if let Err(err) = topology.validate() {
                error!(self.log, "rejecting hand topology: {}", err);
                return;
            }
            self.topology = Some(topology);
        }
        self.try_init(scene);
    }

    /// Forgets both readiness signals. An already-built hand survives; scene
    /// teardown belongs to the rendering engine.
    pub fn on_detach(&mut self) {
        self.surface = None;
        self.topology = None;
    }

    pub fn on_hand_found(&mut self, detection: &Detection) {
        self.show(detection);
    }

    pub fn on_hand_updated(&mut self, detection: &Detection) {
        self.show(detection);
    }

    pub fn on_hand_lost(&mut self) {
        match &self.hand {
            Some(hand) => hand.borrow_mut().hide(),
            None => self.drop_event("hand lost"),
        }
    }

    fn show(&mut self, detection: &Detection) {
        match &self.hand {
            Some(hand) => hand.borrow_mut().show(detection),
            None => self.drop_event("hand detection"),
        }
    }

    fn try_init(&mut self, scene: &mut dyn SceneGraph) {
        if self.hand.is_some() || self.surface.is_none() {
            return;
        }
        let topology = match &self.topology {
            Some(topology) => topology,
            None => return,
        };

        match HandMesh::build(&self.log, topology) {
            Ok(hand) => {
                info!(self.log, "hand mesh ready";
                      "points" => topology.points_per_detection);
                let hand = Rc::new(RefCell::new(hand));
                scene.add_hand(Rc::clone(&hand));
                self.hand = Some(hand);
            }
            Err(err) => {
                error!(self.log, "failed to build hand mesh: {}", err);
                self.topology = None;
            }
        }
    }

    fn drop_event(&mut self, what: &str) {
        // The tracking subsystem is not supposed to emit these before both
        // readiness signals have landed.
        debug_assert!(false, "{} event before pipeline was ready", what);
        self.dropped_events += 1;
        warn!(self.log, "dropping {} event, pipeline not ready", what;
              "dropped" => self.dropped_events);
    }
}
