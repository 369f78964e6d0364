//! Application state of the terrain viewer.
//!
//! One `ViewerState` owns everything that changes during a session: the
//! camera, the elevation interval of loaded tiles and the layer toggles. All
//! mutations go through `&mut self`, which makes it the single writer of the
//! depth range.

use layers::{Layer, LayerId, RefinementStrategy, TerrainLayerProps};
use runtime::{Event, EventBus, EventKind, Frame};
use scene::{DepthRange, ZRange};
use streaming::{MeshAlgorithm, ViewportLoad};
use tracing::{debug, info};

use crate::config::ViewerConfig;
use crate::view_state::ViewState;

/// Inputs from the UI and the map controller.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ViewerChange {
    LoadTexture(bool),
    MeshAlgorithm(MeshAlgorithm),
    /// Jump to a destination (fly-to preset).
    FlyTo(ViewState),
    /// Camera update from the interactive controller.
    ViewState(ViewState),
}

#[derive(Debug)]
pub struct ViewerState {
    view_state: ViewState,
    z_range: DepthRange,
    mesh_algorithm: MeshAlgorithm,
    load_texture: bool,
    min_zoom: u8,
    max_zoom: u8,
    frame: Frame,
    events: EventBus,
}

impl ViewerState {
    pub fn new(config: &ViewerConfig) -> Self {
        Self {
            view_state: config.initial_view.clamped(),
            z_range: DepthRange::new(),
            mesh_algorithm: config.terrain.mesh_algorithm,
            load_texture: config.load_texture,
            min_zoom: config.min_zoom,
            max_zoom: config.max_zoom,
            frame: Frame::at_rate(0, 60.0),
            events: EventBus::new(),
        }
    }

    pub fn view_state(&self) -> ViewState {
        self.view_state
    }

    pub fn z_range(&self) -> Option<ZRange> {
        self.z_range.get()
    }

    pub fn mesh_algorithm(&self) -> MeshAlgorithm {
        self.mesh_algorithm
    }

    pub fn load_texture(&self) -> bool {
        self.load_texture
    }

    pub fn frame(&self) -> Frame {
        self.frame
    }

    /// Events recorded since the last [`advance_frame`](Self::advance_frame).
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Ends the current frame: returns its events and starts the next frame
    /// with an empty log.
    pub fn advance_frame(&mut self) -> Vec<Event> {
        let events = self.events.drain();
        self.frame = self.frame.next();
        events
    }

    /// Folds a viewport batch into the depth range.
    ///
    /// Returns `true` and emits a `z_range` event only when the range widened.
    pub fn on_viewport_load(&mut self, load: &ViewportLoad<'_>) -> bool {
        self.events.emit(
            self.frame,
            EventKind::ViewportLoaded,
            format!("{}/{} tiles", load.loaded(), load.len()),
        );
        if !self.z_range.update(load.elevation_bounds()) {
            return false;
        }
        let Some(range) = self.z_range.get() else {
            return false;
        };
        info!(min = range.min, max = range.max, "depth range widened");
        self.events.emit(
            self.frame,
            EventKind::DepthRangeChanged,
            format!("[{}, {}]", range.min, range.max),
        );
        true
    }

    pub fn apply(&mut self, change: ViewerChange) {
        match change {
            ViewerChange::LoadTexture(on) => {
                if on != self.load_texture {
                    self.load_texture = on;
                    self.layer_changed();
                }
            }
            ViewerChange::MeshAlgorithm(alg) => {
                if alg != self.mesh_algorithm {
                    self.mesh_algorithm = alg;
                    self.layer_changed();
                }
            }
            ViewerChange::FlyTo(view) | ViewerChange::ViewState(view) => {
                self.view_state = view.clamped();
                debug!(
                    lat = self.view_state.latitude,
                    lon = self.view_state.longitude,
                    zoom = self.view_state.zoom,
                    "view state changed"
                );
                self.events.emit_latest(
                    self.frame,
                    EventKind::ViewStateChanged,
                    format!("zoom {:.2}", self.view_state.zoom),
                );
            }
        }
    }

    fn layer_changed(&mut self) {
        let id = self.layer_id();
        info!(layer = %id, "terrain layer changed");
        self.events
            .emit(self.frame, EventKind::LayerChanged, id.to_string());
    }

    pub fn layer_id(&self) -> LayerId {
        self.layer_props().id()
    }

    pub fn layer_props(&self) -> TerrainLayerProps {
        TerrainLayerProps {
            min_zoom: self.min_zoom,
            max_zoom: self.max_zoom,
            z_range: self.z_range.get(),
            refinement: RefinementStrategy::NoOverlap,
            mesh_algorithm: self.mesh_algorithm,
            load_texture: self.load_texture,
            ..TerrainLayerProps::default()
        }
    }
}

impl Default for ViewerState {
    fn default() -> Self {
        Self::new(&ViewerConfig::default())
    }
}
