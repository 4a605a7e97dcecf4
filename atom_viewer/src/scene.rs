//! Atom layer state: which element is shown, its entities, and the lights
//! they contribute
//!
//! Nothing here touches the GPU. The renderer reads the current element's
//! entities and [`LightsUniform`] each frame.

use crate::element::{Element, ELEMENT_COUNT};
use crate::parser::ElementData;
use crate::selection::{ElementSelection, SelectionIntent};
use crate::store::{ElementSource, ElementStore, LoadState};

/// Electron lights the particle shader can take
pub const MAX_ELECTRON_LIGHTS: usize = 16;

/// Electron light array as laid out in the shader
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightsUniform {
    pub positions: [[f32; 4]; MAX_ELECTRON_LIGHTS],
    pub colors: [[f32; 4]; MAX_ELECTRON_LIGHTS],
    pub count: u32,
    pub _padding: [u32; 3],
}

impl Default for LightsUniform {
    fn default() -> Self {
        bytemuck::Zeroable::zeroed()
    }
}

pub struct AtomScene<S> {
    selection: ElementSelection,
    store: ElementStore<S>,
    pub paused: bool,
}

impl<S: ElementSource> AtomScene<S> {
    /// Loads the initial element right away
    pub fn new(source: S, initial: Element) -> Self {
        let mut scene = Self {
            selection: ElementSelection::new(initial.index(), ELEMENT_COUNT),
            store: ElementStore::new(source),
            paused: false,
        };
        scene.load(initial);
        scene
    }

    pub fn current_element(&self) -> Element {
        Element::from_index(self.selection.current())
    }

    pub fn current_state(&self) -> &LoadState {
        self.store.state(self.current_element())
    }

    pub fn current_data(&self) -> Option<&ElementData> {
        self.store.data(self.current_element())
    }

    pub fn store(&self) -> &ElementStore<S> {
        &self.store
    }

    /// Cube texture for the current element
    pub fn current_texture(&self) -> &str {
        self.current_data()
            .and_then(|data| data.texture.as_deref())
            .unwrap_or_else(|| self.current_element().default_texture())
    }

    /// Only moves the selection, loading waits for [`AtomScene::end_frame`]
    pub fn handle_intent(&mut self, intent: SelectionIntent) {
        self.selection.apply(intent);
    }

    /// Advance the current element's electrons along their orbits
    pub fn update(&mut self, dt: f32) {
        if self.paused {
            return;
        }
        let element = self.current_element();
        if let Some(data) = self.store.data_mut(element) {
            for electron in &mut data.electrons {
                electron.advance(dt);
            }
        }
    }

    /// Per-frame element change check. Returns the element switched to.
    pub fn end_frame(&mut self) -> Option<Element> {
        let element = Element::from_index(self.selection.take_change()?);
        log::info!("Switched to {} ({})", element.name(), element.symbol());
        self.load(element);
        Some(element)
    }

    fn load(&mut self, element: Element) {
        let was_loaded = self.store.state(element).is_loaded();
        if let Some(data) = self.store.ensure_loaded(element).data() {
            if !was_loaded && data.electrons.len() > MAX_ELECTRON_LIGHTS {
                log::warn!(
                    "{} has {} electrons, only the first {} emit light",
                    element.name(),
                    data.electrons.len(),
                    MAX_ELECTRON_LIGHTS
                );
            }
        }
    }

    /// Pack the current electrons into the light array, in file order
    pub fn lights(&self) -> LightsUniform {
        let mut lights = LightsUniform::default();
        let Some(data) = self.current_data() else {
            return lights;
        };

        let mut count = 0;
        for (slot, electron) in data.electrons.iter().take(MAX_ELECTRON_LIGHTS).enumerate() {
            lights.positions[slot] = electron.position().extend(1.0).to_array();
            lights.colors[slot] = electron.color.extend(1.0).to_array();
            count += 1;
        }
        lights.count = count;
        lights
    }
}
