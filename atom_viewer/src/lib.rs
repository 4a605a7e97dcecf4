//! Atom model viewer
//!
//! Renders a nucleus of proton and neutron spheres lit by orbiting electrons,
//! plus a textured decorative cube. Each element's layout comes from a
//! `.aselement` data file that is parsed the first time the element is
//! selected and kept in memory afterwards.
//!
//! - [`parser`]: the `.aselement` format and its validation
//! - [`selection`] / [`store`] / [`scene`]: element switching and lazy loading
//! - [`renderer`] / [`texture`] / [`geometry`]: the wgpu side

pub mod config;
pub mod element;
pub mod entity;
pub mod geometry;
pub mod parser;
pub mod renderer;
pub mod scene;
pub mod selection;
pub mod store;
pub mod texture;
pub mod ui;

pub use element::{Element, ELEMENT_COUNT};
pub use parser::{load_element_file, parse_element, ElementData, LoadError};
pub use scene::{AtomScene, MAX_ELECTRON_LIGHTS};
pub use selection::{ElementSelection, SelectionIntent};
pub use store::{ElementSource, ElementStore, FileSource, LoadState};
