//! Per-element entity collections with explicit load state

use std::path::PathBuf;

use crate::element::{Element, ELEMENT_COUNT};
use crate::parser::{load_element_file, ElementData, LoadError};

/// Where element data comes from
pub trait ElementSource {
    fn load(&mut self, element: Element) -> Result<ElementData, LoadError>;
}

/// Reads `<assets>/elements/<element>.aselement`
#[derive(Debug, Clone)]
pub struct FileSource {
    assets_dir: PathBuf,
}

impl FileSource {
    pub fn new(assets_dir: impl Into<PathBuf>) -> Self {
        Self {
            assets_dir: assets_dir.into(),
        }
    }
}

impl ElementSource for FileSource {
    fn load(&mut self, element: Element) -> Result<ElementData, LoadError> {
        load_element_file(&element.data_path(&self.assets_dir))
    }
}

#[derive(Debug, Clone, Default)]
pub enum LoadState {
    #[default]
    NotLoaded,
    Loaded(ElementData),
    LoadFailed(String),
}

impl LoadState {
    pub fn data(&self) -> Option<&ElementData> {
        match self {
            LoadState::Loaded(data) => Some(data),
            _ => None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadState::Loaded(_))
    }
}

/// Element data indexed by element, loaded on demand and never evicted
pub struct ElementStore<S> {
    source: S,
    slots: Vec<LoadState>,
}

impl<S: ElementSource> ElementStore<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            slots: vec![LoadState::NotLoaded; ELEMENT_COUNT],
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn state(&self, element: Element) -> &LoadState {
        &self.slots[element.index()]
    }

    pub fn data(&self, element: Element) -> Option<&ElementData> {
        self.state(element).data()
    }

    pub fn data_mut(&mut self, element: Element) -> Option<&mut ElementData> {
        match &mut self.slots[element.index()] {
            LoadState::Loaded(data) => Some(data),
            _ => None,
        }
    }

    /// Load the element unless it is already resident.
    ///
    /// A previous failure is retried. On failure the slot records the reason
    /// and holds no entities.
    pub fn ensure_loaded(&mut self, element: Element) -> &LoadState {
        let slot = element.index();
        if !self.slots[slot].is_loaded() {
            self.slots[slot] = match self.source.load(element) {
                Ok(data) => {
                    log::info!(
                        "Loaded {}: {} particles, {} electrons",
                        element.name(),
                        data.particles.len(),
                        data.electrons.len()
                    );
                    LoadState::Loaded(data)
                }
                Err(err) => {
                    log::error!("Could not load {}: {}", element.name(), err);
                    LoadState::LoadFailed(err.to_string())
                }
            };
        }
        &self.slots[slot]
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::parser::parse_element;
    use std::collections::HashMap;

    /// In-memory source that counts how often each element is parsed
    #[derive(Default)]
    pub(crate) struct MemorySource {
        pub files: HashMap<Element, String>,
        pub loads: HashMap<Element, usize>,
    }

    impl MemorySource {
        pub fn with(mut self, element: Element, contents: &str) -> Self {
            self.files.insert(element, contents.to_string());
            self
        }

        pub fn loads(&self, element: Element) -> usize {
            self.loads.get(&element).copied().unwrap_or(0)
        }
    }

    impl ElementSource for MemorySource {
        fn load(&mut self, element: Element) -> Result<ElementData, LoadError> {
            *self.loads.entry(element).or_default() += 1;
            match self.files.get(&element) {
                Some(contents) => Ok(parse_element(contents)),
                None => Err(LoadError::Io {
                    path: PathBuf::from(element.file_name()),
                    source: std::io::Error::from(std::io::ErrorKind::NotFound),
                }),
            }
        }
    }

    const ONE_PROTON: &str = "#particles\nx=0 y=0 z=0 scale=0.3 type=PROTON\n";

    #[test]
    fn starts_not_loaded() {
        let store = ElementStore::new(MemorySource::default());
        for element in Element::ALL {
            assert!(matches!(store.state(element), LoadState::NotLoaded));
        }
    }

    #[test]
    fn loads_once_and_reuses() {
        let mut store =
            ElementStore::new(MemorySource::default().with(Element::Helium, ONE_PROTON));
        assert!(store.ensure_loaded(Element::Helium).is_loaded());
        let first = store.data(Element::Helium).unwrap().particles.as_ptr();

        store.ensure_loaded(Element::Helium);
        let second = store.data(Element::Helium).unwrap().particles.as_ptr();

        assert_eq!(store.source().loads(Element::Helium), 1);
        assert!(std::ptr::eq(first, second));
    }

    #[test]
    fn empty_file_counts_as_loaded() {
        let mut store = ElementStore::new(MemorySource::default().with(Element::Boron, ""));
        store.ensure_loaded(Element::Boron);
        store.ensure_loaded(Element::Boron);

        let data = store.data(Element::Boron).unwrap();
        assert!(data.particles.is_empty());
        assert_eq!(store.source().loads(Element::Boron), 1);
    }

    #[test]
    fn failure_is_recorded_and_retried() {
        let mut store = ElementStore::new(MemorySource::default());
        assert!(matches!(
            store.ensure_loaded(Element::Lithium),
            LoadState::LoadFailed(_)
        ));
        assert!(store.data(Element::Lithium).is_none());

        store.source.files.insert(Element::Lithium, ONE_PROTON.to_string());
        assert!(store.ensure_loaded(Element::Lithium).is_loaded());
        assert_eq!(store.source().loads(Element::Lithium), 2);
    }

    #[test]
    fn missing_file_on_disk_leaves_slot_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ElementStore::new(FileSource::new(dir.path()));

        let state = store.ensure_loaded(Element::Carbon);
        assert!(matches!(state, LoadState::LoadFailed(reason) if reason.contains("carbon.aselement")));
        assert!(store.data(Element::Carbon).is_none());
        assert!(matches!(store.state(Element::Hydrogen), LoadState::NotLoaded));
    }

    #[test]
    fn file_source_reads_from_elements_dir() {
        let dir = tempfile::tempdir().unwrap();
        let elements = dir.path().join("elements");
        std::fs::create_dir(&elements).unwrap();
        std::fs::write(elements.join("hydrogen.aselement"), ONE_PROTON).unwrap();

        let mut store = ElementStore::new(FileSource::new(dir.path()));
        store.ensure_loaded(Element::Hydrogen);
        assert_eq!(store.data(Element::Hydrogen).unwrap().particles.len(), 1);
    }
}
