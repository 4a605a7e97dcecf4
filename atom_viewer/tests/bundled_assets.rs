use std::path::PathBuf;

use image::GenericImageView;

use atom_viewer::config::BUNDLED_ASSETS;
use atom_viewer::element::TEXTURES_DIR;
use atom_viewer::{
    load_element_file, AtomScene, Element, FileSource, LoadState, SelectionIntent, ELEMENT_COUNT,
    MAX_ELECTRON_LIGHTS,
};

fn assets() -> PathBuf {
    PathBuf::from(BUNDLED_ASSETS)
}

#[test]
fn every_element_file_parses_cleanly() {
    for element in Element::ALL {
        let path = element.data_path(&assets());
        let data = load_element_file(&path)
            .unwrap_or_else(|e| panic!("{} failed to load: {}", element.name(), e));

        assert!(data.diagnostics.is_empty(), "{}: {:?}", element.name(), data.diagnostics);
        assert!(!data.particles.is_empty(), "{} has no nucleus", element.name());
        assert!(!data.electrons.is_empty(), "{} has no electrons", element.name());
        assert!(data.electrons.len() <= MAX_ELECTRON_LIGHTS);
    }
}

#[test]
fn electron_count_matches_atomic_number() {
    for element in Element::ALL {
        let data = load_element_file(&element.data_path(&assets())).unwrap();
        assert_eq!(data.electrons.len(), element.index() + 1, "{}", element.name());
    }
}

#[test]
fn every_texture_decodes() {
    let mut names: Vec<String> = Vec::new();
    for element in Element::ALL {
        names.push(element.default_texture().to_string());
        let data = load_element_file(&element.data_path(&assets())).unwrap();
        names.extend(data.texture);
    }

    for name in names {
        let path = assets().join(TEXTURES_DIR).join(&name);
        let image = image::open(&path).unwrap_or_else(|e| panic!("{}: {}", path.display(), e));
        let (width, height) = image.dimensions();
        assert!(width > 0 && height > 0);
    }
}

#[test]
fn cycling_through_all_elements_loads_each_once() {
    let mut scene = AtomScene::new(FileSource::new(assets()), Element::Hydrogen);

    for _ in 0..ELEMENT_COUNT * 2 {
        scene.handle_intent(SelectionIntent::Next);
        scene.update(0.016);
        scene.end_frame();
        assert!(scene.current_state().is_loaded());
    }

    assert_eq!(scene.current_element(), Element::Hydrogen);
    for element in Element::ALL {
        assert!(matches!(scene.store().state(element), LoadState::Loaded(_)));
    }
}
