//! The fixed table of selectable elements

use std::path::{Path, PathBuf};

/// Number of selectable elements
pub const ELEMENT_COUNT: usize = 6;

/// Subdirectory of the asset root holding `.aselement` files
pub const ELEMENTS_DIR: &str = "elements";

/// Subdirectory of the asset root holding cube textures
pub const TEXTURES_DIR: &str = "textures";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Element {
    Hydrogen,
    Helium,
    Lithium,
    Beryllium,
    Boron,
    Carbon,
}

impl Element {
    /// Every element in selection order
    pub const ALL: [Element; ELEMENT_COUNT] = [
        Element::Hydrogen,
        Element::Helium,
        Element::Lithium,
        Element::Beryllium,
        Element::Boron,
        Element::Carbon,
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Wraps out-of-range indices
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % ELEMENT_COUNT]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Element::Hydrogen => "Hydrogen",
            Element::Helium => "Helium",
            Element::Lithium => "Lithium",
            Element::Beryllium => "Beryllium",
            Element::Boron => "Boron",
            Element::Carbon => "Carbon",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Element::Hydrogen => "H",
            Element::Helium => "He",
            Element::Lithium => "Li",
            Element::Beryllium => "Be",
            Element::Boron => "B",
            Element::Carbon => "C",
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            Element::Hydrogen => "hydrogen.aselement",
            Element::Helium => "helium.aselement",
            Element::Lithium => "lithium.aselement",
            Element::Beryllium => "beryllium.aselement",
            Element::Boron => "boron.aselement",
            Element::Carbon => "carbon.aselement",
        }
    }

    /// Cube texture used when the data file names none
    pub fn default_texture(&self) -> &'static str {
        match self {
            Element::Hydrogen | Element::Helium => "gas.png",
            Element::Lithium | Element::Beryllium => "metal.png",
            Element::Boron | Element::Carbon => "crystal.png",
        }
    }

    pub fn data_path(&self, assets_dir: &Path) -> PathBuf {
        assets_dir.join(ELEMENTS_DIR).join(self.file_name())
    }

    /// Look up by index, symbol or name (case-insensitive)
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if let Ok(index) = value.parse::<usize>() {
            return Self::ALL.get(index).copied();
        }
        Self::ALL.iter().copied().find(|element| {
            element.symbol().eq_ignore_ascii_case(value) || element.name().eq_ignore_ascii_case(value)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_match_table_order() {
        for (i, element) in Element::ALL.iter().enumerate() {
            assert_eq!(element.index(), i);
            assert_eq!(Element::from_index(i), *element);
        }
    }

    #[test]
    fn from_index_wraps() {
        assert_eq!(Element::from_index(ELEMENT_COUNT), Element::Hydrogen);
    }

    #[test]
    fn parse_accepts_index_symbol_and_name() {
        assert_eq!(Element::parse("2"), Some(Element::Lithium));
        assert_eq!(Element::parse("he"), Some(Element::Helium));
        assert_eq!(Element::parse("Carbon"), Some(Element::Carbon));
        assert_eq!(Element::parse("99"), None);
        assert_eq!(Element::parse("unobtainium"), None);
    }

    #[test]
    fn data_path_is_under_elements_dir() {
        let path = Element::Boron.data_path(Path::new("res"));
        assert_eq!(path, Path::new("res").join("elements").join("boron.aselement"));
    }
}
