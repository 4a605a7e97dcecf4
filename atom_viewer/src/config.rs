//! Command line configuration

use std::path::PathBuf;

use clap::Parser;

use crate::element::Element;

/// Assets bundled with the crate
pub const BUNDLED_ASSETS: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/res");

#[derive(Debug, Parser)]
#[command(name = "atom_viewer", version, about = "Real-time 3D atom model viewer")]
pub struct Config {
    /// Asset root containing `elements/` and `textures/`
    #[arg(long)]
    pub assets: Option<PathBuf>,

    /// Initially selected element, by index, symbol or name
    #[arg(short, long, default_value = "0", value_parser = parse_element)]
    pub element: Element,

    /// Initial window width in pixels
    #[arg(long, default_value_t = 1280)]
    pub width: u32,

    /// Initial window height in pixels
    #[arg(long, default_value_t = 720)]
    pub height: u32,
}

impl Config {
    pub fn assets_dir(&self) -> PathBuf {
        self.assets
            .clone()
            .unwrap_or_else(|| PathBuf::from(BUNDLED_ASSETS))
    }
}

fn parse_element(value: &str) -> Result<Element, String> {
    Element::parse(value).ok_or_else(|| {
        let known: Vec<&str> = Element::ALL.iter().map(|e| e.symbol()).collect();
        format!(
            "unknown element `{}` (expected 0-{} or one of {})",
            value,
            Element::ALL.len() - 1,
            known.join(", ")
        )
    })
}
