//! Parser for `.aselement` data files
//!
//! The format is line oriented:
//!
//! ```text
//! #texture=<texture_name>
//! #particles
//! x=<f> y=<f> z=<f> scale=<f> type=<PROTON|NEUTRON>
//! #electrons
//! x=<f> y=<f> z=<f> scale=<f> speed=<f> axis_x=<f> axis_y=<f> axis_z=<f>
//! ```
//!
//! Section markers may appear in any order and any number of times. Records
//! are whitespace separated `key=value` tokens in any order. A record that
//! fails validation is skipped and reported as a [`Diagnostic`]; the rest of
//! the file still loads.

use std::fs;
use std::path::{Path, PathBuf};

use glam::Vec3;
use thiserror::Error;

use crate::entity::{Electron, Particle, ParticleKind};
use crate::texture::is_bare_file_name;

const TEXTURE_MARKER: &str = "#texture";
const PARTICLES_MARKER: &str = "#particles";
const ELECTRONS_MARKER: &str = "#electrons";

/// Why a single line was skipped
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    #[error("record appears before any #particles or #electrons section")]
    NoSection,

    #[error("unknown marker `{0}`")]
    UnknownMarker(String),

    #[error("texture marker has no `=<name>` value")]
    MissingTextureName,

    #[error("texture `{0}` must be a file name inside the textures directory")]
    InvalidTextureName(String),

    #[error("malformed token `{0}`, expected key=value")]
    MalformedToken(String),

    #[error("missing required key `{0}`")]
    MissingKey(&'static str),

    #[error("invalid number `{value}` for key `{key}`")]
    InvalidNumber { key: &'static str, value: String },

    #[error("unknown particle type `{0}`")]
    UnknownParticleType(String),

    #[error("scale must be positive, got {0}")]
    NonPositiveScale(f32),

    #[error("rotation axis ({0}, {1}, {2}) cannot be normalized")]
    DegenerateAxis(f32, f32, f32),
}

/// A skipped line, numbered from 1
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub line: usize,
    pub error: RecordError,
}

/// Failure to read an element file at all
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Everything parsed from one element file
#[derive(Debug, Clone, Default)]
pub struct ElementData {
    pub texture: Option<String>,
    pub particles: Vec<Particle>,
    pub electrons: Vec<Electron>,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Particles,
    Electrons,
}

/// Read and parse an element file. Skipped lines are logged against `path`.
pub fn load_element_file(path: &Path) -> Result<ElementData, LoadError> {
    let source = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let data = parse_element(&source);
    for diagnostic in &data.diagnostics {
        log::warn!(
            "{}:{}: skipped line: {}",
            path.display(),
            diagnostic.line,
            diagnostic.error
        );
    }
    Ok(data)
}

/// Parse the contents of an element file
pub fn parse_element(source: &str) -> ElementData {
    let mut data = ElementData::default();
    let mut section = Section::None;

    for (i, raw) in source.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        let result = if line.contains(TEXTURE_MARKER) {
            parse_texture(line).map(|name| data.texture = Some(name))
        } else if line.contains(PARTICLES_MARKER) {
            section = Section::Particles;
            Ok(())
        } else if line.contains(ELECTRONS_MARKER) {
            section = Section::Electrons;
            Ok(())
        } else if line.starts_with('#') {
            Err(RecordError::UnknownMarker(line.to_string()))
        } else {
            match section {
                Section::None => Err(RecordError::NoSection),
                Section::Particles => parse_particle(line).map(|p| data.particles.push(p)),
                Section::Electrons => parse_electron(line).map(|e| data.electrons.push(e)),
            }
        };

        if let Err(error) = result {
            data.diagnostics.push(Diagnostic { line: i + 1, error });
        }
    }

    data
}

fn parse_texture(line: &str) -> Result<String, RecordError> {
    let name = line
        .split_once('=')
        .map(|(_, value)| value.trim())
        .unwrap_or_default();
    if name.is_empty() {
        return Err(RecordError::MissingTextureName);
    }
    if !is_bare_file_name(name) {
        return Err(RecordError::InvalidTextureName(name.to_string()));
    }
    Ok(name.to_string())
}

/// `key=value` tokens of one record line, in line order
struct Fields<'a> {
    tokens: Vec<(&'a str, &'a str)>,
}

impl<'a> Fields<'a> {
    fn parse(line: &'a str) -> Result<Self, RecordError> {
        let tokens = line
            .split_whitespace()
            .map(|token| match token.split_once('=') {
                Some((key, value)) if !key.is_empty() => Ok((key, value)),
                _ => Err(RecordError::MalformedToken(token.to_string())),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { tokens })
    }

    /// First occurrence wins
    fn text(&self, key: &'static str) -> Result<&'a str, RecordError> {
        self.tokens
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| *v)
            .ok_or(RecordError::MissingKey(key))
    }

    fn number(&self, key: &'static str) -> Result<f32, RecordError> {
        let value = self.text(key)?;
        value
            .parse::<f32>()
            .ok()
            .filter(|n| n.is_finite())
            .ok_or_else(|| RecordError::InvalidNumber {
                key,
                value: value.to_string(),
            })
    }

    fn vec3(&self, x: &'static str, y: &'static str, z: &'static str) -> Result<Vec3, RecordError> {
        Ok(Vec3::new(self.number(x)?, self.number(y)?, self.number(z)?))
    }

    fn scale(&self) -> Result<f32, RecordError> {
        let scale = self.number("scale")?;
        if scale <= 0.0 {
            return Err(RecordError::NonPositiveScale(scale));
        }
        Ok(scale)
    }

    fn log_ignored(&self, known: &[&str]) {
        for (key, _) in self.tokens.iter().filter(|(k, _)| !known.contains(k)) {
            log::debug!("ignoring key `{}`", key);
        }
    }
}

const PARTICLE_KEYS: &[&str] = &["x", "y", "z", "scale", "type"];
const ELECTRON_KEYS: &[&str] = &["x", "y", "z", "scale", "speed", "axis_x", "axis_y", "axis_z"];

fn parse_particle(line: &str) -> Result<Particle, RecordError> {
    let fields = Fields::parse(line)?;
    let type_token = fields.text("type")?;
    let kind = ParticleKind::from_token(type_token)
        .ok_or_else(|| RecordError::UnknownParticleType(type_token.to_string()))?;
    let position = fields.vec3("x", "y", "z")?;
    let scale = fields.scale()?;
    fields.log_ignored(PARTICLE_KEYS);

    Ok(Particle::new(kind, position, scale))
}

fn parse_electron(line: &str) -> Result<Electron, RecordError> {
    let fields = Fields::parse(line)?;
    let position = fields.vec3("x", "y", "z")?;
    let scale = fields.scale()?;
    let speed = fields.number("speed")?;
    let axis = fields.vec3("axis_x", "axis_y", "axis_z")?;
    fields.log_ignored(ELECTRON_KEYS);

    Electron::new(position, scale, speed, axis)
        .ok_or(RecordError::DegenerateAxis(axis.x, axis.y, axis.z))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_proton_with_texture() {
        let data = parse_element(
            "#texture=foo.png\n\
             #particles\n\
             type=PROTON x=1 y=0 z=0 scale=0.3\n",
        );
        assert_eq!(data.texture.as_deref(), Some("foo.png"));
        assert_eq!(data.particles.len(), 1);
        assert!(data.electrons.is_empty());
        assert!(data.diagnostics.is_empty());

        let proton = &data.particles[0];
        assert_eq!(proton.kind, ParticleKind::Proton);
        assert_eq!(proton.position, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(proton.scale, 0.3);
    }

    #[test]
    fn keeps_file_order() {
        let data = parse_element(
            "#particles\n\
             x=0 y=0 z=0 scale=0.3 type=NEUTRON\n\
             #electrons\n\
             x=1 y=0 z=0 scale=0.1 speed=100 axis_x=0 axis_y=1 axis_z=1\n\
             x=2 y=0 z=0 scale=0.1 speed=30 axis_x=1 axis_y=0 axis_z=1\n",
        );
        assert_eq!(data.particles.len(), 1);
        assert_eq!(data.electrons.len(), 2);
        assert_eq!(data.electrons[0].origin.x, 1.0);
        assert_eq!(data.electrons[0].speed, 100.0);
        assert_eq!(data.electrons[1].origin.x, 2.0);
        assert_eq!(data.electrons[1].speed, 30.0);
    }

    #[test]
    fn sections_can_repeat_and_interleave() {
        let data = parse_element(
            "#electrons\n\
             x=1 y=0 z=0 scale=0.1 speed=10 axis_x=0 axis_y=1 axis_z=0\n\
             #particles\n\
             x=0 y=0 z=0 scale=0.3 type=PROTON\n\
             #electrons\n\
             x=2 y=0 z=0 scale=0.1 speed=20 axis_x=0 axis_y=1 axis_z=0\n\
             #particles\n\
             x=0.5 y=0 z=0 scale=0.3 type=NEUTRON\n",
        );
        assert_eq!(data.particles.len(), 2);
        assert_eq!(data.particles[1].kind, ParticleKind::Neutron);
        assert_eq!(data.electrons.len(), 2);
        assert_eq!(data.electrons[1].speed, 20.0);
    }

    #[test]
    fn axis_keys_do_not_shadow_position_keys() {
        let data = parse_element(
            "#electrons\n\
             axis_x=0 axis_y=0 axis_z=1 speed=45 scale=0.2 z=3 y=2 x=1\n",
        );
        let electron = &data.electrons[0];
        assert_eq!(electron.origin, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(electron.axis, Vec3::Z);
    }

    #[test]
    fn last_texture_marker_wins() {
        let data = parse_element("#texture=a.png\n#texture = b.png \n");
        assert_eq!(data.texture.as_deref(), Some("b.png"));
    }

    #[test]
    fn texture_without_value_is_reported() {
        let data = parse_element("#texture\n");
        assert_eq!(data.texture, None);
        assert_eq!(data.diagnostics[0].error, RecordError::MissingTextureName);
    }

    #[test]
    fn blank_lines_are_ignored() {
        let data = parse_element("\n   \n#particles\n\nx=0 y=0 z=0 scale=1 type=PROTON\n\n");
        assert_eq!(data.particles.len(), 1);
        assert!(data.diagnostics.is_empty());
    }

    #[test]
    fn missing_key_skips_record() {
        let data = parse_element(
            "#particles\n\
             x=0 y=0 scale=0.3 type=PROTON\n\
             x=0 y=0 z=0 scale=0.3\n\
             x=1 y=1 z=1 scale=0.3 type=NEUTRON\n",
        );
        assert_eq!(data.particles.len(), 1);
        assert_eq!(data.particles[0].kind, ParticleKind::Neutron);
        assert_eq!(
            data.diagnostics,
            vec![
                Diagnostic { line: 2, error: RecordError::MissingKey("z") },
                Diagnostic { line: 3, error: RecordError::MissingKey("type") },
            ]
        );
    }

    #[test]
    fn unknown_particle_type_fails_closed() {
        let data = parse_element("#particles\nx=0 y=0 z=0 scale=0.3 type=QUARK\n");
        assert!(data.particles.is_empty());
        assert_eq!(
            data.diagnostics[0].error,
            RecordError::UnknownParticleType("QUARK".to_string())
        );
    }

    #[test]
    fn bad_numbers_are_rejected() {
        let data = parse_element(
            "#electrons\n\
             x=abc y=0 z=0 scale=0.1 speed=10 axis_x=0 axis_y=1 axis_z=0\n\
             x=1 y=0 z=0 scale=0.1 speed=inf axis_x=0 axis_y=1 axis_z=0\n",
        );
        assert!(data.electrons.is_empty());
        assert_eq!(
            data.diagnostics[0].error,
            RecordError::InvalidNumber { key: "x", value: "abc".to_string() }
        );
        assert_eq!(
            data.diagnostics[1].error,
            RecordError::InvalidNumber { key: "speed", value: "inf".to_string() }
        );
    }

    #[test]
    fn malformed_token_is_rejected() {
        let data = parse_element("#particles\nx=0 y=0 z=0 scale=0.3 PROTON\n");
        assert!(data.particles.is_empty());
        assert_eq!(
            data.diagnostics[0].error,
            RecordError::MalformedToken("PROTON".to_string())
        );
    }

    #[test]
    fn degenerate_values_are_rejected() {
        let data = parse_element(
            "#particles\n\
             x=0 y=0 z=0 scale=0 type=PROTON\n\
             #electrons\n\
             x=1 y=0 z=0 scale=0.1 speed=10 axis_x=0 axis_y=0 axis_z=0\n",
        );
        assert!(data.particles.is_empty());
        assert!(data.electrons.is_empty());
        assert_eq!(data.diagnostics[0].error, RecordError::NonPositiveScale(0.0));
        assert_eq!(data.diagnostics[1].error, RecordError::DegenerateAxis(0.0, 0.0, 0.0));
    }

    #[test]
    fn axis_too_short_to_normalize_is_rejected() {
        let data = parse_element(
            "#electrons\n\
             x=1 y=0 z=0 scale=0.1 speed=10 axis_x=1e-30 axis_y=0 axis_z=1e-30\n\
             x=1 y=0 z=0 scale=0.1 speed=10 axis_x=0 axis_y=2 axis_z=0\n",
        );
        assert_eq!(data.electrons.len(), 1);
        assert_eq!(data.electrons[0].axis, Vec3::Y);
        assert_eq!(data.diagnostics.len(), 1);
        assert_eq!(data.diagnostics[0].line, 2);
        assert!(matches!(data.diagnostics[0].error, RecordError::DegenerateAxis(..)));
    }

    #[test]
    fn records_before_any_section_are_rejected() {
        let data = parse_element("x=0 y=0 z=0 scale=0.3 type=PROTON\n#bogus\n");
        assert_eq!(data.diagnostics[0].error, RecordError::NoSection);
        assert_eq!(
            data.diagnostics[1].error,
            RecordError::UnknownMarker("#bogus".to_string())
        );
    }

    #[test]
    fn texture_paths_are_rejected() {
        let data = parse_element(
            "#texture=/etc/foo.png\n\
             #texture=../secret.png\n\
             #texture=metal.png\n",
        );
        assert_eq!(data.texture.as_deref(), Some("metal.png"));
        assert_eq!(
            data.diagnostics[0].error,
            RecordError::InvalidTextureName("/etc/foo.png".to_string())
        );
        assert_eq!(
            data.diagnostics[1].error,
            RecordError::InvalidTextureName("../secret.png".to_string())
        );
    }

    #[test]
    fn first_duplicate_key_wins() {
        let data = parse_element("#particles\nx=1 x=5 y=0 z=0 scale=0.3 type=PROTON\n");
        assert_eq!(data.particles[0].position.x, 1.0);
    }

    #[test]
    fn keys_for_other_sections_are_ignored() {
        let data = parse_element("#particles\nx=0 y=0 z=0 scale=0.3 type=PROTON speed=10\n");
        assert_eq!(data.particles.len(), 1);
        assert!(data.diagnostics.is_empty());
    }

    #[test]
    fn load_reads_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.aselement");
        fs::write(&path, "#particles\nx=0 y=0 z=0 scale=0.3 type=PROTON\n").unwrap();

        let data = load_element_file(&path).unwrap();
        assert_eq!(data.particles.len(), 1);
    }

    #[test]
    fn load_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.aselement");

        let err = load_element_file(&path).unwrap_err();
        let LoadError::Io { path: reported, .. } = &err;
        assert_eq!(reported, &path);
        assert!(err.to_string().contains("missing.aselement"));
    }
}
