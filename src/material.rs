//! Materials and the material cascade
//!
//! CAD databases may declare materials on a shape, on the part that owns the
//! shape, or on any assembly above the part. Scene graphs only carry
//! materials on the state of a geometry, so every geometry gets the most
//! specific non-empty material found along that chain.

use glam::Vec4;

/// One channel of a [`Material`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialChannel {
    /// Ambient color
    Ambient,
    /// Diffuse color
    Diffuse,
    /// Specular color
    Specular,
    /// Emissive color
    Emissive,
    /// Specular exponent
    Shininess,
}

impl MaterialChannel {
    /// All channels, in bit order
    pub const ALL: [MaterialChannel; 5] = [
        MaterialChannel::Ambient,
        MaterialChannel::Diffuse,
        MaterialChannel::Specular,
        MaterialChannel::Emissive,
        MaterialChannel::Shininess,
    ];

    /// The bit this channel occupies in [`Material::valid_mask`]
    pub fn bit(&self) -> u8 {
        match self {
            MaterialChannel::Ambient => 1 << 0,
            MaterialChannel::Diffuse => 1 << 1,
            MaterialChannel::Specular => 1 << 2,
            MaterialChannel::Emissive => 1 << 3,
            MaterialChannel::Shininess => 1 << 4,
        }
    }
}

/// A set of optional lighting channels
///
/// Each channel is valid or not independently. A material with no valid
/// channel is empty and is never applied to a geometry.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Material {
    /// Ambient RGBA color
    pub ambient: Option<Vec4>,
    /// Diffuse RGBA color; its alpha drives transparency
    pub diffuse: Option<Vec4>,
    /// Specular RGBA color
    pub specular: Option<Vec4>,
    /// Emissive RGBA color
    pub emissive: Option<Vec4>,
    /// Shininess on the [0, 128] scale
    pub shininess: Option<f32>,
}

impl Material {
    /// Create an empty material
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the ambient color
    pub fn with_ambient(mut self, color: Vec4) -> Self {
        self.ambient = Some(color);
        self
    }

    /// Set the diffuse color
    pub fn with_diffuse(mut self, color: Vec4) -> Self {
        self.diffuse = Some(color);
        self
    }

    /// Set the specular color
    pub fn with_specular(mut self, color: Vec4) -> Self {
        self.specular = Some(color);
        self
    }

    /// Set the emissive color
    pub fn with_emissive(mut self, color: Vec4) -> Self {
        self.emissive = Some(color);
        self
    }

    /// Set the shininess
    pub fn with_shininess(mut self, shininess: f32) -> Self {
        self.shininess = Some(shininess);
        self
    }

    /// Check whether a channel is valid
    pub fn is_valid(&self, channel: MaterialChannel) -> bool {
        match channel {
            MaterialChannel::Ambient => self.ambient.is_some(),
            MaterialChannel::Diffuse => self.diffuse.is_some(),
            MaterialChannel::Specular => self.specular.is_some(),
            MaterialChannel::Emissive => self.emissive.is_some(),
            MaterialChannel::Shininess => self.shininess.is_some(),
        }
    }

    /// Bitmask of the valid channels (see [`MaterialChannel::bit`])
    pub fn valid_mask(&self) -> u8 {
        MaterialChannel::ALL
            .iter()
            .filter(|c| self.is_valid(**c))
            .fold(0, |mask, c| mask | c.bit())
    }

    /// True when no channel is valid
    pub fn is_empty(&self) -> bool {
        self.valid_mask() == 0
    }

    /// True when the diffuse alpha is below one
    pub fn is_transparent(&self) -> bool {
        self.diffuse.is_some_and(|d| d.w < 1.0)
    }
}

/// Find the effective material of a shape
///
/// Search order, first non-empty material wins:
/// 1. the shape's own material
/// 2. the owning part's material
/// 3. the enclosing assemblies, innermost first
///
/// `assemblies` is ordered outermost first, the way the group stack stores
/// them.
pub fn resolve<'a, I>(shape: Option<&'a Material>, part: &'a Material, assemblies: I) -> Option<&'a Material>
where
    I: IntoIterator<Item = &'a Material>,
    I::IntoIter: DoubleEndedIterator,
{
    shape
        .into_iter()
        .chain(std::iter::once(part))
        .chain(assemblies.into_iter().rev())
        .find(|m| !m.is_empty())
}
