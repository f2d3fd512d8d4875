//! Host linkage: how the emitter sits in the scene and what particles move with

use crate::toml_util::{sub_tables, toml_color, toml_f32, toml_str, toml_vec2, toml_vec2_or};
use ember_core::{Color, EmberError, Result, Transform2D, Vec2};

/// Which node particles move with once spawned
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ParticlesLinkage {
    /// Scene root: particles stay put when the emitter moves
    Root,
    /// The emitter's parent
    #[default]
    Parent,
    /// A named ancestor
    Other(String),
}

impl ParticlesLinkage {
    pub const NAMES: [&'static str; 3] = ["root", "parent", "other"];

    /// `other` requires the name of the ancestor to link to
    pub fn parse(name: &str, widget: Option<&str>) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "root" => Ok(Self::Root),
            "parent" => Ok(Self::Parent),
            "other" => widget
                .map(|w| Self::Other(w.to_string()))
                .ok_or_else(|| EmberError::MissingRequiredField("linkage_widget".to_string())),
            _ => Err(EmberError::invalid_enum("linkage", name, &Self::NAMES)),
        }
    }
}

/// Transforms and tints supplied by the scene hosting an emitter.
///
/// "Link space" is the space of the linkage target; particles are spawned
/// into it and move in it. Every query names the linkage it resolves.
pub trait HostTransform {
    /// Emitter-local space to link space
    fn emitter_transform(&self, linkage: &ParticlesLinkage) -> Transform2D;
    /// Tint accumulated from the emitter down to the link target
    fn emitter_color(&self, linkage: &ParticlesLinkage) -> Color;
    /// Link space to world space
    fn link_transform(&self, linkage: &ParticlesLinkage) -> Transform2D;
    /// Global tint of the link target
    fn link_color(&self, linkage: &ParticlesLinkage) -> Color;
}

/// One scene node above the emitter
#[derive(Debug, Clone, PartialEq)]
pub struct HostNode {
    pub name: String,
    /// Local to parent
    pub transform: Transform2D,
    pub color: Color,
}

impl HostNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Transform2D::IDENTITY,
            color: Color::WHITE,
        }
    }

    pub fn with_transform(mut self, transform: Transform2D) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    fn from_toml(table: &toml::value::Table, default_name: &str) -> Result<Self> {
        let name = match table.get("name") {
            Some(v) => toml_str("host.ancestor.name", v)?.to_string(),
            None => default_name.to_string(),
        };
        Ok(Self {
            name,
            transform: transform_from_toml(table),
            color: table
                .get("color")
                .map_or(Color::WHITE, |v| toml_color(v, Color::WHITE)),
        })
    }
}

/// A fixed chain of nodes: the emitter's own placement plus its ancestors,
/// nearest first, ending at the scene root.
///
/// The link target is resolved per linkage: `Parent` is the first ancestor,
/// `Root` the last, `Other(name)` the nearest ancestor called `name`. With no
/// target the emitter transform is its local placement and link space is
/// world space.
#[derive(Debug, Clone, PartialEq)]
pub struct StaticHost {
    /// Emitter local to parent
    pub transform: Transform2D,
    pub color: Color,
    pub ancestors: Vec<HostNode>,
}

impl Default for StaticHost {
    fn default() -> Self {
        Self {
            transform: Transform2D::IDENTITY,
            color: Color::WHITE,
            ancestors: Vec::new(),
        }
    }
}

impl StaticHost {
    /// Emitter placed at `position` with no ancestors
    pub fn at(position: Vec2) -> Self {
        Self {
            transform: Transform2D::from_translation(position),
            ..Self::default()
        }
    }

    pub fn with_ancestor(mut self, node: HostNode) -> Self {
        self.ancestors.push(node);
        self
    }

    /// Index of the link target in `ancestors`
    fn target(&self, linkage: &ParticlesLinkage) -> Option<usize> {
        match linkage {
            ParticlesLinkage::Parent => (!self.ancestors.is_empty()).then_some(0),
            ParticlesLinkage::Root => self.ancestors.len().checked_sub(1),
            ParticlesLinkage::Other(name) => self.ancestors.iter().position(|n| n.name == *name),
        }
    }

    /// Parse an `[emitter.host]` table.
    ///
    /// `[[emitter.host.ancestor]]` lists the chain nearest first. Without it,
    /// `world_position` and `world_color` describe a single parent.
    pub fn from_toml(table: &toml::value::Table) -> Result<Self> {
        let mut host = Self {
            transform: transform_from_toml(table),
            color: table
                .get("color")
                .map_or(Color::WHITE, |v| toml_color(v, Color::WHITE)),
            ancestors: Vec::new(),
        };
        let ancestors = sub_tables(table, "ancestor")?;
        if ancestors.is_empty() {
            let position = table.get("world_position").and_then(toml_vec2);
            let color = table
                .get("world_color")
                .map(|v| toml_color(v, Color::WHITE));
            if position.is_some() || color.is_some() {
                host.ancestors.push(HostNode {
                    name: "parent".to_string(),
                    transform: Transform2D::from_translation(position.unwrap_or(Vec2::ZERO)),
                    color: color.unwrap_or(Color::WHITE),
                });
            }
        }
        for (depth, node) in ancestors.into_iter().enumerate() {
            host.ancestors
                .push(HostNode::from_toml(node, &format!("ancestor{depth}"))?);
        }
        Ok(host)
    }
}

impl HostTransform for StaticHost {
    fn emitter_transform(&self, linkage: &ParticlesLinkage) -> Transform2D {
        let below = self.target(linkage).unwrap_or(0);
        self.ancestors[..below]
            .iter()
            .fold(self.transform, |acc, node| acc.then(&node.transform))
    }

    fn emitter_color(&self, linkage: &ParticlesLinkage) -> Color {
        let below = self.target(linkage).unwrap_or(0);
        self.ancestors[..below]
            .iter()
            .fold(self.color, |acc, node| acc * node.color)
    }

    fn link_transform(&self, linkage: &ParticlesLinkage) -> Transform2D {
        match self.target(linkage) {
            Some(i) => self.ancestors[i..]
                .iter()
                .fold(Transform2D::IDENTITY, |acc, node| acc.then(&node.transform)),
            None => Transform2D::IDENTITY,
        }
    }

    fn link_color(&self, linkage: &ParticlesLinkage) -> Color {
        match self.target(linkage) {
            Some(i) => self.ancestors[i..]
                .iter()
                .fold(Color::WHITE, |acc, node| acc * node.color),
            None => Color::WHITE,
        }
    }
}

/// `position`, `rotation` (degrees) and `scale` of a node
fn transform_from_toml(table: &toml::value::Table) -> Transform2D {
    let position = table
        .get("position")
        .map_or(Vec2::ZERO, |v| toml_vec2_or(v, Vec2::ZERO));
    let rotation = table.get("rotation").map_or(0.0, |v| toml_f32(v, 0.0));
    let scale = table
        .get("scale")
        .map_or(Vec2::ONE, |v| toml_vec2_or(v, Vec2::ONE));
    Transform2D::from_scale_rotation_translation(scale, rotation, position)
}
