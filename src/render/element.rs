use crate::render::shape::ShapeDescriptor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Entering,
    Updating,
    Exiting,
}

/// Non-geometric attributes of a primitive. These snap rather than animate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementStyle {
    pub color: [u8; 4],
    pub opacity: f32,
}

impl Default for ElementStyle {
    fn default() -> Self {
        Self {
            color: [204, 204, 204, 255],
            opacity: 1.0,
        }
    }
}

/// One keyed visual primitive owned by a panel.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderElement {
    pub key: String,
    /// Shape as last sampled.
    pub current: ShapeDescriptor,
    /// Shape the element is heading towards.
    pub target: ShapeDescriptor,
    pub phase: Phase,
    pub style: ElementStyle,
    /// Whether the primitive exists on the render surface yet.
    pub mounted: bool,
    /// Shape or style changed since the surface last saw it.
    pub dirty: bool,
}

impl RenderElement {
    pub fn entering(key: impl Into<String>, from: ShapeDescriptor, to: ShapeDescriptor, style: ElementStyle) -> Self {
        Self {
            key: key.into(),
            current: from,
            target: to,
            phase: Phase::Entering,
            style,
            mounted: false,
            dirty: true,
        }
    }

    pub fn is_exiting(&self) -> bool {
        self.phase == Phase::Exiting
    }
}
