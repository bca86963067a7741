use crate::render::element::ElementStyle;
use crate::render::shape::ShapeDescriptor;

/// The drawing capabilities a panel needs: keyed primitives whose shape and
/// style can be set and which can be removed again.
pub trait RenderSurface {
    fn create(&mut self, key: &str, style: ElementStyle);
    fn remove(&mut self, key: &str);
    fn set_shape(&mut self, key: &str, shape: &ShapeDescriptor);
    fn set_style(&mut self, key: &str, style: ElementStyle);
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScenePrimitive {
    pub key: String,
    pub shape: Option<ShapeDescriptor>,
    pub style: ElementStyle,
}

/// Retained list of primitives in creation order, read back by the painter.
#[derive(Debug, Clone, Default)]
pub struct RetainedScene {
    primitives: Vec<ScenePrimitive>,
}

impl RetainedScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn primitives(&self) -> &[ScenePrimitive] {
        &self.primitives
    }

    pub fn get(&self, key: &str) -> Option<&ScenePrimitive> {
        self.primitives.iter().find(|p| p.key == key)
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    fn get_mut(&mut self, key: &str) -> Option<&mut ScenePrimitive> {
        self.primitives.iter_mut().find(|p| p.key == key)
    }
}

impl RenderSurface for RetainedScene {
    fn create(&mut self, key: &str, style: ElementStyle) {
        if self.get(key).is_none() {
            self.primitives.push(ScenePrimitive {
                key: key.to_string(),
                shape: None,
                style,
            });
        }
    }

    fn remove(&mut self, key: &str) {
        self.primitives.retain(|p| p.key != key);
    }

    fn set_shape(&mut self, key: &str, shape: &ShapeDescriptor) {
        match self.get_mut(key) {
            Some(p) => p.shape = Some(shape.clone()),
            None => tracing::warn!("set_shape on unknown primitive `{key}`"),
        }
    }

    fn set_style(&mut self, key: &str, style: ElementStyle) {
        if let Some(p) = self.get_mut(key) {
            p.style = style;
        }
    }
}
