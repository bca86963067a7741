use std::collections::BTreeMap;

use egui::{Color32, Visuals};
use serde::{Deserialize, Serialize};

/// Dark2 ordinal scheme, assigned to entities by dataset position.
pub const ENTITY_PALETTE: [[u8; 4]; 8] = [
    [27, 158, 119, 255],  // Teal
    [217, 95, 2, 255],    // Orange
    [117, 112, 179, 255], // Purple
    [231, 41, 138, 255],  // Pink
    [102, 166, 30, 255],  // Green
    [230, 171, 2, 255],   // Mustard
    [166, 118, 29, 255],  // Brown
    [102, 102, 102, 255], // Grey
];

pub fn color_for_index(index: usize) -> [u8; 4] {
    ENTITY_PALETTE[index % ENTITY_PALETTE.len()]
}

/// Stable entity colours shared by every panel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityPalette {
    colors: BTreeMap<String, [u8; 4]>,
}

impl EntityPalette {
    pub fn new<'a>(entities: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            colors: entities
                .into_iter()
                .enumerate()
                .map(|(i, e)| (e.to_string(), color_for_index(i)))
                .collect(),
        }
    }

    pub fn color(&self, entity: &str) -> [u8; 4] {
        self.colors.get(entity).copied().unwrap_or([128, 128, 128, 255])
    }
}

pub fn color32(rgba: [u8; 4], opacity: f32) -> Color32 {
    let alpha = (rgba[3] as f32 * opacity.clamp(0.0, 1.0)).round() as u8;
    Color32::from_rgba_unmultiplied(rgba[0], rgba[1], rgba[2], alpha)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Theme {
    Dark,
    Light,
}

impl Theme {
    pub fn toggle(&self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn visuals(&self) -> Visuals {
        match self {
            Theme::Dark => Visuals::dark(),
            Theme::Light => Visuals::light(),
        }
    }

    pub fn panel_bg(&self) -> Color32 {
        match self {
            Theme::Dark => Color32::from_rgb(20, 20, 20),
            Theme::Light => Color32::from_rgb(255, 255, 255),
        }
    }

    pub fn axis_color(&self) -> Color32 {
        match self {
            Theme::Dark => Color32::from_gray(150),
            Theme::Light => Color32::from_gray(90),
        }
    }

    /// Fill of the timeline overview area.
    pub fn overview_fill(&self) -> Color32 {
        match self {
            Theme::Dark => Color32::from_gray(80),
            Theme::Light => Color32::from_gray(204),
        }
    }

    pub fn brush_fill(&self) -> Color32 {
        match self {
            Theme::Dark => Color32::from_rgba_unmultiplied(120, 160, 255, 50),
            Theme::Light => Color32::from_rgba_unmultiplied(70, 110, 200, 50),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Theme::Light
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_follows_dataset_order() {
        let palette = EntityPalette::new(["alpha", "beta"]);
        assert_eq!(palette.color("alpha"), ENTITY_PALETTE[0]);
        assert_eq!(palette.color("beta"), ENTITY_PALETTE[1]);
        assert_eq!(palette.color("zeta"), [128, 128, 128, 255]);
        assert_eq!(color_for_index(9), ENTITY_PALETTE[1]);
    }
}
