//! Externally supplied inputs: block list and container metrics

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// One block as configured by the hosting page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockConfig {
    /// Label rendered inside the block
    pub text: String,
    /// Width as a fraction of the container width
    #[serde(rename = "width")]
    pub relative_width: f32,
    /// Label shown on the hover panel (empty for none)
    #[serde(rename = "linkText", default)]
    pub link_label: String,
    /// Absolute URL or site-internal path (empty for none)
    #[serde(rename = "link", default)]
    pub link_target: String,
}

impl BlockConfig {
    pub fn new(text: &str, relative_width: f32) -> Self {
        Self {
            text: text.to_string(),
            relative_width,
            link_label: String::new(),
            link_target: String::new(),
        }
    }

    pub fn with_link(mut self, label: &str, target: &str) -> Self {
        self.link_label = label.to_string();
        self.link_target = target.to_string();
        self
    }

    /// A panel needs both a label and somewhere to go
    pub fn has_link(&self) -> bool {
        !self.link_label.is_empty() && !self.link_target.is_empty()
    }

    /// Parse an ordered block list from JSON
    pub fn list_from_json(json: &str) -> serde_json::Result<Vec<BlockConfig>> {
        serde_json::from_str(json)
    }
}

/// Whether a link target should open in a new browsing context
pub fn is_external_link(target: &str) -> bool {
    // RFC 3986 scheme: ALPHA *( ALPHA / DIGIT / "+" / "-" / "." ) ":"
    let Some((scheme, _)) = target.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// The portfolio block set the site ships with
pub fn default_blocks() -> Vec<BlockConfig> {
    vec![
        BlockConfig::new("DEVELOPER", 0.8).with_link("PROJECTS", "/projects"),
        BlockConfig::new("STACK", 0.5).with_link("LINKEDIN", "https://www.linkedin.com/"),
        BlockConfig::new("FULL", 0.4).with_link("EMAIL", "/email"),
        BlockConfig::new("FORSTER", 0.7).with_link("RESUME", "/resume"),
        BlockConfig::new("ALISON", 0.6).with_link("ABOUT", "/about"),
    ]
}

/// Container metrics, all derived from one scale factor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContainerDimensions {
    pub width: f32,
    pub height: f32,
    pub block_height: f32,
    pub font_size: f32,
    pub padding: f32,
    pub margin: f32,
}

impl Default for ContainerDimensions {
    fn default() -> Self {
        Self::from_container(BASELINE_WIDTH, 600.0)
    }
}

impl ContainerDimensions {
    /// Scale the baseline metrics to a container of the given size
    pub fn from_container(width: f32, height: f32) -> Self {
        let scale = width / BASELINE_WIDTH;
        Self {
            width,
            height,
            block_height: BASE_BLOCK_HEIGHT * scale,
            font_size: BASE_FONT_SIZE * scale,
            padding: BASE_PADDING * scale,
            margin: BASE_MARGIN * scale,
        }
    }

    /// Fit the container inside a viewport, keeping it narrower than tall
    pub fn from_viewport(viewport_width: f32, viewport_height: f32) -> Self {
        let height = viewport_height * VIEWPORT_HEIGHT_FRACTION;
        let width = (viewport_width * VIEWPORT_WIDTH_FRACTION).min(height);
        Self::from_container(width, height)
    }

    #[inline]
    pub fn scale(&self) -> f32 {
        self.width / BASELINE_WIDTH
    }

    /// Outer height of every block (text line plus padding on both sides)
    #[inline]
    pub fn block_outer_height(&self) -> f32 {
        self.block_height + self.padding * 2.0
    }

    /// Width of the widest configured block, in pixels
    pub fn widest_block(&self, blocks: &[BlockConfig]) -> f32 {
        blocks
            .iter()
            .map(|b| b.relative_width)
            .fold(0.0, f32::max)
            * self.width
    }
}
