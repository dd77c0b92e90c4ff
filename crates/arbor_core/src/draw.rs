//! Draw submission
//!
//! Nodes never rasterize. During the draw pass they push [`DrawRequest`]s into
//! a [`DrawSink`] owned by the external renderer; nothing is read back.

use arbor_math::Rectangle;
use serde::{Serialize, Deserialize};

use crate::Transform2D;

/// A sprite attached to a spatial node
///
/// Sprites are submitted automatically with the node's global transform.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sprite {
    /// Texture identifier understood by the renderer
    pub texture: String,
    /// Source region within the texture (None = whole texture)
    #[serde(default)]
    pub region: Option<Rectangle>,
    /// Sort depth (lower draws first)
    #[serde(default)]
    pub depth: f32,
    /// Tint as RGBA (each component 0.0-1.0)
    #[serde(default = "Sprite::default_tint")]
    pub tint: [f32; 4],
    /// Invisible sprites are skipped during submission
    #[serde(default = "Sprite::default_visible")]
    pub visible: bool,
}

impl Sprite {
    /// Opaque white (no tint)
    pub const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

    /// Create a visible, untinted sprite for the whole texture
    pub fn new(texture: impl Into<String>) -> Self {
        Self {
            texture: texture.into(),
            region: None,
            depth: 0.0,
            tint: Self::WHITE,
            visible: true,
        }
    }

    /// Restrict the sprite to a region of its texture
    pub fn with_region(mut self, region: Rectangle) -> Self {
        self.region = Some(region);
        self
    }

    /// Set the sort depth
    pub fn with_depth(mut self, depth: f32) -> Self {
        self.depth = depth;
        self
    }

    /// Set the RGBA tint
    pub fn with_tint(mut self, tint: [f32; 4]) -> Self {
        self.tint = tint;
        self
    }

    fn default_tint() -> [f32; 4] {
        Self::WHITE
    }

    fn default_visible() -> bool {
        true
    }

    /// Build a request for this sprite at the given global transform
    pub fn request(&self, transform: Transform2D) -> DrawRequest {
        DrawRequest {
            texture: self.texture.clone(),
            region: self.region,
            transform,
            depth: self.depth,
            tint: self.tint,
        }
    }
}

/// A single drawing request handed to the renderer
#[derive(Clone, Debug, PartialEq)]
pub struct DrawRequest {
    pub texture: String,
    pub region: Option<Rectangle>,
    /// Global transform of the submitting node
    pub transform: Transform2D,
    pub depth: f32,
    pub tint: [f32; 4],
}

/// Receiver of draw requests (implemented by the external renderer)
pub trait DrawSink {
    fn submit(&mut self, request: DrawRequest);
}

/// Vec-backed draw sink
#[derive(Debug, Default)]
pub struct DrawQueue {
    requests: Vec<DrawRequest>,
}

impl DrawQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn requests(&self) -> &[DrawRequest] {
        &self.requests
    }

    /// Stable sort by depth, preserving submission order within a depth
    pub fn sort_by_depth(&mut self) {
        self.requests.sort_by(|a, b| a.depth.total_cmp(&b.depth));
    }

    /// Take all queued requests, leaving the queue empty
    pub fn drain(&mut self) -> std::vec::Drain<'_, DrawRequest> {
        self.requests.drain(..)
    }
}

impl DrawSink for DrawQueue {
    fn submit(&mut self, request: DrawRequest) {
        self.requests.push(request);
    }
}
