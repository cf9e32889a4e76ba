//! Texture handles and per-texel opacity masks for pixel-mask collision.
//!
//! Decoding images is the host's job. The host hands the simulation an
//! [`AlphaMask`] per texture; a collidable whose texture has no registered
//! mask is treated as non-blocking in pixel-mask tests.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::error::{Error, Result};

/// Opaque texture handle, carried through to the renderer untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextureId(pub String);

impl TextureId {
    /// Creates a handle from a texture name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

/// Row-major alpha channel of a texture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlphaMask {
    width: usize,
    height: usize,
    alpha: Vec<u8>,
}

impl AlphaMask {
    /// Wraps raw alpha values; `alpha.len()` must equal `width * height`.
    pub fn new(width: usize, height: usize, alpha: Vec<u8>) -> Result<Self> {
        if alpha.len() != width * height {
            return Err(Error::invalid(format!(
                "alpha mask {}x{} needs {} texels, got {}",
                width,
                height,
                width * height,
                alpha.len()
            )));
        }
        Ok(Self {
            width,
            height,
            alpha,
        })
    }

    /// Builds a mask by evaluating `f(x, y)` for every texel.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> u8) -> Self {
        let mut alpha = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                alpha.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            alpha,
        }
    }

    /// A fully opaque mask.
    pub fn opaque(width: usize, height: usize) -> Self {
        Self::from_fn(width, height, |_, _| u8::MAX)
    }

    /// Texture width in texels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Texture height in texels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Whether the texel has non-zero opacity. Out-of-range texels are transparent.
    pub fn is_opaque(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.alpha[y * self.width + x] != 0
    }
}

/// Alpha masks keyed by texture handle.
#[derive(Debug, Clone, Default)]
pub struct MaskStore {
    masks: HashMap<TextureId, AlphaMask>,
}

impl MaskStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers or replaces the mask for `texture`.
    pub fn insert(&mut self, texture: TextureId, mask: AlphaMask) {
        self.masks.insert(texture, mask);
    }

    /// Looks up the mask for `texture`.
    pub fn get(&self, texture: &TextureId) -> Option<&AlphaMask> {
        self.masks.get(texture)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_wrong_texel_count() {
        assert!(AlphaMask::new(2, 2, vec![0; 3]).is_err());
        assert!(AlphaMask::new(2, 2, vec![0; 4]).is_ok());
    }

    #[test]
    fn out_of_range_is_transparent() {
        let mask = AlphaMask::opaque(4, 4);
        assert!(mask.is_opaque(3, 3));
        assert!(!mask.is_opaque(4, 0));
        assert!(!mask.is_opaque(0, 4));
    }
}
