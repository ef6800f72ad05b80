use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DecodeError, EncodeError};
use crate::key::{Key, Keyed};

/// A remotely loadable image. Resolving the url to pixels is the renderer's
/// job; the protocol only moves the descriptor around.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Texture {
    key: Key,
    url: String,
}

impl Texture {
    pub const DIRT_KEY: &'static str = "minecraft:dirt";
    pub const DIRT_URL: &'static str = "textures/gui/options_background.png";

    pub fn new(key: Key, url: impl Into<String>) -> Self {
        Self {
            key,
            url: url.into(),
        }
    }

    /// Built-in tiled background texture.
    pub fn dirt() -> Self {
        Self::new(Key::from_static(Self::DIRT_KEY), Self::DIRT_URL)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn to_structured(&self) -> Result<Value, EncodeError> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn from_structured(doc: &Value) -> Result<Self, DecodeError> {
        let object = doc
            .as_object()
            .ok_or_else(|| DecodeError::Malformed("texture is not an object".to_string()))?;
        for field in ["key", "url"] {
            if !object.contains_key(field) {
                return Err(DecodeError::MissingField(field.to_string()));
            }
        }
        serde_json::from_value(doc.clone()).map_err(DecodeError::malformed)
    }
}

impl Keyed for Texture {
    fn key(&self) -> &Key {
        &self.key
    }
}

/// Registry of textures known to one side of the connection.
///
/// Filled at startup on the authoritative side and pushed to every compatible
/// client after the handshake.
#[derive(Debug, Default, Clone)]
pub struct TextureManager {
    textures: HashMap<Key, Texture>,
}

impl TextureManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, texture: Texture) -> Option<Texture> {
        self.textures.insert(texture.key().clone(), texture)
    }

    pub fn get(&self, key: &str) -> Option<&Texture> {
        self.textures.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Texture> {
        self.textures.remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Texture> {
        self.textures.values()
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    /// Snapshot sorted by key so the pushed list is stable between runs.
    pub fn to_vec(&self) -> Vec<Texture> {
        let mut textures: Vec<Texture> = self.textures.values().cloned().collect();
        textures.sort_by(|a, b| a.key().cmp(b.key()));
        textures
    }
}
