//! Asset source for native runs
//!
//! Nothing is fetched: every request is answered synchronously from a fixed
//! catalog of image sizes and sound keys. Keys outside the catalog fail.

use std::collections::HashMap;

use crate::engine::{AssetRequest, AssetSource, LoadCallback, Loaded};

#[derive(Debug, Clone, Default)]
pub struct HeadlessAssetSource {
    catalog: HashMap<String, Loaded>,
}

impl HeadlessAssetSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image(mut self, key: &str, width: f64, height: f64) -> Self {
        self.catalog
            .insert(key.to_string(), Loaded::Image { width, height });
        self
    }

    pub fn with_sound(mut self, key: &str) -> Self {
        self.catalog.insert(key.to_string(), Loaded::Sound);
        self
    }

    pub fn len(&self) -> usize {
        self.catalog.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalog.is_empty()
    }
}

impl AssetSource for HeadlessAssetSource {
    fn load(&self, request: &AssetRequest, done: LoadCallback) {
        match self.catalog.get(&request.key) {
            Some(loaded) => done(Ok(*loaded)),
            None => done(Err(format!("{} is not in the headless catalog", request.source))),
        }
    }
}
