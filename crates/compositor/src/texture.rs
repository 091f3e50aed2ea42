//! URL-keyed texture cache with asynchronous, host-driven loading.
//!
//! The compositor asks the cache for a texture; a miss records a pending
//! entry and hands a [`TextureRequest`] to the [`TextureLoader`]. The host
//! later reports completion with the request's generation. Completions from
//! an older generation, or for URLs no longer cached, are discarded.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use studio_types::{
    SamplerConfig, SubscriptionId, Subscribers, TextureBinding, TextureId, TextureTransform,
};

/// How a texture is going to be used; decides its sampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TextureRole {
    /// Clamped, never tiles.
    Logo,
    /// Repeating artwork or PBR map.
    Pattern,
    /// Clamped live preview at identity transform.
    Preview,
}

impl TextureRole {
    pub fn sampler(&self, anisotropy: u8) -> SamplerConfig {
        match self {
            TextureRole::Logo | TextureRole::Preview => SamplerConfig::clamped(anisotropy),
            TextureRole::Pattern => SamplerConfig::repeating(anisotropy),
        }
    }
}

/// A loaded texture as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextureInfo {
    pub id: TextureId,
    pub width: u32,
    pub height: u32,
}

impl TextureInfo {
    /// Width over height; 1.0 for degenerate images.
    pub fn aspect(&self) -> f64 {
        if self.width == 0 || self.height == 0 {
            1.0
        } else {
            f64::from(self.width) / f64::from(self.height)
        }
    }

    /// A fresh binding of this texture; each call is an independent copy.
    pub fn bind(
        &self,
        url: &str,
        role: TextureRole,
        anisotropy: u8,
        transform: TextureTransform,
    ) -> TextureBinding {
        TextureBinding {
            texture: self.id,
            url: url.to_string(),
            size: [self.width, self.height],
            sampler: role.sampler(anisotropy),
            transform,
        }
    }
}

/// State of one cached URL.
#[derive(Debug, Clone, PartialEq)]
pub enum TextureStatus {
    Pending { generation: u64 },
    Ready(TextureInfo),
    Failed { reason: String },
}

/// A load the host should perform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextureRequest {
    pub url: String,
    pub generation: u64,
}

/// Cache change notification.
#[derive(Debug, Clone, PartialEq)]
pub enum TextureEvent {
    Loaded { url: String },
    Failed { url: String },
    Cleared,
}

/// Errors from the texture cache.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TextureError {
    #[error("texture failed to load: {url}: {reason}")]
    Failed { url: String, reason: String },

    #[error("stale texture result for {url}: generation {generation}, current {current}")]
    Stale {
        url: String,
        generation: u64,
        current: u64,
    },

    #[error("texture was not requested: {url}")]
    NotRequested { url: String },
}

/// Starts asynchronous texture loads.
pub trait TextureLoader {
    fn start(&mut self, request: TextureRequest);
}

/// Loader that only queues requests; the owner drains and forwards them.
#[derive(Debug, Default)]
pub struct QueuedLoader {
    queue: Vec<TextureRequest>,
}

impl QueuedLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&mut self) -> Vec<TextureRequest> {
        std::mem::take(&mut self.queue)
    }

    pub fn pending(&self) -> &[TextureRequest] {
        &self.queue
    }
}

impl TextureLoader for QueuedLoader {
    fn start(&mut self, request: TextureRequest) {
        self.queue.push(request);
    }
}

/// Session texture cache, deduplicated by URL.
#[derive(Debug, Default)]
pub struct TextureCache {
    entries: HashMap<String, TextureStatus>,
    generation: u64,
    subscribers: Subscribers<TextureEvent>,
}

impl TextureCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn status(&self, url: &str) -> Option<&TextureStatus> {
        self.entries.get(url)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&TextureEvent) + 'static) -> SubscriptionId {
        self.subscribers.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    /// Return the texture if loaded, starting a load on first sight.
    ///
    /// `Ok(None)` means still loading, which is not an error.
    pub fn ensure(
        &mut self,
        url: &str,
        loader: &mut dyn TextureLoader,
    ) -> Result<Option<TextureInfo>, TextureError> {
        match self.entries.get(url) {
            Some(TextureStatus::Ready(info)) => Ok(Some(*info)),
            Some(TextureStatus::Pending { .. }) => Ok(None),
            Some(TextureStatus::Failed { reason }) => Err(TextureError::Failed {
                url: url.to_string(),
                reason: reason.clone(),
            }),
            None => {
                debug!(url, generation = self.generation, "requesting texture");
                self.entries.insert(
                    url.to_string(),
                    TextureStatus::Pending {
                        generation: self.generation,
                    },
                );
                loader.start(TextureRequest {
                    url: url.to_string(),
                    generation: self.generation,
                });
                Ok(None)
            }
        }
    }

    /// Record a finished load.
    pub fn complete(
        &mut self,
        url: &str,
        generation: u64,
        info: TextureInfo,
    ) -> Result<(), TextureError> {
        self.accept(url, generation)?;
        debug!(url, texture = info.id, "texture ready");
        self.entries
            .insert(url.to_string(), TextureStatus::Ready(info));
        self.subscribers.notify(&TextureEvent::Loaded {
            url: url.to_string(),
        });
        Ok(())
    }

    /// Record a failed load. The URL stays failed until [`Self::retry`].
    pub fn fail(&mut self, url: &str, generation: u64, reason: &str) -> Result<(), TextureError> {
        self.accept(url, generation)?;
        warn!(url, reason, "texture failed to load");
        self.entries.insert(
            url.to_string(),
            TextureStatus::Failed {
                reason: reason.to_string(),
            },
        );
        self.subscribers.notify(&TextureEvent::Failed {
            url: url.to_string(),
        });
        Ok(())
    }

    /// Re-arm a failed URL and request it again. Returns false if the URL
    /// was not in the failed state.
    pub fn retry(&mut self, url: &str, loader: &mut dyn TextureLoader) -> bool {
        if !matches!(self.entries.get(url), Some(TextureStatus::Failed { .. })) {
            return false;
        }
        self.entries.remove(url);
        // A fresh entry is always pending, never an error.
        let _ = self.ensure(url, loader);
        true
    }

    /// Drop everything and start a new generation.
    ///
    /// Returns the ids of loaded textures the host may now dispose.
    pub fn clear(&mut self) -> Vec<TextureId> {
        let freed = self.ready_ids(|_| true);
        self.entries.clear();
        self.generation += 1;
        debug!(generation = self.generation, "texture cache cleared");
        self.subscribers.notify(&TextureEvent::Cleared);
        freed
    }

    /// Drop entries whose URL is not in `keep`.
    ///
    /// Returns the ids of loaded textures the host may now dispose.
    pub fn retain_urls(&mut self, keep: &HashSet<String>) -> Vec<TextureId> {
        let freed = self.ready_ids(|url| !keep.contains(url));
        let before = self.entries.len();
        self.entries.retain(|url, _| keep.contains(url));
        if self.entries.len() != before {
            debug!(dropped = before - self.entries.len(), "released unused textures");
        }
        freed
    }

    fn ready_ids(&self, mut include: impl FnMut(&str) -> bool) -> Vec<TextureId> {
        let mut ids: Vec<TextureId> = self
            .entries
            .iter()
            .filter(|(url, _)| include(url))
            .filter_map(|(_, status)| match status {
                TextureStatus::Ready(info) => Some(info.id),
                _ => None,
            })
            .collect();
        ids.sort_unstable();
        ids
    }

    fn accept(&self, url: &str, generation: u64) -> Result<(), TextureError> {
        if generation != self.generation {
            debug!(url, generation, current = self.generation, "discarding stale texture");
            return Err(TextureError::Stale {
                url: url.to_string(),
                generation,
                current: self.generation,
            });
        }
        match self.entries.get(url) {
            Some(TextureStatus::Pending { .. }) => Ok(()),
            _ => Err(TextureError::NotRequested {
                url: url.to_string(),
            }),
        }
    }
}
