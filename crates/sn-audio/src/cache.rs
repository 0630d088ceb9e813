//! Preloaded-asset cache

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tracing::warn;

use crate::buffer::SoundBuffer;

/// Case-insensitive FNV-1a hash over a path, used to index preloaded
/// assets. Bytes are uppercased before hashing, so keys that differ only
/// in case collide to the same slot.
pub(crate) fn asset_key(path: &Path) -> u32 {
    let text = path.to_string_lossy();
    let mut hash = 0u32;
    for byte in text.bytes() {
        hash = hash.wrapping_mul(16_777_619);
        hash ^= byte.to_ascii_uppercase() as u32;
    }
    hash
}

/// Decoded-asset cache shared between music and effects.
///
/// Entries hold `Arc<SoundBuffer>`; evicting an entry only drops the
/// cache's reference, so channels still playing from the buffer keep it
/// alive until they finish.
pub(crate) struct SoundCache {
    entries: HashMap<u32, Arc<SoundBuffer>>,
}

impl SoundCache {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Fetch the decoded buffer for `path`, decoding and caching it on a
    /// miss. Returns `None` on a missing or undecodable asset; the
    /// failure is logged, never propagated.
    pub fn get_or_load(&mut self, path: &Path) -> Option<Arc<SoundBuffer>> {
        let key = asset_key(path);
        if let Some(buf) = self.entries.get(&key) {
            return Some(Arc::clone(buf));
        }
        match SoundBuffer::from_wav_file(path) {
            Ok(buf) => {
                let buf = Arc::new(buf);
                self.entries.insert(key, Arc::clone(&buf));
                Some(buf)
            }
            Err(err) => {
                warn!("failed to load audio asset {}: {}", path.display(), err);
                None
            }
        }
    }

    /// Decode ahead of first playback. Redundant calls are cheap no-ops.
    pub fn preload(&mut self, path: &Path) {
        let _ = self.get_or_load(path);
    }

    /// Drop the cached buffer for `path`, if any
    pub fn evict(&mut self, path: &Path) {
        self.entries.remove(&asset_key(path));
    }

    pub fn evict_key(&mut self, key: u32) {
        self.entries.remove(&key);
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(&asset_key(path))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
