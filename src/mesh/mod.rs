//! GPU-facing buffer helpers and the primitive-mesh service boundary
//!
//! The tessellated primitives themselves come from an external mesh
//! service; the cache hands out one shared buffer per distinct key, so
//! every instanced draw of the same primitive reuses identical
//! geometry.

use std::collections::HashMap;
use std::sync::Arc;

use bytemuck::Pod;

/// Primitive kinds the renderer can request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Cube,
    Sphere,
    Cone,
    Cylinder,
}

/// Cache key: kind plus tessellation parameters, clamped to the
/// minimums each shape can tessellate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PrimitiveKey {
    pub kind: PrimitiveKind,
    pub param1: u32,
    pub param2: u32,
}

impl PrimitiveKey {
    pub fn new(kind: PrimitiveKind, param1: u32, param2: u32) -> Self {
        let (min1, min2) = match kind {
            PrimitiveKind::Cube => (1, 1),
            PrimitiveKind::Sphere => (2, 3),
            PrimitiveKind::Cone | PrimitiveKind::Cylinder => (1, 3),
        };
        Self {
            kind,
            param1: param1.max(min1),
            param2: param2.max(min2),
        }
    }
}

/// Produces interleaved position+normal vertex buffers for primitives.
///
/// Implementations must be pure in the key: identical keys must yield
/// geometrically identical buffers, or shared-geometry instancing
/// breaks.
pub trait PrimitiveMeshSource {
    fn build(&self, key: PrimitiveKey) -> Vec<f32>;
}

/// Memoizes primitive buffers by key.
pub struct MeshCache<S: PrimitiveMeshSource> {
    source: S,
    cache: HashMap<PrimitiveKey, Arc<[f32]>>,
}

impl<S: PrimitiveMeshSource> MeshCache<S> {
    pub fn new(source: S) -> Self {
        Self { source, cache: HashMap::new() }
    }

    /// Buffer for a key, built on first use.
    pub fn get(&mut self, key: PrimitiveKey) -> Arc<[f32]> {
        self.cache
            .entry(key)
            .or_insert_with(|| self.source.build(key).into())
            .clone()
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

/// Raw byte view of a vertex or instance slice for buffer upload.
pub fn as_upload_bytes<T: Pod>(items: &[T]) -> &[u8] {
    bytemuck::cast_slice(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct CountingSource {
        builds: Cell<u32>,
    }

    impl PrimitiveMeshSource for CountingSource {
        fn build(&self, key: PrimitiveKey) -> Vec<f32> {
            self.builds.set(self.builds.get() + 1);
            vec![key.param1 as f32, key.param2 as f32]
        }
    }

    #[test]
    fn test_cache_builds_once_per_key() {
        let mut cache = MeshCache::new(CountingSource { builds: Cell::new(0) });

        let key = PrimitiveKey::new(PrimitiveKind::Cylinder, 4, 12);
        let a = cache.get(key);
        let b = cache.get(key);

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.source.builds.get(), 1);
        assert_eq!(cache.len(), 1);

        cache.get(PrimitiveKey::new(PrimitiveKind::Sphere, 8, 8));
        assert_eq!(cache.source.builds.get(), 2);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_key_clamps_tessellation_minimums() {
        let k = PrimitiveKey::new(PrimitiveKind::Cylinder, 0, 0);
        assert_eq!((k.param1, k.param2), (1, 3));

        let k = PrimitiveKey::new(PrimitiveKind::Sphere, 0, 1);
        assert_eq!((k.param1, k.param2), (2, 3));

        // clamped keys alias the same cache entry
        let mut cache = MeshCache::new(CountingSource { builds: Cell::new(0) });
        cache.get(PrimitiveKey::new(PrimitiveKind::Cone, 0, 1));
        cache.get(PrimitiveKey::new(PrimitiveKind::Cone, 1, 3));
        assert_eq!(cache.source.builds.get(), 1);
    }

    #[test]
    fn test_upload_bytes() {
        let data = [1.0f32, 2.0, 3.0];
        let bytes = as_upload_bytes(&data);
        assert_eq!(bytes.len(), 12);
    }
}
