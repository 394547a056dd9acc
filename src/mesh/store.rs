//! Keyed vertex and element stores.
//!
//! Both stores keep their entries in insertion order, map keys to slots with
//! a hash table, own a [`KeyAllocator`] for fresh keys, and count every
//! mutation in a revision number. The revision lets the mesh detect when a
//! cached topology index no longer describes the stores.

use std::collections::HashMap;
use std::hash::Hash;

use nalgebra::Point3;

use super::element::{Element, HalfFacetRecord};
use super::index::{ElementKey, HalfFacetId, KeyAllocator, VertexKey};
use crate::error::{MeshError, Result};

/// Insertion-ordered slot storage addressed by key.
#[derive(Debug, Clone, PartialEq)]
struct Slots<K: Eq + Hash, T> {
    keys: Vec<K>,
    items: Vec<T>,
    index: HashMap<K, usize>,
}

impl<K: Copy + Eq + Hash, T> Slots<K, T> {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            keys: Vec::with_capacity(capacity),
            items: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    #[inline]
    fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    fn contains(&self, key: K) -> bool {
        self.index.contains_key(&key)
    }

    /// Returns `false` without inserting if the key is taken.
    fn insert(&mut self, key: K, item: T) -> bool {
        if self.index.contains_key(&key) {
            return false;
        }
        self.index.insert(key, self.items.len());
        self.keys.push(key);
        self.items.push(item);
        true
    }

    #[inline]
    fn get(&self, key: K) -> Option<&T> {
        self.index.get(&key).map(|&slot| &self.items[slot])
    }

    #[inline]
    fn get_mut(&mut self, key: K) -> Option<&mut T> {
        self.index.get(&key).map(|&slot| &mut self.items[slot])
    }

    fn iter(&self) -> impl Iterator<Item = (K, &T)> + '_ {
        self.keys.iter().copied().zip(self.items.iter())
    }
}

/// A vertex of the mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    /// The 3D position of this vertex.
    pub position: Point3<f64>,
}

impl Vertex {
    /// Create a new vertex at the given position.
    pub fn new(position: Point3<f64>) -> Self {
        Self { position }
    }
}

/// Keyed collection of vertices.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexStore {
    slots: Slots<VertexKey, Vertex>,
    keys: KeyAllocator,
    revision: u64,
}

impl Default for VertexStore {
    fn default() -> Self {
        Self::new()
    }
}

impl VertexStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create a store with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Slots::with_capacity(capacity),
            keys: KeyAllocator::new(),
            revision: 0,
        }
    }

    /// Number of vertices.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Check if the store is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.len() == 0
    }

    /// Check if `key` is present.
    #[inline]
    pub fn contains(&self, key: VertexKey) -> bool {
        self.slots.contains(key)
    }

    /// Mutation counter.
    #[inline]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// The key [`push`](Self::push) would assign next, if any is left.
    #[inline]
    pub fn next_key(&self) -> Option<VertexKey> {
        self.keys.peek().map(VertexKey::new)
    }

    /// Insert a vertex under a caller-chosen key.
    pub fn insert(&mut self, key: VertexKey, position: Point3<f64>) -> Result<()> {
        if !self.slots.insert(key, Vertex::new(position)) {
            return Err(MeshError::DuplicateVertex(key));
        }
        self.keys.observe(key.raw());
        self.revision += 1;
        Ok(())
    }

    /// Insert a vertex under a fresh key and return the key.
    ///
    /// # Errors
    ///
    /// [`MeshError::KeysExhausted`] once key `u32::MAX` has been used.
    pub fn push(&mut self, position: Point3<f64>) -> Result<VertexKey> {
        let key = self
            .keys
            .allocate()
            .map(VertexKey::new)
            .ok_or(MeshError::KeysExhausted { store: "vertex" })?;
        self.slots.insert(key, Vertex::new(position));
        self.revision += 1;
        Ok(key)
    }

    /// Move an existing vertex, returning its previous position.
    pub fn replace(&mut self, key: VertexKey, position: Point3<f64>) -> Result<Point3<f64>> {
        let vertex = self
            .slots
            .get_mut(key)
            .ok_or(MeshError::UnknownVertex(key))?;
        let old = std::mem::replace(&mut vertex.position, position);
        self.revision += 1;
        Ok(old)
    }

    /// Look up a vertex.
    #[inline]
    pub fn get(&self, key: VertexKey) -> Result<&Vertex> {
        self.slots.get(key).ok_or(MeshError::UnknownVertex(key))
    }

    /// Look up a vertex position.
    #[inline]
    pub fn position(&self, key: VertexKey) -> Result<Point3<f64>> {
        self.get(key).map(|v| v.position)
    }

    /// Iterate over vertices in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (VertexKey, &Vertex)> + '_ {
        self.slots.iter()
    }

    /// Iterate over keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = VertexKey> + '_ {
        self.slots.keys.iter().copied()
    }
}

/// Keyed collection of elements.
///
/// Sibling records on the stored elements are written only by the topology
/// builder, which does not count as a mutation of the store.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementStore {
    slots: Slots<ElementKey, Element>,
    keys: KeyAllocator,
    revision: u64,
    num_half_facets: usize,
}

impl Default for ElementStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ElementStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create a store with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Slots::with_capacity(capacity),
            keys: KeyAllocator::new(),
            revision: 0,
            num_half_facets: 0,
        }
    }

    /// Number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Check if the store is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.len() == 0
    }

    /// Total number of half-facets over all elements.
    #[inline]
    pub fn num_half_facets(&self) -> usize {
        self.num_half_facets
    }

    /// Check if `key` is present.
    #[inline]
    pub fn contains(&self, key: ElementKey) -> bool {
        self.slots.contains(key)
    }

    /// Mutation counter.
    #[inline]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// The key [`push`](Self::push) would assign next.
    #[inline]
    pub fn next_key(&self) -> Option<ElementKey> {
        self.keys.peek().map(ElementKey::new)
    }

    /// Insert an element under a caller-chosen key.
    pub fn insert(&mut self, key: ElementKey, mut element: Element) -> Result<()> {
        if self.slots.contains(key) {
            return Err(MeshError::DuplicateElement(key));
        }
        element.clear_siblings();
        self.num_half_facets += element.num_half_facets();
        self.slots.insert(key, element);
        self.keys.observe(key.raw());
        self.revision += 1;
        Ok(())
    }

    /// Insert an element under a fresh key and return the key.
    ///
    /// # Errors
    ///
    /// [`MeshError::KeysExhausted`] once key `u32::MAX` has been used.
    pub fn push(&mut self, mut element: Element) -> Result<ElementKey> {
        let key = self
            .keys
            .allocate()
            .map(ElementKey::new)
            .ok_or(MeshError::KeysExhausted { store: "element" })?;
        element.clear_siblings();
        self.num_half_facets += element.num_half_facets();
        self.slots.insert(key, element);
        self.revision += 1;
        Ok(key)
    }

    /// Swap an existing element for a new one, returning the old element.
    ///
    /// The new element's half-facets start out naked.
    pub fn replace(&mut self, key: ElementKey, mut element: Element) -> Result<Element> {
        let slot = self
            .slots
            .get_mut(key)
            .ok_or(MeshError::UnknownElement(key))?;
        element.clear_siblings();
        let old = std::mem::replace(slot, element);
        self.num_half_facets = self.num_half_facets + slot.num_half_facets() - old.num_half_facets();
        self.revision += 1;
        Ok(old)
    }

    /// Look up an element.
    #[inline]
    pub fn get(&self, key: ElementKey) -> Result<&Element> {
        self.slots.get(key).ok_or(MeshError::UnknownElement(key))
    }

    /// Iterate over elements in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (ElementKey, &Element)> + '_ {
        self.slots.iter()
    }

    /// Iterate over keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = ElementKey> + '_ {
        self.slots.keys.iter().copied()
    }

    /// Iterate over every half-facet id in element order.
    pub fn half_facet_ids(&self) -> impl Iterator<Item = HalfFacetId> + '_ {
        self.iter().flat_map(|(key, element)| element.half_facet_ids(key))
    }

    /// Sibling record of a half-facet.
    pub fn sibling(&self, hf: HalfFacetId) -> Result<HalfFacetRecord> {
        let element = self.get(hf.element)?;
        if hf.index() >= element.num_half_facets() {
            return Err(MeshError::UnknownElement(hf.element));
        }
        Ok(element.sibling(hf.index()))
    }

    pub(crate) fn set_sibling(&mut self, hf: HalfFacetId, record: HalfFacetRecord) {
        if let Some(element) = self.slots.get_mut(hf.element) {
            element.set_sibling(hf.index(), record);
        }
    }

    pub(crate) fn clear_siblings(&mut self) {
        for element in &mut self.slots.items {
            element.clear_siblings();
        }
    }
}
