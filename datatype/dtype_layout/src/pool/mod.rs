//! Reference-counted arena of derived types.
//!
//! Derived types refer to their bases by [`TypeId`], never by pointer. A
//! pooled type holds one reference on every derived base it was built
//! from, so a base outlives its users even after the caller releases its
//! own handle.
//!
//! # Handles
//!
//! `TypeId` is a slot index plus the slot's generation. Freeing a type bumps
//! the generation, so a stale handle to a reused slot is reported as
//! [`LayoutError::UnknownType`] instead of aliasing the new occupant.
//!
//! # Thread Safety
//!
//! Slots live behind one `RwLock`. A constructor copies its base layouts
//! out under the read lock, runs the facade unlocked, and takes the write
//! lock only to insert. Insertion re-checks every base, so a base freed in
//! between is caught there.

mod contents;

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::construct::{self, DarrayParams, SubarrayParams};
use crate::{Base, BasicType, LayoutError, StructField, TypeLayout};

pub use contents::{Contents, TypeRef};

/// Handle to a pooled derived type.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TypeId {
    index: u32,
    generation: u32,
}

impl TypeId {
    /// Slot index, stable for the lifetime of the type.
    #[inline]
    pub const fn index(self) -> u32 {
        self.index
    }
}

impl fmt::Debug for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeId({}v{})", self.index, self.generation)
    }
}

/// Committed representation attached to a pooled type.
///
/// The pool treats it as opaque. Duplicating a committed type asks the
/// representation for its own copy.
pub trait Typerep: Send + Sync + fmt::Debug {
    fn dup(&self) -> Arc<dyn Typerep>;
}

struct Entry {
    layout: TypeLayout,
    contents: Contents,
    refcount: u32,
    typerep: Option<Arc<dyn Typerep>>,
}

struct Slot {
    generation: u32,
    entry: Option<Entry>,
}

#[derive(Default)]
struct Slots {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

impl Slots {
    fn get(&self, id: TypeId) -> Result<&Entry, LayoutError> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.entry.as_ref())
            .ok_or(LayoutError::UnknownType { id })
    }

    fn get_mut(&mut self, id: TypeId) -> Result<&mut Entry, LayoutError> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.entry.as_mut())
            .ok_or(LayoutError::UnknownType { id })
    }

    fn insert(&mut self, entry: Entry) -> Result<TypeId, LayoutError> {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.entry = Some(entry);
            self.live += 1;
            return Ok(TypeId {
                index,
                generation: slot.generation,
            });
        }

        let index =
            u32::try_from(self.slots.len()).map_err(|_| LayoutError::OutOfMemory {
                requested: std::mem::size_of::<Slot>(),
            })?;
        self.slots.push(Slot {
            generation: 0,
            entry: Some(entry),
        });
        self.live += 1;
        Ok(TypeId {
            index,
            generation: 0,
        })
    }

    /// Vacate a slot, invalidating every outstanding handle to it.
    fn take(&mut self, id: TypeId) -> Option<Entry> {
        let slot = self
            .slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)?;
        let entry = slot.entry.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.live -= 1;
        Some(entry)
    }
}

/// A base copied out of the pool, so the facade runs without the lock.
enum Resolved {
    Basic(BasicType),
    Derived(TypeLayout),
}

impl Resolved {
    fn base(&self) -> Base<'_> {
        match self {
            Self::Basic(basic) => Base::Basic(*basic),
            Self::Derived(layout) => Base::Derived(layout),
        }
    }
}

/// Thread-safe arena of derived types.
#[derive(Default)]
pub struct TypePool {
    slots: RwLock<Slots>,
}

impl TypePool {
    pub fn new() -> Self {
        Self::default()
    }

    // === Constructors ===

    pub fn vector(
        &self,
        base: TypeRef,
        count: u32,
        blocklength: u32,
        stride: i64,
    ) -> Result<TypeId, LayoutError> {
        let layout = construct::vector(self.resolve(base)?.base(), count, blocklength, stride);
        self.insert(
            layout,
            Contents::Vector {
                count,
                blocklength,
                stride,
                base,
            },
            None,
        )
    }

    pub fn hvector(
        &self,
        base: TypeRef,
        count: u32,
        blocklength: u32,
        stride: i64,
    ) -> Result<TypeId, LayoutError> {
        let layout = construct::hvector(self.resolve(base)?.base(), count, blocklength, stride);
        self.insert(
            layout,
            Contents::Hvector {
                count,
                blocklength,
                stride,
                base,
            },
            None,
        )
    }

    pub fn contiguous(&self, base: TypeRef, count: u32) -> Result<TypeId, LayoutError> {
        let layout = construct::contiguous(self.resolve(base)?.base(), count);
        self.insert(layout, Contents::Contiguous { count, base }, None)
    }

    /// Duplicate `base`. A committed representation is duplicated along
    /// with the layout.
    pub fn dup(&self, base: TypeRef) -> Result<TypeId, LayoutError> {
        let layout = construct::dup(self.resolve(base)?.base());
        let typerep = match base {
            TypeRef::Basic(_) => None,
            TypeRef::Derived(id) => self.typerep(id)?.map(|rep| rep.dup()),
        };
        self.insert(layout, Contents::Dup { base }, typerep)
    }

    /// # Panics
    ///
    /// As [`construct::indexed`].
    pub fn indexed(
        &self,
        base: TypeRef,
        blocklengths: &[u32],
        displacements: &[i64],
    ) -> Result<TypeId, LayoutError> {
        let layout = construct::indexed(self.resolve(base)?.base(), blocklengths, displacements)?;
        self.insert(
            layout,
            Contents::Indexed {
                blocklengths: blocklengths.to_vec(),
                displacements: displacements.to_vec(),
                base,
            },
            None,
        )
    }

    /// # Panics
    ///
    /// As [`construct::hindexed`].
    pub fn hindexed(
        &self,
        base: TypeRef,
        blocklengths: &[u32],
        displacements: &[i64],
    ) -> Result<TypeId, LayoutError> {
        let layout = construct::hindexed(self.resolve(base)?.base(), blocklengths, displacements)?;
        self.insert(
            layout,
            Contents::Hindexed {
                blocklengths: blocklengths.to_vec(),
                displacements: displacements.to_vec(),
                base,
            },
            None,
        )
    }

    pub fn indexed_block(
        &self,
        base: TypeRef,
        blocklength: u32,
        displacements: &[i64],
    ) -> Result<TypeId, LayoutError> {
        let layout =
            construct::indexed_block(self.resolve(base)?.base(), blocklength, displacements);
        self.insert(
            layout,
            Contents::IndexedBlock {
                blocklength,
                displacements: displacements.to_vec(),
                base,
            },
            None,
        )
    }

    pub fn hindexed_block(
        &self,
        base: TypeRef,
        blocklength: u32,
        displacements: &[i64],
    ) -> Result<TypeId, LayoutError> {
        let layout =
            construct::hindexed_block(self.resolve(base)?.base(), blocklength, displacements);
        self.insert(
            layout,
            Contents::HindexedBlock {
                blocklength,
                displacements: displacements.to_vec(),
                base,
            },
            None,
        )
    }

    pub fn resized(&self, base: TypeRef, lb: i64, extent: i64) -> Result<TypeId, LayoutError> {
        let layout = construct::resized(self.resolve(base)?.base(), lb, extent);
        self.insert(layout, Contents::Resized { lb, extent, base }, None)
    }

    /// # Panics
    ///
    /// If the three lists differ in length.
    pub fn struct_type(
        &self,
        blocklengths: &[u32],
        displacements: &[i64],
        bases: &[TypeRef],
    ) -> Result<TypeId, LayoutError> {
        assert!(
            blocklengths.len() == displacements.len() && blocklengths.len() == bases.len(),
            "struct field lists differ in length"
        );

        let resolved = bases
            .iter()
            .map(|&base| self.resolve(base))
            .collect::<Result<Vec<_>, _>>()?;
        let fields: Vec<StructField<'_>> = resolved
            .iter()
            .zip(blocklengths.iter().zip(displacements))
            .map(|(resolved, (&blocklength, &displacement))| StructField {
                blocklength,
                displacement,
                base: resolved.base(),
            })
            .collect();

        let layout = construct::struct_type(&fields);
        self.insert(
            layout,
            Contents::Struct {
                blocklengths: blocklengths.to_vec(),
                displacements: displacements.to_vec(),
                bases: bases.to_vec(),
            },
            None,
        )
    }

    /// Always fails with [`LayoutError::Unsupported`] once the base
    /// resolves; nothing is inserted.
    pub fn subarray(
        &self,
        base: TypeRef,
        params: &SubarrayParams<'_>,
    ) -> Result<TypeId, LayoutError> {
        let resolved = self.resolve(base)?;
        construct::subarray(resolved.base(), params).map(|never| match never {})
    }

    /// As [`subarray`](Self::subarray), for distributed arrays.
    pub fn darray(&self, base: TypeRef, params: &DarrayParams<'_>) -> Result<TypeId, LayoutError> {
        let resolved = self.resolve(base)?;
        construct::darray(resolved.base(), params).map(|never| match never {})
    }

    // === Reference counting ===

    /// Take another reference on `id`.
    pub fn retain(&self, id: TypeId) -> Result<(), LayoutError> {
        self.slots.write().get_mut(id)?.refcount += 1;
        Ok(())
    }

    /// Drop a reference on `id`. Returns whether the type was freed.
    ///
    /// Freeing a type drops its references on its bases in turn; chains of
    /// any depth are walked with a worklist.
    pub fn release(&self, id: TypeId) -> Result<bool, LayoutError> {
        let mut slots = self.slots.write();

        let entry = slots.get_mut(id)?;
        entry.refcount -= 1;
        if entry.refcount > 0 {
            return Ok(false);
        }

        let mut pending = vec![id];
        while let Some(id) = pending.pop() {
            let Some(entry) = slots.take(id) else {
                continue;
            };
            tracing::debug!(?id, combiner = entry.contents.combiner(), "freed datatype");

            for base in entry.contents.derived_bases() {
                if let Ok(base_entry) = slots.get_mut(base) {
                    base_entry.refcount -= 1;
                    if base_entry.refcount == 0 {
                        pending.push(base);
                    }
                }
            }
        }

        Ok(true)
    }

    // === Queries ===

    pub fn layout(&self, id: TypeId) -> Result<TypeLayout, LayoutError> {
        Ok(self.slots.read().get(id)?.layout)
    }

    /// Layout of any base, synthesizing it for basic elements.
    pub fn layout_of(&self, base: TypeRef) -> Result<TypeLayout, LayoutError> {
        match base {
            TypeRef::Basic(basic) => Ok(TypeLayout::basic(basic)),
            TypeRef::Derived(id) => self.layout(id),
        }
    }

    pub fn contents(&self, id: TypeId) -> Result<Contents, LayoutError> {
        Ok(self.slots.read().get(id)?.contents.clone())
    }

    pub fn refcount(&self, id: TypeId) -> Result<u32, LayoutError> {
        Ok(self.slots.read().get(id)?.refcount)
    }

    /// Number of live types.
    pub fn len(&self) -> usize {
        self.slots.read().live
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // === Committed representation ===

    /// Attach a committed representation, replacing any earlier one.
    pub fn commit(&self, id: TypeId, typerep: Arc<dyn Typerep>) -> Result<(), LayoutError> {
        self.slots.write().get_mut(id)?.typerep = Some(typerep);
        Ok(())
    }

    pub fn typerep(&self, id: TypeId) -> Result<Option<Arc<dyn Typerep>>, LayoutError> {
        Ok(self.slots.read().get(id)?.typerep.clone())
    }

    // === Internals ===

    fn resolve(&self, base: TypeRef) -> Result<Resolved, LayoutError> {
        match base {
            TypeRef::Basic(basic) => Ok(Resolved::Basic(basic)),
            TypeRef::Derived(id) => self.layout(id).map(Resolved::Derived),
        }
    }

    fn insert(
        &self,
        layout: TypeLayout,
        contents: Contents,
        typerep: Option<Arc<dyn Typerep>>,
    ) -> Result<TypeId, LayoutError> {
        let mut slots = self.slots.write();

        for base in contents.derived_bases() {
            slots.get(base)?;
        }
        for base in contents.derived_bases() {
            slots.get_mut(base)?.refcount += 1;
        }

        let combiner = contents.combiner();
        let id = slots.insert(Entry {
            layout,
            contents,
            refcount: 1,
            typerep,
        })?;
        tracing::debug!(?id, combiner, size = layout.size, "allocated datatype");
        Ok(id)
    }
}

impl fmt::Debug for TypePool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypePool").field("len", &self.len()).finish()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
