//! NDR pointers and deferred pointees
//!
//! NDR supports three pointer semantics, all sharing one codec here:
//!
//! - Reference (`[ref]`): never null
//! - Unique (`[unique]`): nullable, no aliasing
//! - Full (`[ptr]`): nullable, a referent already sent is sent again by ID only
//!
//! An embedded pointer is written as a 4-byte referent ID in the immediate
//! part of its container. The pointee follows at the next deferred flush.
//! A top-level `[ref]` parameter has no wire representation at all and is
//! marshaled as its pointee with [`NdrWriter::write_param`].

use std::any::Any;
use std::collections::{HashMap, HashSet};

use crate::{NdrDecode, NdrEncode, NdrError, NdrReader, NdrWriter, Result};

/// Pointer attribute of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerKind {
    /// `[ref]`: null is an error
    Ref,
    /// `[unique]`: nullable
    Unique,
    /// `[ptr]`: nullable and aliasable
    Full,
}

impl PointerKind {
    /// Whether a null referent is acceptable
    pub fn allows_null(self) -> bool {
        !matches!(self, PointerKind::Ref)
    }
}

/// Full-pointer referents seen while reading one stub.
#[derive(Default)]
pub(crate) struct FullPointerTable {
    seen: HashSet<u32>,
    values: HashMap<u32, Box<dyn Any>>,
}

impl FullPointerTable {
    /// Returns false if `id` was already announced.
    fn announce(&mut self, id: u32) -> bool {
        self.seen.insert(id)
    }

    fn store<T: Clone + 'static>(&mut self, id: u32, value: &T) {
        self.values.insert(id, Box::new(value.clone()));
    }

    fn resolve<T: Clone + 'static>(&self, id: u32) -> Result<T> {
        self.values
            .get(&id)
            .and_then(|value| value.downcast_ref::<T>())
            .cloned()
            .ok_or(NdrError::InvalidPointer(id))
    }
}

impl<'a> NdrWriter<'a> {
    /// Write a referent ID: 0 when absent, otherwise a fresh ID.
    ///
    /// Returns the ID written.
    pub fn write_referent(&mut self, present: bool, kind: PointerKind) -> Result<u32> {
        if !present {
            if !kind.allows_null() {
                return Err(NdrError::NullRefPointer);
            }
            self.write_u32(0);
            return Ok(0);
        }
        let id = self.next_referent;
        self.next_referent = self.next_referent.wrapping_add(crate::writer::REFERENT_ID_STEP);
        self.write_u32(id);
        Ok(id)
    }

    /// Write an embedded pointer whose pointee is marshaled by `f`.
    pub fn write_pointer_with<T, F>(&mut self, value: Option<&'a T>, kind: PointerKind, f: F) -> Result<()>
    where
        T: ?Sized,
        F: FnOnce(&mut NdrWriter<'a>, &'a T) -> Result<()> + 'a,
    {
        let Some(value) = value else {
            self.write_referent(false, kind)?;
            return Ok(());
        };

        if kind == PointerKind::Full {
            let key = (
                value as *const T as *const () as usize,
                std::any::type_name::<T>(),
            );
            if let Some(&id) = self.full_pointers.get(&key) {
                self.write_u32(id);
                return Ok(());
            }
            let id = self.write_referent(true, kind)?;
            self.full_pointers.insert(key, id);
        } else {
            self.write_referent(true, kind)?;
        }

        self.defer(move |w| f(w, value));
        Ok(())
    }

    /// Write an embedded pointer to an [`NdrEncode`] pointee.
    pub fn write_pointer<T: NdrEncode + ?Sized>(&mut self, value: Option<&'a T>, kind: PointerKind) -> Result<()> {
        self.write_pointer_with(value, kind, |w, pointee| pointee.ndr_encode(w))
    }

    /// A top-level pointer parameter: referent, then its pointee at once.
    pub fn write_pointer_param<T: NdrEncode + ?Sized>(&mut self, value: Option<&'a T>, kind: PointerKind) -> Result<()> {
        self.write_pointer(value, kind)?;
        self.write_deferred()
    }
}

impl<'a> NdrReader<'a> {
    /// Read a referent ID, rejecting null for `[ref]` pointers.
    ///
    /// Returns 0 for a null pointer.
    pub fn read_referent(&mut self, kind: PointerKind) -> Result<u32> {
        let id = self.read_u32()?;
        if id == 0 && !kind.allows_null() {
            return Err(NdrError::NullRefPointer);
        }
        Ok(id)
    }

    /// Read an embedded pointer whose pointee is produced by `f`.
    ///
    /// `dest` is cleared at once for a null referent. Otherwise it is
    /// patched when the deferred queue is flushed.
    pub fn read_pointer_with<T, F>(&mut self, dest: &'a mut Option<T>, kind: PointerKind, f: F) -> Result<()>
    where
        T: Clone + 'static,
        F: FnOnce(&mut NdrReader<'a>) -> Result<T> + 'a,
    {
        let id = self.read_referent(kind)?;
        if id == 0 {
            *dest = None;
            return Ok(());
        }

        if kind == PointerKind::Full && !self.full_pointers.announce(id) {
            self.defer(move |r| {
                *dest = Some(r.full_pointers.resolve(id)?);
                Ok(())
            });
            return Ok(());
        }

        self.defer(move |r| {
            let value = f(r)?;
            if kind == PointerKind::Full {
                r.full_pointers.store(id, &value);
            }
            *dest = Some(value);
            Ok(())
        });
        Ok(())
    }

    /// Read an embedded pointer to an [`NdrDecode`] pointee.
    pub fn read_pointer<T>(&mut self, dest: &'a mut Option<T>, kind: PointerKind) -> Result<()>
    where
        T: NdrDecode + Default + Clone + 'static,
    {
        self.read_pointer_with(dest, kind, |r| r.read_owned::<T>())
    }

    /// A top-level pointer parameter: referent, then its pointee at once.
    pub fn read_pointer_param<T>(&mut self, dest: &'a mut Option<T>, kind: PointerKind) -> Result<()>
    where
        T: NdrDecode + Default + Clone + 'static,
    {
        self.read_pointer(dest, kind)?;
        self.read_deferred()
    }
}
