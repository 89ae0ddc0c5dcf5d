//! Shared functionality which is used in unit-tests across the crate.

use std::collections::{HashMap, HashSet};

use crate::{
    heap::{HandleDescriptor, HandleKind, HeapSource, ObjectDescriptor, SegmentKind},
    Result,
};

/// An in-memory [`HeapSource`] built from crafted descriptors.
///
/// Lookup tables default to "unknown": unmapped pointer reads fail, unmapped
/// names resolve to `None`, unmapped segments report `Regular`, unmapped
/// generations report generation 0, and every address is live unless listed
/// in `dead`.
#[derive(Default)]
pub struct FakeHeap {
    pub objects: Vec<ObjectDescriptor>,
    pub handles: Vec<HandleDescriptor>,
    pub names: HashMap<u64, String>,
    pub pointers: HashMap<u64, u64>,
    pub strings: HashMap<u64, Vec<u16>>,
    pub segments: HashMap<u64, SegmentKind>,
    pub generations: HashMap<u64, u32>,
    pub dead: HashSet<u64>,
    pub walkable: bool,
}

impl FakeHeap {
    pub fn new() -> Self {
        FakeHeap {
            walkable: true,
            ..FakeHeap::default()
        }
    }

    pub fn push_object(&mut self, object: ObjectDescriptor) -> &mut Self {
        self.objects.push(object);
        self
    }

    pub fn push_named_type(&mut self, type_handle: u64, name: &str) -> &mut Self {
        self.names.insert(type_handle, name.to_string());
        self
    }

    pub fn push_string_object(&mut self, address: u64, type_handle: u64, size: u64, value: &str) {
        self.objects
            .push(ObjectDescriptor::new(address, Some(type_handle), size));
        self.strings
            .insert(address, value.encode_utf16().collect());
    }

    pub fn push_handle(
        &mut self,
        handle_address: u64,
        kind: HandleKind,
        target: ObjectDescriptor,
    ) -> &mut Self {
        self.handles.push(HandleDescriptor {
            handle_address,
            kind,
            target,
            dependent_target: None,
        });
        self
    }
}

impl HeapSource for FakeHeap {
    fn objects(&self) -> Box<dyn Iterator<Item = ObjectDescriptor> + '_> {
        Box::new(self.objects.iter().cloned())
    }

    fn handles(&self) -> Box<dyn Iterator<Item = HandleDescriptor> + '_> {
        Box::new(self.handles.iter().cloned())
    }

    fn read_pointer(&self, address: u64) -> Result<u64> {
        self.pointers.get(&address).copied().ok_or_else(|| {
            crate::Error::FileError(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "unreadable address",
            ))
        })
    }

    fn resolve_type_name(&self, type_handle: u64) -> Option<String> {
        self.names.get(&type_handle).cloned()
    }

    fn read_string_payload(&self, address: u64, max_units: usize) -> Result<Vec<u16>> {
        match self.strings.get(&address) {
            Some(units) => Ok(units.iter().copied().take(max_units).collect()),
            None => Err(crate::Error::FileError(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "no string payload",
            ))),
        }
    }

    fn segment_kind(&self, address: u64) -> Option<SegmentKind> {
        Some(
            self.segments
                .get(&address)
                .copied()
                .unwrap_or(SegmentKind::Regular),
        )
    }

    fn generation(&self, address: u64) -> Option<u32> {
        Some(self.generations.get(&address).copied().unwrap_or(0))
    }

    fn is_live(&self, address: u64) -> bool {
        !self.dead.contains(&address)
    }

    fn is_walkable(&self) -> bool {
        self.walkable
    }
}
