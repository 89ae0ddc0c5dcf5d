//! Shared builders for integration tests: a synthetic heap snapshot and a
//! capturing destination.

use std::{
    collections::{HashMap, HashSet},
    io,
    sync::{Arc, Mutex},
};

use heapscope::prelude::*;

/// An in-memory snapshot built object by object.
///
/// Unmapped lookups default to "unknown": pointer reads fail, names resolve
/// to `None`, segments report `Regular`, generations report 0, and every
/// address is live unless marked dead. When `cancel_after` is set, the object
/// iterator signals the token as it yields the n-th item, which is how the
/// cancellation tests interrupt a pass mid-stream.
#[derive(Default)]
pub struct SyntheticHeap {
    pub objects: Vec<ObjectDescriptor>,
    pub handles: Vec<HandleDescriptor>,
    pub names: HashMap<u64, String>,
    pub pointers: HashMap<u64, u64>,
    pub strings: HashMap<u64, Vec<u16>>,
    pub segments: HashMap<u64, SegmentKind>,
    pub generations: HashMap<u64, u32>,
    pub dead: HashSet<u64>,
    pub walkable: bool,
    pub cancel_after: Option<(usize, CancellationToken)>,
}

impl SyntheticHeap {
    pub fn new() -> Self {
        SyntheticHeap {
            walkable: true,
            ..SyntheticHeap::default()
        }
    }

    pub fn with_object(mut self, object: ObjectDescriptor) -> Self {
        self.objects.push(object);
        self
    }

    pub fn with_named_type(mut self, type_handle: u64, name: &str) -> Self {
        self.names.insert(type_handle, name.to_string());
        self
    }

    pub fn with_string_object(
        mut self,
        address: u64,
        type_handle: u64,
        size: u64,
        value: &str,
    ) -> Self {
        self.objects
            .push(ObjectDescriptor::new(address, Some(type_handle), size));
        self.strings
            .insert(address, value.encode_utf16().collect());
        self
    }

    pub fn with_handle(mut self, handle: HandleDescriptor) -> Self {
        self.handles.push(handle);
        self
    }
}

impl HeapSource for SyntheticHeap {
    fn objects(&self) -> Box<dyn Iterator<Item = ObjectDescriptor> + '_> {
        let cancel = self.cancel_after.clone();
        Box::new(
            self.objects
                .iter()
                .cloned()
                .enumerate()
                .map(move |(index, object)| {
                    if let Some((after, token)) = &cancel {
                        if index + 1 == *after {
                            token.cancel();
                        }
                    }
                    object
                }),
        )
    }

    fn handles(&self) -> Box<dyn Iterator<Item = HandleDescriptor> + '_> {
        Box::new(self.handles.iter().cloned())
    }

    fn read_pointer(&self, address: u64) -> heapscope::Result<u64> {
        self.pointers.get(&address).copied().ok_or_else(|| {
            Error::FileError(io::Error::new(io::ErrorKind::InvalidInput, "unreadable"))
        })
    }

    fn resolve_type_name(&self, type_handle: u64) -> Option<String> {
        self.names.get(&type_handle).cloned()
    }

    fn read_string_payload(&self, address: u64, max_units: usize) -> heapscope::Result<Vec<u16>> {
        match self.strings.get(&address) {
            Some(units) => Ok(units.iter().copied().take(max_units).collect()),
            None => Err(Error::FileError(io::Error::new(
                io::ErrorKind::InvalidInput,
                "no payload",
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

/// Destination writing into a shared byte buffer.
#[derive(Clone, Default)]
pub struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl io::Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A router with a single capturing destination.
pub fn capture_router() -> (OutputRouter, Capture) {
    let router = OutputRouter::new();
    let capture = Capture::default();
    router.attach(Box::new(capture.clone()));
    (router, capture)
}
