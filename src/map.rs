// MIT License
//
// Copyright (c) 2025 the lht developers
//
// Permission is hereby granted, free of charge, to any person
// obtaining a copy of this software and associated documentation files
// (the "Software"), to deal in the Software without restriction,
// including without limitation the rights to use, copy, modify, merge,
// publish, distribute, sublicense, and/or sell copies of the Software,
// and to permit persons to whom the Software is furnished to do so,
// subject to the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS
// BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN
// ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN
// CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.

//! A fixed-capacity concurrent hash map implemented with separate chaining
//! and one mutex per bucket.

use std::{
    error::Error,
    fmt, mem,
    sync::atomic::{AtomicUsize, Ordering},
};

use parking_lot::Mutex;

/// A fixed-capacity concurrent hash map with one lock per bucket.
///
/// Keys are `i64` and each key maps to the bucket at index
/// `(key as u64) % capacity`, so every key has exactly one home bucket for
/// the lifetime of the map. Colliding keys share a bucket and are stored in a
/// chain in insertion order; chains are walked linearly, so a heavily
/// collided bucket degrades to a linear scan. The map never resizes,
/// rehashes, or evicts.
///
/// Every operation locks exactly one bucket for the duration of its chain
/// walk and any mutation, then releases it. Operations on distinct buckets
/// proceed in parallel; operations on the same bucket are serialized by that
/// bucket's guard and take effect in guard-acquisition order. No operation
/// ever holds two bucket guards, so the map cannot deadlock against itself.
/// A thread blocked on a guard waits until the holder releases it; holders
/// never block, since every operation is a bounded in-memory chain walk.
///
/// A borrowed value cannot outlive its bucket guard, so [`get`] requires `V`
/// to implement [`Clone`] and returns a copy. Use [`get_and`] to work with
/// the value by reference under the guard instead.
///
/// [`get`]: #method.get
/// [`get_and`]: #method.get_and
/// [`Clone`]: https://doc.rust-lang.org/std/clone/trait.Clone.html
pub struct HashMap<V> {
    buckets: Box<[Mutex<Vec<Entry<V>>>]>,
    len: AtomicUsize,
    op_count: AtomicUsize,
}

struct Entry<V> {
    key: i64,
    value: V,
}

/// The error returned by [`HashMap::with_capacity`] when invoked with a
/// capacity of zero.
///
/// A map with no buckets could never hold an entry, so construction refuses
/// it outright.
///
/// [`HashMap::with_capacity`]: struct.HashMap.html#method.with_capacity
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ZeroCapacityError;

impl fmt::Display for ZeroCapacityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("capacity must be at least 1")
    }
}

impl Error for ZeroCapacityError {}

impl<V> HashMap<V> {
    /// Creates an empty `HashMap` with exactly `capacity` buckets.
    ///
    /// The bucket count is fixed for the lifetime of the map; it bounds
    /// parallelism (at most `capacity` operations make progress at once) but
    /// not the number of entries, since chains grow without bound.
    ///
    /// # Errors
    ///
    /// Returns [`ZeroCapacityError`] if `capacity` is 0.
    ///
    /// [`ZeroCapacityError`]: struct.ZeroCapacityError.html
    pub fn with_capacity(capacity: usize) -> Result<HashMap<V>, ZeroCapacityError> {
        if capacity == 0 {
            return Err(ZeroCapacityError);
        }

        Ok(HashMap {
            buckets: (0..capacity).map(|_| Mutex::new(Vec::new())).collect(),
            len: AtomicUsize::new(0),
            op_count: AtomicUsize::new(0),
        })
    }

    /// Returns the number of entries in this map.
    ///
    /// Because `HashMap` can be updated concurrently, this reflects only
    /// operations that have returned to their callers: the count is exact
    /// whenever no insertion or removal is in flight, but may trail
    /// operations currently holding a bucket guard.
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Relaxed)
    }

    /// Returns true if this map holds no confirmed entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of buckets in this map.
    ///
    /// Unlike [`std::collections::HashMap::capacity`], this does not bound
    /// the number of entries the map can hold; it is the fixed bucket count
    /// chosen at construction.
    ///
    /// [`std::collections::HashMap::capacity`]: https://doc.rust-lang.org/std/collections/struct.HashMap.html#method.capacity
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// Returns the number of [`get`], [`get_and`], [`insert`], and
    /// [`remove`] calls issued against this map so far.
    ///
    /// The counter is a relaxed atomic: increments are never lost, but its
    /// value does not order one operation against another. Diagnostic only.
    ///
    /// [`get`]: #method.get
    /// [`get_and`]: #method.get_and
    /// [`insert`]: #method.insert
    /// [`remove`]: #method.remove
    pub fn op_count(&self) -> usize {
        self.op_count.load(Ordering::Relaxed)
    }

    /// Returns a copy of the value corresponding to `key`, or `None` if the
    /// key is absent.
    ///
    /// `V` must implement [`Clone`], as the entry belongs to its bucket and
    /// may be removed by another thread the moment the guard is released. If
    /// your `V` does not implement [`Clone`], use [`get_and`] instead.
    ///
    /// Blocks while another thread holds the key's bucket guard.
    ///
    /// [`Clone`]: https://doc.rust-lang.org/std/clone/trait.Clone.html
    /// [`get_and`]: #method.get_and
    pub fn get(&self, key: i64) -> Option<V>
    where
        V: Clone,
    {
        self.get_and(key, V::clone)
    }

    /// Invokes `with_value` on the value corresponding to `key` while the
    /// bucket guard is held, returning its result, or `None` if the key is
    /// absent.
    ///
    /// The reference passed to `with_value` is valid only for the duration
    /// of the call; the guard is released once it returns. `with_value` must
    /// not call back into this map, or it will deadlock on the bucket whose
    /// guard it is already under.
    ///
    /// Blocks while another thread holds the key's bucket guard.
    pub fn get_and<T, F: FnOnce(&V) -> T>(&self, key: i64, with_value: F) -> Option<T> {
        self.op_count.fetch_add(1, Ordering::Relaxed);

        let chain = self.bucket(key).lock();

        chain
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| with_value(&entry.value))
    }

    /// Inserts a key-value pair, returning the value previously associated
    /// with `key`, or `None` if the key was absent.
    ///
    /// Updating an existing key replaces its value in place: the entry keeps
    /// its position in the chain and the map's length is unchanged. A new
    /// key is appended at the tail of its chain.
    ///
    /// The bucket guard is held across the entire find-or-append, so no
    /// other operation on the same bucket can interleave with it.
    pub fn insert(&self, key: i64, value: V) -> Option<V> {
        self.op_count.fetch_add(1, Ordering::Relaxed);

        let mut chain = self.bucket(key).lock();

        if let Some(entry) = chain.iter_mut().find(|entry| entry.key == key) {
            Some(mem::replace(&mut entry.value, value))
        } else {
            chain.push(Entry { key, value });
            // len is only adjusted under the affected bucket's guard, so it
            // is exact at any quiescent point.
            self.len.fetch_add(1, Ordering::Relaxed);

            None
        }
    }

    /// Removes the entry corresponding to `key`, returning its value, or
    /// `None` if the key was absent.
    ///
    /// Surviving entries in the bucket keep their relative order. Removing
    /// an absent key has no effect on the map.
    pub fn remove(&self, key: i64) -> Option<V> {
        self.op_count.fetch_add(1, Ordering::Relaxed);

        let mut chain = self.bucket(key).lock();

        let index = chain.iter().position(|entry| entry.key == key)?;
        let entry = chain.remove(index);
        self.len.fetch_sub(1, Ordering::Relaxed);

        Some(entry.value)
    }

    // Negative keys index through the unsigned reinterpretation of the key,
    // so -1 lands in bucket (2^64 - 1) % capacity.
    fn bucket(&self, key: i64) -> &Mutex<Vec<Entry<V>>> {
        &self.buckets[(key as u64 % self.buckets.len() as u64) as usize]
    }
}

impl<V: fmt::Display> fmt::Display for HashMap<V> {
    /// Writes one line per bucket in index order, each listing the bucket's
    /// chain as `[index] -> (key,value) -> (key,value)`.
    ///
    /// Guards are taken one bucket at a time, so each line is internally
    /// consistent, but the listing as a whole is a best-effort snapshot: it
    /// is not linearizable across buckets while writers are active.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, bucket) in self.buckets.iter().enumerate() {
            write!(f, "[{}]", index)?;

            for entry in bucket.lock().iter() {
                write!(f, " -> ({},{})", entry.key, entry.value)?;
            }

            writeln!(f)?;
        }

        Ok(())
    }
}

impl<V: fmt::Debug> fmt::Debug for HashMap<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();

        for bucket in self.buckets.iter() {
            for entry in bucket.lock().iter() {
                map.entry(&entry.key, &entry.value);
            }
        }

        map.finish()
    }
}
