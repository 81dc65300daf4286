// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2022 Adam Lock

use std::{
    any::{Any, TypeId},
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use crate::{
    codec::{
        full_type_name,
        plan::{Plan, PlanBuilder, PlanResult, PlanSlot},
        Codec, Encodable, Structure,
    },
    sync::RwLock,
    types::encoding::*,
};

/// Memoizes the codec of every type used with it.
///
/// Structures are compiled into a [`Plan`] at most once. The first caller to need a structure's
/// plan builds it; anyone else resolving the same structure meanwhile gets a codec referring to the
/// slot being built and waits on it when it is first used. Different structures build in parallel,
/// the cache lock is never held while a plan is being built.
#[derive(Default)]
pub struct PlanCache {
    /// Slots holding structure plans, keyed by structure type
    plans: RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
    /// Resolved codecs of every type, keyed by type
    codecs: RwLock<HashMap<TypeId, Box<dyn Any + Send + Sync>>>,
    /// Number of plans built, for diagnostics and tests
    builds: AtomicUsize,
}

impl PlanCache {
    pub fn new() -> PlanCache {
        PlanCache::default()
    }

    /// Returns the codec for `T`, resolving and remembering it on first use.
    pub fn resolve<T: Encodable>(&self) -> EncodingResult<Codec<T>> {
        let key = TypeId::of::<T>();
        {
            let codecs = trace_read_lock!(self.codecs);
            if let Some(codec) = codecs.get(&key).and_then(|c| c.downcast_ref::<Codec<T>>()) {
                return Ok(codec.clone());
            }
        }
        // Resolving is idempotent for anything but plans, which have their own single flight
        // slots, so two threads racing here produce equivalent codecs
        let codec = T::codec(self)?;
        let mut codecs = trace_write_lock!(self.codecs);
        let codec = codecs
            .entry(key)
            .or_insert_with(|| Box::new(codec))
            .downcast_ref::<Codec<T>>()
            .cloned()
            .ok_or_else(|| EncodingError::unsupported_type::<T>("codec cache entry has the wrong type"))?;
        Ok(codec)
    }

    /// Returns the codec for the structure `T`, building its plan if this is the first use.
    pub fn plan_codec<T: Structure>(&self) -> EncodingResult<Codec<T>> {
        let (slot, is_new) = self.slot::<T>()?;
        if is_new {
            self.build(&slot)?;
        }
        Ok(Codec::plan(slot))
    }

    /// Returns the finished plan for the structure `T`, building it or waiting for another thread
    /// to finish building it.
    pub fn published_plan<T: Structure>(&self) -> EncodingResult<Arc<Plan<T>>> {
        let (slot, is_new) = self.slot::<T>()?;
        if is_new {
            self.build(&slot)
        } else {
            slot.plan()
        }
    }

    /// Tests if a plan for `T` has been built.
    pub fn contains<T: Structure>(&self) -> bool {
        let plans = trace_read_lock!(self.plans);
        plans
            .get(&TypeId::of::<T>())
            .and_then(|slot| slot.clone().downcast::<PlanSlot<T>>().ok())
            .map(|slot| slot.is_published())
            .unwrap_or(false)
    }

    /// Number of plans this cache has built
    pub fn plans_built(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }

    fn slot<T: Structure>(&self) -> EncodingResult<(Arc<PlanSlot<T>>, bool)> {
        let key = TypeId::of::<T>();
        {
            let plans = trace_read_lock!(self.plans);
            if let Some(slot) = plans.get(&key) {
                return Self::downcast_slot(slot.clone()).map(|slot| (slot, false));
            }
        }
        let mut plans = trace_write_lock!(self.plans);
        // Somebody may have inserted the slot between the read and write lock
        if let Some(slot) = plans.get(&key) {
            return Self::downcast_slot(slot.clone()).map(|slot| (slot, false));
        }
        let slot = Arc::new(PlanSlot::<T>::new());
        plans.insert(key, slot.clone());
        Ok((slot, true))
    }

    fn downcast_slot<T: Structure>(
        slot: Arc<dyn Any + Send + Sync>,
    ) -> EncodingResult<Arc<PlanSlot<T>>> {
        slot.downcast::<PlanSlot<T>>()
            .map_err(|_| EncodingError::unsupported_type::<T>("plan cache entry has the wrong type"))
    }

    fn build<T: Structure>(&self, slot: &PlanSlot<T>) -> PlanResult<T> {
        trace!("Building encoding plan for {}", full_type_name::<T>());
        self.builds.fetch_add(1, Ordering::SeqCst);
        let mut builder = PlanBuilder::new(self);
        let result = match T::describe(&mut builder) {
            Ok(_) => Ok(Arc::new(builder.finish())),
            Err(err) => {
                error!(
                    "Cannot build encoding plan for {}, {}",
                    full_type_name::<T>(),
                    err
                );
                Err(err.with_type_name(short_type_name::<T>()))
            }
        };
        slot.publish(result.clone());
        result
    }
}
