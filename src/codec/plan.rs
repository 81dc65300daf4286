// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2022 Adam Lock

//! Plans describe how a structure is written: its fields, in declaration order, each bound to the
//! codec of the field's type.

use std::{
    sync::Arc,
    thread::{self, ThreadId},
};

use arc_swap::ArcSwapOption;

use crate::{
    codec::{Codec, CodecKind, DecodeStream, Encodable, EncodeStream, PlanCache, ValueCodec},
    sync::{Condvar, Mutex},
    types::encoding::*,
};

type EncodeStep<T> = Arc<dyn Fn(&T, &mut EncodeStream<'_>) -> EncodingResult<()> + Send + Sync>;
type DecodeStep<T> = Arc<dyn Fn(&mut T, &mut DecodeStream<'_>) -> EncodingResult<()> + Send + Sync>;

/// A structure the walker encodes field by field. The fields are described once per plan cache by
/// `describe`, which is normally generated by `ua_struct!`.
pub trait Structure: Default + Send + Sync + 'static {
    /// Adds the fields of the structure to the plan in the order they appear on the wire.
    fn describe(plan: &mut PlanBuilder<'_, Self>) -> EncodingResult<()>;
}

#[derive(Derivative)]
#[derivative(Clone(bound = ""), Debug(bound = ""))]
struct Step<T: 'static> {
    name: &'static str,
    kind: CodecKind,
    #[derivative(Debug = "ignore")]
    encode: EncodeStep<T>,
    #[derivative(Debug = "ignore")]
    decode: DecodeStep<T>,
}

/// The compiled description of one structure. Immutable once built.
#[derive(Derivative)]
#[derivative(Debug(bound = ""))]
pub struct Plan<T: 'static> {
    type_name: String,
    steps: Vec<Step<T>>,
}

impl<T: 'static> Plan<T> {
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// The fields of the plan in wire order
    pub fn field_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.name).collect()
    }

    /// The kind of codec bound to each field, in wire order
    pub fn field_kinds(&self) -> Vec<CodecKind> {
        self.steps.iter().map(|s| s.kind).collect()
    }

    pub fn encode(&self, value: &T, stream: &mut EncodeStream<'_>) -> EncodingResult<()> {
        for step in &self.steps {
            (step.encode)(value, stream).map_err(|e| e.at_field(step.name))?;
        }
        Ok(())
    }
}

impl<T: Default + 'static> Plan<T> {
    pub fn decode(&self, stream: &mut DecodeStream<'_>) -> EncodingResult<T> {
        let mut value = T::default();
        self.decode_into(&mut value, stream)?;
        Ok(value)
    }

    pub fn decode_into(&self, value: &mut T, stream: &mut DecodeStream<'_>) -> EncodingResult<()> {
        for step in &self.steps {
            (step.decode)(value, stream).map_err(|e| e.at_field(step.name))?;
        }
        Ok(())
    }
}

/// Collects the fields of a structure while its plan is being built.
pub struct PlanBuilder<'c, T: 'static> {
    plans: &'c PlanCache,
    steps: Vec<Step<T>>,
}

impl<'c, T: Structure> PlanBuilder<'c, T> {
    pub(crate) fn new(plans: &'c PlanCache) -> Self {
        Self {
            plans,
            steps: Vec::new(),
        }
    }

    /// Appends a field. `get` and `get_mut` select the field from the structure.
    pub fn field<F: Encodable>(
        &mut self,
        name: &'static str,
        get: fn(&T) -> &F,
        get_mut: fn(&mut T) -> &mut F,
    ) -> EncodingResult<&mut Self> {
        let codec = self.plans.resolve::<F>().map_err(|e| e.at_field(name))?;
        let kind = codec.kind();
        let decoder = codec.clone();
        self.steps.push(Step {
            name,
            kind,
            encode: Arc::new(move |value: &T, stream: &mut EncodeStream<'_>| {
                codec.encode(get(value), stream)
            }),
            decode: Arc::new(move |value: &mut T, stream: &mut DecodeStream<'_>| {
                *get_mut(value) = decoder.decode(stream)?;
                Ok(())
            }),
        });
        Ok(self)
    }

    /// Splices the fields of an embedded structure into this one at the current position, so the
    /// embedded fields are written as if they were declared here.
    pub fn flatten<F: Structure>(
        &mut self,
        get: fn(&T) -> &F,
        get_mut: fn(&mut T) -> &mut F,
    ) -> EncodingResult<&mut Self> {
        let plan = self.plans.published_plan::<F>()?;
        for step in &plan.steps {
            let encode = step.encode.clone();
            let decode = step.decode.clone();
            self.steps.push(Step {
                name: step.name,
                kind: step.kind,
                encode: Arc::new(move |value: &T, stream: &mut EncodeStream<'_>| {
                    encode(get(value), stream)
                }),
                decode: Arc::new(move |value: &mut T, stream: &mut DecodeStream<'_>| {
                    decode(get_mut(value), stream)
                }),
            });
        }
        Ok(self)
    }

    pub fn plans(&self) -> &'c PlanCache {
        self.plans
    }

    pub(crate) fn finish(self) -> Plan<T> {
        Plan {
            type_name: short_type_name::<T>(),
            steps: self.steps,
        }
    }
}

pub(crate) type PlanResult<T> = Result<Arc<Plan<T>>, EncodingError>;

/// Cache entry for one structure. The slot is published in the cache before the plan is built so a
/// structure that refers to itself resolves to the slot, and the plan is filled in once the build
/// finishes. Anyone needing the plan before then waits for it.
pub(crate) struct PlanSlot<T: 'static> {
    plan: ArcSwapOption<PlanResult<T>>,
    builder: ThreadId,
    ready: Mutex<bool>,
    ready_cond: Condvar,
}

impl<T: 'static> PlanSlot<T> {
    pub(crate) fn new() -> Self {
        Self {
            plan: ArcSwapOption::empty(),
            builder: thread::current().id(),
            ready: Mutex::new(false),
            ready_cond: Condvar::new(),
        }
    }

    pub(crate) fn publish(&self, result: PlanResult<T>) {
        self.plan.store(Some(Arc::new(result)));
        let mut ready = trace_lock!(self.ready);
        *ready = true;
        self.ready_cond.notify_all();
    }

    pub(crate) fn is_published(&self) -> bool {
        self.plan.load().is_some()
    }

    /// Returns the plan, waiting for the build to finish if necessary.
    pub(crate) fn plan(&self) -> PlanResult<T> {
        loop {
            if let Some(result) = self.plan.load_full() {
                return (*result).clone();
            }
            if self.builder == thread::current().id() {
                // Only a structure which embeds itself can need its own plan mid build
                return Err(EncodingError::unsupported_type::<T>(
                    "structure requires its own plan while it is being built",
                ));
            }
            let mut ready = trace_lock!(self.ready);
            if !*ready {
                self.ready_cond.wait(&mut ready);
            }
        }
    }
}

/// The codec of a structure. It refers to the cache slot rather than the plan so it can be handed
/// out while the plan is still being built.
pub(crate) struct PlanRef<T: 'static> {
    slot: Arc<PlanSlot<T>>,
}

impl<T: 'static> PlanRef<T> {
    pub(crate) fn new(slot: Arc<PlanSlot<T>>) -> Self {
        Self { slot }
    }
}

impl<T: Structure> ValueCodec<T> for PlanRef<T> {
    fn encode(&self, value: &T, stream: &mut EncodeStream<'_>) -> EncodingResult<()> {
        let plan = self.slot.plan()?;
        plan.encode(value, stream)
    }

    fn decode(&self, stream: &mut DecodeStream<'_>) -> EncodingResult<T> {
        let plan = self.slot.plan()?;
        stream.descend(|stream| plan.decode(stream))
    }
}

impl<T: Structure> Codec<T> {
    pub(crate) fn plan(slot: Arc<PlanSlot<T>>) -> Codec<T> {
        Codec::new(CodecKind::Plan, Arc::new(PlanRef::new(slot)))
    }
}
