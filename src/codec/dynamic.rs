// OPCUA for Rust
// SPDX-License-Identifier: MPL-2.0
// Copyright (C) 2017-2022 Adam Lock

//! Values whose concrete type is only known at runtime, i.e. decoded through a registry.

use std::{any::Any, fmt};

/// A value of any registered type. Implemented for every type that is cloneable, comparable and
/// debuggable, so registered types need nothing extra.
pub trait DynamicValue: Any + Send + Sync + fmt::Debug {
    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;

    fn type_name(&self) -> &'static str;

    fn clone_box(&self) -> Box<dyn DynamicValue>;

    fn dyn_eq(&self, other: &dyn DynamicValue) -> bool;
}

impl<T> DynamicValue for T
where
    T: Any + Send + Sync + fmt::Debug + Clone + PartialEq,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn clone_box(&self) -> Box<dyn DynamicValue> {
        Box::new(self.clone())
    }

    fn dyn_eq(&self, other: &dyn DynamicValue) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .map_or(false, |other| self == other)
    }
}

impl dyn DynamicValue {
    pub fn is<T: Any>(&self) -> bool {
        self.as_any().is::<T>()
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }

    /// Converts the boxed value into `T`, or `None` if it holds another type.
    pub fn downcast<T: Any>(self: Box<Self>) -> Option<Box<T>> {
        self.into_any().downcast::<T>().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downcast_and_compare() {
        let a: Box<dyn DynamicValue> = Box::new(42u32);
        let b = a.clone_box();
        assert!(a.dyn_eq(b.as_ref()));
        assert!(a.is::<u32>());
        assert_eq!(a.downcast_ref::<u32>(), Some(&42));
        assert!(a.downcast_ref::<i32>().is_none());

        let c: Box<dyn DynamicValue> = Box::new(String::from("42"));
        assert!(!a.dyn_eq(c.as_ref()));

        assert!(c.clone_box().downcast::<u32>().is_none());
        assert_eq!(*c.downcast::<String>().unwrap(), "42");
    }
}
