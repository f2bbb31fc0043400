//! Type-erased container for initialized feature slices.

use std::any::{Any, TypeId};
use std::fmt::Debug;

/// State owned by one feature slice, shared by every request the slice serves.
pub trait FeatureSlice: Any + Debug + Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    fn as_any(&self) -> &dyn Any;
}

#[derive(Debug)]
pub struct InitializedSlice {
    pub id: TypeId,
    pub state: Box<dyn FeatureSlice>,
}

impl InitializedSlice {
    pub fn new<T: FeatureSlice>(state: T) -> Self {
        Self { id: TypeId::of::<T>(), state: Box::new(state) }
    }

    pub fn name(&self) -> &'static str {
        self.state.name()
    }

    pub fn downcast<T: FeatureSlice>(&self) -> Option<&T> {
        self.state.as_any().downcast_ref::<T>()
    }
}
