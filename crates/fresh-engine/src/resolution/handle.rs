use super::engine::LocatorResolver;
use super::result::Resolved;
use crate::backend::Backend;
use fresh_common::protocol::{ElementDescriptor, ElementRef};

/// Lazy handle on "the live element(s) matching a descriptor".
///
/// Holds no page state. Every use re-runs resolution, so a handle taken before
/// a re-render still finds the element afterwards. Creating a handle never
/// fails, even when nothing matches yet.
#[derive(Debug, Clone, Copy)]
pub struct LocatorHandle<'d> {
    descriptor: &'d ElementDescriptor,
    index: usize,
}

impl<'d> LocatorHandle<'d> {
    pub fn new(descriptor: &'d ElementDescriptor) -> Self {
        Self {
            descriptor,
            index: 0,
        }
    }

    /// Narrow to the `index`-th match (document order) of the winning strategy.
    pub fn nth(self, index: usize) -> Self {
        Self { index, ..self }
    }

    pub fn descriptor(&self) -> &'d ElementDescriptor {
        self.descriptor
    }

    pub fn name(&self) -> String {
        if self.index == 0 {
            self.descriptor.name().to_string()
        } else {
            format!("{} #{}", self.descriptor.name(), self.index)
        }
    }

    pub async fn resolve<B: Backend + ?Sized>(&self, backend: &mut B) -> Option<Resolved> {
        LocatorResolver::resolve(self.descriptor, backend).await
    }

    /// The concrete element this handle points at right now, if it exists.
    pub async fn element<B: Backend + ?Sized>(&self, backend: &mut B) -> Option<ElementRef> {
        let resolved = self.resolve(backend).await?;
        (self.index < resolved.count).then(|| resolved.nth(self.index))
    }

    /// Number of live matches of the winning strategy, zero when nothing matches.
    pub async fn count<B: Backend + ?Sized>(&self, backend: &mut B) -> usize {
        self.resolve(backend).await.map(|r| r.count).unwrap_or(0)
    }

    pub fn attempted(&self) -> Vec<String> {
        LocatorResolver::attempted(self.descriptor)
    }
}

impl<'d> From<&'d ElementDescriptor> for LocatorHandle<'d> {
    fn from(descriptor: &'d ElementDescriptor) -> Self {
        LocatorHandle::new(descriptor)
    }
}
