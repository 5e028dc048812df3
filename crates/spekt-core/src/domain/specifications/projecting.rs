//! Specifications that project into DTOs

use crate::domain::specifications::Specification;
use crate::domain::value_objects::ProjectionDescriptor;
use std::fmt;
use std::marker::PhantomData;

/// A specification plus a projection descriptor, used when the caller wants
/// DTOs of type `D` rather than raw entities.
///
/// The DTO type is carried as a type parameter so the repository's projected
/// fetch stays statically dispatched; no type recovery happens at runtime.
pub struct ProjectingSpecification<E, D> {
    specification: Specification<E>,
    projection: ProjectionDescriptor,
    _dto: PhantomData<fn() -> D>,
}

impl<E, D> ProjectingSpecification<E, D> {
    pub fn new(specification: Specification<E>, projection: ProjectionDescriptor) -> Self {
        Self {
            specification,
            projection,
            _dto: PhantomData,
        }
    }

    pub fn specification(&self) -> &Specification<E> {
        &self.specification
    }

    pub fn projection(&self) -> &ProjectionDescriptor {
        &self.projection
    }
}

impl<E, D> Clone for ProjectingSpecification<E, D> {
    fn clone(&self) -> Self {
        Self {
            specification: self.specification.clone(),
            projection: self.projection.clone(),
            _dto: PhantomData,
        }
    }
}

impl<E, D> fmt::Debug for ProjectingSpecification<E, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectingSpecification")
            .field("specification", &self.specification)
            .field("projection", &self.projection)
            .finish()
    }
}
