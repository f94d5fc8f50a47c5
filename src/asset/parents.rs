//! Resolved dependencies handed to [`Asset::generate`].

use std::collections::HashMap;

use crate::asset::{Asset, AssetId, GraphError, TypedAsset};

/// Read-only view over the already-resolved dependencies of one asset.
///
/// Only dependencies the asset declared are visible; reaching for anything
/// else is an [`GraphError::UndeclaredDependency`].
pub struct Parents<'a> {
    owner: &'a str,
    declared: &'a [AssetId],
    resolved: &'a HashMap<AssetId, Box<dyn Asset>>,
}

impl<'a> Parents<'a> {
    pub(crate) fn new(
        owner: &'a str,
        declared: &'a [AssetId],
        resolved: &'a HashMap<AssetId, Box<dyn Asset>>,
    ) -> Self {
        Parents {
            owner,
            declared,
            resolved,
        }
    }

    /// Get a dependency by type.
    pub fn get<T: TypedAsset>(&self) -> Result<&'a T, GraphError> {
        self.get_dyn(T::ID)?
            .as_any()
            .downcast_ref::<T>()
            .ok_or_else(|| GraphError::TypeMismatch {
                id: T::ID,
                expected: std::any::type_name::<T>(),
            })
    }

    /// Get a dependency by id.
    pub fn get_dyn(&self, id: AssetId) -> Result<&'a dyn Asset, GraphError> {
        if !self.declared.contains(&id) {
            return Err(GraphError::UndeclaredDependency {
                asset: self.owner.to_string(),
                dependency: id,
            });
        }

        self.resolved
            .get(&id)
            .map(|asset| asset.as_ref())
            .ok_or(GraphError::NotResolved { id })
    }

    /// Declared dependency ids, in declaration order.
    pub fn declared(&self) -> &'a [AssetId] {
        self.declared
    }
}
