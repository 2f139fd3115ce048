//! Resource identifiers.

use boreal_common::ResourceKind;

/// Identifies a resource group. `0` is the process-wide cache group holding
/// engine defaults; `0xFFFF` marks "invalid".
pub type ResourceGroupId = u16;

/// The reserved cache group id.
pub const RESOURCE_CACHE_GROUP: ResourceGroupId = 0;

/// The reserved invalid group id.
pub const RESOURCE_GROUP_INVALID: ResourceGroupId = u16::MAX;

/// A compact value identifying one resource inside one group.
///
/// `slot` is dense within the group's per-family arena; `generation` guards
/// against stale ids after a slot is reused. Ids are plain copyable values
/// and own nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceId {
    pub kind: ResourceKind,
    pub slot: u16,
    pub generation: u16,
    pub group: ResourceGroupId,
}

impl ResourceId {
    /// The distinguished invalid id every failed operation returns.
    pub const INVALID: ResourceId = ResourceId {
        kind: ResourceKind::Buffer,
        slot: 0,
        generation: 0,
        group: RESOURCE_GROUP_INVALID,
    };

    pub fn is_valid(&self) -> bool {
        self.group != RESOURCE_GROUP_INVALID
    }
}

impl Default for ResourceId {
    fn default() -> Self {
        Self::INVALID
    }
}
