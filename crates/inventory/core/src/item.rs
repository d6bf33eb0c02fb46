//! Item descriptions and container key derivation.
//!
//! [`ItemDescriptor`] is the immutable-per-instance description of an item
//! kind. Containers are ordinary items whose `kind` is
//! [`ItemKind::Container`]; their persisted contents are looked up through a
//! [`ContainerKey`] derived from the item id, so the same physical bag maps
//! to the same record no matter how often it is dropped and picked back up.

use core::fmt;

/// Stable identifier for an item kind, unique across the catalog.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// An empty id marks the default descriptor used for cleared slots.
    pub fn is_valid(&self) -> bool {
        !self.0.is_empty()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for ItemId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Broad item category.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ItemKind {
    #[default]
    General,
    Equipment,
    Consumable,
    Container,
}

/// Description of an item kind; copied freely into slots.
///
/// `slot_count` and `weight_reduction_percent` are only meaningful when
/// `kind == Container`; other kinds carry them as zero and ignore them.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemDescriptor {
    pub id: ItemId,
    pub display_name: String,
    pub kind: ItemKind,
    /// Weight per unit, >= 0.
    pub weight: f32,
    /// Maximum quantity sharing one slot, >= 1.
    pub max_stack_size: u32,
    /// Number of slots this item offers when opened as a container.
    pub slot_count: usize,
    /// Percentage (0-100) by which this container reduces the weight of its
    /// contents. Carried as data; the aggregation formula does not apply it.
    pub weight_reduction_percent: f32,
}

impl ItemDescriptor {
    pub fn new(
        id: impl Into<ItemId>,
        display_name: impl Into<String>,
        kind: ItemKind,
        weight: f32,
        max_stack_size: u32,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            kind,
            weight,
            max_stack_size,
            slot_count: 0,
            weight_reduction_percent: 0.0,
        }
    }

    /// Builds a container descriptor with the given slot count.
    pub fn container(
        id: impl Into<ItemId>,
        display_name: impl Into<String>,
        weight: f32,
        slot_count: usize,
        weight_reduction_percent: f32,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            kind: ItemKind::Container,
            weight,
            max_stack_size: 1,
            slot_count,
            weight_reduction_percent,
        }
    }

    pub fn is_container(&self) -> bool {
        self.kind == ItemKind::Container
    }

    /// Multiplier the container's reduction would apply to contents weight.
    pub fn contents_weight_factor(&self) -> f32 {
        1.0 - (self.weight_reduction_percent / 100.0).clamp(0.0, 1.0)
    }
}

impl From<ItemId> for ItemDescriptor {
    fn from(id: ItemId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }
}

/// Stable lookup key for a container's persisted contents.
///
/// Derived deterministically from the owning item's id (`"Bag_" + id`). The
/// prefix doubles as a shape check on the registry read path: keys that do
/// not look like container keys are rejected before lookup.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContainerKey(String);

impl ContainerKey {
    pub const PREFIX: &'static str = "Bag_";

    /// Derives the key for a container-type item.
    pub fn for_item(id: &ItemId) -> Self {
        Self(format!("{}{}", Self::PREFIX, id))
    }

    /// Parses an externally supplied key without shape validation.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Sanity check that this looks like a derived container key.
    pub fn is_well_formed(&self) -> bool {
        self.0.len() > Self::PREFIX.len() && self.0.starts_with(Self::PREFIX)
    }
}

impl fmt::Display for ContainerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_derivation_is_deterministic() {
        let id = ItemId::new("bag1");
        assert_eq!(ContainerKey::for_item(&id), ContainerKey::for_item(&id));
        assert_eq!(ContainerKey::for_item(&id).as_str(), "Bag_bag1");
    }

    #[test]
    fn key_shape_validation() {
        assert!(ContainerKey::for_item(&ItemId::new("bag1")).is_well_formed());
        assert!(!ContainerKey::from_raw("bag1").is_well_formed());
        assert!(!ContainerKey::from_raw("Bag_").is_well_formed());
        assert!(!ContainerKey::from_raw("").is_well_formed());
    }

    #[test]
    fn default_descriptor_is_invalid() {
        let descriptor = ItemDescriptor::default();
        assert!(!descriptor.id.is_valid());
        assert!(!descriptor.is_container());
    }

    #[test]
    fn weight_reduction_factor_clamps() {
        let mut bag = ItemDescriptor::container("bag1", "Bag", 2.0, 8, 25.0);
        assert!((bag.contents_weight_factor() - 0.75).abs() < f32::EPSILON);
        bag.weight_reduction_percent = 250.0;
        assert_eq!(bag.contents_weight_factor(), 0.0);
    }
}
