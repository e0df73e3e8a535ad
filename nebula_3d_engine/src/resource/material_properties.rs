/// Global material properties
///
/// Engine-wide, shader-visible key/value store. Material blueprints read
/// these values without any per-material wiring, e.g. the compositor
/// publishes the current sample count under `GLOBAL_NUMBER_OF_MULTISAMPLES`
/// every frame.

use glam::{Vec2, Vec3, Vec4};
use crate::utils::{MaterialPropertyId, StringId};

/// Name of the property holding the current framebuffer sample count
pub const GLOBAL_NUMBER_OF_MULTISAMPLES: &str = "GlobalNumberOfMultisamples";

/// A typed material property value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MaterialPropertyValue {
    Boolean(bool),
    Integer(i32),
    Float(f32),
    Float2(Vec2),
    Float3(Vec3),
    Float4(Vec4),
}

impl MaterialPropertyValue {
    pub fn as_integer(&self) -> Option<i32> {
        match self {
            MaterialPropertyValue::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            MaterialPropertyValue::Float(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            MaterialPropertyValue::Boolean(value) => Some(*value),
            _ => None,
        }
    }
}

/// Property ID and value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialProperty {
    pub id: MaterialPropertyId,
    pub value: MaterialPropertyValue,
}

/// Properties sorted by ID
#[derive(Debug, Clone, Default)]
pub struct MaterialProperties {
    properties: Vec<MaterialProperty>,
    change_id: u64,
}

impl MaterialProperties {
    pub fn new() -> Self {
        Self::default()
    }

    /// ID of the sample count property
    pub fn global_number_of_multisamples_id() -> MaterialPropertyId {
        StringId::new(GLOBAL_NUMBER_OF_MULTISAMPLES)
    }

    pub fn property_by_id(&self, id: MaterialPropertyId) -> Option<&MaterialPropertyValue> {
        self.properties
            .binary_search_by(|property| property.id.cmp(&id))
            .ok()
            .map(|index| &self.properties[index].value)
    }

    /// Insert or overwrite a property
    ///
    /// Returns `true` if the stored value changed.
    pub fn set_property_by_id(&mut self, id: MaterialPropertyId, value: MaterialPropertyValue) -> bool {
        match self.properties.binary_search_by(|property| property.id.cmp(&id)) {
            Ok(index) => {
                if self.properties[index].value == value {
                    return false;
                }
                self.properties[index].value = value;
            }
            Err(index) => self.properties.insert(index, MaterialProperty { id, value }),
        }
        self.change_id += 1;
        true
    }

    pub fn remove_property_by_id(&mut self, id: MaterialPropertyId) -> Option<MaterialPropertyValue> {
        let index = self.properties.binary_search_by(|property| property.id.cmp(&id)).ok()?;
        self.change_id += 1;
        Some(self.properties.remove(index).value)
    }

    /// Incremented on every effective change, lets consumers skip re-uploads
    pub fn change_id(&self) -> u64 {
        self.change_id
    }

    pub fn properties(&self) -> &[MaterialProperty] {
        &self.properties
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_overwrite() {
        let mut properties = MaterialProperties::new();
        let id = MaterialProperties::global_number_of_multisamples_id();
        assert!(properties.set_property_by_id(id, MaterialPropertyValue::Integer(4)));
        assert!(!properties.set_property_by_id(id, MaterialPropertyValue::Integer(4)));
        assert_eq!(properties.change_id(), 1);

        assert!(properties.set_property_by_id(id, MaterialPropertyValue::Integer(1)));
        assert_eq!(properties.property_by_id(id).and_then(MaterialPropertyValue::as_integer), Some(1));
        assert_eq!(properties.len(), 1);
    }

    #[test]
    fn test_properties_stay_sorted() {
        let mut properties = MaterialProperties::new();
        for name in ["Wetness", "Time", "GlobalNumberOfMultisamples", "Exposure"] {
            properties.set_property_by_id(StringId::new(name), MaterialPropertyValue::Float(1.0));
        }
        let ids: Vec<_> = properties.properties().iter().map(|property| property.id).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);

        assert!(properties.remove_property_by_id(StringId::new("Time")).is_some());
        assert!(properties.property_by_id(StringId::new("Time")).is_none());
        assert_eq!(properties.len(), 3);
    }
}
