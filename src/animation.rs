//! Registry of animated visual properties keyed by element id.
//!
//! One driver steps every entry each frame in id order and reports the
//! properties whose `current` moved, so the renderer only receives writes for
//! nodes that actually changed.

use crate::tween::{AnimatedValue, Easing};
use bevy_ecs::prelude::Resource;
use glam::{Vec3, Vec4};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementId(Arc<str>);

impl ElementId {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(Arc::from(id.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PropertyValue {
    Translation(Vec3),
    RotationY(f32),
    Scale(Vec3),
    Color(Vec4),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyWrite {
    pub element: ElementId,
    pub value: PropertyValue,
}

/// Starting pose and per-channel rates for a registered element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisualSpec {
    pub translation: Vec3,
    pub rotation_y: f32,
    pub scale: Vec3,
    pub color: Vec4,
    pub translation_rate: f32,
    pub rotation_rate: f32,
    pub scale_rate: f32,
    pub color_rate: f32,
}

impl Default for VisualSpec {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation_y: 0.0,
            scale: Vec3::ONE,
            color: Vec4::ONE,
            translation_rate: 8.0,
            rotation_rate: 4.0,
            scale_rate: 10.0,
            color_rate: 10.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct VisualChannels {
    pub translation: AnimatedValue<Vec3>,
    pub rotation_y: AnimatedValue<f32>,
    pub scale: AnimatedValue<Vec3>,
    pub color: AnimatedValue<Vec4>,
}

impl VisualChannels {
    pub fn new(spec: &VisualSpec, easing: Easing) -> Self {
        Self {
            translation: AnimatedValue::new(spec.translation, spec.translation_rate).with_easing(easing),
            rotation_y: AnimatedValue::new(spec.rotation_y, spec.rotation_rate).with_easing(easing),
            scale: AnimatedValue::new(spec.scale, spec.scale_rate).with_easing(easing),
            color: AnimatedValue::new(spec.color, spec.color_rate).with_easing(easing),
        }
    }

    fn step(&mut self, id: &ElementId, dt: f32, writes: &mut Vec<PropertyWrite>) {
        if self.translation.step(dt) {
            writes.push(PropertyWrite {
                element: id.clone(),
                value: PropertyValue::Translation(self.translation.current()),
            });
        }
        if self.rotation_y.step(dt) {
            writes.push(PropertyWrite {
                element: id.clone(),
                value: PropertyValue::RotationY(self.rotation_y.current()),
            });
        }
        if self.scale.step(dt) {
            writes.push(PropertyWrite { element: id.clone(), value: PropertyValue::Scale(self.scale.current()) });
        }
        if self.color.step(dt) {
            writes.push(PropertyWrite { element: id.clone(), value: PropertyValue::Color(self.color.current()) });
        }
    }

    pub fn is_settled(&self) -> bool {
        self.translation.is_settled()
            && self.rotation_y.is_settled()
            && self.scale.is_settled()
            && self.color.is_settled()
    }
}

#[derive(Debug, Default, Resource)]
pub struct AnimationRegistry {
    entries: BTreeMap<ElementId, VisualChannels>,
    easing: Easing,
}

impl AnimationRegistry {
    pub fn new(easing: Easing) -> Self {
        Self { entries: BTreeMap::new(), easing }
    }

    /// Registers `id` at its starting pose, or keeps the existing entry so a
    /// re-composed element carries on from where it is.
    pub fn ensure(&mut self, id: &ElementId, spec: &VisualSpec) -> &mut VisualChannels {
        let easing = self.easing;
        self.entries.entry(id.clone()).or_insert_with(|| VisualChannels::new(spec, easing))
    }

    pub fn get(&self, id: &ElementId) -> Option<&VisualChannels> {
        self.entries.get(id)
    }

    pub fn get_mut(&mut self, id: &ElementId) -> Option<&mut VisualChannels> {
        self.entries.get_mut(id)
    }

    pub fn contains(&self, id: &ElementId) -> bool {
        self.entries.contains_key(id)
    }

    /// Drops every entry whose id is not kept.
    pub fn retain(&mut self, mut keep: impl FnMut(&ElementId) -> bool) {
        self.entries.retain(|id, _| keep(id));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn all_settled(&self) -> bool {
        self.entries.values().all(VisualChannels::is_settled)
    }

    pub fn step(&mut self, dt: f32) -> Vec<PropertyWrite> {
        let mut writes = Vec::new();
        for (id, channels) in self.entries.iter_mut() {
            channels.step(id, dt, &mut writes);
        }
        writes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_keeps_existing_state() {
        let mut registry = AnimationRegistry::default();
        let id = ElementId::new("bar/hiring/0");
        registry.ensure(&id, &VisualSpec::default()).scale.set_target(Vec3::new(1.0, 4.0, 1.0));
        registry.step(0.05);
        let mid = registry.get(&id).expect("registered").scale.current();
        let again = registry.ensure(&id, &VisualSpec { scale: Vec3::ZERO, ..VisualSpec::default() });
        assert_eq!(again.scale.current(), mid);
    }

    #[test]
    fn writes_only_for_moving_channels_in_id_order() {
        let mut registry = AnimationRegistry::default();
        let b = ElementId::new("b");
        let a = ElementId::new("a");
        registry.ensure(&b, &VisualSpec::default()).color.set_target(Vec4::ZERO);
        registry.ensure(&a, &VisualSpec::default()).rotation_y.set_target(1.0);
        let writes = registry.step(0.016);
        assert_eq!(writes.len(), 2);
        assert_eq!(writes[0].element, a);
        assert!(matches!(writes[0].value, PropertyValue::RotationY(_)));
        assert_eq!(writes[1].element, b);
        assert!(matches!(writes[1].value, PropertyValue::Color(_)));
    }

    #[test]
    fn retain_prunes_entries() {
        let mut registry = AnimationRegistry::default();
        registry.ensure(&ElementId::new("keep"), &VisualSpec::default());
        registry.ensure(&ElementId::new("drop"), &VisualSpec::default());
        registry.retain(|id| id.as_str() == "keep");
        assert_eq!(registry.len(), 1);
        assert!(registry.contains(&ElementId::new("keep")));
    }
}
