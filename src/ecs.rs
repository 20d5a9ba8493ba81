//! Per-frame driver: one `bevy_ecs` schedule advances the oscillator and every
//! registered animated value, in a fixed order, once per tick.

use crate::animation::{AnimationRegistry, ElementId, PropertyWrite};
use crate::events::EventBus;
use crate::oscillation::OscillatingRotation;
use crate::tween::Easing;
use bevy_ecs::prelude::{Res, ResMut, Resource, Schedule, World};
use bevy_ecs::schedule::IntoSystemConfigs;

#[derive(Resource, Clone, Copy, Default)]
pub struct TimeDelta(pub f32);

/// Mirror of the idle detector's output for this frame.
#[derive(Resource, Clone, Copy, Default)]
pub struct InteractionSignal {
    pub interacting: bool,
}

/// The element whose Y rotation follows the oscillator while idle.
#[derive(Resource, Clone)]
pub struct PivotBinding(pub ElementId);

#[derive(Resource, Default)]
pub struct PropertyWrites(pub Vec<PropertyWrite>);

pub fn sys_oscillate_pivot(
    dt: Res<TimeDelta>,
    signal: Res<InteractionSignal>,
    pivot: Res<PivotBinding>,
    mut rotation: ResMut<OscillatingRotation>,
    mut registry: ResMut<AnimationRegistry>,
) {
    let angle = rotation.advance(dt.0, signal.interacting);
    if signal.interacting {
        return;
    }
    if let Some(channels) = registry.get_mut(&pivot.0) {
        channels.rotation_y.set_target(angle);
    }
}

pub fn sys_drive_tweens(
    dt: Res<TimeDelta>,
    mut registry: ResMut<AnimationRegistry>,
    mut writes: ResMut<PropertyWrites>,
) {
    let frame_writes = registry.step(dt.0);
    writes.0.extend(frame_writes);
}

pub struct FrameWorld {
    pub world: World,
    schedule: Schedule,
}

impl FrameWorld {
    pub fn new(rotation: OscillatingRotation, pivot: ElementId, easing: Easing) -> Self {
        let mut world = World::new();
        world.insert_resource(TimeDelta(0.0));
        world.insert_resource(InteractionSignal::default());
        world.insert_resource(PivotBinding(pivot));
        world.insert_resource(rotation);
        world.insert_resource(AnimationRegistry::new(easing));
        world.insert_resource(PropertyWrites::default());
        world.insert_resource(EventBus::default());

        let mut schedule = Schedule::default();
        schedule.add_systems((sys_oscillate_pivot, sys_drive_tweens).chain());
        Self { world, schedule }
    }

    /// Runs one frame and returns the property writes it produced.
    pub fn update(&mut self, dt: f32, interacting: bool) -> Vec<PropertyWrite> {
        self.world.resource_mut::<TimeDelta>().0 = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.world.resource_mut::<InteractionSignal>().interacting = interacting;
        self.schedule.run(&mut self.world);
        std::mem::take(&mut self.world.resource_mut::<PropertyWrites>().0)
    }

    pub fn registry(&self) -> &AnimationRegistry {
        self.world.resource::<AnimationRegistry>()
    }

    pub fn registry_mut(&mut self) -> bevy_ecs::world::Mut<'_, AnimationRegistry> {
        self.world.resource_mut::<AnimationRegistry>()
    }

    pub fn rotation(&self) -> &OscillatingRotation {
        self.world.resource::<OscillatingRotation>()
    }

    pub fn events_mut(&mut self) -> bevy_ecs::world::Mut<'_, EventBus> {
        self.world.resource_mut::<EventBus>()
    }

    pub fn drain_events(&mut self) -> Vec<crate::events::DeckEvent> {
        self.events_mut().drain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{PropertyValue, VisualSpec};

    #[test]
    fn pivot_follows_oscillator_only_while_idle() {
        let pivot = ElementId::new("scene/pivot");
        let mut frame = FrameWorld::new(OscillatingRotation::default(), pivot.clone(), Easing::default());
        frame.registry_mut().ensure(&pivot, &VisualSpec::default());

        let writes = frame.update(0.5, false);
        assert!(writes.iter().any(|w| w.element == pivot && matches!(w.value, PropertyValue::RotationY(_))));
        let target = frame.registry().get(&pivot).expect("pivot").rotation_y.target();
        assert!(target > 0.0);

        let phase = frame.rotation().phase();
        frame.update(0.5, true);
        assert_eq!(frame.rotation().phase(), phase);
        assert_eq!(frame.registry().get(&pivot).expect("pivot").rotation_y.target(), target);
    }
}
