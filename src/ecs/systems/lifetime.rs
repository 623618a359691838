use crate::ecs::components::Lifetime;
use crate::world::PetWorld;

/// Count down effect lifetimes and despawn the expired ones.
pub fn expire(world: &mut PetWorld, dt: f32) {
    let mut expired = Vec::new();
    for (e, life) in world.ecs.query_mut::<&mut Lifetime>() {
        life.0 -= dt;
        if life.0 <= 0.0 {
            expired.push(e);
        }
    }
    for e in expired {
        let _ = world.ecs.despawn(e);
    }
}
