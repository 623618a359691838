use crate::ecs::capabilities::{movement, scheduler};
use crate::schedule::Task;
use crate::world::PetWorld;

/// Dispatch every task due by now. Tasks scheduled by these callbacks wait
/// for the next tick, even with a zero delay.
pub fn fire_due(world: &mut PetWorld) {
    let mut due = Vec::new();
    while let Some(task) = world.tasks.pop_due() {
        due.push(task);
    }
    for job in due {
        match job.task {
            Task::BehaviorDue => scheduler::on_behavior_due(world, job.entity, job.token),
            Task::BehaviorFinished => scheduler::on_behavior_finished(world, job.entity, job.token),
            Task::SleepReassert => scheduler::on_sleep_reassert(world, job.entity, job.token),
            Task::SpeedBurstEnd => movement::on_burst_end(world, job.entity, job.token),
        }
    }
}
