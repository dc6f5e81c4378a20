use bevy::log::info;
use bevy::prelude::World;
use bits_helpers::RibbitMessageHandler;
use ribbit_bits::{BitDuration, BitResult};

use crate::core::{DropRecord, ResetScene};

#[derive(Default, Clone, Copy)]
pub struct Masky;

impl RibbitMessageHandler for Masky {
    fn restart(world: &mut World) {
        info!("Restarting Masky");
        world.send_event(ResetScene);
    }

    fn end(world: &mut World) -> BitResult {
        let Some(record) = world.get_resource::<DropRecord>() else {
            return BitResult::Failure;
        };
        info!("Ending Masky after {} drops", record.drops);

        // Won if the last drop put the mask on the face
        if record.mask_on() {
            BitResult::Success
        } else {
            BitResult::Failure
        }
    }

    fn duration(_world: &mut World) -> BitDuration {
        BitDuration::max_duration()
    }
}
