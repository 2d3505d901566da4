//! Async drivers for transit, cooldown, and start-countdown timers.
//!
//! Each driver is a small task that sleeps between steps and feeds
//! commands back into the owning room's queue. Drivers never touch board
//! state themselves: the room applies each tick against the board, which
//! is where cancellation is decided (stale epoch or disabled board means
//! the tick is dropped). On top of that the room aborts these tasks when
//! the board disables, so a canceled progression emits no further ticks
//! and never its completion.

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::AbortHandle;
use tokio::time::{interval, sleep, Duration, MissedTickBehavior};

use chess_engine::constants::START_WAIT_SECS;
use chess_engine::{PieceId, Progression, TransitOrder};

use crate::room::RoomCommand;

/// Drives one piece transit: a progress tick per step, then completion.
pub(crate) fn spawn_transit(
    tx: UnboundedSender<RoomCommand>,
    order: TransitOrder,
    epoch: u64,
) -> AbortHandle {
    let plan = Progression::transit(order.from, order.to);
    tokio::spawn(async move {
        let mut clock = interval(plan.period());
        clock.set_missed_tick_behavior(MissedTickBehavior::Delay);
        clock.tick().await; // the first tick completes immediately

        for ratio in plan.ratios() {
            clock.tick().await;
            let tick = RoomCommand::TransitTick {
                id: order.id.clone(),
                from: order.from,
                to: order.to,
                ratio,
                epoch,
            };
            if tx.send(tick).is_err() {
                return; // room is gone
            }
        }
        let _ = tx.send(RoomCommand::TransitDone {
            id: order.id,
            to: order.to,
            epoch,
        });
    })
    .abort_handle()
}

/// Drives one post-move cooldown: remaining-time ticks, then completion.
pub(crate) fn spawn_cooldown(
    tx: UnboundedSender<RoomCommand>,
    id: PieceId,
    epoch: u64,
) -> AbortHandle {
    let plan = Progression::cooldown();
    tokio::spawn(async move {
        let mut clock = interval(plan.period());
        clock.set_missed_tick_behavior(MissedTickBehavior::Delay);
        clock.tick().await;

        for ratio in plan.ratios() {
            clock.tick().await;
            let remaining = 1.0 - ratio;
            if remaining <= 0.0 {
                break;
            }
            let tick = RoomCommand::CooldownTick {
                id: id.clone(),
                remaining,
                epoch,
            };
            if tx.send(tick).is_err() {
                return;
            }
        }
        let _ = tx.send(RoomCommand::CooldownDone { id, epoch });
    })
    .abort_handle()
}

/// Fires once when the start countdown elapses.
pub(crate) fn spawn_countdown(tx: UnboundedSender<RoomCommand>, epoch: u64) -> AbortHandle {
    tokio::spawn(async move {
        sleep(Duration::from_secs(START_WAIT_SECS)).await;
        let _ = tx.send(RoomCommand::CountdownElapsed { epoch });
    })
    .abort_handle()
}
