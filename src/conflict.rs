//! Physical-feasibility pass over timed items.
//!
//! Walks timed items in `(priority, start)` order and pushes any item that
//! starts before the previous one ends plus travel time plus a buffer.
//! Pushes cascade left to right. Running the pass on its own output changes
//! nothing.

use chrono::Duration;
use tracing::debug;

use crate::model::{Schedule, ScheduleItem, TravelMode};
use crate::travel::TravelTimeEstimator;

pub struct ConflictResolver<'a> {
    estimator: &'a TravelTimeEstimator,
    mode: TravelMode,
    buffer_minutes: i64,
}

impl<'a> ConflictResolver<'a> {
    pub fn new(estimator: &'a TravelTimeEstimator) -> Self {
        Self {
            estimator,
            mode: TravelMode::Transit,
            buffer_minutes: 10,
        }
    }

    pub fn with_mode(mut self, mode: TravelMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_buffer(mut self, buffer_minutes: i64) -> Self {
        self.buffer_minutes = buffer_minutes;
        self
    }

    /// Timed items come back fixed and conflict-free; untimed items stay
    /// flexible and untouched.
    pub fn resolve(&self, schedule: Schedule) -> Schedule {
        let (mut timed, untimed): (Vec<ScheduleItem>, Vec<ScheduleItem>) =
            schedule.into_items().into_iter().partition(ScheduleItem::is_timed);

        timed.sort_by_key(|item| (item.priority, item.start_time));
        for item in &mut timed {
            item.end_time = item.effective_end();
        }

        let mut pushed = 0;
        for index in 1..timed.len() {
            let travel = self
                .estimator
                .estimate(&timed[index - 1].location, &timed[index].location, self.mode);
            let required = Duration::minutes(i64::from(travel) + self.buffer_minutes);
            let (Some(previous_end), Some(start)) = (timed[index - 1].end_time, timed[index].start_time)
            else {
                continue;
            };
            if start - previous_end < required {
                timed[index].shift_to(previous_end + required);
                pushed += 1;
            }
        }

        for item in &mut timed {
            item.promote();
        }
        debug!(timed = timed.len(), pushed, "conflicts resolved");

        Schedule::new(timed, untimed)
    }
}
