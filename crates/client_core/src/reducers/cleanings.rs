use std::collections::HashMap;

use shared::{
    domain::{CleaningId, CleaningJob},
    error::ApiFailure,
};

use crate::events::{LifecycleEvent, Operation, Payload, Phase, StoreEvent};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleaningsState {
    pub is_loading: bool,
    pub is_updating: bool,
    pub error: Option<ApiFailure>,
    pub data: HashMap<CleaningId, CleaningJob>,
    pub current_cleaning_job: Option<CleaningJob>,
    pub active_cleaning_id: Option<CleaningId>,
}

impl CleaningsState {
    fn upsert(&mut self, job: &CleaningJob) {
        if self
            .current_cleaning_job
            .as_ref()
            .is_some_and(|current| current.id == job.id)
        {
            self.current_cleaning_job = Some(job.clone());
        }
        self.data.insert(job.id.clone(), job.clone());
    }

    fn set_in_flight(&mut self, operation: Operation, in_flight: bool) {
        if operation.is_update() {
            self.is_updating = in_flight;
        } else {
            self.is_loading = in_flight;
        }
    }
}

pub fn reduce(state: &mut CleaningsState, event: &StoreEvent) {
    match event {
        StoreEvent::ClearCurrentCleaningJob => {
            state.current_cleaning_job = None;
            state.active_cleaning_id = None;
        }
        StoreEvent::Lifecycle(event) => reduce_lifecycle(state, event),
        StoreEvent::LogUserOut => {}
    }
}

fn reduce_lifecycle(state: &mut CleaningsState, event: &LifecycleEvent) {
    match &event.phase {
        Phase::Request => {
            state.set_in_flight(event.operation, true);
            state.error = None;
        }
        Phase::Failure(error) => {
            state.set_in_flight(event.operation, false);
            state.error = Some(error.clone());
        }
        Phase::Success(payload) => {
            state.set_in_flight(event.operation, false);
            state.error = None;
            match (event.operation, payload) {
                (Operation::FetchCleaningJobById, Payload::CleaningJob(job)) => {
                    state.upsert(job);
                    state.current_cleaning_job = Some(job.clone());
                    state.active_cleaning_id = Some(job.id.clone());
                }
                (_, Payload::CleaningJob(job)) => state.upsert(job),
                (_, Payload::CleaningJobs(jobs)) => {
                    for job in jobs {
                        state.upsert(job);
                    }
                }
                _ => {}
            }
        }
    }
}
