use std::sync::Arc;

use crate::store::Store;
use crate::workflow::WorkflowService;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub workflow: Arc<WorkflowService>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, workflow: Arc<WorkflowService>) -> Self {
        Self { store, workflow }
    }
}
