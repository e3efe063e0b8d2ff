use std::sync::Arc;

use crate::notify::NotificationHub;
use crate::persistence::OrderStore;
use crate::queue::JobQueue;
use crate::services::OrderService;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<OrderService>,
    pub store: Arc<dyn OrderStore>,
    pub queue: Arc<JobQueue>,
    pub hub: Arc<NotificationHub>,
}
