use crate::interface_adapters::hub::ConnectionHub;
use crate::use_cases::GameService;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    // Every inbound action funnels through the game service.
    pub service: Arc<GameService>,
    // Socket side of the broadcaster the service publishes to.
    pub hub: Arc<ConnectionHub>,
}
