use std::sync::Arc;

use crate::application::responses::ResponseService;

#[derive(Clone)]
pub struct AppState {
    pub responses: Arc<ResponseService>,
}
