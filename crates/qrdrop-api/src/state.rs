//! Application state shared by all handlers.
//!
//! Built once at start-up; nothing in it is mutated afterwards.

use std::sync::Arc;

use qrdrop_core::Config;
use qrdrop_storage::Storage;

use crate::services::code_image::CodeRenderer;
use crate::services::signer::UrlSigner;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub storage: Arc<dyn Storage>,
    pub signer: UrlSigner,
    pub renderer: Arc<dyn CodeRenderer>,
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        storage: Arc<dyn Storage>,
        renderer: Arc<dyn CodeRenderer>,
    ) -> Self {
        let signer = UrlSigner::from_config(storage.clone(), &config.storage);
        Self {
            config,
            storage,
            signer,
            renderer,
        }
    }
}
