use slyvid_client::{AnnotationPlatform, SuperviselyApi};
use slyvid_core::probe::{FfprobeInspector, VideoInspector};

use crate::config::CliConfig;

/// Everything one run needs, created once in `main` and passed by reference.
pub struct RunContext {
    pub config: CliConfig,
    pub platform: Box<dyn AnnotationPlatform>,
    pub inspector: Box<dyn VideoInspector>,
}

impl RunContext {
    /// Production context: HTTP client for the configured server and
    /// `ffprobe` for video inspection.
    pub fn new(config: CliConfig) -> Self {
        let platform = SuperviselyApi::new(config.server_address.clone(), config.api_token.clone());
        Self::with_parts(config, Box::new(platform), Box::new(FfprobeInspector))
    }

    pub fn with_parts(
        config: CliConfig,
        platform: Box<dyn AnnotationPlatform>,
        inspector: Box<dyn VideoInspector>,
    ) -> Self {
        Self {
            config,
            platform,
            inspector,
        }
    }
}
