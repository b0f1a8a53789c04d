use clap::Args;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::ocr::default_models_dir;

/// Default upload limit (10MB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Where to find the recognition models
#[derive(Args, Debug, Clone, Default)]
pub struct ModelArgs {
    /// Directory holding text-detection.rten and text-recognition.rten
    /// (defaults to ~/.cache/ocrs)
    #[arg(long, env = "OCRS_MODELS_DIR", value_name = "DIR")]
    pub models_dir: Option<PathBuf>,
}

impl ModelArgs {
    pub fn resolve(&self) -> anyhow::Result<PathBuf> {
        match &self.models_dir {
            Some(dir) => Ok(dir.clone()),
            None => default_models_dir(),
        }
    }
}

/// HTTP server settings
#[derive(Args, Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, env = "METER_READER_ADDR", default_value = "0.0.0.0:8000")]
    pub addr: SocketAddr,

    /// Largest accepted upload in bytes
    #[arg(long, env = "METER_READER_MAX_UPLOAD_BYTES", default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    pub max_upload_bytes: usize,

    #[command(flatten)]
    pub models: ModelArgs,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            models: ModelArgs::default(),
        }
    }
}
