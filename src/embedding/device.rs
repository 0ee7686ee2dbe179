use candle_core::Device;

#[cfg(any(feature = "metal", feature = "cuda"))]
use tracing::{info, warn};

#[cfg(not(any(feature = "metal", feature = "cuda")))]
use tracing::debug;

use super::error::EmbeddingError;

/// Picks the inference device: Metal, then CUDA (when compiled in), else CPU.
pub fn select_device() -> Result<Device, EmbeddingError> {
    #[cfg(any(feature = "metal", feature = "cuda"))]
    let mut failures: Vec<String> = Vec::new();

    #[cfg(feature = "metal")]
    match Device::new_metal(0) {
        Ok(device) => {
            info!("Encoder using Metal GPU");
            return Ok(device);
        }
        Err(e) => {
            warn!(error = %e, "Metal device unavailable");
            failures.push(format!("metal: {e}"));
        }
    }

    #[cfg(feature = "cuda")]
    match Device::new_cuda(0) {
        Ok(device) => {
            info!("Encoder using CUDA GPU");
            return Ok(device);
        }
        Err(e) => {
            warn!(error = %e, "CUDA device unavailable");
            failures.push(format!("cuda: {e}"));
        }
    }

    #[cfg(any(feature = "metal", feature = "cuda"))]
    warn!(reason = %failures.join("; "), "Falling back to CPU device");

    #[cfg(not(any(feature = "metal", feature = "cuda")))]
    debug!("No GPU backend compiled, using CPU device");

    Ok(Device::Cpu)
}
