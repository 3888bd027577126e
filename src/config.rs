/// Server configuration, built once in `main` and handed to the router and
/// pipeline explicitly.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    /// Gaussian kernel width applied to every frame.
    pub blur_kernel: usize,
    /// Upper bound for the multipart request body.
    pub max_upload_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            blur_kernel: blur_pipe::blur::DEFAULT_KERNEL,
            max_upload_bytes: 512 * 1024 * 1024,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(addr) = std::env::var("PLATEBLUR_BIND") {
            config.bind_addr = addr;
        }
        config
    }
}
