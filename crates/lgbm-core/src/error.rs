use crate::handle_map::Handle;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("{kind} handle not found: {handle}")]
    HandleNotFound { kind: &'static str, handle: Handle },

    #[error("{kind} handle {handle} was released (slot now at generation {current})")]
    StaleHandle {
        kind: &'static str,
        handle: Handle,
        current: u32,
    },

    #[error("invalid parameter string: {0}")]
    InvalidParameter(String),

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
