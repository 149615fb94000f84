/// How the finished file reaches its destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Write a temporary file next to the destination and rename it into
    /// place once complete.
    #[default]
    Atomic,
    /// Truncate and write the destination directly.
    Direct,
}

#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Application named in the file header.
    pub host_app: String,
    pub write_mode: WriteMode,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            host_app: "Blender".to_string(),
            write_mode: WriteMode::Atomic,
        }
    }
}
