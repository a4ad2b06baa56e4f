use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Paths {
    pub base: PathBuf,
}

impl Paths {
    pub fn new() -> Self {
        let base = dirs::home_dir()
            .map(|h| h.join(".synapse"))
            .unwrap_or_else(|| PathBuf::from(".synapse"));
        Self { base }
    }

    pub fn with_base(base: PathBuf) -> Self {
        Self { base }
    }

    pub fn config_file(&self) -> PathBuf {
        self.base.join("config.json")
    }

    /// CLI-side snapshot of the in-process memory store.
    pub fn memory_file(&self) -> PathBuf {
        self.base.join("memory.json")
    }

    /// CLI-side snapshot of the task registry.
    pub fn tasks_file(&self) -> PathBuf {
        self.base.join("tasks.json")
    }

    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.base)?;
        Ok(())
    }
}

impl Default for Paths {
    fn default() -> Self {
        Self::new()
    }
}
