/// Compiler registry for mapping configured names to capabilities
pub mod copy;

pub use copy::CopyCompiler;

use crate::bundle::Compiler;
use indexmap::IndexMap;
use std::sync::Arc;

pub struct CompilerRegistry {
    compilers: IndexMap<String, Arc<dyn Compiler>>,
}

impl CompilerRegistry {
    pub fn new() -> Self {
        let mut compilers: IndexMap<String, Arc<dyn Compiler>> = IndexMap::new();
        compilers.insert("copy".to_string(), Arc::new(CopyCompiler));

        Self { compilers }
    }

    /// Register a compiler under a configurable name
    pub fn add_compiler(&mut self, name: impl Into<String>, compiler: Arc<dyn Compiler>) {
        self.compilers.insert(name.into(), compiler);
    }

    pub fn by_name(&self, name: &str) -> Option<Arc<dyn Compiler>> {
        self.compilers.get(name).cloned()
    }
}

impl Default for CompilerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
