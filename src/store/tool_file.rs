use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::{debug, info};

use crate::{
    config::StoreConfig,
    error::{Result, ToolsmithError},
    parser::{FunctionDecl, ModuleOutline, SourceScanner},
    store::ToolFunction,
};

/// Synchronous read-parse-mutate-write core over the backing file.
///
/// Every operation re-reads and re-parses the whole file, applies the edit to
/// the in-memory outline, and writes the full rendering back. All validation
/// runs before the write, so a rejected request leaves the file untouched.
pub struct ToolFile {
    path: PathBuf,
    preamble: String,
    scanner: SourceScanner,
}

impl ToolFile {
    pub fn new(config: &StoreConfig) -> Result<Self> {
        Ok(Self {
            path: config.tools_file.clone(),
            preamble: config.preamble.clone(),
            scanner: SourceScanner::new()?,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the backing file with the configured preamble when absent.
    pub fn ensure_exists(&self) -> Result<()> {
        if self.path.exists() {
            return Ok(());
        }
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| {
                ToolsmithError::io(format!("creating directory '{}'", parent.display()), e)
            })?;
        }

        info!(path = %self.path.display(), "initializing backing file");
        let mut preamble = self.preamble.clone();
        if !preamble.is_empty() && !preamble.ends_with('\n') {
            preamble.push('\n');
        }
        fs::write(&self.path, preamble).map_err(|e| {
            ToolsmithError::io(
                format!("initializing backing file '{}'", self.path.display()),
                e,
            )
        })
    }

    pub fn create(&mut self, name: &str, code: &str) -> Result<ToolFunction> {
        let mut outline = self.load()?;
        if outline.function(name).is_some() {
            return Err(ToolsmithError::AlreadyExists {
                name: name.to_string(),
            });
        }
        let decl = self.parse_named(name, code)?;
        outline.push_function(decl.clone());
        self.persist(&outline)?;
        debug!(function_name = %name, "function created");
        Ok(stored(decl))
    }

    pub fn read(&mut self, name: &str) -> Result<ToolFunction> {
        let outline = self.load()?;
        let decl = outline.function(name).ok_or_else(|| not_found(name))?;
        Ok(stored(decl.clone()))
    }

    pub fn list(&mut self) -> Result<Vec<String>> {
        Ok(self.load()?.function_names())
    }

    pub fn update(&mut self, name: &str, code: &str) -> Result<ToolFunction> {
        let mut outline = self.load()?;
        if outline.function(name).is_none() {
            return Err(not_found(name));
        }
        let decl = self.parse_named(name, code)?;
        outline.replace_function(decl.clone());
        self.persist(&outline)?;
        debug!(function_name = %name, "function updated");
        Ok(stored(decl))
    }

    pub fn delete(&mut self, name: &str) -> Result<()> {
        let mut outline = self.load()?;
        if !outline.remove_function(name) {
            return Err(not_found(name));
        }
        self.persist(&outline)?;
        debug!(function_name = %name, "function deleted");
        Ok(())
    }

    /// Parse `code` as a single definition and require its declared name to
    /// match the addressed one. Renaming through update is unsupported;
    /// rename is delete plus create.
    fn parse_named(&mut self, name: &str, code: &str) -> Result<FunctionDecl> {
        let decl = self.scanner.parse_definition(code)?;
        if decl.name != name {
            return Err(ToolsmithError::NameMismatch {
                expected: name.to_string(),
                found: decl.name,
            });
        }
        Ok(decl)
    }

    fn load(&mut self) -> Result<ModuleOutline> {
        let source = fs::read_to_string(&self.path).map_err(|e| {
            ToolsmithError::io(format!("reading backing file '{}'", self.path.display()), e)
        })?;
        self.scanner
            .parse_module(&source)
            .map_err(|e| ToolsmithError::StorageCorrupt {
                path: self.path.clone(),
                detail: e.to_string(),
            })
    }

    fn persist(&self, outline: &ModuleOutline) -> Result<()> {
        fs::write(&self.path, outline.render()).map_err(|e| {
            ToolsmithError::io(format!("writing backing file '{}'", self.path.display()), e)
        })
    }
}

fn stored(decl: FunctionDecl) -> ToolFunction {
    ToolFunction {
        name: decl.name,
        code: decl.text,
    }
}

fn not_found(name: &str) -> ToolsmithError {
    ToolsmithError::NotFound {
        name: name.to_string(),
    }
}
