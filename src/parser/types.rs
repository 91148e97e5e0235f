use thiserror::Error;

/// Scan-level failure, carrying a rendered position or reason.
#[derive(Debug, Clone, Error)]
#[error("{detail}")]
pub struct SyntaxError {
    pub detail: String,
}

impl SyntaxError {
    pub(crate) fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

/// One top-level function declaration: its name and its full text, including
/// outer attributes and the doc comments directly above it.
#[derive(Debug, Clone)]
pub struct FunctionDecl {
    pub name: String,
    pub text: String,
}

#[derive(Debug, Clone)]
pub enum Segment {
    Function(FunctionDecl),
    Other(String),
}

impl Segment {
    pub fn text(&self) -> &str {
        match self {
            Segment::Function(decl) => &decl.text,
            Segment::Other(text) => text,
        }
    }
}

/// Structural view of the backing file: the verbatim preamble plus the
/// ordered declaration segments from the first function group onward.
#[derive(Debug, Clone, Default)]
pub struct ModuleOutline {
    pub preamble: String,
    pub segments: Vec<Segment>,
}

impl ModuleOutline {
    pub fn function(&self, name: &str) -> Option<&FunctionDecl> {
        self.segments.iter().find_map(|segment| match segment {
            Segment::Function(decl) if decl.name == name => Some(decl),
            _ => None,
        })
    }

    pub fn function_names(&self) -> Vec<String> {
        self.segments
            .iter()
            .filter_map(|segment| match segment {
                Segment::Function(decl) => Some(decl.name.clone()),
                Segment::Other(_) => None,
            })
            .collect()
    }

    pub fn push_function(&mut self, decl: FunctionDecl) {
        self.segments.push(Segment::Function(decl));
    }

    /// Replace the declaration sharing `decl`'s name, keeping its position.
    /// Returns false when no declaration carries that name.
    pub fn replace_function(&mut self, decl: FunctionDecl) -> bool {
        for segment in &mut self.segments {
            if let Segment::Function(existing) = segment
                && existing.name == decl.name
            {
                *existing = decl;
                return true;
            }
        }
        false
    }

    /// Remove every declaration named `name`; the rest keep relative order.
    /// Returns false when nothing matched.
    pub fn remove_function(&mut self, name: &str) -> bool {
        let before = self.segments.len();
        self.segments
            .retain(|segment| !matches!(segment, Segment::Function(decl) if decl.name == name));
        self.segments.len() != before
    }

    /// Serialize back to file text: preamble verbatim, then each segment
    /// separated by one blank line, with a trailing newline.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let preamble = self.preamble.trim_end();
        if !preamble.is_empty() {
            out.push_str(preamble);
            out.push('\n');
        }
        for segment in &self.segments {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(segment.text());
            out.push('\n');
        }
        out
    }
}
