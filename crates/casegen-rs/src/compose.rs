//! Instruction composition from named fragments.
//!
//! [`InstructionBuilder`] collects fragments in order and [`Instruction::text`]
//! joins them with blank lines. Empty fragments are skipped, so conditional
//! context (frameworks, supplementary items) disappears cleanly when absent.
//! Fragments keep their names, which lets tests assert on one fragment at a
//! time instead of searching the whole instruction.
//!
//! # Example
//!
//! ```
//! use casegen_rs::compose::InstructionBuilder;
//!
//! let instruction = InstructionBuilder::new()
//!     .fragment("intro", "Generate a section.")
//!     .fragment_if(false, "frameworks", || "Follow the Green Book.".into())
//!     .fragment_opt("params", Some("Location: Oxford"))
//!     .build();
//!
//! assert!(instruction.has("intro"));
//! assert!(!instruction.has("frameworks"));
//! assert_eq!(instruction.text(), "Generate a section.\n\nLocation: Oxford");
//! ```

/// One named piece of an instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub name: &'static str,
    pub text: String,
}

/// Builder for multi-fragment instructions.
#[derive(Debug, Default)]
pub struct InstructionBuilder {
    fragments: Vec<Fragment>,
}

impl InstructionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a named fragment. Skipped if `text` is empty.
    pub fn fragment(mut self, name: &'static str, text: impl Into<String>) -> Self {
        let text = text.into();
        if !text.is_empty() {
            self.fragments.push(Fragment { name, text });
        }
        self
    }

    /// Conditionally append a fragment.
    ///
    /// The `text_fn` is only called when `condition` is true.
    pub fn fragment_if(
        self,
        condition: bool,
        name: &'static str,
        text_fn: impl FnOnce() -> String,
    ) -> Self {
        if condition {
            self.fragment(name, text_fn())
        } else {
            self
        }
    }

    /// Append a fragment only if the text is `Some`.
    pub fn fragment_opt(self, name: &'static str, text: Option<impl Into<String>>) -> Self {
        match text {
            Some(t) => self.fragment(name, t),
            None => self,
        }
    }

    pub fn build(self) -> Instruction {
        Instruction {
            fragments: self.fragments,
        }
    }
}

/// An assembled instruction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Instruction {
    fragments: Vec<Fragment>,
}

impl Instruction {
    /// All fragments joined with double newlines.
    pub fn text(&self) -> String {
        self.fragments
            .iter()
            .map(|f| f.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    /// Text of the first fragment with this name.
    pub fn fragment(&self, name: &str) -> Option<&str> {
        self.fragments
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.text.as_str())
    }

    pub fn has(&self, name: &str) -> bool {
        self.fragment(name).is_some()
    }

    /// Fragment names in order.
    pub fn names(&self) -> Vec<&'static str> {
        self.fragments.iter().map(|f| f.name).collect()
    }
}

impl From<&str> for Instruction {
    fn from(text: &str) -> Self {
        InstructionBuilder::new().fragment("text", text).build()
    }
}
