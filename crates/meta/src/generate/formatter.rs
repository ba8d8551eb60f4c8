//! Collect generated Rust source and keep track of indentation.
//!
//! Use [`fmtln`] for lines built from format strings; use the [`Formatter`]
//! methods directly for blocks and doc comments.

static SHIFTWIDTH: usize = 4;

/// Append one formatted line to a [`Formatter`].
macro_rules! fmtln {
    ($fmt:ident, $($args:tt)+) => {
        $fmt.line(format!($($args)+))
    };
}
pub(crate) use fmtln;

/// Generated lines of one artifact body.
#[derive(Default)]
pub struct Formatter {
    indent: usize,
    lines: Vec<String>,
}

impl Formatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increase current indentation level by one.
    pub fn indent_push(&mut self) {
        self.indent += 1;
    }

    /// Decrease indentation by one level.
    pub fn indent_pop(&mut self) {
        assert!(self.indent > 0, "Already at top level indentation");
        self.indent -= 1;
    }

    /// Write all formatting commands in `f` while indented one level.
    pub fn indent<T>(&mut self, f: impl FnOnce(&mut Formatter) -> T) -> T {
        self.indent_push();
        let ret = f(self);
        self.indent_pop();
        ret
    }

    /// Add an indented line.
    pub fn line(&mut self, contents: impl AsRef<str>) {
        let contents = contents.as_ref();
        if contents.is_empty() {
            self.empty_line();
        } else {
            let indent = " ".repeat(self.indent * SHIFTWIDTH);
            self.lines.push(format!("{indent}{contents}\n"));
        }
    }

    /// Push an empty line.
    pub fn empty_line(&mut self) {
        self.lines.push("\n".to_string());
    }

    /// Add a comment line.
    pub fn comment(&mut self, s: impl AsRef<str>) {
        self.line(format!("// {}", s.as_ref()));
    }

    /// Add a `///` doc comment, one line per line of `contents`.
    pub fn doc_comment(&mut self, contents: impl AsRef<str>) {
        for l in contents.as_ref().lines() {
            if l.is_empty() {
                self.line("///");
            } else {
                self.line(format!("/// {l}"));
            }
        }
    }

    /// Add `start {`, the lines written by `f` one level deeper, and `}`.
    pub fn add_block<T>(&mut self, start: &str, f: impl FnOnce(&mut Formatter) -> T) -> T {
        self.line(format!("{start} {{"));
        let ret = self.indent(f);
        self.line("}");
        ret
    }

    /// The collected source text.
    pub fn finish(self) -> String {
        self.lines.concat()
    }
}

/// Join the items of `iter` with `, `.
pub fn comma_join<S: Into<String>>(items: impl Iterator<Item = S>) -> String {
    items.map(Into::into).collect::<Vec<_>>().join(", ")
}
