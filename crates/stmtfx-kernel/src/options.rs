//! Emission settings and the requested output name.

use regex::Regex;
use std::path::PathBuf;
use std::sync::OnceLock;

/// Line terminator written after every generated line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnding {
    Lf,
    CrLf,
}

impl LineEnding {
    /// The platform's natural line ending.
    pub fn native() -> Self {
        if cfg!(windows) { Self::CrLf } else { Self::Lf }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
        }
    }
}

impl Default for LineEnding {
    fn default() -> Self {
        Self::native()
    }
}

impl std::str::FromStr for LineEnding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lf" => Ok(Self::Lf),
            "crlf" => Ok(Self::CrLf),
            _ => Err(format!("Invalid EOL option '{s}'")),
        }
    }
}

/// One level of indentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Indent {
    #[default]
    Tab,
    Spaces(usize),
}

impl Indent {
    pub fn render(self) -> String {
        match self {
            Self::Tab => "\t".to_string(),
            Self::Spaces(width) => " ".repeat(width),
        }
    }
}

/// Kind of container the generated callables are declared in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StructKind {
    #[default]
    Interface,
    Class,
    FinalClass,
    AbstractClass,
    Trait,
}

impl StructKind {
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Interface => "interface",
            Self::Class => "class",
            Self::FinalClass => "final class",
            Self::AbstractClass => "abstract class",
            Self::Trait => "trait",
        }
    }
}

impl std::str::FromStr for StructKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.to_ascii_lowercase().replace([' ', '_'], "-");
        match normalized.as_str() {
            "interface" => Ok(Self::Interface),
            "class" => Ok(Self::Class),
            "final-class" | "final" => Ok(Self::FinalClass),
            "abstract-class" | "abstract" => Ok(Self::AbstractClass),
            "trait" => Ok(Self::Trait),
            _ => Err(format!(
                "unknown struct kind `{s}`: expected interface, class, final-class, abstract-class or trait"
            )),
        }
    }
}

/// Everything that shapes the generated text besides the declarations.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EmitOptions {
    /// Stripped from the front of generated method names.
    pub prefix: String,
    pub line_ending: LineEnding,
    pub indent: Indent,
    pub structure: StructKind,
}

fn segment_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("segment regex must compile"))
}

/// A namespaced output name such as `Vendor\Plugin\Queries`.
///
/// Segments may be separated by `\` or `.`; the last segment names the
/// generated container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputName {
    segments: Vec<String>,
}

impl OutputName {
    pub fn parse(raw: &str) -> Result<Self, String> {
        let segments: Vec<String> = raw.split(['\\', '.']).map(str::to_string).collect();
        if segments.iter().any(|segment| !segment_re().is_match(segment)) {
            return Err(format!("{raw}: Invalid FQN"));
        }
        Ok(Self { segments })
    }

    /// The namespace, if the name has more than one segment.
    pub fn namespace(&self) -> Option<String> {
        match self.segments.split_last() {
            Some((_, parents)) if !parents.is_empty() => Some(parents.join("\\")),
            _ => None,
        }
    }

    pub fn container(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    /// Artifact path relative to the output directory.
    pub fn relative_path(&self) -> PathBuf {
        let mut path: PathBuf = self.segments.iter().collect();
        path.set_extension("php");
        path
    }
}

impl std::fmt::Display for OutputName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.segments.join("\\"))
    }
}
