//! Code symbols as returned by the symbol extractor
//!
//! The extractor speaks ctags: kinds are free-form parser-specific strings and
//! locations are a 1-based line plus the search pattern ctags would use to find
//! the definition. [`Symbol::from_raw`] turns such a record into an addressable
//! symbol with an LSP-style kind and a 0-based range.

use serde::{Deserialize, Serialize};

use crate::repo::{CommitId, RepositoryRef};

/// Kind of symbol, following the LSP symbol kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SymbolKind {
    File,
    Module,
    Namespace,
    Package,
    Class,
    Method,
    Property,
    Field,
    Constructor,
    Enum,
    Interface,
    Function,
    Variable,
    Constant,
    String,
    Number,
    Boolean,
    Array,
    Object,
    Key,
    Null,
    EnumMember,
    Struct,
    Event,
    Operator,
    TypeParameter,
    /// Kind the extractor reported but we could not classify
    #[default]
    Unknown,
}

impl SymbolKind {
    /// Map a ctags kind name to a symbol kind
    ///
    /// Ctags kinds are determined by the language parser and do not in general
    /// match LSP kinds, so several names collapse into one kind.
    pub fn from_ctags(kind: &str) -> Self {
        match kind {
            "file" => Self::File,
            "module" => Self::Module,
            "namespace" => Self::Namespace,
            "package" | "packageName" | "subprogspec" => Self::Package,
            "class" | "type" | "service" | "typedef" | "union" | "section" | "subtype"
            | "component" => Self::Class,
            "method" | "methodSpec" => Self::Method,
            "property" => Self::Property,
            "field" | "member" | "anonMember" => Self::Field,
            "constructor" => Self::Constructor,
            "enum" | "enumerator" => Self::Enum,
            "interface" => Self::Interface,
            "function" | "func" | "subroutine" | "macro" | "subprogram" | "procedure"
            | "command" | "singletonMethod" => Self::Function,
            "variable" | "var" | "functionVar" | "define" | "alias" => Self::Variable,
            "constant" | "const" => Self::Constant,
            "string" | "message" | "heredoc" => Self::String,
            "number" => Self::Number,
            "bool" | "boolean" => Self::Boolean,
            "array" => Self::Array,
            "object" | "literal" | "map" => Self::Object,
            "key" | "label" | "target" | "selector" | "id" | "tag" => Self::Key,
            "null" => Self::Null,
            "enum member" | "enumConstant" => Self::EnumMember,
            "struct" => Self::Struct,
            "event" => Self::Event,
            "operator" => Self::Operator,
            "type parameter" | "annotation" => Self::TypeParameter,
            _ => {
                tracing::debug!("Unknown ctags kind: {}", kind);
                Self::Unknown
            }
        }
    }

    /// Upper-case name as exposed to API clients
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::File => "FILE",
            Self::Module => "MODULE",
            Self::Namespace => "NAMESPACE",
            Self::Package => "PACKAGE",
            Self::Class => "CLASS",
            Self::Method => "METHOD",
            Self::Property => "PROPERTY",
            Self::Field => "FIELD",
            Self::Constructor => "CONSTRUCTOR",
            Self::Enum => "ENUM",
            Self::Interface => "INTERFACE",
            Self::Function => "FUNCTION",
            Self::Variable => "VARIABLE",
            Self::Constant => "CONSTANT",
            Self::String => "STRING",
            Self::Number => "NUMBER",
            Self::Boolean => "BOOLEAN",
            Self::Array => "ARRAY",
            Self::Object => "OBJECT",
            Self::Key => "KEY",
            Self::Null => "NULL",
            Self::EnumMember => "ENUMMEMBER",
            Self::Struct => "STRUCT",
            Self::Event => "EVENT",
            Self::Operator => "OPERATOR",
            Self::TypeParameter => "TYPEPARAMETER",
            Self::Unknown => "UNKNOWN",
        }
    }
}

/// Zero-based line/character position
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

/// Half-open range between two positions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

/// One symbol record as produced by the extractor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSymbol {
    pub name: String,
    pub path: String,
    /// 1-based line number
    pub line: u32,
    /// ctags kind name
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub parent: String,
    #[serde(default)]
    pub parent_kind: String,
    /// ctags search pattern, e.g. `/^func main() {$/`
    #[serde(default)]
    pub pattern: String,
    /// Only visible within its defining file
    #[serde(default)]
    pub file_limited: bool,
}

impl RawSymbol {
    /// Guess the symbol's column from its ctags search pattern
    ///
    /// ctags only reports a line, so the column is where the name first
    /// occurs in the pattern, or 0 when it cannot be found.
    pub fn character(&self) -> u32 {
        if self.pattern.is_empty() {
            return 0;
        }
        let pattern = self.pattern.strip_prefix("/^").unwrap_or(&self.pattern);
        pattern
            .find(&self.name)
            .map(|i| u32::try_from(i).unwrap_or(0))
            .unwrap_or(0)
    }

    /// Range covering the symbol name
    pub fn range(&self) -> Range {
        let character = self.character();
        let line = self.line.saturating_sub(1);
        let len = u32::try_from(self.name.len()).unwrap_or(u32::MAX);
        Range {
            start: Position { line, character },
            end: Position {
                line,
                character: character.saturating_add(len),
            },
        }
    }
}

/// An addressable symbol inside one repository revision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_name: Option<String>,
    pub kind: SymbolKind,
    /// Lower-cased language name
    pub language: String,
    pub path: String,
    pub range: Range,
    pub repo: RepositoryRef,
    pub commit: CommitId,
    /// Relevant only within its defining file
    pub file_local: bool,
}

impl Symbol {
    pub fn from_raw(raw: RawSymbol, repo: &RepositoryRef, commit: &CommitId) -> Self {
        let range = raw.range();
        let container_name = if raw.parent.is_empty() {
            None
        } else {
            Some(raw.parent)
        };
        Self {
            kind: SymbolKind::from_ctags(&raw.kind),
            language: raw.language.to_lowercase(),
            name: raw.name,
            container_name,
            path: raw.path,
            range,
            repo: repo.clone(),
            commit: commit.clone(),
            file_local: raw.file_limited,
        }
    }
}
