/*
 * diagnostic.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Structured diagnostics translated from engine error payloads.
//!
//! The engine reports failures as a key-value document. Some engines write
//! that document with `=>` between keys and values instead of `:`; the
//! separator is normalized before parsing. The fixed fields (`message`,
//! `type`, `filename`, `line`, `column`, `extract`) are projected into typed
//! accessors and every reported key stays reachable through
//! [`Diagnostic::get`].

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde_json::Value;
use thiserror::Error;

/// A requested diagnostic field was never reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("diagnostic has no field '{0}'")]
pub struct MissingField(pub String);

/// Classification of the engine's `type` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticType {
    /// Input the grammar does not recognize.
    Syntax,
    Parse,
    /// Undefined variable or mixin.
    Name,
    /// An `@import` that could not be resolved or read.
    File,
    Argument,
    Operation,
    Other(String),
}

impl DiagnosticType {
    pub fn as_str(&self) -> &str {
        match self {
            DiagnosticType::Syntax => "Syntax",
            DiagnosticType::Parse => "Parse",
            DiagnosticType::Name => "Name",
            DiagnosticType::File => "File",
            DiagnosticType::Argument => "Argument",
            DiagnosticType::Operation => "Operation",
            DiagnosticType::Other(other) => other,
        }
    }
}

impl FromStr for DiagnosticType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "Syntax" => DiagnosticType::Syntax,
            "Parse" => DiagnosticType::Parse,
            "Name" => DiagnosticType::Name,
            "File" => DiagnosticType::File,
            "Argument" => DiagnosticType::Argument,
            "Operation" => DiagnosticType::Operation,
            other => DiagnosticType::Other(other.to_string()),
        })
    }
}

impl fmt::Display for DiagnosticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A source-located compilation failure reported by the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    message: String,
    error_type: String,
    filename: Option<String>,
    line: Option<u64>,
    column: Option<u64>,
    extract: Vec<Option<String>>,
    details: IndexMap<String, Value>,
}

impl Diagnostic {
    /// Translate an engine error payload.
    ///
    /// Fails when the payload is not a key-value document even after
    /// separator normalization.
    pub fn translate(payload: &str) -> Result<Self, serde_json::Error> {
        let normalized = normalize_separators(payload);
        let details: IndexMap<String, Value> = serde_json::from_str(&normalized)?;
        Ok(Self::from_details(details))
    }

    /// Build a diagnostic from an already parsed document.
    pub fn from_details(details: IndexMap<String, Value>) -> Self {
        let text = |key: &str| details.get(key).and_then(Value::as_str).map(str::to_owned);
        let number = |key: &str| details.get(key).and_then(Value::as_u64);

        let extract = match details.get("extract") {
            Some(Value::Array(lines)) => lines
                .iter()
                .map(|line| line.as_str().map(str::to_owned))
                .collect(),
            _ => Vec::new(),
        };

        let diagnostic = Self {
            message: text("message").unwrap_or_default(),
            error_type: text("type").unwrap_or_default(),
            filename: text("filename"),
            line: number("line"),
            column: number("column"),
            extract,
            details,
        };
        tracing::debug!(
            error_type = %diagnostic.error_type,
            filename = ?diagnostic.filename,
            line = ?diagnostic.line,
            "translated engine diagnostic"
        );
        diagnostic
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The engine's `type` field as reported, e.g. `"Name"`.
    pub fn error_type(&self) -> &str {
        &self.error_type
    }

    pub fn kind(&self) -> DiagnosticType {
        match self.error_type.parse() {
            Ok(kind) => kind,
            Err(never) => match never {},
        }
    }

    /// File the failure occurred in. For failures inside an import this is
    /// the imported file's resolved path.
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// 1-based line.
    pub fn line(&self) -> Option<u64> {
        self.line
    }

    /// 0-based column within [`Diagnostic::line`].
    pub fn column(&self) -> Option<u64> {
        self.column
    }

    /// Up to three source lines around the failure: the line before, the
    /// offending line, and the line after. Lines outside the file are `None`.
    pub fn extract(&self) -> &[Option<String>] {
        &self.extract
    }

    /// Look up any reported field by name.
    ///
    /// A field the engine reported as `null` is returned as
    /// [`Value::Null`]; a field it never reported is a [`MissingField`].
    pub fn get(&self, key: &str) -> Result<&Value, MissingField> {
        self.details
            .get(key)
            .ok_or_else(|| MissingField(key.to_string()))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.details.contains_key(key)
    }

    /// Reported field names, in reported order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.details.keys().map(String::as_str)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(filename) = &self.filename {
            write!(f, "{filename}")?;
            if let Some(line) = self.line {
                write!(f, ":{line}")?;
                if let Some(column) = self.column {
                    write!(f, ":{column}")?;
                }
            }
            write!(f, ": ")?;
        }
        if !self.error_type.is_empty() {
            write!(f, "{}Error: ", self.error_type)?;
        }
        f.write_str(&self.message)
    }
}

/// Replace `=>` separators outside string literals with `:`.
pub fn normalize_separators(payload: &str) -> String {
    let mut out = String::with_capacity(payload.len());
    let mut chars = payload.chars().peekable();
    let mut in_string = false;
    let mut escaped = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            '=' if chars.peek() == Some(&'>') => {
                chars.next();
                out.push(':');
            }
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAME_ERROR: &str = r#"{"message":"variable @a is undefined","type":"Name","filename":"foo.less","index":97,"line":6,"column":19,"callLine":null,"callExtract":null,"extract":["          .bar {","            color: @a;","          }"]}"#;

    #[test]
    fn test_translate_projects_fixed_fields() {
        let d = Diagnostic::translate(NAME_ERROR).unwrap();
        assert_eq!(d.message(), "variable @a is undefined");
        assert_eq!(d.error_type(), "Name");
        assert_eq!(d.kind(), DiagnosticType::Name);
        assert_eq!(d.filename(), Some("foo.less"));
        assert_eq!(d.line(), Some(6));
        assert_eq!(d.column(), Some(19));
        assert_eq!(
            d.extract(),
            &[
                Some("          .bar {".to_string()),
                Some("            color: @a;".to_string()),
                Some("          }".to_string()),
            ]
        );
    }

    #[test]
    fn test_hash_rocket_payload() {
        let payload = r#"{"message"=>"Unrecognised input", "type"=>"Parse", "line"=>1, "column"=>0, "extract"=>[null, "{^)", null]}"#;
        let d = Diagnostic::translate(payload).unwrap();
        assert_eq!(d.message(), "Unrecognised input");
        assert_eq!(d.kind(), DiagnosticType::Parse);
        assert_eq!(d.line(), Some(1));
        assert_eq!(d.extract(), &[None, Some("{^)".to_string()), None]);
    }

    #[test]
    fn test_separator_inside_strings_is_preserved() {
        let payload = r#"{"message"=>"expected => here, got \"=>\""}"#;
        assert_eq!(
            normalize_separators(payload),
            r#"{"message":"expected => here, got \"=>\""}"#
        );
        let d = Diagnostic::translate(payload).unwrap();
        assert_eq!(d.message(), r#"expected => here, got "=>""#);
    }

    #[test]
    fn test_extra_fields_by_name() {
        let d = Diagnostic::translate(NAME_ERROR).unwrap();
        assert_eq!(d.get("index").unwrap(), &Value::from(97));
        assert_eq!(d.get("callLine").unwrap(), &Value::Null);
        assert!(d.contains("callExtract"));
    }

    #[test]
    fn test_absent_field_is_an_error() {
        let d = Diagnostic::translate(NAME_ERROR).unwrap();
        assert_eq!(d.get("nope"), Err(MissingField("nope".to_string())));
        assert_eq!(
            d.get("nope").unwrap_err().to_string(),
            "diagnostic has no field 'nope'"
        );
    }

    #[test]
    fn test_keys_keep_reported_order() {
        let d = Diagnostic::translate(NAME_ERROR).unwrap();
        let keys: Vec<&str> = d.keys().collect();
        assert_eq!(
            keys,
            vec![
                "message",
                "type",
                "filename",
                "index",
                "line",
                "column",
                "callLine",
                "callExtract",
                "extract"
            ]
        );
    }

    #[test]
    fn test_sparse_payload() {
        let d = Diagnostic::translate(r#"{"message":"Cannot find module 'less'","code":"MODULE_NOT_FOUND"}"#)
            .unwrap();
        assert_eq!(d.error_type(), "");
        assert_eq!(d.filename(), None);
        assert_eq!(d.line(), None);
        assert!(d.extract().is_empty());
        assert_eq!(d.get("code").unwrap(), "MODULE_NOT_FOUND");
        assert!(d.get("type").is_err());
    }

    #[test]
    fn test_non_document_payload_fails() {
        assert!(Diagnostic::translate("boom").is_err());
        assert!(Diagnostic::translate("[1, 2]").is_err());
    }

    #[test]
    fn test_display_with_location() {
        let d = Diagnostic::translate(NAME_ERROR).unwrap();
        assert_eq!(d.to_string(), "foo.less:6:19: NameError: variable @a is undefined");
    }

    #[test]
    fn test_unknown_type_is_other() {
        assert_eq!(
            "Custom".parse::<DiagnosticType>().unwrap(),
            DiagnosticType::Other("Custom".to_string())
        );
        assert_eq!(DiagnosticType::File.to_string(), "File");
    }
}
