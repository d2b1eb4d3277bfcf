//! Integration tests for compiling through the less.js engine.
//!
//! These tests require Node.js with the `less` package resolvable (for
//! example `npm install less` in the working directory, or its location in
//! `LESS_LIB_PATH`). They are marked with `#[ignore]` by default and can be
//! run with:
//!
//! ```sh
//! cargo nextest run -p less-bridge --run-ignored all
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use less_bridge::{Defaults, DiagnosticType, LessError, Options, ParseError, Parser};

fn fixtures() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn fixture_dir(name: &str) -> PathBuf {
    fixtures().join(name)
}

/// Parser on private defaults, or `None` when Node.js or the `less` package
/// is unavailable. Any other failure is a test failure.
fn parser_on(defaults: Arc<Defaults>, options: Options) -> Option<Parser> {
    match Parser::with_defaults(defaults, options) {
        Ok(parser) => Some(parser),
        Err(LessError::EngineCompile(e)) => {
            eprintln!("Less engine not available ({}), skipping test", e);
            None
        }
        Err(other) => panic!("unexpected construction failure: {:?}", other),
    }
}

fn parser(options: Options) -> Option<Parser> {
    parser_on(Arc::new(Defaults::new()), options)
}

fn load_path_options() -> Options {
    Options::new().with_paths([
        fixture_dir("one"),
        fixture_dir("two"),
        fixture_dir("faulty"),
    ])
}

fn squash(css: &str) -> String {
    css.replace('\n', "")
}

fn expect_parse_error(result: less_bridge::Result<less_bridge::ParseOutput>) -> ParseError {
    match result {
        Err(LessError::Parse(err)) => err,
        Err(other) => panic!("expected a parse error, got {:?}", other),
        Ok(output) => panic!("expected a parse error, got css {:?}", output.css()),
    }
}

// ============================================================================
// Simple usage
// ============================================================================

#[test]
#[ignore = "requires node with the less package"]
fn test_parse_less_into_css() {
    let Some(parser) = parser(Options::new()) else { return };
    let output = parser.parse(".class {width: 1+1}", &Options::new()).unwrap();
    assert_eq!(squash(output.css()), ".class {  width: 2;}");
    assert!(output.imports().is_empty());
}

#[test]
#[ignore = "requires node with the less package"]
fn test_accepts_options_when_parsing() {
    let Some(parser) = parser(Options::new()) else { return };
    let output = parser
        .parse(".class {width: 1px+1px;}", &Options::new().with_compress(true))
        .unwrap();
    assert_eq!(output.css().trim(), ".class{width:2px}");
}

#[test]
#[ignore = "requires node with the less package"]
fn test_passes_engine_errors() {
    let Some(parser) = parser(Options::new()) else { return };
    let err = expect_parse_error(parser.parse("body { color: @a; }", &Options::new()));
    assert!(err.to_string().contains("variable @a is undefined"));
    assert_eq!(err.kind(), DiagnosticType::Name);
}

#[test]
#[ignore = "requires node with the less package"]
fn test_passes_error_details() {
    let Some(parser) = parser(Options::new()) else { return };
    let source = "        body {
          .foo {
            color: red;
          }
          .bar {
            color: @a;
          }
        }
";
    let err = expect_parse_error(parser.parse(source, &Options::new().with_filename("foo.less")));

    assert_eq!(err.message(), "variable @a is undefined");
    assert_eq!(err.error_type(), "Name");
    assert_eq!(err.filename(), Some("foo.less"));
    assert_eq!(err.line(), Some(6));
    assert_eq!(err.column(), Some(19));
    assert_eq!(
        err.extract(),
        &[
            Some("          .bar {".to_string()),
            Some("            color: @a;".to_string()),
            Some("          }".to_string()),
        ]
    );
    assert!(err.get("index").is_ok());
    assert!(err.get("not-reported-by-less").is_err());
}

#[test]
#[ignore = "requires node with the less package"]
fn test_bogus_input() {
    let Some(parser) = parser(Options::new()) else { return };
    let err = expect_parse_error(parser.parse("{^)", &Options::new()));
    assert!(
        err.message().contains("Unrecognised input"),
        "unexpected message: {}",
        err.message()
    );
}

#[test]
#[ignore = "requires node with the less package"]
fn test_parse_is_idempotent() {
    let Some(parser) = parser(load_path_options()) else { return };
    let source = "@import \"one.less\";\n.x { width: 1 + 1 }";
    let first = parser.parse(source, &Options::new()).unwrap();
    let second = parser.parse(source, &Options::new()).unwrap();
    assert_eq!(first, second);
}

// ============================================================================
// Multiple load paths
// ============================================================================

#[test]
#[ignore = "requires node with the less package"]
fn test_loads_files_from_each_path() {
    let Some(parser) = parser(load_path_options()) else { return };
    let one = parser.parse("@import \"one.less\";", &Options::new()).unwrap();
    let two = parser.parse("@import \"two.less\";", &Options::new()).unwrap();
    assert_eq!(squash(one.css()).trim(), ".one {  width: 1;}");
    assert_eq!(squash(two.css()).trim(), ".two {  width: 1;}");
}

#[test]
#[ignore = "requires node with the less package"]
fn test_tracks_imported_files() {
    let Some(parser) = parser(load_path_options()) else { return };
    let one = parser.parse("@import \"one.less\";", &Options::new()).unwrap();
    let two = parser.parse("@import \"two.less\";", &Options::new()).unwrap();

    let expected_one = fixture_dir("one").join("one.less");
    let expected_two = fixture_dir("two").join("two.less");
    assert!(one.imports().iter().any(|p| PathBuf::from(p) == expected_one));
    assert!(two.imports().iter().any(|p| PathBuf::from(p) == expected_two));
}

#[test]
#[ignore = "requires node with the less package"]
fn test_reports_location_inside_import() {
    let Some(parser) = parser(load_path_options()) else { return };
    let err = expect_parse_error(parser.parse("@import \"faulty.less\";", &Options::new()));

    assert!(err.message().contains("variable @a is undefined"));
    assert_eq!(err.error_type(), "Name");
    let expected = fixture_dir("faulty").join("faulty.less");
    assert_eq!(err.filename().map(PathBuf::from), Some(expected));
    assert_eq!(err.line(), Some(2));
    assert_eq!(err.column(), Some(9));
}

#[test]
#[ignore = "requires node with the less package"]
fn test_unresolved_import_is_file_error() {
    let Some(parser) = parser(load_path_options()) else { return };
    let err = expect_parse_error(parser.parse("@import \"nowhere.less\";", &Options::new()));
    assert_eq!(err.kind(), DiagnosticType::File);
    assert_eq!(err.line(), Some(1));
}

#[test]
#[ignore = "requires node with the less package"]
fn test_call_paths_replace_construction_paths() {
    let Some(parser) = parser(Options::new().with_paths([fixture_dir("one")])) else { return };
    let err = expect_parse_error(parser.parse(
        "@import \"one.less\";",
        &Options::new().with_paths([fixture_dir("two")]),
    ));
    assert_eq!(err.kind(), DiagnosticType::File);
}

// ============================================================================
// Default load paths
// ============================================================================

#[test]
#[ignore = "requires node with the less package"]
fn test_default_paths_added_after_construction() {
    let defaults = Arc::new(Defaults::new());
    let Some(parser) = parser_on(Arc::clone(&defaults), Options::new()) else { return };

    defaults.push_path(fixture_dir("one"));
    defaults.push_path(fixture_dir("two"));

    let one = parser.parse("@import \"one.less\";", &Options::new()).unwrap();
    let two = parser.parse("@import \"two.less\";", &Options::new()).unwrap();
    assert_eq!(squash(one.css()).trim(), ".one {  width: 1;}");
    assert_eq!(squash(two.css()).trim(), ".two {  width: 1;}");

    defaults.clear_paths();
    let err = expect_parse_error(parser.parse("@import \"one.less\";", &Options::new()));
    assert_eq!(err.kind(), DiagnosticType::File);
}

// ============================================================================
// Custom functions
// ============================================================================

#[test]
#[ignore = "requires node with the less package"]
fn test_custom_functions_are_scoped_to_the_call() {
    let dir = fixture_dir("custom_functions");
    let Some(parser) = parser(Options::new().with_paths([dir.clone()])) else { return };
    let module_path_before = std::env::var_os("NODE_PATH");

    let output = parser
        .parse(
            "@import \"doubled.less\";",
            &Options::new().with_custom_functions(dir.join("custom_functions.js")),
        )
        .unwrap();
    assert!(
        squash(output.css()).contains("width: 8px;"),
        "unexpected css: {}",
        output.css()
    );
    assert_eq!(std::env::var_os("NODE_PATH"), module_path_before);

    // Without the module, `double` is not registered and is emitted verbatim.
    let plain = parser.parse("@import \"doubled.less\";", &Options::new()).unwrap();
    assert!(plain.css().contains("double(4px)"));
}

#[test]
#[ignore = "requires node with the less package"]
fn test_compile_convenience() {
    if parser(Options::new()).is_none() {
        return;
    }
    let css = less_bridge::compile(".a { b: 1 + 2 }", Options::new().with_compress(true)).unwrap();
    assert_eq!(css.trim(), ".a{b:3}");
}
