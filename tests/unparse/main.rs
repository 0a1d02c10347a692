use std::fs;
use std::path::PathBuf;

use insta::{Settings, assert_snapshot};
use mtail_unparse::tree::Tree;
use mtail_unparse::{NodeId, Program, UnparseOptions};

const FIXTURES: &[&str] = &[
    "counter_by_host",
    "add_assign",
    "pattern_slash",
    "cond_next",
    "del_expiry",
    "declarations",
    "linecount",
    "decorators",
    "typed",
    "malformed",
];

fn load(name: &str) -> (Program, NodeId) {
    let path: PathBuf = [env!("CARGO_MANIFEST_DIR"), "tests", "unparse", "test-data"]
        .iter()
        .collect::<PathBuf>()
        .join(format!("{name}.json"));
    let contents = fs::read_to_string(&path)
        .map_err(|e| format!("could not read `{}` to string: {e}", path.display()))
        .unwrap();
    let tree: Tree = serde_json::from_str(&contents)
        .map_err(|e| format!("could not decode `{}`: {e}", path.display()))
        .unwrap();

    let mut program = Program::new();
    let root = program.insert_tree(tree);

    (program, root)
}

fn check(name: &str, options: UnparseOptions) {
    let (program, root) = load(name);
    let output = program.unparse_with(root, options);

    let mut settings = Settings::clone_current();
    settings.set_omit_expression(true);
    settings.set_prepend_module_to_snapshot(false);
    settings.set_description(format!(
        "Input file: test-data/{name}.json{}",
        if options.emit_types { " (with types)" } else { "" },
    ));
    let _guard = settings.bind_to_scope();

    assert!(output.ends_with('\n'), "{name}: {output:?}");
    assert_snapshot!(name, output);
}

#[test]
fn counter_by_host() {
    check("counter_by_host", UnparseOptions::default());
}

#[test]
fn add_assign() {
    check("add_assign", UnparseOptions::default());
}

#[test]
fn pattern_slash() {
    check("pattern_slash", UnparseOptions::default());
}

#[test]
fn cond_next() {
    check("cond_next", UnparseOptions::default());
}

#[test]
fn del_expiry() {
    check("del_expiry", UnparseOptions::default());
}

#[test]
fn declarations() {
    check("declarations", UnparseOptions::default());
}

#[test]
fn linecount() {
    check("linecount", UnparseOptions::default());
}

#[test]
fn decorators() {
    check("decorators", UnparseOptions::default());
}

#[test]
fn typed() {
    check("typed", UnparseOptions { emit_types: true });
}

#[test]
fn malformed() {
    check("malformed", UnparseOptions::default());
}

#[test]
fn unparse_is_deterministic() {
    for name in FIXTURES {
        let (program, root) = load(name);

        for options in [UnparseOptions::default(), UnparseOptions { emit_types: true }] {
            assert_eq!(
                program.unparse_with(root, options),
                program.clone().unparse_with(root, options),
                "{name}",
            );
        }
    }
}

#[test]
fn blocks_are_balanced() {
    for name in FIXTURES {
        let (program, root) = load(name);
        let output = program.unparse(root);
        let mut depth = 0;

        for line in output.lines() {
            let trimmed = line.trim_start_matches(' ');

            if trimmed.starts_with('}') {
                depth -= 1;
            }

            assert_eq!(line.len() - trimmed.len(), 2 * depth, "{name}: {line:?}");

            if trimmed.ends_with('{') {
                depth += 1;
            }
        }

        assert_eq!(depth, 0, "{name}");
    }
}

#[test]
fn type_annotations_are_balanced() {
    // an unexpected unary operator drops its operand, so not every node is wrapped.
    for name in FIXTURES.iter().filter(|&&name| name != "malformed") {
        let (program, root) = load(name);
        let output = program.unparse_with(root, UnparseOptions { emit_types: true });

        assert_eq!(
            output.matches('(').count(),
            output.matches(')').count(),
            "{name}",
        );
        assert_eq!(
            output.matches(">(").count(),
            program.nodes.len(),
            "{name}",
        );
    }
}
