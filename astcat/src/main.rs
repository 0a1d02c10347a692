use std::fmt::{self, Display};
use std::fs;
use std::path::Path;
use std::process::ExitCode;

use args::Command;
use color_eyre::eyre::{Context, Result};
use mtail_unparse::tree::Tree;
use mtail_unparse::{NodeId, Program, UnparseOptions, WithProgram};
use similar::{Change, ChangeTag, TextDiff};
use simplelog::{ColorChoice, ConfigBuilder, LevelFilter, TermLogger, TerminalMode};
use yansi::{Paint, Style};

mod args;

/// How many unchanged lines are printed around each changed region.
const DIFF_CONTEXT_LINES: usize = 2;

/// One side of a diff: the text and the label shown in the header.
struct DiffSide<'a> {
    label: &'a str,
    text: &'a str,
}

struct LineNumber(Option<usize>, usize);

impl Display for LineNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(idx) => write!(f, "{:>width$}", idx + 1, width = self.1),
            None => write!(f, "{:width$}", "", width = self.1),
        }
    }
}

fn line_number_width(text: &str) -> usize {
    text.lines().count().max(1).ilog10() as usize + 1
}

/// Splits a line into its text and its trailing whitespace.
///
/// Indentation left on an otherwise blank line is all trailing whitespace.
fn split_trailing_whitespace(line: &str) -> (&str, &str) {
    let line = line.trim_end_matches('\n');

    line.split_at(line.trim_end().len())
}

fn print_diff(old: DiffSide<'_>, new: DiffSide<'_>) {
    let diff = TextDiff::configure()
        .algorithm(similar::Algorithm::Patience)
        .diff_lines(old.text, new.text);

    let widths = (line_number_width(old.text), line_number_width(new.text));

    println!("{}", format!("--- {}", old.label).red());
    println!("{}", format!("+++ {}", new.label).green());

    for (idx, group) in diff.grouped_ops(DIFF_CONTEXT_LINES).iter().enumerate() {
        if idx > 0 {
            println!("{}", "...".dim());
        }

        for op in group {
            for change in diff.iter_changes(op) {
                print_change(&change, widths);
            }
        }
    }
}

fn print_change(change: &Change<&str>, (old_width, new_width): (usize, usize)) {
    let (sign, style) = match change.tag() {
        ChangeTag::Equal => (' ', Style::new().dim()),
        ChangeTag::Delete => ('-', Style::new().red()),
        ChangeTag::Insert => ('+', Style::new().green()),
    };

    let (text, trailing_ws) = split_trailing_whitespace(change.value());

    println!(
        "{} {} {}{}{}",
        LineNumber(change.old_index(), old_width).paint(style),
        LineNumber(change.new_index(), new_width).paint(style),
        sign.paint(style),
        text.paint(style),
        trailing_ws.paint(style.invert()),
    );
}

fn init_logger(level: LevelFilter) -> Result<()> {
    TermLogger::init(
        level,
        ConfigBuilder::new()
            .set_location_level(LevelFilter::Error)
            .set_time_level(LevelFilter::Off)
            .set_thread_level(LevelFilter::Off)
            .set_target_level(LevelFilter::Off)
            .build(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )
    .context("could not install the logger")
}

fn load_program(path: &Path) -> Result<(Program, NodeId)> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("could not read `{}`", path.display()))?;
    let tree: Tree = serde_json::from_str(&contents)
        .with_context(|| format!("could not decode a syntax tree from `{}`", path.display()))?;

    let mut program = Program::new();
    let root = program.insert_tree(tree);
    log::debug!(
        "loaded {} node(s) from `{}`",
        program.nodes.len(),
        path.display(),
    );

    Ok((program, root))
}

fn unparse(path: &Path, emit_types: bool) -> Result<()> {
    let (program, root) = load_program(path)?;
    print!("{}", program.unparse_with(root, UnparseOptions { emit_types }));

    Ok(())
}

fn dump(path: &Path) -> Result<()> {
    let (program, root) = load_program(path)?;
    let json = serde_json::to_string_pretty(&root.with_program(&program))
        .context("could not encode the syntax tree")?;
    println!("{json}");

    Ok(())
}

fn diff(path: &Path, expected_path: &Path, emit_types: bool) -> Result<ExitCode> {
    let (program, root) = load_program(path)?;
    let expected = fs::read_to_string(expected_path)
        .with_context(|| format!("could not read `{}`", expected_path.display()))?;
    let text = program.unparse_with(root, UnparseOptions { emit_types });

    if text == expected {
        println!("{}", "The texts are equal".bright_green());

        return Ok(ExitCode::SUCCESS);
    }

    println!("{}", "The texts differ!".bright_red());
    print_diff(
        DiffSide {
            label: &expected_path.display().to_string(),
            text: &expected,
        },
        DiffSide {
            label: "unparsed",
            text: &text,
        },
    );

    Ok(ExitCode::FAILURE)
}

fn check_idempotence(path: &Path) -> Result<ExitCode> {
    let (program, root) = load_program(path)?;
    let first = program.unparse(root);
    let second = program.clone().unparse(root);

    if first == second {
        println!("{}", "The outputs are equal".bright_green());

        return Ok(ExitCode::SUCCESS);
    }

    println!("{}", "The outputs differ!".bright_red());
    print_diff(
        DiffSide {
            label: "first run",
            text: &first,
        },
        DiffSide {
            label: "second run",
            text: &second,
        },
    );

    Ok(ExitCode::FAILURE)
}

fn run(args: args::Args) -> Result<ExitCode> {
    init_logger(args.log_level)?;

    match args.command {
        Command::Unparse { path, types } => unparse(&path, types).map(|_| ExitCode::SUCCESS),
        Command::Dump { path } => dump(&path).map(|_| ExitCode::SUCCESS),
        Command::Diff {
            path,
            expected,
            types,
        } => diff(&path, &expected, types),
        Command::CheckIdempotence { path } => check_idempotence(&path),
    }
}

fn main() -> ExitCode {
    if let Err(e) = color_eyre::install() {
        eprintln!("{e:?}");

        return ExitCode::FAILURE;
    }

    match run(args::parse()) {
        Ok(code) => code,

        Err(e) => {
            eprintln!("{e:?}");

            ExitCode::FAILURE
        }
    }
}
