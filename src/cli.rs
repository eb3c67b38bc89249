use colored::Colorize;
use designquiz::{evaluate, Content, ContentNode, Evaluation, Presentation, QuizKind, QuizRecord};
use log::debug;
use std::collections::BTreeSet;
use std::io::{self, Write};
use text_io::read;

#[derive(Debug, PartialEq)]
pub enum Choice {
    /// Zero-based displayed positions.
    Options(BTreeSet<usize>),
    DontKnow,
    Quit,
}

impl Choice {
    /// Reads `2`, `1 3` or `1,3`; `q` quits and anything else means the
    /// user does not know.
    pub fn from_str(choices_count: usize, input: &str) -> Choice {
        let input = input.trim();
        if input == "q" {
            return Choice::Quit;
        }

        let mut picked = BTreeSet::new();
        for token in input
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|token| !token.is_empty())
        {
            match token.parse::<usize>() {
                Ok(num) if num >= 1 && num <= choices_count => {
                    picked.insert(num - 1);
                }
                Ok(_) => {
                    println!(
                        "{}",
                        format!("There are only {} options available!", choices_count)
                            .bright_red()
                    );
                    return Choice::DontKnow;
                }
                Err(_) => return Choice::DontKnow,
            }
        }

        if picked.is_empty() {
            Choice::DontKnow
        } else {
            Choice::Options(picked)
        }
    }
}

pub fn render_content(content: &Content) -> String {
    let mut out = String::new();
    render_nodes(content.nodes(), &mut out);
    out.trim_end().to_string()
}

fn render_nodes(nodes: &[ContentNode], out: &mut String) {
    for node in nodes {
        match node {
            ContentNode::Text(text) => out.push_str(text),
            ContentNode::Emphasis(inner) => {
                out.push_str(&render_content(inner).bold().to_string());
            }
            ContentNode::Code { source, .. } => {
                if !out.is_empty() && !out.ends_with('\n') {
                    out.push('\n');
                }
                for line in source.lines() {
                    out.push_str(&format!("    {}\n", line.dimmed()));
                }
            }
            ContentNode::List(items) => {
                for item in items {
                    if !out.is_empty() && !out.ends_with('\n') {
                        out.push('\n');
                    }
                    out.push_str(&format!("  • {}", render_content(item)));
                }
                out.push('\n');
            }
        }
    }
}

/// Continuation lines of multi-line content get the same indent as the first.
fn indented(text: &str, indent: &str) -> String {
    text.lines().collect::<Vec<_>>().join(&format!("\n{}", indent))
}

pub fn print_quiz(presentation: &Presentation, leading: &str) {
    let record = presentation.record();
    let indent = " ".repeat(leading.chars().count());
    let hint = match record.kind() {
        QuizKind::Single => "(pick one)",
        QuizKind::Multiple => "(pick all that apply)",
    };
    println!(
        "{}{} {}",
        leading.cyan(),
        indented(&render_content(&record.question), &indent).bold(),
        hint.dimmed()
    );
    for (shown, variant) in presentation.variants() {
        let number = format!("{}. ", shown + 1);
        let inner = " ".repeat(indent.len() + number.len());
        println!(
            "{}{}{}",
            indent,
            number.bold(),
            indented(&render_content(&variant.text), &inner)
        );
    }
}

fn displayed_numbers(presentation: &Presentation, indices: &BTreeSet<usize>) -> String {
    let mut numbers: Vec<usize> = indices
        .iter()
        .filter_map(|&index| presentation.displayed_position(index))
        .map(|shown| shown + 1)
        .collect();
    numbers.sort_unstable();
    numbers
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Prints the verdict and the rationale of every variant that was picked or
/// should have been.
pub fn print_feedback(
    presentation: &Presentation,
    selected: &BTreeSet<usize>,
    evaluation: &Evaluation,
) {
    let record = presentation.record();
    if evaluation.is_correct() {
        println!("{}", "Correct!".bright_green());
    } else {
        println!("{}", "Incorrect!".bright_red());
        if record.correct_answers().is_empty() {
            println!("{}", "None of the options was correct.".green());
        } else {
            println!(
                "{}",
                format!(
                    "The correct choice was {}.",
                    displayed_numbers(presentation, record.correct_answers())
                )
                .green()
            );
        }
    }

    for (shown, variant) in presentation.variants() {
        let Some(index) = presentation.record_index(shown) else {
            continue;
        };
        if !selected.contains(&index) && !record.correct_answers().contains(&index) {
            continue;
        }
        if let Some(description) = &variant.description {
            let number = format!("{}. ", shown + 1);
            let text = indented(&render_content(description), &" ".repeat(number.len()));
            if record.correct_answers().contains(&index) {
                println!("{}{}", number.green(), text);
            } else {
                println!("{}{}", number.red(), text);
            }
        }
    }
}

/// Runs one quiz in the terminal. Returns `None` when the user quits.
pub fn take(presentation: &Presentation) -> Option<bool> {
    print_quiz(presentation, &format!("{}: ", presentation.record().name));
    let count = presentation.len();
    print!(
        "{} ",
        format!(
            "Answer (1-{}, several separated by spaces, q to quit and anything else if you don't know):",
            count
        )
        .cyan()
    );
    let _ = io::stdout().flush();

    let choice_string: String = read!("{}\n");
    let choice = Choice::from_str(count, &choice_string);
    debug!("choice: {:?}", choice);

    let selected = match choice {
        Choice::Options(shown) => presentation
            .to_record_indices(shown)
            .unwrap_or_default(),
        Choice::DontKnow => BTreeSet::new(),
        Choice::Quit => {
            println!("{}", "Quitting Early!".cyan());
            return None;
        }
    };
    Some(check(presentation, &selected))
}

/// Turns 1-based numbers typed on the command line into record indices.
pub fn selection_from_numbers(
    presentation: &Presentation,
    numbers: &[usize],
) -> Result<BTreeSet<usize>, String> {
    if numbers.contains(&0) {
        return Err("Choices are numbered from 1!".to_string());
    }
    presentation
        .to_record_indices(numbers.iter().map(|&n| n - 1))
        .ok_or_else(|| format!("There are only {} options available!", presentation.len()))
}

pub fn check(presentation: &Presentation, selected: &BTreeSet<usize>) -> bool {
    let record: &QuizRecord = presentation.record();
    let evaluation = evaluate(record, selected.iter().copied());
    debug!("[Check] '{}': {:?}", record.name, evaluation);
    print_feedback(presentation, selected, &evaluation);
    evaluation.is_correct()
}
