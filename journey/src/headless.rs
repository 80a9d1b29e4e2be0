//! Headless mode for the story wall.
//!
//! A line-oriented protocol on stdin/stdout for scripting and automated
//! testing. Every line is a `#` command; responses are tagged with a
//! bracketed prefix such as `[WALL]` or `[ERROR]`.

use journey_core::{
    CollegeFilter, Identity, IdentityFilter, JourneySession, Story, StoryForm, View,
};
use std::io::{self, BufRead, Write};

/// Outcome of one protocol line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Lines(Vec<String>),
    Quit,
}

impl Reply {
    fn line(text: impl Into<String>) -> Self {
        Reply::Lines(vec![text.into()])
    }

    fn error(text: impl std::fmt::Display) -> Self {
        Reply::line(format!("[ERROR] {text}"))
    }
}

/// Run the story wall in headless mode until `#quit` or end of input.
pub async fn run_headless(mut session: JourneySession) -> io::Result<()> {
    println!("=== 共同的旅程 · Headless Mode ===");
    println!("Stories: {}", session.story_count());
    println!("View: {}", session.view().name());
    println!();
    print_help();
    println!();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                eprintln!("Error reading input: {e}");
                break;
            }
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match execute(&mut session, line).await {
            Reply::Quit => {
                println!("Goodbye!");
                break;
            }
            Reply::Lines(lines) => {
                for l in lines {
                    println!("{l}");
                }
            }
        }
        stdout.flush().ok();
    }

    Ok(())
}

fn print_help() {
    for line in help_lines() {
        println!("{line}");
    }
}

fn help_lines() -> Vec<String> {
    [
        "Commands:",
        "  #nav <landing|form|wall>             - Switch views",
        "  #submit <json>                       - Submit a story form",
        "  #filter identity <all|student|alumni|faculty>",
        "  #filter college <name|*>             - Filter the wall by college (* or any = all)",
        "  #filter clear                        - Clear all filters",
        "  #wall                                - List stories matching the filters",
        "  #colleges                            - List college filter options",
        "  #status                              - Show the current state",
        "  #help                                - Show this help",
        "  #quit                                - Exit",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Execute one protocol line against the session.
pub async fn execute(session: &mut JourneySession, line: &str) -> Reply {
    let Some(command) = line.strip_prefix('#') else {
        return Reply::error("Commands start with '#'. Type #help for help.");
    };
    let (name, rest) = command
        .trim()
        .split_once(char::is_whitespace)
        .map(|(n, r)| (n, r.trim()))
        .unwrap_or((command.trim(), ""));

    match name {
        "quit" | "exit" => Reply::Quit,
        "help" => Reply::Lines(help_lines()),
        "nav" => match View::parse(rest) {
            Some(view) => {
                session.navigate(view);
                Reply::line(format!("[VIEW] {}", view.name()))
            }
            None => Reply::error("Usage: #nav <landing|form|wall>"),
        },
        "submit" => submit(session, rest).await,
        "filter" => filter(session, rest),
        "wall" => {
            let stories = session.visible_stories();
            if stories.is_empty() {
                return Reply::Lines(vec![
                    format!("[WALL] {}", journey_core::wall::EMPTY_WALL_TITLE),
                    journey_core::wall::EMPTY_WALL_HINT.to_string(),
                ]);
            }
            let mut lines = vec![format!("[WALL] {} of {}", stories.len(), session.story_count())];
            lines.extend(stories.iter().map(describe));
            Reply::Lines(lines)
        }
        "colleges" => {
            let options = session.college_options();
            Reply::line(format!("[COLLEGES] {}", options.join(" | ")))
        }
        "status" => {
            let filter = session.filter();
            Reply::Lines(vec![
                "[STATUS]".to_string(),
                format!("  View: {}", session.view().name()),
                format!("  Stories: {}", session.story_count()),
                format!("  Identity filter: {}", filter.identity.label()),
                format!("  College filter: {}", filter.college.label()),
            ])
        }
        _ => Reply::error("Unknown command. Type #help for help."),
    }
}

async fn submit(session: &mut JourneySession, json: &str) -> Reply {
    let form: StoryForm = match serde_json::from_str(json) {
        Ok(form) => form,
        Err(e) => return Reply::error(format!("Invalid form JSON: {e}")),
    };
    let draft = match form.validate() {
        Ok(draft) => draft,
        Err(e) => return Reply::error(e),
    };

    if session.view() != View::Form {
        session.navigate(View::Form);
    }
    tokio::time::sleep(session.submit_delay()).await;

    let story = session.submit(draft);
    Reply::Lines(vec![
        format!("[SUBMITTED] {}", story.id),
        format!("[VIEW] {}", session.view().name()),
    ])
}

fn filter(session: &mut JourneySession, args: &str) -> Reply {
    let (kind, value) = args
        .split_once(char::is_whitespace)
        .map(|(k, v)| (k, v.trim()))
        .unwrap_or((args, ""));

    match kind {
        "identity" => match IdentityFilter::parse(value) {
            Some(identity) => session.set_identity_filter(identity),
            None => {
                let names: Vec<&str> = Identity::all().iter().map(|i| i.name()).collect();
                return Reply::error(format!(
                    "Unknown identity {value:?}; expected all, {}",
                    names.join(", ")
                ));
            }
        },
        "college" => {
            // "any" only names a college when a story actually uses it
            let is_college = |name: &str| session.college_options().iter().any(|c| c == name);
            let college = match value {
                "" => return Reply::error("Usage: #filter college <name|*>"),
                "*" => CollegeFilter::Any,
                "any" if !is_college("any") => CollegeFilter::Any,
                name => CollegeFilter::Exactly(name.to_string()),
            };
            session.set_college_filter(college);
        }
        "clear" => session.reset_filter(),
        _ => return Reply::error("Usage: #filter <identity|college|clear> ..."),
    }

    Reply::line(format!("[FILTER] {} matching", session.visible_stories().len()))
}

fn describe(story: &Story) -> String {
    let image = if story.has_image() { " [照片]" } else { "" };
    format!(
        "  {} | {} | {}届 | {} | To: {} | From: {} | {}{}",
        story.date,
        story.identity.label(),
        story.graduation_year,
        story.college,
        story.target_person,
        story.author,
        story.content.replace('\n', " "),
        image
    )
}
