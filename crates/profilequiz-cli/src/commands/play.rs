use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use clap::Args;

use profilequiz_core::content::OptionMode;
use profilequiz_core::quiz::{Screen, COMPLETION_DELAY_MS};
use profilequiz_core::{
    AnswerOption, Dictionary, HostServices, Localizer, Quiz, QuizConfig, QuizEvent, SessionStore,
    Verb,
};

#[derive(Args)]
pub struct PlayArgs {
    /// Quiz content file (JSON)
    content: PathBuf,
    /// Content id for stored state (defaults to the file stem)
    #[arg(long)]
    id: Option<String>,
    /// Ignore any stored session and start over
    #[arg(long)]
    fresh: bool,
    /// Print every quiz event as a JSON line
    #[arg(long)]
    events: bool,
}

/// Host that prints announcements to the terminal.
struct TerminalHost {
    content_id: String,
}

impl HostServices for TerminalHost {
    fn read(&self, text: &str) {
        println!("» {text}");
    }

    fn trigger_event(&self, verb: Verb) {
        tracing::info!(verb = verb.as_str(), content_id = %self.content_id, "tracking event");
    }

    fn content_id(&self) -> &str {
        &self.content_id
    }
}

const HELP: &str = "commands: <number> choose option, n next, p previous, d done, s start, r review, reset, q quit";

pub fn run(args: PlayArgs) -> Result<(), Box<dyn std::error::Error>> {
    let content = super::load_content(&args.content)?;
    let id = super::content_id_for(&args.content, args.id);
    let store = SessionStore::open()?;
    let previous = if args.fresh { None } else { store.load(&id) };

    let dictionary: Rc<dyn Localizer> = Rc::new(Dictionary::default());
    let mut quiz = Quiz::new(
        content,
        QuizConfig::load_or_default(),
        Rc::new(TerminalHost { content_id: id.clone() }),
        dictionary.clone(),
        previous,
    );
    if quiz.config().behaviour.delegate_run {
        print_events(&quiz.run(), args.events)?;
    }

    println!("{HELP}");
    render(&quiz, dictionary.as_ref());

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        if matches!(quiz.screen(), Screen::Message(_)) {
            break;
        }

        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;

        let events = match line.trim() {
            "q" | "quit" => break,
            "n" | "next" => quiz.next(),
            "p" | "previous" => quiz.previous(),
            "d" | "done" => quiz.done(),
            "s" | "start" => quiz.start(),
            "r" | "review" => quiz.review(),
            "reset" => quiz.reset_task(),
            "" => Vec::new(),
            input => match input.parse::<usize>() {
                Ok(number) if number > 0 => quiz.choose_option(number - 1),
                _ => {
                    println!("{HELP}");
                    continue;
                }
            },
        };
        print_events(&events, args.events)?;

        if quiz.has_pending_completion() {
            std::thread::sleep(Duration::from_millis(COMPLETION_DELAY_MS));
            print_events(&quiz.tick(), args.events)?;
        }

        render(&quiz, dictionary.as_ref());
    }

    match quiz.persistable_state() {
        Some(snapshot) => store.save(&id, &snapshot)?,
        None => tracing::debug!(content_id = %id, "nothing to store"),
    }
    Ok(())
}

fn print_events(events: &[QuizEvent], enabled: bool) -> Result<(), serde_json::Error> {
    if enabled {
        for event in events {
            println!("{}", serde_json::to_string(event)?);
        }
    }
    Ok(())
}

fn render(quiz: &Quiz, dictionary: &dyn Localizer) {
    match quiz.screen() {
        Screen::Message(text) => println!("{text}"),
        Screen::Intro => {
            if let Some(title) = &quiz.content().title {
                println!("{title}");
            }
            println!("[s] {}", dictionary.get("l10n.start"));
        }
        Screen::Questions => render_question(quiz, dictionary),
        Screen::Result => render_result(quiz, dictionary),
    }
}

fn render_question(quiz: &Quiz, dictionary: &dyn Localizer) {
    let index = quiz.current_position();
    let (Some(question), Some(panel)) = (
        quiz.content().questions.get(index),
        quiz.navigation().panel(index),
    ) else {
        return;
    };

    if let Some(progress) = quiz.progress_text() {
        println!("({progress})");
    }
    println!("{}", question.text);
    let mode = question.option_mode();
    for (option, answer) in question.answers.iter().enumerate() {
        let mark = if panel.is_selected(option) { "x" } else { " " };
        println!("  [{mark}] {}. {}", option + 1, option_label(answer, mode));
    }

    let buttons = quiz.buttons();
    let mut controls = Vec::new();
    if buttons.previous {
        controls.push(format!("[p] {}", dictionary.get("a11y.previous")));
    }
    if buttons.next {
        controls.push(format!("[n] {}", dictionary.get("a11y.next")));
    }
    if panel.allows_multiple() && panel.can_finish() && !panel.is_completed() {
        controls.push(format!("[d] {}", dictionary.get("l10n.done")));
    }
    if !controls.is_empty() {
        println!("{}", controls.join("  "));
    }
}

/// Image options show their alt text and path; text options their text.
fn option_label(answer: &AnswerOption, mode: OptionMode) -> String {
    match (mode, &answer.image) {
        (OptionMode::Image, Some(image)) => {
            let alt = image.alt.as_deref().unwrap_or(&answer.text);
            format!("{alt} <{}>", image.path)
        }
        _ => answer.text.clone(),
    }
}

fn render_result(quiz: &Quiz, dictionary: &dyn Localizer) {
    let results = quiz.results();
    let screen = &quiz.config().result_screen;

    match &results.personality {
        Some(name) if screen.display_title => println!("== {name} =="),
        Some(_) => {}
        None => println!("{}", dictionary.get("l10n.notFinished")),
    }
    if screen.display_description {
        if let Some(description) = &results.description {
            println!("{}", profilequiz_core::content::purify_html(description));
        }
    }
    if screen.display_options_chosen {
        println!("{}:", dictionary.get("l10n.yourChoices"));
        for choice in quiz.choices() {
            let chosen: Vec<_> = choice
                .options
                .iter()
                .filter(|option| option.selected)
                .map(|option| option.text.as_str())
                .collect();
            println!("  {}: {}", choice.question, chosen.join(", "));
        }
    }

    let mut controls = vec![format!("[reset] {}", dictionary.get("l10n.reset"))];
    if quiz.config().allow_review() {
        controls.push(format!("[r] {}", dictionary.get("l10n.review")));
    }
    println!("{}", controls.join("  "));
}
