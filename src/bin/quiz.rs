use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::terminal;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use student_quiz::clients::{ClientType, FlexibleClient};
use student_quiz::config::{self, KeyFromEnv};
use student_quiz::interceptors::FileInterceptor;
use student_quiz::store::{load_session, save_session, session_schema};
use student_quiz::{GenerationClient, OptionLetter, QuizGenerator, QuizRequest, RetryConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "🎓 Generate and take multiple-choice study quizzes", long_about = None)]
#[command(after_help = "ENVIRONMENT VARIABLES:
    QUIZ_CLIENT            Generation backend (gemini|deepseek|mock) [default: auto-detect]
    GOOGLE_API_KEY         API key for Gemini
    DEEPSEEK_API_KEY       API key for DeepSeek
    QUIZ_MAX_ATTEMPTS      Attempts before giving up on rate limits [default: 3]
    QUIZ_RETRY_DELAY_SECS  Wait between rate-limited attempts [default: 5]
    RUST_LOG               Log filter [default: student_quiz=info]

EXAMPLES:
    student-quiz generate --subject \"the French revolution\"
    student-quiz generate --document notes.txt --transcripts transcripts/
    student-quiz play
    student-quiz schema")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a 15-question quiz and save it as a new session
    Generate(GenerateArgs),
    /// Answer the questions of a saved session, one keystroke per answer
    Play {
        /// Session file to resume
        #[arg(long, default_value = "quiz_session.json")]
        session: PathBuf,
    },
    /// Print the JSON schema of session files
    Schema,
}

#[derive(Args)]
struct GenerateArgs {
    /// Plain-text document to build the quiz from
    #[arg(long, conflicts_with = "subject", required_unless_present = "subject")]
    document: Option<PathBuf>,

    /// Subject to build the quiz about
    #[arg(long)]
    subject: Option<String>,

    /// Generation backend: gemini, deepseek, mock [default: auto-detect]
    #[arg(short, long)]
    client: Option<ClientType>,

    /// Where to write the new session
    #[arg(long, default_value = "quiz_session.json")]
    session: PathBuf,

    /// Directory receiving a Markdown transcript of the generation
    #[arg(long)]
    transcripts: Option<PathBuf>,

    /// Remember the API key of the chosen backend in .env
    #[arg(long, value_name = "KEY")]
    save_key: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("student_quiz=info")),
        )
        .with_writer(io::stderr)
        .init();

    match Cli::parse().command {
        Command::Generate(args) => generate(args).await,
        Command::Play { session } => play(&session),
        Command::Schema => {
            println!("{}", serde_json::to_string_pretty(&session_schema())?);
            Ok(())
        }
    }
}

async fn generate(args: GenerateArgs) -> Result<()> {
    let request = match (&args.document, &args.subject) {
        (Some(path), _) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            QuizRequest::from_document(text)?
        }
        (None, Some(subject)) => QuizRequest::from_subject(subject.as_str())?,
        (None, None) => bail!("either --document or --subject is required"),
    };

    let client_type = args.client.unwrap_or_default();
    if let Some(key) = &args.save_key {
        save_key(client_type, key)?;
    }
    println!("Generating quiz with {client_type}...");

    let mut client = GenerationClient::new(FlexibleClient::from_type(client_type), RetryConfig::from_env());
    if let Some(dir) = args.transcripts {
        client = client.with_interceptor(Arc::new(FileInterceptor::new(dir)));
    }

    let session = QuizGenerator::new(client).start_session(&request).await?;
    save_session(&args.session, &session)?;
    println!(
        "Quiz generated successfully! {} questions saved to {}",
        session.total(),
        args.session.display()
    );
    Ok(())
}

fn save_key(client_type: ClientType, key: &str) -> Result<()> {
    use student_quiz::clients::*;

    match client_type {
        #[cfg(feature = "gemini")]
        ClientType::Gemini => GeminiClient::save_to_env_file(key)?,
        #[cfg(feature = "deepseek")]
        ClientType::DeepSeek => DeepSeekClient::save_to_env_file(key)?,
        ClientType::Mock => bail!("the mock client does not use an API key"),
    }
    // pick the key up for this run too
    config::load_dotenv();
    Ok(())
}

fn play(path: &Path) -> Result<()> {
    let mut session = load_session(path)?;

    while let Some(question) = session.current_question() {
        println!();
        println!("Question {}: {}", session.current_index() + 1, question.text);
        for (letter, text) in &question.options {
            println!("  {letter}) {text}");
        }
        print!("Select your answer (A-D, q to stop): ");
        io::stdout().flush()?;

        let Some(answer) = read_answer()? else {
            println!("\nProgress saved to {}", path.display());
            return Ok(());
        };

        let (next, feedback) = session.submit_answer(answer)?;
        if feedback.correct {
            println!("Correct!");
        } else {
            println!("Incorrect. The correct answer was {}", feedback.correct_answer);
        }
        save_session(path, &next)?;
        session = next;
    }

    if let Some(report) = session.report() {
        println!();
        println!("Quiz completed!");
        println!("{report}");
    }
    Ok(())
}

/// Next answer from the keyboard; `None` means the student wants to stop.
fn read_answer() -> Result<Option<OptionLetter>> {
    loop {
        let choice = match read_single_key() {
            Ok(choice) => choice,
            Err(_) => read_line_choice()?,
        };
        match choice {
            Some('q') | Some('Q') | None => return Ok(None),
            Some(c) => {
                if let Some(letter) = OptionLetter::from_char(c) {
                    println!("{letter}");
                    return Ok(Some(letter));
                }
            }
        }
    }
}

/// Read a single keystroke in raw mode.
fn read_single_key() -> io::Result<Option<char>> {
    terminal::enable_raw_mode()?;
    let result = wait_for_char();
    terminal::disable_raw_mode()?;
    result
}

fn wait_for_char() -> io::Result<Option<char>> {
    loop {
        if !event::poll(Duration::from_secs(300))? {
            return Ok(None);
        }
        if let Event::Key(KeyEvent { code, kind, .. }) = event::read()? {
            if kind != KeyEventKind::Press {
                continue;
            }
            match code {
                KeyCode::Char(c) => return Ok(Some(c)),
                KeyCode::Esc => return Ok(None),
                _ => {}
            }
        }
    }
}

/// Fallback for terminals without raw mode (pipes, CI).
fn read_line_choice() -> io::Result<Option<char>> {
    let mut input = String::new();
    if io::stdin().lock().read_line(&mut input)? == 0 {
        return Ok(None);
    }
    Ok(input.trim().chars().next().or(Some(' ')))
}
