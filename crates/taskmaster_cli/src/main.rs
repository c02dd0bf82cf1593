use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use std::io::{self, BufRead};
use tabled::settings::Style;
use tabled::{Table, Tabled};
use taskmaster_cli::cli::{Cli, Command, collect_config_overrides};
use taskmaster_core::config::{self, Config, ConfigOverrides};
use taskmaster_core::display::DisplayMode;
use taskmaster_core::error::AppError;
use taskmaster_core::export;
use taskmaster_core::logging;
use taskmaster_core::model::Task;
use taskmaster_core::session::Session;
use taskmaster_core::storage::json_store::FileStore;

type FileSession = Session<FileStore>;

struct Runtime {
    config: Config,
    interactive: bool,
}

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "#")]
    position: usize,
    #[tabled(rename = "Done")]
    done: &'static str,
    #[tabled(rename = "Task")]
    text: String,
    #[tabled(rename = "Due")]
    due: String,
}

fn task_json(index: usize, task: &Task) -> serde_json::Value {
    serde_json::json!({
        "position": index + 1,
        "text": task.text,
        "completed": task.completed,
        "dueDate": task.due_date,
    })
}

fn describe(index: usize, task: &Task) -> String {
    if task.has_due_date() {
        format!("task {}: {} (due {})", index + 1, task.text, task.due_date)
    } else {
        format!("task {}: {}", index + 1, task.text)
    }
}

fn count_tasks(count: usize) -> String {
    let noun = if count == 1 { "task" } else { "tasks" };
    format!("{count} {noun}")
}

fn count_completed(count: usize) -> String {
    let noun = if count == 1 { "task" } else { "tasks" };
    format!("{count} completed {noun}")
}

fn report_missing(index: usize, json: bool) {
    if json {
        println!("{}", serde_json::Value::Null);
    } else {
        println!("No task at position {}; nothing changed", index + 1);
    }
}

fn print_task(verb: &str, index: usize, task: &Task, json: bool) {
    if json {
        println!("{}", task_json(index, task));
    } else {
        println!("{} {}", verb, describe(index, task));
    }
}

fn print_list(session: &FileSession, json: bool) {
    let visible = session.visible();

    if json {
        let payload: Vec<serde_json::Value> = visible
            .iter()
            .map(|(index, task)| task_json(*index, task))
            .collect();
        println!("{}", serde_json::Value::Array(payload));
        return;
    }

    let palette = session.display_mode().palette();
    if visible.is_empty() {
        println!("No tasks");
    } else {
        let rows: Vec<TaskRow> = visible
            .iter()
            .map(|(index, task)| TaskRow {
                position: index + 1,
                done: if task.completed { "x" } else { "" },
                text: task.text.clone(),
                due: task.due_date.clone(),
            })
            .collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
    }

    if let Some(index) = session.edit_state().index {
        println!("{}", palette.accentize(&format!("Editing task {}", index + 1)));
    }
    println!(
        "{}",
        palette.mutedize(&format!(
            "{} left (showing {})",
            count_tasks(session.active_count()),
            session.filter()
        ))
    );
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

fn split_command_line(line: &str) -> Result<Vec<String>, AppError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escape = false;

    for ch in line.chars() {
        if escape {
            if ch != '"' && ch != '\\' {
                current.push('\\');
            }
            current.push(ch);
            escape = false;
            continue;
        }

        if in_quotes && ch == '\\' {
            escape = true;
            continue;
        }

        if ch == '"' {
            in_quotes = !in_quotes;
            continue;
        }

        if ch.is_whitespace() && !in_quotes {
            if !current.is_empty() {
                args.push(current.clone());
                current.clear();
            }
            continue;
        }

        current.push(ch);
    }

    if in_quotes {
        return Err(AppError::invalid_input("unterminated quote in command"));
    }

    if !current.is_empty() {
        args.push(current);
    }

    Ok(args)
}

fn print_help() {
    let mut cmd = Cli::command();
    let help = cmd.render_help();
    println!("{help}");
}

fn run_command(cli: Cli, session: &mut FileSession, runtime: &Runtime) -> Result<(), AppError> {
    if runtime.interactive && !cli.config_override.is_empty() {
        return Err(AppError::invalid_input(
            "--config-override is only accepted when starting taskmaster",
        ));
    }
    if cli.dark {
        session.set_display_mode(DisplayMode::Dark);
    }

    match cli.command {
        Command::Add { text, due } => {
            let text = text.unwrap_or_default();
            let due = due.unwrap_or_default();
            match session.add(&text, &due)? {
                Some(task) => {
                    let index = session.tasks().len() - 1;
                    print_task("Added", index, &task, cli.json);
                }
                None if cli.json => println!("{}", serde_json::Value::Null),
                None => println!("Nothing added: task text is blank"),
            }
        }
        Command::Toggle { position } => match session.toggle_complete(position)? {
            Some(task) => {
                let verb = if task.completed { "Completed" } else { "Reopened" };
                print_task(verb, position, &task, cli.json);
            }
            None => report_missing(position, cli.json),
        },
        Command::Edit { position, text } => {
            if text.is_none() && !runtime.interactive {
                return Err(AppError::invalid_input(
                    "new text is required outside interactive mode",
                ));
            }

            let draft = match session.begin_edit(position) {
                Some(state) => state.draft_text.clone(),
                None => {
                    report_missing(position, cli.json);
                    return Ok(());
                }
            };

            match text {
                Some(text) => {
                    session.set_input(&text);
                    match session.commit_edit()? {
                        Some(task) => print_task("Updated", position, &task, cli.json),
                        None => report_missing(position, cli.json),
                    }
                }
                None => {
                    println!("Editing task {}: {}", position + 1, draft);
                    println!("Use `draft <text>` to change it and `update` to save.");
                }
            }
        }
        Command::Draft { text } => {
            let index = session
                .edit_state()
                .index
                .ok_or_else(|| AppError::invalid_input("no task is being edited"))?;
            session.set_input(&text);
            println!("Draft for task {}: {}", index + 1, text);
        }
        Command::Update => {
            let index = session.edit_state().index;
            match (index, session.commit_edit()?) {
                (Some(index), Some(task)) => print_task("Updated", index, &task, cli.json),
                _ if cli.json => println!("{}", serde_json::Value::Null),
                _ => println!("No edit in progress"),
            }
        }
        Command::Delete { position } => match session.remove(position)? {
            Some(task) => print_task("Deleted", position, &task, cli.json),
            None => report_missing(position, cli.json),
        },
        Command::List { filter } => {
            if let Some(filter) = filter {
                session.set_filter(filter.into());
            }
            print_list(session, cli.json);
        }
        Command::Filter { filter } => {
            session.set_filter(filter.into());
            if cli.json {
                println!("{}", serde_json::json!({ "filter": session.filter().as_str() }));
            } else {
                println!("Filter: {}", session.filter());
            }
        }
        Command::ClearCompleted => {
            let removed = session.clear_completed()?;
            if cli.json {
                println!(
                    "{}",
                    serde_json::json!({ "removed": removed.len(), "remaining": session.tasks().len() })
                );
            } else {
                println!("Cleared {}", count_completed(removed.len()));
            }
        }
        Command::Export { output, filter } => {
            if let Some(filter) = filter {
                session.set_filter(filter.into());
            }
            let document = session.export();
            let path = output.unwrap_or_else(|| runtime.config.export_path());
            export::write_document(&path, &document)?;

            if cli.json {
                println!(
                    "{}",
                    serde_json::json!({
                        "path": path.display().to_string(),
                        "tasks": document.line_count(),
                        "pages": document.page_count(),
                    })
                );
            } else {
                let pages = if document.page_count() == 1 { "page" } else { "pages" };
                println!(
                    "Exported {} to {} ({} {})",
                    count_tasks(document.line_count()),
                    path.display(),
                    document.page_count(),
                    pages
                );
            }
        }
        Command::Theme => {
            let mode = session.toggle_display_mode();
            if cli.json {
                println!("{}", serde_json::json!({ "display_mode": mode.as_str() }));
            } else {
                println!("Display mode: {}", mode.palette().accentize(mode.as_str()));
            }
        }
    }

    Ok(())
}

fn run_interactive(session: &mut FileSession, runtime: &Runtime) -> Result<(), AppError> {
    let mut input = String::new();
    let stdin = io::stdin();
    let mut stdin_lock = stdin.lock();

    loop {
        input.clear();
        let bytes = stdin_lock
            .read_line(&mut input)
            .map_err(|err| AppError::io(err.to_string()))?;

        if bytes == 0 {
            break;
        }

        let line = input.trim();
        if line.is_empty() {
            continue;
        }

        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        if line == "help" || line == "?" {
            print_help();
            continue;
        }

        let args = match split_command_line(line) {
            Ok(args) => args,
            Err(err) => {
                eprintln!("ERROR: {}", err);
                continue;
            }
        };

        if args.is_empty() {
            continue;
        }

        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push("taskmaster".to_string());
        argv.extend(args);

        let cli = match Cli::try_parse_from(argv) {
            Ok(cli) => cli,
            Err(err) => {
                eprintln!("ERROR: {}", normalize_parse_error(err));
                continue;
            }
        };

        if let Err(err) = run_command(cli, session, runtime) {
            eprintln!("ERROR: {}", err);
        }
    }

    Ok(())
}

fn open_session(config: &Config) -> Result<FileSession, AppError> {
    let dir = config.data_dir()?;
    tracing::debug!(dir = %dir.display(), "opening task store");
    Ok(Session::load(FileStore::new(dir)).with_display_mode(config.display_mode()))
}

fn fail(err: AppError) -> ! {
    eprintln!("ERROR: {}", err);
    std::process::exit(1);
}

fn main() {
    let mut args = std::env::args_os();
    args.next();
    let interactive = args.next().is_none();

    let cli = if interactive {
        None
    } else {
        match Cli::try_parse() {
            Ok(cli) => Some(cli),
            Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
                err.exit()
            }
            Err(err) => fail(normalize_parse_error(err)),
        }
    };

    let overrides = match cli.as_ref() {
        Some(cli) => collect_config_overrides(&cli.config_override)
            .unwrap_or_else(|message| fail(AppError::invalid_input(message))),
        None => ConfigOverrides::default(),
    };

    let loaded = config::load_config_with_fallback();
    let config = config::merge_overrides(&loaded.config, &overrides);

    if let Err(message) = logging::init_logging(config.log_level.as_deref()) {
        eprintln!("WARNING: {message}");
    }
    if let Some(err) = loaded.error {
        tracing::warn!(code = err.code(), error = %err.message(), "config unreadable, using defaults");
    }

    let mut session = open_session(&config).unwrap_or_else(|err| fail(err));
    let runtime = Runtime {
        config,
        interactive,
    };

    let result = match cli {
        Some(cli) => run_command(cli, &mut session, &runtime),
        None => run_interactive(&mut session, &runtime),
    };

    if let Err(err) = result {
        fail(err);
    }
}
