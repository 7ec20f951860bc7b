use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use std::{path::PathBuf, sync::Arc};

use docportal_server::document::{Branch, FsBlobStore, SqliteDocumentStore};
use docportal_server::notifications::LogNotifier;
use docportal_server::sqlite_persistence::SqliteDatabase;
use docportal_server::user::{Registration, SqliteUserStore, UserManager, UserRole};

use rustyline::{
    completion::Completer, highlight::Highlighter, history::FileHistory, validate::Validator,
    CompletionType, Config, Editor, Helper,
};

fn parse_path(s: &str) -> Result<PathBuf> {
    let original_path = PathBuf::from(s);
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Directory containing portal.db.
    #[clap(value_parser = parse_path)]
    pub db_dir: PathBuf,

    /// Directory of the stored document files, defaults to the db directory.
    #[clap(long, value_parser = parse_path)]
    pub media_path: Option<PathBuf>,
}

#[derive(Parser)]
#[command(name = "")]
struct InnerCli {
    #[command(subcommand)]
    command: InnerCommand,
}

#[derive(Subcommand)]
enum InnerCommand {
    /// Creates an account. Students are created unless --admin is given.
    AddUser {
        email: String,
        password: String,
        first_name: String,
        last_name: String,
        /// 10 digit phone number.
        #[arg(long, default_value = "0000000000")]
        contact: String,
        #[arg(long, default_value = "Computer Science")]
        branch: String,
        #[arg(long)]
        admin: bool,
    },

    /// Replaces the password of a user.
    SetPassword { email: String, password: String },

    /// Changes the role of a user (Student or Admin).
    SetRole { email: String, role: String },

    /// Shows a user and their permissions.
    Show { email: String },

    /// Shows all available roles and their permissions.
    ListRoles,

    /// Shows the path of the current database.
    Where,

    /// Close this program.
    Exit,
}

enum CommandExecutionResult {
    Ok,
    Exit,
    Error(String),
}

const PROMPT: &str = ">> ";

fn find_user_id(user_manager: &UserManager, email: &str) -> Result<usize, String> {
    match user_manager.get_user_by_email(email) {
        Ok(Some(user)) => Ok(user.id),
        Ok(None) => Err(format!("User '{}' not found", email)),
        Err(err) => Err(format!("{}", err)),
    }
}

fn execute_command(line: String, user_manager: &UserManager, db_path: &str) -> CommandExecutionResult {
    if line.is_empty() {
        return CommandExecutionResult::Ok;
    }

    let args =
        shlex::split(&line).unwrap_or_else(|| line.split_whitespace().map(String::from).collect());

    let cli = InnerCli::try_parse_from(std::iter::once(" ").chain(args.iter().map(String::as_str)));

    match cli {
        Ok(cli) => {
            println!("{} {}", PROMPT, &line);
            match cli.command {
                InnerCommand::AddUser {
                    email,
                    password,
                    first_name,
                    last_name,
                    contact,
                    branch,
                    admin,
                } => {
                    let branch = match Branch::parse(&branch) {
                        Some(b) => b,
                        None => {
                            let valid: Vec<&str> = Branch::ALL.iter().map(|b| b.as_str()).collect();
                            return CommandExecutionResult::Error(format!(
                                "Invalid branch '{}'. Valid branches are: {}",
                                branch,
                                valid.join(", ")
                            ));
                        }
                    };
                    let role = if admin { UserRole::Admin } else { UserRole::Student };
                    let registration = Registration {
                        email,
                        password,
                        first_name,
                        last_name,
                        contact,
                        branch,
                    };
                    match user_manager.add_user(&registration, role) {
                        Ok(user) => println!("Created {} {} with id {}", role.as_str(), user.email, user.id),
                        Err(err) => return CommandExecutionResult::Error(format!("{}", err)),
                    }
                }
                InnerCommand::SetPassword { email, password } => {
                    let user_id = match find_user_id(user_manager, &email) {
                        Ok(id) => id,
                        Err(err) => return CommandExecutionResult::Error(err),
                    };
                    if let Err(err) = user_manager.set_password(user_id, &password) {
                        return CommandExecutionResult::Error(format!("{}", err));
                    }
                    println!("Password of '{}' updated", email);
                }
                InnerCommand::SetRole { email, role } => {
                    let role_enum = match UserRole::from_str(&role) {
                        Some(r) => r,
                        None => {
                            return CommandExecutionResult::Error(format!(
                                "Invalid role '{}'. Valid roles are: Student, Admin",
                                role
                            ));
                        }
                    };
                    let user_id = match find_user_id(user_manager, &email) {
                        Ok(id) => id,
                        Err(err) => return CommandExecutionResult::Error(err),
                    };
                    if let Err(err) = user_manager.set_role(user_id, role_enum) {
                        return CommandExecutionResult::Error(format!("{}", err));
                    }
                    println!("User '{}' is now {}", email, role_enum.as_str());
                }
                InnerCommand::Show { email } => {
                    let user = match user_manager.get_user_by_email(&email) {
                        Ok(Some(user)) => user,
                        Ok(None) => {
                            return CommandExecutionResult::Error(format!(
                                "User '{}' not found",
                                email
                            ))
                        }
                        Err(err) => return CommandExecutionResult::Error(format!("{}", err)),
                    };
                    println!("{:#?}", user);
                    println!("\nPermissions:");
                    for permission in user.role.permissions() {
                        println!("  - {:?}", permission);
                    }
                }
                InnerCommand::ListRoles => {
                    println!("Available Roles:\n");
                    for role in &[UserRole::Student, UserRole::Admin] {
                        println!("Role: {}", role.as_str());
                        println!("Permissions:");
                        for permission in role.permissions() {
                            println!("  - {:?}", permission);
                        }
                        println!();
                    }
                }
                InnerCommand::Where => {
                    println!("{}", db_path);
                }
                InnerCommand::Exit => return CommandExecutionResult::Exit,
            }
        }

        Err(e) => {
            if e.print().is_err() {
                println!("{}", e);
            }
        }
    }
    CommandExecutionResult::Ok
}

#[derive(rustyline_derive::Hinter)]
struct CommandHelper {
    commands_names: Vec<String>,
}

impl CommandHelper {
    pub fn new() -> Self {
        let commands_names: Vec<String> = InnerCli::command()
            .get_subcommands()
            .map(|sc| sc.get_name().to_string())
            .collect();

        CommandHelper { commands_names }
    }
}

impl Completer for CommandHelper {
    type Candidate = String;

    fn complete(
        &self,
        line: &str,
        _pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<String>)> {
        if line.contains(' ') {
            return Ok((0, Vec::with_capacity(0)));
        }
        let matches = self
            .commands_names
            .iter()
            .filter(|c| c.starts_with(line))
            .map(|c| c.to_string())
            .collect::<Vec<_>>();

        Ok((0, matches))
    }
}

impl Highlighter for CommandHelper {}
impl Validator for CommandHelper {}
impl Helper for CommandHelper {}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();
    let db_path = cli_args.db_dir.join("portal.db");
    let media_path = cli_args
        .media_path
        .unwrap_or_else(|| cli_args.db_dir.clone());

    let db = SqliteDatabase::open(&db_path)
        .with_context(|| format!("Could not open portal database at {:?}", db_path))?;
    let blobs = FsBlobStore::new(&media_path)
        .await
        .with_context(|| format!("Could not open media directory {:?}", media_path))?;
    let user_manager = UserManager::new(
        Arc::new(SqliteUserStore::new(db.clone())),
        Arc::new(SqliteDocumentStore::new(db)),
        Arc::new(blobs),
        Arc::new(LogNotifier::new("cli-admin")),
    );

    InnerCli::command().print_long_help()?;

    let config = Config::builder()
        .completion_type(CompletionType::List)
        .build();

    let mut rl = Editor::<CommandHelper, FileHistory>::with_config(config)?;
    rl.set_helper(Some(CommandHelper::new()));

    let db_path_display = db_path.display().to_string();
    loop {
        match rl.readline(PROMPT) {
            Ok(line) => {
                let _ = rl.add_history_entry(&line);
                match execute_command(line, &user_manager, &db_path_display) {
                    CommandExecutionResult::Ok => {}
                    CommandExecutionResult::Exit => break,
                    CommandExecutionResult::Error(err) => {
                        eprintln!("Error: {}", err);
                    }
                }
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                println!("CTRL-D: exiting.");
                break;
            }
            Err(e) => {
                println!("Error: {:?}", e);
                break;
            }
        }
    }
    Ok(())
}
