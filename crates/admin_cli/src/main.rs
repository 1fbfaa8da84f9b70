use std::{error::Error, io::Write};

use clap::{Args, Parser, Subcommand};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use engine::{Engine, EngineError, MIN_PASSWORD_LEN};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

#[derive(Parser, Debug)]
#[command(name = "dompet_admin")]
#[command(about = "Admin utilities for Dompet (bootstrap users, wallets and categories)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./dompet.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    Wallet(Wallet),
    Category(Category),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    /// Register a user; the password is prompted for.
    Create(UserCreateArgs),
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    email: String,
    /// Skip the default category set.
    #[arg(long)]
    no_default_categories: bool,
}

#[derive(Args, Debug)]
struct Wallet {
    #[command(subcommand)]
    command: WalletCommand,
}

#[derive(Subcommand, Debug)]
enum WalletCommand {
    Create(WalletCreateArgs),
}

#[derive(Args, Debug)]
struct WalletCreateArgs {
    /// Owner email.
    #[arg(long)]
    user: String,
    #[arg(long)]
    name: String,
}

#[derive(Args, Debug)]
struct Category {
    #[command(subcommand)]
    command: CategoryCommand,
}

#[derive(Subcommand, Debug)]
enum CategoryCommand {
    /// Add the default categories the user is missing.
    Seed(CategorySeedArgs),
}

#[derive(Args, Debug)]
struct CategorySeedArgs {
    /// Owner email.
    #[arg(long)]
    user: String,
}

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> Result<Self, Box<dyn Error + Send + Sync>> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn prompt_password(prompt: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
    let _raw = RawModeGuard::enter()?;

    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(prompt)
    )?;
    out.flush()?;

    let mut buf = String::new();
    loop {
        let Event::Key(KeyEvent {
            code, modifiers, ..
        }) = event::read()?
        else {
            continue;
        };

        match code {
            KeyCode::Enter => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                break;
            }
            KeyCode::Backspace => {
                if buf.pop().is_some() {
                    execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
                    out.flush()?;
                }
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                return Err("interrupted".into());
            }
            KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => {
                buf.push(ch);
                execute!(out, Print("*"))?;
                out.flush()?;
            }
            _ => {}
        }
    }

    Ok(buf)
}

fn prompt_password_twice() -> Result<String, Box<dyn Error + Send + Sync>> {
    let mut out = std::io::stderr();
    for _ in 0..3 {
        let p1 = prompt_password("Password: ")?;
        if p1.chars().count() < MIN_PASSWORD_LEN {
            execute!(
                out,
                cursor::MoveToColumn(0),
                terminal::Clear(ClearType::CurrentLine),
                Print(format!(
                    "Password must be at least {MIN_PASSWORD_LEN} characters.\r\n"
                ))
            )?;
            continue;
        }

        let p2 = prompt_password("Confirm password: ")?;
        if p1 == p2 {
            return Ok(p1);
        }

        execute!(
            out,
            cursor::MoveToColumn(0),
            terminal::Clear(ClearType::CurrentLine),
            Print("Passwords do not match. Try again.\r\n")
        )?;
    }

    Err("too many attempts".into())
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

async fn find_user(
    engine: &Engine,
    email: &str,
) -> Result<engine::User, Box<dyn Error + Send + Sync>> {
    match engine.user_by_email(email).await {
        Ok(user) => Ok(user),
        Err(EngineError::KeyNotFound(_)) => {
            eprintln!("user not found: {email}");
            std::process::exit(1);
        }
        Err(err) => Err(err.into()),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build().await?;

    match cli.command {
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            let password = prompt_password_twice()?;

            let registered = if args.no_default_categories {
                engine
                    .register_user(&args.email, &password)
                    .await
                    .map(|user| (user, Vec::new()))
            } else {
                engine
                    .register_user_with_defaults(&args.email, &password)
                    .await
            };
            let (user, seeded) = match registered {
                Ok(registered) => registered,
                Err(EngineError::ExistingKey(email)) => {
                    eprintln!("user already exists: {email}");
                    std::process::exit(1);
                }
                Err(err) => return Err(err.into()),
            };
            println!("created user: {} ({})", user.email, user.id);
            if !seeded.is_empty() {
                println!("added {} default categories", seeded.len());
            }
        }
        Command::Wallet(Wallet {
            command: WalletCommand::Create(args),
        }) => {
            let user = find_user(&engine, &args.user).await?;
            let wallet = engine.create_wallet(user.id, &args.name).await?;
            println!("created wallet: {} ({})", wallet.name, wallet.id);
        }
        Command::Category(Category {
            command: CategoryCommand::Seed(args),
        }) => {
            let user = find_user(&engine, &args.user).await?;
            let seeded = engine.seed_default_categories(user.id).await?;
            if seeded.is_empty() {
                println!("{} already has every default category", user.email);
            } else {
                for category in &seeded {
                    println!("added category: {} {}", category.icon.emoji(), category.name);
                }
            }
        }
    }

    Ok(())
}
