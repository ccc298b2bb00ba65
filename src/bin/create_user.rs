use std::{error::Error, io, path::Path, process::exit};

use clap::Parser;
use rusqlite::Connection;

use cashcards::{PasswordHash, Role, User, Username, create_user, initialize_db};

/// A utility for adding a user to the cash cards database.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    /// The name the new user will log in with.
    #[arg(long, short)]
    username: String,

    /// The role to grant the user. Only CARD-OWNER may use the API.
    #[arg(long, short, default_value = "CARD-OWNER")]
    role: Role,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let db_path = Path::new(&args.db_path);

    if !db_path.is_file() {
        print_error(format!("File does not exist at {db_path:#?}!"));
        exit(1);
    }

    let username = args.username.trim();
    if username.is_empty() {
        print_error("Username cannot be empty.");
        exit(1);
    }

    println!("Creating user {username} with the role {}", args.role);

    let password_hash = match get_new_password_hash() {
        Some(password_hash) => password_hash,
        None => return Ok(()),
    };

    let conn = Connection::open(db_path)?;
    initialize_db(&conn)?;

    let user = User::new(Username::new(username), password_hash, args.role);
    if let Err(error) = create_user(&user, &conn) {
        print_error(&error);
        exit(1);
    }

    println!("User created successfully!");

    Ok(())
}

fn get_new_password_hash() -> Option<PasswordHash> {
    loop {
        println!();

        let first_password = match rpassword::prompt_password("Enter a password: ") {
            Ok(string) => string,
            Err(error) if error.kind() == io::ErrorKind::UnexpectedEof => {
                return None;
            }
            Err(error) => {
                print_error(format!("Could not read password from stdin: {error}"));
                return None;
            }
        };

        if first_password.is_empty() {
            print_error("Password cannot be empty, try again.");
            continue;
        }

        let second_password = match rpassword::prompt_password("Enter the same password again: ") {
            Ok(string) => string,
            Err(error) if error.kind() == io::ErrorKind::UnexpectedEof => {
                return None;
            }
            Err(error) => {
                print_error(format!("Could not read password from stdin: {error}"));
                return None;
            }
        };

        if first_password != second_password {
            print_error("Passwords must match, try again.");
            continue;
        }

        match PasswordHash::from_raw_password(&first_password, PasswordHash::DEFAULT_COST) {
            Ok(password_hash) => return Some(password_hash),
            Err(error) => {
                print_error(format!("Could not hash password: {error}. Try again."));
                continue;
            }
        };
    }
}

fn print_error(error: impl ToString) {
    eprintln!("\x1b[31;1m{}\x1b[0m", error.to_string())
}
