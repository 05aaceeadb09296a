//! CLI tool to hash an instructor password for seeding.
//!
//! Usage:
//!   cargo run --bin hash-password -- --password "s3cret" [--cost 12]
//!   echo "s3cret" | cargo run --bin hash-password

use std::env;
use std::io::{self, BufRead};

use attendance_server::auth::hash_password;
use attendance_server::config::defaults::DEV_BCRYPT_COST;

fn main() {
    let args: Vec<String> = env::args().collect();

    let mut password: Option<String> = None;
    let mut cost = DEV_BCRYPT_COST;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--password" | "-p" => {
                i += 1;
                if i < args.len() {
                    password = Some(args[i].clone());
                }
            }
            "--cost" | "-c" => {
                i += 1;
                cost = match args.get(i).and_then(|v| v.parse().ok()) {
                    Some(c) => c,
                    None => {
                        eprintln!("Error: --cost expects a number between 4 and 31");
                        std::process::exit(1);
                    }
                };
            }
            "--help" | "-h" => {
                print_usage();
                return;
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    // Fall back to the first line of stdin
    let password = match password {
        Some(p) => p,
        None => {
            let mut line = String::new();
            if let Err(e) = io::stdin().lock().read_line(&mut line) {
                eprintln!("Error: failed to read password from stdin: {}", e);
                std::process::exit(1);
            }
            line.trim_end_matches(['\r', '\n']).to_string()
        }
    };

    if password.is_empty() {
        eprintln!("Error: password must not be empty");
        print_usage();
        std::process::exit(1);
    }

    match hash_password(&password, cost) {
        Ok(hash) => println!("{}", hash),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    eprintln!(
        r#"
Usage: hash-password [OPTIONS]

Options:
  -p, --password <PASSWORD>  Password to hash (read from stdin when omitted)
  -c, --cost <COST>          bcrypt cost (default: {})
  -h, --help                 Print help
"#,
        DEV_BCRYPT_COST
    );
}
