//! # Cart Command-Line Tool
//!
//! Drives a persisted cart from the shell, mainly for development.
//!
//! ## Usage
//! ```bash
//! # Add 3 gold items with id 100
//! cargo run -p simplecart-session --bin cart -- add 100 3 color=gold price=349.00
//!
//! # Show the cart as JSON
//! cargo run -p simplecart-session --bin cart -- show
//!
//! # Sum an attribute over the cart
//! cargo run -p simplecart-session --bin cart -- total price
//!
//! # Use a specific config file and session directory
//! cargo run -p simplecart-session --bin cart -- --config ./cart.toml --dir ./sessions show
//! ```
//!
//! In cookie mode the incoming cookies are read from `SIMPLECART_COOKIE`
//! (a request `Cookie:` header value) and the resulting `Set-Cookie`
//! headers are printed.

use std::env;
use std::path::PathBuf;

use simplecart_session::{
    AttributeSet, CartConfig, CartEngine, CartResult, CookieJar, FileSession, PersistenceAdapter,
    PersistenceMode,
};
use tracing_subscriber::EnvFilter;

/// One parsed sub-command.
#[derive(Debug)]
enum Command {
    Show,
    Add { item_id: String, quantity: String, attributes: AttributeSet },
    Update { item_id: String, quantity: String, attributes: AttributeSet },
    Remove { item_id: String, attributes: AttributeSet },
    Clear,
    Destroy,
    Total { key: String },
}

fn print_help() {
    println!("SimpleCart command-line tool");
    println!();
    println!("Usage: cart [OPTIONS] <COMMAND> [ARGS]");
    println!();
    println!("Commands:");
    println!("  show                               Print the cart as JSON");
    println!("  add <ID> [QTY] [KEY=VALUE...]      Add an item (QTY defaults to 1)");
    println!("  update <ID> <QTY> [KEY=VALUE...]   Set a variant's quantity (0 removes)");
    println!("  remove <ID> [KEY=VALUE...]         Remove an item, or one variant of it");
    println!("  clear                              Empty the cart");
    println!("  destroy                            Delete the persisted cart");
    println!("  total <KEY>                        Sum quantity x attribute over the cart");
    println!();
    println!("Options:");
    println!("  -c, --config <PATH>  Config file (default: platform config dir/cart.toml)");
    println!("  -d, --dir <PATH>     Session directory (default: platform data dir/sessions)");
    println!("  -h, --help           Show this help message");
}

/// Log filter used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "info,simplecart=debug";

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_attributes(args: &[String]) -> Result<AttributeSet, String> {
    let mut attributes = AttributeSet::new();
    for arg in args {
        let (key, value) = arg
            .split_once('=')
            .ok_or_else(|| format!("Attribute '{}' must be KEY=VALUE", arg))?;
        attributes.insert(key, value);
    }
    Ok(attributes)
}

fn parse_command(args: &[String]) -> Result<Command, String> {
    let (name, rest) = args.split_first().ok_or("Missing command")?;
    let item_id = || rest.first().cloned().ok_or(format!("'{}' needs an item id", name));

    match name.as_str() {
        "show" => Ok(Command::Show),
        "clear" => Ok(Command::Clear),
        "destroy" => Ok(Command::Destroy),
        "total" => Ok(Command::Total {
            key: rest.first().cloned().ok_or("'total' needs an attribute key")?,
        }),
        "add" => {
            let item_id = item_id()?;
            // The quantity is optional; a KEY=VALUE here is already an attribute
            let (quantity, attrs) = match rest.get(1) {
                Some(arg) if !arg.contains('=') => (arg.clone(), &rest[2..]),
                _ => ("1".to_string(), rest.get(1..).unwrap_or_default()),
            };
            Ok(Command::Add {
                item_id,
                quantity,
                attributes: parse_attributes(attrs)?,
            })
        }
        "update" => {
            let item_id = item_id()?;
            let quantity = rest.get(1).cloned().ok_or("'update' needs a quantity")?;
            Ok(Command::Update {
                item_id,
                quantity,
                attributes: parse_attributes(rest.get(2..).unwrap_or_default())?,
            })
        }
        "remove" => Ok(Command::Remove {
            item_id: item_id()?,
            attributes: parse_attributes(rest.get(1..).unwrap_or_default())?,
        }),
        other => Err(format!("Unknown command '{}'", other)),
    }
}

fn run<A: PersistenceAdapter>(cart: &mut CartEngine<A>, command: &Command) -> CartResult<()> {
    match command {
        Command::Show => {
            let summary = serde_json::to_string_pretty(&cart.summary())
                .map_err(simplecart_core::CodecError::from)?;
            println!("{}", summary);
        }
        Command::Add { item_id, quantity, attributes } => {
            let resulting = cart.add_input(item_id, quantity, attributes.clone())?;
            println!("{} now has quantity {}", item_id, resulting);
        }
        Command::Update { item_id, quantity, attributes } => {
            let resulting = cart.update_input(item_id, quantity, attributes)?;
            println!("{} now has quantity {}", item_id, resulting);
        }
        Command::Remove { item_id, attributes } => {
            let removed = cart.remove_variant(item_id, attributes)?;
            println!("Removed {} variant(s) of {}", removed, item_id);
        }
        Command::Clear => {
            cart.clear()?;
            println!("Cart cleared");
        }
        Command::Destroy => {
            cart.destroy()?;
            println!("Cart destroyed");
        }
        Command::Total { key } => {
            println!("{}", cart.attribute_total(key));
        }
    }
    Ok(())
}

fn default_session_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("com", "simplecart", "cart")
        .map(|dirs| dirs.data_dir().join("sessions"))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut config_path: Option<PathBuf> = None;
    let mut session_dir: Option<PathBuf> = None;
    let mut command_args: Vec<String> = Vec::new();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--dir" | "-d" => {
                if i + 1 < args.len() {
                    session_dir = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            _ => command_args.push(args[i].clone()),
        }
        i += 1;
    }

    init_tracing();

    let command = match parse_command(&command_args) {
        Ok(command) => command,
        Err(message) => {
            print_help();
            return Err(message.into());
        }
    };

    let config = CartConfig::load(config_path)?;

    match config.mode() {
        PersistenceMode::Session => {
            let dir = session_dir
                .or_else(default_session_dir)
                .ok_or("Could not determine session directory")?;
            let mut cart = CartEngine::open(&config, FileSession::open(dir)?)?;
            run(&mut cart, &command)?;
        }
        PersistenceMode::Cookie => {
            let header = env::var("SIMPLECART_COOKIE").unwrap_or_default();
            let jar = CookieJar::from_request_header(
                &header,
                config.persistence.cookie_path.clone(),
                config.persistence.cookie_max_age_days,
            );
            let mut cart = CartEngine::open(&config, jar)?;
            run(&mut cart, &command)?;
            for header in cart.into_adapter().set_cookie_headers() {
                println!("Set-Cookie: {}", header);
            }
        }
    }

    Ok(())
}
