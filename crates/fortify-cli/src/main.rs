use clap::{Parser, Subcommand};
use fortify::{
    commands::{
        config::{self, ConfigAction},
        crypto::{self, DecryptArgs, EncryptArgs},
        derive::{self, DeriveArgs},
        hash::{self, HashAction},
        keys::{self, KeysAction},
        runtime::{self, RuntimeAction},
        tokens::{self, TokensAction},
    },
    errors::CliError,
    init_tracing, logger, GlobalOpts,
};

#[derive(Parser)]
#[command(name = "fortify")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Cryptography and security tools backed by FortifyJS",
    long_about = "fortify gives command-line access to the FortifyJS security library. \
                  Each command runs the library in a short-lived Node.js process."
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOpts,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate keys
    #[command(subcommand)]
    Keys(KeysAction),
    /// Hash and verify passwords
    #[command(subcommand)]
    Hash(HashAction),
    /// Encrypt data
    Encrypt(EncryptArgs),
    /// Decrypt data
    Decrypt(DecryptArgs),
    /// Generate tokens
    #[command(subcommand)]
    Tokens(TokensAction),
    /// Derive a key with a memory-hard function
    Derive(DeriveArgs),
    /// Configure fortify
    #[command(subcommand_required = false, arg_required_else_help = false)]
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
    /// Inspect the Node.js runtime and library location
    #[command(subcommand)]
    Runtime(RuntimeAction),
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logger::init_with_verbosity(
        cli.global.verbosity_level(),
        cli.global.quiet,
        cli.global.no_color,
    ) {
        eprintln!("Warning: Failed to initialize logger: {}", e);
    }
    init_tracing(cli.global.verbosity_level());

    let global = cli.global;
    let result: Result<(), CliError> = match cli.command {
        Commands::Keys(action) => keys::handle_keys(action, &global),
        Commands::Hash(action) => hash::handle_hash(action, &global),
        Commands::Encrypt(args) => crypto::handle_encrypt(args, &global),
        Commands::Decrypt(args) => crypto::handle_decrypt(args, &global),
        Commands::Tokens(action) => tokens::handle_tokens(action, &global),
        Commands::Derive(args) => derive::handle_derive(args, &global),
        Commands::Config { action } => config::handle_config(action, &global),
        Commands::Runtime(action) => runtime::handle_runtime(action, &global),
    };

    if let Err(e) = result {
        logger::error(&e.to_string());
        if global.verbosity_level() > 0 {
            logger::show_log_path();
        }
        std::process::exit(1);
    }
}
