//! Command line arguments

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Phone cart command line
#[derive(Debug, Parser)]
#[command(name = "phone-cart", about = "Phone storefront cart", long_about = None)]
pub(crate) struct Cli {
    /// Storage settings.
    #[command(flatten)]
    pub store: StoreArgs,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingArgs,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Load arguments from the environment and command line.
    pub(crate) fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }
}

/// Where the cart and its collaborators live.
#[derive(Debug, Args)]
pub(crate) struct StoreArgs {
    /// Cart configuration file (YAML)
    #[arg(long, env = "CART_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding the persisted cart
    #[arg(long, env = "CART_DIR", default_value = ".phone-cart")]
    pub dir: PathBuf,

    /// Phone catalog file (YAML)
    #[arg(long, env = "CATALOG")]
    pub catalog: Option<PathBuf>,
}

/// Log output format.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
pub(crate) struct LoggingArgs {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "warn")]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Print the cart and its totals
    Show,

    /// Add a catalog phone to the cart
    Add {
        /// Catalog model id
        model: String,

        /// Units to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },

    /// Remove a model from the cart
    Remove {
        /// Model id
        model: String,
    },

    /// Add one unit of a model already in the cart
    Inc {
        /// Model id
        model: String,
    },

    /// Take one unit off a model, keeping at least one
    Dec {
        /// Model id
        model: String,
    },

    /// Set the quantity of a model already in the cart
    Set {
        /// Model id
        model: String,

        /// New quantity, at least 1
        quantity: u32,
    },

    /// Empty the cart
    Clear,

    /// Print the bulk order for the cart as JSON
    Checkout(CustomerArgs),

    /// Record that the order was accepted and empty the cart
    Confirm,

    /// Print a payment request for the cart total as JSON
    Pay(PaymentArgs),
}

/// Contact details for checkout.
#[derive(Debug, Args)]
pub(crate) struct CustomerArgs {
    /// Name the order is placed under
    #[arg(long)]
    pub full_name: String,

    /// Contact email
    #[arg(long)]
    pub email: String,

    /// Contact phone
    #[arg(long)]
    pub phone: String,

    /// Delivery address
    #[arg(long)]
    pub address: String,
}

/// References for a payment request.
#[derive(Debug, Args)]
pub(crate) struct PaymentArgs {
    /// Account charged
    #[arg(long)]
    pub account: String,

    /// Payment reference
    #[arg(long)]
    pub reference: String,

    /// Invoice reference
    #[arg(long)]
    pub invoice: String,
}
