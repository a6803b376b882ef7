//! `phone-cart` command implementation

use std::io::{self, Write};

use phone_cart::{
    cart::{Cart, CartError, Outcome},
    catalog::{Catalog, CatalogError},
    checkout::{CheckoutError, CustomerDetails},
    config::{CartConfig, ConfigError},
    persistence::CartSlot,
    storage::{DirectoryStore, StorageError},
    summary::{CartSummary, SummaryError},
};
use rusty_money::iso::Currency;
use thiserror::Error;
use tracing::{debug, warn};

use args::{Command, CustomerArgs, StoreArgs};

pub(crate) mod args;
pub(crate) mod logging;

/// Errors that end a command.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("no catalog configured, pass --catalog or set CATALOG")]
    MissingCatalog,

    #[error("failed to open cart storage: {0}")]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    #[error(transparent)]
    Summary(#[from] SummaryError),

    #[error("failed to encode output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

/// Run `command` against the cart described by `store`.
pub(crate) fn run(store: &StoreArgs, command: Command) -> Result<(), CliError> {
    let config = match &store.config {
        Some(path) => CartConfig::from_path(path)?,
        None => CartConfig::default(),
    };

    let currency = config.currency()?;
    let mut cart = open_cart(store, &config)?;
    let mut out = io::stdout().lock();

    let outcome = match command {
        Command::Show => None,
        Command::Add { model, quantity } => {
            let catalog = load_catalog(store)?;
            let product = catalog.product(&model)?.clone();

            Some(cart.add_item(product, quantity)?)
        }
        Command::Remove { model } => Some(cart.remove_item(&model)?),
        Command::Inc { model } => Some(cart.increment(&model)?),
        Command::Dec { model } => Some(cart.decrement(&model)?),
        Command::Set { model, quantity } => Some(cart.set_quantity(&model, quantity)?),
        Command::Clear => Some(cart.clear()?),
        Command::Checkout(customer) => {
            let payload = cart.order_payload(customer_details(customer))?;

            serde_json::to_writer_pretty(&mut out, &payload)?;
            writeln!(out)?;

            return Ok(());
        }
        Command::Confirm => Some(cart.order_submitted()?),
        Command::Pay(payment) => {
            let request = cart.payment_request(payment.account, payment.reference, payment.invoice);

            serde_json::to_writer_pretty(&mut out, &request)?;
            writeln!(out)?;

            return Ok(());
        }
    };

    if let Some(outcome) = outcome {
        report(&outcome, &mut out)?;
    }

    show(&cart, currency, &mut out)
}

fn open_cart(store: &StoreArgs, config: &CartConfig) -> Result<Cart<DirectoryStore>, CliError> {
    let mut directory = DirectoryStore::open(&store.dir)?;

    if let Some(quota) = config.quota_bytes {
        directory = directory.with_quota(quota);
    }

    let slot = CartSlot::with_key(directory, config.storage_key.clone());
    let (cart, issue) = Cart::open(slot, config.discount_policy()?);

    if let Some(issue) = issue {
        warn!(%issue, "saved cart discarded");
    }

    debug!(dir = %store.dir.display(), lines = cart.len(), "cart opened");

    Ok(cart)
}

fn load_catalog(store: &StoreArgs) -> Result<Catalog, CliError> {
    let path = store.catalog.as_ref().ok_or(CliError::MissingCatalog)?;

    Ok(Catalog::from_path(path)?)
}

fn customer_details(args: CustomerArgs) -> CustomerDetails {
    CustomerDetails {
        full_name: args.full_name,
        email: args.email,
        phone: args.phone,
        address: args.address,
    }
}

fn report(outcome: &Outcome, mut out: impl Write) -> Result<(), CliError> {
    match outcome {
        Outcome::NotInCart => writeln!(out, "That model is not in the cart.")?,
        Outcome::Saved => {}
        Outcome::SaveFailed(warning) => {
            writeln!(out, "Warning: the cart could not be saved ({warning}).")?;
        }
    }

    Ok(())
}

fn show(
    cart: &Cart<DirectoryStore>,
    currency: &'static Currency,
    out: impl Write,
) -> Result<(), CliError> {
    let snapshot = cart.snapshot();

    CartSummary::new(&snapshot, currency).write_to(out)?;

    Ok(())
}
