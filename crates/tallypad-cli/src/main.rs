// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod runtime;

use anyhow::{Context, Result, anyhow};
use config::Config;
use runtime::AmountArgs;
use std::env;
use std::path::PathBuf;
use tallypad_app::{FeedKey, IouType, PaymentMethod, PolicyId};
use tallypad_db::Store;
use tracing_subscriber::EnvFilter;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `tallypad --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;
    init_tracing(config.log_filter())?;

    let db_path = if options.demo {
        PathBuf::from(":memory:")
    } else {
        config.db_path()?
    };
    if options.print_db_path {
        println!("{}", db_path.display());
        return Ok(());
    }

    let mut store = Store::open(&db_path).with_context(|| {
        format!(
            "open database {} -- if this path is wrong, set [storage].db_path or TALLYPAD_DB_PATH",
            db_path.display()
        )
    })?;
    store.bootstrap()?;
    if options.demo {
        store.seed_demo_data()?;
    }

    if options.check_only {
        for entry in store.list_entries("")? {
            println!("{}\t{}", entry.key, entry.updated_at);
        }
        return Ok(());
    }

    let output = match options.command {
        None => {
            print_help();
            return Ok(());
        }
        Some(Command::Amount(args)) => runtime::run_amount(&args, config.default_currency())?,
        Some(Command::Feeds { policy_id }) => runtime::run_feeds(&store, &policy_id)?,
        Some(Command::SelectFeed { policy_id, feed }) => {
            runtime::watch_selected_feed(&mut store, &policy_id);
            runtime::run_select_feed(&mut store, &policy_id, &feed)?
        }
        Some(Command::AddFeed { policy_id }) => runtime::run_add_feed(&mut store, &policy_id)?,
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&output).context("encode command output")?
    );
    Ok(())
}

/// `RUST_LOG` wins over the configured filter. Logs go to stderr so JSON
/// output stays clean.
fn init_tracing(configured: &str) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(configured))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Amount(AmountArgs),
    Feeds { policy_id: PolicyId },
    SelectFeed { policy_id: PolicyId, feed: FeedKey },
    AddFeed { policy_id: PolicyId },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_db_path: bool,
    demo: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
    command: Option<Command>,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        print_db_path: false,
        demo: false,
        print_example: false,
        check_only: false,
        show_help: false,
        command: None,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-path" => {
                options.print_db_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--demo" => {
                options.demo = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            "amount" => {
                let rest: Vec<String> = iter.by_ref().map(|s| s.as_ref().to_owned()).collect();
                options.command = Some(Command::Amount(parse_amount_args(&rest)?));
            }
            "feeds" => {
                let policy_id = next_value(&mut iter, "feeds requires a workspace policy id")?;
                options.command = Some(Command::Feeds {
                    policy_id: PolicyId::new(policy_id),
                });
            }
            "select-feed" => {
                let policy_id =
                    next_value(&mut iter, "select-feed requires a workspace policy id")?;
                let feed = next_value(&mut iter, "select-feed requires a feed key")?;
                options.command = Some(Command::SelectFeed {
                    policy_id: PolicyId::new(policy_id),
                    feed: FeedKey::new(feed),
                });
            }
            "add-feed" => {
                let policy_id = next_value(&mut iter, "add-feed requires a workspace policy id")?;
                options.command = Some(Command::AddFeed {
                    policy_id: PolicyId::new(policy_id),
                });
            }
            unknown => {
                return Err(anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn next_value<I, S>(iter: &mut I, message: &str) -> Result<String>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    iter.next()
        .map(|value| value.as_ref().to_owned())
        .ok_or_else(|| anyhow!("{message}"))
}

fn parse_amount_args(args: &[String]) -> Result<AmountArgs> {
    let mut parsed = AmountArgs::default();
    let mut keys = None;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--currency" => {
                parsed.currency = Some(next_value(&mut iter, "--currency requires a code")?);
            }
            "--initial" => {
                let raw = next_value(&mut iter, "--initial requires a backend amount")?;
                parsed.initial = raw
                    .parse()
                    .with_context(|| format!("--initial expects integer hundredths, got {raw:?}"))?;
            }
            "--tax-max" => {
                let raw = next_value(&mut iter, "--tax-max requires a backend amount")?;
                parsed.tax_max = Some(
                    raw.parse()
                        .with_context(|| format!("--tax-max expects integer hundredths, got {raw:?}"))?,
                );
            }
            "--iou-type" => {
                let raw = next_value(&mut iter, "--iou-type requires a value")?;
                parsed.iou_type = IouType::parse(&raw).ok_or_else(|| {
                    anyhow!("unknown iou type {raw:?}; use submit, split, pay, or track")
                })?;
            }
            "--payment-method" => {
                let raw = next_value(&mut iter, "--payment-method requires a value")?;
                parsed.payment_method = Some(PaymentMethod::parse(&raw).ok_or_else(|| {
                    anyhow!("unknown payment method {raw:?}; use expensify, vbba, or elsewhere")
                })?);
            }
            "--editing" => {
                parsed.is_editing = true;
            }
            "--skip-confirmation" => {
                parsed.skip_confirmation = true;
            }
            flag if flag.starts_with("--") => {
                return Err(anyhow!(
                    "unknown amount option {flag:?}; run with --help to see supported options"
                ));
            }
            script => {
                if keys.replace(script.to_owned()).is_some() {
                    return Err(anyhow!("amount takes a single key script, got a second one"));
                }
            }
        }
    }
    parsed.keys = keys.unwrap_or_default();
    Ok(parsed)
}

fn print_help() {
    println!("tallypad");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-path             Print resolved database path");
    println!("  --print-example-config   Print a v1 config template");
    println!("  --demo                   Run against seeded demo data (in-memory)");
    println!("  --check                  Validate config + DB and list stored keys");
    println!("  --help                   Show this help");
    println!();
    println!("commands:");
    println!("  amount [options] <keys>  Replay keypad presses ('<' is backspace) and submit");
    println!("      --currency <code>  --initial <hundredths>  --tax-max <hundredths>");
    println!("      --iou-type <type>  --payment-method <method>  --editing  --skip-confirmation");
    println!("  feeds <policy>           List company card feeds of a workspace");
    println!("  select-feed <policy> <feed>  Remember a feed as the workspace's selection");
    println!("  add-feed <policy>        Start the add card feed flow");
}
