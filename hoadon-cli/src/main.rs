use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use hoadon_core::{format_grouped, Catalog, CatalogItem, MenuIndex, PaymentMethod, VAT_RATE};
use hoadon_ingest::{combine_ledgers, parse_ledger};
use hoadon_tax::{
    finalize, generate_basket, max_price_adjustment, CsvSink, DiscountOutcome, InvoiceSink,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::path::{Path, PathBuf};

mod config;

#[derive(Parser, Debug)]
#[command(name = "hoadon", version, about = "POS ledger splitting and tax invoice generation")]
struct Cli {
    /// Config file (default: ./hoadon.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Split a POS export into one invoice file per order
    Split {
        /// Ledger export (HTML table)
        file: PathBuf,

        /// Second single-method export to merge in (transfer export first,
        /// atm export second)
        #[arg(long)]
        merge: Option<PathBuf>,

        /// Menu CSVs (overrides config)
        #[arg(long)]
        menu: Vec<PathBuf>,

        /// Output directory (overrides config)
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// RNG seed for reproducible beverage replacements
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Synthesize a delivery invoice matching a tax-inclusive revenue figure
    Generate {
        /// Tax-inclusive total (8% VAT included)
        total: f64,

        /// Menu CSV to draw items from (default: first config menu)
        #[arg(long)]
        menu: Vec<PathBuf>,

        /// Invoice date, dd/mm/yyyy (default: today)
        #[arg(long)]
        date: Option<String>,

        /// Reference number (default: generated from the current time)
        #[arg(long)]
        reference: Option<String>,

        /// Output directory (overrides config)
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// RNG seed for reproducible baskets
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Split {
            file,
            merge,
            menu,
            out_dir,
            seed,
        } => run_split(cli.config.as_deref(), file, merge, menu, out_dir, seed),
        Command::Generate {
            total,
            menu,
            date,
            reference,
            out_dir,
            seed,
        } => run_generate(cli.config.as_deref(), total, menu, date, reference, out_dir, seed),
    }
}

fn load_catalog(config: Option<&Path>, menu: Vec<PathBuf>) -> Result<(Catalog, config::Config, Vec<PathBuf>)> {
    let cfg = config::load_config(config)?;
    let menus = if menu.is_empty() { cfg.menus.clone() } else { menu };
    for m in &menus {
        if !m.exists() {
            eprintln!("warning: menu not found, skipping: {}", m.display());
        }
    }
    let catalog = Catalog::load(&menus)?;
    Ok((catalog, cfg, menus))
}

fn rng_from(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}

/// Payment label baked into a single-method export's filename.
fn method_from_filename(path: &Path) -> Option<PaymentMethod> {
    let name = path.file_name()?.to_string_lossy().to_lowercase();
    if name.contains("atm") {
        Some(PaymentMethod::Atm)
    } else if name.contains("transfer") {
        Some(PaymentMethod::Transfer)
    } else {
        None
    }
}

fn run_split(
    config: Option<&Path>,
    file: PathBuf,
    merge: Option<PathBuf>,
    menu: Vec<PathBuf>,
    out_dir: Option<PathBuf>,
    seed: Option<u64>,
) -> Result<()> {
    let (catalog, cfg, menus) = load_catalog(config, menu)?;
    if catalog.is_empty() {
        bail!("no catalog entries loaded from {menus:?}");
    }
    println!("Loaded {} catalog items", catalog.len());
    let index = MenuIndex::new(&catalog)?;

    let mut content =
        fs::read_to_string(&file).with_context(|| format!("reading {}", file.display()))?;
    let mut merged = file
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase().contains("sale_by_payment_method"))
        .unwrap_or(false);
    if let Some(second) = &merge {
        let second_content = fs::read_to_string(second)
            .with_context(|| format!("reading {}", second.display()))?;
        content = combine_ledgers(&content, &second_content);
        merged = true;
    }
    let fallback_method = method_from_filename(&file);

    let raw_invoices = parse_ledger(&content, merged)?;
    println!("Found {} invoices in {}\n", raw_invoices.len(), file.display());

    let out_dir = out_dir.unwrap_or(cfg.out_dir);
    fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let mut rng = rng_from(seed);
    let sink = CsvSink;
    let mut written = 0usize;
    let mut warnings: Vec<String> = Vec::new();

    println!("{:<8} {:>5} {:>14}  {:<28} check", "id", "items", "subtotal", "discounts");
    for raw in raw_invoices {
        let Some(mut done) = finalize(raw, &catalog, &index, &mut rng) else {
            continue;
        };
        if done.invoice.payment == PaymentMethod::Unknown {
            if let Some(method) = fallback_method {
                done.invoice.payment = method;
            }
        }
        let inv = &done.invoice;

        let discount_info = if inv.discount > 0.0 || inv.secondary_discount > 0.0 {
            format!(
                "GG {} + CK {}",
                format_grouped(inv.discount as i64),
                format_grouped(inv.secondary_discount as i64)
            )
        } else {
            String::new()
        };

        let check = if inv.recorded_total > 0.0 {
            let diff = (inv.total_with_tax() - inv.recorded_total).abs();
            if diff > 10.0 {
                warnings.push(format!(
                    "invoice {}: computed {}đ vs recorded {}đ",
                    inv.id,
                    format_grouped(inv.total_with_tax().round() as i64),
                    format_grouped(inv.recorded_total as i64)
                ));
                format!("±{}", format_grouped(diff.round() as i64))
            } else {
                "ok".to_string()
            }
        } else {
            "n/a".to_string()
        };

        match done.discount {
            DiscountOutcome::Invalid { total } => warnings.push(format!(
                "invoice {}: discount {}đ meets or exceeds the item subtotal, not applied",
                inv.id,
                format_grouped(total as i64)
            )),
            DiscountOutcome::Withheld { total } => warnings.push(format!(
                "invoice {}: discount {}đ above half the subtotal, likely a parse error, withheld",
                inv.id,
                format_grouped(total as i64)
            )),
            DiscountOutcome::Applied { remainder, .. } if remainder > 0.0 => {
                warnings.push(format!(
                    "invoice {}: {}đ of discount left unallocated by the 90% cap",
                    inv.id,
                    format_grouped(remainder.round() as i64)
                ))
            }
            _ => {}
        }

        println!(
            "{:<8} {:>5} {:>13}đ  {:<28} {}",
            inv.id,
            inv.items.len(),
            format_grouped(inv.subtotal().round() as i64),
            discount_info,
            check
        );

        // One bad write must not abort the rest of the ledger.
        match sink.write_invoice(inv, &out_dir) {
            Ok(_) => written += 1,
            Err(err) => eprintln!("warning: invoice {}: {err:#}", inv.id),
        }
    }

    if !warnings.is_empty() {
        eprintln!("\n{} warning(s):", warnings.len());
        for w in &warnings {
            eprintln!("  {w}");
        }
    }
    println!("\nWrote {} invoice files to {}", written, out_dir.display());
    Ok(())
}

fn run_generate(
    config: Option<&Path>,
    total: f64,
    menu: Vec<PathBuf>,
    date: Option<String>,
    reference: Option<String>,
    out_dir: Option<PathBuf>,
    seed: Option<u64>,
) -> Result<()> {
    if total <= 0.0 {
        bail!("total must be positive");
    }

    let cfg = config::load_config(config)?;
    // Baskets come from one menu; mixing places would not look like one order.
    let menus = if menu.is_empty() {
        cfg.menus.first().cloned().into_iter().collect()
    } else {
        menu
    };
    let catalog = Catalog::load(&menus)?;
    if catalog.is_empty() {
        bail!("no catalog entries loaded from {menus:?}");
    }
    let items: Vec<CatalogItem> = catalog.items().to_vec();

    let pre_tax = total / (1.0 + VAT_RATE);
    println!("Tax-inclusive total: {}đ", format_grouped(total.round() as i64));
    println!("Pre-tax:             {pre_tax:.2}đ");
    println!("VAT (8%):            {:.2}đ", total - pre_tax);

    let date = match date {
        Some(s) => NaiveDate::parse_from_str(&s, "%d/%m/%Y")
            .context("date must be dd/mm/yyyy")?,
        None => Local::now().date_naive(),
    };
    let reference =
        reference.unwrap_or_else(|| format!("GRAB_{}", Local::now().format("%Y%m%d_%H%M%S")));

    let mut rng = rng_from(seed);
    let Some(basket) = generate_basket(&items, pre_tax, &mut rng) else {
        bail!("no usable (non-alcoholic) items in {menus:?}");
    };

    println!("\nSelected {} items:", basket.items.len());
    for item in &basket.items {
        println!(
            "  {}: {} {} x {:.2} = {:.2}",
            item.name,
            item.quantity,
            item.unit,
            item.price,
            item.subtotal()
        );
    }
    println!(
        "\nBasket total {:.2}đ against target {pre_tax:.2}đ (off by {:.2})",
        basket.total, basket.deviation
    );
    if let Some((name, catalog_price, generated)) = &basket.adjusted {
        println!(
            "Price shifted on {name}: {catalog_price:.0} -> {generated:.2} (limit {:.0})",
            max_price_adjustment(pre_tax)
        );
    }
    if !basket.exact {
        eprintln!(
            "warning: best-effort basket only; total is off by {:.2}đ",
            basket.deviation
        );
    }

    let out_dir = out_dir.unwrap_or(cfg.out_dir);
    fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;
    let path = CsvSink.write_generated(&basket.items, date, &reference, &out_dir)?;
    println!("Wrote {}", path.display());
    Ok(())
}
