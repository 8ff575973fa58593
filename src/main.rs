use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::fs;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};

use ledger::config::{
    config_dir, ensure_initialized, load_config, load_store, resolve_output_dir, Config,
    CONFIG_TEMPLATE, PROJECT_TEMPLATE,
};
use ledger::error::{LedgerError, Result};
use ledger::project::{preview, ProjectInput, ProjectRecord, ProjectService};
use ledger::report::{build_report, export_xlsx, format_money, format_percentage};

#[derive(Parser)]
#[command(name = "ledger")]
#[command(version, about = "Trade project ledger with computed totals", long_about = None)]
struct Cli {
    /// Path to config directory (default: ~/.ledger or XDG config)
    #[arg(short = 'C', long, global = true)]
    config_dir: Option<PathBuf>,

    /// Show debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize config directory with template files
    Init,

    /// Create a new project
    Add {
        /// Project input file (.toml or .json)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Field assignment in format "path=value" (can be repeated)
        #[arg(short, long, value_name = "PATH=VALUE")]
        set: Vec<String>,
    },

    /// Update fields of an existing project
    Update {
        /// Project number (e.g., TWL-2026-001)
        project_no: String,

        /// Project input file with the fields to change
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Field assignment in format "path=value" (can be repeated)
        #[arg(short, long, value_name = "PATH=VALUE")]
        set: Vec<String>,
    },

    /// Delete a project
    Delete {
        /// Project number
        project_no: String,
    },

    /// Show a project with all computed figures
    Show {
        /// Project number
        project_no: String,

        /// Print the stored record as JSON
        #[arg(long)]
        json: bool,
    },

    /// List projects, newest first
    List {
        /// Number of projects to show (default: all)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Compute figures for input without saving anything
    Preview {
        /// Project input file (.toml or .json)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Field assignment in format "path=value" (can be repeated)
        #[arg(short, long, value_name = "PATH=VALUE")]
        set: Vec<String>,
    },

    /// Export all projects to an Excel report
    Export {
        /// Custom output file path (default: output_dir/projects-report-DATE.xlsx)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show config and project count
    Status,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn run(cli: Cli) -> Result<()> {
    let cfg_dir = match cli.config_dir {
        Some(p) => p,
        None => config_dir()?,
    };

    match cli.command {
        Commands::Init => cmd_init(&cfg_dir),
        Commands::Add { file, set } => cmd_add(&cfg_dir, file.as_deref(), &set),
        Commands::Update {
            project_no,
            file,
            set,
        } => cmd_update(&cfg_dir, &project_no, file.as_deref(), &set),
        Commands::Delete { project_no } => cmd_delete(&cfg_dir, &project_no),
        Commands::Show { project_no, json } => cmd_show(&cfg_dir, &project_no, json),
        Commands::List { limit } => cmd_list(&cfg_dir, limit),
        Commands::Preview { file, set } => cmd_preview(&cfg_dir, file.as_deref(), &set),
        Commands::Export { output } => cmd_export(&cfg_dir, output),
        Commands::Status => cmd_status(&cfg_dir),
    }
}

/// Initialize config directory with template files
fn cmd_init(cfg_dir: &Path) -> Result<()> {
    if cfg_dir.exists() {
        return Err(LedgerError::AlreadyInitialized(cfg_dir.to_path_buf()));
    }

    fs::create_dir_all(cfg_dir)?;
    fs::create_dir_all(cfg_dir.join("output"))?;

    fs::write(cfg_dir.join("config.toml"), CONFIG_TEMPLATE)?;
    fs::write(cfg_dir.join("project.example.toml"), PROJECT_TEMPLATE)?;

    println!("Initialized ledger config at: {}", cfg_dir.display());
    println!();
    println!("Next steps:");
    println!(
        "  1. Edit company and user:  $EDITOR {}/config.toml",
        cfg_dir.display()
    );
    println!(
        "  2. Copy the sample input:  cp {}/project.example.toml project.toml",
        cfg_dir.display()
    );
    println!();
    println!("Then add your first project:");
    println!("  ledger add --file project.toml");

    Ok(())
}

/// Load config and build a service acting as the configured user.
fn open_service(cfg_dir: &Path) -> Result<(Config, ProjectService)> {
    ensure_initialized(cfg_dir)?;
    let config = load_config(cfg_dir)?;
    let service = ProjectService::new(cfg_dir, config.user.name.clone(), config.user.role);
    Ok((config, service))
}

fn cmd_add(cfg_dir: &Path, file: Option<&Path>, set: &[String]) -> Result<()> {
    let (config, service) = open_service(cfg_dir)?;
    let input = ProjectInput::from_sources(file, set)?;
    let record = service.create(input)?;

    println!("Created project {}", record.project_no);
    println!();
    print_figures(&record, &config.report.currency_symbol);
    Ok(())
}

fn cmd_update(cfg_dir: &Path, project_no: &str, file: Option<&Path>, set: &[String]) -> Result<()> {
    let (config, service) = open_service(cfg_dir)?;
    let patch = ProjectInput::from_sources(file, set)?;
    let record = service.update(project_no, patch)?;

    println!("Updated project {}", record.project_no);
    println!();
    print_figures(&record, &config.report.currency_symbol);
    Ok(())
}

fn cmd_delete(cfg_dir: &Path, project_no: &str) -> Result<()> {
    let (_, service) = open_service(cfg_dir)?;
    let removed = service.delete(project_no)?;
    println!(
        "Deleted project {} ({})",
        removed.project_no, removed.project_name
    );
    Ok(())
}

fn cmd_show(cfg_dir: &Path, project_no: &str, json: bool) -> Result<()> {
    let (config, service) = open_service(cfg_dir)?;
    let record = service.get(project_no)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(());
    }

    print_figures(&record, &config.report.currency_symbol);
    Ok(())
}

fn cmd_preview(cfg_dir: &Path, file: Option<&Path>, set: &[String]) -> Result<()> {
    // Preview works before init; fall back to the default symbol.
    let symbol = load_config(cfg_dir)
        .map(|c| c.report.currency_symbol)
        .unwrap_or_else(|_| "$".to_string());
    let input = ProjectInput::from_sources(file, set)?;
    let record = preview(&input);

    println!("Preview (not saved)");
    println!();
    print_figures(&record, &symbol);
    Ok(())
}

fn print_figures(record: &ProjectRecord, symbol: &str) {
    let money = |v: Decimal| format_money(v, symbol);
    let s = &record.supplier;
    let b = &record.buyer;
    let c = &record.costing;

    println!("Project:          {} - {}", record.project_no, record.project_name);
    println!("Date:             {}", record.project_date);
    if let Some(user) = &record.created_by {
        println!("Created by:       {user}");
    }
    println!("{}", "-".repeat(50));

    println!("Supplier");
    println!("  Final invoice:     {}", money(s.proforma_invoice.final_invoice_amount));
    println!("  Advance total:     {}", money(s.advance_payment.total_payment));
    println!("  Advance balance:   {}", money(s.advance_payment.balance_amount));
    println!("  Balance total:     {}", money(s.balance_payment.total_payment));
    println!("  Summary total:     {}", money(s.summary.total_amount));
    println!("  Cancel amount:     {}", money(s.summary.cancel_amount));
    println!("  Balance payment:   {}", money(s.summary.balance_payment));
    println!();

    println!("Buyer");
    println!("  Final invoice:     {}", money(b.proforma_invoice.final_invoice_amount));
    println!("  Balance total:     {}", money(b.balance_payment.total_payment));
    println!("  Total received:    {}", money(b.summary.total_received));
    println!("  Cancel amount:     {}", money(b.summary.cancel_amount));
    println!("  Balance received:  {}", money(b.summary.balance_received));
    println!();

    println!("Costing");
    println!("  Profit:            {}", money(c.profit));
    println!("  Profit %:          {}", format_percentage(&c.profit_percentage));
    println!("  Total expenses:    {}", money(c.total_expenses));
    println!("  Net profit:        {}", money(c.net_profit));
}

#[derive(Tabled)]
struct ProjectRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "NUMBER")]
    number: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "DATE")]
    date: String,
    #[tabled(rename = "SUPPLIER PAID")]
    supplier_paid: String,
    #[tabled(rename = "BUYER RECEIVED")]
    buyer_received: String,
    #[tabled(rename = "PROFIT")]
    profit: String,
    #[tabled(rename = "NET PROFIT")]
    net_profit: String,
    #[tabled(rename = "PROFIT %")]
    profit_percentage: String,
}

/// Append a TOTAL row to a rounded table. The first `label_cols` columns are
/// merged into the label cell, the next `values.len()` columns carry the
/// values and any remaining columns are closed off.
fn add_totals_footer(table: &str, label_cols: usize, label: &str, values: &[String]) -> String {
    let lines: Vec<&str> = table.lines().collect();
    if lines.len() < 4 || label_cols == 0 {
        return table.to_string();
    }

    // Parse the top border to discover column widths
    let Some(inner) = lines[0].strip_prefix('╭').and_then(|s| s.strip_suffix('╮')) else {
        return table.to_string();
    };
    let widths: Vec<usize> = inner.split('┬').map(|p| p.chars().count()).collect();
    if widths.len() < label_cols + values.len() {
        return table.to_string();
    }

    let label_widths = &widths[..label_cols];
    let value_widths = &widths[label_cols..label_cols + values.len()];
    let rest_widths = &widths[label_cols + values.len()..];
    let left_width: usize = label_widths.iter().sum::<usize>() + label_cols - 1;

    let dashes = |ws: &[usize], joint: &str| {
        ws.iter()
            .map(|w| "─".repeat(*w))
            .collect::<Vec<_>>()
            .join(joint)
    };

    // Strip the original bottom border
    let mut out = lines[..lines.len() - 1].join("\n");
    out.push('\n');

    out.push('├');
    out.push_str(&dashes(label_widths, "┴"));
    out.push('┼');
    out.push_str(&dashes(value_widths, "┼"));
    if rest_widths.is_empty() {
        out.push_str("┤\n");
    } else {
        out.push('┼');
        out.push_str(&dashes(rest_widths, "┴"));
        out.push_str("╯\n");
    }

    out.push_str(&format!("│ {:>width$} │", label, width = left_width - 2));
    for (value, w) in values.iter().zip(value_widths) {
        out.push_str(&format!(" {:>width$} │", value, width = w.saturating_sub(2)));
    }
    out.push('\n');

    out.push('╰');
    out.push_str(&"─".repeat(left_width));
    out.push('┴');
    out.push_str(&dashes(value_widths, "┴"));
    out.push('╯');

    out
}

/// List projects with an aggregate footer
fn cmd_list(cfg_dir: &Path, limit: Option<usize>) -> Result<()> {
    let (config, service) = open_service(cfg_dir)?;
    let projects = service.list()?;

    if projects.is_empty() {
        println!("No projects recorded yet.");
        return Ok(());
    }

    let shown = match limit {
        Some(n) => &projects[..n.min(projects.len())],
        None => &projects[..],
    };

    let symbol = &config.report.currency_symbol;
    let (report_rows, totals) = build_report(shown);
    let rows: Vec<ProjectRow> = report_rows
        .iter()
        .enumerate()
        .map(|(idx, r)| ProjectRow {
            index: idx + 1,
            number: r.project_no.clone(),
            name: r.project_name.clone(),
            date: r.project_date.clone(),
            supplier_paid: format_money(r.supplier_paid, symbol),
            buyer_received: format_money(r.buyer_received, symbol),
            profit: format_money(r.profit, symbol),
            net_profit: format_money(r.net_profit, symbol),
            profit_percentage: format_percentage(&r.profit_percentage),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    let footer_values = [
        format_money(totals.supplier_paid, symbol),
        format_money(totals.buyer_received, symbol),
        format_money(totals.profit, symbol),
        format_money(totals.net_profit, symbol),
    ];
    let table = add_totals_footer(&table, 4, "TOTAL", &footer_values);

    println!("{table}");
    println!();
    if shown.len() < projects.len() {
        println!("Showing {} of {} projects", shown.len(), projects.len());
    } else {
        println!("Total: {} projects", projects.len());
    }

    Ok(())
}

fn cmd_export(cfg_dir: &Path, output: Option<PathBuf>) -> Result<()> {
    let (config, service) = open_service(cfg_dir)?;
    let projects = service.list()?;

    let path = match output {
        Some(p) => p,
        None => {
            let dir = resolve_output_dir(&config.report.output_dir, cfg_dir);
            fs::create_dir_all(&dir)?;
            let stamp = chrono::Local::now().format("%Y-%m-%d");
            dir.join(format!("projects-report-{stamp}.xlsx"))
        }
    };

    let count = export_xlsx(&projects, &config, &path)?;
    println!("Exported {} projects to: {}", count, path.display());
    Ok(())
}

fn cmd_status(cfg_dir: &Path) -> Result<()> {
    ensure_initialized(cfg_dir)?;
    let config = load_config(cfg_dir)?;
    let store = load_store(cfg_dir)?;

    println!("Ledger Status");
    println!("{}", "-".repeat(50));
    println!("Config directory: {}", cfg_dir.display());
    println!("Company:          {}", config.company.name);
    if let Some(address) = &config.company.address {
        println!("Address:          {address}");
    }
    if let Some(email) = &config.company.email {
        println!("Email:            {email}");
    }
    println!(
        "User:             {} ({})",
        config.user.name, config.user.role
    );
    println!(
        "Output directory: {}",
        resolve_output_dir(&config.report.output_dir, cfg_dir).display()
    );
    println!("Projects:         {}", store.projects.len());

    if !store.projects.is_empty() {
        let (_, totals) = build_report(&store.projects);
        println!(
            "Net profit:       {}",
            format_money(totals.net_profit, &config.report.currency_symbol)
        );
    }

    Ok(())
}
