use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use route_patcher::config::{load_settings, load_workspace, PatcherConfig, WORKSPACE_FILE_NAME};
use route_patcher::rule::{generate, GenerateError, GenerateOptions, GenerationReport};
use route_patcher::tree::{StagedKind, StagedTree};
use route_patcher::ts::{AnchorLocator, SourceDocument, TreeSitterError};
use route_patcher::WorkspaceGuard;
use similar::{ChangeTag, TextDiff};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "route-patcher")]
#[command(about = "Generate lazily loaded Angular feature modules", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a feature module and register it as a lazy route
    Generate {
        /// Name of the feature, optionally with a leading directory (`admin/users`)
        name: String,

        /// Project from angular.json (defaults to the workspace default project)
        #[arg(long)]
        project: Option<String>,

        /// Directory to create the feature in, relative to the workspace root
        #[arg(long)]
        path: Option<String>,

        /// Module to register the route next to
        #[arg(short, long)]
        module: Option<String>,

        /// Create files in `--path` directly instead of a new directory
        #[arg(long)]
        flat: bool,

        /// Selector prefix; an empty string disables the project prefix
        #[arg(long)]
        prefix: Option<String>,

        /// Stylesheet extension
        #[arg(long)]
        style: Option<String>,

        /// Do not generate a spec file
        #[arg(long)]
        no_spec: bool,

        #[arg(long)]
        inline_style: bool,

        #[arg(long)]
        inline_template: bool,

        /// Do not look for a module to register the route in
        #[arg(long)]
        skip_import: bool,

        /// Only generate files
        #[arg(long)]
        no_route: bool,

        /// Path to workspace root (auto-detected if not specified)
        #[arg(short, long)]
        workspace: Option<PathBuf>,

        /// Dry run - show what would be changed without modifying files
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show unified diff of changes
        #[arg(short, long)]
        diff: bool,

        /// Print the generation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the registration anchor the generator would patch in a file
    Inspect {
        file: PathBuf,

        /// Path to workspace root (auto-detected if not specified)
        #[arg(short, long)]
        workspace: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "route_patcher=warn".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            name,
            project,
            path,
            module,
            flat,
            prefix,
            style,
            no_spec,
            inline_style,
            inline_template,
            skip_import,
            no_route,
            workspace,
            dry_run,
            diff,
            json,
        } => {
            let workspace = resolve_workspace(workspace)?;
            let settings = load_settings(&workspace)?;
            settings.validate().with_context(|| {
                format!("invalid settings in {}", workspace.display())
            })?;

            let defaults = GenerateOptions::new(&name, &settings);
            let options = GenerateOptions {
                project,
                path,
                module,
                route: !no_route,
                flat: flat || defaults.flat,
                prefix,
                style: style.unwrap_or(defaults.style.clone()),
                spec: !no_spec && defaults.spec,
                inline_style: inline_style || defaults.inline_style,
                inline_template: inline_template || defaults.inline_template,
                skip_import,
                ..defaults
            };

            cmd_generate(&workspace, &settings, options, dry_run, diff, json)
        }

        Commands::Inspect { file, workspace } => cmd_inspect(file, workspace),
    }
}

/// Resolve workspace path using multiple detection strategies
///
/// Priority order:
/// 1. Explicit --workspace flag
/// 2. ROUTE_PATCHER_WORKSPACE environment variable
/// 3. Closest ancestor of the current directory holding angular.json
fn resolve_workspace(cli_workspace: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = cli_workspace {
        return path
            .canonicalize()
            .with_context(|| format!("workspace {} does not exist", path.display()));
    }

    if let Ok(env_path) = env::var("ROUTE_PATCHER_WORKSPACE") {
        let path = PathBuf::from(&env_path);
        if path.exists() {
            return Ok(path.canonicalize()?);
        }
        eprintln!(
            "{}",
            format!(
                "Warning: ROUTE_PATCHER_WORKSPACE is set but path doesn't exist: {}",
                env_path
            )
            .yellow()
        );
    }

    if let Some(path) = auto_detect_workspace() {
        eprintln!(
            "{}",
            format!("Auto-detected workspace: {}", path.display()).dimmed()
        );
        return Ok(path);
    }

    anyhow::bail!(
        "{}\n{}\n  {}\n  {}",
        "Could not find an Angular workspace.".red(),
        "Try one of:".bold(),
        "1. Specify explicitly: route-patcher generate <NAME> --workspace /path/to/app",
        "2. Set environment variable: export ROUTE_PATCHER_WORKSPACE=/path/to/app"
    )
}

fn auto_detect_workspace() -> Option<PathBuf> {
    let current = env::current_dir().ok()?.canonicalize().ok()?;
    current
        .ancestors()
        .find(|ancestor| ancestor.join(WORKSPACE_FILE_NAME).is_file())
        .map(Path::to_path_buf)
}

fn cmd_generate(
    workspace: &Path,
    settings: &PatcherConfig,
    mut options: GenerateOptions,
    dry_run: bool,
    show_diff: bool,
    json: bool,
) -> Result<()> {
    let angular = load_workspace(workspace)?;

    if options.project.is_none() {
        options.project = angular.default_project_name().map(str::to_string);
    }

    let mut tree = StagedTree::new(workspace);
    let report = match generate(&mut tree, &angular, settings, &options) {
        Ok(report) => report,
        Err(error) => {
            print_failure(&error);
            return Err(error.into());
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report, dry_run);
    }

    if show_diff {
        for (path, file) in tree.staged() {
            if file.kind == StagedKind::Updated {
                let original = tree.read_original(path).unwrap_or_default();
                display_diff(Path::new(path), &original, &file.content);
            }
        }
    }

    if dry_run {
        if !json {
            println!("{}", "[DRY RUN - nothing was written]".cyan());
        }
        return Ok(());
    }

    let guard = WorkspaceGuard::new(workspace)?;
    let written = tree.flush(&guard)?;
    tracing::info!(files = written.len(), "flushed workspace changes");

    Ok(())
}

fn print_report(report: &GenerationReport, dry_run: bool) {
    let verb = if dry_run { "Would create" } else { "Created" };
    for path in &report.created {
        println!("{} {} {}", "✓".green(), verb, path);
    }

    match &report.route {
        Some(route) => {
            let verb = if dry_run { "Would update" } else { "Updated" };
            println!(
                "{} {} {} ({} insertions)",
                "✓".green(),
                verb,
                route.file,
                route.insertions.len()
            );
        }
        None => println!("{} No route registered", "⊘".cyan()),
    }

    println!("Selector: {}", report.selector.bold());
}

fn print_failure(error: &GenerateError) {
    eprintln!("{} {}", "✗".red(), error);

    if let GenerateError::TreeSitter(TreeSitterError::AnchorNotFound { path, methods, .. }) = error
    {
        eprintln!("  {}", "CONFLICT: No registration array to add the route to".red());
        eprintln!("  File: {}", path.display());
        eprintln!("  Searched for: {}", methods.join(", "));
        eprintln!("  Possible causes:");
        eprintln!("    - The routing module does not call RouterModule.forRoot/forChild");
        eprintln!("    - The routes are built by a function rather than an array literal");
        eprintln!("  Action: pass --no-route, or add the method to route-patcher.toml");
    }

    eprintln!("{}", "No files were written.".dimmed());
}

/// Helper: Show unified diff between original and modified content
fn display_diff(file: &Path, original: &str, modified: &str) {
    println!(
        "\n{}",
        format!("--- {} (original)", file.display()).dimmed()
    );
    println!("{}", format!("+++ {} (patched)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, modified);

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => format!("-{}", change).red(),
            ChangeTag::Insert => format!("+{}", change).green(),
            ChangeTag::Equal => format!(" {}", change).normal(),
        };
        print!("{}", sign);
    }
}

fn cmd_inspect(file: PathBuf, workspace: Option<PathBuf>) -> Result<()> {
    let methods = match resolve_workspace(workspace) {
        Ok(root) => load_settings(&root)?.registration_methods(),
        Err(_) => Default::default(),
    };

    let text = fs::read_to_string(&file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let document = SourceDocument::parse(&file, text)?;
    let anchor = AnchorLocator::new(methods).locate(&document)?;

    let call = anchor.call.start_position();
    let array = anchor.array.start_position();
    println!("{} {}", "Anchor in".bold(), file.display());
    println!(
        "  call:  {}:{} {}",
        call.row + 1,
        call.column + 1,
        first_line(document.node_text(anchor.call)).dimmed()
    );
    println!(
        "  array: {}:{} ({} elements{})",
        array.row + 1,
        array.column + 1,
        anchor.element_count(),
        if anchor.has_trailing_comma() {
            ", trailing comma"
        } else {
            ""
        }
    );
    println!("  insert at byte {}", anchor.closing_offset());

    Ok(())
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or_default()
}
