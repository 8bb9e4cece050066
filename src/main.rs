use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;
use style_forge::config::{self, RunConfig};
use style_forge::diffusion::StableDiffusion;
use style_forge::imaging::RustResizer;
use style_forge::index::MaudIndex;
use style_forge::modifiers::{Modifiers, load_modifiers};
use style_forge::options::{GenerationOptions, load_options};
use style_forge::plan::{self, PlanInputs};
use style_forge::queue::{QueueEvent, TaskQueue};
use style_forge::task::Toolbox;
use style_forge::types::Gallery;
use style_forge::{driver, output, scan};
use tracing_subscriber::EnvFilter;

/// Flags shared by commands that build a plan. Each overrides the matching
/// `config.toml` value.
#[derive(clap::Args, Clone, Default)]
struct PlanArgs {
    /// Modifiers file (category → styles)
    #[arg(short, long)]
    modifiers: Option<PathBuf>,

    /// Generation options file
    #[arg(short = 'x', long)]
    options: Option<PathBuf>,

    /// Directory containing input images
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output directory
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Remove the output directory before generating
    #[arg(short, long)]
    clean: bool,

    /// Skip generation when the first output image already exists
    #[arg(short, long)]
    skip_existing: bool,
}

impl PlanArgs {
    fn apply(&self, config: &mut RunConfig) {
        if let Some(p) = &self.modifiers {
            config.paths.modifiers = p.clone();
        }
        if let Some(p) = &self.options {
            config.paths.options = p.clone();
        }
        if let Some(p) = &self.input {
            config.paths.inputs = p.clone();
        }
        if let Some(p) = &self.output {
            config.paths.output = p.clone();
        }
        config.run.clean |= self.clean;
        config.run.skip_existing |= self.skip_existing;
    }
}

#[derive(Parser)]
#[command(name = "style-forge")]
#[command(about = "Batch-generate styled image variants with Stable Diffusion")]
#[command(long_about = "\
Batch-generate styled image variants with Stable Diffusion

Every input image is generated once per style listed in the modifiers file,
thumbnailed, and collected into a browsable index.html.

Layout:

  inputs/
  ├── Cat.png                      # Filename is the prompt: letters and spaces only
  └── Old Lighthouse.png
  modifiers.json                   # {\"Color\": [\"red\", \"blue\"], \"Medium\": [\"oil painting\"]}
  options.json                     # {\"outputs\": 2, \"steps\": 50, \"seed\": 42, ...}

  outputs/
  ├── index.html
  └── Color/
      └── red/
          ├── Cat-0-full.png       # Prompt \"Cat, red\", first image
          ├── Cat-0-thumb.png
          └── ...

Run 'style-forge gen-config' to generate a documented config.toml.")]
#[command(version = env!("BUILD_VERSION"))]
struct Cli {
    /// Config file (default: ./config.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log task execution details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate all variants, thumbnails, and the index page
    Run {
        #[command(flatten)]
        plan: PlanArgs,

        /// Stable Diffusion backend URL
        #[arg(short, long)]
        backend: Option<String>,
    },
    /// Print the task list without running it
    Plan {
        #[command(flatten)]
        plan: PlanArgs,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    match cli.command {
        Command::Run { plan, backend } => {
            let mut config = config::load_config(cli.config.as_deref())?;
            plan.apply(&mut config);
            if let Some(url) = backend {
                config.backend.url = url;
            }
            config.validate()?;
            run(&config)?;
        }
        Command::Plan { plan } => {
            let mut config = config::load_config(cli.config.as_deref())?;
            plan.apply(&mut config);
            config.validate()?;
            let inputs = Inputs::load(&config)?;
            let queue = plan::build_plan(&inputs.plan(&config), &Gallery::new())?;
            output::print_plan(&queue.summaries());
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Diagnostics go to stderr; `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let filter = match std::env::var("RUST_LOG") {
        Ok(v) if !v.trim().is_empty() => EnvFilter::from_default_env(),
        _ => EnvFilter::try_new(if verbose { "style_forge=debug" } else { "warn" })?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
    Ok(())
}

/// Files a plan is built from, loaded and validated up front.
struct Inputs {
    options: GenerationOptions,
    modifiers: Modifiers,
    images: Vec<PathBuf>,
}

impl Inputs {
    fn load(config: &RunConfig) -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self {
            options: load_options(&config.paths.options)?,
            modifiers: load_modifiers(&config.paths.modifiers)?,
            images: scan::discover_inputs(&config.paths.inputs)?,
        })
    }

    fn plan<'a>(&'a self, config: &'a RunConfig) -> PlanInputs<'a> {
        PlanInputs {
            modifiers: &self.modifiers,
            options: &self.options,
            inputs: &self.images,
            output_root: &config.paths.output,
            clean: config.run.clean,
            skip_existing: config.run.skip_existing,
            thumbnail_size: (config.thumbnails.width, config.thumbnails.height),
            index_title: &config.index.title,
        }
    }
}

fn run(config: &RunConfig) -> Result<(), Box<dyn std::error::Error>> {
    let backend = StableDiffusion::new(&config.backend.url)?
        .with_ping_timeout(Duration::from_millis(config.backend.ping_timeout_ms));

    println!("Checking back-end connectivity");
    if let Err(e) = driver::preflight(&backend, backend.base_url()) {
        eprintln!("{}", e);
        std::process::exit(1);
    }
    println!("{}", output::format_backend_ready(backend.base_url()));

    let inputs = Inputs::load(config)?;

    let (tx, rx) = mpsc::channel();
    let printer = std::thread::spawn(move || {
        let mut total = 0;
        for event in rx {
            if let QueueEvent::TaskEnqueued(_) = event {
                total += 1;
            }
            let lines = output::format_queue_event(&event, total);
            for line in lines {
                if matches!(event, QueueEvent::TaskError { .. }) {
                    eprintln!("{}", line);
                } else {
                    println!("{}", line);
                }
            }
        }
    });

    let gallery = Gallery::new();
    let mut queue = TaskQueue::new().with_events(tx);
    plan::build_into(&mut queue, &inputs.plan(config), &gallery)?;

    let resizer = RustResizer::new();
    let tools = Toolbox {
        backend: &backend,
        resizer: &resizer,
        renderer: &MaudIndex,
    };
    let summary = driver::drive(&mut queue, tools, &gallery);

    // Closing the channel ends the printer.
    drop(queue);
    printer.join().map_err(|_| "output thread panicked")?;

    output::print_run_summary(&summary, &config.paths.output.join("index.html"));
    if summary.halted {
        std::process::exit(1);
    }
    Ok(())
}
