// studio - turn a portrait into AI-generated headshots and creative poses

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use studio::ui::input::{self, OptionsAction, ResultsAction};
use studio::ui::{self, screens};
use studio::wizard::config::{CONFIG_FILE, StudioConfig};
use studio::wizard::intake::IntakeError;
use studio::wizard::orchestrator::generate;
use studio::wizard::{
    Completion, DropFolder, Gallery, GeminiService, GenerationMode, ImageService, Intake,
    ProgressTicker, Step, StepKind, Studio,
};
use termimad::MadSkin;
use tracing::{debug, error};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about = "Generate professional headshots and creative poses from a portrait", long_about = None)]
struct Args {
    /// Photo to start with (skips the upload step)
    photo: Option<PathBuf>,

    /// Wait for a photo dropped into this directory
    #[arg(short, long)]
    watch: Option<PathBuf>,

    /// Download directory (overrides config)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Create an example .studio.json in the current directory
    #[arg(long)]
    init: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// What the loop should do after a step
enum Flow {
    Continue,
    Quit,
}

struct App {
    studio: Studio,
    config: StudioConfig,
    service: Arc<dyn ImageService>,
    intake: Intake,
    skin: MadSkin,
    pending_photo: Option<PathBuf>,
    drop_folder: Option<DropFolder>,
}

impl App {
    async fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        loop {
            let flow = match self.studio.kind() {
                StepKind::Upload => self.upload_step().await?,
                StepKind::Options => self.options_step().await?,
                StepKind::Results => self.results_step().await?,
                // Generation settles inside the options step, a loading step here has no batch behind it
                StepKind::Loading => {
                    self.studio.start_over();
                    Flow::Continue
                }
            };

            if let Flow::Quit = flow {
                println!("👋 Bye!");
                return Ok(());
            }
        }
    }

    async fn upload_step(&mut self) -> Result<Flow, Box<dyn std::error::Error>> {
        let drop_dir = self.drop_folder.as_ref().map(|f| f.dir().display().to_string());
        ui::draw(&self.skin, &screens::upload_screen(drop_dir.as_deref()))?;

        let path = match (self.pending_photo.take(), &self.drop_folder) {
            (Some(path), _) => path,
            (None, Some(folder)) => {
                let path = folder.wait_for_drop().await?;
                println!(
                    "[{}] 📥 Dropped {}",
                    chrono::Local::now().format("%H:%M:%S"),
                    path.display()
                );
                path
            }
            (None, None) => {
                let line = input::read_line("Photo path (q to quit): ").await?;
                let line = line.trim();
                if line.is_empty() {
                    return Ok(Flow::Continue);
                }
                if line == "q" {
                    return Ok(Flow::Quit);
                }
                PathBuf::from(line)
            }
        };

        match self.intake.load_file(&path).await {
            Ok(image) => {
                self.studio.upload(image)?;
            }
            Err(e) => {
                if !matches!(e, IntakeError::InvalidFileType(_)) {
                    error!(path = %path.display(), error = %e, "intake failed");
                }
                self.alert(&e.user_message()).await?;
            }
        }

        Ok(Flow::Continue)
    }

    async fn options_step(&mut self) -> Result<Flow, Box<dyn std::error::Error>> {
        let Step::Options { image, error } = self.studio.step() else {
            return Ok(Flow::Continue);
        };
        ui::draw(&self.skin, &screens::options_screen(image, error.as_deref()))?;

        let key = input::next_key().await?;
        let mode = match input::options_action(&key) {
            Some(OptionsAction::Professional) => GenerationMode::Professional,
            Some(OptionsAction::Creative) => GenerationMode::Creative,
            Some(OptionsAction::Custom) => {
                ui::draw(&self.skin, &screens::custom_prompt_screen())?;
                let text = input::read_line("Prompt: ").await?;
                // Submitting a blank prompt does nothing
                match GenerationMode::custom(text) {
                    Some(mode) => mode,
                    None => return Ok(Flow::Continue),
                }
            }
            Some(OptionsAction::StartOver) => {
                self.studio.start_over();
                return Ok(Flow::Continue);
            }
            Some(OptionsAction::Quit) => return Ok(Flow::Quit),
            None => return Ok(Flow::Continue),
        };

        self.run_generation(mode).await?;
        Ok(Flow::Continue)
    }

    /// options → loading → results/options, redrawing progress while the batch runs
    async fn run_generation(&mut self, mode: GenerationMode) -> Result<Completion, Box<dyn std::error::Error>> {
        let (ticket, image) = self.studio.begin(mode.clone())?;
        let ticker = ProgressTicker::start(self.config.progress_settings());
        let mut progress = ticker.subscribe();

        ui::draw(&self.skin, &screens::loading_screen(&ticker.snapshot()))?;

        let service = Arc::clone(&self.service);
        let batch = generate(service.as_ref(), &image, &mode);
        tokio::pin!(batch);

        let outcome = loop {
            tokio::select! {
                outcome = &mut batch => break outcome,
                changed = progress.changed() => {
                    if changed.is_err() {
                        break (&mut batch).await;
                    }
                    let snapshot = progress.borrow_and_update().clone();
                    ui::draw(&self.skin, &screens::loading_screen(&snapshot))?;
                }
            }
        };
        drop(ticker);

        let completion = self.studio.finish(ticket, outcome);
        debug!(?completion, "generation settled");
        Ok(completion)
    }

    async fn results_step(&mut self) -> Result<Flow, Box<dyn std::error::Error>> {
        let Step::Results { image, variations } = self.studio.step() else {
            return Ok(Flow::Continue);
        };
        let mut gallery = Gallery::new(image, variations);
        let mut focus = gallery.selected();
        let mut status: Option<String> = None;

        loop {
            ui::draw(&self.skin, &screens::results_screen(&gallery, focus, status.as_deref()))?;
            status = None;

            let key = input::next_key().await?;
            match input::results_action(&key) {
                Some(ResultsAction::Previous) => focus = gallery.previous(),
                Some(ResultsAction::Next) => focus = gallery.next(),
                Some(ResultsAction::Select(index)) => {
                    if gallery.select(index) {
                        focus = index;
                    }
                }
                Some(ResultsAction::FocusNext) => focus = (focus + 1) % gallery.len(),
                Some(ResultsAction::FocusPrevious) => focus = (focus + gallery.len() - 1) % gallery.len(),
                Some(ResultsAction::Activate(key)) => {
                    gallery.activate(focus, key);
                }
                Some(ResultsAction::Download) => {
                    status = Some(match gallery.download(&self.config.download_dir).await {
                        Ok(path) => format!("✅ Saved {}", path.display()),
                        Err(e) => format!("❌ Download failed: {}", e),
                    });
                }
                Some(ResultsAction::StartOver) => {
                    self.studio.start_over();
                    return Ok(Flow::Continue);
                }
                Some(ResultsAction::Quit) => return Ok(Flow::Quit),
                None => {}
            }
        }
    }

    /// Blocking alert: show the message and wait for a key
    async fn alert(&self, message: &str) -> Result<(), Box<dyn std::error::Error>> {
        println!("\n⚠️  {}", message);
        println!("   Press any key to continue");
        let key = input::next_key().await?;
        debug!(?key, "alert dismissed");
        Ok(())
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "studio=debug" } else { "studio=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_tracing(args.verbose);

    if args.init {
        StudioConfig::write_example(CONFIG_FILE)?;
        println!("✅ Created example config at: {}", CONFIG_FILE);
        return Ok(());
    }

    let mut config = StudioConfig::load()?;
    if let Some(out) = args.out {
        config.download_dir = out;
    }

    let service = match GeminiService::new(&config) {
        Ok(service) => service,
        Err(e) => {
            eprintln!("❌ {}", e);
            eprintln!("   Run `studio --init` to create {} or export GEMINI_API_KEY", CONFIG_FILE);
            std::process::exit(1);
        }
    };

    let drop_folder = args
        .watch
        .map(|dir| DropFolder::new(dir, config.debounce(), config.ignore_patterns.clone()));

    let mut app = App {
        studio: Studio::new(),
        service: Arc::new(service),
        intake: Intake::new(),
        skin: ui::create_markdown_skin(),
        pending_photo: args.photo,
        drop_folder,
        config,
    };

    app.run().await
}
