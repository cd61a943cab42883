// Orchestrator - the wizard state machine and the fan-out/fan-in generation batch

use super::service::{ImageService, ServiceError};
use super::types::{
    GeneratedImage, GenerationMode, MAX_VARIATIONS, StylePreset, UploadedImage, Variations,
};
use futures_util::future::join_all;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Single message shown for every failed generation
pub const GENERATION_FAILED_MESSAGE: &str = "AI failed to generate any images. This might be a safety block. Please try a different photo or prompt.";

/// Wizard step, carrying exactly the data valid in it
#[derive(Debug, Clone)]
pub enum Step {
    Upload,
    Options {
        image: Arc<UploadedImage>,
        error: Option<String>,
    },
    Loading {
        image: Arc<UploadedImage>,
        mode: GenerationMode,
        ticket: GenerationTicket,
    },
    Results {
        image: Arc<UploadedImage>,
        variations: Variations,
    },
}

impl Step {
    pub fn kind(&self) -> StepKind {
        match self {
            Step::Upload => StepKind::Upload,
            Step::Options { .. } => StepKind::Options,
            Step::Loading { .. } => StepKind::Loading,
            Step::Results { .. } => StepKind::Results,
        }
    }

    /// The uploaded photo, present in every step but upload
    pub fn image(&self) -> Option<&Arc<UploadedImage>> {
        match self {
            Step::Upload => None,
            Step::Options { image, .. } | Step::Loading { image, .. } | Step::Results { image, .. } => {
                Some(image)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepKind {
    Upload,
    Options,
    Loading,
    Results,
}

impl StepKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepKind::Upload => "upload",
            StepKind::Options => "options",
            StepKind::Loading => "loading",
            StepKind::Results => "results",
        }
    }
}

/// Handle of one in-flight generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationTicket {
    epoch: u64,
}

/// What `Studio::finish` did with a completed generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Moved to results
    Results,
    /// Moved back to options with an error
    Failed,
    /// The ticket was stale; nothing changed
    Discarded,
}

/// Owns the wizard state; every change goes through a transition method
#[derive(Debug)]
pub struct Studio {
    step: Step,
    epoch: u64,
}

impl Studio {
    pub fn new() -> Self {
        Self {
            step: Step::Upload,
            epoch: 0,
        }
    }

    pub fn step(&self) -> &Step {
        &self.step
    }

    pub fn kind(&self) -> StepKind {
        self.step.kind()
    }

    /// upload → options
    pub fn upload(&mut self, image: UploadedImage) -> Result<(), TransitionError> {
        if !matches!(self.step, Step::Upload) {
            return Err(TransitionError::new("upload", self.kind()));
        }

        self.step = Step::Options {
            image: Arc::new(image),
            error: None,
        };
        Ok(())
    }

    /// options → loading; clears the previous error
    pub fn begin(
        &mut self,
        mode: GenerationMode,
    ) -> Result<(GenerationTicket, Arc<UploadedImage>), TransitionError> {
        let Step::Options { image, .. } = &self.step else {
            return Err(TransitionError::new("begin", self.kind()));
        };

        let image = Arc::clone(image);
        self.epoch += 1;
        let ticket = GenerationTicket { epoch: self.epoch };

        info!(mode = mode.as_str(), epoch = self.epoch, "generation started");

        self.step = Step::Loading {
            image: Arc::clone(&image),
            mode,
            ticket,
        };
        Ok((ticket, image))
    }

    /// loading → results or loading → options, depending on the outcome
    pub fn finish(
        &mut self,
        ticket: GenerationTicket,
        outcome: Result<Variations, GenerationError>,
    ) -> Completion {
        let image = match &self.step {
            Step::Loading { image, ticket: active, .. } if *active == ticket => Arc::clone(image),
            _ => {
                debug!(epoch = ticket.epoch, step = self.kind().as_str(), "discarding stale generation");
                return Completion::Discarded;
            }
        };

        match outcome {
            Ok(variations) => {
                info!(count = variations.len(), "generation finished");
                self.step = Step::Results { image, variations };
                Completion::Results
            }
            Err(e) => {
                warn!(error = %e, "generation failed");
                self.step = Step::Options {
                    image,
                    error: Some(e.user_message().to_string()),
                };
                Completion::Failed
            }
        }
    }

    /// any → upload, dropping the photo, results and error
    pub fn start_over(&mut self) {
        debug!(from = self.kind().as_str(), "starting over");
        self.step = Step::Upload;
    }

    /// Run a whole generation: begin, fan out, finish
    pub async fn run<S>(&mut self, service: &S, mode: GenerationMode) -> Result<Completion, TransitionError>
    where
        S: ImageService + ?Sized,
    {
        let (ticket, image) = self.begin(mode.clone())?;
        let outcome = generate(service, &image, &mode).await;
        Ok(self.finish(ticket, outcome))
    }
}

impl Default for Studio {
    fn default() -> Self {
        Self::new()
    }
}

/// Issue the edit requests for `mode` and join them all.
///
/// Presets ask the service for prompts and send at most `MAX_VARIATIONS`
/// edits concurrently; custom mode sends exactly one. Empty and failed
/// edits are dropped; the batch succeeds if anything is left.
pub async fn generate<S>(
    service: &S,
    image: &UploadedImage,
    mode: &GenerationMode,
) -> Result<Variations, GenerationError>
where
    S: ImageService + ?Sized,
{
    let instructions: Vec<String> = match mode {
        GenerationMode::Custom(instruction) => vec![instruction.clone()],
        GenerationMode::Professional => preset_prompts(service, StylePreset::Professional).await?,
        GenerationMode::Creative => preset_prompts(service, StylePreset::Creative).await?,
    };

    if instructions.is_empty() {
        return Err(GenerationError::NoPrompts);
    }

    debug!(service = service.name(), requests = instructions.len(), "dispatching edit batch");

    let settled = join_all(
        instructions
            .iter()
            .map(|instruction| service.edit_image(image, instruction)),
    )
    .await;

    let mut images: Vec<GeneratedImage> = Vec::with_capacity(settled.len());
    let mut blocked = 0;
    let mut failed = 0;

    for (instruction, outcome) in instructions.iter().zip(settled) {
        match outcome {
            Ok(Some(generated)) if !generated.is_empty() => images.push(generated),
            Ok(_) => {
                blocked += 1;
                warn!(%instruction, "edit returned no image");
            }
            Err(e) => {
                failed += 1;
                warn!(%instruction, error = %e, "edit request failed");
            }
        }
    }

    Variations::new(images).ok_or(GenerationError::NothingGenerated {
        requested: instructions.len(),
        blocked,
        failed,
    })
}

/// Prompts written by the service for a preset, capped at `MAX_VARIATIONS`
async fn preset_prompts<S>(service: &S, preset: StylePreset) -> Result<Vec<String>, GenerationError>
where
    S: ImageService + ?Sized,
{
    let prompts = service
        .generate_prompts(preset)
        .await
        .map_err(GenerationError::Prompts)?;
    Ok(prompts.into_iter().take(MAX_VARIATIONS).collect())
}

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("Prompt request failed: {0}")]
    Prompts(ServiceError),

    #[error("Service returned no prompts")]
    NoPrompts,

    #[error("No images generated ({requested} requested, {blocked} empty, {failed} failed)")]
    NothingGenerated {
        requested: usize,
        blocked: usize,
        failed: usize,
    },
}

impl GenerationError {
    /// Every failure is surfaced the same way
    pub fn user_message(&self) -> &'static str {
        GENERATION_FAILED_MESSAGE
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Cannot {action} during the {} step", .step.as_str())]
pub struct TransitionError {
    pub action: &'static str,
    pub step: StepKind,
}

impl TransitionError {
    fn new(action: &'static str, step: StepKind) -> Self {
        Self { action, step }
    }
}
