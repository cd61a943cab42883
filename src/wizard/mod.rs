// Wizard - upload, style selection, generation and results for a portrait photo

pub mod config;
pub mod data_url;
pub mod gallery;
pub mod intake;
pub mod orchestrator;
pub mod progress;
pub mod service;
pub mod types;
pub mod watch;

pub use config::StudioConfig;
pub use gallery::Gallery;
pub use intake::Intake;
pub use orchestrator::{Completion, GenerationError, GenerationTicket, Step, StepKind, Studio};
pub use progress::{ProgressSimulation, ProgressTicker};
pub use service::{GeminiService, ImageService, ServiceError};
pub use types::*;
pub use watch::DropFolder;
