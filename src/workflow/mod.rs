pub mod generation_orchestrator;
pub mod job_ctx;
pub mod job_flow;
pub mod long_form;

pub use generation_orchestrator::GenerationOrchestrator;
pub use job_ctx::JobCtx;
pub use job_flow::{Collaborators, JobFlow, JobRequest};
pub use long_form::{LongFormContent, LongFormOrchestrator};
