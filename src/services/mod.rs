pub mod content_reshaper;
pub mod document_assembler;
pub mod image_provisioner;
pub mod layout_assigner;
pub mod template_registry;

pub use content_reshaper::{ContentReshaper, ReshapeConfig};
pub use document_assembler::{DocumentAssembler, PreparedDocument};
pub use image_provisioner::ImageProvisioner;
pub use layout_assigner::{LayoutAssigner, LayoutCycle};
pub use template_registry::TemplateRegistry;
