pub mod assessment;
pub mod metadata;
pub mod standard;

pub use crate::domain::configuration::AssessmentConfig;
pub use assessment::{
    apply_env_overrides, find_assessment_config, load_assessment_config,
    load_assessment_config_file, parse_assessment_config,
};
pub use metadata::{load_source_metadata, sidecar_path};
pub use standard::{StandardCatalog, load_standard, parse_standard};
