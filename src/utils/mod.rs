// Pure helpers: identity, timing, links, attachment naming, properties text

pub mod attachments;
pub mod identity;
pub mod links;
pub mod properties;
pub mod timing;

pub use identity::{history_id, md5, test_case_id};
pub use links::{
    LinkConfig, LinkTemplate, LinkTemplateConfig, LinkTypeConfig, format_link, format_links,
};
pub use timing::{StopOptions, Timings, reconcile_timing};
