//! Configuration module

mod site;

pub use site::AboutConfig;
pub use site::CmsConfig;
pub use site::ContactConfig;
pub use site::ProjectRecord;
pub use site::SiteConfig;
pub use site::SocialLink;
