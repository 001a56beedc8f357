//! Identity domain values shared by every bounded context.

mod error;
mod ids;
mod principal;

pub use error::{IdentityError, ParseRoleError};
pub use ids::{OrganizationId, UserId};
pub use principal::{Principal, Role};
