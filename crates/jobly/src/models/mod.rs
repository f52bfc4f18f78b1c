//! Model layer: one module per table family.
//!
//! Every function takes `&impl GenericClient` and tags its statements with
//! `<entity>.<operation>` for [`TracingClient`](crate::TracingClient).

pub mod company;
pub mod job;
pub mod user;

pub use company::{Company, CompanyDetail, CompanyPatch, NewCompany};
pub use job::{Job, JobPatch, NewJob};
pub use user::{NewUser, User, UserCredentials, UserPatch, UserWithJobs};
