use std::future::Future;

pub mod client;
pub mod error;
pub mod filter;
pub mod models;
pub mod token;

#[cfg(test)]
pub mod testing;

pub use client::{UpstreamClient, UpstreamConfig};
pub use error::UpstreamError;
pub use filter::{ListFilter, QueryParams};
pub use models::{
    Department, Departments, Job, JobItem, JobItems, Jobs, Location, LocationType, LocationTypes,
    Locations,
};

/// Typed operations offered by the upstream job API
///
/// Every call is authenticated with the service bearer token.
#[cfg_attr(test, mockall::automock)]
pub trait UpstreamApi: Send + Sync + 'static {
    fn get_department(
        &self,
        id: i64,
    ) -> impl Future<Output = Result<Department, UpstreamError>> + Send;

    fn get_departments(
        &self,
        filter: &ListFilter,
    ) -> impl Future<Output = Result<Departments, UpstreamError>> + Send;

    fn get_location(&self, id: i64)
        -> impl Future<Output = Result<Location, UpstreamError>> + Send;

    fn get_locations(
        &self,
        params: &QueryParams,
    ) -> impl Future<Output = Result<Locations, UpstreamError>> + Send;

    fn get_location_types(
        &self,
    ) -> impl Future<Output = Result<LocationTypes, UpstreamError>> + Send;

    fn get_location_type(
        &self,
        id: i64,
    ) -> impl Future<Output = Result<LocationType, UpstreamError>> + Send;

    fn get_job_item(&self, id: i64) -> impl Future<Output = Result<JobItem, UpstreamError>> + Send;

    fn get_job_items(
        &self,
        filter: &ListFilter,
    ) -> impl Future<Output = Result<JobItems, UpstreamError>> + Send;

    fn get_job(&self, id: i64) -> impl Future<Output = Result<Job, UpstreamError>> + Send;

    fn get_jobs(
        &self,
        params: &QueryParams,
    ) -> impl Future<Output = Result<Jobs, UpstreamError>> + Send;

    /// Create a job upstream and return the stored representation
    fn create_job(&self, job: &Job) -> impl Future<Output = Result<Job, UpstreamError>> + Send;
}
