use std::sync::Arc;

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use chrono::{Duration, Utc};
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

use crate::api::validation::ErrorResponse;
use crate::config::JobDefaults;
use crate::upstream::filter::display_name_params;
use crate::upstream::models::{Assignee, Department, Item, Location, Note, Role};
use crate::upstream::{Job, ListFilter, UpstreamApi, UpstreamError};

use super::models::CreateJobRequest;
use super::rules::{apply_department_rules, RuleOutcome};

/// Service-level errors
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("invalid department")]
    InvalidDepartment,

    #[error("invalid job item")]
    InvalidJobItem,

    #[error("invalid location")]
    InvalidLocation,

    #[error("job item is required for {department} department")]
    JobItemRequired { department: String },

    #[error("at least one location is required for {department} department")]
    LocationRequired { department: String },

    /// Creating the job upstream failed
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ServiceError::Upstream(e) => error!("Upstream error: {}", e),
            other => warn!("Validation error: {}", other),
        }
        HttpResponse::build(self.status_code()).json(ErrorResponse::new(self.to_string()))
    }
}

/// Result of one existence check
#[derive(Debug)]
enum CheckOutcome {
    Found,
    NotFound,
    Failed(UpstreamError),
}

impl CheckOutcome {
    fn from_lookup(result: Result<bool, UpstreamError>) -> Self {
        match result {
            Ok(true) => CheckOutcome::Found,
            Ok(false) => CheckOutcome::NotFound,
            Err(e) => CheckOutcome::Failed(e),
        }
    }
}

/// Job service containing business logic
pub struct JobService<A> {
    api: Arc<A>,
    defaults: JobDefaults,
}

impl<A: UpstreamApi> JobService<A> {
    /// Create a new JobService instance
    pub fn new(api: Arc<A>, defaults: JobDefaults) -> Self {
        Self { api, defaults }
    }

    /// Create a job upstream after validating the request
    ///
    /// # Business Logic
    /// - Checks department, job item and locations exist upstream, concurrently
    /// - Applies department specific rules
    /// - Builds the job payload from the request and the configured defaults
    /// - Creates the job upstream
    ///
    /// # Returns
    /// - `Ok(Job)` - Job created upstream (201)
    /// - `Err(ServiceError)` - Validation (400) or upstream (500) failure
    pub async fn create_job(&self, request: &CreateJobRequest) -> Result<Job, ServiceError> {
        info!(
            "Service: Creating job department={:?} job_item={:?} locations={}",
            request.department,
            request.job_item,
            request.locations().len()
        );

        // One task per present field; absent fields have no receiver to wait on
        let department = request.department.clone().map(|name| {
            let api = Arc::clone(&self.api);
            spawn_check(async move { department_exists(api.as_ref(), &name).await })
        });
        let job_item = request.job_item.clone().map(|name| {
            let api = Arc::clone(&self.api);
            spawn_check(async move { job_item_exists(api.as_ref(), &name).await })
        });
        let locations = request.locations.clone().map(|names| {
            let api = Arc::clone(&self.api);
            spawn_check(async move { locations_exist(api.as_ref(), &names).await })
        });

        // Fixed join order, regardless of which check finishes first
        let department_ok = join_check("department", department).await;
        let job_item_ok = join_check("job item", job_item).await;
        let locations_ok = join_check("locations", locations).await;

        if !department_ok {
            return Err(ServiceError::InvalidDepartment);
        }
        if !job_item_ok {
            return Err(ServiceError::InvalidJobItem);
        }
        if !locations_ok {
            return Err(ServiceError::InvalidLocation);
        }

        let outcome = apply_department_rules(
            request.department.as_deref(),
            request.job_item.as_deref(),
            request.locations(),
        )?;
        if let RuleOutcome::Housekeeping(targets) = &outcome {
            debug!(
                "Service: Housekeeping job for rooms={:?} floors={:?}",
                targets.rooms, targets.floors
            );
        }

        let job = self.build_job(request);
        let created = self.api.create_job(&job).await.map_err(|e| {
            error!("Service: Failed to create job upstream: {}", e);
            ServiceError::Upstream(e)
        })?;

        info!("Service: Job created successfully with id={:?}", created.id);
        Ok(created)
    }

    /// Upstream payload for a validated request
    pub fn build_job(&self, request: &CreateJobRequest) -> Job {
        let defaults = &self.defaults;

        let mut location: Vec<Location> = request
            .locations()
            .iter()
            .map(|name| Location::reference(defaults.location_id, name))
            .collect();
        // A job always references at least one location
        if location.is_empty() {
            location.push(Location {
                id: defaults.location_id,
                ..Default::default()
            });
        }

        let due_by = Duration::try_hours(defaults.due_in_hours)
            .and_then(|window| Utc::now().checked_add_signed(window));
        if due_by.is_none() {
            warn!(
                "Service: due window of {} hours is out of range, sending job without due date",
                defaults.due_in_hours
            );
        }

        Job {
            priority: defaults.priority.clone(),
            action: defaults.action.clone(),
            item: Item {
                name: request.job_item.clone().unwrap_or_default(),
            },
            department: Department {
                id: defaults.department_id,
                name: request.department.clone(),
            },
            role: Role {
                id: defaults.role_id,
                name: None,
            },
            location,
            notes: request
                .description
                .iter()
                .map(|note| Note {
                    id: None,
                    note: note.clone(),
                })
                .collect(),
            assignee: Assignee {
                employee_id: defaults.assignee_employee_id,
                username: defaults.assignee_username.clone(),
                auto_assign: defaults.auto_assign,
                ..Default::default()
            },
            due_by,
            ..Default::default()
        }
    }
}

/// Run a check in its own task and hand back the channel it reports on
fn spawn_check<F>(check: F) -> oneshot::Receiver<CheckOutcome>
where
    F: std::future::Future<Output = Result<bool, UpstreamError>> + Send + 'static,
{
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
        // Receiver is gone only if the request was abandoned
        let _ = tx.send(CheckOutcome::from_lookup(check.await));
    });
    rx
}

/// Wait for a launched check; checks that were never launched pass
async fn join_check(name: &str, receiver: Option<oneshot::Receiver<CheckOutcome>>) -> bool {
    let Some(receiver) = receiver else {
        return true;
    };

    match receiver.await {
        Ok(CheckOutcome::Found) => true,
        Ok(CheckOutcome::NotFound) => {
            warn!("Service: {} not found upstream", name);
            false
        }
        Ok(CheckOutcome::Failed(e)) if e.is_connectivity() => {
            warn!("Service: {} check could not reach upstream: {}", name, e);
            false
        }
        Ok(CheckOutcome::Failed(e)) => {
            warn!("Service: {} check failed: {}", name, e);
            false
        }
        Err(_) => {
            error!("Service: {} check ended without reporting", name);
            false
        }
    }
}

async fn department_exists<A: UpstreamApi>(api: &A, name: &str) -> Result<bool, UpstreamError> {
    let departments = api.get_departments(&ListFilter::by_display_name(name)).await?;
    Ok(!departments.is_empty())
}

async fn job_item_exists<A: UpstreamApi>(api: &A, name: &str) -> Result<bool, UpstreamError> {
    let items = api.get_job_items(&ListFilter::by_display_name(name)).await?;
    Ok(!items.is_empty())
}

/// Every location must resolve, stopping at the first one that does not
async fn locations_exist<A: UpstreamApi>(api: &A, names: &[String]) -> Result<bool, UpstreamError> {
    for name in names {
        let locations = api.get_locations(&display_name_params(name)).await?;
        if locations.is_empty() {
            debug!("Service: location {:?} not found", name);
            return Ok(false);
        }
    }
    Ok(true)
}
