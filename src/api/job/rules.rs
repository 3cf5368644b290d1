use super::service::ServiceError;

/// Job items housekeeping delivers to rooms and floors
pub const HOUSEKEEPING_ITEMS: [&str; 3] = ["Blanket", "Sheets", "Mattress"];

/// Departments that need a job item and at least one location
const LOCATED_DEPARTMENTS: [&str; 2] = ["Engineering", "Room Service"];

/// Housekeeping locations split by kind
///
/// Nothing consumes these yet; they are returned so routing by room or floor
/// can be added without touching the rule itself.
#[derive(Debug, Default, PartialEq)]
pub struct HousekeepingTargets {
    pub rooms: Vec<String>,
    pub floors: Vec<String>,
}

#[derive(Debug, PartialEq)]
pub enum RuleOutcome {
    Accepted,
    Housekeeping(HousekeepingTargets),
}

/// Check department specific requirements of a job
pub fn apply_department_rules(
    department: Option<&str>,
    job_item: Option<&str>,
    locations: &[String],
) -> Result<RuleOutcome, ServiceError> {
    match department {
        Some("Housekeeping") => housekeeping(job_item, locations),
        Some(name) if LOCATED_DEPARTMENTS.contains(&name) => {
            if job_item.is_none() {
                return Err(ServiceError::JobItemRequired {
                    department: name.to_string(),
                });
            }
            if locations.is_empty() {
                return Err(ServiceError::LocationRequired {
                    department: name.to_string(),
                });
            }
            Ok(RuleOutcome::Accepted)
        }
        _ => Ok(RuleOutcome::Accepted),
    }
}

fn housekeeping(job_item: Option<&str>, locations: &[String]) -> Result<RuleOutcome, ServiceError> {
    // Items outside the allow-list carry no location requirement
    if !job_item.is_some_and(|item| HOUSEKEEPING_ITEMS.contains(&item)) {
        return Ok(RuleOutcome::Accepted);
    }

    let matching = |needle: &str| -> Vec<String> {
        locations
            .iter()
            .filter(|loc| loc.to_lowercase().contains(needle))
            .cloned()
            .collect()
    };
    let targets = HousekeepingTargets {
        rooms: matching("room"),
        floors: matching("floor"),
    };

    if targets.rooms.is_empty() && targets.floors.is_empty() {
        return Err(ServiceError::InvalidLocation);
    }
    Ok(RuleOutcome::Housekeeping(targets))
}
